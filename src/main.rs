//! Virtual Charge Point fleet simulator CLI.
//!
//! Reads configuration from `VCPSIM_CONFIG` (TOML), falls back to
//! `~/.config/vcpsim/config.toml`, and drives a `FleetManager` through a
//! tiny line-oriented admin console. The external admin HTTP layer this
//! console stands in for is out of scope for this crate.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use vcp_fleet_sim::charger::config::ChargerConfig;
use vcp_fleet_sim::config::AppConfig;
use vcp_fleet_sim::fleet::{AdminApi, FleetManager, JsonFileRosterStore};
use vcp_fleet_sim::support::shutdown::ShutdownCoordinator;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config_path = std::env::var("VCPSIM_CONFIG").map(PathBuf::from).ok();
    let app_config = AppConfig::load(config_path.as_deref());
    info!(ws_url = app_config.ws_url, roster = %app_config.roster_path.display(), "starting vcpsim");

    let roster = Arc::new(JsonFileRosterStore::new(app_config.roster_path.clone()));
    let fleet = match FleetManager::new(
        roster,
        app_config.ws_url.clone(),
        Duration::from_secs(app_config.call_timeout_secs),
        Duration::from_secs(app_config.meter_tick_secs),
    ) {
        Ok(fleet) => Arc::new(fleet),
        Err(e) => {
            error!(error = %e, "failed to load roster");
            return;
        }
    };

    let shutdown = ShutdownCoordinator::new(app_config.shutdown_timeout_secs);
    shutdown.start_signal_listener();
    let shutdown_signal = shutdown.signal();

    let console_fleet = fleet.clone();
    let console = tokio::spawn(async move { run_console(console_fleet).await });

    tokio::select! {
        _ = shutdown_signal.notified().wait() => {
            info!("shutdown signal received, disconnecting fleet");
        }
        _ = console => {
            info!("admin console exited");
        }
    }

    let cp_ids: Vec<String> = fleet.list_chargers().await.into_iter().map(|c| c.cp_id).collect();
    for cp_id in cp_ids {
        let _ = fleet.disconnect(&cp_id).await;
    }
}

/// `add`/`connect`/`plug`/`start`/`stop`/`status`/`quit` — enough to drive
/// the simulator end-to-end without the external admin HTTP layer.
async fn run_console(fleet: Arc<FleetManager>) {
    let stdin = std::io::stdin();
    println!("vcpsim admin console. Type `help` for commands.");
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        if stdin.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => continue,
            ["quit"] | ["exit"] => break,
            ["help"] => print_help(),
            ["add", cp_id, vendor, model] => {
                let config = ChargerConfig::new(*cp_id, *vendor, *model);
                match fleet.add_charger(config).await {
                    Ok(()) => println!("added {cp_id}"),
                    Err(e) => println!("error: {e}"),
                }
            }
            ["connect", cp_id] => match fleet.connect(cp_id).await {
                Ok(()) => println!("connected {cp_id}"),
                Err(e) => println!("error: {e}"),
            },
            ["plug", cp_id, connector_id, profile_id] => {
                let connector_id = match connector_id.parse() {
                    Ok(id) => id,
                    Err(_) => {
                        println!("error: connectorId must be a number");
                        continue;
                    }
                };
                match fleet.plug_in_car(cp_id, connector_id, profile_id, 0.2).await {
                    Ok(()) => println!("plugged {profile_id} into {cp_id}/{connector_id}"),
                    Err(e) => println!("error: {e}"),
                }
            }
            ["start", cp_id, connector_id, id_tag] => {
                let connector_id = match connector_id.parse() {
                    Ok(id) => id,
                    Err(_) => {
                        println!("error: connectorId must be a number");
                        continue;
                    }
                };
                match fleet.start_transaction(cp_id, connector_id, Some(id_tag.to_string())).await {
                    Ok(()) => println!("start-transaction requested for {cp_id}/{connector_id}"),
                    Err(e) => println!("error: {e}"),
                }
            }
            ["stop", cp_id, connector_id] => {
                let connector_id = match connector_id.parse() {
                    Ok(id) => id,
                    Err(_) => {
                        println!("error: connectorId must be a number");
                        continue;
                    }
                };
                match fleet.stop_transaction(cp_id, connector_id, None).await {
                    Ok(()) => println!("stop-transaction requested for {cp_id}/{connector_id}"),
                    Err(e) => println!("error: {e}"),
                }
            }
            ["status"] => print_status(&fleet).await,
            ["status", cp_id] => match fleet.get_charger(cp_id).await {
                Ok(summary) => println!("{}", summary_line(&summary)),
                Err(e) => println!("error: {e}"),
            },
            _ => println!("unrecognized command; type `help`"),
        }
    }
}

fn print_help() {
    println!(
        "commands:\n\
         \x20 add <cpId> <vendor> <model>\n\
         \x20 connect <cpId>\n\
         \x20 plug <cpId> <connectorId> <profileId>\n\
         \x20 start <cpId> <connectorId> <idTag>\n\
         \x20 stop <cpId> <connectorId>\n\
         \x20 status [cpId]\n\
         \x20 quit"
    );
}

async fn print_status(fleet: &FleetManager) {
    for summary in fleet.list_chargers().await {
        println!("{}", summary_line(&summary));
    }
}

fn summary_line(summary: &vcp_fleet_sim::fleet::types::ChargerSummary) -> String {
    let connectors: Vec<String> = summary
        .connectors
        .iter()
        .map(|c| format!("{}:{:?}", c.connector_id, c.status))
        .collect();
    format!(
        "{} connected={} [{}]",
        summary.cp_id,
        summary.connected,
        connectors.join(", ")
    )
}
