//! End-to-end scenarios from the testable-properties list, driven over a
//! real loopback WebSocket against an in-process mock CSMS.

mod mock_csms;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use vcp_fleet_sim::charger::config::ChargerConfig;
use vcp_fleet_sim::charger::connector::ConnectorStatus;
use vcp_fleet_sim::fleet::{AdminApi, FleetManager, JsonFileRosterStore};

use mock_csms::MockCsms;

fn temp_roster_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("vcpsim-fleet-scenario-{name}-{}.json", std::process::id()))
}

async fn new_fleet(name: &str, ws_url: String, meter_tick: Duration) -> Arc<FleetManager> {
    let roster = Arc::new(JsonFileRosterStore::new(temp_roster_path(name)));
    Arc::new(FleetManager::new(roster, ws_url, Duration::from_secs(5), meter_tick).expect("fleet manager"))
}

/// Polls an async `condition` every 50ms up to `attempts` times.
async fn wait_until<F, Fut>(mut attempts: u32, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    loop {
        if condition().await {
            return true;
        }
        if attempts == 0 {
            return false;
        }
        attempts -= 1;
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test]
async fn scenario_1_boot_sequence() {
    let mock = MockCsms::start().await;
    let fleet = new_fleet("boot", mock.ws_url(), Duration::from_secs(300)).await;

    let config = ChargerConfig::new("CP-A", "Acme", "X1");
    fleet.add_charger(config).await.unwrap();
    fleet.connect("CP-A").await.unwrap();

    let sent = wait_until(20, || async { mock.actions_for("CP-A").await.len() >= 3 }).await;
    assert!(sent, "expected three outbound frames within the poll window");

    let actions = mock.actions_for("CP-A").await;
    assert_eq!(actions, vec!["BootNotification", "StatusNotification", "StatusNotification"]);

    let log = mock.log_for("CP-A").await;
    assert_eq!(log[1].payload["connectorId"], 0);
    assert_eq!(log[1].payload["status"], "Available");
    assert_eq!(log[2].payload["connectorId"], 1);
    assert_eq!(log[2].payload["status"], "Available");

    fleet.disconnect("CP-A").await.unwrap();
}

#[tokio::test]
async fn scenario_2_full_transaction_flow() {
    let mock = MockCsms::start().await;
    let fleet = new_fleet("transaction", mock.ws_url(), Duration::from_millis(300)).await;

    let config = ChargerConfig::new("CP-A", "Acme", "X1");
    fleet.add_charger(config).await.unwrap();
    fleet.connect("CP-A").await.unwrap();
    wait_until(20, || async { mock.actions_for("CP-A").await.len() >= 3 }).await;

    fleet.plug_in_car("CP-A", 1, "generic-medium", 0.5).await.unwrap();
    let preparing = fleet.get_charger("CP-A").await.unwrap();
    assert_eq!(preparing.connectors[0].status, ConnectorStatus::Preparing);

    fleet
        .start_transaction("CP-A", 1, Some("TAG1".to_string()))
        .await
        .unwrap();

    let handshake_done = wait_until(40, || async {
        mock.actions_for("CP-A").await.iter().any(|x| x == "StartTransaction")
    })
    .await;
    assert!(handshake_done, "StartTransaction was not sent");

    let actions = mock.actions_for("CP-A").await;
    let authorize_pos = actions.iter().position(|a| a == "Authorize").unwrap();
    let start_pos = actions.iter().position(|a| a == "StartTransaction").unwrap();
    assert!(authorize_pos < start_pos, "Authorize must precede StartTransaction");

    let start_call = mock.log_for("CP-A").await.into_iter().find(|c| c.action == "StartTransaction").unwrap();
    assert_eq!(start_call.payload["connectorId"], 1);
    assert_eq!(start_call.payload["idTag"], "TAG1");
    assert_eq!(start_call.payload["meterStart"], 0);

    let charging = wait_until(120, || async {
        match fleet.get_charger("CP-A").await {
            Ok(s) => s.connectors[0].status == ConnectorStatus::Charging,
            Err(_) => false,
        }
    })
    .await;
    assert!(charging, "connector did not reach Charging within the poll window");

    let summary = fleet.get_charger("CP-A").await.unwrap();
    assert_eq!(summary.connectors[0].transaction_id, Some(42));

    fleet.set_charging_current("CP-A", 1, 16.0).await.unwrap();

    let meter_seen = wait_until(60, || async {
        mock.log_for("CP-A")
            .await
            .iter()
            .any(|c| c.action == "MeterValues" && c.payload["transactionId"] == 42)
    })
    .await;
    assert!(meter_seen, "no MeterValues observed for the active transaction");

    let meter_call = mock
        .log_for("CP-A")
        .await
        .into_iter()
        .find(|c| c.action == "MeterValues" && c.payload["transactionId"] == 42)
        .unwrap();
    let power: f64 = meter_call.payload["meterValue"][0]["sampledValue"]
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["measurand"] == "Power.Active.Import")
        .map(|v| v["value"].as_str().unwrap().parse().unwrap())
        .unwrap();
    // 230 V * (16 A +/- margin[0.5,1.5) +/- jitter[-0.2,0.2)), generously bounded.
    assert!(power > 2500.0 && power < 4200.0, "unexpected reported power: {power}");

    fleet.disconnect("CP-A").await.unwrap();
}

#[tokio::test]
async fn scenario_4_trigger_message() {
    let mock = MockCsms::start().await;
    let fleet = new_fleet("trigger", mock.ws_url(), Duration::from_secs(300)).await;

    let config = ChargerConfig::new("CP-A", "Acme", "X1");
    fleet.add_charger(config).await.unwrap();
    fleet.connect("CP-A").await.unwrap();
    wait_until(20, || async { mock.actions_for("CP-A").await.len() >= 2 }).await;

    let result = mock
        .call("CP-A", "TriggerMessage", json!({ "requestedMessage": "Heartbeat" }))
        .await;
    assert_eq!(result["status"], "Accepted");

    let heartbeat_sent = wait_until(20, || async {
        mock.actions_for("CP-A").await.iter().any(|x| x == "Heartbeat")
    })
    .await;
    assert!(heartbeat_sent, "expected a Heartbeat after TriggerMessage");

    fleet.disconnect("CP-A").await.unwrap();
}

#[tokio::test]
async fn scenario_5_get_configuration_filter() {
    let mock = MockCsms::start().await;
    let fleet = new_fleet("getconfig", mock.ws_url(), Duration::from_secs(300)).await;

    let config = ChargerConfig::new("CP-A", "Acme", "X1");
    fleet.add_charger(config).await.unwrap();
    fleet.connect("CP-A").await.unwrap();
    wait_until(20, || async { mock.actions_for("CP-A").await.len() >= 2 }).await;

    let result = mock
        .call("CP-A", "GetConfiguration", json!({ "key": ["HeartbeatInterval", "NoSuchKey"] }))
        .await;

    let configuration_key = result["configurationKey"].as_array().unwrap();
    assert_eq!(configuration_key.len(), 1);
    assert_eq!(configuration_key[0]["key"], "HeartbeatInterval");
    assert_eq!(configuration_key[0]["value"], "300");
    assert_eq!(configuration_key[0]["readonly"], false);
    assert_eq!(result["unknownKey"], json!(["NoSuchKey"]));

    fleet.disconnect("CP-A").await.unwrap();
}

#[tokio::test]
async fn scenario_6_bulk_rollout() {
    let mock = MockCsms::start().await;
    let fleet = new_fleet("bulk", mock.ws_url(), Duration::from_secs(300)).await;

    let base = {
        let mut c = ChargerConfig::new("placeholder", "Acme", "LoadTester");
        c.phases = 3;
        c.num_connectors = 1;
        c
    };
    let cp_ids = fleet.generate_chargers("LOAD", 3, base).await.unwrap();
    assert_eq!(cp_ids, vec!["LOAD-001", "LOAD-002", "LOAD-003"]);

    let result = fleet.connect_all().await;
    assert_eq!(result.success.len(), 3);
    assert!(result.failed.is_empty());

    for cp_id in &cp_ids {
        let ok = wait_until(20, || async { mock.actions_for(cp_id).await.len() >= 2 }).await;
        assert!(ok, "{cp_id} did not emit Boot+Status frames");
        let actions = mock.actions_for(cp_id).await;
        assert_eq!(actions, vec!["BootNotification", "StatusNotification", "StatusNotification"]);
        fleet.disconnect(cp_id).await.unwrap();
    }
}
