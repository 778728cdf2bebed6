//! Owns the `cpId → ManagedCharger` table and implements every admin
//! operation over it: roster CRUD, connect/disconnect, connector and
//! transaction control, and the fleet-side 15s meter loop.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use rand::Rng;
use rust_ocpp::v1_6::types::{ChargePointErrorCode, Reason};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

use crate::car::profile::{builtin_profiles, find_profile, CarProfile};
use crate::car::simulator::CarSimulator;
use crate::charger::config::ChargerConfig;
use crate::charger::connector::{ConnectorState, ConnectorStatus};
use crate::charger::meter::build_meter_value;
use crate::charger::runtime::ChargerRuntime;
use crate::fleet::admin::AdminApi;
use crate::fleet::error::AdminError;
use crate::fleet::roster::RosterStore;
use crate::fleet::types::{BulkResult, CarStatus, ChargerSummary, ConnectorSnapshot};
use crate::protocol::dispatch::Dispatcher;
use crate::protocol::envelope::OcppFrame;
use crate::session::flow;
use crate::session::messages;
use crate::session::vcp_session::VcpSession;
use crate::session::OcppVersion;

/// Pause between the WebSocket handshake completing and sending
/// `BootNotification`, matching the rest of the fleet's preference for
/// short settling delays over immediate back-to-back calls.
const CONNECT_SETTLE_DELAY: Duration = Duration::from_millis(200);

struct ManagedCharger {
    config: ChargerConfig,
    session: Option<VcpSession>,
    connected: bool,
    meter_timer: Option<JoinHandle<()>>,
}

impl ManagedCharger {
    fn new(config: ChargerConfig) -> Self {
        Self {
            config,
            session: None,
            connected: false,
            meter_timer: None,
        }
    }
}

pub struct FleetManager {
    chargers: DashMap<String, ManagedCharger>,
    roster: Arc<dyn RosterStore>,
    ws_url: Mutex<String>,
    dispatcher: Arc<Dispatcher>,
    call_timeout: Duration,
    meter_tick: Duration,
}

impl FleetManager {
    pub fn new(
        roster: Arc<dyn RosterStore>,
        ws_url: String,
        call_timeout: Duration,
        meter_tick: Duration,
    ) -> Result<Self, AdminError> {
        let chargers = DashMap::new();
        for config in roster.load()? {
            chargers.insert(config.cp_id.clone(), ManagedCharger::new(config));
        }
        Ok(Self {
            chargers,
            roster,
            ws_url: Mutex::new(ws_url),
            dispatcher: crate::session::default_dispatcher(),
            call_timeout,
            meter_tick,
        })
    }

    async fn persist_roster(&self) -> Result<(), AdminError> {
        let configs: Vec<ChargerConfig> = self.chargers.iter().map(|e| e.config.clone()).collect();
        self.roster.save(&configs)
    }

    fn connected_session(&self, cp_id: &str) -> Result<VcpSession, AdminError> {
        let entry = self.chargers.get(cp_id).ok_or_else(|| AdminError::NotFound(cp_id.to_string()))?;
        entry
            .session
            .clone()
            .ok_or_else(|| AdminError::InvalidArgument(format!("{cp_id} is not connected")))
    }

    async fn send_change_configuration(&self, cp_id: &str, key: &str, value: &str) -> Result<(), AdminError> {
        let session = self.connected_session(cp_id)?;
        let payload = serde_json::json!({ "key": key, "value": value });
        let response = session
            .call("ChangeConfiguration", payload)
            .await
            .map_err(|e| AdminError::InvalidArgument(e.to_string()))?;
        match response.get("status").and_then(|v| v.as_str()) {
            Some("Accepted") => Ok(()),
            other => Err(AdminError::InvalidArgument(format!(
                "ChangeConfiguration rejected for {cp_id}: {other:?}"
            ))),
        }
    }
}

fn connector_snapshot(c: &ConnectorState) -> ConnectorSnapshot {
    ConnectorSnapshot {
        connector_id: c.connector_id,
        status: c.status,
        error_code: c.error_code,
        offered_current_a: c.offered_current_a,
        reported_power_w: c.reported_power_w,
        energy_imported_wh: c.energy_imported_wh,
        transaction_id: c.transaction_id,
        car: c.car.as_ref().map(car_status),
    }
}

fn car_status(car: &CarSimulator) -> CarStatus {
    CarStatus {
        profile_id: car.profile.id.clone(),
        profile_name: car.profile.name.clone(),
        soc: car.soc,
        offered_current_a: car.offered_current_a,
        actual_current_a: car.actual_current_a,
        energy_delivered_wh: car.energy_delivered_wh,
    }
}

/// The Fleet Manager's own 15s-by-default meter loop. Ticks every
/// connector with an active transaction, advancing its car simulator (if
/// any) and emitting a `MeterValues` call.
async fn meter_tick_loop(session: VcpSession, runtime: Arc<Mutex<ChargerRuntime>>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let interval_secs = interval.as_secs_f64();
        let mut finished: Vec<u32> = Vec::new();
        {
            let mut guard = runtime.lock().await;
            let charger_phases = guard.config.phases;
            for connector in guard.connectors.iter_mut() {
                if connector.transaction_id.is_none()
                    || connector.status != ConnectorStatus::Charging
                    || connector.offered_current_a <= 0.0
                {
                    continue;
                }

                let has_car = connector.car.is_some();
                let (per_phase_current, effective_phases, soc) = if let Some(car) = connector.car.as_mut() {
                    let tick = car.tick(interval_secs);
                    connector.energy_imported_wh += tick.energy_increment_wh;
                    if tick.draw_a == 0.0 && car.soc >= 1.0 {
                        finished.push(connector.connector_id);
                    }
                    (tick.draw_a, car.effective_phases, Some(car.soc))
                } else {
                    (connector.offered_current_a, charger_phases, None)
                };

                let sample = build_meter_value(
                    chrono::Utc::now(),
                    interval_secs,
                    connector.energy_imported_wh,
                    connector.offered_current_a,
                    per_phase_current,
                    effective_phases,
                    soc,
                );
                if !has_car {
                    connector.energy_imported_wh += sample.energy_increment_wh;
                }
                connector.reported_power_w = sample.reported_power_w;

                let payload = serde_json::json!({
                    "connectorId": connector.connector_id,
                    "transactionId": connector.transaction_id,
                    "meterValue": [sample.meter_value],
                });
                session.send(OcppFrame::call("MeterValues", payload));
            }
        }

        for connector_id in finished {
            flow::set_connector_status(&session, connector_id, ConnectorStatus::SuspendedEV, ChargePointErrorCode::NoError)
                .await;
        }
    }
}

#[async_trait]
impl AdminApi for FleetManager {
    async fn list_chargers(&self) -> Vec<ChargerSummary> {
        let cp_ids: Vec<String> = self.chargers.iter().map(|e| e.key().clone()).collect();
        let mut summaries = Vec::with_capacity(cp_ids.len());
        for cp_id in cp_ids {
            if let Ok(summary) = self.get_charger(&cp_id).await {
                summaries.push(summary);
            }
        }
        summaries
    }

    async fn get_charger(&self, cp_id: &str) -> Result<ChargerSummary, AdminError> {
        let (config, connected, session) = {
            let entry = self.chargers.get(cp_id).ok_or_else(|| AdminError::NotFound(cp_id.to_string()))?;
            (entry.config.clone(), entry.connected, entry.session.clone())
        };
        let connectors = match session {
            Some(session) => {
                let runtime = session.runtime();
                let guard = runtime.lock().await;
                guard.connectors.iter().map(connector_snapshot).collect()
            }
            None => Vec::new(),
        };
        Ok(ChargerSummary {
            cp_id: cp_id.to_string(),
            config,
            connected,
            connectors,
        })
    }

    async fn add_charger(&self, config: ChargerConfig) -> Result<(), AdminError> {
        config.validate().map_err(AdminError::InvalidArgument)?;
        if self.chargers.contains_key(&config.cp_id) {
            return Err(AdminError::Conflict(config.cp_id.clone()));
        }
        self.chargers.insert(config.cp_id.clone(), ManagedCharger::new(config));
        self.persist_roster().await
    }

    async fn generate_chargers(&self, prefix: &str, count: u32, base: ChargerConfig) -> Result<Vec<String>, AdminError> {
        let mut cp_ids = Vec::with_capacity(count as usize);
        for n in 1..=count {
            let cp_id = format!("{prefix}-{n:03}");
            let mut config = base.clone();
            config.cp_id = cp_id.clone();
            self.add_charger(config).await?;
            cp_ids.push(cp_id);
        }
        Ok(cp_ids)
    }

    async fn remove_charger(&self, cp_id: &str) -> Result<(), AdminError> {
        let (_, mut managed) = self
            .chargers
            .remove(cp_id)
            .ok_or_else(|| AdminError::NotFound(cp_id.to_string()))?;
        if let Some(timer) = managed.meter_timer.take() {
            timer.abort();
        }
        managed.session = None;
        self.persist_roster().await
    }

    async fn connect(&self, cp_id: &str) -> Result<(), AdminError> {
        let config = {
            let entry = self.chargers.get(cp_id).ok_or_else(|| AdminError::NotFound(cp_id.to_string()))?;
            if entry.connected {
                return Err(AdminError::Conflict(format!("{cp_id} already connected")));
            }
            entry.config.clone()
        };

        let ws_url = self.ws_url.lock().await.clone();
        let session = VcpSession::connect(
            &ws_url,
            config.clone(),
            OcppVersion::V16,
            false,
            self.call_timeout,
            self.dispatcher.clone(),
        )
        .await
        .map_err(|e| AdminError::InvalidArgument(e.to_string()))?;

        tokio::time::sleep(CONNECT_SETTLE_DELAY).await;

        let boot_payload = messages::boot_notification(&config).map_err(AdminError::InvalidArgument)?;
        session
            .call("BootNotification", boot_payload)
            .await
            .map_err(|e| AdminError::InvalidArgument(e.to_string()))?;

        flow::set_connector_status(&session, 0, ConnectorStatus::Available, ChargePointErrorCode::NoError).await;
        for connector_id in 1..=config.num_connectors {
            flow::set_connector_status(&session, connector_id, ConnectorStatus::Available, ChargePointErrorCode::NoError).await;
        }

        let meter_timer = tokio::spawn(meter_tick_loop(session.clone(), session.runtime(), self.meter_tick));

        if let Some(mut entry) = self.chargers.get_mut(cp_id) {
            entry.session = Some(session);
            entry.connected = true;
            entry.meter_timer = Some(meter_timer);
        }
        info!(cp_id, "charger connected");
        Ok(())
    }

    async fn connect_all(&self) -> BulkResult {
        let cp_ids: Vec<String> = self.chargers.iter().map(|e| e.key().clone()).collect();
        let mut result = BulkResult::default();
        for cp_id in cp_ids {
            let outcome = self.connect(&cp_id).await;
            result.record(&cp_id, outcome);
        }
        result
    }

    async fn disconnect(&self, cp_id: &str) -> Result<(), AdminError> {
        let (session, timer) = {
            let mut entry = self.chargers.get_mut(cp_id).ok_or_else(|| AdminError::NotFound(cp_id.to_string()))?;
            let session = entry.session.take();
            let timer = entry.meter_timer.take();
            entry.connected = false;
            (session, timer)
        };
        if let Some(timer) = timer {
            timer.abort();
        }
        if let Some(session) = session {
            session.close();
        }
        Ok(())
    }

    async fn set_connector_status(
        &self,
        cp_id: &str,
        connector_id: u32,
        status: ConnectorStatus,
        error_code: Option<ChargePointErrorCode>,
    ) -> Result<(), AdminError> {
        let session = self.connected_session(cp_id)?;
        flow::set_connector_status(&session, connector_id, status, error_code.unwrap_or(ChargePointErrorCode::NoError)).await;
        Ok(())
    }

    async fn set_charging_current(&self, cp_id: &str, connector_id: u32, amps: f64) -> Result<(), AdminError> {
        let session = self.connected_session(cp_id)?;
        let runtime = session.runtime();
        let mut guard = runtime.lock().await;
        let phases = guard.config.phases;
        let connector = guard
            .connector_mut(connector_id)
            .ok_or_else(|| AdminError::NotFound(format!("connector {connector_id}")))?;
        connector.offered_current_a = amps;
        connector.reported_power_w = 230.0 * amps * phases as f64;
        if let Some(car) = connector.car.as_mut() {
            car.set_offered_current(amps);
        }
        Ok(())
    }

    async fn set_transaction_id(&self, cp_id: &str, connector_id: u32, transaction_id: Option<i32>) -> Result<(), AdminError> {
        let session = self.connected_session(cp_id)?;
        let runtime = session.runtime();
        let mut guard = runtime.lock().await;
        let connector = guard
            .connector_mut(connector_id)
            .ok_or_else(|| AdminError::NotFound(format!("connector {connector_id}")))?;
        connector.transaction_id = transaction_id;
        Ok(())
    }

    async fn start_transaction(&self, cp_id: &str, connector_id: u32, id_tag: Option<String>) -> Result<(), AdminError> {
        let session = self.connected_session(cp_id)?;
        let id_tag = id_tag.unwrap_or_else(|| "ADMIN".to_string());
        flow::start_transaction(session, connector_id, id_tag).await.map_err(|e| match e {
            flow::FlowError::AlreadyActive => AdminError::Conflict(e.to_string()),
            flow::FlowError::UnknownConnector => AdminError::NotFound(e.to_string()),
        })
    }

    async fn stop_transaction(&self, cp_id: &str, connector_id: u32, reason: Option<Reason>) -> Result<(), AdminError> {
        let session = self.connected_session(cp_id)?;
        flow::stop_transaction_on_connector(session, connector_id, reason).await;
        Ok(())
    }

    async fn reset_energy(&self, cp_id: &str, connector_id: u32) -> Result<(), AdminError> {
        let session = self.connected_session(cp_id)?;
        let runtime = session.runtime();
        let mut guard = runtime.lock().await;
        let connector = guard
            .connector_mut(connector_id)
            .ok_or_else(|| AdminError::NotFound(format!("connector {connector_id}")))?;
        connector.reset_energy();
        Ok(())
    }

    async fn plug_in_car(&self, cp_id: &str, connector_id: u32, profile_id: &str, initial_soc: f64) -> Result<(), AdminError> {
        let session = self.connected_session(cp_id)?;
        let profile = find_profile(profile_id).ok_or_else(|| AdminError::InvalidArgument(format!("unknown car profile: {profile_id}")))?;

        let already_preparing = {
            let runtime = session.runtime();
            let mut guard = runtime.lock().await;
            let phases = guard.config.phases;
            let has_transaction = guard.connector(connector_id).map(|c| c.transaction_id.is_some()).unwrap_or(false);
            let connector = guard
                .connector_mut(connector_id)
                .ok_or_else(|| AdminError::NotFound(format!("connector {connector_id}")))?;
            connector.car = Some(CarSimulator::new(profile, phases, initial_soc));
            has_transaction
        };

        if already_preparing {
            flow::set_connector_status(&session, connector_id, ConnectorStatus::SuspendedEV, ChargePointErrorCode::NoError).await;
            let delay_ms = rand::thread_rng().gen_range(2000..=3000);
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            flow::set_connector_status(&session, connector_id, ConnectorStatus::Charging, ChargePointErrorCode::NoError).await;
        } else {
            flow::set_connector_status(&session, connector_id, ConnectorStatus::Preparing, ChargePointErrorCode::NoError).await;
        }
        Ok(())
    }

    async fn unplug_car(&self, cp_id: &str, connector_id: u32) -> Result<(), AdminError> {
        let session = self.connected_session(cp_id)?;
        let has_transaction = {
            let runtime = session.runtime();
            let mut guard = runtime.lock().await;
            let connector = guard
                .connector_mut(connector_id)
                .ok_or_else(|| AdminError::NotFound(format!("connector {connector_id}")))?;
            connector.car = None;
            connector.transaction_id.is_some()
        };
        let next = if has_transaction { ConnectorStatus::Preparing } else { ConnectorStatus::Available };
        flow::set_connector_status(&session, connector_id, next, ChargePointErrorCode::NoError).await;
        Ok(())
    }

    async fn get_car_status(&self, cp_id: &str, connector_id: u32) -> Result<Option<CarStatus>, AdminError> {
        let session = self.connected_session(cp_id)?;
        let runtime = session.runtime();
        let guard = runtime.lock().await;
        let connector = guard
            .connector(connector_id)
            .ok_or_else(|| AdminError::NotFound(format!("connector {connector_id}")))?;
        Ok(connector.car.as_ref().map(car_status))
    }

    async fn list_car_profiles(&self) -> Vec<CarProfile> {
        builtin_profiles()
    }

    async fn bulk_set_connector_status(
        &self,
        cp_ids: &[String],
        connector_id: u32,
        status: ConnectorStatus,
        error_code: Option<ChargePointErrorCode>,
    ) -> BulkResult {
        let mut result = BulkResult::default();
        for cp_id in cp_ids {
            let outcome = self.set_connector_status(cp_id, connector_id, status, error_code).await;
            result.record(cp_id, outcome);
        }
        result
    }

    async fn bulk_set_charging_current(&self, cp_ids: &[String], connector_id: u32, amps: f64) -> BulkResult {
        let mut result = BulkResult::default();
        for cp_id in cp_ids {
            let outcome = self.set_charging_current(cp_id, connector_id, amps).await;
            result.record(cp_id, outcome);
        }
        result
    }

    async fn bulk_send_change_configuration(&self, cp_ids: &[String], key: String, value: String) -> BulkResult {
        let mut result = BulkResult::default();
        for cp_id in cp_ids {
            let outcome = self.send_change_configuration(cp_id, &key, &value).await;
            result.record(cp_id, outcome);
        }
        result
    }

    async fn get_ws_url(&self) -> String {
        self.ws_url.lock().await.clone()
    }

    async fn set_ws_url(&self, url: String) {
        *self.ws_url.lock().await = url;
    }
}
