//! Read-only view types returned across the admin boundary.

use rust_ocpp::v1_6::types::ChargePointErrorCode;
use serde::Serialize;

use crate::charger::config::ChargerConfig;
use crate::charger::connector::ConnectorStatus;

#[derive(Debug, Clone, Serialize)]
pub struct CarStatus {
    pub profile_id: String,
    pub profile_name: String,
    pub soc: f64,
    pub offered_current_a: f64,
    pub actual_current_a: f64,
    pub energy_delivered_wh: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectorSnapshot {
    pub connector_id: u32,
    pub status: ConnectorStatus,
    pub error_code: ChargePointErrorCode,
    pub offered_current_a: f64,
    pub reported_power_w: f64,
    pub energy_imported_wh: f64,
    pub transaction_id: Option<i32>,
    pub car: Option<CarStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChargerSummary {
    pub cp_id: String,
    pub config: ChargerConfig,
    pub connected: bool,
    pub connectors: Vec<ConnectorSnapshot>,
}

/// Aggregate result of a best-effort bulk/sequential operation across a set
/// of `cpId`s.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkResult {
    pub success: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl BulkResult {
    pub fn record(&mut self, cp_id: &str, result: Result<(), crate::fleet::error::AdminError>) {
        match result {
            Ok(()) => self.success.push(cp_id.to_string()),
            Err(e) => self.failed.push((cp_id.to_string(), e.to_string())),
        }
    }
}
