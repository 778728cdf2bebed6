//! The transport-agnostic admin surface. A (deliberately out-of-scope)
//! HTTP layer would sit in front of this trait; the CLI console in
//! `main.rs` is the only consumer built into this crate.

use async_trait::async_trait;
use rust_ocpp::v1_6::types::{ChargePointErrorCode, Reason};

use crate::car::profile::CarProfile;
use crate::charger::config::ChargerConfig;
use crate::charger::connector::ConnectorStatus;
use crate::fleet::error::AdminError;
use crate::fleet::types::{BulkResult, CarStatus, ChargerSummary};

#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn list_chargers(&self) -> Vec<ChargerSummary>;
    async fn get_charger(&self, cp_id: &str) -> Result<ChargerSummary, AdminError>;
    async fn add_charger(&self, config: ChargerConfig) -> Result<(), AdminError>;
    async fn generate_chargers(
        &self,
        prefix: &str,
        count: u32,
        base: ChargerConfig,
    ) -> Result<Vec<String>, AdminError>;
    async fn remove_charger(&self, cp_id: &str) -> Result<(), AdminError>;

    async fn connect(&self, cp_id: &str) -> Result<(), AdminError>;
    async fn connect_all(&self) -> BulkResult;
    async fn disconnect(&self, cp_id: &str) -> Result<(), AdminError>;

    async fn set_connector_status(
        &self,
        cp_id: &str,
        connector_id: u32,
        status: ConnectorStatus,
        error_code: Option<ChargePointErrorCode>,
    ) -> Result<(), AdminError>;
    async fn set_charging_current(&self, cp_id: &str, connector_id: u32, amps: f64) -> Result<(), AdminError>;
    async fn set_transaction_id(
        &self,
        cp_id: &str,
        connector_id: u32,
        transaction_id: Option<i32>,
    ) -> Result<(), AdminError>;

    async fn start_transaction(
        &self,
        cp_id: &str,
        connector_id: u32,
        id_tag: Option<String>,
    ) -> Result<(), AdminError>;
    async fn stop_transaction(&self, cp_id: &str, connector_id: u32, reason: Option<Reason>) -> Result<(), AdminError>;
    async fn reset_energy(&self, cp_id: &str, connector_id: u32) -> Result<(), AdminError>;

    async fn plug_in_car(
        &self,
        cp_id: &str,
        connector_id: u32,
        profile_id: &str,
        initial_soc: f64,
    ) -> Result<(), AdminError>;
    async fn unplug_car(&self, cp_id: &str, connector_id: u32) -> Result<(), AdminError>;
    async fn get_car_status(&self, cp_id: &str, connector_id: u32) -> Result<Option<CarStatus>, AdminError>;
    async fn list_car_profiles(&self) -> Vec<CarProfile>;

    async fn bulk_set_connector_status(
        &self,
        cp_ids: &[String],
        connector_id: u32,
        status: ConnectorStatus,
        error_code: Option<ChargePointErrorCode>,
    ) -> BulkResult;
    async fn bulk_set_charging_current(&self, cp_ids: &[String], connector_id: u32, amps: f64) -> BulkResult;
    async fn bulk_send_change_configuration(&self, cp_ids: &[String], key: String, value: String) -> BulkResult;

    async fn get_ws_url(&self) -> String;
    async fn set_ws_url(&self, url: String);
}
