//! Mutable runtime state for one managed charger, shared between the
//! session's read loop, the Fleet Manager's meter loop, and admin commands.

use rust_ocpp::v1_6::types::ChargePointErrorCode;

use crate::charger::config::ChargerConfig;
use crate::charger::config_table::ConfigTable;
use crate::charger::connector::ConnectorState;

#[derive(Debug, Clone)]
pub struct ChargerRuntime {
    pub config: ChargerConfig,
    pub connector_zero_status: rust_ocpp::v1_6::types::ChargePointStatus,
    pub connector_zero_error: ChargePointErrorCode,
    pub connectors: Vec<ConnectorState>,
    pub config_table: ConfigTable,
    pub local_list_version: i32,
}

impl ChargerRuntime {
    pub fn new(config: ChargerConfig) -> Self {
        let connectors = (1..=config.num_connectors).map(ConnectorState::new).collect();
        let config_table = ConfigTable::new(&config);
        Self {
            config,
            connector_zero_status: rust_ocpp::v1_6::types::ChargePointStatus::Available,
            connector_zero_error: ChargePointErrorCode::NoError,
            connectors,
            config_table,
            local_list_version: 0,
        }
    }

    pub fn connector_mut(&mut self, connector_id: u32) -> Option<&mut ConnectorState> {
        self.connectors.iter_mut().find(|c| c.connector_id == connector_id)
    }

    pub fn connector(&self, connector_id: u32) -> Option<&ConnectorState> {
        self.connectors.iter().find(|c| c.connector_id == connector_id)
    }
}
