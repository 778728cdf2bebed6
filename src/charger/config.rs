//! Identity and capabilities of a virtual charger.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargerConfig {
    pub cp_id: String,
    pub vendor: String,
    pub model: String,
    pub serial_number: Option<String>,
    pub firmware_version: Option<String>,
    pub num_connectors: u32,
    pub phases: u8,
    pub meter_type: Option<String>,
    pub meter_serial_number: Option<String>,
    pub iccid: Option<String>,
    pub imsi: Option<String>,
}

impl ChargerConfig {
    pub fn new(cp_id: impl Into<String>, vendor: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            cp_id: cp_id.into(),
            vendor: vendor.into(),
            model: model.into(),
            serial_number: None,
            firmware_version: None,
            num_connectors: 1,
            phases: 1,
            meter_type: None,
            meter_serial_number: None,
            iccid: None,
            imsi: None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.num_connectors == 0 || self.num_connectors > 99 {
            return Err("numConnectors must be in [1,99]".to_string());
        }
        if self.phases != 1 && self.phases != 3 {
            return Err("phases must be 1 or 3".to_string());
        }
        Ok(())
    }
}
