//! The `GetConfiguration`/`ChangeConfiguration` key/value table, seeded
//! from a charger's identity and a handful of fixed OCPP defaults.

use crate::charger::config::ChargerConfig;
use crate::protocol::registry::SUPPORTED_FEATURE_PROFILES;

#[derive(Debug, Clone)]
pub struct ConfigEntry {
    pub value: String,
    pub readonly: bool,
}

/// One charger's configuration key/value store. `readonly` keys reject
/// `ChangeConfiguration`; everything else is a plain overwrite.
#[derive(Debug, Clone)]
pub struct ConfigTable {
    entries: Vec<(String, ConfigEntry)>,
}

impl ConfigTable {
    pub fn new(config: &ChargerConfig) -> Self {
        let ro = |v: String| ConfigEntry { value: v, readonly: true };
        let rw = |v: String| ConfigEntry { value: v, readonly: false };

        let mut entries = vec![
            ("SupportedFeatureProfiles".to_string(), ro(SUPPORTED_FEATURE_PROFILES.to_string())),
            ("NumberOfConnectors".to_string(), ro(config.num_connectors.to_string())),
            ("HeartbeatInterval".to_string(), rw("300".to_string())),
            ("ConnectionTimeOut".to_string(), rw("60".to_string())),
            ("GetConfigurationMaxKeys".to_string(), ro("99".to_string())),
            ("MeterValueSampleInterval".to_string(), rw("15".to_string())),
            (
                "MeterValuesSampledData".to_string(),
                rw("Energy.Active.Import.Register,Power.Active.Import,Current.Import,Voltage".to_string()),
            ),
            ("MeterValuesAlignedData".to_string(), rw("Energy.Active.Import.Register".to_string())),
            ("ClockAlignedDataInterval".to_string(), rw("0".to_string())),
            ("AuthorizeRemoteTxRequests".to_string(), rw("false".to_string())),
            ("LocalAuthorizeOffline".to_string(), rw("true".to_string())),
            ("LocalPreAuthorize".to_string(), rw("false".to_string())),
            ("AuthorizationCacheEnabled".to_string(), rw("true".to_string())),
            ("StopTransactionOnEVSideDisconnect".to_string(), rw("true".to_string())),
            ("StopTransactionOnInvalidId".to_string(), rw("true".to_string())),
            ("UnlockConnectorOnEVSideDisconnect".to_string(), rw("true".to_string())),
            ("ChargeProfileMaxStackLevel".to_string(), ro("99".to_string())),
            ("ChargingScheduleAllowedChargingRateUnit".to_string(), ro("Current,Power".to_string())),
            ("ChargingScheduleMaxPeriods".to_string(), ro("24".to_string())),
            ("MaxChargingProfilesInstalled".to_string(), ro("10".to_string())),
            ("LocalAuthListEnabled".to_string(), rw("true".to_string())),
            ("LocalAuthListMaxLength".to_string(), ro("100".to_string())),
            ("SendLocalListMaxLength".to_string(), ro("100".to_string())),
            ("ReserveConnectorZeroSupported".to_string(), ro("true".to_string())),
            (
                "ConnectorPhaseRotation".to_string(),
                rw((0..=config.num_connectors).map(|n| format!("{n}.RST")).collect::<Vec<_>>().join(",")),
            ),
            (
                "ConnectorPhaseRotationMaxLength".to_string(),
                ro((config.num_connectors + 1).to_string()),
            ),
            ("ChargePointVendor".to_string(), ro(config.vendor.clone())),
            ("ChargePointModel".to_string(), ro(config.model.clone())),
        ];

        if let Some(serial) = &config.serial_number {
            entries.push(("ChargePointSerialNumber".to_string(), ro(serial.clone())));
        }
        if let Some(fw) = &config.firmware_version {
            entries.push(("FirmwareVersion".to_string(), ro(fw.clone())));
        }
        if let Some(meter_type) = &config.meter_type {
            entries.push(("MeterType".to_string(), ro(meter_type.clone())));
        }
        if let Some(meter_serial) = &config.meter_serial_number {
            entries.push(("MeterSerialNumber".to_string(), ro(meter_serial.clone())));
        }

        Self { entries }
    }

    /// Returns `(known, unknown)` for a `GetConfiguration` request. `None`
    /// (no key filter given) returns the whole table with no unknowns.
    pub fn get(&self, keys: Option<&[String]>) -> (Vec<(String, ConfigEntry)>, Vec<String>) {
        match keys {
            None => (self.entries.clone(), Vec::new()),
            Some(keys) => {
                let mut known = Vec::new();
                let mut unknown = Vec::new();
                for key in keys {
                    match self.entries.iter().find(|(k, _)| k == key) {
                        Some((k, entry)) => known.push((k.clone(), entry.clone())),
                        None => unknown.push(key.clone()),
                    }
                }
                (known, unknown)
            }
        }
    }

    /// `Ok(())` on acceptance, `Err(())` if `key` is unknown or readonly.
    pub fn set(&mut self, key: &str, value: String) -> Result<(), ()> {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, entry)) if !entry.readonly => {
                entry.value = value;
                Ok(())
            }
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_to_requested_keys_and_reports_unknown() {
        let config = ChargerConfig::new("CP-1", "Acme", "X1");
        let table = ConfigTable::new(&config);
        let (known, unknown) = table.get(Some(&["HeartbeatInterval".to_string(), "NoSuchKey".to_string()]));
        assert_eq!(known.len(), 1);
        assert_eq!(known[0].0, "HeartbeatInterval");
        assert_eq!(known[0].1.value, "300");
        assert_eq!(unknown, vec!["NoSuchKey".to_string()]);
    }

    #[test]
    fn readonly_key_rejects_change() {
        let config = ChargerConfig::new("CP-1", "Acme", "X1");
        let mut table = ConfigTable::new(&config);
        assert!(table.set("NumberOfConnectors", "5".to_string()).is_err());
    }

    #[test]
    fn rw_key_accepts_change() {
        let config = ChargerConfig::new("CP-1", "Acme", "X1");
        let mut table = ConfigTable::new(&config);
        assert!(table.set("HeartbeatInterval", "60".to_string()).is_ok());
        let (known, _) = table.get(Some(&["HeartbeatInterval".to_string()]));
        assert_eq!(known[0].1.value, "60");
    }

    #[test]
    fn unknown_key_rejects_change() {
        let config = ChargerConfig::new("CP-1", "Acme", "X1");
        let mut table = ConfigTable::new(&config);
        assert!(table.set("NoSuchKey", "x".to_string()).is_err());
    }
}
