//! Builders for VCP-initiated (Outgoing) message payloads.

use chrono::Utc;
use rust_ocpp::v1_6::messages::authorize::AuthorizeRequest;
use rust_ocpp::v1_6::messages::boot_notification::BootNotificationRequest;
use rust_ocpp::v1_6::messages::data_transfer::DataTransferRequest;
use rust_ocpp::v1_6::messages::diagnostics_status_notification::DiagnosticsStatusNotificationRequest;
use rust_ocpp::v1_6::messages::firmware_status_notification::FirmwareStatusNotificationRequest;
use rust_ocpp::v1_6::messages::heart_beat::HeartbeatRequest;
use rust_ocpp::v1_6::messages::meter_values::MeterValuesRequest;
use rust_ocpp::v1_6::messages::start_transaction::StartTransactionRequest;
use rust_ocpp::v1_6::messages::status_notification::StatusNotificationRequest;
use rust_ocpp::v1_6::messages::stop_transaction::StopTransactionRequest;
use rust_ocpp::v1_6::types::{ChargePointErrorCode, DiagnosticsStatus, FirmwareStatus, MeterValue, Reason};
use serde_json::Value;

use crate::charger::config::ChargerConfig;
use crate::charger::connector::ConnectorStatus;
use crate::protocol::validation::{check_len, check_opt_len, LEN_20};

fn to_value<T: serde::Serialize>(request: &T) -> Value {
    serde_json::to_value(request).expect("outbound OCPP request always serializes")
}

pub fn boot_notification(config: &ChargerConfig) -> Result<Value, String> {
    check_len("chargePointVendor", &config.vendor, LEN_20).map_err(|e| e.to_string())?;
    check_len("chargePointModel", &config.model, LEN_20).map_err(|e| e.to_string())?;

    Ok(to_value(&BootNotificationRequest {
        charge_point_vendor: config.vendor.clone(),
        charge_point_model: config.model.clone(),
        charge_point_serial_number: config.serial_number.clone(),
        charge_box_serial_number: None,
        firmware_version: config.firmware_version.clone(),
        iccid: config.iccid.clone(),
        imsi: config.imsi.clone(),
        meter_type: config.meter_type.clone(),
        meter_serial_number: config.meter_serial_number.clone(),
    }))
}

pub fn heartbeat() -> Value {
    to_value(&HeartbeatRequest {})
}

pub fn status_notification(
    connector_id: u32,
    status: ConnectorStatus,
    error_code: ChargePointErrorCode,
    info: Option<String>,
) -> Value {
    to_value(&StatusNotificationRequest {
        connector_id,
        error_code,
        info,
        status: status.as_ocpp(),
        timestamp: Some(Utc::now()),
        vendor_id: None,
        vendor_error_code: None,
    })
}

pub fn authorize(id_tag: &str) -> Result<Value, String> {
    check_len("idTag", id_tag, LEN_20).map_err(|e| e.to_string())?;
    Ok(to_value(&AuthorizeRequest {
        id_tag: id_tag.to_string(),
    }))
}

pub fn start_transaction(connector_id: u32, id_tag: &str, meter_start: i32) -> Result<Value, String> {
    check_len("idTag", id_tag, LEN_20).map_err(|e| e.to_string())?;
    Ok(to_value(&StartTransactionRequest {
        connector_id,
        id_tag: id_tag.to_string(),
        meter_start,
        reservation_id: None,
        timestamp: Utc::now(),
    }))
}

pub fn stop_transaction(
    transaction_id: i32,
    meter_stop: i32,
    id_tag: Option<String>,
    reason: Option<Reason>,
) -> Result<Value, String> {
    check_opt_len("idTag", id_tag.as_deref(), LEN_20).map_err(|e| e.to_string())?;
    Ok(to_value(&StopTransactionRequest {
        transaction_id,
        id_tag,
        meter_stop,
        timestamp: Utc::now(),
        reason,
        transaction_data: None,
    }))
}

pub fn meter_values(connector_id: u32, transaction_id: Option<i32>, meter_value: MeterValue) -> Value {
    to_value(&MeterValuesRequest {
        connector_id,
        transaction_id,
        meter_value: vec![meter_value],
    })
}

pub fn data_transfer(vendor_id: String, message_id: Option<String>, data: Option<String>) -> Value {
    to_value(&DataTransferRequest {
        vendor_string: vendor_id,
        message_id,
        data,
    })
}

pub fn firmware_status_notification(status: FirmwareStatus) -> Value {
    to_value(&FirmwareStatusNotificationRequest { status })
}

pub fn diagnostics_status_notification(status: DiagnosticsStatus) -> Value {
    to_value(&DiagnosticsStatusNotificationRequest { status })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_notification_rejects_oversized_vendor() {
        let mut config = ChargerConfig::new("CP-A", "a".repeat(21), "Model");
        config.num_connectors = 1;
        assert!(boot_notification(&config).is_err());
    }

    #[test]
    fn authorize_rejects_oversized_id_tag() {
        assert!(authorize(&"a".repeat(21)).is_err());
    }

    #[test]
    fn authorize_accepts_valid_id_tag() {
        let value = authorize("TAG1").unwrap();
        assert_eq!(value["idTag"], "TAG1");
    }
}
