//! Action-name tables for both message directions.
//!
//! `Incoming` actions are CSMS → VCP requests the simulator must answer.
//! `Outgoing` actions are VCP → CSMS requests the simulator initiates.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Incoming,
    Outgoing,
}

/// A registered protocol action. The actual (de)serialization happens
/// against `rust_ocpp` typed structs at the call site; this descriptor only
/// carries the bookkeeping the dispatcher needs to route and log.
#[derive(Debug, Clone, Copy)]
pub struct MessageDescriptor {
    pub action: &'static str,
    pub direction: Direction,
}

/// CSMS-initiated actions this simulator answers.
pub const INCOMING_ACTIONS: &[&str] = &[
    "Reset",
    "TriggerMessage",
    "ChangeConfiguration",
    "GetConfiguration",
    "ChangeAvailability",
    "RemoteStartTransaction",
    "RemoteStopTransaction",
    "UnlockConnector",
    "DataTransfer",
    "ReserveNow",
    "CancelReservation",
    "SetChargingProfile",
    "ClearChargingProfile",
    "GetCompositeSchedule",
    "SendLocalList",
    "GetLocalListVersion",
];

/// VCP-initiated actions this simulator sends.
pub const OUTGOING_ACTIONS: &[&str] = &[
    "BootNotification",
    "Heartbeat",
    "StatusNotification",
    "Authorize",
    "StartTransaction",
    "StopTransaction",
    "MeterValues",
    "DataTransfer",
    "FirmwareStatusNotification",
    "DiagnosticsStatusNotification",
];

pub fn is_incoming_action(action: &str) -> bool {
    INCOMING_ACTIONS.contains(&action)
}

pub fn is_outgoing_action(action: &str) -> bool {
    OUTGOING_ACTIONS.contains(&action)
}

/// The `Core,FirmwareManagement,...` string reported by `GetConfiguration`'s
/// `SupportedFeatureProfiles` key, derived from the action tables rather
/// than hand-maintained twice.
pub const SUPPORTED_FEATURE_PROFILES: &str =
    "Core,FirmwareManagement,LocalAuthListManagement,Reservation,SmartCharging,RemoteTrigger";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_is_incoming() {
        assert!(is_incoming_action("Reset"));
        assert!(!is_outgoing_action("Reset"));
    }

    #[test]
    fn boot_notification_is_outgoing() {
        assert!(is_outgoing_action("BootNotification"));
        assert!(!is_incoming_action("BootNotification"));
    }

    #[test]
    fn unknown_action_is_neither() {
        assert!(!is_incoming_action("NoSuchAction"));
        assert!(!is_outgoing_action("NoSuchAction"));
    }
}
