//! OCPP-J message framing.
//!
//! Implements the OCPP-J (JSON over WebSocket) transport framing. This
//! framing is identical across OCPP versions:
//!
//! - **Call**       `[2, "<messageId>", "<action>", {<payload>}]`
//! - **CallResult** `[3, "<messageId>", {<payload>}]`
//! - **CallError**  `[4, "<messageId>", "<errorCode>", "<errorDescription>", {<errorDetails>}]`

use serde_json::Value;
use uuid::Uuid;

use crate::protocol::error::ProtocolError;
use crate::protocol::error_code::OcppErrorCode;

const MSG_TYPE_CALL: u64 = 2;
const MSG_TYPE_CALL_RESULT: u64 = 3;
const MSG_TYPE_CALL_ERROR: u64 = 4;

/// A parsed OCPP-J frame (version-agnostic transport envelope).
#[derive(Debug, Clone)]
pub enum OcppFrame {
    Call {
        message_id: String,
        action: String,
        payload: Value,
    },
    CallResult {
        message_id: String,
        payload: Value,
    },
    CallError {
        message_id: String,
        error_code: String,
        error_description: String,
        error_details: Value,
    },
}

impl OcppFrame {
    /// Build a fresh outbound Call with a new messageId.
    pub fn call(action: impl Into<String>, payload: Value) -> Self {
        Self::Call {
            message_id: Uuid::new_v4().to_string(),
            action: action.into(),
            payload,
        }
    }

    /// Build a CallResult carrying forward the original messageId.
    pub fn result(message_id: impl Into<String>, payload: Value) -> Self {
        Self::CallResult {
            message_id: message_id.into(),
            payload,
        }
    }

    /// Build a CallError for a given messageId.
    pub fn error(
        message_id: impl Into<String>,
        error_code: OcppErrorCode,
        error_description: impl Into<String>,
    ) -> Self {
        Self::CallError {
            message_id: message_id.into(),
            error_code: error_code.as_str().to_string(),
            error_description: error_description.into(),
            error_details: Value::Object(Default::default()),
        }
    }

    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let arr: Vec<Value> = serde_json::from_str(text)
            .map_err(|e| ProtocolError::ProtocolFraming(format!("invalid JSON: {e}")))?;

        if arr.is_empty() {
            return Err(ProtocolError::ProtocolFraming("empty message array".into()));
        }

        let msg_type = arr[0]
            .as_u64()
            .ok_or_else(|| ProtocolError::ProtocolFraming("message type is not a number".into()))?;

        match msg_type {
            MSG_TYPE_CALL => Self::parse_call(&arr),
            MSG_TYPE_CALL_RESULT => Self::parse_call_result(&arr),
            MSG_TYPE_CALL_ERROR => Self::parse_call_error(&arr),
            other => Err(ProtocolError::ProtocolFraming(format!(
                "unknown message type: {other}"
            ))),
        }
    }

    fn parse_call(arr: &[Value]) -> Result<Self, ProtocolError> {
        if arr.len() < 4 {
            return Err(ProtocolError::ProtocolFraming(format!(
                "Call frame expected 4 fields, got {}",
                arr.len()
            )));
        }
        let message_id = field_str(arr, 1, "messageId")?;
        let action = field_str(arr, 2, "action")?;
        let payload = arr[3].clone();
        Ok(Self::Call {
            message_id,
            action,
            payload,
        })
    }

    fn parse_call_result(arr: &[Value]) -> Result<Self, ProtocolError> {
        if arr.len() < 3 {
            return Err(ProtocolError::ProtocolFraming(format!(
                "CallResult frame expected 3 fields, got {}",
                arr.len()
            )));
        }
        let message_id = field_str(arr, 1, "messageId")?;
        let payload = arr.get(2).cloned().unwrap_or(Value::Object(Default::default()));
        Ok(Self::CallResult { message_id, payload })
    }

    fn parse_call_error(arr: &[Value]) -> Result<Self, ProtocolError> {
        if arr.len() < 4 {
            return Err(ProtocolError::ProtocolFraming(format!(
                "CallError frame expected 4 fields, got {}",
                arr.len()
            )));
        }
        let message_id = field_str(arr, 1, "messageId")?;
        let error_code = arr[2].as_str().unwrap_or("GenericError").to_string();
        let error_description = arr.get(3).and_then(|v| v.as_str()).unwrap_or("").to_string();
        let error_details = arr.get(4).cloned().unwrap_or(Value::Object(Default::default()));
        Ok(Self::CallError {
            message_id,
            error_code,
            error_description,
            error_details,
        })
    }

    /// Serialize to the wire JSON array, omitting absent optional fields
    /// (handled by the payload's own serde attributes, not here).
    pub fn serialize(&self) -> String {
        let arr = match self {
            Self::Call {
                message_id,
                action,
                payload,
            } => Value::Array(vec![
                Value::Number(MSG_TYPE_CALL.into()),
                Value::String(message_id.clone()),
                Value::String(action.clone()),
                payload.clone(),
            ]),
            Self::CallResult { message_id, payload } => Value::Array(vec![
                Value::Number(MSG_TYPE_CALL_RESULT.into()),
                Value::String(message_id.clone()),
                payload.clone(),
            ]),
            Self::CallError {
                message_id,
                error_code,
                error_description,
                error_details,
            } => Value::Array(vec![
                Value::Number(MSG_TYPE_CALL_ERROR.into()),
                Value::String(message_id.clone()),
                Value::String(error_code.clone()),
                Value::String(error_description.clone()),
                error_details.clone(),
            ]),
        };
        serde_json::to_string(&arr).expect("Value serialization never fails")
    }

    pub fn message_id(&self) -> &str {
        match self {
            Self::Call { message_id, .. }
            | Self::CallResult { message_id, .. }
            | Self::CallError { message_id, .. } => message_id,
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Self::Call { .. })
    }

    pub fn is_call_result(&self) -> bool {
        matches!(self, Self::CallResult { .. })
    }

    pub fn is_call_error(&self) -> bool {
        matches!(self, Self::CallError { .. })
    }
}

fn field_str(arr: &[Value], idx: usize, name: &'static str) -> Result<String, ProtocolError> {
    arr[idx]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ProtocolError::ProtocolFraming(format!("{name} must be a string")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_call() {
        let text = r#"[2,"abc123","BootNotification",{"chargePointVendor":"Vendor","chargePointModel":"Model"}]"#;
        let frame = OcppFrame::parse(text).unwrap();
        match frame {
            OcppFrame::Call {
                message_id,
                action,
                payload,
            } => {
                assert_eq!(message_id, "abc123");
                assert_eq!(action, "BootNotification");
                assert_eq!(payload["chargePointVendor"], "Vendor");
            }
            _ => panic!("expected Call"),
        }
    }

    #[test]
    fn parse_rejects_bad_type_indicator() {
        let text = r#"[9,"abc123","Whatever",{}]"#;
        assert!(OcppFrame::parse(text).is_err());
    }

    #[test]
    fn parse_rejects_non_array() {
        assert!(OcppFrame::parse(r#"{"not":"an array"}"#).is_err());
    }

    #[test]
    fn roundtrip_call_result() {
        let frame = OcppFrame::result("id2", serde_json::json!({"status": "Accepted"}));
        let text = frame.serialize();
        let parsed = OcppFrame::parse(&text).unwrap();
        assert!(parsed.is_call_result());
        assert_eq!(parsed.message_id(), "id2");
    }

    #[test]
    fn roundtrip_call_error() {
        let frame = OcppFrame::error("id3", OcppErrorCode::NotImplemented, "no such action");
        let text = frame.serialize();
        let parsed = OcppFrame::parse(&text).unwrap();
        assert!(parsed.is_call_error());
        match parsed {
            OcppFrame::CallError { error_code, .. } => assert_eq!(error_code, "NotImplemented"),
            _ => panic!("expected CallError"),
        }
    }

    #[test]
    fn call_generates_fresh_message_ids() {
        let a = OcppFrame::call("Heartbeat", serde_json::json!({}));
        let b = OcppFrame::call("Heartbeat", serde_json::json!({}));
        assert_ne!(a.message_id(), b.message_id());
    }
}
