//! String length limits shared across OCPP 1.6 message bodies.
//!
//! `rust_ocpp`'s request/response structs are foreign types and can't carry
//! a derived `validator::Validate` impl, so limits are enforced as plain
//! functions against the decoded `serde_json::Value` fields instead.

use crate::protocol::error::ProtocolError;

pub const LEN_20: usize = 20;
pub const LEN_25: usize = 25;
pub const LEN_50: usize = 50;
pub const LEN_255: usize = 255;
pub const LEN_500: usize = 500;

/// Rejects `value` if it exceeds `max` characters, naming `field` in the error.
pub fn check_len(field: &str, value: &str, max: usize) -> Result<(), ProtocolError> {
    if value.chars().count() > max {
        return Err(ProtocolError::SchemaValidation(format!(
            "{field} exceeds maximum length of {max} characters"
        )));
    }
    Ok(())
}

/// Same as [`check_len`] but tolerant of an absent optional field.
pub fn check_opt_len(field: &str, value: Option<&str>, max: usize) -> Result<(), ProtocolError> {
    match value {
        Some(v) => check_len(field, v, max),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_boundary() {
        let s = "a".repeat(LEN_20);
        assert!(check_len("idTag", &s, LEN_20).is_ok());
    }

    #[test]
    fn rejects_over_boundary() {
        let s = "a".repeat(LEN_20 + 1);
        assert!(check_len("idTag", &s, LEN_20).is_err());
    }

    #[test]
    fn opt_len_accepts_none() {
        assert!(check_opt_len("iccid", None, LEN_20).is_ok());
    }
}
