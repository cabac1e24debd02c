use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::Value;

use crate::decoder::DecodeError;

/// The binary part of an inbound payload, as handed to a decoder.
///
/// A payload either is the raw packet itself, or is an uplink envelope
/// that carries the packet under `payload_raw`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPayload {
    Direct(Vec<u8>),
    Wrapped { payload_raw: Vec<u8> },
}

impl RawPayload {
    /// Pick the raw packet out of a message payload.
    ///
    /// An object whose `payload_raw` is set to something other than `null`,
    /// `false`, `0` or `""` is an envelope; anything else is taken as the
    /// packet itself. Empty arrays and buffers still mark an envelope.
    pub fn from_value(payload: &Value) -> Result<Self, DecodeError> {
        match payload.get("payload_raw") {
            Some(raw) if is_set(raw) => Ok(RawPayload::Wrapped {
                payload_raw: binary_from_value(raw)?,
            }),
            _ => Ok(RawPayload::Direct(binary_from_value(payload)?)),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            RawPayload::Direct(bytes) => bytes,
            RawPayload::Wrapped { payload_raw } => payload_raw,
        }
    }

    pub fn is_wrapped(&self) -> bool {
        matches!(self, RawPayload::Wrapped { .. })
    }
}

/// Read raw bytes from their JSON form: a base64 string, an array of
/// octets, or a serialized buffer `{"type":"Buffer","data":[..]}`.
pub fn binary_from_value(value: &Value) -> Result<Vec<u8>, DecodeError> {
    match value {
        Value::String(encoded) => STANDARD
            .decode(encoded.trim())
            .map_err(|e| DecodeError::NotBinary(format!("invalid base64: {}", e))),
        Value::Array(items) => octets(items),
        Value::Object(obj) if obj.get("type").and_then(Value::as_str) == Some("Buffer") => {
            match obj.get("data") {
                Some(Value::Array(items)) => octets(items),
                _ => Err(DecodeError::NotBinary(
                    "buffer object without a data array".to_string(),
                )),
            }
        }
        Value::Null => Err(DecodeError::NotBinary("payload is null".to_string())),
        other => Err(DecodeError::NotBinary(format!(
            "expected base64 string, octet array or buffer, got {}",
            kind_of(other)
        ))),
    }
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn octets(items: &[Value]) -> Result<Vec<u8>, DecodeError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| DecodeError::NotBinary(format!("element {} is not an octet: {}", i, item)))
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn direct_base64_string() {
        let raw = RawPayload::from_value(&json!("AQLX")).unwrap();
        assert_eq!(raw, RawPayload::Direct(vec![0x01, 0x02, 0xd7]));
        assert!(!raw.is_wrapped());
    }

    #[test]
    fn direct_octet_array() {
        let raw = RawPayload::from_value(&json!([1, 0, 215])).unwrap();
        assert_eq!(raw.bytes(), &[1, 0, 215]);
    }

    #[test]
    fn direct_buffer_object() {
        let raw = RawPayload::from_value(&json!({"type": "Buffer", "data": [9, 8]})).unwrap();
        assert_eq!(raw, RawPayload::Direct(vec![9, 8]));
    }

    #[test]
    fn wrapped_envelope_uses_payload_raw_only() {
        let payload = json!({
            "payload_raw": "AQLX",
            "port": 1,
            "dev_id": "kitchen"
        });
        let raw = RawPayload::from_value(&payload).unwrap();
        assert_eq!(
            raw,
            RawPayload::Wrapped {
                payload_raw: vec![0x01, 0x02, 0xd7]
            }
        );
    }

    #[test]
    fn null_payload_raw_falls_back_to_whole_payload() {
        let payload = json!({"payload_raw": null, "type": "Buffer", "data": [7]});
        let raw = RawPayload::from_value(&payload).unwrap();
        assert_eq!(raw, RawPayload::Direct(vec![7]));
    }

    #[test]
    fn unset_payload_raw_falls_back_to_whole_payload() {
        for unset in [json!(""), json!(false), json!(0), json!(0.0)] {
            let payload = json!({"payload_raw": unset, "type": "Buffer", "data": [7]});
            let raw = RawPayload::from_value(&payload).unwrap();
            assert_eq!(raw, RawPayload::Direct(vec![7]), "payload_raw = {unset}");
        }
    }

    #[test]
    fn empty_array_payload_raw_is_still_an_envelope() {
        let payload = json!({"payload_raw": [], "port": 1});
        let raw = RawPayload::from_value(&payload).unwrap();
        assert_eq!(raw, RawPayload::Wrapped { payload_raw: vec![] });
    }

    #[test]
    fn empty_buffer_payload_raw_is_still_an_envelope() {
        let payload = json!({"payload_raw": {"type": "Buffer", "data": []}});
        let raw = RawPayload::from_value(&payload).unwrap();
        assert_eq!(raw, RawPayload::Wrapped { payload_raw: vec![] });
    }

    #[test]
    fn non_binary_values_are_rejected() {
        for value in [json!(null), json!(42), json!(true), json!({"temp": 21})] {
            let err = RawPayload::from_value(&value).unwrap_err();
            assert!(matches!(err, DecodeError::NotBinary(_)), "{value}: {err}");
        }
    }

    #[test]
    fn out_of_range_octet_is_rejected() {
        let err = binary_from_value(&json!([1, 256])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "payload is not binary: element 1 is not an octet: 256"
        );
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let err = binary_from_value(&json!("not base64!")).unwrap_err();
        assert!(matches!(err, DecodeError::NotBinary(_)));
    }
}
