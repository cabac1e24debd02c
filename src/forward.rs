use tracing::debug;

use crate::{
    decoder::{DecodeError, PacketDecoder},
    message::Message,
    payload::RawPayload,
};

/// Decode the message payload and hand the message back for forwarding.
///
/// The raw packet is taken from `payload.payload_raw` when the payload is an
/// uplink envelope, otherwise from `payload` itself. The decoder receives it
/// together with the message's `offset`, and its result replaces the whole
/// `payload`. All other fields are left untouched. Decoder failures are
/// returned as they are.
pub fn decode_forward<D>(mut message: Message, decoder: &D) -> Result<Message, DecodeError>
where
    D: PacketDecoder + ?Sized,
{
    let raw = RawPayload::from_value(message.payload())?;
    if raw.is_wrapped() {
        debug!(len = raw.bytes().len(), "decoding payload_raw from envelope");
    }

    let decoded = decoder.decode(raw.bytes(), message.offset().cloned())?;
    message.set_payload(decoded);
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    /// Records every call and answers with a fixed value.
    struct Recording {
        calls: Mutex<Vec<(Vec<u8>, Option<Value>)>>,
        answer: Value,
    }

    impl Recording {
        fn answering(answer: Value) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                answer,
            }
        }

        fn calls(&self) -> Vec<(Vec<u8>, Option<Value>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PacketDecoder for Recording {
        fn decode(&self, raw: &[u8], offset: Option<Value>) -> Result<Value, DecodeError> {
            self.calls.lock().unwrap().push((raw.to_vec(), offset));
            Ok(self.answer.clone())
        }
    }

    #[test]
    fn wrapped_payload_with_offset() {
        let decoder = Recording::answering(json!({"type": "temp", "value": 21.5}));
        let input: Message = serde_json::from_value(json!({
            "payload": {"payload_raw": "AQDX"},
            "offset": 4
        }))
        .unwrap();

        let out = decode_forward(input, &decoder).unwrap();

        assert_eq!(decoder.calls(), vec![(vec![0x01, 0x00, 0xd7], Some(json!(4)))]);
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!({"payload": {"type": "temp", "value": 21.5}, "offset": 4})
        );
    }

    #[test]
    fn direct_payload_without_offset() {
        let decoder = Recording::answering(json!({"type": "battery", "value": 3.6}));
        let input: Message = serde_json::from_value(json!({"payload": [2, 36]})).unwrap();

        let out = decode_forward(input, &decoder).unwrap();

        assert_eq!(decoder.calls(), vec![(vec![2, 36], None)]);
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!({"payload": {"type": "battery", "value": 3.6}})
        );
    }

    #[test]
    fn envelope_siblings_are_replaced_with_the_payload() {
        let decoder = Recording::answering(json!("decoded"));
        let input: Message = serde_json::from_value(json!({
            "payload": {"payload_raw": [1], "port": 2, "dev_id": "kitchen"},
            "topic": "uplink",
            "offset": null
        }))
        .unwrap();

        let out = decode_forward(input, &decoder).unwrap();

        assert_eq!(decoder.calls(), vec![(vec![1], Some(Value::Null))]);
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!({"payload": "decoded", "topic": "uplink", "offset": null})
        );
    }

    #[test]
    fn decoder_failure_is_returned() {
        let failing = |_raw: &[u8], _offset: Option<Value>| -> Result<Value, DecodeError> {
            Err(DecodeError::UnsupportedPacket(0x7f))
        };
        let input = Message::new(json!([0x7f]));

        let err = decode_forward(input, &failing).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedPacket(0x7f)));
    }

    #[test]
    fn non_binary_payload_never_reaches_the_decoder() {
        let decoder = Recording::answering(json!(null));
        let input = Message::new(json!({"temp": 21})).with_offset(json!(0));

        let err = decode_forward(input, &decoder).unwrap_err();
        assert!(matches!(err, DecodeError::NotBinary(_)));
        assert!(decoder.calls().is_empty());
    }
}
