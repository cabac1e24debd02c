pub mod registry;
pub mod script;

use serde_json::Value;
use thiserror::Error;

pub use registry::{DEFAULT_DECODER, DecoderRegistry};
pub use script::ScriptDecoder;

/// Turns a raw sensor packet into a structured value.
///
/// `offset` is whatever the inbound message carried, untouched; how it is
/// interpreted is up to the implementation.
pub trait PacketDecoder: Send + Sync {
    fn decode(&self, raw: &[u8], offset: Option<Value>) -> Result<Value, DecodeError>;
}

impl<F> PacketDecoder for F
where
    F: Fn(&[u8], Option<Value>) -> Result<Value, DecodeError> + Send + Sync,
{
    fn decode(&self, raw: &[u8], offset: Option<Value>) -> Result<Value, DecodeError> {
        self(raw, offset)
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not binary: {0}")]
    NotBinary(String),

    #[error("insufficient data: expected at least {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    #[error("unsupported packet type: {0:#04x}")]
    UnsupportedPacket(u8),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("decoder script error: {0}")]
    Script(String),
}
