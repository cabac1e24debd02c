use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A message travelling between nodes.
///
/// Only `payload` is owned by the node that decodes it. Every other key,
/// `offset` included, lives in `fields` and is written back exactly as it
/// was read.
#[derive(Debug, Clone, PartialEq, JsonSchema, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    payload: Value,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Message {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            fields: Map::new(),
        }
    }

    pub fn with_offset(mut self, offset: Value) -> Self {
        self.fields.insert("offset".to_string(), offset);
        self
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn set_payload(&mut self, payload: Value) {
        self.payload = payload;
    }

    /// The auxiliary decode offset, `None` when the message carries none.
    pub fn offset(&self) -> Option<&Value> {
        self.fields.get("offset")
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}
