use ::serde::{Deserialize, Serialize};
use async_trait::async_trait;
use schemars::{JsonSchema, Schema, schema_for};
use tracing::{debug, warn};

use crate::{
    decoder::DEFAULT_DECODER,
    forward::decode_forward,
    message::Message,
    node::{NodeContext, NodeErr, NodeError, NodeOut, NodeType},
};

/// Decodes the raw sensor packet carried in a message and forwards the message.
///
/// The packet is read from `payload.payload_raw` when present, otherwise from
/// `payload`, and decoded by the decoder registered under `decoder` in the
/// host's registry, together with the message's `offset`. The decoded value
/// replaces `payload`; nothing else in the message changes. One message in,
/// one message out; a failed decode forwards nothing.
///
/// ```yaml
/// packetdecode:
///   decoder: default
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename = "packetdecode")]
pub struct PacketDecodeNode {
    /// Name of the registered decoder to use.
    #[serde(default = "PacketDecodeNode::default_decoder")]
    pub decoder: String,
}

impl PacketDecodeNode {
    pub fn new(decoder: impl Into<String>) -> Self {
        Self {
            decoder: decoder.into(),
        }
    }

    fn default_decoder() -> String {
        DEFAULT_DECODER.to_string()
    }
}

impl Default for PacketDecodeNode {
    fn default() -> Self {
        PacketDecodeNode::new(DEFAULT_DECODER)
    }
}

#[async_trait]
#[typetag::serde(name = "packetdecode")]
impl NodeType for PacketDecodeNode {
    fn type_name(&self) -> String {
        "packetdecode".to_string()
    }

    fn schema(&self) -> Schema {
        schema_for!(PacketDecodeNode)
    }

    #[tracing::instrument(name = "packetdecode_node_process", skip(self, context), fields(node = %context.node_id()))]
    async fn process(&self, input: Message, context: &mut NodeContext) -> Result<NodeOut, NodeErr> {
        let decoder = context.decoders().get(&self.decoder).ok_or_else(|| {
            warn!(decoder = %self.decoder, "decoder not registered");
            NodeErr::fail(NodeError::DecoderNotFound(self.decoder.clone()))
        })?;

        let msg = decode_forward(input, decoder.as_ref())
            .map_err(|e| NodeErr::fail(NodeError::Decode(e)))?;
        debug!("decoded payload {}", msg.payload());

        Ok(NodeOut::all(msg))
    }

    fn clone_box(&self) -> Box<dyn NodeType> {
        Box::new(self.clone())
    }
}
