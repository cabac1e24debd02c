use std::fmt::{self, Debug};

use async_trait::async_trait;
use schemars::Schema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    decoder::{DecodeError, DecoderRegistry},
    message::Message,
};

/// A node the host can instantiate from configuration and feed messages.
///
/// Implementations register themselves with `#[typetag::serde(name = "...")]`;
/// that name is the key a node configuration is written under.
#[async_trait]
#[typetag::serde]
pub trait NodeType: Send + Sync + Debug {
    fn type_name(&self) -> String;
    /// Return this concrete type’s configuration schema.
    fn schema(&self) -> Schema;
    async fn process(&self, msg: Message, ctx: &mut NodeContext) -> Result<NodeOut, NodeErr>;
    fn clone_box(&self) -> Box<dyn NodeType>;
}

#[derive(Serialize, Deserialize)]
pub struct Node(pub Box<dyn NodeType>);

impl std::ops::Deref for Node {
    type Target = dyn NodeType;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        Node(self.0.clone_box())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Node").field(&self.0).finish()
    }
}

/// What the host hands a node on every invocation.
#[derive(Clone, Debug)]
pub struct NodeContext {
    node_id: String,
    decoders: DecoderRegistry,
}

impl NodeContext {
    pub fn new(node_id: impl Into<String>, decoders: DecoderRegistry) -> Self {
        Self {
            node_id: node_id.into(),
            decoders,
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn decoders(&self) -> &DecoderRegistry {
        &self.decoders
    }
}

/// Where the host sends a node's output next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routing {
    /// Deliver to the node's downstream connections.
    FollowGraph,
    /// Deliver nowhere.
    EndFlow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeOut {
    message: Message,
    routing: Routing,
}

impl NodeOut {
    /// Forward `message` along every outgoing connection.
    pub fn all(message: Message) -> Self {
        Self {
            message,
            routing: Routing::FollowGraph,
        }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn into_message(self) -> Message {
        self.message
    }

    pub fn routing(&self) -> &Routing {
        &self.routing
    }
}

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("no decoder registered under `{0}`")]
    DecoderNotFound(String),

    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Error)]
#[error("{error}")]
pub struct NodeErr {
    error: NodeError,
    routing: Routing,
}

impl NodeErr {
    /// A failure that stops the message here.
    pub fn fail(error: NodeError) -> Self {
        Self {
            error,
            routing: Routing::EndFlow,
        }
    }

    pub fn error(&self) -> &NodeError {
        &self.error
    }

    pub fn routing(&self) -> &Routing {
        &self.routing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_end_the_flow() {
        let err = NodeErr::fail(NodeError::DecoderNotFound("lpp".to_string()));
        assert_eq!(err.routing(), &Routing::EndFlow);
        assert_eq!(err.to_string(), "no decoder registered under `lpp`");
    }

    #[test]
    fn decode_errors_convert() {
        let err: NodeError = DecodeError::InvalidPayload("bad crc".to_string()).into();
        assert_eq!(err.to_string(), "decode failed: invalid payload: bad crc");
    }

    #[test]
    fn context_exposes_node_and_decoders() {
        let ctx = NodeContext::new("decode-1", DecoderRegistry::new());
        assert_eq!(ctx.node_id(), "decode-1");
        assert!(ctx.decoders().names().is_empty());
    }
}
