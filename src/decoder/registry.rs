//! DecoderRegistry: the named decode capabilities a host makes available to its nodes.
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info};

use super::PacketDecoder;

/// Name a node falls back to when its configuration does not pick a decoder.
pub const DEFAULT_DECODER: &str = "default";

#[derive(Clone, Default)]
pub struct DecoderRegistry {
    decoders: Arc<DashMap<String, Arc<dyn PacketDecoder>>>,
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `decoder` under [`DEFAULT_DECODER`].
    pub fn with_default(decoder: Arc<dyn PacketDecoder>) -> Self {
        let registry = Self::new();
        registry.register(DEFAULT_DECODER, decoder);
        registry
    }

    /// Registers a decoder under `name`. A decoder already registered under
    /// the same name is replaced.
    pub fn register(&self, name: impl Into<String>, decoder: Arc<dyn PacketDecoder>) {
        let name = name.into();
        if self.decoders.insert(name.clone(), decoder).is_some() {
            info!(decoder = %name, "replaced packet decoder");
        } else {
            debug!(decoder = %name, "registered packet decoder");
        }
    }

    /// Removes the decoder registered under `name`, if any.
    pub fn unregister(&self, name: &str) {
        self.decoders.remove(name);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn PacketDecoder>> {
        self.decoders.get(name).map(|entry| entry.value().clone())
    }

    /// Registered decoder names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.decoders.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field("decoders", &self.names())
            .finish()
    }
}
