use std::{fs, path::Path};

use rhai::{AST, Blob, Dynamic, Engine, Scope};
use serde_json::Value;
use tracing::trace;

use super::{DecodeError, PacketDecoder};

/// A decoder whose packet layout is described by a [Rhai](https://rhai.rs) script.
///
/// The script sees two variables:
///
/// - `bytes`: the raw packet as a blob (`bytes[0]`, `bytes.len()`, ...)
/// - `offset`: the message offset, `()` when the message has none
///
/// Its final value, converted to JSON, is the decoded payload. A script
/// rejects a packet with `throw`. A run is capped at [`MAX_OPERATIONS`] so a
/// script stuck in a loop fails the packet instead of stalling the host.
///
/// ```rhai
/// if bytes.len() < 2 { throw "short packet"; }
/// switch bytes[0] {
///     1 => #{ "type": "temp", "value": (bytes[1] * 256 + bytes[2]).to_float() / 10.0 },
///     2 => #{ "type": "battery", "value": bytes[1].to_float() / 10.0 },
///     _ => { throw "unknown packet type"; }
/// }
/// ```
pub struct ScriptDecoder {
    engine: Engine,
    ast: AST,
}

pub const MAX_OPERATIONS: u64 = 1_000_000;

impl ScriptDecoder {
    /// Compiles `source` once; syntax errors surface here rather than on the
    /// first packet.
    pub fn new(source: impl AsRef<str>) -> Result<Self, DecodeError> {
        let mut engine = Engine::new();
        engine.set_max_operations(MAX_OPERATIONS);
        let ast = engine
            .compile(source.as_ref())
            .map_err(|e| DecodeError::Script(e.to_string()))?;
        Ok(Self { engine, ast })
    }

    pub fn from_file(path: &Path) -> Result<Self, DecodeError> {
        let source = fs::read_to_string(path)
            .map_err(|e| DecodeError::Script(format!("cannot read {}: {}", path.display(), e)))?;
        Self::new(source)
    }
}

impl std::fmt::Debug for ScriptDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptDecoder")
            .field("max_operations", &self.engine.max_operations())
            .finish_non_exhaustive()
    }
}

impl PacketDecoder for ScriptDecoder {
    fn decode(&self, raw: &[u8], offset: Option<Value>) -> Result<Value, DecodeError> {
        let mut scope = Scope::new();

        let bytes: Blob = raw.to_vec();
        scope.push("bytes", bytes);
        let offset = match offset {
            Some(value) => rhai::serde::to_dynamic(&value)
                .map_err(|e| DecodeError::Script(format!("offset: {}", e)))?,
            None => Dynamic::UNIT,
        };
        scope.push_dynamic("offset", offset);

        let result = self
            .engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, &self.ast)
            .map_err(|e| DecodeError::Script(e.to_string()))?;
        trace!(len = raw.len(), "script decoder produced {}", result.type_name());

        rhai::serde::from_dynamic(&result)
            .map_err(|e| DecodeError::Script(format!("result is not JSON: {}", e)))
    }
}
