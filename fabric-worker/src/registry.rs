//! [`TypeRegistry`] — pluggable name-to-decoder resolution (spec §9,
//! "Type resolution at decode time").
//!
//! The core never depends on a concrete schema; it only needs to know
//! whether a type name is known and how to move between bytes and the
//! decoded value passed to a [`crate::handler::ToolHandler`].

use std::collections::HashMap;

/// A decoder/encoder pair keyed by fully-qualified type name.
///
/// Handlers contribute types by registering them here; the core never
/// needs to change to support a new input/output shape.
pub trait TypeRegistry: Send + Sync {
    /// Whether `type_name` has a registered codec.
    fn is_registered(&self, type_name: &str) -> bool;

    /// Decode `bytes` as `type_name`. Only called after
    /// [`Self::is_registered`] has returned `true` for the same name.
    fn decode(&self, type_name: &str, bytes: &[u8]) -> Result<serde_json::Value, String>;

    /// Encode `value` for `type_name`.
    fn encode(&self, type_name: &str, value: &serde_json::Value) -> Result<Vec<u8>, String>;
}

/// A [`TypeRegistry`] that accepts any registered type name and decodes
/// its bytes as JSON. Sufficient for handlers whose input/output types
/// are themselves JSON-shaped records, which covers every handler in
/// this crate's test suite.
#[derive(Debug, Default)]
pub struct JsonTypeRegistry {
    known: HashMap<String, ()>,
}

impl JsonTypeRegistry {
    /// An empty registry — no type names are known until registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `type_name` as decodable/encodable as JSON.
    pub fn register(&mut self, type_name: impl Into<String>) -> &mut Self {
        self.known.insert(type_name.into(), ());
        self
    }
}

impl TypeRegistry for JsonTypeRegistry {
    fn is_registered(&self, type_name: &str) -> bool {
        self.known.contains_key(type_name)
    }

    fn decode(&self, _type_name: &str, bytes: &[u8]) -> Result<serde_json::Value, String> {
        serde_json::from_slice(bytes).map_err(|e| e.to_string())
    }

    fn encode(&self, _type_name: &str, value: &serde_json::Value) -> Result<Vec<u8>, String> {
        serde_json::to_vec(value).map_err(|e| e.to_string())
    }
}
