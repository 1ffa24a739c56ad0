//! Explicit registry mapping format identifiers to diffing codecs.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::diffing::{BytesDiffing, Diffing, JsonDiffing, LinesDiffing};
use crate::error::{CodecError, CodecResult};

/// Format identifier to codec mapping, populated by explicit registration.
#[derive(Clone, Default)]
pub struct CodecRegistry {
    codecs: BTreeMap<String, Arc<dyn Diffing>>,
}

impl CodecRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in `lines`, `json`, `bytes`, and `bincode` codecs.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(LinesDiffing));
        registry.register(Arc::new(JsonDiffing));
        registry.register(Arc::new(BytesDiffing::bytes()));
        registry.register(Arc::new(BytesDiffing::bincode()));
        registry
    }

    /// Register a codec under its own format identifier.
    ///
    /// Returns the codec previously registered under that identifier, if any.
    pub fn register(&mut self, codec: Arc<dyn Diffing>) -> Option<Arc<dyn Diffing>> {
        let format = codec.format().to_string();
        let previous = self.codecs.insert(format.clone(), codec);
        if previous.is_some() {
            debug!(format = %format, "replaced registered codec");
        }
        previous
    }

    /// Look up the codec for `format`.
    pub fn get(&self, format: &str) -> CodecResult<Arc<dyn Diffing>> {
        self.codecs
            .get(format)
            .cloned()
            .ok_or_else(|| CodecError::UnknownFormat(format.to_string()))
    }

    pub fn contains(&self, format: &str) -> bool {
        self.codecs.contains_key(format)
    }

    /// Registered format identifiers, sorted.
    pub fn formats(&self) -> Vec<&str> {
        self.codecs.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("formats", &self.formats())
            .finish()
    }
}
