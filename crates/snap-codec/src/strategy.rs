//! Snapshot strategies: how a value is turned into baseline bytes.
//!
//! A strategy names the diffing format its bytes are meant for; the
//! registry resolves that name to the codec that compares them.

use std::fmt::Debug;

use serde::Serialize;

use crate::container::ByteContainer;
use crate::error::{CodecError, CodecResult};

/// Format identifier for line-oriented UTF-8 text.
pub const FORMAT_LINES: &str = "lines";
/// Format identifier for pretty-printed JSON.
pub const FORMAT_JSON: &str = "json";
/// Format identifier for opaque bytes.
pub const FORMAT_BYTES: &str = "bytes";
/// Format identifier for bincode-encoded values.
pub const FORMAT_BINCODE: &str = "bincode";

/// Serialises values of type `V` into a write-only container.
pub trait Snapshotting<V: ?Sized> {
    /// Identifier of the diffing codec that understands the output.
    fn format(&self) -> &str;

    /// Write the snapshot of `value` into `out`.
    fn snapshot(&self, value: &V, out: &mut ByteContainer) -> CodecResult<()>;

    /// Adapt this strategy to another value type by first mapping it.
    fn pullback<U, F>(self, f: F) -> Pullback<Self, F>
    where
        Self: Sized,
        F: Fn(&U) -> V,
        V: Sized,
    {
        Pullback { inner: self, f }
    }
}

/// A strategy applied after a mapping function; see [`Snapshotting::pullback`].
#[derive(Clone, Debug)]
pub struct Pullback<S, F> {
    inner: S,
    f: F,
}

impl<U, V, S, F> Snapshotting<U> for Pullback<S, F>
where
    S: Snapshotting<V>,
    F: Fn(&U) -> V,
{
    fn format(&self) -> &str {
        self.inner.format()
    }

    fn snapshot(&self, value: &U, out: &mut ByteContainer) -> CodecResult<()> {
        let mapped = (self.f)(value);
        self.inner.snapshot(&mapped, out)
    }
}

/// Text as-is.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinesStrategy;

impl<V: AsRef<str> + ?Sized> Snapshotting<V> for LinesStrategy {
    fn format(&self) -> &str {
        FORMAT_LINES
    }

    fn snapshot(&self, value: &V, out: &mut ByteContainer) -> CodecResult<()> {
        out.write_str(value.as_ref())
    }
}

/// Pretty `Debug` dump (`{:#?}`) of any value.
#[derive(Clone, Copy, Debug, Default)]
pub struct DebugStrategy;

impl<V: Debug + ?Sized> Snapshotting<V> for DebugStrategy {
    fn format(&self) -> &str {
        FORMAT_LINES
    }

    fn snapshot(&self, value: &V, out: &mut ByteContainer) -> CodecResult<()> {
        out.write_str(&format!("{value:#?}"))
    }
}

/// Pretty-printed JSON with object keys sorted.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonStrategy;

impl<V: Serialize + ?Sized> Snapshotting<V> for JsonStrategy {
    fn format(&self) -> &str {
        FORMAT_JSON
    }

    fn snapshot(&self, value: &V, out: &mut ByteContainer) -> CodecResult<()> {
        // Going through `Value` sorts map keys, keeping output stable for
        // hash-ordered inputs.
        let tree = serde_json::to_value(value).map_err(|e| CodecError::Serialization(e.to_string()))?;
        let text = serde_json::to_string_pretty(&tree)
            .map_err(|e| CodecError::Serialization(e.to_string()))?;
        out.write_str(&text)
    }
}

/// Raw bytes as-is.
#[derive(Clone, Copy, Debug, Default)]
pub struct BytesStrategy;

impl<V: AsRef<[u8]> + ?Sized> Snapshotting<V> for BytesStrategy {
    fn format(&self) -> &str {
        FORMAT_BYTES
    }

    fn snapshot(&self, value: &V, out: &mut ByteContainer) -> CodecResult<()> {
        out.write(value.as_ref())
    }
}

/// Compact binary encoding via bincode.
#[derive(Clone, Copy, Debug, Default)]
pub struct BincodeStrategy;

impl<V: Serialize + ?Sized> Snapshotting<V> for BincodeStrategy {
    fn format(&self) -> &str {
        FORMAT_BINCODE
    }

    fn snapshot(&self, value: &V, out: &mut ByteContainer) -> CodecResult<()> {
        let bytes = bincode::serialize(value).map_err(|e| CodecError::Serialization(e.to_string()))?;
        out.write(&bytes)
    }
}
