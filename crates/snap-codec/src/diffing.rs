//! Diffing codecs: compare a persisted baseline against a fresh candidate.

use serde::de::DeserializeOwned;
use serde_json::Value;
use snap_diff::diff_lines;
use snap_types::NamedBytes;

use crate::container::ByteContainer;
use crate::error::{CodecError, CodecResult};
use crate::strategy::{FORMAT_BINCODE, FORMAT_BYTES, FORMAT_JSON, FORMAT_LINES};

/// Name of the patch attachment produced by text codecs.
pub const PATCH_ATTACHMENT: &str = "difference.patch";

/// Human-readable description of how a candidate differs from its baseline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffReport {
    /// Report body (for text formats, the rendered hunks).
    pub message: String,
    /// Artifacts supporting the report.
    pub attachments: Vec<NamedBytes>,
}

/// Compares two snapshots of one format.
///
/// The trait is object-safe and `Send + Sync` so codecs can live in a
/// shared [`CodecRegistry`](crate::CodecRegistry).
pub trait Diffing: Send + Sync {
    /// Registry identifier, e.g. `"lines"`.
    fn format(&self) -> &str;

    /// File extension for baselines of this format, without the dot.
    fn path_extension(&self) -> &str;

    /// Compare read-only `baseline` and `candidate` containers.
    ///
    /// Returns `Ok(None)` when they match. Malformed bytes on either side
    /// are a [`CodecError::Serialization`], never a mismatch.
    fn compare(
        &self,
        baseline: &ByteContainer,
        candidate: &ByteContainer,
        context: usize,
    ) -> CodecResult<Option<DiffReport>>;
}

/// Decode a read-only container as UTF-8 text.
pub fn decode_text(container: &ByteContainer) -> CodecResult<String> {
    container.text().map(str::to_string)
}

/// Decode a read-only container as JSON into `T`.
pub fn decode_json<T: DeserializeOwned>(container: &ByteContainer) -> CodecResult<T> {
    serde_json::from_slice(container.bytes()?)
        .map_err(|e| CodecError::Serialization(format!("invalid JSON: {e}")))
}

/// Decode a read-only container as bincode into `T`.
pub fn decode_bincode<T: DeserializeOwned>(container: &ByteContainer) -> CodecResult<T> {
    bincode::deserialize(container.bytes()?)
        .map_err(|e| CodecError::Serialization(format!("invalid bincode: {e}")))
}

fn text_report(baseline: &str, candidate: &str, context: usize) -> Option<DiffReport> {
    let diff = diff_lines(baseline, candidate, context);
    if diff.is_empty() {
        return None;
    }
    let patch = diff.render();
    Some(DiffReport {
        attachments: vec![NamedBytes::text(PATCH_ATTACHMENT, &patch)],
        message: patch,
    })
}

/// Line-oriented text comparison.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinesDiffing;

impl Diffing for LinesDiffing {
    fn format(&self) -> &str {
        FORMAT_LINES
    }

    fn path_extension(&self) -> &str {
        "txt"
    }

    fn compare(
        &self,
        baseline: &ByteContainer,
        candidate: &ByteContainer,
        context: usize,
    ) -> CodecResult<Option<DiffReport>> {
        let old = baseline.text()?;
        let new = candidate.text()?;
        if old == new {
            return Ok(None);
        }
        Ok(text_report(old, new, context))
    }
}

/// Semantic JSON comparison; differences are shown on the pretty-printed form.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonDiffing;

impl JsonDiffing {
    fn pretty(value: &Value) -> CodecResult<String> {
        serde_json::to_string_pretty(value).map_err(|e| CodecError::Serialization(e.to_string()))
    }
}

impl Diffing for JsonDiffing {
    fn format(&self) -> &str {
        FORMAT_JSON
    }

    fn path_extension(&self) -> &str {
        "json"
    }

    fn compare(
        &self,
        baseline: &ByteContainer,
        candidate: &ByteContainer,
        context: usize,
    ) -> CodecResult<Option<DiffReport>> {
        let old: Value = decode_json(baseline)?;
        let new: Value = decode_json(candidate)?;
        if old == new {
            return Ok(None);
        }
        Ok(text_report(&Self::pretty(&old)?, &Self::pretty(&new)?, context))
    }
}

/// Exact byte comparison for opaque formats.
#[derive(Clone, Debug)]
pub struct BytesDiffing {
    format: String,
    extension: String,
}

impl BytesDiffing {
    pub fn new(format: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            extension: extension.into(),
        }
    }

    /// Codec for the `bytes` format (`.bin`).
    pub fn bytes() -> Self {
        Self::new(FORMAT_BYTES, "bin")
    }

    /// Codec for the `bincode` format (`.bincode`).
    pub fn bincode() -> Self {
        Self::new(FORMAT_BINCODE, "bincode")
    }

    fn describe(label: &str, data: &[u8]) -> String {
        let digest = blake3::hash(data);
        format!(
            "{label}: {} bytes, blake3 {}",
            data.len(),
            hex::encode(&digest.as_bytes()[..8])
        )
    }
}

impl Diffing for BytesDiffing {
    fn format(&self) -> &str {
        &self.format
    }

    fn path_extension(&self) -> &str {
        &self.extension
    }

    fn compare(
        &self,
        baseline: &ByteContainer,
        candidate: &ByteContainer,
        _context: usize,
    ) -> CodecResult<Option<DiffReport>> {
        let old = baseline.bytes()?;
        let new = candidate.bytes()?;
        if old == new {
            return Ok(None);
        }

        let first_difference = old
            .iter()
            .zip(new.iter())
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| old.len().min(new.len()));
        let message = format!(
            "binary content differs at byte {first_difference}\n{}\n{}",
            Self::describe("baseline", old),
            Self::describe("candidate", new)
        );

        Ok(Some(DiffReport {
            message,
            attachments: vec![
                NamedBytes::new(format!("baseline.{}", self.extension), old.to_vec()),
                NamedBytes::new(format!("candidate.{}", self.extension), new.to_vec()),
            ],
        }))
    }
}
