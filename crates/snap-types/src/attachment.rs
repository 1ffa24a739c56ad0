use serde::{Deserialize, Serialize};

/// A named blob of bytes attached to a verification report.
///
/// Attachments carry the artifacts a reporter may want to surface next to a
/// failure message: the rendered patch, the rejected candidate, and so on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedBytes {
    /// Attachment name, e.g. `"difference.patch"`.
    pub name: String,
    /// Raw attachment content.
    pub data: Vec<u8>,
}

impl NamedBytes {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Convenience constructor for UTF-8 text attachments.
    pub fn text(name: impl Into<String>, text: impl AsRef<str>) -> Self {
        Self::new(name, text.as_ref().as_bytes().to_vec())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
