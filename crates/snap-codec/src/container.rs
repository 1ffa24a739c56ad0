//! Mode-tagged byte container.
//!
//! A container is opened either for writing (a strategy serialises a value
//! into it) or for reading (a codec inspects persisted bytes). Using it
//! against its mode is an error rather than a silent no-op.

use std::fmt;

use crate::error::{CodecError, CodecResult};

/// Direction a [`ByteContainer`] was opened in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerMode {
    ReadOnly,
    WriteOnly,
}

impl fmt::Display for ContainerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => write!(f, "read-only"),
            Self::WriteOnly => write!(f, "write-only"),
        }
    }
}

/// Byte buffer that is either write-only or read-only.
#[derive(Clone, PartialEq, Eq)]
pub struct ByteContainer {
    mode: ContainerMode,
    data: Vec<u8>,
}

impl ByteContainer {
    /// An empty write-only container.
    pub fn writer() -> Self {
        Self {
            mode: ContainerMode::WriteOnly,
            data: Vec::new(),
        }
    }

    /// A read-only container over existing bytes.
    pub fn reader(data: impl Into<Vec<u8>>) -> Self {
        Self {
            mode: ContainerMode::ReadOnly,
            data: data.into(),
        }
    }

    pub fn mode(&self) -> ContainerMode {
        self.mode
    }

    /// Number of bytes held, regardless of mode.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append bytes. Fails on a read-only container.
    pub fn write(&mut self, bytes: &[u8]) -> CodecResult<()> {
        self.require(ContainerMode::WriteOnly, "write to")?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Append UTF-8 text. Fails on a read-only container.
    pub fn write_str(&mut self, text: &str) -> CodecResult<()> {
        self.write(text.as_bytes())
    }

    /// Borrow the bytes. Fails on a write-only container.
    pub fn bytes(&self) -> CodecResult<&[u8]> {
        self.require(ContainerMode::ReadOnly, "read from")?;
        Ok(&self.data)
    }

    /// Borrow the bytes as UTF-8 text. Fails on a write-only container or
    /// on invalid UTF-8.
    pub fn text(&self) -> CodecResult<&str> {
        std::str::from_utf8(self.bytes()?)
            .map_err(|e| CodecError::Serialization(format!("content is not valid UTF-8: {e}")))
    }

    /// Hand a finished write-only container over for reading.
    pub fn seal(self) -> Self {
        Self {
            mode: ContainerMode::ReadOnly,
            data: self.data,
        }
    }

    /// Take the raw bytes, e.g. to hand them to a baseline store.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    fn require(&self, mode: ContainerMode, operation: &'static str) -> CodecResult<()> {
        if self.mode == mode {
            Ok(())
        } else {
            Err(CodecError::ModeViolation {
                mode: self.mode,
                operation,
            })
        }
    }
}

impl fmt::Debug for ByteContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteContainer")
            .field("mode", &self.mode)
            .field("len", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_accepts_writes_and_rejects_reads() {
        let mut c = ByteContainer::writer();
        c.write(b"abc").unwrap();
        c.write_str("def").unwrap();
        assert_eq!(c.len(), 6);

        let err = c.bytes().unwrap_err();
        assert!(matches!(
            err,
            CodecError::ModeViolation {
                mode: ContainerMode::WriteOnly,
                ..
            }
        ));
        assert!(err.to_string().contains("operation not allowed"));
    }

    #[test]
    fn reader_accepts_reads_and_rejects_writes() {
        let mut c = ByteContainer::reader(b"hello".to_vec());
        assert_eq!(c.bytes().unwrap(), b"hello");
        assert_eq!(c.text().unwrap(), "hello");

        let err = c.write(b"!").unwrap_err();
        assert!(matches!(
            err,
            CodecError::ModeViolation {
                mode: ContainerMode::ReadOnly,
                ..
            }
        ));
        // The rejected write left the content untouched.
        assert_eq!(c.bytes().unwrap(), b"hello");
    }

    #[test]
    fn seal_turns_writer_into_reader() {
        let mut c = ByteContainer::writer();
        c.write_str("payload").unwrap();
        let sealed = c.seal();
        assert_eq!(sealed.mode(), ContainerMode::ReadOnly);
        assert_eq!(sealed.text().unwrap(), "payload");
    }

    #[test]
    fn invalid_utf8_is_a_serialization_error() {
        let c = ByteContainer::reader(vec![0xff, 0xfe]);
        assert!(matches!(c.text(), Err(CodecError::Serialization(_))));
    }

    #[test]
    fn into_bytes_ignores_mode() {
        let mut c = ByteContainer::writer();
        c.write(&[1, 2, 3]).unwrap();
        assert_eq!(c.into_bytes(), vec![1, 2, 3]);
    }
}
