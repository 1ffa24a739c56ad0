//! Serialization boundary for Snapline.
//!
//! A value becomes bytes through a [`Snapshotting`] strategy writing into a
//! write-only [`ByteContainer`]; persisted bytes come back as a read-only
//! container and are compared by a [`Diffing`] codec looked up by format in
//! an explicitly populated [`CodecRegistry`].
//!
//! # Built-in formats
//!
//! | format    | extension  | strategy(ies)                     |
//! |-----------|------------|-----------------------------------|
//! | `lines`   | `txt`      | [`LinesStrategy`], [`DebugStrategy`] |
//! | `json`    | `json`     | [`JsonStrategy`]                  |
//! | `bytes`   | `bin`      | [`BytesStrategy`]                 |
//! | `bincode` | `bincode`  | [`BincodeStrategy`]               |

pub mod container;
pub mod diffing;
pub mod error;
pub mod registry;
pub mod strategy;

pub use container::{ByteContainer, ContainerMode};
pub use diffing::{
    decode_bincode, decode_json, decode_text, BytesDiffing, DiffReport, Diffing, JsonDiffing,
    LinesDiffing, PATCH_ATTACHMENT,
};
pub use error::{CodecError, CodecResult};
pub use registry::CodecRegistry;
pub use strategy::{
    BincodeStrategy, BytesStrategy, DebugStrategy, JsonStrategy, LinesStrategy, Pullback,
    Snapshotting, FORMAT_BINCODE, FORMAT_BYTES, FORMAT_JSON, FORMAT_LINES,
};
