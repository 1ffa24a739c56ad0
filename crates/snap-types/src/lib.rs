//! Foundation types for Snapline.
//!
//! This crate provides the vocabulary shared by every other Snapline crate:
//! how a baseline is named, which record mode governs it, and how the engine
//! is configured. Every other `snap-*` crate depends on `snap-types`.
//!
//! # Key Types
//!
//! - [`RecordMode`] -- Policy governing whether a baseline may be created or overwritten
//! - [`BaselineId`] -- Stable identifier (suite, test, discriminator, extension)
//! - [`SnapshotConfig`] -- Configuration surface with TOML and environment loading
//! - [`ConfigOverrides`] -- Per-call overrides layered over a config
//! - [`NamedBytes`] -- Named attachment carried by failure reports

pub mod attachment;
pub mod config;
pub mod error;
pub mod identity;
pub mod record_mode;

pub use attachment::NamedBytes;
pub use config::{
    ConfigOverrides, SnapshotConfig, DEFAULT_CONTEXT_LINES, DEFAULT_MAX_CONCURRENT_LEASES,
    DEFAULT_SNAPSHOT_DIR, ENV_CONTEXT, ENV_DIFF_TOOL, ENV_RECORD,
};
pub use error::{TypeError, TypeResult};
pub use identity::{sanitize_component, BaselineId};
pub use record_mode::RecordMode;
