//! High-level SDK for Snapline.
//!
//! A [`SnapshotSuite`] is the context object for one test suite: it owns the
//! configuration, the codec registry, the baseline store, the automatic
//! name counters, and the pool of expensive rendering resources. Build one
//! at suite start, share it across the suite's tests, and call
//! [`SnapshotSuite::shutdown`] at the end.
//!
//! ```rust
//! use std::sync::Arc;
//! use snap_sdk::{InMemoryBaselineStore, LinesStrategy, SnapshotConfig, SnapshotSuite, VerifyOptions};
//!
//! let store = Arc::new(InMemoryBaselineStore::new());
//! let suite = SnapshotSuite::new("Greeting", SnapshotConfig::default(), store).unwrap();
//! let recorded = suite
//!     .assert_snapshot("hello", "Hello, world!", &LinesStrategy, &VerifyOptions::default())
//!     .unwrap();
//! assert!(recorded.recorded);
//! ```

pub mod error;
pub mod options;
pub mod suite;

pub use error::{SdkError, SdkResult};
pub use options::VerifyOptions;
pub use suite::SnapshotSuite;

// Re-export key types
pub use snap_codec::{
    BincodeStrategy, BytesStrategy, CodecRegistry, DebugStrategy, DiffReport, Diffing,
    JsonStrategy, LinesStrategy, Snapshotting,
};
pub use snap_store::{BaselineStore, FsBaselineStore, InMemoryBaselineStore};
pub use snap_sync::{CancellationToken, PoolStats, ResourceFactory};
pub use snap_types::{BaselineId, NamedBytes, RecordMode, SnapshotConfig};
pub use snap_verify::{Decision, Failure, Verified, VerifyError};
