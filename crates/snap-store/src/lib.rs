//! Baseline storage for Snapline.
//!
//! The verification core only ever asks three things of storage: does a
//! baseline exist, read it, write it. This crate defines that boundary as the
//! [`BaselineStore`] trait and ships two backends:
//!
//! - [`InMemoryBaselineStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsBaselineStore`] -- one file per baseline under `<root>/<snapshot_dir>`
//!
//! # Design Rules
//!
//! 1. Stores never interpret baseline bytes.
//! 2. Stores never delete baselines.
//! 3. A write either fully replaces the baseline or leaves the old one intact.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsBaselineStore;
pub use memory::InMemoryBaselineStore;
pub use traits::BaselineStore;
