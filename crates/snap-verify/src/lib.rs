//! Baseline verification for Snapline.
//!
//! [`decide`] is the pure record-mode table; [`Verifier`] wraps it in the
//! full pipeline: look the baseline up, compare through a diffing codec,
//! write when the decision says so, and report.
//!
//! # Key Types
//!
//! - [`Decision`] -- pass, write-and-pass, write-and-fail, or fail
//! - [`Verifier`] -- runs one verification against a [`BaselineStore`](snap_store::BaselineStore)
//! - [`Verified`] -- successful outcome, with the informational report of an overwrite
//! - [`VerifyError`] -- typed failures, split into expected and infrastructure errors
//! - [`Failure`] -- message plus attachments, ready for a test reporter
//! - [`NameCounter`] -- automatic discriminators for repeated verifications

pub mod decision;
pub mod error;
pub mod naming;
pub mod report;
pub mod verifier;

pub use decision::{decide, decide_with, Decision};
pub use error::{VerifyError, VerifyResult};
pub use naming::NameCounter;
pub use report::Failure;
pub use verifier::{Verified, Verifier};
