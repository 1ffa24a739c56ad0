//! Concurrency primitives for Snapline.
//!
//! Producing a snapshot sometimes needs an expensive resource that cannot be
//! shared, such as a renderer. This crate arbitrates access to such
//! resources across concurrently running tests without blocking OS threads.
//!
//! # Key Types
//!
//! - [`AsyncMutex`] -- strictly FIFO, cancellation-safe lock that protects no data
//! - [`CancellationToken`] -- cooperative cancellation threaded through waits
//! - [`LeasedResourcePool`] -- lazily created primary resource plus a bounded
//!   set of regular resources, each guarded by its own [`AsyncMutex`]
//! - [`ResourceHandle`] -- exclusive access to one pooled resource, released on drop
//!
//! # Guarantees
//!
//! 1. At most one holder per mutex; waiters are granted in arrival order.
//! 2. A cancelled waiter never receives the lock and leaves the queue intact.
//! 3. Closing a mutex or shutting a pool down resumes every waiter with
//!    [`SyncError::Closed`].

pub mod cancel;
pub mod error;
pub mod mutex;
pub mod pool;

pub use cancel::CancellationToken;
pub use error::{SyncError, SyncResult};
pub use mutex::{AsyncMutex, AsyncMutexGuard, OwnedAsyncMutexGuard};
pub use pool::{LeasedResourcePool, PoolStats, ResourceFactory, ResourceHandle};
