use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::cancel::CancellationToken;
use crate::error::{SyncError, SyncResult};

struct Waiter {
    id: u64,
    grant: oneshot::Sender<()>,
}

#[derive(Default)]
struct State {
    locked: bool,
    closed: bool,
    waiters: VecDeque<Waiter>,
    next_waiter: u64,
}

impl State {
    /// Pass the lock to the oldest live waiter, or unlock.
    fn hand_off(&mut self) {
        while let Some(waiter) = self.waiters.pop_front() {
            if waiter.grant.send(()).is_ok() {
                debug!(waiter = waiter.id, "lock handed off");
                return;
            }
        }
        self.locked = false;
    }
}

/// A suspendable mutual-exclusion lock with strict FIFO fairness.
///
/// The mutex guards no data of its own; it serializes access to something
/// held elsewhere. Waiting suspends the task, never the thread.
///
/// A wait ends in one of three ways: the lock is granted, the wait is
/// cancelled (token fired or future dropped), or the mutex is closed. A
/// cancelled waiter is removed from the queue and never receives the lock.
pub struct AsyncMutex {
    state: Mutex<State>,
}

impl AsyncMutex {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// Wait until this caller is the sole holder.
    pub async fn lock(&self) -> SyncResult<AsyncMutexGuard<'_>> {
        self.acquire().await?;
        Ok(AsyncMutexGuard { mutex: self })
    }

    /// [`lock`](Self::lock), giving up with [`SyncError::Cancelled`] once
    /// `token` fires.
    pub async fn lock_with(&self, token: &CancellationToken) -> SyncResult<AsyncMutexGuard<'_>> {
        self.acquire_with(token).await?;
        Ok(AsyncMutexGuard { mutex: self })
    }

    /// Lock through an `Arc`, producing a guard that owns its mutex.
    pub async fn lock_owned(self: Arc<Self>) -> SyncResult<OwnedAsyncMutexGuard> {
        self.acquire().await?;
        Ok(OwnedAsyncMutexGuard { mutex: self })
    }

    /// Cancellable [`lock_owned`](Self::lock_owned).
    pub async fn lock_owned_with(
        self: Arc<Self>,
        token: &CancellationToken,
    ) -> SyncResult<OwnedAsyncMutexGuard> {
        self.acquire_with(token).await?;
        Ok(OwnedAsyncMutexGuard { mutex: self })
    }

    /// Take the lock only if it is free and nobody is queued.
    pub fn try_lock(&self) -> Option<AsyncMutexGuard<'_>> {
        let mut state = self.state.lock().expect("mutex state poisoned");
        if state.closed || state.locked {
            return None;
        }
        state.locked = true;
        Some(AsyncMutexGuard { mutex: self })
    }

    /// Release a guard explicitly. Equivalent to dropping it.
    pub fn unlock(guard: AsyncMutexGuard<'_>) {
        drop(guard);
    }

    /// Close the mutex: every queued waiter resumes with
    /// [`SyncError::Closed`] and later `lock` calls fail the same way.
    ///
    /// The current holder, if any, keeps the lock until it releases.
    pub fn close(&self) {
        let mut state = self.state.lock().expect("mutex state poisoned");
        state.closed = true;
        let abandoned = state.waiters.len();
        // Dropping the senders wakes each receiver with an error.
        state.waiters.clear();
        if abandoned > 0 {
            warn!(waiters = abandoned, "mutex closed with queued waiters");
        }
    }

    pub fn is_locked(&self) -> bool {
        self.state.lock().expect("mutex state poisoned").locked
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().expect("mutex state poisoned").closed
    }

    /// Number of callers currently queued.
    pub fn waiter_count(&self) -> usize {
        self.state.lock().expect("mutex state poisoned").waiters.len()
    }

    async fn acquire(&self) -> SyncResult<()> {
        let (id, grant) = {
            let mut state = self.state.lock().expect("mutex state poisoned");
            if state.closed {
                return Err(SyncError::Closed);
            }
            if !state.locked {
                state.locked = true;
                return Ok(());
            }
            let (tx, rx) = oneshot::channel();
            let id = state.next_waiter;
            state.next_waiter += 1;
            state.waiters.push_back(Waiter { id, grant: tx });
            (id, rx)
        };

        let mut pending = PendingWait {
            mutex: self,
            id,
            grant,
            finished: false,
        };
        let granted = (&mut pending.grant).await;
        pending.finished = true;
        granted.map_err(|_| SyncError::Closed)
    }

    async fn acquire_with(&self, token: &CancellationToken) -> SyncResult<()> {
        if token.is_cancelled() {
            return Err(SyncError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(SyncError::Cancelled),
            granted = self.acquire() => granted,
        }
    }

    fn release(&self) {
        self.state.lock().expect("mutex state poisoned").hand_off();
    }
}

impl Default for AsyncMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AsyncMutex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().expect("mutex state poisoned");
        f.debug_struct("AsyncMutex")
            .field("locked", &state.locked)
            .field("closed", &state.closed)
            .field("waiters", &state.waiters.len())
            .finish()
    }
}

/// Cleans up a queued wait whose future is dropped before completing.
struct PendingWait<'a> {
    mutex: &'a AsyncMutex,
    id: u64,
    grant: oneshot::Receiver<()>,
    finished: bool,
}

impl Drop for PendingWait<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut state = self.mutex.state.lock().expect("mutex state poisoned");
        if let Some(pos) = state.waiters.iter().position(|w| w.id == self.id) {
            state.waiters.remove(pos);
            debug!(waiter = self.id, "waiter cancelled");
        } else if self.grant.try_recv().is_ok() {
            // Granted between the last poll and the drop: pass it on.
            debug!(waiter = self.id, "waiter cancelled after grant");
            state.hand_off();
        }
    }
}

/// Holds an [`AsyncMutex`] until dropped.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct AsyncMutexGuard<'a> {
    mutex: &'a AsyncMutex,
}

impl Drop for AsyncMutexGuard<'_> {
    fn drop(&mut self) {
        self.mutex.release();
    }
}

impl std::fmt::Debug for AsyncMutexGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncMutexGuard").finish_non_exhaustive()
    }
}

/// Holds an `Arc<AsyncMutex>` until dropped.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct OwnedAsyncMutexGuard {
    mutex: Arc<AsyncMutex>,
}

impl OwnedAsyncMutexGuard {
    pub fn mutex(&self) -> &Arc<AsyncMutex> {
        &self.mutex
    }
}

impl Drop for OwnedAsyncMutexGuard {
    fn drop(&mut self) {
        self.mutex.release();
    }
}

impl std::fmt::Debug for OwnedAsyncMutexGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnedAsyncMutexGuard").finish_non_exhaustive()
    }
}
