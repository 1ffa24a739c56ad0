use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::cancel::CancellationToken;
use crate::error::{SyncError, SyncResult};
use crate::mutex::{AsyncMutex, OwnedAsyncMutexGuard};

/// Creates pooled resources on demand.
///
/// Closures are accepted through [`LeasedResourcePool::from_fn`].
pub trait ResourceFactory<R>: Send + Sync {
    /// Build a new resource. `primary` is `true` for the pool's singleton.
    fn create(&self, primary: bool) -> SyncResult<R>;
}

struct FnFactory<F>(F);

impl<R, F> ResourceFactory<R> for FnFactory<F>
where
    F: Fn(bool) -> R + Send + Sync,
{
    fn create(&self, primary: bool) -> SyncResult<R> {
        Ok((self.0)(primary))
    }
}

/// One pooled resource and its bookkeeping.
struct Lease<R> {
    id: u64,
    resource: Arc<R>,
    mutex: Arc<AsyncMutex>,
    /// Callers holding or waiting for this lease.
    pending: usize,
}

#[derive(Clone, Copy)]
enum Slot {
    Primary,
    Regular(usize),
}

struct PoolState<R> {
    primary: Option<Lease<R>>,
    regular: Vec<Lease<R>>,
    next_lease: u64,
    created: usize,
    closed: bool,
}

impl<R> PoolState<R> {
    fn lease_mut(&mut self, slot: Slot) -> Option<&mut Lease<R>> {
        match slot {
            Slot::Primary => self.primary.as_mut(),
            Slot::Regular(index) => self.regular.get_mut(index),
        }
    }

    /// Index of the regular lease with the most pending callers among the
    /// first `max`; ties go to the earliest.
    fn busiest(&self, max: usize) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (index, lease) in self.regular.iter().enumerate().take(max) {
            if best.map_or(true, |(_, pending)| lease.pending > pending) {
                best = Some((index, lease.pending));
            }
        }
        best.map(|(index, _)| index)
    }
}

/// Snapshot of pool bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Resources created over the pool's lifetime.
    pub created: usize,
    /// Regular leases currently in the active set.
    pub active_regular: usize,
    pub has_primary: bool,
    /// Callers holding or waiting for any lease.
    pub pending: usize,
}

/// A bounded pool of heavyweight, non-shareable resources.
///
/// The primary resource is created on first request and reused for the
/// lifetime of the pool; its requests queue without bound. Regular
/// resources grow up to the caller's `max_concurrent`. At capacity, a new
/// acquirer joins the lease with the most callers already pending on it.
/// A regular lease is evicted when its last caller releases it.
pub struct LeasedResourcePool<R> {
    factory: Arc<dyn ResourceFactory<R>>,
    state: Mutex<PoolState<R>>,
}

impl<R> LeasedResourcePool<R> {
    pub fn new(factory: Arc<dyn ResourceFactory<R>>) -> Self {
        Self {
            factory,
            state: Mutex::new(PoolState {
                primary: None,
                regular: Vec::new(),
                next_lease: 0,
                created: 0,
                closed: false,
            }),
        }
    }

    /// Pool whose resources are built by `f`.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(bool) -> R + Send + Sync + 'static,
    {
        Self::new(Arc::new(FnFactory(f)))
    }

    /// Wait for exclusive access to a resource.
    ///
    /// A `max_concurrent` of zero is treated as one.
    pub async fn acquire(
        &self,
        wants_primary: bool,
        max_concurrent: usize,
    ) -> SyncResult<ResourceHandle<'_, R>> {
        let (mut reservation, mutex) = self.reserve(wants_primary, max_concurrent)?;
        let guard = mutex.lock_owned().await?;
        Ok(reservation.complete(guard))
    }

    /// Cancellable [`acquire`](Self::acquire).
    pub async fn acquire_with(
        &self,
        wants_primary: bool,
        max_concurrent: usize,
        token: &CancellationToken,
    ) -> SyncResult<ResourceHandle<'_, R>> {
        if token.is_cancelled() {
            return Err(SyncError::Cancelled);
        }
        let (mut reservation, mutex) = self.reserve(wants_primary, max_concurrent)?;
        let guard = mutex.lock_owned_with(token).await?;
        Ok(reservation.complete(guard))
    }

    /// Hand a resource back. Equivalent to dropping the handle.
    pub fn release(handle: ResourceHandle<'_, R>) {
        drop(handle);
    }

    /// Close every lease: queued acquirers resume with
    /// [`SyncError::Closed`] and later acquires fail the same way.
    ///
    /// Outstanding handles stay valid until dropped.
    pub fn shutdown(&self) {
        let mut state = self.state.lock().expect("pool state poisoned");
        state.closed = true;
        for lease in state.primary.iter().chain(state.regular.iter()) {
            lease.mutex.close();
        }
        debug!(created = state.created, "pool shut down");
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().expect("pool state poisoned").closed
    }

    pub fn stats(&self) -> PoolStats {
        let state = self.state.lock().expect("pool state poisoned");
        PoolStats {
            created: state.created,
            active_regular: state.regular.len(),
            has_primary: state.primary.is_some(),
            pending: state
                .primary
                .iter()
                .chain(state.regular.iter())
                .map(|lease| lease.pending)
                .sum(),
        }
    }

    /// Pick or create a lease and count the caller as pending on it.
    fn reserve(
        &self,
        wants_primary: bool,
        max_concurrent: usize,
    ) -> SyncResult<(Reservation<'_, R>, Arc<AsyncMutex>)> {
        let max = max_concurrent.max(1);
        let mut state = self.state.lock().expect("pool state poisoned");
        if state.closed {
            return Err(SyncError::Closed);
        }

        let slot = if wants_primary {
            if state.primary.is_none() {
                let lease = self.create_lease(&mut state, true)?;
                state.primary = Some(lease);
            }
            Slot::Primary
        } else if state.regular.len() < max {
            let lease = self.create_lease(&mut state, false)?;
            state.regular.push(lease);
            Slot::Regular(state.regular.len() - 1)
        } else {
            Slot::Regular(state.busiest(max).unwrap_or(0))
        };

        let lease = state.lease_mut(slot).ok_or(SyncError::Closed)?;
        lease.pending += 1;
        debug!(
            lease = lease.id,
            primary = wants_primary,
            pending = lease.pending,
            "lease reserved"
        );

        let reservation = Reservation {
            pool: self,
            lease_id: lease.id,
            primary: wants_primary,
            resource: lease.resource.clone(),
            armed: true,
        };
        Ok((reservation, lease.mutex.clone()))
    }

    fn create_lease(&self, state: &mut PoolState<R>, primary: bool) -> SyncResult<Lease<R>> {
        let resource = self.factory.create(primary)?;
        let id = state.next_lease;
        state.next_lease += 1;
        state.created += 1;
        debug!(lease = id, primary, "lease created");
        Ok(Lease {
            id,
            resource: Arc::new(resource),
            mutex: Arc::new(AsyncMutex::new()),
            pending: 0,
        })
    }

    /// Drop one pending caller from a lease, evicting an idle regular lease.
    fn finish(&self, lease_id: u64, primary: bool) {
        let mut state = self.state.lock().expect("pool state poisoned");
        if primary {
            if let Some(lease) = state.primary.as_mut().filter(|l| l.id == lease_id) {
                lease.pending = lease.pending.saturating_sub(1);
            }
            return;
        }

        let Some(index) = state.regular.iter().position(|l| l.id == lease_id) else {
            return;
        };
        let lease = &mut state.regular[index];
        lease.pending = lease.pending.saturating_sub(1);
        if lease.pending == 0 {
            state.regular.remove(index);
            debug!(lease = lease_id, "lease evicted");
        }
    }
}

impl<R> fmt::Debug for LeasedResourcePool<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeasedResourcePool")
            .field("stats", &self.stats())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// A caller counted as pending on a lease but not yet holding it.
///
/// Dropping an armed reservation (failed or abandoned wait) undoes the count.
struct Reservation<'a, R> {
    pool: &'a LeasedResourcePool<R>,
    lease_id: u64,
    primary: bool,
    resource: Arc<R>,
    armed: bool,
}

impl<'a, R> Reservation<'a, R> {
    fn complete(&mut self, guard: OwnedAsyncMutexGuard) -> ResourceHandle<'a, R> {
        self.armed = false;
        debug!(lease = self.lease_id, "lease granted");
        ResourceHandle {
            pool: self.pool,
            lease_id: self.lease_id,
            primary: self.primary,
            resource: self.resource.clone(),
            _guard: guard,
        }
    }
}

impl<R> Drop for Reservation<'_, R> {
    fn drop(&mut self) {
        if self.armed {
            self.pool.finish(self.lease_id, self.primary);
        }
    }
}

/// Exclusive access to one pooled resource.
///
/// Dropping the handle releases the lease: the pending count goes down,
/// an idle regular lease is evicted, then the next waiter is granted.
pub struct ResourceHandle<'a, R> {
    pool: &'a LeasedResourcePool<R>,
    lease_id: u64,
    primary: bool,
    resource: Arc<R>,
    _guard: OwnedAsyncMutexGuard,
}

impl<R> ResourceHandle<'_, R> {
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub fn lease_id(&self) -> u64 {
        self.lease_id
    }
}

impl<R> Deref for ResourceHandle<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.resource
    }
}

impl<R> Drop for ResourceHandle<'_, R> {
    fn drop(&mut self) {
        // Runs before `_guard` is dropped, so bookkeeping precedes hand-off.
        self.pool.finish(self.lease_id, self.primary);
    }
}

impl<R> fmt::Debug for ResourceHandle<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("lease_id", &self.lease_id)
            .field("primary", &self.primary)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Pool whose resources are numbered in creation order.
    fn numbered_pool() -> Arc<LeasedResourcePool<usize>> {
        let counter = AtomicUsize::new(0);
        Arc::new(LeasedResourcePool::from_fn(move |_primary| {
            counter.fetch_add(1, Ordering::SeqCst)
        }))
    }

    async fn wait_for_pending(pool: &LeasedResourcePool<usize>, n: usize) {
        while pool.stats().pending < n {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn primary_is_created_once_and_reused() {
        let pool = numbered_pool();
        let first = pool.acquire(true, 3).await.unwrap();
        assert!(first.is_primary());
        assert_eq!(*first, 0);
        drop(first);

        let second = pool.acquire(true, 3).await.unwrap();
        assert_eq!(*second, 0);
        LeasedResourcePool::release(second);

        let stats = pool.stats();
        assert_eq!(stats.created, 1);
        assert!(stats.has_primary);
        assert_eq!(stats.pending, 0);
    }

    #[tokio::test]
    async fn idle_regular_lease_is_evicted() {
        let pool = numbered_pool();
        let handle = pool.acquire(false, 2).await.unwrap();
        assert_eq!(pool.stats().active_regular, 1);
        drop(handle);
        assert_eq!(pool.stats().active_regular, 0);

        let handle = pool.acquire(false, 2).await.unwrap();
        assert_eq!(*handle, 1);
        assert_eq!(pool.stats().created, 2);
    }

    #[tokio::test]
    async fn third_acquire_reuses_an_existing_lease() {
        let pool = numbered_pool();
        let first = pool.acquire(false, 2).await.unwrap();
        let second = pool.acquire(false, 2).await.unwrap();
        assert_ne!(first.lease_id(), second.lease_id());

        let third = {
            let pool = pool.clone();
            tokio::spawn(async move {
                let handle = pool.acquire(false, 2).await.unwrap();
                *handle
            })
        };
        wait_for_pending(&pool, 3).await;
        let stats = pool.stats();
        assert_eq!(stats.created, 2);
        assert_eq!(stats.active_regular, 2);

        // Tie on pending count: the earliest lease is chosen.
        drop(first);
        assert_eq!(third.await.unwrap(), 0);
        drop(second);
        assert_eq!(pool.stats().created, 2);
    }

    #[tokio::test]
    async fn busiest_lease_attracts_new_acquirers() {
        let pool = numbered_pool();
        let first = pool.acquire(false, 2).await.unwrap();
        let second = pool.acquire(false, 2).await.unwrap();

        let mut waiters = Vec::new();
        for n in 3..=4 {
            let pool_c = pool.clone();
            waiters.push(tokio::spawn(async move {
                let handle = pool_c.acquire(false, 2).await.unwrap();
                *handle
            }));
            wait_for_pending(&pool, n).await;
        }

        // Both waiters piled onto lease 0; lease 1 goes idle and is evicted.
        drop(second);
        assert_eq!(pool.stats().active_regular, 1);
        drop(first);
        for waiter in waiters {
            assert_eq!(waiter.await.unwrap(), 0);
        }
        assert_eq!(pool.stats().active_regular, 0);
    }

    #[tokio::test]
    async fn cancelled_acquire_releases_its_reservation() {
        let pool = numbered_pool();
        let held = pool.acquire(true, 1).await.unwrap();
        let token = CancellationToken::new();

        let waiter = {
            let (pool, token) = (pool.clone(), token.clone());
            tokio::spawn(async move { pool.acquire_with(true, 1, &token).await.map(|h| *h) })
        };
        wait_for_pending(&pool, 2).await;

        token.cancel();
        assert_eq!(waiter.await.unwrap(), Err(SyncError::Cancelled));
        assert_eq!(pool.stats().pending, 1);
        drop(held);
        assert_eq!(pool.stats().pending, 0);
    }

    #[tokio::test]
    async fn dropped_acquire_future_releases_its_reservation() {
        let pool = numbered_pool();
        let _held = pool.acquire(false, 1).await.unwrap();
        let timed_out =
            tokio::time::timeout(Duration::from_millis(10), pool.acquire(false, 1)).await;
        assert!(timed_out.is_err());
        assert_eq!(pool.stats().pending, 1);
        assert_eq!(pool.stats().active_regular, 1);
    }

    #[tokio::test]
    async fn shutdown_resumes_waiters_with_closed() {
        let pool = numbered_pool();
        let held = pool.acquire(true, 1).await.unwrap();
        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire(true, 1).await.map(|h| *h) })
        };
        wait_for_pending(&pool, 2).await;

        pool.shutdown();
        assert_eq!(waiter.await.unwrap(), Err(SyncError::Closed));
        assert!(pool.is_closed());
        assert_eq!(pool.acquire(false, 1).await.unwrap_err(), SyncError::Closed);

        // The outstanding handle still works and releases cleanly.
        assert_eq!(*held, 0);
        drop(held);
        assert_eq!(pool.stats().pending, 0);
    }

    struct FailingFactory;

    impl ResourceFactory<usize> for FailingFactory {
        fn create(&self, _primary: bool) -> SyncResult<usize> {
            Err(SyncError::Factory("no display".into()))
        }
    }

    #[tokio::test]
    async fn factory_failure_propagates() {
        let pool: LeasedResourcePool<usize> = LeasedResourcePool::new(Arc::new(FailingFactory));
        let err = pool.acquire(false, 2).await.unwrap_err();
        assert_eq!(err, SyncError::Factory("no display".into()));
        assert_eq!(pool.stats(), PoolStats::default());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_acquirers_respect_bound() {
        let pool = numbered_pool();
        let mut tasks = Vec::new();
        for _ in 0..24 {
            let pool = pool.clone();
            tasks.push(tokio::spawn(async move {
                let handle = pool.acquire(false, 3).await.unwrap();
                assert!(pool.stats().active_regular <= 3);
                tokio::task::yield_now().await;
                drop(handle);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        let stats = pool.stats();
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.active_regular, 0);
    }
}
