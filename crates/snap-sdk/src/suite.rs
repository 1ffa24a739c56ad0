use std::sync::Arc;

use snap_codec::{ByteContainer, CodecRegistry, Diffing, Snapshotting};
use snap_store::BaselineStore;
use snap_sync::{LeasedResourcePool, PoolStats, ResourceFactory};
use snap_types::{BaselineId, SnapshotConfig};
use snap_verify::{NameCounter, Verified, Verifier};
use tracing::{debug, info};

use crate::error::SdkResult;
use crate::options::VerifyOptions;

/// Context object for one snapshot test suite.
///
/// `R` is the pooled rendering resource; suites that render nothing use the
/// default `()`.
pub struct SnapshotSuite<R = ()> {
    name: String,
    config: SnapshotConfig,
    registry: CodecRegistry,
    verifier: Verifier,
    names: NameCounter,
    pool: LeasedResourcePool<R>,
}

impl SnapshotSuite<()> {
    /// A suite without pooled resources, using the built-in codecs.
    pub fn new(
        name: impl Into<String>,
        config: SnapshotConfig,
        store: Arc<dyn BaselineStore>,
    ) -> SdkResult<Self> {
        Self::with_resources(name, config, store, |_primary| ())
    }
}

impl<R> SnapshotSuite<R> {
    /// A suite whose resources are built by `factory`.
    pub fn with_resources<F>(
        name: impl Into<String>,
        config: SnapshotConfig,
        store: Arc<dyn BaselineStore>,
        factory: F,
    ) -> SdkResult<Self>
    where
        F: Fn(bool) -> R + Send + Sync + 'static,
    {
        Self::build(name.into(), config, store, LeasedResourcePool::from_fn(factory))
    }

    /// A suite with a fallible resource factory.
    pub fn with_factory(
        name: impl Into<String>,
        config: SnapshotConfig,
        store: Arc<dyn BaselineStore>,
        factory: Arc<dyn ResourceFactory<R>>,
    ) -> SdkResult<Self> {
        Self::build(name.into(), config, store, LeasedResourcePool::new(factory))
    }

    fn build(
        name: String,
        config: SnapshotConfig,
        store: Arc<dyn BaselineStore>,
        pool: LeasedResourcePool<R>,
    ) -> SdkResult<Self> {
        config.validate()?;
        info!(suite = %name, mode = %config.record_mode, "snapshot suite started");
        Ok(Self {
            name,
            config,
            registry: CodecRegistry::with_defaults(),
            verifier: Verifier::new(store),
            names: NameCounter::new(),
            pool,
        })
    }

    /// Replace the verifier, e.g. to move the rejected-candidate directory.
    pub fn with_verifier(mut self, verifier: Verifier) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    /// Register an additional diffing codec.
    pub fn register_codec(&mut self, codec: Arc<dyn Diffing>) {
        self.registry.register(codec);
    }

    pub fn store(&self) -> &Arc<dyn BaselineStore> {
        self.verifier.store()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Restart automatic numbering for `test`, e.g. when it is re-run.
    pub fn reset_counter(&self, test: &str) {
        self.names.reset(test);
    }

    /// Serialize `value` with `strategy` and verify it against its baseline.
    pub fn assert_snapshot<V, S>(
        &self,
        test: &str,
        value: &V,
        strategy: &S,
        options: &VerifyOptions,
    ) -> SdkResult<Verified>
    where
        V: ?Sized,
        S: Snapshotting<V>,
    {
        let codec = self.registry.get(strategy.format())?;

        let mut out = ByteContainer::writer();
        strategy.snapshot(value, &mut out)?;
        let candidate = out.seal();

        let id = self.identify(test, codec.path_extension(), options.name.as_deref())?;
        let config = self.config.with_overrides(&options.overrides());
        debug!(id = %id, format = codec.format(), bytes = candidate.len(), "verifying snapshot");

        Ok(self.verifier.verify(&id, &candidate, codec.as_ref(), &config)?)
    }

    /// Lease a resource, render a value with it, release the lease, then
    /// verify the value.
    pub async fn render_and_assert<V, S, F>(
        &self,
        test: &str,
        primary: bool,
        render: F,
        strategy: &S,
        options: &VerifyOptions,
    ) -> SdkResult<Verified>
    where
        S: Snapshotting<V>,
        F: FnOnce(&R) -> V,
    {
        let max = self.config.max_concurrent_leases;
        let value = {
            let handle = match &options.cancellation {
                Some(token) => self.pool.acquire_with(primary, max, token).await?,
                None => self.pool.acquire(primary, max).await?,
            };
            render(&*handle)
        };
        self.assert_snapshot(test, &value, strategy, options)
    }

    /// Close the resource pool. Queued acquirers fail with `Closed`.
    pub fn shutdown(&self) {
        self.pool.shutdown();
        info!(suite = %self.name, "snapshot suite shut down");
    }

    fn identify(&self, test: &str, extension: &str, name: Option<&str>) -> SdkResult<BaselineId> {
        let id = BaselineId::new(&self.name, test, extension)?;
        let discriminator = match name {
            Some(name) => name.to_string(),
            None => self.names.next(test).to_string(),
        };
        Ok(id.with_discriminator(discriminator)?)
    }
}

impl<R> std::fmt::Debug for SnapshotSuite<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotSuite")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}
