//! Run dispatch.
//!
//! A [`Platform`] validates a run at the call boundary and hands it to the
//! selected target's workers:
//!
//! ```text
//!   sample_async(target, kernel, args, shots)
//!     ├─ target in registry?        else InvalidTarget
//!     ├─ args match signature?      else ArgumentCountMismatch / ArgumentTypeMismatch
//!     ├─ shots valid?               else InvalidShots
//!     └─ spawn on target workers ──→ SampleHandle
//! ```
//!
//! Nothing is scheduled unless every check passes. The blocking `sample()` /
//! `observe()` calls dispatch to [`TargetId::DEFAULT`] and wait on the handle,
//! so they must not be called from inside an async runtime.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::config::PlatformConfig;
use crate::error::{MeasureError, MeasureResult};
use crate::executor::Executor;
use crate::job::{ObserveHandle, SampleHandle, TargetId, TaskHandle};
use crate::kernel::{ArgValue, Kernel, Shots};
use crate::observe::ObserveResult;
use crate::registry::TargetRegistry;
use crate::sample::SampleResult;
use crate::spin::Hamiltonian;

/// Entry point for sampling and observe runs.
pub struct Platform<K> {
    config: PlatformConfig,
    registry: TargetRegistry<K>,
}

impl<K> std::fmt::Debug for Platform<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}

impl<K: Kernel + 'static> Platform<K> {
    /// Start building a platform.
    pub fn builder() -> PlatformBuilder<K> {
        PlatformBuilder::new()
    }

    /// Settings the platform was built with.
    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// Registered targets.
    pub fn registry(&self) -> &TargetRegistry<K> {
        &self.registry
    }

    /// Sample `kernel` on the default target and wait for the result.
    ///
    /// `shots` of `None` uses the configured default.
    ///
    /// # Panics
    ///
    /// Panics when called from within an async runtime; dispatch with the
    /// `*_async` variant and use [`TaskHandle::wait`] there.
    pub fn sample(
        &self,
        kernel: &Arc<K>,
        args: &[ArgValue],
        shots: Option<i64>,
    ) -> MeasureResult<SampleResult> {
        self.sample_async(TargetId::DEFAULT, Arc::clone(kernel), args.to_vec(), shots)?
            .get()
    }

    /// Dispatch a sampling run to `target`.
    #[instrument(skip_all, fields(target_id = target.0, kernel = kernel.name()))]
    pub fn sample_async(
        &self,
        target: TargetId,
        kernel: Arc<K>,
        args: Vec<ArgValue>,
        shots: Option<i64>,
    ) -> MeasureResult<SampleHandle> {
        let slot = self.registry.get(target)?;
        kernel.signature().validate(&args)?;
        let Shots::Finite(shots) = self.config.resolve_shots(shots)? else {
            return Err(MeasureError::InvalidShots(
                "sampling needs a positive shot count".into(),
            ));
        };

        let executor = slot.executor();
        let (tx, rx) = tokio::sync::oneshot::channel();
        slot.spawn(async move {
            let outcome = executor
                .sample(kernel.as_ref(), &args, shots)
                .await
                .and_then(|data| data.into_sample_result());
            if tx.send(outcome).is_err() {
                debug!("Sample handle dropped before the run completed");
            }
        })?;

        info!(shots, executor = slot.name(), "Dispatched sampling run");
        Ok(TaskHandle::new(target, rx))
    }

    /// Observe `hamiltonian` on the default target and wait for the result.
    ///
    /// `shots` of `Some(-1)` requests an analytic expectation value.
    ///
    /// # Panics
    ///
    /// Panics when called from within an async runtime; dispatch with the
    /// `*_async` variant and use [`TaskHandle::wait`] there.
    pub fn observe(
        &self,
        kernel: &Arc<K>,
        args: &[ArgValue],
        hamiltonian: &Hamiltonian,
        shots: Option<i64>,
    ) -> MeasureResult<ObserveResult> {
        self.observe_async(
            TargetId::DEFAULT,
            Arc::clone(kernel),
            args.to_vec(),
            hamiltonian.clone(),
            shots,
        )?
        .get()
    }

    /// Dispatch an observe run to `target`.
    #[instrument(skip_all, fields(target_id = target.0, kernel = kernel.name()))]
    pub fn observe_async(
        &self,
        target: TargetId,
        kernel: Arc<K>,
        args: Vec<ArgValue>,
        hamiltonian: Hamiltonian,
        shots: Option<i64>,
    ) -> MeasureResult<ObserveHandle> {
        let slot = self.registry.get(target)?;
        kernel.signature().validate(&args)?;
        let shots = self.config.resolve_shots(shots)?;
        let terms = hamiltonian.term_count();

        let executor = slot.executor();
        let (tx, rx) = tokio::sync::oneshot::channel();
        slot.spawn(async move {
            let outcome = executor
                .observe(kernel.as_ref(), &args, &hamiltonian, shots)
                .await
                .and_then(|data| data.into_observe_result(&hamiltonian, shots));
            if tx.send(outcome).is_err() {
                debug!("Observe handle dropped before the run completed");
            }
        })?;

        info!(?shots, terms, executor = slot.name(), "Dispatched observe run");
        Ok(TaskHandle::new(target, rx))
    }
}

/// Builder for [`Platform`].
pub struct PlatformBuilder<K> {
    config: PlatformConfig,
    executors: Vec<Arc<dyn Executor<K>>>,
}

impl<K: Kernel + 'static> PlatformBuilder<K> {
    fn new() -> Self {
        Self {
            config: PlatformConfig::default(),
            executors: Vec::new(),
        }
    }

    /// Use `config` instead of the defaults.
    pub fn config(mut self, config: PlatformConfig) -> Self {
        self.config = config;
        self
    }

    /// Register the next target. Targets are numbered in registration order.
    pub fn target(mut self, executor: impl Executor<K> + 'static) -> Self {
        self.executors.push(Arc::new(executor));
        self
    }

    /// Register an executor shared with other owners.
    pub fn shared_target(mut self, executor: Arc<dyn Executor<K>>) -> Self {
        self.executors.push(executor);
        self
    }

    /// Start the target workers.
    pub fn build(self) -> MeasureResult<Platform<K>> {
        let registry = TargetRegistry::new(&self.config, self.executors)?;
        debug!(targets = registry.len(), "Platform ready");
        Ok(Platform {
            config: self.config,
            registry,
        })
    }
}
