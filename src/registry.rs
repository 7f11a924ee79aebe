//! Target registry.
//!
//! The [`TargetRegistry`] is built once, when the platform is constructed,
//! and never changes afterwards. Targets are addressed by [`TargetId`], their
//! position in registration order. Each target owns its worker runtime, so
//! runs on different targets never share a thread pool.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::config::PlatformConfig;
use crate::error::{MeasureError, MeasureResult};
use crate::executor::Executor;
use crate::job::TargetId;

/// One registered target: an executor and the workers that drive it.
pub struct Target<K> {
    id: TargetId,
    executor: Arc<dyn Executor<K>>,
    /// Always `Some` until the target is dropped.
    runtime: Option<Runtime>,
}

impl<K> Target<K> {
    /// Position of this target in the registry.
    pub fn id(&self) -> TargetId {
        self.id
    }

    /// Name of the target's executor.
    pub fn name(&self) -> &str {
        self.executor.name()
    }

    pub(crate) fn executor(&self) -> Arc<dyn Executor<K>> {
        Arc::clone(&self.executor)
    }

    /// Run `task` on this target's workers.
    pub(crate) fn spawn<F>(&self, task: F) -> MeasureResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let runtime = self.runtime.as_ref().ok_or_else(|| {
            MeasureError::ExecutionFailed(format!("{} is shut down", self.id))
        })?;
        runtime.spawn(task);
        Ok(())
    }
}

impl<K> Drop for Target<K> {
    fn drop(&mut self) {
        // `shutdown_background` is the only shutdown that is legal inside an
        // async context.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl<K> std::fmt::Debug for Target<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Target")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}

/// Immutable set of targets, indexed by [`TargetId`].
pub struct TargetRegistry<K> {
    targets: Vec<Target<K>>,
}

impl<K> std::fmt::Debug for TargetRegistry<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.targets).finish()
    }
}

impl<K> TargetRegistry<K> {
    /// Build a registry with one worker runtime per executor.
    pub fn new(
        config: &PlatformConfig,
        executors: impl IntoIterator<Item = Arc<dyn Executor<K>>>,
    ) -> MeasureResult<Self> {
        config.validate()?;

        let mut targets = Vec::new();
        for (index, executor) in executors.into_iter().enumerate() {
            let id = TargetId(index);
            let runtime = Builder::new_multi_thread()
                .worker_threads(config.worker_threads)
                .thread_name(id.to_string())
                .enable_all()
                .build()
                .map_err(|e| {
                    MeasureError::Configuration(format!("cannot start workers for {id}: {e}"))
                })?;
            debug!(%id, name = executor.name(), "Registered target");
            targets.push(Target {
                id,
                executor,
                runtime: Some(runtime),
            });
        }

        if targets.is_empty() {
            return Err(MeasureError::Configuration(
                "at least one target must be registered".into(),
            ));
        }
        Ok(Self { targets })
    }

    /// Look up a target.
    pub fn get(&self, id: TargetId) -> MeasureResult<&Target<K>> {
        self.targets.get(id.0).ok_or(MeasureError::InvalidTarget {
            id: id.0,
            available: self.targets.len(),
        })
    }

    /// Number of registered targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Check if no target is registered.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Executor names in target order.
    pub fn names(&self) -> Vec<&str> {
        self.targets.iter().map(Target::name).collect()
    }
}
