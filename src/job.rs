//! Target ids and task handles.
//!
//! An asynchronous run has no observable states beyond these:
//!
//! ```text
//!   sample_async() ──→ dispatched ──→ resolved (Ok(result) | Err(error))
//! ```
//!
//! **Invariants:**
//! - Invalid targets and arguments are rejected by `sample_async()` itself;
//!   a handle exists only for a dispatched run.
//! - A handle resolves exactly once, to a fully populated result or an error.
//! - There is no cancellation and no partial result. Dropping a handle
//!   discards the outcome; the run itself still completes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::{MeasureError, MeasureResult};
use crate::observe::ObserveResult;
use crate::sample::SampleResult;

/// Index of a target in a platform's registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct TargetId(pub usize);

impl TargetId {
    /// The first registered target.
    pub const DEFAULT: TargetId = TargetId(0);
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "target-{}", self.0)
    }
}

impl From<usize> for TargetId {
    fn from(id: usize) -> Self {
        Self(id)
    }
}

/// Handle to a dispatched run.
#[derive(Debug)]
pub struct TaskHandle<T> {
    target: TargetId,
    submitted_at: DateTime<Utc>,
    receiver: oneshot::Receiver<MeasureResult<T>>,
}

/// Handle to a dispatched sampling run.
pub type SampleHandle = TaskHandle<SampleResult>;

/// Handle to a dispatched observe run.
pub type ObserveHandle = TaskHandle<ObserveResult>;

impl<T> TaskHandle<T> {
    pub(crate) fn new(target: TargetId, receiver: oneshot::Receiver<MeasureResult<T>>) -> Self {
        Self {
            target,
            submitted_at: Utc::now(),
            receiver,
        }
    }

    /// Target the run was dispatched to.
    pub fn target(&self) -> TargetId {
        self.target
    }

    /// When the run was dispatched.
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Block the calling thread until the run completes.
    ///
    /// # Panics
    ///
    /// Panics when called from within an async runtime; use [`TaskHandle::wait`]
    /// there.
    pub fn get(self) -> MeasureResult<T> {
        let target = self.target;
        let outcome = self.receiver.blocking_recv();
        resolve(target, outcome)
    }

    /// Wait for the run to complete.
    pub async fn wait(self) -> MeasureResult<T> {
        let target = self.target;
        let outcome = self.receiver.await;
        resolve(target, outcome)
    }
}

fn resolve<T>(
    target: TargetId,
    outcome: Result<MeasureResult<T>, oneshot::error::RecvError>,
) -> MeasureResult<T> {
    debug!(%target, "Resolved task handle");
    outcome.map_err(|_| {
        MeasureError::ExecutionFailed(format!("{target} worker stopped before the run completed"))
    })?
}
