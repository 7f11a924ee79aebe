//! Executor trait and the raw data it produces.
//!
//! An [`Executor`] runs kernels on one target (simulator, QPU, ...). The
//! aggregator never executes anything itself; it only turns
//! [`ExecutionData`] into [`SampleResult`]s and [`ObserveResult`]s.
//!
//! ```text
//!   Platform::sample_async() ──→ Executor::sample() ──→ ExecutionData ──→ SampleResult
//!   Platform::observe_async() ─→ Executor::observe() ─→ ExecutionData ──→ ObserveResult
//! ```
//!
//! ## Contract
//!
//! - Arguments reaching an executor were already validated against the
//!   kernel's signature.
//! - `sample()` MUST return [`ExecutionData::Shots`].
//! - `observe()` with [`Shots::Finite`] MUST return one register per
//!   non-identity Hamiltonian term, named by [`SpinTerm::term_id`]; with
//!   [`Shots::Analytic`] it returns [`ExecutionData::Analytic`].
//!
//! [`SpinTerm::term_id`]: crate::spin::SpinTerm::term_id

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::counts::Counts;
use crate::error::{MeasureError, MeasureResult};
use crate::kernel::{ArgValue, Shots};
use crate::observe::ObserveResult;
use crate::sample::SampleResult;
use crate::spin::Hamiltonian;

/// Trait for execution targets.
///
/// Generic over the kernel type `K`, so the aggregator is independent of any
/// kernel representation.
#[async_trait]
pub trait Executor<K>: Send + Sync {
    /// Name of this executor.
    fn name(&self) -> &str;

    /// Sample `kernel` `shots` times.
    async fn sample(&self, kernel: &K, args: &[ArgValue], shots: u32)
    -> MeasureResult<ExecutionData>;

    /// Measure every term of `hamiltonian` on the state `kernel` prepares.
    async fn observe(
        &self,
        kernel: &K,
        args: &[ArgValue],
        hamiltonian: &Hamiltonian,
        shots: Shots,
    ) -> MeasureResult<ExecutionData>;
}

/// Raw output of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionData {
    /// Per-register shot histograms, in registration order.
    Shots {
        registers: Vec<(String, Counts)>,
    },
    /// Exactly computed expectation value.
    Analytic {
        expectation: f64,
    },
}

impl ExecutionData {
    /// Shot data with only the default register.
    pub fn global(counts: Counts) -> Self {
        Self::registers([(crate::register::GLOBAL_REGISTER, counts)])
    }

    /// Shot data from (register name, counts) pairs.
    pub fn registers(iter: impl IntoIterator<Item = (impl Into<String>, Counts)>) -> Self {
        Self::Shots {
            registers: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Analytic expectation value without shot data.
    pub fn analytic(expectation: f64) -> Self {
        Self::Analytic { expectation }
    }

    /// Build the result of a sampling run.
    pub fn into_sample_result(self) -> MeasureResult<SampleResult> {
        match self {
            Self::Shots { registers } => SampleResult::from_registers(registers),
            Self::Analytic { .. } => Err(MeasureError::ExecutionFailed(
                "executor returned an analytic value for a sampling run".into(),
            )),
        }
    }

    /// Build the result of an observe run.
    pub fn into_observe_result(
        self,
        hamiltonian: &Hamiltonian,
        shots: Shots,
    ) -> MeasureResult<ObserveResult> {
        match (self, shots) {
            (Self::Shots { registers }, Shots::Finite(_)) => {
                ObserveResult::from_shots(hamiltonian, SampleResult::from_registers(registers)?)
            }
            (Self::Analytic { expectation }, Shots::Analytic) => {
                Ok(ObserveResult::analytic(hamiltonian, expectation))
            }
            (Self::Analytic { expectation }, Shots::Finite(n)) => {
                warn!(shots = n, "Executor ignored shot count and returned an analytic value");
                Ok(ObserveResult::analytic(hamiltonian, expectation))
            }
            (Self::Shots { .. }, Shots::Analytic) => Err(MeasureError::ExecutionFailed(
                "executor returned shot data for an analytic run".into(),
            )),
        }
    }
}
