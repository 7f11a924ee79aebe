//! Measurement-result aggregation for quantum sampling and observe runs.
//!
//! This crate turns the raw output of an execution target (per-shot
//! bitstrings, or an analytic expectation value) into result objects with a
//! statistical query surface.
//!
//! # Overview
//!
//! - [`Counts`]: ordered bitstring → count map with probability,
//!   Z-expectation, most-probable outcome, sequential expansion, and
//!   marginalization
//! - [`Register`]: named [`Counts`]; [`GLOBAL_REGISTER`] is the default
//! - [`SampleResult`]: the registers of one sampling run, with a
//!   single-register view when exactly one register exists
//! - [`ObserveResult`]: a [`SampleResult`] keyed by Hamiltonian term, plus
//!   the Hamiltonian's expectation value
//! - [`Platform`]: call-boundary validation and dispatch to an immutable
//!   [`TargetRegistry`] of [`Executor`]s, returning [`TaskHandle`]s
//! - [`MeasureError`] for every failure
//!
//! # Example
//!
//! ```
//! use sample_result::{Counts, SampleResult};
//!
//! let counts = Counts::from_pairs([("0101", 1000)])?;
//! let result = SampleResult::new(counts);
//!
//! let pair = result.get_marginal_counts(&[1, 0])?;
//! assert_eq!(pair.most_probable(), Some("10"));
//! assert_eq!(result.expectation_z()?, 1.0);
//! assert_eq!(result.to_string(), "{ 0101:1000 }\n");
//! # Ok::<(), sample_result::MeasureError>(())
//! ```
//!
//! # Lifecycle
//!
//! ```text
//!   Platform::sample_async() ──→ TaskHandle::get() ──→ SampleResult ──→ clear()
//!     (validates, dispatches)      (blocks)            (Populated)      (Cleared)
//! ```

pub mod config;
pub mod counts;
pub mod error;
pub mod executor;
pub mod job;
pub mod kernel;
pub mod observe;
pub mod platform;
pub mod register;
pub mod registry;
pub mod sample;
pub mod spin;

pub use config::PlatformConfig;
pub use counts::Counts;
pub use error::{MeasureError, MeasureResult};
pub use executor::{ExecutionData, Executor};
pub use job::{ObserveHandle, SampleHandle, TargetId, TaskHandle};
pub use kernel::{ArgValue, Kernel, KernelSignature, ParamType, Shots};
pub use observe::ObserveResult;
pub use platform::{Platform, PlatformBuilder};
pub use register::{GLOBAL_REGISTER, Register};
pub use registry::{Target, TargetRegistry};
pub use sample::{RegisterLayout, ResultState, SampleResult};
pub use spin::{Hamiltonian, Pauli, SpinTerm};
