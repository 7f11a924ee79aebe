//! Observe results.
//!
//! An observe run estimates `<H>` for a Hamiltonian `H = Σ cᵢ Pᵢ`. With shots,
//! each non-identity term `Pᵢ` is measured into its own register, named by the
//! term's canonical identity, and
//!
//! ```text
//!   <H> = Σ cᵢ · register(Pᵢ).expectation_z()
//! ```
//!
//! Identity terms contribute `cᵢ` directly and own no register. Without shots
//! (`shots = -1`) the executor returns `<H>` itself; the result then carries no
//! shot data and [`ObserveResult::analytic_expectation`] reports the scalar.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MeasureError, MeasureResult};
use crate::register::Register;
use crate::sample::{ResultState, SampleResult};
use crate::spin::{Hamiltonian, SpinTerm};

/// Where one Hamiltonian term's outcomes live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TermEntry {
    /// Register holding the term's outcomes; `None` for identity terms.
    register: Option<String>,
    /// Summed coefficient of every term sharing this identity.
    coefficient: f64,
}

/// Result of one observe run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ObserveResultData", into = "ObserveResultData")]
pub struct ObserveResult {
    data: SampleResult,
    /// Term identity → entry, in Hamiltonian order. Fixed at construction.
    terms: IndexMap<String, TermEntry, FxBuildHasher>,
    analytic: Option<f64>,
}

impl ObserveResult {
    /// Build a shot-based result.
    ///
    /// Every non-identity term of `hamiltonian` must have a register in `data`.
    pub fn from_shots(hamiltonian: &Hamiltonian, data: SampleResult) -> MeasureResult<Self> {
        let terms = term_map(hamiltonian);
        for entry in terms.values() {
            if let Some(register) = &entry.register {
                data.get_register_counts(register)?;
            }
        }
        debug!(
            terms = terms.len(),
            registers = data.register_names().len(),
            "Built shot-based observe result"
        );
        Ok(Self {
            data,
            terms,
            analytic: None,
        })
    }

    /// Build a result from an analytically computed expectation value.
    pub fn analytic(hamiltonian: &Hamiltonian, expectation: f64) -> Self {
        Self {
            data: SampleResult::default(),
            terms: term_map(hamiltonian),
            analytic: Some(expectation),
        }
    }

    /// Expectation value of the Hamiltonian.
    pub fn expectation(&self) -> f64 {
        if let Some(value) = self.analytic {
            return value;
        }
        self.terms
            .values()
            .map(|entry| entry.coefficient * self.register_expectation(entry))
            .sum()
    }

    /// Z-basis expectation of one term, without its coefficient.
    ///
    /// Identity terms report `1.0`. Fails with `UnknownRegister` for a term
    /// outside the Hamiltonian, or when the run carried no shot data.
    pub fn expectation_for(&self, term: &SpinTerm) -> MeasureResult<f64> {
        let entry = self.entry(term)?;
        match &entry.register {
            None => Ok(1.0),
            Some(name) => Ok(self.data.get_register_counts(name)?.expectation_z()),
        }
    }

    /// Expectation value computed without shots, if this was an analytic run.
    pub fn analytic_expectation(&self) -> Option<f64> {
        self.analytic
    }

    /// Check whether this result carries shot data.
    pub fn has_shots(&self) -> bool {
        self.analytic.is_none()
    }

    /// Every register produced by the run.
    pub fn counts(&self) -> &SampleResult {
        &self.data
    }

    /// Counts of a single Hamiltonian term.
    pub fn counts_for(&self, term: &SpinTerm) -> MeasureResult<&Register> {
        self.counts_for_id(&term.term_id())
    }

    /// Counts of the term with canonical identity `term_id`.
    pub fn counts_for_id(&self, term_id: &str) -> MeasureResult<&Register> {
        let entry = self
            .terms
            .get(term_id)
            .ok_or_else(|| MeasureError::UnknownRegister(term_id.to_string()))?;
        let name = entry
            .register
            .as_deref()
            .ok_or_else(|| MeasureError::UnknownRegister(term_id.to_string()))?;
        self.data.get_register_counts(name)
    }

    /// Term identities in Hamiltonian order.
    pub fn term_ids(&self) -> Vec<&str> {
        self.terms.keys().map(String::as_str).collect()
    }

    /// Lifecycle state of the shot data.
    pub fn state(&self) -> ResultState {
        self.data.state()
    }

    /// Empty every register. The term mapping and any analytic value are kept.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    fn entry(&self, term: &SpinTerm) -> MeasureResult<&TermEntry> {
        let id = term.term_id();
        self.terms
            .get(&id)
            .ok_or(MeasureError::UnknownRegister(id))
    }

    fn register_expectation(&self, entry: &TermEntry) -> f64 {
        match &entry.register {
            None => 1.0,
            // Presence is checked in `from_shots` and `clear` keeps registers.
            Some(name) => self
                .data
                .get_register_counts(name)
                .map_or(0.0, Register::expectation_z),
        }
    }
}

/// Stored form of an [`ObserveResult`], checked again on load.
#[derive(Serialize, Deserialize)]
struct ObserveResultData {
    data: SampleResult,
    terms: IndexMap<String, TermEntry, FxBuildHasher>,
    analytic: Option<f64>,
}

impl From<ObserveResult> for ObserveResultData {
    fn from(result: ObserveResult) -> Self {
        Self {
            data: result.data,
            terms: result.terms,
            analytic: result.analytic,
        }
    }
}

impl TryFrom<ObserveResultData> for ObserveResult {
    type Error = MeasureError;

    fn try_from(stored: ObserveResultData) -> MeasureResult<Self> {
        for (id, entry) in &stored.terms {
            let Some(register) = &entry.register else {
                continue;
            };
            if register != id {
                return Err(MeasureError::MalformedResult(format!(
                    "term {id} maps to register {register}"
                )));
            }
            if stored.analytic.is_none() {
                stored.data.get_register_counts(register)?;
            }
        }
        Ok(Self {
            data: stored.data,
            terms: stored.terms,
            analytic: stored.analytic,
        })
    }
}

fn term_map(hamiltonian: &Hamiltonian) -> IndexMap<String, TermEntry, FxBuildHasher> {
    let mut terms: IndexMap<String, TermEntry, FxBuildHasher> = IndexMap::default();
    for term in hamiltonian.terms() {
        let id = term.term_id();
        let register = (!term.is_identity()).then(|| id.clone());
        terms
            .entry(id)
            .and_modify(|entry| entry.coefficient += term.coefficient())
            .or_insert(TermEntry {
                register,
                coefficient: term.coefficient(),
            });
    }
    terms
}
