//! Sampling results.
//!
//! A [`SampleResult`] groups the [`Register`]s produced by one sampling run.
//! The default register [`GLOBAL_REGISTER`] always exists and comes first.
//! When a run only fills named registers, it is added empty. The
//! [`RegisterLayout`] is fixed at construction:
//!
//! - `Single`: one register holds the data, either the default register
//!   alone or one named register next to an empty default register.
//!   Result-level queries (`count`, `expectation_z`, `most_probable`,
//!   iteration, ...) read that register.
//! - `Multi`: several registers. Result-level queries fail with
//!   [`MeasureError::AmbiguousRegister`]; use the `*_in` variants or
//!   [`SampleResult::get_register_counts`].
//!
//! The result has two states, `Populated` and `Cleared`. [`SampleResult::clear`]
//! is the only mutation and is idempotent.

use std::fmt;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::counts::Counts;
use crate::error::{MeasureError, MeasureResult};
use crate::register::{GLOBAL_REGISTER, Register};

/// How result-level queries resolve their register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegisterLayout {
    /// One register; result-level queries delegate to it.
    Single,
    /// Several registers; queries must name one.
    Multi,
}

/// Lifecycle state of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultState {
    /// Holds the counts produced by the run.
    Populated,
    /// Counts were discarded by `clear()`. Terminal.
    Cleared,
}

/// Measurement outcomes of one sampling run, grouped by register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SampleResultData", into = "SampleResultData")]
pub struct SampleResult {
    /// Registers in registration order.
    registers: IndexMap<String, Register, FxBuildHasher>,
    layout: RegisterLayout,
    state: ResultState,
}

impl SampleResult {
    /// Create a result holding only the default register.
    pub fn new(counts: Counts) -> Self {
        let mut registers = IndexMap::default();
        registers.insert(GLOBAL_REGISTER.to_string(), Register::global(counts));
        Self {
            registers,
            layout: RegisterLayout::Single,
            state: ResultState::Populated,
        }
    }

    /// Create a result from (register name, counts) pairs.
    ///
    /// Registers keep the order of first appearance; repeated names are
    /// merged. The default register is added empty, in first position, when
    /// no pair names it.
    pub fn from_registers(
        iter: impl IntoIterator<Item = (impl Into<String>, Counts)>,
    ) -> MeasureResult<Self> {
        let mut merged: IndexMap<String, Counts, FxBuildHasher> = IndexMap::default();
        for (name, counts) in iter {
            let name = name.into();
            match merged.get_mut(&name) {
                Some(existing) => {
                    for (bitstring, count) in counts.iter() {
                        existing.insert(bitstring, count)?;
                    }
                }
                None => {
                    merged.insert(name, counts);
                }
            }
        }

        if !merged.contains_key(GLOBAL_REGISTER) {
            merged.shift_insert(0, GLOBAL_REGISTER.to_string(), Counts::new());
        }

        let named = merged.len() - 1;
        let global_empty = merged.get(GLOBAL_REGISTER).is_none_or(Counts::is_empty);
        let layout = if named == 0 || (named == 1 && global_empty) {
            RegisterLayout::Single
        } else {
            RegisterLayout::Multi
        };
        let registers = merged
            .into_iter()
            .map(|(name, counts)| (name.clone(), Register::new(name, counts)))
            .collect();

        Ok(Self {
            registers,
            layout,
            state: ResultState::Populated,
        })
    }

    /// How result-level queries resolve their register.
    pub fn layout(&self) -> RegisterLayout {
        self.layout
    }

    /// Lifecycle state.
    pub fn state(&self) -> ResultState {
        self.state
    }

    /// Register names in registration order.
    pub fn register_names(&self) -> Vec<&str> {
        self.registers.keys().map(String::as_str).collect()
    }

    /// Iterate over every register in registration order.
    pub fn registers(&self) -> impl Iterator<Item = &Register> {
        self.registers.values()
    }

    /// Look up a register by name.
    pub fn get_register_counts(&self, name: &str) -> MeasureResult<&Register> {
        self.registers
            .get(name)
            .ok_or_else(|| MeasureError::UnknownRegister(name.to_string()))
    }

    /// The register result-level queries read from.
    pub fn single(&self) -> MeasureResult<&Register> {
        match self.layout {
            RegisterLayout::Single => self
                .registers
                .values()
                .find(|r| self.registers.len() == 1 || r.name() != GLOBAL_REGISTER)
                .ok_or_else(|| MeasureError::UnknownRegister(GLOBAL_REGISTER.to_string())),
            RegisterLayout::Multi => Err(MeasureError::AmbiguousRegister(
                self.registers.keys().cloned().collect(),
            )),
        }
    }

    // ── Single-register view ─────────────────────────────────────────

    /// Count for `bitstring`, 0 if it was never observed.
    pub fn count(&self, bitstring: &str) -> MeasureResult<u64> {
        self.single()?.count(bitstring)
    }

    /// Check whether `bitstring` was observed at least once.
    pub fn contains(&self, bitstring: &str) -> MeasureResult<bool> {
        Ok(self.single()?.contains(bitstring))
    }

    /// Number of distinct bitstrings.
    pub fn len(&self) -> MeasureResult<usize> {
        Ok(self.single()?.len())
    }

    /// Check if no bitstring was recorded.
    pub fn is_empty(&self) -> MeasureResult<bool> {
        Ok(self.single()?.is_empty())
    }

    /// Distinct bitstrings, not expanded by count.
    pub fn iter(&self) -> MeasureResult<impl Iterator<Item = &str>> {
        Ok(self.single()?.bitstrings())
    }

    /// (bitstring, count) pairs in insertion order.
    pub fn items(&self) -> MeasureResult<impl Iterator<Item = (&str, u64)>> {
        Ok(self.single()?.iter())
    }

    /// Counts in insertion order.
    pub fn values(&self) -> MeasureResult<impl Iterator<Item = u64>> {
        Ok(self.single()?.values())
    }

    /// Total number of shots.
    pub fn total(&self) -> MeasureResult<u64> {
        Ok(self.single()?.total())
    }

    /// Z-basis expectation value.
    pub fn expectation_z(&self) -> MeasureResult<f64> {
        Ok(self.single()?.expectation_z())
    }

    /// Probability of observing `bitstring`.
    pub fn probability(&self, bitstring: &str) -> MeasureResult<f64> {
        self.single()?.probability(bitstring)
    }

    /// Most frequently observed bitstring.
    pub fn most_probable(&self) -> MeasureResult<Option<&str>> {
        Ok(self.single()?.most_probable())
    }

    /// Marginalize onto `indices`.
    pub fn get_marginal_counts(&self, indices: &[usize]) -> MeasureResult<Register> {
        self.single()?.get_marginal_counts(indices)
    }

    /// One bitstring per shot, in insertion order.
    pub fn get_sequential_data(&self) -> MeasureResult<Vec<String>> {
        Ok(self.single()?.sequential_data())
    }

    /// Ordered (bitstring, count) snapshot of the single register.
    pub fn to_map(&self) -> MeasureResult<Vec<(String, u64)>> {
        Ok(self
            .single()?
            .iter()
            .map(|(bitstring, count)| (bitstring.to_string(), count))
            .collect())
    }

    // ── Named-register view ──────────────────────────────────────────

    /// [`SampleResult::count`] on the register named `register`.
    pub fn count_in(&self, register: &str, bitstring: &str) -> MeasureResult<u64> {
        self.get_register_counts(register)?.count(bitstring)
    }

    /// [`SampleResult::probability`] on the register named `register`.
    pub fn probability_in(&self, register: &str, bitstring: &str) -> MeasureResult<f64> {
        self.get_register_counts(register)?.probability(bitstring)
    }

    /// [`SampleResult::most_probable`] on the register named `register`.
    pub fn most_probable_in(&self, register: &str) -> MeasureResult<Option<&str>> {
        Ok(self.get_register_counts(register)?.most_probable())
    }

    /// [`SampleResult::expectation_z`] on the register named `register`.
    pub fn expectation_z_in(&self, register: &str) -> MeasureResult<f64> {
        Ok(self.get_register_counts(register)?.expectation_z())
    }

    /// [`SampleResult::get_sequential_data`] on the register named `register`.
    pub fn sequential_data_in(&self, register: &str) -> MeasureResult<Vec<String>> {
        Ok(self.get_register_counts(register)?.sequential_data())
    }

    /// [`SampleResult::get_marginal_counts`] on the register named `register`.
    pub fn marginal_in(&self, register: &str, indices: &[usize]) -> MeasureResult<Register> {
        self.get_register_counts(register)?
            .get_marginal_counts(indices)
    }

    /// Print the string form to standard output.
    pub fn dump(&self) {
        print!("{self}");
    }

    /// Empty every register in place. Names and layout are kept.
    pub fn clear(&mut self) {
        for register in self.registers.values_mut() {
            register.clear();
        }
        if self.state == ResultState::Populated {
            debug!(registers = self.registers.len(), "Cleared sample result");
        }
        self.state = ResultState::Cleared;
    }
}

/// Stored form of a [`SampleResult`]. Loading goes through
/// [`SampleResult::from_registers`], so the layout is derived again.
#[derive(Serialize, Deserialize)]
struct SampleResultData {
    registers: IndexMap<String, Counts, FxBuildHasher>,
    state: ResultState,
}

impl From<SampleResult> for SampleResultData {
    fn from(result: SampleResult) -> Self {
        Self {
            registers: result
                .registers
                .into_iter()
                .map(|(name, register)| (name, register.into_counts()))
                .collect(),
            state: result.state,
        }
    }
}

impl TryFrom<SampleResultData> for SampleResult {
    type Error = MeasureError;

    fn try_from(data: SampleResultData) -> MeasureResult<Self> {
        let mut result = Self::from_registers(data.registers)?;
        if data.state == ResultState::Cleared {
            if let Some(register) = result.registers.values().find(|r| !r.is_empty()) {
                return Err(MeasureError::MalformedResult(format!(
                    "cleared result holds counts in register {}",
                    register.name()
                )));
            }
            result.state = ResultState::Cleared;
        }
        Ok(result)
    }
}

impl Default for SampleResult {
    fn default() -> Self {
        Self::new(Counts::new())
    }
}

/// Single layout prints the register itself: `{ 00:5 11:5 }`.
/// Multi layout lists every non-empty register by name, and prints `{ }`
/// once all of them are empty.
impl fmt::Display for SampleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Ok(register) = self.single() {
            return fmt::Display::fmt(register, f);
        }

        let mut filled = self.registers.values().filter(|r| !r.is_empty()).peekable();
        if filled.peek().is_none() {
            return writeln!(f, "{{ }}");
        }
        writeln!(f, "{{ ")?;
        for register in filled {
            write!(f, "  {} : ", register.name())?;
            register.counts().fmt_inline(f)?;
            writeln!(f)?;
        }
        writeln!(f, "}}")
    }
}
