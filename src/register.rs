//! Named measurement registers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::counts::Counts;
use crate::error::MeasureResult;

/// Name of the default register, holding outcomes of unlabeled measurements.
pub const GLOBAL_REGISTER: &str = "__global__";

/// A named bucket of measurement outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    name: String,
    counts: Counts,
}

impl Register {
    /// Create a register from its name and counts.
    pub fn new(name: impl Into<String>, counts: Counts) -> Self {
        Self {
            name: name.into(),
            counts,
        }
    }

    /// Create the default register.
    pub fn global(counts: Counts) -> Self {
        Self::new(GLOBAL_REGISTER, counts)
    }

    /// Register name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Borrow the underlying counts.
    pub fn counts(&self) -> &Counts {
        &self.counts
    }

    /// Take the underlying counts, dropping the name.
    pub fn into_counts(self) -> Counts {
        self.counts
    }

    /// Count for `bitstring`, 0 if it was never observed.
    pub fn count(&self, bitstring: &str) -> MeasureResult<u64> {
        self.counts.count(bitstring)
    }

    /// Check whether `bitstring` was observed at least once.
    pub fn contains(&self, bitstring: &str) -> bool {
        self.counts.contains(bitstring)
    }

    /// Total number of shots.
    pub fn total(&self) -> u64 {
        self.counts.total()
    }

    /// Number of distinct bitstrings.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if no bitstring was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate over (bitstring, count) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter()
    }

    /// Iterate over distinct bitstrings in insertion order.
    pub fn bitstrings(&self) -> impl Iterator<Item = &str> {
        self.counts.bitstrings()
    }

    /// Iterate over counts in insertion order.
    pub fn values(&self) -> impl Iterator<Item = u64> {
        self.counts.values()
    }

    /// Probability of observing `bitstring`.
    pub fn probability(&self, bitstring: &str) -> MeasureResult<f64> {
        self.counts.probability(bitstring)
    }

    /// Most frequently observed bitstring; ties go to the first inserted.
    pub fn most_probable(&self) -> Option<&str> {
        self.counts.most_probable()
    }

    /// Z-basis expectation value, 0 when nothing was recorded.
    pub fn expectation_z(&self) -> f64 {
        self.counts.expectation_z()
    }

    /// One bitstring per shot, in insertion order.
    pub fn sequential_data(&self) -> Vec<String> {
        self.counts.sequential_data()
    }

    /// Marginalize onto `indices`, keeping this register's name.
    pub fn get_marginal_counts(&self, indices: &[usize]) -> MeasureResult<Register> {
        Ok(Self::new(self.name.clone(), self.counts.marginal(indices)?))
    }

    /// Empty the counts in place; the name is kept.
    pub fn clear(&mut self) {
        self.counts.clear();
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.counts, f)
    }
}
