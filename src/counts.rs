//! Bitstring counters.
//!
//! A [`Counts`] maps fixed-width bitstrings to occurrence counts. Bit `i` of a
//! bitstring is the character at position `i`, so `"01"` means qubit 0
//! measured `0` and qubit 1 measured `1`.
//!
//! Insertion order of distinct bitstrings is preserved. It fixes iteration,
//! display, sequential expansion, and the tie-break of
//! [`Counts::most_probable`]; it never changes a statistic.

use std::fmt;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};

use crate::error::{MeasureError, MeasureResult};

/// Ordered bitstring → count map backing a [`Counts`].
pub type CountMap = IndexMap<String, u64, FxBuildHasher>;

/// Measurement counts for one register.
///
/// All bitstrings share one width, fixed by the first stored bitstring and
/// released again by [`Counts::clear`]. Every stored count is positive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CountMap", into = "CountMap")]
pub struct Counts {
    counts: CountMap,
    /// Sum of `counts`; bounds every entry.
    total: u64,
}

impl Counts {
    /// Create empty counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create counts from an iterator of (bitstring, count) pairs.
    /// Duplicate bitstrings are accumulated, consistent with [`Counts::insert`].
    pub fn from_pairs(
        iter: impl IntoIterator<Item = (impl Into<String>, u64)>,
    ) -> MeasureResult<Self> {
        let mut counts = Self::new();
        for (k, v) in iter {
            counts.insert(k, v)?;
        }
        Ok(counts)
    }

    /// Add `count` observations of `bitstring`.
    ///
    /// The bitstring is validated even when `count` is 0, but a zero count
    /// stores nothing. Fails with `CountOverflow` when the total would exceed
    /// `u64::MAX`; the counts are unchanged in that case.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) -> MeasureResult<()> {
        let key = bitstring.into();
        if !key.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(MeasureError::InvalidBitstring(key));
        }
        self.check_width(&key)?;
        if count == 0 {
            return Ok(());
        }
        let Some(total) = self.total.checked_add(count) else {
            return Err(MeasureError::CountOverflow(key));
        };
        // Each entry is bounded by the total, so this cannot overflow.
        *self.counts.entry(key).or_default() += count;
        self.total = total;
        Ok(())
    }

    /// Width shared by every stored bitstring, `None` while empty.
    pub fn width(&self) -> Option<usize> {
        self.counts.keys().next().map(String::len)
    }

    /// Get the count for a bitstring, 0 if it was never observed.
    pub fn count(&self, bitstring: &str) -> MeasureResult<u64> {
        self.check_width(bitstring)?;
        Ok(self.counts.get(bitstring).copied().unwrap_or(0))
    }

    /// Check whether a bitstring was observed at least once.
    pub fn contains(&self, bitstring: &str) -> bool {
        self.counts.contains_key(bitstring)
    }

    /// Total number of shots.
    pub fn total(&self) -> u64 {
        self.total
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
        self.counts.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Iterate over distinct bitstrings in insertion order.
    pub fn bitstrings(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    /// Iterate over counts in insertion order.
    pub fn values(&self) -> impl Iterator<Item = u64> {
        self.counts.values().copied()
    }

    /// Probability of observing `bitstring`; 0 when nothing was recorded.
    #[allow(clippy::cast_precision_loss)]
    pub fn probability(&self, bitstring: &str) -> MeasureResult<f64> {
        let count = self.count(bitstring)?;
        let total = self.total();
        if total == 0 {
            return Ok(0.0);
        }
        Ok(count as f64 / total as f64)
    }

    /// Probabilities for each bitstring, in insertion order.
    #[allow(clippy::cast_precision_loss)]
    pub fn probabilities(&self) -> Vec<(&str, f64)> {
        let total = self.total() as f64;
        if total == 0.0 {
            return Vec::new();
        }
        self.iter().map(|(k, v)| (k, v as f64 / total)).collect()
    }

    /// Most frequently observed bitstring.
    ///
    /// Ties go to the bitstring inserted first.
    pub fn most_probable(&self) -> Option<&str> {
        let mut best: Option<(&str, u64)> = None;
        for (bitstring, count) in self.iter() {
            match best {
                Some((_, top)) if count <= top => {}
                _ => best = Some((bitstring, count)),
            }
        }
        best.map(|(bitstring, _)| bitstring)
    }

    /// Z-basis expectation value.
    ///
    /// Each outcome contributes `+1` for an even number of `1` bits and `-1`
    /// for an odd number, weighted by its count. Returns 0 when nothing was
    /// recorded.
    #[allow(clippy::cast_precision_loss)]
    pub fn expectation_z(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let signed: i128 = self
            .iter()
            .map(|(bitstring, count)| i128::from(count) * i128::from(parity(bitstring)))
            .sum();
        signed as f64 / total as f64
    }

    /// Expand into one bitstring per shot.
    ///
    /// Distinct bitstrings appear in insertion order, each repeated by its
    /// count. This is a deterministic expansion, not the acquisition order.
    pub fn sequential_data(&self) -> Vec<String> {
        let capacity = usize::try_from(self.total).unwrap_or(usize::MAX).min(1 << 20);
        let mut data = Vec::with_capacity(capacity);
        for (bitstring, count) in self.iter() {
            for _ in 0..count {
                data.push(bitstring.to_string());
            }
        }
        data
    }

    /// Project every bitstring onto `indices`, summing counts that collide.
    ///
    /// Output bit `i` is input bit `indices[i]`, so the order of `indices`
    /// matters. The result has width `indices.len()`.
    pub fn marginal(&self, indices: &[usize]) -> MeasureResult<Counts> {
        for (pos, &index) in indices.iter().enumerate() {
            if indices[..pos].contains(&index) {
                return Err(MeasureError::DuplicateIndex(index));
            }
        }

        let Some(width) = self.width() else {
            return Ok(Counts::new());
        };
        if let Some(&index) = indices.iter().find(|&&index| index >= width) {
            return Err(MeasureError::IndexOutOfRange { index, width });
        }

        let mut projected = CountMap::default();
        for (bitstring, count) in self.iter() {
            let bits = bitstring.as_bytes();
            let key: String = indices.iter().map(|&i| char::from(bits[i])).collect();
            *projected.entry(key).or_default() += count;
        }
        Ok(Counts {
            counts: projected,
            total: self.total,
        })
    }

    /// Get sorted counts (by count, descending; ties keep insertion order).
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut items: Vec<_> = self.iter().collect();
        items.sort_by(|a, b| b.1.cmp(&a.1));
        items
    }

    /// Remove every bitstring. The width is released.
    pub fn clear(&mut self) {
        self.counts.clear();
        self.total = 0;
    }

    /// Write `{ b:c b:c }` without the trailing newline.
    pub(crate) fn fmt_inline(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ ")?;
        for (bitstring, count) in self.iter() {
            write!(f, "{bitstring}:{count} ")?;
        }
        write!(f, "}}")
    }

    fn check_width(&self, bitstring: &str) -> MeasureResult<()> {
        match self.width() {
            Some(expected) if expected != bitstring.len() => Err(MeasureError::LengthMismatch {
                expected,
                found: bitstring.len(),
            }),
            _ => Ok(()),
        }
    }
}

/// `+1` for an even number of `1` bits, `-1` for an odd number.
fn parity(bitstring: &str) -> i8 {
    if bitstring.bytes().filter(|&b| b == b'1').count() % 2 == 0 {
        1
    } else {
        -1
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_inline(f)?;
        writeln!(f)
    }
}

impl TryFrom<CountMap> for Counts {
    type Error = MeasureError;

    fn try_from(map: CountMap) -> MeasureResult<Self> {
        Self::from_pairs(map)
    }
}

impl From<Counts> for CountMap {
    fn from(counts: Counts) -> Self {
        counts.counts
    }
}
