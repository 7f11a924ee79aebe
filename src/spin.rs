//! Hamiltonian terms as consumed by the observe path.
//!
//! Only what the aggregator needs is modeled: a real coefficient and a
//! canonical identity per term. Term algebra lives elsewhere.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    I,
    X,
    Y,
    Z,
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Pauli::I => "I",
            Pauli::X => "X",
            Pauli::Y => "Y",
            Pauli::Z => "Z",
        };
        f.write_str(symbol)
    }
}

/// One additive term of a Hamiltonian: a coefficient times a Pauli string.
///
/// Position `i` of the Pauli string acts on qubit `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinTerm {
    coefficient: f64,
    paulis: Vec<Pauli>,
}

impl SpinTerm {
    /// Create a term from its coefficient and Pauli string.
    pub fn new(coefficient: f64, paulis: impl IntoIterator<Item = Pauli>) -> Self {
        Self {
            coefficient,
            paulis: paulis.into_iter().collect(),
        }
    }

    /// `Z` on `qubit`, identity elsewhere, over `num_qubits` qubits.
    pub fn z(qubit: usize, num_qubits: usize) -> Self {
        Self::single(Pauli::Z, qubit, num_qubits)
    }

    /// `pauli` on `qubit`, identity elsewhere, over `num_qubits` qubits.
    pub fn single(pauli: Pauli, qubit: usize, num_qubits: usize) -> Self {
        let width = num_qubits.max(qubit + 1);
        let paulis = (0..width).map(|q| if q == qubit { pauli } else { Pauli::I });
        Self::new(1.0, paulis)
    }

    /// Return the same term with another coefficient.
    pub fn with_coefficient(mut self, coefficient: f64) -> Self {
        self.coefficient = coefficient;
        self
    }

    /// Real coefficient of the term.
    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// Pauli factor on each qubit, by qubit index.
    pub fn paulis(&self) -> &[Pauli] {
        &self.paulis
    }

    /// Number of qubits the term spans.
    pub fn num_qubits(&self) -> usize {
        self.paulis.len()
    }

    /// Check whether every factor is the identity.
    pub fn is_identity(&self) -> bool {
        self.paulis.iter().all(|&p| p == Pauli::I)
    }

    /// Canonical identity of the term, e.g. `Z0I1I2`.
    ///
    /// Observe runs store the term's outcomes in a register of this name.
    pub fn term_id(&self) -> String {
        self.paulis
            .iter()
            .enumerate()
            .map(|(qubit, pauli)| format!("{pauli}{qubit}"))
            .collect()
    }
}

impl fmt::Display for SpinTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {}", self.coefficient, self.term_id())
    }
}

/// A sum of spin terms, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hamiltonian {
    terms: Vec<SpinTerm>,
}

impl Hamiltonian {
    /// Create an empty Hamiltonian.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a term.
    pub fn with_term(mut self, term: SpinTerm) -> Self {
        self.terms.push(term);
        self
    }

    /// Append a term.
    pub fn push(&mut self, term: SpinTerm) {
        self.terms.push(term);
    }

    /// Terms in insertion order.
    pub fn terms(&self) -> &[SpinTerm] {
        &self.terms
    }

    /// Number of terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Largest qubit count over all terms.
    pub fn num_qubits(&self) -> usize {
        self.terms.iter().map(SpinTerm::num_qubits).max().unwrap_or(0)
    }
}

impl FromIterator<SpinTerm> for Hamiltonian {
    fn from_iter<I: IntoIterator<Item = SpinTerm>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

impl std::ops::Index<usize> for Hamiltonian {
    type Output = SpinTerm;

    fn index(&self, index: usize) -> &SpinTerm {
        &self.terms[index]
    }
}
