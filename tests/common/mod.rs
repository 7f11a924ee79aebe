//! Deterministic kernels and executors shared by the integration tests.

#![allow(dead_code)]

use std::f64::consts::FRAC_PI_2;

use async_trait::async_trait;
use sample_result::{
    ArgValue, Counts, ExecutionData, Executor, Hamiltonian, Kernel, KernelSignature,
    MeasureError, MeasureResult, ParamType, Pauli, Shots, SpinTerm,
};

/// Maps run-time arguments to the computational basis state a kernel prepares.
pub type Prepare = Box<dyn Fn(&[ArgValue], usize) -> String + Send + Sync>;

/// A kernel that prepares one basis state.
pub struct BasisKernel {
    signature: KernelSignature,
    num_qubits: usize,
    prepare: Prepare,
}

impl BasisKernel {
    pub fn new(
        name: &str,
        params: impl IntoIterator<Item = ParamType>,
        num_qubits: usize,
        prepare: impl Fn(&[ArgValue], usize) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            signature: KernelSignature::new(name, params),
            num_qubits,
            prepare: Box::new(prepare),
        }
    }

    /// `x` on every qubit.
    pub fn all_ones(num_qubits: usize) -> Self {
        Self::new("all_ones", [], num_qubits, |_, n| "1".repeat(n))
    }

    /// A fixed bitstring, no parameters.
    pub fn fixed(name: &str, state: &str) -> Self {
        let state = state.to_string();
        Self::new(name, [], state.len(), move |_, _| state.clone())
    }

    /// `ry(theta)` on one qubit; angles past π/2 read as `1`.
    pub fn rotation() -> Self {
        Self::new("rotation", [ParamType::Float], 1, |args, _| {
            let theta = args[0].as_f64().unwrap_or_default();
            let bit = if theta > FRAC_PI_2 { "1" } else { "0" };
            bit.to_string()
        })
    }

    /// `x` on every qubit whose list entry exceeds 0.5.
    pub fn flips() -> Self {
        Self::new("flips", [ParamType::List], 0, |args, _| {
            args[0]
                .as_list()
                .unwrap_or_default()
                .iter()
                .map(|&v| if v > 0.5 { '1' } else { '0' })
                .collect()
        })
    }

    pub fn state(&self, args: &[ArgValue]) -> String {
        (self.prepare)(args, self.num_qubits)
    }
}

impl Kernel for BasisKernel {
    fn signature(&self) -> &KernelSignature {
        &self.signature
    }
}

/// Sign of a Z-only term on `state`; `None` when the term has X or Y factors.
fn z_parity(term: &SpinTerm, state: &str) -> Option<bool> {
    let mut odd = false;
    for (pauli, bit) in term.paulis().iter().zip(state.bytes()) {
        match pauli {
            Pauli::I => {}
            Pauli::Z => odd ^= bit == b'1',
            Pauli::X | Pauli::Y => return None,
        }
    }
    Some(odd)
}

/// Executor that measures the prepared basis state exactly.
pub struct BasisExecutor;

#[async_trait]
impl Executor<BasisKernel> for BasisExecutor {
    fn name(&self) -> &str {
        "basis"
    }

    async fn sample(
        &self,
        kernel: &BasisKernel,
        args: &[ArgValue],
        shots: u32,
    ) -> MeasureResult<ExecutionData> {
        let counts = Counts::from_pairs([(kernel.state(args), u64::from(shots))])?;
        Ok(ExecutionData::global(counts))
    }

    async fn observe(
        &self,
        kernel: &BasisKernel,
        args: &[ArgValue],
        hamiltonian: &Hamiltonian,
        shots: Shots,
    ) -> MeasureResult<ExecutionData> {
        let state = kernel.state(args);
        let Shots::Finite(n) = shots else {
            let expectation = hamiltonian
                .terms()
                .iter()
                .map(|term| match z_parity(term, &state) {
                    Some(true) => -term.coefficient(),
                    Some(false) => term.coefficient(),
                    None => 0.0,
                })
                .sum();
            return Ok(ExecutionData::analytic(expectation));
        };

        let n = u64::from(n);
        let mut registers = Vec::new();
        for term in hamiltonian.terms().iter().filter(|t| !t.is_identity()) {
            let counts = match z_parity(term, &state) {
                Some(true) => Counts::from_pairs([("1", n)])?,
                Some(false) => Counts::from_pairs([("0", n)])?,
                None => Counts::from_pairs([("0", n / 2), ("1", n - n / 2)])?,
            };
            registers.push((term.term_id(), counts));
        }
        Ok(ExecutionData::registers(registers))
    }
}

/// Executor that always prepares a Bell pair, whatever the kernel.
pub struct BellExecutor;

#[async_trait]
impl Executor<BasisKernel> for BellExecutor {
    fn name(&self) -> &str {
        "bell"
    }

    async fn sample(
        &self,
        _kernel: &BasisKernel,
        _args: &[ArgValue],
        shots: u32,
    ) -> MeasureResult<ExecutionData> {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let half = u64::from(shots / 2);
        let counts = Counts::from_pairs([("00", half), ("11", u64::from(shots) - half)])?;
        Ok(ExecutionData::global(counts))
    }

    async fn observe(
        &self,
        _kernel: &BasisKernel,
        _args: &[ArgValue],
        _hamiltonian: &Hamiltonian,
        _shots: Shots,
    ) -> MeasureResult<ExecutionData> {
        Err(MeasureError::ExecutionFailed("bell executor cannot observe".into()))
    }
}

/// Executor whose device is always offline.
pub struct OfflineExecutor;

#[async_trait]
impl Executor<BasisKernel> for OfflineExecutor {
    fn name(&self) -> &str {
        "offline"
    }

    async fn sample(
        &self,
        _kernel: &BasisKernel,
        _args: &[ArgValue],
        _shots: u32,
    ) -> MeasureResult<ExecutionData> {
        Err(MeasureError::ExecutionFailed("device offline".into()))
    }

    async fn observe(
        &self,
        _kernel: &BasisKernel,
        _args: &[ArgValue],
        _hamiltonian: &Hamiltonian,
        _shots: Shots,
    ) -> MeasureResult<ExecutionData> {
        Err(MeasureError::ExecutionFailed("device offline".into()))
    }
}
