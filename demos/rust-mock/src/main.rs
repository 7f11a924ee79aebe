//! Minimal mock executor driving a `Platform`.
//!
//! The mock prepares a GHZ state on `num_qubits` qubits and splits shots
//! evenly between the all-zeros and all-ones outcomes. Run with
//! `RUST_LOG=debug` to see dispatch logging.

use std::sync::Arc;

use async_trait::async_trait;
use sample_result::{
    ArgValue, Counts, ExecutionData, Executor, Hamiltonian, Kernel, KernelSignature, MeasureError,
    MeasureResult, ParamType, Pauli, Platform, Shots, SpinTerm, TargetId,
};

/// A GHZ-preparation kernel taking one (unused) rotation angle.
struct GhzKernel {
    signature: KernelSignature,
    num_qubits: usize,
}

impl GhzKernel {
    fn new(num_qubits: usize) -> Self {
        Self {
            signature: KernelSignature::new("ghz", [ParamType::Float]),
            num_qubits,
        }
    }
}

impl Kernel for GhzKernel {
    fn signature(&self) -> &KernelSignature {
        &self.signature
    }
}

/// In-memory mock executor.
struct MockExecutor;

impl MockExecutor {
    /// `<term>` on a GHZ state: 1 for an even number of Zs, 0 otherwise.
    fn ghz_expectation(term: &SpinTerm) -> f64 {
        let zs = term.paulis().iter().filter(|&&p| p == Pauli::Z).count();
        if zs % 2 == 0 { 1.0 } else { 0.0 }
    }
}

#[async_trait]
impl Executor<GhzKernel> for MockExecutor {
    fn name(&self) -> &str {
        "mock-simulator"
    }

    async fn sample(
        &self,
        kernel: &GhzKernel,
        _args: &[ArgValue],
        shots: u32,
    ) -> MeasureResult<ExecutionData> {
        let zeros = "0".repeat(kernel.num_qubits);
        let ones = "1".repeat(kernel.num_qubits);
        let half = u64::from(shots / 2);
        let counts = Counts::from_pairs([(zeros, half), (ones, u64::from(shots) - half)])?;
        Ok(ExecutionData::global(counts))
    }

    async fn observe(
        &self,
        _kernel: &GhzKernel,
        _args: &[ArgValue],
        hamiltonian: &Hamiltonian,
        shots: Shots,
    ) -> MeasureResult<ExecutionData> {
        let Shots::Finite(n) = shots else {
            let expectation = hamiltonian
                .terms()
                .iter()
                .map(|t| t.coefficient() * Self::ghz_expectation(t))
                .sum();
            return Ok(ExecutionData::analytic(expectation));
        };

        let mut registers = Vec::new();
        for term in hamiltonian.terms().iter().filter(|t| !t.is_identity()) {
            let counts = if Self::ghz_expectation(term) > 0.0 {
                Counts::from_pairs([("0", u64::from(n))])?
            } else {
                let half = u64::from(n / 2);
                Counts::from_pairs([("0", half), ("1", u64::from(n) - half)])?
            };
            registers.push((term.term_id(), counts));
        }
        Ok(ExecutionData::registers(registers))
    }
}

fn main() -> Result<(), MeasureError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let platform = Platform::<GhzKernel>::builder().target(MockExecutor).build()?;
    let kernel = Arc::new(GhzKernel::new(4));
    println!("Targets: {:?}", platform.registry().names());
    println!();

    // Sample
    let result = platform.sample(&kernel, &[ArgValue::Float(0.5)], Some(1000))?;
    print!("Counts: {result}");
    println!("Total:  {}", result.total()?);
    println!("<Z>:    {:.3}", result.expectation_z()?);
    if let Some(bitstring) = result.most_probable()? {
        println!("Most probable: {bitstring}");
    }

    let pair = result.get_marginal_counts(&[0, 3])?;
    print!("Qubits 0 and 3: {pair}");
    println!();

    // Observe
    let hamiltonian = Hamiltonian::new()
        .with_term(SpinTerm::new(0.5, [Pauli::I; 4]))
        .with_term(SpinTerm::z(0, 4))
        .with_term(SpinTerm::new(-2.0, [Pauli::Z, Pauli::Z, Pauli::I, Pauli::I]));

    let observed = platform.observe(&kernel, &[ArgValue::Float(0.5)], &hamiltonian, Some(1000))?;
    println!("Terms:      {:?}", observed.term_ids());
    println!("<H> shots:  {:.3}", observed.expectation());

    let analytic = platform.observe(&kernel, &[ArgValue::Float(0.5)], &hamiltonian, Some(-1))?;
    println!("<H> exact:  {:.3}", analytic.expectation());
    println!();

    // Rejected at the call boundary
    let rejected = platform.sample_async(
        TargetId(1),
        Arc::clone(&kernel),
        vec![ArgValue::Float(0.5)],
        None,
    );
    match rejected {
        Ok(_) => println!("unexpected dispatch"),
        Err(e) => println!("Rejected: {e}"),
    }

    Ok(())
}
