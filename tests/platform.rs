//! End-to-end runs through `Platform`.

mod common;

use std::sync::Arc;

use common::{BasisExecutor, BasisKernel, BellExecutor, OfflineExecutor};
use sample_result::{
    ArgValue, GLOBAL_REGISTER, Hamiltonian, MeasureError, ParamType, Pauli, Platform,
    PlatformConfig, ResultState, SpinTerm, TargetId,
};

fn basis_platform() -> Platform<BasisKernel> {
    Platform::<BasisKernel>::builder().target(BasisExecutor).build().unwrap()
}

#[test]
fn test_sample_all_ones() {
    let platform = basis_platform();
    for qubits in [1, 5, 9] {
        let kernel = Arc::new(BasisKernel::all_ones(qubits));
        let ones = "1".repeat(qubits);
        for shots in [10, 100, 1000] {
            let result = platform.sample(&kernel, &[], Some(shots)).unwrap();
            assert_eq!(result.len().unwrap(), 1);
            assert_eq!(result.count(&ones).unwrap(), shots as u64);
            assert_eq!(result.total().unwrap(), shots as u64);
            assert_eq!(result.most_probable().unwrap(), Some(ones.as_str()));
            assert_eq!(result.probability(&ones).unwrap(), 1.0);

            let parity = if qubits % 2 == 0 { 1.0 } else { -1.0 };
            assert_eq!(result.expectation_z().unwrap(), parity);

            let sequential = result.get_sequential_data().unwrap();
            assert_eq!(sequential.len(), shots as usize);
            assert!(sequential.iter().all(|s| *s == ones));
        }
    }
}

#[test]
fn test_sample_default_shots() {
    let platform = Platform::<BasisKernel>::builder()
        .config(PlatformConfig::default().with_default_shots(250))
        .target(BasisExecutor)
        .build()
        .unwrap();
    let kernel = Arc::new(BasisKernel::all_ones(2));
    let result = platform.sample(&kernel, &[], None).unwrap();
    assert_eq!(result.count("11").unwrap(), 250);
}

#[test]
fn test_sample_with_float_argument() {
    let platform = basis_platform();
    let kernel = Arc::new(BasisKernel::rotation());

    let flipped = platform
        .sample(&kernel, &[ArgValue::Float(3.14)], Some(100))
        .unwrap();
    assert_eq!(flipped.count("1").unwrap(), 100);

    let untouched = platform
        .sample(&kernel, &[ArgValue::Float(0.1)], Some(100))
        .unwrap();
    assert_eq!(untouched.count("0").unwrap(), 100);
    assert_eq!(untouched.count("1").unwrap(), 0);

    // Integers widen to floats.
    let widened = platform.sample(&kernel, &[ArgValue::Int(3)], Some(10)).unwrap();
    assert_eq!(widened.count("1").unwrap(), 10);
}

#[test]
fn test_sample_with_list_argument() {
    let platform = basis_platform();
    let kernel = Arc::new(BasisKernel::flips());
    let args = [ArgValue::List(vec![1.0, 0.0, 1.0])];
    let result = platform.sample(&kernel, &args, Some(50)).unwrap();
    assert_eq!(result.count("101").unwrap(), 50);
    assert_eq!(result.expectation_z().unwrap(), 1.0);
}

#[test]
fn test_argument_count_mismatch() {
    let platform = basis_platform();
    let kernel = Arc::new(BasisKernel::rotation());

    let err = platform.sample(&kernel, &[], Some(10)).unwrap_err();
    assert_eq!(
        err,
        MeasureError::ArgumentCountMismatch {
            kernel: "rotation".into(),
            expected: 1,
            found: 0,
        }
    );
    assert!(err.is_call_boundary());

    let err = platform
        .sample(&kernel, &[ArgValue::Float(1.0), ArgValue::Float(2.0)], Some(10))
        .unwrap_err();
    assert!(matches!(err, MeasureError::ArgumentCountMismatch { found: 2, .. }));
}

#[test]
fn test_argument_type_mismatch() {
    let platform = basis_platform();
    let kernel = Arc::new(BasisKernel::rotation());
    let err = platform
        .sample(&kernel, &[ArgValue::List(vec![1.0])], Some(10))
        .unwrap_err();
    assert_eq!(
        err,
        MeasureError::ArgumentTypeMismatch {
            kernel: "rotation".into(),
            position: 0,
            expected: ParamType::Float,
            found: ParamType::List,
        }
    );

    let list_kernel = Arc::new(BasisKernel::flips());
    let err = platform
        .sample(&list_kernel, &[ArgValue::Float(1.0)], Some(10))
        .unwrap_err();
    assert!(matches!(err, MeasureError::ArgumentTypeMismatch { .. }));
}

#[test]
fn test_invalid_shots_rejected() {
    let platform = basis_platform();
    let kernel = Arc::new(BasisKernel::all_ones(1));
    for shots in [0, -1, -7, 1_000_000] {
        let err = platform.sample(&kernel, &[], Some(shots)).unwrap_err();
        assert!(matches!(err, MeasureError::InvalidShots(_)), "shots = {shots}");
    }
}

#[test]
fn test_sample_async_invalid_target() {
    let platform = basis_platform();
    let kernel = Arc::new(BasisKernel::all_ones(2));
    for id in [1, 12] {
        let err = platform
            .sample_async(TargetId(id), Arc::clone(&kernel), Vec::new(), Some(10))
            .unwrap_err();
        assert_eq!(err, MeasureError::InvalidTarget { id, available: 1 });
    }
}

#[test]
fn test_invalid_target_checked_before_arguments() {
    let platform = basis_platform();
    let kernel = Arc::new(BasisKernel::rotation());
    let err = platform
        .sample_async(TargetId(3), kernel, Vec::new(), Some(-5))
        .unwrap_err();
    assert!(matches!(err, MeasureError::InvalidTarget { id: 3, .. }));
}

#[test]
fn test_sample_async_get() {
    let platform = Platform::<BasisKernel>::builder()
        .target(BasisExecutor)
        .target(BellExecutor)
        .build()
        .unwrap();
    let kernel = Arc::new(BasisKernel::all_ones(2));

    let handle = platform
        .sample_async(TargetId(1), kernel, Vec::new(), Some(100))
        .unwrap();
    assert_eq!(handle.target(), TargetId(1));

    let result = handle.get().unwrap();
    assert_eq!(result.count("00").unwrap(), 50);
    assert_eq!(result.count("11").unwrap(), 50);
    assert_eq!(result.expectation_z().unwrap(), 1.0);
}

#[test]
fn test_execution_failure_reaches_handle() {
    let platform = Platform::<BasisKernel>::builder().target(OfflineExecutor).build().unwrap();
    let kernel = Arc::new(BasisKernel::all_ones(1));
    let err = platform.sample(&kernel, &[], Some(10)).unwrap_err();
    assert_eq!(err, MeasureError::ExecutionFailed("device offline".into()));
}

#[test]
fn test_marginalize_fixed_state() {
    let platform = basis_platform();
    let kernel = Arc::new(BasisKernel::fixed("fixed", "0101"));
    let result = platform.sample(&kernel, &[], Some(1000)).unwrap();

    assert_eq!(result.to_string(), "{ 0101:1000 }\n");

    let even = result.get_marginal_counts(&[0, 2]).unwrap();
    assert_eq!(even.most_probable(), Some("00"));
    assert_eq!(even.count("00").unwrap(), 1000);

    let odd = result.get_marginal_counts(&[1, 3]).unwrap();
    assert_eq!(odd.most_probable(), Some("11"));

    let reordered = result.get_marginal_counts(&[3, 0]).unwrap();
    assert_eq!(reordered.most_probable(), Some("10"));

    for (indices, want) in [
        (&[0][..], "0"),
        (&[1], "1"),
        (&[0, 1], "01"),
        (&[1, 0], "10"),
        (&[0, 1, 2], "010"),
        (&[1, 2, 3], "101"),
    ] {
        let marginal = result.get_marginal_counts(indices).unwrap();
        assert_eq!(marginal.count(want).unwrap(), 1000, "indices = {indices:?}");
    }

    let err = result.get_marginal_counts(&[4]).unwrap_err();
    assert_eq!(err, MeasureError::IndexOutOfRange { index: 4, width: 4 });
}

#[test]
fn test_clear_is_idempotent() {
    let platform = basis_platform();
    let kernel = Arc::new(BasisKernel::all_ones(3));
    let mut result = platform.sample(&kernel, &[], Some(10)).unwrap();

    result.clear();
    assert_eq!(result.state(), ResultState::Cleared);
    assert_eq!(result.to_string(), "{ }\n");
    assert_eq!(result.total().unwrap(), 0);
    assert!(result.is_empty().unwrap());

    let snapshot = result.clone();
    result.clear();
    assert_eq!(result, snapshot);
}

#[test]
fn test_unknown_register_leaves_result_untouched() {
    let platform = basis_platform();
    let kernel = Arc::new(BasisKernel::all_ones(2));
    let result = platform.sample(&kernel, &[], Some(10)).unwrap();
    let snapshot = result.clone();

    let err = result.get_register_counts("missing").unwrap_err();
    assert_eq!(err, MeasureError::UnknownRegister("missing".into()));
    assert!(err.is_lookup());
    assert_eq!(result, snapshot);
}

fn z_on_each(qubits: usize) -> Hamiltonian {
    (0..qubits).map(|q| SpinTerm::z(q, qubits)).collect()
}

#[test]
fn test_observe_with_shots() {
    let platform = basis_platform();
    let kernel = Arc::new(BasisKernel::all_ones(3));
    let hamiltonian = z_on_each(3);

    for shots in [10, 100] {
        let result = platform
            .observe(&kernel, &[], &hamiltonian, Some(shots))
            .unwrap();
        assert!(result.has_shots());
        assert_eq!(result.expectation(), -3.0);
        assert_eq!(result.term_ids(), vec!["Z0I1I2", "I0Z1I2", "I0I1Z2"]);

        for term in hamiltonian.terms() {
            let register = result.counts_for(term).unwrap();
            assert_eq!(register.count("1").unwrap(), shots as u64);
            assert_eq!(result.expectation_for(term).unwrap(), -1.0);
        }
        assert_eq!(
            result
                .counts()
                .count_in("I0I1Z2", "1")
                .unwrap(),
            shots as u64
        );
    }
}

#[test]
fn test_observe_analytic() {
    let platform = basis_platform();
    let kernel = Arc::new(BasisKernel::all_ones(3));
    let hamiltonian = z_on_each(3);

    let result = platform.observe(&kernel, &[], &hamiltonian, Some(-1)).unwrap();
    assert!(!result.has_shots());
    assert_eq!(result.analytic_expectation(), Some(-3.0));
    assert_eq!(result.expectation(), -3.0);
    assert!(matches!(
        result.counts_for(&hamiltonian[0]),
        Err(MeasureError::UnknownRegister(_))
    ));
}

#[test]
fn test_observe_identity_and_coefficients() {
    let platform = basis_platform();
    let kernel = Arc::new(BasisKernel::fixed("fixed", "01"));
    let hamiltonian = Hamiltonian::new()
        .with_term(SpinTerm::new(2.5, [Pauli::I, Pauli::I]))
        .with_term(SpinTerm::z(0, 2).with_coefficient(0.5))
        .with_term(SpinTerm::new(-1.0, [Pauli::Z, Pauli::Z]));

    // <II> = 1, <ZI> = +1, <ZZ> = -1 on |01>.
    let expected = 2.5 + 0.5 + 1.0;
    let shots = platform
        .observe(&kernel, &[], &hamiltonian, Some(100))
        .unwrap();
    assert_eq!(shots.expectation(), expected);
    assert_eq!(shots.expectation_for(&hamiltonian[0]).unwrap(), 1.0);
    assert_eq!(
        shots.counts().register_names(),
        vec![GLOBAL_REGISTER, "Z0I1", "Z0Z1"]
    );
    assert!(shots.counts().get_register_counts(GLOBAL_REGISTER).unwrap().is_empty());

    let analytic = platform.observe(&kernel, &[], &hamiltonian, Some(-1)).unwrap();
    assert_eq!(analytic.expectation(), expected);
}

#[test]
fn test_observe_multi_register_display() {
    let platform = basis_platform();
    let kernel = Arc::new(BasisKernel::all_ones(2));
    let mut result = platform
        .observe(&kernel, &[], &z_on_each(2), Some(10))
        .unwrap();

    assert_eq!(
        result.counts().to_string(),
        "{ \n  Z0I1 : { 1:10 }\n  I0Z1 : { 1:10 }\n}\n"
    );
    assert!(matches!(
        result.counts().count("1"),
        Err(MeasureError::AmbiguousRegister(_))
    ));

    result.clear();
    assert_eq!(result.state(), ResultState::Cleared);
    assert_eq!(result.counts().to_string(), "{ }\n");
}

#[tokio::test]
async fn test_sample_async_wait() {
    let platform = Platform::<BasisKernel>::builder()
        .target(BellExecutor)
        .target(BasisExecutor)
        .build()
        .unwrap();
    let kernel = Arc::new(BasisKernel::all_ones(2));

    let bell = platform
        .sample_async(TargetId(0), Arc::clone(&kernel), Vec::new(), Some(10))
        .unwrap();
    let basis = platform
        .sample_async(TargetId(1), kernel, Vec::new(), Some(10))
        .unwrap();

    let (bell, basis) = tokio::join!(bell.wait(), basis.wait());
    let bell = bell.unwrap();
    assert_eq!(bell.count("00").unwrap(), 5);
    assert_eq!(bell.count("11").unwrap(), 5);
    assert_eq!(basis.unwrap().count("11").unwrap(), 10);
}

#[tokio::test]
async fn test_observe_async_wait() {
    let platform = basis_platform();
    let kernel = Arc::new(BasisKernel::all_ones(2));
    let handle = platform
        .observe_async(TargetId::DEFAULT, kernel, Vec::new(), z_on_each(2), Some(-1))
        .unwrap();
    assert_eq!(handle.wait().await.unwrap().expectation(), -2.0);
}

#[tokio::test]
#[should_panic]
async fn test_blocking_sample_inside_runtime_panics() {
    let platform = basis_platform();
    let kernel = Arc::new(BasisKernel::all_ones(1));
    let _ = platform.sample(&kernel, &[], Some(10));
}
