//! Convergence tests for the explicit Euler integrator
//!
//! Verifies first-order convergence against the closed-form solution of the
//! constant-kernel equation K ≡ 1 started from monomers:
//!
//! ```text
//! c(k, t) = τ^(k−1) / (1 + τ)^(k+1),   τ = t / 2
//! ```

use coag_rs::models::IntegratorModel;
use coag_rs::rates::EvaluationStrategy;
use coag_rs::solver::{Integrator, SimulationConfig};

const FINAL_TIME: f64 = 1.0;
const SIZE: usize = 40;

fn exact(k: usize, t: f64) -> f64 {
    let tau = t / 2.0;
    tau.powi(k as i32 - 1) / (1.0 + tau).powi(k as i32 + 1)
}

fn monomer_error(steps: usize, strategy: EvaluationStrategy) -> f64 {
    let config = SimulationConfig::new("constant", FINAL_TIME / steps as f64)
        .with_model(IntegratorModel::SourceFree)
        .with_strategy(strategy)
        .with_size(SIZE);
    let mut integrator = Integrator::from_config(&config).unwrap();
    let state = integrator.run_steps(steps);

    (state.get(1) - exact(1, FINAL_TIME)).abs()
}

#[test]
fn test_euler_first_order_convergence() {
    let steps = [50, 100, 200, 400];
    let errors: Vec<f64> = steps
        .iter()
        .map(|&n| monomer_error(n, EvaluationStrategy::Fast))
        .collect();

    for (n, error) in steps.iter().zip(&errors) {
        println!("steps={n:4}  |c1 - exact| = {error:.3e}");
    }

    // halving dt halves the error
    for pair in errors.windows(2) {
        let ratio = pair[0] / pair[1];
        assert!(ratio > 1.8 && ratio < 2.2, "convergence ratio {ratio}");
    }
    assert!(errors[3] < 1e-3);
}

#[test]
fn test_direct_strategy_converges_identically() {
    for steps in [50, 200] {
        let fast = monomer_error(steps, EvaluationStrategy::Fast);
        let direct = monomer_error(steps, EvaluationStrategy::Direct);
        assert!((fast - direct).abs() < 1e-10, "steps={steps}: {fast} vs {direct}");
    }
}

#[test]
fn test_profile_close_to_exact() {
    let config = SimulationConfig::new("constant", 1e-3)
        .with_model(IntegratorModel::SourceFree)
        .with_size(SIZE);
    let mut integrator = Integrator::from_config(&config).unwrap();
    let state = integrator.run_steps(1000);

    for k in 1..=10 {
        let expected = exact(k, FINAL_TIME);
        let error = (state.get(k) - expected).abs();
        assert!(error < 1e-3, "c({k}) = {} vs exact {expected}", state.get(k));
    }
}
