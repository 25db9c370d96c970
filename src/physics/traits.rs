//! Physical model trait
//!
//! A physical model owns the equations; the solver owns the time stepping.
//! The integrator only ever talks to a model through [`PhysicalModel`].

use nalgebra::DVector;

use crate::error::Result;
use crate::physics::state::ConcentrationState;

/// Right-hand side provider for the coagulation ODE system dc/dt = f(c; λ).
///
/// # Responsibility
///
/// Computes the derivative of a concentration state. Does NOT advance it
/// (that is the integrator's job), so the same model can be driven by any
/// explicit stepping scheme.
///
/// Implementations must be pure: the same state and injection rate always
/// produce the same derivative, bit for bit.
pub trait PhysicalModel: Send + Sync {
    /// Length of the state vectors this model accepts (N + 1)
    fn points(&self) -> usize;

    /// Derivative f(c; λ), same length as the state.
    ///
    /// Entry 0 is always zero.
    fn compute_physics(&self, state: &ConcentrationState, injection_rate: f64) -> DVector<f64>;

    /// Canonical initial state for this model
    fn setup_initial_state(&self) -> Result<ConcentrationState> {
        ConcentrationState::monomers(self.points() - 1)
    }

    /// Name of the model (used in logs and metadata)
    fn name(&self) -> &str;

    /// Optional longer description
    fn description(&self) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Decay {
        points: usize,
    }

    impl PhysicalModel for Decay {
        fn points(&self) -> usize {
            self.points
        }

        fn compute_physics(&self, state: &ConcentrationState, injection_rate: f64) -> DVector<f64> {
            -state.as_vector() * (1.0 + injection_rate)
        }

        fn name(&self) -> &str {
            "decay"
        }
    }

    #[test]
    fn test_default_initial_state_is_monomers() {
        let model = Decay { points: 6 };
        let state = model.setup_initial_state().unwrap();

        assert_eq!(state.len(), 6);
        assert_eq!(state.get(1), 1.0);
        assert!(model.description().is_none());
    }

    #[test]
    fn test_compute_physics_is_pure() {
        let model = Decay { points: 4 };
        let state = ConcentrationState::from_vec(vec![0.0, 1.0, 0.5, 0.25]).unwrap();

        let first = model.compute_physics(&state, 0.5);
        let second = model.compute_physics(&state, 0.5);
        assert_eq!(first, second);
        assert_eq!(first[1], -1.5);
    }
}
