//! Time integration
//!
//! # Core Concepts
//!
//! The solver layer separates three concerns:
//!
//! 1. **Configuration** ([`SimulationConfig`]) - WHAT to simulate
//!    - kernel family and exponent
//!    - injection rate or schedule
//!    - initial state, time step, model variant
//!    - evaluation strategy and backend
//!
//! 2. **Integrator** ([`Integrator`]) - one explicit Euler step at a time
//!    - owns the concentration state
//!    - accepts injection-rate updates between steps
//!    - `step()` and `run_steps()` never fail
//!
//! 3. **Runner** ([`Simulation`]) - a batch of steps with checkpoints
//!    - samples the injection schedule
//!    - records state and λ periodically
//!    - returns a [`SimulationResult`]
//!
//! # Quick Start Example
//!
//! ```rust
//! use coag_rs::solver::{Simulation, SimulationConfig};
//!
//! let config = SimulationConfig::new("additive", 0.01)
//!     .with_lambda(0.5)
//!     .with_size(50);
//!
//! let mut simulation = Simulation::from_config(&config).unwrap();
//! let result = simulation.run(100, 25).unwrap();
//!
//! // steps 1, 26, 51, 76 and the final step 100
//! assert_eq!(result.len(), 5);
//! assert!(result.final_state.particle_count() < 1.0);
//! ```
//!
//! # Workflow Diagram
//!
//! ```text
//! ┌───────────────────┐
//! │ SimulationConfig  │  validate()
//! └─────────┬─────────┘
//!           │
//! ┌─────────▼─────────┐   ┌──────────────────┐
//! │ Kernel            │──▶│ Factorization    │  once per (kernel, N, α)
//! └─────────┬─────────┘   └────────┬─────────┘
//!           │                      │
//! ┌─────────▼─────────┐   ┌────────▼─────────┐
//! │ CoagulationModel  │◀──│ RateOperators    │  direct or fast
//! └─────────┬─────────┘   └──────────────────┘
//!           │
//! ┌─────────▼─────────┐
//! │ Integrator        │  c ← c + dt · f(c; λ)
//! └─────────┬─────────┘
//!           │
//! ┌─────────▼─────────┐
//! │ Simulation        │  checkpoints + metadata
//! └───────────────────┘
//! ```
//!
//! # Time Step Selection
//!
//! Forward Euler is conditionally stable. As a rule of thumb
//! `dt · max_k K_n(c)[k]` should stay well below 1. Start conservative;
//! enable [`Simulation::with_finite_check`] while exploring.

// =================================================================================================
// Module Declarations
// =================================================================================================

mod config;
mod integrator;
mod runner;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use config::SimulationConfig;
pub use integrator::{Integrator, IntegratorPhase, TimeStep, TimeStepResult};
pub use runner::{Simulation, SimulationResult};

// =================================================================================================
// Helper Functions
// =================================================================================================

use crate::error::{CoagulationError, Result};
use crate::physics::ConcentrationState;

/// Check a state for NaN or infinite concentrations.
///
/// NaN arises from `inf - inf` once an unstable step has overflowed, so
/// the first non-finite entry is reported together with the step number.
pub(crate) fn validate_state(state: &ConcentrationState, step: usize) -> Result<()> {
    match state.first_non_finite() {
        Some((index, value)) => Err(CoagulationError::NonFiniteState { step, index, value }),
        None => Ok(()),
    }
}

// =================================================================================================
// Tests
// =================================================================================================
