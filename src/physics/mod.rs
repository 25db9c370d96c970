//! Physical state and model interface
//!
//! # Core Concepts
//!
//! - **Concentration state** ([`ConcentrationState`]): cluster concentrations
//!   indexed by size, with index 0 reserved
//! - **Moments** ([`ConcentrationState::moment`], [`batch_moments`]): read-only
//!   reductions Σ_k c(k)·k^p used for reporting
//! - **Physical model** ([`PhysicalModel`]): provides the right-hand side
//!   dc/dt = f(c; λ)
//!
//! # Architecture
//!
//! Models are **separate from the integrator**: the model provides the
//! equations, the integrator advances the state in time.
//!
//! # Example
//!
//! ```rust
//! use nalgebra::DVector;
//! use coag_rs::physics::{ConcentrationState, PhysicalModel};
//!
//! struct Frozen;
//!
//! impl PhysicalModel for Frozen {
//!     fn points(&self) -> usize { 5 }
//!     fn compute_physics(&self, state: &ConcentrationState, _lambda: f64) -> DVector<f64> {
//!         DVector::zeros(state.len())
//!     }
//!     fn name(&self) -> &str { "frozen" }
//! }
//!
//! let model = Frozen;
//! let state = model.setup_initial_state().unwrap();
//! assert_eq!(model.compute_physics(&state, 0.0).len(), 5);
//! assert_eq!(state.total_mass(), 1.0);
//! ```

pub mod state;
pub mod traits;

pub use state::{batch_moments, ConcentrationState};
pub use traits::PhysicalModel;
