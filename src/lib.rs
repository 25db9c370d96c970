//! coag-rs: Smoluchowski Coagulation Integrator
//!
//! Explicit time integration of the discrete Smoluchowski coagulation
//! equation with optional monomer injection, built around low-rank kernel
//! factorizations and FFT convolutions.
//!
//! # Architecture
//!
//! coag-rs is built on two core principles:
//!
//! 1. **Separation of Physics and Numerics**
//!    - Kernels and rate operators define the equations
//!    - The integrator advances them in time
//!    - The backend supplies the vector, matrix and convolution primitives
//!
//! 2. **Closed, Type-Safe Choices**
//!    - Kernel families, model variants, evaluation strategies and backends
//!      are enums, matched exhaustively
//!    - Every configuration error is reported before any state exists
//!
//! # Quick Start
//!
//! ```rust
//! use coag_rs::prelude::*;
//!
//! # fn main() -> coag_rs::error::Result<()> {
//! // 1. Configure the run
//! let config = SimulationConfig::new("brownian", 0.01)
//!     .with_alpha(0.0)
//!     .with_lambda(0.5)
//!     .with_size(64);
//!
//! // 2. Build the integrator (factorization happens here)
//! let mut integrator = Integrator::from_config(&config)?;
//!
//! // 3. Step
//! let state = integrator.run_steps(200);
//!
//! // 4. Inspect
//! println!("particle count: {}", state.particle_count());
//! println!("total mass: {}", state.total_mass());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`error`]: Error type and `Result` alias
//! - [`physics`]: Concentration state, moments, model trait
//! - [`kernels`]: Kernel families and factorizations
//! - [`backend`]: Numeric substrate (CPU, parallel)
//! - [`rates`]: Direct and fast rate operators
//! - [`models`]: Coagulation model variants, injection schedules, reference solutions
//! - [`solver`]: Integrator, configuration and batch runner
//!
//! # Features
//!
//! - `parallel` (default): rayon-backed [`backend::ParallelBackend`]

pub mod error;

pub mod physics;

pub mod backend;
pub mod kernels;
pub mod rates;

pub mod models;
pub mod solver;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use coag_rs::prelude::*;
    //! ```
    pub use crate::backend::{select_backend, Backend, BackendKind, CpuBackend};
    pub use crate::error::{CoagulationError, Result};
    pub use crate::kernels::{Factorization, Kernel, KernelFamily};
    pub use crate::models::{CoagulationModel, DecayShape, InjectionSchedule, IntegratorModel};
    pub use crate::physics::{batch_moments, ConcentrationState, PhysicalModel};
    pub use crate::rates::{build_rates, EvaluationStrategy, RateOperators};
    pub use crate::solver::{
        Integrator, Simulation, SimulationConfig, SimulationResult, TimeStepResult,
    };
}
