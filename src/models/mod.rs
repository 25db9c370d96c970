//! Coagulation models
//!
//! [`CoagulationModel`] implements [`PhysicalModel`](crate::physics::PhysicalModel)
//! on top of any [`RateOperators`](crate::rates::RateOperators). The
//! integrator calls `compute_physics` once per step; the model is
//! responsible for the physics (aggregation, shattering, injection), the
//! integrator for the time stepping.
//!
//! # Available Models
//!
//! ## [`IntegratorModel::MonomerSource`] (default)
//!
//! Shattering collisions return their mass as monomers; the monomer
//! equation carries a dedicated boundary term.
//!
//! ## [`IntegratorModel::SourceFree`]
//!
//! Simpler boundary condition in which the whole shattered mass flux,
//! monomers included, feeds the monomer class.
//!
//! ## [`IntegratorModel::ConstantSource`]
//!
//! Constant unit supply of monomers, no shattering.
//!
//! # Injection
//!
//! The injection rate λ can be held fixed or decay over the run through an
//! [`InjectionSchedule`]. The runner sets λ before each step.
//!
//! # Reference solutions
//!
//! [`analysis`] holds the closed-form stationary solutions the models are
//! validated against.

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod analysis;
pub mod coagulation;
pub mod injection;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use analysis::{
    constant_source_steady_state, shattering_profile, shattering_steady_state, stationary_count,
    stationary_monomers,
};
pub use coagulation::{CoagulationModel, IntegratorModel};
pub use injection::{DecayShape, InjectionSchedule};
