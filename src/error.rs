//! Error types for simulation construction
//!
//! Every failure the crate can report is a configuration problem detected
//! while building a kernel factorization, a backend or an integrator.
//! Once an [`Integrator`](crate::solver::Integrator) exists, stepping it
//! never fails.

use thiserror::Error;

/// Errors raised while configuring a coagulation simulation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoagulationError {
    /// Kernel family name is not one of `constant`, `additive`/`brownian`, `ballistic`.
    #[error("unsupported kernel family: {name:?} (expected constant, additive, brownian or ballistic)")]
    UnsupportedKernel {
        /// The rejected name
        name: String,
    },

    /// Neither a truncation size nor an initial concentration was supplied.
    #[error("missing initial state: provide a truncation size or an initial concentration")]
    MissingInitialState,

    /// Truncation size and initial concentration were both supplied and disagree.
    #[error("conflicting initial state: size {size} expects {expected} entries, initial concentration has {actual}")]
    ConflictingInitialState {
        /// Requested truncation size N
        size: usize,
        /// Expected vector length (N + 1)
        expected: usize,
        /// Length of the supplied vector
        actual: usize,
    },

    /// Truncation size too small to hold a single aggregation.
    #[error("invalid truncation size: {size} (must be >= 2)")]
    InvalidSize {
        /// The rejected size
        size: usize,
    },

    /// Time step is non-positive or non-finite.
    #[error("invalid time step: {dt} (must be finite and > 0)")]
    InvalidTimeStep {
        /// The rejected time step
        dt: f64,
    },

    /// A scalar model parameter is out of range.
    #[error("invalid parameter {name}: {value} ({reason})")]
    InvalidParameter {
        /// Parameter name (alpha, lambda, final_lambda, ...)
        name: &'static str,
        /// The rejected value
        value: f64,
        /// Why the value was rejected
        reason: &'static str,
    },

    /// Initial concentration violates the state invariants.
    #[error("invalid initial concentration at index {index}: {value} ({reason})")]
    InvalidConcentration {
        /// Offending index
        index: usize,
        /// Offending value
        value: f64,
        /// Why the value was rejected
        reason: &'static str,
    },

    /// Factorization shape does not match the concentration length.
    #[error("factorization mismatch: U is {u_rows}x{u_cols}, V is {v_rows}x{v_cols}, state length {len}")]
    FactorizationMismatch {
        /// Rows of U
        u_rows: usize,
        /// Columns of U
        u_cols: usize,
        /// Rows of V
        v_rows: usize,
        /// Columns of V
        v_cols: usize,
        /// Concentration vector length
        len: usize,
    },

    /// A numerical decomposition did not produce the requested factors.
    #[error("decomposition failed: {reason}")]
    DecompositionFailed {
        /// What went wrong
        reason: &'static str,
    },

    /// Injection-rate schedule is incomplete or names an unknown decay shape.
    #[error("invalid injection schedule: {reason}")]
    InvalidSchedule {
        /// Description of the inconsistency
        reason: String,
    },

    /// Checkpoint frequency of zero.
    #[error("invalid checkpoint frequency: 0 (must be >= 1)")]
    InvalidCheckpointFrequency,

    /// The constant-source model runs with λ fixed at zero.
    #[error("constant-source model requires lambda = 0, got {lambda}")]
    ConstantSourceLambda {
        /// The rejected injection rate
        lambda: f64,
    },

    /// Opt-in state check found a non-finite concentration.
    #[error("non-finite concentration at size {index} after step {step}: {value}. Try reducing dt")]
    NonFiniteState {
        /// Step after which the value appeared
        step: usize,
        /// Cluster size index
        index: usize,
        /// Offending value
        value: f64,
    },
}

/// A specialized `Result` type for simulation construction.
pub type Result<T> = std::result::Result<T, CoagulationError>;

impl CoagulationError {
    /// Returns `true` for errors detected while validating a configuration,
    /// as opposed to the opt-in numerical state check.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, CoagulationError::NonFiniteState { .. })
    }

    /// Returns `true` if the error concerns the kernel family or its factorization.
    pub fn is_kernel_error(&self) -> bool {
        matches!(
            self,
            CoagulationError::UnsupportedKernel { .. }
                | CoagulationError::FactorizationMismatch { .. }
                | CoagulationError::DecompositionFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_kernel_display() {
        let err = CoagulationError::UnsupportedKernel { name: "gravitational".to_string() };
        assert!(err.to_string().contains("gravitational"));
        assert!(err.is_kernel_error());
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_time_step_display() {
        let err = CoagulationError::InvalidTimeStep { dt: -0.5 };
        assert_eq!(err.to_string(), "invalid time step: -0.5 (must be finite and > 0)");
    }

    #[test]
    fn test_non_finite_state_is_not_configuration() {
        let err = CoagulationError::NonFiniteState { step: 3, index: 7, value: f64::NAN };
        assert!(!err.is_configuration_error());
        assert!(err.to_string().contains("after step 3"));
    }
}
