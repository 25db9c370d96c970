//! Simulation configuration
//!
//! [`SimulationConfig`] gathers everything needed to build an
//! [`Integrator`](crate::solver::Integrator): kernel, injection schedule,
//! time step, initial state, model variant, evaluation strategy and
//! backend. It derives serde so an orchestrator can load it from JSON or
//! any other serde format.
//!
//! Every check runs in [`SimulationConfig::validate`], before any state is
//! allocated.
//!
//! # Example
//!
//! ```rust
//! use coag_rs::solver::SimulationConfig;
//!
//! let config = SimulationConfig::new("brownian", 0.01)
//!     .with_alpha(1.0)
//!     .with_lambda(0.5)
//!     .with_size(200);
//! assert!(config.validate().is_ok());
//!
//! let missing = SimulationConfig::new("constant", 0.01);
//! assert!(missing.validate().is_err());
//! ```

use serde::{Deserialize, Serialize};

use crate::backend::BackendKind;
use crate::error::{CoagulationError, Result};
use crate::kernels::Kernel;
use crate::models::{InjectionSchedule, IntegratorModel};
use crate::physics::ConcentrationState;
use crate::rates::EvaluationStrategy;

/// Construction parameters of a coagulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Kernel family name: `constant`, `additive` (or `brownian`), `ballistic`
    pub kernel: String,

    /// Kernel exponent α (additive family only)
    #[serde(default)]
    pub alpha: f64,

    /// Injection rate λ, or the starting rate of a decaying schedule
    #[serde(default)]
    pub lambda: f64,

    /// Rate reached at the end of a decaying schedule
    #[serde(default)]
    pub final_lambda: Option<f64>,

    /// Decay shape: `logistic`, `exponential`, `steep_exponential`
    #[serde(default)]
    pub lambda_decay_type: Option<String>,

    /// Explicit Euler time step
    pub dt: f64,

    /// Truncation size N
    #[serde(default)]
    pub size: Option<usize>,

    /// Initial concentration of length N + 1 (index 0 must be zero)
    #[serde(default)]
    pub initial: Option<Vec<f64>>,

    /// Monomer boundary treatment
    #[serde(default)]
    pub model: IntegratorModel,

    /// Direct sums or factorization + FFT
    #[serde(default)]
    pub strategy: EvaluationStrategy,

    /// Numeric substrate
    #[serde(default)]
    pub backend: BackendKind,

    /// Worker threads for the parallel backend (rayon default when absent)
    #[serde(default)]
    pub threads: Option<usize>,
}

impl SimulationConfig {
    /// Minimal configuration: kernel name and time step, everything else
    /// defaulted (α = 0, λ = 0, monomer-source model, fast CPU evaluation).
    ///
    /// Neither a size nor an initial vector is set; one of them must be
    /// added before the configuration validates.
    pub fn new(kernel: &str, dt: f64) -> Self {
        Self {
            kernel: kernel.to_string(),
            alpha: 0.0,
            lambda: 0.0,
            final_lambda: None,
            lambda_decay_type: None,
            dt,
            size: None,
            initial: None,
            model: IntegratorModel::default(),
            strategy: EvaluationStrategy::default(),
            backend: BackendKind::default(),
            threads: None,
        }
    }

    /// Set the kernel exponent α
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set a fixed injection rate λ
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Decay λ towards `final_lambda` with the named shape
    pub fn with_decay(mut self, final_lambda: f64, decay_type: &str) -> Self {
        self.final_lambda = Some(final_lambda);
        self.lambda_decay_type = Some(decay_type.to_string());
        self
    }

    /// Set the truncation size N (initial state: all mass in monomers)
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Set an explicit initial concentration of length N + 1
    pub fn with_initial(mut self, initial: Vec<f64>) -> Self {
        self.initial = Some(initial);
        self
    }

    /// Select the monomer boundary treatment
    pub fn with_model(mut self, model: IntegratorModel) -> Self {
        self.model = model;
        self
    }

    /// Select the evaluation strategy
    pub fn with_strategy(mut self, strategy: EvaluationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Select the backend, with an optional thread count
    pub fn with_backend(mut self, backend: BackendKind, threads: Option<usize>) -> Self {
        self.backend = backend;
        self.threads = threads;
        self
    }

    // ======================================= Resolution =======================================

    /// Parse the kernel family and bind α.
    pub fn kernel(&self) -> Result<Kernel> {
        Kernel::from_name(&self.kernel, self.alpha)
    }

    /// Build the injection schedule.
    pub fn schedule(&self) -> Result<InjectionSchedule> {
        InjectionSchedule::from_parts(self.lambda, self.final_lambda, self.lambda_decay_type.as_deref())
    }

    /// Resolve the initial state from the size and/or the explicit vector.
    ///
    /// When both are given they must agree (`initial.len() == size + 1`).
    pub fn initial_state(&self) -> Result<ConcentrationState> {
        match (self.size, &self.initial) {
            (None, None) => Err(CoagulationError::MissingInitialState),
            (Some(size), None) => ConcentrationState::monomers(size),
            (None, Some(values)) => ConcentrationState::from_vec(values.clone()),
            (Some(size), Some(values)) => {
                if values.len() != size + 1 {
                    return Err(CoagulationError::ConflictingInitialState {
                        size,
                        expected: size + 1,
                        actual: values.len(),
                    });
                }
                ConcentrationState::from_vec(values.clone())
            }
        }
    }

    /// Run every configuration check.
    pub fn validate(&self) -> Result<()> {
        self.kernel()?;

        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(CoagulationError::InvalidTimeStep { dt: self.dt });
        }

        self.schedule()?;
        if self.model == IntegratorModel::ConstantSource {
            let rates = [Some(self.lambda), self.final_lambda];
            if let Some(lambda) = rates.into_iter().flatten().find(|l| *l != 0.0) {
                return Err(CoagulationError::ConstantSourceLambda { lambda });
            }
        }

        if self.threads == Some(0) {
            return Err(CoagulationError::InvalidParameter {
                name: "threads",
                value: 0.0,
                reason: "must be at least 1",
            });
        }

        self.initial_state()?;
        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================
