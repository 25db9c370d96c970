//! Explicit Euler integrator
//!
//! # Mathematical Background
//!
//! The integrator advances the truncated coagulation system
//!
//! ```text
//! dc/dt = f(c; λ)
//! ```
//!
//! with the forward Euler scheme `c_{n+1} = c_n + dt · f(c_n; λ_n)`.
//!
//! # Stability
//!
//! No stability check is performed. The scheme is conditionally stable:
//! `dt` must be small compared with `1 / max_k(K_n(c)[k])`, which grows
//! with N and with the kernel magnitude. Choosing it is the caller's
//! responsibility; [`Simulation::with_finite_check`](crate::solver::Simulation::with_finite_check)
//! helps diagnose a bad choice.
//!
//! # State machine
//!
//! ```text
//! Ready ──step()──▶ Stepping ──step()──▶ Stepping ...
//! ```
//!
//! There is no terminal state: the driver stops when it stops asking for
//! steps. The injection rate may be changed between any two steps.

use std::fmt;

use nalgebra::DVector;

use crate::backend::{select_backend, BackendSelection};
use crate::error::{CoagulationError, Result};
use crate::kernels::Kernel;
use crate::models::{CoagulationModel, IntegratorModel};
use crate::physics::{ConcentrationState, PhysicalModel};
use crate::rates::build_rates;
use crate::solver::config::SimulationConfig;

// =================================================================================================
// Step results
// =================================================================================================

/// Lifecycle of an [`Integrator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorPhase {
    /// Constructed, no step taken yet
    Ready,
    /// At least one step taken
    Stepping,
}

/// Borrowed view of the state right after a step.
#[derive(Debug, Clone, Copy)]
pub struct TimeStep<'a> {
    /// 1-based index of the step just taken
    pub step: usize,
    /// Injection rate used for that step
    pub injection_rate: f64,
    /// Concentration after the step
    pub concentration: &'a ConcentrationState,
}

impl TimeStep<'_> {
    /// Owned copy suitable for storing as a checkpoint
    pub fn snapshot(&self) -> TimeStepResult {
        TimeStepResult {
            step: self.step,
            injection_rate: self.injection_rate,
            concentration: self.concentration.clone(),
        }
    }
}

/// Owned result of one step: the updated state and the λ in effect.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeStepResult {
    /// 1-based index of the step
    pub step: usize,
    /// Injection rate used for that step
    pub injection_rate: f64,
    /// Concentration after the step
    pub concentration: ConcentrationState,
}

// =================================================================================================
// Integrator
// =================================================================================================

/// Owns a concentration state and advances it with explicit Euler steps.
pub struct Integrator {
    model: CoagulationModel,
    state: ConcentrationState,
    dt: f64,
    injection_rate: f64,
    steps_taken: usize,
    kernel: Option<Kernel>,
    backend: Option<BackendSelection>,
}

impl Integrator {
    /// Attach a model to an initial state.
    ///
    /// # Errors
    ///
    /// - [`CoagulationError::InvalidTimeStep`] if `dt` is not finite and positive
    /// - [`CoagulationError::InvalidParameter`] if `injection_rate` is negative or not finite
    /// - [`CoagulationError::ConstantSourceLambda`] if the constant-source model gets λ ≠ 0
    /// - [`CoagulationError::ConflictingInitialState`] if the state length does not match the model
    pub fn new(model: CoagulationModel, initial: ConcentrationState, dt: f64, injection_rate: f64) -> Result<Self> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(CoagulationError::InvalidTimeStep { dt });
        }
        if !injection_rate.is_finite() || injection_rate < 0.0 {
            return Err(CoagulationError::InvalidParameter {
                name: "lambda",
                value: injection_rate,
                reason: "must be finite and >= 0",
            });
        }
        if model.variant() == IntegratorModel::ConstantSource && injection_rate != 0.0 {
            return Err(CoagulationError::ConstantSourceLambda { lambda: injection_rate });
        }
        if initial.len() != model.points() {
            return Err(CoagulationError::ConflictingInitialState {
                size: model.size(),
                expected: model.points(),
                actual: initial.len(),
            });
        }

        log::info!(
            "integrator ready: model={}, rates={}, N={}, dt={}, lambda={}",
            model.variant(),
            model.rates().name(),
            model.size(),
            dt,
            injection_rate
        );

        Ok(Self {
            model,
            state: initial,
            dt,
            injection_rate,
            steps_taken: 0,
            kernel: None,
            backend: None,
        })
    }

    /// Validate a configuration and build everything it describes.
    ///
    /// Nothing is allocated when validation fails. A parallel backend that
    /// cannot start falls back to the CPU backend; the fallback is logged
    /// and reported by [`Integrator::backend_fallback`].
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;

        let kernel = config.kernel()?;
        let schedule = config.schedule()?;
        let initial = config.initial_state()?;

        let selection = select_backend(config.backend, config.threads);
        let rates = build_rates(&kernel, initial.size(), config.strategy, selection.backend.clone())?;
        let model = CoagulationModel::new(config.model, rates);

        log::info!(
            "kernel={}, strategy={}, backend={}",
            kernel,
            config.strategy,
            selection.backend.name()
        );

        let mut integrator = Self::new(model, initial, config.dt, schedule.initial_rate())?;
        integrator.kernel = Some(kernel);
        integrator.backend = Some(selection);
        Ok(integrator)
    }

    // ======================================= Parameters =======================================

    /// Replace the injection rate; it takes effect on the next step.
    ///
    /// The kernel factorization does not depend on λ and is left as is.
    /// The constant-source model runs with λ = 0 and ignores updates.
    /// A negative or non-finite λ is rejected with a warning and the
    /// current rate is kept.
    pub fn update_injection_rate(&mut self, lambda: f64) {
        if !lambda.is_finite() || lambda < 0.0 {
            log::warn!("ignoring invalid injection rate {lambda}; keeping {}", self.injection_rate);
        } else if self.model.variant().uses_injection_rate() {
            self.injection_rate = lambda;
        } else if lambda != 0.0 {
            log::warn!("constant-source model ignores injection rate update to {lambda}");
        }
    }

    /// Replace the concentration, keeping the step counter.
    pub fn restore_state(&mut self, state: ConcentrationState) -> Result<()> {
        if state.len() != self.state.len() {
            return Err(CoagulationError::ConflictingInitialState {
                size: self.model.size(),
                expected: self.state.len(),
                actual: state.len(),
            });
        }
        self.state = state;
        Ok(())
    }

    // ======================================== Stepping ========================================

    /// Right-hand side at the current state and injection rate.
    pub fn compute_update(&self) -> DVector<f64> {
        self.model.compute_physics(&self.state, self.injection_rate)
    }

    /// Advance by one explicit Euler step.
    pub fn step(&mut self) -> TimeStep<'_> {
        let update = self.compute_update();
        self.state.advance(self.dt, &update);
        self.steps_taken += 1;

        TimeStep {
            step: self.steps_taken,
            injection_rate: self.injection_rate,
            concentration: &self.state,
        }
    }

    /// Take `count` steps at the current injection rate and return the
    /// final concentration.
    pub fn run_steps(&mut self, count: usize) -> &ConcentrationState {
        for _ in 0..count {
            self.step();
        }
        &self.state
    }

    // ======================================== Queries =========================================

    /// Current concentration
    pub fn state(&self) -> &ConcentrationState {
        &self.state
    }

    /// Time step
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Injection rate used by the next step
    pub fn injection_rate(&self) -> f64 {
        self.injection_rate
    }

    /// Number of steps taken so far
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    /// Simulated time `steps_taken · dt`
    pub fn elapsed_time(&self) -> f64 {
        self.steps_taken as f64 * self.dt
    }

    /// Lifecycle phase
    pub fn phase(&self) -> IntegratorPhase {
        if self.steps_taken == 0 {
            IntegratorPhase::Ready
        } else {
            IntegratorPhase::Stepping
        }
    }

    /// Coagulation model
    pub fn model(&self) -> &CoagulationModel {
        &self.model
    }

    /// Truncation size N
    pub fn size(&self) -> usize {
        self.model.size()
    }

    /// Kernel, when built from a configuration
    pub fn kernel(&self) -> Option<&Kernel> {
        self.kernel.as_ref()
    }

    /// Name of the backend in use, when built from a configuration
    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_ref().map(|b| b.backend.name())
    }

    /// Reason the requested backend was replaced by the CPU path, if it was
    pub fn backend_fallback(&self) -> Option<&str> {
        self.backend.as_ref().and_then(|b| b.fallback.as_deref())
    }
}

impl fmt::Debug for Integrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Integrator")
            .field("model", &self.model)
            .field("dt", &self.dt)
            .field("injection_rate", &self.injection_rate)
            .field("steps_taken", &self.steps_taken)
            .field("backend", &self.backend_name())
            .finish()
    }
}

// =================================================================================================
// Tests
// =================================================================================================
