//! Batch runs with periodic checkpoints
//!
//! [`Simulation`] drives an [`Integrator`] for a fixed number of steps:
//!
//! 1. λ for every step is precomputed from the [`InjectionSchedule`]
//! 2. before each step the integrator's injection rate is updated
//! 3. every `checkpoint_frequency` steps (starting with the first) the
//!    state and λ are recorded, together with the wall-clock time since the
//!    run started
//! 4. the final step is always recorded
//!
//! Checkpoints are returned in memory in a [`SimulationResult`]; writing
//! them anywhere is up to the caller.

use std::collections::HashMap;
use std::time::Instant;

use crate::error::{CoagulationError, Result};
use crate::models::InjectionSchedule;
use crate::physics::{batch_moments, ConcentrationState};
use crate::solver::config::SimulationConfig;
use crate::solver::integrator::{Integrator, TimeStepResult};
use crate::solver::validate_state;

// =================================================================================================
// Simulation result
// =================================================================================================

/// Checkpoints of a batch run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Recorded steps, in order
    pub checkpoints: Vec<TimeStepResult>,

    /// Wall-clock seconds since the start of the run, one per checkpoint
    pub wall_times: Vec<f64>,

    /// State after the last step
    pub final_state: ConcentrationState,

    /// Run description (kernel, model, dt, ...)
    pub metadata: HashMap<String, String>,
}

impl SimulationResult {
    /// Result with no metadata
    pub fn new(checkpoints: Vec<TimeStepResult>, wall_times: Vec<f64>, final_state: ConcentrationState) -> Self {
        Self {
            checkpoints,
            wall_times,
            final_state,
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    /// Number of checkpoints
    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    /// `true` if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    /// Injection rate at each checkpoint
    pub fn lambda_history(&self) -> Vec<f64> {
        self.checkpoints.iter().map(|c| c.injection_rate).collect()
    }

    /// Step index of each checkpoint
    pub fn steps(&self) -> Vec<usize> {
        self.checkpoints.iter().map(|c| c.step).collect()
    }

    /// Moment of order `p` at each checkpoint
    pub fn moments(&self, order: i32) -> Vec<f64> {
        let states: Vec<ConcentrationState> =
            self.checkpoints.iter().map(|c| c.concentration.clone()).collect();
        batch_moments(&states, order)
    }
}

// =================================================================================================
// Simulation
// =================================================================================================

/// An integrator paired with its injection schedule.
#[derive(Debug)]
pub struct Simulation {
    integrator: Integrator,
    schedule: InjectionSchedule,
    check_finite: bool,
}

impl Simulation {
    /// Pair an integrator with a schedule.
    pub fn new(integrator: Integrator, schedule: InjectionSchedule) -> Self {
        Self {
            integrator,
            schedule,
            check_finite: false,
        }
    }

    /// Build integrator and schedule from a configuration.
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        let integrator = Integrator::from_config(config)?;
        let schedule = config.schedule()?;
        Ok(Self::new(integrator, schedule))
    }

    /// Stop with [`CoagulationError::NonFiniteState`] as soon as a step
    /// produces NaN or infinity. Off by default.
    pub fn with_finite_check(mut self, enabled: bool) -> Self {
        self.check_finite = enabled;
        self
    }

    /// Underlying integrator
    pub fn integrator(&self) -> &Integrator {
        &self.integrator
    }

    /// Mutable access to the underlying integrator
    pub fn integrator_mut(&mut self) -> &mut Integrator {
        &mut self.integrator
    }

    /// Injection schedule
    pub fn schedule(&self) -> &InjectionSchedule {
        &self.schedule
    }

    /// Consume the simulation and return its integrator
    pub fn into_integrator(self) -> Integrator {
        self.integrator
    }

    /// Take `steps` steps, recording a checkpoint every
    /// `checkpoint_frequency` steps and at the final step.
    ///
    /// The schedule is sampled over exactly `steps` steps, so a decaying λ
    /// reaches its final value on the last one.
    pub fn run(&mut self, steps: usize, checkpoint_frequency: usize) -> Result<SimulationResult> {
        if checkpoint_frequency == 0 {
            return Err(CoagulationError::InvalidCheckpointFrequency);
        }

        let lambdas = self.schedule.precompute(steps);
        let uses_rate = self.integrator.model().variant().uses_injection_rate();
        let capacity = steps / checkpoint_frequency + 1;
        let mut checkpoints = Vec::with_capacity(capacity);
        let mut wall_times = Vec::with_capacity(capacity);
        let start = Instant::now();

        for (iter, lambda) in lambdas.into_iter().enumerate() {
            if uses_rate {
                self.integrator.update_injection_rate(lambda);
            }
            let step = self.integrator.step();

            if self.check_finite {
                validate_state(step.concentration, step.step)?;
            }

            if iter % checkpoint_frequency == 0 || iter + 1 == steps {
                let elapsed = start.elapsed().as_secs_f64();
                log::trace!(
                    "checkpoint at step {} (lambda={}, mass={:.6e}, {:.3}s)",
                    step.step,
                    step.injection_rate,
                    step.concentration.total_mass(),
                    elapsed
                );
                checkpoints.push(step.snapshot());
                wall_times.push(elapsed);
            }
        }

        let mut result = SimulationResult::new(checkpoints, wall_times, self.integrator.state().clone());
        self.describe(&mut result, steps, checkpoint_frequency);
        Ok(result)
    }

    fn describe(&self, result: &mut SimulationResult, steps: usize, checkpoint_frequency: usize) {
        let integrator = &self.integrator;
        result.add_metadata("model", integrator.model().variant().name());
        result.add_metadata("strategy", integrator.model().rates().name());
        result.add_metadata("size", &integrator.size().to_string());
        result.add_metadata("dt", &integrator.dt().to_string());
        result.add_metadata("steps", &steps.to_string());
        result.add_metadata("checkpoint frequency", &checkpoint_frequency.to_string());
        result.add_metadata("lambda", &self.schedule.initial_rate().to_string());
        if let InjectionSchedule::Decay { final_lambda, shape, .. } = &self.schedule {
            result.add_metadata("final lambda", &final_lambda.to_string());
            result.add_metadata("lambda decay", shape.name());
        }
        if let Some(kernel) = integrator.kernel() {
            result.add_metadata("kernel", &kernel.to_string());
        }
        if let Some(backend) = integrator.backend_name() {
            result.add_metadata("backend", backend);
        }
        if let Some(reason) = integrator.backend_fallback() {
            result.add_metadata("backend fallback", reason);
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================
