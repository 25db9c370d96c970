//! Injection-rate schedules
//!
//! The injection (shattering) rate λ may be held constant over a run or
//! decay from its initial value to a final value. A decaying schedule is
//! sampled on t ∈ [0, 1], uniformly over the number of steps:
//!
//! ```text
//! λ(t) = shape(t) · (λ₀ − λ_final) + λ_final
//! ```
//!
//! | Shape               | shape(t)                                   |
//! |---------------------|--------------------------------------------|
//! | `logistic`          | 1 − 1 / (1 + e^(−12 (t − 0.4)))            |
//! | `exponential`       | e^(−5t), rescaled to [0, 1]                |
//! | `steep_exponential` | e^(−10t), rescaled to [0, 1]               |
//!
//! # Example
//!
//! ```rust
//! use coag_rs::models::{DecayShape, InjectionSchedule};
//!
//! let schedule = InjectionSchedule::decay(1.0, 0.2, DecayShape::Exponential);
//! let lambdas = schedule.precompute(11);
//!
//! assert!((lambdas[0] - 1.0).abs() < 1e-12);
//! assert!((lambdas[10] - 0.2).abs() < 1e-12);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoagulationError, Result};

// =================================================================================================
// Decay shape
// =================================================================================================

/// Profile of a decaying injection rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayShape {
    /// Smooth switch centred at 40 % of the run
    Logistic,
    /// Normalized e^(−5t)
    Exponential,
    /// Normalized e^(−10t)
    SteepExponential,
}

impl DecayShape {
    /// Canonical snake_case name
    pub fn name(&self) -> &'static str {
        match self {
            DecayShape::Logistic => "logistic",
            DecayShape::Exponential => "exponential",
            DecayShape::SteepExponential => "steep_exponential",
        }
    }

    /// Shape values on `ts`, nominally in [0, 1].
    fn profile(&self, ts: &[f64]) -> Vec<f64> {
        match self {
            DecayShape::Logistic => ts
                .iter()
                .map(|t| 1.0 - 1.0 / (1.0 + (-12.0 * (t - 0.4)).exp()))
                .collect(),
            DecayShape::Exponential => rescaled_exponential(ts, 5.0),
            DecayShape::SteepExponential => rescaled_exponential(ts, 10.0),
        }
    }
}

/// e^(−scale·t) mapped affinely onto [0, 1].
fn rescaled_exponential(ts: &[f64], scale: f64) -> Vec<f64> {
    let exps: Vec<f64> = ts.iter().map(|t| (-scale * t).exp()).collect();
    let min = exps.iter().copied().fold(f64::INFINITY, f64::min);
    let max = exps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let height = max - min;

    if height > 0.0 {
        exps.iter().map(|e| (e - min) / height).collect()
    } else {
        // a single sample sits at the start of the decay
        vec![1.0; exps.len()]
    }
}

impl FromStr for DecayShape {
    type Err = CoagulationError;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "logistic" => Ok(DecayShape::Logistic),
            "exponential" => Ok(DecayShape::Exponential),
            "steep_exponential" => Ok(DecayShape::SteepExponential),
            _ => Err(CoagulationError::InvalidSchedule {
                reason: format!("unsupported decay type {name:?}"),
            }),
        }
    }
}

impl fmt::Display for DecayShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =================================================================================================
// Injection schedule
// =================================================================================================

/// Injection rate over the course of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InjectionSchedule {
    /// λ held fixed
    Constant {
        /// Injection rate
        lambda: f64,
    },

    /// λ decays from `initial` to `final_lambda`
    Decay {
        /// Rate at the first step
        initial: f64,
        /// Rate approached at the last step
        final_lambda: f64,
        /// Profile of the decay
        shape: DecayShape,
    },
}

impl InjectionSchedule {
    /// Fixed injection rate
    pub fn constant(lambda: f64) -> Self {
        Self::Constant { lambda }
    }

    /// Decaying injection rate
    pub fn decay(initial: f64, final_lambda: f64, shape: DecayShape) -> Self {
        Self::Decay { initial, final_lambda, shape }
    }

    /// Build a schedule from optional configuration fields.
    ///
    /// A final rate and a decay type must be given together; a decay type
    /// must name one of the supported shapes.
    pub fn from_parts(lambda: f64, final_lambda: Option<f64>, decay_type: Option<&str>) -> Result<Self> {
        let schedule = match (final_lambda, decay_type) {
            (None, None) => Self::constant(lambda),
            (Some(final_lambda), Some(name)) => Self::decay(lambda, final_lambda, name.parse()?),
            (Some(_), None) => {
                return Err(CoagulationError::InvalidSchedule {
                    reason: "final_lambda given without a decay type".to_string(),
                });
            }
            (None, Some(name)) => {
                return Err(CoagulationError::InvalidSchedule {
                    reason: format!("decay type {name:?} given without final_lambda"),
                });
            }
        };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Check that every rate is finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        let rates: Vec<(&'static str, f64)> = match self {
            Self::Constant { lambda } => vec![("lambda", *lambda)],
            Self::Decay { initial, final_lambda, .. } => {
                vec![("lambda", *initial), ("final_lambda", *final_lambda)]
            }
        };
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(CoagulationError::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite and >= 0",
                });
            }
        }
        Ok(())
    }

    /// Rate in effect at the first step
    pub fn initial_rate(&self) -> f64 {
        match self {
            Self::Constant { lambda } => *lambda,
            Self::Decay { initial, .. } => *initial,
        }
    }

    /// `true` if λ changes over the run
    pub fn is_decaying(&self) -> bool {
        matches!(self, Self::Decay { .. })
    }

    /// Injection rate for each of `steps` steps.
    pub fn precompute(&self, steps: usize) -> Vec<f64> {
        match self {
            Self::Constant { lambda } => vec![*lambda; steps],
            Self::Decay { initial, final_lambda, shape } => {
                let range = initial - final_lambda;
                shape
                    .profile(&linspace(steps))
                    .into_iter()
                    .map(|s| s * range + final_lambda)
                    .collect()
            }
        }
    }
}

/// `steps` points evenly spaced on [0, 1], endpoints included.
fn linspace(steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let last = (steps - 1) as f64;
            (0..steps).map(|i| i as f64 / last).collect()
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================
