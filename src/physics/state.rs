//! Concentration state of a truncated cluster-size distribution
//!
//! A state of truncation size N stores N + 1 concentrations indexed 0..=N.
//! Index 0 is a placeholder that always holds zero, index k ≥ 1 holds the
//! concentration of clusters made of k monomers. Keeping the unused slot
//! lets every operator index the vector by cluster size directly.

use nalgebra::DVector;

use crate::error::{CoagulationError, Result};

// =================================================================================================
// Concentration State
// =================================================================================================

/// Concentrations of clusters of size 0..=N
///
/// # Invariants
///
/// - length is N + 1 with N ≥ 2
/// - entry 0 is zero
/// - entries are finite and non-negative when the state is built
///
/// Stepping may later drive entries slightly negative or non-finite if the
/// caller picks a time step that is too large; the state does not police
/// that (see [`ConcentrationState::first_non_finite`]).
///
/// # Example
///
/// ```rust
/// use coag_rs::physics::ConcentrationState;
///
/// let state = ConcentrationState::monomers(10).unwrap();
/// assert_eq!(state.size(), 10);
/// assert_eq!(state.total_mass(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationState {
    values: DVector<f64>,
}

impl ConcentrationState {
    /// Canonical initial state: all mass carried by monomers (`c[1] = 1`).
    pub fn monomers(size: usize) -> Result<Self> {
        if size < 2 {
            return Err(CoagulationError::InvalidSize { size });
        }
        let mut values = DVector::zeros(size + 1);
        values[1] = 1.0;
        Ok(Self { values })
    }

    /// Build a state from an explicit vector of length N + 1.
    pub fn from_vector(values: DVector<f64>) -> Result<Self> {
        if values.len() < 3 {
            return Err(CoagulationError::InvalidSize { size: values.len().saturating_sub(1) });
        }
        if values[0] != 0.0 {
            return Err(CoagulationError::InvalidConcentration {
                index: 0,
                value: values[0],
                reason: "index 0 is unused and must be zero",
            });
        }
        if let Some((index, &value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(CoagulationError::InvalidConcentration {
                index,
                value,
                reason: "concentrations must be finite and non-negative",
            });
        }
        Ok(Self { values })
    }

    /// Build a state from a plain `Vec<f64>` of length N + 1.
    pub fn from_vec(values: Vec<f64>) -> Result<Self> {
        Self::from_vector(DVector::from_vec(values))
    }

    /// Truncation size N (largest representable cluster).
    pub fn size(&self) -> usize {
        self.values.len() - 1
    }

    /// Length of the underlying vector (N + 1).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`: a valid state holds at least three entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Concentration of clusters of size `k` (zero outside 1..=N).
    pub fn get(&self, k: usize) -> f64 {
        if k == 0 || k >= self.values.len() {
            0.0
        } else {
            self.values[k]
        }
    }

    /// Borrow the underlying vector.
    pub fn as_vector(&self) -> &DVector<f64> {
        &self.values
    }

    /// Borrow the concentrations as a slice, index 0 included.
    pub fn as_slice(&self) -> &[f64] {
        self.values.as_slice()
    }

    /// Consume the state and return the underlying vector.
    pub fn into_vector(self) -> DVector<f64> {
        self.values
    }

    // ======================================= Moments ========================================

    /// Moment of order `p`: Σ_{k≥1} c(k)·k^p.
    ///
    /// Order 0 is the particle count, order 1 the total mass.
    pub fn moment(&self, order: i32) -> f64 {
        moment_of(self.values.as_slice(), order)
    }

    /// Zeroth moment (number of clusters).
    pub fn particle_count(&self) -> f64 {
        self.moment(0)
    }

    /// First moment (number of monomers bound in clusters).
    pub fn total_mass(&self) -> f64 {
        self.moment(1)
    }

    // ======================================== Updates ========================================

    /// Explicit Euler update `c ← c + dt · update` on sizes 1..=N.
    ///
    /// Index 0 is left untouched so it stays zero.
    pub(crate) fn advance(&mut self, dt: f64, update: &DVector<f64>) {
        debug_assert_eq!(update.len(), self.values.len());
        for (c, u) in self.values.iter_mut().zip(update.iter()).skip(1) {
            *c += dt * u;
        }
    }

    /// First entry that is NaN or infinite, as `(index, value)`.
    pub fn first_non_finite(&self) -> Option<(usize, f64)> {
        self.values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
            .map(|(i, v)| (i, *v))
    }
}

/// Moment of order `p` of a raw concentration slice indexed by cluster size.
fn moment_of(values: &[f64], order: i32) -> f64 {
    values
        .iter()
        .enumerate()
        .skip(1)
        .map(|(k, c)| c * (k as f64).powi(order))
        .sum()
}

/// Moments of order `p` for a sequence of states, one value per state.
///
/// ```rust
/// use coag_rs::physics::{batch_moments, ConcentrationState};
///
/// let history = vec![
///     ConcentrationState::monomers(4).unwrap(),
///     ConcentrationState::from_vec(vec![0.0, 0.0, 0.5, 0.0, 0.0]).unwrap(),
/// ];
/// assert_eq!(batch_moments(&history, 1), vec![1.0, 1.0]);
/// ```
pub fn batch_moments(states: &[ConcentrationState], order: i32) -> Vec<f64> {
    states.iter().map(|s| s.moment(order)).collect()
}

// =================================================================================================
// Tests
// =================================================================================================
