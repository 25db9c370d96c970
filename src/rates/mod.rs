//! Coagulation rate operators
//!
//! # Mathematical Background
//!
//! For a concentration vector c indexed by cluster size 0..=N, the
//! right-hand side of the Smoluchowski equation is assembled from four
//! quantities:
//!
//! ```text
//! K_nn(c)[k]        = Σ_{i=1}^{k-1} K(i, k-i) · c(i) · c(k-i)        (k ≥ 2, gain)
//! K_n(c)[k]         = Σ_{j≥1} K(k, j) · c(j)                          (loss rate)
//! K_ij_nn(c, lb)    = Σ_{i,j≥lb} K(i, j) · (i + j) · c(i) · c(j)      (mass flux)
//! j_K_1j_n(c)       = Σ_{j≥2} j · K(1, j) · c(j)                      (monomer term)
//! ```
//!
//! Two evaluation strategies implement [`RateOperators`]:
//!
//! | Strategy | Type               | K_nn             | K_n      | K_ij_nn  |
//! |----------|--------------------|------------------|----------|----------|
//! | `direct` | [`DirectRates`]    | O(N²)            | O(N²)    | O(N²)    |
//! | `fast`   | [`FactorizedRates`]| O(r · N log N)   | O(r · N) | O(r · N) |
//!
//! The direct form is the reference oracle; the fast form is the
//! production path and must agree with it to floating tolerance.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use nalgebra::DVector;
//! use coag_rs::backend::CpuBackend;
//! use coag_rs::kernels::Kernel;
//! use coag_rs::rates::{build_rates, EvaluationStrategy};
//!
//! let backend = Arc::new(CpuBackend::new());
//! let rates = build_rates(&Kernel::Constant, 4, EvaluationStrategy::Fast, backend).unwrap();
//!
//! let c = DVector::from_vec(vec![0.0, 1.0, 0.0, 0.0, 0.0]);
//! let gain = rates.k_nn(&c);
//! assert!((gain[2] - 1.0).abs() < 1e-12);
//! ```

use std::fmt;
use std::sync::Arc;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::backend::Backend;
use crate::error::Result;
use crate::kernels::Kernel;

pub mod direct;
pub mod fast;

pub use direct::DirectRates;
pub use fast::FactorizedRates;

// =================================================================================================
// Rate Operators
// =================================================================================================

/// Rate quantities of the coagulation right-hand side.
///
/// Every method takes a concentration vector of length N + 1 (index 0
/// unused and zero) and is a pure function of it. Lengths are checked once
/// when the operators are attached to an integrator, not on every call.
pub trait RateOperators: Send + Sync {
    /// Truncation size N
    fn size(&self) -> usize;

    /// Strategy name used in logs and metadata
    fn name(&self) -> &str;

    /// Gain term, length N + 1. Entries 0 and 1 are zero.
    fn k_nn(&self, c: &DVector<f64>) -> DVector<f64>;

    /// Mass flux Σ_{i,j≥lowbound} K(i,j)·(i+j)·c(i)·c(j).
    fn k_ij_nn(&self, c: &DVector<f64>, lowbound: usize) -> f64;

    /// Loss rate, length N + 1. Entry 0 is zero.
    fn k_n(&self, c: &DVector<f64>) -> DVector<f64>;

    /// Monomer boundary term Σ_{j≥2} j·K(1,j)·c(j).
    fn j_k_1j_n(&self, c: &DVector<f64>) -> f64;
}

// =================================================================================================
// Strategy selection
// =================================================================================================

/// How the rate operators are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStrategy {
    /// Direct double sums over the dense kernel matrix
    Direct,
    /// Low-rank factorization with FFT convolution
    #[default]
    Fast,
}

impl fmt::Display for EvaluationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationStrategy::Direct => f.write_str("direct"),
            EvaluationStrategy::Fast => f.write_str("fast"),
        }
    }
}

/// Build the rate operators for a kernel truncated at `size`.
///
/// The direct strategy never touches the backend; the fast strategy
/// factorizes the kernel once and runs every product through `backend`.
pub fn build_rates(
    kernel: &Kernel,
    size: usize,
    strategy: EvaluationStrategy,
    backend: Arc<dyn Backend>,
) -> Result<Box<dyn RateOperators>> {
    match strategy {
        EvaluationStrategy::Direct => Ok(Box::new(DirectRates::new(kernel, size)?)),
        EvaluationStrategy::Fast => {
            let factorization = kernel.factorize(size)?;
            Ok(Box::new(FactorizedRates::new(factorization, backend)))
        }
    }
}

/// Copy of `c` with every index below `lowbound` set to zero.
pub(crate) fn truncate_below(c: &DVector<f64>, lowbound: usize) -> DVector<f64> {
    let mut truncated = c.clone();
    for value in truncated.iter_mut().take(lowbound) {
        *value = 0.0;
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;

    #[test]
    fn test_truncate_below() {
        let c = DVector::from_vec(vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(truncate_below(&c, 2), DVector::from_vec(vec![0.0, 0.0, 2.0, 3.0]));
        assert_eq!(truncate_below(&c, 0), c);
    }

    #[test]
    fn test_build_rates_names() {
        let backend: Arc<dyn Backend> = Arc::new(CpuBackend::new());
        let direct = build_rates(&Kernel::Ballistic, 8, EvaluationStrategy::Direct, backend.clone()).unwrap();
        let fast = build_rates(&Kernel::Ballistic, 8, EvaluationStrategy::Fast, backend).unwrap();

        assert_eq!(direct.name(), "direct");
        assert_eq!(fast.name(), "fast");
        assert_eq!(direct.size(), 8);
        assert_eq!(fast.size(), 8);
    }

    #[test]
    fn test_build_rates_rejects_small_size() {
        let backend: Arc<dyn Backend> = Arc::new(CpuBackend::new());
        assert!(build_rates(&Kernel::Constant, 1, EvaluationStrategy::Fast, backend.clone()).is_err());
        assert!(build_rates(&Kernel::Constant, 1, EvaluationStrategy::Direct, backend).is_err());
    }

    #[test]
    fn test_strategy_default_is_fast() {
        assert_eq!(EvaluationStrategy::default(), EvaluationStrategy::Fast);
        assert_eq!(EvaluationStrategy::Direct.to_string(), "direct");
    }
}
