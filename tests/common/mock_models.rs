//! Mock rate operators for testing
//!
//! The constant kernel K ≡ κ collapses every pairwise sum onto the low
//! moments of the distribution, which gives an oracle independent of both
//! the dense-matrix sums and the factorized evaluation.

use coag_rs::rates::RateOperators;
use nalgebra::DVector;

// =================================================================================================
// Constant kernel oracle: K(i, j) = κ
// =================================================================================================

/// Closed-form rate operators of the constant kernel K ≡ κ.
///
/// ```text
/// K_n[k]         = κ · M0
/// K_ij_nn(c, lb) = 2κ · M0_lb · M1_lb
/// j_K_1j_n(c)    = κ · Σ_{j≥2} j·c(j)
/// ```
pub struct ConstantKernelOracle {
    pub size: usize,
    pub rate: f64,
}

impl ConstantKernelOracle {
    pub fn new(size: usize, rate: f64) -> Self {
        Self { size, rate }
    }

    fn moments_from(c: &DVector<f64>, lowbound: usize) -> (f64, f64) {
        c.iter()
            .enumerate()
            .skip(lowbound.max(1))
            .fold((0.0, 0.0), |(m0, m1), (k, v)| (m0 + v, m1 + k as f64 * v))
    }
}

impl RateOperators for ConstantKernelOracle {
    fn size(&self) -> usize {
        self.size
    }

    fn name(&self) -> &str {
        "constant oracle"
    }

    fn k_nn(&self, c: &DVector<f64>) -> DVector<f64> {
        DVector::from_fn(c.len(), |k, _| {
            if k < 2 {
                0.0
            } else {
                self.rate * (1..k).map(|i| c[i] * c[k - i]).sum::<f64>()
            }
        })
    }

    fn k_ij_nn(&self, c: &DVector<f64>, lowbound: usize) -> f64 {
        let (m0, m1) = Self::moments_from(c, lowbound);
        2.0 * self.rate * m0 * m1
    }

    fn k_n(&self, c: &DVector<f64>) -> DVector<f64> {
        let (m0, _) = Self::moments_from(c, 1);
        DVector::from_fn(c.len(), |k, _| if k == 0 { 0.0 } else { self.rate * m0 })
    }

    fn j_k_1j_n(&self, c: &DVector<f64>) -> f64 {
        let (_, m1) = Self::moments_from(c, 2);
        self.rate * m1
    }
}
