//! Rate operators on a low-rank kernel factorization
//!
//! # Mathematical Background
//!
//! With K(i, j) = Σ_d U(i, d)·V(d, j) the gain term becomes a sum of r
//! linear convolutions:
//!
//! ```text
//! K_nn(c)[k] = Σ_d Σ_i (U(i,d)·c(i)) · (V(d,k-i)·c(k-i)) = Σ_d ((U_d ∘ c) ∗ (V_d ∘ c))[k]
//! ```
//!
//! Each component is summed once. For the exact constant and additive
//! factorizations and for SVD-derived ones alike, the components already
//! reproduce K(i, k-i) for every ordered pair, so no extra symmetry factor
//! is applied.
//!
//! The mass flux uses the symmetry of K to fold the (i + j) weight onto
//! one side:
//!
//! ```text
//! K_ij_nn(c) = 2 · (Uᵗ c_lb) · (Vj c_lb)
//! ```
//!
//! where `c_lb` is c with indices below the lower bound zeroed.

use std::sync::Arc;

use nalgebra::DVector;

use crate::backend::Backend;
use crate::kernels::Factorization;
use crate::rates::{truncate_below, RateOperators};

/// Factorization + convolution evaluation of the rate operators.
pub struct FactorizedRates {
    factorization: Factorization,
    backend: Arc<dyn Backend>,
}

impl FactorizedRates {
    /// Attach a factorization to a numeric backend.
    pub fn new(factorization: Factorization, backend: Arc<dyn Backend>) -> Self {
        Self { factorization, backend }
    }

    /// Underlying factorization
    pub fn factorization(&self) -> &Factorization {
        &self.factorization
    }

    /// Retained rank r
    pub fn rank(&self) -> usize {
        self.factorization.rank()
    }

    /// Backend the products run on
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }
}

impl std::fmt::Debug for FactorizedRates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactorizedRates")
            .field("size", &self.factorization.size())
            .field("rank", &self.factorization.rank())
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl RateOperators for FactorizedRates {
    fn size(&self) -> usize {
        self.factorization.size()
    }

    fn name(&self) -> &str {
        "fast"
    }

    fn k_nn(&self, c: &DVector<f64>) -> DVector<f64> {
        let u = self.factorization.u();
        let v = self.factorization.v();

        let pairs: Vec<(DVector<f64>, DVector<f64>)> = (0..self.factorization.rank())
            .map(|d| {
                let left = u.column(d).component_mul(c);
                let right = v.row(d).transpose().component_mul(c);
                (left, right)
            })
            .collect();

        let mut gain = self.backend.convolve_sum(&pairs, c.len());
        gain[0] = 0.0;
        gain[1] = 0.0;
        gain
    }

    fn k_ij_nn(&self, c: &DVector<f64>, lowbound: usize) -> f64 {
        let truncated = truncate_below(c, lowbound);
        let left = self.backend.tr_mat_vec(self.factorization.u(), &truncated);
        let right = self.backend.mat_vec(self.factorization.vj(), &truncated);
        2.0 * self.backend.dot(&left, &right)
    }

    fn k_n(&self, c: &DVector<f64>) -> DVector<f64> {
        let reduced = self.backend.mat_vec(self.factorization.v(), c);
        let mut loss = self.backend.mat_vec(self.factorization.u(), &reduced);
        loss[0] = 0.0;
        loss
    }

    fn j_k_1j_n(&self, c: &DVector<f64>) -> f64 {
        self.backend.dot(self.factorization.jk1j(), c)
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;
    use crate::kernels::Kernel;
    use crate::rates::DirectRates;

    fn relative(a: &DVector<f64>, b: &DVector<f64>) -> f64 {
        (a - b).norm() / b.norm().max(f64::MIN_POSITIVE)
    }

    fn profile(size: usize) -> DVector<f64> {
        DVector::from_fn(size + 1, |k, _| if k == 0 { 0.0 } else { (-(k as f64) / 7.0).exp() })
    }

    fn pair(kernel: Kernel, size: usize) -> (DirectRates, FactorizedRates) {
        let direct = DirectRates::new(&kernel, size).unwrap();
        let fast = FactorizedRates::new(kernel.factorize(size).unwrap(), Arc::new(CpuBackend::new()));
        (direct, fast)
    }

    #[test]
    fn test_additive_gain_needs_no_doubling() {
        let (direct, fast) = pair(Kernel::Additive { alpha: 1.0 }, 30);
        let c = profile(30);
        assert!(relative(&fast.k_nn(&c), &direct.k_nn(&c)) < 1e-10);
    }

    #[test]
    fn test_ballistic_operators_match_direct() {
        let (direct, fast) = pair(Kernel::Ballistic, 40);
        let c = profile(40);

        assert!(relative(&fast.k_nn(&c), &direct.k_nn(&c)) < 1e-8);
        assert!(relative(&fast.k_n(&c), &direct.k_n(&c)) < 1e-8);

        for lowbound in [1, 2] {
            let (a, b) = (fast.k_ij_nn(&c, lowbound), direct.k_ij_nn(&c, lowbound));
            assert!((a - b).abs() <= 1e-8 * b.abs());
        }
        let (a, b) = (fast.j_k_1j_n(&c), direct.j_k_1j_n(&c));
        assert!((a - b).abs() <= 1e-8 * b.abs());
    }

    #[test]
    fn test_boundary_entries_are_zero() {
        let (_, fast) = pair(Kernel::Constant, 10);
        let c = profile(10);

        let gain = fast.k_nn(&c);
        assert_eq!(gain[0], 0.0);
        assert_eq!(gain[1], 0.0);
        assert_eq!(fast.k_n(&c)[0], 0.0);
    }

    #[test]
    fn test_debug_reports_rank() {
        let (_, fast) = pair(Kernel::Additive { alpha: 0.5 }, 10);
        let text = format!("{:?}", fast);
        assert!(text.contains("rank: 2"));
        assert!(text.contains("cpu"));
    }
}
