//! Low-rank approximation strategies for kernels without a closed form
//!
//! The ballistic kernel has no known exact separable form, so its dense
//! matrix is compressed numerically. Strategies implement
//! [`LowRankStrategy`] and can be swapped without touching the rate
//! operators or the integrator.

use nalgebra::DMatrix;

use crate::error::{CoagulationError, Result};

/// Singular values at or below this cut-off are discarded.
pub const SVD_TOLERANCE: f64 = 1e-10;

/// Turns a dense matrix into factors (U, V) with U·V ≈ matrix.
pub trait LowRankStrategy: Send + Sync {
    /// Return U (rows × r) and V (r × cols).
    fn approximate(&self, matrix: &DMatrix<f64>) -> Result<(DMatrix<f64>, DMatrix<f64>)>;

    /// Strategy name used in logs
    fn name(&self) -> &str;
}

/// Truncated singular value decomposition
///
/// Keeps every singular triplet whose singular value exceeds `tolerance`
/// and folds the singular values into U, so that
/// `U = u[:, kept] · diag(σ_kept)` and `V = vᵗ[kept, :]`.
///
/// The retained rank depends on the kernel and on N; this is the only
/// place where approximation error beyond rounding enters the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruncatedSvd {
    /// Singular value cut-off
    pub tolerance: f64,
}

impl TruncatedSvd {
    /// Strategy with a custom cut-off
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

impl Default for TruncatedSvd {
    fn default() -> Self {
        Self::new(SVD_TOLERANCE)
    }
}

impl LowRankStrategy for TruncatedSvd {
    fn approximate(&self, matrix: &DMatrix<f64>) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
        let (rows, cols) = matrix.shape();
        let svd = matrix.clone().svd(true, true);

        let (Some(left), Some(right_t)) = (svd.u, svd.v_t) else {
            return Err(CoagulationError::DecompositionFailed {
                reason: "SVD did not return singular vectors",
            });
        };

        let kept: Vec<usize> = svd
            .singular_values
            .iter()
            .enumerate()
            .filter(|(_, s)| **s > self.tolerance)
            .map(|(d, _)| d)
            .collect();

        log::debug!(
            "truncated SVD: kept {} of {} singular values above {:e}",
            kept.len(),
            svd.singular_values.len(),
            self.tolerance
        );

        let u = DMatrix::from_fn(rows, kept.len(), |i, d| {
            left[(i, kept[d])] * svd.singular_values[kept[d]]
        });
        let v = DMatrix::from_fn(kept.len(), cols, |d, j| right_t[(kept[d], j)]);

        Ok((u, v))
    }

    fn name(&self) -> &str {
        "truncated SVD"
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::{Factorization, Kernel};

    fn max_abs_diff(a: &DMatrix<f64>, b: &DMatrix<f64>) -> f64 {
        (a - b).iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
    }

    #[test]
    fn test_svd_recovers_exact_rank() {
        // rank-2 additive kernel must compress to two components
        let dense = Kernel::Additive { alpha: 0.5 }.matrix(30);
        let (u, v) = TruncatedSvd::default().approximate(&dense).unwrap();

        assert_eq!(u.ncols(), 2);
        assert_eq!(v.nrows(), 2);
        assert!(max_abs_diff(&(&u * &v), &dense) < 1e-8);
    }

    #[test]
    fn test_ballistic_reconstruction() {
        for size in [10, 50] {
            let kernel = Kernel::Ballistic;
            let factorization = kernel.factorize(size).unwrap();
            let dense = kernel.matrix(size);

            assert!(
                max_abs_diff(&factorization.reconstruct(), &dense) < 1e-8,
                "reconstruction error too large at N={}",
                size
            );
        }
    }

    #[test]
    fn test_ballistic_rank_is_compressed() {
        let factorization = Kernel::Ballistic.factorize(50).unwrap();
        assert!(factorization.rank() < 51);
        assert!(factorization.rank() < 50, "rank {} not compressed", factorization.rank());
    }

    #[test]
    fn test_zero_matrix_has_rank_zero() {
        let (u, v) = TruncatedSvd::default().approximate(&DMatrix::zeros(5, 5)).unwrap();
        assert_eq!(u.shape(), (5, 0));
        assert_eq!(v.shape(), (0, 5));
    }

    #[test]
    fn test_coarse_tolerance_drops_components() {
        let dense = Kernel::Ballistic.matrix(40);
        let fine = Factorization::approximate(&Kernel::Ballistic, 40, &TruncatedSvd::default()).unwrap();
        let coarse = Factorization::approximate(&Kernel::Ballistic, 40, &TruncatedSvd::new(1e-2)).unwrap();

        assert!(coarse.rank() < fine.rank());
        assert!(max_abs_diff(&coarse.reconstruct(), &dense) < 1e-1);
    }
}
