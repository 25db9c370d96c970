//! Reference rate operators by direct summation
//!
//! The dense kernel matrix is tabulated once; every operator is then a
//! plain double sum over it. Slow, but free of approximation, which makes
//! it the oracle the factorized operators are tested against.

use nalgebra::{DMatrix, DVector};

use crate::error::{CoagulationError, Result};
use crate::kernels::Kernel;
use crate::rates::RateOperators;

/// Direct O(N²) evaluation over the tabulated kernel.
#[derive(Debug, Clone)]
pub struct DirectRates {
    kernel: DMatrix<f64>,
}

impl DirectRates {
    /// Tabulate `kernel` on sizes 0..=`size`.
    pub fn new(kernel: &Kernel, size: usize) -> Result<Self> {
        if size < 2 {
            return Err(CoagulationError::InvalidSize { size });
        }
        Ok(Self { kernel: kernel.matrix(size) })
    }

    /// Dense (N + 1) × (N + 1) kernel matrix
    pub fn kernel_matrix(&self) -> &DMatrix<f64> {
        &self.kernel
    }
}

impl RateOperators for DirectRates {
    fn size(&self) -> usize {
        self.kernel.nrows() - 1
    }

    fn name(&self) -> &str {
        "direct"
    }

    fn k_nn(&self, c: &DVector<f64>) -> DVector<f64> {
        let len = c.len();
        let mut gain = DVector::zeros(len);
        for k in 2..len {
            gain[k] = (1..k).map(|i| self.kernel[(i, k - i)] * c[i] * c[k - i]).sum::<f64>();
        }
        gain
    }

    fn k_ij_nn(&self, c: &DVector<f64>, lowbound: usize) -> f64 {
        let start = lowbound.max(1);
        let mut flux = 0.0;
        for i in start..c.len() {
            for j in start..c.len() {
                flux += self.kernel[(i, j)] * (i + j) as f64 * c[i] * c[j];
            }
        }
        flux
    }

    fn k_n(&self, c: &DVector<f64>) -> DVector<f64> {
        let len = c.len();
        DVector::from_fn(len, |k, _| {
            if k == 0 {
                0.0
            } else {
                (1..len).map(|j| self.kernel[(k, j)] * c[j]).sum::<f64>()
            }
        })
    }

    fn j_k_1j_n(&self, c: &DVector<f64>) -> f64 {
        (2..c.len()).map(|j| j as f64 * self.kernel[(1, j)] * c[j]).sum::<f64>()
    }
}

// =================================================================================================
// Tests
// =================================================================================================
