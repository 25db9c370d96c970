//! Separable (low-rank) kernel factorization
//!
//! # Mathematical Background
//!
//! A rank-r factorization writes the kernel matrix as
//!
//! ```text
//! K(i, j) ≈ Σ_{d<r} U(i, d) · V(d, j)        i, j ∈ [0, N]
//! ```
//!
//! which turns the pairwise sums of the coagulation equation into r
//! convolutions and r-length reductions.
//!
//! Two auxiliary vectors are precomputed once per factorization:
//!
//! - `Vj(d, j) = V(d, j) · j`, used by Σ K(i,j)·(i+j)·c(i)·c(j)
//! - `jK1j(j) = j · K(1, j)` for j ≥ 2 (zero for j < 2), used by the
//!   monomer boundary term
//!
//! A factorization is immutable once built.

use nalgebra::{DMatrix, DVector};

use crate::error::{CoagulationError, Result};
use crate::kernels::family::Kernel;
use crate::kernels::lowrank::LowRankStrategy;

/// Low-rank factors of a kernel truncated at size N
#[derive(Debug, Clone, PartialEq)]
pub struct Factorization {
    /// (N + 1) × r
    u: DMatrix<f64>,
    /// r × (N + 1)
    v: DMatrix<f64>,
    /// V weighted by column index, r × (N + 1)
    vj: DMatrix<f64>,
    /// j · K(1, j) for j ≥ 2, zero elsewhere, length N + 1
    jk1j: DVector<f64>,
}

impl Factorization {
    /// Assemble a factorization from its factors.
    ///
    /// `jk1j` is derived from row 1 of U·V, so it is consistent with the
    /// approximation rather than with the exact kernel.
    pub fn from_factors(u: DMatrix<f64>, v: DMatrix<f64>) -> Result<Self> {
        let len = u.nrows();
        if len < 3 || u.ncols() != v.nrows() || v.ncols() != len {
            return Err(CoagulationError::FactorizationMismatch {
                u_rows: u.nrows(),
                u_cols: u.ncols(),
                v_rows: v.nrows(),
                v_cols: v.ncols(),
                len,
            });
        }

        let mut vj = v.clone();
        for (j, mut column) in vj.column_iter_mut().enumerate() {
            column *= j as f64;
        }

        // row 1 of U·V
        let k1 = v.tr_mul(&u.row(1).transpose());
        let jk1j = DVector::from_fn(len, |j, _| if j >= 2 { j as f64 * k1[j] } else { 0.0 });

        Ok(Self { u, v, vj, jk1j })
    }

    /// Exact rank-1 factorization of the constant kernel.
    pub fn constant(size: usize) -> Self {
        let len = size + 1;
        let ones = DVector::from_fn(len, |i, _| if i == 0 { 0.0 } else { 1.0 });

        let u = DMatrix::from_column_slice(len, 1, ones.as_slice());
        let v = DMatrix::from_row_slice(1, len, ones.as_slice());
        let vj = DMatrix::from_fn(1, len, |_, j| if j == 0 { 0.0 } else { j as f64 });
        let jk1j = DVector::from_fn(len, |j, _| if j >= 2 { j as f64 } else { 0.0 });

        Self { u, v, vj, jk1j }
    }

    /// Exact rank-2 factorization of the additive kernel (i/j)^α + (j/i)^α.
    ///
    /// V rows are `[j^-α, j^α]`, U columns the same powers in reverse order,
    /// so that U(i,·)·V(·,j) = i^α·j^-α + i^-α·j^α.
    pub fn additive(size: usize, alpha: f64) -> Self {
        let len = size + 1;
        let power = |j: usize, exponent: f64| {
            if j == 0 { 0.0 } else { (j as f64).powf(exponent) }
        };

        let v = DMatrix::from_fn(2, len, |d, j| match d {
            0 => power(j, -alpha),
            _ => power(j, alpha),
        });
        let u = DMatrix::from_fn(len, 2, |i, d| match d {
            0 => power(i, alpha),
            _ => power(i, -alpha),
        });
        let vj = DMatrix::from_fn(2, len, |d, j| v[(d, j)] * j as f64);
        let jk1j = DVector::from_fn(len, |j, _| {
            if j >= 2 {
                let x = j as f64;
                x * (x.powf(-alpha) + x.powf(alpha))
            } else {
                0.0
            }
        });

        Self { u, v, vj, jk1j }
    }

    /// Approximate a kernel with a generic low-rank strategy applied to its
    /// dense matrix.
    pub fn approximate(kernel: &Kernel, size: usize, strategy: &dyn LowRankStrategy) -> Result<Self> {
        let matrix = kernel.matrix(size);
        let (u, v) = strategy.approximate(&matrix)?;
        log::debug!(
            "{} factorization of {} kernel at N={}: rank {}",
            strategy.name(),
            kernel,
            size,
            u.ncols()
        );
        Self::from_factors(u, v)
    }

    // ======================================== Queries ========================================

    /// Number of separable components r
    pub fn rank(&self) -> usize {
        self.u.ncols()
    }

    /// Truncation size N
    pub fn size(&self) -> usize {
        self.u.nrows() - 1
    }

    /// Left factor, (N + 1) × r
    pub fn u(&self) -> &DMatrix<f64> {
        &self.u
    }

    /// Right factor, r × (N + 1)
    pub fn v(&self) -> &DMatrix<f64> {
        &self.v
    }

    /// Right factor weighted by column index
    pub fn vj(&self) -> &DMatrix<f64> {
        &self.vj
    }

    /// j · K(1, j) for j ≥ 2
    pub fn jk1j(&self) -> &DVector<f64> {
        &self.jk1j
    }

    /// Dense reconstruction U·V of the kernel matrix.
    pub fn reconstruct(&self) -> DMatrix<f64> {
        &self.u * &self.v
    }
}

// =================================================================================================
// Tests
// =================================================================================================
