//! Multi-threaded backend on a dedicated rayon pool
//!
//! Rank components of a convolution sum are transformed in parallel and
//! reduced in frequency space; long matrix-vector products are split
//! over output rows. Below the parallel threshold every operation takes
//! the sequential path, so small problems do not pay the dispatch cost.
//!
//! Results match [`CpuBackend`](crate::backend::CpuBackend) up to the
//! reordering of floating-point sums.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use rustfft::num_complex::Complex;

use crate::backend::cpu::{real_part, spectrum, transform_len, CpuBackend};
use crate::backend::Backend;

/// Default number of output elements above which work is split across threads.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 999;

/// Rayon-backed numeric substrate.
pub struct ParallelBackend {
    pool: ThreadPool,
    threshold: usize,
    fft: CpuBackend,
}

impl ParallelBackend {
    /// Build a pool with `threads` workers (rayon's default when `None`).
    pub fn new(threads: Option<usize>) -> Result<Self, ThreadPoolBuildError> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("coag-worker-{i}"));
        if let Some(n) = threads {
            builder = builder.num_threads(n);
        }
        Ok(Self {
            pool: builder.build()?,
            threshold: DEFAULT_PARALLEL_THRESHOLD,
            fft: CpuBackend::new(),
        })
    }

    /// Override the element count above which work is parallelized.
    ///
    /// # Panics
    ///
    /// Panics when `threshold == 0`.
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        assert!(threshold > 0, "parallel threshold must be at least 1");
        self.threshold = threshold;
        self
    }

    /// Current parallel threshold
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Number of worker threads in the pool
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl std::fmt::Debug for ParallelBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelBackend")
            .field("threads", &self.threads())
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl Backend for ParallelBackend {
    fn name(&self) -> &str {
        "parallel"
    }

    fn convolve_sum(&self, pairs: &[(DVector<f64>, DVector<f64>)], out_len: usize) -> DVector<f64> {
        if pairs.len() < 2 || out_len <= self.threshold {
            return self.fft.convolve_sum(pairs, out_len);
        }
        let len = transform_len(pairs[0].0.len(), pairs[0].1.len());
        let (forward, inverse) = self.fft.plans(len);

        let acc = self.pool.install(|| {
            pairs
                .par_iter()
                .map(|(a, b)| {
                    let fa = spectrum(forward.as_ref(), a.as_slice(), len);
                    let fb = spectrum(forward.as_ref(), b.as_slice(), len);
                    fa.iter().zip(&fb).map(|(x, y)| x * y).collect::<Vec<_>>()
                })
                .reduce(
                    || vec![Complex::new(0.0, 0.0); len],
                    |mut left, right| {
                        for (l, r) in left.iter_mut().zip(&right) {
                            *l += r;
                        }
                        left
                    },
                )
        });
        real_part(inverse.as_ref(), acc, out_len)
    }

    fn mat_vec(&self, matrix: &DMatrix<f64>, vector: &DVector<f64>) -> DVector<f64> {
        if matrix.nrows() <= self.threshold {
            return matrix * vector;
        }
        let rows: Vec<f64> = self.pool.install(|| {
            (0..matrix.nrows())
                .into_par_iter()
                .map(|i| matrix.row(i).transpose().dot(vector))
                .collect()
        });
        DVector::from_vec(rows)
    }

    fn tr_mat_vec(&self, matrix: &DMatrix<f64>, vector: &DVector<f64>) -> DVector<f64> {
        if matrix.ncols() <= self.threshold {
            return matrix.tr_mul(vector);
        }
        let columns: Vec<f64> = self.pool.install(|| {
            (0..matrix.ncols())
                .into_par_iter()
                .map(|j| matrix.column(j).dot(vector))
                .collect()
        });
        DVector::from_vec(columns)
    }
}

// =================================================================================================
// Tests
// =================================================================================================
