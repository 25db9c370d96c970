//! Single-threaded CPU backend
//!
//! Dense products go through nalgebra, convolutions through rustfft with
//! a zero-padded power-of-two transform length.

use std::sync::{Arc, Mutex};

use nalgebra::{DMatrix, DVector};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::backend::Backend;

/// Reference numeric substrate.
///
/// FFT plans are cached by the planner and shared behind a mutex, so one
/// backend can serve several integrators.
pub struct CpuBackend {
    planner: Mutex<FftPlanner<f64>>,
}

impl CpuBackend {
    /// Create a backend with an empty plan cache
    pub fn new() -> Self {
        Self { planner: Mutex::new(FftPlanner::new()) }
    }

    /// Forward and inverse plans for a transform length.
    pub(crate) fn plans(&self, len: usize) -> (Arc<dyn Fft<f64>>, Arc<dyn Fft<f64>>) {
        let mut planner = self.planner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        (planner.plan_fft_forward(len), planner.plan_fft_inverse(len))
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CpuBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuBackend").finish()
    }
}

/// Transform length for the linear convolution of two sequences.
pub(crate) fn transform_len(first: usize, second: usize) -> usize {
    (first + second - 1).next_power_of_two()
}

/// Zero-padded forward transform of a real sequence.
pub(crate) fn spectrum(fft: &dyn Fft<f64>, values: &[f64], len: usize) -> Vec<Complex<f64>> {
    let mut buffer = vec![Complex::new(0.0, 0.0); len];
    for (slot, &v) in buffer.iter_mut().zip(values) {
        slot.re = v;
    }
    fft.process(&mut buffer);
    buffer
}

/// Inverse transform, normalized, truncated to `out_len` real values.
pub(crate) fn real_part(ifft: &dyn Fft<f64>, mut buffer: Vec<Complex<f64>>, out_len: usize) -> DVector<f64> {
    let len = buffer.len();
    ifft.process(&mut buffer);
    let scale = 1.0 / len as f64;
    DVector::from_fn(out_len, |k, _| if k < len { buffer[k].re * scale } else { 0.0 })
}

impl Backend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn convolve_sum(&self, pairs: &[(DVector<f64>, DVector<f64>)], out_len: usize) -> DVector<f64> {
        let Some((first, second)) = pairs.first() else {
            return DVector::zeros(out_len);
        };
        let len = transform_len(first.len(), second.len());
        let (forward, inverse) = self.plans(len);

        // accumulate products in frequency space, one inverse transform
        let mut acc = vec![Complex::new(0.0, 0.0); len];
        for (a, b) in pairs {
            let fa = spectrum(forward.as_ref(), a.as_slice(), len);
            let fb = spectrum(forward.as_ref(), b.as_slice(), len);
            for ((slot, x), y) in acc.iter_mut().zip(&fa).zip(&fb) {
                *slot += x * y;
            }
        }
        real_part(inverse.as_ref(), acc, out_len)
    }

    fn mat_vec(&self, matrix: &DMatrix<f64>, vector: &DVector<f64>) -> DVector<f64> {
        matrix * vector
    }

    fn tr_mat_vec(&self, matrix: &DMatrix<f64>, vector: &DVector<f64>) -> DVector<f64> {
        matrix.tr_mul(vector)
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn naive_convolution(a: &[f64], b: &[f64], out_len: usize) -> Vec<f64> {
        (0..out_len)
            .map(|k| (0..=k).filter(|i| *i < a.len() && k - i < b.len()).map(|i| a[i] * b[k - i]).sum())
            .collect()
    }

    #[test]
    fn test_transform_len() {
        assert_eq!(transform_len(5, 5), 16);
        assert_eq!(transform_len(8, 9), 16);
        assert_eq!(transform_len(1, 1), 1);
    }

    #[test]
    fn test_convolution_matches_naive() {
        let backend = CpuBackend::new();
        let a = DVector::from_vec(vec![0.0, 1.0, 2.0, 0.5, 0.25, 3.0]);
        let b = DVector::from_vec(vec![0.0, 0.3, 0.0, 1.5, 2.0, 0.1]);

        let fast = backend.convolve(&a, &b, 6);
        let naive = naive_convolution(a.as_slice(), b.as_slice(), 6);

        for (x, y) in fast.iter().zip(&naive) {
            assert_relative_eq!(*x, *y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_convolve_sum_adds_components() {
        let backend = CpuBackend::new();
        let a = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let b = DVector::from_vec(vec![0.5, 0.0, 1.0]);

        let single = backend.convolve(&a, &b, 3);
        let double = backend.convolve_sum(&[(a.clone(), b.clone()), (a, b)], 3);

        for (s, d) in single.iter().zip(double.iter()) {
            assert_relative_eq!(2.0 * s, *d, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_empty_sum_is_zero() {
        let backend = CpuBackend::new();
        assert_eq!(backend.convolve_sum(&[], 4), DVector::zeros(4));
    }

    #[test]
    fn test_products() {
        let backend = CpuBackend::new();
        let m = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let x = DVector::from_vec(vec![1.0, 0.0, -1.0]);
        assert_eq!(backend.mat_vec(&m, &x), DVector::from_vec(vec![-2.0, -2.0]));

        let y = DVector::from_vec(vec![1.0, 1.0]);
        assert_eq!(backend.tr_mat_vec(&m, &y), DVector::from_vec(vec![5.0, 7.0, 9.0]));
        assert_eq!(backend.dot(&x, &x), 2.0);
    }
}
