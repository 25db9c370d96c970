//! Helper functions for integration tests

use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random non-negative concentration vector of length N + 1 with index 0 zeroed.
///
/// Seeded, so every run of the suite sees the same vectors.
pub fn random_concentration(size: usize, seed: u64) -> DVector<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    DVector::from_fn(size + 1, |k, _| if k == 0 { 0.0 } else { rng.random_range(0.0..1.0) })
}

/// Compute relative error: |actual - expected| / |expected|
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}

/// ‖actual − expected‖₂ / ‖expected‖₂
pub fn relative_norm_error(actual: &DVector<f64>, expected: &DVector<f64>) -> f64 {
    let scale = expected.norm();
    if scale < 1e-300 {
        (actual - expected).norm()
    } else {
        (actual - expected).norm() / scale
    }
}

/// Assert that two vectors are close element-wise (within tolerance)
pub fn assert_vectors_close(actual: &DVector<f64>, expected: &DVector<f64>, tolerance: f64, message: &str) {
    assert_eq!(actual.len(), expected.len(), "{}: Dimension mismatch", message);

    for (i, (&a, &e)) in actual.iter().zip(expected.iter()).enumerate() {
        let diff = (a - e).abs();
        assert!(
            diff < tolerance,
            "{}: Element {} differs by {} (tolerance {})",
            message, i, diff, tolerance
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_error() {
        assert!((relative_error(1.0, 1.0) - 0.0).abs() < 1e-10);
        assert!((relative_error(1.1, 1.0) - 0.1).abs() < 1e-10);
        assert!((relative_error(0.9, 1.0) - 0.1).abs() < 1e-10);
    }

    #[test]
    fn test_random_concentration_is_seeded() {
        let a = random_concentration(20, 7);
        let b = random_concentration(20, 7);
        assert_eq!(a, b);
        assert_eq!(a[0], 0.0);
        assert!(a.iter().all(|&v| v >= 0.0));
    }
}
