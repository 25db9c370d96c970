//! Closed-form references for the shattering coagulation model
//!
//! For the kernel K ≡ 2 (additive, α = 0) with unit mass, the monomer
//! source model relaxes to a stationary state whose low moments are known
//! exactly and whose tail follows a power law with exponential cut-off.

use nalgebra::DVector;
use std::f64::consts::PI;

/// Asymptotic stationary concentration of clusters of size `k`:
///
/// ```text
/// c(k) ≈ λ / (√π · k^(3/2)) · exp(−λ² · k)
/// ```
///
/// Returns zero for `k == 0`.
pub fn shattering_steady_state(k: usize, lambda: f64) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let size = k as f64;
    lambda / (PI.sqrt() * size.powf(1.5)) * (-lambda * lambda * size).exp()
}

/// [`shattering_steady_state`] tabulated on sizes 0..=`size`.
///
/// ```rust
/// use coag_rs::models::shattering_profile;
///
/// let profile = shattering_profile(100, 0.5);
/// assert_eq!(profile.len(), 101);
/// assert_eq!(profile[0], 0.0);
/// assert!(profile[10] > profile[20]);
/// ```
pub fn shattering_profile(size: usize, lambda: f64) -> DVector<f64> {
    DVector::from_fn(size + 1, |k, _| shattering_steady_state(k, lambda))
}

/// Exact stationary monomer concentration λ / (1 + λ) for K ≡ 2.
pub fn stationary_monomers(lambda: f64) -> f64 {
    lambda / (1.0 + lambda)
}

/// Exact stationary particle count 2λ / (1 + 2λ) for K ≡ 2.
pub fn stationary_count(lambda: f64) -> f64 {
    2.0 * lambda / (1.0 + 2.0 * lambda)
}

/// Exact stationary concentration of the constant-source model for K ≡ 2:
///
/// ```text
/// c(k) = (2k − 2)! / (k! · (k − 1)! · 2^(2k − 1))  ~  k^(−3/2) / (2√π)
/// ```
///
/// Evaluated through the ratio c(k) / c(k − 1) = (2k − 3) / (2k) so that
/// large `k` does not overflow. Returns zero for `k == 0`.
pub fn constant_source_steady_state(k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    (2..=k).fold(0.5, |c, j| c * (2 * j - 3) as f64 / (2 * j) as f64)
}
