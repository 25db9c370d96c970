//! Pluggable numeric substrate
//!
//! The rate operators only need a handful of primitives: a sum of linear
//! convolutions, matrix-vector products and dot products. [`Backend`]
//! names them, and two implementations provide them:
//!
//! - [`CpuBackend`]: single-threaded nalgebra + rustfft reference
//! - `ParallelBackend`: the same operations on a rayon thread pool
//!   (cargo feature `parallel`)
//!
//! # Selection and fallback
//!
//! [`select_backend`] resolves a [`BackendKind`] at configuration time.
//! When the parallel substrate cannot be built (feature disabled or the
//! thread pool fails to start) the run does not fail: it continues on
//! the single-threaded CPU path and the fallback is both logged and
//! reported in [`BackendSelection::fallback`].

use std::sync::Arc;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

pub mod cpu;
#[cfg(feature = "parallel")]
pub mod parallel;

pub use cpu::CpuBackend;
#[cfg(feature = "parallel")]
pub use parallel::ParallelBackend;

// =================================================================================================
// Backend trait
// =================================================================================================

/// Vector, matrix and convolution primitives used by the fast rate operators.
///
/// Implementations must return results equal to [`CpuBackend`] within
/// floating-point reordering error.
pub trait Backend: Send + Sync {
    /// Backend name used in logs and metadata
    fn name(&self) -> &str;

    /// Σ_p (a_p ∗ b_p), linear convolutions truncated to `out_len` entries.
    ///
    /// All pairs share the same lengths. An empty slice yields zeros.
    fn convolve_sum(&self, pairs: &[(DVector<f64>, DVector<f64>)], out_len: usize) -> DVector<f64>;

    /// `matrix · vector`
    fn mat_vec(&self, matrix: &DMatrix<f64>, vector: &DVector<f64>) -> DVector<f64>;

    /// `matrixᵗ · vector`
    fn tr_mat_vec(&self, matrix: &DMatrix<f64>, vector: &DVector<f64>) -> DVector<f64>;

    /// Linear convolution of two sequences truncated to `out_len` entries.
    fn convolve(&self, first: &DVector<f64>, second: &DVector<f64>, out_len: usize) -> DVector<f64> {
        self.convolve_sum(&[(first.clone(), second.clone())], out_len)
    }

    /// Dot product
    fn dot(&self, first: &DVector<f64>, second: &DVector<f64>) -> f64 {
        first.dot(second)
    }
}

// =================================================================================================
// Selection
// =================================================================================================

/// Requested numeric substrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Single-threaded reference backend
    #[default]
    Cpu,
    /// Multi-threaded backend; falls back to `Cpu` when unavailable
    Parallel,
}

/// Outcome of [`select_backend`].
#[derive(Clone)]
pub struct BackendSelection {
    /// Backend to compute with
    pub backend: Arc<dyn Backend>,
    /// What the configuration asked for
    pub requested: BackendKind,
    /// Reason the request could not be honored, if it fell back
    pub fallback: Option<String>,
}

impl BackendSelection {
    /// `true` if the requested backend was replaced by the CPU path
    pub fn fell_back(&self) -> bool {
        self.fallback.is_some()
    }
}

impl std::fmt::Debug for BackendSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSelection")
            .field("backend", &self.backend.name())
            .field("requested", &self.requested)
            .field("fallback", &self.fallback)
            .finish()
    }
}

/// Resolve a backend request. `threads` only applies to the parallel backend.
pub fn select_backend(kind: BackendKind, threads: Option<usize>) -> BackendSelection {
    match kind {
        BackendKind::Cpu => BackendSelection {
            backend: Arc::new(CpuBackend::new()),
            requested: kind,
            fallback: None,
        },
        BackendKind::Parallel => parallel_or_fallback(threads),
    }
}

#[cfg(feature = "parallel")]
fn parallel_or_fallback(threads: Option<usize>) -> BackendSelection {
    match ParallelBackend::new(threads) {
        Ok(backend) => {
            log::info!("parallel backend ready with {} threads", backend.threads());
            BackendSelection {
                backend: Arc::new(backend),
                requested: BackendKind::Parallel,
                fallback: None,
            }
        }
        Err(e) => cpu_fallback(format!("thread pool construction failed: {e}")),
    }
}

#[cfg(not(feature = "parallel"))]
fn parallel_or_fallback(_threads: Option<usize>) -> BackendSelection {
    cpu_fallback("crate built without the `parallel` feature".to_string())
}

pub(crate) fn cpu_fallback(reason: String) -> BackendSelection {
    log::warn!("parallel backend unavailable ({reason}); falling back to single-threaded CPU backend");
    BackendSelection {
        backend: Arc::new(CpuBackend::new()),
        requested: BackendKind::Parallel,
        fallback: Some(reason),
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_cpu() {
        let selection = select_backend(BackendKind::Cpu, None);
        assert_eq!(selection.backend.name(), "cpu");
        assert!(!selection.fell_back());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_select_parallel() {
        let selection = select_backend(BackendKind::Parallel, Some(2));
        assert_eq!(selection.requested, BackendKind::Parallel);
        assert_eq!(selection.backend.name(), "parallel");
        assert!(!selection.fell_back());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_fallback_is_disclosed() {
        // an unusable pool configuration must degrade to the CPU path
        let selection = cpu_fallback("test".to_string());
        assert_eq!(selection.backend.name(), "cpu");
        assert_eq!(selection.fallback.as_deref(), Some("test"));
    }

    #[cfg(not(feature = "parallel"))]
    #[test]
    fn test_parallel_without_feature_falls_back() {
        let selection = select_backend(BackendKind::Parallel, None);
        assert_eq!(selection.backend.name(), "cpu");
        assert!(selection.fell_back());
    }

    #[test]
    fn test_backend_kind_serde_names() {
        let kind: BackendKind = serde_json::from_str("\"parallel\"").unwrap();
        assert_eq!(kind, BackendKind::Parallel);
        assert_eq!(BackendKind::default(), BackendKind::Cpu);
    }
}
