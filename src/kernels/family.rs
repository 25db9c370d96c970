//! Coagulation kernel families
//!
//! The kernel K(i, j) is the rate at which clusters of sizes i and j merge.
//! Three families are supported, each as a closed variant of [`Kernel`]:
//!
//! | Family      | K(i, j)                                         | Factorization          |
//! |-------------|-------------------------------------------------|------------------------|
//! | `constant`  | 1                                               | exact, rank 1          |
//! | `additive`  | (i/j)^α + (j/i)^α                               | exact, rank 2          |
//! | `ballistic` | (i^(1/3) + j^(1/3))² · (1/i + 1/j)^(1/2)        | truncated SVD          |
//!
//! `additive` is also accepted under its physical name `brownian`.
//!
//! K(0, ·) and K(·, 0) are zero by convention, and any non-finite
//! evaluation is mapped to zero.

use std::fmt;
use std::str::FromStr;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{CoagulationError, Result};
use crate::kernels::factorization::Factorization;
use crate::kernels::lowrank::TruncatedSvd;

// =================================================================================================
// Kernel family name
// =================================================================================================

/// Name of a kernel family, as found in a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelFamily {
    /// K = 1
    Constant,
    /// K = (i/j)^α + (j/i)^α
    #[serde(alias = "brownian")]
    Additive,
    /// K = (i^(1/3) + j^(1/3))² · (1/i + 1/j)^(1/2)
    Ballistic,
}

impl KernelFamily {
    /// Canonical lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            KernelFamily::Constant => "constant",
            KernelFamily::Additive => "additive",
            KernelFamily::Ballistic => "ballistic",
        }
    }
}

impl FromStr for KernelFamily {
    type Err = CoagulationError;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "constant" => Ok(KernelFamily::Constant),
            "additive" | "brownian" => Ok(KernelFamily::Additive),
            "ballistic" => Ok(KernelFamily::Ballistic),
            _ => Err(CoagulationError::UnsupportedKernel { name: name.to_string() }),
        }
    }
}

impl fmt::Display for KernelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =================================================================================================
// Kernel
// =================================================================================================

/// A coagulation kernel with its parameters bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kernel {
    /// Size-independent rate.
    Constant,
    /// Brownian-like kernel with exponent α.
    Additive {
        /// Exponent α ≥ 0
        alpha: f64,
    },
    /// Free-molecular (ballistic) kernel.
    Ballistic,
}

impl Kernel {
    /// Bind a family to its parameters. α is ignored by `constant` and `ballistic`.
    pub fn new(family: KernelFamily, alpha: f64) -> Result<Self> {
        match family {
            KernelFamily::Constant => Ok(Kernel::Constant),
            KernelFamily::Additive => {
                if !alpha.is_finite() || alpha < 0.0 {
                    return Err(CoagulationError::InvalidParameter {
                        name: "alpha",
                        value: alpha,
                        reason: "must be finite and >= 0",
                    });
                }
                Ok(Kernel::Additive { alpha })
            }
            KernelFamily::Ballistic => Ok(Kernel::Ballistic),
        }
    }

    /// Parse a family name and bind it to α.
    ///
    /// ```rust
    /// use coag_rs::kernels::Kernel;
    ///
    /// let kernel = Kernel::from_name("brownian", 0.5).unwrap();
    /// assert_eq!(kernel, Kernel::Additive { alpha: 0.5 });
    /// assert!(Kernel::from_name("gravitational", 0.5).is_err());
    /// ```
    pub fn from_name(name: &str, alpha: f64) -> Result<Self> {
        Self::new(name.parse()?, alpha)
    }

    /// Family of this kernel
    pub fn family(&self) -> KernelFamily {
        match self {
            Kernel::Constant => KernelFamily::Constant,
            Kernel::Additive { .. } => KernelFamily::Additive,
            Kernel::Ballistic => KernelFamily::Ballistic,
        }
    }

    /// Evaluate K(i, j).
    ///
    /// Returns zero when either size is zero or the formula is not finite.
    #[inline]
    pub fn evaluate(&self, i: usize, j: usize) -> f64 {
        if i == 0 || j == 0 {
            return 0.0;
        }
        let (x, y) = (i as f64, j as f64);
        let value = match self {
            Kernel::Constant => 1.0,
            Kernel::Additive { alpha } => (x / y).powf(*alpha) + (y / x).powf(*alpha),
            Kernel::Ballistic => {
                let radii = x.cbrt() + y.cbrt();
                radii * radii * (1.0 / x + 1.0 / y).sqrt()
            }
        };
        if value.is_finite() { value } else { 0.0 }
    }

    /// Dense (N + 1) × (N + 1) kernel matrix with row and column 0 zeroed.
    pub fn matrix(&self, size: usize) -> DMatrix<f64> {
        DMatrix::from_fn(size + 1, size + 1, |i, j| self.evaluate(i, j))
    }

    /// Build the low-rank factorization of this kernel for truncation size N.
    ///
    /// `constant` and `additive` are factorized exactly, `ballistic` through
    /// a truncated SVD with the default cut-off.
    pub fn factorize(&self, size: usize) -> Result<Factorization> {
        if size < 2 {
            return Err(CoagulationError::InvalidSize { size });
        }
        match self {
            Kernel::Constant => Ok(Factorization::constant(size)),
            Kernel::Additive { alpha } => Ok(Factorization::additive(size, *alpha)),
            Kernel::Ballistic => Factorization::approximate(self, size, &TruncatedSvd::default()),
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kernel::Additive { alpha } => write!(f, "additive(alpha={alpha})"),
            other => f.write_str(other.family().name()),
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_family_names() {
        assert_eq!("constant".parse::<KernelFamily>().unwrap(), KernelFamily::Constant);
        assert_eq!("Brownian".parse::<KernelFamily>().unwrap(), KernelFamily::Additive);
        assert_eq!(" additive ".parse::<KernelFamily>().unwrap(), KernelFamily::Additive);
        assert_eq!("ballistic".parse::<KernelFamily>().unwrap(), KernelFamily::Ballistic);
    }

    #[test]
    fn test_parse_unknown_family() {
        let err = "product".parse::<KernelFamily>().unwrap_err();
        assert_eq!(err, CoagulationError::UnsupportedKernel { name: "product".to_string() });
    }

    #[test]
    fn test_negative_alpha_rejected() {
        assert!(Kernel::new(KernelFamily::Additive, -0.1).is_err());
        assert!(Kernel::new(KernelFamily::Additive, f64::NAN).is_err());
        // alpha does not matter for the other families
        assert_eq!(Kernel::new(KernelFamily::Constant, f64::NAN).unwrap(), Kernel::Constant);
    }

    #[test]
    fn test_zero_index_is_zero() {
        for kernel in [Kernel::Constant, Kernel::Additive { alpha: 0.7 }, Kernel::Ballistic] {
            assert_eq!(kernel.evaluate(0, 3), 0.0);
            assert_eq!(kernel.evaluate(3, 0), 0.0);
            assert_eq!(kernel.evaluate(0, 0), 0.0);
        }
    }

    #[test]
    fn test_kernel_values() {
        assert_eq!(Kernel::Constant.evaluate(4, 9), 1.0);

        let additive = Kernel::Additive { alpha: 1.0 };
        assert_relative_eq!(additive.evaluate(2, 4), 0.5 + 2.0);
        assert_relative_eq!(Kernel::Additive { alpha: 0.0 }.evaluate(5, 7), 2.0);

        // (1 + 1)^2 * sqrt(2)
        assert_relative_eq!(Kernel::Ballistic.evaluate(1, 1), 4.0 * 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_kernels_are_symmetric() {
        for kernel in [Kernel::Constant, Kernel::Additive { alpha: 0.3 }, Kernel::Ballistic] {
            for i in 1..8 {
                for j in 1..8 {
                    assert_relative_eq!(kernel.evaluate(i, j), kernel.evaluate(j, i), epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_matrix_shape() {
        let m = Kernel::Ballistic.matrix(6);
        assert_eq!(m.shape(), (7, 7));
        assert!(m.row(0).iter().all(|&v| v == 0.0));
        assert!(m.column(0).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_factorize_rejects_small_size() {
        assert!(Kernel::Constant.factorize(1).is_err());
    }
}
