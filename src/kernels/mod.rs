//! Coagulation kernels and their separable factorizations
//!
//! # Core Concepts
//!
//! - **Kernel** ([`Kernel`]): closed set of supported rate families
//! - **Factorization** ([`Factorization`]): U·V ≈ K on sizes 0..=N, plus the
//!   auxiliary vectors the boundary terms need
//! - **Low-rank strategy** ([`LowRankStrategy`]): numerical compression
//!   used when no exact form exists (ballistic)
//!
//! A factorization is computed once per (kernel, N, α) and shared,
//! read-only, by every step of a run.
//!
//! # Example
//!
//! ```rust
//! use coag_rs::kernels::Kernel;
//!
//! let factorization = Kernel::Additive { alpha: 1.0 }.factorize(100).unwrap();
//! assert_eq!(factorization.rank(), 2);
//! assert_eq!(factorization.size(), 100);
//! ```

pub mod factorization;
pub mod family;
pub mod lowrank;

pub use factorization::Factorization;
pub use family::{Kernel, KernelFamily};
pub use lowrank::{LowRankStrategy, TruncatedSvd, SVD_TOLERANCE};
