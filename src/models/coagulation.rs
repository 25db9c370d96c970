//! Smoluchowski coagulation right-hand side with monomer injection
//!
//! # Mathematical Background
//!
//! Writing G = K_nn(c), L = K_n(c), F_lb = K_ij_nn(c, lb) and
//! J = j_K_1j_n(c), the three supported boundary treatments are:
//!
//! ```text
//! SourceFree       f[1]  = λ/2 · F_1                       − (1+λ) · c[1] · L[1]
//!                  f[k]  = G[k] / 2                        − (1+λ) · c[k] · L[k]   (k ≥ 2)
//!
//! MonomerSource    f[1]  = −c[1]·L[1] + λ/2 · F_2 + λ · c[1] · J
//!                  f[k]  = G[k] / 2                        − (1+λ) · c[k] · L[k]   (k ≥ 2)
//!
//! ConstantSource   f[1]  = 1 − c[1] · L[1]
//!                  f[k]  = G[k] / 2                        − c[k] · L[k]           (k ≥ 2)
//! ```
//!
//! In the two injection models a fraction λ of every collision shatters
//! the colliding clusters back into monomers. Both conserve the total mass
//! Σ k·c(k) exactly, up to the mass that leaves through the truncation at N.
//! The constant-source model instead feeds one unit of monomers per unit
//! time and therefore gains mass linearly.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use coag_rs::backend::CpuBackend;
//! use coag_rs::kernels::Kernel;
//! use coag_rs::models::{CoagulationModel, IntegratorModel};
//! use coag_rs::physics::{ConcentrationState, PhysicalModel};
//! use coag_rs::rates::{build_rates, EvaluationStrategy};
//!
//! let rates = build_rates(
//!     &Kernel::Additive { alpha: 0.0 },
//!     20,
//!     EvaluationStrategy::Fast,
//!     Arc::new(CpuBackend::new()),
//! ).unwrap();
//! let model = CoagulationModel::new(IntegratorModel::MonomerSource, rates);
//!
//! let state = ConcentrationState::monomers(20).unwrap();
//! let update = model.compute_physics(&state, 0.0);
//! // two monomers merge at rate K(1,1) = 2
//! assert!((update[1] + 2.0).abs() < 1e-12);
//! assert!((update[2] - 1.0).abs() < 1e-12);
//! ```

use std::fmt;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::physics::{ConcentrationState, PhysicalModel};
use crate::rates::RateOperators;

// =================================================================================================
// Model variant
// =================================================================================================

/// Boundary treatment of the monomer equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorModel {
    /// Simpler boundary condition: every shattered pair is returned to
    /// the monomer class through the full mass flux.
    SourceFree,
    /// Monomers are excluded from the shattered mass flux and handled by a
    /// dedicated boundary term.
    #[default]
    MonomerSource,
    /// Unit constant monomer supply, no shattering (λ must be zero).
    ConstantSource,
}

impl IntegratorModel {
    /// Canonical snake_case name
    pub fn name(&self) -> &'static str {
        match self {
            IntegratorModel::SourceFree => "source_free",
            IntegratorModel::MonomerSource => "monomer_source",
            IntegratorModel::ConstantSource => "constant_source",
        }
    }

    /// Smallest cluster size entering the shattered mass flux.
    pub fn flux_lowbound(&self) -> usize {
        match self {
            IntegratorModel::SourceFree => 1,
            _ => 2,
        }
    }

    /// `true` if the model uses the injection rate λ
    pub fn uses_injection_rate(&self) -> bool {
        !matches!(self, IntegratorModel::ConstantSource)
    }
}

impl fmt::Display for IntegratorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =================================================================================================
// Coagulation model
// =================================================================================================

/// Coagulation right-hand side built on a set of rate operators.
pub struct CoagulationModel {
    variant: IntegratorModel,
    rates: Box<dyn RateOperators>,
}

impl CoagulationModel {
    /// Combine a boundary treatment with rate operators.
    pub fn new(variant: IntegratorModel, rates: Box<dyn RateOperators>) -> Self {
        Self { variant, rates }
    }

    /// Boundary treatment in use
    pub fn variant(&self) -> IntegratorModel {
        self.variant
    }

    /// Rate operators in use
    pub fn rates(&self) -> &dyn RateOperators {
        self.rates.as_ref()
    }

    /// Truncation size N
    pub fn size(&self) -> usize {
        self.rates.size()
    }

    /// Right-hand side f(c; λ) for a raw concentration vector of length N + 1.
    pub fn compute_update(&self, c: &DVector<f64>, lambda: f64) -> DVector<f64> {
        let len = c.len();
        let gain = self.rates.k_nn(c);
        let loss = self.rates.k_n(c);

        let depletion = match self.variant {
            IntegratorModel::ConstantSource => 1.0,
            _ => 1.0 + lambda,
        };

        let mut update = DVector::zeros(len);
        for k in 2..len {
            update[k] = 0.5 * gain[k] - depletion * c[k] * loss[k];
        }

        update[1] = match self.variant {
            IntegratorModel::SourceFree => {
                0.5 * lambda * self.rates.k_ij_nn(c, 1) - depletion * c[1] * loss[1]
            }
            IntegratorModel::MonomerSource => {
                -c[1] * loss[1]
                    + 0.5 * lambda * self.rates.k_ij_nn(c, 2)
                    + lambda * c[1] * self.rates.j_k_1j_n(c)
            }
            IntegratorModel::ConstantSource => 1.0 - c[1] * loss[1],
        };

        update
    }
}

impl fmt::Debug for CoagulationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoagulationModel")
            .field("variant", &self.variant)
            .field("rates", &self.rates.name())
            .field("size", &self.rates.size())
            .finish()
    }
}

impl PhysicalModel for CoagulationModel {
    fn points(&self) -> usize {
        self.rates.size() + 1
    }

    fn compute_physics(&self, state: &ConcentrationState, injection_rate: f64) -> DVector<f64> {
        self.compute_update(state.as_vector(), injection_rate)
    }

    fn name(&self) -> &str {
        self.variant.name()
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::Kernel;
    use crate::rates::DirectRates;
    use approx::assert_relative_eq;

    fn model(variant: IntegratorModel, kernel: Kernel, size: usize) -> CoagulationModel {
        CoagulationModel::new(variant, Box::new(DirectRates::new(&kernel, size).unwrap()))
    }

    fn spread(size: usize) -> DVector<f64> {
        DVector::from_fn(size + 1, |k, _| if k == 0 { 0.0 } else { 1.0 / (k * k) as f64 })
    }

    fn mass_rate(update: &DVector<f64>) -> f64 {
        update.iter().enumerate().map(|(k, u)| k as f64 * u).sum()
    }

    #[test]
    fn test_variant_names_and_bounds() {
        assert_eq!(IntegratorModel::default(), IntegratorModel::MonomerSource);
        assert_eq!(IntegratorModel::SourceFree.flux_lowbound(), 1);
        assert_eq!(IntegratorModel::MonomerSource.flux_lowbound(), 2);
        assert_eq!(IntegratorModel::ConstantSource.to_string(), "constant_source");
        assert!(!IntegratorModel::ConstantSource.uses_injection_rate());
    }

    #[test]
    fn test_index_zero_stays_zero() {
        for variant in [
            IntegratorModel::SourceFree,
            IntegratorModel::MonomerSource,
            IntegratorModel::ConstantSource,
        ] {
            let m = model(variant, Kernel::Ballistic, 8);
            assert_eq!(m.compute_update(&spread(8), 0.3)[0], 0.0);
        }
    }

    #[test]
    fn test_monomer_source_flux_excludes_monomers() {
        // with only monomers present the shattering terms vanish
        let m = model(IntegratorModel::MonomerSource, Kernel::Constant, 6);
        let mut c = DVector::zeros(7);
        c[1] = 1.0;

        let update = m.compute_update(&c, 0.7);
        assert_relative_eq!(update[1], -1.0);
        assert_relative_eq!(update[2], 0.5);
    }

    #[test]
    fn test_injection_models_conserve_mass_rate() {
        // large N so the truncation loss is negligible for a fast-decaying profile
        let size = 60;
        let c = DVector::from_fn(size + 1, |k, _| if k == 0 { 0.0 } else { (-(k as f64)).exp() });

        for variant in [IntegratorModel::SourceFree, IntegratorModel::MonomerSource] {
            let m = model(variant, Kernel::Additive { alpha: 0.5 }, size);
            for lambda in [0.0, 0.25, 1.0] {
                let rate = mass_rate(&m.compute_update(&c, lambda));
                assert!(rate.abs() < 1e-12, "{variant} with λ={lambda}: dM/dt = {rate}");
            }
        }
    }

    #[test]
    fn test_constant_source_boundary() {
        let m = model(IntegratorModel::ConstantSource, Kernel::Additive { alpha: 0.0 }, 10);
        let c = spread(10);
        let loss = m.rates().k_n(&c);

        let update = m.compute_update(&c, 0.0);
        assert_relative_eq!(update[1], 1.0 - c[1] * loss[1], epsilon = 1e-14);
    }

    #[test]
    fn test_physical_model_impl() {
        let m = model(IntegratorModel::SourceFree, Kernel::Constant, 5);
        assert_eq!(m.points(), 6);
        assert_eq!(PhysicalModel::name(&m), "source_free");

        let state = m.setup_initial_state().unwrap();
        let update = m.compute_physics(&state, 0.0);
        assert_relative_eq!(update[1], -1.0);
        assert_relative_eq!(update[2], 0.5);
    }
}
