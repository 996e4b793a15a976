/*
    Spacetower, typed flight dynamics client
    Copyright (C) 2024 The Spacetower developers

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use crate::errors::{ValidationError, ValidationResult};
use crate::io::{
    duration_from_seconds, duration_to_seconds, maybe_epoch_from_str, maybe_epoch_to_str,
};
use crate::time::{Duration, Epoch, Unit};
use crate::utils::check_positive;
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use typed_builder::TypedBuilder;

closed_set! {
    /// Force models which may be enabled in the remote propagation, on top of the central body attraction.
    pub enum Perturbation ("perturbation") {
        /// Non spherical Earth gravity field, truncated at the context degree and order
        EarthPotential => "EARTH_POTENTIAL",
        /// Atmospheric drag, using the context atmospheric model
        Drag => "DRAG",
        /// Solar radiation pressure
        Srp => "SRP",
        ThirdBodySun => "THIRD_BODY_SUN",
        ThirdBodyMoon => "THIRD_BODY_MOON",
        SolidTides => "SOLID_TIDES",
        OceanTides => "OCEAN_TIDES",
        /// General relativity correction
        Relativity => "RELATIVITY",
    }
}

closed_set! {
    pub enum AtmosphericModel ("atmospheric model") {
        HarrisPriester => "HARRIS_PRIESTER",
        Nrlmsise00 => "NRLMSISE00",
        Jacchia70 => "JACCHIA_70",
        Dtm2000 => "DTM2000",
        Exponential => "EXPONENTIAL",
    }
}

closed_set! {
    pub enum IntegratorKind ("integrator") {
        /// Dormand Prince 8(5,3), adaptive step
        DormandPrince853 => "DORMAND_PRINCE_853",
        /// Dormand Prince 5(4), adaptive step
        DormandPrince54 => "DORMAND_PRINCE_54",
        /// Classical Runge Kutta 4, fixed step
        RungeKutta4 => "RUNGE_KUTTA_4",
        /// Adams Bashforth multistep
        AdamsBashforth => "ADAMS_BASHFORTH",
        /// Analytical two body propagation, fixed output step
        Keplerian => "KEPLERIAN",
    }
}

impl IntegratorKind {
    /// Fixed step integrators only use the minimum step.
    pub fn is_fixed_step(self) -> bool {
        matches!(self, Self::RungeKutta4 | Self::Keplerian)
    }
}

/// Numerical and physical configuration of the remote trajectory integration.
///
/// The defaults are those of the remote service: a 2x2 gravity field, Harris-Priester atmosphere with a solar flux
/// of 150 SFU, and a Dormand Prince 8(5,3) with steps between 10 ms and 5 minutes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc, build_method(into = ValidationResult<PropagationContext>))]
pub struct PropagationContext {
    #[builder(default_code = "BTreeSet::from([Perturbation::EarthPotential])")]
    pub perturbations: BTreeSet<Perturbation>,
    /// Solar radio flux at 10.7 cm, in solar flux units
    #[builder(default = 150.0)]
    pub solar_flux_sfu: f64,
    #[builder(default = 2)]
    pub earth_potential_degree: u16,
    #[builder(default = 2)]
    pub earth_potential_order: u16,
    #[builder(default = AtmosphericModel::HarrisPriester)]
    pub atmospheric_model: AtmosphericModel,
    #[builder(default = IntegratorKind::DormandPrince853)]
    pub integrator: IntegratorKind,
    #[builder(default_code = "0.01 * Unit::Second")]
    #[serde(
        serialize_with = "duration_to_seconds",
        deserialize_with = "duration_from_seconds"
    )]
    pub min_step: Duration,
    #[builder(default_code = "300.0 * Unit::Second")]
    #[serde(
        serialize_with = "duration_to_seconds",
        deserialize_with = "duration_from_seconds"
    )]
    pub max_step: Duration,
    /// Date of the space weather data, defaults to the initial epoch of the propagation
    #[builder(default, setter(strip_option))]
    #[serde(
        default,
        serialize_with = "maybe_epoch_to_str",
        deserialize_with = "maybe_epoch_from_str"
    )]
    pub model_date: Option<Epoch>,
}

validated_build!(PropagationContext);

impl PropagationContext {
    /// Builds a context with a fixed step integrator.
    pub fn with_fixed_step(
        integrator: IntegratorKind,
        step: Duration,
        perturbations: BTreeSet<Perturbation>,
    ) -> Result<Self, ValidationError> {
        if !integrator.is_fixed_step() {
            return Err(ValidationError::Inconsistent {
                reason: format!("{integrator} is an adaptive step integrator"),
            });
        }
        Self::builder()
            .integrator(integrator)
            .perturbations(perturbations)
            .min_step(step)
            .max_step(step)
            .build()
    }

    pub fn has(&self, perturbation: Perturbation) -> bool {
        self.perturbations.contains(&perturbation)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_positive("min_step", self.min_step.to_seconds())?;
        check_positive("max_step", self.max_step.to_seconds())?;
        if self.min_step > self.max_step {
            return Err(ValidationError::Inconsistent {
                reason: format!(
                    "minimum step ({}) is larger than the maximum step ({})",
                    self.min_step, self.max_step
                ),
            });
        }

        if self.has(Perturbation::EarthPotential) {
            if self.earth_potential_degree < 2 {
                return Err(ValidationError::OutOfRange {
                    param: "earth_potential_degree",
                    value: f64::from(self.earth_potential_degree),
                    range: "[2, +inf)",
                });
            }
            if self.earth_potential_order > self.earth_potential_degree {
                return Err(ValidationError::Inconsistent {
                    reason: format!(
                        "gravity field order ({}) exceeds its degree ({})",
                        self.earth_potential_order, self.earth_potential_degree
                    ),
                });
            }
        }

        if self.has(Perturbation::Drag) {
            check_positive("solar_flux_sfu", self.solar_flux_sfu)?;
        }

        if self.integrator.is_fixed_step() && self.min_step != self.max_step {
            warn!(
                "{} is a fixed step integrator: only the minimum step of {} will be used",
                self.integrator, self.min_step
            );
        }

        Ok(())
    }
}

impl fmt::Display for PropagationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let perturbations = self
            .perturbations
            .iter()
            .map(|p| p.wire_name())
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "{} (min_step: {}, max_step: {}) with [{perturbations}]",
            self.integrator, self.min_step, self.max_step
        )?;
        if self.has(Perturbation::EarthPotential) {
            write!(
                f,
                " {}x{}",
                self.earth_potential_degree, self.earth_potential_order
            )?;
        }
        if self.has(Perturbation::Drag) {
            write!(f, " {} @ {} SFU", self.atmospheric_model, self.solar_flux_sfu)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod ut_context {
    use super::*;
    use enum_iterator::all;

    #[test]
    fn defaults() {
        let ctx = PropagationContext::builder().build().unwrap();
        assert_eq!(ctx.integrator, IntegratorKind::DormandPrince853);
        assert_eq!(ctx.atmospheric_model, AtmosphericModel::HarrisPriester);
        assert_eq!(ctx.min_step, 0.01 * Unit::Second);
        assert_eq!(ctx.max_step, 300.0 * Unit::Second);
        assert!(ctx.has(Perturbation::EarthPotential));
        assert!(!ctx.has(Perturbation::Drag));
        println!("{ctx}");
    }

    #[test]
    fn steps() {
        let err = PropagationContext::builder()
            .min_step(10.0 * Unit::Second)
            .max_step(1.0 * Unit::Second)
            .build();
        assert!(matches!(err, Err(ValidationError::Inconsistent { .. })));

        let equal = PropagationContext::builder()
            .min_step(10.0 * Unit::Second)
            .max_step(10.0 * Unit::Second)
            .build();
        assert!(equal.is_ok());

        let negative = PropagationContext::builder()
            .min_step(-1.0 * Unit::Second)
            .build();
        assert!(matches!(
            negative,
            Err(ValidationError::OutOfRange { param: "min_step", .. })
        ));

        let fixed = PropagationContext::with_fixed_step(
            IntegratorKind::RungeKutta4,
            30.0 * Unit::Second,
            BTreeSet::from([Perturbation::EarthPotential, Perturbation::Drag]),
        )
        .unwrap();
        assert_eq!(fixed.min_step, fixed.max_step);

        assert!(PropagationContext::with_fixed_step(
            IntegratorKind::DormandPrince54,
            30.0 * Unit::Second,
            BTreeSet::new()
        )
        .is_err());
    }

    #[test]
    fn gravity_field() {
        let ok = PropagationContext::builder()
            .earth_potential_degree(8)
            .earth_potential_order(8)
            .build();
        assert!(ok.is_ok());

        let order_too_high = PropagationContext::builder()
            .earth_potential_degree(4)
            .earth_potential_order(8)
            .build();
        assert!(order_too_high.is_err());

        // Degree and order are ignored without the Earth potential
        let ignored = PropagationContext::builder()
            .perturbations(BTreeSet::from([Perturbation::Drag]))
            .earth_potential_degree(0)
            .earth_potential_order(8)
            .build();
        assert!(ignored.is_ok());
    }

    #[test]
    fn drag_needs_flux() {
        let no_flux = PropagationContext::builder()
            .perturbations(BTreeSet::from([Perturbation::Drag]))
            .solar_flux_sfu(0.0)
            .build();
        assert!(matches!(
            no_flux,
            Err(ValidationError::OutOfRange { param: "solar_flux_sfu", .. })
        ));
    }

    #[test]
    fn closed_sets() {
        for p in all::<Perturbation>() {
            assert_eq!(p.to_string().parse::<Perturbation>(), Ok(p));
        }
        for m in all::<AtmosphericModel>() {
            assert_eq!(m.wire_name().parse::<AtmosphericModel>(), Ok(m));
        }
        for i in all::<IntegratorKind>() {
            assert_eq!(i.wire_name().parse::<IntegratorKind>(), Ok(i));
        }

        for bogus in ["drag", "GRAVITY", "", "EARTH POTENTIAL"] {
            assert_eq!(
                bogus.parse::<Perturbation>(),
                Err(ValidationError::UnknownOption {
                    field: "perturbation",
                    value: bogus.trim().to_string()
                })
            );
        }
        assert!("MSIS".parse::<AtmosphericModel>().is_err());
        assert!("EULER".parse::<IntegratorKind>().is_err());
    }

    #[test]
    fn wire_format() {
        let ctx = PropagationContext::builder()
            .perturbations(BTreeSet::from([Perturbation::Drag, Perturbation::Srp]))
            .build()
            .unwrap();
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["perturbations"][0], "DRAG");
        assert_eq!(json["perturbations"][1], "SRP");
        assert!((json["min_step"].as_f64().unwrap() - 0.01).abs() < 1e-12);
        assert_eq!(json["integrator"], "DORMAND_PRINCE_853");
        assert!(json["model_date"].is_null());
    }
}
