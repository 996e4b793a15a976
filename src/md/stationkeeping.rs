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

use super::ManeuverStrategy;
use crate::errors::{ValidationError, ValidationResult};
use crate::io::{duration_from_seconds, duration_to_seconds};
use crate::time::Duration;
use crate::utils::check_positive;
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use typed_builder::TypedBuilder;

closed_set! {
    /// Orbital elements which station keeping may control.
    pub enum ControlledElement ("controlled element") {
        /// Semi-major axis, in km
        Sma => "SMA",
        /// Inclination, in degrees
        Inc => "INC",
        /// Eccentricity
        Ecc => "ECC",
    }
}

/// Keeps an orbital element within `target ± half_width`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeplerianTolerance {
    pub element: ControlledElement,
    pub target: f64,
    pub half_width: f64,
}

impl KeplerianTolerance {
    pub fn new(
        element: ControlledElement,
        target: f64,
        half_width: f64,
    ) -> Result<Self, ValidationError> {
        let me = Self {
            element,
            target,
            half_width,
        };
        me.validate()?;
        Ok(me)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_positive("half_width", self.half_width)?;
        match self.element {
            ControlledElement::Sma => check_positive("target SMA", self.target),
            ControlledElement::Inc if !(0.0..=180.0).contains(&self.target) => {
                Err(ValidationError::OutOfRange {
                    param: "target INC",
                    value: self.target,
                    range: "[0, 180]",
                })
            }
            ControlledElement::Ecc if !(0.0..1.0).contains(&self.target) => {
                Err(ValidationError::OutOfRange {
                    param: "target ECC",
                    value: self.target,
                    range: "[0, 1)",
                })
            }
            _ => Ok(()),
        }
    }

    /// Returns whether the value lies within the window, bounds included.
    pub fn contains(&self, value: f64) -> bool {
        (value - self.target).abs() <= self.half_width
    }
}

impl fmt::Display for KeplerianTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {} ± {}", self.element, self.target, self.half_width)
    }
}

/// Keeps a low Earth orbit within tolerance windows by planning maneuvers with the provided strategy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc, build_method(into = ValidationResult<StationKeepingStrategy>))]
pub struct StationKeepingStrategy {
    pub maneuver_strategy: ManeuverStrategy,
    pub control: Vec<KeplerianTolerance>,
    #[serde(
        rename = "max_duration_s",
        serialize_with = "duration_to_seconds",
        deserialize_with = "duration_from_seconds"
    )]
    pub max_duration: Duration,
    /// The station keeping stops if the altitude drops below this value
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub min_altitude_km: Option<f64>,
}

validated_build!(StationKeepingStrategy);

impl StationKeepingStrategy {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.maneuver_strategy.validate()?;
        if self.control.is_empty() {
            return Err(ValidationError::MissingParameter {
                param: "control",
                reason: "to keep at least one orbital element",
            });
        }
        let mut seen = BTreeSet::new();
        for tolerance in &self.control {
            tolerance.validate()?;
            if !seen.insert(tolerance.element) {
                return Err(ValidationError::Inconsistent {
                    reason: format!("{} is controlled more than once", tolerance.element),
                });
            }
        }
        check_positive("max_duration", self.max_duration.to_seconds())?;
        if let Some(altitude) = self.min_altitude_km {
            check_positive("min_altitude_km", altitude)?;
        }
        Ok(())
    }

    pub fn tolerance(&self, element: ControlledElement) -> Option<&KeplerianTolerance> {
        self.control.iter().find(|tol| tol.element == element)
    }
}

#[cfg(test)]
mod ut_stationkeeping {
    use super::*;
    use crate::md::{ThrustArcInitialisationKind, ThrustArcPosition};
    use crate::time::Unit;
    use rstest::*;

    #[fixture]
    fn strategy() -> ManeuverStrategy {
        ManeuverStrategy::builder()
            .arc_position(ThrustArcPosition::Anywhere)
            .initialisation(ThrustArcInitialisationKind::DutyCycle)
            .duty_cycle(0.3)
            .build()
            .unwrap()
    }

    #[rstest]
    fn windows(strategy: ManeuverStrategy) {
        let sma = KeplerianTolerance::new(ControlledElement::Sma, 6878.0, 0.5).unwrap();
        assert!(sma.contains(6878.5));
        assert!(!sma.contains(6877.0));

        let sk = StationKeepingStrategy::builder()
            .maneuver_strategy(strategy)
            .control(vec![sma])
            .max_duration(Unit::Day * 30.0)
            .min_altitude_km(350.0)
            .build()
            .unwrap();
        assert_eq!(sk.tolerance(ControlledElement::Sma), Some(&sma));
        assert!(sk.tolerance(ControlledElement::Inc).is_none());
    }

    #[rstest]
    fn invalid(strategy: ManeuverStrategy) {
        assert!(KeplerianTolerance::new(ControlledElement::Sma, 6878.0, 0.0).is_err());
        assert!(KeplerianTolerance::new(ControlledElement::Ecc, 1.2, 1e-4).is_err());
        assert!(KeplerianTolerance::new(ControlledElement::Inc, 181.0, 0.1).is_err());

        let no_control = StationKeepingStrategy::builder()
            .maneuver_strategy(strategy)
            .control(vec![])
            .max_duration(Unit::Day * 30.0)
            .build();
        assert!(matches!(
            no_control,
            Err(ValidationError::MissingParameter { param: "control", .. })
        ));

        let sma = KeplerianTolerance::new(ControlledElement::Sma, 6878.0, 0.5).unwrap();
        let twice = StationKeepingStrategy::builder()
            .maneuver_strategy(strategy)
            .control(vec![sma, sma])
            .max_duration(Unit::Day * 30.0)
            .build();
        assert!(matches!(twice, Err(ValidationError::Inconsistent { .. })));
    }
}
