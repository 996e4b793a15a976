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

use super::{CovarianceMatrix, Frame, Orbit, Spacecraft};
use crate::dynamics::PropagationContext;
use crate::errors::{ValidationError, ValidationResult};
use crate::time::Epoch;
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use typed_builder::TypedBuilder;

/// Composite snapshot of the spacecraft dynamics at an epoch: this is the initial state of every use case.
///
/// # Usage
/// The orbit, the spacecraft and the propagation context are required by the builder, the covariance is optional:
/// `OrbitalState::builder().orbit(tle.into()).spacecraft(sphere.into()).propagation_context(ctx).build()?`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc, build_method(into = ValidationResult<OrbitalState>))]
pub struct OrbitalState {
    pub orbit: Orbit,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub covariance: Option<CovarianceMatrix>,
    pub propagation_context: PropagationContext,
    pub spacecraft: Spacecraft,
}

validated_build!(OrbitalState);

impl OrbitalState {
    pub fn epoch(&self) -> Epoch {
        self.orbit.epoch()
    }

    /// Frame of the orbit, the covariance may be expressed in a local orbital frame.
    pub fn frame(&self) -> Frame {
        self.orbit.frame()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.orbit.validate()?;
        self.propagation_context.validate()?;
        self.spacecraft.validate()?;

        if let Some(model_date) = self.propagation_context.model_date {
            if model_date > self.epoch() {
                warn!(
                    "space weather model date {model_date} is after the orbit epoch {}",
                    self.epoch()
                );
            }
        }
        Ok(())
    }

    /// Returns a copy of this state with another orbit, e.g. the last estimate of an orbit determination.
    pub fn with_orbit(&self, orbit: Orbit) -> Result<Self, ValidationError> {
        let mut me = self.clone();
        me.orbit = orbit;
        me.validate()?;
        Ok(me)
    }
}

impl fmt::Display for OrbitalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.orbit {
            Orbit::Tle(tle) => writeln!(f, "TLE of {} at {}", tle.norad_id(), tle.epoch())?,
            Orbit::Keplerian(kep) => writeln!(f, "{kep}")?,
        }
        writeln!(f, "{}", self.spacecraft)?;
        if let Some(covar) = &self.covariance {
            writeln!(f, "{covar}")?;
        }
        write!(f, "{}", self.propagation_context)
    }
}
