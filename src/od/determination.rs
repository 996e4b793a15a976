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

use super::{
    EstimatedParameter, OrbitDeterminationConfig, OrbitDeterminationRequest,
    OrbitDeterminationResults, Telemetry,
};
use crate::client::{use_case_payload, ClientError, UseCase};
use crate::cosmic::OrbitalState;
use crate::dynamics::Perturbation;
use crate::errors::{ValidationError, ValidationResult};
use serde_derive::Serialize;
use serde_json::Value;
use typed_builder::TypedBuilder;

/// Estimates the orbit from a telemetry batch with the remote Unscented Kalman Filter.
#[derive(Clone, Debug, PartialEq, Serialize, TypedBuilder)]
#[builder(doc, build_method(into = ValidationResult<OrbitDetermination>))]
pub struct OrbitDetermination {
    pub initial_state: OrbitalState,
    pub telemetry: Telemetry,
    #[builder(default)]
    pub config: OrbitDeterminationConfig,
    #[builder(default)]
    pub request: OrbitDeterminationRequest,
}

validated_build!(OrbitDetermination);

#[derive(Serialize)]
struct Configuration<'a> {
    telemetry: &'a Telemetry,
    parameters: &'a OrbitDeterminationConfig,
}

impl UseCase for OrbitDetermination {
    const ENDPOINT: &'static str = "orbit-determination";
    type Results = OrbitDeterminationResults;

    fn validate(&self) -> Result<(), ValidationError> {
        self.initial_state.validate()?;
        self.telemetry.validate()?;
        self.config.validate()?;

        if self.initial_state.covariance.is_none() {
            return Err(ValidationError::MissingParameter {
                param: "covariance",
                reason: "in the initial state of an orbit determination",
            });
        }

        let context = &self.initial_state.propagation_context;
        if self.config.estimates(EstimatedParameter::Drag) && !context.has(Perturbation::Drag) {
            return Err(ValidationError::Inconsistent {
                reason: "the drag coefficient is estimated but drag is not modeled".to_string(),
            });
        }
        if self.config.estimates(EstimatedParameter::Srp) && !context.has(Perturbation::Srp) {
            return Err(ValidationError::Inconsistent {
                reason: "the reflectivity is estimated but the radiation pressure is not modeled"
                    .to_string(),
            });
        }
        if self.config.estimates(EstimatedParameter::ThrustBias)
            && self.initial_state.spacecraft.thruster().is_none()
        {
            return Err(ValidationError::Inconsistent {
                reason: "a thrust bias is estimated but the spacecraft has no thruster".to_string(),
            });
        }

        if let Some(first) = self.telemetry.first_epoch() {
            if first < self.initial_state.epoch() {
                warn!(
                    "telemetry starts at {first}, before the initial state at {}",
                    self.initial_state.epoch()
                );
            }
        }
        Ok(())
    }

    fn payload(&self) -> Result<Value, ClientError> {
        use_case_payload(
            &self.initial_state,
            &Configuration {
                telemetry: &self.telemetry,
                parameters: &self.config,
            },
            &self.request,
        )
    }
}
