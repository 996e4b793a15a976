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
    EphemeridesRequest, EventKind, EventPredictionResults, EventsRequest,
    ExtrapolationResults, ManeuverGenerationResults, ManeuverStrategy, OemRequest,
    StationKeepingResults, StationKeepingStrategy,
};
use crate::client::{use_case_payload, ClientError, UseCase};
use crate::cosmic::{Orbit, OrbitalState};
use crate::errors::{ValidationError, ValidationResult};
use crate::io::duration_to_seconds;
use crate::time::Duration;
use crate::utils::check_positive;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use typed_builder::TypedBuilder;

/// Orbital elements to be reached by a maneuver generation, unset elements are left free.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KeplerianTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sma_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inc_deg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecc: Option<f64>,
}

impl KeplerianTarget {
    pub fn sma(sma_km: f64) -> Result<Self, ValidationError> {
        Self {
            sma_km: Some(sma_km),
            ..Default::default()
        }
        .checked()
    }

    pub fn inc(inc_deg: f64) -> Result<Self, ValidationError> {
        Self {
            inc_deg: Some(inc_deg),
            ..Default::default()
        }
        .checked()
    }

    pub fn with_ecc(self, ecc: f64) -> Result<Self, ValidationError> {
        Self {
            ecc: Some(ecc),
            ..self
        }
        .checked()
    }

    pub fn with_inc(self, inc_deg: f64) -> Result<Self, ValidationError> {
        Self {
            inc_deg: Some(inc_deg),
            ..self
        }
        .checked()
    }

    fn checked(self) -> Result<Self, ValidationError> {
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sma_km.is_none() && self.inc_deg.is_none() && self.ecc.is_none() {
            return Err(ValidationError::MissingParameter {
                param: "target",
                reason: "on at least one orbital element",
            });
        }
        if let Some(sma) = self.sma_km {
            check_positive("target SMA", sma)?;
        }
        if let Some(inc) = self.inc_deg {
            if !(0.0..=180.0).contains(&inc) {
                return Err(ValidationError::OutOfRange {
                    param: "target INC",
                    value: inc,
                    range: "[0, 180]",
                });
            }
        }
        if let Some(ecc) = self.ecc {
            if !(0.0..1.0).contains(&ecc) {
                return Err(ValidationError::OutOfRange {
                    param: "target ECC",
                    value: ecc,
                    range: "[0, 1)",
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for KeplerianTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(sma) = self.sma_km {
            parts.push(format!("SMA = {sma} km"));
        }
        if let Some(inc) = self.inc_deg {
            parts.push(format!("INC = {inc} deg"));
        }
        if let Some(ecc) = self.ecc {
            parts.push(format!("ECC = {ecc}"));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// Only spacecraft with a thruster may maneuver.
fn check_thruster(initial_state: &OrbitalState, use_case: &str) -> Result<(), ValidationError> {
    if initial_state.spacecraft.thruster().is_none() {
        return Err(ValidationError::Inconsistent {
            reason: format!("{use_case} requires a box spacecraft with a thruster"),
        });
    }
    Ok(())
}

#[derive(Serialize)]
struct OutputRequests<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    ephemerides: Option<&'a EphemeridesRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<&'a EventsRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    oem: Option<&'a OemRequest>,
}

impl<'a> OutputRequests<'a> {
    fn ephemerides(ephemerides: Option<&'a EphemeridesRequest>) -> Self {
        Self {
            ephemerides,
            events: None,
            oem: None,
        }
    }
}

/// Plans the thrust arcs which bring the spacecraft to the target orbit.
#[derive(Clone, Debug, PartialEq, Serialize, TypedBuilder)]
#[builder(doc, build_method(into = ValidationResult<ManeuverGeneration>))]
pub struct ManeuverGeneration {
    pub initial_state: OrbitalState,
    pub strategy: ManeuverStrategy,
    pub target: KeplerianTarget,
    #[builder(default, setter(strip_option))]
    pub ephemerides: Option<EphemeridesRequest>,
}

validated_build!(ManeuverGeneration);

#[derive(Serialize)]
struct ManeuverGenerationConfiguration<'a> {
    strategy: &'a ManeuverStrategy,
    target: &'a KeplerianTarget,
}

impl UseCase for ManeuverGeneration {
    const ENDPOINT: &'static str = "maneuver-generation";
    type Results = ManeuverGenerationResults;

    fn validate(&self) -> Result<(), ValidationError> {
        self.initial_state.validate()?;
        self.strategy.validate()?;
        self.target.validate()?;
        check_thruster(&self.initial_state, "a maneuver generation")?;
        if let Some(ephemerides) = &self.ephemerides {
            ephemerides.validate()?;
            // Only the orbit extrapolation simulates the attitude and power system
            ephemerides.check_simulation(false)?;
        }
        Ok(())
    }

    fn payload(&self) -> Result<Value, ClientError> {
        use_case_payload(
            &self.initial_state,
            &ManeuverGenerationConfiguration {
                strategy: &self.strategy,
                target: &self.target,
            },
            &OutputRequests::ephemerides(self.ephemerides.as_ref()),
        )
    }
}

/// Keeps a low Earth orbit within its tolerance windows.
#[derive(Clone, Debug, PartialEq, Serialize, TypedBuilder)]
#[builder(doc, build_method(into = ValidationResult<LeoStationKeeping>))]
pub struct LeoStationKeeping {
    pub initial_state: OrbitalState,
    pub strategy: StationKeepingStrategy,
    #[builder(default, setter(strip_option))]
    pub ephemerides: Option<EphemeridesRequest>,
}

validated_build!(LeoStationKeeping);

impl UseCase for LeoStationKeeping {
    const ENDPOINT: &'static str = "leo-station-keeping";
    type Results = StationKeepingResults;

    fn validate(&self) -> Result<(), ValidationError> {
        self.initial_state.validate()?;
        self.strategy.validate()?;
        check_thruster(&self.initial_state, "station keeping")?;
        if let Some(ephemerides) = &self.ephemerides {
            ephemerides.validate()?;
            // Only the orbit extrapolation simulates the attitude and power system
            ephemerides.check_simulation(false)?;
        }
        if let Some(min_altitude) = self.strategy.min_altitude_km {
            if let Orbit::Keplerian(kep) = &self.initial_state.orbit {
                if kep.periapsis_altitude_km() < min_altitude {
                    warn!(
                        "initial perigee altitude of {:.1} km is already below the minimum of {min_altitude} km",
                        kep.periapsis_altitude_km()
                    );
                }
            }
        }
        Ok(())
    }

    fn payload(&self) -> Result<Value, ClientError> {
        use_case_payload(
            &self.initial_state,
            &self.strategy,
            &OutputRequests::ephemerides(self.ephemerides.as_ref()),
        )
    }
}

/// Propagates the initial state over a duration and outputs the requested channels.
///
/// The power system and attitude ephemerides are only computed with `simulate_attitude_and_power_system`,
/// which itself needs a box spacecraft.
#[derive(Clone, Debug, PartialEq, Serialize, TypedBuilder)]
#[builder(doc, build_method(into = ValidationResult<OrbitExtrapolation>))]
pub struct OrbitExtrapolation {
    pub initial_state: OrbitalState,
    #[serde(rename = "duration_s", serialize_with = "duration_to_seconds")]
    pub duration: Duration,
    #[builder(default, setter(strip_option))]
    pub ephemerides: Option<EphemeridesRequest>,
    #[builder(default, setter(strip_option))]
    pub events: Option<EventsRequest>,
    #[builder(default, setter(strip_option))]
    pub oem: Option<OemRequest>,
    #[builder(default = false)]
    pub simulate_attitude_and_power_system: bool,
}

validated_build!(OrbitExtrapolation);

#[derive(Serialize)]
struct ExtrapolationConfiguration {
    #[serde(serialize_with = "duration_to_seconds")]
    duration_s: Duration,
    simulate_attitude_and_power_system: bool,
}

impl OrbitExtrapolation {
    /// Number of rows of each ephemerides channel, if ephemerides were requested.
    pub fn expected_rows(&self) -> Option<usize> {
        self.ephemerides
            .as_ref()
            .map(|ephem| ephem.expected_rows(self.duration))
    }
}

impl UseCase for OrbitExtrapolation {
    const ENDPOINT: &'static str = "orbit-extrapolation";
    type Results = ExtrapolationResults;

    fn validate(&self) -> Result<(), ValidationError> {
        self.initial_state.validate()?;
        check_positive("duration", self.duration.to_seconds())?;

        if self.ephemerides.is_none() && self.events.is_none() && self.oem.is_none() {
            return Err(ValidationError::MissingParameter {
                param: "ephemerides, events or oem",
                reason: "for an orbit extrapolation to output anything",
            });
        }

        if let Some(ephemerides) = &self.ephemerides {
            ephemerides.validate()?;
            ephemerides.check_simulation(self.simulate_attitude_and_power_system)?;
            if ephemerides.step > self.duration {
                warn!(
                    "ephemerides step of {} exceeds the duration of {}",
                    ephemerides.step, self.duration
                );
            }
        }

        if self.simulate_attitude_and_power_system && !self.initial_state.spacecraft.is_box() {
            return Err(ValidationError::Inconsistent {
                reason: "the attitude and power system simulation requires a box spacecraft"
                    .to_string(),
            });
        }

        if let Some(events) = &self.events {
            events.validate()?;
            if events.has(EventKind::Thrust) && self.initial_state.spacecraft.thruster().is_none() {
                warn!("thrust events requested for a spacecraft without thruster");
            }
        }

        if let Some(oem) = &self.oem {
            oem.validate()?;
            if oem.write_covariance && self.initial_state.covariance.is_none() {
                return Err(ValidationError::MissingParameter {
                    param: "covariance",
                    reason: "in the initial state to write it in the OEM",
                });
            }
        }
        Ok(())
    }

    fn payload(&self) -> Result<Value, ClientError> {
        use_case_payload(
            &self.initial_state,
            &ExtrapolationConfiguration {
                duration_s: self.duration,
                simulate_attitude_and_power_system: self.simulate_attitude_and_power_system,
            },
            &OutputRequests {
                ephemerides: self.ephemerides.as_ref(),
                events: self.events.as_ref(),
                oem: self.oem.as_ref(),
            },
        )
    }
}

/// Detects events over a duration without outputting the trajectory.
#[derive(Clone, Debug, PartialEq, Serialize, TypedBuilder)]
#[builder(doc, build_method(into = ValidationResult<EventPrediction>))]
pub struct EventPrediction {
    pub initial_state: OrbitalState,
    #[serde(rename = "duration_s", serialize_with = "duration_to_seconds")]
    pub duration: Duration,
    pub events: EventsRequest,
}

validated_build!(EventPrediction);

impl UseCase for EventPrediction {
    const ENDPOINT: &'static str = "event-prediction";
    type Results = EventPredictionResults;

    fn validate(&self) -> Result<(), ValidationError> {
        self.initial_state.validate()?;
        check_positive("duration", self.duration.to_seconds())?;
        self.events.validate()
    }

    fn payload(&self) -> Result<Value, ClientError> {
        use_case_payload(
            &self.initial_state,
            &ExtrapolationConfiguration {
                duration_s: self.duration,
                simulate_attitude_and_power_system: false,
            },
            &OutputRequests {
                ephemerides: None,
                events: Some(&self.events),
                oem: None,
            },
        )
    }
}
