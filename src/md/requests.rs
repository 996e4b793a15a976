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

use crate::cosmic::Frame;
use crate::errors::ValidationError;
use crate::io::{
    duration_from_seconds, duration_to_seconds, maybe_duration_from_seconds,
    maybe_duration_to_seconds,
};
use crate::od::GroundStation;
use crate::time::Duration;
use crate::utils::check_positive;
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeSet;

closed_set! {
    /// Channels of ephemerides which the remote propagation may output.
    pub enum EphemerisKind ("ephemeris kind") {
        /// Position and velocity
        Cartesian => "CARTESIAN",
        /// Osculating Keplerian elements
        Keplerian => "KEPLERIAN",
        /// Battery charge and power balance, requires the attitude and power system simulation
        PowerSystem => "POWER_SYSTEM",
        /// Propellant mass and thrust state
        Propulsion => "PROPULSION",
        /// Attitude quaternion and mode, requires the attitude and power system simulation
        Attitude => "ATTITUDE",
    }
}

impl EphemerisKind {
    pub fn requires_attitude_and_power_simulation(self) -> bool {
        matches!(self, Self::PowerSystem | Self::Attitude)
    }
}

/// Requests ephemerides at a fixed step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EphemeridesRequest {
    pub kinds: BTreeSet<EphemerisKind>,
    #[serde(
        rename = "step_s",
        serialize_with = "duration_to_seconds",
        deserialize_with = "duration_from_seconds"
    )]
    pub step: Duration,
}

impl EphemeridesRequest {
    pub fn new(kinds: BTreeSet<EphemerisKind>, step: Duration) -> Result<Self, ValidationError> {
        let me = Self { kinds, step };
        me.validate()?;
        Ok(me)
    }

    /// Requests Keplerian ephemerides only.
    pub fn keplerian(step: Duration) -> Result<Self, ValidationError> {
        Self::new(BTreeSet::from([EphemerisKind::Keplerian]), step)
    }

    /// Requests Cartesian ephemerides only.
    pub fn cartesian(step: Duration) -> Result<Self, ValidationError> {
        Self::new(BTreeSet::from([EphemerisKind::Cartesian]), step)
    }

    pub fn with(mut self, kind: EphemerisKind) -> Self {
        self.kinds.insert(kind);
        self
    }

    pub fn has(&self, kind: EphemerisKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.kinds.is_empty() {
            return Err(ValidationError::MissingParameter {
                param: "kinds",
                reason: "to request ephemerides",
            });
        }
        check_positive("step", self.step.to_seconds())
    }

    /// Ensures that no requested channel needs the attitude and power system simulation unless it runs.
    pub fn check_simulation(&self, simulated: bool) -> Result<(), ValidationError> {
        if simulated {
            return Ok(());
        }
        match self
            .kinds
            .iter()
            .find(|kind| kind.requires_attitude_and_power_simulation())
        {
            Some(kind) => Err(ValidationError::Inconsistent {
                reason: format!("{kind} ephemerides require simulate_attitude_and_power_system"),
            }),
            None => Ok(()),
        }
    }

    /// Number of ephemeris rows over the duration, both ends included: `floor(duration / step) + 1`.
    pub fn expected_rows(&self, duration: Duration) -> usize {
        let seconds = duration.to_seconds();
        if seconds < 0.0 {
            return 0;
        }
        // Tolerates the rounding of durations which are a multiple of the step
        (seconds / self.step.to_seconds() + 1e-9).floor() as usize + 1
    }
}

closed_set! {
    /// Events which the remote service may detect.
    pub enum EventKind ("event kind") {
        /// Umbra and penumbra entries and exits
        Eclipse => "ECLIPSE",
        NodeCrossing => "NODE_CROSSING",
        ApsideCrossing => "APSIDE_CROSSING",
        /// Start and end of the visibility of each requested station
        StationVisibility => "STATION_VISIBILITY",
        /// Start and end of each thrust arc
        Thrust => "THRUST",
    }
}

/// Requests the detection of events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventsRequest {
    pub kinds: BTreeSet<EventKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stations: Vec<GroundStation>,
}

impl EventsRequest {
    pub fn new(kinds: BTreeSet<EventKind>) -> Result<Self, ValidationError> {
        let me = Self {
            kinds,
            stations: Vec::new(),
        };
        me.validate()?;
        Ok(me)
    }

    /// Requests the visibility events of the provided stations.
    pub fn station_visibility(stations: Vec<GroundStation>) -> Result<Self, ValidationError> {
        let me = Self {
            kinds: BTreeSet::from([EventKind::StationVisibility]),
            stations,
        };
        me.validate()?;
        Ok(me)
    }

    pub fn with_station(mut self, station: GroundStation) -> Result<Self, ValidationError> {
        station.validate()?;
        self.stations.push(station);
        Ok(self)
    }

    pub fn has(&self, kind: EventKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.kinds.is_empty() {
            return Err(ValidationError::MissingParameter {
                param: "kinds",
                reason: "to request events",
            });
        }
        if self.has(EventKind::StationVisibility) && self.stations.is_empty() {
            return Err(ValidationError::MissingParameter {
                param: "stations",
                reason: "for station visibility events",
            });
        }
        for station in &self.stations {
            station.validate()?;
        }
        if !self.stations.is_empty() && !self.has(EventKind::StationVisibility) {
            warn!("stations are ignored without station visibility events");
        }
        Ok(())
    }
}

/// Requests a CCSDS Orbit Ephemeris Message of the trajectory.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OemRequest {
    pub frame: Frame,
    #[serde(default)]
    pub write_covariance: bool,
    /// Step of the states of the message, that of the propagation if unset
    #[serde(
        rename = "step_s",
        default,
        serialize_with = "maybe_duration_to_seconds",
        deserialize_with = "maybe_duration_from_seconds"
    )]
    pub step: Option<Duration>,
}

impl OemRequest {
    pub fn new(frame: Frame) -> Result<Self, ValidationError> {
        let me = Self {
            frame,
            write_covariance: false,
            step: None,
        };
        me.validate()?;
        Ok(me)
    }

    pub fn with_step(mut self, step: Duration) -> Result<Self, ValidationError> {
        self.step = Some(step);
        self.validate()?;
        Ok(self)
    }

    pub fn with_covariance(mut self) -> Self {
        self.write_covariance = true;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.frame.is_local() {
            return Err(ValidationError::Inconsistent {
                reason: format!("an OEM cannot be written in the local frame {}", self.frame),
            });
        }
        if let Some(step) = self.step {
            check_positive("step", step.to_seconds())?;
        }
        Ok(())
    }
}
