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
use crate::io::{maybe_duration_from_seconds, maybe_duration_to_seconds};
use crate::time::Duration;
use crate::utils::{check_fraction, check_positive};
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use typed_builder::TypedBuilder;

closed_set! {
    /// Where the thrust arcs are centered on the orbit.
    pub enum ThrustArcPosition ("thrust arc position") {
        AscendingNode => "ASCENDING_NODE",
        DescendingNode => "DESCENDING_NODE",
        AscendingAndDescendingNodes => "ASCENDING_AND_DESCENDING_NODES",
        Apogee => "APOGEE",
        Perigee => "PERIGEE",
        ApogeeAndPerigee => "APOGEE_AND_PERIGEE",
        /// Thrust arcs are placed by the optimizer
        Anywhere => "ANYWHERE",
    }
}

impl ThrustArcPosition {
    /// Positions which define two locations per orbit, and may therefore host two thrust arcs.
    pub fn is_paired(self) -> bool {
        matches!(
            self,
            Self::AscendingAndDescendingNodes | Self::ApogeeAndPerigee
        )
    }
}

closed_set! {
    /// Number of thrust arcs per thrusting orbit.
    pub enum ThrustArcNumber ("thrust arc number") {
        One => "ONE",
        Two => "TWO",
    }
}

impl ThrustArcNumber {
    pub fn count(self) -> u32 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

closed_set! {
    /// How the length of each thrust arc is specified.
    pub enum ThrustArcInitialisationKind ("thrust arc initialisation kind") {
        /// Fraction of the orbital period
        DutyCycle => "DUTY_CYCLE",
        /// Fixed duration
        ArcDuration => "ARC_DURATION",
        /// Duty cycle, capped by the duration
        Both => "BOTH",
    }
}

impl ThrustArcInitialisationKind {
    pub fn uses_duty_cycle(self) -> bool {
        matches!(self, Self::DutyCycle | Self::Both)
    }

    pub fn uses_arc_duration(self) -> bool {
        matches!(self, Self::ArcDuration | Self::Both)
    }
}

/// Placement and timing of the thrust arcs.
///
/// The spacecraft thrusts during `thrust_orbits` orbits, then rests during `rest_orbits` orbits, and so on. The
/// first thrusting orbit is delayed by `shift_orbits` orbits.
///
/// # Example
/// ```
/// use spacetower::md::{ManeuverStrategy, ThrustArcInitialisationKind, ThrustArcNumber, ThrustArcPosition};
///
/// let strategy = ManeuverStrategy::builder()
///     .arc_position(ThrustArcPosition::AscendingAndDescendingNodes)
///     .arc_number(ThrustArcNumber::Two)
///     .initialisation(ThrustArcInitialisationKind::DutyCycle)
///     .duty_cycle(0.2)
///     .thrust_orbits(3)
///     .rest_orbits(1)
///     .build()
///     .unwrap();
/// assert_eq!(strategy.arcs_per_cycle().unwrap(), 6);
///
/// // A duty cycle must be a fraction of the orbit
/// assert!(ManeuverStrategy::builder()
///     .arc_position(ThrustArcPosition::Apogee)
///     .initialisation(ThrustArcInitialisationKind::DutyCycle)
///     .duty_cycle(1.5)
///     .build()
///     .is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc, build_method(into = ValidationResult<ManeuverStrategy>))]
pub struct ManeuverStrategy {
    pub arc_position: ThrustArcPosition,
    #[builder(default = ThrustArcNumber::One)]
    pub arc_number: ThrustArcNumber,
    pub initialisation: ThrustArcInitialisationKind,
    #[builder(default = 1)]
    pub thrust_orbits: u32,
    #[builder(default = 0)]
    pub rest_orbits: u32,
    #[builder(default = 0)]
    pub shift_orbits: u32,
    /// Fraction of the orbit spent thrusting, in (0, 1)
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub duty_cycle: Option<f64>,
    #[builder(default, setter(strip_option))]
    #[serde(
        rename = "arc_duration_s",
        default,
        serialize_with = "maybe_duration_to_seconds",
        deserialize_with = "maybe_duration_from_seconds"
    )]
    pub arc_duration: Option<Duration>,
    /// Interrupt the thrust arcs during eclipses
    #[builder(default = false)]
    #[serde(default)]
    pub stops_at_eclipse: bool,
}

validated_build!(ManeuverStrategy);

impl ManeuverStrategy {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.thrust_orbits == 0 {
            return Err(ValidationError::OutOfRange {
                param: "thrust_orbits",
                value: 0.0,
                range: "[1, +inf)",
            });
        }

        self.arcs_per_cycle()?;
        self.cycle_orbits()?;

        if self.arc_number == ThrustArcNumber::Two && !self.arc_position.is_paired() {
            return Err(ValidationError::Inconsistent {
                reason: format!(
                    "two thrust arcs per orbit need two positions, but {} is a single position",
                    self.arc_position
                ),
            });
        }

        match self.duty_cycle {
            Some(duty_cycle) => check_fraction("duty_cycle", duty_cycle)?,
            None if self.initialisation.uses_duty_cycle() => {
                return Err(ValidationError::MissingParameter {
                    param: "duty_cycle",
                    reason: "by the DUTY_CYCLE and BOTH initialisations",
                })
            }
            None => {}
        }

        match self.arc_duration {
            Some(duration) => check_positive("arc_duration", duration.to_seconds())?,
            None if self.initialisation.uses_arc_duration() => {
                return Err(ValidationError::MissingParameter {
                    param: "arc_duration",
                    reason: "by the ARC_DURATION and BOTH initialisations",
                })
            }
            None => {}
        }

        if self.duty_cycle.is_some() && !self.initialisation.uses_duty_cycle() {
            warn!("duty cycle is ignored with the {} initialisation", self.initialisation);
        }
        if self.arc_duration.is_some() && !self.initialisation.uses_arc_duration() {
            warn!("arc duration is ignored with the {} initialisation", self.initialisation);
        }
        if let (Some(duty_cycle), Some(arc_duration)) = (self.duty_cycle, self.arc_duration) {
            debug!("thrust arcs of {duty_cycle} orbit capped at {arc_duration}");
        }

        Ok(())
    }

    /// Number of thrust arcs per thrust and rest cycle.
    pub fn arcs_per_cycle(&self) -> Result<u32, ValidationError> {
        self.thrust_orbits
            .checked_mul(self.arc_number.count())
            .ok_or(ValidationError::OutOfRange {
                param: "thrust_orbits",
                value: f64::from(self.thrust_orbits),
                range: "arcs per cycle within u32",
            })
    }

    /// Number of orbits of a thrust and rest cycle.
    pub fn cycle_orbits(&self) -> Result<u32, ValidationError> {
        self.thrust_orbits
            .checked_add(self.rest_orbits)
            .ok_or(ValidationError::OutOfRange {
                param: "rest_orbits",
                value: f64::from(self.rest_orbits),
                range: "orbits per cycle within u32",
            })
    }
}

impl fmt::Display for ManeuverStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} arc(s) at {} by {}",
            self.arc_number.count(),
            self.arc_position,
            self.initialisation
        )?;
        if let Some(duty_cycle) = self.duty_cycle {
            write!(f, " (duty cycle: {duty_cycle})")?;
        }
        if let Some(duration) = self.arc_duration {
            write!(f, " (arc duration: {duration})")?;
        }
        write!(
            f,
            ", thrust {} orbit(s), rest {} orbit(s), shift {} orbit(s)",
            self.thrust_orbits, self.rest_orbits, self.shift_orbits
        )?;
        if self.stops_at_eclipse {
            write!(f, ", stops at eclipse")?;
        }
        Ok(())
    }
}
