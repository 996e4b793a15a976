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

/// Provides the placement and timing of the thrust arcs.
mod maneuver;
pub use maneuver::{
    ManeuverStrategy, ThrustArcInitialisationKind, ThrustArcNumber, ThrustArcPosition,
};

/// Provides the tolerance windows of low Earth orbit station keeping.
mod stationkeeping;
pub use stationkeeping::{ControlledElement, KeplerianTolerance, StationKeepingStrategy};

/// Provides the requests of ephemerides, events and orbit ephemeris messages.
pub mod requests;
pub use requests::{EphemeridesRequest, EphemerisKind, EventKind, EventsRequest, OemRequest};

/// Provides the results of the mission design use cases and their extractors.
pub mod results;
pub use results::{
    EventPredictionResults, ExtrapolationResults, ManeuverGenerationResults,
    StationKeepingResults, StationKeepingStatistics,
};

mod usecases;
pub use usecases::{
    EventPrediction, KeplerianTarget, LeoStationKeeping, ManeuverGeneration, OrbitExtrapolation,
};

pub mod prelude {
    pub use super::requests::*;
    pub use super::results::*;
    pub use super::{
        ControlledElement, EventPrediction, KeplerianTarget, KeplerianTolerance,
        LeoStationKeeping, ManeuverGeneration, ManeuverStrategy, OrbitExtrapolation,
        StationKeepingStrategy, ThrustArcInitialisationKind, ThrustArcNumber, ThrustArcPosition,
    };

    pub use crate::time::{Duration, Epoch, TimeUnits, Unit};
}
