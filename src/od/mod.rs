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

/// Provides the tracking stations of radar and optical telemetry.
mod ground_station;
pub use ground_station::GroundStation;

/// Provides the telemetry batches to be processed.
pub mod telemetry;
pub use telemetry::{Telemetry, TelemetryKind};

/// Provides the tuning of the remote filter and the selection of its outputs.
pub mod config;
pub use config::{
    EstimatedParameter, OrbitDeterminationConfig, OrbitDeterminationRequest, UkfParameters,
};

/// Provides the results of an orbit determination and their extractors.
pub mod results;
pub use results::OrbitDeterminationResults;

mod determination;
pub use determination::OrbitDetermination;

pub mod prelude {
    pub use super::config::*;
    pub use super::results::*;
    pub use super::telemetry::*;
    pub use super::{GroundStation, OrbitDetermination};

    pub use crate::time::{Duration, Epoch, TimeUnits, Unit};
}
