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

/*! # spacetower

Typed client for a remote Flight Dynamics System (FDS).

The heavy lifting (numerical propagation, unscented Kalman filtering, maneuver optimization, event detection)
is performed by the remote service. This crate builds validated configuration objects, submits them to one of
the service's use cases, blocks until the job reaches a terminal state, and reshapes the typed results into
flat tables ready to be plotted or exported.

```no_run
use spacetower::prelude::*;

let client = FdsClient::new(ClientConfig::from_env()?)?;
# let state: OrbitalState = unimplemented!();
let extrapolation = OrbitExtrapolation::builder()
    .initial_state(state)
    .duration(Unit::Day * 1.0)
    .ephemerides(EphemeridesRequest::keplerian(Unit::Minute * 10.0)?)
    .build()?;

let results = extrapolation.run(&client)?;
let table = results.keplerian_ephemerides()?;
println!("{} rows", table.row_count());
# Ok::<(), spacetower::FdsError>(())
```
*/

#[macro_use]
extern crate log;
extern crate hifitime;
extern crate nalgebra as na;

#[macro_use]
mod utils;

mod errors;
/// Functions which may fail return an error of this crate, never panic.
pub use self::errors::{FdsError, ValidationError};

/// Orbits, reference frames, spacecraft descriptions, covariances and the composite orbital state.
pub mod cosmic;

/// Physical and numerical configuration of the remote propagation.
pub mod dynamics;

/// Telemetry batches, orbit determination tuning and orbit determination results.
pub mod od;

/// Maneuver and station keeping strategies, output requests, and the mission design use cases.
pub mod md;

/// Remote invocation: credentials, transport and the use case protocol.
pub mod client;

/// Flat tables extracted from use case results.
pub mod results;

/// YAML configuration, mission templates, CCSDS pass-through parsing and serde helpers.
pub mod io;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
}

pub mod prelude {
    pub use crate::client::{ClientConfig, Credentials, FdsClient, Transport, UseCase};
    pub use crate::cosmic::{
        Battery, BoxSpacecraft, CovarianceMatrix, Frame, KeplerianElements, Orbit, OrbitalState,
        SolarArray, SolarArrayKind, Spacecraft, SphereSpacecraft, Thruster, TwoLineElement,
    };
    pub use crate::dynamics::{AtmosphericModel, IntegratorKind, Perturbation, PropagationContext};
    pub use crate::md::prelude::*;
    pub use crate::od::prelude::*;
    pub use crate::results::{Cell, ResultError, Table};
    pub use crate::time::{Duration, Epoch, TimeUnits, Unit};
    pub use crate::{FdsError, ValidationError};
}

pub use self::cosmic::{OrbitalState, Spacecraft};
