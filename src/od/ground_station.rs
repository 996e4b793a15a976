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

use crate::errors::ValidationError;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// GroundStation defines a tracking station on the surface of the Earth.
///
/// Stations are needed for radar and optical telemetry, and for station visibility events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundStation {
    pub name: String,
    /// in degrees
    pub latitude_deg: f64,
    /// in degrees, east positive
    pub longitude_deg: f64,
    /// in meters above the WGS-84 ellipsoid
    pub altitude_m: f64,
    /// in degrees
    #[serde(default = "GroundStation::default_elevation_mask")]
    pub elevation_mask_deg: f64,
}

impl GroundStation {
    fn default_elevation_mask() -> f64 {
        5.0
    }

    /// Initializes a station with the default elevation mask of 5 degrees.
    pub fn new(
        name: &str,
        latitude_deg: f64,
        longitude_deg: f64,
        altitude_m: f64,
    ) -> Result<Self, ValidationError> {
        let me = Self {
            name: name.to_string(),
            latitude_deg,
            longitude_deg,
            altitude_m,
            elevation_mask_deg: Self::default_elevation_mask(),
        };
        me.validate()?;
        Ok(me)
    }

    pub fn with_elevation_mask(mut self, elevation_mask_deg: f64) -> Result<Self, ValidationError> {
        self.elevation_mask_deg = elevation_mask_deg;
        self.validate()?;
        Ok(self)
    }

    pub fn toulouse() -> Self {
        Self {
            name: "Toulouse".to_string(),
            latitude_deg: 43.604_652,
            longitude_deg: 1.444_209,
            altitude_m: 146.0,
            elevation_mask_deg: Self::default_elevation_mask(),
        }
    }

    pub fn kiruna() -> Self {
        Self {
            name: "Kiruna".to_string(),
            latitude_deg: 67.857_128,
            longitude_deg: 20.964_325,
            altitude_m: 402.0,
            elevation_mask_deg: Self::default_elevation_mask(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingParameter {
                param: "name",
                reason: "to identify the station",
            });
        }
        if !(-90.0..=90.0).contains(&self.latitude_deg) {
            return Err(ValidationError::OutOfRange {
                param: "latitude_deg",
                value: self.latitude_deg,
                range: "[-90, 90]",
            });
        }
        if !(-180.0..=360.0).contains(&self.longitude_deg) {
            return Err(ValidationError::OutOfRange {
                param: "longitude_deg",
                value: self.longitude_deg,
                range: "[-180, 360]",
            });
        }
        if !(0.0..90.0).contains(&self.elevation_mask_deg) {
            return Err(ValidationError::OutOfRange {
                param: "elevation_mask_deg",
                value: self.elevation_mask_deg,
                range: "[0, 90)",
            });
        }
        Ok(())
    }
}

impl fmt::Display for GroundStation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (lat.: {:.4} deg    long.: {:.4} deg    alt.: {:.1} m) [elevation mask: {} deg]",
            self.name, self.latitude_deg, self.longitude_deg, self.altitude_m, self.elevation_mask_deg
        )
    }
}
