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

use super::GroundStation;
use crate::cosmic::Frame;
use crate::errors::ValidationError;
use crate::io::{epochs_from_str, epochs_to_str, parse_epoch};
use crate::results::{Cell, Table};
use crate::time::Epoch;
use crate::utils::check_positive;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

closed_set! {
    /// Kind of raw measurements in a telemetry batch, which fixes the width of each measurement.
    pub enum TelemetryKind ("telemetry kind") {
        /// GNSS receiver output: latitude (deg), longitude (deg), ground speed (m/s), altitude (m), geoid undulation (m)
        Nmea => "NMEA",
        /// Position (km) and velocity (km/s)
        Pv => "PV",
        /// Range (km) and range rate (km/s) from a ground station
        Radar => "RADAR",
        /// Right ascension and declination (deg) from a ground station
        Optical => "OPTICAL",
    }
}

impl TelemetryKind {
    /// Names of each component of a measurement of this kind.
    pub const fn channels(self) -> &'static [&'static str] {
        match self {
            Self::Nmea => &[
                "Latitude",
                "Longitude",
                "Ground speed",
                "Altitude",
                "Geoid undulation",
            ],
            Self::Pv => &["X", "Y", "Z", "VX", "VY", "VZ"],
            Self::Radar => &["Range", "Range rate"],
            Self::Optical => &["Right ascension", "Declination"],
        }
    }

    /// Number of components of a measurement of this kind.
    pub const fn width(self) -> usize {
        self.channels().len()
    }

    pub const fn requires_station(self) -> bool {
        matches!(self, Self::Radar | Self::Optical)
    }
}

/// A batch of timestamped raw measurements with the standard deviation of each channel.
///
/// The batch is validated on construction: there is one strictly increasing date per measurement, and every
/// measurement has the width of its kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    kind: TelemetryKind,
    #[serde(serialize_with = "epochs_to_str", deserialize_with = "epochs_from_str")]
    dates: Vec<Epoch>,
    measurements: Vec<Vec<f64>>,
    standard_deviations: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    frame: Option<Frame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ground_station: Option<GroundStation>,
}

impl Telemetry {
    pub fn new(
        kind: TelemetryKind,
        dates: Vec<Epoch>,
        measurements: Vec<Vec<f64>>,
        standard_deviations: Vec<f64>,
    ) -> Result<Self, ValidationError> {
        let me = Self {
            kind,
            dates,
            measurements,
            standard_deviations,
            frame: None,
            ground_station: None,
        };
        me.check_shape()?;
        debug!(
            "{kind} telemetry of {} measurements from {} to {}",
            me.len(),
            me.dates[0],
            me.dates[me.len() - 1]
        );
        Ok(me)
    }

    /// Same as `new` but with ISO 8601 dates, e.g. `2024-05-21T08:24:00Z`.
    pub fn from_iso_strings<S: AsRef<str>>(
        kind: TelemetryKind,
        dates: &[S],
        measurements: Vec<Vec<f64>>,
        standard_deviations: Vec<f64>,
    ) -> Result<Self, ValidationError> {
        let dates = dates
            .iter()
            .map(|date| parse_epoch(date.as_ref()))
            .collect::<Result<Vec<Epoch>, _>>()?;
        Self::new(kind, dates, measurements, standard_deviations)
    }

    /// Builds an NMEA batch from (latitude, longitude, ground speed, altitude, geoid undulation) rows.
    pub fn nmea<S: AsRef<str>>(
        dates: &[S],
        rows: &[[f64; 5]],
        standard_deviations: [f64; 5],
    ) -> Result<Self, ValidationError> {
        Self::from_iso_strings(
            TelemetryKind::Nmea,
            dates,
            rows.iter().map(|row| row.to_vec()).collect(),
            standard_deviations.to_vec(),
        )
    }

    /// Sets the station which acquired this batch.
    pub fn with_ground_station(mut self, station: GroundStation) -> Result<Self, ValidationError> {
        station.validate()?;
        self.ground_station = Some(station);
        Ok(self)
    }

    /// Sets the frame of position and velocity measurements, GCRF otherwise.
    pub fn with_frame(mut self, frame: Frame) -> Result<Self, ValidationError> {
        if frame.is_local() {
            return Err(ValidationError::Inconsistent {
                reason: format!("telemetry cannot be expressed in the local frame {frame}"),
            });
        }
        self.frame = Some(frame);
        Ok(self)
    }

    fn check_shape(&self) -> Result<(), ValidationError> {
        if self.measurements.is_empty() {
            return Err(ValidationError::MissingParameter {
                param: "measurements",
                reason: "to build a telemetry batch",
            });
        }
        if self.dates.len() != self.measurements.len() {
            return Err(ValidationError::LengthMismatch {
                what: "telemetry dates",
                expected: self.measurements.len(),
                got: self.dates.len(),
            });
        }
        for pair in self.dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(ValidationError::NonIncreasingDates {
                    prev: pair[0],
                    next: pair[1],
                });
            }
        }
        for row in &self.measurements {
            if row.len() != self.kind.width() {
                return Err(ValidationError::LengthMismatch {
                    what: "measurement components",
                    expected: self.kind.width(),
                    got: row.len(),
                });
            }
            if let Some(bad) = row.iter().find(|v| !v.is_finite()) {
                return Err(ValidationError::OutOfRange {
                    param: "measurement",
                    value: *bad,
                    range: "finite values",
                });
            }
        }
        if self.standard_deviations.len() != self.kind.width() {
            return Err(ValidationError::LengthMismatch {
                what: "standard deviations",
                expected: self.kind.width(),
                got: self.standard_deviations.len(),
            });
        }
        for std in &self.standard_deviations {
            check_positive("standard deviation", *std)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.check_shape()?;
        if self.kind.requires_station() && self.ground_station.is_none() {
            return Err(ValidationError::MissingParameter {
                param: "ground_station",
                reason: "for radar and optical telemetry",
            });
        }
        if let Some(frame) = self.frame {
            if self.kind != TelemetryKind::Pv {
                warn!("{frame} is ignored for {} telemetry", self.kind);
            }
        }
        Ok(())
    }

    pub fn kind(&self) -> TelemetryKind {
        self.kind
    }

    pub fn dates(&self) -> &[Epoch] {
        &self.dates
    }

    pub fn measurements(&self) -> &[Vec<f64>] {
        &self.measurements
    }

    pub fn standard_deviations(&self) -> &[f64] {
        &self.standard_deviations
    }

    pub fn ground_station(&self) -> Option<&GroundStation> {
        self.ground_station.as_ref()
    }

    pub fn frame(&self) -> Option<Frame> {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_epoch(&self) -> Option<Epoch> {
        self.dates.first().copied()
    }

    pub fn last_epoch(&self) -> Option<Epoch> {
        self.dates.last().copied()
    }

    /// Returns the raw batch as a table with a `Date` column followed by one column per channel.
    pub fn to_table(&self) -> Table {
        let mut columns = vec!["Date"];
        columns.extend_from_slice(self.kind.channels());
        let mut table = Table::new(columns);
        for (date, row) in self.dates.iter().zip(&self.measurements) {
            let mut cells = Vec::with_capacity(row.len() + 1);
            cells.push(Cell::Date(*date));
            cells.extend(row.iter().map(|v| Cell::Float(*v)));
            // Shape is checked on construction
            if let Err(e) = table.push_row(cells) {
                error!("{e}");
            }
        }
        table
    }
}

impl fmt::Display for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} measurements of {}", self.len(), self.kind)?;
        if let (Some(first), Some(last)) = (self.first_epoch(), self.last_epoch()) {
            write!(f, " from {first} to {last}")?;
        }
        if let Some(station) = &self.ground_station {
            write!(f, " by {}", station.name)?;
        }
        Ok(())
    }
}
