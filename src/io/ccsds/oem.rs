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

use crate::results::{Cell, Tabular};
use crate::time::Epoch;
use snafu::prelude::*;
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum OemError {
    #[snafu(display("could not read OEM file: {source}"))]
    OemIoError { source: std::io::Error },
    #[snafu(display("[line: {line}] state has {got} values, expected 7 or 10"))]
    StateWidth { line: usize, got: usize },
    #[snafu(display("[line: {line}] `{value}` is not a number"))]
    NotANumber { line: usize, value: String },
    #[snafu(display("[line: {line}] invalid epoch `{value}`: {message}"))]
    InvalidEpoch {
        line: usize,
        value: String,
        message: String,
    },
    #[snafu(display("[line: {line}] `{keyword}` has no value"))]
    MissingValue { line: usize, keyword: String },
}

/// A single state vector of an Orbit Ephemeris Message, accelerations are dropped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OemState {
    pub epoch: Epoch,
    pub x_km: f64,
    pub y_km: f64,
    pub z_km: f64,
    pub vx_km_s: f64,
    pub vy_km_s: f64,
    pub vz_km_s: f64,
}

impl Tabular for OemState {
    const COLUMNS: &'static [&'static str] = &["Date", "X", "Y", "Z", "VX", "VY", "VZ"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Date(self.epoch),
            Cell::Float(self.x_km),
            Cell::Float(self.y_km),
            Cell::Float(self.z_km),
            Cell::Float(self.vx_km_s),
            Cell::Float(self.vy_km_s),
            Cell::Float(self.vz_km_s),
        ]
    }
}

/// Contents of an Orbit Ephemeris Message, as output by the remote service.
///
/// Only the states are read. Covariance blocks and comments are skipped, and every segment is assumed to
/// describe the same object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Oem {
    pub object_name: Option<String>,
    pub ref_frame: Option<String>,
    pub time_system: Option<String>,
    pub states: Vec<OemState>,
}

fn keyword_value<'a>(line: &'a str, lno: usize) -> Result<&'a str, OemError> {
    let (keyword, value) = line.split_once('=').context(MissingValueSnafu {
        line: lno,
        keyword: line.trim(),
    })?;
    let value = value.trim();
    ensure!(
        !value.is_empty(),
        MissingValueSnafu {
            line: lno,
            keyword: keyword.trim(),
        }
    );
    Ok(value)
}

impl Oem {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, OemError> {
        let text = fs::read_to_string(path).context(OemIoSnafu)?;
        text.parse()
    }
}

impl FromStr for Oem {
    type Err = OemError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let ignored_tokens = ["CCSDS_OEM_VERS", "CREATION_DATE", "ORIGINATOR", "COMMENT"];

        let mut oem = Self::default();
        let mut in_data = false;
        let mut in_covariance = false;

        'lines: for (idx, raw) in text.lines().enumerate() {
            let lno = idx + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            for tok in &ignored_tokens {
                if line.starts_with(tok) {
                    continue 'lines;
                }
            }

            if line.starts_with("COVARIANCE_START") {
                in_covariance = true;
            } else if line.starts_with("COVARIANCE_STOP") {
                in_covariance = false;
            } else if in_covariance {
                continue;
            } else if line.starts_with("META_START") {
                in_data = false;
            } else if line.starts_with("META_STOP") {
                in_data = true;
            } else if line.starts_with("OBJECT_NAME") {
                let name = keyword_value(line, lno)?;
                debug!("[line: {lno}] Found object {name}");
                oem.object_name = Some(name.to_string());
            } else if line.starts_with("REF_FRAME") {
                oem.ref_frame = Some(keyword_value(line, lno)?.to_string());
            } else if line.starts_with("TIME_SYSTEM") {
                let time_system = keyword_value(line, lno)?;
                debug!("[line: {lno}] Found time system `{time_system}`");
                oem.time_system = Some(time_system.to_string());
            } else if in_data {
                let state = oem.parse_state(line, lno)?;
                oem.states.push(state);
            } else {
                trace!("[line: {lno}] ignored `{line}`");
            }
        }

        Ok(oem)
    }
}

impl Oem {
    fn parse_state(&self, line: &str, lno: usize) -> Result<OemState, OemError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        ensure!(
            parts.len() == 7 || parts.len() == 10,
            StateWidthSnafu {
                line: lno,
                got: parts.len().saturating_sub(1),
            }
        );

        let mut values = [0.0; 6];
        for (value, part) in values.iter_mut().zip(&parts[1..7]) {
            *value = part.parse::<f64>().ok().context(NotANumberSnafu {
                line: lno,
                value: *part,
            })?;
        }

        let time_system = self.time_system.as_deref().unwrap_or("UTC");
        let epoch_str = format!("{} {time_system}", parts[0]);
        let epoch = Epoch::from_str(&epoch_str).map_err(|e| OemError::InvalidEpoch {
            line: lno,
            value: epoch_str.clone(),
            message: e.to_string(),
        })?;

        Ok(OemState {
            epoch,
            x_km: values[0],
            y_km: values[1],
            z_km: values[2],
            vx_km_s: values[3],
            vy_km_s: values[4],
            vz_km_s: values[5],
        })
    }
}

/// Extracts the states of the Orbit Ephemeris Message text.
pub fn parse_states(text: &str) -> Result<Vec<OemState>, OemError> {
    Ok(text.parse::<Oem>()?.states)
}
