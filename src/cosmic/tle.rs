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

use super::EARTH_GM;
use crate::errors::ValidationError;
use crate::time::{Epoch, Unit};
use serde_derive::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;

/// Length of each line of a two-line element set, checksum included.
const TLE_LINE_LEN: usize = 69;

/// A two-line element set, as published by the 18th Space Defense Squadron.
///
/// The lines are kept verbatim (they are what the remote service ingests), and the fields are decoded once
/// at construction so that an invalid TLE is rejected before anything is submitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "TleLines", try_from = "TleLines")]
pub struct TwoLineElement {
    line1: String,
    line2: String,
    norad_id: u32,
    epoch: Epoch,
    bstar: f64,
    inclination_deg: f64,
    raan_deg: f64,
    eccentricity: f64,
    aop_deg: f64,
    mean_anomaly_deg: f64,
    mean_motion_rev_per_day: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct TleLines {
    line1: String,
    line2: String,
}

impl From<TwoLineElement> for TleLines {
    fn from(tle: TwoLineElement) -> Self {
        Self {
            line1: tle.line1,
            line2: tle.line2,
        }
    }
}

impl TryFrom<TleLines> for TwoLineElement {
    type Error = ValidationError;

    fn try_from(lines: TleLines) -> Result<Self, Self::Error> {
        Self::new(&lines.line1, &lines.line2)
    }
}

impl TwoLineElement {
    /// Decodes a TLE from both of its lines, without verifying the checksums.
    ///
    /// Hand-edited TLEs often carry stale checksums, so those are only enforced by [`Self::new_strict`].
    pub fn new(line1: &str, line2: &str) -> Result<Self, ValidationError> {
        let line1 = check_line(line1, '1')?;
        let line2 = check_line(line2, '2')?;

        let norad_id = parse_field::<u32>(line1, 2..7, "satellite number")?;
        let norad_id2 = parse_field::<u32>(line2, 2..7, "satellite number")?;
        if norad_id != norad_id2 {
            return Err(ValidationError::InvalidTle {
                reason: format!("satellite numbers differ: {norad_id} on line 1, {norad_id2} on line 2"),
            });
        }

        let two_digit_year = parse_field::<i32>(line1, 18..20, "epoch year")?;
        let day_of_year = parse_field::<f64>(line1, 20..32, "epoch day")?;
        if !(1.0..367.0).contains(&day_of_year) {
            return Err(ValidationError::InvalidTle {
                reason: format!("epoch day {day_of_year} is not a day of the year"),
            });
        }
        // Sputnik was launched in 1957: two digit years below 57 are in the 21st century.
        let year = if two_digit_year < 57 {
            2000 + two_digit_year
        } else {
            1900 + two_digit_year
        };
        let epoch =
            Epoch::from_gregorian_utc_at_midnight(year, 1, 1) + Unit::Day * (day_of_year - 1.0);

        let bstar = parse_exponent_field(line1, 53..61, "B*")?;

        // Leading decimal point assumed
        let raw_ecc = field(line2, 26..33, "eccentricity")?.trim();
        let eccentricity = format!("0.{raw_ecc}")
            .parse::<f64>()
            .map_err(|_| ValidationError::InvalidTle {
                reason: format!("could not parse eccentricity from `{raw_ecc}`"),
            })?;

        let me = Self {
            line1: line1.to_string(),
            line2: line2.to_string(),
            norad_id,
            epoch,
            bstar,
            inclination_deg: parse_field(line2, 8..16, "inclination")?,
            raan_deg: parse_field(line2, 17..25, "right ascension of the ascending node")?,
            eccentricity,
            aop_deg: parse_field(line2, 34..42, "argument of perigee")?,
            mean_anomaly_deg: parse_field(line2, 43..51, "mean anomaly")?,
            mean_motion_rev_per_day: parse_field(line2, 52..63, "mean motion")?,
        };

        if me.mean_motion_rev_per_day <= 0.0 {
            return Err(ValidationError::InvalidTle {
                reason: format!("mean motion must be positive, got {}", me.mean_motion_rev_per_day),
            });
        }

        trace!("decoded TLE of {} at {}", me.norad_id, me.epoch);

        Ok(me)
    }

    /// Decodes a TLE and verifies the modulo 10 checksum of both lines.
    pub fn new_strict(line1: &str, line2: &str) -> Result<Self, ValidationError> {
        let me = Self::new(line1, line2)?;
        for line in [&me.line1, &me.line2] {
            let expected = checksum(line);
            let found = line
                .chars()
                .nth(TLE_LINE_LEN - 1)
                .and_then(|c| c.to_digit(10))
                .unwrap_or(u32::MAX);
            if expected != found {
                return Err(ValidationError::InvalidTle {
                    reason: format!("checksum of `{line}` is {expected}, not {found}"),
                });
            }
        }
        Ok(me)
    }

    pub fn line1(&self) -> &str {
        &self.line1
    }

    pub fn line2(&self) -> &str {
        &self.line2
    }

    pub fn norad_id(&self) -> u32 {
        self.norad_id
    }

    /// Epoch of the element set, in UTC.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Drag term, in inverse Earth radii.
    pub fn bstar(&self) -> f64 {
        self.bstar
    }

    pub fn inclination_deg(&self) -> f64 {
        self.inclination_deg
    }

    pub fn raan_deg(&self) -> f64 {
        self.raan_deg
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    pub fn aop_deg(&self) -> f64 {
        self.aop_deg
    }

    pub fn mean_anomaly_deg(&self) -> f64 {
        self.mean_anomaly_deg
    }

    pub fn mean_motion_rev_per_day(&self) -> f64 {
        self.mean_motion_rev_per_day
    }

    /// Semi-major axis from the Keplerian mean motion. This ignores the SGP4 un-Kozai correction.
    pub fn sma_km(&self) -> f64 {
        let n_rad_s = self.mean_motion_rev_per_day * TAU / 86_400.0;
        (EARTH_GM / n_rad_s.powi(2)).cbrt()
    }
}

impl fmt::Display for TwoLineElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.line1)?;
        write!(f, "{}", self.line2)
    }
}

/// Modulo 10 sum of the digits of the first 68 characters, where minus signs count as one.
fn checksum(line: &str) -> u32 {
    line.chars()
        .take(TLE_LINE_LEN - 1)
        .map(|c| match c {
            '-' => 1,
            c => c.to_digit(10).unwrap_or(0),
        })
        .sum::<u32>()
        % 10
}

/// Returns the first 69 characters of the line, which must at least be that long.
fn check_line(line: &str, number: char) -> Result<&str, ValidationError> {
    let line = line.trim_end();
    if !line.is_ascii() {
        return Err(ValidationError::InvalidTle {
            reason: format!("line {number} contains non ASCII characters"),
        });
    }
    let line = line.get(..TLE_LINE_LEN).ok_or_else(|| ValidationError::InvalidTle {
        reason: format!(
            "line {number} must be at least {TLE_LINE_LEN} characters long, got {}",
            line.len()
        ),
    })?;
    let mut chars = line.chars();
    if chars.next() != Some(number) || chars.next() != Some(' ') {
        return Err(ValidationError::InvalidTle {
            reason: format!("line {number} must start with `{number} `"),
        });
    }
    Ok(line)
}

fn field<'a>(
    line: &'a str,
    span: std::ops::Range<usize>,
    name: &'static str,
) -> Result<&'a str, ValidationError> {
    line.get(span).ok_or_else(|| ValidationError::InvalidTle {
        reason: format!("{name} is missing"),
    })
}

fn parse_field<T: std::str::FromStr>(
    line: &str,
    span: std::ops::Range<usize>,
    name: &'static str,
) -> Result<T, ValidationError> {
    let raw = field(line, span, name)?;
    raw.trim().parse::<T>().map_err(|_| ValidationError::InvalidTle {
        reason: format!("could not parse {name} from `{raw}`"),
    })
}

/// Parses the "assumed decimal point" notation, e.g. ` 39169-3` is 0.39169e-3.
fn parse_exponent_field(
    line: &str,
    span: std::ops::Range<usize>,
    name: &'static str,
) -> Result<f64, ValidationError> {
    let raw = field(line, span, name)?.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    let invalid = || ValidationError::InvalidTle {
        reason: format!("could not parse {name} from `{raw}`"),
    };
    let (sign, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let split = unsigned.rfind(['-', '+']).ok_or_else(invalid)?;
    let (mantissa, exponent) = unsigned.split_at(split);
    let mantissa = format!("0.{mantissa}").parse::<f64>().map_err(|_| invalid())?;
    let exponent = exponent.parse::<i32>().map_err(|_| invalid())?;
    Ok(sign * mantissa * 10_f64.powi(exponent))
}
