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

use crate::cosmic::KeplerianElements;
use crate::io::ccsds::oem::parse_states;
use crate::io::{epoch_from_str, epoch_to_str};
use crate::results::{
    Cell, NotRequestedSnafu, OemSnafu, ResultError, Table, Tabular,
};
use crate::time::{Duration, Epoch, Unit};
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartesianEphemeris {
    #[serde(serialize_with = "epoch_to_str", deserialize_with = "epoch_from_str")]
    pub date: Epoch,
    pub x_km: f64,
    pub y_km: f64,
    pub z_km: f64,
    pub vx_km_s: f64,
    pub vy_km_s: f64,
    pub vz_km_s: f64,
}

impl Tabular for CartesianEphemeris {
    const COLUMNS: &'static [&'static str] = &["Date", "X", "Y", "Z", "VX", "VY", "VZ"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Date(self.date),
            Cell::Float(self.x_km),
            Cell::Float(self.y_km),
            Cell::Float(self.z_km),
            Cell::Float(self.vx_km_s),
            Cell::Float(self.vy_km_s),
            Cell::Float(self.vz_km_s),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerSystemEphemeris {
    #[serde(serialize_with = "epoch_to_str", deserialize_with = "epoch_from_str")]
    pub date: Epoch,
    pub battery_charge_wh: f64,
    pub solar_power_w: f64,
    pub consumed_power_w: f64,
    pub in_eclipse: bool,
}

impl Tabular for PowerSystemEphemeris {
    const COLUMNS: &'static [&'static str] = &[
        "Date",
        "Battery charge (Wh)",
        "Solar power (W)",
        "Consumed power (W)",
        "Eclipse",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Date(self.date),
            Cell::Float(self.battery_charge_wh),
            Cell::Float(self.solar_power_w),
            Cell::Float(self.consumed_power_w),
            Cell::Bool(self.in_eclipse),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropulsionEphemeris {
    #[serde(serialize_with = "epoch_to_str", deserialize_with = "epoch_from_str")]
    pub date: Epoch,
    pub propellant_mass_kg: f64,
    pub thrusting: bool,
    pub cumulated_delta_v_m_s: f64,
}

impl Tabular for PropulsionEphemeris {
    const COLUMNS: &'static [&'static str] = &[
        "Date",
        "Propellant mass (kg)",
        "Thrusting",
        "Cumulated Delta-V (m/s)",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Date(self.date),
            Cell::Float(self.propellant_mass_kg),
            Cell::Bool(self.thrusting),
            Cell::Float(self.cumulated_delta_v_m_s),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttitudeEphemeris {
    #[serde(serialize_with = "epoch_to_str", deserialize_with = "epoch_from_str")]
    pub date: Epoch,
    /// Scalar first quaternion from the inertial frame to the body frame
    pub quaternion: [f64; 4],
    pub mode: String,
}

impl Tabular for AttitudeEphemeris {
    const COLUMNS: &'static [&'static str] = &["Date", "Q0", "Q1", "Q2", "Q3", "Mode"];

    fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![Cell::Date(self.date)];
        cells.extend(self.quaternion.iter().map(|q| Cell::Float(*q)));
        cells.push(Cell::Text(self.mode.clone()));
        cells
    }
}

/// An event detected by the remote service, e.g. an eclipse entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(serialize_with = "epoch_to_str", deserialize_with = "epoch_from_str")]
    pub date: Epoch,
    pub event: String,
    #[serde(default)]
    pub details: String,
}

impl Tabular for Event {
    const COLUMNS: &'static [&'static str] = &["Date", "Event", "Details"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Date(self.date),
            Cell::Text(self.event.clone()),
            Cell::Text(self.details.clone()),
        ]
    }
}

/// Ephemerides channels, each present only if it was requested and computed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EphemeridesBundle {
    #[serde(default)]
    pub cartesian: Option<Vec<CartesianEphemeris>>,
    #[serde(default)]
    pub keplerian: Option<Vec<KeplerianElements>>,
    #[serde(default)]
    pub power_system: Option<Vec<PowerSystemEphemeris>>,
    #[serde(default)]
    pub propulsion: Option<Vec<PropulsionEphemeris>>,
    #[serde(default)]
    pub attitude: Option<Vec<AttitudeEphemeris>>,
}

fn channel<'a, R: Tabular + 'a>(
    rows: Option<&'a Vec<R>>,
    channel: &'static str,
) -> Result<Table, ResultError> {
    let rows = rows.context(NotRequestedSnafu { channel })?;
    Ok(Table::from_rows(rows))
}

impl EphemeridesBundle {
    pub fn cartesian(&self) -> Result<Table, ResultError> {
        channel(self.cartesian.as_ref(), "cartesian ephemerides")
    }

    pub fn keplerian(&self) -> Result<Table, ResultError> {
        channel(self.keplerian.as_ref(), "keplerian ephemerides")
    }

    pub fn power_system(&self) -> Result<Table, ResultError> {
        channel(self.power_system.as_ref(), "power system ephemerides")
    }

    pub fn propulsion(&self) -> Result<Table, ResultError> {
        channel(self.propulsion.as_ref(), "propulsion ephemerides")
    }

    pub fn attitude(&self) -> Result<Table, ResultError> {
        channel(self.attitude.as_ref(), "attitude ephemerides")
    }
}

/// Results of an orbit extrapolation.
///
/// Each output channel is independent: an absent channel is reported as `ResultError::NotRequested` while the
/// others are extracted normally.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtrapolationResults {
    #[serde(default)]
    pub ephemerides: Option<EphemeridesBundle>,
    #[serde(default)]
    pub events: Option<Vec<Event>>,
    /// CCSDS OEM text, passed through as is
    #[serde(default)]
    pub oem: Option<String>,
}

impl ExtrapolationResults {
    fn bundle(&self, channel: &'static str) -> Result<&EphemeridesBundle, ResultError> {
        self.ephemerides
            .as_ref()
            .context(NotRequestedSnafu { channel })
    }

    pub fn cartesian_ephemerides(&self) -> Result<Table, ResultError> {
        self.bundle("cartesian ephemerides")?.cartesian()
    }

    pub fn keplerian_ephemerides(&self) -> Result<Table, ResultError> {
        self.bundle("keplerian ephemerides")?.keplerian()
    }

    pub fn power_system_ephemerides(&self) -> Result<Table, ResultError> {
        self.bundle("power system ephemerides")?.power_system()
    }

    pub fn propulsion_ephemerides(&self) -> Result<Table, ResultError> {
        self.bundle("propulsion ephemerides")?.propulsion()
    }

    pub fn attitude_ephemerides(&self) -> Result<Table, ResultError> {
        self.bundle("attitude ephemerides")?.attitude()
    }

    pub fn events(&self) -> Result<Table, ResultError> {
        channel(self.events.as_ref(), "events")
    }

    /// The CCSDS Orbit Ephemeris Message, as produced by the remote service.
    pub fn oem(&self) -> Result<&str, ResultError> {
        self.oem
            .as_deref()
            .context(NotRequestedSnafu { channel: "OEM" })
    }

    /// The states of the Orbit Ephemeris Message as a table.
    pub fn oem_states(&self) -> Result<Table, ResultError> {
        let states = parse_states(self.oem()?).context(OemSnafu)?;
        Ok(Table::from_rows(&states))
    }
}

closed_set! {
    /// Actions of a maneuver roadmap.
    pub enum RoadmapAction ("roadmap action") {
        /// Thruster warm up before a thrust arc
        WarmUp => "WARM_UP",
        Thrust => "THRUST",
        /// Slew to the thrust attitude
        Slew => "SLEW",
        Standby => "STANDBY",
    }
}

/// One step of a maneuver roadmap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadmapEntry {
    #[serde(serialize_with = "epoch_to_str", deserialize_with = "epoch_from_str")]
    pub start: Epoch,
    #[serde(serialize_with = "epoch_to_str", deserialize_with = "epoch_from_str")]
    pub end: Epoch,
    pub action: RoadmapAction,
    #[serde(default)]
    pub delta_v_m_s: f64,
}

impl RoadmapEntry {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

impl Tabular for RoadmapEntry {
    const COLUMNS: &'static [&'static str] =
        &["Start", "End", "Action", "Duration (s)", "Delta-V (m/s)"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Date(self.start),
            Cell::Date(self.end),
            Cell::Text(self.action.to_string()),
            Cell::Float(self.duration().to_seconds()),
            Cell::Float(self.delta_v_m_s),
        ]
    }
}

fn total_delta_v(roadmap: &[RoadmapEntry]) -> f64 {
    roadmap.iter().map(|entry| entry.delta_v_m_s).sum()
}

fn thrusts(roadmap: &[RoadmapEntry]) -> impl Iterator<Item = &RoadmapEntry> {
    roadmap
        .iter()
        .filter(|entry| entry.action == RoadmapAction::Thrust)
}

/// Results of a maneuver generation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ManeuverGenerationResults {
    #[serde(default)]
    pub roadmap: Vec<RoadmapEntry>,
    #[serde(default)]
    pub ephemerides: Option<EphemeridesBundle>,
    /// Orbit reached at the end of the roadmap
    #[serde(default)]
    pub final_orbit: Option<KeplerianElements>,
}

impl ManeuverGenerationResults {
    pub fn roadmap(&self) -> Table {
        Table::from_rows(&self.roadmap)
    }

    /// Sum of the delta-v of the roadmap, in m/s.
    pub fn total_delta_v(&self) -> f64 {
        total_delta_v(&self.roadmap)
    }

    pub fn thrust_count(&self) -> usize {
        thrusts(&self.roadmap).count()
    }

    pub fn keplerian_ephemerides(&self) -> Result<Table, ResultError> {
        self.ephemerides
            .as_ref()
            .context(NotRequestedSnafu {
                channel: "keplerian ephemerides",
            })?
            .keplerian()
    }
}

/// Summary of a station keeping roadmap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StationKeepingStatistics {
    pub maneuver_count: usize,
    /// in m/s
    pub total_delta_v: f64,
    pub total_thrust_duration: Duration,
}

/// Results of a station keeping.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StationKeepingResults {
    #[serde(default)]
    pub roadmap: Vec<RoadmapEntry>,
    #[serde(default)]
    pub ephemerides: Option<EphemeridesBundle>,
}

impl StationKeepingResults {
    pub fn roadmap(&self) -> Table {
        Table::from_rows(&self.roadmap)
    }

    pub fn keplerian_ephemerides(&self) -> Result<Table, ResultError> {
        self.ephemerides
            .as_ref()
            .context(NotRequestedSnafu {
                channel: "keplerian ephemerides",
            })?
            .keplerian()
    }

    pub fn statistics(&self) -> StationKeepingStatistics {
        StationKeepingStatistics {
            maneuver_count: thrusts(&self.roadmap).count(),
            total_delta_v: total_delta_v(&self.roadmap),
            total_thrust_duration: thrusts(&self.roadmap)
                .fold(Unit::Second * 0.0, |acc, entry| acc + entry.duration()),
        }
    }
}

/// Results of an event prediction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPredictionResults {
    #[serde(default)]
    pub events: Option<Vec<Event>>,
}

impl EventPredictionResults {
    pub fn events(&self) -> Result<Table, ResultError> {
        channel(self.events.as_ref(), "events")
    }

    /// Number of events of the provided label, e.g. `ECLIPSE_ENTRY`.
    pub fn count(&self, event: &str) -> usize {
        self.events
            .iter()
            .flatten()
            .filter(|e| e.event == event)
            .count()
    }
}
