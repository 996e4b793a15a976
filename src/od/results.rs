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
use crate::io::{epoch_from_str, epoch_to_str};
use crate::results::{Cell, EmptyResultSnafu, NotRequestedSnafu, ResultError, Table, Tabular};
use crate::time::Epoch;
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;

/// One estimate of the filter, the date is the epoch of the Keplerian elements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimatedState {
    pub keplerian_elements: KeplerianElements,
    /// Standard deviations of the Cartesian state (km and km/s), present when the covariance was requested
    #[serde(default)]
    pub covariance_sigmas: Option<[f64; 6]>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbitDeterminationReport {
    #[serde(default)]
    pub estimated_states: Vec<EstimatedState>,
}

/// Statistics of the postfit residuals of one measurement channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResidualStatistics {
    pub parameter: String,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub max: f64,
    pub min: f64,
}

impl Tabular for ResidualStatistics {
    const COLUMNS: &'static [&'static str] = &["Parameter", "Mean", "Median", "Std", "Max", "Min"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.parameter.clone()),
            Cell::Float(self.mean),
            Cell::Float(self.median),
            Cell::Float(self.std),
            Cell::Float(self.max),
            Cell::Float(self.min),
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbitDeterminationStatistics {
    #[serde(default)]
    pub residuals: Vec<ResidualStatistics>,
}

/// Residual of one channel of one measurement, before and after the filter update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Residual {
    #[serde(serialize_with = "epoch_to_str", deserialize_with = "epoch_from_str")]
    pub date: Epoch,
    pub parameter: String,
    pub prefit: f64,
    pub postfit: f64,
}

impl Tabular for Residual {
    const COLUMNS: &'static [&'static str] = &["Date", "Parameter", "Prefit", "Postfit"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Date(self.date),
            Cell::Text(self.parameter.clone()),
            Cell::Float(self.prefit),
            Cell::Float(self.postfit),
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbitDeterminationInDepth {
    #[serde(default)]
    pub residuals: Option<Vec<Residual>>,
}

/// Results of an orbit determination, as returned by the remote service.
///
/// Every section is optional on the wire: a section which was not requested (or not computed) is reported by
/// its extractor as `ResultError::NotRequested`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbitDeterminationResults {
    #[serde(default)]
    pub report: Option<OrbitDeterminationReport>,
    #[serde(default)]
    pub statistics: Option<OrbitDeterminationStatistics>,
    #[serde(default)]
    pub in_depth_results: Option<OrbitDeterminationInDepth>,
}

impl OrbitDeterminationResults {
    fn estimated_states(&self) -> Result<&[EstimatedState], ResultError> {
        self.report
            .as_ref()
            .map(|report| report.estimated_states.as_slice())
            .context(NotRequestedSnafu {
                channel: "estimated states",
            })
    }

    /// Table of the statistics of the residuals of each measurement channel.
    pub fn residual_statistics(&self) -> Result<Table, ResultError> {
        let stats = self
            .statistics
            .as_ref()
            .context(NotRequestedSnafu {
                channel: "residual statistics",
            })?;
        Ok(Table::from_rows(&stats.residuals))
    }

    /// Table of the estimated Keplerian elements, one row per filter update.
    pub fn estimated_keplerian_elements(&self) -> Result<Table, ResultError> {
        Ok(Table::from_rows(
            self.estimated_states()?
                .iter()
                .map(|state| &state.keplerian_elements),
        ))
    }

    /// Table of the standard deviations of the estimates.
    pub fn estimated_covariance_sigmas(&self) -> Result<Table, ResultError> {
        let states = self.estimated_states()?;
        let mut table = Table::new(["Date", "σX", "σY", "σZ", "σVX", "σVY", "σVZ"]);
        for state in states {
            if let Some(sigmas) = state.covariance_sigmas {
                let mut row = vec![Cell::Date(state.keplerian_elements.epoch)];
                row.extend(sigmas.iter().map(|s| Cell::Float(*s)));
                table.push_row(row)?;
            }
        }
        ensure!(
            !table.is_empty(),
            NotRequestedSnafu {
                channel: "estimated covariance"
            }
        );
        if table.row_count() != states.len() {
            warn!(
                "only {} of {} estimates carry a covariance",
                table.row_count(),
                states.len()
            );
        }
        Ok(table)
    }

    /// Table of the prefit and postfit residuals of each measurement.
    pub fn residuals(&self) -> Result<Table, ResultError> {
        let residuals = self
            .in_depth_results
            .as_ref()
            .and_then(|in_depth| in_depth.residuals.as_ref())
            .context(NotRequestedSnafu {
                channel: "residuals",
            })?;
        Ok(Table::from_rows(residuals))
    }

    /// Returns the final estimate, e.g. to start the next use case from it.
    pub fn last_estimated_state(&self) -> Result<KeplerianElements, ResultError> {
        self.estimated_states()?
            .last()
            .map(|state| state.keplerian_elements)
            .context(EmptyResultSnafu {
                what: "estimated states",
            })
    }
}
