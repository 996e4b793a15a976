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

use super::Cell;
use crate::cosmic::KeplerianElements;

/// A typed result row which can be flattened into the cells of a table.
pub trait Tabular {
    /// Column names, in the order of the cells
    const COLUMNS: &'static [&'static str];

    fn cells(&self) -> Vec<Cell>;
}

impl Tabular for KeplerianElements {
    const COLUMNS: &'static [&'static str] = &["Date", "SMA", "ECC", "INC", "RAAN", "AOP", "TA"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Date(self.epoch),
            Cell::Float(self.sma_km),
            Cell::Float(self.ecc),
            Cell::Float(self.inc_deg),
            Cell::Float(self.raan_deg),
            Cell::Float(self.aop_deg),
            Cell::Float(self.anomaly_deg),
        ]
    }
}
