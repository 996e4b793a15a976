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

use crate::io::format_epoch;
use crate::time::Epoch;
use snafu::prelude::*;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

mod tabular;
pub use tabular::Tabular;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ResultError {
    #[snafu(display("{channel} was not requested or was not computed by the remote service"))]
    NotRequested { channel: &'static str },
    #[snafu(display("no column named `{name}`, available columns are {available:?}"))]
    UnknownColumn { name: String, available: Vec<String> },
    #[snafu(display("column `{column}` holds a non numerical value on row {row}"))]
    NotNumeric { column: String, row: usize },
    #[snafu(display("column `{column}` holds a non date value on row {row}"))]
    NotADate { column: String, row: usize },
    #[snafu(display("row of {got} cells does not fit a table of {expected} columns"))]
    RowWidth { expected: usize, got: usize },
    #[snafu(display("{what} is empty"))]
    EmptyResult { what: &'static str },
    #[snafu(display("CSV export failed: {source}"))]
    CsvError { source: csv::Error },
    #[snafu(display("could not write export: {source}"))]
    ExportIoError { source: std::io::Error },
    #[snafu(display("invalid OEM: {source}"))]
    OemError { source: crate::io::ccsds::OemError },
}

/// A single value of a result table.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Date(Epoch),
    Float(f64),
    Int(i64),
    Text(String),
    Bool(bool),
}

impl Cell {
    /// Numerical value of this cell, integers are converted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_epoch(&self) -> Option<Epoch> {
        match self {
            Self::Date(epoch) => Some(*epoch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(epoch) => write!(f, "{}", format_epoch(epoch)),
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<Epoch> for Cell {
    fn from(epoch: Epoch) -> Self {
        Self::Date(epoch)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Flat table of named columns, as extracted from the results of a use case.
///
/// Tables are copies: extracting one never modifies the results it was built from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Initializes an empty table with the provided column names.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Builds the table of a sequence of typed rows.
    pub fn from_rows<'a, R, I>(rows: I) -> Self
    where
        R: Tabular + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        Self {
            columns: R::COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: rows.into_iter().map(Tabular::cells).collect(),
        }
    }

    /// Appends a row, which must have exactly one cell per column.
    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), ResultError> {
        ensure!(
            row.len() == self.columns.len(),
            RowWidthSnafu {
                expected: self.columns.len(),
                got: row.len()
            }
        );
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Result<usize, ResultError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ResultError::UnknownColumn {
                name: name.to_string(),
                available: self.columns.clone(),
            })
    }

    /// Returns all of the cells of the named column.
    pub fn column(&self, name: &str) -> Result<Vec<&Cell>, ResultError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Returns the named column as floating point values, failing on the first non numerical cell.
    pub fn column_f64(&self, name: &str) -> Result<Vec<f64>, ResultError> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                cells[idx].as_f64().context(NotNumericSnafu {
                    column: name.to_string(),
                    row,
                })
            })
            .collect()
    }

    pub fn column_epochs(&self, name: &str) -> Result<Vec<Epoch>, ResultError> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                cells[idx].as_epoch().context(NotADateSnafu {
                    column: name.to_string(),
                    row,
                })
            })
            .collect()
    }

    /// Writes this table as CSV, with a header row.
    pub fn to_csv<W: Write>(&self, writer: W) -> Result<(), ResultError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.columns).context(CsvSnafu)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(|cell| cell.to_string()))
                .context(CsvSnafu)?;
        }
        wtr.flush().context(ExportIoSnafu)
    }

    pub fn to_csv_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ResultError> {
        let file = File::create(&path).context(ExportIoSnafu)?;
        self.to_csv(file)?;
        info!(
            "Exported {} rows to {}",
            self.row_count(),
            path.as_ref().display()
        );
        Ok(())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.columns.join("\t"))?;
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            writeln!(f, "{}", cells.join("\t"))?;
        }
        Ok(())
    }
}
