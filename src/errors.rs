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

use crate::client::ClientError;
use crate::io::ConfigError;
use crate::results::ResultError;
use crate::time::Epoch;
use snafu::prelude::*;

/// Raised when a configuration object is constructed with parameters which the remote service would reject.
#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ValidationError {
    #[snafu(display("unknown {field} `{value}`"))]
    UnknownOption { field: &'static str, value: String },
    #[snafu(display("{param} = {value} is outside of {range}"))]
    OutOfRange {
        param: &'static str,
        value: f64,
        range: &'static str,
    },
    #[snafu(display("{what}: expected {expected} items but got {got}"))]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[snafu(display("dates must be strictly increasing but {next} follows {prev}"))]
    NonIncreasingDates { prev: Epoch, next: Epoch },
    #[snafu(display("invalid TLE: {reason}"))]
    InvalidTle { reason: String },
    #[snafu(display("could not parse date `{value}`: {reason}"))]
    InvalidDate { value: String, reason: String },
    #[snafu(display("{param} is required {reason}"))]
    MissingParameter {
        param: &'static str,
        reason: &'static str,
    },
    #[snafu(display("inconsistent configuration: {reason}"))]
    Inconsistent { reason: String },
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Top level error, any error of this crate converts into it.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FdsError {
    #[snafu(display("validation failed: {source}"))]
    Validation { source: ValidationError },
    #[snafu(display("use case invocation failed: {source}"))]
    Client { source: ClientError },
    #[snafu(display("result extraction failed: {source}"))]
    Extraction { source: ResultError },
    #[snafu(display("configuration failed: {source}"))]
    Config { source: ConfigError },
}

impl From<ValidationError> for FdsError {
    fn from(source: ValidationError) -> Self {
        Self::Validation { source }
    }
}

impl From<ClientError> for FdsError {
    fn from(source: ClientError) -> Self {
        Self::Client { source }
    }
}

impl From<ResultError> for FdsError {
    fn from(source: ResultError) -> Self {
        Self::Extraction { source }
    }
}

impl From<ConfigError> for FdsError {
    fn from(source: ConfigError) -> Self {
        Self::Config { source }
    }
}
