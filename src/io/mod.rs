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
use crate::time::{Duration, Epoch, Unit};
use serde::de::DeserializeOwned;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::prelude::*;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

/// Reads the CCSDS messages passed through by the remote service.
pub mod ccsds;
/// The system / context / mission configuration template.
pub mod mission;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("failed to read configuration file: {source}"))]
    ReadError { source: std::io::Error },
    #[snafu(display("failed to parse YAML configuration: {source}"))]
    ParseError { source: serde_yaml::Error },
    #[snafu(display("failed to serialize configuration to YAML: {source}"))]
    SerializeError { source: serde_yaml::Error },
    #[snafu(display("invalid configuration: {source}"))]
    InvalidConfig { source: ValidationError },
    #[snafu(display("environment variable {var} is not set"))]
    MissingEnvVar { var: &'static str },
}

impl PartialEq for ConfigError {
    /// No two configuration errors match
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

impl From<ValidationError> for ConfigError {
    fn from(source: ValidationError) -> Self {
        Self::InvalidConfig { source }
    }
}

pub trait ConfigRepr: Debug + Sized + Serialize + DeserializeOwned {
    /// Builds the configuration representation from the path to a yaml
    fn load<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path).context(ReadSnafu)?;
        let reader = BufReader::new(file);

        serde_yaml::from_reader(reader).context(ParseSnafu)
    }

    /// Builds a sequence of "Selves" from the provided path to a yaml
    fn load_many<P>(path: P) -> Result<Vec<Self>, ConfigError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path).context(ReadSnafu)?;
        let reader = BufReader::new(file);

        serde_yaml::from_reader(reader).context(ParseSnafu)
    }

    /// Builds a map of names to "selves" from the provided path to a yaml
    fn load_named<P>(path: P) -> Result<BTreeMap<String, Self>, ConfigError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path).context(ReadSnafu)?;
        let reader = BufReader::new(file);

        serde_yaml::from_reader(reader).context(ParseSnafu)
    }

    /// Builds "Self" from the provided string of a yaml
    fn loads(data: &str) -> Result<Self, ConfigError> {
        debug!("Loading YAML:\n{data}");
        serde_yaml::from_str(data).context(ParseSnafu)
    }

    /// Builds a sequence of "Selves" from the provided string of a yaml
    fn loads_many(data: &str) -> Result<Vec<Self>, ConfigError> {
        debug!("Loading YAML:\n{data}");
        serde_yaml::from_str(data).context(ParseSnafu)
    }

    /// Serializes this representation into a YAML document.
    fn dumps(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).context(SerializeSnafu)
    }
}

/// Trait to specify that a structure can be configured from a YAML file.
pub trait Configurable
where
    Self: Sized,
{
    /// The intermediate representation needed to create `Self` or to serialize Self.
    type IntermediateRepr: ConfigRepr;

    fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_config(Self::IntermediateRepr::load(path)?)
    }

    /// Creates a new, validated, instance of `self` from the configuration.
    fn from_config(cfg: Self::IntermediateRepr) -> Result<Self, ConfigError>;

    /// Converts self into the intermediate representation which is serializable.
    fn to_config(&self) -> Self::IntermediateRepr;
}

/// Parses an ISO 8601 date, with or without the trailing `Z`, or any representation hifitime understands.
///
/// Dates without a time scale are in UTC.
pub fn parse_epoch(value: &str) -> Result<Epoch, ValidationError> {
    let trimmed = value.trim();
    let candidate = trimmed.strip_suffix('Z').unwrap_or(trimmed);
    Epoch::from_str(candidate).map_err(|e| ValidationError::InvalidDate {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Formats the epoch as the ISO 8601 UTC string used on the wire, e.g. `2024-05-21T08:24:00.000000000Z`.
///
/// The nanoseconds are always written so that any epoch survives a round trip.
pub fn format_epoch(epoch: &Epoch) -> String {
    let (y, mm, dd, hh, min, s, ns) = epoch.to_gregorian_utc();
    format!("{y:04}-{mm:02}-{dd:02}T{hh:02}:{min:02}:{s:02}.{ns:09}Z")
}

pub(crate) fn epoch_to_str<S>(epoch: &Epoch, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_epoch(epoch))
}

/// A deserializer from Epoch string
pub(crate) fn epoch_from_str<'de, D>(deserializer: D) -> Result<Epoch, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_epoch(&s).map_err(serde::de::Error::custom)
}

#[allow(clippy::ptr_arg)]
pub(crate) fn epochs_to_str<S>(epochs: &Vec<Epoch>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut seq = serializer.serialize_seq(Some(epochs.len()))?;
    for epoch in epochs {
        seq.serialize_element(&format_epoch(epoch))?;
    }
    seq.end()
}

pub(crate) fn epochs_from_str<'de, D>(deserializer: D) -> Result<Vec<Epoch>, D::Error>
where
    D: Deserializer<'de>,
{
    let dates: Vec<String> = Vec::deserialize(deserializer)?;
    let mut epochs = Vec::with_capacity(dates.len());
    for date in dates {
        epochs.push(parse_epoch(&date).map_err(serde::de::Error::custom)?);
    }
    Ok(epochs)
}

pub(crate) fn maybe_epoch_to_str<S>(epoch: &Option<Epoch>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match epoch {
        Some(epoch) => epoch_to_str(epoch, serializer),
        None => serializer.serialize_none(),
    }
}

pub(crate) fn maybe_epoch_from_str<'de, D>(deserializer: D) -> Result<Option<Epoch>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) => Ok(Some(parse_epoch(&s).map_err(serde::de::Error::custom)?)),
        None => Ok(None),
    }
}

/// Durations are exchanged with the remote service as a number of seconds.
pub(crate) fn duration_to_seconds<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.to_seconds())
}

pub(crate) fn duration_from_seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = f64::deserialize(deserializer)?;
    Ok(Unit::Second * seconds)
}

pub(crate) fn maybe_duration_to_seconds<S>(
    duration: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if let Some(duration) = duration {
        duration_to_seconds(duration, serializer)
    } else {
        serializer.serialize_none()
    }
}

pub(crate) fn maybe_duration_from_seconds<'de, D>(
    deserializer: D,
) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.map(|seconds| Unit::Second * seconds))
}
