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

use super::{Frame, TwoLineElement, EARTH_EQUATORIAL_RADIUS_KM};
use crate::errors::{ValidationError, ValidationResult};
use crate::io::{epoch_from_str, epoch_to_str};
use crate::time::Epoch;
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use typed_builder::TypedBuilder;

closed_set! {
    /// Whether the elements are instantaneous or averaged over the short periodic perturbations.
    pub enum ElementsKind ("orbital elements kind") {
        Osculating => "OSCULATING",
        Mean => "MEAN",
    }
}

closed_set! {
    /// Which anomaly locates the spacecraft on its orbit.
    pub enum AnomalyKind ("anomaly kind") {
        True => "TRUE",
        Mean => "MEAN",
    }
}

/// Keplerian orbital elements at an epoch, tagged with their reference frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc, build_method(into = ValidationResult<KeplerianElements>))]
pub struct KeplerianElements {
    #[serde(serialize_with = "epoch_to_str", deserialize_with = "epoch_from_str")]
    pub epoch: Epoch,
    pub sma_km: f64,
    pub ecc: f64,
    pub inc_deg: f64,
    pub raan_deg: f64,
    pub aop_deg: f64,
    /// Anomaly in degrees, its kind is given by `anomaly_kind`
    pub anomaly_deg: f64,
    #[builder(default = AnomalyKind::True)]
    pub anomaly_kind: AnomalyKind,
    #[builder(default = Frame::Gcrf)]
    pub frame: Frame,
    #[builder(default = ElementsKind::Osculating)]
    pub kind: ElementsKind,
}

validated_build!(KeplerianElements);

impl KeplerianElements {
    /// Osculating elements in GCRF with a true anomaly.
    pub fn new(
        epoch: Epoch,
        sma_km: f64,
        ecc: f64,
        inc_deg: f64,
        raan_deg: f64,
        aop_deg: f64,
        ta_deg: f64,
    ) -> Result<Self, ValidationError> {
        Self::builder()
            .epoch(epoch)
            .sma_km(sma_km)
            .ecc(ecc)
            .inc_deg(inc_deg)
            .raan_deg(raan_deg)
            .aop_deg(aop_deg)
            .anomaly_deg(ta_deg)
            .build()
    }

    /// Only closed orbits around the Earth are supported by the remote service.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sma_km <= EARTH_EQUATORIAL_RADIUS_KM || self.sma_km.is_nan() {
            return Err(ValidationError::OutOfRange {
                param: "sma_km",
                value: self.sma_km,
                range: "(Earth radius, +inf)",
            });
        }
        if !(0.0..1.0).contains(&self.ecc) {
            return Err(ValidationError::OutOfRange {
                param: "ecc",
                value: self.ecc,
                range: "[0, 1)",
            });
        }
        if !(0.0..=180.0).contains(&self.inc_deg) {
            return Err(ValidationError::OutOfRange {
                param: "inc_deg",
                value: self.inc_deg,
                range: "[0, 180]",
            });
        }
        if self.frame.is_local() {
            return Err(ValidationError::Inconsistent {
                reason: format!("Keplerian elements cannot be expressed in the local frame {}", self.frame),
            });
        }
        Ok(())
    }

    /// Perigee altitude above the equatorial radius, in km.
    pub fn periapsis_altitude_km(&self) -> f64 {
        self.sma_km * (1.0 - self.ecc) - EARTH_EQUATORIAL_RADIUS_KM
    }

    /// Apogee altitude above the equatorial radius, in km.
    pub fn apoapsis_altitude_km(&self) -> f64 {
        self.sma_km * (1.0 + self.ecc) - EARTH_EQUATORIAL_RADIUS_KM
    }
}

impl fmt::Display for KeplerianElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {:?}] {}\tsma = {:.6} km\tecc = {:.6}\tinc = {:.6} deg\traan = {:.6} deg\taop = {:.6} deg\t{:?} anomaly = {:.6} deg",
            self.frame,
            self.kind,
            self.epoch,
            self.sma_km,
            self.ecc,
            self.inc_deg,
            self.raan_deg,
            self.aop_deg,
            self.anomaly_kind,
            self.anomaly_deg,
        )
    }
}

/// Initial orbit of a spacecraft, either as a TLE or as Keplerian elements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Orbit {
    Tle(TwoLineElement),
    Keplerian(KeplerianElements),
}

impl Orbit {
    pub fn epoch(&self) -> Epoch {
        match self {
            Self::Tle(tle) => tle.epoch(),
            Self::Keplerian(kep) => kep.epoch,
        }
    }

    /// Frame in which the orbit is expressed. Two-line elements are always in TEME.
    pub fn frame(&self) -> Frame {
        match self {
            Self::Tle(_) => Frame::Teme,
            Self::Keplerian(kep) => kep.frame,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            // Decoding the TLE already validated it.
            Self::Tle(_) => Ok(()),
            Self::Keplerian(kep) => kep.validate(),
        }
    }
}

impl From<TwoLineElement> for Orbit {
    fn from(tle: TwoLineElement) -> Self {
        Self::Tle(tle)
    }
}

impl From<KeplerianElements> for Orbit {
    fn from(kep: KeplerianElements) -> Self {
        Self::Keplerian(kep)
    }
}
