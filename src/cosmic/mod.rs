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

/// Earth gravitational parameter used to derive the semi-major axis from a mean motion, in km^3/s^2 (WGS-84).
pub const EARTH_GM: f64 = 398_600.441_8;

/// Earth equatorial radius, in kilometers (WGS-84).
pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6_378.137;

closed_set! {
    /// Reference frames known to the remote service.
    pub enum Frame ("frame") {
        /// Geocentric Celestial Reference Frame
        Gcrf => "GCRF",
        Eme2000 => "EME2000",
        /// True Equator Mean Equinox, the frame of two-line elements
        Teme => "TEME",
        Itrf => "ITRF",
        Cirf => "CIRF",
        /// Local orbital frame: tangential, normal, cross-track
        Tnw => "TNW",
        /// Local orbital frame: radial, along-track, cross-track
        Qsw => "QSW",
        Lvlh => "LVLH",
    }
}

impl Frame {
    /// Returns true if this frame is attached to the spacecraft orbit rather than to the Earth.
    pub fn is_local(self) -> bool {
        matches!(self, Self::Tnw | Self::Qsw | Self::Lvlh)
    }
}

mod tle;
pub use self::tle::TwoLineElement;

mod orbit;
pub use self::orbit::*;

mod covariance;
pub use self::covariance::*;

mod spacecraft;
pub use self::spacecraft::*;

mod state;
pub use self::state::OrbitalState;

#[cfg(test)]
mod ut_frames {
    use super::Frame;
    use crate::ValidationError;
    use enum_iterator::all;

    #[test]
    fn frame_names() {
        for frame in all::<Frame>() {
            assert_eq!(frame.wire_name().parse::<Frame>().unwrap(), frame);
        }
        assert!("TNW".parse::<Frame>().unwrap().is_local());
        assert!(!"GCRF".parse::<Frame>().unwrap().is_local());
        assert_eq!(
            "ICRF".parse::<Frame>(),
            Err(ValidationError::UnknownOption {
                field: "frame",
                value: "ICRF".to_string()
            })
        );
    }
}
