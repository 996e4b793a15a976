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

use crate::errors::{ValidationError, ValidationResult};
use crate::io::{duration_from_seconds, duration_to_seconds};
use crate::linalg::Vector3;
use crate::time::{Duration, Unit};
use crate::utils::{check_fraction, check_positive};
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use typed_builder::TypedBuilder;

/// From NIST special publication 330, 2008 edition, in meters per second squared
pub const STD_GRAVITY: f64 = 9.80665;

/// Physical description of the vehicle.
///
/// A sphere only carries what drag needs. A box additionally carries its power and propulsion subsystems, which
/// are required by the use cases that simulate thrusting, attitude or power.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Spacecraft {
    Sphere(SphereSpacecraft),
    Box(BoxSpacecraft),
}

impl Spacecraft {
    pub fn mass_kg(&self) -> f64 {
        match self {
            Self::Sphere(sphere) => sphere.mass_kg,
            Self::Box(bx) => bx.mass_kg,
        }
    }

    pub fn drag_coefficient(&self) -> f64 {
        match self {
            Self::Sphere(sphere) => sphere.drag_coefficient,
            Self::Box(bx) => bx.drag_coefficient,
        }
    }

    /// Returns the thruster, only box spacecraft have one.
    pub fn thruster(&self) -> Option<&Thruster> {
        match self {
            Self::Sphere(_) => None,
            Self::Box(bx) => Some(&bx.thruster),
        }
    }

    pub fn is_box(&self) -> bool {
        matches!(self, Self::Box(_))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Sphere(sphere) => sphere.validate(),
            Self::Box(bx) => bx.validate(),
        }
    }
}

impl From<SphereSpacecraft> for Spacecraft {
    fn from(sphere: SphereSpacecraft) -> Self {
        Self::Sphere(sphere)
    }
}

impl From<BoxSpacecraft> for Spacecraft {
    fn from(bx: BoxSpacecraft) -> Self {
        Self::Box(bx)
    }
}

impl fmt::Display for Spacecraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sphere(sphere) => write!(
                f,
                "sphere of {} kg, Cd = {}, {} m^2",
                sphere.mass_kg, sphere.drag_coefficient, sphere.cross_section_m2
            ),
            Self::Box(bx) => write!(
                f,
                "box of {} kg, Cd = {}, {:?} m, thruster {}",
                bx.mass_kg, bx.drag_coefficient, bx.dimensions_m, bx.thruster
            ),
        }
    }
}

/// Spherical spacecraft, its drag is independent of its attitude.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc, build_method(into = ValidationResult<SphereSpacecraft>))]
pub struct SphereSpacecraft {
    pub mass_kg: f64,
    /// coefficient of drag; (spheres are between 2.0 and 2.1, use 2.2 in Earth's atmosphere (default)).
    #[builder(default = 2.2)]
    pub drag_coefficient: f64,
    pub cross_section_m2: f64,
}

validated_build!(SphereSpacecraft);

impl SphereSpacecraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_positive("mass_kg", self.mass_kg)?;
        check_positive("drag_coefficient", self.drag_coefficient)?;
        check_positive("cross_section_m2", self.cross_section_m2)
    }
}

/// Rectangular cuboid spacecraft with its battery, thruster and solar array.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc, build_method(into = ValidationResult<BoxSpacecraft>))]
pub struct BoxSpacecraft {
    pub mass_kg: f64,
    #[builder(default = 2.2)]
    pub drag_coefficient: f64,
    /// Length, width and height of the box, in meters
    pub dimensions_m: [f64; 3],
    /// Maximum slew rate of the attitude control system, in degrees per second
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub max_angular_velocity_deg_s: Option<f64>,
    pub battery: Battery,
    pub thruster: Thruster,
    pub solar_array: SolarArray,
}

validated_build!(BoxSpacecraft);

impl BoxSpacecraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_positive("mass_kg", self.mass_kg)?;
        check_positive("drag_coefficient", self.drag_coefficient)?;
        for dimension in self.dimensions_m {
            check_positive("dimensions_m", dimension)?;
        }
        if let Some(rate) = self.max_angular_velocity_deg_s {
            check_positive("max_angular_velocity_deg_s", rate)?;
        }
        self.battery.validate()?;
        self.thruster.validate()?;
        self.solar_array.validate()?;

        if self.thruster.propellant_mass_kg >= self.mass_kg {
            return Err(ValidationError::Inconsistent {
                reason: format!(
                    "propellant mass ({} kg) exceeds the spacecraft mass ({} kg)",
                    self.thruster.propellant_mass_kg, self.mass_kg
                ),
            });
        }
        Ok(())
    }

    /// Largest face of the box, in m^2.
    pub fn max_cross_section_m2(&self) -> f64 {
        let [x, y, z] = self.dimensions_m;
        (x * y).max(y * z).max(x * z)
    }
}

/// Battery of a box spacecraft. Fractions are of the nominal capacity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc, build_method(into = ValidationResult<Battery>))]
pub struct Battery {
    /// Maximum fraction of the capacity which may be discharged
    #[builder(default = 0.2)]
    pub depth_of_discharge: f64,
    pub nominal_capacity_wh: f64,
    /// Fraction of charge below which the thruster may not be fired
    #[builder(default = 0.5)]
    pub minimum_charge_for_firing: f64,
    /// Fraction of charge at the initial epoch
    #[builder(default = 0.8)]
    pub initial_charge: f64,
}

validated_build!(Battery);

impl Battery {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_fraction("depth_of_discharge", self.depth_of_discharge)?;
        check_positive("nominal_capacity_wh", self.nominal_capacity_wh)?;
        check_fraction("minimum_charge_for_firing", self.minimum_charge_for_firing)?;
        check_fraction("initial_charge", self.initial_charge)
    }

    /// Energy available at the initial epoch, in Wh.
    pub fn initial_energy_wh(&self) -> f64 {
        self.initial_charge * self.nominal_capacity_wh
    }
}

/// Defines an electric thruster with its power needs.
#[allow(non_snake_case)]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc, build_method(into = ValidationResult<Thruster>))]
pub struct Thruster {
    /// The Isp is to be provided in seconds
    pub isp_s: f64,
    /// The thrust is to be provided in Newtons
    pub thrust_N: f64,
    /// Total impulse capability, in Newton seconds
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub total_impulse_Ns: Option<f64>,
    #[builder(default_code = "5.0 * Unit::Minute")]
    #[serde(
        serialize_with = "duration_to_seconds",
        deserialize_with = "duration_from_seconds"
    )]
    pub warm_up_duration: Duration,
    #[builder(default = 0.0)]
    pub warm_up_power_W: f64,
    #[builder(default = 0.0)]
    pub standby_power_W: f64,
    pub thrust_power_W: f64,
    pub propellant_mass_kg: f64,
}

validated_build!(Thruster);

impl Thruster {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_positive("isp_s", self.isp_s)?;
        check_positive("thrust_N", self.thrust_N)?;
        if let Some(impulse) = self.total_impulse_Ns {
            check_positive("total_impulse_Ns", impulse)?;
        }
        if self.warm_up_duration < Duration::ZERO {
            return Err(ValidationError::OutOfRange {
                param: "warm_up_duration",
                value: self.warm_up_duration.to_seconds(),
                range: "[0, +inf)",
            });
        }
        for (param, value) in [
            ("warm_up_power_W", self.warm_up_power_W),
            ("standby_power_W", self.standby_power_W),
            ("propellant_mass_kg", self.propellant_mass_kg),
        ] {
            if !(value >= 0.0) {
                return Err(ValidationError::OutOfRange {
                    param,
                    value,
                    range: "[0, +inf)",
                });
            }
        }
        check_positive("thrust_power_W", self.thrust_power_W)
    }

    /// Returns the exhaust velocity v_e in meters per second
    pub fn exhaust_velocity_m_s(&self) -> f64 {
        self.isp_s * STD_GRAVITY
    }

    /// Mass flow rate when thrusting, in kg/s
    pub fn mass_flow_kg_s(&self) -> f64 {
        self.thrust_N / self.exhaust_velocity_m_s()
    }

    /// Delta-v available from the propellant on board given the wet mass of the spacecraft, in m/s.
    pub fn delta_v_capability_m_s(&self, wet_mass_kg: f64) -> f64 {
        let dry_mass_kg = wet_mass_kg - self.propellant_mass_kg;
        self.exhaust_velocity_m_s() * (wet_mass_kg / dry_mass_kg).ln()
    }
}

impl fmt::Display for Thruster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} N @ {} s (warm up {}, {} W)",
            self.thrust_N, self.isp_s, self.warm_up_duration, self.thrust_power_W
        )
    }
}

closed_set! {
    /// Mounting of the solar array.
    pub enum SolarArrayKind ("solar array kind") {
        /// Cells mounted on the body of the spacecraft
        Body => "BODY",
        /// Deployed panels with a fixed orientation with respect to the body
        Deployable => "DEPLOYABLE",
        /// Deployed panels which rotate to track the Sun
        DeployableRotating => "DEPLOYABLE_ROTATING",
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc, build_method(into = ValidationResult<SolarArray>))]
pub struct SolarArray {
    #[builder(default = SolarArrayKind::Body)]
    pub kind: SolarArrayKind,
    pub surface_m2: f64,
    /// Conversion efficiency of the cells
    #[builder(default = 0.3)]
    pub efficiency: f64,
    /// Normal to the panel in the spacecraft body frame
    #[builder(default = [0.0, 0.0, 1.0])]
    pub normal: [f64; 3],
}

validated_build!(SolarArray);

impl SolarArray {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_positive("surface_m2", self.surface_m2)?;
        check_fraction("efficiency", self.efficiency)?;
        check_positive("normal norm", self.normal().norm())
    }

    pub fn normal(&self) -> Vector3<f64> {
        Vector3::from(self.normal)
    }

    /// Power generated under normal incidence at one astronomical unit, in W.
    pub fn peak_power_w(&self) -> f64 {
        const SOLAR_CONSTANT_W_M2: f64 = 1361.0;
        SOLAR_CONSTANT_W_M2 * self.surface_m2 * self.efficiency
    }
}
