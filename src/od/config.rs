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

use crate::cosmic::CovarianceMatrix;
use crate::errors::{ValidationError, ValidationResult};
use crate::utils::check_positive;
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use typed_builder::TypedBuilder;

/// Size of the estimated orbital state, used for the typical kappa of the unscented transform.
const STATE_SIZE: f64 = 6.0;

/// Tuning of the unscented transform of the remote Unscented Kalman Filter.
///
/// Values outside of the typical ranges are accepted by the service but usually lead to a poor convergence, so
/// they only trigger a warning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc, build_method(into = ValidationResult<UkfParameters>))]
pub struct UkfParameters {
    /// Spread of the sigma points around the mean, typically in (0, 1]
    #[builder(default = 1e-3)]
    pub alpha: f64,
    /// Prior knowledge of the distribution, 2 is optimal for gaussian distributions
    #[builder(default = 2.0)]
    pub beta: f64,
    /// Secondary scaling, typically 3 - n where n is the state size
    #[builder(default = 3.0 - STATE_SIZE)]
    pub kappa: f64,
}

validated_build!(UkfParameters);

impl Default for UkfParameters {
    fn default() -> Self {
        Self {
            alpha: 1e-3,
            beta: 2.0,
            kappa: 3.0 - STATE_SIZE,
        }
    }
}

impl UkfParameters {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (param, value) in [
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("kappa", self.kappa),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::OutOfRange {
                    param,
                    value,
                    range: "finite values",
                });
            }
        }
        if self.alpha <= 0.0 || self.alpha > 1.0 {
            warn!("UKF alpha = {} is outside of its typical range (0, 1]", self.alpha);
        }
        if self.beta < 0.0 {
            warn!("UKF beta = {} is negative, 2 is optimal for gaussian distributions", self.beta);
        }
        if self.alpha.powi(2) * (STATE_SIZE + self.kappa) <= 0.0 {
            warn!(
                "UKF kappa = {} leads to a non positive spread of the sigma points, 3 - n is typical",
                self.kappa
            );
        }
        Ok(())
    }
}

closed_set! {
    /// Parameters which the filter may estimate on top of the orbit.
    pub enum EstimatedParameter ("estimated parameter") {
        /// Drag coefficient, requires the drag perturbation
        Drag => "DRAG",
        /// Reflectivity coefficient, requires the solar radiation pressure
        Srp => "SRP",
        /// Bias on the thrust magnitude, requires a spacecraft with a thruster
        ThrustBias => "THRUST_BIAS",
    }
}

/// Configuration of the remote orbit determination.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc, build_method(into = ValidationResult<OrbitDeterminationConfig>))]
pub struct OrbitDeterminationConfig {
    #[builder(default)]
    pub ukf: UkfParameters,
    /// Process noise added at each time update, none by default
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub process_noise: Option<CovarianceMatrix>,
    /// Measurements whose residual exceeds this number of standard deviations are rejected
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub outlier_sigma_threshold: Option<f64>,
    #[builder(default)]
    #[serde(default)]
    pub estimated_parameters: BTreeSet<EstimatedParameter>,
}

validated_build!(OrbitDeterminationConfig);

impl Default for OrbitDeterminationConfig {
    fn default() -> Self {
        Self {
            ukf: UkfParameters::default(),
            process_noise: None,
            outlier_sigma_threshold: None,
            estimated_parameters: BTreeSet::new(),
        }
    }
}

impl OrbitDeterminationConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ukf.validate()?;
        if let Some(threshold) = self.outlier_sigma_threshold {
            check_positive("outlier_sigma_threshold", threshold)?;
            if threshold < 1.0 {
                warn!("outliers beyond {threshold} sigmas: most measurements will be rejected");
            }
        }
        Ok(())
    }

    pub fn estimates(&self, param: EstimatedParameter) -> bool {
        self.estimated_parameters.contains(&param)
    }
}

impl fmt::Display for OrbitDeterminationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UKF (alpha: {}, beta: {}, kappa: {})",
            self.ukf.alpha, self.ukf.beta, self.ukf.kappa
        )?;
        if let Some(threshold) = self.outlier_sigma_threshold {
            write!(f, " rejecting beyond {threshold} sigmas")?;
        }
        for param in &self.estimated_parameters {
            write!(f, " +{param}")?;
        }
        Ok(())
    }
}

/// Selects the outputs of the orbit determination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct OrbitDeterminationRequest {
    #[builder(default = true)]
    pub estimated_states: bool,
    /// Prefit and postfit residuals of every measurement
    #[builder(default = false)]
    pub residuals: bool,
    /// Standard deviations of the estimated states
    #[builder(default = false)]
    pub covariance: bool,
}

impl Default for OrbitDeterminationRequest {
    fn default() -> Self {
        Self::builder().build()
    }
}
