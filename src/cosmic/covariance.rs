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

use super::Frame;
use crate::errors::ValidationError;
use crate::linalg::{Matrix6, Vector6};
use approx::relative_eq;
use serde::{Deserializer, Serializer};
use serde_derive::{Deserialize, Serialize};
use std::fmt;

closed_set! {
    /// Parametrization of the six state components that the covariance describes.
    pub enum CovarianceKind ("covariance kind") {
        /// Position (km) and velocity (km/s) components
        Cartesian => "CARTESIAN",
        /// SMA (km), ECC, INC, RAAN, AOP, and anomaly (deg)
        Keplerian => "KEPLERIAN",
    }
}

/// Relative tolerance on the symmetry of a user provided covariance.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Six by six covariance of an orbital state, tagged with the frame it is expressed in.
///
/// Positive semi-definiteness is assumed: the remote service factorizes the matrix and will reject it if needed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CovarianceMatrix {
    #[serde(serialize_with = "matrix_to_rows", deserialize_with = "matrix_from_rows")]
    matrix: Matrix6<f64>,
    frame: Frame,
    kind: CovarianceKind,
}

impl CovarianceMatrix {
    /// Builds a diagonal covariance from the provided variances.
    ///
    /// # Example
    /// ```
    /// use spacetower::cosmic::{CovarianceMatrix, Frame};
    ///
    /// let covar = CovarianceMatrix::from_diagonal([100.0, 100.0, 100.0, 0.1, 0.1, 0.1], Frame::Tnw).unwrap();
    /// assert_eq!(covar.matrix()[(0, 1)], 0.0);
    /// assert_eq!(covar.diagonal()[3], 0.1);
    /// ```
    pub fn from_diagonal(variances: [f64; 6], frame: Frame) -> Result<Self, ValidationError> {
        for variance in variances {
            if !(variance >= 0.0) {
                return Err(ValidationError::OutOfRange {
                    param: "covariance diagonal",
                    value: variance,
                    range: "[0, +inf)",
                });
            }
        }
        Ok(Self {
            matrix: Matrix6::from_diagonal(&Vector6::from_iterator(variances)),
            frame,
            kind: CovarianceKind::Cartesian,
        })
    }

    /// Builds a diagonal covariance from the standard deviation of each component, i.e. squares them.
    pub fn from_standard_deviations(
        sigmas: [f64; 6],
        frame: Frame,
    ) -> Result<Self, ValidationError> {
        for sigma in sigmas {
            if !(sigma >= 0.0) {
                return Err(ValidationError::OutOfRange {
                    param: "standard deviation",
                    value: sigma,
                    range: "[0, +inf)",
                });
            }
        }
        Self::from_diagonal(sigmas.map(|sigma| sigma.powi(2)), frame)
    }

    /// Wraps a full matrix, checking that it is symmetric and that its diagonal is non-negative.
    pub fn from_matrix(matrix: Matrix6<f64>, frame: Frame) -> Result<Self, ValidationError> {
        for i in 0..6 {
            if !(matrix[(i, i)] >= 0.0) {
                return Err(ValidationError::OutOfRange {
                    param: "covariance diagonal",
                    value: matrix[(i, i)],
                    range: "[0, +inf)",
                });
            }
            for j in 0..i {
                let (a, b) = (matrix[(i, j)], matrix[(j, i)]);
                if !relative_eq!(a, b, max_relative = SYMMETRY_TOLERANCE) {
                    return Err(ValidationError::Inconsistent {
                        reason: format!("covariance is not symmetric: [{i},{j}] = {a} but [{j},{i}] = {b}"),
                    });
                }
            }
        }
        Ok(Self {
            matrix,
            frame,
            kind: CovarianceKind::Cartesian,
        })
    }

    /// Declares that this covariance is on Keplerian elements instead of Cartesian components.
    pub fn with_kind(mut self, kind: CovarianceKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn matrix(&self) -> &Matrix6<f64> {
        &self.matrix
    }

    pub fn diagonal(&self) -> Vector6<f64> {
        self.matrix.diagonal()
    }

    /// Standard deviation of each component.
    pub fn sigmas(&self) -> Vector6<f64> {
        self.matrix.diagonal().map(f64::sqrt)
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn kind(&self) -> CovarianceKind {
        self.kind
    }
}

impl fmt::Display for CovarianceMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} covariance in {}", self.kind, self.frame)?;
        write!(f, "{:.6e}", self.matrix)
    }
}

fn matrix_to_rows<S>(matrix: &Matrix6<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let rows: Vec<[f64; 6]> = matrix
        .row_iter()
        .map(|row| [row[0], row[1], row[2], row[3], row[4], row[5]])
        .collect();
    serde::Serialize::serialize(&rows, serializer)
}

fn matrix_from_rows<'de, D>(deserializer: D) -> Result<Matrix6<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows = <[[f64; 6]; 6] as serde::Deserialize>::deserialize(deserializer)?;
    Ok(Matrix6::from_fn(|i, j| rows[i][j]))
}
