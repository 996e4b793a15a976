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

use super::{
    maybe_duration_from_seconds, maybe_duration_to_seconds, maybe_epoch_from_str,
    maybe_epoch_to_str, ConfigError, ConfigRepr, Configurable,
};
use crate::cosmic::{CovarianceMatrix, Orbit, OrbitalState, Spacecraft};
use crate::dynamics::{AtmosphericModel, IntegratorKind, Perturbation, PropagationContext};
use crate::md::{ManeuverStrategy, StationKeepingStrategy};
use crate::time::{Duration, Epoch};
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The vehicle section of a mission template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub spacecraft: Spacecraft,
}

/// The propagation section of a mission template, unset fields take the defaults of the remote service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perturbations: Option<BTreeSet<Perturbation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solar_flux_sfu: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earth_potential_degree: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earth_potential_order: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atmospheric_model: Option<AtmosphericModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrator: Option<IntegratorKind>,
    #[serde(
        rename = "min_step_s",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "maybe_duration_to_seconds",
        deserialize_with = "maybe_duration_from_seconds"
    )]
    pub min_step: Option<Duration>,
    #[serde(
        rename = "max_step_s",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "maybe_duration_to_seconds",
        deserialize_with = "maybe_duration_from_seconds"
    )]
    pub max_step: Option<Duration>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "maybe_epoch_to_str",
        deserialize_with = "maybe_epoch_from_str"
    )]
    pub model_date: Option<Epoch>,
}

impl ContextConfig {
    fn to_context(&self) -> Result<PropagationContext, ConfigError> {
        let mut ctx = PropagationContext::builder().build()?;
        if let Some(perturbations) = &self.perturbations {
            ctx.perturbations = perturbations.clone();
        }
        if let Some(flux) = self.solar_flux_sfu {
            ctx.solar_flux_sfu = flux;
        }
        if let Some(degree) = self.earth_potential_degree {
            ctx.earth_potential_degree = degree;
        }
        if let Some(order) = self.earth_potential_order {
            ctx.earth_potential_order = order;
        }
        if let Some(model) = self.atmospheric_model {
            ctx.atmospheric_model = model;
        }
        if let Some(integrator) = self.integrator {
            ctx.integrator = integrator;
        }
        if let Some(step) = self.min_step {
            ctx.min_step = step;
        }
        if let Some(step) = self.max_step {
            ctx.max_step = step;
        }
        ctx.model_date = self.model_date;
        ctx.validate()?;
        Ok(ctx)
    }

    fn from_context(ctx: &PropagationContext) -> Self {
        Self {
            perturbations: Some(ctx.perturbations.clone()),
            solar_flux_sfu: Some(ctx.solar_flux_sfu),
            earth_potential_degree: Some(ctx.earth_potential_degree),
            earth_potential_order: Some(ctx.earth_potential_order),
            atmospheric_model: Some(ctx.atmospheric_model),
            integrator: Some(ctx.integrator),
            min_step: Some(ctx.min_step),
            max_step: Some(ctx.max_step),
            model_date: ctx.model_date,
        }
    }
}

/// The scenario section of a mission template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub initial_orbit: Orbit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covariance: Option<CovarianceMatrix>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maneuver_strategy: Option<ManeuverStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_keeping: Option<StationKeepingStrategy>,
}

/// A "system / context / mission" template, as written by mission analysts in YAML.
///
/// ```yaml
/// system:
///   spacecraft:
///     type: SPHERE
///     mass_kg: 12.0
///     cross_section_m2: 0.06
///     drag_coefficient: 2.2
/// context:
///   perturbations: [EARTH_POTENTIAL, DRAG]
///   max_step_s: 60.0
/// mission:
///   initial_orbit:
///     type: KEPLERIAN
///     epoch: 2024-05-21T08:24:00Z
///     sma_km: 6878.137
///     ecc: 0.001
///     inc_deg: 97.5
///     raan_deg: 10.0
///     aop_deg: 90.0
///     anomaly_deg: 0.0
///     anomaly_kind: "TRUE"
///     frame: GCRF
///     kind: OSCULATING
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MissionConfig {
    pub system: SystemConfig,
    #[serde(default)]
    pub context: ContextConfig,
    pub mission: ScenarioConfig,
}

impl ConfigRepr for MissionConfig {}

/// A validated mission: the initial state of the use cases and the strategies to apply from it.
#[derive(Clone, Debug, PartialEq)]
pub struct Mission {
    pub initial_state: OrbitalState,
    pub maneuver_strategy: Option<ManeuverStrategy>,
    pub station_keeping: Option<StationKeepingStrategy>,
}

impl Configurable for Mission {
    type IntermediateRepr = MissionConfig;

    fn from_config(cfg: Self::IntermediateRepr) -> Result<Self, ConfigError> {
        let propagation_context = cfg.context.to_context()?;

        let mut initial_state = OrbitalState::builder()
            .orbit(cfg.mission.initial_orbit)
            .propagation_context(propagation_context)
            .spacecraft(cfg.system.spacecraft)
            .build()?;

        if let Some(covar) = cfg.mission.covariance {
            // Deserialization does not check the matrix
            let checked =
                CovarianceMatrix::from_matrix(*covar.matrix(), covar.frame())?.with_kind(covar.kind());
            initial_state.covariance = Some(checked);
        }

        if let Some(strategy) = &cfg.mission.maneuver_strategy {
            strategy.validate()?;
        }
        if let Some(strategy) = &cfg.mission.station_keeping {
            strategy.validate()?;
        }

        debug!(
            "mission from {} with {}",
            initial_state.epoch(),
            initial_state.propagation_context
        );

        Ok(Self {
            initial_state,
            maneuver_strategy: cfg.mission.maneuver_strategy,
            station_keeping: cfg.mission.station_keeping,
        })
    }

    fn to_config(&self) -> Self::IntermediateRepr {
        MissionConfig {
            system: SystemConfig {
                spacecraft: self.initial_state.spacecraft.clone(),
            },
            context: ContextConfig::from_context(&self.initial_state.propagation_context),
            mission: ScenarioConfig {
                initial_orbit: self.initial_state.orbit.clone(),
                covariance: self.initial_state.covariance,
                maneuver_strategy: self.maneuver_strategy,
                station_keeping: self.station_keeping.clone(),
            },
        }
    }
}
