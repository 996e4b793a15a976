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
use crate::io::{
    duration_from_seconds, duration_to_seconds, maybe_duration_from_seconds,
    maybe_duration_to_seconds, ConfigError, ConfigRepr,
};
use crate::time::{Duration, Unit};
use crate::utils::check_positive;
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use typed_builder::TypedBuilder;

pub const ENV_URL: &str = "SPACETOWER_URL";
pub const ENV_API_KEY: &str = "SPACETOWER_API_KEY";
pub const ENV_CLIENT_ID: &str = "SPACETOWER_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "SPACETOWER_CLIENT_SECRET";

/// Credentials of the remote service: either an API key or a client id and secret pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Credentials {
    /// Sent in the `x-api-key` header
    ApiKey(String),
    /// Sent with HTTP basic authentication
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
}

impl Credentials {
    pub fn api_key(key: &str) -> Self {
        Self::ApiKey(key.to_string())
    }

    pub fn client(client_id: &str, client_secret: &str) -> Self {
        Self::ClientCredentials {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::ApiKey(key) if key.trim().is_empty() => Err(ValidationError::MissingParameter {
                param: "api_key",
                reason: "to authenticate with an API key",
            }),
            Self::ClientCredentials { client_id, .. } if client_id.trim().is_empty() => {
                Err(ValidationError::MissingParameter {
                    param: "client_id",
                    reason: "to authenticate with client credentials",
                })
            }
            Self::ClientCredentials { client_secret, .. } if client_secret.is_empty() => {
                Err(ValidationError::MissingParameter {
                    param: "client_secret",
                    reason: "to authenticate with client credentials",
                })
            }
            _ => Ok(()),
        }
    }
}

/// Secrets are never printed.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => write!(f, "ApiKey(***)"),
            Self::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &"***")
                .finish(),
        }
    }
}

fn default_poll_period() -> Duration {
    Unit::Second * 2.0
}

/// Connection settings of the remote service.
///
/// # Example
/// ```
/// use spacetower::client::{ClientConfig, Credentials};
/// use spacetower::time::Unit;
///
/// let cfg = ClientConfig::builder()
///     .base_url("https://fds.example.com")
///     .credentials(Credentials::api_key("my-key"))
///     .timeout(Unit::Hour * 1.0)
///     .build()
///     .unwrap();
/// assert_eq!(cfg.poll_period, Unit::Second * 2.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc, build_method(into = ValidationResult<ClientConfig>))]
pub struct ClientConfig {
    #[builder(setter(into))]
    pub base_url: String,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub credentials: Option<Credentials>,
    /// Period between two queries of the state of a submitted job
    #[builder(default_code = "default_poll_period()")]
    #[serde(
        rename = "poll_period_s",
        default = "default_poll_period",
        serialize_with = "duration_to_seconds",
        deserialize_with = "duration_from_seconds"
    )]
    pub poll_period: Duration,
    /// Maximum time to wait for a job, forever if unset
    #[builder(default, setter(strip_option))]
    #[serde(
        rename = "timeout_s",
        default,
        serialize_with = "maybe_duration_to_seconds",
        deserialize_with = "maybe_duration_from_seconds"
    )]
    pub timeout: Option<Duration>,
    /// Maximum duration of each HTTP request, including the connection
    #[builder(default, setter(strip_option))]
    #[serde(
        rename = "request_timeout_s",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "maybe_duration_to_seconds",
        deserialize_with = "maybe_duration_from_seconds"
    )]
    pub request_timeout: Option<Duration>,
}

validated_build!(ClientConfig);

impl ConfigRepr for ClientConfig {}

impl ClientConfig {
    /// Reads the configuration from the `SPACETOWER_URL` environment variable, and the credentials from either
    /// `SPACETOWER_API_KEY` or the `SPACETOWER_CLIENT_ID` and `SPACETOWER_CLIENT_SECRET` pair.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|var| std::env::var(var).ok())
    }

    pub(crate) fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_URL).ok_or(ConfigError::MissingEnvVar { var: ENV_URL })?;

        let credentials = if let Some(key) = lookup(ENV_API_KEY) {
            Some(Credentials::ApiKey(key))
        } else {
            match (lookup(ENV_CLIENT_ID), lookup(ENV_CLIENT_SECRET)) {
                (Some(client_id), Some(client_secret)) => Some(Credentials::ClientCredentials {
                    client_id,
                    client_secret,
                }),
                (Some(_), None) => {
                    return Err(ConfigError::MissingEnvVar {
                        var: ENV_CLIENT_SECRET,
                    })
                }
                _ => {
                    warn!("no credentials in the environment, use cases will be rejected");
                    None
                }
            }
        };

        let me = Self {
            base_url,
            credentials,
            poll_period: default_poll_period(),
            timeout: None,
            request_timeout: None,
        };
        me.validate()?;
        Ok(me)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ValidationError::Inconsistent {
                reason: format!("base URL `{}` is not an HTTP(S) URL", self.base_url),
            });
        }
        check_positive("poll_period", self.poll_period.to_seconds())?;
        if let Some(timeout) = self.timeout {
            check_positive("timeout", timeout.to_seconds())?;
        }
        if let Some(request_timeout) = self.request_timeout {
            check_positive("request_timeout", request_timeout.to_seconds())?;
        }
        if let Some(credentials) = &self.credentials {
            credentials.validate()?;
        }
        Ok(())
    }

    /// URL to which a use case is submitted.
    pub fn use_case_url(&self, endpoint: &str) -> String {
        format!(
            "{}/api/v1/use-cases/{endpoint}",
            self.base_url.trim_end_matches('/')
        )
    }

    /// URL of the state of a submitted job.
    pub fn job_url(&self, id: &str) -> String {
        format!("{}/api/v1/jobs/{id}", self.base_url.trim_end_matches('/'))
    }
}
