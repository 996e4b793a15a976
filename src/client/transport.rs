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

use super::{ClientError, Credentials, HttpSnafu};
use crate::time::Duration;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde_json::Value;
use snafu::prelude::*;

/// The seam between the use case protocol and the network.
///
/// Implementors perform a single request and return the decoded JSON body of a successful response. They never
/// retry.
pub trait Transport {
    fn post_json(
        &self,
        url: &str,
        credentials: &Credentials,
        body: &Value,
    ) -> Result<Value, ClientError>;

    fn get_json(&self, url: &str, credentials: &Credentials) -> Result<Value, ClientError>;
}

/// Blocking HTTP(S) transport.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Initializes the transport, with an optional timeout on each request.
    pub fn new(request_timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(std::time::Duration::from_secs_f64(
                timeout.to_seconds().max(0.0),
            ));
        }
        let client = builder.build().context(HttpSnafu {
            action: "building the HTTP client",
        })?;
        Ok(Self { client })
    }

    fn authenticate(request: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
        match credentials {
            Credentials::ApiKey(key) => request.header("x-api-key", key),
            Credentials::ClientCredentials {
                client_id,
                client_secret,
            } => request.basic_auth(client_id, Some(client_secret)),
        }
    }

    fn send(request: RequestBuilder, url: &str, action: &'static str) -> Result<Value, ClientError> {
        let response = request
            .send()
            .map_err(|source| request_error(url, action, source))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(status_error(status, body));
        }
        response
            .json::<Value>()
            .map_err(|source| request_error(url, action, source))
    }
}

/// Connection failures and timed out requests mean that the service could not be reached.
fn request_error(url: &str, action: &'static str, source: reqwest::Error) -> ClientError {
    if source.is_connect() || source.is_timeout() {
        ClientError::Unreachable {
            url: url.to_string(),
            message: source.to_string(),
        }
    } else {
        ClientError::Http { action, source }
    }
}

fn status_error(status: StatusCode, body: String) -> ClientError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        warn!("the remote service rejected the credentials ({status})");
    }
    ClientError::HttpStatus {
        status: status.as_u16(),
        body,
    }
}

impl Transport for HttpTransport {
    fn post_json(
        &self,
        url: &str,
        credentials: &Credentials,
        body: &Value,
    ) -> Result<Value, ClientError> {
        trace!("POST {url}");
        let request = Self::authenticate(self.client.post(url), credentials).json(body);
        Self::send(request, url, "submitting the use case")
    }

    fn get_json(&self, url: &str, credentials: &Credentials) -> Result<Value, ClientError> {
        trace!("GET {url}");
        let request = Self::authenticate(self.client.get(url), credentials);
        Self::send(request, url, "querying the job")
    }
}
