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

use crate::cosmic::OrbitalState;
use crate::errors::ValidationError;
use crate::time::{Duration, Unit};
use crate::FdsError;
use serde::de::DeserializeOwned;
use serde_derive::{Deserialize, Serialize};
use serde_json::{Map, Value};
use snafu::prelude::*;
use std::time::Instant;

mod config;
pub use config::{
    ClientConfig, Credentials, ENV_API_KEY, ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_URL,
};

mod transport;
pub use transport::{HttpTransport, Transport};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ClientError {
    #[snafu(display("no credentials configured: set an API key or a client id and secret"))]
    NoCredentials,
    #[snafu(display("invalid client configuration: {source}"))]
    InvalidClientConfig { source: ValidationError },
    #[snafu(display("HTTP error when {action}: {source}"))]
    Http {
        action: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("could not reach {url}: {message}"))]
    Unreachable { url: String, message: String },
    #[snafu(display("remote service answered with status {status}: {body}"))]
    HttpStatus { status: u16, body: String },
    #[snafu(display("could not serialize the use case payload: {source}"))]
    Payload { source: serde_json::Error },
    #[snafu(display("could not decode {what}: {source}"))]
    Decode {
        what: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("job {id} failed: {message}"))]
    JobFailed { id: String, message: String },
    #[snafu(display("job {id} succeeded without results"))]
    MissingResults { id: String },
    #[snafu(display("job {id} still running after {waited}"))]
    Timeout { id: String, waited: Duration },
}

closed_set! {
    /// State of a job on the remote service.
    pub enum JobStatus ("job status") {
        Pending => "PENDING",
        Running => "RUNNING",
        Success => "SUCCESS",
        Failure => "FAILURE",
    }
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }
}

/// Answer of the service to a submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: String,
    pub status: JobStatus,
}

/// Answer of the service to a job query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobState {
    pub status: JobStatus,
    #[serde(default)]
    pub results: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Explicit handle on the remote service: configuration and transport, no global state.
#[derive(Clone, Debug)]
pub struct FdsClient<T: Transport = HttpTransport> {
    config: ClientConfig,
    transport: T,
}

impl FdsClient<HttpTransport> {
    /// Initializes a client over HTTP(S), each request bounded by the configured request timeout.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate().context(InvalidClientConfigSnafu)?;
        let transport = HttpTransport::new(config.request_timeout)?;
        Ok(Self { config, transport })
    }
}

impl<T: Transport> FdsClient<T> {
    /// Initializes a client over the provided transport.
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ClientError> {
        config.validate().context(InvalidClientConfigSnafu)?;
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn credentials(&self) -> Result<&Credentials, ClientError> {
        self.config.credentials.as_ref().context(NoCredentialsSnafu)
    }

    /// Submits a use case payload and returns the handle of the created job.
    pub fn submit(&self, endpoint: &str, payload: &Value) -> Result<JobHandle, ClientError> {
        let credentials = self.credentials()?;
        let url = self.config.use_case_url(endpoint);
        let raw = self.transport.post_json(&url, credentials, payload)?;
        let handle: JobHandle =
            serde_json::from_value(raw).context(DecodeSnafu { what: "job handle" })?;
        info!("Submitted {endpoint} as job {} ({})", handle.id, handle.status);
        Ok(handle)
    }

    /// Queries the current state of a job.
    pub fn job(&self, id: &str) -> Result<JobState, ClientError> {
        let credentials = self.credentials()?;
        let raw = self.transport.get_json(&self.config.job_url(id), credentials)?;
        serde_json::from_value(raw).context(DecodeSnafu { what: "job state" })
    }

    /// Blocks until the job reaches a terminal state, and returns its raw results.
    pub fn wait(&self, id: &str) -> Result<Value, ClientError> {
        let start = Instant::now();
        let period = std::time::Duration::from_secs_f64(self.config.poll_period.to_seconds());
        loop {
            let state = self.job(id)?;
            let waited = Unit::Second * start.elapsed().as_secs_f64();
            debug!("Job {id} is {} after {waited}", state.status);
            match state.status {
                JobStatus::Success => {
                    info!("Job {id} succeeded after {waited}");
                    return state.results.context(MissingResultsSnafu { id });
                }
                JobStatus::Failure => {
                    let message = state
                        .error
                        .unwrap_or_else(|| "no error message".to_string());
                    warn!("Job {id} failed after {waited}: {message}");
                    return JobFailedSnafu { id, message }.fail();
                }
                JobStatus::Pending | JobStatus::Running => {
                    if let Some(timeout) = self.config.timeout {
                        if waited >= timeout {
                            warn!("Giving up on job {id} after {waited}");
                            return TimeoutSnafu { id, waited }.fail();
                        }
                    }
                    std::thread::sleep(period);
                }
            }
        }
    }

    /// Submits the payload to the endpoint and blocks until the raw results are available.
    pub fn run_raw(&self, endpoint: &str, payload: &Value) -> Result<Value, ClientError> {
        let handle = self.submit(endpoint, payload)?;
        self.wait(&handle.id)
    }

    /// Runs a use case, see [UseCase::run].
    pub fn run<U: UseCase>(&self, use_case: &U) -> Result<U::Results, FdsError> {
        use_case.run(self)
    }
}

/// A computation of the remote service: a validated request and the typed results it produces.
pub trait UseCase {
    /// Path of the use case, relative to `/api/v1/use-cases/`
    const ENDPOINT: &'static str;

    type Results: DeserializeOwned;

    fn validate(&self) -> Result<(), ValidationError>;

    /// Body of the submission.
    fn payload(&self) -> Result<Value, ClientError>;

    /// Validates the use case, submits it and blocks until its results are available.
    fn run<T: Transport>(&self, client: &FdsClient<T>) -> Result<Self::Results, FdsError> {
        self.validate()?;
        let payload = self.payload()?;
        let raw = client.run_raw(Self::ENDPOINT, &payload)?;
        let results = serde_json::from_value(raw).context(DecodeSnafu {
            what: Self::ENDPOINT,
        })?;
        Ok(results)
    }
}

/// Assembles the body common to all use cases.
pub(crate) fn use_case_payload<C, R>(
    initial_state: &OrbitalState,
    configuration: &C,
    requests: &R,
) -> Result<Value, ClientError>
where
    C: serde::Serialize + ?Sized,
    R: serde::Serialize + ?Sized,
{
    let mut body = Map::new();
    body.insert(
        "initial_state".to_string(),
        serde_json::to_value(initial_state).context(PayloadSnafu)?,
    );
    body.insert(
        "configuration".to_string(),
        serde_json::to_value(configuration).context(PayloadSnafu)?,
    );
    body.insert(
        "requests".to_string(),
        serde_json::to_value(requests).context(PayloadSnafu)?,
    );
    Ok(Value::Object(body))
}

#[cfg(test)]
mod ut_client {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned answers and records the requested URLs.
    struct Replay {
        answers: RefCell<VecDeque<Value>>,
        urls: RefCell<Vec<String>>,
    }

    impl Replay {
        fn new(answers: Vec<Value>) -> Self {
            Self {
                answers: RefCell::new(answers.into()),
                urls: RefCell::new(Vec::new()),
            }
        }

        fn next(&self, url: &str) -> Result<Value, ClientError> {
            self.urls.borrow_mut().push(url.to_string());
            self.answers
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| ClientError::Unreachable {
                    url: url.to_string(),
                    message: "no more answers".to_string(),
                })
        }
    }

    impl Transport for Replay {
        fn post_json(&self, url: &str, _: &Credentials, _: &Value) -> Result<Value, ClientError> {
            self.next(url)
        }

        fn get_json(&self, url: &str, _: &Credentials) -> Result<Value, ClientError> {
            self.next(url)
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::builder()
            .base_url("http://fds.test")
            .credentials(Credentials::api_key("key"))
            .poll_period(Unit::Millisecond * 1.0)
            .build()
            .unwrap()
    }

    #[test]
    fn polls_until_success() {
        let replay = Replay::new(vec![
            json!({"id": "7", "status": "PENDING"}),
            json!({"status": "PENDING"}),
            json!({"status": "RUNNING"}),
            json!({"status": "SUCCESS", "results": {"answer": 42}}),
        ]);
        let client = FdsClient::with_transport(config(), replay).unwrap();
        let results = client.run_raw("orbit-extrapolation", &json!({})).unwrap();
        assert_eq!(results["answer"], 42);

        let urls = client.transport().urls.borrow();
        assert_eq!(urls[0], "http://fds.test/api/v1/use-cases/orbit-extrapolation");
        assert!(urls[1..].iter().all(|url| url == "http://fds.test/api/v1/jobs/7"));
    }

    #[test]
    fn failures() {
        let replay = Replay::new(vec![
            json!({"id": "8", "status": "PENDING"}),
            json!({"status": "FAILURE", "error": "diverged"}),
        ]);
        let client = FdsClient::with_transport(config(), replay).unwrap();
        match client.run_raw("orbit-determination", &json!({})) {
            Err(ClientError::JobFailed { id, message }) => {
                assert_eq!(id, "8");
                assert_eq!(message, "diverged");
            }
            other => panic!("expected a job failure, got {other:?}"),
        }

        let replay = Replay::new(vec![
            json!({"id": "9", "status": "PENDING"}),
            json!({"status": "SUCCESS"}),
        ]);
        let client = FdsClient::with_transport(config(), replay).unwrap();
        assert!(matches!(
            client.run_raw("event-prediction", &json!({})),
            Err(ClientError::MissingResults { .. })
        ));

        let replay = Replay::new(vec![json!({"identifier": "9"})]);
        let client = FdsClient::with_transport(config(), replay).unwrap();
        assert!(matches!(
            client.run_raw("event-prediction", &json!({})),
            Err(ClientError::Decode {
                what: "job handle",
                ..
            })
        ));
    }

    #[test]
    fn credentials_are_checked_first() {
        let cfg = ClientConfig::builder()
            .base_url("http://fds.test")
            .build()
            .unwrap();
        let client = FdsClient::with_transport(cfg, Replay::new(vec![])).unwrap();
        assert!(matches!(
            client.run_raw("orbit-extrapolation", &json!({})),
            Err(ClientError::NoCredentials)
        ));
        assert!(client.transport().urls.borrow().is_empty());
    }

    #[test]
    fn http_client_bounds_each_request() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let cfg = ClientConfig::builder()
            .base_url(format!("http://{}", listener.local_addr().unwrap()))
            .credentials(Credentials::api_key("key"))
            .request_timeout(Unit::Millisecond * 200.0)
            .build()
            .unwrap();
        let client = FdsClient::new(cfg).unwrap();
        assert!(matches!(
            client.run_raw("orbit-extrapolation", &json!({})),
            Err(ClientError::Unreachable { .. })
        ));
        drop(listener);
    }

    #[test]
    fn status_names() {
        assert!(JobStatus::Success.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!("DONE".parse::<JobStatus>().is_err());
    }
}
