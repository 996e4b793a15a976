use crate::{init_logger, mock_client, sphere_state, test_data, MockTransport};
use serde_json::{json, Value};
use spacetower::client::{ClientConfig, ClientError, Credentials, FdsClient, Transport, UseCase};
use spacetower::io::{ConfigError, ConfigRepr};
use spacetower::md::{EphemeridesRequest, OrbitExtrapolation};
use spacetower::time::Unit;
use spacetower::FdsError;

/// A remote service whose jobs never end.
struct Stuck;

impl Transport for Stuck {
    fn post_json(&self, _: &str, _: &Credentials, _: &Value) -> Result<Value, ClientError> {
        Ok(json!({"id": "forever", "status": "PENDING"}))
    }

    fn get_json(&self, _: &str, _: &Credentials) -> Result<Value, ClientError> {
        Ok(json!({"status": "RUNNING"}))
    }
}

fn extrapolation() -> OrbitExtrapolation {
    OrbitExtrapolation::builder()
        .initial_state(sphere_state())
        .duration(Unit::Hour * 1.0)
        .ephemerides(EphemeridesRequest::cartesian(Unit::Minute * 1.0).unwrap())
        .build()
        .unwrap()
}

#[test]
fn config_from_yaml() {
    let cfg = ClientConfig::load(test_data("client.yaml")).unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.poll_period, Unit::Second * 5.0);
    assert_eq!(cfg.timeout, Some(Unit::Hour * 1.0));
    assert_eq!(
        cfg.credentials,
        Some(Credentials::client("mission-analysis", "not-a-real-secret"))
    );
    assert_eq!(
        cfg.job_url("42"),
        "https://fds.example.com/api/v1/jobs/42"
    );

    // Secrets never leak in the logs
    let debug = format!("{cfg:?}");
    assert!(!debug.contains("not-a-real-secret"), "{debug}");

    assert!(matches!(
        ClientConfig::loads("base_url: [not, a, url]"),
        Err(ConfigError::ParseError { .. })
    ));
    assert!(matches!(
        ClientConfig::load(test_data("missing.yaml")),
        Err(ConfigError::ReadError { .. })
    ));
}

#[test]
fn credentials_are_required_before_any_request() {
    let cfg = ClientConfig::builder()
        .base_url("https://fds.test")
        .build()
        .unwrap();
    let client = FdsClient::with_transport(cfg, MockTransport::succeeding(json!({}))).unwrap();

    match extrapolation().run(&client) {
        Err(FdsError::Client {
            source: ClientError::NoCredentials,
        }) => {}
        other => panic!("expected missing credentials, got {other:?}"),
    }
    assert!(client.transport().submissions.borrow().is_empty());
    assert_eq!(client.transport().polls(), 0);
}

#[test]
fn optional_timeout() {
    init_logger();
    let cfg = ClientConfig::builder()
        .base_url("https://fds.test")
        .credentials(Credentials::api_key("test-key"))
        .poll_period(Unit::Millisecond * 5.0)
        .timeout(Unit::Millisecond * 30.0)
        .build()
        .unwrap();
    let client = FdsClient::with_transport(cfg, Stuck).unwrap();
    match client.run(&extrapolation()) {
        Err(FdsError::Client {
            source: ClientError::Timeout { id, waited },
        }) => {
            assert_eq!(id, "forever");
            assert!(waited >= Unit::Millisecond * 30.0);
        }
        other => panic!("expected a timeout, got {other:?}"),
    }
}

#[test]
fn undecodable_results() {
    let client = mock_client(MockTransport::succeeding(json!({
        "ephemerides": {"cartesian": [{"date": "yesterday"}]}
    })));
    assert!(matches!(
        extrapolation().run(&client),
        Err(FdsError::Client {
            source: ClientError::Decode { .. }
        })
    ));
}

#[test]
fn invalid_client_config() {
    assert!(ClientConfig::builder()
        .base_url("ftp://fds.test")
        .build()
        .is_err());
    assert!(ClientConfig::builder()
        .base_url("https://fds.test")
        .poll_period(Unit::Second * 0.0)
        .build()
        .is_err());
    assert!(ClientConfig::builder()
        .base_url("https://fds.test")
        .credentials(Credentials::api_key(" "))
        .build()
        .is_err());
}
