use crate::{box_state, init_logger, mock_client, sphere_state, MockTransport};
use rstest::*;
use serde_json::json;
use spacetower::client::UseCase;
use spacetower::od::prelude::*;
use spacetower::results::ResultError;
use spacetower::{FdsError, ValidationError};

/// NMEA fix dates, one every three seconds.
fn nmea_dates(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("2024-05-21T08:30:{:02}Z", i * 3))
        .collect()
}

fn nmea_rows() -> Vec<[f64; 5]> {
    (0..15)
        .map(|i| {
            let i = f64::from(i);
            [43.6 + 0.5 * i, 1.44 + 0.1 * i, 7.66, 415.2 + 0.01 * i, 49.1]
        })
        .collect()
}

const NMEA_STDS: [f64; 5] = [1e-4, 1e-4, 1e-3, 0.01, 0.01];

#[fixture]
fn telemetry() -> Telemetry {
    Telemetry::nmea(&nmea_dates(15), &nmea_rows(), NMEA_STDS).unwrap()
}

#[rstest]
fn nmea_batch(telemetry: Telemetry) {
    assert_eq!(telemetry.len(), 15);
    assert_eq!(telemetry.kind(), TelemetryKind::Nmea);
    let table = telemetry.to_table();
    assert_eq!(table.row_count(), 15);
}

#[test]
fn nmea_length_mismatch() {
    let fourteen = nmea_dates(14);
    assert!(matches!(
        Telemetry::nmea(&fourteen, &nmea_rows(), NMEA_STDS),
        Err(ValidationError::LengthMismatch {
            expected: 15,
            got: 14,
            ..
        })
    ));
}

fn od_results() -> serde_json::Value {
    json!({
        "report": {
            "estimated_states": [
                {
                    "keplerian_elements": {
                        "epoch": "2024-05-21T08:30:00Z", "sma_km": 6790.1, "ecc": 3.4e-4, "inc_deg": 51.64,
                        "raan_deg": 88.35, "aop_deg": 266.6, "anomaly_deg": 200.1, "anomaly_kind": "TRUE",
                        "frame": "GCRF", "kind": "OSCULATING"
                    },
                    "covariance_sigmas": [0.1, 0.1, 0.1, 1e-4, 1e-4, 1e-4]
                },
                {
                    "keplerian_elements": {
                        "epoch": "2024-05-21T08:30:42Z", "sma_km": 6790.2, "ecc": 3.5e-4, "inc_deg": 51.64,
                        "raan_deg": 88.35, "aop_deg": 266.6, "anomaly_deg": 202.7, "anomaly_kind": "TRUE",
                        "frame": "GCRF", "kind": "OSCULATING"
                    },
                    "covariance_sigmas": [0.05, 0.05, 0.05, 5e-5, 5e-5, 5e-5]
                }
            ]
        },
        "statistics": {
            "residuals": [
                {"parameter": "LATITUDE", "mean": 1e-5, "median": 0.0, "std": 1e-4, "max": 3e-4, "min": -2e-4}
            ]
        }
    })
}

#[rstest]
fn run_orbit_determination(telemetry: Telemetry) {
    init_logger();

    let od = OrbitDetermination::builder()
        .initial_state(box_state())
        .telemetry(telemetry)
        .build()
        .unwrap();

    let client = mock_client(MockTransport::succeeding(od_results()));
    let results = od.run(&client).unwrap();

    let kep = results.estimated_keplerian_elements().unwrap();
    assert_eq!(kep.row_count(), 2);
    assert_eq!(kep.column_f64("SMA").unwrap(), vec![6790.1, 6790.2]);
    assert_eq!(results.last_estimated_state().unwrap().anomaly_deg, 202.7);
    assert_eq!(results.residual_statistics().unwrap().row_count(), 1);

    // In depth results were not requested
    assert!(matches!(
        results.residuals(),
        Err(ResultError::NotRequested { .. })
    ));

    let submissions = client.transport().submissions.borrow();
    assert_eq!(submissions.len(), 1);
    let (url, body) = &submissions[0];
    assert_eq!(url, "https://fds.test/api/v1/use-cases/orbit-determination");
    assert_eq!(body["configuration"]["telemetry"]["kind"], "NMEA");
    assert_eq!(body["configuration"]["parameters"]["ukf"]["alpha"], 1e-3);
    assert_eq!(body["requests"]["estimated_states"], true);
    assert_eq!(body["initial_state"]["orbit"]["type"], "TLE");
}

#[rstest]
fn invalid_orbit_determination(telemetry: Telemetry) {
    // The sphere state has no covariance
    let od = OrbitDetermination::builder()
        .initial_state(sphere_state())
        .telemetry(telemetry.clone())
        .build();
    assert!(matches!(
        od,
        Err(ValidationError::MissingParameter {
            param: "covariance",
            ..
        })
    ));

    let config = OrbitDeterminationConfig {
        estimated_parameters: [EstimatedParameter::Srp].into(),
        ..Default::default()
    };
    let od = OrbitDetermination::builder()
        .initial_state(box_state())
        .telemetry(telemetry)
        .config(config)
        .build();
    assert!(matches!(od, Err(ValidationError::Inconsistent { .. })));
}

#[rstest]
fn remote_failure(telemetry: Telemetry) {
    let od = OrbitDetermination::builder()
        .initial_state(box_state())
        .telemetry(telemetry)
        .build()
        .unwrap();
    let client = mock_client(MockTransport::failing("filter diverged"));
    match od.run(&client) {
        Err(FdsError::Client { source }) => {
            assert!(source.to_string().contains("filter diverged"), "{source}")
        }
        other => panic!("expected a client error, got {other:?}"),
    }
    assert_eq!(client.transport().polls(), 2);
}
