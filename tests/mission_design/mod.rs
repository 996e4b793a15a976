use crate::{box_state, epoch, init_logger, mock_client, sphere_state, test_data, MockTransport};
use rstest::*;
use serde_json::{json, Value};
use spacetower::client::UseCase;
use spacetower::cosmic::{Frame, KeplerianElements};
use spacetower::md::prelude::*;
use spacetower::od::GroundStation;
use spacetower::results::ResultError;
use spacetower::ValidationError;
use std::collections::BTreeSet;

mod strategies;

/// Keplerian ephemerides as the remote service would output them.
fn keplerian_rows(duration: Duration, step: Duration) -> Value {
    let mut rows = Vec::new();
    let mut date = epoch();
    while date <= epoch() + duration {
        let kep = KeplerianElements::new(date, 6878.137, 1e-3, 97.5, 10.0, 90.0, 0.0).unwrap();
        rows.push(serde_json::to_value(kep).unwrap());
        date = date + step;
    }
    Value::Array(rows)
}

#[test]
fn extrapolated_ephemerides_fit_the_request() {
    init_logger();

    let duration = Unit::Day * 1.0;
    let step = Unit::Minute * 10.0;
    let extrapolation = OrbitExtrapolation::builder()
        .initial_state(sphere_state())
        .duration(duration)
        .ephemerides(EphemeridesRequest::keplerian(step).unwrap())
        .build()
        .unwrap();
    assert_eq!(extrapolation.expected_rows(), Some(145));

    let client = mock_client(MockTransport::succeeding(json!({
        "ephemerides": {"keplerian": keplerian_rows(duration, step)}
    })));
    let results = extrapolation.run(&client).unwrap();

    let table = results.keplerian_ephemerides().unwrap();
    assert_eq!(Some(table.row_count()), extrapolation.expected_rows());
    assert_eq!(
        table.columns(),
        ["Date", "SMA", "ECC", "INC", "RAAN", "AOP", "TA"]
    );
    let dates = table.column_epochs("Date").unwrap();
    assert_eq!(dates[144] - dates[0], duration);

    // The attitude and power system simulation was not requested
    assert!(matches!(
        results.power_system_ephemerides(),
        Err(ResultError::NotRequested { .. })
    ));
    assert!(results.events().is_err());

    let submissions = client.transport().submissions.borrow();
    let body = &submissions[0].1;
    assert_eq!(body["configuration"]["duration_s"], 86400.0);
    assert_eq!(body["configuration"]["simulate_attitude_and_power_system"], false);
    assert_eq!(body["requests"]["ephemerides"]["kinds"][0], "KEPLERIAN");
    assert!(body["requests"].get("oem").is_none());
}

#[test]
fn power_system_needs_the_simulation() {
    let request = EphemeridesRequest::keplerian(Unit::Minute * 1.0)
        .unwrap()
        .with(EphemerisKind::PowerSystem);

    let without = OrbitExtrapolation::builder()
        .initial_state(box_state())
        .duration(Unit::Hour * 3.0)
        .ephemerides(request.clone())
        .build();
    assert!(matches!(without, Err(ValidationError::Inconsistent { .. })));

    let sphere = OrbitExtrapolation::builder()
        .initial_state(sphere_state())
        .duration(Unit::Hour * 3.0)
        .ephemerides(request.clone())
        .simulate_attitude_and_power_system(true)
        .build();
    assert!(matches!(sphere, Err(ValidationError::Inconsistent { .. })));

    assert!(OrbitExtrapolation::builder()
        .initial_state(box_state())
        .duration(Unit::Hour * 3.0)
        .ephemerides(request)
        .simulate_attitude_and_power_system(true)
        .build()
        .is_ok());

    let nothing = OrbitExtrapolation::builder()
        .initial_state(box_state())
        .duration(Unit::Hour * 3.0)
        .build();
    assert!(matches!(
        nothing,
        Err(ValidationError::MissingParameter { .. })
    ));
}

#[test]
fn oem_pass_through() {
    let oem = std::fs::read_to_string(test_data("LEO_60s.oem")).unwrap();
    let extrapolation = OrbitExtrapolation::builder()
        .initial_state(box_state())
        .duration(Unit::Minute * 5.0)
        .oem(OemRequest::new(Frame::Eme2000).unwrap().with_covariance())
        .build()
        .unwrap();

    let client = mock_client(MockTransport::succeeding(json!({ "oem": oem })));
    let results = extrapolation.run(&client).unwrap();

    assert!(results.oem().unwrap().starts_with("CCSDS_OEM_VERS"));
    let states = results.oem_states().unwrap();
    assert_eq!(states.row_count(), 6);
    assert_eq!(states.column_f64("X").unwrap()[0], 6778.137);
    assert!(results.cartesian_ephemerides().is_err());

    // Writing the covariance needs one
    assert!(OrbitExtrapolation::builder()
        .initial_state(sphere_state())
        .duration(Unit::Minute * 5.0)
        .oem(OemRequest::new(Frame::Eme2000).unwrap().with_covariance())
        .build()
        .is_err());
}

#[fixture]
fn strategy() -> ManeuverStrategy {
    ManeuverStrategy::builder()
        .arc_position(ThrustArcPosition::AscendingAndDescendingNodes)
        .arc_number(ThrustArcNumber::Two)
        .initialisation(ThrustArcInitialisationKind::DutyCycle)
        .duty_cycle(0.2)
        .build()
        .unwrap()
}

fn roadmap() -> Value {
    json!([
        {"start": "2024-05-21T09:00:00Z", "end": "2024-05-21T09:05:00Z", "action": "WARM_UP"},
        {"start": "2024-05-21T09:05:00Z", "end": "2024-05-21T09:23:00Z", "action": "THRUST", "delta_v_m_s": 0.031},
        {"start": "2024-05-21T09:23:00Z", "end": "2024-05-21T09:41:00Z", "action": "STANDBY"},
        {"start": "2024-05-21T09:41:00Z", "end": "2024-05-21T09:59:00Z", "action": "THRUST", "delta_v_m_s": 0.031}
    ])
}

#[rstest]
fn maneuver_generation(strategy: ManeuverStrategy) {
    let generation = ManeuverGeneration::builder()
        .initial_state(box_state())
        .strategy(strategy)
        .target(KeplerianTarget::sma(6800.0).unwrap())
        .build()
        .unwrap();

    let client = mock_client(MockTransport::succeeding(json!({ "roadmap": roadmap() })));
    let results = generation.run(&client).unwrap();
    assert_eq!(results.thrust_count(), 2);
    assert!((results.total_delta_v() - 0.062).abs() < 1e-12);
    assert_eq!(results.roadmap().row_count(), 4);
    assert!(matches!(
        results.keplerian_ephemerides(),
        Err(ResultError::NotRequested { .. })
    ));

    let submissions = client.transport().submissions.borrow();
    let body = &submissions[0].1;
    assert_eq!(
        body["configuration"]["strategy"]["arc_position"],
        "ASCENDING_AND_DESCENDING_NODES"
    );
    assert_eq!(body["configuration"]["target"]["sma_km"], 6800.0);

    // A sphere cannot maneuver
    assert!(ManeuverGeneration::builder()
        .initial_state(sphere_state())
        .strategy(strategy)
        .target(KeplerianTarget::sma(6800.0).unwrap())
        .build()
        .is_err());
}

#[rstest]
fn station_keeping(strategy: ManeuverStrategy) {
    let sk = StationKeepingStrategy::builder()
        .maneuver_strategy(strategy)
        .control(vec![
            KeplerianTolerance::new(ControlledElement::Sma, 6790.0, 0.5).unwrap(),
        ])
        .max_duration(Unit::Day * 7.0)
        .build()
        .unwrap();
    let keeping = LeoStationKeeping::builder()
        .initial_state(box_state())
        .strategy(sk)
        .ephemerides(EphemeridesRequest::keplerian(Unit::Hour * 1.0).unwrap())
        .build()
        .unwrap();

    let client = mock_client(MockTransport::succeeding(json!({
        "roadmap": roadmap(),
        "ephemerides": {"keplerian": keplerian_rows(Unit::Hour * 2.0, Unit::Hour * 1.0)}
    })));
    let results = keeping.run(&client).unwrap();

    let stats = results.statistics();
    assert_eq!(stats.maneuver_count, 2);
    assert_eq!(stats.total_thrust_duration, Unit::Minute * 36.0);
    assert_eq!(results.keplerian_ephemerides().unwrap().row_count(), 3);
}

#[rstest]
fn only_extrapolations_simulate_the_power_system(strategy: ManeuverStrategy) {
    let power_and_attitude = EphemeridesRequest::new(
        BTreeSet::from([EphemerisKind::PowerSystem, EphemerisKind::Attitude]),
        Unit::Minute * 1.0,
    )
    .unwrap();

    let generation = ManeuverGeneration::builder()
        .initial_state(box_state())
        .strategy(strategy)
        .target(KeplerianTarget::sma(6800.0).unwrap())
        .ephemerides(power_and_attitude.clone())
        .build();
    assert!(matches!(
        generation,
        Err(ValidationError::Inconsistent { .. })
    ));

    let sk = StationKeepingStrategy::builder()
        .maneuver_strategy(strategy)
        .control(vec![
            KeplerianTolerance::new(ControlledElement::Sma, 6790.0, 0.5).unwrap(),
        ])
        .max_duration(Unit::Day * 7.0)
        .build()
        .unwrap();
    let keeping = LeoStationKeeping::builder()
        .initial_state(box_state())
        .strategy(sk)
        .ephemerides(power_and_attitude)
        .build();
    assert!(matches!(keeping, Err(ValidationError::Inconsistent { .. })));

    // Orbital channels remain available to both
    assert!(ManeuverGeneration::builder()
        .initial_state(box_state())
        .strategy(strategy)
        .target(KeplerianTarget::sma(6800.0).unwrap())
        .ephemerides(
            EphemeridesRequest::keplerian(Unit::Minute * 1.0)
                .unwrap()
                .with(EphemerisKind::Propulsion)
        )
        .build()
        .is_ok());
}

#[test]
fn event_prediction() {
    let events = EventsRequest::station_visibility(vec![GroundStation::toulouse()])
        .unwrap()
        .with_station(GroundStation::kiruna())
        .unwrap();
    let prediction = EventPrediction::builder()
        .initial_state(sphere_state())
        .duration(Unit::Hour * 6.0)
        .events(events)
        .build()
        .unwrap();

    let client = mock_client(MockTransport::succeeding(json!({
        "events": [
            {"date": "2024-05-21T09:02:10Z", "event": "AOS", "details": "TOULOUSE"},
            {"date": "2024-05-21T09:11:45Z", "event": "LOS", "details": "TOULOUSE"},
            {"date": "2024-05-21T10:31:02Z", "event": "AOS", "details": "KIRUNA"}
        ]
    })));
    let results = prediction.run(&client).unwrap();
    assert_eq!(results.count("AOS"), 2);

    let table = results.events().unwrap();
    assert_eq!(table.row_count(), 3);
    let details: Vec<String> = table
        .column("Details")
        .unwrap()
        .iter()
        .map(|cell| cell.to_string())
        .collect();
    assert_eq!(details, ["TOULOUSE", "TOULOUSE", "KIRUNA"]);

    let submissions = client.transport().submissions.borrow();
    let body = &submissions[0].1;
    assert_eq!(body["requests"]["events"]["stations"][1]["name"], "Kiruna");

    assert!(EventPrediction::builder()
        .initial_state(sphere_state())
        .duration(Unit::Hour * -6.0)
        .events(EventsRequest::new(BTreeSet::from([EventKind::Eclipse])).unwrap())
        .build()
        .is_err());
}
