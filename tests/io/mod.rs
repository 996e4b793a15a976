use crate::{init_logger, test_data};
use spacetower::cosmic::Orbit;
use spacetower::dynamics::{AtmosphericModel, Perturbation};
use spacetower::io::ccsds::Oem;
use spacetower::io::mission::{Mission, MissionConfig};
use spacetower::io::{ConfigRepr, Configurable};
use spacetower::md::{ControlledElement, ThrustArcNumber};
use spacetower::results::Cell;
use spacetower::time::Unit;
use std::fs;

#[test]
fn mission_template() {
    init_logger();

    let mission = Mission::from_yaml(test_data("mission.yaml")).unwrap();
    let state = &mission.initial_state;
    assert!(matches!(state.orbit, Orbit::Tle(_)));
    assert!(state.spacecraft.is_box());
    assert!(state.covariance.is_none());

    let ctx = &state.propagation_context;
    assert!(ctx.has(Perturbation::ThirdBodyMoon));
    assert_eq!(ctx.earth_potential_degree, 8);
    assert_eq!(ctx.atmospheric_model, AtmosphericModel::Nrlmsise00);
    assert_eq!(ctx.max_step, Unit::Minute * 2.0);

    assert!(mission.maneuver_strategy.is_none());
    let sk = mission.station_keeping.as_ref().unwrap();
    assert_eq!(sk.maneuver_strategy.arc_number, ThrustArcNumber::Two);
    assert_eq!(sk.maneuver_strategy.arc_duration, Some(Unit::Minute * 10.0));
    assert_eq!(sk.max_duration, Unit::Day * 30.0);
    assert!(sk.tolerance(ControlledElement::Sma).unwrap().contains(6790.4));
}

#[test]
fn mission_template_round_trip() {
    let mission = Mission::from_yaml(test_data("mission.yaml")).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mission.yaml");
    fs::write(&path, mission.to_config().dumps().unwrap()).unwrap();

    let reloaded = Mission::from_yaml(&path).unwrap();
    assert_eq!(reloaded, mission);
    assert_eq!(MissionConfig::load(&path).unwrap(), mission.to_config());
}

#[test]
fn oem_file() {
    let oem = Oem::from_path(test_data("LEO_60s.oem")).unwrap();
    assert_eq!(oem.object_name.as_deref(), Some("CUBESAT-6U"));
    assert_eq!(oem.ref_frame.as_deref(), Some("EME2000"));
    assert_eq!(oem.states.len(), 6);
    let step = oem.states[1].epoch - oem.states[0].epoch;
    assert_eq!(step, Unit::Minute * 1.0);

    assert!(Oem::from_path(test_data("missing.oem")).is_err());
}

#[test]
fn csv_export() {
    let oem = Oem::from_path(test_data("LEO_60s.oem")).unwrap();
    let table = spacetower::results::Table::from_rows(&oem.states);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("states.csv");
    table.to_csv_path(&path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        ["Date", "X", "Y", "Z", "VX", "VY", "VZ"]
    );
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), table.row_count());
    assert_eq!(&records[0][0], "2024-05-21T08:24:02.699Z");
    assert_eq!(records[0][1].parse::<f64>().unwrap(), 6778.137);

    if let Cell::Date(epoch) = table.rows()[5][0] {
        assert_eq!(epoch - oem.states[0].epoch, Unit::Minute * 5.0);
    } else {
        panic!("first column holds the dates");
    }
}
