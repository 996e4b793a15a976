use crate::{box_state, iss, sphere_state, ISS_L1, ISS_L2};
use rstest::*;
use spacetower::cosmic::{CovarianceMatrix, Frame, KeplerianElements, Orbit, TwoLineElement};
use spacetower::dynamics::{AtmosphericModel, IntegratorKind, Perturbation};
use spacetower::md::{ThrustArcInitialisationKind, ThrustArcNumber, ThrustArcPosition};
use spacetower::ValidationError;
use std::str::FromStr;

fn rejects<T>(value: &str) -> bool
where
    T: FromStr<Err = ValidationError>,
{
    matches!(
        value.parse::<T>(),
        Err(ValidationError::UnknownOption { .. })
    )
}

#[rstest]
#[case("MAGNETIC_TORQUE")]
#[case("drag")]
#[case("")]
#[case("THIRD_BODY_JUPITER")]
fn closed_sets_reject_unknown_values(#[case] value: &str) {
    assert!(rejects::<Perturbation>(value));
    assert!(rejects::<AtmosphericModel>(value));
    assert!(rejects::<IntegratorKind>(value));
    assert!(rejects::<ThrustArcPosition>(value));
    assert!(rejects::<ThrustArcNumber>(value));
    assert!(rejects::<ThrustArcInitialisationKind>(value));
    assert!(rejects::<Frame>(value));
}

#[test]
fn closed_sets_reject_unknown_values_on_the_wire() {
    let err = serde_json::from_str::<IntegratorKind>("\"EULER\"").unwrap_err();
    assert!(err.to_string().contains("EULER"), "{err}");

    assert_eq!(
        serde_json::from_str::<AtmosphericModel>("\"NRLMSISE00\"").unwrap(),
        AtmosphericModel::Nrlmsise00
    );
}

#[test]
fn diagonal_covariance_round_trip() {
    let diag = [100.0, 100.0, 100.0, 0.1, 0.1, 0.1];
    let covar = CovarianceMatrix::from_diagonal(diag, Frame::Tnw).unwrap();
    assert_eq!(covar.frame(), Frame::Tnw);

    let matrix = covar.matrix();
    for i in 0..6 {
        for j in 0..6 {
            if i == j {
                assert!((matrix[(i, j)] - diag[i]).abs() < f64::EPSILON);
            } else {
                assert_eq!(matrix[(i, j)], 0.0);
            }
        }
    }
}

#[test]
fn same_tle_same_epoch() {
    let first = TwoLineElement::new(ISS_L1, ISS_L2).unwrap();
    let second = TwoLineElement::new(ISS_L1, ISS_L2).unwrap();
    assert_eq!(first.epoch(), second.epoch());
    assert_eq!(Orbit::from(first).frame(), Frame::Teme);
}

#[test]
fn tle_epoch_survives_the_wire() {
    let epoch = iss().epoch();
    let kep = KeplerianElements::new(epoch, 6790.0, 3.4e-4, 51.64, 88.37, 266.6, 195.8).unwrap();

    let json = serde_json::to_string(&kep).unwrap();
    let back: KeplerianElements = serde_json::from_str(&json).unwrap();
    assert_eq!(back.epoch, epoch, "{json}");
    assert_eq!(back, kep);

    let yaml = serde_yaml::to_string(&kep).unwrap();
    let back: KeplerianElements = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back.epoch, epoch, "{yaml}");
}

#[test]
fn orbital_states() {
    let sphere = sphere_state();
    assert!(sphere.spacecraft.thruster().is_none());
    assert_eq!(sphere.frame(), Frame::Gcrf);

    let cubesat = box_state();
    assert_eq!(cubesat.epoch(), iss().epoch());
    assert!(cubesat.covariance.is_some());

    // A copy with another orbit keeps the spacecraft and the context
    let moved = cubesat.with_orbit(sphere.orbit.clone()).unwrap();
    assert_eq!(moved.spacecraft, cubesat.spacecraft);
    assert_eq!(moved.epoch(), sphere.epoch());

    let json = serde_json::to_value(&cubesat).unwrap();
    assert_eq!(json["orbit"]["type"], "TLE");
    assert_eq!(json["spacecraft"]["type"], "BOX");
    assert_eq!(json["propagation_context"]["perturbations"][1], "DRAG");
}
