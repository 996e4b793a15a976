use rstest::*;
use spacetower::cosmic::Battery;
use spacetower::md::prelude::*;
use spacetower::ValidationError;

fn duty_cycle_strategy(duty_cycle: f64) -> Result<ManeuverStrategy, ValidationError> {
    ManeuverStrategy::builder()
        .arc_position(ThrustArcPosition::ApogeeAndPerigee)
        .arc_number(ThrustArcNumber::Two)
        .initialisation(ThrustArcInitialisationKind::Both)
        .duty_cycle(duty_cycle)
        .arc_duration(Unit::Minute * 12.0)
        .build()
}

fn battery(fraction: f64) -> [Result<Battery, ValidationError>; 3] {
    [
        Battery::builder()
            .nominal_capacity_wh(80.0)
            .depth_of_discharge(fraction)
            .build(),
        Battery::builder()
            .nominal_capacity_wh(80.0)
            .minimum_charge_for_firing(fraction)
            .build(),
        Battery::builder()
            .nominal_capacity_wh(80.0)
            .initial_charge(fraction)
            .build(),
    ]
}

#[rstest]
#[case(1e-6)]
#[case(0.25)]
#[case(0.5)]
#[case(0.999_999)]
fn fractions_inside(#[case] fraction: f64) {
    assert!(duty_cycle_strategy(fraction).is_ok());
    for built in battery(fraction) {
        assert!(built.is_ok(), "{fraction}: {built:?}");
    }
}

#[rstest]
#[case(0.0)]
#[case(1.0)]
#[case(-0.5)]
#[case(2.0)]
#[case(f64::INFINITY)]
fn fractions_outside(#[case] fraction: f64) {
    assert!(matches!(
        duty_cycle_strategy(fraction),
        Err(ValidationError::OutOfRange { .. })
    ));
    for built in battery(fraction) {
        assert!(
            matches!(built, Err(ValidationError::OutOfRange { .. })),
            "{fraction}: {built:?}"
        );
    }
}

#[test]
fn strategies_from_wire_names() {
    let strategy: ManeuverStrategy = serde_json::from_str(
        r#"{
            "arc_position": "ASCENDING_AND_DESCENDING_NODES",
            "arc_number": "TWO",
            "initialisation": "DUTY_CYCLE",
            "thrust_orbits": 2,
            "rest_orbits": 1,
            "shift_orbits": 0,
            "duty_cycle": 0.15
        }"#,
    )
    .unwrap();
    strategy.validate().unwrap();
    assert_eq!(strategy.arcs_per_cycle().unwrap(), 4);
    assert_eq!(strategy.cycle_orbits().unwrap(), 3);

    assert!(serde_json::from_str::<ManeuverStrategy>(
        r#"{
            "arc_position": "ASCENDING_AND_DESCENDING",
            "arc_number": "TWO",
            "initialisation": "DUTY_CYCLE",
            "thrust_orbits": 2,
            "rest_orbits": 1,
            "shift_orbits": 0
        }"#,
    )
    .is_err());
}
