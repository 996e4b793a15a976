extern crate spacetower;

mod client;
mod cosmic;
mod io;
mod mission_design;
mod orbit_determination;

use serde_json::{json, Value};
use spacetower::client::{ClientConfig, ClientError, Credentials, FdsClient, Transport};
use spacetower::cosmic::{
    Battery, BoxSpacecraft, CovarianceMatrix, Frame, KeplerianElements, OrbitalState,
    SolarArray, SphereSpacecraft, Thruster, TwoLineElement,
};
use spacetower::dynamics::{Perturbation, PropagationContext};
use spacetower::time::{Epoch, Unit};
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::path::PathBuf;

pub const ISS_L1: &str = "1 25544U 98067A   24142.35003124  .00022843  00000+0  39169-3 0  9990";
pub const ISS_L2: &str = "2 25544  51.6390  88.3709 0003456 266.5973 195.8467 15.51543345454084";

pub fn init_logger() {
    if pretty_env_logger::try_init().is_err() {
        println!("could not init env_logger");
    }
}

pub fn test_data(name: &str) -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "data", "tests", name]
        .iter()
        .collect()
}

pub fn epoch() -> Epoch {
    Epoch::from_gregorian_utc_hms(2024, 5, 21, 8, 24, 0)
}

pub fn iss() -> TwoLineElement {
    TwoLineElement::new(ISS_L1, ISS_L2).unwrap()
}

/// A 12 kg sphere on a sun synchronous orbit, without covariance.
pub fn sphere_state() -> OrbitalState {
    let orbit = KeplerianElements::new(epoch(), 6878.137, 1e-3, 97.5, 10.0, 90.0, 0.0).unwrap();
    let sphere = SphereSpacecraft::builder()
        .mass_kg(12.0)
        .cross_section_m2(0.06)
        .build()
        .unwrap();
    OrbitalState::builder()
        .orbit(orbit.into())
        .spacecraft(sphere.into())
        .propagation_context(PropagationContext::builder().build().unwrap())
        .build()
        .unwrap()
}

/// A 6U cubesat with an electric thruster, drag enabled, and an initial covariance.
pub fn box_state() -> OrbitalState {
    let thruster = Thruster::builder()
        .isp_s(800.0)
        .thrust_N(0.35e-3)
        .thrust_power_W(20.0)
        .propellant_mass_kg(0.4)
        .build()
        .unwrap();
    let cubesat = BoxSpacecraft::builder()
        .mass_kg(12.0)
        .dimensions_m([0.1, 0.2, 0.3])
        .battery(Battery::builder().nominal_capacity_wh(80.0).build().unwrap())
        .thruster(thruster)
        .solar_array(SolarArray::builder().surface_m2(0.12).build().unwrap())
        .build()
        .unwrap();
    let context = PropagationContext::builder()
        .perturbations(BTreeSet::from([
            Perturbation::EarthPotential,
            Perturbation::Drag,
        ]))
        .build()
        .unwrap();
    OrbitalState::builder()
        .orbit(iss().into())
        .spacecraft(cubesat.into())
        .propagation_context(context)
        .covariance(
            CovarianceMatrix::from_standard_deviations([1.0, 1.0, 1.0, 1e-3, 1e-3, 1e-3], Frame::Tnw)
                .unwrap(),
        )
        .build()
        .unwrap()
}

/// Plays a remote service which accepts every submission, reports it running once, then ends it with the
/// provided job state.
pub struct MockTransport {
    outcome: Value,
    polls: Cell<usize>,
    pub submissions: RefCell<Vec<(String, Value)>>,
}

impl MockTransport {
    pub fn succeeding(results: Value) -> Self {
        Self::ending_with(json!({"status": "SUCCESS", "results": results}))
    }

    pub fn failing(message: &str) -> Self {
        Self::ending_with(json!({"status": "FAILURE", "error": message}))
    }

    fn ending_with(outcome: Value) -> Self {
        Self {
            outcome,
            polls: Cell::new(0),
            submissions: RefCell::new(Vec::new()),
        }
    }

    pub fn polls(&self) -> usize {
        self.polls.get()
    }
}

impl Transport for MockTransport {
    fn post_json(
        &self,
        url: &str,
        _credentials: &Credentials,
        body: &Value,
    ) -> Result<Value, ClientError> {
        self.submissions
            .borrow_mut()
            .push((url.to_string(), body.clone()));
        Ok(json!({"id": "job-1", "status": "PENDING"}))
    }

    fn get_json(&self, _url: &str, _credentials: &Credentials) -> Result<Value, ClientError> {
        self.polls.set(self.polls.get() + 1);
        if self.polls.get() == 1 {
            Ok(json!({"status": "RUNNING"}))
        } else {
            Ok(self.outcome.clone())
        }
    }
}

pub fn mock_client(transport: MockTransport) -> FdsClient<MockTransport> {
    let config = ClientConfig::builder()
        .base_url("https://fds.test")
        .credentials(Credentials::api_key("test-key"))
        .poll_period(Unit::Millisecond * 1.0)
        .build()
        .unwrap();
    FdsClient::with_transport(config, transport).unwrap()
}
