use approx::assert_abs_diff_eq;
use keplerkit::constants::G;
use keplerkit::gnc::guidance::{plan_circularize, plan_hohmann, plan_lambert};
use keplerkit::physics::energy::specific_energy;
use keplerkit::{GravityConfig, OrbitalEngine};
use nalgebra as na;

const M_EARTH: f64 = 5.972e24; // kg

fn engine() -> (OrbitalEngine, keplerkit::BodyId) {
    let mut engine = OrbitalEngine::with_config(GravityConfig {
        softening: 1e-3,
        substep: 0.25,
    });
    let earth = engine.register_body(M_EARTH, na::Vector3::zeros(), na::Vector3::zeros());
    (engine, earth)
}

fn circular_body(
    engine: &mut OrbitalEngine,
    r: f64,
    angle: f64,
) -> keplerkit::BodyId {
    let v = (G * M_EARTH / r).sqrt();
    engine.register_body(
        0.0,
        na::Vector3::new(r * angle.cos(), r * angle.sin(), 0.0),
        na::Vector3::new(-v * angle.sin(), v * angle.cos(), 0.0),
    )
}

// Full rendezvous flight: plan a Hohmann transfer with a phasing wait,
// schedule it, and propagate the whole engine through both burns.
#[test]
fn hohmann_rendezvous_flight() {
    let (mut engine, earth) = engine();
    let r_chaser = 6.771e6;
    let r_target = 7.371e6;
    let chaser = circular_body(&mut engine, r_chaser, 0.0);
    let target = circular_body(&mut engine, r_target, 1.0);

    let from = engine.orbit_elements(chaser, earth).unwrap();
    let to = engine.orbit_elements(target, earth).unwrap();
    let plan = plan_hohmann(chaser, &from, &to, engine.time(), true).unwrap();

    let flight_time = plan.total_time;
    let total_dv = plan.total_delta_v;
    engine.schedule_plan(plan).unwrap();

    let mut remaining = flight_time + 0.5;
    while remaining > 0.0 {
        let dt = remaining.min(60.0);
        engine.advance(dt);
        remaining -= dt;
    }
    assert_eq!(engine.pending_maneuvers(), 0);

    // Chaser has circularized at the target radius...
    let arrived = engine.orbit_elements(chaser, earth).unwrap();
    assert_abs_diff_eq!(arrived.a, r_target, epsilon = r_target * 5e-3);
    assert!(arrived.e < 5e-3, "arrival orbit eccentricity {}", arrived.e);

    // ...right next to the target, with a sane delta-v bill
    let separation = (engine.position(target).unwrap() - engine.position(chaser).unwrap())
        .magnitude();
    assert!(
        separation < 2.0e4,
        "rendezvous separation {separation} m is too large"
    );
    let v_chaser = (G * M_EARTH / r_chaser).sqrt();
    assert!(total_dv > 0.0 && total_dv < 0.1 * v_chaser);
}

// Lambert intercept flight: burn onto the connecting orbit and check the
// body actually passes through the aim point at the requested time.
#[test]
fn lambert_intercept_flight() {
    let (mut engine, _earth) = engine();
    let r1 = 7.0e6;
    let probe = circular_body(&mut engine, r1, 0.0);

    let aim = na::Vector3::new(0.0, 9.0e6, 0.0);
    let transfer_time = 2000.0;
    let (position, velocity) = engine.state(probe).unwrap();
    let plan = plan_lambert(
        probe,
        &position,
        &velocity,
        &aim,
        None,
        transfer_time,
        G * M_EARTH,
        engine.time(),
        true,
    )
    .unwrap();
    engine.schedule_plan(plan).unwrap();

    engine.advance(transfer_time);

    let miss = (engine.position(probe).unwrap() - aim).magnitude();
    assert!(miss < 1.0e4, "missed the aim point by {miss} m");
}

// Circularize from an eccentric state, then verify the orbit stays round by
// propagating it for a revolution and watching the radius and energy.
#[test]
fn circularize_and_conserve() {
    let (mut engine, earth) = engine();
    let r = 7.0e6;
    let v_circ = (G * M_EARTH / r).sqrt();
    let probe = engine.register_body(
        0.0,
        na::Vector3::new(r, 0.0, 0.0),
        na::Vector3::new(0.0, 1.15 * v_circ, 0.0),
    );

    let (position, velocity) = engine.state(probe).unwrap();
    let plan = plan_circularize(probe, &position, &velocity, M_EARTH, engine.time()).unwrap();
    engine.schedule_plan(plan).unwrap();
    engine.advance(1.0);

    let elements = engine.orbit_elements(probe, earth).unwrap();
    assert!(elements.is_circular());

    let (p0, v0) = engine.state(probe).unwrap();
    let energy0 = specific_energy(&p0, &v0, G * M_EARTH);
    let period = elements.period();
    let mut remaining = period;
    while remaining > 0.0 {
        let dt = remaining.min(60.0);
        engine.advance(dt);
        remaining -= dt;
    }

    let (p1, v1) = engine.state(probe).unwrap();
    assert_abs_diff_eq!(p1.magnitude(), r, epsilon = r * 1e-3);
    let energy1 = specific_energy(&p1, &v1, G * M_EARTH);
    assert_abs_diff_eq!(energy1, energy0, epsilon = energy0.abs() * 1e-6);
}
