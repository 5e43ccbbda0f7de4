use csv::Writer;
use hifitime::{Duration, Epoch};
use keplerkit::constants::G;
use keplerkit::gnc::guidance::plan_hohmann;
use keplerkit::physics::energy::specific_energy;
use keplerkit::{GravityConfig, OrbitalEngine, OrbitElements};
use nalgebra as na;
use std::error::Error;
use std::fs::{self, File};
use std::path::Path;

const M_EARTH: f64 = 5.972e24; // kg

fn main() -> Result<(), Box<dyn Error>> {
    // LEO chaser, higher target: plan a Hohmann rendezvous and fly it
    let r_chaser = 6.771e6; // 400 km altitude (m)
    let r_target = 7.371e6; // 1000 km altitude (m)
    let mu = G * M_EARTH;

    let mut engine = OrbitalEngine::with_config(GravityConfig {
        softening: 1e-3,
        substep: 0.25,
    });
    let earth = engine.register_body(M_EARTH, na::Vector3::zeros(), na::Vector3::zeros());

    let v_chaser = (mu / r_chaser).sqrt();
    let chaser = engine.register_body(
        0.0,
        na::Vector3::new(r_chaser, 0.0, 0.0),
        na::Vector3::new(0.0, v_chaser, 0.0),
    );

    // Target leads the chaser by a quarter turn
    let v_target = (mu / r_target).sqrt();
    let target = engine.register_body(
        0.0,
        na::Vector3::new(0.0, r_target, 0.0),
        na::Vector3::new(-v_target, 0.0, 0.0),
    );

    let chaser_orbit = engine.orbit_elements(chaser, earth)?;
    let target_orbit = engine.orbit_elements(target, earth)?;

    let plan = plan_hohmann(chaser, &chaser_orbit, &target_orbit, engine.time(), true)?;
    let summary = plan.summary();
    println!(
        "{} plan: {} burns, total delta-v {:.2} m/s, duration {:.1} s",
        summary.algorithm, summary.burn_count, summary.total_delta_v, summary.total_time
    );
    for (k, t) in summary.burn_times.iter().enumerate() {
        println!("  burn {} at t={:.1}s", k + 1, t);
    }
    let flight_time = plan.total_time;
    engine.schedule_plan(plan)?;

    // Predicted paths for the closest-approach report
    engine.start_recording_with_spacing(chaser, 1.0e3)?;
    engine.start_recording_with_spacing(target, 1.0e3)?;
    let target_period = target_orbit.period();
    engine.predict(chaser, target_period)?;
    engine.predict(target, target_period)?;
    let crossings = engine.find_intercepts(chaser, target, 5.0e4, target_period)?;
    println!("predicted path crossings before the transfer: {}", crossings.len());

    // Set simulation start time using proper time scales
    let start_time = Epoch::from_gregorian_utc(2026, 8, 7, 0, 0, 0, 0);

    let dt = 1.0;
    let steps = (flight_time / dt).ceil() as usize + 1;
    let initial_energy = {
        let (p, v) = engine.state(chaser)?;
        specific_energy(&p, &v, mu)
    };

    // Create output directory if it doesn't exist
    let output_dir = Path::new("output");
    fs::create_dir_all(output_dir)?;
    let file = File::create(output_dir.join("transfer_data.csv"))?;
    let mut writer = Writer::from_writer(file);

    writer.write_record([
        "UTC Time",
        "Time (s)",
        "Position X (km)",
        "Position Y (km)",
        "Position Z (km)",
        "Velocity X (km/s)",
        "Velocity Y (km/s)",
        "Velocity Z (km/s)",
        "Semi-major Axis (km)",
        "Eccentricity",
        "Energy Error",
        "Separation (km)",
    ])?;

    for i in 0..steps {
        engine.advance(dt);
        let current_time = engine.time();
        let current_epoch = start_time + Duration::from_seconds(current_time);

        // Sample once a minute
        if i % 60 != 0 {
            continue;
        }

        let (position, velocity) = engine.state(chaser)?;
        let elements = engine.orbit_elements(chaser, earth)?;
        let energy = specific_energy(&position, &velocity, mu);
        let energy_error = ((energy - initial_energy) / initial_energy).abs();
        let separation = (engine.position(target)? - position).magnitude();

        writer.write_record([
            current_epoch.to_string(),
            format!("{current_time:.1}"),
            (position.x / 1000.0).to_string(),
            (position.y / 1000.0).to_string(),
            (position.z / 1000.0).to_string(),
            (velocity.x / 1000.0).to_string(),
            (velocity.y / 1000.0).to_string(),
            (velocity.z / 1000.0).to_string(),
            (elements.a / 1000.0).to_string(),
            elements.e.to_string(),
            energy_error.to_string(),
            (separation / 1000.0).to_string(),
        ])?;
    }
    writer.flush()?;

    let final_orbit: OrbitElements = engine.orbit_elements(chaser, earth)?;
    let separation = (engine.position(target)? - engine.position(chaser)?).magnitude();
    println!(
        "final orbit: a={:.1} km, e={:.5}, separation to target {:.2} km",
        final_orbit.a / 1000.0,
        final_orbit.e,
        separation / 1000.0
    );
    println!("Transfer data has been written to output/transfer_data.csv");

    Ok(())
}
