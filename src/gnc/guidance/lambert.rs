use crate::constants::{PI, TAU};
use crate::errors::{LambertError, PlanError};
use crate::models::{BodyId, Maneuver, ManeuverKind, TransferPlan};
use nalgebra as na;

const MAX_ITER: usize = 100;
const NEGATIVE_Y_RETRIES: usize = 50;

/// Velocities connecting two positions over a fixed transfer time, plus the
/// transfer orbit's shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertSolution {
    pub v1: na::Vector3<f64>,
    pub v2: na::Vector3<f64>,
    pub a: f64,
    pub e: f64,
}

/// The minimum-semi-major-axis ellipse connecting two positions, and its
/// transfer time. A useful baseline: requested times below it force a
/// hyperbolic or fast-elliptic solution, times above it a slow one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinEnergyTransfer {
    pub a: f64,
    pub transfer_time: f64,
}

/// Stumpff functions C(z) and S(z), with series expansions around z = 0
/// where the closed forms lose precision.
fn stumpff(z: f64) -> (f64, f64) {
    if z > 1e-6 {
        let s = z.sqrt();
        ((1.0 - s.cos()) / z, (s - s.sin()) / (s * s * s))
    } else if z < -1e-6 {
        let s = (-z).sqrt();
        ((1.0 - s.cosh()) / z, (s.sinh() - s) / (s * s * s))
    } else {
        (
            0.5 - z / 24.0 + z * z / 720.0,
            1.0 / 6.0 - z / 120.0 + z * z / 5040.0,
        )
    }
}

/// Solves Lambert's problem with the universal-variable formulation: Newton
/// iteration on z (the squared universal anomaly) with bisection bounds keyed
/// to the requested revolution count.
///
/// Near the 180-degree geometry the transfer plane is under-determined and
/// the method degenerates; that case returns
/// [`LambertError::DegenerateGeometry`] so the caller can switch to the
/// Battin solver.
pub fn solve_universal(
    r1: &na::Vector3<f64>,
    r2: &na::Vector3<f64>,
    tof: f64,
    mu: f64,
    short_path: bool,
    revs: u32,
) -> Result<LambertSolution, LambertError> {
    let r1_mag = r1.magnitude();
    let r2_mag = r2.magnitude();

    let cos_dnu = r1.dot(r2) / (r1_mag * r2_mag);
    if 1.0 + cos_dnu < 1e-8 {
        return Err(LambertError::DegenerateGeometry);
    }

    let cross_mag = r1.cross(r2).magnitude();
    let sin_dnu = if short_path {
        cross_mag / (r1_mag * r2_mag)
    } else {
        -cross_mag / (r1_mag * r2_mag)
    };
    let a_param = sin_dnu * (r1_mag * r2_mag / (1.0 - cos_dnu)).sqrt();
    if a_param.abs() < 1e-12 {
        return Err(LambertError::DegenerateGeometry);
    }

    // Bisection bounds on z for the requested revolution band
    let (mut z_lo, mut z_hi) = if revs == 0 {
        (-16.0 * PI * PI, TAU * TAU - 1e-9)
    } else {
        let k = revs as f64;
        ((TAU * k).powi(2) + 1e-9, (TAU * (k + 1.0)).powi(2) - 1e-9)
    };
    let mut z = if revs == 0 { 0.0 } else { 0.5 * (z_lo + z_hi) };

    let sqrt_mu = mu.sqrt();
    let tol = 1e-8 * tof.max(1.0);
    let mut y = 0.0;
    let mut converged = false;
    let mut negative_count = 0usize;

    for _ in 0..MAX_ITER {
        let (c2, c3) = stumpff(z);
        y = r1_mag + r2_mag + a_param * (z * c3 - 1.0) / c2.sqrt();

        if y < 0.0 {
            // A positive A admits a y > 0 region at larger z; walk up into it
            if a_param > 0.0 && negative_count < NEGATIVE_Y_RETRIES {
                negative_count += 1;
                z_lo = z_lo.max(z);
                z += 0.1;
                continue;
            }
            return Err(LambertError::NegativeRadicand);
        }

        let chi = (y / c2).sqrt();
        let tof_calc = (chi.powi(3) * c3 + a_param * y.sqrt()) / sqrt_mu;

        let error = tof_calc - tof;
        if error.abs() < tol {
            converged = true;
            break;
        }

        // Transfer time grows with z; tighten the bracket accordingly
        if error < 0.0 {
            z_lo = z_lo.max(z);
        } else {
            z_hi = z_hi.min(z);
        }

        let dt_dz = if z.abs() < 1e-6 {
            (2.0_f64.sqrt() / 40.0 * y.powf(1.5)
                + a_param / 8.0 * (y.sqrt() + a_param * (1.0 / (2.0 * y)).sqrt()))
                / sqrt_mu
        } else {
            (chi.powi(3) * (1.0 / (2.0 * z) * (c2 - 3.0 * c3 / (2.0 * c2)) + 3.0 * c3 * c3 / (4.0 * c2))
                + a_param / 8.0 * (3.0 * c3 / c2 * y.sqrt() + a_param * (c2 / y).sqrt()))
                / sqrt_mu
        };

        let z_next = z - error / dt_dz;
        if !z_next.is_finite() || z_next <= z_lo || z_next >= z_hi {
            z = 0.5 * (z_lo + z_hi);
        } else {
            z = z_next;
        }
    }

    if !converged {
        return Err(LambertError::MaxIterations {
            iterations: MAX_ITER,
        });
    }

    // Lagrange coefficients give both terminal velocities
    let f = 1.0 - y / r1_mag;
    let g = a_param * (y / mu).sqrt();
    let g_dot = 1.0 - y / r2_mag;
    let v1 = (r2 - f * r1) / g;
    let v2 = (g_dot * r2 - r1) / g;

    let a = 1.0 / (2.0 / r1_mag - v1.magnitude_squared() / mu);
    let h = r1.cross(&v1);
    let e_vec = v1.cross(&h) / mu - r1 / r1_mag;

    Ok(LambertSolution {
        v1,
        v2,
        a,
        e: e_vec.magnitude(),
    })
}

/// Unique minimum-energy (minimum semi-major axis) ellipse through two
/// positions, and how long the transfer along it takes.
pub fn minimum_energy(
    r1: &na::Vector3<f64>,
    r2: &na::Vector3<f64>,
    mu: f64,
    short_path: bool,
) -> Result<MinEnergyTransfer, LambertError> {
    let chord = (r2 - r1).magnitude();
    if chord < 1e-12 {
        return Err(LambertError::DegenerateGeometry);
    }
    let s = (r1.magnitude() + r2.magnitude() + chord) / 2.0;
    let a = s / 2.0;

    let beta = 2.0 * ((1.0 - chord / s).sqrt()).asin();
    let transfer_time = (a.powi(3) / mu).sqrt()
        * if short_path {
            PI - beta + beta.sin()
        } else {
            PI + beta - beta.sin()
        };

    Ok(MinEnergyTransfer { a, transfer_time })
}

/// Lambert transfer plan: a vector burn onto the connecting orbit now, and,
/// for a rendezvous, a velocity set matching the target at arrival. With no
/// target velocity the plan is intercept-only and ends at the position match.
#[allow(clippy::too_many_arguments)]
pub fn plan_lambert(
    body: BodyId,
    position: &na::Vector3<f64>,
    velocity: &na::Vector3<f64>,
    target_position: &na::Vector3<f64>,
    target_velocity: Option<na::Vector3<f64>>,
    transfer_time: f64,
    mu: f64,
    now: f64,
    short_path: bool,
) -> Result<TransferPlan, PlanError> {
    let solution = solve_universal(position, target_position, transfer_time, mu, short_path, 0)?;

    let dv1 = solution.v1 - velocity;
    let mut total_delta_v = dv1.magnitude();
    let mut maneuvers = vec![Maneuver::new(body, now, ManeuverKind::VectorDelta(dv1))];

    if let Some(v_target) = target_velocity {
        total_delta_v += (v_target - solution.v2).magnitude();
        maneuvers.push(Maneuver::new(
            body,
            now + transfer_time,
            ManeuverKind::SetVelocity(v_target),
        ));
    }

    Ok(TransferPlan::new(
        "lambert",
        maneuvers,
        total_delta_v,
        transfer_time,
    ))
}
