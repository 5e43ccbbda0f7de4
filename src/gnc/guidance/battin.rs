//! Battin-style Lambert solver.
//!
//! Works in the Lancaster-Blanchard variable x with Battin's
//! continued-fraction (hypergeometric) series for the time of flight near
//! x = 1, a Lagrange expression in the mid range, and the Lancaster form
//! elsewhere. The chord/semiperimeter parameterization stays numerically
//! stable near the 180-degree geometry where the universal-variable solver
//! degenerates; the two must agree wherever both are defined.

use super::lambert::LambertSolution;
use crate::errors::LambertError;
use nalgebra as na;

const MAX_ITER: usize = 32;
const TOF_TOL: f64 = 1e-9;

pub fn solve_battin(
    r1: &na::Vector3<f64>,
    r2: &na::Vector3<f64>,
    tof: f64,
    mu: f64,
    short_path: bool,
) -> Result<LambertSolution, LambertError> {
    let r1_mag = r1.magnitude();
    let r2_mag = r2.magnitude();

    let chord = (r2 - r1).magnitude();
    let s = (chord + r1_mag + r2_mag) / 2.0;

    let lambda2 = 1.0 - chord / s;
    let lambda = if short_path {
        lambda2.sqrt()
    } else {
        -lambda2.sqrt()
    };

    let ir1 = r1 / r1_mag;
    let ir2 = r2 / r2_mag;
    let ih = ir1.cross(&ir2);
    let ih_mag = ih.magnitude();
    if ih_mag < 1e-12 {
        // Exactly collinear endpoints leave the transfer plane undetermined
        return Err(LambertError::DegenerateGeometry);
    }
    let ih = ih / ih_mag;

    let (it1, it2) = if ih.z < 0.0 {
        (ir1.cross(&ih), ir2.cross(&ih))
    } else {
        (ih.cross(&ir1), ih.cross(&ir2))
    };
    let it1 = it1.normalize();
    let it2 = it2.normalize();
    let (it1, it2) = if short_path { (it1, it2) } else { (-it1, -it2) };

    // Dimensionless time of flight
    let t_norm = (2.0 * mu / (s * s * s)).sqrt() * tof;

    // Initial guess bracketed by the parabolic and minimum-energy times
    let t00 = lambda.acos() + lambda * (1.0 - lambda2).sqrt();
    let t1 = (2.0 / 3.0) * (1.0 - lambda2 * lambda);
    let x0 = if t_norm >= t00 {
        -(t_norm - t00) / (t_norm - t00 + 4.0)
    } else if t_norm <= t1 {
        t1 * (t1 - t_norm) / (0.4 * (1.0 - lambda2 * lambda2 * lambda) * t_norm) + 1.0
    } else {
        (t_norm / t00).powf(std::f64::consts::LN_2 / (t1 / t00).ln()) - 1.0
    };

    let x = householder(t_norm, x0, lambda)?;

    // Terminal velocities from the radial/tangential decomposition
    let gamma = (mu * s / 2.0).sqrt();
    let rho = (r1_mag - r2_mag) / chord;
    let sigma = (1.0 - rho * rho).sqrt();

    let y = (1.0 - lambda2 + lambda2 * x * x).sqrt();
    let vr1 = gamma * ((lambda * y - x) - rho * (lambda * y + x)) / r1_mag;
    let vr2 = -gamma * ((lambda * y - x) + rho * (lambda * y + x)) / r2_mag;
    let vt = gamma * sigma * (y + lambda * x);

    let v1 = vr1 * ir1 + (vt / r1_mag) * it1;
    let v2 = vr2 * ir2 + (vt / r2_mag) * it2;

    let a = 1.0 / (2.0 / r1_mag - v1.magnitude_squared() / mu);
    let h = r1.cross(&v1);
    let e_vec = v1.cross(&h) / mu - ir1;

    Ok(LambertSolution {
        v1,
        v2,
        a,
        e: e_vec.magnitude(),
    })
}

/// Third-order Householder iteration on the time-of-flight equation.
fn householder(t_target: f64, x0: f64, lambda: f64) -> Result<f64, LambertError> {
    let mut x = x0;
    for _ in 0..MAX_ITER {
        let t = x_to_tof(x, lambda);
        let (dt, ddt, dddt) = tof_derivatives(x, t, lambda);
        let delta = t - t_target;

        if delta.abs() < TOF_TOL {
            return Ok(x);
        }

        let dt2 = dt * dt;
        let x_next = x
            - delta * (dt2 - delta * ddt / 2.0)
                / (dt * (dt2 - delta * ddt) + dddt * delta * delta / 6.0);
        if (x - x_next).abs() < 1e-14 {
            return Ok(x_next);
        }
        x = x_next;
    }
    Err(LambertError::MaxIterations {
        iterations: MAX_ITER,
    })
}

/// Analytic derivatives of the dimensionless time of flight with respect
/// to x.
fn tof_derivatives(x: f64, t: f64, lambda: f64) -> (f64, f64, f64) {
    let l2 = lambda * lambda;
    let l3 = l2 * lambda;
    let umx2 = 1.0 - x * x;
    let y = (1.0 - l2 * umx2).sqrt();
    let y2 = y * y;
    let y3 = y2 * y;

    let dt = (3.0 * t * x - 2.0 + 2.0 * l3 * x / y) / umx2;
    let ddt = (3.0 * t + 5.0 * x * dt + 2.0 * (1.0 - l2) * l3 / y3) / umx2;
    let dddt = (7.0 * x * ddt + 8.0 * dt - 6.0 * (1.0 - l2) * l2 * l3 * x / (y3 * y2)) / umx2;
    (dt, ddt, dddt)
}

/// Dimensionless time of flight at x, switching between Battin's series near
/// x = 1, the Lagrange expression mid-range, and the Lancaster form
/// elsewhere.
fn x_to_tof(x: f64, lambda: f64) -> f64 {
    const BATTIN_DIST: f64 = 0.01;
    const LAGRANGE_DIST: f64 = 0.2;
    let dist = (x - 1.0).abs();

    if dist < LAGRANGE_DIST && dist > BATTIN_DIST {
        return tof_lagrange(x, lambda);
    }

    let k = lambda * lambda;
    let e = x * x - 1.0;
    let rho = e.abs();
    let z = (1.0 + k * e).sqrt();

    if dist < BATTIN_DIST {
        // Battin series
        let eta = z - lambda * x;
        let s1 = 0.5 * (1.0 - lambda - x * eta);
        let q = hypergeometric(s1) * (4.0 / 3.0);
        (eta.powi(3) * q + 4.0 * lambda * eta) / 2.0
    } else {
        // Lancaster expression
        let y = rho.sqrt();
        let g = x * z - lambda * e;
        let d = if e < 0.0 {
            g.acos()
        } else {
            (y * (z - lambda * x) + g).ln()
        };
        (x - lambda * z - d / y) / e
    }
}

/// Lagrange time-of-flight expression, elliptic and hyperbolic branches.
fn tof_lagrange(x: f64, lambda: f64) -> f64 {
    let a = 1.0 / (1.0 - x * x);
    if a > 0.0 {
        let alfa = 2.0 * x.acos();
        let beta_arg = (lambda * lambda / a).sqrt();
        let beta = {
            let b = 2.0 * beta_arg.asin();
            if lambda < 0.0 {
                -b
            } else {
                b
            }
        };
        a * a.sqrt() * ((alfa - alfa.sin()) - (beta - beta.sin())) / 2.0
    } else {
        let alfa = 2.0 * x.acosh();
        let beta_arg = (-lambda * lambda / a).sqrt();
        let beta = {
            let b = 2.0 * beta_arg.asinh();
            if lambda < 0.0 {
                -b
            } else {
                b
            }
        };
        -a * (-a).sqrt() * ((beta - beta.sinh()) - (alfa - alfa.sinh())) / 2.0
    }
}

/// Battin's hypergeometric series ₂F₁(3, 1; 5/2; z), evaluated by its
/// continued product expansion.
fn hypergeometric(z: f64) -> f64 {
    const TOL: f64 = 1e-11;
    let mut sj = 1.0;
    let mut cj = 1.0;
    for j in 0..100 {
        let jf = j as f64;
        let cj1 = cj * (3.0 + jf) * (1.0 + jf) / (2.5 + jf) * z / (jf + 1.0);
        sj += cj1;
        if cj1.abs() < TOL {
            break;
        }
        cj = cj1;
    }
    sj
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TAU;
    use crate::gnc::guidance::lambert::solve_universal;
    use approx::assert_abs_diff_eq;

    const MU: f64 = 398_600.0; // km³/s²

    #[test]
    fn test_quarter_circle_recovers_circular_orbit() {
        let r = 7000.0;
        let v_circ = (MU / r).sqrt();
        let quarter_period = 0.25 * TAU * (r.powi(3) / MU).sqrt();

        let r1 = na::Vector3::new(r, 0.0, 0.0);
        let r2 = na::Vector3::new(0.0, r, 0.0);
        let solution = solve_battin(&r1, &r2, quarter_period, MU, true).unwrap();

        assert_abs_diff_eq!(
            solution.v1,
            na::Vector3::new(0.0, v_circ, 0.0),
            epsilon = v_circ * 1e-5
        );
        assert_abs_diff_eq!(solution.e, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_agrees_with_universal_variable_solver() {
        // Matched geometries away from the 180-degree singularity: the two
        // formulations must produce the same transfer-velocity magnitudes.
        let cases: [(f64, f64, f64); 4] = [
            (60.0, 8000.0, 2400.0),
            (95.0, 9000.0, 4000.0),
            (120.0, 7500.0, 5000.0),
            (170.0, 8200.0, 6000.0),
        ];
        for (angle_deg, r2_mag, tof) in cases {
            let theta = angle_deg.to_radians();
            let r1 = na::Vector3::new(7000.0, 0.0, 0.0);
            let r2 = na::Vector3::new(r2_mag * theta.cos(), r2_mag * theta.sin(), 0.0);

            let uv = solve_universal(&r1, &r2, tof, MU, true, 0).unwrap();
            let battin = solve_battin(&r1, &r2, tof, MU, true).unwrap();

            assert_abs_diff_eq!(
                battin.v1.magnitude(),
                uv.v1.magnitude(),
                epsilon = uv.v1.magnitude() * 1e-2
            );
            assert_abs_diff_eq!(
                battin.v2.magnitude(),
                uv.v2.magnitude(),
                epsilon = uv.v2.magnitude() * 1e-2
            );
        }
    }

    #[test]
    fn test_stable_near_180_degrees() {
        // 179.9 degrees: far enough past the universal-variable comfort zone
        // that this solver existing is the point.
        let theta = 179.9_f64.to_radians();
        let r1 = na::Vector3::new(7000.0, 0.0, 0.0);
        let r2 = na::Vector3::new(7000.0 * theta.cos(), 7000.0 * theta.sin(), 0.0);

        let solution = solve_battin(&r1, &r2, 3000.0, MU, true).unwrap();
        assert!(solution.v1.magnitude().is_finite());
        assert!(solution.v2.magnitude().is_finite());
        // The transfer stays essentially in the plane of the two positions
        assert_abs_diff_eq!(solution.v1.z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_collinear_endpoints_rejected() {
        let r1 = na::Vector3::new(7000.0, 0.0, 0.0);
        let r2 = na::Vector3::new(-7000.0, 0.0, 0.0);
        let err = solve_battin(&r1, &r2, 3000.0, MU, true).unwrap_err();
        assert_eq!(err, LambertError::DegenerateGeometry);
    }

    #[test]
    fn test_long_way_runs_retrograde() {
        let r1 = na::Vector3::new(7000.0, 0.0, 0.0);
        let r2 = na::Vector3::new(0.0, 8000.0, 0.0);
        let long = solve_battin(&r1, &r2, 9000.0, MU, false).unwrap();
        // Long way around: angular momentum points down
        assert!(r1.cross(&long.v1).z < 0.0);
    }
}
