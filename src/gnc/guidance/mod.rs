//! Orbit transfer planners.
//!
//! Each planner is a pure function of departure state, arrival state, and
//! policy flags, returning a [`TransferPlan`](crate::models::TransferPlan) of
//! scheduled maneuvers. Planners read orbital state and enqueue nothing
//! themselves; the caller decides whether to schedule the plan.

pub mod battin;
pub mod bielliptic;
pub mod circularize;
pub mod general;
pub mod hohmann;
pub mod lambert;
pub mod plane_change;

pub use battin::solve_battin;
pub use bielliptic::{bielliptic_favorable, plan_bielliptic};
pub use circularize::plan_circularize;
pub use general::plan_general_hohmann;
pub use hohmann::plan_hohmann;
pub use lambert::{minimum_energy, plan_lambert, solve_universal, LambertSolution, MinEnergyTransfer};
pub use plane_change::plan_plane_change;

use crate::errors::PlanError;
use crate::physics::orbital::{normalize_angle, OrbitElements};
use nalgebra as na;

/// Orbits that rotate in opposite directions admit no continuous transfer;
/// every planner aborts on a negative dot product of the momentum axes.
pub(crate) fn check_same_rotation(
    from: &OrbitElements,
    to: &OrbitElements,
) -> Result<(), PlanError> {
    if from.momentum_axis().dot(&to.momentum_axis()) < 0.0 {
        return Err(PlanError::OppositeRotation);
    }
    Ok(())
}

pub(crate) fn check_circular(elements: &OrbitElements) -> Result<(), PlanError> {
    if !elements.is_circular() {
        return Err(PlanError::NotCircular { e: elements.e });
    }
    Ok(())
}

pub(crate) fn check_coplanar(from: &OrbitElements, to: &OrbitElements) -> Result<(), PlanError> {
    if from.momentum_axis().dot(&to.momentum_axis()) < 1.0 - 1e-8 {
        return Err(PlanError::NotCoplanar);
    }
    Ok(())
}

/// Angle from `from_dir` to `to_dir`, measured around `axis` in the flight
/// direction, normalized into [0, 2π).
pub(crate) fn in_plane_angle(
    from_dir: &na::Vector3<f64>,
    to_dir: &na::Vector3<f64>,
    axis: &na::Vector3<f64>,
) -> f64 {
    normalize_angle(axis.dot(&from_dir.cross(to_dir)).atan2(from_dir.dot(to_dir)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{G, PI};
    use approx::assert_abs_diff_eq;

    fn circular_elements(a: f64, i: f64, raan: f64) -> OrbitElements {
        let central_mass = 5.972e24;
        OrbitElements {
            a,
            e: 0.0,
            i,
            raan,
            arg_periapsis: 0.0,
            phase: 0.0,
            central_mass,
            mu: G * central_mass,
        }
    }

    #[test]
    fn test_opposite_rotation_detected() {
        let prograde = circular_elements(1.0e7, 0.1, 0.0);
        let retrograde = circular_elements(1.0e7, PI - 0.1, 0.0);
        assert_eq!(
            check_same_rotation(&prograde, &retrograde),
            Err(PlanError::OppositeRotation)
        );
        assert!(check_same_rotation(&prograde, &prograde).is_ok());
    }

    #[test]
    fn test_in_plane_angle_quadrants() {
        let z = na::Vector3::z_axis().into_inner();
        let x = na::Vector3::x_axis().into_inner();
        let y = na::Vector3::y_axis().into_inner();
        assert_abs_diff_eq!(in_plane_angle(&x, &y, &z), PI / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(in_plane_angle(&y, &x, &z), 3.0 * PI / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(in_plane_angle(&x, &x, &z), 0.0, epsilon = 1e-12);
    }
}
