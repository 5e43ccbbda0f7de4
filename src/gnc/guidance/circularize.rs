use crate::constants::G;
use crate::errors::PlanError;
use crate::models::{BodyId, Maneuver, ManeuverKind, TransferPlan};
use nalgebra as na;

/// Single burn that makes the orbit circular at the current radius: the
/// velocity is set to circular speed along the tangential direction of the
/// instantaneous orbit plane.
pub fn plan_circularize(
    body: BodyId,
    position: &na::Vector3<f64>,
    velocity: &na::Vector3<f64>,
    central_mass: f64,
    now: f64,
) -> Result<TransferPlan, PlanError> {
    let h = position.cross(velocity);
    if h.magnitude() < 1e-12 {
        return Err(PlanError::RadialTrajectory);
    }

    let mu = G * central_mass;
    let r = position.magnitude();
    let tangent = h.normalize().cross(&position.normalize());
    let target = tangent * (mu / r).sqrt();
    let delta_v = (target - velocity).magnitude();

    let maneuvers = vec![Maneuver::new(body, now, ManeuverKind::SetVelocity(target))];
    Ok(TransferPlan::new("circularize", maneuvers, delta_v, 0.0))
}
