use super::{check_circular, check_same_rotation, in_plane_angle};
use crate::constants::RADIUS_MATCH_TOL;
use crate::errors::PlanError;
use crate::models::{BodyId, Maneuver, ManeuverKind, TransferPlan};
use crate::physics::orbital::OrbitElements;

/// Single-burn rotation of the orbit plane, for equal-radius circular orbits
/// only.
///
/// The relative inclination comes from the spherical-triangle relation on
/// (i1, i2, ΔΩ); the two plane-intersection nodes lie along ±(h1 × h2). The
/// burn happens at whichever node the departing body reaches first, as one
/// vector velocity change rotating the circular velocity into the target
/// plane.
pub fn plan_plane_change(
    body: BodyId,
    from: &OrbitElements,
    to: &OrbitElements,
    now: f64,
) -> Result<TransferPlan, PlanError> {
    check_same_rotation(from, to)?;
    check_circular(from)?;
    check_circular(to)?;

    let r1 = from.a;
    let r2 = to.a;
    if (r1 - r2).abs() > RADIUS_MATCH_TOL * r1.max(r2) {
        return Err(PlanError::RadiusMismatch { r1, r2 });
    }

    // Spherical triangle on the two inclinations and the node-longitude gap
    let d_raan = to.raan - from.raan;
    let cos_rel = from.i.cos() * to.i.cos() + from.i.sin() * to.i.sin() * d_raan.cos();
    let rel = cos_rel.clamp(-1.0, 1.0).acos();
    if rel < 1e-9 {
        return Ok(TransferPlan::no_op("plane-change"));
    }

    let h1 = from.momentum_axis();
    let h2 = to.momentum_axis();
    let node = h1.cross(&h2).normalize();

    // Whichever intersection node comes first along the current orbit wins
    let (r_vec, _) = from.to_state_vectors();
    let r_hat = r_vec.normalize();
    let n = from.mean_motion();
    let alpha_a = in_plane_angle(&r_hat, &node, &h1);
    let alpha_b = in_plane_angle(&r_hat, &(-node), &h1);
    let (node_dir, alpha) = if alpha_a <= alpha_b {
        (node, alpha_a)
    } else {
        (-node, alpha_b)
    };

    let speed = from.circular_velocity(r1);
    let v_before = h1.cross(&node_dir) * speed;
    let v_after = h2.cross(&node_dir) * speed;
    let dv = v_after - v_before;

    let burn_time = now + alpha / n;
    let maneuvers = vec![Maneuver::new(body, burn_time, ManeuverKind::VectorDelta(dv))];
    Ok(TransferPlan::new(
        "plane-change",
        maneuvers,
        dv.magnitude(),
        alpha / n,
    ))
}
