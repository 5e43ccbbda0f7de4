use super::{check_circular, check_same_rotation, in_plane_angle};
use crate::constants::{PHASING_MAX_TRIES, PI, TAU};
use crate::errors::PlanError;
use crate::models::{BodyId, Maneuver, ManeuverKind, TransferPlan};
use crate::physics::orbital::OrbitElements;

/// Combined radius and plane change with rendezvous phasing, between
/// circular orbits.
///
/// Three burns: a phasing burn at the plane-intersection node that adjusts
/// when the body returns there, a transfer burn (in the original plane) onto
/// the half-ellipse toward the target radius, and an arrival burn expressed
/// as a direct velocity set into the target orbit; the post-burn velocity is
/// fully known, so stating it outright is cheaper than deriving an additive
/// correction through the plane rotation.
///
/// The phasing orbit's semi-major axis must lie between the two radii. The
/// search walks candidate arrival windows one target revolution at a time,
/// bounded by a retry budget; exhausting it reports an error rather than
/// looping forever.
pub fn plan_general_hohmann(
    body: BodyId,
    from: &OrbitElements,
    to: &OrbitElements,
    now: f64,
) -> Result<TransferPlan, PlanError> {
    check_same_rotation(from, to)?;
    check_circular(from)?;
    check_circular(to)?;

    let mu = from.mu;
    let r1 = from.a;
    let r2 = to.a;
    let h1 = from.momentum_axis();
    let h2 = to.momentum_axis();
    let n1 = from.mean_motion();
    let n2 = to.mean_motion();

    // Node line between the planes; for coplanar orbits any direction works,
    // so depart from where the body is now
    let (r_vec, _) = from.to_state_vectors();
    let r_hat = r_vec.normalize();
    let cross = h1.cross(&h2);
    let node = if cross.magnitude() < 1e-9 {
        r_hat
    } else {
        cross.normalize()
    };

    // Whichever node comes first along the departure orbit
    let alpha_a = in_plane_angle(&r_hat, &node, &h1);
    let alpha_b = in_plane_angle(&r_hat, &(-node), &h1);
    let (node_dir, alpha) = if alpha_a <= alpha_b {
        (node, alpha_a)
    } else {
        (-node, alpha_b)
    };
    let t_node = alpha / n1;

    // Transfer geometry: depart at the node, arrive opposite it
    let a_t = 0.5 * (r1 + r2);
    let tof = PI * (a_t.powi(3) / mu).sqrt();
    let arrive_dir = -node_dir;

    // Angle the target must still travel to the arrival point
    let (target_vec, _) = to.to_state_vectors();
    let beta = in_plane_angle(&target_vec.normalize(), &arrive_dir, &h2);

    // Phasing periods that keep the phasing orbit between the two radii
    let t_lo = TAU * (r1.min(r2).powi(3) / mu).sqrt();
    let t_hi = TAU * (r1.max(r2).powi(3) / mu).sqrt();

    let mut phasing = None;
    let mut attempts = 0usize;
    for k in 0..PHASING_MAX_TRIES {
        attempts = k + 1;
        let depart = (beta + k as f64 * TAU) / n2 - tof;
        let slack = depart - t_node;
        if slack < 0.0 {
            continue;
        }
        if slack < 1e-9 * t_hi {
            phasing = Some((depart, None));
            break;
        }
        // Fewest revolutions whose period still fits the radius bounds
        let m_min = (slack / t_hi).ceil().max(1.0) as u64;
        let m_max = (slack / t_lo).floor() as u64;
        if m_min <= m_max {
            let m = m_min;
            let t_ph = slack / m as f64;
            let a_ph = (mu * (t_ph / TAU).powi(2)).cbrt();
            phasing = Some((depart, Some((a_ph, m))));
            break;
        }
    }

    let Some((depart, phasing_orbit)) = phasing else {
        log::warn!(
            "phasing search exhausted after {attempts} windows (r1={r1}, r2={r2})"
        );
        return Err(PlanError::PhasingExhausted { attempts });
    };

    let v1 = (mu / r1).sqrt();
    let v2 = (mu / r2).sqrt();
    let v_t1 = (mu * (2.0 / r1 - 1.0 / a_t)).sqrt();
    let v_t2 = (mu * (2.0 / r2 - 1.0 / a_t)).sqrt();

    let mut maneuvers = Vec::new();
    let mut total_delta_v = 0.0;

    // Speed the body carries when the transfer burn happens
    let v_at_node = match phasing_orbit {
        Some((a_ph, _)) => {
            let v_ph = (mu * (2.0 / r1 - 1.0 / a_ph)).sqrt();
            let dv_phase = v_ph - v1;
            maneuvers.push(Maneuver::new(
                body,
                now + t_node,
                ManeuverKind::ScalarDelta(dv_phase),
            ));
            total_delta_v += dv_phase.abs();
            v_ph
        }
        None => v1,
    };

    let dv_transfer = v_t1 - v_at_node;
    maneuvers.push(Maneuver::new(
        body,
        now + depart,
        ManeuverKind::ScalarDelta(dv_transfer),
    ));
    total_delta_v += dv_transfer.abs();

    // Arrival: set the known target-orbit velocity outright
    let v_target = h2.cross(&arrive_dir) * v2;
    let v_arrive = h1.cross(&arrive_dir) * v_t2;
    maneuvers.push(Maneuver::new(
        body,
        now + depart + tof,
        ManeuverKind::SetVelocity(v_target),
    ));
    total_delta_v += (v_target - v_arrive).magnitude();

    Ok(TransferPlan::new(
        "general-hohmann",
        maneuvers,
        total_delta_v,
        depart + tof,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::G;
    use crate::gnc::guidance::plan_hohmann;
    use approx::assert_abs_diff_eq;

    const M_CENTRAL: f64 = 5.972e24;

    fn circular(a: f64, i: f64, raan: f64, phase: f64) -> OrbitElements {
        OrbitElements {
            a,
            e: 0.0,
            i,
            raan,
            arg_periapsis: 0.0,
            phase,
            central_mass: M_CENTRAL,
            mu: G * M_CENTRAL,
        }
    }

    fn body() -> BodyId {
        BodyId {
            index: 0,
            generation: 0,
        }
    }

    fn set_velocity_of(plan: &TransferPlan) -> nalgebra::Vector3<f64> {
        match plan.maneuvers.last().unwrap().kind {
            ManeuverKind::SetVelocity(v) => v,
            _ => panic!("expected the arrival burn to be a velocity set"),
        }
    }

    #[test]
    fn test_coplanar_radius_change_costs_at_least_hohmann() {
        let from = circular(7.0e6, 0.0, 0.0, 0.3);
        let to = circular(9.0e6, 0.0, 0.0, 2.0);
        let plan = plan_general_hohmann(body(), &from, &to, 0.0).unwrap();
        let hohmann = plan_hohmann(body(), &from, &to, 0.0, false).unwrap();

        assert!(plan.total_delta_v >= hohmann.total_delta_v - 1e-9);
        assert!(plan
            .maneuvers
            .windows(2)
            .all(|w| w[0].time <= w[1].time + 1e-9));

        // Arrival enters the target orbit at circular speed
        let v_set = set_velocity_of(&plan);
        assert_abs_diff_eq!(
            v_set.magnitude(),
            (from.mu / 9.0e6).sqrt(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_combined_plane_and_radius_change() {
        let from = circular(7.0e6, 0.2, 0.4, 1.0);
        let to = circular(1.1e7, 0.6, 0.9, 2.0);
        let plan = plan_general_hohmann(body(), &from, &to, 50.0).unwrap();

        assert!(plan.maneuvers.len() >= 2 && plan.maneuvers.len() <= 3);
        assert!(plan.maneuvers[0].time >= 50.0);

        // The arrival velocity lies in the target plane at circular speed
        let v_set = set_velocity_of(&plan);
        assert_abs_diff_eq!(v_set.dot(&to.momentum_axis()), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(
            v_set.magnitude(),
            (from.mu / 1.1e7).sqrt(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_phasing_orbit_bounded_by_radii() {
        let from = circular(7.0e6, 0.1, 0.0, 0.7);
        let to = circular(9.0e6, 0.3, 0.0, 2.9);
        let plan = plan_general_hohmann(body(), &from, &to, 0.0).unwrap();

        if plan.maneuvers.len() == 3 {
            // Recover the phasing orbit from the first burn
            let dv_phase = match plan.maneuvers[0].kind {
                ManeuverKind::ScalarDelta(dv) => dv,
                _ => panic!("expected a scalar phasing burn"),
            };
            let v1 = (from.mu / 7.0e6_f64).sqrt();
            let v_ph = v1 + dv_phase;
            let a_ph = 1.0 / (2.0 / 7.0e6 - v_ph * v_ph / from.mu);
            assert!(a_ph >= 7.0e6 - 1.0 && a_ph <= 9.0e6 + 1.0);
        }
    }

    #[test]
    fn test_opposite_rotation_rejected() {
        let from = circular(7.0e6, 0.2, 0.0, 0.0);
        let to = circular(9.0e6, PI - 0.2, 0.0, 0.0);
        let err = plan_general_hohmann(body(), &from, &to, 0.0).unwrap_err();
        assert_eq!(err, PlanError::OppositeRotation);
    }
}
