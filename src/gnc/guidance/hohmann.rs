use super::{check_circular, check_coplanar, check_same_rotation};
use crate::constants::{PI, RADIUS_MATCH_TOL, RENDEZVOUS_MAX_REVS, TAU};
use crate::errors::PlanError;
use crate::models::{BodyId, Maneuver, ManeuverKind, TransferPlan};
use crate::physics::orbital::{normalize_angle, OrbitElements};

/// Classical two-burn transfer between coplanar circular orbits.
///
/// Both burns are prograde/retrograde along the velocity at the burn time, so
/// they are expressed as scalar deltas; the delta-v values come straight from
/// vis-viva on the transfer ellipse. With `rendezvous` set, a wait is
/// inserted before the first burn so the target sits at the arrival point
/// when the body gets there.
pub fn plan_hohmann(
    body: BodyId,
    from: &OrbitElements,
    to: &OrbitElements,
    now: f64,
    rendezvous: bool,
) -> Result<TransferPlan, PlanError> {
    check_same_rotation(from, to)?;
    check_circular(from)?;
    check_circular(to)?;
    check_coplanar(from, to)?;

    let mu = from.mu;
    let r1 = from.a;
    let r2 = to.a;
    if (r1 - r2).abs() <= RADIUS_MATCH_TOL * r1.max(r2) {
        return Ok(TransferPlan::no_op("hohmann"));
    }

    let v1 = (mu / r1).sqrt();
    let v2 = (mu / r2).sqrt();
    let a_t = 0.5 * (r1 + r2);
    let tof = PI * (a_t.powi(3) / mu).sqrt();

    // Transfer-ellipse speeds at departure and arrival
    let v_t1 = (mu * (2.0 / r1 - 1.0 / a_t)).sqrt();
    let v_t2 = (mu * (2.0 / r2 - 1.0 / a_t)).sqrt();
    let dv1 = v_t1 - v1; // negative for inward transfers
    let dv2 = v2 - v_t2;

    let wait = if rendezvous {
        rendezvous_wait(from, to, tof)?
    } else {
        0.0
    };

    let t1 = now + wait;
    let t2 = t1 + tof;
    let maneuvers = vec![
        Maneuver::new(body, t1, ManeuverKind::ScalarDelta(dv1)),
        Maneuver::new(body, t2, ManeuverKind::ScalarDelta(dv2)),
    ];
    Ok(TransferPlan::new(
        "hohmann",
        maneuvers,
        dv1.abs() + dv2.abs(),
        wait + tof,
    ))
}

/// Wait before the departure burn so the target's lead angle is correct at
/// arrival. Arrival happens π past the departure longitude; the target must
/// reach that point exactly `tof` after departure. A negative wait is pushed
/// forward one synodic revolution at a time until non-negative.
fn rendezvous_wait(
    from: &OrbitElements,
    to: &OrbitElements,
    tof: f64,
) -> Result<f64, PlanError> {
    let n1 = from.mean_motion();
    let n2 = to.mean_motion();
    if (n1 - n2).abs() < 1e-15 {
        return Ok(0.0);
    }

    let delta = normalize_angle(from.longitude() + PI - to.longitude() - n2 * tof);
    let mut wait = delta / (n2 - n1);
    let synodic = TAU / (n2 - n1).abs();
    let mut revs = 0;
    while wait < 0.0 {
        wait += synodic;
        revs += 1;
        if revs > RENDEZVOUS_MAX_REVS {
            return Err(PlanError::PhasingExhausted { attempts: revs });
        }
    }
    Ok(wait)
}
