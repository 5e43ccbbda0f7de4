use super::{check_circular, check_coplanar, check_same_rotation};
use crate::constants::{BIELLIPTIC_RATIO, PI};
use crate::errors::PlanError;
use crate::models::{BodyId, Maneuver, ManeuverKind, TransferPlan};
use crate::physics::orbital::OrbitElements;

/// Whether a bi-elliptic transfer between these radii can beat Hohmann on
/// delta-v. Above a radius ratio of roughly 11.94 it does, at a steep cost in
/// transfer time.
pub fn bielliptic_favorable(r1: f64, r2: f64) -> bool {
    let (lo, hi) = if r1 < r2 { (r1, r2) } else { (r2, r1) };
    hi / lo > BIELLIPTIC_RATIO
}

/// Three-burn transfer through an intermediate apoapsis past the outer
/// radius: raise apoapsis to `overshoot * max(r1, r2)`, re-shape at the
/// intermediate apoapsis, then circularize at the destination. All three
/// delta-v values and both half-period legs are closed-form vis-viva sums.
pub fn plan_bielliptic(
    body: BodyId,
    from: &OrbitElements,
    to: &OrbitElements,
    now: f64,
    overshoot: f64,
) -> Result<TransferPlan, PlanError> {
    check_same_rotation(from, to)?;
    check_circular(from)?;
    check_circular(to)?;
    check_coplanar(from, to)?;
    if overshoot <= 1.0 {
        return Err(PlanError::InvalidOvershoot { ratio: overshoot });
    }

    let mu = from.mu;
    let r1 = from.a;
    let r2 = to.a;
    let rb = overshoot * r1.max(r2);

    let v1 = (mu / r1).sqrt();
    let v2 = (mu / r2).sqrt();

    // First ellipse: r1 -> rb
    let a1 = 0.5 * (r1 + rb);
    let v_depart_1 = (mu * (2.0 / r1 - 1.0 / a1)).sqrt();
    let v_arrive_1 = (mu * (2.0 / rb - 1.0 / a1)).sqrt();

    // Second ellipse: rb -> r2
    let a2 = 0.5 * (rb + r2);
    let v_depart_2 = (mu * (2.0 / rb - 1.0 / a2)).sqrt();
    let v_arrive_2 = (mu * (2.0 / r2 - 1.0 / a2)).sqrt();

    let dv1 = v_depart_1 - v1;
    let dv2 = v_depart_2 - v_arrive_1;
    let dv3 = v2 - v_arrive_2;

    let leg1 = PI * (a1.powi(3) / mu).sqrt();
    let leg2 = PI * (a2.powi(3) / mu).sqrt();

    let maneuvers = vec![
        Maneuver::new(body, now, ManeuverKind::ScalarDelta(dv1)),
        Maneuver::new(body, now + leg1, ManeuverKind::ScalarDelta(dv2)),
        Maneuver::new(body, now + leg1 + leg2, ManeuverKind::ScalarDelta(dv3)),
    ];
    Ok(TransferPlan::new(
        "bi-elliptic",
        maneuvers,
        dv1.abs() + dv2.abs() + dv3.abs(),
        leg1 + leg2,
    ))
}
