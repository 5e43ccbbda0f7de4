use nalgebra as na;

/// Advance one body by `dt` with a kick-drift-kick leapfrog step.
///
/// Two acceleration evaluations per step: one at the starting position, one
/// at the drifted position. Symplectic, so two-body energy drift stays
/// bounded over long runs instead of growing secularly.
pub fn leapfrog_step<F>(
    position: &mut na::Vector3<f64>,
    velocity: &mut na::Vector3<f64>,
    dt: f64,
    mut accel: F,
) where
    F: FnMut(&na::Vector3<f64>) -> na::Vector3<f64>,
{
    let half_dt = 0.5 * dt;

    // Kick: v_n+1/2 = v_n + (dt/2) a(x_n)
    let a_old = accel(position);
    *velocity += a_old * half_dt;

    // Drift: x_n+1 = x_n + dt v_n+1/2
    *position += *velocity * dt;

    // Second kick: v_n+1 = v_n+1/2 + (dt/2) a(x_n+1)
    let a_new = accel(position);
    *velocity += a_new * half_dt;
}
