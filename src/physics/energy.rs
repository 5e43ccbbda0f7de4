use nalgebra as na;

/// Specific orbital energy (per unit mass) of a body about a central μ.
/// Conserved along an unperturbed two-body orbit; the conservation tests and
/// the demo's drift column both watch this.
pub fn specific_energy(r: &na::Vector3<f64>, v: &na::Vector3<f64>, mu: f64) -> f64 {
    v.magnitude_squared() / 2.0 - mu / r.magnitude()
}

/// Specific angular momentum h = r × v.
pub fn specific_angular_momentum(
    r: &na::Vector3<f64>,
    v: &na::Vector3<f64>,
) -> na::Vector3<f64> {
    r.cross(v)
}
