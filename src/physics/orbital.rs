use crate::constants::{ECC_CIRCULAR_TOL, G, PI, TAU};
use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Normalizes an angle into the canonical range [0, 2π).
///
/// Every planner compares angles in this range; comparing raw angles invites
/// wrap-around tie-break errors.
pub fn normalize_angle(theta: f64) -> f64 {
    let t = theta % TAU;
    if t < 0.0 {
        t + TAU
    } else {
        t
    }
}

/// Classical orbital elements around a central mass. Always derived on demand
/// from a state vector, never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitElements {
    /// Semi-major axis
    pub a: f64,
    /// Eccentricity [-]
    pub e: f64,
    /// Inclination [rad]
    pub i: f64,
    /// Right ascension of ascending node [rad]
    pub raan: f64,
    /// Argument of periapsis [rad]
    pub arg_periapsis: f64,
    /// Phase along the orbit (true anomaly) [rad]
    pub phase: f64,
    /// Mass of the central body
    pub central_mass: f64,
    /// Gravitational parameter μ = G·M
    pub mu: f64,
}

#[allow(non_snake_case)]
impl OrbitElements {
    /// Derives orbital elements from a Cartesian state around `central_mass`.
    ///
    /// The central body is taken to sit at the origin of `r`; callers pass
    /// position/velocity relative to it.
    pub fn from_state_vectors(
        r: &na::Vector3<f64>,
        v: &na::Vector3<f64>,
        central_mass: f64,
    ) -> Self {
        let mu = G * central_mass;

        // Angular momentum vector
        let h = r.cross(v);
        let h_mag = h.magnitude();

        // Node vector
        let k = na::Vector3::new(0.0, 0.0, 1.0);
        let n = k.cross(&h);
        let n_mag = n.magnitude();

        // Eccentricity vector
        let r_mag = r.magnitude();
        let v_mag = v.magnitude();
        let e_vec = ((v_mag * v_mag - mu / r_mag) * r - r.dot(v) * v) / mu;
        let e = e_vec.magnitude();

        // Semi-major axis from specific energy
        let specific_energy = v_mag * v_mag / 2.0 - mu / r_mag;
        let a = -mu / (2.0 * specific_energy);

        // Inclination
        let i = (h.z / h_mag).acos();

        // Right ascension of ascending node
        let raan = if n_mag < 1e-11 {
            0.0
        } else {
            normalize_angle(n.y.atan2(n.x))
        };

        // Argument of periapsis
        let arg_periapsis = if e < 1e-11 {
            0.0
        } else if n_mag < 1e-11 {
            normalize_angle(e_vec.y.atan2(e_vec.x))
        } else {
            normalize_angle((h.dot(&e_vec.cross(&n))).atan2(n.dot(&e_vec)))
        };

        // True anomaly
        let phase = if e < 1e-11 {
            if n_mag < 1e-11 {
                normalize_angle(r.y.atan2(r.x))
            } else {
                normalize_angle(n.dot(&r.cross(&n)).atan2(n.dot(r)))
            }
        } else {
            normalize_angle(h.dot(&e_vec.cross(r)).atan2(e_vec.dot(r)))
        };

        OrbitElements {
            a,
            e,
            i,
            raan,
            arg_periapsis,
            phase,
            central_mass,
            mu,
        }
    }

    /// Converts the elements back to Cartesian state vectors, in the same
    /// frame `from_state_vectors` consumed.
    pub fn to_state_vectors(&self) -> (na::Vector3<f64>, na::Vector3<f64>) {
        let p = self.a * (1.0 - self.e * self.e);
        let r_mag = p / (1.0 + self.e * self.phase.cos());

        // Position in the orbital plane
        let r_orbital = na::Vector3::new(r_mag * self.phase.cos(), r_mag * self.phase.sin(), 0.0);

        // Velocity in the orbital plane
        let v_orbital = na::Vector3::new(
            -(self.mu / p).sqrt() * self.phase.sin(),
            (self.mu / p).sqrt() * (self.e + self.phase.cos()),
            0.0,
        );

        let rot_omega = na::Rotation3::from_axis_angle(&na::Vector3::z_axis(), self.arg_periapsis);
        let rot_i = na::Rotation3::from_axis_angle(&na::Vector3::x_axis(), self.i);
        let rot_raan = na::Rotation3::from_axis_angle(&na::Vector3::z_axis(), self.raan);

        let transform = rot_raan * rot_i * rot_omega;
        (transform * r_orbital, transform * v_orbital)
    }

    pub fn period(&self) -> f64 {
        TAU * (self.a.powi(3) / self.mu).sqrt()
    }

    /// Mean angular rate n = √(μ/a³) [rad/time].
    pub fn mean_motion(&self) -> f64 {
        (self.mu / self.a.powi(3)).sqrt()
    }

    /// Speed of a circular orbit at radius `r` around the same central body.
    pub fn circular_velocity(&self, r: f64) -> f64 {
        (self.mu / r).sqrt()
    }

    /// (apoapsis, periapsis) radii.
    pub fn apsides(&self) -> (f64, f64) {
        (self.a * (1.0 + self.e), self.a * (1.0 - self.e))
    }

    /// Current radius from the focus.
    pub fn radius(&self) -> f64 {
        self.a * (1.0 - self.e * self.e) / (1.0 + self.e * self.phase.cos())
    }

    pub fn is_circular(&self) -> bool {
        self.e < ECC_CIRCULAR_TOL
    }

    /// In-plane angle Ω + ω + ν, normalized. Two coplanar orbits compare
    /// phasing through this single angle.
    pub fn longitude(&self) -> f64 {
        normalize_angle(self.raan + self.arg_periapsis + self.phase)
    }

    /// Unit vector along the orbit's angular-momentum axis. The sign of the
    /// dot product of two of these decides whether two orbits share a
    /// rotation direction.
    pub fn momentum_axis(&self) -> na::Vector3<f64> {
        na::Vector3::new(
            self.i.sin() * self.raan.sin(),
            -self.i.sin() * self.raan.cos(),
            self.i.cos(),
        )
    }

    // Anomaly conversion functions
    pub fn true_to_eccentric_anomaly(nu: f64, e: f64) -> f64 {
        if e < 1e-11 {
            return normalize_angle(nu);
        }
        let cos_nu = nu.cos();
        normalize_angle(((1.0 - e * e).sqrt() * nu.sin()).atan2(e + cos_nu))
    }

    pub fn eccentric_to_mean_anomaly(E: f64, e: f64) -> f64 {
        normalize_angle(E - e * E.sin())
    }

    pub fn mean_to_eccentric_anomaly(M: f64, e: f64, tolerance: f64, max_iterations: i32) -> f64 {
        if e < 1e-11 {
            return normalize_angle(M);
        }

        // Initial guess
        let mut E = if M < PI { M + e / 2.0 } else { M - e / 2.0 };

        // Newton-Raphson iteration
        for _ in 0..max_iterations {
            let delta = (E - e * E.sin() - M) / (1.0 - e * E.cos());
            E -= delta;
            if delta.abs() <= tolerance {
                break;
            }
        }

        normalize_angle(E)
    }

    pub fn eccentric_to_true_anomaly(E: f64, e: f64) -> f64 {
        if e < 1e-11 {
            return normalize_angle(E);
        }
        normalize_angle(((1.0 - e * e).sqrt() * E.sin()).atan2(E.cos() - e))
    }
}
