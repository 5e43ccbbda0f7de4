use nalgebra as na;
use std::fmt;

/// External acceleration source attached to a body at registration time.
/// Queried once per integration sub-step with (time, position, velocity).
pub type ExternalAccel =
    Box<dyn Fn(f64, &na::Vector3<f64>, &na::Vector3<f64>) -> na::Vector3<f64>>;

/// Generational handle into the engine's body table. A deregistered slot is
/// reused with a bumped generation, so a stale handle can never alias a new
/// body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}.{}", self.index, self.generation)
    }
}

/// A point mass advanced by the propagator. Mass 0.0 marks a massless test
/// body: it feels gravity but exerts none, and takes the leapfrog fast path.
pub struct Body {
    pub mass: f64,
    pub position: na::Vector3<f64>,
    pub velocity: na::Vector3<f64>,
    pub active: bool,
    pub external_accel: Option<ExternalAccel>,
}

impl Body {
    pub fn new(mass: f64, position: na::Vector3<f64>, velocity: na::Vector3<f64>) -> Self {
        Body {
            mass,
            position,
            velocity,
            active: true,
            external_accel: None,
        }
    }

    pub fn with_external_accel(mut self, accel: ExternalAccel) -> Self {
        self.external_accel = Some(accel);
        self
    }

    pub fn is_test_body(&self) -> bool {
        self.mass == 0.0
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("mass", &self.mass)
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .field("active", &self.active)
            .field("external_accel", &self.external_accel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_flags() {
        let b = Body::new(0.0, na::Vector3::zeros(), na::Vector3::zeros());
        assert!(b.is_test_body());
        assert!(b.active);
        assert!(b.external_accel.is_none());

        let b = Body::new(5.972e24, na::Vector3::zeros(), na::Vector3::zeros());
        assert!(!b.is_test_body());
    }

    #[test]
    fn test_external_accel_attaches() {
        let b = Body::new(0.0, na::Vector3::zeros(), na::Vector3::zeros())
            .with_external_accel(Box::new(|_, _, _| na::Vector3::new(0.0, 0.0, -9.81)));
        let a = (b.external_accel.as_ref().unwrap())(0.0, &b.position, &b.velocity);
        assert_eq!(a.z, -9.81);
    }
}
