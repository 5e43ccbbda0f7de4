use nalgebra as na;

/// A massive body seen as a gravity source: position plus μ = G·mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravitySource {
    pub position: na::Vector3<f64>,
    pub mu: f64,
}

/// Softened inverse-square acceleration at `position` from all `sources`.
///
/// The softening length keeps the force finite at near-zero separation; it is
/// added in quadrature to the true distance. With no sources the result is
/// zero and the body free-flights.
pub fn gravity_acceleration(
    position: &na::Vector3<f64>,
    sources: &[GravitySource],
    softening: f64,
) -> na::Vector3<f64> {
    let mut accel = na::Vector3::zeros();
    let soft2 = softening * softening;
    for source in sources {
        let d = source.position - position;
        let r2 = d.magnitude_squared() + soft2;
        accel += d * (source.mu / (r2 * r2.sqrt()));
    }
    accel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::G;
    use approx::assert_abs_diff_eq;
    use nalgebra as na;
    use test_case::test_case;

    const M_EARTH: f64 = 5.972e24;

    #[test_case(
        na::Vector3::new(6.371e6, 0.0, 0.0), // surface of an Earth-mass body
        na::Vector3::new(-9.81, 0.0, 0.0);
        "surface gravity"
    )]
    #[test_case(
        na::Vector3::new(6.871e6, 0.0, 0.0), // 500 km altitude
        na::Vector3::new(-8.44, 0.0, 0.0);
        "gravity at 500 km altitude"
    )]
    fn test_single_source(position: na::Vector3<f64>, expected: na::Vector3<f64>) {
        let sources = [GravitySource {
            position: na::Vector3::zeros(),
            mu: G * M_EARTH,
        }];
        let result = gravity_acceleration(&position, &sources, 0.0);
        assert_abs_diff_eq!(result, expected, epsilon = 1e-2);
    }

    #[test]
    fn test_no_sources_free_flight() {
        let a = gravity_acceleration(&na::Vector3::new(1.0, 2.0, 3.0), &[], 1e-3);
        assert_eq!(a, na::Vector3::zeros());
    }

    #[test]
    fn test_softening_bounds_force_at_zero_separation() {
        let sources = [GravitySource {
            position: na::Vector3::zeros(),
            mu: 1.0,
        }];
        let a = gravity_acceleration(&na::Vector3::zeros(), &sources, 1e-3);
        assert!(a.magnitude().is_finite());

        let a = gravity_acceleration(&na::Vector3::new(1e-9, 0.0, 0.0), &sources, 1e-3);
        assert!(a.magnitude() < 1.0 / (1e-3_f64).powi(2));
    }

    #[test]
    fn test_two_sources_superpose() {
        let sources = [
            GravitySource {
                position: na::Vector3::new(-1.0, 0.0, 0.0),
                mu: 1.0,
            },
            GravitySource {
                position: na::Vector3::new(1.0, 0.0, 0.0),
                mu: 1.0,
            },
        ];
        // Midpoint: the pulls cancel
        let a = gravity_acceleration(&na::Vector3::zeros(), &sources, 0.0);
        assert_abs_diff_eq!(a, na::Vector3::zeros(), epsilon = 1e-12);
    }
}
