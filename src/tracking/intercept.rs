use super::recorder::TrajectorySample;
use nalgebra as na;
use serde::{Deserialize, Serialize};

/// A continuous crossing produces a run of near-duplicate candidate pairs;
/// candidates within this multiple of the tolerances collapse into one
/// cluster, of which only the closest approach survives.
const CLUSTER_EXPANSION: f64 = 4.0;

/// A point where two recorded trajectories pass within tolerance of each
/// other in both space and time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intercept {
    pub time_a: f64,
    pub time_b: f64,
    pub position_a: na::Vector3<f64>,
    pub position_b: na::Vector3<f64>,
    /// Separation distance at the paired samples.
    pub separation: f64,
    /// Magnitude of the velocity difference: the closing speed a rendezvous
    /// burn would have to absorb.
    pub relative_speed: f64,
    pub time_delta: f64,
}

/// Finds the points where two recorded paths cross within `distance_tol`
/// (per axis and in Euclidean distance) and `time_tol`.
///
/// Both point sets are sorted lexicographically by coordinate so a
/// merge-style sweep over x can skip pairs that cannot be close. Candidate
/// pairs are then clustered and reduced to the closest approach per cluster,
/// yielding one intercept per physical crossing, sorted by time.
pub fn find_intercepts(
    a: &[TrajectorySample],
    b: &[TrajectorySample],
    distance_tol: f64,
    time_tol: f64,
) -> Vec<Intercept> {
    let mut sorted_a: Vec<&TrajectorySample> = a.iter().collect();
    let mut sorted_b: Vec<&TrajectorySample> = b.iter().collect();
    sorted_a.sort_by(|p, q| lex_order(&p.position, &q.position));
    sorted_b.sort_by(|p, q| lex_order(&p.position, &q.position));

    let mut candidates = Vec::new();
    let mut start = 0usize;
    for sa in &sorted_a {
        // Advance the window past samples that are too far below in x
        while start < sorted_b.len() && sorted_b[start].position.x < sa.position.x - distance_tol {
            start += 1;
        }
        for sb in &sorted_b[start..] {
            if sb.position.x > sa.position.x + distance_tol {
                break;
            }
            if (sb.position.y - sa.position.y).abs() > distance_tol
                || (sb.position.z - sa.position.z).abs() > distance_tol
            {
                continue;
            }
            if (sb.time - sa.time).abs() > time_tol {
                continue;
            }
            let separation = (sb.position - sa.position).magnitude();
            if separation > distance_tol {
                continue;
            }
            candidates.push(Intercept {
                time_a: sa.time,
                time_b: sb.time,
                position_a: sa.position,
                position_b: sb.position,
                separation,
                relative_speed: (sb.velocity - sa.velocity).magnitude(),
                time_delta: (sb.time - sa.time).abs(),
            });
        }
    }

    // Cluster near-duplicates and keep the closest approach of each cluster
    candidates.sort_by(|p, q| p.time_a.total_cmp(&q.time_a));
    let mut clusters: Vec<Intercept> = Vec::new();
    for cand in candidates {
        let mut merged = false;
        for best in clusters.iter_mut() {
            let spatial = (cand.position_a - best.position_a).magnitude();
            let temporal = (cand.time_a - best.time_a).abs();
            if spatial <= CLUSTER_EXPANSION * distance_tol
                && temporal <= CLUSTER_EXPANSION * time_tol
            {
                if cand.separation < best.separation {
                    *best = cand;
                }
                merged = true;
                break;
            }
        }
        if !merged {
            clusters.push(cand);
        }
    }

    clusters.sort_by(|p, q| p.time_a.total_cmp(&q.time_a));
    clusters
}

fn lex_order(p: &na::Vector3<f64>, q: &na::Vector3<f64>) -> std::cmp::Ordering {
    p.x.total_cmp(&q.x)
        .then(p.y.total_cmp(&q.y))
        .then(p.z.total_cmp(&q.z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TAU;
    use nalgebra as na;

    fn circle_samples(
        center: na::Vector3<f64>,
        radius: f64,
        steps: usize,
        period: f64,
    ) -> Vec<TrajectorySample> {
        let omega = TAU / period;
        (0..steps)
            .map(|k| {
                let t = k as f64 * period / steps as f64;
                let theta = omega * t;
                TrajectorySample {
                    position: center
                        + na::Vector3::new(radius * theta.cos(), radius * theta.sin(), 0.0),
                    velocity: na::Vector3::new(
                        -radius * omega * theta.sin(),
                        radius * omega * theta.cos(),
                        0.0,
                    ),
                    time: t,
                }
            })
            .collect()
    }

    #[test]
    fn test_disjoint_paths_have_no_intercepts() {
        let a = circle_samples(na::Vector3::zeros(), 10.0, 100, 100.0);
        let b = circle_samples(na::Vector3::new(100.0, 0.0, 0.0), 10.0, 100, 100.0);
        assert!(find_intercepts(&a, &b, 0.5, 1e9).is_empty());
    }

    #[test]
    fn test_offset_circles_cross_exactly_twice() {
        // Two equal-radius circles whose centers are offset cross at exactly
        // two points. The count must not depend on sampling density.
        let offset = na::Vector3::new(6.0, 0.0, 0.0);
        for steps in [180usize, 1440] {
            let a = circle_samples(na::Vector3::zeros(), 10.0, steps, 100.0);
            let b = circle_samples(offset, 10.0, steps, 100.0);
            let hits = find_intercepts(&a, &b, 0.5, 1e9);
            assert_eq!(
                hits.len(),
                2,
                "expected 2 intercepts at {} samples, got {}",
                steps,
                hits.len()
            );
            assert!(hits[0].time_a <= hits[1].time_a);
        }
    }

    #[test]
    fn test_time_tolerance_gates_candidates() {
        // Same geometric path, but B lags far behind in time.
        let a = circle_samples(na::Vector3::zeros(), 10.0, 360, 100.0);
        let mut b = circle_samples(na::Vector3::zeros(), 10.0, 360, 100.0);
        for s in b.iter_mut() {
            s.time += 1000.0;
        }
        assert!(find_intercepts(&a, &b, 0.5, 1.0).is_empty());
    }

    #[test]
    fn test_intercept_carries_relative_speed() {
        let a = vec![TrajectorySample {
            position: na::Vector3::zeros(),
            velocity: na::Vector3::new(1.0, 0.0, 0.0),
            time: 0.0,
        }];
        let b = vec![TrajectorySample {
            position: na::Vector3::new(0.1, 0.0, 0.0),
            velocity: na::Vector3::new(-1.0, 0.0, 0.0),
            time: 0.2,
        }];
        let hits = find_intercepts(&a, &b, 0.5, 1.0);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].relative_speed - 2.0).abs() < 1e-12);
        assert!((hits[0].time_delta - 0.2).abs() < 1e-12);
    }
}
