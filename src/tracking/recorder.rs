use nalgebra as na;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One point of a predicted path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub position: na::Vector3<f64>,
    pub velocity: na::Vector3<f64>,
    pub time: f64,
}

/// Forward-looking record of a body's predicted path. Samples are appended in
/// time order and pruned from the front once simulation time passes them.
#[derive(Debug)]
pub struct TrajectoryRecorder {
    samples: VecDeque<TrajectorySample>,
    min_spacing: f64,
}

impl TrajectoryRecorder {
    pub fn new(min_spacing: f64) -> Self {
        TrajectoryRecorder {
            samples: VecDeque::new(),
            min_spacing,
        }
    }

    /// Appends a sample unless it is closer than `min_spacing` to the last
    /// recorded point. Samples must arrive in time order; anything earlier
    /// than the newest recorded point is dropped. Returns whether the sample
    /// was kept.
    pub fn sample(
        &mut self,
        position: na::Vector3<f64>,
        velocity: na::Vector3<f64>,
        time: f64,
    ) -> bool {
        if let Some(last) = self.samples.back() {
            if time < last.time || (position - last.position).magnitude() < self.min_spacing {
                return false;
            }
        }
        self.samples.push_back(TrajectorySample {
            position,
            velocity,
            time,
        });
        true
    }

    /// Drops samples older than `now` from the front.
    pub fn prune(&mut self, now: f64) {
        while let Some(front) = self.samples.front() {
            if front.time < now {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrajectorySample> {
        self.samples.iter()
    }

    /// Contiguous copy of the recorded path, for the intercept sweep.
    pub fn snapshot(&self) -> Vec<TrajectorySample> {
        self.samples.iter().copied().collect()
    }
}
