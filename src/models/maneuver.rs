use super::body::BodyId;
use nalgebra as na;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a maneuver edits the target body's velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ManeuverKind {
    /// Add the payload vector to the velocity.
    VectorDelta(na::Vector3<f64>),
    /// Add `payload * v_hat`: a prograde (or retrograde, if negative) burn
    /// along the current velocity direction.
    ScalarDelta(f64),
    /// Overwrite the velocity outright. Used when the plan already knows the
    /// exact post-burn velocity, e.g. arrival into a target orbit.
    SetVelocity(na::Vector3<f64>),
}

/// Callback fired synchronously after a maneuver is applied, with the
/// maneuver's scheduled time.
pub type CompletionCallback = Box<dyn FnOnce(f64)>;

/// A pending velocity edit against one body at an absolute simulation time.
/// Consumed exactly once, in non-decreasing time order.
pub struct Maneuver {
    pub body: BodyId,
    pub time: f64,
    pub kind: ManeuverKind,
    pub on_complete: Option<CompletionCallback>,
}

impl Maneuver {
    pub fn new(body: BodyId, time: f64, kind: ManeuverKind) -> Self {
        Maneuver {
            body,
            time,
            kind,
            on_complete: None,
        }
    }

    pub fn with_callback(mut self, callback: CompletionCallback) -> Self {
        self.on_complete = Some(callback);
        self
    }

    /// Delta-v magnitude this maneuver costs, given the velocity the body
    /// will have just before the burn.
    pub fn delta_v(&self, velocity_before: &na::Vector3<f64>) -> f64 {
        match self.kind {
            ManeuverKind::VectorDelta(dv) => dv.magnitude(),
            ManeuverKind::ScalarDelta(dv) => dv.abs(),
            ManeuverKind::SetVelocity(v) => (v - velocity_before).magnitude(),
        }
    }
}

impl fmt::Debug for Maneuver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Maneuver")
            .field("body", &self.body)
            .field("time", &self.time)
            .field("kind", &self.kind)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// An ordered maneuver sequence produced by a planner. Immutable once built:
/// the totals are computed at construction and the maneuvers are only read
/// out when the plan is scheduled.
#[derive(Debug)]
pub struct TransferPlan {
    pub algorithm: &'static str,
    pub maneuvers: Vec<Maneuver>,
    pub total_delta_v: f64,
    pub total_time: f64,
}

impl TransferPlan {
    pub fn new(
        algorithm: &'static str,
        maneuvers: Vec<Maneuver>,
        total_delta_v: f64,
        total_time: f64,
    ) -> Self {
        TransferPlan {
            algorithm,
            maneuvers,
            total_delta_v,
            total_time,
        }
    }

    /// A plan with nothing to do: the body is already on the target orbit.
    pub fn no_op(algorithm: &'static str) -> Self {
        Self::new(algorithm, Vec::new(), 0.0, 0.0)
    }

    pub fn is_no_op(&self) -> bool {
        self.maneuvers.is_empty()
    }

    /// Serializable digest for logging and CSV export.
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            algorithm: self.algorithm.to_string(),
            burn_count: self.maneuvers.len(),
            burn_times: self.maneuvers.iter().map(|m| m.time).collect(),
            total_delta_v: self.total_delta_v,
            total_time: self.total_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub algorithm: String,
    pub burn_count: usize,
    pub burn_times: Vec<f64>,
    pub total_delta_v: f64,
    pub total_time: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn id() -> BodyId {
        BodyId {
            index: 0,
            generation: 0,
        }
    }

    #[test]
    fn test_delta_v_per_kind() {
        let v = na::Vector3::new(3.0, 4.0, 0.0);

        let m = Maneuver::new(id(), 0.0, ManeuverKind::VectorDelta(na::Vector3::new(0.0, 3.0, 4.0)));
        assert_abs_diff_eq!(m.delta_v(&v), 5.0, epsilon = 1e-12);

        let m = Maneuver::new(id(), 0.0, ManeuverKind::ScalarDelta(-2.5));
        assert_abs_diff_eq!(m.delta_v(&v), 2.5, epsilon = 1e-12);

        let m = Maneuver::new(id(), 0.0, ManeuverKind::SetVelocity(na::Vector3::zeros()));
        assert_abs_diff_eq!(m.delta_v(&v), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_no_op_plan() {
        let plan = TransferPlan::no_op("hohmann");
        assert!(plan.is_no_op());
        assert_eq!(plan.total_delta_v, 0.0);
        assert_eq!(plan.summary().burn_count, 0);
    }
}
