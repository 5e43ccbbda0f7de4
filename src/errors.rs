use thiserror::Error;

/// Logic errors on the engine surface: operations against bodies that do not
/// exist (or no longer exist), or scheduling into the past. These indicate a
/// caller bug, not a recoverable runtime condition.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum EngineError {
    #[error("body handle does not refer to a registered body")]
    UnknownBody,
    #[error("maneuver scheduled at t={time} but simulation time is already t={now}")]
    ManeuverInPast { time: f64, now: f64 },
    #[error("body is not being recorded")]
    NotRecording,
}

/// Failure modes of the iterative Lambert solvers. The codes are distinct so
/// a caller can switch solver strategy: `DegenerateGeometry` from the
/// universal-variable solver is the cue to retry with the Battin formulation.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum LambertError {
    #[error("solver did not converge within {iterations} iterations")]
    MaxIterations { iterations: usize },
    #[error("auxiliary variable stayed negative; transfer time too short for this geometry")]
    NegativeRadicand,
    #[error("180-degree transfer geometry leaves the transfer plane undetermined")]
    DegenerateGeometry,
}

/// Planner precondition violations and numeric failures. No variant carries a
/// partial plan; planning either succeeds completely or returns one of these.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum PlanError {
    #[error("orbit is not circular (e = {e}); this planner requires circular orbits")]
    NotCircular { e: f64 },
    #[error("orbit radii differ (r1 = {r1}, r2 = {r2}); this planner requires equal radii")]
    RadiusMismatch { r1: f64, r2: f64 },
    #[error("orbit planes are not coplanar; use the plane-change or general planner")]
    NotCoplanar,
    #[error("orbits rotate in opposite directions; no continuous transfer exists")]
    OppositeRotation,
    #[error("overshoot ratio {ratio} must exceed 1.0")]
    InvalidOvershoot { ratio: f64 },
    #[error("no phasing orbit found within {attempts} attempts")]
    PhasingExhausted { attempts: usize },
    #[error("trajectory is purely radial; no orbit plane is defined")]
    RadialTrajectory,
    #[error(transparent)]
    Lambert(#[from] LambertError),
}
