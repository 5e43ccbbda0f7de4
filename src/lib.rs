pub mod constants;
pub mod engine;
pub mod errors;
pub mod gnc;
pub mod integrators;
pub mod models;
pub mod physics;
pub mod tracking;

pub use engine::{GravityConfig, ManeuverId, OrbitalEngine};
pub use errors::{EngineError, LambertError, PlanError};
pub use models::{Body, BodyId, Maneuver, ManeuverKind, PlanSummary, TransferPlan};
pub use physics::orbital::OrbitElements;
pub use tracking::{Intercept, TrajectoryRecorder, TrajectorySample};
