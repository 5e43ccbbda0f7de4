pub mod body;
pub mod maneuver;

pub use body::{Body, BodyId, ExternalAccel};
pub use maneuver::{CompletionCallback, Maneuver, ManeuverKind, PlanSummary, TransferPlan};
