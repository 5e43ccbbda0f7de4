pub mod intercept;
pub mod recorder;

pub use intercept::{find_intercepts, Intercept};
pub use recorder::{TrajectoryRecorder, TrajectorySample};
