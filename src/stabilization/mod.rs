pub mod engine;
pub mod status;

pub use engine::{RollOutcome, RollPassSummary, StabilizationEngine};
pub use status::{StabilizationStatus, StabilizationStore};
