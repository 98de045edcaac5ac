pub mod record;
pub mod state;
pub mod store;

pub use record::{ability_modifier, Vitality};
pub use state::VitalState;
pub use store::{MemoryVitalityStore, VitalityStore};
