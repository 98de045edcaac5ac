pub mod config;
pub mod error;
pub mod gate;
pub mod types;

pub use config::VitalisConfig;
pub use error::{Result, VitalError};
pub use types::{Clock, ManualClock, Severity, SystemClock, Timestamp, UserId};
