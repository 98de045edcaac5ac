pub mod admission;
pub mod audit;
pub mod billing;
pub mod engine;

pub use admission::{AdmissionQuery, AdmissionStore, HospitalAdmission};
pub use audit::{HospitalAction, HospitalActionLog, HospitalLogEntry};
pub use engine::{CycleSummary, DischargeMode, HealingReport, HospitalEngine};
