//! Vitalis - vitality state machine for a role-play economy bot
//!
//! Combat resolution, death-save stabilization, and hospital
//! transport/healing, driven by independent periodic schedulers over
//! shared per-user records.

pub mod combat;
pub mod core;
pub mod economy;
pub mod hospital;
pub mod identity;
pub mod notify;
pub mod scheduler;
pub mod service;
pub mod stabilization;
pub mod storage;
pub mod timers;
pub mod vitality;
