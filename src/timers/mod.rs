//! TTL-indexed timer registries
//!
//! Cooldowns and reaction windows are stored as plain expiry timestamps
//! beside each record and scanned by the one-second driver. A timer that
//! becomes moot is simply removed and never re-armed; nothing else needs
//! to learn about the cancellation.

pub mod cooldown;
pub mod reaction;

pub use cooldown::CooldownTracker;
pub use reaction::{ReactionWindow, ReactionWindows, WindowState};
