use thiserror::Error;

#[derive(Error, Debug)]
pub enum VitalError {
    /// Bad target or actor: self-attack, non-player target, unconscious
    /// attacker. Checked before any mutation.
    #[error("invalid action: {0}")]
    Validation(String),

    /// The operation contradicts current state: on cooldown, already
    /// hospitalized, in combat. Checked before any mutation.
    #[error("state conflict: {0}")]
    StateConflict(String),

    /// Billing failed on every payment path
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds { needed: i64, available: i64 },

    /// Storage read/write failure; aborts only the operation in progress
    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VitalError>;
