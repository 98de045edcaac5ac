pub mod dice;
pub mod engine;
pub mod query;

pub use dice::{DiceRoller, RngRoller, ScriptedRoller};
pub use engine::{AttackKind, AttackReport, CombatEngine};
pub use query::CombatStatusQuery;
