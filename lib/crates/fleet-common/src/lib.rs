pub mod minion;
pub mod target;

pub use minion::{MinionData, MinionId};
pub use target::{MatchReport, ScopeReport, TargetType, UnknownTargetType};
