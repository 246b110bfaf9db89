//! Combat resolution between armies and buildings

pub mod constants;
pub mod report;
pub mod resolution;

pub use report::{
    BattleKind, BattleLogSink, BattleOutcome, BattleReport, DefenderSnapshot, DiscardSink,
    RemovalShortfall,
};
pub use resolution::{army_vs_army, army_vs_building, resolve_combat, Defender, Engagement};
