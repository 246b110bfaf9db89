//! Faction AI: utility scoring over enumerated candidates
//!
//! Architecture: Trait + Data hybrid
//! - `OptionEnumerator` is the seam to the game: it lists what a faction could do this tick
//! - `WeightBank`s hold the rule catalog as named (predicate, weight) pairs
//! - `FactionAi` keeps per-faction memory (mode, opponent strengths, claimed territory)
//!   and picks the best-scoring candidate
//!
//! Candidates are scored from a base of 0 by summing the weights of every rule that applies.
//! The highest score wins; ties go to the candidate listed first.

pub mod context;
pub mod faction;
pub mod mode;
pub mod options;
pub mod rules;
pub mod scoring;
pub mod snapshot;
pub mod strength;
pub mod weights;

pub use context::{claimed_tiles, DecisionContext};
pub use faction::{decide_turns, FactionAi};
pub use mode::{FactionMode, ModeClassifier, PhaseThreshold, Posture, Protocol};
pub use options::{AttackTarget, TurnOption};
pub use rules::{build_banks, movement_rules, turn_action_rules};
pub use scoring::{explain, score, score_all, select, ScoreBreakdown, Selection, BASE_SCORE};
pub use snapshot::{ArmyView, BuildingView, GameSnapshot};
pub use strength::{classify, Observation, OwnForce, RelativeStrength, StrengthClassifier};
pub use weights::{Predicate, WeightBank, WeightFunction};

/// Lists the candidates a faction can choose from on the current tick
///
/// Implemented by the game layer. Turn options must be non-empty and include `TurnOption::Wait`;
/// attack targets may be empty when an army has nowhere to go.
pub trait OptionEnumerator {
    fn enumerate_turn_options(&self, snapshot: &GameSnapshot) -> Vec<TurnOption>;

    fn enumerate_attack_targets(&self, snapshot: &GameSnapshot, army: &ArmyView) -> Vec<AttackTarget>;
}
