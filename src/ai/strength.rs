//! Relative strength of opponents, learned from sightings and battles

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combat::{BattleKind, BattleReport};
use crate::core::types::{HexCoord, PlayerId};

/// How an opponent compares to this faction, ordered from least to most threatening
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeStrength {
    Weaker,
    Equal,
    Stronger,
}

/// Compare own and opponent values with the same `>=` convention combat uses
///
/// Ties are `Equal`.
pub fn classify(self_value: f64, opponent_value: f64) -> RelativeStrength {
    let self_holds = self_value >= opponent_value;
    let opponent_holds = opponent_value >= self_value;
    match (self_holds, opponent_holds) {
        (true, true) => RelativeStrength::Equal,
        (false, true) => RelativeStrength::Stronger,
        _ => RelativeStrength::Weaker,
    }
}

/// Strongest figures among a faction's own armies, the yardstick for sightings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnForce {
    pub attack: u32,
    pub defence: u32,
}

/// Events reported by the scouting and combat layers
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    ArmySighted {
        owner: PlayerId,
        attack_strength: u32,
        defence_strength: u32,
    },
    BattleReported(BattleReport),
    EnemyBuildingScouted {
        owner: PlayerId,
        position: HexCoord,
    },
    EnemyArmyInvading {
        owner: PlayerId,
        position: HexCoord,
    },
}

/// Per-opponent strength table
#[derive(Debug, Clone)]
pub struct StrengthClassifier {
    player: PlayerId,
    table: AHashMap<PlayerId, RelativeStrength>,
}

impl StrengthClassifier {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            table: AHashMap::new(),
        }
    }

    /// Strength of an opponent, `Equal` until something was observed
    pub fn get(&self, opponent: PlayerId) -> RelativeStrength {
        self.known(opponent).unwrap_or(RelativeStrength::Equal)
    }

    pub fn known(&self, opponent: PlayerId) -> Option<RelativeStrength> {
        self.table.get(&opponent).copied()
    }

    pub fn set(&mut self, opponent: PlayerId, strength: RelativeStrength) {
        if opponent == self.player {
            return;
        }
        let previous = self.table.insert(opponent, strength);
        if previous != Some(strength) {
            debug!(player = %self.player, %opponent, ?strength, "opponent strength reclassified");
        }
    }

    /// Opponents with a recorded classification, sorted by id
    pub fn entries(&self) -> Vec<(PlayerId, RelativeStrength)> {
        let mut entries: Vec<_> = self.table.iter().map(|(&p, &s)| (p, s)).collect();
        entries.sort_by_key(|(p, _)| *p);
        entries
    }

    /// Fold an observation into the table
    ///
    /// A sighted army is measured twice: own attack against its defence, and its attack
    /// against own defence. The more threatening reading is kept.
    pub fn observe(&mut self, observation: &Observation, own: OwnForce) {
        match observation {
            Observation::ArmySighted {
                owner,
                attack_strength,
                defence_strength,
            } => {
                let breaking = classify(own.attack as f64, *defence_strength as f64);
                let holding = classify(own.defence as f64, *attack_strength as f64);
                self.set(*owner, breaking.max(holding));
            }
            Observation::BattleReported(report) => self.observe_battle(report),
            Observation::EnemyBuildingScouted { owner, .. }
            | Observation::EnemyArmyInvading { owner, .. } => {
                if *owner != self.player && !self.table.contains_key(owner) {
                    self.set(*owner, RelativeStrength::Equal);
                }
            }
        }
    }

    fn observe_battle(&mut self, report: &BattleReport) {
        // Building defence says nothing about an opponent's armies
        if report.kind != BattleKind::ArmyVsArmy {
            return;
        }

        if report.attacker_owner == self.player {
            self.set(
                report.defender_owner,
                classify(report.attack_value, report.defence_value),
            );
        } else if report.defender_owner == self.player {
            self.set(
                report.attacker_owner,
                classify(report.defence_value, report.attack_value),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{BattleOutcome, DefenderSnapshot};
    use crate::world::UnitCounts;

    fn report(attacker: u32, defender: u32, attack: f64, defence: f64) -> BattleReport {
        BattleReport {
            kind: BattleKind::ArmyVsArmy,
            attacker_name: "a".into(),
            defender_name: "d".into(),
            attacker_owner: PlayerId(attacker),
            defender_owner: PlayerId(defender),
            attacker_before: UnitCounts::default(),
            attacker_after: UnitCounts::default(),
            defender_before: DefenderSnapshot::Units(UnitCounts::default()),
            defender_after: DefenderSnapshot::Units(UnitCounts::default()),
            attack_value: attack,
            defence_value: defence,
            outcome: BattleOutcome::Draw,
            shortfalls: Vec::new(),
        }
    }

    #[test]
    fn test_classify_ties_are_equal() {
        assert_eq!(classify(5.0, 5.0), RelativeStrength::Equal);
        assert_eq!(classify(5.0, 7.0), RelativeStrength::Stronger);
        assert_eq!(classify(7.0, 5.0), RelativeStrength::Weaker);
    }

    #[test]
    fn test_unknown_opponent_reads_equal() {
        let classifier = StrengthClassifier::new(PlayerId(1));
        assert_eq!(classifier.known(PlayerId(2)), None);
        assert_eq!(classifier.get(PlayerId(2)), RelativeStrength::Equal);
    }

    #[test]
    fn test_battle_as_attacker_and_defender() {
        let mut classifier = StrengthClassifier::new(PlayerId(1));

        classifier.observe(&Observation::BattleReported(report(1, 2, 12.0, 4.0)), OwnForce::default());
        assert_eq!(classifier.get(PlayerId(2)), RelativeStrength::Weaker);

        // Player 3 attacked us with more than we could hold
        classifier.observe(&Observation::BattleReported(report(3, 1, 9.0, 3.0)), OwnForce::default());
        assert_eq!(classifier.get(PlayerId(3)), RelativeStrength::Stronger);
    }

    #[test]
    fn test_third_party_battles_ignored() {
        let mut classifier = StrengthClassifier::new(PlayerId(1));
        classifier.observe(&Observation::BattleReported(report(2, 3, 9.0, 3.0)), OwnForce::default());
        assert!(classifier.entries().is_empty());
    }

    #[test]
    fn test_sighting_compares_against_own_attack() {
        let mut classifier = StrengthClassifier::new(PlayerId(1));
        let sighting = Observation::ArmySighted {
            owner: PlayerId(2),
            attack_strength: 10,
            defence_strength: 6,
        };
        classifier.observe(&sighting, OwnForce { attack: 4, defence: 12 });
        assert_eq!(classifier.get(PlayerId(2)), RelativeStrength::Stronger);
        classifier.observe(&sighting, OwnForce { attack: 9, defence: 12 });
        assert_eq!(classifier.get(PlayerId(2)), RelativeStrength::Weaker);
        classifier.observe(&sighting, OwnForce { attack: 6, defence: 12 });
        assert_eq!(classifier.get(PlayerId(2)), RelativeStrength::Equal);
    }

    #[test]
    fn test_sighting_weighs_their_attack_against_own_defence() {
        let mut classifier = StrengthClassifier::new(PlayerId(1));
        let sighting = Observation::ArmySighted {
            owner: PlayerId(2),
            attack_strength: 10,
            defence_strength: 6,
        };
        // We would break their line, but they would break ours too
        classifier.observe(&sighting, OwnForce { attack: 9, defence: 5 });
        assert_eq!(classifier.get(PlayerId(2)), RelativeStrength::Stronger);
        classifier.observe(&sighting, OwnForce { attack: 9, defence: 10 });
        assert_eq!(classifier.get(PlayerId(2)), RelativeStrength::Equal);
    }

    #[test]
    fn test_strength_order_follows_threat() {
        assert!(RelativeStrength::Weaker < RelativeStrength::Equal);
        assert!(RelativeStrength::Equal < RelativeStrength::Stronger);
    }

    #[test]
    fn test_invasion_marks_opponent_known_without_overwriting() {
        let mut classifier = StrengthClassifier::new(PlayerId(1));
        classifier.set(PlayerId(2), RelativeStrength::Weaker);
        classifier.observe(
            &Observation::EnemyArmyInvading {
                owner: PlayerId(2),
                position: HexCoord::new(0, 0),
            },
            OwnForce::default(),
        );
        classifier.observe(
            &Observation::EnemyBuildingScouted {
                owner: PlayerId(3),
                position: HexCoord::new(4, 4),
            },
            OwnForce::default(),
        );
        assert_eq!(classifier.get(PlayerId(2)), RelativeStrength::Weaker);
        assert_eq!(classifier.known(PlayerId(3)), Some(RelativeStrength::Equal));
    }
}
