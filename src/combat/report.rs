//! Battle reports and the sinks that receive them
//!
//! A report is the audit record of one resolution: who fought, unit counts before and after,
//! and the outcome. Storage and formatting belong to whoever owns the sink.

use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};

use crate::core::types::{ArmyId, PlayerId};
use crate::world::{UnitCounts, UnitType};

/// Outcome of a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleOutcome {
    AttackerWon,
    DefenderWon,
    /// Both sides reached the other's value
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleKind {
    ArmyVsArmy,
    ArmyVsBuilding,
}

/// Defender side of a report: unit counts for armies, defensive value for buildings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenderSnapshot {
    Units(UnitCounts),
    DefensiveValue(i32),
}

/// Population of a type that casualties asked for but whole units could not cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalShortfall {
    pub army: ArmyId,
    pub unit_type: UnitType,
    pub requested: u32,
    pub removed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    pub kind: BattleKind,
    pub attacker_name: String,
    pub defender_name: String,
    pub attacker_owner: PlayerId,
    pub defender_owner: PlayerId,
    pub attacker_before: UnitCounts,
    pub attacker_after: UnitCounts,
    pub defender_before: DefenderSnapshot,
    pub defender_after: DefenderSnapshot,
    /// Attack value used in the comparison (after flooring)
    pub attack_value: f64,
    /// Defence value used in the comparison (after flooring)
    pub defence_value: f64,
    pub outcome: BattleOutcome,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shortfalls: Vec<RemovalShortfall>,
}

impl BattleReport {
    pub fn attacker_casualties(&self) -> u32 {
        self.attacker_before
            .total()
            .saturating_sub(self.attacker_after.total())
    }

    /// Defender unit losses, `None` for buildings
    pub fn defender_casualties(&self) -> Option<u32> {
        match (&self.defender_before, &self.defender_after) {
            (DefenderSnapshot::Units(before), DefenderSnapshot::Units(after)) => {
                Some(before.total().saturating_sub(after.total()))
            }
            _ => None,
        }
    }
}

/// Receiver of battle reports
pub trait BattleLogSink {
    fn record(&mut self, report: BattleReport);
}

impl BattleLogSink for Vec<BattleReport> {
    fn record(&mut self, report: BattleReport) {
        self.push(report);
    }
}

impl BattleLogSink for Sender<BattleReport> {
    fn record(&mut self, report: BattleReport) {
        if self.send(report).is_err() {
            tracing::debug!("battle report receiver dropped, report discarded");
        }
    }
}

/// Sink for callers that only care about the outcome
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl BattleLogSink for DiscardSink {
    fn record(&mut self, _report: BattleReport) {}
}
