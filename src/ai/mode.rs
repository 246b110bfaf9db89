//! Faction game phase ("protocol") and posture ("state")
//!
//! The protocol only ever moves forward: early -> mid -> late. The posture is recomputed
//! every turn from the faction's army, recent losses and how its hostile opponents compare.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::snapshot::GameSnapshot;
use super::strength::{RelativeStrength, StrengthClassifier};
use crate::core::config::FactionConfig;
use crate::core::types::Tick;

/// Coarse game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    EarlyGame,
    MidGame,
    LateGame,
}

/// Behavioural posture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Posture {
    Passive,
    Defensive,
    Aggressive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionMode {
    pub protocol: Protocol,
    pub posture: Posture,
}

impl Default for FactionMode {
    fn default() -> Self {
        Self {
            protocol: Protocol::EarlyGame,
            posture: Posture::Passive,
        }
    }
}

/// Condition that moves the protocol into a later phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseThreshold {
    /// Phase starts at this many elapsed turns at the latest
    pub tick: Tick,
    /// ...or earlier, once both resources and population reach these
    pub resources: i32,
    pub population: u32,
}

impl PhaseThreshold {
    pub fn is_triggered(&self, snapshot: &GameSnapshot, elapsed_ticks: Tick) -> bool {
        elapsed_ticks >= self.tick
            || (snapshot.resources >= self.resources && snapshot.population >= self.population)
    }
}

/// Tracks protocol and posture across turns
#[derive(Debug, Clone)]
pub struct ModeClassifier {
    mid_game: PhaseThreshold,
    late_game: PhaseThreshold,
    aggressive_min_population: u32,
    mode: FactionMode,
    last_building_count: Option<usize>,
    last_army_population: Option<u32>,
    invaded: bool,
}

impl ModeClassifier {
    pub fn new(config: &FactionConfig) -> Self {
        Self {
            mid_game: PhaseThreshold {
                tick: config.mid_game_tick,
                resources: config.mid_game_resources,
                population: config.mid_game_population,
            },
            late_game: PhaseThreshold {
                tick: config.late_game_tick,
                resources: config.late_game_resources,
                population: config.late_game_population,
            },
            aggressive_min_population: config.aggressive_min_population,
            mode: FactionMode::default(),
            last_building_count: None,
            last_army_population: None,
            invaded: false,
        }
    }

    pub fn mode(&self) -> FactionMode {
        self.mode
    }

    /// Record that an enemy army entered own territory; the next update turns defensive
    pub fn note_invasion(&mut self) {
        self.invaded = true;
    }

    pub fn update(
        &mut self,
        snapshot: &GameSnapshot,
        elapsed_ticks: Tick,
        strengths: &StrengthClassifier,
    ) -> FactionMode {
        let protocol = self.next_protocol(snapshot, elapsed_ticks);
        if protocol != self.mode.protocol {
            info!(player = %snapshot.player, from = ?self.mode.protocol, to = ?protocol, "protocol advanced");
        }

        let building_count = snapshot.building_count();
        let army_population = snapshot.army_population();
        let lost_buildings = self
            .last_building_count
            .is_some_and(|previous| building_count < previous);
        let lost_troops = self
            .last_army_population
            .is_some_and(|previous| army_population < previous);
        let recent_losses = lost_buildings || lost_troops || self.invaded;

        let posture = if !snapshot.has_army() || recent_losses {
            Posture::Defensive
        } else if protocol != Protocol::EarlyGame
            && army_population >= self.aggressive_min_population
            && snapshot
                .hostile_players
                .iter()
                .any(|&p| strengths.get(p) == RelativeStrength::Weaker)
        {
            Posture::Aggressive
        } else {
            Posture::Passive
        };

        self.last_building_count = Some(building_count);
        self.last_army_population = Some(army_population);
        self.invaded = false;
        self.mode = FactionMode { protocol, posture };
        self.mode
    }

    fn next_protocol(&self, snapshot: &GameSnapshot, elapsed_ticks: Tick) -> Protocol {
        let reached = if self.late_game.is_triggered(snapshot, elapsed_ticks) {
            Protocol::LateGame
        } else if self.mid_game.is_triggered(snapshot, elapsed_ticks) {
            Protocol::MidGame
        } else {
            Protocol::EarlyGame
        };
        reached.max(self.mode.protocol)
    }
}
