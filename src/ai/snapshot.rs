//! Read-only view of the game a faction reasons over each turn
//!
//! Built once per tick by the simulation layer. The decision engine never mutates it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::types::{ArmyId, BuildingId, HexCoord, PlayerId, Tick};
use crate::world::{Army, Building, BuildingState, BuildingType, UnitCounts};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingView {
    pub id: BuildingId,
    pub building_type: BuildingType,
    pub state: BuildingState,
    pub defensive_value: i32,
    pub position: HexCoord,
}

impl From<&Building> for BuildingView {
    fn from(building: &Building) -> Self {
        Self {
            id: building.id,
            building_type: building.building_type,
            state: building.state,
            defensive_value: building.defensive_value,
            position: building.position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmyView {
    pub id: ArmyId,
    pub owner: PlayerId,
    pub position: HexCoord,
    pub units: UnitCounts,
    pub attack_strength: u32,
    pub defence_strength: u32,
    pub population: u32,
}

impl From<&Army> for ArmyView {
    fn from(army: &Army) -> Self {
        Self {
            id: army.id,
            owner: army.owner,
            position: army.position,
            units: army.unit_counts(),
            attack_strength: army.attack_strength(),
            defence_strength: army.defence_strength(),
            population: army.population(),
        }
    }
}

/// Per-tick game status from one player's point of view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSnapshot {
    pub player: PlayerId,
    pub tick: Tick,
    pub resources: i32,
    pub food: i32,
    /// Food gained (positive) or lost (negative) per turn
    pub food_balance: i32,
    pub population: u32,
    pub population_limit: u32,
    /// Own buildings
    pub buildings: Vec<BuildingView>,
    /// Own armies
    pub armies: Vec<ArmyView>,
    /// Armies of other players currently in sight
    pub opponent_armies: Vec<ArmyView>,
    pub discovered_tiles: BTreeSet<HexCoord>,
    pub hostile_players: BTreeSet<PlayerId>,
}

impl GameSnapshot {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            ..Self::default()
        }
    }

    pub fn is_losing_food(&self) -> bool {
        self.food_balance < 0
    }

    /// Buildings that still stand (active or under construction)
    pub fn standing_buildings(&self) -> impl Iterator<Item = &BuildingView> {
        self.buildings
            .iter()
            .filter(|b| b.state != BuildingState::Destroyed)
    }

    pub fn building_count(&self) -> usize {
        self.standing_buildings().count()
    }

    pub fn active_buildings_of(&self, building_type: BuildingType) -> usize {
        self.buildings
            .iter()
            .filter(|b| b.building_type == building_type && b.state == BuildingState::Active)
            .count()
    }

    pub fn has_under_construction(&self, building_type: BuildingType) -> bool {
        self.buildings.iter().any(|b| {
            b.building_type == building_type && b.state == BuildingState::UnderConstruction
        })
    }

    pub fn has_army(&self) -> bool {
        !self.armies.is_empty()
    }

    pub fn army_population(&self) -> u32 {
        self.armies.iter().map(|a| a.population).sum()
    }

    /// Attack strength of the strongest own army, 0 without armies
    pub fn strongest_attack(&self) -> u32 {
        self.armies
            .iter()
            .map(|a| a.attack_strength)
            .max()
            .unwrap_or(0)
    }

    /// Defence strength of the sturdiest own army, 0 without armies
    pub fn strongest_defence(&self) -> u32 {
        self.armies
            .iter()
            .map(|a| a.defence_strength)
            .max()
            .unwrap_or(0)
    }

    pub fn is_hostile(&self, player: PlayerId) -> bool {
        self.hostile_players.contains(&player)
    }

    pub fn army(&self, id: ArmyId) -> Option<&ArmyView> {
        self.armies.iter().find(|a| a.id == id)
    }
}
