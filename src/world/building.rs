//! Buildings on the hex map

use serde::{Deserialize, Serialize};

use crate::core::types::{BuildingId, HexCoord, PlayerId};

/// Defensive value a building is left with once it has been overrun
pub const DESTROYED_DEFENSIVE_VALUE: i32 = -1;

/// Type of building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingType {
    Hut,
    Farm,
    Villa,
    Barracks,
    Camp1,
    Camp2,
    Camp3,
    Village1,
    Village2,
    Village3,
}

impl BuildingType {
    /// Defensive value of a fully built building of this type
    pub fn base_defensive_value(&self) -> i32 {
        match self {
            BuildingType::Hut => 2,
            BuildingType::Farm => 1,
            BuildingType::Villa => 5,
            BuildingType::Barracks => 4,
            BuildingType::Camp1 => 2,
            BuildingType::Camp2 => 4,
            BuildingType::Camp3 => 6,
            BuildingType::Village1 => 1,
            BuildingType::Village2 => 2,
            BuildingType::Village3 => 3,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BuildingType::Hut => "hut",
            BuildingType::Farm => "farm",
            BuildingType::Villa => "villa",
            BuildingType::Barracks => "barracks",
            BuildingType::Camp1 => "barbaric camp level 1",
            BuildingType::Camp2 => "barbaric camp level 2",
            BuildingType::Camp3 => "barbaric camp level 3",
            BuildingType::Village1 => "village level 1",
            BuildingType::Village2 => "village level 2",
            BuildingType::Village3 => "village level 3",
        }
    }
}

/// Current state of a building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingState {
    /// Construction site - not yet usable
    UnderConstruction,
    /// Fully operational
    Active,
    Destroyed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub building_type: BuildingType,
    pub owner: PlayerId,
    pub position: HexCoord,
    pub state: BuildingState,
    pub defensive_value: i32,
}

impl Building {
    /// A finished, active building
    pub fn new(id: BuildingId, building_type: BuildingType, owner: PlayerId, position: HexCoord) -> Self {
        Self {
            id,
            building_type,
            owner,
            position,
            state: BuildingState::Active,
            defensive_value: building_type.base_defensive_value(),
        }
    }

    pub fn under_construction(mut self) -> Self {
        self.state = BuildingState::UnderConstruction;
        self
    }

    pub fn with_defensive_value(mut self, value: i32) -> Self {
        self.defensive_value = value;
        self
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == BuildingState::Destroyed || self.defensive_value == DESTROYED_DEFENSIVE_VALUE
    }

    pub fn mark_destroyed(&mut self) {
        self.defensive_value = DESTROYED_DEFENSIVE_VALUE;
        self.state = BuildingState::Destroyed;
    }
}
