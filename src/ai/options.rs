//! Candidate turn actions and movement/attack targets
//!
//! Both are closed enums produced by the external enumerator each tick and dropped after
//! selection. Rules match on the variant they care about and ignore the rest.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::{ArmyId, BuildingId, HexCoord, PlayerId};
use crate::world::{BuildingType, UnitType};

/// Something a faction can do with its turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "option")]
pub enum TurnOption {
    Build { building_type: BuildingType },
    Recruit { unit_type: UnitType },
    RaiseArmy,
    /// Explore, optionally towards a chosen tile
    Scout { tile: Option<HexCoord> },
    Wait,
}

impl TurnOption {
    pub fn is_wait(&self) -> bool {
        matches!(self, TurnOption::Wait)
    }

    pub fn builds(&self, building_type: BuildingType) -> bool {
        matches!(self, TurnOption::Build { building_type: t } if *t == building_type)
    }
}

impl fmt::Display for TurnOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnOption::Build { building_type } => write!(f, "build {}", building_type.display_name()),
            TurnOption::Recruit { unit_type } => write!(f, "recruit {}", unit_type.display_name()),
            TurnOption::RaiseArmy => write!(f, "raise army"),
            TurnOption::Scout { tile: Some(tile) } => write!(f, "scout towards {}", tile),
            TurnOption::Scout { tile: None } => write!(f, "scout"),
            TurnOption::Wait => write!(f, "wait"),
        }
    }
}

/// Something an army can move towards or engage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "target")]
pub enum AttackTarget {
    Army {
        army: ArmyId,
        owner: PlayerId,
        position: HexCoord,
    },
    Building {
        building: BuildingId,
        owner: PlayerId,
        position: HexCoord,
    },
    /// Unclaimed ground
    Tile { position: HexCoord },
}

impl AttackTarget {
    pub fn position(&self) -> HexCoord {
        match self {
            AttackTarget::Army { position, .. }
            | AttackTarget::Building { position, .. }
            | AttackTarget::Tile { position } => *position,
        }
    }

    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            AttackTarget::Army { owner, .. } | AttackTarget::Building { owner, .. } => Some(*owner),
            AttackTarget::Tile { .. } => None,
        }
    }
}

impl fmt::Display for AttackTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttackTarget::Army { army, owner, position } => {
                write!(f, "army {} of {} at {}", army.0, owner, position)
            }
            AttackTarget::Building { building, owner, position } => {
                write!(f, "building {} of {} at {}", building.0, owner, position)
            }
            AttackTarget::Tile { position } => write!(f, "tile {}", position),
        }
    }
}
