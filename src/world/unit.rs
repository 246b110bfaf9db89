//! Unit types and their combat stats

use serde::{Deserialize, Serialize};

/// Kind of unit an army can be composed of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    Mercenary,
    Knight,
    BarbaricSoldier,
}

impl UnitType {
    pub const ALL: [UnitType; 3] = [
        UnitType::Mercenary,
        UnitType::Knight,
        UnitType::BarbaricSoldier,
    ];

    /// Stats a freshly recruited unit of this type starts with
    pub fn base_stats(&self) -> UnitStats {
        match self {
            UnitType::Mercenary => UnitStats::new(2, 1, 1),
            UnitType::Knight => UnitStats::new(4, 3, 1),
            UnitType::BarbaricSoldier => UnitStats::new(1, 1, 1),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            UnitType::Mercenary => "mercenary",
            UnitType::Knight => "knight",
            UnitType::BarbaricSoldier => "barbaric soldier",
        }
    }
}

/// Attack, defence and population of a single unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    pub attack: u32,
    pub defence: u32,
    pub population: u32,
}

impl UnitStats {
    pub const fn new(attack: u32, defence: u32, population: u32) -> Self {
        Self {
            attack,
            defence,
            population,
        }
    }
}

/// A single unit inside an army
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub unit_type: UnitType,
    pub stats: UnitStats,
}

impl Unit {
    pub fn new(unit_type: UnitType) -> Self {
        Self {
            unit_type,
            stats: unit_type.base_stats(),
        }
    }

    /// Unit with explicit stats, e.g. veteran or scenario-specific units
    pub fn with_stats(unit_type: UnitType, stats: UnitStats) -> Self {
        Self { unit_type, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knight_outclasses_mercenary() {
        let knight = Unit::new(UnitType::Knight);
        let mercenary = Unit::new(UnitType::Mercenary);
        assert!(knight.stats.attack > mercenary.stats.attack);
        assert!(knight.stats.defence > mercenary.stats.defence);
    }

    #[test]
    fn test_every_type_has_population() {
        for unit_type in UnitType::ALL {
            assert!(unit_type.base_stats().population > 0, "{:?}", unit_type);
        }
    }
}
