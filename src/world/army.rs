//! Armies as unit compositions on the hex map

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::unit::{Unit, UnitType};
use crate::core::types::{ArmyId, HexCoord, PlayerId};

/// Number of units per unit type, used for battle reports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCounts(pub BTreeMap<UnitType, u32>);

impl UnitCounts {
    pub fn get(&self, unit_type: UnitType) -> u32 {
        self.0.get(&unit_type).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }
}

/// An army on the map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Army {
    pub id: ArmyId,
    pub name: String,
    pub owner: PlayerId,
    pub position: HexCoord,
    units: Vec<Unit>,
}

impl Army {
    pub fn new(id: ArmyId, name: impl Into<String>, owner: PlayerId, position: HexCoord) -> Self {
        Self {
            id,
            name: name.into(),
            owner,
            position,
            units: Vec::new(),
        }
    }

    /// Add `count` fresh units of a type
    pub fn with_units(mut self, unit_type: UnitType, count: u32) -> Self {
        for _ in 0..count {
            self.units.push(Unit::new(unit_type));
        }
        self
    }

    pub fn add_unit(&mut self, unit: Unit) {
        self.units.push(unit);
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn attack_strength(&self) -> u32 {
        self.units.iter().map(|u| u.stats.attack).sum()
    }

    pub fn defence_strength(&self) -> u32 {
        self.units.iter().map(|u| u.stats.defence).sum()
    }

    pub fn population(&self) -> u32 {
        self.units.iter().map(|u| u.stats.population).sum()
    }

    pub fn population_of(&self, unit_type: UnitType) -> u32 {
        self.units
            .iter()
            .filter(|u| u.unit_type == unit_type)
            .map(|u| u.stats.population)
            .sum()
    }

    pub fn count_of(&self, unit_type: UnitType) -> u32 {
        self.units.iter().filter(|u| u.unit_type == unit_type).count() as u32
    }

    pub fn unit_counts(&self) -> UnitCounts {
        let mut counts = BTreeMap::new();
        for unit in &self.units {
            *counts.entry(unit.unit_type).or_insert(0) += 1;
        }
        UnitCounts(counts)
    }

    /// Remove whole units of a type until `population` is covered, returns the population
    /// actually removed
    ///
    /// A unit is only taken while its population still fits in what is left to remove, so
    /// the result never exceeds `population` and can fall short of it.
    pub fn remove_population_of_type(&mut self, population: u32, unit_type: UnitType) -> u32 {
        let mut removed = 0;
        self.units.retain(|u| {
            let left = population - removed;
            if left > 0 && u.unit_type == unit_type && u.stats.population <= left {
                removed += u.stats.population;
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn remove_all_units(&mut self) {
        self.units.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::unit::UnitStats;

    fn test_army() -> Army {
        Army::new(ArmyId(1), "Army 1", PlayerId(1), HexCoord::new(0, 0))
            .with_units(UnitType::Mercenary, 3)
            .with_units(UnitType::Knight, 2)
    }

    #[test]
    fn test_strength_sums() {
        let army = test_army();
        assert_eq!(army.attack_strength(), 3 * 2 + 2 * 4);
        assert_eq!(army.defence_strength(), 3 + 2 * 3);
        assert_eq!(army.population(), 5);
        assert_eq!(army.population_of(UnitType::Knight), 2);
    }

    #[test]
    fn test_remove_population_of_type_reports_shortfall() {
        let mut army = test_army();
        assert_eq!(army.remove_population_of_type(2, UnitType::Mercenary), 2);
        assert_eq!(army.count_of(UnitType::Mercenary), 1);

        // Only one mercenary left
        assert_eq!(army.remove_population_of_type(3, UnitType::Mercenary), 1);
        assert_eq!(army.count_of(UnitType::Mercenary), 0);
        assert_eq!(army.count_of(UnitType::Knight), 2);
    }

    #[test]
    fn test_remove_population_takes_whole_units() {
        let mut army = Army::new(ArmyId(2), "Army 2", PlayerId(1), HexCoord::new(0, 0));
        for _ in 0..3 {
            army.add_unit(Unit::with_stats(UnitType::Knight, UnitStats::new(4, 3, 2)));
        }

        assert_eq!(army.remove_population_of_type(2, UnitType::Knight), 2);
        assert_eq!(army.count_of(UnitType::Knight), 2);

        // Half a knight cannot be removed
        assert_eq!(army.remove_population_of_type(3, UnitType::Knight), 2);
        assert_eq!(army.count_of(UnitType::Knight), 1);
        assert_eq!(army.population(), 2);
    }

    #[test]
    fn test_unit_counts() {
        let counts = test_army().unit_counts();
        assert_eq!(counts.get(UnitType::Mercenary), 3);
        assert_eq!(counts.get(UnitType::BarbaricSoldier), 0);
        assert_eq!(counts.total(), 5);
    }
}
