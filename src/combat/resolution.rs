//! Battle resolution for armies and buildings
//!
//! One call resolves one engagement completely. Both participants are borrowed mutably for
//! the duration of the call, so no other resolution can touch them at the same time.
//! Casualties are counted in population and rounded up. Units are only removed whole, so a
//! remainder smaller than one unit's population is left standing and reported as a shortfall.

use tracing::{debug, warn};

use super::constants::{CASUALTY_EPSILON, WINNER_RECOVERY_DIVISOR, ZERO_VALUE_FLOOR};
use super::report::{
    BattleKind, BattleLogSink, BattleOutcome, BattleReport, DefenderSnapshot, RemovalShortfall,
};
use crate::world::{Army, Building, UnitType};

/// The defending side of an engagement
#[derive(Debug)]
pub enum Defender<'a> {
    Army(&'a mut Army),
    Building(&'a mut Building),
}

/// Raw result of a resolution, before it is turned into a report
#[derive(Debug, Clone, PartialEq)]
pub struct Engagement {
    pub outcome: BattleOutcome,
    pub attack_value: f64,
    pub defence_value: f64,
    pub shortfalls: Vec<RemovalShortfall>,
}

fn floor_zero(value: u32, side: &str) -> f64 {
    if value == 0 {
        warn!(side, floor = ZERO_VALUE_FLOOR, "combat value is 0, adjusting to floor");
        ZERO_VALUE_FLOOR
    } else {
        value as f64
    }
}

fn outcome_of(attacker_won: bool, defender_won: bool) -> BattleOutcome {
    match (attacker_won, defender_won) {
        (true, true) => BattleOutcome::Draw,
        (true, false) => BattleOutcome::AttackerWon,
        _ => BattleOutcome::DefenderWon,
    }
}

/// Share of a side's force that survives
///
/// A winner loses the opposing value and recovers a third of it; a loser loses everything.
pub fn survivor_ratio(own_value: f64, opposing_value: f64, won: bool) -> f64 {
    let losses = if won { opposing_value } else { own_value };
    let mut ratio = (own_value - losses) / own_value;
    if won {
        ratio += (losses / WINNER_RECOVERY_DIVISOR) / own_value;
    }
    ratio
}

/// Round a casualty count up, ignoring floating point noise
pub fn ceil_casualties(casualties: f64) -> u32 {
    (casualties - CASUALTY_EPSILON).ceil().max(0.0) as u32
}

/// Remove `requested` population of one unit type, noting any amount that could not be removed
fn remove_casualties(army: &mut Army, unit_type: UnitType, requested: u32) -> Option<RemovalShortfall> {
    let removed = army.remove_population_of_type(requested, unit_type);
    if removed == requested {
        return None;
    }

    warn!(
        army = %army.name,
        unit_type = unit_type.display_name(),
        requested,
        removed,
        "unexpected amount of removed units"
    );
    Some(RemovalShortfall {
        army: army.id,
        unit_type,
        requested,
        removed,
    })
}

/// Scale every unit type of an army down to `ratio` of its population
fn apply_casualties(army: &mut Army, ratio: f64) -> Vec<RemovalShortfall> {
    let total = army.population();
    if total == 0 {
        return Vec::new();
    }

    let surviving = total as f64 * ratio;
    UnitType::ALL
        .into_iter()
        .filter_map(|unit_type| {
            let of_type = army.population_of(unit_type) as f64;
            let requested = ceil_casualties(of_type - (of_type / total as f64) * surviving);
            if requested == 0 {
                return None;
            }
            remove_casualties(army, unit_type, requested)
        })
        .collect()
}

/// Resolve an army attacking another army
pub fn army_vs_army(attacker: &mut Army, defender: &mut Army) -> Engagement {
    let attack_value = floor_zero(attacker.attack_strength(), "attacker");
    let defence_value = floor_zero(defender.defence_strength(), "defender");

    let attacker_won = attack_value >= defence_value;
    let defender_won = defence_value >= attack_value;

    let mut shortfalls = apply_casualties(
        attacker,
        survivor_ratio(attack_value, defence_value, attacker_won),
    );
    shortfalls.extend(apply_casualties(
        defender,
        survivor_ratio(defence_value, attack_value, defender_won),
    ));

    Engagement {
        outcome: outcome_of(attacker_won, defender_won),
        attack_value,
        defence_value,
        shortfalls,
    }
}

/// Resolve an army attacking a building
///
/// A winning attacker destroys the building and takes casualties; a winning building wipes
/// out the attacker. An attacker left without population has lost, whatever the values said.
pub fn army_vs_building(attacker: &mut Army, building: &mut Building) -> Engagement {
    let attack_value = floor_zero(attacker.attack_strength(), "attacker");
    let defence_value = building.defensive_value as f64;

    let mut attacker_won = attack_value >= defence_value;
    let mut defender_won = defence_value >= attack_value;

    let mut shortfalls = Vec::new();
    if attacker_won {
        shortfalls = apply_casualties(
            attacker,
            survivor_ratio(attack_value, defence_value, true),
        );
        building.mark_destroyed();
    }

    if defender_won {
        attacker.remove_all_units();
    }

    if attacker.population() == 0 {
        attacker_won = false;
        defender_won = true;
    }

    Engagement {
        outcome: outcome_of(attacker_won, defender_won),
        attack_value,
        defence_value,
        shortfalls,
    }
}

/// Resolve one engagement and hand its report to `sink`
pub fn resolve_combat<S>(attacker: &mut Army, defender: Defender<'_>, sink: &mut S) -> BattleOutcome
where
    S: BattleLogSink + ?Sized,
{
    let attacker_before = attacker.unit_counts();

    let report = match defender {
        Defender::Army(army) => {
            let defender_before = army.unit_counts();
            let engagement = army_vs_army(attacker, army);
            BattleReport {
                kind: BattleKind::ArmyVsArmy,
                attacker_name: attacker.name.clone(),
                defender_name: army.name.clone(),
                attacker_owner: attacker.owner,
                defender_owner: army.owner,
                attacker_before,
                attacker_after: attacker.unit_counts(),
                defender_before: DefenderSnapshot::Units(defender_before),
                defender_after: DefenderSnapshot::Units(army.unit_counts()),
                attack_value: engagement.attack_value,
                defence_value: engagement.defence_value,
                outcome: engagement.outcome,
                shortfalls: engagement.shortfalls,
            }
        }
        Defender::Building(building) => {
            let value_before = building.defensive_value;
            let engagement = army_vs_building(attacker, building);
            BattleReport {
                kind: BattleKind::ArmyVsBuilding,
                attacker_name: attacker.name.clone(),
                defender_name: building.building_type.display_name().to_string(),
                attacker_owner: attacker.owner,
                defender_owner: building.owner,
                attacker_before,
                attacker_after: attacker.unit_counts(),
                defender_before: DefenderSnapshot::DefensiveValue(value_before),
                defender_after: DefenderSnapshot::DefensiveValue(building.defensive_value),
                attack_value: engagement.attack_value,
                defence_value: engagement.defence_value,
                outcome: engagement.outcome,
                shortfalls: engagement.shortfalls,
            }
        }
    };

    debug!(
        attacker = %report.attacker_name,
        defender = %report.defender_name,
        outcome = ?report.outcome,
        attacker_casualties = report.attacker_casualties(),
        "battle resolved"
    );

    let outcome = report.outcome;
    sink.record(report);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ArmyId, BuildingId, HexCoord, PlayerId};
    use crate::world::{BuildingState, BuildingType, Unit, UnitStats, DESTROYED_DEFENSIVE_VALUE};

    fn army_of(id: u32, count: u32, stats: UnitStats) -> Army {
        let mut army = Army::new(ArmyId(id), format!("Army {}", id), PlayerId(id), HexCoord::new(0, 0));
        for _ in 0..count {
            army.add_unit(Unit::with_stats(UnitType::Mercenary, stats));
        }
        army
    }

    #[test]
    fn test_survivor_ratio_winner_recovers_a_third() {
        // 10 vs 10: (10 - 10) / 10 + (10 / 3) / 10
        let ratio = survivor_ratio(10.0, 10.0, true);
        assert!((ratio - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(survivor_ratio(4.0, 9.0, false), 0.0);
    }

    #[test]
    fn test_ceil_casualties() {
        assert_eq!(ceil_casualties(6.0 + 2.0 / 3.0), 7);
        assert_eq!(ceil_casualties(2.000_000_000_000_000_4), 2);
        assert_eq!(ceil_casualties(-0.3), 0);
        assert_eq!(ceil_casualties(0.0), 0);
    }

    #[test]
    fn test_equal_armies_draw() {
        let mut attacker = army_of(1, 10, UnitStats::new(1, 1, 1));
        let mut defender = army_of(2, 10, UnitStats::new(1, 1, 1));

        let engagement = army_vs_army(&mut attacker, &mut defender);

        assert_eq!(engagement.outcome, BattleOutcome::Draw);
        // ceil(10 - (10/10) * (10 * ((10-10)/10 + (10/3)/10))) = ceil(6.67) = 7
        assert_eq!(attacker.population(), 3);
        assert_eq!(defender.population(), 3);
    }

    #[test]
    fn test_stronger_attacker_wins() {
        let mut attacker = army_of(1, 10, UnitStats::new(2, 1, 1));
        let mut defender = army_of(2, 5, UnitStats::new(1, 1, 1));

        let engagement = army_vs_army(&mut attacker, &mut defender);

        assert_eq!(engagement.outcome, BattleOutcome::AttackerWon);
        // ratio = (20-5)/20 + (5/3)/20 = 0.8333, casualties = ceil(1.667) = 2
        assert_eq!(attacker.population(), 8);
        assert!(defender.is_empty());
    }

    #[test]
    fn test_zero_attack_is_floored() {
        let mut attacker = army_of(1, 4, UnitStats::new(0, 1, 1));
        let mut defender = army_of(2, 4, UnitStats::new(1, 1, 1));

        let engagement = army_vs_army(&mut attacker, &mut defender);

        assert_eq!(engagement.attack_value, ZERO_VALUE_FLOOR);
        assert_eq!(engagement.outcome, BattleOutcome::DefenderWon);
        assert!(attacker.is_empty());
        assert!(defender.population() > 0);
    }

    #[test]
    fn test_both_zero_is_draw() {
        let mut attacker = army_of(1, 2, UnitStats::new(0, 0, 1));
        let mut defender = army_of(2, 2, UnitStats::new(0, 0, 1));

        let engagement = army_vs_army(&mut attacker, &mut defender);

        assert_eq!(engagement.outcome, BattleOutcome::Draw);
        assert_eq!(engagement.attack_value, engagement.defence_value);
    }

    #[test]
    fn test_army_overruns_building() {
        let mut attacker = army_of(1, 10, UnitStats::new(2, 1, 1));
        let mut building = Building::new(BuildingId(7), BuildingType::Villa, PlayerId(2), HexCoord::new(1, 0));
        assert_eq!(building.defensive_value, 5);

        let engagement = army_vs_building(&mut attacker, &mut building);

        assert_eq!(engagement.outcome, BattleOutcome::AttackerWon);
        assert_eq!(building.defensive_value, DESTROYED_DEFENSIVE_VALUE);
        assert_eq!(building.state, BuildingState::Destroyed);
        assert_eq!(attacker.population(), 8);
    }

    #[test]
    fn test_building_repels_weak_army() {
        let mut attacker = army_of(1, 2, UnitStats::new(1, 1, 1));
        let mut building = Building::new(BuildingId(7), BuildingType::Camp3, PlayerId(2), HexCoord::new(1, 0));

        let engagement = army_vs_building(&mut attacker, &mut building);

        assert_eq!(engagement.outcome, BattleOutcome::DefenderWon);
        assert!(attacker.is_empty());
        assert_eq!(building.defensive_value, 6);
    }

    #[test]
    fn test_tie_against_building_wipes_attacker() {
        let mut attacker = army_of(1, 4, UnitStats::new(1, 1, 1));
        let mut building = Building::new(BuildingId(7), BuildingType::Barracks, PlayerId(2), HexCoord::new(1, 0));

        let engagement = army_vs_building(&mut attacker, &mut building);

        assert!(attacker.is_empty());
        assert_eq!(engagement.outcome, BattleOutcome::DefenderWon);
    }

    #[test]
    fn test_resolve_combat_records_report() {
        let mut attacker = army_of(1, 10, UnitStats::new(1, 1, 1));
        let mut defender = army_of(2, 10, UnitStats::new(1, 1, 1));
        let mut log: Vec<BattleReport> = Vec::new();

        let outcome = resolve_combat(&mut attacker, Defender::Army(&mut defender), &mut log);

        assert_eq!(outcome, BattleOutcome::Draw);
        assert_eq!(log.len(), 1);
        let report = &log[0];
        assert_eq!(report.kind, BattleKind::ArmyVsArmy);
        assert_eq!(report.attacker_before.total(), 10);
        assert_eq!(report.attacker_after.total(), 3);
        assert_eq!(report.attacker_casualties(), 7);
        assert_eq!(report.defender_casualties(), Some(7));
    }

    #[test]
    fn test_resolve_combat_building_report_tracks_value() {
        let mut attacker = army_of(1, 10, UnitStats::new(2, 1, 1));
        let mut building = Building::new(BuildingId(3), BuildingType::Villa, PlayerId(2), HexCoord::new(0, 1));
        let mut log: Vec<BattleReport> = Vec::new();

        resolve_combat(&mut attacker, Defender::Building(&mut building), &mut log);

        assert_eq!(log[0].defender_before, DefenderSnapshot::DefensiveValue(5));
        assert_eq!(
            log[0].defender_after,
            DefenderSnapshot::DefensiveValue(DESTROYED_DEFENSIVE_VALUE)
        );
        assert_eq!(log[0].defender_name, "villa");
    }

    #[test]
    fn test_casualties_count_unit_population() {
        // 4 units of population 2: attack 20, population 8
        let mut attacker = army_of(1, 4, UnitStats::new(5, 1, 2));
        let mut defender = army_of(2, 1, UnitStats::new(1, 5, 1));

        let engagement = army_vs_army(&mut attacker, &mut defender);

        assert_eq!(engagement.outcome, BattleOutcome::AttackerWon);
        // ratio = (20-5)/20 + (5/3)/20 = 0.8333, casualties = ceil(1.333) = 2 population
        assert_eq!(attacker.units().len(), 3);
        assert_eq!(attacker.population(), 6);
        assert!(engagement.shortfalls.is_empty());
    }

    #[test]
    fn test_remove_casualties_takes_what_exists() {
        let mut army = army_of(4, 2, UnitStats::new(1, 1, 1));

        let shortfall = remove_casualties(&mut army, UnitType::Mercenary, 5);

        assert_eq!(
            shortfall,
            Some(RemovalShortfall {
                army: ArmyId(4),
                unit_type: UnitType::Mercenary,
                requested: 5,
                removed: 2,
            })
        );
        assert!(army.is_empty());
        assert_eq!(remove_casualties(&mut army, UnitType::Knight, 0), None);
    }

    #[test]
    fn test_partial_unit_casualty_is_reported() {
        // 3 units of population 2: attack 12, population 6
        let mut attacker = army_of(1, 3, UnitStats::new(4, 1, 2));
        let mut defender = army_of(2, 1, UnitStats::new(1, 7, 1));
        let mut log: Vec<BattleReport> = Vec::new();

        let outcome = resolve_combat(&mut attacker, Defender::Army(&mut defender), &mut log);

        // ratio = (12-7)/12 + (7/3)/12 = 0.6111, casualties = ceil(2.333) = 3 population,
        // one unit covers 2 and a second would overshoot
        assert_eq!(outcome, BattleOutcome::AttackerWon);
        assert_eq!(log.len(), 1);
        let report = &log[0];
        assert_eq!(
            report.shortfalls,
            vec![RemovalShortfall {
                army: ArmyId(1),
                unit_type: UnitType::Mercenary,
                requested: 3,
                removed: 2,
            }]
        );
        assert_eq!(report.attacker_after.total(), 2);
        assert_eq!(attacker.population(), 4);
        assert!(defender.is_empty());
        assert_eq!(report.defender_casualties(), Some(1));
    }
}
