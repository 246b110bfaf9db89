//! Seeded skirmish between AI factions
//!
//! A small, deterministic game loop used by the `strategos` binary and the integration
//! tests. Each tick runs the economy, lets every faction pick a turn action (in parallel),
//! moves armies toward their chosen targets and resolves any contact with `resolve_combat`.
//! The rules of this toy economy are local to this module; the decision engine only sees
//! the snapshots built here.

use std::collections::BTreeSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ai::{
    decide_turns, ArmyView, AttackTarget, BuildingView, FactionAi, GameSnapshot, Observation,
    OptionEnumerator, TurnOption,
};
use crate::combat::{resolve_combat, BattleReport, Defender};
use crate::core::config::FactionConfig;
use crate::core::error::{ConfigError, Result, StrategosError};
use crate::core::types::{ArmyId, BuildingId, HexCoord, PlayerId, Tick};
use crate::world::{Army, Building, BuildingState, BuildingType, Unit, UnitType};

// === ECONOMY ===
pub const STARTING_RESOURCES: i32 = 30;
pub const STARTING_FOOD: i32 = 20;
pub const STARTING_POPULATION: u32 = 3;
pub const RAISE_ARMY_COST: i32 = 10;
/// Units a freshly raised army starts with
pub const RAISED_ARMY_SIZE: u32 = 2;
/// Hex distance at which armies are seen from own buildings and armies
pub const SIGHT_RADIUS: u32 = 4;
/// Hex distance from home that building sites are searched in
pub const BUILD_RADIUS: u32 = 3;
/// Distance between neighbouring faction homes
pub const HOME_SPACING: i32 = 10;

pub fn building_cost(building_type: BuildingType) -> Option<i32> {
    match building_type {
        BuildingType::Farm => Some(10),
        BuildingType::Hut => Some(8),
        BuildingType::Barracks => Some(20),
        BuildingType::Villa => Some(30),
        _ => None,
    }
}

pub fn recruit_cost(unit_type: UnitType) -> i32 {
    match unit_type {
        UnitType::Mercenary => 6,
        UnitType::Knight => 12,
        UnitType::BarbaricSoldier => 3,
    }
}

const BUILDABLE: [BuildingType; 4] = [
    BuildingType::Farm,
    BuildingType::Hut,
    BuildingType::Barracks,
    BuildingType::Villa,
];

/// Enumerates affordable actions and reachable targets for the skirmish
///
/// Knows where every enemy building stands, so armies can march on them.
#[derive(Debug, Clone, Default)]
pub struct DemoEnumerator {
    buildings: Vec<(BuildingId, PlayerId, HexCoord)>,
}

impl DemoEnumerator {
    pub fn new(buildings: Vec<(BuildingId, PlayerId, HexCoord)>) -> Self {
        Self { buildings }
    }
}

impl OptionEnumerator for DemoEnumerator {
    fn enumerate_turn_options(&self, snapshot: &GameSnapshot) -> Vec<TurnOption> {
        let mut options: Vec<TurnOption> = BUILDABLE
            .iter()
            .filter(|&&t| building_cost(t).is_some_and(|cost| snapshot.resources >= cost))
            .map(|&building_type| TurnOption::Build { building_type })
            .collect();

        if snapshot.has_army() && snapshot.population < snapshot.population_limit {
            options.extend(
                UnitType::ALL
                    .iter()
                    .filter(|&&u| snapshot.resources >= recruit_cost(u))
                    .map(|&unit_type| TurnOption::Recruit { unit_type }),
            );
        }
        if !snapshot.has_army()
            && snapshot.resources >= RAISE_ARMY_COST
            && snapshot.population + RAISED_ARMY_SIZE <= snapshot.population_limit
        {
            options.push(TurnOption::RaiseArmy);
        }
        options.push(TurnOption::Scout { tile: None });
        options.push(TurnOption::Wait);
        options
    }

    fn enumerate_attack_targets(&self, snapshot: &GameSnapshot, army: &ArmyView) -> Vec<AttackTarget> {
        let mut targets: Vec<AttackTarget> = snapshot
            .opponent_armies
            .iter()
            .map(|enemy| AttackTarget::Army {
                army: enemy.id,
                owner: enemy.owner,
                position: enemy.position,
            })
            .collect();

        targets.extend(
            self.buildings
                .iter()
                .filter(|(_, owner, _)| *owner != snapshot.player)
                .map(|&(building, owner, position)| AttackTarget::Building {
                    building,
                    owner,
                    position,
                }),
        );

        targets.extend(
            army.position
                .neighbors()
                .into_iter()
                .map(|position| AttackTarget::Tile { position }),
        );
        targets
    }
}

/// Economy and map state of one faction
#[derive(Debug, Clone)]
pub struct FactionState {
    pub player: PlayerId,
    pub home: HexCoord,
    pub resources: i32,
    pub food: i32,
    pub food_balance: i32,
    pub population: u32,
    pub population_limit: u32,
    pub buildings: Vec<Building>,
    pub armies: Vec<Army>,
    pub scout_radius: u32,
    pub discovered: BTreeSet<HexCoord>,
}

impl FactionState {
    fn new(player: PlayerId, home: HexCoord, home_building: Building) -> Self {
        let mut state = Self {
            player,
            home,
            resources: STARTING_RESOURCES,
            food: STARTING_FOOD,
            food_balance: 0,
            population: STARTING_POPULATION,
            population_limit: 0,
            buildings: vec![home_building],
            armies: Vec::new(),
            scout_radius: 1,
            discovered: home.within(1).collect(),
        };
        state.population_limit = state.compute_population_limit();
        state
    }

    fn active_of(&self, building_type: BuildingType) -> u32 {
        self.buildings
            .iter()
            .filter(|b| b.building_type == building_type && b.state == BuildingState::Active)
            .count() as u32
    }

    fn compute_population_limit(&self) -> u32 {
        4 + self.active_of(BuildingType::Hut) * 3
            + self.active_of(BuildingType::Villa) * 5
            + self.active_of(BuildingType::Barracks) * 4
    }

    /// Population serving in armies
    fn army_population(&self) -> u32 {
        self.armies.iter().map(Army::population).sum()
    }

    fn army_mut(&mut self, id: ArmyId) -> Result<&mut Army> {
        self.armies
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StrategosError::ArmyNotFound(id))
    }

    /// First free tile near home
    fn free_site(&self) -> Option<HexCoord> {
        self.home.within(BUILD_RADIUS).find(|tile| {
            !self
                .buildings
                .iter()
                .any(|b| b.position == *tile && !b.is_destroyed())
        })
    }

    fn is_eliminated(&self) -> bool {
        self.armies.is_empty() && self.buildings.iter().all(Building::is_destroyed)
    }
}

/// A chosen turn action, as printed by the binary
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub player: PlayerId,
    pub action: TurnOption,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickSummary {
    pub tick: Tick,
    pub decisions: Vec<Decision>,
    pub battles: Vec<BattleReport>,
}

pub struct Skirmish {
    rng: ChaCha8Rng,
    tick: Tick,
    ais: Vec<FactionAi>,
    factions: Vec<FactionState>,
    next_army_id: u32,
    next_building_id: u32,
}

impl Skirmish {
    pub fn new(seed: u64, configs: Vec<FactionConfig>) -> std::result::Result<Self, ConfigError> {
        if configs.len() < 2 {
            return Err(ConfigError::Invalid(format!(
                "a skirmish needs at least two factions, got {}",
                configs.len()
            )));
        }

        let mut ais = Vec::with_capacity(configs.len());
        let mut factions = Vec::with_capacity(configs.len());
        for (i, config) in configs.into_iter().enumerate() {
            let player = PlayerId::new(i as u32 + 1);
            let home = HexCoord::new(i as i32 * HOME_SPACING, 0);
            let hut = Building::new(BuildingId(i as u32 + 1), BuildingType::Hut, player, home);
            ais.push(FactionAi::new(player, config)?);
            factions.push(FactionState::new(player, home, hut));
        }

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick: 0,
            next_building_id: factions.len() as u32 + 1,
            ais,
            factions,
            next_army_id: 1,
        })
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn factions(&self) -> &[FactionState] {
        &self.factions
    }

    pub fn ais(&self) -> &[FactionAi] {
        &self.ais
    }

    /// Players still holding an army or a standing building
    pub fn survivors(&self) -> Vec<PlayerId> {
        self.factions
            .iter()
            .filter(|f| !f.is_eliminated())
            .map(|f| f.player)
            .collect()
    }

    pub fn is_over(&self) -> bool {
        self.survivors().len() <= 1
    }

    /// Snapshot of the game from one faction's point of view
    pub fn snapshot_for(&self, index: usize) -> GameSnapshot {
        let own = &self.factions[index];
        let watchers: Vec<HexCoord> = own
            .buildings
            .iter()
            .filter(|b| !b.is_destroyed())
            .map(|b| b.position)
            .chain(own.armies.iter().map(|a| a.position))
            .collect();

        let opponent_armies = self
            .factions
            .iter()
            .filter(|f| f.player != own.player)
            .flat_map(|f| f.armies.iter())
            .filter(|a| {
                watchers
                    .iter()
                    .any(|w| w.distance(&a.position) <= SIGHT_RADIUS as i32)
            })
            .map(ArmyView::from)
            .collect();

        GameSnapshot {
            player: own.player,
            tick: self.tick,
            resources: own.resources,
            food: own.food,
            food_balance: own.food_balance,
            population: own.population,
            population_limit: own.population_limit,
            buildings: own.buildings.iter().map(BuildingView::from).collect(),
            armies: own.armies.iter().map(ArmyView::from).collect(),
            opponent_armies,
            discovered_tiles: own.discovered.clone(),
            hostile_players: self
                .factions
                .iter()
                .map(|f| f.player)
                .filter(|&p| p != own.player)
                .collect(),
        }
    }

    /// Play one tick
    pub fn step(&mut self) -> Result<TickSummary> {
        self.run_economy();

        let snapshots: Vec<GameSnapshot> = (0..self.factions.len())
            .map(|i| self.snapshot_for(i))
            .collect();
        let enumerator = self.enumerator();

        let chosen = decide_turns(&mut self.ais, &snapshots, &enumerator)?;
        let mut decisions = Vec::with_capacity(chosen.len());
        for (index, action) in chosen.into_iter().enumerate() {
            let action = action?;
            self.apply_action(index, action);
            decisions.push(Decision {
                player: self.factions[index].player,
                action,
            });
        }

        self.move_armies(&snapshots, &enumerator)?;
        let battles = self.resolve_battles();

        for report in &battles {
            for ai in self.ais.iter_mut().filter(|ai| {
                ai.player() == report.attacker_owner || ai.player() == report.defender_owner
            }) {
                ai.observe(&Observation::BattleReported(report.clone()));
            }
        }
        self.report_invasions();

        for faction in &mut self.factions {
            faction.armies.retain(|a| !a.is_empty());
        }

        let summary = TickSummary {
            tick: self.tick,
            decisions,
            battles,
        };
        self.tick += 1;
        Ok(summary)
    }

    /// Play until one faction is left or `max_ticks` have passed
    pub fn run(&mut self, max_ticks: Tick) -> Result<Vec<TickSummary>> {
        let mut summaries = Vec::new();
        while self.tick < max_ticks && !self.is_over() {
            summaries.push(self.step()?);
        }
        info!(ticks = self.tick, survivors = ?self.survivors(), "skirmish finished");
        Ok(summaries)
    }

    fn enumerator(&self) -> DemoEnumerator {
        DemoEnumerator::new(
            self.factions
                .iter()
                .flat_map(|f| f.buildings.iter())
                .filter(|b| !b.is_destroyed())
                .map(|b| (b.id, b.owner, b.position))
                .collect(),
        )
    }

    fn run_economy(&mut self) {
        for faction in &mut self.factions {
            for building in &mut faction.buildings {
                if building.state == BuildingState::UnderConstruction {
                    building.state = BuildingState::Active;
                }
            }

            let production = 2 + faction.active_of(BuildingType::Farm) as i32 * 3;
            let consumption = (faction.population / 2) as i32;
            faction.food_balance = production - consumption;
            faction.food = (faction.food + faction.food_balance).max(0);

            faction.resources += 3
                + faction.active_of(BuildingType::Hut) as i32
                + faction.active_of(BuildingType::Villa) as i32 * 2
                + self.rng.gen_range(0..=2);

            faction.population_limit = faction.compute_population_limit();
            if faction.food > 0 && faction.population < faction.population_limit {
                faction.population += 1;
            }
        }
    }

    fn apply_action(&mut self, index: usize, action: TurnOption) {
        match action {
            TurnOption::Build { building_type } => {
                let Some(cost) = building_cost(building_type) else {
                    warn!(%action, "building type cannot be built here");
                    return;
                };
                let id = BuildingId(self.next_building_id);
                let faction = &mut self.factions[index];
                let Some(site) = faction.free_site() else {
                    warn!(player = %faction.player, "no free building site left");
                    return;
                };
                faction.resources -= cost;
                faction
                    .buildings
                    .push(Building::new(id, building_type, faction.player, site).under_construction());
                self.next_building_id += 1;
            }
            TurnOption::Recruit { unit_type } => {
                let faction = &mut self.factions[index];
                if let Some(army) = faction.armies.first_mut() {
                    army.add_unit(Unit::new(unit_type));
                    faction.resources -= recruit_cost(unit_type);
                    faction.population += 1;
                }
            }
            TurnOption::RaiseArmy => {
                let faction = &mut self.factions[index];
                if faction.population + RAISED_ARMY_SIZE > faction.population_limit {
                    warn!(player = %faction.player, "population limit reached, no army raised");
                    return;
                }
                let id = ArmyId(self.next_army_id);
                self.next_army_id += 1;
                let army = Army::new(id, format!("Army {}", id.0), faction.player, faction.home)
                    .with_units(UnitType::Mercenary, RAISED_ARMY_SIZE);
                faction.armies.push(army);
                faction.resources -= RAISE_ARMY_COST;
                faction.population += RAISED_ARMY_SIZE;
            }
            TurnOption::Scout { .. } => self.scout(index),
            TurnOption::Wait => {}
        }
    }

    fn scout(&mut self, index: usize) {
        let faction = &mut self.factions[index];
        faction.scout_radius += 1;
        faction.discovered.extend(faction.home.within(faction.scout_radius));

        let player = faction.player;
        let scouted: Vec<Observation> = self
            .factions
            .iter()
            .filter(|f| f.player != player)
            .flat_map(|f| f.buildings.iter())
            .filter(|b| !b.is_destroyed() && self.factions[index].discovered.contains(&b.position))
            .map(|b| Observation::EnemyBuildingScouted {
                owner: b.owner,
                position: b.position,
            })
            .collect();
        for observation in &scouted {
            self.ais[index].observe(observation);
        }
    }

    fn move_armies(&mut self, snapshots: &[GameSnapshot], enumerator: &DemoEnumerator) -> Result<()> {
        for index in 0..self.factions.len() {
            let mut moves = Vec::new();
            for army in &self.factions[index].armies {
                let view = ArmyView::from(army);
                if let Some(target) =
                    self.ais[index].select_attack_target(&snapshots[index], &view, enumerator)?
                {
                    moves.push((army.id, step_towards(army.position, target.position())));
                }
            }
            for (id, position) in moves {
                self.factions[index].army_mut(id)?.position = position;
            }
        }
        Ok(())
    }

    /// Resolve contacts and take the fallen out of each faction's population
    fn resolve_battles(&mut self) -> Vec<BattleReport> {
        let before: Vec<u32> = self.factions.iter().map(FactionState::army_population).collect();
        let battles = self.resolve_contacts();
        for (faction, before) in self.factions.iter_mut().zip(before) {
            let fallen = before.saturating_sub(faction.army_population());
            if fallen > 0 {
                debug!(player = %faction.player, fallen, "population lost in battle");
                faction.population = faction.population.saturating_sub(fallen);
            }
        }
        battles
    }

    /// Resolve every army-army and army-building contact
    ///
    /// The lower-indexed faction attacks on even ticks, the other on odd ticks.
    fn resolve_contacts(&mut self) -> Vec<BattleReport> {
        let mut reports = Vec::new();
        let count = self.factions.len();
        for a in 0..count {
            for b in (a + 1)..count {
                let (first, second) = pair_mut(&mut self.factions, a, b);
                let (attacker, defender) = if self.tick % 2 == 0 {
                    (first, second)
                } else {
                    (second, first)
                };
                engage(attacker, defender, &mut reports);
                engage_buildings(attacker, defender, &mut reports);
                engage_buildings(defender, attacker, &mut reports);
            }
        }
        reports
    }

    fn report_invasions(&mut self) {
        for index in 0..self.factions.len() {
            let player = self.factions[index].player;
            let invaders: Vec<Observation> = self
                .factions
                .iter()
                .filter(|f| f.player != player)
                .flat_map(|f| f.armies.iter())
                .filter(|a| !a.is_empty() && self.ais[index].claimed().contains(&a.position))
                .map(|a| Observation::EnemyArmyInvading {
                    owner: a.owner,
                    position: a.position,
                })
                .collect();
            for observation in &invaders {
                self.ais[index].observe(observation);
            }
        }
    }
}

fn engage(attacker: &mut FactionState, defender: &mut FactionState, reports: &mut Vec<BattleReport>) {
    for army in attacker.armies.iter_mut() {
        for enemy in defender.armies.iter_mut() {
            if army.is_empty() || enemy.is_empty() || army.position != enemy.position {
                continue;
            }
            let outcome = resolve_combat(army, Defender::Army(&mut *enemy), reports);
            debug!(attacker = %army.name, defender = %enemy.name, ?outcome, "armies clashed");
        }
    }
}

fn engage_buildings(attacker: &mut FactionState, defender: &mut FactionState, reports: &mut Vec<BattleReport>) {
    for army in attacker.armies.iter_mut() {
        for building in defender.buildings.iter_mut() {
            if army.is_empty() || building.is_destroyed() || army.position != building.position {
                continue;
            }
            // Armies standing guard on the tile defend it first
            if defender
                .armies
                .iter()
                .any(|a| !a.is_empty() && a.position == building.position)
            {
                continue;
            }
            resolve_combat(army, Defender::Building(building), reports);
        }
    }
}

fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert!(a < b);
    let (left, right) = items.split_at_mut(b);
    (&mut left[a], &mut right[0])
}

/// Neighbouring tile closest to `target`, or `from` itself when already there
pub fn step_towards(from: HexCoord, target: HexCoord) -> HexCoord {
    if from == target {
        return from;
    }
    from.neighbors()
        .into_iter()
        .min_by_key(|n| n.distance(&target))
        .unwrap_or(from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_factions(seed: u64) -> Skirmish {
        Skirmish::new(seed, vec![FactionConfig::default(), FactionConfig::default()]).unwrap()
    }

    #[test]
    fn test_needs_two_factions() {
        assert!(matches!(
            Skirmish::new(1, vec![FactionConfig::default()]),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_step_towards_closes_distance() {
        let from = HexCoord::new(0, 0);
        let target = HexCoord::new(4, -2);
        let next = step_towards(from, target);
        assert_eq!(next.distance(&target), from.distance(&target) - 1);
        assert_eq!(step_towards(target, target), target);
    }

    #[test]
    fn test_enumerator_always_offers_wait() {
        let enumerator = DemoEnumerator::default();
        let snapshot = GameSnapshot::new(PlayerId(1));
        let options = enumerator.enumerate_turn_options(&snapshot);
        assert_eq!(options.last(), Some(&TurnOption::Wait));
        assert!(!options.iter().any(|o| matches!(o, TurnOption::Build { .. })));
    }

    #[test]
    fn test_enumerator_skips_own_buildings() {
        let enumerator = DemoEnumerator::new(vec![
            (BuildingId(1), PlayerId(1), HexCoord::new(0, 0)),
            (BuildingId(2), PlayerId(2), HexCoord::new(10, 0)),
        ]);
        let snapshot = GameSnapshot::new(PlayerId(1));
        let army = ArmyView::from(&Army::new(ArmyId(1), "a", PlayerId(1), HexCoord::new(0, 0)));
        let targets = enumerator.enumerate_attack_targets(&snapshot, &army);

        let buildings: Vec<_> = targets
            .iter()
            .filter(|t| matches!(t, AttackTarget::Building { .. }))
            .collect();
        assert_eq!(buildings.len(), 1);
        assert_eq!(buildings[0].owner(), Some(PlayerId(2)));
        assert_eq!(targets.len(), 7);
    }

    #[test]
    fn test_enumerator_raises_army_within_limit() {
        let enumerator = DemoEnumerator::default();
        let mut snapshot = GameSnapshot::new(PlayerId(1));
        snapshot.resources = RAISE_ARMY_COST;
        snapshot.population = 4;
        snapshot.population_limit = 5;
        let options = enumerator.enumerate_turn_options(&snapshot);
        assert!(!options.contains(&TurnOption::RaiseArmy));

        snapshot.population_limit = 6;
        let options = enumerator.enumerate_turn_options(&snapshot);
        assert!(options.contains(&TurnOption::RaiseArmy));
    }

    #[test]
    fn test_battle_casualties_leave_the_population() {
        let mut skirmish = two_factions(1);
        let field = HexCoord::new(5, 0);
        skirmish.factions[0].armies = vec![Army::new(ArmyId(1), "Army 1", PlayerId(1), field)
            .with_units(UnitType::Knight, 4)];
        skirmish.factions[0].population = 7;
        skirmish.factions[1].armies = vec![Army::new(ArmyId(2), "Army 2", PlayerId(2), field)
            .with_units(UnitType::BarbaricSoldier, 2)];
        skirmish.factions[1].population = 5;

        let battles = skirmish.resolve_battles();

        // Attack 16 against defence 2: the knights lose ceil(4 - 4 * 0.9167) = 1
        assert_eq!(battles.len(), 1);
        assert_eq!(skirmish.factions[0].population, 6);
        assert_eq!(skirmish.factions[1].population, 3);
        assert!(skirmish.factions[1].armies[0].is_empty());
    }

    #[test]
    fn test_raise_army_respects_population_limit() {
        let mut skirmish = two_factions(1);
        let faction = &mut skirmish.factions[0];
        faction.population = faction.population_limit - 1;
        faction.resources = RAISE_ARMY_COST;

        skirmish.apply_action(0, TurnOption::RaiseArmy);

        assert!(skirmish.factions[0].armies.is_empty());
        assert_eq!(skirmish.factions[0].resources, RAISE_ARMY_COST);
    }

    #[test]
    fn test_first_turn_builds_a_farm() {
        let mut skirmish = two_factions(7);
        let summary = skirmish.step().unwrap();
        assert!(summary.decisions.iter().all(|d| d.action.builds(BuildingType::Farm)));
        assert_eq!(skirmish.tick(), 1);
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut a = two_factions(99);
        let mut b = two_factions(99);
        let run_a = serde_json::to_string(&a.run(40).unwrap()).unwrap();
        let run_b = serde_json::to_string(&b.run(40).unwrap()).unwrap();
        assert_eq!(run_a, run_b);
    }

    #[test]
    fn test_snapshot_lists_hostiles() {
        let skirmish = two_factions(1);
        let snapshot = skirmish.snapshot_for(0);
        assert_eq!(snapshot.player, PlayerId(1));
        assert!(snapshot.is_hostile(PlayerId(2)));
        assert_eq!(snapshot.building_count(), 1);
    }
}
