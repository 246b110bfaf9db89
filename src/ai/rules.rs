//! The faction's rule catalog
//!
//! Two banks: what to do with the turn, and where an army should move or strike.
//! Every predicate matches on the candidate variant first and is `false` for the rest.

use super::context::DecisionContext;
use super::mode::{Posture, Protocol};
use super::options::{AttackTarget, TurnOption};
use super::snapshot::GameSnapshot;
use super::strength::RelativeStrength;
use super::weights::{WeightBank, WeightFunction};
use crate::core::config::FactionConfig;
use crate::core::error::ConfigError;
use crate::world::BuildingType;

/// Resources below this count as a poor economy; above it scouting is affordable
pub const POOR_ECONOMY_RESOURCES: i32 = 10;
/// Resources above this make idling wasteful
pub const RICH_RESOURCES: i32 = 70;
/// Food above this makes another farm unnecessary
pub const RICH_FOOD: i32 = 70;

pub const TURN_ACTION_BANK: &str = "turn_action";
pub const MOVEMENT_BANK: &str = "movement";

// === TURN ACTIONS ===

fn farm_when_losing_food(o: &TurnOption, s: &GameSnapshot, _: &DecisionContext<'_>) -> bool {
    o.builds(BuildingType::Farm) && s.is_losing_food()
}

fn raise_army_when_none(o: &TurnOption, s: &GameSnapshot, _: &DecisionContext<'_>) -> bool {
    matches!(o, TurnOption::RaiseArmy) && !s.has_army()
}

fn scout_when_wealthy_and_calm(o: &TurnOption, s: &GameSnapshot, ctx: &DecisionContext<'_>) -> bool {
    matches!(o, TurnOption::Scout { .. })
        && s.resources > POOR_ECONOMY_RESOURCES
        && matches!(ctx.posture(), Posture::Passive | Posture::Defensive)
}

fn scout_damped_in_poor_economy(o: &TurnOption, s: &GameSnapshot, _: &DecisionContext<'_>) -> bool {
    matches!(o, TurnOption::Scout { .. }) && s.resources < POOR_ECONOMY_RESOURCES
}

fn farm_damped_when_food_rich(o: &TurnOption, s: &GameSnapshot, _: &DecisionContext<'_>) -> bool {
    o.builds(BuildingType::Farm) && s.food > RICH_FOOD
}

fn idle_damped_when_rich(o: &TurnOption, s: &GameSnapshot, _: &DecisionContext<'_>) -> bool {
    matches!(o, TurnOption::Scout { .. } | TurnOption::Wait) && s.resources > RICH_RESOURCES
}

fn scout_damped_early(o: &TurnOption, _: &GameSnapshot, ctx: &DecisionContext<'_>) -> bool {
    matches!(o, TurnOption::Scout { .. }) && ctx.protocol() == Protocol::EarlyGame
}

fn build_favoured_early(o: &TurnOption, _: &GameSnapshot, ctx: &DecisionContext<'_>) -> bool {
    matches!(o, TurnOption::Build { .. }) && ctx.protocol() == Protocol::EarlyGame
}

fn recruit_when_population_short(o: &TurnOption, s: &GameSnapshot, ctx: &DecisionContext<'_>) -> bool {
    matches!(o, TurnOption::Recruit { .. })
        && ctx.target_population as f64 / 2.0 > s.population as f64
}

fn first_farm_override(o: &TurnOption, s: &GameSnapshot, _: &DecisionContext<'_>) -> bool {
    o.builds(BuildingType::Farm) && s.active_buildings_of(BuildingType::Farm) == 0
}

fn wait_for_first_farm(o: &TurnOption, s: &GameSnapshot, _: &DecisionContext<'_>) -> bool {
    o.is_wait() && s.active_buildings_of(BuildingType::Farm) == 0
}

fn barracks_at_population_cap(o: &TurnOption, s: &GameSnapshot, _: &DecisionContext<'_>) -> bool {
    (o.builds(BuildingType::Barracks) || o.is_wait())
        && s.population >= s.population_limit
        && !s.has_under_construction(BuildingType::Barracks)
}

pub fn turn_action_rules() -> Vec<WeightFunction<TurnOption>> {
    vec![
        WeightFunction::new("farm_when_losing_food", 3.0, farm_when_losing_food),
        WeightFunction::new("raise_army_when_none", 3.0, raise_army_when_none),
        WeightFunction::new("scout_when_wealthy_and_calm", 1.0, scout_when_wealthy_and_calm),
        WeightFunction::new("scout_damped_in_poor_economy", -1.0, scout_damped_in_poor_economy),
        WeightFunction::new("farm_damped_when_food_rich", -1.0, farm_damped_when_food_rich),
        WeightFunction::new("idle_damped_when_rich", -1.0, idle_damped_when_rich),
        WeightFunction::new("scout_damped_early", -1.0, scout_damped_early),
        WeightFunction::new("build_favoured_early", 1.0, build_favoured_early),
        WeightFunction::new("recruit_when_population_short", 0.9, recruit_when_population_short),
        WeightFunction::new("first_farm_override", 10.0, first_farm_override),
        WeightFunction::new("wait_for_first_farm", 5.0, wait_for_first_farm),
        WeightFunction::new("barracks_at_population_cap", 2.7, barracks_at_population_cap),
    ]
}

// === MOVEMENT / ATTACK TARGETS ===

fn engage_in_claimed_territory(t: &AttackTarget, _: &GameSnapshot, ctx: &DecisionContext<'_>) -> bool {
    matches!(t, AttackTarget::Army { position, .. } if ctx.is_claimed(*position))
}

fn retaliate_after_building_loss(t: &AttackTarget, s: &GameSnapshot, ctx: &DecisionContext<'_>) -> bool {
    matches!(t, AttackTarget::Army { .. }) && ctx.lost_buildings(s)
}

fn avoid_equal_or_stronger(t: &AttackTarget, s: &GameSnapshot, ctx: &DecisionContext<'_>) -> bool {
    match t {
        AttackTarget::Army { owner, .. } => {
            s.is_hostile(*owner)
                && matches!(
                    ctx.strength_of(*owner),
                    RelativeStrength::Equal | RelativeStrength::Stronger
                )
        }
        _ => false,
    }
}

fn restrain_early_aggression(t: &AttackTarget, _: &GameSnapshot, ctx: &DecisionContext<'_>) -> bool {
    matches!(t, AttackTarget::Army { .. }) && ctx.protocol() == Protocol::EarlyGame
}

pub fn movement_rules() -> Vec<WeightFunction<AttackTarget>> {
    vec![
        WeightFunction::new("engage_in_claimed_territory", 2.0, engage_in_claimed_territory),
        WeightFunction::new("retaliate_after_building_loss", 1.0, retaliate_after_building_loss),
        WeightFunction::new("avoid_equal_or_stronger", -1.0, avoid_equal_or_stronger),
        WeightFunction::new("restrain_early_aggression", -2.0, restrain_early_aggression),
    ]
}

/// Build both banks, applying the weight overrides from `config`
pub fn build_banks(
    config: &FactionConfig,
) -> Result<(WeightBank<TurnOption>, WeightBank<AttackTarget>), ConfigError> {
    let turn = WeightBank::new(TURN_ACTION_BANK, turn_action_rules());
    let movement = WeightBank::new(MOVEMENT_BANK, movement_rules());

    if let Some(unknown) = config
        .weights
        .keys()
        .find(|name| !turn.contains(name) && !movement.contains(name))
    {
        return Err(ConfigError::UnknownRule(unknown.clone()));
    }

    Ok((
        turn.with_overrides(&config.weights)?,
        movement.with_overrides(&config.weights)?,
    ))
}
