//! Per-faction decision state and the turn loop entry points
//!
//! A `FactionAi` owns everything one faction remembers between turns: its mode, the opponent
//! strength table, claimed territory and the building count from the previous turn. Nothing is
//! shared between factions, so several can decide in parallel.

use ahash::AHashSet;
use rayon::prelude::*;
use tracing::{debug, info};

use super::context::{claimed_tiles, DecisionContext};
use super::mode::{FactionMode, ModeClassifier};
use super::options::{AttackTarget, TurnOption};
use super::rules::build_banks;
use super::scoring::select;
use super::snapshot::{ArmyView, GameSnapshot};
use super::strength::{Observation, OwnForce, StrengthClassifier};
use super::weights::WeightBank;
use super::OptionEnumerator;
use crate::core::config::FactionConfig;
use crate::core::error::{ConfigError, DecisionError};
use crate::core::types::{HexCoord, PlayerId, Tick};

#[derive(Debug, Clone)]
pub struct FactionAi {
    player: PlayerId,
    config: FactionConfig,
    turn_bank: WeightBank<TurnOption>,
    movement_bank: WeightBank<AttackTarget>,
    mode: ModeClassifier,
    strengths: StrengthClassifier,
    claimed_tiles: AHashSet<HexCoord>,
    /// Standing buildings at the start of the previous turn
    previous_building_count: Option<usize>,
    /// Standing buildings at the start of this turn
    current_building_count: Option<usize>,
    own_force: OwnForce,
    turns_taken: Tick,
}

impl FactionAi {
    pub fn new(player: PlayerId, config: FactionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (turn_bank, movement_bank) = build_banks(&config)?;
        Ok(Self {
            player,
            mode: ModeClassifier::new(&config),
            config,
            turn_bank,
            movement_bank,
            strengths: StrengthClassifier::new(player),
            claimed_tiles: AHashSet::new(),
            previous_building_count: None,
            current_building_count: None,
            own_force: OwnForce::default(),
            turns_taken: 0,
        })
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn config(&self) -> &FactionConfig {
        &self.config
    }

    pub fn mode(&self) -> FactionMode {
        self.mode.mode()
    }

    pub fn strengths(&self) -> &StrengthClassifier {
        &self.strengths
    }

    pub fn claimed(&self) -> &AHashSet<HexCoord> {
        &self.claimed_tiles
    }

    pub fn turns_taken(&self) -> Tick {
        self.turns_taken
    }

    pub fn turn_bank(&self) -> &WeightBank<TurnOption> {
        &self.turn_bank
    }

    pub fn movement_bank(&self) -> &WeightBank<AttackTarget> {
        &self.movement_bank
    }

    /// Refresh per-turn state from a new snapshot
    ///
    /// Opponent armies in sight are folded in as sightings before the mode is updated, so a
    /// newly spotted weak neighbour can already make the faction aggressive this turn.
    pub fn begin_turn(&mut self, snapshot: &GameSnapshot) -> FactionMode {
        self.own_force = OwnForce {
            attack: snapshot.strongest_attack(),
            defence: snapshot.strongest_defence(),
        };
        for army in snapshot.opponent_armies.iter().filter(|a| a.owner != self.player) {
            self.strengths.observe(
                &Observation::ArmySighted {
                    owner: army.owner,
                    attack_strength: army.attack_strength,
                    defence_strength: army.defence_strength,
                },
                self.own_force,
            );
        }

        let previous_mode = self.mode.mode();
        let mode = self.mode.update(snapshot, self.turns_taken, &self.strengths);
        if mode.posture != previous_mode.posture {
            info!(player = %self.player, from = ?previous_mode.posture, to = ?mode.posture, "posture changed");
        }

        self.previous_building_count = self.current_building_count;
        self.current_building_count = Some(snapshot.building_count());
        self.claimed_tiles = claimed_tiles(snapshot, self.config.claiming_distance);
        self.turns_taken += 1;
        mode
    }

    /// Feed an event from scouting or combat into the faction's memory
    pub fn observe(&mut self, observation: &Observation) {
        if let Observation::EnemyArmyInvading { owner, position } = observation {
            debug!(player = %self.player, invader = %owner, %position, "enemy army in own territory");
            self.mode.note_invasion();
        }
        self.strengths.observe(observation, self.own_force);
    }

    pub fn decision_context(&self) -> DecisionContext<'_> {
        DecisionContext {
            mode: self.mode.mode(),
            strengths: &self.strengths,
            claimed_tiles: &self.claimed_tiles,
            previous_building_count: self.previous_building_count,
            target_population: self.config.target_population,
        }
    }

    /// Start the turn and pick what to do with it
    pub fn select_turn_action<E: OptionEnumerator + ?Sized>(
        &mut self,
        snapshot: &GameSnapshot,
        enumerator: &E,
    ) -> Result<TurnOption, DecisionError> {
        self.begin_turn(snapshot);
        let candidates = enumerator.enumerate_turn_options(snapshot);
        self.choose_turn_action(snapshot, &candidates)
    }

    /// Pick among already enumerated turn options without advancing the turn
    pub fn choose_turn_action(
        &self,
        snapshot: &GameSnapshot,
        candidates: &[TurnOption],
    ) -> Result<TurnOption, DecisionError> {
        if candidates.is_empty() {
            return Err(DecisionError::NoCandidates {
                bank: self.turn_bank.label(),
            });
        }
        if !candidates.iter().any(TurnOption::is_wait) {
            return Err(DecisionError::MissingWaitOption);
        }

        let ctx = self.decision_context();
        let selection = select(&self.turn_bank, candidates, snapshot, &ctx)?;
        debug!(
            player = %self.player,
            protocol = ?ctx.protocol(),
            posture = ?ctx.posture(),
            action = %selection.candidate,
            score = selection.score,
            "turn action chosen"
        );
        Ok(*selection.candidate)
    }

    /// Pick a movement or attack target for one of the faction's armies
    ///
    /// Uses the context of the current turn; call after `select_turn_action` or `begin_turn`.
    /// An army with nowhere to go yields `None`.
    pub fn select_attack_target<E: OptionEnumerator + ?Sized>(
        &self,
        snapshot: &GameSnapshot,
        army: &ArmyView,
        enumerator: &E,
    ) -> Result<Option<AttackTarget>, DecisionError> {
        let candidates = enumerator.enumerate_attack_targets(snapshot, army);
        self.choose_attack_target(snapshot, &candidates)
    }

    pub fn choose_attack_target(
        &self,
        snapshot: &GameSnapshot,
        candidates: &[AttackTarget],
    ) -> Result<Option<AttackTarget>, DecisionError> {
        if candidates.is_empty() {
            return Ok(None);
        }
        let ctx = self.decision_context();
        let selection = select(&self.movement_bank, candidates, snapshot, &ctx)?;
        debug!(
            player = %self.player,
            target = %selection.candidate,
            score = selection.score,
            "attack target chosen"
        );
        Ok(Some(*selection.candidate))
    }
}

/// Run one turn-action pass for several factions in parallel
///
/// `factions` and `snapshots` are paired by index and must have the same length. Each
/// faction's own failure is reported in its slot of the returned list.
pub fn decide_turns<E: OptionEnumerator + Sync + ?Sized>(
    factions: &mut [FactionAi],
    snapshots: &[GameSnapshot],
    enumerator: &E,
) -> Result<Vec<Result<TurnOption, DecisionError>>, DecisionError> {
    if factions.len() != snapshots.len() {
        return Err(DecisionError::SnapshotCountMismatch {
            factions: factions.len(),
            snapshots: snapshots.len(),
        });
    }

    Ok(factions
        .par_iter_mut()
        .zip(snapshots.par_iter())
        .map(|(faction, snapshot)| faction.select_turn_action(snapshot, enumerator))
        .collect())
}
