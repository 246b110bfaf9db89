//! Scoring and selection over a weight bank
//!
//! Every candidate starts at `BASE_SCORE` and collects the weight of each rule that applies.
//! Selection returns the highest score; on ties the earliest candidate wins.

use std::fmt::Display;

use tracing::{debug, trace};

use super::context::DecisionContext;
use super::snapshot::GameSnapshot;
use super::weights::WeightBank;
use crate::core::error::DecisionError;

/// Score every candidate starts from
pub const BASE_SCORE: f64 = 0.0;

pub fn score<C>(
    bank: &WeightBank<C>,
    candidate: &C,
    snapshot: &GameSnapshot,
    ctx: &DecisionContext<'_>,
) -> f64 {
    bank.rules()
        .iter()
        .filter(|rule| rule.applies(candidate, snapshot, ctx))
        .fold(BASE_SCORE, |total, rule| total + rule.weight)
}

/// Score plus the names of the rules that contributed to it
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub score: f64,
    pub fired: Vec<&'static str>,
}

pub fn explain<C>(
    bank: &WeightBank<C>,
    candidate: &C,
    snapshot: &GameSnapshot,
    ctx: &DecisionContext<'_>,
) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown {
        score: BASE_SCORE,
        fired: Vec::new(),
    };
    for rule in bank.rules() {
        if rule.applies(candidate, snapshot, ctx) {
            breakdown.score += rule.weight;
            breakdown.fired.push(rule.name);
        }
    }
    breakdown
}

/// Breakdowns for every candidate, in candidate order
pub fn score_all<C>(
    bank: &WeightBank<C>,
    candidates: &[C],
    snapshot: &GameSnapshot,
    ctx: &DecisionContext<'_>,
) -> Vec<ScoreBreakdown> {
    candidates
        .iter()
        .map(|candidate| explain(bank, candidate, snapshot, ctx))
        .collect()
}

/// The winning candidate of a selection pass
#[derive(Debug, PartialEq)]
pub struct Selection<'c, C> {
    pub index: usize,
    pub candidate: &'c C,
    pub score: f64,
}

impl<C> Clone for Selection<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Selection<'_, C> {}

pub fn select<'c, C: Display>(
    bank: &WeightBank<C>,
    candidates: &'c [C],
    snapshot: &GameSnapshot,
    ctx: &DecisionContext<'_>,
) -> Result<Selection<'c, C>, DecisionError> {
    let mut best: Option<Selection<'c, C>> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        let breakdown = explain(bank, candidate, snapshot, ctx);
        trace!(
            bank = bank.label(),
            %candidate,
            score = breakdown.score,
            fired = ?breakdown.fired,
            "candidate scored"
        );

        // Strictly greater: first seen wins ties
        if best.as_ref().map_or(true, |b| breakdown.score > b.score) {
            best = Some(Selection {
                index,
                candidate,
                score: breakdown.score,
            });
        }
    }

    let selection = best.ok_or(DecisionError::NoCandidates { bank: bank.label() })?;
    debug!(
        bank = bank.label(),
        choice = %selection.candidate,
        score = selection.score,
        candidates = candidates.len(),
        "candidate selected"
    );
    Ok(selection)
}
