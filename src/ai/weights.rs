//! Weight functions and the banks that hold them
//!
//! A weight function is a named (predicate, weight) pair. Predicates are plain `fn` pointers:
//! pure, total over every candidate variant, and free to share between threads.

use std::collections::BTreeMap;
use std::fmt;

use super::context::DecisionContext;
use super::snapshot::GameSnapshot;
use crate::core::error::ConfigError;

/// Does a rule apply to this candidate?
pub type Predicate<C> = fn(&C, &GameSnapshot, &DecisionContext<'_>) -> bool;

pub struct WeightFunction<C> {
    pub name: &'static str,
    pub weight: f64,
    predicate: Predicate<C>,
}

impl<C> WeightFunction<C> {
    pub fn new(name: &'static str, weight: f64, predicate: Predicate<C>) -> Self {
        Self {
            name,
            weight,
            predicate,
        }
    }

    pub fn applies(&self, candidate: &C, snapshot: &GameSnapshot, ctx: &DecisionContext<'_>) -> bool {
        (self.predicate)(candidate, snapshot, ctx)
    }
}

impl<C> Clone for WeightFunction<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            weight: self.weight,
            predicate: self.predicate,
        }
    }
}

impl<C> fmt::Debug for WeightFunction<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightFunction")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .finish()
    }
}

/// Ordered, immutable collection of weight functions for one candidate category
#[derive(Debug, Clone)]
pub struct WeightBank<C> {
    label: &'static str,
    rules: Vec<WeightFunction<C>>,
}

impl<C> WeightBank<C> {
    pub fn new(label: &'static str, rules: Vec<WeightFunction<C>>) -> Self {
        Self { label, rules }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn rules(&self) -> &[WeightFunction<C>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.name == name)
    }

    /// Replace the weight of every rule named in `overrides`
    ///
    /// Names this bank does not know are left for the caller to report.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, f64>) -> Result<Self, ConfigError> {
        for rule in &mut self.rules {
            if let Some(&weight) = overrides.get(rule.name) {
                if !weight.is_finite() {
                    return Err(ConfigError::NonFiniteWeight {
                        rule: rule.name.to_string(),
                        value: weight,
                    });
                }
                rule.weight = weight;
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always(_: &u8, _: &GameSnapshot, _: &DecisionContext<'_>) -> bool {
        true
    }

    fn bank() -> WeightBank<u8> {
        WeightBank::new(
            "test",
            vec![
                WeightFunction::new("a", 1.0, always),
                WeightFunction::new("b", -2.0, always),
            ],
        )
    }

    #[test]
    fn test_bank_preserves_insertion_order() {
        let names: Vec<_> = bank().rules().iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(bank().contains("b"));
        assert!(!bank().contains("c"));
    }

    #[test]
    fn test_overrides_replace_weight() {
        let mut overrides = BTreeMap::new();
        overrides.insert("b".to_string(), 4.5);
        let bank = bank().with_overrides(&overrides).unwrap();
        assert_eq!(bank.rules()[0].weight, 1.0);
        assert_eq!(bank.rules()[1].weight, 4.5);
    }

    #[test]
    fn test_non_finite_override_rejected() {
        let mut overrides = BTreeMap::new();
        overrides.insert("a".to_string(), f64::INFINITY);
        assert!(matches!(
            bank().with_overrides(&overrides),
            Err(ConfigError::NonFiniteWeight { .. })
        ));
    }
}
