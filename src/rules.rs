//! Rule weight store: signed magnitudes behind stable rule identifiers.
//!
//! The aggregators never compute weights themselves; they look each token's
//! weight up here through the catalog's token-to-rule indirection. Rules are
//! data, not code: they can be loaded from JSON or constructed
//! programmatically, and the builtin table ships the canonical weights.
//!
//! Some rules form mutually exclusive groups ("special topic" rules where
//! only one of several competing observations should count). Group
//! arbitration is deterministic: the lowest identifier wins, never arrival
//! order.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::body::AspectKind;
use crate::error::{AlmutenResult, RuleError};

/// Stable identifier a weight is stored under (`"M1"`, `"LC4"`, `"P2"`...).
///
/// Identifiers order lexicographically; group arbitration relies on that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    pub fn new(id: impl Into<String>) -> Self {
        RuleId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One stored rule: signed weight plus optional exclusive-group membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDef {
    pub id: RuleId,
    /// Signed weight. The sign must agree with the catalog polarity of any
    /// token mapped to this rule; scoring uses the absolute value.
    pub weight: f64,
    /// Mutually exclusive group this rule belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Short human note on what the rule rewards or penalizes.
    #[serde(default)]
    pub note: String,
}

/// Read-only weight lookup service.
///
/// Loaded once at startup; the engine treats it as immutable thereafter.
#[derive(Debug, Default, Clone)]
pub struct RuleStore {
    rules: BTreeMap<RuleId, RuleDef>,
}

impl RuleStore {
    /// Build a store from rule definitions. Later duplicates replace earlier
    /// ones.
    pub fn from_rules(rules: impl IntoIterator<Item = RuleDef>) -> Self {
        let mut map = BTreeMap::new();
        for rule in rules {
            map.insert(rule.id.clone(), rule);
        }
        RuleStore { rules: map }
    }

    /// Signed weight stored under `id`.
    ///
    /// An unknown id is a configuration defect and fails loudly.
    pub fn weight_of(&self, id: &RuleId) -> AlmutenResult<f64> {
        self.rules
            .get(id)
            .map(|rule| rule.weight)
            .ok_or_else(|| {
                RuleError::UnknownRule {
                    id: id.to_string(),
                }
                .into()
            })
    }

    /// Full definition, if stored.
    pub fn get(&self, id: &RuleId) -> Option<&RuleDef> {
        self.rules.get(id)
    }

    /// Pick at most one rule from a set of candidates: lowest identifier
    /// wins. Unknown ids never win.
    pub fn select(&self, candidates: &[RuleId]) -> Option<RuleId> {
        candidates
            .iter()
            .filter(|id| self.rules.contains_key(*id))
            .min()
            .cloned()
    }

    /// Arbitrate a list of fired rules: within each mutually exclusive
    /// group, only the lowest identifier survives; ungrouped rules pass
    /// through. Firing order is preserved for the survivors.
    pub fn evaluate(&self, fired: &[RuleId]) -> Vec<RuleId> {
        let mut winners: BTreeMap<&str, &RuleId> = BTreeMap::new();
        for id in fired {
            if let Some(group) = self.rules.get(id).and_then(|r| r.group.as_deref()) {
                let entry = winners.entry(group).or_insert(id);
                if id < *entry {
                    *entry = id;
                }
            }
        }
        fired
            .iter()
            .filter(|id| {
                match self.rules.get(*id).and_then(|r| r.group.as_deref()) {
                    Some(group) => winners.get(group) == Some(id),
                    None => true,
                }
            })
            .cloned()
            .collect()
    }

    /// The builtin weight table, loaded once per process.
    pub fn builtin() -> &'static RuleStore {
        static STORE: OnceLock<RuleStore> = OnceLock::new();
        STORE.get_or_init(build_store)
    }
}

/// Rule id backing a synthesized role-aspect token.
///
/// One pattern rule per aspect, in angle order, so a synthesized token's
/// polarity and base weight come from the store rather than the catalog.
pub fn aspect_rule(aspect: AspectKind) -> RuleId {
    let id = match aspect {
        AspectKind::Conjunction => "A1",
        AspectKind::Sextile => "A2",
        AspectKind::Square => "A3",
        AspectKind::Trine => "A4",
        AspectKind::Opposition => "A5",
    };
    RuleId::new(id)
}

fn rule(id: &str, weight: f64, note: &str) -> RuleDef {
    RuleDef {
        id: RuleId::new(id),
        weight,
        group: None,
        note: note.to_string(),
    }
}

fn grouped(id: &str, weight: f64, group: &str, note: &str) -> RuleDef {
    RuleDef {
        group: Some(group.to_string()),
        ..rule(id, weight, note)
    }
}

fn build_store() -> RuleStore {
    RuleStore::from_rules([
        // Synthesized aspect patterns.
        rule("A1", 1.0, "applying conjunction between significators"),
        rule("A2", 0.75, "applying sextile between significators"),
        rule("A3", -1.0, "applying square between significators"),
        rule("A4", 1.0, "applying trine between significators"),
        rule("A5", -1.25, "applying opposition between significators"),
        // Denials.
        rule("D1", -2.0, "prohibition before perfection"),
        rule("D2", -1.5, "refranation by a significator"),
        rule("D3", -1.5, "frustration by a faster body"),
        rule("D4", -1.5, "abscission of light"),
        // Lord conditions.
        rule("LC1", 1.0, "L10 fortunate"),
        rule("LC2", 1.0, "L7 fortunate"),
        rule("LC3", -1.0, "L7 afflicted by malefic debility"),
        rule("LC4", 1.0, "L2 fortunate"),
        rule("LC5", -1.0, "L2 afflicted by malefic debility"),
        rule("LC6", 1.0, "L8 fortunate"),
        rule("LC7", -1.0, "L8 afflicted by malefic debility"),
        rule("LC8", 1.0, "L5 fortunate"),
        rule("LC9", -1.0, "L5 afflicted by malefic debility"),
        // Moon testimonies.
        rule("M1", 1.0, "Moon applying trine to the examiner's Sun"),
        rule("M2", -1.0, "Moon void of course"),
        rule("M3", -1.0, "Moon applying square to the examiner's Sun"),
        rule("M4", 0.75, "Moon applying sextile to the examiner's Sun"),
        rule("M5", 0.75, "Moon applying sextile to L1"),
        rule("M6", 0.75, "Moon applying sextile to L7"),
        rule("M7", -1.25, "Moon applying opposition to the examiner's Sun"),
        rule("M8", -1.25, "Moon applying opposition to L1"),
        rule("M9", -1.25, "Moon applying opposition to L7"),
        // Debility modifiers.
        rule("MOD2", -1.0, "significator in essential detriment"),
        rule("MOD3", -0.75, "significator retrograde"),
        // Reception.
        rule("R1", 1.0, "mutual reception between significators"),
        // Perfections.
        rule("P1", 2.0, "direct perfection of the significators"),
        rule("P2", 1.5, "perfection by translation of light"),
        rule("P3", 1.25, "perfection by collection of light"),
        rule("P4", 1.5, "perfection carried by the Moon's application"),
        // Special topics: mutually exclusive, lowest id wins.
        grouped("S3", 1.5, "special_topic", "mutual reception between L7 and Mercury"),
        grouped("S4", 1.2, "special_topic", "L7 about to change sign"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_lookup_is_signed() {
        let store = RuleStore::builtin();
        assert_eq!(store.weight_of(&RuleId::new("M1")).unwrap(), 1.0);
        assert_eq!(store.weight_of(&RuleId::new("M3")).unwrap(), -1.0);
        assert_eq!(store.weight_of(&RuleId::new("P4")).unwrap(), 1.5);
        assert_eq!(store.weight_of(&RuleId::new("S3")).unwrap(), 1.5);
        assert_eq!(store.weight_of(&RuleId::new("S4")).unwrap(), 1.2);
    }

    #[test]
    fn unknown_rule_is_loud() {
        let store = RuleStore::builtin();
        let err = store.weight_of(&RuleId::new("Z99")).unwrap_err();
        assert!(err.to_string().contains("Z99"));
    }

    #[test]
    fn select_prefers_lowest_identifier() {
        let store = RuleStore::builtin();
        let picked = store.select(&[RuleId::new("S4"), RuleId::new("S3")]);
        assert_eq!(picked, Some(RuleId::new("S3")));
    }

    #[test]
    fn select_ignores_unknown_ids() {
        let store = RuleStore::builtin();
        assert_eq!(
            store.select(&[RuleId::new("A0"), RuleId::new("S4")]),
            Some(RuleId::new("S4"))
        );
        assert_eq!(store.select(&[]), None);
    }

    #[test]
    fn evaluate_collapses_exclusive_groups() {
        let store = RuleStore::builtin();
        assert_eq!(
            store.evaluate(&[RuleId::new("S3"), RuleId::new("S4")]),
            vec![RuleId::new("S3")]
        );
        assert_eq!(
            store.evaluate(&[RuleId::new("S4"), RuleId::new("S3")]),
            vec![RuleId::new("S3")]
        );
    }

    #[test]
    fn evaluate_passes_ungrouped_rules_through() {
        let store = RuleStore::builtin();
        assert_eq!(
            store.evaluate(&[RuleId::new("P4")]),
            vec![RuleId::new("P4")]
        );
        assert_eq!(
            store.evaluate(&[RuleId::new("P1"), RuleId::new("S4"), RuleId::new("S3")]),
            vec![RuleId::new("P1"), RuleId::new("S3")]
        );
    }

    #[test]
    fn aspect_rules_cover_all_aspects() {
        let store = RuleStore::builtin();
        for aspect in AspectKind::ALL {
            store.weight_of(&aspect_rule(aspect)).unwrap();
        }
    }

    #[test]
    fn rule_defs_round_trip_as_json() {
        let def = grouped("S3", 1.5, "special_topic", "mutual reception");
        let json = serde_json::to_string(&def).unwrap();
        let back: RuleDef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, def);
    }
}
