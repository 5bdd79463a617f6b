//! Testimony tokens: the closed catalog plus synthesized role-aspect tokens.
//!
//! Every scoreable observation is identified by a [`Token`]: either a
//! [`TokenKey`] from the fixed catalog, or a synthesized token built from two
//! roles and an aspect when the dispatcher meets a configuration the catalog
//! does not name. Catalog tokens carry a fixed polarity, a rule id for weight
//! lookup, and optional family/kind tags; synthesized tokens derive polarity
//! and weight from the aspect pattern rules in the weight store.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::body::AspectKind;
use crate::error::{AlmutenResult, CatalogError};
use crate::role::Role;
use crate::rules::{RuleId, RuleStore};

/// Direction a testimony pushes the judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Polarity::Positive => "positive",
            Polarity::Negative => "negative",
        }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Catalog keys
// ---------------------------------------------------------------------------

/// Canonical keys for all supported testimony tokens.
///
/// The serialized form equals [`TokenKey::as_str`], so stored judgments
/// remain comparable across runs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TokenKey {
    MoonApplyingTrineExaminerSun,
    MoonApplyingSquareExaminerSun,
    MoonApplyingSextileExaminerSun,
    MoonApplyingSextileL1,
    MoonApplyingSextileL7,
    MoonApplyingOppositionExaminerSun,
    MoonApplyingOppositionL1,
    MoonApplyingOppositionL7,
    L10Fortunate,
    L7Fortunate,
    L7MalificDebility,
    L2Fortunate,
    L2MalificDebility,
    L8Fortunate,
    L8MalificDebility,
    L5Fortunate,
    L5MalificDebility,
    PerfectionDirect,
    PerfectionTranslationOfLight,
    PerfectionCollectionOfLight,
    EssentialDetriment,
    AccidentalRetrograde,
    MoonVoidOfCourse,
    MutualReception,
    Prohibition,
    Refranation,
    Frustration,
    Abscission,
}

impl TokenKey {
    /// Every catalog key, in table order.
    pub const ALL: [TokenKey; 28] = [
        TokenKey::MoonApplyingTrineExaminerSun,
        TokenKey::MoonApplyingSquareExaminerSun,
        TokenKey::MoonApplyingSextileExaminerSun,
        TokenKey::MoonApplyingSextileL1,
        TokenKey::MoonApplyingSextileL7,
        TokenKey::MoonApplyingOppositionExaminerSun,
        TokenKey::MoonApplyingOppositionL1,
        TokenKey::MoonApplyingOppositionL7,
        TokenKey::L10Fortunate,
        TokenKey::L7Fortunate,
        TokenKey::L7MalificDebility,
        TokenKey::L2Fortunate,
        TokenKey::L2MalificDebility,
        TokenKey::L8Fortunate,
        TokenKey::L8MalificDebility,
        TokenKey::L5Fortunate,
        TokenKey::L5MalificDebility,
        TokenKey::PerfectionDirect,
        TokenKey::PerfectionTranslationOfLight,
        TokenKey::PerfectionCollectionOfLight,
        TokenKey::EssentialDetriment,
        TokenKey::AccidentalRetrograde,
        TokenKey::MoonVoidOfCourse,
        TokenKey::MutualReception,
        TokenKey::Prohibition,
        TokenKey::Refranation,
        TokenKey::Frustration,
        TokenKey::Abscission,
    ];

    /// Stable snake_case identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKey::MoonApplyingTrineExaminerSun => "moon_applying_trine_examiner_sun",
            TokenKey::MoonApplyingSquareExaminerSun => "moon_applying_square_examiner_sun",
            TokenKey::MoonApplyingSextileExaminerSun => "moon_applying_sextile_examiner_sun",
            TokenKey::MoonApplyingSextileL1 => "moon_applying_sextile_l1",
            TokenKey::MoonApplyingSextileL7 => "moon_applying_sextile_l7",
            TokenKey::MoonApplyingOppositionExaminerSun => "moon_applying_opposition_examiner_sun",
            TokenKey::MoonApplyingOppositionL1 => "moon_applying_opposition_l1",
            TokenKey::MoonApplyingOppositionL7 => "moon_applying_opposition_l7",
            TokenKey::L10Fortunate => "l10_fortunate",
            TokenKey::L7Fortunate => "l7_fortunate",
            TokenKey::L7MalificDebility => "l7_malific_debility",
            TokenKey::L2Fortunate => "l2_fortunate",
            TokenKey::L2MalificDebility => "l2_malific_debility",
            TokenKey::L8Fortunate => "l8_fortunate",
            TokenKey::L8MalificDebility => "l8_malific_debility",
            TokenKey::L5Fortunate => "l5_fortunate",
            TokenKey::L5MalificDebility => "l5_malific_debility",
            TokenKey::PerfectionDirect => "perfection_direct",
            TokenKey::PerfectionTranslationOfLight => "perfection_translation_of_light",
            TokenKey::PerfectionCollectionOfLight => "perfection_collection_of_light",
            TokenKey::EssentialDetriment => "essential_detriment",
            TokenKey::AccidentalRetrograde => "accidental_retrograde",
            TokenKey::MoonVoidOfCourse => "moon_void_of_course",
            TokenKey::MutualReception => "mutual_reception",
            TokenKey::Prohibition => "prohibition",
            TokenKey::Refranation => "refranation",
            TokenKey::Frustration => "frustration",
            TokenKey::Abscission => "abscission",
        }
    }

    /// Roles named inside the identifier, in segment order.
    ///
    /// Role matching is delimiter-based: `l1` names a role in
    /// `moon_applying_sextile_l1` but the `l1` inside `l10_fortunate` does
    /// not, because only whole `_`-separated segments are considered.
    pub fn roles(self) -> Vec<Role> {
        roles_in_identifier(self.as_str())
    }
}

impl std::fmt::Display for TokenKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse delimiter-separated role labels out of a token identifier.
pub(crate) fn roles_in_identifier(identifier: &str) -> Vec<Role> {
    let mut roles = Vec::new();
    for segment in identifier.split('_') {
        if let Some(role) = Role::from_label(segment) {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
    }
    roles
}

// ---------------------------------------------------------------------------
// Token: canonical or synthesized
// ---------------------------------------------------------------------------

/// A testimony token: catalog key, or a synthesized role-aspect pattern.
///
/// Synthesized tokens let novel role combinations enter the ledger without
/// growing the catalog. They are structured values, not spliced strings, but
/// expose the stable identifier `"<a>_<aspect>_<b>"` for persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum Token {
    Canonical { key: TokenKey },
    Synthesized { a: Role, b: Role, aspect: AspectKind },
}

impl Token {
    /// Stable string identifier, suitable for storage and comparison.
    pub fn identifier(&self) -> String {
        match self {
            Token::Canonical { key } => key.as_str().to_string(),
            Token::Synthesized { a, b, aspect } => {
                format!("{}_{}_{}", a.label(), aspect.label(), b.label())
            }
        }
    }

    /// Roles involved in this token.
    pub fn roles(&self) -> Vec<Role> {
        match self {
            Token::Canonical { key } => key.roles(),
            Token::Synthesized { a, b, .. } => {
                if a == b {
                    vec![*a]
                } else {
                    vec![*a, *b]
                }
            }
        }
    }
}

impl From<TokenKey> for Token {
    fn from(key: TokenKey) -> Self {
        Token::Canonical { key }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.identifier())
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable token catalog: polarity, rule indirection, family/kind tags.
///
/// Loaded once at startup and injected into the aggregators, so tests can
/// substitute their own (possibly deliberately broken) tables.
#[derive(Debug, Default, Clone)]
pub struct TokenCatalog {
    polarity: BTreeMap<TokenKey, Polarity>,
    rules: BTreeMap<TokenKey, RuleId>,
    family: BTreeMap<TokenKey, &'static str>,
    kind: BTreeMap<TokenKey, &'static str>,
}

impl TokenCatalog {
    /// An empty catalog; useful as a starting point for substitute tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token with its polarity and rule id.
    pub fn insert(&mut self, key: TokenKey, polarity: Polarity, rule: &str) {
        self.polarity.insert(key, polarity);
        self.rules.insert(key, RuleId::new(rule));
    }

    /// Tag a token with a family (group) label.
    pub fn tag_family(&mut self, key: TokenKey, family: &'static str) {
        self.family.insert(key, family);
    }

    /// Tag a token with a kind (sub-group) label.
    pub fn tag_kind(&mut self, key: TokenKey, kind: &'static str) {
        self.kind.insert(key, kind);
    }

    /// Fixed polarity of a catalog token.
    ///
    /// Absence is a configuration defect, not a runtime fallback.
    pub fn polarity_of(&self, key: TokenKey) -> AlmutenResult<Polarity> {
        self.polarity
            .get(&key)
            .copied()
            .ok_or_else(|| {
                CatalogError::MissingPolarity {
                    token: key.as_str().to_string(),
                }
                .into()
            })
    }

    /// Rule id the token's weight is stored under.
    pub fn rule_of(&self, key: TokenKey) -> AlmutenResult<&RuleId> {
        self.rules.get(&key).ok_or_else(|| {
            CatalogError::MissingRule {
                token: key.as_str().to_string(),
            }
            .into()
        })
    }

    /// Family tag, if the token belongs to a semantic group.
    ///
    /// Tags exist so callers may cap or deduplicate contributions per family;
    /// the catalog itself never enforces caps.
    pub fn family_of(&self, key: TokenKey) -> Option<&'static str> {
        self.family.get(&key).copied()
    }

    /// Kind tag within the family, if any.
    pub fn kind_of(&self, key: TokenKey) -> Option<&'static str> {
        self.kind.get(&key).copied()
    }

    /// Keys registered in the polarity table, in stable order.
    pub fn keys(&self) -> impl Iterator<Item = TokenKey> + '_ {
        self.polarity.keys().copied()
    }

    /// Verify that every cataloged token has a stored weight whose sign
    /// agrees with its polarity.
    ///
    /// A disagreement is a data-integrity bug in one of the two tables;
    /// it is reported, never reconciled.
    pub fn verify_against(&self, store: &RuleStore) -> AlmutenResult<()> {
        for (&key, &polarity) in &self.polarity {
            let rule = self.rule_of(key)?;
            let weight = store.weight_of(rule)?;
            let agrees = match polarity {
                Polarity::Positive => weight >= 0.0,
                Polarity::Negative => weight <= 0.0,
            };
            if !agrees {
                return Err(CatalogError::SignMismatch {
                    token: key.as_str().to_string(),
                    polarity: polarity.as_str().to_string(),
                    rule: rule.to_string(),
                    weight,
                }
                .into());
            }
        }
        Ok(())
    }

    /// The builtin catalog, loaded once per process.
    pub fn builtin() -> &'static TokenCatalog {
        static CATALOG: OnceLock<TokenCatalog> = OnceLock::new();
        CATALOG.get_or_init(build_catalog)
    }
}

fn build_catalog() -> TokenCatalog {
    use Polarity::{Negative, Positive};
    use TokenKey::*;

    let mut catalog = TokenCatalog::new();

    // Moon testimonies (M series).
    catalog.insert(MoonApplyingTrineExaminerSun, Positive, "M1");
    catalog.insert(MoonVoidOfCourse, Negative, "M2");
    catalog.insert(MoonApplyingSquareExaminerSun, Negative, "M3");
    catalog.insert(MoonApplyingSextileExaminerSun, Positive, "M4");
    catalog.insert(MoonApplyingSextileL1, Positive, "M5");
    catalog.insert(MoonApplyingSextileL7, Positive, "M6");
    catalog.insert(MoonApplyingOppositionExaminerSun, Negative, "M7");
    catalog.insert(MoonApplyingOppositionL1, Negative, "M8");
    catalog.insert(MoonApplyingOppositionL7, Negative, "M9");

    // Lord-condition testimonies (LC series).
    catalog.insert(L10Fortunate, Positive, "LC1");
    catalog.insert(L7Fortunate, Positive, "LC2");
    catalog.insert(L7MalificDebility, Negative, "LC3");
    catalog.insert(L2Fortunate, Positive, "LC4");
    catalog.insert(L2MalificDebility, Negative, "LC5");
    catalog.insert(L8Fortunate, Positive, "LC6");
    catalog.insert(L8MalificDebility, Negative, "LC7");
    catalog.insert(L5Fortunate, Positive, "LC8");
    catalog.insert(L5MalificDebility, Negative, "LC9");

    // Perfection testimonies (P series).
    catalog.insert(PerfectionDirect, Positive, "P1");
    catalog.insert(PerfectionTranslationOfLight, Positive, "P2");
    catalog.insert(PerfectionCollectionOfLight, Positive, "P3");

    // Debility modifiers (MOD series).
    catalog.insert(EssentialDetriment, Negative, "MOD2");
    catalog.insert(AccidentalRetrograde, Negative, "MOD3");

    // Reception (R series).
    catalog.insert(MutualReception, Positive, "R1");

    // Denial testimonies (D series).
    catalog.insert(Prohibition, Negative, "D1");
    catalog.insert(Refranation, Negative, "D2");
    catalog.insert(Frustration, Negative, "D3");
    catalog.insert(Abscission, Negative, "D4");

    // Family/kind tagging for group-based contribution control downstream.
    for (key, family, kind) in [
        (PerfectionDirect, "perfection", "direct"),
        (PerfectionTranslationOfLight, "perfection", "tol"),
        (PerfectionCollectionOfLight, "perfection", "col"),
        (L7Fortunate, "l7_condition", "l7"),
        (L7MalificDebility, "l7_condition", "l7"),
        (L2Fortunate, "l2_condition", "l2"),
        (L2MalificDebility, "l2_condition", "l2"),
        (L8Fortunate, "l8_condition", "l8"),
        (L8MalificDebility, "l8_condition", "l8"),
        (L5Fortunate, "l5_condition", "l5"),
        (L5MalificDebility, "l5_condition", "l5"),
        (Prohibition, "denial", "prohibition"),
        (Refranation, "denial", "refranation"),
        (Frustration, "denial", "frustration"),
        (Abscission, "denial", "abscission"),
    ] {
        catalog.tag_family(key, family);
        catalog.tag_kind(key, kind);
    }

    catalog
}
