//! Aggregators: fold testimony sequences into a signed score and a ledger.
//!
//! Two variants share the ledger-entry shape. The static aggregator scores a
//! sequence of already-resolved catalog tokens. The role-weighted aggregator
//! accepts a mixed sequence of tokens and DSL primitives, resolves primitives
//! through the dispatcher, and scales each contribution by the product of the
//! declared importance multipliers of the roles involved.
//!
//! Both are pure functions of (input sequence, contract): identical inputs
//! always produce an identical score and ledger. Entries keep input order and
//! are never deduplicated, so callers control the narrative order of the
//! rationale. An empty input yields a score of 0.0 and an empty ledger.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::contract::Contract;
use crate::dispatch::{Dispatch, ReceptionNote, dispatch};
use crate::dsl::{Actor, Primitive};
use crate::error::AlmutenResult;
use crate::role::Role;
use crate::rules::{RuleStore, aspect_rule};
use crate::token::{Polarity, Token, TokenCatalog, TokenKey};

/// One item of a mixed testimony sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Testimony {
    Token(TokenKey),
    Primitive(Primitive),
}

impl From<TokenKey> for Testimony {
    fn from(key: TokenKey) -> Self {
        Testimony::Token(key)
    }
}

impl From<Primitive> for Testimony {
    fn from(primitive: Primitive) -> Self {
        Testimony::Primitive(primitive)
    }
}

/// One scored contribution in the ledger.
///
/// `delta_yes` and `delta_no` are mutually exclusive: the weight lands on the
/// side the token's polarity dictates. A zero-weight entry records a
/// testimony that was observed but could not be scored (missing role
/// binding), preserving auditability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub token: Token,
    pub polarity: Polarity,
    /// Final magnitude: base weight x dispatch factor x role factor.
    pub weight: f64,
    pub delta_yes: f64,
    pub delta_no: f64,
    pub role_factor: f64,
    /// Participants as supplied by the caller, roles unsubstituted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<Actor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applying: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reception: Option<ReceptionNote>,
}

impl LedgerEntry {
    /// Stable token identifier for this entry.
    pub fn identifier(&self) -> String {
        self.token.identifier()
    }

    fn place(token: Token, polarity: Polarity, weight: f64, role_factor: f64) -> Self {
        let (delta_yes, delta_no) = match polarity {
            Polarity::Positive => (weight, 0.0),
            Polarity::Negative => (0.0, weight),
        };
        LedgerEntry {
            token,
            polarity,
            weight,
            delta_yes,
            delta_no,
            role_factor,
            participants: Vec::new(),
            house: None,
            applying: None,
            reception: None,
        }
    }

    /// Signed contribution of this entry to the score.
    pub fn signed_delta(&self) -> f64 {
        self.delta_yes - self.delta_no
    }
}

// ---------------------------------------------------------------------------
// Static aggregator
// ---------------------------------------------------------------------------

/// Score a sequence of already-resolved catalog tokens.
///
/// Every token contributes exactly the signed weight its rule stores: the
/// magnitude lands on `delta_yes` for positive polarity, `delta_no` for
/// negative.
pub fn aggregate_tokens(
    tokens: &[TokenKey],
    catalog: &TokenCatalog,
    store: &RuleStore,
) -> AlmutenResult<(f64, Vec<LedgerEntry>)> {
    let mut score = 0.0;
    let mut ledger = Vec::with_capacity(tokens.len());
    for &key in tokens {
        let polarity = catalog.polarity_of(key)?;
        let weight = store.weight_of(catalog.rule_of(key)?)?.abs();
        let entry = LedgerEntry::place(key.into(), polarity, weight, 1.0);
        score += entry.signed_delta();
        ledger.push(entry);
    }
    tracing::debug!(entries = ledger.len(), score, "static aggregation complete");
    Ok((score, ledger))
}

// ---------------------------------------------------------------------------
// Role-weighted aggregator
// ---------------------------------------------------------------------------

/// Score a mixed sequence of tokens and primitives under a contract.
///
/// Equivalent to [`aggregate_seeded`] with no pre-declared importance.
pub fn aggregate(
    items: &[Testimony],
    contract: &Contract,
    catalog: &TokenCatalog,
    store: &RuleStore,
) -> AlmutenResult<(f64, Vec<LedgerEntry>)> {
    aggregate_seeded(items, contract, &BTreeMap::new(), catalog, store)
}

/// Role-weighted aggregation with importance multipliers seeded from
/// configuration.
///
/// `RoleImportance` declarations in the stream merge into the seed map (last
/// write per role wins) and emit no ledger entry. Every other item produces
/// at most one entry whose weight is scaled by the product of the importance
/// multipliers of the distinct roles involved; undeclared roles multiply by
/// 1.0.
pub fn aggregate_seeded(
    items: &[Testimony],
    contract: &Contract,
    seed_importance: &BTreeMap<Role, f64>,
    catalog: &TokenCatalog,
    store: &RuleStore,
) -> AlmutenResult<(f64, Vec<LedgerEntry>)> {
    let mut importance = seed_importance.clone();
    let mut score = 0.0;
    let mut ledger = Vec::new();

    for item in items {
        match item {
            Testimony::Primitive(Primitive::RoleImportance { role, factor }) => {
                importance.insert(*role, *factor);
            }
            Testimony::Token(key) => {
                let entry = canonical_entry(
                    *key,
                    1.0,
                    &BTreeSet::from_iter(key.roles()),
                    &importance,
                    catalog,
                    store,
                )?;
                score += entry.signed_delta();
                ledger.push(entry);
            }
            Testimony::Primitive(primitive) => {
                let Some(seed) = dispatch(primitive, contract) else {
                    continue;
                };
                let entry = seeded_entry(seed, contract, &importance, catalog, store)?;
                score += entry.signed_delta();
                ledger.push(entry);
            }
        }
    }

    tracing::debug!(
        entries = ledger.len(),
        score,
        "role-weighted aggregation complete"
    );
    Ok((score, ledger))
}

/// Build the entry for a dispatched primitive.
fn seeded_entry(
    seed: Dispatch,
    contract: &Contract,
    importance: &BTreeMap<Role, f64>,
    catalog: &TokenCatalog,
    store: &RuleStore,
) -> AlmutenResult<LedgerEntry> {
    // Roles involved: those the token names, those the caller passed as
    // actors, and those the contract binds to participating bodies.
    let mut roles: BTreeSet<Role> = BTreeSet::from_iter(seed.token.roles());
    for actor in &seed.participants {
        match actor {
            Actor::Role(role) => {
                roles.insert(*role);
            }
            Actor::Body(body) => {
                if let Some(role) = contract.role_of_body(*body) {
                    roles.insert(role);
                }
            }
        }
    }

    let mut entry = match seed.token {
        Token::Canonical { key } => {
            canonical_entry(key, seed.factor, &roles, importance, catalog, store)?
        }
        Token::Synthesized { aspect, .. } => {
            let signed = store.weight_of(&aspect_rule(aspect))?;
            let polarity = if signed < 0.0 {
                Polarity::Negative
            } else {
                Polarity::Positive
            };
            let role_factor = importance_product(&roles, importance);
            // A synthesized token only scores once every role it encodes is
            // bound; an unresolved role leaves an auditable zero in the
            // ledger rather than a skipped entry.
            let scorable = seed
                .token
                .roles()
                .iter()
                .all(|role| contract.is_bound(*role));
            let weight = if scorable {
                signed.abs() * seed.factor * role_factor
            } else {
                0.0
            };
            LedgerEntry::place(seed.token, polarity, weight, role_factor)
        }
    };

    entry.house = seed.house;
    entry.applying = seed.applying;
    entry.reception = seed.reception;
    entry.participants = seed.participants;
    Ok(entry)
}

fn canonical_entry(
    key: TokenKey,
    dispatch_factor: f64,
    roles: &BTreeSet<Role>,
    importance: &BTreeMap<Role, f64>,
    catalog: &TokenCatalog,
    store: &RuleStore,
) -> AlmutenResult<LedgerEntry> {
    let polarity = catalog.polarity_of(key)?;
    let base = store.weight_of(catalog.rule_of(key)?)?.abs();
    let role_factor = importance_product(roles, importance);
    Ok(LedgerEntry::place(
        key.into(),
        polarity,
        base * dispatch_factor * role_factor,
        role_factor,
    ))
}

fn importance_product(roles: &BTreeSet<Role>, importance: &BTreeMap<Role, f64>) -> f64 {
    roles
        .iter()
        .map(|role| importance.get(role).copied().unwrap_or(1.0))
        .product()
}
