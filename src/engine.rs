//! Judge facade: top-level API for scoring a question.
//!
//! The `Judge` owns the read-only tables (token catalog, rule weight store)
//! and provides the public interface for dispatching, aggregating, and
//! rendering testimony sequences. It holds no mutable state between calls:
//! independent callers may score questions concurrently as long as each call
//! supplies its own contract and testimony sequence.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::aggregate::{
    LedgerEntry, Testimony, aggregate_seeded, aggregate_tokens,
};
use crate::config::JudgeConfig;
use crate::contract::Contract;
use crate::dispatch::{Dispatch, dispatch};
use crate::dsl::Primitive;
use crate::error::{AlmutenResult, EngineError};
use crate::rationale::build_rationale;
use crate::rules::RuleStore;
use crate::token::{TokenCatalog, TokenKey};

/// Outcome of judging one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Yes,
    No,
    Inconclusive,
}

impl Verdict {
    fn from_score(score: f64) -> Self {
        if score > 0.0 {
            Verdict::Yes
        } else if score < 0.0 {
            Verdict::No
        } else {
            Verdict::Inconclusive
        }
    }
}

/// Full result of one judgment: verdict, score, itemized ledger, rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    pub verdict: Verdict,
    pub score: f64,
    pub ledger: Vec<LedgerEntry>,
    pub rationale: Vec<String>,
}

/// The almuten judgment engine.
///
/// Wires the token catalog and rule weight store together and verifies their
/// agreement at construction time, so table defects surface at startup
/// instead of mid-judgment.
#[derive(Debug)]
pub struct Judge {
    config: JudgeConfig,
    catalog: Arc<TokenCatalog>,
    store: Arc<RuleStore>,
}

impl Judge {
    /// Create a judge over the builtin tables.
    pub fn new(config: JudgeConfig) -> AlmutenResult<Self> {
        Self::with_tables(
            config,
            Arc::new(TokenCatalog::builtin().clone()),
            Arc::new(RuleStore::builtin().clone()),
        )
    }

    /// Create a judge over substitute tables.
    ///
    /// This is the seam that keeps the engine testable in isolation; the
    /// same startup verification applies.
    pub fn with_tables(
        config: JudgeConfig,
        catalog: Arc<TokenCatalog>,
        store: Arc<RuleStore>,
    ) -> AlmutenResult<Self> {
        catalog.verify_against(&store).map_err(|source| {
            EngineError::TablesInconsistent {
                source: Box::new(source),
            }
        })?;

        // Configuration defects (unknown role labels) also surface here.
        let seeds = config.importance_map()?;
        tracing::info!(
            tokens = catalog.keys().count(),
            importance_seeds = seeds.len(),
            role_weighted = config.aggregator.use_role_weighting,
            "initializing almuten judge"
        );

        Ok(Judge {
            config,
            catalog,
            store,
        })
    }

    /// Resolve one primitive against a contract.
    pub fn dispatch(&self, primitive: &Primitive, contract: &Contract) -> Option<Dispatch> {
        dispatch(primitive, contract)
    }

    /// Static aggregation over already-resolved tokens.
    pub fn aggregate_tokens(
        &self,
        tokens: &[TokenKey],
    ) -> AlmutenResult<(f64, Vec<LedgerEntry>)> {
        aggregate_tokens(tokens, &self.catalog, &self.store)
    }

    /// Role-weighted aggregation over a mixed testimony sequence, seeded
    /// with the configured importance table.
    pub fn aggregate(
        &self,
        items: &[Testimony],
        contract: &Contract,
    ) -> AlmutenResult<(f64, Vec<LedgerEntry>)> {
        let seeds = if self.config.aggregator.use_role_weighting {
            self.config.importance_map()?
        } else {
            Default::default()
        };
        aggregate_seeded(items, contract, &seeds, &self.catalog, &self.store)
    }

    /// Render a ledger into rationale lines.
    pub fn render(&self, ledger: &[LedgerEntry]) -> Vec<String> {
        build_rationale(ledger)
    }

    /// Aggregate and render in one call, producing the full judgment.
    pub fn judge(
        &self,
        items: &[Testimony],
        contract: &Contract,
    ) -> AlmutenResult<Judgment> {
        let (score, ledger) = self.aggregate(items, contract)?;
        let rationale = build_rationale(&ledger);
        Ok(Judgment {
            verdict: Verdict::from_score(score),
            score,
            ledger,
            rationale,
        })
    }
}
