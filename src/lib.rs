//! # almuten
//!
//! A horary judgment engine: it answers yes/no questions from an
//! astrological chart by collecting discrete symbolic testimonies, scoring
//! each against a signed-weight table, and producing a numeric verdict plus
//! a human-readable rationale.
//!
//! ## Architecture
//!
//! - **Token catalog** (`token`): closed set of canonical testimony
//!   identifiers with fixed polarity and family/kind tags
//! - **Rule weight store** (`rules`): rule id -> signed magnitude, with
//!   lowest-id arbitration for mutually exclusive groups
//! - **DSL** (`dsl`): tagged-variant descriptions of observed chart
//!   configurations, parameterized by bodies or symbolic roles
//! - **Dispatch** (`dispatch`): role substitution and token resolution,
//!   with synthesized tokens for novel role/aspect pairs
//! - **Aggregators** (`aggregate`): static and role-weighted folds into a
//!   signed score and an itemized ledger
//! - **Rationale** (`rationale`): ledger -> ordered human-readable lines
//!
//! ## Library usage
//!
//! ```
//! use almuten::body::{AspectKind, Planet};
//! use almuten::config::JudgeConfig;
//! use almuten::contract::Contract;
//! use almuten::dsl::aspect;
//! use almuten::engine::{Judge, Verdict};
//! use almuten::role::{L1, LQ};
//!
//! let judge = Judge::new(JudgeConfig::default()).unwrap();
//! let contract = Contract::new()
//!     .bind(L1, Planet::Mars)
//!     .bind(LQ, Planet::Venus);
//! let testimonies = [
//!     aspect(Planet::Moon, Planet::Sun, AspectKind::Trine).into(),
//!     aspect(L1, LQ, AspectKind::Trine).into(),
//! ];
//! let judgment = judge.judge(&testimonies, &contract).unwrap();
//! assert_eq!(judgment.verdict, Verdict::Yes);
//! ```

pub mod aggregate;
pub mod body;
pub mod config;
pub mod contract;
pub mod dispatch;
pub mod dsl;
pub mod engine;
pub mod error;
pub mod rationale;
pub mod role;
pub mod rules;
pub mod token;
