//! End-to-end judgment tests for the almuten engine.
//!
//! These tests exercise the full pipeline from DSL primitives through
//! dispatch, role-weighted aggregation, and rationale rendering, validating
//! that the catalog, weight store, and contract resolution work together.

use almuten::aggregate::Testimony;
use almuten::body::{AspectKind, Planet};
use almuten::config::JudgeConfig;
use almuten::contract::Contract;
use almuten::dsl::{
    aspect, essential, moon_voc, prohibition, reception, role_importance, translation,
    ReceptionKind,
};
use almuten::engine::{Judge, Verdict};
use almuten::role::{L1, L7, L10, LQ, MOON};
use almuten::token::TokenKey;

fn judge() -> Judge {
    Judge::new(JudgeConfig::default()).unwrap()
}

fn marriage_contract() -> Contract {
    Contract::new()
        .bind(L1, Planet::Mars)
        .bind(LQ, Planet::Venus)
        .bind(L7, Planet::Venus)
}

#[test]
fn favorable_chart_judges_yes_with_itemized_rationale() {
    let judge = judge();
    let contract = marriage_contract();

    let testimonies: Vec<Testimony> = vec![
        aspect(Planet::Moon, Planet::Sun, AspectKind::Trine).into(),
        aspect(L1, LQ, AspectKind::Trine).into(),
        reception(L10, L1, ReceptionKind::Mutual).into(),
    ];

    let judgment = judge.judge(&testimonies, &contract).unwrap();
    assert_eq!(judgment.verdict, Verdict::Yes);
    assert_eq!(judgment.score, 3.0);
    assert_eq!(judgment.ledger.len(), 3);
    // Rationale preserves testimony order.
    assert_eq!(
        judgment.rationale[0],
        "moon_applying_trine_examiner_sun (+1.0)"
    );
    assert_eq!(judgment.rationale[1], "l1_trine_lq (+1.0)");
    assert_eq!(judgment.rationale[2], "l10_fortunate (+1.0)");
}

#[test]
fn afflicted_chart_judges_no() {
    let judge = judge();
    let contract = marriage_contract();

    let testimonies: Vec<Testimony> = vec![
        prohibition(Planet::Saturn, L1, AspectKind::Square).into(),
        moon_voc(true, "Moon late in Pisces").into(),
        essential(Planet::Venus, -5).into(),
    ];

    let judgment = judge.judge(&testimonies, &contract).unwrap();
    assert_eq!(judgment.verdict, Verdict::No);
    // D1 (-2.0), M2 (-1.0), LC3 via Venus-as-L7 (-1.0).
    assert_eq!(judgment.score, -4.0);
    assert!(judgment
        .rationale
        .contains(&"l7_malific_debility (-1.0)".to_string()));
}

#[test]
fn mixed_testimonies_balance_to_a_signed_sum() {
    let judge = judge();
    let contract = marriage_contract();

    let testimonies: Vec<Testimony> = vec![
        translation(Planet::Mercury, L1, LQ).into(),
        aspect(L1, L7, AspectKind::Opposition).into(),
    ];

    let judgment = judge.judge(&testimonies, &contract).unwrap();
    // P2 (+1.5) against the synthesized opposition (-1.25).
    assert_eq!(judgment.score, 1.5 - 1.25);
    assert_eq!(judgment.verdict, Verdict::Yes);
}

#[test]
fn mutual_reception_surfaces_in_prose() {
    let judge = judge();
    let contract = Contract::new()
        .bind(L1, Planet::Mars)
        .bind(LQ, Planet::Venus);

    let testimonies: Vec<Testimony> =
        vec![reception(L1, LQ, ReceptionKind::Mutual).into()];

    let judgment = judge.judge(&testimonies, &contract).unwrap();
    assert!(judgment
        .rationale
        .contains(&"Mars receives Venus".to_string()));
    assert!(judgment
        .rationale
        .contains(&"Venus receives Mars".to_string()));
}

#[test]
fn configured_role_importance_seeds_the_aggregator() {
    let config = JudgeConfig::from_toml_str(
        r#"
        [aggregator.role_importance]
        L1 = 1.0
        Moon = 0.7
        L10 = 2.0
        "#,
    )
    .unwrap();
    let judge = Judge::new(config).unwrap();

    let judgment = judge
        .judge(&[TokenKey::L10Fortunate.into()], &Contract::new())
        .unwrap();
    assert_eq!(judgment.score, 2.0);
    assert_eq!(judgment.ledger[0].weight, 2.0);
    assert_eq!(judgment.ledger[0].role_factor, 2.0);
}

#[test]
fn in_stream_declarations_override_configured_seeds() {
    let config = JudgeConfig::from_toml_str(
        r#"
        [aggregator.role_importance]
        moon = 0.5
        "#,
    )
    .unwrap();
    let judge = Judge::new(config).unwrap();

    let testimonies: Vec<Testimony> = vec![
        role_importance(MOON, 2.0).into(),
        TokenKey::MoonApplyingTrineExaminerSun.into(),
    ];
    let judgment = judge.judge(&testimonies, &Contract::new()).unwrap();
    assert_eq!(judgment.score, 2.0);
}

#[test]
fn unscorable_testimony_is_audited_not_dropped() {
    let judge = judge();
    // No contract: the synthesized l1/lq trine cannot be scored.
    let testimonies: Vec<Testimony> = vec![aspect(L1, LQ, AspectKind::Trine).into()];

    let judgment = judge.judge(&testimonies, &Contract::new()).unwrap();
    assert_eq!(judgment.verdict, Verdict::Inconclusive);
    assert_eq!(judgment.score, 0.0);
    assert_eq!(judgment.ledger.len(), 1);
    assert_eq!(judgment.rationale[0], "l1_trine_lq (+0.0)");
}

#[test]
fn non_dsl_noise_is_ignored() {
    let judge = judge();
    let testimonies: Vec<Testimony> = vec![
        almuten::dsl::house(Planet::Mercury, 3).into(),
        TokenKey::PerfectionDirect.into(),
    ];
    let judgment = judge.judge(&testimonies, &Contract::new()).unwrap();
    assert_eq!(judgment.ledger.len(), 1);
    assert_eq!(judgment.score, 2.0);
}

#[test]
fn repeated_judgment_is_idempotent() {
    let judge = judge();
    let contract = marriage_contract();
    let testimonies: Vec<Testimony> = vec![
        role_importance(MOON, 0.7).into(),
        aspect(Planet::Moon, Planet::Sun, AspectKind::Sextile).into(),
        reception(L10, L1, ReceptionKind::Mutual).into(),
        aspect(L1, LQ, AspectKind::Square).into(),
    ];

    let first = judge.judge(&testimonies, &contract).unwrap();
    let second = judge.judge(&testimonies, &contract).unwrap();
    assert_eq!(first, second);
}

#[test]
fn ledger_export_round_trips_as_json() {
    let judge = judge();
    let contract = marriage_contract();
    let testimonies: Vec<Testimony> = vec![
        aspect(Planet::Moon, Planet::Sun, AspectKind::Trine).into(),
        aspect(L1, LQ, AspectKind::Trine).into(),
    ];
    let judgment = judge.judge(&testimonies, &contract).unwrap();

    let json = serde_json::to_string(&judgment.ledger).unwrap();
    let back: Vec<almuten::aggregate::LedgerEntry> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, judgment.ledger);
}
