//! Integration tests that load every example document in
//! `data/rules/examples/` and score sample leads against them.

use serde_json::json;

use leadgate_core::{Channel, Tier};
use leadgate_rules::engine::PlanContext;
use leadgate_rules::loader::{LoadStatus, RuleLoader};
use leadgate_rules::schema::{PackStage, RuleDocument};
use leadgate_rules::validation::validate_document;

/// Integration tests run from the crate directory, so go up two levels.
fn examples_dir() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.join("../../data/rules/examples")
}

fn loaded() -> RuleLoader {
    let loader = RuleLoader::new(examples_dir());
    let results = loader.load_all().expect("scan examples");
    for r in &results {
        if let LoadStatus::Rejected { error } = &r.status {
            panic!("{} failed to load: {}", r.path.display(), error);
        }
    }
    loader
}

#[test]
fn every_example_loads_without_validation_errors() {
    let loader = loaded();
    let catalog = loader.snapshot();
    assert_eq!(catalog.len(), 4);
    for pack in catalog.packs() {
        let report = validate_document(&RuleDocument::Pack(pack.clone()));
        assert!(report.valid, "{}: {:?}", pack.metadata.id, report.errors);
    }
}

#[test]
fn example_packs_run_in_stage_order() {
    let engine = loaded().engine();
    let stages: Vec<_> = engine.packs().iter().map(|p| p.spec.stage).collect();
    assert_eq!(
        stages,
        vec![PackStage::Risk, PackStage::Compliance, PackStage::Classification]
    );
}

#[test]
fn strong_lead_is_hot_on_growth_plan() {
    let loader = loaded();
    let plan = loader.plan_context("growth", PlanContext::default());
    assert_eq!(plan.seed_score, 15.0);

    let facts = json!({
        "domain": "acme.io",
        "company": {
            "country": "DE",
            "industry": "SaaS",
            "employees": 300,
            "stack": ["Stripe", "HubSpot"],
        },
        "contact": { "title": "VP Sales" },
        "bundle": { "overall": 0.7, "signals": { "html": { "score": 0.8 } } },
    });

    let card = loader.engine().score_lead(&facts, &plan);
    assert_eq!(card.score, 85);
    assert_eq!(card.tier, Tier::Hot);
    assert!(!card.blocked);
    assert_eq!(card.channel_hints, vec![Channel::Linkedin, Channel::Phone]);
    assert_eq!(card.tags, vec!["contactable", "icp-industry", "strong-signals"]);
    assert_eq!(
        card.fired_rules,
        vec!["opted-out", "saas-industry", "mid-market", "decision-maker", "strong-signals"]
    );
}

#[test]
fn sanctioned_lead_is_blocked_and_zeroed() {
    let loader = loaded();
    let facts = json!({
        "domain": "example.ir",
        "company": { "country": "IR", "industry": "fintech", "employees": 120 },
        "bundle": { "overall": 0.9 },
    });
    let card = loader.engine().score_lead(&facts, &PlanContext::default());
    assert!(card.blocked);
    assert_eq!(card.tier, Tier::Skip);
    assert!(card.reasons.contains(&"sanctioned country".to_string()));
}

#[test]
fn disposable_domain_is_blocked_regardless_of_fit() {
    let loader = loaded();
    let facts = json!({
        "domain": "promo.TK",
        "company": { "industry": "saas", "employees": 100, "stack": ["segment"] },
        "contact": { "title": "Head of Growth" },
        "bundle": { "overall": 1.0 },
    });
    let card = loader.engine().score_lead(&facts, &PlanContext::default());
    assert!(card.blocked);
    assert_eq!(card.tier, Tier::Skip);
    assert_eq!(card.fired_rules[0], "disposable-tld");
}

#[test]
fn sparse_lead_falls_to_skip() {
    let loader = loaded();
    let card = loader
        .engine()
        .score_lead(&json!({ "domain": "unknown.org" }), &PlanContext::default());
    // seed 10, mid-market miss -5, no tech fit -10
    assert_eq!(card.score, 0);
    assert_eq!(card.tier, Tier::Skip);
    assert!(!card.blocked);
}
