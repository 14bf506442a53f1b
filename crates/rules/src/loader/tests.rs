//! Tests for the rule loader module.

use std::fs;

use notify::event::{CreateKind, DataChange, ModifyKind, RemoveKind};
use notify::{Event, EventKind};
use serde_json::json;
use tempfile::TempDir;

use super::watcher::handle_fs_event;
use super::*;
use crate::engine::PlanContext;
use crate::schema::{PackStage, RuleDocument, RuleKind, RulePack};

const FIT_PACK_YAML: &str = r#"
apiVersion: v1
kind: RulePack
metadata:
  id: icp-fit
  name: ICP fit
spec:
  stage: classification
  rules:
    - id: saas
      when: { op: eq, path: company.industry, value: saas }
      then: { add: 40, tags: [saas] }
"#;

const RISK_PACK_YAML: &str = r#"
apiVersion: v1
kind: RulePack
metadata:
  id: disposable-risk
  name: Disposable domains
spec:
  stage: risk
  rules:
    - when: { op: endsWith, path: domain, value: ".tk" }
      then: { block: true, reasons: [disposable tld] }
"#;

const POLICY_YAML: &str = r#"
apiVersion: v1
kind: TierPolicy
metadata:
  id: growth-plan
  name: Growth
spec:
  plan: growth
  hot_cut: 45
  skip_cut: 20
"#;

const TYPO_PACK_YAML: &str = r#"
apiVersion: v1
kind: RulePack
metadata:
  id: typo-pack
  name: Typo
spec:
  rules:
    - when: { op: gtee, path: company.employees, value: 10 }
      then: { add: 5 }
"#;

fn temp_loader() -> (TempDir, RuleLoader) {
    let dir = TempDir::new().expect("create tempdir");
    let loader = RuleLoader::new(dir.path().to_path_buf());
    (dir, loader)
}

#[test]
fn load_pack_from_file() {
    let (dir, loader) = temp_loader();
    let path = dir.path().join("fit.yml");
    fs::write(&path, FIT_PACK_YAML).unwrap();

    let doc = loader.load_file(&path).unwrap();
    assert_eq!(doc.metadata().id, "icp-fit");
    assert_eq!(doc.as_pack().unwrap().spec.rules.len(), 1);
}

#[test]
fn load_all_skips_dotfiles_and_non_yaml() {
    let (dir, loader) = temp_loader();
    fs::write(dir.path().join("fit.yml"), FIT_PACK_YAML).unwrap();
    fs::write(dir.path().join(".hidden.yml"), FIT_PACK_YAML).unwrap();
    fs::write(dir.path().join("readme.txt"), "not a rule").unwrap();

    let results = loader.load_all().unwrap();
    let loaded = results
        .iter()
        .filter(|r| matches!(r.status, LoadStatus::Registered { .. }))
        .count();
    let skipped = results
        .iter()
        .filter(|r| matches!(r.status, LoadStatus::Ignored { .. }))
        .count();
    assert_eq!(loaded, 1);
    assert_eq!(skipped, 2);
    assert!(loader.snapshot().get("icp-fit").is_some());
}

#[test]
fn load_all_recurses_and_mixes_kinds() {
    let (dir, loader) = temp_loader();
    let sub = dir.path().join("packs").join("risk");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join("disposable.yaml"), RISK_PACK_YAML).unwrap();
    fs::write(dir.path().join("fit.yml"), FIT_PACK_YAML).unwrap();
    fs::write(dir.path().join("growth.yml"), POLICY_YAML).unwrap();

    loader.load_all().unwrap();
    let catalog = loader.snapshot();
    assert_eq!(catalog.len(), 3);
    let ids: Vec<_> = catalog.packs().into_iter().map(|p| p.metadata.id).collect();
    assert_eq!(ids, vec!["disposable-risk", "icp-fit"]);
    assert_eq!(catalog.policies().len(), 1);
}

#[test]
fn invalid_documents_are_reported_not_registered() {
    let (dir, loader) = temp_loader();
    fs::write(dir.path().join("typo.yml"), TYPO_PACK_YAML).unwrap();
    fs::write(dir.path().join("broken.yml"), "apiVersion: v1\nkind: [").unwrap();
    fs::write(dir.path().join("fit.yml"), FIT_PACK_YAML).unwrap();

    let results = loader.load_all().unwrap();
    let failed: Vec<_> = results
        .iter()
        .filter_map(|r| match &r.status {
            LoadStatus::Rejected { error } => Some(error.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(failed.len(), 2);
    assert!(failed.iter().any(|e| e.contains("gtee") && e.contains("gte")));
    assert_eq!(loader.snapshot().len(), 1);
}

#[test]
fn empty_id_fails_validation() {
    let (dir, loader) = temp_loader();
    let path = dir.path().join("anon.yml");
    fs::write(&path, FIT_PACK_YAML.replace("id: icp-fit", "id: \"\"")).unwrap();
    let err = loader.load_file(&path).unwrap_err();
    assert!(matches!(err, RuleError::MissingId));
}

#[test]
fn scan_reports_the_kind_of_each_registered_document() {
    let (dir, loader) = temp_loader();
    fs::write(dir.path().join("fit.yml"), FIT_PACK_YAML).unwrap();
    fs::write(dir.path().join("growth.yml"), POLICY_YAML).unwrap();

    let mut registered: Vec<_> = loader
        .load_all()
        .unwrap()
        .into_iter()
        .filter_map(|r| match r.status {
            LoadStatus::Registered { id, kind } => Some((id, kind)),
            _ => None,
        })
        .collect();
    registered.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(registered.len(), 2);
    assert_eq!(registered[0].0, "growth-plan");
    assert_eq!(registered[0].1, RuleKind::TierPolicy);
    assert_eq!(registered[1], ("icp-fit".to_string(), RuleKind::RulePack));
}

#[test]
fn body_that_does_not_fit_its_kind_is_a_shape_error() {
    let (dir, loader) = temp_loader();
    let path = dir.path().join("odd.yml");
    fs::write(&path, FIT_PACK_YAML.replace("kind: RulePack", "kind: TierPolicy")).unwrap();
    match loader.load_file(&path).unwrap_err() {
        RuleError::Shape { id, .. } => assert_eq!(id, "icp-fit"),
        other => panic!("expected shape error, got {other}"),
    }
}

#[test]
fn unknown_kind_is_rejected() {
    let (dir, loader) = temp_loader();
    let path = dir.path().join("other.yml");
    fs::write(&path, FIT_PACK_YAML.replace("kind: RulePack", "kind: ScoringModel")).unwrap();
    assert!(loader.load_file(&path).is_err());
}

#[test]
fn empty_when_loads_and_always_fires() {
    let (dir, loader) = temp_loader();
    let yaml = r#"
apiVersion: v1
kind: RulePack
metadata:
  id: baseline
  name: Baseline
spec:
  rules:
    - id: everyone
      when: {}
      then: { add: 5, tags: [baseline] }
"#;
    fs::write(dir.path().join("baseline.yml"), yaml).unwrap();
    loader.load_all().unwrap();
    assert!(loader.snapshot().get("baseline").is_some());

    let card = loader.engine().score_lead(&json!({}), &PlanContext::default());
    assert_eq!(card.score, 15);
    assert_eq!(card.fired_rules, vec!["everyone"]);
    assert_eq!(card.tags, vec!["baseline"]);
}

#[test]
fn engine_and_policy_come_from_catalog() {
    let (dir, loader) = temp_loader();
    fs::write(dir.path().join("fit.yml"), FIT_PACK_YAML).unwrap();
    fs::write(dir.path().join("risk.yml"), RISK_PACK_YAML).unwrap();
    fs::write(dir.path().join("growth.yml"), POLICY_YAML).unwrap();
    loader.load_all().unwrap();

    let engine = loader.engine();
    assert_eq!(engine.packs()[0].id(), "disposable-risk");

    let plan = loader.plan_context("growth", PlanContext::default());
    assert_eq!(plan.hot_cut, 45.0);
    let fallback = loader.plan_context("enterprise", PlanContext::default());
    assert_eq!(fallback, PlanContext::default());

    let card = engine.score_lead(&json!({"company": {"industry": "SaaS"}, "domain": "acme.io"}), &plan);
    assert_eq!(card.score, 50);
    assert_eq!(card.tier, leadgate_core::Tier::Hot);

    let card = engine.score_lead(&json!({"company": {"industry": "SaaS"}, "domain": "free.tk"}), &plan);
    assert!(card.blocked);
    assert_eq!(card.tier, leadgate_core::Tier::Skip);
}

#[test]
fn write_and_delete_round_trip() {
    let (dir, loader) = temp_loader();
    let pack = RulePack::new("written-pack", PackStage::Compliance, vec![]);
    let path = loader.write_document(&RuleDocument::Pack(pack.clone())).unwrap();
    assert!(path.exists());
    assert!(!dir.path().join(".written-pack.tmp").exists());

    let back = loader.load_file(&path).unwrap();
    assert_eq!(back.as_pack().unwrap(), &pack);

    loader.delete_rule("written-pack").unwrap();
    assert!(!path.exists());
    assert!(loader.snapshot().is_empty());
    match loader.delete_rule("written-pack") {
        Err(RuleError::NotFound(id)) => assert_eq!(id, "written-pack"),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn write_rejects_invalid_document() {
    let (_dir, loader) = temp_loader();
    let pack = RulePack::new("Not Kebab", PackStage::Risk, vec![]);
    assert!(matches!(
        loader.write_document(&RuleDocument::Pack(pack)),
        Err(RuleError::Invalid { .. })
    ));
}

#[test]
fn new_creates_missing_directory() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("a").join("b");
    let loader = RuleLoader::new(nested.clone());
    assert!(nested.is_dir());
    assert_eq!(loader.rules_dir(), nested.as_path());
}

#[test]
fn hot_reload_upserts_keeps_previous_and_removes() {
    let (dir, loader) = temp_loader();
    let path = dir.path().join("fit.yml");
    fs::write(&path, FIT_PACK_YAML).unwrap();
    let catalog = loader.catalog();

    handle_fs_event(
        &Event::new(EventKind::Create(CreateKind::File)).add_path(path.clone()),
        &catalog,
    );
    assert!(catalog.read().unwrap().get("icp-fit").is_some());

    // A broken edit keeps the last good version.
    fs::write(&path, FIT_PACK_YAML.replace("op: eq", "op: eqq")).unwrap();
    handle_fs_event(
        &Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content))).add_path(path.clone()),
        &catalog,
    );
    let kept = catalog.read().unwrap().get("icp-fit").cloned().unwrap();
    let leaf_op = match kept.as_pack().unwrap().spec.rules[0].when.as_ref().unwrap() {
        crate::schema::Condition::Leaf(leaf) => leaf.op.to_string(),
        _ => String::new(),
    };
    assert_eq!(leaf_op, "eq");

    fs::remove_file(&path).unwrap();
    handle_fs_event(
        &Event::new(EventKind::Remove(RemoveKind::File)).add_path(path.clone()),
        &catalog,
    );
    assert!(catalog.read().unwrap().is_empty());
}

#[test]
fn watch_starts_on_existing_directory() {
    let (_dir, mut loader) = temp_loader();
    loader.watch().unwrap();
}
