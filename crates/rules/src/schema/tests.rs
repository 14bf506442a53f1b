//! Tests for schema types.

use super::*;
use leadgate_core::{Channel, Tier};
use serde_json::json;

const COMPLIANCE_PACK_YAML: &str = r#"
apiVersion: v1
kind: RulePack
metadata:
  id: compliance-core
  name: Compliance Core
  description: Hard blocks for sanctioned or opted-out targets
  tags: [compliance]
  enabled: true
spec:
  stage: compliance
  priority: 5
  rules:
    - id: sanctioned-country
      when:
        any:
          - { op: in, path: company.country, value: [KP, IR, SY] }
          - { op: eq, path: company.sanctioned, value: true }
      then:
        mul: 0
        block: true
        set_tier: skip
        reasons: [sanctioned]
    - id: opted-out
      when: { op: exists, path: contact.opt_out_at }
      then:
        block: true
        reasons: [opted out]
      if_not:
        tags: [contactable]
"#;

const POLICY_YAML: &str = r#"
apiVersion: v1
kind: TierPolicy
metadata:
  id: plan-growth
  name: Growth plan thresholds
spec:
  plan: growth
  hot_cut: 65
  skip_cut: 35
"#;

#[test]
fn parse_pack_document() {
    let pack: RulePack = serde_yaml::from_str(COMPLIANCE_PACK_YAML).unwrap();
    assert_eq!(pack.metadata.id, "compliance-core");
    assert_eq!(pack.spec.stage, PackStage::Compliance);
    assert_eq!(pack.spec.priority, 5);
    assert_eq!(pack.spec.rules.len(), 2);

    let first = &pack.spec.rules[0];
    assert_eq!(first.id.as_deref(), Some("sanctioned-country"));
    assert_eq!(first.then.mul, Some(0.0));
    assert!(first.then.block);
    assert_eq!(first.then.set_tier, Some(Tier::Skip));
    match first.when.as_ref().unwrap() {
        Condition::Group(Group::Any(children)) => {
            assert_eq!(children.len(), 2);
            match &children[0] {
                Condition::Leaf(leaf) => {
                    assert_eq!(leaf.op, Operator::In);
                    assert_eq!(leaf.path, "company.country");
                    assert_eq!(leaf.value, json!(["KP", "IR", "SY"]));
                }
                other => panic!("expected leaf, got {other:?}"),
            }
        }
        other => panic!("expected any-group, got {other:?}"),
    }

    let second = &pack.spec.rules[1];
    assert_eq!(second.if_not.as_ref().unwrap().tags, vec!["contactable"]);
    assert_eq!(second.effective_weight(), 1.0);
}

#[test]
fn stage_defaults_to_classification() {
    let yaml = r#"
apiVersion: v1
kind: RulePack
metadata: { id: fit, name: Fit }
spec:
  rules:
    - then: { add: 5 }
"#;
    let pack: RulePack = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(pack.spec.stage, PackStage::Classification);
    assert!(pack.metadata.enabled);
    assert!(pack.spec.rules[0].when.is_none());
}

#[test]
fn stage_order_is_risk_compliance_classification() {
    assert!(PackStage::Risk < PackStage::Compliance);
    assert!(PackStage::Compliance < PackStage::Classification);
}

#[test]
fn node_mixing_group_and_leaf_is_rejected() {
    let yaml = r#"
all:
  - { op: eq, path: a, value: 1 }
op: eq
path: b
"#;
    assert!(serde_yaml::from_str::<Condition>(yaml).is_err());
}

#[test]
fn empty_node_is_always() {
    let c: Condition = serde_json::from_value(json!({})).unwrap();
    assert_eq!(c, Condition::always());
    assert_eq!(serde_json::to_value(&c).unwrap(), json!({}));
    // Unknown keys are still rejected rather than read as "always".
    assert!(serde_json::from_value::<Condition>(json!({"pth": "a"})).is_err());
}

#[test]
fn unknown_operator_is_preserved() {
    let c: Condition = serde_json::from_value(json!({"op": "approx", "path": "a", "value": 1})).unwrap();
    match c {
        Condition::Leaf(leaf) => assert_eq!(leaf.op, Operator::Unknown("approx".into())),
        other => panic!("expected leaf, got {other:?}"),
    }
}

#[test]
fn camel_case_aliases_are_accepted() {
    let rule: Rule = serde_json::from_value(json!({
        "then": { "setTier": "hot", "channelHints": ["phone"] },
        "ifNot": { "sub": 3 },
        "when": { "op": "startsWith", "path": "domain", "value": "shop" }
    }))
    .unwrap();
    assert_eq!(rule.then.set_tier, Some(Tier::Hot));
    assert_eq!(rule.then.channel_hints, vec![Channel::Phone]);
    assert_eq!(rule.if_not.unwrap().sub, Some(3.0));
}

#[test]
fn none_group_serializes_as_none() {
    let c = Condition::none(vec![Condition::leaf("eq", "a", json!(1))]);
    let v = serde_json::to_value(&c).unwrap();
    assert_eq!(v, json!({"none": [{"op": "eq", "path": "a", "value": 1}]}));
    let back: Condition = serde_json::from_value(v).unwrap();
    assert_eq!(back, c);
}

#[test]
fn envelope_dispatches_by_kind() {
    let env: RuleEnvelope = serde_yaml::from_str(POLICY_YAML).unwrap();
    assert_eq!(env.rule_kind().unwrap(), RuleKind::TierPolicy);
    let doc = env.parse_full().unwrap();
    let policy = doc.as_policy().unwrap();
    assert_eq!(policy.spec.plan, "growth");
    assert_eq!(policy.spec.seed_score, 10.0);
    assert!(!policy.spec.respect_manual_tier);

    let env: RuleEnvelope = serde_yaml::from_str(COMPLIANCE_PACK_YAML).unwrap();
    let doc = env.parse_full().unwrap();
    assert_eq!(doc.kind(), RuleKind::RulePack);
    assert_eq!(doc.metadata().id, "compliance-core");
}

#[test]
fn envelope_rejects_unknown_kind() {
    let yaml = r#"
apiVersion: v1
kind: ScoringModel
metadata: { id: x, name: X }
spec: {}
"#;
    let env: RuleEnvelope = serde_yaml::from_str(yaml).unwrap();
    assert!(env.parse_full().is_err());
}

#[test]
fn document_yaml_round_trip() {
    let pack: RulePack = serde_yaml::from_str(COMPLIANCE_PACK_YAML).unwrap();
    let yaml = RuleDocument::Pack(pack.clone()).to_yaml().unwrap();
    let back: RulePack = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back, pack);
}

#[test]
fn rule_label_falls_back_to_index() {
    let pack = RulePack::new(
        "fit",
        PackStage::Classification,
        vec![
            Rule::new(None, Action::default()).with_id("named"),
            Rule::new(None, Action::default()),
        ],
    );
    assert_eq!(pack.rule_label(0), "named");
    assert_eq!(pack.rule_label(1), "fit#1");
}
