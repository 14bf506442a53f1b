//! Rule engine: runs rule packs over a fact object and produces a [`Scorecard`].
//!
//! Packs run in a fixed order (risk, then compliance, then classification;
//! ascending `priority` within a stage, registration order on ties). Rules
//! within a pack run in list order. Thresholds come from a [`PlanContext`].

mod scorecard;

pub use scorecard::Scorecard;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use leadgate_core::ScoringConfig;

use crate::evaluator;
use crate::loader::{Result, RuleError};
use crate::schema::{RulePack, TierPolicySpec};
use crate::validation::validate_pack;

use scorecard::Accumulator;

/// Per-plan scoring thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanContext {
    /// Rounded scores at or above this are hot.
    pub hot_cut: f64,
    /// Rounded scores below this are skipped.
    pub skip_cut: f64,
    pub seed_score: f64,
    /// When set, the last rule-driven `set_tier` replaces the threshold tier.
    /// A blocked lead is skipped either way.
    pub respect_manual_tier: bool,
}

impl Default for PlanContext {
    fn default() -> Self {
        Self {
            hot_cut: 70.0,
            skip_cut: 40.0,
            seed_score: 10.0,
            respect_manual_tier: false,
        }
    }
}

impl From<&ScoringConfig> for PlanContext {
    fn from(cfg: &ScoringConfig) -> Self {
        Self {
            hot_cut: cfg.hot_cut,
            skip_cut: cfg.skip_cut,
            seed_score: cfg.seed_score,
            respect_manual_tier: cfg.respect_manual_tier,
        }
    }
}

impl From<&TierPolicySpec> for PlanContext {
    fn from(spec: &TierPolicySpec) -> Self {
        Self {
            hot_cut: spec.hot_cut,
            skip_cut: spec.skip_cut,
            seed_score: spec.seed_score,
            respect_manual_tier: spec.respect_manual_tier,
        }
    }
}

/// Immutable, ordered set of rule packs.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    packs: Vec<RulePack>,
}

impl RuleEngine {
    /// Build an engine, ordering packs by stage then priority.
    pub fn new(mut packs: Vec<RulePack>) -> Self {
        // Stable: equal (stage, priority) keep registration order.
        packs.sort_by_key(|p| (p.spec.stage, p.spec.priority));
        Self { packs }
    }

    /// Build an engine after validating every pack.
    ///
    /// Fails on the first pack with validation errors; warnings are logged.
    pub fn from_packs_validated(packs: Vec<RulePack>) -> Result<Self> {
        for pack in &packs {
            let report = validate_pack(pack);
            for w in &report.warnings {
                warn!(pack_id = %pack.id(), path = %w.path, "{}", w.message);
            }
            if !report.valid {
                return Err(RuleError::Invalid {
                    id: pack.id().to_string(),
                    summary: report.summary(),
                });
            }
        }
        Ok(Self::new(packs))
    }

    /// Packs in execution order, including disabled ones.
    pub fn packs(&self) -> &[RulePack] {
        &self.packs
    }

    /// Score a lead against every enabled pack.
    pub fn score_lead(&self, facts: &Value, plan: &PlanContext) -> Scorecard {
        let mut acc = Accumulator::new(plan.seed_score);

        for pack in self.packs.iter().filter(|p| p.is_enabled()) {
            for (index, rule) in pack.spec.rules.iter().enumerate() {
                let branch = if evaluator::test(rule.when.as_ref(), facts) {
                    Some(&rule.then)
                } else {
                    rule.if_not.as_ref()
                };
                let Some(action) = branch else { continue };

                let label = pack.rule_label(index);
                debug!(pack_id = %pack.id(), rule = %label, stage = %pack.spec.stage, "rule applied");
                acc.apply(action, rule.effective_weight(), label);
            }
        }

        let blocked = acc.is_blocked();
        let card = acc.finish(plan.hot_cut, plan.skip_cut, plan.respect_manual_tier);
        debug!(
            score = card.score,
            tier = %card.tier,
            blocked,
            fired = card.fired_rules.len(),
            "lead scored"
        );
        card
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Action, Condition, PackStage, Rule};
    use leadgate_core::{Channel, Tier};
    use serde_json::json;

    fn add(n: f64) -> Action {
        Action {
            add: Some(n),
            ..Action::default()
        }
    }

    fn tagged(tag: &str) -> Action {
        Action {
            tags: vec![tag.to_string()],
            ..Action::default()
        }
    }

    #[test]
    fn no_packs_yields_seed_score() {
        let card = RuleEngine::default().score_lead(&json!({}), &PlanContext::default());
        assert_eq!(card.score, 10);
        assert_eq!(card.tier, Tier::Skip);
        assert!(card.fired_rules.is_empty());
    }

    #[test]
    fn seed_at_the_skip_cut_lands_warm() {
        let plan = PlanContext {
            seed_score: 40.0,
            ..PlanContext::default()
        };
        let card = RuleEngine::default().score_lead(&json!({}), &plan);
        assert_eq!(card.score, 40);
        assert_eq!(card.tier, Tier::Warm);

        let lowered = PlanContext {
            skip_cut: 10.0,
            ..PlanContext::default()
        };
        let card = RuleEngine::default().score_lead(&json!({}), &lowered);
        assert_eq!(card.tier, Tier::Warm);
    }

    #[test]
    fn stage_order_beats_registration_order() {
        let classification = RulePack::new(
            "fit",
            PackStage::Classification,
            vec![Rule::new(None, tagged("fit"))],
        );
        let risk = RulePack::new("risk", PackStage::Risk, vec![Rule::new(None, tagged("risk"))]);
        let compliance = RulePack::new(
            "gdpr",
            PackStage::Compliance,
            vec![Rule::new(None, tagged("gdpr"))],
        );
        let engine = RuleEngine::new(vec![classification, risk, compliance]);
        let ids: Vec<_> = engine.packs().iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["risk", "gdpr", "fit"]);

        let card = engine.score_lead(&json!({}), &PlanContext::default());
        assert_eq!(card.tags, vec!["risk", "gdpr", "fit"]);
    }

    #[test]
    fn priority_orders_within_stage_and_ties_keep_registration() {
        let engine = RuleEngine::new(vec![
            RulePack::new("b", PackStage::Classification, vec![]).with_priority(5),
            RulePack::new("a", PackStage::Classification, vec![]).with_priority(1),
            RulePack::new("c", PackStage::Classification, vec![]).with_priority(5),
        ]);
        let ids: Vec<_> = engine.packs().iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn mul_is_applied_in_rule_order() {
        let pack = RulePack::new(
            "math",
            PackStage::Classification,
            vec![
                Rule::new(None, add(30.0)),
                Rule::new(
                    None,
                    Action {
                        mul: Some(2.0),
                        ..Action::default()
                    },
                ),
                Rule::new(None, add(5.0)),
            ],
        );
        let card = RuleEngine::new(vec![pack]).score_lead(&json!({}), &PlanContext::default());
        assert_eq!(card.score, 85);
        assert_eq!(card.tier, Tier::Hot);
    }

    #[test]
    fn weight_scales_add_and_sub_of_both_branches() {
        let pack = RulePack::new(
            "weighted",
            PackStage::Classification,
            vec![
                Rule::new(Some(Condition::leaf("eq", "industry", json!("saas"))), add(10.0))
                    .with_weight(3.0),
                Rule::new(Some(Condition::leaf("eq", "industry", json!("retail"))), add(50.0))
                    .with_if_not(Action {
                        sub: Some(2.0),
                        ..Action::default()
                    })
                    .with_weight(2.0),
            ],
        );
        let card = RuleEngine::new(vec![pack])
            .score_lead(&json!({"industry": "SaaS"}), &PlanContext::default());
        assert_eq!(card.score, 36);
        assert_eq!(card.fired_rules, vec!["weighted#0", "weighted#1"]);
    }

    #[test]
    fn block_is_monotonic_and_forces_skip() {
        let risk = RulePack::new(
            "risk",
            PackStage::Risk,
            vec![Rule::new(
                Some(Condition::leaf("eq", "disposable", json!(true))),
                Action {
                    block: true,
                    reasons: vec!["disposable domain".into()],
                    ..Action::default()
                },
            )],
        );
        let boost = RulePack::new(
            "boost",
            PackStage::Classification,
            vec![
                Rule::new(None, add(500.0)),
                Rule::new(
                    None,
                    Action {
                        set_tier: Some(Tier::Hot),
                        block: false,
                        ..Action::default()
                    },
                ),
            ],
        );
        let engine = RuleEngine::new(vec![boost, risk]);
        let plan = PlanContext {
            respect_manual_tier: true,
            ..PlanContext::default()
        };
        let card = engine.score_lead(&json!({"disposable": true}), &plan);
        assert!(card.blocked);
        assert_eq!(card.tier, Tier::Skip);
        assert_eq!(card.score, 100);
        assert_eq!(card.reasons, vec!["disposable domain"]);
    }

    #[test]
    fn set_tier_is_advisory_by_default() {
        let pack = RulePack::new(
            "manual",
            PackStage::Classification,
            vec![Rule::new(
                None,
                Action {
                    add: Some(70.0),
                    set_tier: Some(Tier::Skip),
                    ..Action::default()
                },
            )],
        );
        let engine = RuleEngine::new(vec![pack]);

        let card = engine.score_lead(&json!({}), &PlanContext::default());
        assert_eq!(card.tier, Tier::Hot);
        assert_eq!(card.suggested_tier, Some(Tier::Skip));

        let plan = PlanContext {
            respect_manual_tier: true,
            ..PlanContext::default()
        };
        assert_eq!(engine.score_lead(&json!({}), &plan).tier, Tier::Skip);
    }

    #[test]
    fn disabled_packs_are_skipped() {
        let pack = RulePack::new("off", PackStage::Classification, vec![Rule::new(None, add(80.0))])
            .disabled();
        let card = RuleEngine::new(vec![pack]).score_lead(&json!({}), &PlanContext::default());
        assert_eq!(card.score, 10);
    }

    #[test]
    fn hints_tags_and_reasons_are_deduplicated() {
        let hint = Action {
            channel_hints: vec![Channel::Phone, Channel::Email],
            tags: vec!["icp".into()],
            reasons: vec!["fit".into()],
            ..Action::default()
        };
        let pack = RulePack::new(
            "dups",
            PackStage::Classification,
            vec![Rule::new(None, hint.clone()), Rule::new(None, hint)],
        );
        let card = RuleEngine::new(vec![pack]).score_lead(&json!({}), &PlanContext::default());
        assert_eq!(card.channel_hints, vec![Channel::Phone, Channel::Email]);
        assert_eq!(card.tags, vec!["icp"]);
        assert_eq!(card.reasons, vec!["fit"]);
    }

    #[test]
    fn plan_context_from_policy_and_config() {
        let spec = TierPolicySpec {
            plan: "growth".into(),
            hot_cut: 60.0,
            skip_cut: 30.0,
            seed_score: 20.0,
            respect_manual_tier: true,
        };
        let plan = PlanContext::from(&spec);
        assert_eq!(plan.hot_cut, 60.0);
        assert!(plan.respect_manual_tier);

        let plan = PlanContext::from(&ScoringConfig::default());
        assert_eq!(plan, PlanContext::default());
    }

    #[test]
    fn validated_build_rejects_unknown_operators() {
        let pack = RulePack::new(
            "typo",
            PackStage::Classification,
            vec![Rule::new(Some(Condition::leaf("gtee", "score", json!(1))), add(1.0))],
        );
        let err = RuleEngine::from_packs_validated(vec![pack]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("typo"), "{msg}");
        assert!(msg.contains("gte"), "{msg}");
    }
}
