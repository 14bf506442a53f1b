//! TierPolicy threshold checks.

use crate::schema::TierPolicySpec;

use super::ValidationResult;

pub(super) fn validate_thresholds(spec: &TierPolicySpec, result: &mut ValidationResult) {
    if spec.plan.trim().is_empty() {
        result.error("spec.plan", "plan must not be empty");
    }

    let mut all_finite = true;
    for (path, value) in [
        ("spec.hot_cut", spec.hot_cut),
        ("spec.skip_cut", spec.skip_cut),
        ("spec.seed_score", spec.seed_score),
    ] {
        if !value.is_finite() {
            all_finite = false;
            result.error(path, format!("must be a finite number, got {value}"));
        } else if !(0.0..=100.0).contains(&value) {
            result.warn(path, format!("{value} is outside the 0..=100 score range"));
        }
    }

    if all_finite && spec.hot_cut < spec.skip_cut {
        result.error(
            "spec.hot_cut",
            format!(
                "hot_cut ({}) must not be below skip_cut ({})",
                spec.hot_cut, spec.skip_cut
            ),
        );
    }
}
