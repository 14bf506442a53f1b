//! Registration-time validation with structured errors and suggestions.
//!
//! Evaluation never fails on malformed rules; instead, mistakes such as
//! misspelled operators or broken regexes are caught here, before a pack is
//! handed to the engine. Returns a [`ValidationResult`] with errors (block
//! registration) and warnings (advisory).

mod header_checks;
mod pack_checks;
mod policy_checks;

pub mod fuzzy;

use serde::{Deserialize, Serialize};

use crate::schema::*;

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Location, e.g. `"spec.rules[2].when.all[0].op"`.
    pub path: String,
    pub message: String,
    /// Optional "Did you mean …?" suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        });
    }

    pub(crate) fn error_with_suggestion(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: Some(suggestion.into()),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }

    /// One-line rendering of every error, for error messages.
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| match &e.suggestion {
                Some(s) => format!("{}: {} ({})", e.path, e.message, s),
                None => format!("{}: {}", e.path, e.message),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ── Public API ──────────────────────────────────────────────────────

/// Validate a parsed [`RulePack`].
pub fn validate_pack(pack: &RulePack) -> ValidationResult {
    let mut result = ValidationResult::new();
    header_checks::validate_header(&pack.api_version, &pack.kind, RulePack::KIND, &pack.metadata, &mut result);
    pack_checks::validate_rules(pack, &mut result);
    result
}

/// Validate a parsed [`TierPolicy`].
pub fn validate_policy(policy: &TierPolicy) -> ValidationResult {
    let mut result = ValidationResult::new();
    header_checks::validate_header(
        &policy.api_version,
        &policy.kind,
        TierPolicy::KIND,
        &policy.metadata,
        &mut result,
    );
    policy_checks::validate_thresholds(&policy.spec, &mut result);
    result
}

/// Validate any [`RuleDocument`] variant.
pub fn validate_document(doc: &RuleDocument) -> ValidationResult {
    match doc {
        RuleDocument::Pack(pack) => validate_pack(pack),
        RuleDocument::Policy(policy) => validate_policy(policy),
    }
}

/// Parse raw YAML (either kind) and validate. Parse errors become a single
/// root-level error.
pub fn validate_yaml(yaml: &str) -> ValidationResult {
    let parsed = serde_yaml::from_str::<RuleEnvelope>(yaml)
        .map_err(|e| e.to_string())
        .and_then(|env| env.parse_full());
    match parsed {
        Ok(doc) => validate_document(&doc),
        Err(e) => {
            let mut result = ValidationResult::new();
            result.error("", format!("YAML parse error: {e}"));
            result
        }
    }
}
