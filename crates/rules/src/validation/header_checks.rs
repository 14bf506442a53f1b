//! Envelope checks shared by every document kind.

use crate::schema::CommonMetadata;

use super::fuzzy::is_kebab_case;
use super::ValidationResult;

pub(super) fn validate_header(
    api_version: &str,
    kind: &str,
    expected_kind: &str,
    metadata: &CommonMetadata,
    result: &mut ValidationResult,
) {
    if api_version != "v1" {
        result.error("apiVersion", format!("apiVersion must be 'v1', got '{api_version}'"));
    }

    if kind != expected_kind {
        result.error("kind", format!("kind must be '{expected_kind}', got '{kind}'"));
    }

    if !is_kebab_case(&metadata.id) {
        result.error(
            "metadata.id",
            format!(
                "id must be kebab-case (lowercase alphanumeric + hyphens), got '{}'",
                metadata.id
            ),
        );
    }

    if metadata.name.trim().is_empty() {
        result.warn("metadata.name", "name is empty");
    }
}
