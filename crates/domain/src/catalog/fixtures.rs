//! Sample multi-edition catalog for tests (5e, 4e, 2e, OD&D).

use super::RulesCatalog;

/// The raw sample document; the engine's default catalog path points at it.
pub const SAMPLE_CATALOG_JSON: &str = include_str!("sample_catalog.json");

/// Parsed and validated sample catalog.
///
/// Panics if the embedded document is malformed; only compiled for tests.
pub fn sample_catalog() -> RulesCatalog {
    RulesCatalog::from_json_str(SAMPLE_CATALOG_JSON).expect("sample catalog is valid")
}
