//! Source registry. Loads all source definitions from embedded TOML configs.
//!
//! Each `.toml` file in `packages/source/sources/` is baked into the binary
//! at compile time via [`include_str!`].

use crate::SourceError;
use crate::source_def::{SourceDefinition, parse_source_toml};

/// Source used when the caller does not pick one.
pub const DEFAULT_SOURCE_ID: &str = "allegheny_fire_dispatch";

/// TOML configs embedded at compile time.
const SOURCE_TOMLS: &[(&str, &str)] = &[(
    "allegheny_fire_dispatch",
    include_str!("../sources/allegheny_fire_dispatch.toml"),
)];

/// Returns all configured source definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_sources() -> Vec<SourceDefinition> {
    SOURCE_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_source_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a source definition by id and applies environment overrides.
///
/// # Errors
///
/// Returns [`SourceError::UnknownSource`] if no source has the given id.
pub fn find_source(id: &str) -> Result<SourceDefinition, SourceError> {
    all_sources()
        .into_iter()
        .find(|s| s.id == id)
        .map(SourceDefinition::with_env_overrides)
        .ok_or_else(|| SourceError::UnknownSource { id: id.to_string() })
}
