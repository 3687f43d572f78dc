//! Config-driven dispatch source definition.
//!
//! [`SourceDefinition`] captures everything unique about a bulk dispatch
//! export in a serializable config struct: where to fetch it, how long to
//! wait, and which header names hold which record fields.

use std::time::Duration;

use serde::Deserialize;

use crate::SourceError;

/// Environment variable overriding the export URL.
pub const URL_ENV: &str = "FIRE_DISPATCH_URL";

/// Environment variable overriding the fetch timeout (seconds).
pub const TIMEOUT_ENV: &str = "FIRE_DISPATCH_TIMEOUT_SECS";

const fn default_delimiter() -> char {
    ','
}

const fn default_timeout_secs() -> u64 {
    60
}

const fn default_max_retries() -> u32 {
    3
}

/// A complete, config-driven dispatch source definition.
///
/// Loaded from TOML files embedded at compile time (see
/// [`crate::registry`]).
#[derive(Debug, Clone, Deserialize)]
pub struct SourceDefinition {
    /// Unique identifier (e.g., `"allegheny_fire_dispatch"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// URL of the delimited export.
    pub url: String,
    /// Optional URL to the human-readable data portal page.
    #[serde(default)]
    pub portal_url: Option<String>,
    /// Field delimiter. Must be a single ASCII character.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Upper bound on the whole fetch, retries included.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Connection-level retries for transient HTTP failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Upper bound on a single HTTP attempt. Defaults to an even share of
    /// `timeout_secs` across the first attempt and every retry.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Header names for each record field.
    #[serde(default)]
    pub fields: FieldMapping,
}

impl SourceDefinition {
    /// Fetch timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Timeout for one HTTP attempt, never longer than [`Self::timeout`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_secs
            .map_or_else(
                || self.timeout() / self.max_retries.saturating_add(1),
                Duration::from_secs,
            )
            .min(self.timeout())
    }

    /// The delimiter as a byte. Validated at parse time.
    #[must_use]
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.delimiter).unwrap_or(b',')
    }

    /// Applies `FIRE_DISPATCH_URL` / `FIRE_DISPATCH_TIMEOUT_SECS` from the
    /// process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(URL_ENV).ok(),
            std::env::var(TIMEOUT_ENV).ok(),
        )
    }

    /// Applies explicit overrides. Blank or unparsable values are ignored.
    #[must_use]
    pub fn with_overrides(mut self, url: Option<String>, timeout_secs: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            log::info!("[{}] Using export URL from {URL_ENV}", self.id);
            self.url = url.trim().to_string();
        }
        if let Some(raw) = timeout_secs {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout_secs = secs,
                _ => log::warn!("[{}] Ignoring invalid {TIMEOUT_ENV}={raw:?}", self.id),
            }
        }
        self
    }
}

/// Header names for each [`RawRecord`](fire_dispatch_incident_models::RawRecord)
/// field. Defaults match the county dispatch export.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    /// Row identifier column.
    pub id: String,
    /// Hashed call id column.
    pub call_id_hash: String,
    /// Service code column.
    pub service: String,
    /// Priority code column.
    pub priority: String,
    /// Priority description column.
    pub priority_desc: String,
    /// Reporting quarter column.
    pub quarter: String,
    /// Reporting year column. Required.
    pub year: String,
    /// Free-text description column. Required.
    pub description: String,
    /// Municipality code column.
    pub place_code: String,
    /// Municipality name column.
    pub place_name: String,
    /// Census block group GEOID column.
    pub geoid: String,
    /// Centroid x column.
    pub centroid_x: String,
    /// Centroid y column.
    pub centroid_y: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            id: "_id".to_string(),
            call_id_hash: "call_id_hash".to_string(),
            service: "service".to_string(),
            priority: "priority".to_string(),
            priority_desc: "priority_desc".to_string(),
            quarter: "call_quarter".to_string(),
            year: "call_year".to_string(),
            description: "description_short".to_string(),
            place_code: "city_code".to_string(),
            place_name: "city_name".to_string(),
            geoid: "geoid".to_string(),
            centroid_x: "census_block_group_center__x".to_string(),
            centroid_y: "census_block_group_center__y".to_string(),
        }
    }
}

/// Parses a TOML string into a [`SourceDefinition`].
///
/// # Errors
///
/// Returns [`SourceError::Config`] if the TOML is malformed, or
/// [`SourceError::Normalization`] if the delimiter is not a single ASCII
/// character.
pub fn parse_source_toml(toml_str: &str) -> Result<SourceDefinition, SourceError> {
    let definition: SourceDefinition = toml::de::from_str(toml_str)?;
    if !definition.delimiter.is_ascii() {
        return Err(SourceError::Normalization {
            message: format!(
                "{}: delimiter {:?} is not ASCII",
                definition.id, definition.delimiter
            ),
        });
    }
    Ok(definition)
}
