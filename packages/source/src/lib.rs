#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fire dispatch record source, classifier, and memoized loader.
//!
//! A [`DispatchSource`] knows how to fetch the bulk delimited dispatch
//! export. The [`loader::RecordLoader`] fetches it once per process, parses
//! it into [`RawRecord`](fire_dispatch_incident_models::RawRecord)s and
//! classifies them into the canonical incident dataset.

pub mod classify;
pub mod loader;
pub mod parsing;
pub mod registry;
pub mod retry;
pub mod source_def;

#[cfg(test)]
mod test_server;

use std::time::Duration;

use async_trait::async_trait;

use crate::source_def::{FieldMapping, SourceDefinition};

/// Fetch timeout used when a source does not configure its own.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors that can occur while fetching or parsing dispatch data.
///
/// None of these reach presentation callers: the loader logs them and
/// degrades to an empty dataset.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The delimited text could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A source definition could not be parsed.
    #[error("Invalid source config: {0}")]
    Config(#[from] toml::de::Error),

    /// The fetch did not complete within the configured timeout.
    #[error("Fetch timed out after {after:?}")]
    Timeout {
        /// Configured timeout.
        after: Duration,
    },

    /// No source with the requested id is registered.
    #[error("Unknown source: {id}")]
    UnknownSource {
        /// The requested source id.
        id: String,
    },

    /// The fetched data did not have the expected shape.
    #[error("Normalization error: {message}")]
    Normalization {
        /// Description of what went wrong.
        message: String,
    },

    /// No records were available to classify.
    #[error("Dispatch data unavailable")]
    Unavailable,
}

/// A remote bulk source of dispatch records.
///
/// Implementations only fetch text; parsing and classification are shared.
#[async_trait]
pub trait DispatchSource: Send + Sync {
    /// Returns a unique identifier for this source (e.g.
    /// `"allegheny_fire_dispatch"`).
    fn id(&self) -> &str;

    /// Returns the human-readable name of this source.
    fn name(&self) -> &str;

    /// Header names for each record field.
    fn fields(&self) -> &FieldMapping;

    /// Field delimiter byte.
    fn delimiter(&self) -> u8 {
        b','
    }

    /// Upper bound on a complete fetch, retries included.
    fn timeout(&self) -> Duration {
        DEFAULT_FETCH_TIMEOUT
    }

    /// Downloads the complete delimited export as text.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the download fails.
    async fn fetch_text(&self) -> Result<String, SourceError>;
}

/// A [`DispatchSource`] that downloads a CSV export over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCsvSource {
    definition: SourceDefinition,
    client: reqwest::Client,
    retry_policy: retry::RetryPolicy,
}

impl HttpCsvSource {
    /// Creates a source for the given definition.
    ///
    /// Each HTTP attempt is bounded by [`SourceDefinition::request_timeout`],
    /// leaving room in the whole-fetch timeout for retries.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(definition: SourceDefinition) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(definition.request_timeout())
            .build()?;
        let retry_policy = retry::RetryPolicy::with_max_retries(definition.max_retries);
        Ok(Self {
            definition,
            client,
            retry_policy,
        })
    }

    /// Replaces the retry schedule.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry_policy: retry::RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// The definition this source was built from.
    #[must_use]
    pub const fn definition(&self) -> &SourceDefinition {
        &self.definition
    }
}

#[async_trait]
impl DispatchSource for HttpCsvSource {
    fn id(&self) -> &str {
        &self.definition.id
    }

    fn name(&self) -> &str {
        &self.definition.name
    }

    fn fields(&self) -> &FieldMapping {
        &self.definition.fields
    }

    fn delimiter(&self) -> u8 {
        self.definition.delimiter_byte()
    }

    fn timeout(&self) -> Duration {
        self.definition.timeout()
    }

    async fn fetch_text(&self) -> Result<String, SourceError> {
        log::info!("[{}] Fetching dispatch records from {}", self.id(), self.definition.url);
        let text =
            retry::send_text(|| self.client.get(&self.definition.url), &self.retry_policy).await?;
        log::debug!("[{}] Downloaded {} bytes", self.id(), text.len());
        Ok(text)
    }
}
