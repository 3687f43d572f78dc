//! Process-lifetime, single-flight record loader.
//!
//! [`RecordLoader`] fetches the bulk export once and memoizes both the raw
//! rows and the classified incident dataset. Concurrent first callers share
//! one in-flight fetch. Failures (fetch error, timeout, unusable header) are
//! logged and surface as an empty dataset; they are not memoized, so a later
//! call fetches again.
//!
//! An empty result means "data unavailable", not "zero incidents".

use std::sync::Arc;
use std::time::Duration;

use fire_dispatch_incident_models::{ClassifiedIncident, RawRecord};
use tokio::sync::OnceCell;

use crate::classify::classify_records;
use crate::parsing::parse_records;
use crate::{DispatchSource, SourceError};

/// Memoizing loader for one [`DispatchSource`].
pub struct RecordLoader<S> {
    source: S,
    timeout: Duration,
    records: OnceCell<Arc<[RawRecord]>>,
    incidents: OnceCell<Arc<[ClassifiedIncident]>>,
}

impl<S: DispatchSource> RecordLoader<S> {
    /// Creates a loader using the source's own timeout.
    #[must_use]
    pub fn new(source: S) -> Self {
        let timeout = source.timeout();
        Self {
            source,
            timeout,
            records: OnceCell::new(),
            incidents: OnceCell::new(),
        }
    }

    /// Overrides the fetch timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The underlying source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Returns the raw records, fetching them on first use.
    ///
    /// Returns an empty slice if the data is unavailable.
    pub async fn load(&self) -> Arc<[RawRecord]> {
        match self.records.get_or_try_init(|| self.fetch_records()).await {
            Ok(records) => Arc::clone(records),
            Err(e) => {
                log::error!("[{}] Dispatch data unavailable: {e}", self.source.id());
                Arc::from(Vec::new())
            }
        }
    }

    /// Returns the classified incident dataset, building it once from
    /// [`Self::load`].
    ///
    /// Returns an empty slice if the data is unavailable.
    pub async fn incidents(&self) -> Arc<[ClassifiedIncident]> {
        let result = self
            .incidents
            .get_or_try_init(|| async {
                let records = self.load().await;
                if records.is_empty() {
                    return Err(SourceError::Unavailable);
                }
                Ok(Arc::from(classify_records(&records)))
            })
            .await;

        match result {
            Ok(incidents) => Arc::clone(incidents),
            Err(_) => Arc::from(Vec::new()),
        }
    }

    /// Returns `true` once the classified dataset has been built.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.incidents.initialized()
    }

    /// Drops the memoized data so the next call fetches again.
    pub fn reset(&mut self) {
        self.records.take();
        self.incidents.take();
    }

    async fn fetch_records(&self) -> Result<Arc<[RawRecord]>, SourceError> {
        log::info!("[{}] Loading {}", self.source.id(), self.source.name());

        let text = tokio::time::timeout(self.timeout, self.source.fetch_text())
            .await
            .map_err(|_| SourceError::Timeout {
                after: self.timeout,
            })??;

        let records = parse_records(&text, self.source.delimiter(), self.source.fields())?;
        Ok(Arc::from(records))
    }
}
