#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filtering, aggregation and summary statistics over classified fire
//! dispatch incidents.
//!
//! Everything here is a synchronous pure function over borrowed incidents.
//! Callers filter the shared dataset once per selection with
//! [`filter_incidents`] and then feed the result to any number of
//! aggregations. Nothing is cached by selection.

pub mod aggregate;
pub mod filter;
pub mod stats;

pub use aggregate::{
    DEFAULT_PLACE_HOTSPOTS, DEFAULT_PLACE_OPTIONS, POST_CUTOVER_ALARM_RATIO, available_periods,
    by_category, by_period, by_place, by_priority, by_season, false_alarm_split, top_places,
};
pub use filter::filter_incidents;
pub use stats::{HIGH_PRIORITY_CODES, summary_stats};

#[cfg(test)]
pub(crate) mod test_support {
    use fire_dispatch_incident_models::{ClassifiedIncident, IncidentCategory, RawRecord};

    /// Builds an incident with the fields the analytics read.
    pub fn incident(
        category: IncidentCategory,
        year: Option<i32>,
        quarter: &str,
        place: &str,
    ) -> ClassifiedIncident {
        ClassifiedIncident::new(
            RawRecord {
                quarter: quarter.to_string(),
                year,
                place_name: place.to_string(),
                ..RawRecord::default()
            },
            category,
        )
    }

    /// Same as [`incident`] with a priority code, priority description and
    /// dispatch description.
    pub fn dispatched(
        category: IncidentCategory,
        year: Option<i32>,
        priority: &str,
        priority_desc: &str,
        description: &str,
    ) -> ClassifiedIncident {
        ClassifiedIncident::new(
            RawRecord {
                quarter: "Q1".to_string(),
                year,
                priority: priority.to_string(),
                priority_desc: priority_desc.to_string(),
                description: description.to_string(),
                place_name: "PITTSBURGH".to_string(),
                ..RawRecord::default()
            },
            category,
        )
    }
}
