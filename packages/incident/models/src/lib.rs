#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fire incident taxonomy, season labels, and dispatch record types.
//!
//! This crate defines the canonical, ordered fire incident taxonomy used
//! across the whole fire dispatch engine. Raw dispatch rows are parsed into
//! [`RawRecord`]s, and the classifier turns the ones that describe fire
//! incidents into [`ClassifiedIncident`]s tagged with an
//! [`IncidentCategory`] and a [`Season`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// First reporting year in which the upstream dispatch system stopped
/// emitting `ALARM` descriptions and began emitting the `Removed`
/// placeholder for reclassified alarm calls.
pub const ALARM_CUTOVER_YEAR: i32 = 2020;

/// Fire incident categories, in canonical taxonomy order.
///
/// The declaration order is significant: it is the column order of every
/// aggregation row and the tie-break order for sorted outputs.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum IncidentCategory {
    /// Alarm activations (mostly false alarms)
    #[serde(rename = "Fire Alarms")]
    #[strum(serialize = "Fire Alarms")]
    FireAlarms,
    /// Dwelling, building and apartment fires
    #[serde(rename = "Structure Fires")]
    #[strum(serialize = "Structure Fires")]
    StructureFires,
    /// Brush, grass, mulch and other outside fires
    #[serde(rename = "Outdoor/Brush Fires")]
    #[strum(serialize = "Outdoor/Brush Fires")]
    OutdoorBrushFires,
    /// Wires down, arcing, transformer issues
    #[serde(rename = "Electrical Issues")]
    #[strum(serialize = "Electrical Issues")]
    ElectricalIssues,
    /// Vehicle fires
    #[serde(rename = "Vehicle Fires")]
    #[strum(serialize = "Vehicle Fires")]
    VehicleFires,
    /// Gas leaks and natural gas issues
    #[serde(rename = "Gas Issues")]
    #[strum(serialize = "Gas Issues")]
    GasIssues,
    /// Hazardous materials and carbon monoxide calls
    #[serde(rename = "Hazmat/CO Issues")]
    #[strum(serialize = "Hazmat/CO Issues")]
    HazmatCoIssues,
    /// Smoke seen/smelled and odor investigations
    #[serde(rename = "Smoke Investigation")]
    #[strum(serialize = "Smoke Investigation")]
    SmokeInvestigation,
    /// Fire calls that fit no more specific category
    #[serde(rename = "Uncategorized Fire")]
    #[strum(serialize = "Uncategorized Fire")]
    UncategorizedFire,
}

impl IncidentCategory {
    /// Number of categories in the taxonomy.
    pub const COUNT: usize = 9;

    /// Returns all variants of this enum in taxonomy order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::FireAlarms,
            Self::StructureFires,
            Self::OutdoorBrushFires,
            Self::ElectricalIssues,
            Self::VehicleFires,
            Self::GasIssues,
            Self::HazmatCoIssues,
            Self::SmokeInvestigation,
            Self::UncategorizedFire,
        ]
    }

    /// Returns the zero-based position of this category in the taxonomy.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Calendar season derived from a reporting quarter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Season {
    /// Q1
    Winter,
    /// Q2
    Spring,
    /// Q3
    Summer,
    /// Q4
    Fall,
}

impl Season {
    /// Returns all seasons in calendar order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Winter, Self::Spring, Self::Summer, Self::Fall]
    }

    /// Maps a reporting quarter code (`"Q1"`..`"Q4"`) to its season.
    ///
    /// Unrecognized codes map to [`Season::Winter`], so this never fails.
    #[must_use]
    pub fn from_quarter(quarter: &str) -> Self {
        match quarter.trim().to_ascii_uppercase().as_str() {
            "Q2" => Self::Spring,
            "Q3" => Self::Summer,
            "Q4" => Self::Fall,
            _ => Self::Winter,
        }
    }
}

/// One dispatch row as received from the bulk record source.
///
/// Text fields hold the trimmed source value (empty when the column was
/// missing). Numeric fields that failed to parse are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    /// Source row identifier.
    pub id: String,
    /// Hashed call identifier.
    pub call_id_hash: String,
    /// Service code (e.g. `"Fire"`, `"EMS"`).
    pub service: String,
    /// Priority code (e.g. `"F1"`).
    pub priority: String,
    /// Human-readable priority description.
    pub priority_desc: String,
    /// Reporting quarter code (`"Q1"`..`"Q4"`).
    pub quarter: String,
    /// Reporting year. `None` when missing or unparsable.
    pub year: Option<i32>,
    /// Short free-text incident description.
    pub description: String,
    /// Municipality code.
    pub place_code: String,
    /// Municipality name.
    pub place_name: String,
    /// Census block group GEOID.
    pub geoid: String,
    /// Block group centroid x (longitude). `None` when not numeric.
    pub centroid_x: Option<f64>,
    /// Block group centroid y (latitude). `None` when not numeric.
    pub centroid_y: Option<f64>,
}

/// A [`RawRecord`] that classified as a fire incident.
///
/// Built once per raw record and never mutated afterwards. Records the
/// classifier excludes never become a `ClassifiedIncident`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedIncident {
    /// The source row.
    #[serde(flatten)]
    pub record: RawRecord,
    /// Assigned taxonomy category.
    pub category: IncidentCategory,
    /// Season derived from the reporting quarter.
    pub season: Season,
}

impl ClassifiedIncident {
    /// Wraps a raw record with its derived category, computing the season
    /// from the record's quarter.
    #[must_use]
    pub fn new(record: RawRecord, category: IncidentCategory) -> Self {
        let season = Season::from_quarter(&record.quarter);
        Self {
            record,
            category,
            season,
        }
    }

    /// Reporting period (year), if the source provided a parsable one.
    #[must_use]
    pub const fn period(&self) -> Option<i32> {
        self.record.year
    }

    /// Municipality name.
    #[must_use]
    pub fn place(&self) -> &str {
        &self.record.place_name
    }

    /// Returns `(x, y)` only when both centroid values parsed.
    ///
    /// Geographic consumers must use this instead of the raw fields, since
    /// malformed rows are retained for counting.
    #[must_use]
    pub const fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.record.centroid_x, self.record.centroid_y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }
}

/// A user's filter selection across the three filterable dimensions.
///
/// Each set is either empty, meaning "no constraint on this dimension", or
/// an allow-list. Sets combine with AND; values within a set combine with
/// OR.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    /// Allowed reporting years.
    pub periods: BTreeSet<i32>,
    /// Allowed categories.
    pub categories: BTreeSet<IncidentCategory>,
    /// Allowed municipality names.
    pub places: BTreeSet<String>,
}

impl FilterSelection {
    /// A selection that constrains nothing.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts the selection to the given years.
    #[must_use]
    pub fn with_periods(mut self, periods: impl IntoIterator<Item = i32>) -> Self {
        self.periods.extend(periods);
        self
    }

    /// Restricts the selection to the given categories.
    #[must_use]
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = IncidentCategory>) -> Self {
        self.categories.extend(categories);
        self
    }

    /// Restricts the selection to the given municipality names.
    #[must_use]
    pub fn with_places<S: Into<String>>(mut self, places: impl IntoIterator<Item = S>) -> Self {
        self.places.extend(places.into_iter().map(Into::into));
        self
    }

    /// Returns `true` when no dimension is constrained.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.periods.is_empty() && self.categories.is_empty() && self.places.is_empty()
    }

    /// Returns `true` if `incident` passes every constrained dimension.
    ///
    /// An incident without a reporting year fails any non-empty period set.
    #[must_use]
    pub fn matches(&self, incident: &ClassifiedIncident) -> bool {
        let period_ok = self.periods.is_empty()
            || incident.period().is_some_and(|year| self.periods.contains(&year));
        let category_ok = self.categories.is_empty() || self.categories.contains(&incident.category);
        let place_ok = self.places.is_empty() || self.places.contains(incident.place());

        period_ok && category_ok && place_ok
    }
}
