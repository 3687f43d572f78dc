#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation row and summary statistic types for fire dispatch analytics.
//!
//! Every grouped view keeps its per-category counts in a [`CategoryCounts`]
//! value, a fixed array indexed by [`IncidentCategory`], so the taxonomy
//! stays closed and every row carries a zero-filled count for every
//! category.

use std::collections::BTreeMap;

use fire_dispatch_incident_models::{IncidentCategory, Season};
use serde::{Deserialize, Serialize};

/// Zero-filled incident counts for every taxonomy category.
///
/// Serializes as a map from category display name to count, in taxonomy
/// order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<IncidentCategory, u64>",
    into = "BTreeMap<IncidentCategory, u64>"
)]
pub struct CategoryCounts([u64; IncidentCategory::COUNT]);

impl CategoryCounts {
    /// All-zero counts.
    #[must_use]
    pub const fn new() -> Self {
        Self([0; IncidentCategory::COUNT])
    }

    /// Adds one incident of `category`.
    pub const fn increment(&mut self, category: IncidentCategory) {
        self.0[category.index()] += 1;
    }

    /// Count for `category`.
    #[must_use]
    pub const fn get(&self, category: IncidentCategory) -> u64 {
        self.0[category.index()]
    }

    /// Sum over all categories.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    /// `(category, count)` pairs in taxonomy order, zeros included.
    pub fn iter(&self) -> impl Iterator<Item = (IncidentCategory, u64)> + '_ {
        IncidentCategory::all()
            .iter()
            .map(|&category| (category, self.get(category)))
    }
}

impl From<BTreeMap<IncidentCategory, u64>> for CategoryCounts {
    fn from(map: BTreeMap<IncidentCategory, u64>) -> Self {
        let mut counts = Self::new();
        for (category, count) in map {
            counts.0[category.index()] = count;
        }
        counts
    }
}

impl From<CategoryCounts> for BTreeMap<IncidentCategory, u64> {
    fn from(counts: CategoryCounts) -> Self {
        counts.iter().collect()
    }
}

/// Per-category counts for one reporting year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRow {
    /// Reporting year. `None` groups records with no parsable year.
    pub period: Option<i32>,
    /// Per-category counts.
    pub counts: CategoryCounts,
}

/// Per-category counts for one season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonRow {
    /// Season label.
    pub season: Season,
    /// Per-category counts.
    pub counts: CategoryCounts,
}

/// Per-category counts for one municipality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRow {
    /// Municipality name.
    pub place: String,
    /// Incidents across all categories.
    pub total: u64,
    /// Per-category counts.
    pub counts: CategoryCounts,
}

/// Count for one (priority description, category) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityRow {
    /// Priority description from the dispatch system.
    pub priority: String,
    /// Incident category.
    pub category: IncidentCategory,
    /// Number of incidents.
    pub count: u64,
}

/// Incident count for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    /// Incident category.
    pub category: IncidentCategory,
    /// Number of incidents.
    pub count: u64,
}

/// False alarm property type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmType {
    /// Commercial building alarms.
    Commercial,
    /// Residential alarms.
    Residential,
    /// Alarms with no property marker.
    Other,
}

impl AlarmType {
    /// Chart label for this alarm type.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Commercial => "Commercial Building Alarms",
            Self::Residential => "Residential Alarms",
            Self::Other => "Other/Unknown Alarms",
        }
    }
}

/// Share of post-cutover alarms attributed to each alarm type, in whole
/// percent. The "other" share is whatever remains.
///
/// This is a policy parameter, not a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmSplitRatio {
    /// Percent attributed to commercial buildings.
    pub commercial_pct: u8,
    /// Percent attributed to residences.
    pub residential_pct: u8,
}

impl AlarmSplitRatio {
    /// Percent left for [`AlarmType::Other`].
    #[must_use]
    pub const fn other_pct(self) -> u8 {
        100u8.saturating_sub(self.commercial_pct.saturating_add(self.residential_pct))
    }
}

/// One slice of the false alarm split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FalseAlarmBucket {
    /// Alarm type.
    pub alarm_type: AlarmType,
    /// Chart label.
    pub label: String,
    /// Count read from description markers (pre-cutover records).
    pub measured: u64,
    /// Count allocated by the estimate ratio (post-cutover records).
    pub estimated: u64,
}

impl FalseAlarmBucket {
    /// Measured plus estimated.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.measured + self.estimated
    }
}

/// Fire alarm incidents split into commercial, residential and other.
///
/// Post-cutover records carry no property marker, so their share of each
/// bucket is an estimate. Consumers must present `estimated` values as such.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FalseAlarmSplit {
    /// Buckets in `Commercial`, `Residential`, `Other` order.
    pub buckets: [FalseAlarmBucket; 3],
    /// Alarm incidents whose type was measured.
    pub measured_count: u64,
    /// Alarm incidents whose type was estimated.
    pub estimated_count: u64,
    /// Ratio used for the estimated part.
    pub ratio: AlarmSplitRatio,
    /// Human-readable disclosure of the estimate, `None` when nothing was
    /// estimated.
    pub estimate_note: Option<String>,
}

impl FalseAlarmSplit {
    /// Total alarm incidents across all buckets.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(FalseAlarmBucket::total).sum()
    }

    /// Returns `true` when any part of the split is estimated.
    #[must_use]
    pub const fn is_estimated(&self) -> bool {
        self.estimated_count > 0
    }

    /// Bucket for `alarm_type`.
    #[must_use]
    pub const fn bucket(&self, alarm_type: AlarmType) -> &FalseAlarmBucket {
        match alarm_type {
            AlarmType::Commercial => &self.buckets[0],
            AlarmType::Residential => &self.buckets[1],
            AlarmType::Other => &self.buckets[2],
        }
    }
}

/// Scalar metrics over a (possibly filtered) dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    /// Incident count.
    pub total: u64,
    /// Incidents per distinct reporting year, rounded.
    pub avg_per_period: u64,
    /// Structure fire count.
    pub structure_fire_count: u64,
    /// Fire alarm count.
    pub alarm_count: u64,
    /// Alarm share of all incidents, one decimal place (`"0"` when empty).
    pub alarm_percentage: String,
    /// Incidents with a high-urgency priority code.
    pub high_priority_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_zero_filled_in_taxonomy_order() {
        let mut counts = CategoryCounts::new();
        counts.increment(IncidentCategory::GasIssues);
        counts.increment(IncidentCategory::GasIssues);
        counts.increment(IncidentCategory::FireAlarms);

        let pairs: Vec<_> = counts.iter().collect();
        assert_eq!(pairs.len(), IncidentCategory::COUNT);
        assert_eq!(pairs[0], (IncidentCategory::FireAlarms, 1));
        assert_eq!(counts.get(IncidentCategory::GasIssues), 2);
        assert_eq!(counts.get(IncidentCategory::VehicleFires), 0);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn counts_serialize_as_category_map() {
        let mut counts = CategoryCounts::new();
        counts.increment(IncidentCategory::SmokeInvestigation);
        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(json["Smoke Investigation"], 1);
        assert_eq!(json["Fire Alarms"], 0);
        assert_eq!(json.as_object().unwrap().len(), IncidentCategory::COUNT);

        let back: CategoryCounts = serde_json::from_value(json).unwrap();
        assert_eq!(back, counts);
    }

    #[test]
    fn default_ratio_leaves_remainder_for_other() {
        let ratio = AlarmSplitRatio {
            commercial_pct: 60,
            residential_pct: 30,
        };
        assert_eq!(ratio.other_pct(), 10);
    }
}
