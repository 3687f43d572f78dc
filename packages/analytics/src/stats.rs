//! Scalar summary metrics.

use std::collections::BTreeSet;

use fire_dispatch_analytics_models::SummaryStats;
use fire_dispatch_incident_models::{ClassifiedIncident, IncidentCategory};

/// Priority codes counted as high urgency.
pub const HIGH_PRIORITY_CODES: &[&str] = &["F1", "Q0"];

/// Computes [`SummaryStats`] over `incidents`.
///
/// The average divides by the number of distinct reporting years (records
/// without a year count as one more group), never by zero.
#[must_use]
pub fn summary_stats<'a, I>(incidents: I) -> SummaryStats
where
    I: IntoIterator<Item = &'a ClassifiedIncident>,
{
    let mut total = 0u64;
    let mut structure_fire_count = 0u64;
    let mut alarm_count = 0u64;
    let mut high_priority_count = 0u64;
    let mut periods = BTreeSet::new();

    for incident in incidents {
        total += 1;
        periods.insert(incident.period());
        match incident.category {
            IncidentCategory::StructureFires => structure_fire_count += 1,
            IncidentCategory::FireAlarms => alarm_count += 1,
            _ => {}
        }
        if HIGH_PRIORITY_CODES.contains(&incident.record.priority.as_str()) {
            high_priority_count += 1;
        }
    }

    let period_count = (periods.len() as u64).max(1);

    SummaryStats {
        total,
        avg_per_period: (total * 2 + period_count) / (period_count * 2),
        structure_fire_count,
        alarm_count,
        alarm_percentage: percentage(alarm_count, total),
        high_priority_count,
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: u64, total: u64) -> String {
    if total == 0 {
        return "0".to_string();
    }
    format!("{:.1}", part as f64 / total as f64 * 100.0)
}
