//! Grouped views over a filtered incident set.
//!
//! Every function takes any iterator of borrowed incidents, so callers can
//! pass the whole dataset (`dataset.iter()`) or a filtered view
//! (`filtered.iter().copied()`).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use fire_dispatch_analytics_models::{
    AlarmSplitRatio, AlarmType, CategoryCounts, CategoryTotal, FalseAlarmBucket, FalseAlarmSplit,
    PeriodRow, PlaceRow, PriorityRow, SeasonRow,
};
use fire_dispatch_incident_models::{ALARM_CUTOVER_YEAR, ClassifiedIncident, IncidentCategory, Season};

/// Place rows shown in the hotspot view.
pub const DEFAULT_PLACE_HOTSPOTS: usize = 12;

/// Place names offered as filter options.
pub const DEFAULT_PLACE_OPTIONS: usize = 15;

/// Split applied to fire alarms reported from [`ALARM_CUTOVER_YEAR`] on,
/// which no longer say what kind of property raised them.
pub const POST_CUTOVER_ALARM_RATIO: AlarmSplitRatio = AlarmSplitRatio {
    commercial_pct: 60,
    residential_pct: 30,
};

/// Per-category counts for each reporting year, ascending.
///
/// Incidents without a year are grouped under `period: None`, which sorts
/// first.
pub fn by_period<'a, I>(incidents: I) -> Vec<PeriodRow>
where
    I: IntoIterator<Item = &'a ClassifiedIncident>,
{
    let mut periods: BTreeMap<Option<i32>, CategoryCounts> = BTreeMap::new();
    for incident in incidents {
        periods
            .entry(incident.period())
            .or_default()
            .increment(incident.category);
    }

    periods
        .into_iter()
        .map(|(period, counts)| PeriodRow { period, counts })
        .collect()
}

/// Per-category counts for each season, always four rows in calendar
/// order.
pub fn by_season<'a, I>(incidents: I) -> Vec<SeasonRow>
where
    I: IntoIterator<Item = &'a ClassifiedIncident>,
{
    let mut seasons = [CategoryCounts::new(); 4];
    for incident in incidents {
        seasons[season_index(incident.season)].increment(incident.category);
    }

    Season::all()
        .iter()
        .map(|&season| SeasonRow {
            season,
            counts: seasons[season_index(season)],
        })
        .collect()
}

const fn season_index(season: Season) -> usize {
    match season {
        Season::Winter => 0,
        Season::Spring => 1,
        Season::Summer => 2,
        Season::Fall => 3,
    }
}

/// Per-category counts for the `top_n` municipalities with the most
/// incidents.
///
/// Incidents with a blank place name are skipped. Rows sort by total
/// descending, then by name.
pub fn by_place<'a, I>(incidents: I, top_n: usize) -> Vec<PlaceRow>
where
    I: IntoIterator<Item = &'a ClassifiedIncident>,
{
    let mut rows: Vec<PlaceRow> = place_counts(incidents)
        .into_iter()
        .map(|(place, counts)| PlaceRow {
            place: place.to_string(),
            total: counts.total(),
            counts,
        })
        .collect();

    rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.place.cmp(&b.place)));
    rows.truncate(top_n);
    rows
}

/// Names of the `top_n` municipalities with the most incidents, in
/// [`by_place`] order.
pub fn top_places<'a, I>(incidents: I, top_n: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a ClassifiedIncident>,
{
    by_place(incidents, top_n)
        .into_iter()
        .map(|row| row.place)
        .collect()
}

fn place_counts<'a, I>(incidents: I) -> HashMap<&'a str, CategoryCounts>
where
    I: IntoIterator<Item = &'a ClassifiedIncident>,
{
    let mut places: HashMap<&str, CategoryCounts> = HashMap::new();
    for incident in incidents {
        let place = incident.place().trim();
        if place.is_empty() {
            continue;
        }
        places.entry(place).or_default().increment(incident.category);
    }
    places
}

/// Counts for each (priority description, category) pair that occurs.
///
/// Rows sort by count descending; ties keep priority then taxonomy order.
pub fn by_priority<'a, I>(incidents: I) -> Vec<PriorityRow>
where
    I: IntoIterator<Item = &'a ClassifiedIncident>,
{
    let mut pairs: BTreeMap<(&str, IncidentCategory), u64> = BTreeMap::new();
    for incident in incidents {
        *pairs
            .entry((incident.record.priority_desc.as_str(), incident.category))
            .or_insert(0) += 1;
    }

    let mut rows: Vec<PriorityRow> = pairs
        .into_iter()
        .map(|((priority, category), count)| PriorityRow {
            priority: priority.to_string(),
            category,
            count,
        })
        .collect();

    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// Incident count per category, descending. Categories with no incidents
/// are omitted; ties keep taxonomy order.
pub fn by_category<'a, I>(incidents: I) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = &'a ClassifiedIncident>,
{
    let mut counts = CategoryCounts::new();
    for incident in incidents {
        counts.increment(incident.category);
    }

    let mut rows: Vec<CategoryTotal> = counts
        .iter()
        .filter(|&(_, count)| count > 0)
        .map(|(category, count)| CategoryTotal { category, count })
        .collect();

    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// Distinct reporting years, ascending. Incidents without a year are not
/// listed.
pub fn available_periods<'a, I>(incidents: I) -> Vec<i32>
where
    I: IntoIterator<Item = &'a ClassifiedIncident>,
{
    incidents
        .into_iter()
        .filter_map(ClassifiedIncident::period)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Splits fire alarm incidents into commercial, residential and other.
///
/// Alarms reported before [`ALARM_CUTOVER_YEAR`] (or with no year) are
/// measured from their description: `COM` means commercial, otherwise `RES`
/// means residential, otherwise other. The markers are case-sensitive. Later alarms are allocated with
/// [`POST_CUTOVER_ALARM_RATIO`] and reported as estimated.
///
/// The bucket totals always sum to the number of fire alarm incidents.
pub fn false_alarm_split<'a, I>(incidents: I) -> FalseAlarmSplit
where
    I: IntoIterator<Item = &'a ClassifiedIncident>,
{
    split_alarms(incidents, POST_CUTOVER_ALARM_RATIO)
}

fn split_alarms<'a, I>(incidents: I, ratio: AlarmSplitRatio) -> FalseAlarmSplit
where
    I: IntoIterator<Item = &'a ClassifiedIncident>,
{
    let mut measured = [0u64; 3];
    let mut post_cutover = 0u64;

    for incident in incidents {
        if incident.category != IncidentCategory::FireAlarms {
            continue;
        }
        if incident.period().unwrap_or(0) >= ALARM_CUTOVER_YEAR {
            post_cutover += 1;
            continue;
        }
        let description = incident.record.description.as_str();
        let slot = if description.contains("COM") {
            0
        } else if description.contains("RES") {
            1
        } else {
            2
        };
        measured[slot] += 1;
    }

    let estimated = allocate(post_cutover, ratio);
    let bucket = |alarm_type: AlarmType, slot: usize| FalseAlarmBucket {
        alarm_type,
        label: alarm_type.label().to_string(),
        measured: measured[slot],
        estimated: estimated[slot],
    };

    let estimate_note = (post_cutover > 0).then(|| {
        format!(
            "{post_cutover} alarm incidents from {ALARM_CUTOVER_YEAR} onward have no property \
             type; split estimated at {}/{}/{} percent commercial/residential/other",
            ratio.commercial_pct,
            ratio.residential_pct,
            ratio.other_pct()
        )
    });

    FalseAlarmSplit {
        buckets: [
            bucket(AlarmType::Commercial, 0),
            bucket(AlarmType::Residential, 1),
            bucket(AlarmType::Other, 2),
        ],
        measured_count: measured.iter().sum(),
        estimated_count: post_cutover,
        ratio,
        estimate_note,
    }
}

/// Rounds `n * pct / 100` half up for commercial and residential and gives
/// the remainder to other. Residential is capped so other never goes
/// negative.
fn allocate(n: u64, ratio: AlarmSplitRatio) -> [u64; 3] {
    let commercial = round_pct(n, ratio.commercial_pct).min(n);
    let left = n - commercial;
    let residential = round_pct(n, ratio.residential_pct).min(left);
    [commercial, residential, left - residential]
}

fn round_pct(n: u64, pct: u8) -> u64 {
    (n * u64::from(pct) + 50) / 100
}

#[cfg(test)]
mod tests {
    use fire_dispatch_incident_models::FilterSelection;

    use super::*;
    use crate::filter::filter_incidents;
    use crate::test_support::{dispatched, incident};

    fn dataset() -> Vec<ClassifiedIncident> {
        vec![
            incident(IncidentCategory::FireAlarms, Some(2019), "Q1", "PITTSBURGH"),
            incident(IncidentCategory::FireAlarms, Some(2019), "Q3", "PITTSBURGH"),
            incident(IncidentCategory::StructureFires, Some(2018), "Q3", "MCKEESPORT"),
            incident(IncidentCategory::VehicleFires, Some(2021), "Q4", "MCKEESPORT"),
            incident(IncidentCategory::GasIssues, Some(2021), "Q2", "  "),
            incident(IncidentCategory::OutdoorBrushFires, None, "", "BETHEL PARK"),
            incident(IncidentCategory::FireAlarms, Some(2020), "Q2", "ALIQUIPPA"),
        ]
    }

    fn period_total(rows: &[PeriodRow]) -> u64 {
        rows.iter().map(|r| r.counts.total()).sum()
    }

    fn season_total(rows: &[SeasonRow]) -> u64 {
        rows.iter().map(|r| r.counts.total()).sum()
    }

    #[test]
    fn periods_are_ascending_with_missing_year_first() {
        let data = dataset();
        let rows = by_period(&data);
        let periods: Vec<_> = rows.iter().map(|r| r.period).collect();
        assert_eq!(periods, [None, Some(2018), Some(2019), Some(2020), Some(2021)]);
        assert_eq!(rows[2].counts.get(IncidentCategory::FireAlarms), 2);
        assert_eq!(rows[2].counts.get(IncidentCategory::GasIssues), 0);
    }

    #[test]
    fn period_and_season_totals_match_input() {
        let data = dataset();
        let rows = by_period(&data);
        let seasons = by_season(&data);
        assert_eq!(period_total(&rows), data.len() as u64);
        assert_eq!(season_total(&seasons), data.len() as u64);
    }

    #[test]
    fn totals_match_filtered_input() {
        let data = dataset();
        let selection = FilterSelection::all().with_periods([2019, 2021]);
        let filtered = filter_incidents(&data, &selection);
        assert_eq!(period_total(&by_period(filtered.iter().copied())), 4);
        assert_eq!(season_total(&by_season(filtered.iter().copied())), 4);
    }

    #[test]
    fn always_four_seasons_in_calendar_order() {
        let rows = by_season(std::iter::empty::<&ClassifiedIncident>());
        let seasons: Vec<_> = rows.iter().map(|r| r.season).collect();
        assert_eq!(
            seasons,
            [Season::Winter, Season::Spring, Season::Summer, Season::Fall]
        );
        assert!(rows.iter().all(|r| r.counts.total() == 0));
    }

    #[test]
    fn blank_quarter_counts_as_winter() {
        let data = dataset();
        let rows = by_season(&data);
        assert_eq!(rows[0].counts.get(IncidentCategory::OutdoorBrushFires), 1);
        assert_eq!(rows[2].counts.total(), 2);
    }

    #[test]
    fn places_sort_by_total_then_name_and_skip_blank() {
        let data = dataset();
        let rows = by_place(&data, DEFAULT_PLACE_HOTSPOTS);
        let names: Vec<_> = rows.iter().map(|r| r.place.as_str()).collect();
        assert_eq!(names, ["MCKEESPORT", "PITTSBURGH", "ALIQUIPPA", "BETHEL PARK"]);
        assert_eq!(rows[0].total, 2);
        assert_eq!(rows[0].counts.get(IncidentCategory::StructureFires), 1);
    }

    #[test]
    fn place_truncation_is_a_prefix() {
        let data = dataset();
        let all = by_place(&data, usize::MAX);
        for n in 0..=all.len() {
            let top = by_place(&data, n);
            assert_eq!(top.len(), n.min(all.len()));
            assert_eq!(top[..], all[..top.len()]);
            assert!(top.windows(2).all(|w| w[0].total >= w[1].total));
        }
    }

    #[test]
    fn top_places_follow_place_ranking() {
        let data = dataset();
        assert_eq!(top_places(&data, 2), ["MCKEESPORT", "PITTSBURGH"]);
        assert_eq!(top_places(&data, DEFAULT_PLACE_OPTIONS).len(), 4);
    }

    #[test]
    fn priorities_are_sparse_and_descending() {
        let data = vec![
            dispatched(IncidentCategory::FireAlarms, Some(2021), "F2", "Fire - Medium", "ALARM"),
            dispatched(IncidentCategory::FireAlarms, Some(2021), "F2", "Fire - Medium", "ALARM"),
            dispatched(IncidentCategory::StructureFires, Some(2021), "F1", "Fire - High", "FIRE"),
            dispatched(IncidentCategory::FireAlarms, Some(2021), "F1", "Fire - High", "ALARM"),
        ];
        let rows = by_priority(&data);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].priority, "Fire - Medium");
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[1].priority, "Fire - High");
        assert_eq!(rows[1].category, IncidentCategory::FireAlarms);
        assert_eq!(rows[2].category, IncidentCategory::StructureFires);
        assert_eq!(rows.iter().map(|r| r.count).sum::<u64>(), 4);
    }

    #[test]
    fn categories_descend_and_omit_zero() {
        let data = dataset();
        let rows = by_category(&data);
        assert_eq!(rows[0].category, IncidentCategory::FireAlarms);
        assert_eq!(rows[0].count, 3);
        assert_eq!(rows[1].category, IncidentCategory::StructureFires);
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.count > 0));
    }

    #[test]
    fn available_periods_are_distinct_and_ascending() {
        let data = dataset();
        assert_eq!(available_periods(&data), [2018, 2019, 2020, 2021]);
        assert!(available_periods(std::iter::empty::<&ClassifiedIncident>()).is_empty());
    }

    #[test]
    fn pre_cutover_alarms_are_measured() {
        let data = vec![
            dispatched(IncidentCategory::FireAlarms, Some(2019), "F2", "", "ALARM - COMMERCIAL"),
            dispatched(IncidentCategory::FireAlarms, Some(2018), "F2", "", "ALARM - RESIDENTIAL"),
            dispatched(IncidentCategory::FireAlarms, Some(2017), "F2", "", "ALARM - COM/RES"),
            dispatched(IncidentCategory::FireAlarms, Some(2016), "F2", "", "ALARM - TEST"),
            dispatched(IncidentCategory::StructureFires, Some(2016), "F1", "", "COMMERCIAL FIRE"),
        ];
        let split = false_alarm_split(&data);
        assert_eq!(split.bucket(AlarmType::Commercial).measured, 2);
        assert_eq!(split.bucket(AlarmType::Residential).measured, 1);
        assert_eq!(split.bucket(AlarmType::Other).measured, 1);
        assert_eq!(split.total(), 4);
        assert!(!split.is_estimated());
        assert!(split.estimate_note.is_none());
    }

    #[test]
    fn property_markers_are_case_sensitive() {
        let data = vec![
            dispatched(IncidentCategory::FireAlarms, Some(2018), "F2", "", "fire alarm - commercial"),
            dispatched(IncidentCategory::FireAlarms, Some(2018), "F2", "", "Alarm - Residential"),
        ];
        let split = false_alarm_split(&data);
        assert_eq!(split.bucket(AlarmType::Commercial).measured, 0);
        assert_eq!(split.bucket(AlarmType::Residential).measured, 0);
        assert_eq!(split.bucket(AlarmType::Other).measured, 2);
    }

    #[test]
    fn post_cutover_alarms_are_estimated() {
        let data: Vec<_> = (0..10)
            .map(|_| dispatched(IncidentCategory::FireAlarms, Some(2022), "F2", "", "ALARM"))
            .collect();
        let split = false_alarm_split(&data);
        assert!(split.is_estimated());
        assert_eq!(split.estimated_count, 10);
        assert_eq!(split.measured_count, 0);
        let estimated: Vec<_> = split.buckets.iter().map(|b| b.estimated).collect();
        assert_eq!(estimated, [6, 3, 1]);
        assert!(split.buckets.iter().all(|b| b.measured == 0));
        assert!(split.estimate_note.is_some());
    }

    #[test]
    fn split_conserves_alarm_count() {
        for n in 0..200u64 {
            let [c, r, o] = allocate(n, POST_CUTOVER_ALARM_RATIO);
            assert_eq!(c + r + o, n, "n = {n}");
            assert_eq!(c, (n * 6 + 5) / 10, "n = {n}");
        }
    }

    #[test]
    fn extreme_ratio_never_goes_negative() {
        let greedy = AlarmSplitRatio {
            commercial_pct: 70,
            residential_pct: 50,
        };
        for n in 0..50u64 {
            let [c, r, o] = allocate(n, greedy);
            assert_eq!(c + r + o, n);
        }
    }

    #[test]
    fn mixed_split_totals_match_alarm_count() {
        let data = vec![
            dispatched(IncidentCategory::FireAlarms, Some(2019), "F2", "", "ALARM - COMMERCIAL"),
            dispatched(IncidentCategory::FireAlarms, None, "F2", "", "ALARM - RES"),
            dispatched(IncidentCategory::FireAlarms, Some(2020), "F2", "", "ALARM"),
            dispatched(IncidentCategory::FireAlarms, Some(2023), "F2", "", "ALARM"),
            dispatched(IncidentCategory::FireAlarms, Some(2024), "F2", "", "ALARM"),
        ];
        let split = false_alarm_split(&data);
        assert_eq!(split.total(), 5);
        assert_eq!(split.measured_count, 2);
        assert_eq!(split.estimated_count, 3);
        assert_eq!(split.bucket(AlarmType::Commercial).total(), 1 + 2);
        assert_eq!(split.bucket(AlarmType::Residential).total(), 1 + 1);
        assert_eq!(split.bucket(AlarmType::Other).total(), 0);
    }
}
