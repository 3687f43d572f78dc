//! Fire incident classification.
//!
//! Maps a dispatch description (and its reporting year) to the canonical
//! [`IncidentCategory`] taxonomy, or excludes it. Rules are evaluated in the
//! order of [`RULES`] and the first match wins, so a description that would
//! match several keyword sets is decided by whichever rule comes first.
//!
//! Alarm detection forks on [`ALARM_CUTOVER_YEAR`]: before it, alarms carry
//! `ALARM` in their description; from it onward the upstream system emits the
//! literal placeholder `Removed` for reclassified alarms instead. The two
//! checks are separate rules and must stay that way.

use fire_dispatch_incident_models::{
    ALARM_CUTOVER_YEAR, ClassifiedIncident, IncidentCategory, RawRecord,
};

/// Description text normalized once per classification.
struct Input<'a> {
    raw: &'a str,
    upper: String,
    year: i32,
}

/// A plain string predicate over an [`Input`].
#[derive(Debug)]
enum Matcher {
    /// Case-sensitive substring.
    ContainsExact(&'static str),
    /// Case-insensitive: any of the substrings.
    ContainsAny(&'static [&'static str]),
    /// Case-insensitive: all substrings, in this order.
    InOrder(&'static [&'static str]),
    /// Case-insensitive suffix.
    EndsWith(&'static str),
    /// Reporting year before the cutover and description contains `ALARM`.
    AlarmBeforeCutover,
    /// Reporting year at or after the cutover and description is exactly
    /// `Removed`.
    RemovedPlaceholder,
    /// Any of the nested matchers.
    AnyOf(&'static [Self]),
}

impl Matcher {
    fn matches(&self, input: &Input<'_>) -> bool {
        match self {
            Self::ContainsExact(needle) => input.raw.contains(needle),
            Self::ContainsAny(needles) => needles.iter().any(|n| input.upper.contains(n)),
            Self::InOrder(needles) => contains_in_order(&input.upper, needles),
            Self::EndsWith(suffix) => input.upper.ends_with(suffix),
            Self::AlarmBeforeCutover => {
                input.year < ALARM_CUTOVER_YEAR && input.upper.contains("ALARM")
            }
            Self::RemovedPlaceholder => {
                input.year >= ALARM_CUTOVER_YEAR && input.raw == REMOVED_PLACEHOLDER
            }
            Self::AnyOf(matchers) => matchers.iter().any(|m| m.matches(input)),
        }
    }
}

/// What happens to a record when a rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Exclude,
    Assign(IncidentCategory),
}

/// One classification rule.
#[derive(Debug)]
pub struct Rule {
    /// Stable rule name, used in logs and tests.
    pub name: &'static str,
    matcher: Matcher,
    outcome: Outcome,
}

impl Rule {
    /// The category this rule assigns, or `None` for exclusion rules.
    #[must_use]
    pub const fn category(&self) -> Option<IncidentCategory> {
        match self.outcome {
            Outcome::Exclude => None,
            Outcome::Assign(category) => Some(category),
        }
    }
}

/// Exact description the upstream system emits for reclassified alarms.
pub const REMOVED_PLACEHOLDER: &str = "Removed";

/// Classification rules in evaluation order.
pub static RULES: &[Rule] = &[
    // ── Non-fire services ────────────────────────────────────────────
    Rule {
        name: "medical",
        matcher: Matcher::ContainsExact("EMS"),
        outcome: Outcome::Exclude,
    },
    Rule {
        name: "traffic",
        matcher: Matcher::ContainsAny(&["TRAFFIC"]),
        outcome: Outcome::Exclude,
    },
    // ── Alarms (year-dependent) ──────────────────────────────────────
    Rule {
        name: "alarm_pre_cutover",
        matcher: Matcher::AlarmBeforeCutover,
        outcome: Outcome::Assign(IncidentCategory::FireAlarms),
    },
    Rule {
        name: "alarm_post_cutover",
        matcher: Matcher::RemovedPlaceholder,
        outcome: Outcome::Assign(IncidentCategory::FireAlarms),
    },
    // ── Fire categories ──────────────────────────────────────────────
    Rule {
        name: "structure",
        matcher: Matcher::ContainsAny(&["DWELLING", "STRUCTURE", "BUILDING", "APARTMENT"]),
        outcome: Outcome::Assign(IncidentCategory::StructureFires),
    },
    Rule {
        name: "outdoor",
        matcher: Matcher::ContainsAny(&[
            "BRUSH",
            "GRASS",
            "MULCH",
            "OUTSIDE",
            "OUTDOOR",
            "ILLEGAL FIRE",
        ]),
        outcome: Outcome::Assign(IncidentCategory::OutdoorBrushFires),
    },
    Rule {
        name: "electrical",
        matcher: Matcher::ContainsAny(&["WIRE", "ELECTRICAL", "ARCING", "TRANSFORMER"]),
        outcome: Outcome::Assign(IncidentCategory::ElectricalIssues),
    },
    Rule {
        name: "vehicle",
        matcher: Matcher::ContainsAny(&["VEHICLE", "AUTO", "CAR"]),
        outcome: Outcome::Assign(IncidentCategory::VehicleFires),
    },
    Rule {
        name: "gas",
        matcher: Matcher::ContainsAny(&["GAS"]),
        outcome: Outcome::Assign(IncidentCategory::GasIssues),
    },
    Rule {
        name: "hazmat",
        matcher: Matcher::ContainsAny(&["HAZMAT"]),
        outcome: Outcome::Assign(IncidentCategory::HazmatCoIssues),
    },
    Rule {
        name: "smoke",
        matcher: Matcher::AnyOf(&[
            Matcher::InOrder(&["SMOKE", "OUTSIDE"]),
            Matcher::InOrder(&["SMOKE", "SEEN"]),
            Matcher::InOrder(&["SMOKE", "SMELL"]),
            Matcher::ContainsAny(&["ODOR"]),
        ]),
        outcome: Outcome::Assign(IncidentCategory::SmokeInvestigation),
    },
    Rule {
        name: "uncategorized_explicit",
        matcher: Matcher::ContainsAny(&["FIRE UNCATEGORIZED", "UNKNOWN TYPE FIRE"]),
        outcome: Outcome::Assign(IncidentCategory::UncategorizedFire),
    },
    // ── Non-fire noise ───────────────────────────────────────────────
    Rule {
        name: "non_fire",
        matcher: Matcher::AnyOf(&[
            Matcher::ContainsAny(&[
                "MUTUAL AID",
                "RQST ASST",
                "PUBLIC SERVICE",
                "AIRPORT INSPECTION",
                "LOCKED OUT",
                "CONTAINMENT",
                "CLEAN UP",
                "WATER",
                "FLOOD",
            ]),
            Matcher::EndsWith("DETAIL"),
        ]),
        outcome: Outcome::Exclude,
    },
    // ── Residual ─────────────────────────────────────────────────────
    Rule {
        name: "residual_fire",
        matcher: Matcher::ContainsAny(&["FIRE"]),
        outcome: Outcome::Assign(IncidentCategory::UncategorizedFire),
    },
];

/// Returns the first rule matching the description, if any.
///
/// A missing year is treated as year 0, which puts it before the cutover.
#[must_use]
pub fn matching_rule(description: &str, year: Option<i32>) -> Option<&'static Rule> {
    let input = Input {
        raw: description,
        upper: description.to_uppercase(),
        year: year.unwrap_or(0),
    };
    RULES.iter().find(|rule| rule.matcher.matches(&input))
}

/// Classifies a description. Returns `None` when the record is not a fire
/// incident (an exclusion rule matched, or nothing matched).
#[must_use]
pub fn classify(description: &str, year: Option<i32>) -> Option<IncidentCategory> {
    matching_rule(description, year).and_then(Rule::category)
}

/// Classifies a raw record by its description and reporting year.
#[must_use]
pub fn classify_record(record: &RawRecord) -> Option<IncidentCategory> {
    classify(&record.description, record.year)
}

/// Classifies every record, dropping the excluded ones.
#[must_use]
pub fn classify_records(records: &[RawRecord]) -> Vec<ClassifiedIncident> {
    let incidents: Vec<ClassifiedIncident> = records
        .iter()
        .filter_map(|record| {
            classify_record(record).map(|category| ClassifiedIncident::new(record.clone(), category))
        })
        .collect();

    log::info!(
        "Processed {} fire incidents from {} raw records",
        incidents.len(),
        records.len()
    );

    incidents
}

/// Checks that `needles` occur in `haystack` one after another.
fn contains_in_order(haystack: &str, needles: &[&str]) -> bool {
    let mut rest = haystack;
    for needle in needles {
        match rest.find(needle) {
            Some(i) => rest = &rest[i + needle.len()..],
            None => return false,
        }
    }
    true
}
