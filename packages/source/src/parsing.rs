//! Delimited-text parsing into [`RawRecord`]s.
//!
//! The first line is the header; each later line maps positionally onto it.
//! Columns are located by name through a [`FieldMapping`], so column order
//! may change between fetches as long as the header matches the rows.

use fire_dispatch_incident_models::RawRecord;

use crate::SourceError;
use crate::source_def::FieldMapping;

/// Column positions resolved from a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    id: Option<usize>,
    call_id_hash: Option<usize>,
    service: Option<usize>,
    priority: Option<usize>,
    priority_desc: Option<usize>,
    quarter: Option<usize>,
    year: usize,
    description: usize,
    place_code: Option<usize>,
    place_name: Option<usize>,
    geoid: Option<usize>,
    centroid_x: Option<usize>,
    centroid_y: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &[String], fields: &FieldMapping) -> Result<Self, SourceError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| SourceError::Normalization {
                message: format!("missing required column '{name}' in header {headers:?}"),
            })
        };

        Ok(Self {
            id: find(fields.id.as_str()),
            call_id_hash: find(fields.call_id_hash.as_str()),
            service: find(fields.service.as_str()),
            priority: find(fields.priority.as_str()),
            priority_desc: find(fields.priority_desc.as_str()),
            quarter: find(fields.quarter.as_str()),
            year: require(fields.year.as_str())?,
            description: require(fields.description.as_str())?,
            place_code: find(fields.place_code.as_str()),
            place_name: find(fields.place_name.as_str()),
            geoid: find(fields.geoid.as_str()),
            centroid_x: find(fields.centroid_x.as_str()),
            centroid_y: find(fields.centroid_y.as_str()),
        })
    }

    fn record(&self, row: &csv::StringRecord) -> RawRecord {
        let text = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map_or_else(String::new, |v| v.trim().to_string())
        };
        let cell = |idx: usize| row.get(idx).unwrap_or("");

        RawRecord {
            id: text(self.id),
            call_id_hash: text(self.call_id_hash),
            service: text(self.service),
            priority: text(self.priority),
            priority_desc: text(self.priority_desc),
            quarter: text(self.quarter),
            year: parse_year(cell(self.year)),
            description: cell(self.description).trim().to_string(),
            place_code: text(self.place_code),
            place_name: text(self.place_name),
            geoid: text(self.geoid),
            centroid_x: self.centroid_x.and_then(|i| row.get(i)).and_then(parse_coordinate),
            centroid_y: self.centroid_y.and_then(|i| row.get(i)).and_then(parse_coordinate),
        }
    }
}

/// Parses the complete export text into raw records.
///
/// Blank lines are skipped. Rows the CSV reader cannot decode are logged
/// and skipped; rows with unparsable numbers are kept with `None` fields.
///
/// # Errors
///
/// Returns [`SourceError`] if the header row cannot be read or lacks the
/// year or description column.
pub fn parse_records(
    text: &str,
    delimiter: u8,
    fields: &FieldMapping,
) -> Result<Vec<RawRecord>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_owned())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(SourceError::Normalization {
            message: "export contains no header row".to_owned(),
        });
    }

    let columns = ColumnIndex::resolve(&headers, fields)?;

    let mut records = Vec::new();
    let mut skipped: u64 = 0;

    for (line, result) in reader.records().enumerate() {
        match result {
            Ok(row) => {
                if row.iter().all(|v| v.trim().is_empty()) {
                    continue;
                }
                records.push(columns.record(&row));
            }
            Err(e) => {
                skipped += 1;
                log::warn!("Skipping unreadable row {}: {e}", line + 2);
            }
        }
    }

    log::info!(
        "Parsed {} dispatch records ({} columns, {skipped} skipped)",
        records.len(),
        headers.len()
    );

    Ok(records)
}

/// Parses a reporting year from the leading digits of a field, so values
/// like `"2019.0"` still yield `2019`. Returns `None` if there are none.
#[must_use]
pub fn parse_year(s: &str) -> Option<i32> {
    let trimmed = s.trim();
    let end = trimmed
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(trimmed.len(), |(i, _)| i);
    trimmed[..end].parse().ok()
}

/// Parses a centroid coordinate. Returns `None` if missing, unparsable,
/// non-finite, or zero.
#[must_use]
pub fn parse_coordinate(s: &str) -> Option<f64> {
    let value = s.trim().parse::<f64>().ok()?;
    if !value.is_finite() || value == 0.0 {
        return None;
    }
    Some(value)
}
