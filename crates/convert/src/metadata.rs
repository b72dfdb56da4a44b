//! Odinson metadata fields derived from BioC document metadata.

use chrono::NaiveDate;

use crate::odinson::Field;
use crate::types::DocumentMetadata;

/// Publication date as `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
///
/// Built from the `year`/`month`/`day` infons; when no usable year is
/// present the collection date is used instead.
pub fn publication_date(metadata: &DocumentMetadata) -> Option<String> {
    infon_date(metadata).or_else(|| {
        metadata
            .collection_date
            .as_deref()
            .and_then(normalize_collection_date)
    })
}

fn infon_date(metadata: &DocumentMetadata) -> Option<String> {
    let number = |key: &str| -> Option<u32> {
        metadata
            .infons
            .get(key)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
    };

    let year = number("year")?;
    let month = number("month").filter(|m| *m <= 12);
    let day = number("day");

    match (month, day) {
        (Some(m), Some(d)) => match NaiveDate::from_ymd_opt(year as i32, m, d) {
            Some(date) => Some(date.format("%Y-%m-%d").to_string()),
            None => {
                tracing::debug!(year, month = m, day = d, "Invalid day in publication date");
                Some(format!("{:04}-{:02}", year, m))
            }
        },
        (Some(m), None) => Some(format!("{:04}-{:02}", year, m)),
        _ => Some(format!("{:04}", year)),
    }
}

/// Normalize a BioC `<date>` (`YYYYMMDD` or `YYYY-MM-DD`).
pub fn normalize_collection_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    ["%Y%m%d", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
}

/// Ordered metadata for one output document: id, date and section (if any).
pub fn metadata_fields(doc_id: &str, date: Option<&str>, section: Option<&str>) -> Vec<Field> {
    let mut fields = vec![Field::tokens("doc_id", vec![doc_id.to_string()])];
    if let Some(date) = date {
        fields.push(Field::date("pub_date", date));
    }
    if let Some(section) = section {
        fields.push(Field::tokens("section", vec![section.to_string()]));
    }
    fields
}
