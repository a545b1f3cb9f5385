use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::info;

use crate::error::{AnalysisError, LogFailure, Result};
use crate::table::{RecordTable, Value};

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse one raw timestamp into UTC wall-clock time.
///
/// Offset-bearing values are shifted to UTC; date-only values land on midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_utc());
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Replace every value of `column` with its parsed timestamp, in place.
///
/// Nulls stay null and values that are already dates pass through. The first
/// value that does not parse fails the whole operation; rows are never
/// reordered and other columns are untouched.
pub fn normalize(mut table: RecordTable, column: &str) -> Result<RecordTable> {
    table
        .map_column(column, |row, value| match value {
            Value::Null => Ok(Value::Null),
            Value::Date(dt) => Ok(Value::Date(*dt)),
            Value::Text(s) => parse_timestamp(s).map(Value::Date).ok_or_else(|| {
                AnalysisError::TimestampParse {
                    column: column.to_string(),
                    row,
                    value: s.clone(),
                }
            }),
            Value::Number(n) => Err(AnalysisError::TimestampParse {
                column: column.to_string(),
                row,
                value: n.to_string(),
            }),
        })
        .log_failure("normalize")?;

    info!(column, rows = table.len(), "normalized timestamps");
    Ok(table)
}
