//! Error types shared by every analysis component.

use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by loading, normalizing and analysing tables.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The input path does not resolve to an existing file
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The file parsed but holds zero data rows
    #[error("no data rows in {}", path.display())]
    EmptyData { path: PathBuf },

    /// Malformed content; the whole load is aborted
    #[error("failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A value of a date column could not be parsed
    #[error("cannot parse `{value}` as a timestamp in column `{column}` at row {row}")]
    TimestampParse {
        column: String,
        row: usize,
        value: String,
    },

    /// The table does not match the columns an analysis needs
    #[error("schema `{schema}` mismatch: {}", problems.join("; "))]
    Schema {
        schema: String,
        problems: Vec<String>,
    },

    #[error("column `{0}` not found")]
    ColumnNotFound(String),

    /// Technical indicator calculation error
    #[error("indicator error: {0}")]
    Indicator(String),

    #[error("failed to render {}: {reason}", path.display())]
    Chart { path: PathBuf, reason: String },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Log-and-propagate at a failure boundary.
///
/// Emits one `error` event naming the operation, then hands the error back
/// untouched so the caller still decides what to do with it.
pub trait LogFailure {
    fn log_failure(self, operation: &str) -> Self;
}

impl<T> LogFailure for Result<T> {
    fn log_failure(self, operation: &str) -> Self {
        if let Err(ref err) = self {
            tracing::error!(operation, error = %err, "{} failed", operation);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalysisError::NotFound {
            path: PathBuf::from("missing.csv"),
        };
        assert_eq!(err.to_string(), "file not found: missing.csv");

        let err = AnalysisError::TimestampParse {
            column: "date".into(),
            row: 4,
            value: "not-a-date".into(),
        };
        assert_eq!(
            err.to_string(),
            "cannot parse `not-a-date` as a timestamp in column `date` at row 4"
        );

        let err = AnalysisError::Schema {
            schema: "price".into(),
            problems: vec!["missing column `Close`".into(), "missing column `Open`".into()],
        };
        assert_eq!(
            err.to_string(),
            "schema `price` mismatch: missing column `Close`; missing column `Open`"
        );
    }

    #[test]
    fn test_log_failure_passes_result_through() {
        let ok: Result<u32> = Ok(7);
        assert_eq!(ok.log_failure("noop").unwrap(), 7);

        let err: Result<u32> = Err(AnalysisError::ColumnNotFound("Close".into()));
        match err.log_failure("lookup") {
            Err(AnalysisError::ColumnNotFound(c)) => assert_eq!(c, "Close"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
