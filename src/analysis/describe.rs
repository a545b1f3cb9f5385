use serde::{Serialize, Serializer};
use tracing::debug;

use crate::table::{RecordTable, Value};

/// Statistic names, in display order.
pub const STAT_NAMES: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Summary of one numeric column. Nulls never count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (N-1); NaN below two values
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub p25: f64,
    #[serde(rename = "50%")]
    pub p50: f64,
    #[serde(rename = "75%")]
    pub p75: f64,
    pub max: f64,
}

impl ColumnSummary {
    /// Values aligned with [`STAT_NAMES`].
    pub fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.p25,
            self.p50,
            self.p75,
            self.max,
        ]
    }
}

/// Column name → summary, in table column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryTable {
    columns: Vec<(String, ColumnSummary)>,
}

impl Serialize for SummaryTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.columns.iter().map(|(name, s)| (name, s)))
    }
}

impl SummaryTable {
    pub fn get(&self, column: &str) -> Option<&ColumnSummary> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, s)| s)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnSummary)> {
        self.columns.iter().map(|(name, s)| (name.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Summarize every numeric column; anything else is left out silently.
///
/// A column is numeric when it holds at least one value and every non-null
/// value is a number.
pub fn describe(table: &RecordTable) -> SummaryTable {
    let mut columns = Vec::new();

    for (idx, name) in table.headers().iter().enumerate() {
        let mut values = Vec::with_capacity(table.len());
        let mut numeric = true;
        for row in table.rows() {
            match &row[idx] {
                Value::Null => {}
                Value::Number(n) => values.push(*n),
                _ => {
                    numeric = false;
                    break;
                }
            }
        }

        match (numeric, describe_values(&values)) {
            (true, Some(summary)) => columns.push((name.clone(), summary)),
            _ => debug!(column = %name, "excluded from describe"),
        }
    }

    SummaryTable { columns }
}

/// Summary statistics of a plain slice; `None` when it is empty.
pub fn describe_values(values: &[f64]) -> Option<ColumnSummary> {
    if values.is_empty() {
        return None;
    }
    let count = values.len();
    let n = count as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = if count < 2 {
        f64::NAN
    } else {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    };

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    Some(ColumnSummary {
        count,
        mean,
        std,
        min: sorted[0],
        p25: percentile(&sorted, 0.25),
        p50: percentile(&sorted, 0.50),
        p75: percentile(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

/// Linear interpolation between closest ranks over sorted, non-empty input.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
