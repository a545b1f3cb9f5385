use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use crate::analysis::describe::{describe_values, ColumnSummary};
use crate::error::Result;
use crate::table::{RecordTable, Value};

/// Per-row headline length column appended by the EDA run.
pub const HEADLINE_LENGTH_COLUMN: &str = "headline_length";

/// Occurrence counts, highest first; ties keep first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueCounts {
    entries: Vec<(String, usize)>,
}

impl ValueCounts {
    /// Count every key, preserving first-seen order among equal counts.
    pub fn from_keys<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut index: HashMap<&'a str, usize> = HashMap::new();
        let mut entries: Vec<(String, usize)> = Vec::new();
        for key in keys {
            match index.get(key) {
                Some(&i) => entries[i].1 += 1,
                None => {
                    index.insert(key, entries.len());
                    entries.push((key.to_string(), 1));
                }
            }
        }
        // stable: equal counts stay in first-seen order
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, c)| *c)
    }

    pub fn head(&self, n: usize) -> &[(String, usize)] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }
}

/// Counts of the text values of `column`; nulls are skipped.
pub fn value_counts(table: &RecordTable, column: &str) -> Result<ValueCounts> {
    Ok(ValueCounts::from_keys(
        table.column(column)?.filter_map(Value::as_str),
    ))
}

/// Character-length statistics of a text column (e.g. headlines).
pub fn headline_length_stats(table: &RecordTable, column: &str) -> Result<Option<ColumnSummary>> {
    let lengths: Vec<f64> = table
        .column(column)?
        .filter_map(Value::as_str)
        .map(|s| s.chars().count() as f64)
        .collect();
    Ok(describe_values(&lengths))
}

/// Per-row character length of a text column, nulls kept as nulls.
pub fn text_lengths(table: &RecordTable, column: &str) -> Result<Vec<Value>> {
    Ok(table
        .column(column)?
        .map(|v| match v {
            Value::Text(s) => Value::Number(s.chars().count() as f64),
            _ => Value::Null,
        })
        .collect())
}

/// Articles per calendar day of a normalized date column, ascending by day.
pub fn daily_counts(table: &RecordTable, column: &str) -> Result<Vec<(NaiveDate, usize)>> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for dt in table.column(column)?.filter_map(Value::as_datetime) {
        *per_day.entry(dt.date()).or_default() += 1;
    }
    Ok(per_day.into_iter().collect())
}

/// Number of nulls per column, in column order.
pub fn missing_counts(table: &RecordTable) -> Vec<(String, usize)> {
    table
        .headers()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let missing = table.rows().iter().filter(|r| r[idx].is_null()).count();
            (name.clone(), missing)
        })
        .collect()
}
