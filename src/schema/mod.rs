// src/schema/mod.rs

use crate::error::{AnalysisError, Result};
use crate::table::{RecordTable, Value};

pub const NEWS_COLUMNS: [&str; 3] = ["headline", "publisher", "date"];
pub const PRICE_COLUMNS: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

/// What a column must hold. Nulls are acceptable in every kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Free text
    Text,
    /// Every non-null value is a number
    Numeric,
    /// Raw timestamp text, or timestamps already normalized
    Temporal,
}

impl ColumnKind {
    pub fn as_str(&self) -> &str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Numeric => "numeric",
            ColumnKind::Temporal => "temporal",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (ColumnKind::Text, Value::Text(_)) => true,
            (ColumnKind::Numeric, Value::Number(_)) => true,
            (ColumnKind::Temporal, Value::Text(_) | Value::Date(_)) => true,
            _ => false,
        }
    }
}

/// A required column: exact, case-sensitive name plus kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

/// Columns a table must carry before an analysis may run on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
}

impl TableSchema {
    pub fn new(name: &str, columns: &[(&str, ColumnKind)]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns
                .iter()
                .map(|(n, k)| ColumnSpec {
                    name: n.to_string(),
                    kind: *k,
                })
                .collect(),
        }
    }

    /// `headline`, `publisher`, `date`
    pub fn news() -> Self {
        Self::new(
            "news",
            &[
                ("headline", ColumnKind::Text),
                ("publisher", ColumnKind::Text),
                ("date", ColumnKind::Temporal),
            ],
        )
    }

    /// `Date` plus numeric OHLCV columns
    pub fn price() -> Self {
        Self::new(
            "price",
            &[
                ("Date", ColumnKind::Temporal),
                ("Open", ColumnKind::Numeric),
                ("High", ColumnKind::Numeric),
                ("Low", ColumnKind::Numeric),
                ("Close", ColumnKind::Numeric),
                ("Volume", ColumnKind::Numeric),
            ],
        )
    }

    /// Check every required column, reporting all problems at once.
    pub fn validate(&self, table: &RecordTable) -> Result<()> {
        let mut problems = Vec::new();

        for spec in &self.columns {
            let Some(idx) = table.column_index(&spec.name) else {
                problems.push(format!("missing column `{}`", spec.name));
                continue;
            };
            if let Some((row, value)) = table
                .rows()
                .iter()
                .enumerate()
                .map(|(i, r)| (i, &r[idx]))
                .find(|(_, v)| !spec.kind.accepts(v))
            {
                problems.push(format!(
                    "column `{}` must be {} but row {} holds `{}`",
                    spec.name,
                    spec.kind.as_str(),
                    row,
                    value
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AnalysisError::Schema {
                schema: self.name.clone(),
                problems,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price_table(close: Value) -> RecordTable {
        RecordTable::new(
            PRICE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            vec![vec![
                Value::Text("2023-01-01".into()),
                Value::Number(99.0),
                Value::Number(101.0),
                Value::Number(98.0),
                close,
                Value::Number(1000.0),
            ]],
        )
        .unwrap()
    }

    #[test]
    fn price_schema_accepts_valid_table() {
        assert!(TableSchema::price().validate(&price_table(Value::Number(100.0))).is_ok());
        assert!(TableSchema::price().validate(&price_table(Value::Null)).is_ok());
    }

    #[test]
    fn wrong_kind_is_reported() {
        let table = price_table(Value::Text("n/a-ish".into()));
        match TableSchema::price().validate(&table) {
            Err(AnalysisError::Schema { schema, problems }) => {
                assert_eq!(schema, "price");
                assert_eq!(problems.len(), 1);
                assert!(problems[0].contains("`Close` must be numeric"));
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn casing_matters_and_all_missing_columns_are_listed() {
        let table = RecordTable::new(
            vec!["Headline".into(), "publisher".into()],
            vec![vec![Value::Text("x".into()), Value::Text("y".into())]],
        )
        .unwrap();
        match TableSchema::news().validate(&table) {
            Err(AnalysisError::Schema { problems, .. }) => {
                assert_eq!(
                    problems,
                    vec!["missing column `headline`", "missing column `date`"]
                );
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }
}
