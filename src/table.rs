// src/table.rs

use chrono::NaiveDateTime;
use std::fmt;

use crate::error::{AnalysisError, Result};

/// A single typed cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Number(f64),
    /// UTC wall-clock time
    Date(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        v.map(Value::Number).unwrap_or(Value::Null)
    }
}

impl From<Option<String>> for Value {
    fn from(v: Option<String>) -> Self {
        v.map(Value::Text).unwrap_or(Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NaN"),
            Value::Text(s) => write!(f, "{}", s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Date(d) => write!(f, "{}", d),
        }
    }
}

/// Rows of typed values, aligned with an ordered header list.
///
/// Every row holds exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordTable {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl RecordTable {
    /// Build a table, rejecting rows whose width differs from the header.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        if let Some(idx) = rows.iter().position(|r| r.len() != headers.len()) {
            return Err(AnalysisError::Schema {
                schema: "table".into(),
                problems: vec![format!(
                    "row {} has {} cells, expected {}",
                    idx,
                    rows[idx].len(),
                    headers.len()
                )],
            });
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| AnalysisError::ColumnNotFound(name.to_string()))
    }

    /// Iterate one column top to bottom.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Value> + '_> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(move |r| &r[idx]))
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Non-null numbers of a column, in row order.
    pub fn numbers(&self, name: &str) -> Result<Vec<f64>> {
        Ok(self.column(name)?.filter_map(Value::as_f64).collect())
    }

    /// Append a derived column, replacing any column of the same name.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(AnalysisError::Schema {
                schema: "table".into(),
                problems: vec![format!(
                    "column `{}` has {} values for {} rows",
                    name,
                    values.len(),
                    self.rows.len()
                )],
            });
        }
        match self.column_index(name) {
            Some(idx) => {
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row[idx] = v;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.push(v);
                }
            }
        }
        Ok(())
    }

    /// Replace every cell of an existing column through `f`, in row order.
    pub(crate) fn map_column<F>(&mut self, name: &str, mut f: F) -> Result<()>
    where
        F: FnMut(usize, &Value) -> Result<Value>,
    {
        let idx = self.require_column(name)?;
        for (i, row) in self.rows.iter_mut().enumerate() {
            row[idx] = f(i, &row[idx])?;
        }
        Ok(())
    }

    /// Rows whose text value in `column` equals `value`.
    pub fn filter_eq(&self, column: &str, value: &str) -> Result<RecordTable> {
        let idx = self.require_column(column)?;
        let rows = self
            .rows
            .iter()
            .filter(|r| r[idx].as_str() == Some(value))
            .cloned()
            .collect();
        Ok(RecordTable {
            headers: self.headers.clone(),
            rows,
        })
    }

    /// Keep only the named columns, in the given order.
    pub fn select(&self, columns: &[&str]) -> Result<RecordTable> {
        let idxs = columns
            .iter()
            .map(|c| self.require_column(c))
            .collect::<Result<Vec<_>>>()?;
        let rows = self
            .rows
            .iter()
            .map(|r| idxs.iter().map(|&i| r[i].clone()).collect())
            .collect();
        Ok(RecordTable {
            headers: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        })
    }
}
