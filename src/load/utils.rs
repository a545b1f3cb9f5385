use tracing::debug;

use crate::schema::ColumnKind;

/// Only an empty (after trim) cell is missing; spellings like `NA` stay text.
pub fn is_missing(cell: &str) -> bool {
    cell.trim().is_empty()
}

/// A cell that parses as a finite f64.
pub fn parse_finite(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Infer the kind of a single non-missing cell.
///
/// `NaN` and `inf` spellings parse as f64 but still count as numeric, so a
/// price column with a `NaN` hole stays numeric; the loader turns those cells
/// into nulls.
pub fn infer_kind_from_str(s: &str) -> ColumnKind {
    if s.trim().parse::<f64>().is_ok() {
        ColumnKind::Numeric
    } else {
        ColumnKind::Text
    }
}

/// Decide each column's kind from every row:
///  - missing cells are ignored
///  - numeric only when all remaining cells parse as f64 and at least one is finite
///  - anything else (including an all-missing column) is text
pub fn derive_column_kinds(headers: &[String], rows: &[Vec<String>]) -> Vec<ColumnKind> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let mut finite = false;
            for row in rows {
                let cell = &row[idx];
                if is_missing(cell) {
                    continue;
                }
                if infer_kind_from_str(cell) == ColumnKind::Text {
                    debug!(column = %name, sample = %cell.trim(), "column is text");
                    return ColumnKind::Text;
                }
                finite |= parse_finite(cell).is_some();
            }
            if finite {
                ColumnKind::Numeric
            } else {
                ColumnKind::Text
            }
        })
        .collect()
}
