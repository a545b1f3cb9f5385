// src/load/mod.rs
pub mod date_parser;
pub mod utils;

use csv::{ReaderBuilder, Trim};
use std::{fs, io::Cursor, path::Path};
use tracing::info;

use crate::error::{AnalysisError, LogFailure, Result};
use crate::schema::{ColumnKind, TableSchema};
use crate::table::{RecordTable, Value};

pub use date_parser::{normalize, parse_timestamp};
use utils::{derive_column_kinds, is_missing, parse_finite};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read a UTF-8 CSV with a header row into a typed table.
///
/// The file is read in full before parsing, so the handle is released before
/// any row is converted. A row whose width differs from the header aborts the
/// whole load; nothing partial is returned.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load<P: AsRef<Path>>(path: P) -> Result<RecordTable> {
    read_table(path.as_ref()).log_failure("load")
}

/// `load`, then check the table against `schema` before anyone touches it.
pub fn load_with_schema<P: AsRef<Path>>(path: P, schema: &TableSchema) -> Result<RecordTable> {
    let table = load(path)?;
    schema.validate(&table).log_failure("schema validation")?;
    Ok(table)
}

fn read_table(path: &Path) -> Result<RecordTable> {
    if !path.is_file() {
        return Err(AnalysisError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let load_err = |source: csv::Error| AnalysisError::Load {
        path: path.to_path_buf(),
        source,
    };

    let bytes = fs::read(path).map_err(|e| load_err(e.into()))?;
    let data = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(Trim::Headers)
        .from_reader(Cursor::new(data));

    let headers: Vec<String> = rdr
        .headers()
        .map_err(load_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(load_err)?;
        raw_rows.push(record.iter().map(str::to_string).collect());
    }

    if raw_rows.is_empty() {
        return Err(AnalysisError::EmptyData {
            path: path.to_path_buf(),
        });
    }

    let kinds = derive_column_kinds(&headers, &raw_rows);
    let rows = raw_rows
        .into_iter()
        .map(|raw| {
            raw.iter()
                .zip(&kinds)
                .map(|(cell, kind)| typed_cell(cell, *kind))
                .collect()
        })
        .collect();

    let table = RecordTable::new(headers, rows)?;
    info!(
        rows = table.len(),
        columns = table.headers().len(),
        "loaded csv"
    );
    Ok(table)
}

/// Cells are trimmed, never unquoted: the csv reader already removed the
/// field quoting, so any quote left is part of the value.
fn typed_cell(raw: &str, kind: ColumnKind) -> Value {
    if is_missing(raw) {
        return Value::Null;
    }
    match kind {
        // NaN/inf spellings in a numeric column are holes
        ColumnKind::Numeric => Value::from(parse_finite(raw)),
        _ => Value::Text(raw.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,newsquant=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn csv_file(content: &str) -> Result<NamedTempFile> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(content.as_bytes())?;
        Ok(tmp)
    }

    #[test]
    fn test_load_counts_data_lines() -> Result<()> {
        init_test_logging();
        let tmp = csv_file(
            "headline,publisher,date\n\
             Stocks rally,test@example.com,2023-01-01\n\
             \"Fed, again\",Reuters,2023-01-02\n\
             Oil slips,,2023-01-03\n",
        )?;

        let table = load(tmp.path())?;
        assert_eq!(table.len(), 3);
        assert_eq!(table.headers(), &["headline", "publisher", "date"]);
        assert_eq!(table.get(1, "headline"), Some(&Value::Text("Fed, again".into())));
        assert_eq!(table.get(2, "publisher"), Some(&Value::Null));
        Ok(())
    }

    #[test]
    fn test_numeric_columns_are_typed() -> Result<()> {
        init_test_logging();
        let tmp = csv_file("\u{feff}Date,Close,Volume\n2023-01-01,100.5,1000\n2023-01-02,,1100\n")?;

        let table = load(tmp.path())?;
        assert_eq!(table.headers()[0], "Date");
        assert_eq!(table.get(0, "Close"), Some(&Value::Number(100.5)));
        assert_eq!(table.get(1, "Close"), Some(&Value::Null));
        assert_eq!(table.get(1, "Volume"), Some(&Value::Number(1100.0)));
        assert_eq!(table.get(0, "Date"), Some(&Value::Text("2023-01-01".into())));
        Ok(())
    }

    #[test]
    fn test_cell_text_is_kept_verbatim() -> Result<()> {
        init_test_logging();
        let tmp = csv_file(
            "headline,publisher\n\
             \"\"\"Apple\"\"\",None\n\
             \"  Fed holds  \",NA\n",
        )?;

        let table = load(tmp.path())?;
        assert_eq!(table.get(0, "headline"), Some(&Value::Text("\"Apple\"".into())));
        assert_eq!(table.get(0, "publisher"), Some(&Value::Text("None".into())));
        assert_eq!(table.get(1, "headline"), Some(&Value::Text("Fed holds".into())));
        assert_eq!(table.get(1, "publisher"), Some(&Value::Text("NA".into())));
        Ok(())
    }

    #[test]
    fn test_non_finite_prices_load_as_null() -> Result<()> {
        init_test_logging();
        let tmp = csv_file("Close\n100\nNAN\n102\ninf\n")?;

        let table = load(tmp.path())?;
        assert_eq!(table.get(1, "Close"), Some(&Value::Null));
        assert_eq!(table.get(3, "Close"), Some(&Value::Null));

        let summary = crate::analysis::describe(&table);
        let close = summary.get("Close").unwrap();
        assert_eq!(close.count, 2);
        assert_eq!(close.mean, 101.0);
        assert_eq!(close.max, 102.0);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_not_found() {
        init_test_logging();
        let res = load("definitely/not/here.csv");
        assert!(matches!(res, Err(AnalysisError::NotFound { .. })));
    }

    #[test]
    fn test_header_only_is_empty_data() -> Result<()> {
        init_test_logging();
        let tmp = csv_file("headline,publisher,date\n")?;
        assert!(matches!(
            load(tmp.path()),
            Err(AnalysisError::EmptyData { .. })
        ));

        let empty = csv_file("")?;
        assert!(matches!(
            load(empty.path()),
            Err(AnalysisError::EmptyData { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_malformed_row_aborts_load() -> Result<()> {
        init_test_logging();
        let tmp = csv_file("a,b,c\n1,2,3\n4,5\n6,7,8\n")?;
        assert!(matches!(load(tmp.path()), Err(AnalysisError::Load { .. })));
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_is_load_error() -> Result<()> {
        init_test_logging();
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(b"a,b\n\xff\xfe,1\n")?;
        assert!(matches!(load(tmp.path()), Err(AnalysisError::Load { .. })));
        Ok(())
    }

    #[test]
    fn test_load_is_idempotent() -> Result<()> {
        init_test_logging();
        let tmp = csv_file("x,y\n1,a\n2,b\n")?;
        assert_eq!(load(tmp.path())?, load(tmp.path())?);
        Ok(())
    }

    #[test]
    fn test_load_with_schema_fails_fast() -> Result<()> {
        init_test_logging();
        let tmp = csv_file("date,close\n2023-01-01,1\n")?;
        match load_with_schema(tmp.path(), &TableSchema::price()) {
            Err(AnalysisError::Schema { problems, .. }) => {
                assert!(problems.iter().any(|p| p.contains("`Close`")));
            }
            other => panic!("expected schema error, got {:?}", other),
        }
        Ok(())
    }
}
