use anyhow::{bail, Context, Result};
use clap::Parser;
use newsquant::{
    analysis::{describe, describe_values, missing_counts, ColumnSummary, SummaryTable},
    load, logging, report, RecordTable,
};
use serde::Serialize;
use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
};

/// Summary statistics for one or more CSV files.
#[derive(Parser, Debug)]
#[command(name = "describe_csv", version)]
struct Args {
    /// CSV files to summarize
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Compare a single numeric column side by side across files
    #[arg(long)]
    column: Option<String>,

    /// Also print per-column missing-value counts
    #[arg(long)]
    missing: bool,

    /// Emit JSON on stdout instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct FileSummary {
    rows: usize,
    describe: SummaryTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing: Option<BTreeMap<String, usize>>,
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// One label per file: the file stem, or the full path when two files share a stem.
fn labels(paths: &[PathBuf]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for path in paths {
        *seen.entry(stem(path)).or_default() += 1;
    }
    paths
        .iter()
        .map(|path| {
            let name = stem(path);
            if seen[&name] > 1 {
                path.display().to_string()
            } else {
                name
            }
        })
        .collect()
}

fn column_summary(table: &RecordTable, column: &str) -> Result<ColumnSummary> {
    let values = table.numbers(column)?;
    match describe_values(&values) {
        Some(summary) => Ok(summary),
        None => bail!("column `{}` has no numeric values", column),
    }
}

fn main() -> Result<()> {
    logging::init("warn");
    let args = Args::parse();

    let mut tables = Vec::with_capacity(args.files.len());
    for (path, name) in args.files.iter().zip(labels(&args.files)) {
        let table = load(path).with_context(|| format!("loading {}", path.display()))?;
        tables.push((name, table));
    }

    if let Some(column) = &args.column {
        let mut compared = Vec::with_capacity(tables.len());
        for (name, table) in &tables {
            let summary = column_summary(table, column)
                .with_context(|| format!("summarizing `{}` in {}", column, name))?;
            compared.push((name.clone(), summary));
        }
        if args.json {
            let by_file: BTreeMap<&str, &ColumnSummary> =
                compared.iter().map(|(n, s)| (n.as_str(), s)).collect();
            println!("{}", serde_json::to_string_pretty(&by_file)?);
        } else {
            println!("\n--- {} ---", column);
            report::comparison_table(&compared).printstd();
        }
        return Ok(());
    }

    if args.json {
        let by_file: BTreeMap<String, FileSummary> = tables
            .iter()
            .map(|(name, table)| {
                let missing = args
                    .missing
                    .then(|| missing_counts(table).into_iter().collect());
                (
                    name.clone(),
                    FileSummary {
                        rows: table.len(),
                        describe: describe(table),
                        missing,
                    },
                )
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&by_file)?);
        return Ok(());
    }

    for (name, table) in &tables {
        println!("\n--- {} ({} rows) ---", name, table.len());
        report::summary_table(&describe(table)).printstd();
        if args.missing {
            report::counts_table("column", "missing", &missing_counts(table)).printstd();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stems_when_unique() {
        let files = vec![PathBuf::from("data/AAPL.csv"), PathBuf::from("data/MSFT.csv")];
        assert_eq!(labels(&files), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn shared_stems_fall_back_to_paths() {
        let files = vec![
            PathBuf::from("2023/AAPL.csv"),
            PathBuf::from("2024/AAPL.csv"),
            PathBuf::from("2024/MSFT.csv"),
        ];
        let names = labels(&files);
        assert_eq!(names, vec!["2023/AAPL.csv", "2024/AAPL.csv", "MSFT"]);

        let keys: BTreeMap<&str, usize> =
            names.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();
        assert_eq!(keys.len(), files.len());
    }
}
