//! Console tables for summaries, rankings and previews.

use prettytable::{format, Cell, Row, Table};

use crate::analysis::{ColumnSummary, Sentiment, SentimentTally, SummaryTable, STAT_NAMES};
use crate::table::RecordTable;

fn new_table() -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table
}

fn header_row<'a, I: IntoIterator<Item = &'a str>>(names: I) -> Row {
    Row::new(names.into_iter().map(|n| Cell::new(n).style_spec("bFg")).collect())
}

pub fn format_stat(name: &str, value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if name == "count" {
        format!("{}", value as u64)
    } else {
        format!("{:.6}", value)
    }
}

/// One row per statistic, one column per summarized column.
pub fn summary_table(summary: &SummaryTable) -> Table {
    labelled_summaries(&summary.iter().collect::<Vec<_>>())
}

/// Side-by-side summaries under arbitrary labels (e.g. one per ticker file).
pub fn comparison_table(labelled: &[(String, ColumnSummary)]) -> Table {
    let columns: Vec<(&str, &ColumnSummary)> =
        labelled.iter().map(|(label, s)| (label.as_str(), s)).collect();
    labelled_summaries(&columns)
}

fn labelled_summaries(columns: &[(&str, &ColumnSummary)]) -> Table {
    let mut table = new_table();
    table.add_row(header_row(
        std::iter::once("").chain(columns.iter().map(|(name, _)| *name)),
    ));
    for (i, stat) in STAT_NAMES.iter().enumerate() {
        let mut cells = vec![Cell::new(stat).style_spec("b")];
        cells.extend(
            columns
                .iter()
                .map(|(_, s)| Cell::new(&format_stat(stat, s.values()[i])).style_spec("r")),
        );
        table.add_row(Row::new(cells));
    }
    table
}

/// Two-column ranking table (key, count).
pub fn counts_table(key_title: &str, count_title: &str, entries: &[(String, usize)]) -> Table {
    let mut table = new_table();
    table.add_row(header_row([key_title, count_title]));
    for (key, count) in entries {
        table.add_row(Row::new(vec![
            Cell::new(key),
            Cell::new(&count.to_string()).style_spec("r"),
        ]));
    }
    table
}

/// One row per group with its positive/neutral/negative article counts.
pub fn sentiment_table(group_title: &str, tallies: &[(String, SentimentTally)]) -> Table {
    let mut table = new_table();
    table.add_row(header_row(
        std::iter::once(group_title)
            .chain(Sentiment::ALL.iter().map(|s| s.as_str()))
            .chain(std::iter::once("total")),
    ));
    for (group, tally) in tallies {
        let mut cells = vec![Cell::new(group)];
        cells.extend(
            Sentiment::ALL
                .iter()
                .map(|s| tally.get(*s))
                .chain(std::iter::once(tally.total()))
                .map(|n| Cell::new(&n.to_string()).style_spec("r")),
        );
        table.add_row(Row::new(cells));
    }
    table
}

/// First `n` rows of a record table.
pub fn preview_table(records: &RecordTable, n: usize) -> Table {
    let mut table = new_table();
    table.add_row(header_row(records.headers().iter().map(String::as_str)));
    for row in records.rows().iter().take(n) {
        table.add_row(Row::new(
            row.iter().map(|v| Cell::new(&v.to_string())).collect(),
        ));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::describe;
    use crate::table::Value;

    #[test]
    fn stat_formatting() {
        assert_eq!(format_stat("count", 30.0), "30");
        assert_eq!(format_stat("mean", 101.0), "101.000000");
        assert_eq!(format_stat("std", f64::NAN), "NaN");
    }

    #[test]
    fn summary_has_a_row_per_statistic() {
        let records = RecordTable::new(
            vec!["Close".into()],
            vec![vec![Value::Number(1.0)], vec![Value::Number(3.0)]],
        )
        .unwrap();
        let table = summary_table(&describe(&records));
        assert_eq!(table.len(), 1 + STAT_NAMES.len());
        let rendered = table.to_string();
        assert!(rendered.contains("Close"));
        assert!(rendered.contains("2.000000"));
    }

    #[test]
    fn counts_and_preview() {
        let counts = counts_table("domain", "articles", &[("x.com".to_string(), 3)]);
        assert_eq!(counts.len(), 2);

        let records = RecordTable::new(
            vec!["headline".into()],
            vec![vec![Value::Text("a".into())], vec![Value::Null]],
        )
        .unwrap();
        let preview = preview_table(&records, 5);
        assert_eq!(preview.len(), 3);
        assert!(preview.to_string().contains("NaN"));
    }

    #[test]
    fn sentiment_rows_per_group() {
        let tally = SentimentTally {
            positive: 2,
            neutral: 1,
            negative: 0,
        };
        let table = sentiment_table("publisher", &[("Reuters".to_string(), tally)]);
        assert_eq!(table.len(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("positive"));
        assert!(rendered.contains("Reuters"));
        assert_eq!(table.get_row(1).map(|r| r.len()), Some(5));
    }
}
