//! Headline sentiment from the VADER lexicon.

use std::collections::HashMap;
use tracing::info;
use vader_sentiment::SentimentIntensityAnalyzer;

use crate::analysis::news::ValueCounts;
use crate::error::{LogFailure, Result};
use crate::table::{RecordTable, Value};

pub const SENTIMENT_SCORE_COLUMN: &str = "sentiment_score";
pub const SENTIMENT_COLUMN: &str = "sentiment";

/// Compound scores inside (-NEUTRAL_BAND, NEUTRAL_BAND) are neutral.
pub const NEUTRAL_BAND: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn from_score(score: f64) -> Self {
        if score >= NEUTRAL_BAND {
            Sentiment::Positive
        } else if score <= -NEUTRAL_BAND {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    fn parse(label: &str) -> Option<Self> {
        Sentiment::ALL.into_iter().find(|s| s.as_str() == label)
    }
}

/// Per-group article counts by sentiment label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentTally {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentTally {
    fn add(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }

    pub fn get(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

/// Append `sentiment_score` (VADER compound, -1..=1) and `sentiment` labels.
///
/// Null text gives null in both columns.
pub fn add_sentiment(mut table: RecordTable, text_column: &str) -> Result<RecordTable> {
    let analyzer = SentimentIntensityAnalyzer::new();
    let scores: Vec<Option<f64>> = table
        .column(text_column)
        .log_failure("add_sentiment")?
        .map(|v| {
            v.as_str().map(|text| {
                analyzer
                    .polarity_scores(text)
                    .get("compound")
                    .copied()
                    .unwrap_or(0.0)
            })
        })
        .collect();

    let labels = scores
        .iter()
        .map(|s| Value::from(s.map(|score| Sentiment::from_score(score).as_str().to_string())))
        .collect();
    let scores = scores.into_iter().map(Value::from).collect();

    table.set_column(SENTIMENT_SCORE_COLUMN, scores)?;
    table.set_column(SENTIMENT_COLUMN, labels)?;
    info!(column = text_column, rows = table.len(), "scored sentiment");
    Ok(table)
}

/// Articles per sentiment label, highest first.
pub fn sentiment_counts(table: &RecordTable) -> Result<ValueCounts> {
    crate::analysis::news::value_counts(table, SENTIMENT_COLUMN).log_failure("sentiment_counts")
}

/// Sentiment tally per value of `group_column` (e.g. publisher).
///
/// Groups are ordered by article count, ties in first-seen order. Rows with a
/// null group or label are skipped.
pub fn sentiment_by(table: &RecordTable, group_column: &str) -> Result<Vec<(String, SentimentTally)>> {
    let groups = table.require_column(group_column).log_failure("sentiment_by")?;
    let labels = table.require_column(SENTIMENT_COLUMN).log_failure("sentiment_by")?;

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut tallies: Vec<(String, SentimentTally)> = Vec::new();
    for row in table.rows() {
        let (Some(group), Some(sentiment)) = (
            row[groups].as_str(),
            row[labels].as_str().and_then(Sentiment::parse),
        ) else {
            continue;
        };
        let slot = *index.entry(group).or_insert_with(|| {
            tallies.push((group.to_string(), SentimentTally::default()));
            tallies.len() - 1
        });
        tallies[slot].1.add(sentiment);
    }
    // stable: equal totals stay in first-seen order
    tallies.sort_by(|a, b| b.1.total().cmp(&a.1.total()));
    Ok(tallies)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn news() -> RecordTable {
        let rows = [
            ("Stocks surge on great earnings", "Reuters"),
            ("Terrible and awful quarter", "Benzinga"),
            ("Company files quarterly report", "Reuters"),
            ("", "Benzinga"),
            ("Great win for investors", "Reuters"),
        ]
        .iter()
        .map(|(h, p)| {
            let headline = if h.is_empty() {
                Value::Null
            } else {
                Value::Text(h.to_string())
            };
            vec![headline, Value::Text(p.to_string())]
        })
        .collect();
        RecordTable::new(vec!["headline".into(), "publisher".into()], rows).unwrap()
    }

    #[test]
    fn labels_follow_the_compound_score() {
        assert_eq!(Sentiment::from_score(0.6), Sentiment::Positive);
        assert_eq!(Sentiment::from_score(0.05), Sentiment::Positive);
        assert_eq!(Sentiment::from_score(0.0), Sentiment::Neutral);
        assert_eq!(Sentiment::from_score(-0.049), Sentiment::Neutral);
        assert_eq!(Sentiment::from_score(-0.3), Sentiment::Negative);
    }

    #[test]
    fn headlines_are_scored() {
        let table = add_sentiment(news(), "headline").unwrap();
        let label = |row| table.get(row, SENTIMENT_COLUMN).and_then(Value::as_str);

        assert_eq!(label(0), Some("positive"));
        assert_eq!(label(1), Some("negative"));
        assert_eq!(label(2), Some("neutral"));
        assert_eq!(label(3), None);
        assert_eq!(table.get(3, SENTIMENT_SCORE_COLUMN), Some(&Value::Null));

        let score = table.get(0, SENTIMENT_SCORE_COLUMN).and_then(Value::as_f64).unwrap();
        assert!(score > 0.0 && score <= 1.0);

        let counts = sentiment_counts(&table).unwrap();
        assert_eq!(counts.get("positive"), Some(2));
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn tally_per_publisher() {
        let table = add_sentiment(news(), "headline").unwrap();
        let by_publisher = sentiment_by(&table, "publisher").unwrap();
        assert_eq!(
            by_publisher,
            vec![
                (
                    "Reuters".to_string(),
                    SentimentTally {
                        positive: 2,
                        neutral: 1,
                        negative: 0
                    }
                ),
                (
                    "Benzinga".to_string(),
                    SentimentTally {
                        positive: 0,
                        neutral: 0,
                        negative: 1
                    }
                ),
            ]
        );
        assert!(sentiment_by(&table, "ticker").is_err());
    }
}
