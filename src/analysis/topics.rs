use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::error::{LogFailure, Result};
use crate::table::{RecordTable, Value};

pub const TOP_TERMS_COLUMN: &str = "top_terms";
pub const DEFAULT_TERMS_PER_ROW: usize = 3;

/// Words of two or more word characters.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any",
        "are", "as", "at", "be", "because", "been", "before", "being", "below", "between",
        "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during",
        "each", "few", "for", "from", "further", "had", "has", "have", "having", "he", "her",
        "here", "hers", "him", "his", "how", "if", "in", "into", "is", "it", "its", "itself",
        "just", "me", "more", "most", "my", "no", "nor", "not", "now", "of", "off", "on",
        "once", "only", "or", "other", "our", "ours", "out", "over", "own", "same", "she",
        "should", "so", "some", "such", "than", "that", "the", "their", "them", "then",
        "there", "these", "they", "this", "those", "through", "to", "too", "under", "until",
        "up", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who",
        "whom", "why", "will", "with", "would", "you", "your", "yours",
    ]
    .into_iter()
    .collect()
});

/// Lower-cased tokens of `text`, stop words removed.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Add `top_terms` with the [`DEFAULT_TERMS_PER_ROW`] best TF-IDF terms of each row.
pub fn top_terms(table: RecordTable, text_column: &str, max_features: usize) -> Result<RecordTable> {
    top_terms_with(table, text_column, max_features, DEFAULT_TERMS_PER_ROW)
}

/// Add `top_terms`, keeping `per_row` terms per row.
///
/// The vocabulary is the `max_features` most frequent terms over the whole
/// column, ties in first-seen order. Weights are raw counts times the smoothed
/// IDF `ln((1 + n) / (1 + df)) + 1`, L2-normalized per row. Rows without any
/// vocabulary term get null.
pub fn top_terms_with(
    mut table: RecordTable,
    text_column: &str,
    max_features: usize,
    per_row: usize,
) -> Result<RecordTable> {
    let docs: Vec<Option<Vec<String>>> = table
        .column(text_column)
        .log_failure("top_terms")?
        .map(|v| v.as_str().map(tokenize))
        .collect();

    let vocabulary = build_vocabulary(docs.iter().flatten(), max_features);
    let n_docs = docs.len() as f64;

    let mut doc_freq = vec![0usize; vocabulary.len()];
    for tokens in docs.iter().flatten() {
        let seen: HashSet<usize> = tokens.iter().filter_map(|t| vocabulary.get(t)).copied().collect();
        for idx in seen {
            doc_freq[idx] += 1;
        }
    }
    let idf: Vec<f64> = doc_freq
        .iter()
        .map(|&df| ((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0)
        .collect();

    let mut terms: Vec<&str> = vec![""; vocabulary.len()];
    for (term, &idx) in &vocabulary {
        terms[idx] = term.as_str();
    }

    let values = docs
        .iter()
        .map(|doc| match doc {
            Some(tokens) => rank_terms(tokens, &vocabulary, &terms, &idf, per_row),
            None => Value::Null,
        })
        .collect();

    table.set_column(TOP_TERMS_COLUMN, values)?;
    info!(
        column = text_column,
        vocabulary = vocabulary.len(),
        "extracted top terms"
    );
    Ok(table)
}

/// Term → vocabulary index, where index order is the first-seen order.
fn build_vocabulary<'a, I>(docs: I, max_features: usize) -> HashMap<String, usize>
where
    I: Iterator<Item = &'a Vec<String>>,
{
    let mut first_seen: HashMap<&'a str, usize> = HashMap::new();
    let mut terms: Vec<(&'a str, usize)> = Vec::new();
    for token in docs.flatten() {
        match first_seen.get(token.as_str()) {
            Some(&i) => terms[i].1 += 1,
            None => {
                first_seen.insert(token.as_str(), terms.len());
                terms.push((token.as_str(), 1));
            }
        }
    }
    // stable sort keeps first-seen order among equal frequencies
    let mut ranked: Vec<usize> = (0..terms.len()).collect();
    ranked.sort_by(|&a, &b| terms[b].1.cmp(&terms[a].1));
    ranked.truncate(max_features);
    ranked.sort_unstable();

    ranked
        .into_iter()
        .enumerate()
        .map(|(vocab_idx, term_idx)| (terms[term_idx].0.to_string(), vocab_idx))
        .collect()
}

fn rank_terms(
    tokens: &[String],
    vocabulary: &HashMap<String, usize>,
    terms: &[&str],
    idf: &[f64],
    per_row: usize,
) -> Value {
    let mut counts: HashMap<usize, f64> = HashMap::new();
    for idx in tokens.iter().filter_map(|t| vocabulary.get(t)) {
        *counts.entry(*idx).or_default() += 1.0;
    }
    if counts.is_empty() || per_row == 0 {
        return Value::Null;
    }

    let mut weighted: Vec<(usize, f64)> = counts
        .into_iter()
        .map(|(idx, tf)| (idx, tf * idf[idx]))
        .collect();
    let norm = weighted.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    for (_, w) in weighted.iter_mut() {
        *w /= norm;
    }
    weighted.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    Value::Text(
        weighted
            .iter()
            .take(per_row)
            .map(|(idx, _)| terms[*idx])
            .collect::<Vec<_>>()
            .join(", "),
    )
}
