pub mod describe;
pub mod domains;
pub mod indicators;
pub mod metrics;
pub mod news;
pub mod sentiment;
pub mod topics;

pub use describe::{describe, describe_values, ColumnSummary, SummaryTable, STAT_NAMES};
pub use domains::{domain_counts, domain_of, extract_domain, DomainCounts, DOMAIN_COLUMN};
pub use indicators::{add_technical_indicators, IndicatorParams};
pub use metrics::{annualized_volatility, daily_returns};
pub use news::{
    daily_counts, headline_length_stats, missing_counts, text_lengths, value_counts, ValueCounts,
};
pub use sentiment::{
    add_sentiment, sentiment_by, sentiment_counts, Sentiment, SentimentTally, SENTIMENT_COLUMN,
    SENTIMENT_SCORE_COLUMN,
};
pub use topics::{top_terms, top_terms_with, TOP_TERMS_COLUMN};
