// src/pipeline.rs
//! The two end-to-end runs: news EDA and price technical analysis.

use chrono::NaiveDate;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::analysis::{
    add_sentiment, add_technical_indicators, annualized_volatility, daily_counts, daily_returns,
    describe, domain_counts, extract_domain, headline_length_stats, indicators::CLOSE_COLUMN,
    missing_counts, news::HEADLINE_LENGTH_COLUMN, sentiment_by, sentiment_counts, text_lengths,
    top_terms_with, value_counts, ColumnSummary, DomainCounts, SentimentTally, SummaryTable,
    ValueCounts, DOMAIN_COLUMN, SENTIMENT_COLUMN, TOP_TERMS_COLUMN,
};
use crate::charts::{self, PUBLICATION_TREND_PNG, PUBLISHER_DOMAINS_PNG, TECHNICAL_INDICATORS_PNG};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, LogFailure, Result};
use crate::load::{load_with_schema, normalize};
use crate::report;
use crate::schema::TableSchema;
use crate::table::{RecordTable, Value};

const HEADLINE: &str = "headline";
const PUBLISHER: &str = "publisher";
const NEWS_DATE: &str = "date";
const PRICE_DATE: &str = "Date";

#[derive(Debug, Clone)]
pub struct EdaReport {
    /// News table with `date` normalized plus `headline_length`, `top_terms`,
    /// `domain`, `sentiment_score` and `sentiment`
    pub table: RecordTable,
    pub headline_lengths: Option<ColumnSummary>,
    pub publishers: ValueCounts,
    pub daily: Vec<(NaiveDate, usize)>,
    pub domains: DomainCounts,
    pub sentiment: ValueCounts,
    pub publisher_sentiment: Vec<(String, SentimentTally)>,
    /// Articles of `focus_domain`, when one is configured
    pub domain_articles: Option<RecordTable>,
    pub missing: Vec<(String, usize)>,
    pub charts: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct TechnicalReport {
    /// Price table with `Date` normalized and the indicator columns appended
    pub table: RecordTable,
    pub summary: SummaryTable,
    pub returns: Vec<Value>,
    pub volatility: Option<f64>,
    pub charts: Vec<PathBuf>,
}

/// Load, clean and summarize a news CSV.
pub fn run_eda<P: AsRef<Path>>(news_path: P, config: &AnalysisConfig) -> Result<EdaReport> {
    let news_path = news_path.as_ref();
    info!(path = %news_path.display(), "starting news EDA");

    let table = load_with_schema(news_path, &TableSchema::news())?;
    let mut table = normalize(table, NEWS_DATE)?;
    let headline_lengths = headline_length_stats(&table, HEADLINE)?;
    let publishers = value_counts(&table, PUBLISHER)?;
    let daily = daily_counts(&table, NEWS_DATE)?;
    let missing = missing_counts(&table);

    let lengths = text_lengths(&table, HEADLINE)?;
    table.set_column(HEADLINE_LENGTH_COLUMN, lengths)?;
    let table = top_terms_with(table, HEADLINE, config.max_features, config.terms_per_row)?;
    let table = extract_domain(table, PUBLISHER)?;
    let domains = domain_counts(&table)?;
    let table = add_sentiment(table, HEADLINE)?;
    let sentiment = sentiment_counts(&table)?;
    let publisher_sentiment = sentiment_by(&table, PUBLISHER)?;

    let domain_articles = match &config.focus_domain {
        Some(domain) => Some(table.filter_eq(DOMAIN_COLUMN, &domain.trim().to_lowercase())?),
        None => None,
    };

    println!("\n--- News Preview ---");
    let preview_columns = [HEADLINE, PUBLISHER, NEWS_DATE, TOP_TERMS_COLUMN, SENTIMENT_COLUMN];
    report::preview_table(&table.select(&preview_columns)?, 5).printstd();
    if let Some(stats) = &headline_lengths {
        println!("\n--- Headline Length ---");
        report::comparison_table(&[(HEADLINE.to_string(), *stats)]).printstd();
    }
    println!("\n--- Top Publishers ---");
    report::counts_table(PUBLISHER, "articles", publishers.head(config.top_n)).printstd();
    println!("\n--- Top Publisher Domains ---");
    report::counts_table("domain", "articles", domains.head(config.top_n)).printstd();
    println!("\n--- Headline Sentiment ---");
    report::counts_table("sentiment", "articles", sentiment.head(sentiment.len())).printstd();
    println!("\n--- Sentiment by Publisher ---");
    let shown = config.top_n.min(publisher_sentiment.len());
    report::sentiment_table(PUBLISHER, &publisher_sentiment[..shown]).printstd();
    if let (Some(domain), Some(articles)) = (&config.focus_domain, &domain_articles) {
        println!("\n--- Articles from {} ({}) ---", domain, articles.len());
        report::preview_table(&articles.select(&preview_columns)?, config.top_n).printstd();
    }
    println!("\n--- Missing Values ---");
    report::counts_table("column", "missing", &missing).printstd();

    let mut rendered = Vec::new();
    if config.render_charts {
        prepare_output_dir(&config.output_dir)?;
        let trend = config.chart_path(PUBLICATION_TREND_PNG);
        charts::plot_publication_trend(&daily, &trend)?;
        rendered.push(trend);
        let bars = config.chart_path(PUBLISHER_DOMAINS_PNG);
        charts::plot_publisher_domains(&domains, config.top_n, &bars)?;
        rendered.push(bars);
    }

    info!(
        rows = table.len(),
        publishers = publishers.len(),
        domains = domains.len(),
        days = daily.len(),
        focus_rows = ?domain_articles.as_ref().map(RecordTable::len),
        "news EDA complete"
    );
    Ok(EdaReport {
        table,
        headline_lengths,
        publishers,
        daily,
        domains,
        sentiment,
        publisher_sentiment,
        domain_articles,
        missing,
        charts: rendered,
    })
}

/// Load a price CSV, add indicators and report volatility.
pub fn run_technical_analysis<P: AsRef<Path>>(
    price_path: P,
    config: &AnalysisConfig,
) -> Result<TechnicalReport> {
    let price_path = price_path.as_ref();
    info!(path = %price_path.display(), "starting technical analysis");

    let table = load_with_schema(price_path, &TableSchema::price())?;
    let table = normalize(table, PRICE_DATE)?;
    let table = add_technical_indicators(table, &config.indicators)?;

    let returns = daily_returns(&table, CLOSE_COLUMN)?;
    let volatility = annualized_volatility(&returns);
    let summary = describe(&table);

    println!("\n--- Price Summary ---");
    report::summary_table(&summary).printstd();
    match volatility {
        Some(v) => println!("Annualized Volatility: {:.4}", v),
        None => println!("Annualized Volatility: NaN"),
    }

    let mut rendered = Vec::new();
    if config.render_charts {
        prepare_output_dir(&config.output_dir)?;
        let path = config.chart_path(TECHNICAL_INDICATORS_PNG);
        charts::plot_technical_indicators(&table, &config.indicators.sma_column(), &path)?;
        rendered.push(path);
    }

    info!(rows = table.len(), ?volatility, "technical analysis complete");
    Ok(TechnicalReport {
        table,
        summary,
        returns,
        volatility,
        charts: rendered,
    })
}

fn prepare_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .map_err(|e| AnalysisError::Chart {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })
        .log_failure("prepare output dir")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn quiet_config() -> AnalysisConfig {
        AnalysisConfig {
            render_charts: false,
            ..AnalysisConfig::default()
        }
    }

    fn csv_file(contents: &str) -> anyhow::Result<NamedTempFile> {
        let mut tmp = NamedTempFile::new()?;
        write!(tmp, "{}", contents)?;
        Ok(tmp)
    }

    #[test]
    fn single_article_eda() -> anyhow::Result<()> {
        let news = csv_file(
            "headline,url,publisher,date,stock\n\
             Stocks rally on earnings,https://x.test/a,test@example.com,2023-01-01 10:00:00-04:00,AAPL\n",
        )?;
        let report = run_eda(news.path(), &quiet_config())?;

        assert_eq!(report.table.len(), 1);
        let date = report.table.get(0, NEWS_DATE).and_then(Value::as_datetime);
        assert_eq!(
            date.map(|d| d.date()),
            NaiveDate::from_ymd_opt(2023, 1, 1)
        );
        assert_eq!(report.daily, vec![(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), 1)]);
        assert_eq!(report.domains.get("example.com"), Some(1));
        assert_eq!(report.publishers.get("test@example.com"), Some(1));
        assert!(report.table.get(0, TOP_TERMS_COLUMN).is_some_and(|v| !v.is_null()));
        assert_eq!(
            report.table.get(0, HEADLINE_LENGTH_COLUMN),
            Some(&Value::Number(24.0))
        );
        assert!(report.table.get(0, SENTIMENT_COLUMN).and_then(Value::as_str).is_some());
        assert_eq!(report.sentiment.total(), 1);
        assert_eq!(report.publisher_sentiment.len(), 1);
        assert!(report.domain_articles.is_none());
        assert!(report.charts.is_empty());
        Ok(())
    }

    #[test]
    fn focus_domain_keeps_its_articles() -> anyhow::Result<()> {
        let news = csv_file(
            "headline,url,publisher,date,stock
             Great quarter,https://x.test/a,ann@example.com,2023-01-01,AAPL
             Shares flat,https://x.test/b,Reuters,2023-01-02,AAPL
             Terrible guidance,https://x.test/c,bob@example.com,2023-01-02,MSFT
",
        )?;
        let config = AnalysisConfig {
            focus_domain: Some(" Example.com ".into()),
            ..quiet_config()
        };
        let report = run_eda(news.path(), &config)?;

        let articles = report.domain_articles.expect("focus domain requested");
        assert_eq!(articles.len(), 2);
        assert!(articles
            .column(DOMAIN_COLUMN)?
            .all(|v| v.as_str() == Some("example.com")));
        assert_eq!(report.table.len(), 3);
        Ok(())
    }

    #[test]
    fn eda_rejects_news_without_publisher() -> anyhow::Result<()> {
        let news = csv_file("headline,date\nhello,2023-01-01\n")?;
        let err = run_eda(news.path(), &quiet_config()).unwrap_err();
        assert!(matches!(err, AnalysisError::Schema { .. }));
        Ok(())
    }

    #[test]
    fn price_indicators_warm_up() -> anyhow::Result<()> {
        let mut csv = String::from("Date,Open,High,Low,Close,Volume\n");
        for i in 0..30 {
            let close = 100 + (i % 3);
            csv.push_str(&format!(
                "2023-01-{:02},{c},{c},{c},{c},1000\n",
                i + 1,
                c = close
            ));
        }
        let prices = csv_file(&csv)?;
        let report = run_technical_analysis(prices.path(), &quiet_config())?;

        assert_eq!(report.table.len(), 30);
        for row in 0..30 {
            let sma = report.table.get(row, "SMA_20").map(Value::is_null);
            assert_eq!(sma, Some(row < 19), "row {}", row);
        }
        assert!(report.returns[0].is_null());
        assert!(report.volatility.is_some_and(|v| v > 0.0));
        assert_eq!(report.summary.get("Close").map(|s| s.count), Some(30));
        Ok(())
    }

    #[test]
    fn missing_price_file() {
        let err = run_technical_analysis("no/such/prices.csv", &quiet_config()).unwrap_err();
        assert!(matches!(err, AnalysisError::NotFound { .. }));
    }
}
