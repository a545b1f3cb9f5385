use tracing::{debug, info};
use url::Url;

use crate::analysis::news::ValueCounts;
use crate::error::{LogFailure, Result};
use crate::table::{RecordTable, Value};

pub const DOMAIN_COLUMN: &str = "domain";

/// Domain → article count, highest first.
pub type DomainCounts = ValueCounts;

/// Host part of an email address or URL, lower-cased.
///
/// `scheme://host/...` yields the URL host; otherwise the text after the last
/// `@`. Anything carrying neither marker has no domain.
pub fn domain_of(identifier: &str) -> Option<String> {
    let s = identifier.trim();

    let domain = if let Some(pos) = s.find("://") {
        match Url::parse(s).ok().and_then(|u| u.host_str().map(str::to_string)) {
            Some(host) => host,
            None => {
                let rest = &s[pos + 3..];
                let rest = rest.rsplit('@').next().unwrap_or(rest);
                let end = rest.find(['/', '?', '#', ':']).unwrap_or(rest.len());
                rest[..end].to_string()
            }
        }
    } else if let Some(pos) = s.rfind('@') {
        s[pos + 1..].to_string()
    } else {
        return None;
    };

    let domain = domain.trim().to_lowercase();
    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}

/// Add a `domain` column derived from `identifier_column`.
///
/// Rows without a recognizable domain get null; that is a default, not an error.
pub fn extract_domain(mut table: RecordTable, identifier_column: &str) -> Result<RecordTable> {
    let domains: Vec<Value> = table
        .column(identifier_column)
        .log_failure("extract_domain")?
        .map(|v| Value::from(v.as_str().and_then(domain_of)))
        .collect();

    let unmatched = domains.iter().filter(|v| v.is_null()).count();
    if unmatched > 0 {
        debug!(column = identifier_column, unmatched, "rows without a domain");
    }

    table.set_column(DOMAIN_COLUMN, domains)?;
    info!(column = identifier_column, "extracted publisher domains");
    Ok(table)
}

/// Counts of the non-null `domain` values.
pub fn domain_counts(table: &RecordTable) -> Result<DomainCounts> {
    crate::analysis::news::value_counts(table, DOMAIN_COLUMN).log_failure("domain_counts")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_and_url_domains() {
        assert_eq!(domain_of("test@example.com"), Some("example.com".into()));
        assert_eq!(domain_of("Jane.Doe@News.Example.COM "), Some("news.example.com".into()));
        assert_eq!(domain_of("a@b@Last.org"), Some("last.org".into()));
        assert_eq!(
            domain_of("https://www.Benzinga.com/news/123?x=1"),
            Some("www.benzinga.com".into())
        );
        assert_eq!(domain_of("http://user@feeds.example.org:8080/"), Some("feeds.example.org".into()));
    }

    #[test]
    fn no_marker_means_no_domain() {
        assert_eq!(domain_of("Benzinga Newsdesk"), None);
        assert_eq!(domain_of("trailing@"), None);
        assert_eq!(domain_of(""), None);
    }

    #[test]
    fn extract_and_count() {
        let table = RecordTable::new(
            vec!["publisher".into()],
            ["a@x.com", "Reuters", "b@y.com", "c@x.com", "", "https://y.com/feed"]
                .iter()
                .map(|p| {
                    vec![if p.is_empty() {
                        Value::Null
                    } else {
                        Value::Text(p.to_string())
                    }]
                })
                .collect(),
        )
        .unwrap();

        let table = extract_domain(table, "publisher").unwrap();
        assert_eq!(table.get(0, DOMAIN_COLUMN), Some(&Value::Text("x.com".into())));
        assert_eq!(table.get(1, DOMAIN_COLUMN), Some(&Value::Null));
        assert_eq!(table.get(4, DOMAIN_COLUMN), Some(&Value::Null));

        let counts = domain_counts(&table).unwrap();
        let ordered: Vec<(&str, usize)> = counts.iter().collect();
        assert_eq!(ordered, vec![("x.com", 2), ("y.com", 2)]);

        let only_x = table.filter_eq(DOMAIN_COLUMN, "x.com").unwrap();
        assert_eq!(only_x.len(), 2);
    }
}
