use crate::analysis::describe::describe_values;
use crate::error::Result;
use crate::table::{RecordTable, Value};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Simple period-over-period returns of a price column.
///
/// The first row, and any row next to a missing price, is null.
pub fn daily_returns(table: &RecordTable, column: &str) -> Result<Vec<Value>> {
    let prices: Vec<Option<f64>> = table.column(column)?.map(Value::as_f64).collect();
    let mut returns = Vec::with_capacity(prices.len());
    returns.push(Value::Null);
    for pair in prices.windows(2) {
        let r = match (pair[0], pair[1]) {
            (Some(prev), Some(cur)) if prev != 0.0 => Some(cur / prev - 1.0),
            _ => None,
        };
        returns.push(Value::from(r));
    }
    returns.truncate(prices.len());
    Ok(returns)
}

/// Sample standard deviation of the non-null returns, scaled by √252.
///
/// `None` when fewer than two returns exist.
pub fn annualized_volatility(returns: &[Value]) -> Option<f64> {
    let values: Vec<f64> = returns.iter().filter_map(Value::as_f64).collect();
    let summary = describe_values(&values)?;
    if summary.std.is_nan() {
        return None;
    }
    Some(summary.std * TRADING_DAYS_PER_YEAR.sqrt())
}
