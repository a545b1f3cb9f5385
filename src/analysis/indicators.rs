//! Technical indicators over the `Close` column.
//!
//! The formulas come from the `ta` crate; this module only feeds it the price
//! series and nulls the warm-up rows where a window is not yet full.

use serde::{Deserialize, Serialize};
use ta::{
    indicators::{
        ExponentialMovingAverage, MovingAverageConvergenceDivergence, RelativeStrengthIndex,
        SimpleMovingAverage,
    },
    Next,
};
use tracing::info;

use crate::error::{AnalysisError, LogFailure, Result};
use crate::table::{RecordTable, Value};

pub const CLOSE_COLUMN: &str = "Close";
pub const RSI_COLUMN: &str = "RSI";
pub const MACD_COLUMN: &str = "MACD";
pub const MACD_SIGNAL_COLUMN: &str = "MACD_Signal";
pub const MACD_HIST_COLUMN: &str = "MACD_Hist";

/// Indicator windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub sma_window: usize,
    pub ema_window: usize,
    pub rsi_window: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_window: 20,
            ema_window: 20,
            rsi_window: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
        }
    }
}

impl IndicatorParams {
    pub fn validate(&self) -> Result<()> {
        let windows = [
            ("sma_window", self.sma_window),
            ("ema_window", self.ema_window),
            ("rsi_window", self.rsi_window),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
        ];
        if let Some((name, _)) = windows.iter().find(|(_, w)| *w == 0) {
            return Err(AnalysisError::Indicator(format!("{} must be greater than 0", name)));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(AnalysisError::Indicator(format!(
                "macd_fast ({}) must be smaller than macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        Ok(())
    }

    pub fn sma_column(&self) -> String {
        format!("SMA_{}", self.sma_window)
    }

    pub fn ema_column(&self) -> String {
        format!("EMA_{}", self.ema_window)
    }
}

/// Append SMA, EMA, RSI and MACD (line, signal, histogram) columns.
///
/// Warm-up rows are null: SMA/EMA before `window - 1`, RSI before `window`,
/// the MACD line before `slow - 1`, signal and histogram before
/// `slow + signal - 2`.
pub fn add_technical_indicators(mut table: RecordTable, params: &IndicatorParams) -> Result<RecordTable> {
    params.validate().log_failure("indicators")?;
    let closes = close_prices(&table).log_failure("indicators")?;

    let sma = run_indicator(
        &closes,
        SimpleMovingAverage::new(params.sma_window).map_err(ta_err)?,
        params.sma_window - 1,
    );
    let ema = run_indicator(
        &closes,
        ExponentialMovingAverage::new(params.ema_window).map_err(ta_err)?,
        params.ema_window - 1,
    );
    let rsi = run_indicator(
        &closes,
        RelativeStrengthIndex::new(params.rsi_window).map_err(ta_err)?,
        params.rsi_window,
    );

    let mut macd = MovingAverageConvergenceDivergence::new(
        params.macd_fast,
        params.macd_slow,
        params.macd_signal,
    )
    .map_err(ta_err)?;
    let line_warmup = params.macd_slow - 1;
    let signal_warmup = params.macd_slow + params.macd_signal - 2;
    let mut macd_line = Vec::with_capacity(closes.len());
    let mut macd_signal = Vec::with_capacity(closes.len());
    let mut macd_hist = Vec::with_capacity(closes.len());
    for (i, &close) in closes.iter().enumerate() {
        let out = macd.next(close);
        macd_line.push(warm(i, line_warmup, out.macd));
        macd_signal.push(warm(i, signal_warmup, out.signal));
        macd_hist.push(warm(i, signal_warmup, out.histogram));
    }

    table.set_column(&params.sma_column(), sma)?;
    table.set_column(&params.ema_column(), ema)?;
    table.set_column(RSI_COLUMN, rsi)?;
    table.set_column(MACD_COLUMN, macd_line)?;
    table.set_column(MACD_SIGNAL_COLUMN, macd_signal)?;
    table.set_column(MACD_HIST_COLUMN, macd_hist)?;

    info!(rows = table.len(), "computed technical indicators");
    Ok(table)
}

/// Every `Close` value as f64; a null or non-numeric price is an error.
fn close_prices(table: &RecordTable) -> Result<Vec<f64>> {
    table
        .column(CLOSE_COLUMN)?
        .enumerate()
        .map(|(row, v)| {
            v.as_f64().ok_or_else(|| {
                AnalysisError::Indicator(format!(
                    "`{}` at row {} is `{}`, expected a number",
                    CLOSE_COLUMN, row, v
                ))
            })
        })
        .collect()
}

fn run_indicator<I>(closes: &[f64], mut indicator: I, warmup: usize) -> Vec<Value>
where
    I: Next<f64, Output = f64>,
{
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| warm(i, warmup, indicator.next(c)))
        .collect()
}

fn warm(index: usize, warmup: usize, value: f64) -> Value {
    if index < warmup || !value.is_finite() {
        Value::Null
    } else {
        Value::Number(value)
    }
}

fn ta_err(e: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::Indicator(e.to_string())
}
