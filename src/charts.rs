//! The three fixed PNG renderings. Files are overwritten on every run.

use chrono::NaiveDate;
use plotters::prelude::*;
use std::{error::Error, path::Path};
use tracing::info;

use crate::analysis::{
    indicators::{
        CLOSE_COLUMN, MACD_COLUMN, MACD_HIST_COLUMN, MACD_SIGNAL_COLUMN, RSI_COLUMN,
    },
    DomainCounts,
};
use crate::error::{AnalysisError, LogFailure, Result};
use crate::table::RecordTable;

pub const PUBLICATION_TREND_PNG: &str = "publication_trend.png";
pub const PUBLISHER_DOMAINS_PNG: &str = "publisher_domains.png";
pub const TECHNICAL_INDICATORS_PNG: &str = "technical_indicators.png";

const PURPLE: RGBColor = RGBColor(128, 0, 128);
const ORANGE: RGBColor = RGBColor(255, 165, 0);

type DrawResult = std::result::Result<(), Box<dyn Error>>;

fn finish(path: &Path, operation: &str, drawn: DrawResult) -> Result<()> {
    drawn
        .map_err(|e| AnalysisError::Chart {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
        .log_failure(operation)?;
    info!(path = %path.display(), "rendered chart");
    Ok(())
}

/// (min, max) of the values, padded so flat series still get a visible range.
fn value_range<I: IntoIterator<Item = f64>>(values: I) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(1e-6);
    (lo - pad, hi + pad)
}

/// Defined points of a column as (row index, value).
fn series(table: &RecordTable, column: &str) -> Result<Vec<(f64, f64)>> {
    Ok(table
        .column(column)?
        .enumerate()
        .filter_map(|(i, v)| v.as_f64().map(|y| (i as f64, y)))
        .collect())
}

/// Article publication frequency over time.
pub fn plot_publication_trend(daily: &[(NaiveDate, usize)], path: &Path) -> Result<()> {
    finish(path, "plot_publication_trend", draw_publication_trend(daily, path))
}

fn draw_publication_trend(daily: &[(NaiveDate, usize)], path: &Path) -> DrawResult {
    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let first = daily.first().map(|(d, _)| *d);
    let offset = |d: &NaiveDate| first.map(|f| (*d - f).num_days() as f64).unwrap_or(0.0);
    let points: Vec<(f64, f64)> = daily.iter().map(|(d, c)| (offset(d), *c as f64)).collect();

    let x_max = points.last().map(|(x, _)| x.max(1.0)).unwrap_or(1.0);
    let y_max = points.iter().map(|(_, y)| *y).fold(1.0, f64::max) * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption("Article Publication Frequency Over Time", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)?;

    let date_label = |x: &f64| match first {
        Some(f) => (f + chrono::Duration::days(x.round() as i64)).to_string(),
        None => String::new(),
    };
    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Number of Articles")
        .x_label_formatter(&date_label)
        .draw()?;

    chart.draw_series(LineSeries::new(points, &BLUE))?;
    root.present()?;
    Ok(())
}

/// Horizontal bars for the top `top_n` publisher domains.
pub fn plot_publisher_domains(counts: &DomainCounts, top_n: usize, path: &Path) -> Result<()> {
    finish(
        path,
        "plot_publisher_domains",
        draw_publisher_domains(counts, top_n, path),
    )
}

fn draw_publisher_domains(counts: &DomainCounts, top_n: usize, path: &Path) -> DrawResult {
    let top = counts.head(top_n);
    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let n = top.len().max(1) as f64;
    let x_max = top.iter().map(|(_, c)| *c as f64).fold(1.0, f64::max) * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Top {} Publisher Domains", top_n), ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(200)
        .build_cartesian_2d(0f64..x_max, 0f64..n)?;

    // bar i sits in [n - i - 1, n - i), so the largest is drawn on top
    let domain_label = |y: &f64| {
        let slot = (n - y.floor() - 1.0) as usize;
        match top.get(slot) {
            Some((domain, _)) if y.fract() == 0.0 => domain.clone(),
            _ => String::new(),
        }
    };
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(top.len().max(1) * 2)
        .y_label_formatter(&domain_label)
        .x_desc("Number of Articles")
        .draw()?;

    chart.draw_series(top.iter().enumerate().map(|(i, (_, count))| {
        let y = n - i as f64 - 1.0;
        Rectangle::new([(0.0, y + 0.1), (*count as f64, y + 0.9)], BLUE.mix(0.7).filled())
    }))?;
    root.present()?;
    Ok(())
}

/// Close price with SMA, RSI with 70/30 guides, and MACD with signal and histogram.
pub fn plot_technical_indicators(table: &RecordTable, sma_column: &str, path: &Path) -> Result<()> {
    let close = series(table, CLOSE_COLUMN)?;
    let sma = series(table, sma_column)?;
    let rsi = series(table, RSI_COLUMN)?;
    let macd = series(table, MACD_COLUMN)?;
    let signal = series(table, MACD_SIGNAL_COLUMN)?;
    let hist = series(table, MACD_HIST_COLUMN)?;
    let drawn = draw_technical_indicators(
        table.len(),
        sma_column,
        [&close, &sma, &rsi, &macd, &signal, &hist],
        path,
    );
    finish(path, "plot_technical_indicators", drawn)
}

fn draw_technical_indicators(
    rows: usize,
    sma_column: &str,
    [close, sma, rsi, macd, signal, hist]: [&Vec<(f64, f64)>; 6],
    path: &Path,
) -> DrawResult {
    let root = BitMapBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((3, 1));
    let x_max = rows.max(2) as f64 - 1.0;
    let ys = |s: &[&Vec<(f64, f64)>]| {
        value_range(s.iter().flat_map(|points| points.iter().map(|(_, y)| *y)))
    };

    // price + SMA
    let (lo, hi) = ys(&[close, sma]);
    let mut price = ChartBuilder::on(&panels[0])
        .caption("Stock Price and SMA", ("sans-serif", 20))
        .margin(8)
        .x_label_area_size(25)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..x_max, lo..hi)?;
    price.configure_mesh().draw()?;
    price
        .draw_series(LineSeries::new(close.iter().copied(), &BLUE))?
        .label("Close Price")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
    price
        .draw_series(LineSeries::new(sma.iter().copied(), &ORANGE))?
        .label(format!("{} SMA", sma_column))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &ORANGE));
    price
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    // RSI
    let mut momentum = ChartBuilder::on(&panels[1])
        .caption("Relative Strength Index (RSI)", ("sans-serif", 20))
        .margin(8)
        .x_label_area_size(25)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..x_max, 0f64..100f64)?;
    momentum.configure_mesh().draw()?;
    momentum
        .draw_series(LineSeries::new(rsi.iter().copied(), &PURPLE))?
        .label("RSI")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &PURPLE));
    for (level, color) in [(70.0, RED), (30.0, GREEN)] {
        momentum.draw_series(LineSeries::new(
            vec![(0.0, level), (x_max, level)],
            color.mix(0.5).stroke_width(1),
        ))?;
    }
    momentum
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    // MACD
    let (lo, hi) = ys(&[macd, signal, hist]);
    let (lo, hi) = (lo.min(0.0), hi.max(0.0));
    let mut trend = ChartBuilder::on(&panels[2])
        .caption("MACD", ("sans-serif", 20))
        .margin(8)
        .x_label_area_size(25)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..x_max, lo..hi)?;
    trend.configure_mesh().draw()?;
    trend.draw_series(
        hist.iter()
            .map(|&(x, h)| Rectangle::new([(x - 0.4, 0.0), (x + 0.4, h)], BLACK.mix(0.3).filled())),
    )?;
    trend
        .draw_series(LineSeries::new(macd.iter().copied(), &BLUE))?
        .label("MACD")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
    trend
        .draw_series(LineSeries::new(signal.iter().copied(), &ORANGE))?
        .label("Signal Line")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &ORANGE));
    trend
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
