use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use newsquant::{logging, pipeline, AnalysisConfig};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "newsquant", version, about = "Exploratory analysis of stock news and prices")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for chart images
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Skip rendering charts
    #[arg(long, global = true)]
    no_charts: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// News EDA: publishers, publication trend, top terms, domains
    Eda {
        /// News CSV (defaults to `news_path` from the config)
        news: Option<PathBuf>,

        /// Also preview the articles of one publisher domain
        #[arg(long, value_name = "DOMAIN")]
        domain: Option<String>,
    },
    /// Technical indicators and volatility for one price CSV
    Technical {
        /// Price CSV (defaults to `price_path` from the config)
        prices: Option<PathBuf>,
    },
    /// Both runs, on the configured paths
    All,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    logging::init("info");
    let cli = Cli::parse();
    info!(command = ?cli.command, "startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if cli.no_charts {
        config.render_charts = false;
    }

    // ─── 3) run ──────────────────────────────────────────────────────
    match cli.command {
        Command::Eda { news, domain } => {
            if domain.is_some() {
                config.focus_domain = domain;
            }
            let path = news.unwrap_or_else(|| config.news_path.clone());
            run_eda(&path, &config)?;
        }
        Command::Technical { prices } => {
            let path = prices.unwrap_or_else(|| config.price_path.clone());
            run_technical(&path, &config)?;
        }
        Command::All => {
            run_eda(&config.news_path, &config)?;
            run_technical(&config.price_path, &config)?;
        }
    }

    info!("done");
    Ok(())
}

fn run_eda(path: &Path, config: &AnalysisConfig) -> Result<()> {
    let report = pipeline::run_eda(path, config)
        .with_context(|| format!("news EDA on {}", path.display()))?;
    for chart in &report.charts {
        println!("wrote {}", chart.display());
    }
    Ok(())
}

fn run_technical(path: &Path, config: &AnalysisConfig) -> Result<()> {
    let report = pipeline::run_technical_analysis(path, config)
        .with_context(|| format!("technical analysis on {}", path.display()))?;
    for chart in &report.charts {
        println!("wrote {}", chart.display());
    }
    Ok(())
}
