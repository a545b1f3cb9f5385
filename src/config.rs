//! Run configuration, read from YAML. Every field has a default.

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::analysis::IndicatorParams;
use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// News CSV (`headline`, `publisher`, `date`)
    pub news_path: PathBuf,
    /// Price CSV (`Date`, `Open`, `High`, `Low`, `Close`, `Volume`)
    pub price_path: PathBuf,
    /// Where chart images are written
    pub output_dir: PathBuf,
    pub render_charts: bool,
    /// Vocabulary cap for top-term extraction
    pub max_features: usize,
    pub terms_per_row: usize,
    /// Rows shown in console rankings and the domain chart
    pub top_n: usize,
    /// Publisher domain whose articles get their own preview
    pub focus_domain: Option<String>,
    pub indicators: IndicatorParams,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            news_path: PathBuf::from("news_data.csv"),
            price_path: PathBuf::from("stock_data.csv"),
            output_dir: PathBuf::from("."),
            render_charts: true,
            max_features: 1000,
            terms_per_row: 3,
            top_n: 10,
            focus_domain: None,
            indicators: IndicatorParams::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| AnalysisError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            AnalysisError::Config(format!("reading {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml_str(&text)?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_features == 0 {
            return Err(AnalysisError::Config(
                "max_features must be greater than 0".to_string(),
            ));
        }
        if self.top_n == 0 {
            return Err(AnalysisError::Config("top_n must be greater than 0".to_string()));
        }
        self.indicators
            .validate()
            .map_err(|e| AnalysisError::Config(e.to_string()))
    }

    pub fn chart_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}
