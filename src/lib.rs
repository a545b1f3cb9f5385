pub mod analysis;
pub mod charts;
pub mod config;
pub mod error;
pub mod load;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod table;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, LogFailure, Result};
pub use load::{load, load_with_schema, normalize};
pub use pipeline::{run_eda, run_technical_analysis, EdaReport, TechnicalReport};
pub use schema::{ColumnKind, TableSchema};
pub use table::{RecordTable, Value};
