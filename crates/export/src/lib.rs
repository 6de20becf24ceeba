pub mod csv;
pub mod json;
pub mod text;

pub use csv::{infer_columns, write_csv_records};
pub use json::write_json_records;
pub use text::write_text;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
