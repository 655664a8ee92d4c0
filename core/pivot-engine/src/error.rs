//! FILENAME: core/pivot-engine/src/error.rs

use datatable::TableError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PivotError {
    #[error("Missing pivot configuration: {0}")]
    MissingConfiguration(&'static str),

    #[error("Pivot value '{0}' does not map to a generated column")]
    UnresolvedPivotValue(String),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Invalid pivot definition: {0}")]
    Definition(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PivotError>;
