//! FILENAME: core/datatable/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("Row {row} out of range (table has {rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("Column {col} out of range (table has {cols} columns)")]
    ColumnOutOfRange { col: usize, cols: usize },

    #[error("Row has {found} values but table has {expected} columns")]
    RowWidthMismatch { expected: usize, found: usize },
}
