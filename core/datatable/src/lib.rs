//! FILENAME: core/datatable/src/lib.rs
//! PURPOSE: Main library entry point for the typed table crate.
//! CONTEXT: Re-exports public types and modules for use by the pivot engine.

pub mod cell;
pub mod error;
pub mod number_format;
pub mod table;

// Re-export commonly used types at the crate root
pub use cell::{Cell, CellError, CellValue};
pub use error::TableError;
pub use number_format::{
    add_thousands_separator, format_currency, format_decimal, format_percentage,
};
pub use table::{Column, ColumnType, DataTable, Table};
