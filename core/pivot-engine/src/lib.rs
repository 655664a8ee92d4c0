//! FILENAME: core/pivot-engine/src/lib.rs
//! Pivot table builder.
//!
//! Turns raw observation rows (one row per measurement) into a summary table
//! with one row per distinct key tuple and one column per distinct value of
//! a chosen pivot column. Depends on `datatable` for the shared table types.
//!
//! Layers:
//! - `config`: Runtime configuration carrying live callables
//! - `definition`: Serializable configuration resolved into a `PivotConfig`
//! - `aggregation` / `transform` / `format`: Built-in building blocks
//! - `model`: Grouping structures (row identity, collected values)
//! - `engine`: The `PivotBuilder` (HOW we calculate)
//! - `utils`: Row/column extraction and percent-of-total helpers

pub mod aggregation;
pub mod config;
pub mod definition;
pub mod engine;
pub mod error;
pub mod format;
pub mod model;
pub mod transform;
pub mod utils;

pub use aggregation::AggregateAccumulator;
pub use config::*;
pub use definition::*;
pub use engine::{build_pivot, ColumnStatus, PivotBuilder};
pub use error::{PivotError, Result};
pub use format::*;
pub use model::{GroupKey, KeyValue, OrderedFloat, PivotModel};
