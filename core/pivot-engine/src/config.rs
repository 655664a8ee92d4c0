//! FILENAME: core/pivot-engine/src/config.rs
//! Runtime pivot configuration.
//!
//! Unlike `definition`, these types carry live callables (aggregators,
//! transforms, formatters) and are what `PivotBuilder` consumes. Callables
//! must be pure: the builder may call them any number of times.

use std::fmt;
use std::rc::Rc;

use datatable::{CellValue, ColumnType};
use serde::{Deserialize, Serialize};

use crate::error::{PivotError, Result};
use crate::format::Formatter;

/// Index into the source table columns (0-based).
pub type FieldIndex = usize;

/// Reduces the raw values collected for one cell to a single value.
pub type Aggregator = Rc<dyn Fn(&[CellValue]) -> CellValue>;

/// Maps a raw value to the value used for grouping or as a column title.
pub type ValueTransform = Rc<dyn Fn(&CellValue) -> CellValue>;

/// Wraps a closure as an `Aggregator`.
pub fn aggregator<F>(f: F) -> Aggregator
where
    F: Fn(&[CellValue]) -> CellValue + 'static,
{
    Rc::new(f)
}

/// Wraps a closure as a `ValueTransform`.
pub fn value_transform<F>(f: F) -> ValueTransform
where
    F: Fn(&CellValue) -> CellValue + 'static,
{
    Rc::new(f)
}

// ============================================================================
// COLUMN SPECS
// ============================================================================

/// A source column whose values form part of the output row identity.
#[derive(Clone)]
pub struct KeyColumn {
    pub column_index: FieldIndex,
    pub value_transform: Option<ValueTransform>,
    /// Overrides the source column type. `ColumnType::String` also coerces
    /// key values to their display string.
    pub declared_type: Option<ColumnType>,
}

impl KeyColumn {
    pub fn new(column_index: FieldIndex) -> Self {
        KeyColumn {
            column_index,
            value_transform: None,
            declared_type: None,
        }
    }

    pub fn with_transform(mut self, transform: ValueTransform) -> Self {
        self.value_transform = Some(transform);
        self
    }

    pub fn with_declared_type(mut self, column_type: ColumnType) -> Self {
        self.declared_type = Some(column_type);
        self
    }
}

/// The column whose distinct values become generated output columns.
#[derive(Clone)]
pub struct PivotSource {
    pub column_index: FieldIndex,
    /// See `PivotBuilder::add_pivot_columns`: `false` yields descending
    /// display order.
    pub sort_descending: bool,
    pub aggregator: Aggregator,
    pub column_title_transform: Option<ValueTransform>,
    pub formatters: Vec<Rc<dyn Formatter>>,
}

impl PivotSource {
    pub fn new(column_index: FieldIndex, aggregator: Aggregator) -> Self {
        PivotSource {
            column_index,
            sort_descending: false,
            aggregator,
            column_title_transform: None,
            formatters: Vec::new(),
        }
    }

    pub fn sort_descending(mut self, sort_descending: bool) -> Self {
        self.sort_descending = sort_descending;
        self
    }

    pub fn with_title_transform(mut self, transform: ValueTransform) -> Self {
        self.column_title_transform = Some(transform);
        self
    }

    pub fn with_formatter(mut self, formatter: Rc<dyn Formatter>) -> Self {
        self.formatters.push(formatter);
        self
    }
}

/// The source column supplying the values being aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueColumn {
    pub column_index: FieldIndex,
}

impl ValueColumn {
    pub fn new(column_index: FieldIndex) -> Self {
        ValueColumn { column_index }
    }
}

/// When summary columns are computed relative to percent conversion and formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyOrder {
    Before,
    After,
}

/// An extra column aggregating across a row's generated columns.
#[derive(Clone)]
pub struct SummaryColumn {
    pub label: String,
    pub aggregator: Aggregator,
    pub formatters: Vec<Rc<dyn Formatter>>,
    pub apply_order: Option<ApplyOrder>,
}

impl SummaryColumn {
    pub fn new(label: impl Into<String>, aggregator: Aggregator) -> Self {
        SummaryColumn {
            label: label.into(),
            aggregator,
            formatters: Vec::new(),
            apply_order: None,
        }
    }

    pub fn apply_order(mut self, order: ApplyOrder) -> Self {
        self.apply_order = Some(order);
        self
    }

    pub fn with_formatter(mut self, formatter: Rc<dyn Formatter>) -> Self {
        self.formatters.push(formatter);
        self
    }
}

/// Percent-of-total normalization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PercentOfTotal {
    Row,
    Col,
}

// ============================================================================
// PIVOT CONFIG
// ============================================================================

/// Complete configuration for one pivot build.
/// The three mandatory groups are optional here so that a missing group is
/// reported by `validate` rather than being unrepresentable.
#[derive(Clone, Default)]
pub struct PivotConfig {
    pub key_columns: Option<Vec<KeyColumn>>,
    pub pivot_source: Option<PivotSource>,
    pub value_column: Option<ValueColumn>,
    pub summary_columns: Vec<SummaryColumn>,
    pub percent_of_total: Option<PercentOfTotal>,
}

impl PivotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_columns(mut self, key_columns: Vec<KeyColumn>) -> Self {
        self.key_columns = Some(key_columns);
        self
    }

    pub fn pivot_source(mut self, pivot_source: PivotSource) -> Self {
        self.pivot_source = Some(pivot_source);
        self
    }

    pub fn value_column(mut self, value_column: ValueColumn) -> Self {
        self.value_column = Some(value_column);
        self
    }

    pub fn summary_column(mut self, summary: SummaryColumn) -> Self {
        self.summary_columns.push(summary);
        self
    }

    pub fn percent_of_total(mut self, mode: PercentOfTotal) -> Self {
        self.percent_of_total = Some(mode);
        self
    }

    /// Checks that every mandatory group is present.
    pub fn validate(&self) -> Result<()> {
        if self.key_columns.is_none() {
            return Err(PivotError::MissingConfiguration("keyColumns"));
        }
        if self.pivot_source.is_none() {
            return Err(PivotError::MissingConfiguration("pivotSource"));
        }
        if self.value_column.is_none() {
            return Err(PivotError::MissingConfiguration("valueColumn"));
        }
        Ok(())
    }

    /// Summary columns run before post-processing only when the first entry
    /// asks for it; the flag governs the whole batch.
    pub fn summaries_first(&self) -> bool {
        matches!(
            self.summary_columns.first().and_then(|s| s.apply_order),
            Some(ApplyOrder::Before)
        )
    }
}

impl fmt::Debug for KeyColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyColumn")
            .field("column_index", &self.column_index)
            .field("has_transform", &self.value_transform.is_some())
            .field("declared_type", &self.declared_type)
            .finish()
    }
}

impl fmt::Debug for PivotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PivotSource")
            .field("column_index", &self.column_index)
            .field("sort_descending", &self.sort_descending)
            .field("has_title_transform", &self.column_title_transform.is_some())
            .field("formatters", &self.formatters.len())
            .finish()
    }
}

impl fmt::Debug for SummaryColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryColumn")
            .field("label", &self.label)
            .field("apply_order", &self.apply_order)
            .field("formatters", &self.formatters.len())
            .finish()
    }
}

impl fmt::Debug for PivotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PivotConfig")
            .field("key_columns", &self.key_columns)
            .field("pivot_source", &self.pivot_source)
            .field("value_column", &self.value_column)
            .field("summary_columns", &self.summary_columns)
            .field("percent_of_total", &self.percent_of_total)
            .finish()
    }
}
