//! FILENAME: core/pivot-engine/src/engine.rs
//! Pivot Engine - turns raw observation rows into a pivoted summary table.
//!
//! This module takes a source `Table` and a `PivotConfig` and produces a
//! `DataTable` with one row per distinct key tuple and one generated column
//! per distinct pivot value.
//!
//! Algorithm (strict order):
//! 1. Project the key columns onto the output schema
//! 2. Generate one output column per distinct (transformed) pivot value
//! 3. Group: a single pass over the source collects raw values per
//!    (output row, output column)
//! 4. Aggregate each collected list into its output cell
//! 5. Post-process: summary columns, percent-of-total, formatting. Summary
//!    columns run first only when the first summary entry asks for it.

use datatable::{CellValue, ColumnType, DataTable, Table};
use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::config::{
    FieldIndex, KeyColumn, PercentOfTotal, PivotConfig, PivotSource, SummaryColumn, ValueColumn,
};
use crate::error::{PivotError, Result};
use crate::model::{GroupKey, PivotModel};
use crate::utils::{
    column_values, convert_columns_to_percent, convert_rows_to_percent, numeric_sum, row_values,
};

// ============================================================================
// DIAGNOSTICS
// ============================================================================

/// Per generated column: its label and how many output rows received at
/// least one source value for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnStatus {
    pub label: String,
    pub entries: usize,
}

// ============================================================================
// VALIDATED CONFIGURATION
// ============================================================================

/// A `PivotConfig` whose mandatory groups are known to be present.
struct PivotPlan {
    key_columns: Vec<KeyColumn>,
    pivot_source: PivotSource,
    value_column: ValueColumn,
    summary_columns: Vec<SummaryColumn>,
    percent_of_total: Option<PercentOfTotal>,
    summaries_first: bool,
}

impl TryFrom<PivotConfig> for PivotPlan {
    type Error = PivotError;

    /// Missing groups are reported in the same order as `PivotConfig::validate`.
    fn try_from(config: PivotConfig) -> Result<Self> {
        let summaries_first = config.summaries_first();
        Ok(PivotPlan {
            key_columns: config
                .key_columns
                .ok_or(PivotError::MissingConfiguration("keyColumns"))?,
            pivot_source: config
                .pivot_source
                .ok_or(PivotError::MissingConfiguration("pivotSource"))?,
            value_column: config
                .value_column
                .ok_or(PivotError::MissingConfiguration("valueColumn"))?,
            summary_columns: config.summary_columns,
            percent_of_total: config.percent_of_total,
            summaries_first,
        })
    }
}

// ============================================================================
// PIVOT BUILDER
// ============================================================================

/// Builds a pivoted table. All work happens in `new`; the finished table and
/// the intermediate structures are available through the accessors.
pub struct PivotBuilder {
    plan: PivotPlan,

    /// The output table.
    table: DataTable,

    /// Output row -> output column -> collected raw values.
    model: PivotModel,

    /// Composite key tuple -> output row, in first-seen order.
    key_map: FxHashMap<GroupKey, usize>,

    /// Display string of the (transformed) pivot value -> output column.
    column_map: FxHashMap<String, usize>,

    /// (source column, output column) for each key column entry.
    key_columns: Vec<(FieldIndex, usize)>,

    /// Output indices of the generated pivot columns, in display order.
    pivot_columns: Vec<usize>,

    /// Output indices of the summary columns.
    summary_columns: Vec<usize>,

    /// Aggregated results per output row, in column-iteration order.
    aggregated: Vec<Vec<CellValue>>,

    /// Sum of aggregated values per generated column (before percent conversion).
    column_totals: Vec<f64>,

    column_status: Vec<ColumnStatus>,
}

impl PivotBuilder {
    /// Validates `config` and runs the whole pivot against `source`.
    pub fn new<S: Table + ?Sized>(source: &S, config: PivotConfig) -> Result<Self> {
        let plan = PivotPlan::try_from(config)?;

        let mut builder = PivotBuilder {
            plan,
            table: DataTable::new(),
            model: PivotModel::new(),
            key_map: FxHashMap::default(),
            column_map: FxHashMap::default(),
            key_columns: Vec::new(),
            pivot_columns: Vec::new(),
            summary_columns: Vec::new(),
            aggregated: Vec::new(),
            column_totals: Vec::new(),
            column_status: Vec::new(),
        };
        builder.build(source)?;
        Ok(builder)
    }

    fn build<S: Table + ?Sized>(&mut self, source: &S) -> Result<()> {
        // Step 1-2: Output schema
        self.add_key_columns(source)?;
        self.add_pivot_columns(source)?;

        // Step 3: Grouping pass
        self.build_model(source)?;

        // Step 4: Aggregation pass
        self.write_aggregates()?;
        self.collect_column_diagnostics()?;

        // Step 5: Post-processing
        debug!(
            "pivot post-processing: summaries {} percent/format",
            if self.plan.summaries_first { "before" } else { "after" }
        );
        if self.plan.summaries_first {
            self.add_summary_columns()?;
        }
        self.apply_percent_of_total()?;
        self.apply_formatters()?;
        if !self.plan.summaries_first {
            self.add_summary_columns()?;
        }

        Ok(())
    }

    // ========================================================================
    // SCHEMA CONSTRUCTION
    // ========================================================================

    /// Appends one output column per key column entry, in order. Duplicate
    /// entries produce duplicate columns.
    fn add_key_columns<S: Table + ?Sized>(&mut self, source: &S) -> Result<()> {
        for key in &self.plan.key_columns {
            let label = source.column_label(key.column_index)?;
            let column_type = match key.declared_type {
                Some(declared) => declared,
                None => source.column_type(key.column_index)?,
            };
            let output = self.table.add_column(column_type, label);
            self.key_columns.push((key.column_index, output));
        }
        debug!("pivot key columns: {:?}", self.key_columns);
        Ok(())
    }

    /// Appends one output column per distinct pivot value.
    ///
    /// Distinct values come back in ascending natural order and are reversed
    /// unless `sort_descending` is set, so the default display order is
    /// descending. Values whose transformed titles stringify identically
    /// share one output column.
    fn add_pivot_columns<S: Table + ?Sized>(&mut self, source: &S) -> Result<()> {
        let pivot_source = &self.plan.pivot_source;
        let mut distinct = source.distinct_values(pivot_source.column_index)?;
        if !pivot_source.sort_descending {
            distinct.reverse();
        }

        let value_type = source.column_type(self.plan.value_column.column_index)?;

        for value in &distinct {
            let title = column_title(pivot_source, value);
            if self.column_map.contains_key(&title) {
                continue;
            }
            let output = self.table.add_column(value_type, &title);
            self.column_map.insert(title, output);
            self.pivot_columns.push(output);
        }

        debug!(
            "pivot generated {} columns from {} distinct values",
            self.pivot_columns.len(),
            distinct.len()
        );
        Ok(())
    }

    // ========================================================================
    // GROUPING PASS
    // ========================================================================

    /// Single forward pass over the source rows.
    fn build_model<S: Table + ?Sized>(&mut self, source: &S) -> Result<()> {
        for source_row in 0..source.number_of_rows() {
            let key_cells = self.key_values(source, source_row)?;
            let output_row = self.output_row_for(key_cells)?;

            let raw_pivot = source.value(source_row, self.plan.pivot_source.column_index)?;
            let title = column_title(&self.plan.pivot_source, raw_pivot);
            let output_col = *self
                .column_map
                .get(&title)
                .ok_or(PivotError::UnresolvedPivotValue(title))?;

            let value = source.value(source_row, self.plan.value_column.column_index)?;
            self.model.append(output_row, output_col, value.clone());
        }

        debug!(
            "pivot grouped {} source rows into {} output rows",
            source.number_of_rows(),
            self.model.row_count()
        );
        Ok(())
    }

    /// Transformed key values of one source row, in key-column order.
    fn key_values<S: Table + ?Sized>(&self, source: &S, row: usize) -> Result<Vec<CellValue>> {
        let mut cells = Vec::with_capacity(self.plan.key_columns.len());
        for key in &self.plan.key_columns {
            let raw = source.value(row, key.column_index)?;
            let mut value = match &key.value_transform {
                Some(transform) => transform(raw),
                None => raw.clone(),
            };
            if key.declared_type == Some(ColumnType::String) {
                value = CellValue::Text(value.display_value());
            }
            cells.push(value);
        }
        Ok(cells)
    }

    /// Looks up the output row for a key tuple, creating it on first sight
    /// with the key values followed by a zero per generated column.
    fn output_row_for(&mut self, key_cells: Vec<CellValue>) -> Result<usize> {
        let group_key = GroupKey::from_cells(&key_cells);
        if let Some(&row) = self.key_map.get(&group_key) {
            return Ok(row);
        }

        let mut default_row = key_cells;
        default_row.extend(std::iter::repeat_with(CellValue::zero).take(self.pivot_columns.len()));
        let row = self.table.add_row(default_row)?;
        self.model.push_row();
        self.aggregated.push(Vec::new());
        trace!("pivot new output row {} for key {:?}", row, group_key);

        self.key_map.insert(group_key, row);
        Ok(row)
    }

    // ========================================================================
    // AGGREGATION PASS
    // ========================================================================

    /// Reduces every collected list and writes the result into its cell.
    /// Cells without collected values keep their default.
    fn write_aggregates(&mut self) -> Result<()> {
        let aggregator = &self.plan.pivot_source.aggregator;
        for (row, columns) in self.model.iter() {
            for (&col, values) in columns {
                let result = aggregator(values);
                self.table.set_value(row, col, result.clone())?;
                self.aggregated[row].push(result);
            }
        }
        Ok(())
    }

    fn collect_column_diagnostics(&mut self) -> Result<()> {
        for &col in &self.pivot_columns {
            let label = self.table.column_label(col)?.to_string();
            let entries = self
                .model
                .iter()
                .filter(|(_, columns)| columns.contains_key(&col))
                .count();
            let total = numeric_sum(&column_values(&self.table, col)?);

            self.column_totals.push(total);
            self.column_status.push(ColumnStatus { label, entries });
        }
        Ok(())
    }

    // ========================================================================
    // POST-PROCESSING
    // ========================================================================

    /// Appends one numeric column per summary entry, computed from each row's
    /// current generated-column values.
    fn add_summary_columns(&mut self) -> Result<()> {
        for summary in &self.plan.summary_columns {
            let output = self.table.add_column(ColumnType::Number, &summary.label);
            for row in 0..self.table.number_of_rows() {
                let values = row_values(&self.table, row, &self.pivot_columns)?;
                let result = (summary.aggregator)(&values);
                self.table.set_value(row, output, result)?;
            }
            for formatter in &summary.formatters {
                formatter.format(&mut self.table, output)?;
            }
            self.summary_columns.push(output);
        }
        Ok(())
    }

    fn apply_percent_of_total(&mut self) -> Result<()> {
        match self.plan.percent_of_total {
            Some(PercentOfTotal::Col) => {
                convert_columns_to_percent(&mut self.table, &self.pivot_columns)?
            }
            Some(PercentOfTotal::Row) => {
                convert_rows_to_percent(&mut self.table, &self.pivot_columns)?
            }
            None => {}
        }
        Ok(())
    }

    /// Outer loop over formatters, inner loop over generated columns.
    fn apply_formatters(&mut self) -> Result<()> {
        for formatter in &self.plan.pivot_source.formatters {
            for &col in &self.pivot_columns {
                formatter.format(&mut self.table, col)?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// The finished output table.
    pub fn data_table(&self) -> &DataTable {
        &self.table
    }

    pub fn into_data_table(self) -> DataTable {
        self.table
    }

    /// The raw grouping structure (row -> column -> collected values).
    pub fn model(&self) -> &PivotModel {
        &self.model
    }

    /// (source column, output column) per key column entry.
    pub fn key_columns(&self) -> &[(FieldIndex, usize)] {
        &self.key_columns
    }

    pub fn pivot_columns(&self) -> &[usize] {
        &self.pivot_columns
    }

    pub fn summary_columns(&self) -> &[usize] {
        &self.summary_columns
    }

    /// Aggregated results for one output row, in column-iteration order.
    pub fn aggregated_row(&self, row: usize) -> Option<&[CellValue]> {
        self.aggregated.get(row).map(Vec::as_slice)
    }

    /// Sum of aggregated values per generated column, aligned with
    /// `pivot_columns`.
    pub fn column_totals(&self) -> &[f64] {
        &self.column_totals
    }

    pub fn column_status(&self) -> &[ColumnStatus] {
        &self.column_status
    }
}

/// Title of the output column a raw pivot value maps to.
fn column_title(pivot_source: &PivotSource, value: &CellValue) -> String {
    match &pivot_source.column_title_transform {
        Some(transform) => transform(value).display_value(),
        None => value.display_value(),
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Builds a pivot table and returns only the output table.
pub fn build_pivot<S: Table + ?Sized>(source: &S, config: PivotConfig) -> Result<DataTable> {
    Ok(PivotBuilder::new(source, config)?.into_data_table())
}
