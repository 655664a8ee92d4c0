//! FILENAME: core/pivot-engine/src/model.rs
//! Pivot Model - the grouping structures built before aggregation.
//!
//! - `KeyValue` / `GroupKey`: hashable composite row identity
//! - `PivotModel`: output row -> output column -> collected raw values
//!
//! Both are populated in one forward pass over the source rows and are
//! read-only afterwards.

use std::collections::BTreeMap;

use datatable::{CellError, CellValue};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ============================================================================
// KEY VALUES
// ============================================================================

/// Wrapper around f64 that implements Eq and Hash for use as HashMap keys.
/// NaN values are treated as equal to each other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_nan() && other.0.is_nan() {
            true
        } else {
            self.0 == other.0
        }
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if self.0.is_nan() {
            // All NaN values hash to the same thing
            u64::MAX.hash(state);
        } else if self.0 == 0.0 {
            // 0.0 and -0.0 compare equal, so they must hash equal
            0u64.hash(state);
        } else {
            self.0.to_bits().hash(state);
        }
    }
}

/// A normalized, hashable representation of a cell value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyValue {
    Empty,
    Number(OrderedFloat),
    Text(String),
    Boolean(bool),
    Error(CellError),
}

impl From<&CellValue> for KeyValue {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Empty => KeyValue::Empty,
            CellValue::Number(n) => KeyValue::Number(OrderedFloat(*n)),
            CellValue::Text(s) => KeyValue::Text(s.clone()),
            CellValue::Boolean(b) => KeyValue::Boolean(*b),
            CellValue::Error(e) => KeyValue::Error(*e),
        }
    }
}

/// Composite identity of an output row: one `KeyValue` per key column, in
/// key-column order. Distinct tuples never collide because components keep
/// their type and are compared element-wise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub values: SmallVec<[KeyValue; 4]>,
}

impl GroupKey {
    pub fn from_cells(cells: &[CellValue]) -> Self {
        GroupKey {
            values: cells.iter().map(KeyValue::from).collect(),
        }
    }
}

// ============================================================================
// PIVOT MODEL
// ============================================================================

/// Output row index -> output column index -> raw values, in source order.
/// Only (row, column) combinations seen in the source have an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotModel {
    rows: Vec<BTreeMap<usize, Vec<CellValue>>>,
}

impl PivotModel {
    pub fn new() -> Self {
        PivotModel { rows: Vec::new() }
    }

    /// Registers an empty entry for a newly created output row.
    pub(crate) fn push_row(&mut self) -> usize {
        self.rows.push(BTreeMap::new());
        self.rows.len() - 1
    }

    pub(crate) fn append(&mut self, row: usize, col: usize, value: CellValue) {
        if let Some(columns) = self.rows.get_mut(row) {
            columns.entry(col).or_default().push(value);
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column entries for one output row, ordered by column index.
    pub fn row(&self, row: usize) -> Option<&BTreeMap<usize, Vec<CellValue>>> {
        self.rows.get(row)
    }

    /// Values collected for one (row, column) cell.
    pub fn get(&self, row: usize, col: usize) -> Option<&[CellValue]> {
        self.rows
            .get(row)
            .and_then(|columns| columns.get(&col))
            .map(Vec::as_slice)
    }

    /// Iterates (row, column entries) in output row order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BTreeMap<usize, Vec<CellValue>>)> {
        self.rows.iter().enumerate()
    }
}
