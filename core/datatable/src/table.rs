//! FILENAME: core/datatable/src/table.rs
//! PURPOSE: The `Table` capability and its in-memory implementation.
//! CONTEXT: Pivot builds read a source through the `Table` trait and write
//! their result into a `DataTable`. Rows are dense (every row has one cell
//! per column); adding a column pads existing rows with `Empty`.

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellValue};
use crate::error::TableError;

/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    String,
    Boolean,
}

impl Default for ColumnType {
    fn default() -> Self {
        ColumnType::String
    }
}

/// Column metadata: type and header label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub column_type: ColumnType,
    pub label: String,
}

impl Column {
    pub fn new(column_type: ColumnType, label: impl Into<String>) -> Self {
        Column {
            column_type,
            label: label.into(),
        }
    }
}

/// Row/column access to typed tabular data. Row and Col are 0-based.
pub trait Table {
    fn number_of_rows(&self) -> usize;

    fn number_of_columns(&self) -> usize;

    fn value(&self, row: usize, col: usize) -> Result<&CellValue, TableError>;

    fn set_value(&mut self, row: usize, col: usize, value: CellValue) -> Result<(), TableError>;

    /// Formatted display text, if a formatter has set one.
    fn formatted_value(&self, row: usize, col: usize) -> Result<Option<&str>, TableError>;

    fn set_formatted_value(
        &mut self,
        row: usize,
        col: usize,
        text: Option<String>,
    ) -> Result<(), TableError>;

    /// Appends a column and returns its index.
    fn add_column(&mut self, column_type: ColumnType, label: &str) -> usize;

    /// Appends a row and returns its index.
    fn add_row(&mut self, values: Vec<CellValue>) -> Result<usize, TableError>;

    fn column_type(&self, col: usize) -> Result<ColumnType, TableError>;

    fn column_label(&self, col: usize) -> Result<&str, TableError>;

    /// Distinct values of a column, sorted ascending by natural order.
    fn distinct_values(&self, col: usize) -> Result<Vec<CellValue>, TableError> {
        let mut values: Vec<CellValue> = Vec::new();
        for row in 0..self.number_of_rows() {
            values.push(self.value(row, col)?.clone());
        }
        values.sort_by(|a, b| a.natural_cmp(b));
        values.dedup_by(|a, b| a.same_value(b));
        Ok(values)
    }
}

/// In-memory table with dense row storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
}

impl DataTable {
    /// Creates a new, empty table with no columns.
    pub fn new() -> Self {
        DataTable {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Creates an empty table with the given (type, label) columns.
    pub fn with_columns(columns: &[(ColumnType, &str)]) -> Self {
        let mut table = DataTable::new();
        for (column_type, label) in columns {
            table.add_column(*column_type, label);
        }
        table
    }

    /// Appends a row built from anything convertible into cell values.
    pub fn push_row<I, V>(&mut self, values: I) -> Result<usize, TableError>
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.add_row(values.into_iter().map(Into::into).collect())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Cell at (row, col) including its formatted text.
    pub fn cell(&self, row: usize, col: usize) -> Result<&Cell, TableError> {
        self.check_col(col)?;
        self.rows
            .get(row)
            .map(|r| &r[col])
            .ok_or(TableError::RowOutOfRange {
                row,
                rows: self.rows.len(),
            })
    }

    fn cell_mut(&mut self, row: usize, col: usize) -> Result<&mut Cell, TableError> {
        self.check_col(col)?;
        let rows = self.rows.len();
        self.rows
            .get_mut(row)
            .map(|r| &mut r[col])
            .ok_or(TableError::RowOutOfRange { row, rows })
    }

    fn check_col(&self, col: usize) -> Result<(), TableError> {
        if col < self.columns.len() {
            Ok(())
        } else {
            Err(TableError::ColumnOutOfRange {
                col,
                cols: self.columns.len(),
            })
        }
    }
}

impl Table for DataTable {
    fn number_of_rows(&self) -> usize {
        self.rows.len()
    }

    fn number_of_columns(&self) -> usize {
        self.columns.len()
    }

    fn value(&self, row: usize, col: usize) -> Result<&CellValue, TableError> {
        self.cell(row, col).map(|c| &c.value)
    }

    fn set_value(&mut self, row: usize, col: usize, value: CellValue) -> Result<(), TableError> {
        self.cell_mut(row, col)?.value = value;
        Ok(())
    }

    fn formatted_value(&self, row: usize, col: usize) -> Result<Option<&str>, TableError> {
        self.cell(row, col).map(|c| c.formatted.as_deref())
    }

    fn set_formatted_value(
        &mut self,
        row: usize,
        col: usize,
        text: Option<String>,
    ) -> Result<(), TableError> {
        self.cell_mut(row, col)?.formatted = text;
        Ok(())
    }

    fn add_column(&mut self, column_type: ColumnType, label: &str) -> usize {
        self.columns.push(Column::new(column_type, label));
        for row in &mut self.rows {
            row.push(Cell::default());
        }
        self.columns.len() - 1
    }

    fn add_row(&mut self, values: Vec<CellValue>) -> Result<usize, TableError> {
        if values.len() != self.columns.len() {
            return Err(TableError::RowWidthMismatch {
                expected: self.columns.len(),
                found: values.len(),
            });
        }
        self.rows.push(values.into_iter().map(Cell::new).collect());
        Ok(self.rows.len() - 1)
    }

    fn column_type(&self, col: usize) -> Result<ColumnType, TableError> {
        self.check_col(col)?;
        Ok(self.columns[col].column_type)
    }

    fn column_label(&self, col: usize) -> Result<&str, TableError> {
        self.check_col(col)?;
        Ok(&self.columns[col].label)
    }
}
