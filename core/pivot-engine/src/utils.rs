//! FILENAME: core/pivot-engine/src/utils.rs
//! Row/column extraction and percent-of-total helpers.
//!
//! Stateless: every function takes the table and the indices it works on.
//! Non-numeric cells are ignored by sums and left untouched by conversions.

use datatable::{CellValue, Table, TableError};

/// All values of `col`, top to bottom.
pub fn column_values<T: Table + ?Sized>(
    table: &T,
    col: usize,
) -> Result<Vec<CellValue>, TableError> {
    (0..table.number_of_rows())
        .map(|row| table.value(row, col).cloned())
        .collect()
}

/// Values of `row` at the given columns, in the order given.
pub fn row_values<T: Table + ?Sized>(
    table: &T,
    row: usize,
    cols: &[usize],
) -> Result<Vec<CellValue>, TableError> {
    cols.iter()
        .map(|&col| table.value(row, col).cloned())
        .collect()
}

/// Sum of the numeric values in `values`.
pub fn numeric_sum(values: &[CellValue]) -> f64 {
    values.iter().filter_map(CellValue::as_number).sum()
}

/// `value` as a percentage of `total`, rounded to 2 decimals (half up).
/// A zero total yields 0.
pub fn percent_of(value: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    ((value / total) * 10000.0 + 0.5).floor() / 100.0
}

/// Rewrites every numeric cell of each column in `cols` as a percentage of
/// that column's total. A column whose total is zero becomes all 0, not NaN.
pub fn convert_columns_to_percent<T: Table + ?Sized>(
    table: &mut T,
    cols: &[usize],
) -> Result<(), TableError> {
    for &col in cols {
        let values = column_values(table, col)?;
        let total = numeric_sum(&values);
        for (row, value) in values.iter().enumerate() {
            if let Some(n) = value.as_number() {
                table.set_value(row, col, CellValue::Number(percent_of(n, total)))?;
            }
        }
    }
    Ok(())
}

/// Rewrites every numeric cell in `cols` as a percentage of its row's total
/// across `cols`. A row whose total is zero becomes all 0, not NaN.
pub fn convert_rows_to_percent<T: Table + ?Sized>(
    table: &mut T,
    cols: &[usize],
) -> Result<(), TableError> {
    for row in 0..table.number_of_rows() {
        let values = row_values(table, row, cols)?;
        let total = numeric_sum(&values);
        for (&col, value) in cols.iter().zip(values.iter()) {
            if let Some(n) = value.as_number() {
                table.set_value(row, col, CellValue::Number(percent_of(n, total)))?;
            }
        }
    }
    Ok(())
}
