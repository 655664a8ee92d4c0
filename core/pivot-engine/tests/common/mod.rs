//! FILENAME: tests/common/mod.rs
//! Fixtures and assertion helpers for pivot-engine integration tests.

#![allow(dead_code)]

use datatable::{CellValue, ColumnType, DataTable, Table};

// ============================================================================
// FIXTURES
// ============================================================================

/// Daily spend per person.
pub struct SpendFixture;

impl SpendFixture {
    pub fn headers() -> Vec<(ColumnType, &'static str)> {
        vec![
            (ColumnType::String, "name"),
            (ColumnType::String, "day"),
            (ColumnType::Number, "spend"),
        ]
    }

    pub fn data() -> Vec<(&'static str, &'static str, f64)> {
        vec![
            ("Oli", "Mon", 10.0),
            ("Oli", "Mon", 15.0),
            ("Kate", "Mon", 8.0),
            ("Kate", "Tue", 15.0),
        ]
    }

    pub fn table() -> DataTable {
        let mut table = DataTable::with_columns(&Self::headers());
        for (name, day, spend) in Self::data() {
            table
                .push_row(vec![
                    CellValue::text(name),
                    CellValue::text(day),
                    CellValue::Number(spend),
                ])
                .unwrap();
        }
        table
    }
}

/// Quarterly sales per region and product.
pub struct SalesFixture;

impl SalesFixture {
    pub fn headers() -> Vec<(ColumnType, &'static str)> {
        vec![
            (ColumnType::String, "Region"),
            (ColumnType::String, "Product"),
            (ColumnType::String, "Quarter"),
            (ColumnType::Number, "Sales"),
            (ColumnType::Number, "Quantity"),
        ]
    }

    pub fn data() -> Vec<(&'static str, &'static str, &'static str, f64, f64)> {
        vec![
            ("North", "Widget", "Q1", 10000.0, 100.0),
            ("North", "Widget", "Q2", 12000.0, 120.0),
            ("North", "Gadget", "Q1", 8000.0, 80.0),
            ("North", "Gadget", "Q2", 9000.0, 90.0),
            ("South", "Widget", "Q1", 15000.0, 150.0),
            ("South", "Widget", "Q2", 14000.0, 140.0),
            ("South", "Gadget", "Q1", 11000.0, 110.0),
            ("South", "Gadget", "Q2", 13000.0, 130.0),
            ("East", "Widget", "Q1", 9000.0, 90.0),
            ("East", "Widget", "Q2", 11000.0, 110.0),
            ("East", "Gadget", "Q1", 7000.0, 70.0),
            ("East", "Gadget", "Q3", 8500.0, 85.0),
        ]
    }

    pub fn table() -> DataTable {
        let mut table = DataTable::with_columns(&Self::headers());
        for (region, product, quarter, sales, quantity) in Self::data() {
            table
                .push_row(vec![
                    CellValue::text(region),
                    CellValue::text(product),
                    CellValue::text(quarter),
                    CellValue::Number(sales),
                    CellValue::Number(quantity),
                ])
                .unwrap();
        }
        table
    }
}

// ============================================================================
// ASSERTION HELPERS
// ============================================================================

/// Assert that a cell contains an expected number value.
pub fn assert_cell_number<T: Table>(table: &T, row: usize, col: usize, expected: f64) {
    match table.value(row, col).unwrap() {
        CellValue::Number(n) => assert!(
            (n - expected).abs() < 1e-9,
            "Cell ({}, {}) expected {} but got {}",
            row,
            col,
            expected,
            n
        ),
        other => panic!(
            "Cell ({}, {}) expected Number({}) but got {:?}",
            row, col, expected, other
        ),
    }
}

/// Assert that a cell contains an expected text value.
pub fn assert_cell_text<T: Table>(table: &T, row: usize, col: usize, expected: &str) {
    match table.value(row, col).unwrap() {
        CellValue::Text(s) => assert_eq!(s, expected, "Cell ({}, {})", row, col),
        other => panic!(
            "Cell ({}, {}) expected Text({:?}) but got {:?}",
            row, col, expected, other
        ),
    }
}

/// Column labels of a table, left to right.
pub fn labels<T: Table>(table: &T) -> Vec<String> {
    (0..table.number_of_columns())
        .map(|col| table.column_label(col).unwrap().to_string())
        .collect()
}

/// Finds the output row whose first column holds `key`.
pub fn row_for<T: Table>(table: &T, key: &str) -> usize {
    (0..table.number_of_rows())
        .find(|&row| table.value(row, 0).unwrap() == &CellValue::text(key))
        .unwrap_or_else(|| panic!("no row for key {:?}", key))
}
