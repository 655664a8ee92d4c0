//! FILENAME: core/pivot-engine/src/format.rs
//! Column formatters applied after numeric post-processing.
//!
//! A formatter rewrites the formatted text of every cell in one column in
//! place. Raw values are never changed, so later numeric steps still see
//! numbers. Formatters run in sequence, and a later formatter may read or
//! replace the text an earlier one produced.

use datatable::{
    format_currency, format_decimal, format_percentage, CellValue, DataTable, Table, TableError,
};

/// Side-effecting, in-place formatting of one table column.
pub trait Formatter {
    fn format(&self, table: &mut DataTable, column: usize) -> Result<(), TableError>;
}

/// Applies `text_for` to every numeric cell of `column`.
fn format_numbers<F>(table: &mut DataTable, column: usize, text_for: F) -> Result<(), TableError>
where
    F: Fn(f64) -> String,
{
    for row in 0..table.number_of_rows() {
        if let CellValue::Number(n) = *table.value(row, column)? {
            table.set_formatted_value(row, column, Some(text_for(n)))?;
        }
    }
    Ok(())
}

/// Fixed decimal places with an optional thousands separator.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberFormatter {
    pub decimal_places: u8,
    pub use_thousands_separator: bool,
}

impl Formatter for NumberFormatter {
    fn format(&self, table: &mut DataTable, column: usize) -> Result<(), TableError> {
        format_numbers(table, column, |n| {
            format_decimal(n, self.decimal_places, self.use_thousands_separator)
        })
    }
}

/// Appends a percent sign to values already expressed in percent units.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentFormatter {
    pub decimal_places: u8,
}

impl Formatter for PercentFormatter {
    fn format(&self, table: &mut DataTable, column: usize) -> Result<(), TableError> {
        format_numbers(table, column, |n| format_percentage(n, self.decimal_places))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyFormatter {
    pub decimal_places: u8,
    pub symbol: String,
}

impl Formatter for CurrencyFormatter {
    fn format(&self, table: &mut DataTable, column: usize) -> Result<(), TableError> {
        format_numbers(table, column, |n| {
            format_currency(n, self.decimal_places, &self.symbol)
        })
    }
}

/// Substitutes `{}` in `pattern` with the cell's current text (the previous
/// formatter's output, or the display value when nothing formatted it yet).
/// Empty cells are skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternFormatter {
    pub pattern: String,
}

impl Formatter for PatternFormatter {
    fn format(&self, table: &mut DataTable, column: usize) -> Result<(), TableError> {
        for row in 0..table.number_of_rows() {
            let cell = table.cell(row, column)?;
            if cell.value.is_empty() {
                continue;
            }
            let text = self.pattern.replace("{}", &cell.display_text());
            table.set_formatted_value(row, column, Some(text))?;
        }
        Ok(())
    }
}
