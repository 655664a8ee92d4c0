//! FILENAME: core/datatable/src/number_format.rs
//! PURPOSE: Number formatting utilities for displaying cell values.
//! CONTEXT: Formatters call these to turn numeric cells into display text.
//! Percent values produced by pivot builds are already scaled to 0..100,
//! so `format_percentage` does not multiply.

/// Format a number with specified decimal places and optional thousands separator.
pub fn format_decimal(value: f64, decimal_places: u8, use_thousands_separator: bool) -> String {
    let rounded = format!("{:.prec$}", value, prec = decimal_places as usize);

    if use_thousands_separator {
        add_thousands_separator(&rounded)
    } else {
        rounded
    }
}

/// Add thousands separators to a numeric string.
pub fn add_thousands_separator(s: &str) -> String {
    let (integer_part, decimal_part) = match s.split_once('.') {
        Some((int, dec)) => (int, Some(dec)),
        None => (s, None),
    };

    let negative = integer_part.starts_with('-');
    let digits: String = integer_part.chars().filter(|c| c.is_ascii_digit()).collect();

    let mut result = String::new();
    let len = digits.len();

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    if negative {
        result = format!("-{}", result);
    }

    if let Some(decimal) = decimal_part {
        result.push('.');
        result.push_str(decimal);
    }

    result
}

/// Format a number as currency. Negative amounts are shown in parentheses.
pub fn format_currency(value: f64, decimal_places: u8, symbol: &str) -> String {
    let formatted = add_thousands_separator(&format!(
        "{:.prec$}",
        value.abs(),
        prec = decimal_places as usize
    ));

    let with_symbol = format!("{}{}", symbol, formatted);

    if value < 0.0 {
        format!("({})", with_symbol)
    } else {
        with_symbol
    }
}

/// Format a value that is already expressed in percent units.
pub fn format_percentage(value: f64, decimal_places: u8) -> String {
    format!("{:.prec$}%", value, prec = decimal_places as usize)
}
