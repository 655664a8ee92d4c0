//! FILENAME: core/datatable/src/cell.rs
//! PURPOSE: Defines the typed values a table cell can hold.
//! CONTEXT: `CellValue` is the unit passed to aggregators and transforms.
//! A `Cell` pairs the raw value with optional formatted display text so
//! that formatting never destroys the underlying number.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Represents the possible errors a cell can hold (e.g., #DIV/0!)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellError {
    Div0,         // Division by zero
    Ref,          // Invalid reference
    Name,         // Unknown name
    Value,        // Wrong type of argument
    NotAvailable, // No value available
}

/// Represents raw data within a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(CellError),
}

impl CellValue {
    /// The default value written into generated pivot columns.
    pub fn zero() -> Self {
        CellValue::Number(0.0)
    }

    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Returns the numeric payload, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Returns the display value of the cell as a String.
    /// This is the stable "stringified" form used for pivot column titles
    /// and for coercing key values declared as strings.
    pub fn display_value(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => {
                if *b { "TRUE" } else { "FALSE" }.to_string()
            }
            CellValue::Error(e) => format!("#{:?}", e).to_uppercase(),
        }
    }

    /// Natural ordering used for distinct-value sorting.
    /// Empty < Number < Text < Boolean < Error. NaN sorts after every other
    /// number and equal to itself, matching `same_value`.
    pub fn natural_cmp(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Empty, CellValue::Empty) => Ordering::Equal,
            (CellValue::Empty, _) => Ordering::Less,
            (_, CellValue::Empty) => Ordering::Greater,

            (CellValue::Number(a), CellValue::Number(b)) => match (a.is_nan(), b.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            },
            (CellValue::Number(_), _) => Ordering::Less,
            (_, CellValue::Number(_)) => Ordering::Greater,

            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Text(_), _) => Ordering::Less,
            (_, CellValue::Text(_)) => Ordering::Greater,

            (CellValue::Boolean(a), CellValue::Boolean(b)) => a.cmp(b),
            (CellValue::Boolean(_), _) => Ordering::Less,
            (_, CellValue::Boolean(_)) => Ordering::Greater,

            (CellValue::Error(a), CellValue::Error(b)) => {
                format!("{:?}", a).cmp(&format!("{:?}", b))
            }
        }
    }

    /// Equality under `natural_cmp` (NaN equals NaN).
    pub fn same_value(&self, other: &CellValue) -> bool {
        match (self, other) {
            (CellValue::Number(a), CellValue::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => self == other,
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

/// A stored cell: the raw value plus the text a formatter produced for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub value: CellValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        Cell {
            value,
            formatted: None,
        }
    }

    /// Formatted text if a formatter ran, otherwise the display value.
    pub fn display_text(&self) -> String {
        match &self.formatted {
            Some(text) => text.clone(),
            None => self.value.display_value(),
        }
    }
}
