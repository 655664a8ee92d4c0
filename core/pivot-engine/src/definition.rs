//! FILENAME: core/pivot-engine/src/definition.rs
//! Pivot Definition - The serializable configuration.
//!
//! This module contains the types needed to DESCRIBE a pivot build as data.
//! These structures are designed to be:
//! - Serializable (saved next to a report, loaded from JSON)
//! - Free of closures: aggregators, transforms and formatters are named
//! - Converted into a runtime `PivotConfig` via `to_config`

use std::rc::Rc;

use datatable::ColumnType;
use serde::{Deserialize, Serialize};

use crate::config::{
    ApplyOrder, FieldIndex, KeyColumn, PercentOfTotal, PivotConfig, PivotSource, SummaryColumn,
    ValueColumn,
};
use crate::error::Result;
use crate::format::{
    CurrencyFormatter, Formatter, NumberFormatter, PatternFormatter, PercentFormatter,
};

// ============================================================================
// AGGREGATION
// ============================================================================

/// Built-in aggregation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationType {
    Sum,
    Count,
    Average,
    Min,
    Max,
    CountNumbers,
    StdDev,
    StdDevP,
    Var,
    VarP,
    Product,
}

impl Default for AggregationType {
    fn default() -> Self {
        AggregationType::Sum
    }
}

// ============================================================================
// TRANSFORMS
// ============================================================================

/// A user-defined manual group: combines specific items under a parent label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualGroup {
    /// Display name of the group (e.g., "Weekend", "Eastern Region").
    pub name: String,
    /// The member item labels that belong to this group.
    pub members: Vec<String>,
}

/// Named value transforms for key values and pivot column titles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransformDef {
    Uppercase,
    Lowercase,
    Trim,
    /// Group numeric values into equal-width bins.
    NumberBinning {
        /// Starting value for the first bin.
        start: f64,
        /// Ending value for the last bin.
        end: f64,
        /// Width of each bin.
        interval: f64,
    },
    /// Map listed items to a group name; everything else to `ungrouped_name`.
    ManualGrouping {
        groups: Vec<ManualGroup>,
        #[serde(default = "default_ungrouped_name")]
        ungrouped_name: String,
    },
}

fn default_ungrouped_name() -> String {
    "Other".to_string()
}

// ============================================================================
// FORMATTERS
// ============================================================================

/// Named column formatters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FormatterDef {
    Number {
        decimal_places: u8,
        #[serde(default)]
        use_thousands_separator: bool,
    },
    Percent {
        decimal_places: u8,
    },
    Currency {
        decimal_places: u8,
        symbol: String,
    },
    Pattern {
        pattern: String,
    },
}

impl FormatterDef {
    pub fn formatter(&self) -> Rc<dyn Formatter> {
        match self {
            FormatterDef::Number {
                decimal_places,
                use_thousands_separator,
            } => Rc::new(NumberFormatter {
                decimal_places: *decimal_places,
                use_thousands_separator: *use_thousands_separator,
            }),
            FormatterDef::Percent { decimal_places } => Rc::new(PercentFormatter {
                decimal_places: *decimal_places,
            }),
            FormatterDef::Currency {
                decimal_places,
                symbol,
            } => Rc::new(CurrencyFormatter {
                decimal_places: *decimal_places,
                symbol: symbol.clone(),
            }),
            FormatterDef::Pattern { pattern } => Rc::new(PatternFormatter {
                pattern: pattern.clone(),
            }),
        }
    }
}

// ============================================================================
// COLUMN DEFINITIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyColumnDef {
    pub column_index: FieldIndex,
    #[serde(default)]
    pub transform: Option<TransformDef>,
    #[serde(default)]
    pub declared_type: Option<ColumnType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotSourceDef {
    pub column_index: FieldIndex,
    #[serde(default)]
    pub sort_descending: bool,
    #[serde(default)]
    pub aggregation: AggregationType,
    #[serde(default)]
    pub title_transform: Option<TransformDef>,
    #[serde(default)]
    pub formatters: Vec<FormatterDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryColumnDef {
    pub label: String,
    #[serde(default)]
    pub aggregation: AggregationType,
    #[serde(default)]
    pub formatters: Vec<FormatterDef>,
    #[serde(default)]
    pub apply_order: Option<ApplyOrder>,
}

// ============================================================================
// MAIN DEFINITION STRUCT
// ============================================================================

/// The complete, serializable definition of a pivot build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotDefinition {
    /// User-friendly name for this pivot.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub key_columns: Option<Vec<KeyColumnDef>>,

    #[serde(default)]
    pub pivot_source: Option<PivotSourceDef>,

    #[serde(default)]
    pub value_column: Option<ValueColumn>,

    #[serde(default)]
    pub summary_columns: Vec<SummaryColumnDef>,

    #[serde(default)]
    pub percent_of_total: Option<PercentOfTotal>,
}

impl PivotDefinition {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resolves named building blocks into a runtime configuration.
    /// Missing mandatory groups stay missing; the builder reports them.
    pub fn to_config(&self) -> PivotConfig {
        let key_columns = self.key_columns.as_ref().map(|keys| {
            keys.iter()
                .map(|def| KeyColumn {
                    column_index: def.column_index,
                    value_transform: def.transform.as_ref().map(TransformDef::transform),
                    declared_type: def.declared_type,
                })
                .collect()
        });

        let pivot_source = self.pivot_source.as_ref().map(|def| PivotSource {
            column_index: def.column_index,
            sort_descending: def.sort_descending,
            aggregator: def.aggregation.aggregator(),
            column_title_transform: def.title_transform.as_ref().map(TransformDef::transform),
            formatters: def.formatters.iter().map(FormatterDef::formatter).collect(),
        });

        let summary_columns = self
            .summary_columns
            .iter()
            .map(|def| SummaryColumn {
                label: def.label.clone(),
                aggregator: def.aggregation.aggregator(),
                formatters: def.formatters.iter().map(FormatterDef::formatter).collect(),
                apply_order: def.apply_order,
            })
            .collect();

        PivotConfig {
            key_columns,
            pivot_source,
            value_column: self.value_column,
            summary_columns,
            percent_of_total: self.percent_of_total,
        }
    }
}
