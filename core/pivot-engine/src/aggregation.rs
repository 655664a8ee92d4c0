//! FILENAME: core/pivot-engine/src/aggregation.rs
//! Built-in aggregators.
//!
//! `AggregationType` names a reduction; `AggregateAccumulator` computes it in
//! a single pass over the collected values. Non-numeric values only count
//! toward `Count`; `Empty` is ignored entirely. With no numeric input every
//! numeric aggregation yields 0.

use std::rc::Rc;

use datatable::CellValue;
use serde::{Deserialize, Serialize};

use crate::config::Aggregator;
use crate::definition::AggregationType;

/// Accumulator for computing aggregates incrementally.
/// Stores intermediate state needed for all aggregation types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateAccumulator {
    pub sum: f64,
    pub count: u64,
    pub count_numbers: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub product: f64,
    /// For variance/stddev: sum of squared differences from mean (Welford).
    pub m2: f64,
    pub mean: f64,
    pub has_product: bool,
}

impl Default for AggregateAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregateAccumulator {
    pub fn new() -> Self {
        AggregateAccumulator {
            sum: 0.0,
            count: 0,
            count_numbers: 0,
            min: None,
            max: None,
            product: 1.0,
            m2: 0.0,
            mean: 0.0,
            has_product: false,
        }
    }

    /// Builds an accumulator over a slice of cell values.
    pub fn from_values(values: &[CellValue]) -> Self {
        let mut acc = AggregateAccumulator::new();
        for value in values {
            acc.add(value);
        }
        acc
    }

    pub fn add(&mut self, value: &CellValue) {
        match value {
            CellValue::Empty => {}
            CellValue::Number(n) => self.add_number(*n),
            _ => self.add_non_number(),
        }
    }

    /// Adds a numeric value to the accumulator.
    pub fn add_number(&mut self, value: f64) {
        self.count += 1;
        self.count_numbers += 1;

        self.sum += value;

        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));

        if !self.has_product {
            self.has_product = true;
            self.product = value;
        } else {
            self.product *= value;
        }

        let delta = value - self.mean;
        self.mean += delta / (self.count_numbers as f64);
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    /// Adds a non-numeric value (only increments count).
    pub fn add_non_number(&mut self) {
        self.count += 1;
    }

    /// Computes the final aggregate value.
    pub fn compute(&self, aggregation: AggregationType) -> f64 {
        match aggregation {
            AggregationType::Sum => self.sum,
            AggregationType::Count => self.count as f64,
            AggregationType::CountNumbers => self.count_numbers as f64,
            AggregationType::Average => {
                if self.count_numbers > 0 {
                    self.sum / (self.count_numbers as f64)
                } else {
                    0.0
                }
            }
            AggregationType::Min => self.min.unwrap_or(0.0),
            AggregationType::Max => self.max.unwrap_or(0.0),
            AggregationType::Product => {
                if self.has_product {
                    self.product
                } else {
                    0.0
                }
            }
            AggregationType::Var => {
                if self.count_numbers > 1 {
                    self.m2 / ((self.count_numbers - 1) as f64)
                } else {
                    0.0
                }
            }
            AggregationType::VarP => {
                if self.count_numbers > 0 {
                    self.m2 / (self.count_numbers as f64)
                } else {
                    0.0
                }
            }
            AggregationType::StdDev => {
                if self.count_numbers > 1 {
                    (self.m2 / ((self.count_numbers - 1) as f64)).sqrt()
                } else {
                    0.0
                }
            }
            AggregationType::StdDevP => {
                if self.count_numbers > 0 {
                    (self.m2 / (self.count_numbers as f64)).sqrt()
                } else {
                    0.0
                }
            }
        }
    }
}

impl AggregationType {
    /// Reduces `values` with this aggregation.
    pub fn compute(self, values: &[CellValue]) -> CellValue {
        CellValue::Number(AggregateAccumulator::from_values(values).compute(self))
    }

    /// This aggregation as a runtime `Aggregator`.
    pub fn aggregator(self) -> Aggregator {
        Rc::new(move |values: &[CellValue]| self.compute(values))
    }
}
