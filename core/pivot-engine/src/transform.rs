//! FILENAME: core/pivot-engine/src/transform.rs
//! Built-in value transforms for key values and pivot column titles.

use std::collections::HashMap;
use std::rc::Rc;

use datatable::CellValue;

use crate::config::ValueTransform;
use crate::definition::{ManualGroup, TransformDef};

impl TransformDef {
    /// This transform as a runtime `ValueTransform`.
    pub fn transform(&self) -> ValueTransform {
        match self {
            TransformDef::ManualGrouping {
                groups,
                ungrouped_name,
            } => {
                // Resolve the member lookup once, not per value.
                let lookup = member_lookup(groups);
                let ungrouped = ungrouped_name.clone();
                Rc::new(move |value: &CellValue| manual_group(&lookup, &ungrouped, value))
            }
            other => {
                let def = other.clone();
                Rc::new(move |value: &CellValue| def.apply(value))
            }
        }
    }

    /// Applies the transform to a single value.
    pub fn apply(&self, value: &CellValue) -> CellValue {
        match self {
            TransformDef::Uppercase => map_text(value, |s| s.to_uppercase()),
            TransformDef::Lowercase => map_text(value, |s| s.to_lowercase()),
            TransformDef::Trim => map_text(value, |s| s.trim().to_string()),
            TransformDef::NumberBinning {
                start,
                end,
                interval,
            } => match value {
                CellValue::Number(n) => bin_label(*n, *start, *end, *interval)
                    .map(CellValue::Text)
                    .unwrap_or_else(|| value.clone()),
                _ => value.clone(),
            },
            TransformDef::ManualGrouping {
                groups,
                ungrouped_name,
            } => manual_group(&member_lookup(groups), ungrouped_name, value),
        }
    }
}

fn map_text<F>(value: &CellValue, f: F) -> CellValue
where
    F: Fn(&str) -> String,
{
    match value {
        CellValue::Text(s) => CellValue::Text(f(s)),
        other => other.clone(),
    }
}

/// Member label -> group name. A member listed in several groups belongs to
/// the first.
fn member_lookup(groups: &[ManualGroup]) -> HashMap<String, String> {
    let mut member_to_group: HashMap<String, String> = HashMap::new();
    for group in groups {
        for member in &group.members {
            member_to_group
                .entry(member.clone())
                .or_insert_with(|| group.name.clone());
        }
    }
    member_to_group
}

/// Group name for `value`, or `ungrouped` when it is not a listed member.
/// With no members defined at all, values pass through.
fn manual_group(
    lookup: &HashMap<String, String>,
    ungrouped: &str,
    value: &CellValue,
) -> CellValue {
    if lookup.is_empty() {
        return value.clone();
    }
    let group = lookup
        .get(&value.display_value())
        .map_or(ungrouped, String::as_str);
    CellValue::text(group)
}

/// Label of the equal-width bin containing `value`.
/// Returns None for an unusable bin layout.
fn bin_label(value: f64, start: f64, end: f64, interval: f64) -> Option<String> {
    if interval <= 0.0 || start >= end {
        return None;
    }

    if value < start {
        return Some(format!("<{}", start));
    }
    if value >= end {
        return Some(format!(">{}", end));
    }

    let bin_count = ((end - start) / interval).ceil() as usize;
    let bin_idx = (((value - start) / interval).floor() as usize).min(bin_count - 1);
    let bin_start = start + (bin_idx as f64) * interval;
    let bin_end = (bin_start + interval).min(end);

    let label = if bin_start.fract() == 0.0 && bin_end.fract() == 0.0 {
        if bin_end - bin_start == 1.0 {
            format!("{}", bin_start as i64)
        } else {
            format!("{}-{}", bin_start as i64, (bin_end - 1.0) as i64)
        }
    } else {
        format!("{:.2}-{:.2}", bin_start, bin_end)
    };
    Some(label)
}
