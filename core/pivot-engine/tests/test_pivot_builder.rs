//! FILENAME: tests/test_pivot_builder.rs
//! Integration tests for building pivot tables from typed sources.

mod common;

use std::rc::Rc;

use common::{assert_cell_number, assert_cell_text, labels, row_for, SalesFixture, SpendFixture};
use datatable::{CellValue, ColumnType, DataTable, Table};
use pivot_engine::{
    build_pivot, value_transform, AggregationType, KeyColumn, PercentOfTotal, PivotBuilder,
    PivotConfig, PivotDefinition, PivotError, PivotSource, ValueColumn,
};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Region x Quarter, summing Sales.
fn sales_by_quarter() -> PivotConfig {
    PivotConfig::new()
        .key_columns(vec![KeyColumn::new(0)])
        .pivot_source(PivotSource::new(2, AggregationType::Sum.aggregator()))
        .value_column(ValueColumn::new(3))
}

// ============================================================================
// SHAPE TESTS
// ============================================================================

#[test]
fn test_rows_follow_first_seen_key_order() {
    let source = SalesFixture::table();
    let table = build_pivot(&source, sales_by_quarter()).unwrap();

    assert_eq!(table.number_of_rows(), 3);
    assert_cell_text(&table, 0, 0, "North");
    assert_cell_text(&table, 1, 0, "South");
    assert_cell_text(&table, 2, 0, "East");
}

#[test]
fn test_one_column_per_distinct_pivot_value() {
    let source = SalesFixture::table();
    let table = build_pivot(&source, sales_by_quarter()).unwrap();

    // Default display order is descending
    assert_eq!(labels(&table), vec!["Region", "Q3", "Q2", "Q1"]);
    for col in 1..4 {
        assert_eq!(table.column_type(col).unwrap(), ColumnType::Number);
    }
}

#[test]
fn test_aggregated_values_and_defaults() {
    let source = SalesFixture::table();
    let table = build_pivot(&source, sales_by_quarter()).unwrap();

    let north = row_for(&table, "North");
    assert_cell_number(&table, north, 3, 18000.0);
    assert_cell_number(&table, north, 2, 21000.0);
    assert_cell_number(&table, north, 1, 0.0);

    let east = row_for(&table, "East");
    assert_cell_number(&table, east, 3, 16000.0);
    assert_cell_number(&table, east, 2, 11000.0);
    assert_cell_number(&table, east, 1, 8500.0);
}

#[test]
fn test_composite_keys_and_model_cover_every_source_row() {
    let source = SalesFixture::table();
    let config = sales_by_quarter().key_columns(vec![KeyColumn::new(0), KeyColumn::new(1)]);
    let builder = PivotBuilder::new(&source, config).unwrap();
    let table = builder.data_table();

    assert_eq!(builder.key_columns(), &[(0, 0), (1, 1)]);
    assert_eq!(labels(table)[..2], ["Region", "Product"]);
    assert_eq!(table.number_of_rows(), 6);
    assert_cell_text(table, 1, 0, "North");
    assert_cell_text(table, 1, 1, "Gadget");

    let collected: usize = builder
        .model()
        .iter()
        .flat_map(|(_, columns)| columns.values())
        .map(Vec::len)
        .sum();
    assert_eq!(collected, source.number_of_rows());
}

#[test]
fn test_duplicate_key_entries_produce_duplicate_columns() {
    let source = SpendFixture::table();
    let config = PivotConfig::new()
        .key_columns(vec![KeyColumn::new(0), KeyColumn::new(0)])
        .pivot_source(PivotSource::new(1, AggregationType::Sum.aggregator()))
        .value_column(ValueColumn::new(2));
    let table = build_pivot(&source, config).unwrap();

    assert_eq!(labels(&table), vec!["name", "name", "Tue", "Mon"]);
    assert_eq!(table.number_of_rows(), 2);
}

#[test]
fn test_empty_source_yields_key_columns_only() {
    let source = DataTable::with_columns(&SpendFixture::headers());
    let config = PivotConfig::new()
        .key_columns(vec![KeyColumn::new(0)])
        .pivot_source(PivotSource::new(1, AggregationType::Sum.aggregator()))
        .value_column(ValueColumn::new(2));
    let builder = PivotBuilder::new(&source, config).unwrap();

    assert_eq!(labels(builder.data_table()), vec!["name"]);
    assert_eq!(builder.data_table().number_of_rows(), 0);
    assert_eq!(builder.model().row_count(), 0);
    assert!(builder.column_status().is_empty());
}

// ============================================================================
// TRANSFORM TESTS
// ============================================================================

#[test]
fn test_colliding_titles_share_a_column() {
    let source = SalesFixture::table();
    let first_half = value_transform(|value| match value {
        CellValue::Text(q) if q == "Q1" || q == "Q2" => CellValue::text("H1"),
        _ => CellValue::text("Other"),
    });
    let config = sales_by_quarter().pivot_source(
        PivotSource::new(2, AggregationType::Sum.aggregator()).with_title_transform(first_half),
    );
    let table = build_pivot(&source, config).unwrap();

    assert_eq!(labels(&table), vec!["Region", "Other", "H1"]);
    let north = row_for(&table, "North");
    assert_cell_number(&table, north, 2, 39000.0);
    assert_cell_number(&table, north, 1, 0.0);
}

#[test]
fn test_unstable_title_transform_is_reported() {
    let source = SpendFixture::table();
    let calls = Rc::new(std::cell::Cell::new(0usize));
    let counter = Rc::clone(&calls);
    let unstable = value_transform(move |value| {
        counter.set(counter.get() + 1);
        CellValue::text(format!("{}-{}", value.display_value(), counter.get()))
    });
    let config = PivotConfig::new()
        .key_columns(vec![KeyColumn::new(0)])
        .pivot_source(
            PivotSource::new(1, AggregationType::Sum.aggregator()).with_title_transform(unstable),
        )
        .value_column(ValueColumn::new(2));

    match PivotBuilder::new(&source, config) {
        Err(PivotError::UnresolvedPivotValue(title)) => assert!(title.starts_with("Mon-")),
        other => panic!("Expected UnresolvedPivotValue, got {:?}", other.map(|_| ())),
    }
    assert!(calls.get() > 2);
}

// ============================================================================
// POST-PROCESSING TESTS
// ============================================================================

#[test]
fn test_percent_of_column_total() {
    let source = SalesFixture::table();
    let config = sales_by_quarter().percent_of_total(PercentOfTotal::Col);
    let builder = PivotBuilder::new(&source, config).unwrap();
    let table = builder.data_table();

    // Q3 has a single contributor
    let east = row_for(table, "East");
    let north = row_for(table, "North");
    assert_cell_number(table, east, 1, 100.0);
    assert_cell_number(table, north, 1, 0.0);

    // Q1: 18000 / 60000
    assert_cell_number(table, north, 3, 30.0);
    assert_eq!(builder.column_totals(), &[8500.0, 59000.0, 60000.0]);
}

#[test]
fn test_percent_of_row_total() {
    let source = SpendFixture::table();
    let config = PivotConfig::new()
        .key_columns(vec![KeyColumn::new(0)])
        .pivot_source(PivotSource::new(1, AggregationType::Sum.aggregator()))
        .value_column(ValueColumn::new(2))
        .percent_of_total(PercentOfTotal::Row);
    let table = build_pivot(&source, config).unwrap();

    let kate = row_for(&table, "Kate");
    assert_cell_number(&table, kate, 1, 65.22);
    assert_cell_number(&table, kate, 2, 34.78);
}

// ============================================================================
// DEFINITION TESTS
// ============================================================================

const AVERAGE_QUANTITY: &str = r#"{
    "name": "Average quantity by quarter",
    "key_columns": [{ "column_index": 0 }],
    "pivot_source": {
        "column_index": 2,
        "sort_descending": true,
        "aggregation": "Average",
        "formatters": [{ "Currency": { "decimal_places": 0, "symbol": "$" } }]
    },
    "value_column": { "column_index": 4 },
    "summary_columns": [
        {
            "label": "Total",
            "aggregation": "Sum",
            "formatters": [{ "Number": { "decimal_places": 1 } }]
        }
    ]
}"#;

#[test]
fn test_definition_drives_a_full_build() {
    let source = SalesFixture::table();
    let config = PivotDefinition::from_json(AVERAGE_QUANTITY).unwrap().to_config();
    let builder = PivotBuilder::new(&source, config).unwrap();
    let table = builder.data_table();

    assert_eq!(labels(table), vec!["Region", "Q1", "Q2", "Q3", "Total"]);
    assert_eq!(builder.summary_columns(), &[4]);

    let north = row_for(table, "North");
    assert_cell_number(table, north, 1, 90.0);
    assert_cell_number(table, north, 2, 105.0);
    assert_cell_number(table, north, 4, 195.0);

    assert_eq!(table.formatted_value(north, 1).unwrap(), Some("$90"));
    assert_eq!(table.formatted_value(north, 4).unwrap(), Some("195.0"));
}

#[test]
fn test_definition_missing_group_fails_build() {
    let source = SalesFixture::table();
    let def = PivotDefinition::from_json(
        r#"{ "key_columns": [{ "column_index": 0 }], "pivot_source": { "column_index": 2 } }"#,
    )
    .unwrap();

    assert!(matches!(
        PivotBuilder::new(&source, def.to_config()),
        Err(PivotError::MissingConfiguration("valueColumn"))
    ));
}

#[test]
fn test_string_declared_key_from_definition() {
    let mut source = DataTable::with_columns(&[
        (ColumnType::Number, "store"),
        (ColumnType::String, "day"),
        (ColumnType::Number, "spend"),
    ]);
    for (day, spend) in [("Mon", 3.0), ("Tue", 4.0)] {
        source
            .push_row(vec![
                CellValue::Number(7.0),
                CellValue::text(day),
                CellValue::Number(spend),
            ])
            .unwrap();
    }

    let def = PivotDefinition::from_json(
        r#"{
            "key_columns": [{ "column_index": 0, "declared_type": "string" }],
            "pivot_source": { "column_index": 1, "aggregation": "Count" },
            "value_column": { "column_index": 2 }
        }"#,
    )
    .unwrap();
    let table = build_pivot(&source, def.to_config()).unwrap();

    assert_eq!(table.column_type(0).unwrap(), ColumnType::String);
    assert_cell_text(&table, 0, 0, "7");
    assert_cell_number(&table, 0, 1, 1.0);
    assert_cell_number(&table, 0, 2, 1.0);
}
