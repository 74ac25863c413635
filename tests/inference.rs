mod common;

use common::table;
use proptest::prelude::*;
use table_schema::{
    Error, FieldType, InferOptions, Inferrer, Schema, Value, infer, infer_implicit_casting,
};

fn types(schema: &Schema) -> Vec<(&str, FieldType)> {
    schema
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.field_type.clone()))
        .collect()
}

#[test]
fn strict_height_column_votes_integer() {
    let rows = table(&[&["Foo", "5"], &["Bar", "4"], &["Bez", "5.5"]]);
    let schema = infer(&["Person", "Height"], &rows).expect("infer");
    assert_eq!(
        types(&schema),
        vec![("Person", FieldType::String), ("Height", FieldType::Integer)]
    );
    assert!(schema.fields.iter().all(|f| f.format == "default"));
    assert!(schema.primary_key.is_empty());
}

#[test]
fn implicit_height_column_widens_to_number() {
    let rows = table(&[&["Foo", "5"], &["Bar", "4"], &["Bez", "5.5"]]);
    let schema = infer_implicit_casting(&["Person", "Height"], &rows).expect("infer");
    assert_eq!(
        types(&schema),
        vec![("Person", FieldType::String), ("Height", FieldType::Number)]
    );
}

#[test]
fn single_cell_columns_pick_the_most_specific_type() {
    let cases = [
        ("1983-10-15", FieldType::Date),
        ("10", FieldType::Integer),
        ("20.2", FieldType::Number),
        ("0", FieldType::Integer),
        ("false", FieldType::Boolean),
        (r#"{"name":"foo"}"#, FieldType::Object),
        (r#"["name"]"#, FieldType::Array),
        ("name", FieldType::String),
        ("10:15:50", FieldType::Time),
        ("2017-08", FieldType::YearMonth),
        ("2017-08-01T10:15:50Z", FieldType::DateTime),
    ];
    for (cell, expected) in cases {
        let rows = vec![vec![cell.to_string()]];
        for schema in [
            infer(&["Foo"], &rows).expect("strict"),
            infer_implicit_casting(&["Foo"], &rows).expect("implicit"),
        ] {
            assert_eq!(schema.fields[0].field_type, expected, "cell {cell:?}");
            assert_eq!(schema.fields[0].format, "default");
        }
    }
}

#[test]
fn strict_many_columns() {
    let headers = ["Name", "Age", "Weight", "Bogus", "Boolean", "Boolean1"];
    let rows = table(&[
        &["Foo", "10", "20.2", "1", "yes", "1"],
        &["Foo", "10", "30", "1", "no", "1"],
        &["Foo", "10", "30", "Daniel", "yes", "2"],
    ]);
    let schema = infer(&headers, &rows).expect("infer");
    assert_eq!(
        types(&schema),
        vec![
            ("Name", FieldType::String),
            ("Age", FieldType::Integer),
            ("Weight", FieldType::Integer),
            ("Bogus", FieldType::String),
            ("Boolean", FieldType::Boolean),
            ("Boolean1", FieldType::Integer),
        ]
    );
}

#[test]
fn implicit_many_columns() {
    let headers = ["Name", "Age", "Weight", "Bogus", "Boolean", "Int"];
    let rows = table(&[
        &["Foo", "10", "20.2", "1", "yes", "1"],
        &["Foo", "10", "30", "1", "no", "1"],
        &["Foo", "10", "30", "Daniel", "yes", "2"],
    ]);
    let schema = infer_implicit_casting(&headers, &rows).expect("infer");
    assert_eq!(
        types(&schema),
        vec![
            ("Name", FieldType::String),
            ("Age", FieldType::Integer),
            ("Weight", FieldType::Number),
            ("Bogus", FieldType::String),
            ("Boolean", FieldType::Boolean),
            ("Int", FieldType::Integer),
        ]
    );
}

#[test]
fn strict_text_outlier_forces_string() {
    let rows = table(&[&["10"], &["20"], &["abc"]]);
    let schema = infer(&["Code"], &rows).expect("infer");
    assert_eq!(schema.fields[0].field_type, FieldType::String);
}

#[test]
fn strict_structured_or_time_outlier_forces_string() {
    for outlier in [r#"{"a":1}"#, r#"["x"]"#, "10:15:50", "2017-08"] {
        let rows = table(&[&["10"], &["20"], &[outlier]]);
        let schema = infer(&["Code"], &rows).expect("infer");
        assert_eq!(schema.fields[0].field_type, FieldType::String, "outlier {outlier:?}");
        assert!(rows.iter().all(|row| schema.fields[0].test_value(&row[0])));
    }
}

#[test]
fn strict_uniform_structured_columns_keep_their_type() {
    let rows = table(&[&[r#"{"a":1}"#, "10:15:50"], &[r#"{"b":2}"#, "23:00:00"]]);
    let schema = infer(&["Doc", "At"], &rows).expect("infer");
    assert_eq!(
        types(&schema),
        vec![("Doc", FieldType::Object), ("At", FieldType::Time)]
    );
}

#[test]
fn implicit_boolean_column_accepts_digit_literals() {
    let rows = table(&[&["true"], &["1"], &["0"]]);
    let schema = infer_implicit_casting(&["Flag"], &rows).expect("infer");
    assert_eq!(schema.fields[0].field_type, FieldType::Boolean);

    let rows = table(&[&["1"], &["0"], &["7"]]);
    let schema = infer_implicit_casting(&["Flag"], &rows).expect("infer");
    assert_eq!(schema.fields[0].field_type, FieldType::Integer);
}

#[test]
fn implicit_date_column_with_text_becomes_string() {
    let rows = table(&[&["2015-10-12"], &["next week"]]);
    let schema = infer_implicit_casting(&["When"], &rows).expect("infer");
    assert_eq!(schema.fields[0].field_type, FieldType::String);
}

#[test]
fn not_a_table_is_rejected() {
    let headers: [&str; 0] = [];
    let rows = table(&[&["1"]]);
    for result in [
        infer(&headers, &rows),
        infer_implicit_casting(&headers, &rows),
    ] {
        match result {
            Err(Error::ShapeMismatch {
                row,
                expected,
                found,
            }) => {
                assert_eq!((row, expected, found), (1, 0, 1));
            }
            other => panic!("expected shape mismatch, got {other:?}"),
        }
    }
}

#[test]
fn ragged_row_is_reported_with_its_number() {
    let rows = table(&[&["1", "2"], &["3"]]);
    let err = infer(&["a", "b"], &rows).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { row: 2, .. }));
    assert!(err.to_string().starts_with("not a table"));
}

#[test]
fn missing_cells_do_not_vote() {
    let rows = table(&[&["NA"], &["3"], &["NA"], &["4"]]);
    let options = InferOptions {
        missing_values: vec!["NA".to_string()],
        ..InferOptions::default()
    };
    let (schema, report) = Inferrer::new(options)
        .infer_with_report(&["Score"], &rows)
        .expect("infer");
    assert_eq!(schema.fields[0].field_type, FieldType::Integer);
    assert_eq!(schema.missing_values, vec!["NA"]);
    assert_eq!(schema.cast_value("Score", "NA").unwrap(), None);
    assert_eq!(report.column("Score").unwrap().missing(), 2);
}

#[test]
fn all_missing_or_empty_columns_are_strings() {
    let rows = table(&[&["", "x"], &["", "y"]]);
    let schema = infer_implicit_casting(&["Blank", "Text"], &rows).expect("infer");
    assert_eq!(schema.fields[0].field_type, FieldType::String);

    let rows: Vec<Vec<String>> = Vec::new();
    let schema = infer(&["Only"], &rows).expect("infer");
    assert_eq!(schema.fields[0].field_type, FieldType::String);
}

#[test]
fn inferred_schema_casts_its_source_rows() {
    let headers = ["Name", "Birthday", "Weight", "Address", "Siblings"];
    let rows = table(&[
        &["Foo", "2015-10-12", "20.2", r#"{"Street":"Foo","Number":10}"#, r#"["Foo"]"#],
        &["Bar", "2015-10-13", "30", r#"{"Street":"Bar","Number":2}"#, r#"["Bar"]"#],
    ]);
    let schema = infer_implicit_casting(&headers, &rows).expect("infer");
    let cast = schema.cast_table(&rows).expect("cast table");
    assert_eq!(cast[1][2], Some(Value::Number(30.0)));
    assert!(matches!(cast[0][3], Some(Value::Object(_))));
    assert!(matches!(cast[0][4], Some(Value::Array(_))));
}

fn cell_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<i32>().prop_map(|i| i.to_string()),
        (-1.0e6f64..1.0e6).prop_map(|f| format!("{f:.3}")),
        prop::sample::select(vec!["true", "no", "2020-02-29", "12:30:00", "2020-02", "[]", "{}", ""])
            .prop_map(str::to_string),
        "[a-z]{1,6}",
    ]
}

proptest! {
    #[test]
    fn implicit_inference_is_sound(cells in prop::collection::vec(cell_strategy(), 1..24)) {
        let rows: Vec<Vec<String>> = cells.into_iter().map(|cell| vec![cell]).collect();
        let schema = infer_implicit_casting(&["Col"], &rows).expect("infer");
        for row in &rows {
            prop_assert!(
                schema.cast_row(row).is_ok(),
                "{:?} does not cast as {}",
                row,
                schema.fields[0].field_type
            );
        }
    }
}
