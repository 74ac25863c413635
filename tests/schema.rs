use table_schema::{Error, Field, FieldType, ForeignKey, Schema, ValidationError, Value};

fn fields(names: &[&str]) -> Vec<Field> {
    names
        .iter()
        .map(|name| Field::new(*name, FieldType::String))
        .collect()
}

#[test]
fn consistent_keys_validate() {
    let schema = Schema::from_fields(fields(&["p", "i"]))
        .with_primary_key(["p"])
        .with_foreign_keys(ForeignKey::new(["p"], "", ["i"]));
    assert_eq!(schema.validate(), Ok(()));
}

#[test]
fn each_violation_is_reported() {
    let cases = [
        (
            Schema::from_fields(vec![Field::new("", FieldType::String)]),
            ValidationError::MissingName { index: 0 },
        ),
        (
            Schema::from_fields(fields(&["n1"])).with_primary_key(["n2"]),
            ValidationError::PrimaryKey {
                name: "n2".to_string(),
            },
        ),
        (
            Schema::from_fields(fields(&["n1"]))
                .with_foreign_keys(ForeignKey::new(["n2"], "", ["n1"])),
            ValidationError::ForeignKey {
                name: "n2".to_string(),
            },
        ),
        (
            Schema::from_fields(fields(&["n1"])).with_foreign_keys(ForeignKey::new(
                ["n1"],
                "",
                Vec::<String>::new(),
            )),
            ValidationError::ForeignKeyArity {
                fields: 1,
                reference: 0,
            },
        ),
    ];
    for (schema, expected) in cases {
        assert_eq!(schema.validate(), Err(expected));
    }
}

#[test]
fn validation_messages_name_the_problem() {
    let err = Schema::from_fields(vec![Field::new("", FieldType::String)])
        .validate()
        .unwrap_err();
    assert!(err.to_string().contains("name is mandatory"));

    let err = Schema::from_fields(fields(&["n1"]))
        .with_primary_key(["n2"])
        .validate()
        .unwrap_err();
    assert!(err.to_string().contains("no such field"));
}

#[test]
fn integer_field_treats_configured_literal_as_missing() {
    let schema = Schema::from_fields(vec![Field::new("Age", FieldType::Integer)])
        .with_missing_values(["na"]);
    assert_eq!(schema.cast_value("Age", "na").unwrap(), None);
    assert_eq!(
        schema.cast_value("Age", "12").unwrap(),
        Some(Value::Integer(12))
    );
}

#[test]
fn date_field_treats_configured_literal_as_missing() {
    let schema = Schema::from_fields(vec![Field::new("D", FieldType::Date)])
        .with_missing_values(["na"]);
    assert_eq!(schema.cast_value("D", "na").unwrap(), None);
    assert_eq!(
        schema.cast_value("D", "2015-10-12").unwrap(),
        Some(Value::Date(chrono::NaiveDate::from_ymd_opt(2015, 10, 12).unwrap()))
    );

    let strict = schema.with_missing_values(Vec::<String>::new());
    assert!(matches!(
        strict.cast_value("D", "na"),
        Err(Error::Cast { ref field, .. }) if field == "D"
    ));
}

#[test]
fn get_field_is_exact_and_positional() {
    let schema = Schema::from_fields(fields(&["Name", "Age"]));
    let (index, field) = schema.get_field("Age").expect("field exists");
    assert_eq!(index, 1);
    assert_eq!(field.name, "Age");
    assert!(schema.has_field("Name"));
    assert!(!schema.has_field("age"));
    assert!(schema.get_field("Height").is_none());
}

#[test]
fn cast_table_reports_failing_field_and_shape() {
    let schema = Schema::from_fields(vec![
        Field::new("Name", FieldType::String),
        Field::new("Age", FieldType::Integer),
    ]);
    let rows = vec![
        vec!["Foo".to_string(), "10".to_string()],
        vec!["Bar".to_string(), "ten".to_string()],
    ];
    let err = schema.cast_table(&rows).unwrap_err();
    assert!(matches!(err, Error::Cast { ref field, .. } if field == "Age"));
    assert_eq!(err.to_string(), "field 'Age': 'ten' is not a valid integer");

    let rows = vec![vec!["Foo".to_string()]];
    assert!(matches!(
        schema.cast_table(&rows),
        Err(Error::ShapeMismatch {
            row: 1,
            expected: 2,
            found: 1
        })
    ));
}
