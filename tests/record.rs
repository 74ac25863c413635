use chrono::NaiveDate;
use table_schema::{Error, Field, FieldType, RecordMapping, Schema};

#[derive(Debug, Default, Clone, PartialEq)]
struct Person {
    name: String,
    age: i64,
    weight: f64,
    born: Option<NaiveDate>,
    member: bool,
}

fn people_schema() -> Schema {
    Schema::from_fields(vec![
        Field::new("Name", FieldType::String),
        Field::new("Age", FieldType::Integer),
        Field::new("Weight", FieldType::Number),
        Field::new("Birth Date", FieldType::Date),
        Field::new("Member", FieldType::Boolean).with_true_values(["Y"]).with_false_values(["N"]),
    ])
}

fn people_mapping(schema: &Schema) -> RecordMapping<Person> {
    RecordMapping::<Person>::builder(schema)
        .column("NAME", |p: &Person| p.name.clone(), |p, v| p.name = v)
        .column("age", |p: &Person| p.age, |p, v| p.age = v)
        .column("weight", |p: &Person| p.weight, |p, v| p.weight = v)
        .column_tagged("Birth Date", |p: &Person| p.born, |p, v| p.born = v)
        .column("member", |p: &Person| p.member, |p, v| p.member = v)
        .build()
        .expect("build mapping")
}

#[test]
fn decodes_rows_into_records() {
    let schema = people_schema();
    let mapping = people_mapping(&schema);
    let rows = vec![
        vec!["Foo", "42", "70.5", "1980-02-03", "Y"],
        vec!["Bar", "7", "25", "", "N"],
    ];
    let people = mapping.decode_table(&rows).expect("decode table");
    assert_eq!(
        people[0],
        Person {
            name: "Foo".to_string(),
            age: 42,
            weight: 70.5,
            born: NaiveDate::from_ymd_opt(1980, 2, 3),
            member: true,
        }
    );
    assert_eq!(people[1].born, None);
    assert!(!people[1].member);
}

#[test]
fn missing_cells_keep_record_defaults() {
    let schema = people_schema();
    let mapping = people_mapping(&schema);
    let person = mapping.decode_row(&["", "", "", "", ""]).unwrap();
    assert_eq!(person, Person::default());
}

#[test]
fn encodes_records_in_schema_order() {
    let schema = people_schema();
    let mapping = people_mapping(&schema);
    let people = vec![
        Person {
            name: "Foo".to_string(),
            age: 42,
            weight: 70.5,
            born: NaiveDate::from_ymd_opt(1980, 2, 3),
            member: true,
        },
        Person {
            name: "Bar".to_string(),
            age: 7,
            weight: 25.0,
            born: None,
            member: false,
        },
    ];
    let rows = mapping.encode_table(&people).expect("encode table");
    assert_eq!(
        rows,
        vec![
            vec!["Foo", "42", "70.5", "1980-02-03", "Y"],
            vec!["Bar", "7", "25", "", "N"],
        ]
    );
    assert_eq!(mapping.decode_table(&rows).unwrap(), people);
}

#[test]
fn unmapped_columns_encode_as_missing() {
    let schema = people_schema().with_missing_values(["NA"]);
    let mapping = RecordMapping::<Person>::builder(&schema)
        .column("name", |p: &Person| p.name.clone(), |p, v| p.name = v)
        .build()
        .unwrap();
    let person = Person {
        name: "Foo".to_string(),
        ..Person::default()
    };
    assert_eq!(
        mapping.encode_row(&person).unwrap(),
        vec!["Foo", "NA", "NA", "NA", "NA"]
    );
}

#[test]
fn unknown_columns_fail_at_build_time() {
    let schema = people_schema();
    let result = RecordMapping::<Person>::builder(&schema)
        .column("height", |p: &Person| p.age, |p, v| p.age = v)
        .build();
    assert!(matches!(result, Err(Error::UnknownField(name)) if name == "height"));
}

#[test]
fn member_type_must_match_field_type() {
    let schema = people_schema();
    let mapping = RecordMapping::<Person>::builder(&schema)
        .column("weight", |p: &Person| p.age, |p, v| p.age = v)
        .build()
        .unwrap();
    let err = mapping
        .decode_row(&["Foo", "1", "70.5", "", "Y"])
        .unwrap_err();
    assert!(matches!(err, Error::Mapping { ref column, .. } if column == "weight"));

    let person = Person {
        age: 3,
        ..Person::default()
    };
    assert!(matches!(
        mapping.encode_row(&person),
        Err(Error::Cast { ref field, .. }) if field == "Weight"
    ));
}

#[test]
fn cast_failures_surface_from_decode() {
    let schema = people_schema();
    let mapping = people_mapping(&schema);
    let err = mapping
        .decode_row(&["Foo", "forty", "70.5", "", "Y"])
        .unwrap_err();
    assert!(matches!(err, Error::Cast { ref field, .. } if field == "Age"));

    let err = mapping.decode_row(&["Foo"]).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { expected: 5, found: 1, .. }));
}
