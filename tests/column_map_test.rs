use typedframes::{Column, ColumnSet, ColumnType, DeferredBindings, Schema, TypedFramesError};

fn sensors() -> Schema {
    Schema::builder("Sensors")
        .column("timestamp", Column::new(ColumnType::Str))
        .column_set("temps", ColumnSet::names(["temp_1", "temp_2"]).with_type(ColumnType::Float))
        .build()
        .unwrap()
}

fn overlapping(greedy: bool) -> Schema {
    Schema::builder("Overlap")
        .column_set("temps", ColumnSet::names(["temp_1"]).with_type(ColumnType::Float))
        .column_set("readings", ColumnSet::names(["temp_1"]).with_type(ColumnType::Float))
        .greedy_column_sets(greedy)
        .build()
        .unwrap()
}

#[test]
fn test_sensors_scenario() {
    let observed = ["timestamp", "temp_1", "temp_2", "temp_3"];
    let (types, consumed) = sensors().compute_column_map(&observed, None).unwrap();

    assert_eq!(types.len(), 3);
    assert_eq!(types["timestamp"], ColumnType::Str);
    assert_eq!(types["temp_1"], ColumnType::Float);
    assert_eq!(types["temp_2"], ColumnType::Float);
    assert!(!types.contains_key("temp_3"));
    assert_eq!(consumed.len(), 1);
    assert_eq!(consumed["temps"], vec!["temp_1", "temp_2"]);
}

#[test]
fn test_overlapping_sets_scenario() {
    let err = overlapping(false).compute_column_map(&["temp_1"], None).unwrap_err();
    assert_eq!(err.to_string(), "Column 'temp_1' matched by both 'temps' and 'readings'.");

    let (types, consumed) = overlapping(true).compute_column_map(&["temp_1"], None).unwrap();
    assert_eq!(types.len(), 1);
    assert_eq!(types["temp_1"], ColumnType::Float);
    assert_eq!(consumed["temps"], vec!["temp_1"]);
    assert_eq!(consumed["readings"], vec!["temp_1"]);
}

#[test]
fn test_literal_sets_never_match_as_patterns() {
    let schema = Schema::builder("Literal")
        .column_set("temps", ColumnSet::names([r"temp_\d+"]))
        .build()
        .unwrap();
    let (types, consumed) = schema
        .compute_column_map(&["temp_1", r"temp_\d+"], None)
        .unwrap();
    assert_eq!(types.len(), 1);
    assert_eq!(consumed["temps"], vec![r"temp_\d+"]);

    let regex = Schema::builder("Regex")
        .column_set("temps", ColumnSet::names([r"temp_\d+"]).with_regex(true))
        .build()
        .unwrap();
    let (_, consumed) = regex.compute_column_map(&["temp_1"], None).unwrap();
    assert_eq!(consumed["temps"], vec!["temp_1"]);
}

#[test]
fn test_validate_users_scenario() {
    let schema = Schema::builder("Users")
        .column("user_id", Column::new(ColumnType::Int))
        .column("email", Column::new(ColumnType::Str))
        .build()
        .unwrap();
    assert_eq!(
        schema.validate_columns(&["user_id"]),
        vec!["Missing required column: email"]
    );
}

#[test]
fn test_deferred_values_resolve_before_matching() {
    let schema = Schema::builder("Late")
        .column("user_id", Column::new(ColumnType::Int).with_deferred_alias())
        .column_set("scores", ColumnSet::deferred().with_type(ColumnType::Float))
        .build()
        .unwrap();
    assert!(matches!(
        schema.compute_column_map(&["uid"], None),
        Err(TypedFramesError::AliasNotYetDefined(_))
    ));

    let resolved = schema
        .resolve_deferred(
            &DeferredBindings::new()
                .alias("user_id", "uid")
                .members("scores", ["score_a", "score_b"]),
        )
        .unwrap();
    let (types, consumed) = resolved
        .compute_column_map(&["uid", "score_b", "other"], None)
        .unwrap();
    assert_eq!(types["uid"], ColumnType::Int);
    assert_eq!(types["score_b"], ColumnType::Float);
    assert_eq!(consumed["scores"], vec!["score_b"]);
}
