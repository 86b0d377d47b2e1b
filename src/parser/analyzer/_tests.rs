use crate::parser::analyzer::{ChartFields, TimestampSelection};

#[test]
pub fn test_plain_timestamp_is_selected() {
    let selection =
        TimestampSelection::analyze("SELECT _timestamp FROM logs").expect("Failed to analyze");

    assert!(selection.has_timestamp);
    assert_eq!(selection.column_names, vec!["_timestamp"]);
}

#[test]
pub fn test_alias_is_reported_and_resolvable() {
    let selection = TimestampSelection::analyze("SELECT _timestamp AS ts FROM logs")
        .expect("Failed to analyze");

    assert!(selection.has_timestamp);
    assert_eq!(selection.column_names, vec!["ts"]);

    // a later reference to the alias is itself timestamp-denoting
    let chained = TimestampSelection::analyze("SELECT _timestamp AS ts, ts AS bucket FROM logs")
        .expect("Failed to analyze");

    assert_eq!(chained.column_names, vec!["ts", "bucket"]);
}

#[test]
pub fn test_wildcard_implies_timestamp() {
    let selection =
        TimestampSelection::analyze("SELECT * FROM logs").expect("Failed to analyze");

    assert!(selection.has_timestamp);
    assert!(selection.column_names.contains(&"_timestamp".to_string()));
}

#[test]
pub fn test_histogram_alias_drives_time_axis() {
    let fields = ChartFields::extract(
        "SELECT histogram(_timestamp, '1 hour') AS zo_sql_key, count(*) AS total \
         FROM logs GROUP BY zo_sql_key",
    );

    assert_eq!(fields.timestamp.as_deref(), Some("zo_sql_key"));
    assert!(!fields.group_by.contains(&"zo_sql_key".to_string()));
    assert_eq!(fields.y_axis_fields, vec!["total"]);
}

#[test]
pub fn test_timestamp_dimension_measure_partition() {
    let fields = ChartFields::extract(
        "SELECT _timestamp, kubernetes_namespace_name, count(*) AS cnt FROM logs \
         GROUP BY _timestamp, kubernetes_namespace_name",
    );

    assert_eq!(fields.timestamp.as_deref(), Some("_timestamp"));
    assert_eq!(fields.group_by, vec!["kubernetes_namespace_name"]);
    assert_eq!(fields.y_axis_fields, vec!["cnt"]);
}

#[test]
pub fn test_cte_alias_reaches_outer_query() {
    let selection = TimestampSelection::analyze(
        "WITH base AS (SELECT _timestamp AS ts, service FROM logs) \
         SELECT ts, service FROM base",
    )
    .expect("Failed to analyze");

    assert!(selection.has_timestamp);
    assert_eq!(selection.column_names, vec!["ts"]);
}

#[test]
pub fn test_sibling_subquery_aliases_stay_isolated() {
    // the first sibling's `ts` alias must not make the second sibling's
    // unrelated `oc` projection timestamp-denoting
    let selection = TimestampSelection::analyze(
        "SELECT oc FROM (SELECT _timestamp AS ts FROM t1) a, (SELECT other AS oc FROM t2) b",
    )
    .expect("Failed to analyze");

    assert!(!selection.has_timestamp);
    assert!(selection.column_names.is_empty());
}

#[test]
pub fn test_subquery_knowledge_propagates_outward() {
    let selection =
        TimestampSelection::analyze("SELECT ts FROM (SELECT _timestamp AS ts FROM logs) sub")
            .expect("Failed to analyze");

    assert!(selection.has_timestamp);
    assert_eq!(selection.column_names, vec!["ts"]);
}

#[test]
pub fn test_entry_points_are_idempotent() {
    let sql = "SELECT histogram(_timestamp, '30 seconds') AS key, count(*) AS hits \
               FROM logs GROUP BY key";

    let first = TimestampSelection::analyze(sql).expect("Failed to analyze");
    let second = TimestampSelection::analyze(sql).expect("Failed to analyze");
    assert_eq!(first, second);

    assert_eq!(
        TimestampSelection::column_name(sql),
        TimestampSelection::column_name(sql)
    );
    assert_eq!(ChartFields::extract(sql), ChartFields::extract(sql));
}

#[test]
pub fn test_malformed_sql_behaviors_differ_by_entry_point() {
    let sql = "SELEC * FORM t";

    assert!(TimestampSelection::analyze(sql).is_err());
    assert_eq!(TimestampSelection::column_name(sql), None);
    assert_eq!(ChartFields::extract(sql), ChartFields::default());
}

#[test]
pub fn test_unaliased_distinct_aggregate_canonical_name() {
    let fields = ChartFields::extract("SELECT count(distinct user_id) FROM logs");

    assert_eq!(fields.y_axis_fields, vec!["count(DISTINCT logs.user_id)"]);
}

#[test]
pub fn test_unknown_expression_shape_falls_through() {
    // CASE is not a shape the analyzer knows; it must neither fail nor be
    // mistaken for the timestamp
    let sql = "SELECT CASE WHEN level = 'error' THEN 1 ELSE 0 END, _timestamp FROM logs";

    let selection = TimestampSelection::analyze(sql).expect("Failed to analyze");
    assert!(selection.has_timestamp);
    assert_eq!(selection.column_names, vec!["_timestamp"]);

    let fields = ChartFields::extract(sql);
    assert_eq!(fields.timestamp.as_deref(), Some("_timestamp"));
    assert_eq!(fields.y_axis_fields, vec!["?"]);
}

#[test]
pub fn test_results_serialize_for_the_ui() {
    let selection =
        TimestampSelection::analyze("SELECT _timestamp AS ts FROM logs").expect("Failed to analyze");
    let encoded = serde_json::to_value(&selection).expect("Failed to serialize");

    assert_eq!(encoded["has_timestamp"], true);
    assert_eq!(encoded["column_names"][0], "ts");

    let fields = ChartFields::extract("SELECT _timestamp, service, count(*) AS hits FROM logs GROUP BY _timestamp, service");
    let encoded = serde_json::to_value(&fields).expect("Failed to serialize");

    assert_eq!(encoded["timestamp"], "_timestamp");
    assert_eq!(encoded["group_by"][0], "service");
    assert_eq!(encoded["y_axis_fields"][0], "hits");
}
