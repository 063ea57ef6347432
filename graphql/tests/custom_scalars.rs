#[macro_use]
extern crate pretty_assertions;

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;

use graph::log::discard;
use graph::object;
use graph::prelude::{bail, r, QueryResult, QueryVariables, ValueMap};
use scalar_graphql::prelude::*;

const TYPE_DEFS: &str = "
    scalar Date
    scalar DateInput
    scalar DateReadOnly

    input DateRange {
        start: DateInput!
        end: DateInput
    }

    type Query {
        testSerialize: DateReadOnly!
        testInput(value: DateInput!): Boolean!
        echo(value: DateInput): Date
        countRanges(ranges: [DateRange!]!): Int!
        broken: DateReadOnly
        failing: Boolean
    }
";

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2006, 9, 13).unwrap()
}

fn test_schema() -> Arc<ExecutableSchema> {
    let resolvers = ResolverMap::new()
        .field("Query", "testSerialize", |_, _| Ok(r::Value::Date(test_date())))
        .field("Query", "testInput", |_, args| {
            let date: NaiveDate = args.get_required("value")?;
            Ok(r::Value::Boolean(date == test_date()))
        })
        .field("Query", "echo", |_, args| {
            Ok(args.get("value").cloned().unwrap_or(r::Value::Null))
        })
        .field("Query", "countRanges", |_, args| {
            let ranges: Vec<r::Value> = args.get_required("ranges")?;
            Ok(r::Value::Int(ranges.len() as i64))
        })
        .field("Query", "failing", |_, _| bail!("no luck"))
        .field("Query", "broken", |_, _| Ok(r::Value::Int(7)));

    let scalars = ScalarRegistry::new(vec![
        ScalarDefinition::new("Date", DateScalar::default()),
        ScalarDefinition::new("DateInput", DateScalar::default())
            .with_coercions(Coercions::PARSE),
        ScalarDefinition::new("DateReadOnly", DateScalar::default())
            .with_coercions(Coercions::SERIALIZE),
    ])
    .unwrap();

    make_executable_schema(TYPE_DEFS, resolvers, scalars).unwrap()
}

fn run(query: &str, variables: Option<HashMap<String, r::Value>>) -> QueryResult {
    GraphQlRunner::new(&discard(), test_schema())
        .run_query_text(query, variables.map(QueryVariables::new))
}

fn value_variable(value: r::Value) -> Option<HashMap<String, r::Value>> {
    Some(HashMap::from([("value".to_owned(), value)]))
}

fn assert_single_error(result: &QueryResult, expected: &str) {
    assert!(result.data.is_none(), "data must be null: {:?}", result.data);
    assert_eq!(result.error_messages(), vec![expected.to_owned()]);
}

#[test]
fn serializes_dates() {
    let result = run("{ testSerialize }", None);
    assert!(!result.has_errors(), "{:?}", result.errors);
    assert_eq!(result.data, Some(object! { testSerialize: "2006-09-13" }));
}

#[test]
fn parses_date_literals() {
    let result = run("{ testInput(value: \"2006-09-13\") }", None);
    assert!(!result.has_errors(), "{:?}", result.errors);
    assert_eq!(result.data, Some(object! { testInput: true }));
}

#[test]
fn rejects_malformed_date_literals() {
    let result = run("{ testInput(value: \"invalid string\") }", None);
    assert_single_error(
        &result,
        "Expected type DateInput!, found \"invalid string\"; \
         time data 'invalid string' does not match format '%Y-%m-%d'",
    );
}

#[test]
fn rejects_short_and_signed_years() {
    let result = run("{ testInput(value: \"+2006-09-13\") }", None);
    assert_single_error(
        &result,
        "Expected type DateInput!, found \"+2006-09-13\"; \
         time data '+2006-09-13' does not match format '%Y-%m-%d'",
    );

    let result = run(
        "query Test($value: DateInput!) { testInput(value: $value) }",
        value_variable(r::Value::from("06-09-13")),
    );
    assert_single_error(
        &result,
        "Variable '$value' got invalid value '06-09-13'; Expected type DateInput; \
         time data '06-09-13' does not match format '%Y-%m-%d'",
    );
}

#[test]
fn rejects_literals_that_are_not_strings() {
    let result = run("{ testInput(value: 123) }", None);
    assert_single_error(&result, "Expected type DateInput!, found 123.");
}

#[test]
fn parses_date_variables() {
    let result = run(
        "query Test($value: DateInput!) { testInput(value: $value) }",
        value_variable(r::Value::from("2006-09-13")),
    );
    assert!(!result.has_errors(), "{:?}", result.errors);
    assert_eq!(result.data, Some(object! { testInput: true }));
}

#[test]
fn rejects_malformed_date_variables() {
    let result = run(
        "query Test($value: DateInput!) { testInput(value: $value) }",
        value_variable(r::Value::from("invalid string")),
    );
    assert_single_error(
        &result,
        "Variable '$value' got invalid value 'invalid string'; Expected type DateInput; \
         time data 'invalid string' does not match format '%Y-%m-%d'",
    );
}

#[test]
fn rejects_variables_that_are_not_strings() {
    let result = run(
        "query Test($value: DateInput!) { testInput(value: $value) }",
        value_variable(r::Value::Int(123)),
    );
    assert_single_error(
        &result,
        "Variable '$value' got invalid value 123; Expected type DateInput; \
         strptime() argument 1 must be str, not int",
    );
}

#[test]
fn dates_round_trip_through_the_schema() {
    let result = run(
        "query Echo($value: DateInput) { fromVariable: echo(value: $value) \
         fromLiteral: echo(value: \"1999-12-31\") }",
        value_variable(r::Value::from("2024-02-29")),
    );
    assert!(!result.has_errors(), "{:?}", result.errors);
    assert_eq!(
        result.data,
        Some(object! {
            fromLiteral: "1999-12-31",
            fromVariable: "2024-02-29",
        })
    );

    let result = run("{ echo }", None);
    assert_eq!(result.data, Some(object! { echo: r::Value::Null }));
}

#[test]
fn reports_where_nested_variables_fail() {
    let mut ranges = HashMap::new();
    ranges.insert(
        "ranges".to_owned(),
        r::Value::List(vec![object! { start: "2006-09-13", end: r::Value::Null }]),
    );
    let result = run(
        "query Count($ranges: [DateRange!]!) { countRanges(ranges: $ranges) }",
        Some(ranges.clone()),
    );
    assert_eq!(result.data, Some(object! { countRanges: 1i64 }));

    ranges.insert(
        "ranges".to_owned(),
        r::Value::List(vec![
            object! { start: "2006-09-13" },
            object! { start: "nope" },
        ]),
    );
    let result = run(
        "query Count($ranges: [DateRange!]!) { countRanges(ranges: $ranges) }",
        Some(ranges),
    );
    assert_single_error(
        &result,
        "Variable '$ranges' got invalid value 'nope' at 'ranges[1].start'; \
         Expected type DateInput; time data 'nope' does not match format '%Y-%m-%d'",
    );
}

#[test]
fn missing_and_null_variables() {
    let query = "query Test($value: DateInput!) { testInput(value: $value) }";

    let result = run(query, None);
    assert_single_error(
        &result,
        "Variable '$value' of required type 'DateInput!' was not provided.",
    );

    let result = run(query, value_variable(r::Value::Null));
    assert_single_error(
        &result,
        "Variable '$value' got invalid value null; \
         Expected non-nullable type DateInput! not to be null.",
    );
}

#[test]
fn serialize_failures_are_field_errors() {
    let result = run("{ testSerialize broken }", None);
    assert_single_error(
        &result,
        "Field `broken` could not serialize value as type DateReadOnly: \
         expected a date value, found int",
    );
}

#[test]
fn resolver_errors_discard_all_data() {
    let result = run("{ testSerialize failing }", None);
    assert_single_error(&result, "Failed to resolve field `failing`: no luck");
}

#[test]
fn results_serialize_to_json() {
    let result = run("{ testInput(value: 123) }", None);
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        serde_json::json!({
            "data": null,
            "errors": [{
                "locations": [{ "line": 1, "column": 3 }],
                "message": "Expected type DateInput!, found 123.",
            }],
        })
    );

    let result = run("{ testSerialize }", None);
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        serde_json::json!({ "data": { "testSerialize": "2006-09-13" } })
    );
}

#[test]
fn response_keys_follow_the_selection() {
    let result = run(
        "{ zulu: testSerialize alpha: testInput(value: \"2006-09-13\") }",
        None,
    );
    assert_eq!(
        serde_json::to_string(&result).unwrap(),
        r#"{"data":{"zulu":"2006-09-13","alpha":true}}"#
    );
}

#[test]
fn parse_errors_are_reported() {
    let result = run("{ testInput(", None);
    assert!(result.data.is_none());
    assert_eq!(result.error_messages().len(), 1);
}
