use graph::prelude::{q, r};
use std::collections::HashMap;
use std::ops::Deref;

use graph::prelude::QueryExecutionError;

/// Returns the operation for the given name (or the only operation if no name is defined).
pub fn get_operation<'a>(
    document: &'a q::Document,
    name: Option<&str>,
) -> Result<&'a q::OperationDefinition, QueryExecutionError> {
    let operations = get_operations(document);

    match (name, operations.len()) {
        (None, 1) => Ok(operations[0]),
        (None, _) => Err(QueryExecutionError::OperationNameRequired),
        (Some(s), n) if n > 0 => operations
            .into_iter()
            .find(|op| match get_operation_name(op) {
                Some(n) => s == n,
                None => false,
            })
            .ok_or_else(|| QueryExecutionError::OperationNotFound(s.to_string())),
        _ => Err(QueryExecutionError::OperationNameRequired),
    }
}

/// Returns all operation definitions in the document.
pub fn get_operations(document: &q::Document) -> Vec<&q::OperationDefinition> {
    document
        .definitions
        .iter()
        .filter_map(|d| match d {
            q::Definition::Operation(op) => Some(op),
            _ => None,
        })
        .collect()
}

/// Returns the name of the given operation (if it has one).
pub fn get_operation_name(operation: &q::OperationDefinition) -> Option<&str> {
    match operation {
        q::OperationDefinition::Mutation(m) => m.name.as_ref().map(Deref::deref),
        q::OperationDefinition::Query(q) => q.name.as_ref().map(Deref::deref),
        q::OperationDefinition::SelectionSet(_) => None,
        q::OperationDefinition::Subscription(s) => s.name.as_ref().map(Deref::deref),
    }
}

/// Looks up a directive in a selection, if it is provided.
pub fn get_directive<'a>(selection: &'a q::Selection, name: &str) -> Option<&'a q::Directive> {
    let directives = match selection {
        q::Selection::Field(field) => &field.directives,
        q::Selection::FragmentSpread(spread) => &spread.directives,
        q::Selection::InlineFragment(fragment) => &fragment.directives,
    };
    directives.iter().find(|directive| directive.name == name)
}

/// Looks up the value of an argument in a vector of (name, value) tuples.
pub fn get_argument_value<'a>(
    arguments: &'a [(String, q::Value)],
    name: &str,
) -> Option<&'a q::Value> {
    arguments.iter().find(|(n, _)| n == name).map(|(_, v)| v)
}

/// The value of the `if` argument of a directive, following variables.
fn directive_condition(
    selection: &q::Selection,
    name: &str,
    variables: &HashMap<String, r::Value>,
) -> Option<bool> {
    let directive = get_directive(selection, name)?;
    match get_argument_value(&directive.arguments, "if") {
        Some(q::Value::Boolean(b)) => Some(*b),
        Some(q::Value::Variable(var)) => match variables.get(var) {
            Some(r::Value::Boolean(b)) => Some(*b),
            _ => Some(false),
        },
        _ => Some(false),
    }
}

/// Returns true if a selection should be skipped (as per the `@skip` directive).
pub fn skip_selection(selection: &q::Selection, variables: &HashMap<String, r::Value>) -> bool {
    directive_condition(selection, "skip", variables).unwrap_or(false)
}

/// Returns true if a selection should be included (as per the `@include` directive).
pub fn include_selection(selection: &q::Selection, variables: &HashMap<String, r::Value>) -> bool {
    directive_condition(selection, "include", variables).unwrap_or(true)
}

/// Returns the response key of a field, which is either its name or its alias (if there is one).
pub fn get_response_key(field: &q::Field) -> &str {
    field.alias.as_deref().unwrap_or(field.name.as_str())
}

/// Returns the variable definitions for an operation.
pub fn get_variable_definitions(
    operation: &q::OperationDefinition,
) -> Option<&Vec<q::VariableDefinition>> {
    match operation {
        q::OperationDefinition::Query(q) => Some(&q.variable_definitions),
        q::OperationDefinition::Subscription(s) => Some(&s.variable_definitions),
        q::OperationDefinition::Mutation(m) => Some(&m.variable_definitions),
        q::OperationDefinition::SelectionSet(_) => None,
    }
}

/// Calls `f` for every variable referenced in `value`.
pub fn for_each_variable<'a>(value: &'a q::Value, f: &mut impl FnMut(&'a str)) {
    match value {
        q::Value::Variable(name) => f(name),
        q::Value::List(values) => values.iter().for_each(|v| for_each_variable(v, f)),
        q::Value::Object(map) => map.values().for_each(|v| for_each_variable(v, f)),
        _ => {}
    }
}
