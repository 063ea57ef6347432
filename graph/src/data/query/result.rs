use super::error::{QueryError, QueryExecutionError};
use crate::r;
use serde_derive::Serialize;
use std::collections::BTreeMap;

/// The result of running a query. `data` is always serialized, as `null`
/// when execution did not produce any.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub data: Option<r::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<QueryError>>,
}

impl QueryResult {
    /// A result with an empty object as the data.
    pub fn empty() -> Self {
        QueryResult {
            data: Some(r::Value::Object(r::Object::new())),
            errors: None,
        }
    }

    pub fn new(data: Option<r::Value>) -> Self {
        QueryResult { data, errors: None }
    }

    pub fn has_errors(&self) -> bool {
        self.errors.is_some()
    }

    /// The messages of all errors, in order.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .flatten()
            .map(|e| e.to_string())
            .collect()
    }
}

impl From<QueryExecutionError> for QueryResult {
    fn from(e: QueryExecutionError) -> Self {
        QueryResult::from(QueryError::from(e))
    }
}

impl From<QueryError> for QueryResult {
    fn from(e: QueryError) -> Self {
        QueryResult {
            data: None,
            errors: Some(vec![e]),
        }
    }
}

impl From<Vec<QueryExecutionError>> for QueryResult {
    fn from(e: Vec<QueryExecutionError>) -> Self {
        QueryResult {
            data: None,
            errors: Some(e.into_iter().map(QueryError::from).collect()),
        }
    }
}

impl From<BTreeMap<String, r::Value>> for QueryResult {
    fn from(val: BTreeMap<String, r::Value>) -> Self {
        QueryResult::new(Some(r::Value::Object(val.into_iter().collect())))
    }
}

impl<V: Into<QueryResult>, E: Into<QueryResult>> From<Result<V, E>> for QueryResult {
    fn from(result: Result<V, E>) -> Self {
        match result {
            Ok(v) => v.into(),
            Err(e) => e.into(),
        }
    }
}
