use serde::de::Deserializer;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use super::error::QueryError;
use crate::{q, r};

/// Variable values for a GraphQL query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryVariables(HashMap<String, r::Value>);

impl QueryVariables {
    pub fn new(variables: HashMap<String, r::Value>) -> Self {
        QueryVariables(variables)
    }
}

impl Deref for QueryVariables {
    type Target = HashMap<String, r::Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for QueryVariables {
    fn deref_mut(&mut self) -> &mut HashMap<String, r::Value> {
        &mut self.0
    }
}

impl<'de> Deserialize<'de> for QueryVariables {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs: BTreeMap<String, serde_json::Value> = Deserialize::deserialize(deserializer)?;
        Ok(QueryVariables(
            pairs
                .into_iter()
                .map(|(k, v)| (k, r::Value::from(v)))
                .collect(),
        ))
    }
}

impl serde::ser::Serialize for QueryVariables {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A GraphQL query as submitted by a client.
#[derive(Clone, Debug)]
pub struct Query {
    pub document: q::Document,
    pub variables: Option<QueryVariables>,
    pub operation_name: Option<String>,
    /// Used only for logging
    pub query_text: Arc<String>,
    pub variables_text: Arc<String>,
}

impl Query {
    pub fn new(document: q::Document, variables: Option<QueryVariables>) -> Self {
        let query_text = Arc::new(document.to_string());
        let variables_text = Arc::new(
            variables
                .as_ref()
                .and_then(|vars| serde_json::to_string(vars).ok())
                .unwrap_or_default(),
        );
        Query {
            document,
            variables,
            operation_name: None,
            query_text,
            variables_text,
        }
    }

    /// Parse `text` into a query document.
    pub fn parse(text: &str, variables: Option<QueryVariables>) -> Result<Self, QueryError> {
        let document = graphql_parser::parse_query::<String>(text)?.into_static();
        Ok(Query::new(document, variables))
    }

    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variables_deserialize_from_json() {
        let vars: QueryVariables =
            serde_json::from_str(r#"{"value": "2006-09-13", "count": 123}"#).unwrap();
        assert_eq!(vars.get("value"), Some(&r::Value::from("2006-09-13")));
        assert_eq!(vars.get("count"), Some(&r::Value::Int(123)));
    }

    #[test]
    fn parse_errors_are_query_errors() {
        let err = Query::parse("{ testInput(value: ", None).unwrap_err();
        assert!(matches!(err, QueryError::ParseError(_)));
    }
}
