use std::sync::Arc;
use std::time::Instant;

use crate::execution::Query;
use crate::prelude::{ExecutableSchema, QueryExecutionOptions};
use crate::query::execute_query;
use graph::data::query::Query as GraphDataQuery;
use graph::prelude::{o, Logger, QueryResult, QueryVariables, ENV_VARS};

/// Runs GraphQL queries against one executable schema.
#[derive(Clone)]
pub struct GraphQlRunner {
    logger: Logger,
    schema: Arc<ExecutableSchema>,
}

impl GraphQlRunner {
    /// Creates a new query runner.
    pub fn new(logger: &Logger, schema: Arc<ExecutableSchema>) -> Self {
        let logger = logger.new(o!("component" => "GraphQlRunner"));
        GraphQlRunner { logger, schema }
    }

    pub fn schema(&self) -> &Arc<ExecutableSchema> {
        &self.schema
    }

    /// Validates, prepares and executes `query`. Validation and variable
    /// errors are reported without running any resolver.
    pub fn run_query(&self, query: GraphDataQuery) -> QueryResult {
        let deadline = ENV_VARS
            .graphql_query_timeout()
            .map(|timeout| Instant::now() + timeout);

        let query = match Query::new(
            &self.logger,
            self.schema.clone(),
            query,
            ENV_VARS.graphql_max_depth(),
        ) {
            Ok(query) => query,
            Err(errors) => return QueryResult::from(errors),
        };

        execute_query(
            query,
            QueryExecutionOptions {
                logger: self.logger.clone(),
                resolver: self.schema.resolvers().clone(),
                deadline,
            },
        )
    }

    /// Parses `text` and runs it with the given variables.
    pub fn run_query_text(&self, text: &str, variables: Option<QueryVariables>) -> QueryResult {
        match GraphDataQuery::parse(text, variables) {
            Ok(query) => self.run_query(query),
            Err(e) => QueryResult::from(e),
        }
    }
}
