use graph::log::codes::LogCode;
use graph::prelude::*;
use std::time::Instant;

use crate::execution::*;
use crate::execution::Query;

/// Utilities for working with GraphQL query ASTs.
pub mod ast;

/// Options available for query execution.
pub struct QueryExecutionOptions<R>
where
    R: Resolver,
{
    /// The logger to use during query execution.
    pub logger: Logger,

    /// The resolver to use.
    pub resolver: R,

    /// Time at which the query times out.
    pub deadline: Option<Instant>,
}

/// Executes a prepared query and returns a result. Any error discards the
/// data of the whole query.
pub fn execute_query<R>(query: Arc<Query>, options: QueryExecutionOptions<R>) -> QueryResult
where
    R: Resolver,
{
    // Create a fresh execution context
    let ctx = ExecutionContext {
        logger: query.logger.clone(),
        resolver: options.resolver,
        query: query.clone(),
        deadline: options.deadline,
    };

    let result = execute_root_selection_set(&ctx);
    query.log_execution();

    match result {
        Ok(data) => QueryResult::new(Some(data)),
        Err(errors) => {
            debug!(
                options.logger,
                "Query execution failed";
                "query_id" => &query.query_id,
                "errors" => errors.len(),
                "code" => LogCode::QueryExecutionFailure,
            );
            QueryResult::from(errors)
        }
    }
}
