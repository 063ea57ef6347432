pub extern crate graphql_parser;

/// Utilities for working with GraphQL schemas.
pub mod schema;

/// Utilities for executing GraphQL.
mod execution;

/// Utilities for executing GraphQL queries and working with query ASTs.
pub mod query;

/// Custom scalars and their coercion hooks.
pub mod scalars;

/// Utilities for working with GraphQL values.
mod values;

/// The external interface for actually running queries
mod runner;

/// Prelude that exports the most important traits and types.
pub mod prelude {
    pub use super::execution::{
        Arguments, ExecutionContext, FieldResolver, Query, Resolver, ResolverMap,
    };
    pub use super::query::{execute_query, QueryExecutionOptions};
    pub use super::scalars::{
        Coercions, CustomScalar, DateScalar, DateTimeScalar, FormatMismatch, ScalarDefinition,
        ScalarError, ScalarKind, ScalarRegistry,
    };
    pub use super::schema::{make_executable_schema, ExecutableSchema};
    pub use super::values::MaybeCoercible;

    pub use super::runner::GraphQlRunner;
    pub use graph::prelude::s::ObjectType;
}
