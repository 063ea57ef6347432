/// Utilities for working with GraphQL schema ASTs.
pub mod ast;

/// Binding resolvers and custom scalars to a schema.
pub mod executable;

pub use self::executable::{make_executable_schema, ExecutableSchema};
