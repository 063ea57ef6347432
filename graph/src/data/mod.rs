/// Data types for dealing with GraphQL queries.
pub mod query;

/// Data types for dealing with GraphQL schemas.
pub mod schema;

/// Data types for dealing with GraphQL values.
pub mod graphql;

/// Resolved values.
pub mod value;
