mod error;
#[allow(clippy::module_inception)]
mod query;
mod result;

pub use self::error::{QueryError, QueryExecutionError};
pub use self::query::{Query, QueryVariables};
pub use self::result::QueryResult;
