/// Common data types used by the GraphQL engine.
pub mod data;

/// Logging utilities.
pub mod log;

/// Configuration read from environment variables.
pub mod env;

pub use graphql_parser;
pub use slog;

/// Static versions of the `graphql_parser` AST types, with `String` as the
/// text type. The query variants live in `q`, the schema variants in `s`.
macro_rules! static_graphql {
    ($m:ident, $m2:ident, {$($t:ident,)*}) => {
        pub mod $m {
            use graphql_parser::$m2 as $m;
            pub use graphql_parser::Pos;
            pub use $m::*;
            $(
                pub type $t = $m::$t<'static, String>;
            )*
        }
    };
}

static_graphql!(q, query, {
    Definition,
    Directive,
    Document,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    Mutation,
    OperationDefinition,
    Query,
    Selection,
    SelectionSet,
    Subscription,
    Type,
    TypeCondition,
    Value,
    VariableDefinition,
});

static_graphql!(s, schema, {
    Definition,
    Directive,
    Document,
    EnumType,
    EnumValue,
    Field,
    InputObjectType,
    InputValue,
    InterfaceType,
    ObjectType,
    ScalarType,
    SchemaDefinition,
    Type,
    TypeDefinition,
    UnionType,
    Value,
});

/// Resolved values, i.e. values that went through coercion and are no
/// longer tied to a query document.
pub mod r {
    pub use crate::data::value::{Object, Value};
}

/// A prelude that makes the data types and traits of this crate available.
///
/// ```
/// use graph::prelude::*;
/// ```
pub mod prelude {
    pub use ::anyhow;
    pub use ::anyhow::{anyhow, bail, Context as _};
    pub use lazy_static::lazy_static;
    pub use serde_derive::{Deserialize, Serialize};
    pub use slog::{self, crit, debug, error, info, o, trace, warn, Logger};
    pub use std::fmt::Debug;
    pub use std::sync::Arc;

    pub use crate::data::graphql::ext::{DocumentExt, ObjectTypeExt, TypeExt};
    pub use crate::data::graphql::scalar::BuiltInScalarType;
    pub use crate::data::graphql::{TryFromValue, ValueMap};
    pub use crate::data::query::{
        Query, QueryError, QueryExecutionError, QueryResult, QueryVariables,
    };
    pub use crate::data::schema::{Schema, SchemaError};
    pub use crate::env::ENV_VARS;
    pub use crate::{q, r, s};

    pub type Error = anyhow::Error;
}
