use graphql_parser::Pos;
use serde::ser::*;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Error caused while executing a [Query](struct.Query.html).
#[derive(Debug, Clone, PartialEq)]
pub enum QueryExecutionError {
    OperationNameRequired,
    OperationNotFound(String),
    NotSupported(String),
    NoRootQueryObjectType,
    NonNullError(Pos, String),
    ListValueError(Pos, String),
    NamedTypeError(String),
    AbstractTypeError(String),
    /// An argument literal could not be coerced: position, expected type,
    /// the literal as written, and the reason given by the coercion, if any
    ArgumentLiteralError(Pos, String, String, Option<String>),
    /// A variable value could not be coerced: position, variable name, the
    /// offending value, and a description of the expected type
    VariableValueError(Pos, String, String, String),
    /// Field, argument and argument type
    MissingArgumentError(Pos, String, String, String),
    UnknownArgument(Pos, String, String),
    InvalidVariableTypeError(Pos, String),
    /// Variable name and variable type
    MissingVariableError(Pos, String, String),
    UndefinedVariable(Pos, String),
    UnknownField(Pos, String, String),
    UndefinedFragment(String),
    CyclicalFragment(String),
    TooDeep(u8),
    EmptySelectionSet(String),
    ResolverError(Pos, String, String),
    /// Field, scalar type and the reason the value was rejected
    ScalarSerializeError(Pos, String, String, String),
    Timeout,
}

impl QueryExecutionError {
    /// The position in the query document the error refers to, if any.
    pub fn position(&self) -> Option<Pos> {
        use self::QueryExecutionError::*;

        match self {
            NonNullError(pos, _)
            | ListValueError(pos, _)
            | ArgumentLiteralError(pos, _, _, _)
            | VariableValueError(pos, _, _, _)
            | MissingArgumentError(pos, _, _, _)
            | UnknownArgument(pos, _, _)
            | InvalidVariableTypeError(pos, _)
            | MissingVariableError(pos, _, _)
            | UndefinedVariable(pos, _)
            | UnknownField(pos, _, _)
            | ResolverError(pos, _, _)
            | ScalarSerializeError(pos, _, _, _) => Some(*pos),
            OperationNameRequired
            | OperationNotFound(_)
            | NotSupported(_)
            | NoRootQueryObjectType
            | NamedTypeError(_)
            | AbstractTypeError(_)
            | UndefinedFragment(_)
            | CyclicalFragment(_)
            | TooDeep(_)
            | EmptySelectionSet(_)
            | Timeout => None,
        }
    }
}

impl Error for QueryExecutionError {}

impl fmt::Display for QueryExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::QueryExecutionError::*;

        match self {
            OperationNameRequired => write!(f, "Operation name required"),
            OperationNotFound(s) => write!(f, "Operation name not found `{}`", s),
            NotSupported(s) => write!(f, "Not supported: {}", s),
            NoRootQueryObjectType => write!(f, "No root Query type defined in the schema"),
            NonNullError(_, s) => write!(f, "Null value resolved for non-null field `{}`", s),
            ListValueError(_, s) => write!(f, "Non-list value resolved for list field `{}`", s),
            NamedTypeError(s) => write!(f, "Failed to resolve named type `{}`", s),
            AbstractTypeError(s) => write!(f, "Failed to resolve abstract type `{}`", s),
            ArgumentLiteralError(_, ty, literal, reason) => match reason {
                Some(reason) => write!(f, "Expected type {}, found {}; {}", ty, literal, reason),
                None => write!(f, "Expected type {}, found {}.", ty, literal),
            },
            VariableValueError(_, name, value, expected) => write!(
                f,
                "Variable '${}' got invalid value {}; {}",
                name, value, expected
            ),
            MissingArgumentError(_, field, arg, ty) => write!(
                f,
                "Field '{}' argument '{}' of type '{}' is required, but it was not provided.",
                field, arg, ty
            ),
            UnknownArgument(_, field, arg) => {
                write!(f, "Unknown argument '{}' on field '{}'.", arg, field)
            }
            InvalidVariableTypeError(_, s) => {
                write!(f, "Variable `{}` must have an input type", s)
            }
            MissingVariableError(_, name, ty) => write!(
                f,
                "Variable '${}' of required type '{}' was not provided.",
                name, ty
            ),
            UndefinedVariable(_, s) => write!(f, "Variable '${}' is not defined.", s),
            UnknownField(_, t, s) => write!(f, "Type `{}` has no field `{}`", t, s),
            UndefinedFragment(s) => write!(f, "No fragment named `{}`", s),
            CyclicalFragment(s) => write!(f, "Query has fragment cycle including `{}`", s),
            TooDeep(max_depth) => write!(
                f,
                "The query exceeds the maximum depth. The maximum allowed depth is {}",
                max_depth
            ),
            EmptySelectionSet(s) => write!(f, "Selection set for type `{}` is empty", s),
            ResolverError(_, field, s) => write!(f, "Failed to resolve field `{}`: {}", field, s),
            ScalarSerializeError(_, field, ty, s) => write!(
                f,
                "Field `{}` could not serialize value as type {}: {}",
                field, ty, s
            ),
            Timeout => write!(f, "Query timed out"),
        }
    }
}

impl From<QueryExecutionError> for Vec<QueryExecutionError> {
    fn from(e: QueryExecutionError) -> Self {
        vec![e]
    }
}

/// Error caused while processing a [Query](struct.Query.html) request.
#[derive(Debug, Clone)]
pub enum QueryError {
    ParseError(String),
    ExecutionError(QueryExecutionError),
}

impl From<graphql_parser::query::ParseError> for QueryError {
    fn from(e: graphql_parser::query::ParseError) -> Self {
        QueryError::ParseError(e.to_string())
    }
}

impl From<QueryExecutionError> for QueryError {
    fn from(e: QueryExecutionError) -> Self {
        QueryError::ExecutionError(e)
    }
}

impl Error for QueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            QueryError::ExecutionError(e) => Some(e),
            QueryError::ParseError(_) => None,
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QueryError::ExecutionError(e) => write!(f, "{}", e),
            QueryError::ParseError(e) => write!(f, "{}", e),
        }
    }
}

impl Serialize for QueryError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;

        // Serialize errors that point into the query with their location
        if let QueryError::ExecutionError(e) = self {
            if let Some(pos) = e.position() {
                let mut location = HashMap::new();
                location.insert("line", pos.line);
                location.insert("column", pos.column);
                map.serialize_entry("locations", &vec![location])?;
            }
        }

        map.serialize_entry("message", &self.to_string())?;
        map.end()
    }
}
