use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use graph::prelude::{q, r, SchemaError};

mod date;

pub use self::date::{strftime, strptime, DateScalar, DateTimeScalar};

/// The reason a custom scalar rejected a value.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ScalarError {
    /// The literal is not of a kind the scalar parses, e.g. an `Int`
    /// literal for a date. Reported without further explanation.
    #[error("{0} literals can not be parsed by this scalar")]
    WrongLiteralKind(&'static str),
    #[error(transparent)]
    FormatMismatch(#[from] FormatMismatch),
    /// A resolver produced a value the scalar can not serialize.
    #[error("expected a {expected} value, found {found}")]
    UnexpectedValue {
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid format string '{0}'")]
    InvalidFormat(String),
}

impl ScalarError {
    /// The text appended to coercion error messages. Literals of the wrong
    /// kind come without one.
    pub fn reason(&self) -> Option<String> {
        match self {
            ScalarError::WrongLiteralKind(_) => None,
            e => Some(e.to_string()),
        }
    }
}

/// A value that does not parse with the scalar's format.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FormatMismatch {
    #[error("time data '{input}' does not match format '{format}'")]
    Pattern { input: String, format: String },
    #[error("strptime() argument 1 must be str, not {0}")]
    NotAString(&'static str),
}

/// The three hooks of a custom scalar.
pub trait CustomScalar: Send + Sync {
    /// Turn an internal value into its wire form.
    fn serialize(&self, value: &r::Value) -> Result<r::Value, ScalarError>;

    /// Parse a literal written in the query document. Variables have been
    /// substituted before this is called.
    fn parse_literal(&self, literal: &q::Value) -> Result<r::Value, ScalarError>;

    /// Parse a value supplied through a query variable.
    fn parse_value(&self, value: &r::Value) -> Result<r::Value, ScalarError>;
}

/// The scalar implementations available to schemas.
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarKind {
    Date(DateScalar),
    DateTime(DateTimeScalar),
}

impl ScalarKind {
    fn as_scalar(&self) -> &dyn CustomScalar {
        match self {
            ScalarKind::Date(scalar) => scalar,
            ScalarKind::DateTime(scalar) => scalar,
        }
    }
}

impl From<DateScalar> for ScalarKind {
    fn from(scalar: DateScalar) -> Self {
        ScalarKind::Date(scalar)
    }
}

impl From<DateTimeScalar> for ScalarKind {
    fn from(scalar: DateTimeScalar) -> Self {
        ScalarKind::DateTime(scalar)
    }
}

/// Which hooks a `ScalarDefinition` binds. Hooks that are not bound fall
/// back to the engine defaults: values pass through unchanged and literals
/// are converted without interpretation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Coercions {
    pub serialize: bool,
    pub parse_literal: bool,
    pub parse_value: bool,
}

impl Coercions {
    pub const ALL: Coercions = Coercions {
        serialize: true,
        parse_literal: true,
        parse_value: true,
    };

    /// Output-only scalars.
    pub const SERIALIZE: Coercions = Coercions {
        serialize: true,
        parse_literal: false,
        parse_value: false,
    };

    /// Input-only scalars.
    pub const PARSE: Coercions = Coercions {
        serialize: false,
        parse_literal: true,
        parse_value: true,
    };
}

impl Default for Coercions {
    fn default() -> Self {
        Coercions::ALL
    }
}

/// Binds a scalar implementation to a scalar type declared in a schema.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarDefinition {
    name: String,
    kind: ScalarKind,
    coercions: Coercions,
}

impl ScalarDefinition {
    pub fn new(name: impl Into<String>, kind: impl Into<ScalarKind>) -> Self {
        ScalarDefinition {
            name: name.into(),
            kind: kind.into(),
            coercions: Coercions::ALL,
        }
    }

    /// Bind only the given hooks.
    pub fn with_coercions(mut self, coercions: Coercions) -> Self {
        self.coercions = coercions;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ScalarKind {
        &self.kind
    }

    pub fn coercions(&self) -> Coercions {
        self.coercions
    }

    pub fn serialize(&self, value: &r::Value) -> Result<r::Value, ScalarError> {
        if self.coercions.serialize {
            self.kind.as_scalar().serialize(value)
        } else {
            Ok(value.clone())
        }
    }

    /// Parse `literal`. Variable references are looked up in `variables`;
    /// a bound hook only ever sees literals without them, since a scalar
    /// literal that is a variable is handled by the caller.
    pub fn parse_literal(
        &self,
        literal: &q::Value,
        variables: &HashMap<String, r::Value>,
    ) -> Result<r::Value, ScalarError> {
        if self.coercions.parse_literal {
            self.kind.as_scalar().parse_literal(literal)
        } else {
            Ok(untyped_literal(literal, variables))
        }
    }

    pub fn parse_value(&self, value: &r::Value) -> Result<r::Value, ScalarError> {
        if self.coercions.parse_value {
            self.kind.as_scalar().parse_value(value)
        } else {
            Ok(value.clone())
        }
    }
}

/// Converts a literal without any type information. Variables that have no
/// value become `null`.
pub fn untyped_literal(literal: &q::Value, variables: &HashMap<String, r::Value>) -> r::Value {
    match literal {
        q::Value::Variable(name) => variables.get(name).cloned().unwrap_or(r::Value::Null),
        q::Value::Int(num) => match num.as_i64() {
            Some(i) => r::Value::Int(i),
            None => r::Value::Null,
        },
        q::Value::Float(f) => r::Value::Float(*f),
        q::Value::String(s) => r::Value::String(s.clone()),
        q::Value::Boolean(b) => r::Value::Boolean(*b),
        q::Value::Null => r::Value::Null,
        q::Value::Enum(e) => r::Value::Enum(e.clone()),
        q::Value::List(values) => r::Value::List(
            values
                .iter()
                .map(|value| untyped_literal(value, variables))
                .collect(),
        ),
        q::Value::Object(map) => r::Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), untyped_literal(value, variables)))
                .collect(),
        ),
    }
}

/// The kind of a literal as it appears in error messages.
pub fn literal_kind(literal: &q::Value) -> &'static str {
    match literal {
        q::Value::Variable(_) => "Variable",
        q::Value::Int(_) => "Int",
        q::Value::Float(_) => "Float",
        q::Value::String(_) => "String",
        q::Value::Boolean(_) => "Boolean",
        q::Value::Null => "Null",
        q::Value::Enum(_) => "Enum",
        q::Value::List(_) => "List",
        q::Value::Object(_) => "Object",
    }
}

/// The custom scalars of a schema, by name. Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct ScalarRegistry {
    scalars: BTreeMap<String, ScalarDefinition>,
}

impl ScalarRegistry {
    /// Build a registry, rejecting a name that is bound twice.
    pub fn new(
        definitions: impl IntoIterator<Item = ScalarDefinition>,
    ) -> Result<Self, SchemaError> {
        let mut scalars = BTreeMap::new();
        for definition in definitions {
            if scalars.contains_key(definition.name()) {
                return Err(SchemaError::DuplicateScalar(definition.name.clone()));
            }
            scalars.insert(definition.name.clone(), definition);
        }
        Ok(ScalarRegistry { scalars })
    }

    pub fn get(&self, name: &str) -> Option<&ScalarDefinition> {
        self.scalars.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScalarDefinition> {
        self.scalars.values()
    }

    pub fn len(&self) -> usize {
        self.scalars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2006, 9, 13).unwrap()
    }

    #[test]
    fn unbound_hooks_pass_values_through() {
        let input = ScalarDefinition::new("DateInput", DateScalar::default())
            .with_coercions(Coercions::SERIALIZE);
        let value = r::Value::from("2006-09-13");
        assert_eq!(input.parse_value(&value), Ok(value.clone()));

        let mut variables = HashMap::new();
        variables.insert("v".to_owned(), r::Value::Int(1));
        let literal = q::Value::List(vec![
            q::Value::String("2006-09-13".to_owned()),
            q::Value::Variable("v".to_owned()),
            q::Value::Variable("missing".to_owned()),
        ]);
        assert_eq!(
            input.parse_literal(&literal, &variables),
            Ok(r::Value::List(vec![value, r::Value::Int(1), r::Value::Null]))
        );

        let output = ScalarDefinition::new("Date", DateScalar::default())
            .with_coercions(Coercions::PARSE);
        assert_eq!(
            output.serialize(&r::Value::Date(date())),
            Ok(r::Value::Date(date()))
        );
    }

    #[test]
    fn bound_hooks_delegate_to_the_scalar() {
        let scalar = ScalarDefinition::new("Date", DateScalar::default());
        assert_eq!(
            scalar.serialize(&r::Value::Date(date())),
            Ok(r::Value::from("2006-09-13"))
        );
        assert_eq!(
            scalar.parse_literal(&q::Value::Int(123.into()), &HashMap::new()),
            Err(ScalarError::WrongLiteralKind("Int"))
        );
    }

    #[test]
    fn wrong_literal_kind_has_no_reason() {
        assert_eq!(ScalarError::WrongLiteralKind("Int").reason(), None);
        assert_eq!(
            ScalarError::from(FormatMismatch::NotAString("int")).reason(),
            Some("strptime() argument 1 must be str, not int".to_owned())
        );
    }

    #[test]
    fn registry_rejects_duplicate_names() {
        let err = ScalarRegistry::new(vec![
            ScalarDefinition::new("Date", DateScalar::default()),
            ScalarDefinition::new("Date", DateTimeScalar::default()),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateScalar(name) if name == "Date"));

        let registry = ScalarRegistry::new(vec![
            ScalarDefinition::new("Date", DateScalar::default()),
            ScalarDefinition::new("DateTime", DateTimeScalar::default()),
        ])
        .unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.get("DateInput").is_none());
    }
}
