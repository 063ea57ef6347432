use std::collections::HashMap;

use graph::prelude::*;
use graphql_parser::Pos;

use crate::scalars::ScalarRegistry;

/// A GraphQL value that can be coerced according to a type.
pub trait MaybeCoercible<T> {
    fn coerce(&self, using_type: &T) -> Option<r::Value>;
}

impl MaybeCoercible<s::EnumType> for r::Value {
    fn coerce(&self, using_type: &s::EnumType) -> Option<r::Value> {
        match self {
            r::Value::Null => Some(r::Value::Null),
            r::Value::String(name) | r::Value::Enum(name) => using_type
                .values
                .iter()
                .find(|value| &value.name == name)
                .map(|_| r::Value::Enum(name.clone())),
            _ => None,
        }
    }
}

impl MaybeCoercible<s::ScalarType> for r::Value {
    fn coerce(&self, using_type: &s::ScalarType) -> Option<r::Value> {
        match (using_type.name.as_str(), self) {
            (_, v @ r::Value::Null) => Some(v.clone()),
            ("Boolean", v @ r::Value::Boolean(_)) => Some(v.clone()),
            ("Int", r::Value::Int(num)) => i32::try_from(*num).ok().map(r::Value::from),
            ("Int", r::Value::Float(f)) if f.fract() == 0.0 => {
                let num = *f as i64;
                i32::try_from(num).ok().map(r::Value::from)
            }
            ("Float", v @ r::Value::Float(_)) => Some(v.clone()),
            ("Float", r::Value::Int(num)) => Some(r::Value::Float(*num as f64)),
            ("String", v @ r::Value::String(_)) => Some(v.clone()),
            ("ID", v @ r::Value::String(_)) => Some(v.clone()),
            ("ID", r::Value::Int(num)) => Some(r::Value::String(num.to_string())),
            _ => None,
        }
    }
}

impl MaybeCoercible<s::EnumType> for q::Value {
    fn coerce(&self, using_type: &s::EnumType) -> Option<r::Value> {
        match self {
            q::Value::Null => Some(r::Value::Null),
            q::Value::Enum(name) => using_type
                .values
                .iter()
                .find(|value| &value.name == name)
                .map(|_| r::Value::Enum(name.clone())),
            _ => None,
        }
    }
}

impl MaybeCoercible<s::ScalarType> for q::Value {
    fn coerce(&self, using_type: &s::ScalarType) -> Option<r::Value> {
        match (using_type.name.as_str(), self) {
            (_, q::Value::Null) => Some(r::Value::Null),
            ("Boolean", q::Value::Boolean(b)) => Some(r::Value::Boolean(*b)),
            ("Int", q::Value::Int(num)) => {
                let num = num.as_i64()?;
                i32::try_from(num).ok().map(r::Value::from)
            }
            ("Float", q::Value::Float(f)) => Some(r::Value::Float(*f)),
            ("Float", q::Value::Int(num)) => Some(r::Value::Float(num.as_i64()? as f64)),
            ("String", q::Value::String(s)) => Some(r::Value::String(s.clone())),
            ("ID", q::Value::String(s)) => Some(r::Value::String(s.clone())),
            ("ID", q::Value::Int(num)) => Some(r::Value::String(num.as_i64()?.to_string())),
            _ => None,
        }
    }
}

/// A literal that could not be coerced: the type expected where the
/// literal appears, the literal as written, and the reason a custom scalar
/// gave, if any.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LiteralError {
    pub expected: String,
    pub found: String,
    pub reason: Option<String>,
}

impl LiteralError {
    fn new(ty: &s::Type, value: &q::Value, reason: Option<String>) -> Self {
        LiteralError {
            expected: ty.to_string(),
            found: value.to_string(),
            reason,
        }
    }

    pub fn at(self, pos: Pos) -> QueryExecutionError {
        QueryExecutionError::ArgumentLiteralError(pos, self.expected, self.found, self.reason)
    }

    fn to_message(&self) -> String {
        self.clone().at(Pos::default()).to_string()
    }
}

/// Coerces a literal from the query document into a value of type `ty`.
///
/// Without `variables`, variable references are accepted as they are and
/// become `null`; this is how literals are checked before any variable
/// values are known.
pub(crate) fn coerce_literal<'a>(
    value: &q::Value,
    ty: &s::Type,
    resolver: &impl Fn(&str) -> Option<&'a s::TypeDefinition>,
    scalars: &ScalarRegistry,
    variables: Option<&HashMap<String, r::Value>>,
) -> Result<r::Value, LiteralError> {
    if let q::Value::Variable(name) = value {
        return match variables {
            None => Ok(r::Value::Null),
            Some(variables) => match variables.get(name) {
                Some(v) if !(v.is_null() && ty.is_non_null()) => Ok(v.clone()),
                None if !ty.is_non_null() => Ok(r::Value::Null),
                _ => Err(LiteralError::new(ty, value, None)),
            },
        };
    }

    match ty {
        // Null literals cannot be coerced into non-null types
        s::Type::NonNullType(_) if *value == q::Value::Null => {
            Err(LiteralError::new(ty, value, None))
        }
        s::Type::NonNullType(inner) => {
            coerce_literal_node(value, ty, inner, resolver, scalars, variables)
        }
        _ => coerce_literal_node(value, ty, ty, resolver, scalars, variables),
    }
}

/// Coerces a single literal node. Errors for the node itself name the
/// `declared` type, which still carries a non-null marker that `ty` lacks.
fn coerce_literal_node<'a>(
    value: &q::Value,
    declared: &s::Type,
    ty: &s::Type,
    resolver: &impl Fn(&str) -> Option<&'a s::TypeDefinition>,
    scalars: &ScalarRegistry,
    variables: Option<&HashMap<String, r::Value>>,
) -> Result<r::Value, LiteralError> {
    match (ty, value) {
        (_, q::Value::Null) => Ok(r::Value::Null),

        (s::Type::ListType(inner), q::Value::List(values)) => values
            .iter()
            .map(|value| coerce_literal(value, inner, resolver, scalars, variables))
            .collect::<Result<Vec<_>, _>>()
            .map(r::Value::List),

        // A single value is accepted where a list is expected
        (s::Type::ListType(inner), _) => {
            coerce_literal(value, inner, resolver, scalars, variables)
                .map(|v| r::Value::List(vec![v]))
        }

        (s::Type::NamedType(name), _) => {
            coerce_literal_to_definition(value, declared, name, resolver, scalars, variables)
        }

        (s::Type::NonNullType(_), _) => coerce_literal(value, ty, resolver, scalars, variables),
    }
}

fn coerce_literal_to_definition<'a>(
    value: &q::Value,
    ty: &s::Type,
    name: &str,
    resolver: &impl Fn(&str) -> Option<&'a s::TypeDefinition>,
    scalars: &ScalarRegistry,
    variables: Option<&HashMap<String, r::Value>>,
) -> Result<r::Value, LiteralError> {
    let fail = |reason: Option<String>| LiteralError::new(ty, value, reason);

    match resolver(name) {
        Some(s::TypeDefinition::Scalar(t)) => match scalars.get(name) {
            Some(scalar) => {
                let no_variables = HashMap::new();
                scalar
                    .parse_literal(value, variables.unwrap_or(&no_variables))
                    .map_err(|e| fail(e.reason()))
            }
            None => value.coerce(t).ok_or_else(|| fail(None)),
        },

        Some(s::TypeDefinition::Enum(t)) => value.coerce(t).ok_or_else(|| fail(None)),

        Some(s::TypeDefinition::InputObject(t)) => {
            let object = match value {
                q::Value::Object(object) => object,
                _ => return Err(fail(None)),
            };

            if let Some(unknown) = object
                .keys()
                .find(|key| !t.fields.iter().any(|f| &f.name == *key))
            {
                return Err(fail(Some(format!(
                    "Field '{}' is not defined by type {}.",
                    unknown, t.name
                ))));
            }

            let mut coerced = r::Object::new();
            for field in &t.fields {
                let field_value = match object.get(&field.name) {
                    Some(q::Value::Variable(var))
                        if variables.is_some_and(|vars| !vars.contains_key(var)) =>
                    {
                        None
                    }
                    v => v,
                };
                match field_value.or(field.default_value.as_ref()) {
                    Some(v) => {
                        let v = coerce_literal(v, &field.value_type, resolver, scalars, variables)?;
                        coerced.insert(field.name.clone(), v);
                    }
                    None if field.value_type.is_non_null() => {
                        return Err(fail(Some(format!(
                            "Field {}.{} of required type {} was not provided.",
                            t.name, field.name, field.value_type
                        ))))
                    }
                    None => {}
                }
            }
            Ok(r::Value::Object(coerced))
        }

        // Output types never appear as arguments in a valid schema
        _ => Err(fail(None)),
    }
}

/// Coerces an argument of a field. `Ok(None)` happens when no value is
/// found for a nullable argument without a default.
pub(crate) fn coerce_argument_value<'a>(
    pos: Pos,
    field_name: &str,
    def: &s::InputValue,
    value: Option<&q::Value>,
    resolver: &impl Fn(&str) -> Option<&'a s::TypeDefinition>,
    scalars: &ScalarRegistry,
    variables: &HashMap<String, r::Value>,
) -> Result<Option<r::Value>, QueryExecutionError> {
    // A variable without a value counts as if the argument was not given
    let value = match value {
        Some(q::Value::Variable(name)) if !variables.contains_key(name) => None,
        v => v,
    };

    match value.or(def.default_value.as_ref()) {
        None => {
            if def.value_type.is_non_null() {
                Err(QueryExecutionError::MissingArgumentError(
                    pos,
                    field_name.to_owned(),
                    def.name.clone(),
                    def.value_type.to_string(),
                ))
            } else {
                Ok(None)
            }
        }
        Some(value) => coerce_literal(value, &def.value_type, resolver, scalars, Some(variables))
            .map(Some)
            .map_err(|e| e.at(pos)),
    }
}

/// A variable value that could not be coerced: the offending part of the
/// value, where it sits inside the variable, and what was expected.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ValueError {
    pub value: r::Value,
    pub path: String,
    pub message: String,
}

impl ValueError {
    fn new(value: &r::Value, message: String) -> Self {
        ValueError {
            value: value.clone(),
            path: String::new(),
            message,
        }
    }

    fn within(mut self, segment: String) -> Self {
        self.path.insert_str(0, &segment);
        self
    }

    pub fn for_variable(self, pos: Pos, name: &str) -> QueryExecutionError {
        let mut rendered = render_value(&self.value);
        if !self.path.is_empty() {
            rendered = format!("{} at '{}{}'", rendered, name, self.path);
        }
        QueryExecutionError::VariableValueError(pos, name.to_owned(), rendered, self.message)
    }
}

/// Coerces a value supplied for a variable into a value of type `ty`.
pub(crate) fn coerce_value<'a>(
    value: &r::Value,
    ty: &s::Type,
    resolver: &impl Fn(&str) -> Option<&'a s::TypeDefinition>,
    scalars: &ScalarRegistry,
) -> Result<r::Value, ValueError> {
    match (ty, value) {
        (s::Type::NonNullType(_), r::Value::Null) => Err(ValueError::new(
            value,
            format!("Expected non-nullable type {} not to be null.", ty),
        )),

        (s::Type::NonNullType(inner), _) => coerce_value(value, inner, resolver, scalars),

        (_, r::Value::Null) => Ok(r::Value::Null),

        (s::Type::ListType(inner), r::Value::List(values)) => values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                coerce_value(value, inner, resolver, scalars)
                    .map_err(|e| e.within(format!("[{}]", i)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(r::Value::List),

        (s::Type::ListType(inner), _) => {
            coerce_value(value, inner, resolver, scalars).map(|v| r::Value::List(vec![v]))
        }

        (s::Type::NamedType(name), _) => coerce_to_definition(value, name, resolver, scalars),
    }
}

fn coerce_to_definition<'a>(
    value: &r::Value,
    name: &str,
    resolver: &impl Fn(&str) -> Option<&'a s::TypeDefinition>,
    scalars: &ScalarRegistry,
) -> Result<r::Value, ValueError> {
    let expected = || ValueError::new(value, format!("Expected type {}.", name));

    match resolver(name) {
        Some(s::TypeDefinition::Scalar(t)) => match scalars.get(name) {
            Some(scalar) => scalar.parse_value(value).map_err(|e| match e.reason() {
                Some(reason) => {
                    ValueError::new(value, format!("Expected type {}; {}", name, reason))
                }
                None => expected(),
            }),
            None => value.coerce(t).ok_or_else(expected),
        },

        Some(s::TypeDefinition::Enum(t)) => value.coerce(t).ok_or_else(expected),

        Some(s::TypeDefinition::InputObject(t)) => {
            let object = match value {
                r::Value::Object(object) => object,
                _ => {
                    return Err(ValueError::new(
                        value,
                        format!("Expected type {} to be an object.", name),
                    ))
                }
            };

            if let Some(unknown) = object
                .keys()
                .find(|key| !t.fields.iter().any(|f| &f.name == *key))
            {
                return Err(ValueError::new(
                    value,
                    format!("Field '{}' is not defined by type {}.", unknown, name),
                ));
            }

            let mut coerced = r::Object::new();
            for field in &t.fields {
                match object.get(&field.name) {
                    Some(v) => {
                        let v = coerce_value(v, &field.value_type, resolver, scalars)
                            .map_err(|e| e.within(format!(".{}", field.name)))?;
                        coerced.insert(field.name.clone(), v);
                    }
                    None => match &field.default_value {
                        Some(default) => {
                            let v = coerce_literal(
                                default,
                                &field.value_type,
                                resolver,
                                scalars,
                                Some(&HashMap::new()),
                            )
                            .map_err(|e| ValueError::new(value, e.to_message()))?;
                            coerced.insert(field.name.clone(), v);
                        }
                        None if field.value_type.is_non_null() => {
                            return Err(ValueError::new(
                                value,
                                format!(
                                    "Field {}.{} of required type {} was not provided.",
                                    name, field.name, field.value_type
                                ),
                            ))
                        }
                        None => {}
                    },
                }
            }
            Ok(r::Value::Object(coerced))
        }

        _ => Err(expected()),
    }
}

/// Renders a variable value for error messages. Strings are quoted with
/// single quotes.
pub(crate) fn render_value(value: &r::Value) -> String {
    fn quote(s: &str) -> String {
        format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
    }

    match value {
        r::Value::String(s) => quote(s),
        r::Value::Int(i) => i.to_string(),
        r::Value::Float(f) => format!("{:?}", f),
        r::Value::Boolean(b) => b.to_string(),
        r::Value::Null => "null".to_owned(),
        r::Value::Enum(e) => e.clone(),
        r::Value::List(values) => format!(
            "[{}]",
            values
                .iter()
                .map(render_value)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        r::Value::Object(map) => format!(
            "{{{}}}",
            map.iter()
                .map(|(key, value)| format!("{}: {}", quote(key), render_value(value)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        r::Value::Date(_) | r::Value::DateTime(_) => quote(&value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use graph::prelude::{q, r, s, Schema};
    use graphql_parser::Pos;
    use std::collections::{BTreeMap, HashMap};

    use super::*;
    use crate::scalars::{DateScalar, ScalarDefinition, ScalarRegistry};

    const SCHEMA: &str = "
        scalar DateInput
        enum Color { RED GREEN }
        input Range { start: DateInput! end: DateInput count: Int = 3 }
        type Query { ok: Boolean }
    ";

    fn schema() -> Schema {
        Schema::parse(SCHEMA).unwrap()
    }

    fn scalars() -> ScalarRegistry {
        ScalarRegistry::new(vec![ScalarDefinition::new(
            "DateInput",
            DateScalar::default(),
        )])
        .unwrap()
    }

    fn non_null(name: &str) -> s::Type {
        s::Type::NonNullType(Box::new(s::Type::NamedType(name.to_owned())))
    }

    #[test]
    fn coercion_using_enum_type_definitions_is_correct() {
        let schema = schema();
        let color = match schema.get_named_type("Color") {
            Some(s::TypeDefinition::Enum(t)) => t,
            _ => unreachable!(),
        };

        assert_eq!(
            r::Value::Enum("RED".to_owned()).coerce(color),
            Some(r::Value::Enum("RED".to_owned()))
        );
        assert_eq!(
            r::Value::String("GREEN".to_owned()).coerce(color),
            Some(r::Value::Enum("GREEN".to_owned()))
        );
        assert_eq!(r::Value::String("BLUE".to_owned()).coerce(color), None);
        assert_eq!(q::Value::String("RED".to_owned()).coerce(color), None);
    }

    #[test]
    fn coercion_using_built_in_scalars_is_correct() {
        let int = s::ScalarType::new("Int".to_owned());
        let float = s::ScalarType::new("Float".to_owned());
        let id = s::ScalarType::new("ID".to_owned());

        assert_eq!(r::Value::Int(7).coerce(&int), Some(r::Value::Int(7)));
        assert_eq!(r::Value::Int(1 << 40).coerce(&int), None);
        assert_eq!(r::Value::Float(2.0).coerce(&int), Some(r::Value::Int(2)));
        assert_eq!(r::Value::Float(2.5).coerce(&int), None);
        assert_eq!(r::Value::Int(2).coerce(&float), Some(r::Value::Float(2.0)));
        assert_eq!(
            q::Value::Int(12.into()).coerce(&id),
            Some(r::Value::String("12".to_owned()))
        );
        assert_eq!(q::Value::String("12".to_owned()).coerce(&int), None);
    }

    #[test]
    fn literal_errors_name_the_declared_type() {
        let schema = schema();
        let resolver = |name: &str| schema.get_named_type(name);

        let err = coerce_literal(
            &q::Value::String("invalid string".to_owned()),
            &non_null("DateInput"),
            &resolver,
            &scalars(),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err.at(Pos::default()).to_string(),
            "Expected type DateInput!, found \"invalid string\"; \
             time data 'invalid string' does not match format '%Y-%m-%d'"
        );

        let err = coerce_literal(
            &q::Value::Int(123.into()),
            &non_null("DateInput"),
            &resolver,
            &scalars(),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err.at(Pos::default()).to_string(),
            "Expected type DateInput!, found 123."
        );
    }

    #[test]
    fn list_literal_errors_name_the_item_type() {
        let schema = schema();
        let resolver = |name: &str| schema.get_named_type(name);
        let ty = s::Type::ListType(Box::new(non_null("DateInput")));

        let err = coerce_literal(
            &q::Value::List(vec![
                q::Value::String("2006-09-13".to_owned()),
                q::Value::Boolean(true),
            ]),
            &ty,
            &resolver,
            &scalars(),
            None,
        )
        .unwrap_err();
        assert_eq!(err.expected, "DateInput!");
        assert_eq!(err.found, "true");
    }

    #[test]
    fn input_object_literals_use_defaults() {
        let schema = schema();
        let resolver = |name: &str| schema.get_named_type(name);
        let mut object = BTreeMap::new();
        object.insert(
            "start".to_owned(),
            q::Value::String("2006-09-13".to_owned()),
        );

        let value = coerce_literal(
            &q::Value::Object(object),
            &s::Type::NamedType("Range".to_owned()),
            &resolver,
            &scalars(),
            Some(&HashMap::new()),
        )
        .unwrap();
        assert_eq!(value.get("count"), Some(&r::Value::Int(3)));
        assert_eq!(value.get("end"), None);
        assert!(matches!(value.get("start"), Some(r::Value::Date(_))));
    }

    #[test]
    fn variable_errors_render_values_with_single_quotes() {
        let schema = schema();
        let resolver = |name: &str| schema.get_named_type(name);

        let err = coerce_value(
            &r::Value::from("invalid string"),
            &non_null("DateInput"),
            &resolver,
            &scalars(),
        )
        .unwrap_err();
        assert_eq!(
            err.for_variable(Pos::default(), "value").to_string(),
            "Variable '$value' got invalid value 'invalid string'; \
             Expected type DateInput; \
             time data 'invalid string' does not match format '%Y-%m-%d'"
        );

        let err = coerce_value(
            &r::Value::Int(123),
            &non_null("DateInput"),
            &resolver,
            &scalars(),
        )
        .unwrap_err();
        assert_eq!(
            err.for_variable(Pos::default(), "value").to_string(),
            "Variable '$value' got invalid value 123; \
             Expected type DateInput; strptime() argument 1 must be str, not int"
        );
    }

    #[test]
    fn nested_variable_errors_carry_a_path() {
        let schema = schema();
        let resolver = |name: &str| schema.get_named_type(name);
        let value = r::Value::List(vec![r::Value::Object(
            vec![("start".to_owned(), r::Value::from("nope"))]
                .into_iter()
                .collect(),
        )]);

        let err = coerce_value(
            &value,
            &s::Type::ListType(Box::new(s::Type::NamedType("Range".to_owned()))),
            &resolver,
            &scalars(),
        )
        .unwrap_err();
        assert_eq!(err.path, "[0].start");
        assert_eq!(
            err.for_variable(Pos::default(), "ranges").to_string(),
            "Variable '$ranges' got invalid value 'nope' at 'ranges[0].start'; \
             Expected type DateInput; time data 'nope' does not match format '%Y-%m-%d'"
        );
    }

    #[test]
    fn null_variables_for_non_null_types() {
        let schema = schema();
        let resolver = |name: &str| schema.get_named_type(name);
        let err = coerce_value(&r::Value::Null, &non_null("DateInput"), &resolver, &scalars())
            .unwrap_err();
        assert_eq!(
            err.message,
            "Expected non-nullable type DateInput! not to be null."
        );
    }
}
