use thiserror::Error;

use crate::data::graphql::ext::{type_definition_name, DocumentExt, TypeExt};
use crate::data::graphql::scalar::BuiltInScalarType;
use crate::s;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to parse schema: {0}")]
    Parse(#[from] graphql_parser::schema::ParseError),
    #[error("the schema does not define the root query type `{0}`")]
    NoQueryType(String),
    #[error("type `{0}` is defined more than once")]
    DuplicateType(String),
    #[error("type `{0}` is not defined in the schema")]
    TypeNotDefined(String),
    #[error("`{0}` references type `{1}` which is not defined in the schema")]
    UndefinedReference(String, String),
    #[error("type `{0}` is not a scalar type")]
    NotAScalar(String),
    #[error("type `{0}` is not an object type")]
    NotAnObject(String),
    #[error("type `{0}` has no field `{1}`")]
    FieldNotDefined(String, String),
    #[error("scalar `{0}` is bound more than once")]
    DuplicateScalar(String),
}

/// A parsed and checked GraphQL schema document. Built-in scalars that the
/// document does not declare are added to it.
#[derive(Clone, Debug)]
pub struct Schema {
    pub document: s::Document,
}

impl Schema {
    pub fn parse(raw: &str) -> Result<Self, SchemaError> {
        let document = graphql_parser::parse_schema::<String>(raw)?.into_static();
        Self::new(document)
    }

    pub fn new(mut document: s::Document) -> Result<Self, SchemaError> {
        for scalar in BuiltInScalarType::ALL.iter() {
            if document.get_named_type(scalar.name()).is_none() {
                document
                    .definitions
                    .push(s::Definition::TypeDefinition(s::TypeDefinition::Scalar(
                        s::ScalarType::new(scalar.name().to_owned()),
                    )));
            }
        }

        let schema = Schema { document };
        schema.validate()?;
        Ok(schema)
    }

    pub fn get_named_type(&self, name: &str) -> Option<&s::TypeDefinition> {
        self.document.get_named_type(name)
    }

    pub fn query_type(&self) -> Option<&s::ObjectType> {
        self.document.get_root_query_type()
    }

    fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = std::collections::HashSet::new();
        for def in self.document.get_type_definitions() {
            let name = type_definition_name(def);
            if !seen.insert(name) {
                return Err(SchemaError::DuplicateType(name.to_owned()));
            }
        }

        if self.query_type().is_none() {
            return Err(SchemaError::NoQueryType(
                self.document.root_query_type_name().to_owned(),
            ));
        }

        let check = |owner: String, ty: &s::Type| {
            let base = ty.get_base_type();
            match self.get_named_type(base) {
                Some(_) => Ok(()),
                None => Err(SchemaError::UndefinedReference(owner, base.to_owned())),
            }
        };

        for def in self.document.get_type_definitions() {
            let fields = match def {
                s::TypeDefinition::Object(t) => &t.fields,
                s::TypeDefinition::Interface(t) => &t.fields,
                s::TypeDefinition::InputObject(t) => {
                    for field in &t.fields {
                        check(format!("{}.{}", t.name, field.name), &field.value_type)?;
                    }
                    continue;
                }
                s::TypeDefinition::Union(t) => {
                    for member in &t.types {
                        if !matches!(
                            self.get_named_type(member),
                            Some(s::TypeDefinition::Object(_))
                        ) {
                            return Err(SchemaError::UndefinedReference(
                                t.name.clone(),
                                member.clone(),
                            ));
                        }
                    }
                    continue;
                }
                s::TypeDefinition::Scalar(_) | s::TypeDefinition::Enum(_) => continue,
            };
            let type_name = type_definition_name(def);
            for field in fields {
                check(format!("{}.{}", type_name, field.name), &field.field_type)?;
                for arg in &field.arguments {
                    check(
                        format!("{}.{}({})", type_name, field.name, arg.name),
                        &arg.value_type,
                    )?;
                }
            }
        }
        Ok(())
    }
}
