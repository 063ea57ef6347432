use crate::s::{
    Definition, Document, Field, InputValue, InterfaceType, ObjectType, ScalarType, Type,
    TypeDefinition,
};

pub trait ObjectTypeExt {
    fn field(&self, name: &str) -> Option<&Field>;
}

impl ObjectTypeExt for ObjectType {
    fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

impl ObjectTypeExt for InterfaceType {
    fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

pub trait FieldExt {
    fn argument(&self, name: &str) -> Option<&InputValue>;
}

impl FieldExt for Field {
    fn argument(&self, name: &str) -> Option<&InputValue> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}

pub trait DocumentExt {
    fn get_type_definitions(&self) -> Vec<&TypeDefinition>;

    fn get_named_type(&self, name: &str) -> Option<&TypeDefinition>;

    fn get_object_type_definitions(&self) -> Vec<&ObjectType>;

    fn get_scalar_type_definitions(&self) -> Vec<&ScalarType>;

    /// The name of the root query type: the `query` of an explicit
    /// `schema { ... }` definition, or `Query`.
    fn root_query_type_name(&self) -> &str;

    fn get_root_query_type(&self) -> Option<&ObjectType>;
}

impl DocumentExt for Document {
    fn get_type_definitions(&self) -> Vec<&TypeDefinition> {
        self.definitions
            .iter()
            .filter_map(|d| match d {
                Definition::TypeDefinition(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn get_named_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.definitions.iter().find_map(|d| match d {
            Definition::TypeDefinition(t) if type_definition_name(t) == name => Some(t),
            _ => None,
        })
    }

    fn get_object_type_definitions(&self) -> Vec<&ObjectType> {
        self.definitions
            .iter()
            .filter_map(|d| match d {
                Definition::TypeDefinition(TypeDefinition::Object(t)) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn get_scalar_type_definitions(&self) -> Vec<&ScalarType> {
        self.definitions
            .iter()
            .filter_map(|d| match d {
                Definition::TypeDefinition(TypeDefinition::Scalar(t)) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn root_query_type_name(&self) -> &str {
        self.definitions
            .iter()
            .find_map(|d| match d {
                Definition::SchemaDefinition(schema) => schema.query.as_deref(),
                _ => None,
            })
            .unwrap_or("Query")
    }

    fn get_root_query_type(&self) -> Option<&ObjectType> {
        match self.get_named_type(self.root_query_type_name()) {
            Some(TypeDefinition::Object(t)) => Some(t),
            _ => None,
        }
    }
}

pub fn type_definition_name(t: &TypeDefinition) -> &str {
    match t {
        TypeDefinition::Scalar(t) => &t.name,
        TypeDefinition::Object(t) => &t.name,
        TypeDefinition::Interface(t) => &t.name,
        TypeDefinition::Union(t) => &t.name,
        TypeDefinition::Enum(t) => &t.name,
        TypeDefinition::InputObject(t) => &t.name,
    }
}

pub trait TypeExt {
    fn get_base_type(&self) -> &str;

    fn is_non_null(&self) -> bool;

    /// Strips one level of non-null wrapping, if there is one.
    fn nullable(&self) -> &Type;
}

impl TypeExt for Type {
    fn get_base_type(&self) -> &str {
        match self {
            Type::NamedType(name) => name,
            Type::NonNullType(inner) => Self::get_base_type(inner),
            Type::ListType(inner) => Self::get_base_type(inner),
        }
    }

    fn is_non_null(&self) -> bool {
        matches!(self, Type::NonNullType(_))
    }

    fn nullable(&self) -> &Type {
        match self {
            Type::NonNullType(inner) => inner,
            t => t,
        }
    }
}
