use graph::prelude::{s, DocumentExt, ObjectTypeExt, TypeExt};

/// A type that can have a selection set.
#[derive(Copy, Clone, Debug)]
pub enum CompositeType<'a> {
    Object(&'a s::ObjectType),
    Interface(&'a s::InterfaceType),
    Union(&'a s::UnionType),
}

impl<'a> From<&'a s::ObjectType> for CompositeType<'a> {
    fn from(object: &'a s::ObjectType) -> Self {
        CompositeType::Object(object)
    }
}

impl<'a> CompositeType<'a> {
    pub fn name(self) -> &'a str {
        match self {
            CompositeType::Object(object) => &object.name,
            CompositeType::Interface(interface) => &interface.name,
            CompositeType::Union(union) => &union.name,
        }
    }

    /// Unions have no fields of their own.
    pub fn field(self, name: &str) -> Option<&'a s::Field> {
        match self {
            CompositeType::Object(object) => object.field(name),
            CompositeType::Interface(interface) => interface.field(name),
            CompositeType::Union(_) => None,
        }
    }
}

/// Looks up the composite type called `name`.
pub fn composite_type<'a>(schema: &'a s::Document, name: &str) -> Option<CompositeType<'a>> {
    match schema.get_named_type(name)? {
        s::TypeDefinition::Object(t) => Some(CompositeType::Object(t)),
        s::TypeDefinition::Interface(t) => Some(CompositeType::Interface(t)),
        s::TypeDefinition::Union(t) => Some(CompositeType::Union(t)),
        _ => None,
    }
}

/// Returns the name of a type definition.
pub fn get_type_name(t: &s::TypeDefinition) -> &str {
    graph::data::graphql::ext::type_definition_name(t)
}

/// Looks up a field definition on an object type.
pub fn get_field<'a>(object_type: &'a s::ObjectType, name: &str) -> Option<&'a s::Field> {
    object_type.field(name)
}

/// Returns the argument definitions of a field on an object type.
pub fn get_argument_definitions<'a>(
    object_type: &'a s::ObjectType,
    name: &str,
) -> Option<&'a Vec<s::InputValue>> {
    get_field(object_type, name).map(|field| &field.arguments)
}

/// Returns true if the given type is an input type.
pub fn is_input_type(schema: &s::Document, t: &s::Type) -> bool {
    match t {
        s::Type::NamedType(name) => schema.get_named_type(name).is_some_and(|type_def| {
            matches!(
                type_def,
                s::TypeDefinition::Scalar(_)
                    | s::TypeDefinition::Enum(_)
                    | s::TypeDefinition::InputObject(_)
            )
        }),
        s::Type::ListType(inner) => is_input_type(schema, inner),
        s::Type::NonNullType(inner) => is_input_type(schema, inner),
    }
}

/// Returns true if values of `t` need a selection set.
pub fn is_composite_type(schema: &s::Document, t: &s::Type) -> bool {
    composite_type(schema, t.get_base_type()).is_some()
}

/// Determines whether objects of `object_type` can be returned where
/// `abstract_type` is expected.
pub fn is_possible_type(abstract_type: CompositeType, object_type: &s::ObjectType) -> bool {
    match abstract_type {
        CompositeType::Object(t) => t.name == object_type.name,
        CompositeType::Interface(t) => object_type
            .implements_interfaces
            .iter()
            .any(|name| name == &t.name),
        CompositeType::Union(t) => t.types.iter().any(|name| name == &object_type.name),
    }
}
