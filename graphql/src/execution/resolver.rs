use std::collections::BTreeMap;
use std::fmt;

use graph::prelude::*;

use crate::schema::ast::{self as sast, CompositeType};

/// Coerced argument values of a field, by argument name. Arguments that
/// were not given and have no default are absent.
pub type Arguments = BTreeMap<String, r::Value>;

/// A function that resolves one field of an object type from the parent
/// object and the field's arguments.
pub type FieldResolver =
    Arc<dyn Fn(&r::Value, &Arguments) -> Result<r::Value, Error> + Send + Sync>;

/// A GraphQL resolver that can resolve fields and abstract types.
pub trait Resolver: Clone + Send + Sync {
    /// Resolves the value of `field` of an object of `object_type`.
    fn resolve_field(
        &self,
        object_type: &s::ObjectType,
        parent: &r::Value,
        field: &q::Field,
        arguments: &Arguments,
    ) -> Result<r::Value, Error>;

    /// Resolves an abstract type into an object type based on the given
    /// value. By default, the `__typename` entry of the value names the
    /// object type.
    fn resolve_abstract_type<'a>(
        &self,
        schema: &'a s::Document,
        abstract_type: CompositeType<'_>,
        value: &r::Value,
    ) -> Option<&'a s::ObjectType> {
        let name = match value.get("__typename") {
            Some(r::Value::String(name)) => name,
            _ => return None,
        };
        match schema.get_named_type(name) {
            Some(s::TypeDefinition::Object(t)) if sast::is_possible_type(abstract_type, t) => {
                Some(t)
            }
            _ => None,
        }
    }
}

/// Field resolvers, by object type and field name. Fields without a
/// resolver are looked up by name in the parent object.
#[derive(Clone, Default)]
pub struct ResolverMap {
    types: BTreeMap<String, BTreeMap<String, FieldResolver>>,
}

impl ResolverMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the resolver for `type_name.field_name`, replacing any
    /// earlier one.
    pub fn field<F>(mut self, type_name: &str, field_name: &str, resolver: F) -> Self
    where
        F: Fn(&r::Value, &Arguments) -> Result<r::Value, Error> + Send + Sync + 'static,
    {
        self.types
            .entry(type_name.to_owned())
            .or_default()
            .insert(field_name.to_owned(), Arc::new(resolver));
        self
    }

    pub fn get(&self, type_name: &str, field_name: &str) -> Option<&FieldResolver> {
        self.types.get(type_name)?.get(field_name)
    }

    /// All `(type, field)` pairs that have a resolver.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.types.iter().flat_map(|(type_name, fields)| {
            fields
                .keys()
                .map(move |field_name| (type_name.as_str(), field_name.as_str()))
        })
    }
}

impl fmt::Debug for ResolverMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.bindings()).finish()
    }
}

impl Resolver for ResolverMap {
    fn resolve_field(
        &self,
        object_type: &s::ObjectType,
        parent: &r::Value,
        field: &q::Field,
        arguments: &Arguments,
    ) -> Result<r::Value, Error> {
        match self.get(&object_type.name, &field.name) {
            Some(resolver) => resolver(parent, arguments),
            None => Ok(parent.get(&field.name).cloned().unwrap_or(r::Value::Null)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph::object;

    fn object_type(name: &str) -> s::ObjectType {
        s::ObjectType::new(name.to_owned())
    }

    fn field(name: &str) -> q::Field {
        q::Field {
            position: q::Pos::default(),
            alias: None,
            name: name.to_owned(),
            arguments: vec![],
            directives: vec![],
            selection_set: q::SelectionSet {
                span: (q::Pos::default(), q::Pos::default()),
                items: vec![],
            },
        }
    }

    #[test]
    fn registered_resolvers_receive_arguments() {
        let resolvers = ResolverMap::new().field("Query", "echo", |_, args| {
            Ok(args.get("value").cloned().unwrap_or(r::Value::Null))
        });
        let mut args = Arguments::new();
        args.insert("value".to_owned(), r::Value::from("hi"));

        let value = resolvers
            .resolve_field(&object_type("Query"), &r::Value::Null, &field("echo"), &args)
            .unwrap();
        assert_eq!(value, r::Value::from("hi"));
    }

    #[test]
    fn default_resolver_reads_the_parent() {
        let resolvers = ResolverMap::new();
        let parent = object! { name: "Ada" };
        let query = object_type("Query");

        assert_eq!(
            resolvers
                .resolve_field(&query, &parent, &field("name"), &Arguments::new())
                .unwrap(),
            r::Value::from("Ada")
        );
        assert_eq!(
            resolvers
                .resolve_field(&query, &parent, &field("missing"), &Arguments::new())
                .unwrap(),
            r::Value::Null
        );
    }

    #[test]
    fn bindings_list_registered_fields() {
        let resolvers = ResolverMap::new()
            .field("Query", "b", |_, _| Ok(r::Value::Null))
            .field("Query", "a", |_, _| Ok(r::Value::Null));
        assert_eq!(
            resolvers.bindings().collect::<Vec<_>>(),
            vec![("Query", "a"), ("Query", "b")]
        );
    }
}
