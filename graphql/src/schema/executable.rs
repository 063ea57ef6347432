use graph::prelude::*;

use crate::execution::ResolverMap;
use crate::scalars::ScalarRegistry;

/// A schema together with the resolvers and custom scalars that make it
/// executable. Immutable once built, so it can be shared between queries.
#[derive(Debug)]
pub struct ExecutableSchema {
    schema: Schema,
    resolvers: ResolverMap,
    scalars: ScalarRegistry,
}

impl ExecutableSchema {
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn document(&self) -> &s::Document {
        &self.schema.document
    }

    pub fn resolvers(&self) -> &ResolverMap {
        &self.resolvers
    }

    pub fn scalars(&self) -> &ScalarRegistry {
        &self.scalars
    }

    pub fn get_named_type(&self, name: &str) -> Option<&s::TypeDefinition> {
        self.schema.get_named_type(name)
    }
}

/// Builds an executable schema from SDL. Every scalar binding must name a
/// scalar the SDL declares, and every resolver a field of an object type.
pub fn make_executable_schema(
    type_defs: &str,
    resolvers: ResolverMap,
    scalars: ScalarRegistry,
) -> Result<Arc<ExecutableSchema>, SchemaError> {
    let schema = Schema::parse(type_defs)?;

    for scalar in scalars.iter() {
        match schema.get_named_type(scalar.name()) {
            Some(s::TypeDefinition::Scalar(_)) => {}
            Some(_) => return Err(SchemaError::NotAScalar(scalar.name().to_owned())),
            None => return Err(SchemaError::TypeNotDefined(scalar.name().to_owned())),
        }
    }

    for (type_name, field_name) in resolvers.bindings() {
        let object_type = match schema.get_named_type(type_name) {
            Some(s::TypeDefinition::Object(t)) => t,
            Some(_) => return Err(SchemaError::NotAnObject(type_name.to_owned())),
            None => return Err(SchemaError::TypeNotDefined(type_name.to_owned())),
        };
        if object_type.field(field_name).is_none() {
            return Err(SchemaError::FieldNotDefined(
                type_name.to_owned(),
                field_name.to_owned(),
            ));
        }
    }

    Ok(Arc::new(ExecutableSchema {
        schema,
        resolvers,
        scalars,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalars::{DateScalar, ScalarDefinition};

    const TYPE_DEFS: &str = "
        scalar Date
        type Query { today: Date }
    ";

    fn date_scalars(name: &str) -> ScalarRegistry {
        ScalarRegistry::new(vec![ScalarDefinition::new(name, DateScalar::default())]).unwrap()
    }

    #[test]
    fn binds_declared_scalars() {
        let schema =
            make_executable_schema(TYPE_DEFS, ResolverMap::new(), date_scalars("Date")).unwrap();
        assert!(schema.scalars().get("Date").is_some());
        assert!(schema.document().get_root_query_type().is_some());
    }

    #[test]
    fn rejects_scalars_the_schema_does_not_declare() {
        let err = make_executable_schema(TYPE_DEFS, ResolverMap::new(), date_scalars("DateInput"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::TypeNotDefined(name) if name == "DateInput"));

        let err = make_executable_schema(TYPE_DEFS, ResolverMap::new(), date_scalars("Query"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::NotAScalar(name) if name == "Query"));
    }

    #[test]
    fn rejects_resolvers_for_unknown_fields() {
        let resolvers = ResolverMap::new().field("Query", "tomorrow", |_, _| Ok(r::Value::Null));
        let err = make_executable_schema(TYPE_DEFS, resolvers, ScalarRegistry::default())
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::FieldNotDefined(t, f) if t == "Query" && f == "tomorrow"
        ));
    }

    #[test]
    fn rejects_invalid_sdl() {
        let err = make_executable_schema("type Query {", ResolverMap::new(), Default::default())
            .unwrap_err();
        assert!(matches!(err, SchemaError::Parse(_)));
    }
}
