use indexmap::IndexMap;
use std::collections::HashSet;
use std::time::Instant;

use graph::log::codes::LogCode;
use graph::prelude::*;

use crate::execution::{Arguments, Query, Resolver};
use crate::query::ast as qast;
use crate::schema::ast as sast;
use crate::values::{coercion, MaybeCoercible};

/// Contextual information passed around during query execution.
#[derive(Clone)]
pub struct ExecutionContext<R>
where
    R: Resolver,
{
    /// The logger to use.
    pub logger: Logger,

    /// The query to execute.
    pub query: Arc<Query>,

    /// The resolver to use.
    pub resolver: R,

    /// Time at which the query times out.
    pub deadline: Option<Instant>,
}

impl<R: Resolver> ExecutionContext<R> {
    fn document(&self) -> &s::Document {
        self.query.schema.document()
    }
}

/// Executes the root selection set of a query.
pub fn execute_root_selection_set<R: Resolver>(
    ctx: &ExecutionContext<R>,
) -> Result<r::Value, Vec<QueryExecutionError>> {
    // Obtain the root Query type and fail if there isn't one
    let query_type = ctx
        .document()
        .get_root_query_type()
        .ok_or(QueryExecutionError::NoRootQueryObjectType)?;

    // Execute the root selection set against the root query type
    execute_selection_set(
        ctx,
        &[&ctx.query.selection_set],
        query_type,
        &r::Value::Null,
    )
}

/// Executes the merged selection sets of a field, requiring the result to
/// be of the given object type.
fn execute_selection_set<'a, R: Resolver>(
    ctx: &'a ExecutionContext<R>,
    selection_sets: &[&'a q::SelectionSet],
    object_type: &'a s::ObjectType,
    object_value: &r::Value,
) -> Result<r::Value, Vec<QueryExecutionError>> {
    let mut errors: Vec<QueryExecutionError> = Vec::new();
    let mut result_map = r::Object::new();

    // Group fields with the same response key, so we can execute them together
    let grouped_field_set = collect_fields(ctx, object_type, selection_sets);

    // Process all field groups in order
    for (response_key, fields) in grouped_field_set {
        match ctx.deadline {
            Some(deadline) if deadline < Instant::now() => {
                errors.push(QueryExecutionError::Timeout);
                break;
            }
            _ => (),
        }

        let field = fields[0];
        if field.name == "__typename" {
            result_map.insert(
                response_key.to_owned(),
                r::Value::String(object_type.name.clone()),
            );
            continue;
        }

        // If the field exists on the object, execute it and add its result to the result map
        match sast::get_field(object_type, &field.name) {
            Some(field_definition) => {
                match execute_field(ctx, object_type, object_value, field, field_definition, fields)
                {
                    Ok(v) => {
                        result_map.insert(response_key.to_owned(), v);
                    }
                    Err(mut e) => errors.append(&mut e),
                }
            }
            None => errors.push(QueryExecutionError::UnknownField(
                field.position,
                object_type.name.clone(),
                field.name.clone(),
            )),
        }
    }

    if errors.is_empty() {
        Ok(r::Value::Object(result_map))
    } else {
        Err(errors)
    }
}

/// Collects fields of a selection set.
fn collect_fields<'a, R: Resolver>(
    ctx: &'a ExecutionContext<R>,
    object_type: &s::ObjectType,
    selection_sets: &[&'a q::SelectionSet],
) -> IndexMap<&'a str, Vec<&'a q::Field>> {
    let mut grouped_fields = IndexMap::new();
    let mut visited_fragments = HashSet::new();
    for selection_set in selection_sets {
        collect_fields_inner(
            ctx,
            object_type,
            selection_set,
            &mut visited_fragments,
            &mut grouped_fields,
        );
    }
    grouped_fields
}

fn collect_fields_inner<'a, R: Resolver>(
    ctx: &'a ExecutionContext<R>,
    object_type: &s::ObjectType,
    selection_set: &'a q::SelectionSet,
    visited_fragments: &mut HashSet<&'a str>,
    grouped_fields: &mut IndexMap<&'a str, Vec<&'a q::Field>>,
) {
    let variables = &ctx.query.variables;

    // Only consider selections that are not skipped and should be included
    let selections = selection_set
        .items
        .iter()
        .filter(|selection| !qast::skip_selection(selection, variables))
        .filter(|selection| qast::include_selection(selection, variables));

    for selection in selections {
        match selection {
            q::Selection::Field(field) => {
                // Create a field group for this response key on demand and
                // append the selection field to this group.
                let response_key = qast::get_response_key(field);
                grouped_fields.entry(response_key).or_default().push(field);
            }

            q::Selection::FragmentSpread(spread) => {
                // Only consider the fragment if it hasn't already been included,
                // as would be the case if the same fragment spread ...Foo appeared
                // twice in the same selection set
                if !visited_fragments.insert(&spread.fragment_name) {
                    continue;
                }

                // Resolve the fragment using its name and, if it applies, collect
                // fields for the fragment and group them
                if let Some(fragment) = ctx.query.get_fragment(&spread.fragment_name) {
                    let q::TypeCondition::On(type_name) = &fragment.type_condition;
                    if does_fragment_type_apply(ctx, object_type, type_name) {
                        collect_fields_inner(
                            ctx,
                            object_type,
                            &fragment.selection_set,
                            visited_fragments,
                            grouped_fields,
                        );
                    }
                }
            }

            q::Selection::InlineFragment(fragment) => {
                let applies = match &fragment.type_condition {
                    Some(q::TypeCondition::On(type_name)) => {
                        does_fragment_type_apply(ctx, object_type, type_name)
                    }
                    None => true,
                };
                if applies {
                    collect_fields_inner(
                        ctx,
                        object_type,
                        &fragment.selection_set,
                        visited_fragments,
                        grouped_fields,
                    );
                }
            }
        };
    }
}

/// Determines whether a fragment is applicable to the given object type.
fn does_fragment_type_apply<R: Resolver>(
    ctx: &ExecutionContext<R>,
    object_type: &s::ObjectType,
    type_name: &str,
) -> bool {
    sast::composite_type(ctx.document(), type_name)
        .is_some_and(|fragment_type| sast::is_possible_type(fragment_type, object_type))
}

/// Executes a field.
fn execute_field<'a, R: Resolver>(
    ctx: &'a ExecutionContext<R>,
    object_type: &s::ObjectType,
    object_value: &r::Value,
    field: &'a q::Field,
    field_definition: &'a s::Field,
    fields: Vec<&'a q::Field>,
) -> Result<r::Value, Vec<QueryExecutionError>> {
    let argument_values = coerce_argument_values(ctx, object_type, field)?;

    let value = ctx
        .resolver
        .resolve_field(object_type, object_value, field, &argument_values)
        .map_err(|e| {
            debug!(
                ctx.logger,
                "Resolver failed";
                "type" => &object_type.name,
                "field" => &field.name,
                "error" => format!("{:#}", e),
                "code" => LogCode::ResolverFailure,
            );
            vec![QueryExecutionError::ResolverError(
                field.position,
                field.name.clone(),
                format!("{:#}", e),
            )]
        })?;

    complete_value(ctx, field, &field_definition.field_type, &fields, value)
}

/// Ensures that a value matches the expected return type.
fn complete_value<'a, R: Resolver>(
    ctx: &'a ExecutionContext<R>,
    field: &'a q::Field,
    field_type: &'a s::Type,
    fields: &[&'a q::Field],
    resolved_value: r::Value,
) -> Result<r::Value, Vec<QueryExecutionError>> {
    match field_type {
        // Fail if the field type is non-null but the value is null
        s::Type::NonNullType(inner_type) => {
            match complete_value(ctx, field, inner_type, fields, resolved_value)? {
                r::Value::Null => Err(vec![QueryExecutionError::NonNullError(
                    field.position,
                    field.name.to_string(),
                )]),

                v => Ok(v),
            }
        }

        // If the resolved value is null, return null
        _ if resolved_value.is_null() => Ok(resolved_value),

        // Complete list values
        s::Type::ListType(inner_type) => match resolved_value {
            // Complete list values individually
            r::Value::List(values) => {
                let mut out = Vec::with_capacity(values.len());
                for value in values {
                    out.push(complete_value(ctx, field, inner_type, fields, value)?);
                }
                Ok(r::Value::List(out))
            }

            // Return field error if the resolved value for the list is not a list
            _ => Err(vec![QueryExecutionError::ListValueError(
                field.position,
                field.name.to_string(),
            )]),
        },

        s::Type::NamedType(name) => {
            let named_type = ctx
                .query
                .schema
                .get_named_type(name)
                .ok_or_else(|| vec![QueryExecutionError::NamedTypeError(name.to_string())])?;

            match named_type {
                // Complete scalar values by serializing them for the wire
                s::TypeDefinition::Scalar(scalar_type) => {
                    serialize_scalar(ctx, field, scalar_type, resolved_value)
                }

                s::TypeDefinition::Enum(enum_type) => {
                    resolved_value.coerce(enum_type).ok_or_else(|| {
                        vec![QueryExecutionError::ScalarSerializeError(
                            field.position,
                            field.name.clone(),
                            enum_type.name.clone(),
                            format!("{} is not a value of the enum", resolved_value),
                        )]
                    })
                }

                // Complete object types recursively
                s::TypeDefinition::Object(object_type) => execute_selection_set(
                    ctx,
                    &merge_selection_sets(fields),
                    object_type,
                    &resolved_value,
                ),

                // Resolve interface and union types using the resolved value
                // and complete the value recursively
                s::TypeDefinition::Interface(_) | s::TypeDefinition::Union(_) => {
                    let object_type = resolve_abstract_type(ctx, named_type, &resolved_value)?;

                    execute_selection_set(
                        ctx,
                        &merge_selection_sets(fields),
                        object_type,
                        &resolved_value,
                    )
                }

                // Input objects are never resolved
                s::TypeDefinition::InputObject(_) => {
                    Err(vec![QueryExecutionError::NamedTypeError(name.to_string())])
                }
            }
        }
    }
}

/// Serializes a resolved value through the custom scalar bound to
/// `scalar_type`, or checks it against a built-in scalar.
fn serialize_scalar<R: Resolver>(
    ctx: &ExecutionContext<R>,
    field: &q::Field,
    scalar_type: &s::ScalarType,
    value: r::Value,
) -> Result<r::Value, Vec<QueryExecutionError>> {
    let result = match ctx.query.schema.scalars().get(&scalar_type.name) {
        Some(scalar) => scalar.serialize(&value).map_err(|e| e.to_string()),
        None => value
            .coerce(scalar_type)
            .ok_or_else(|| format!("{} is not a valid {}", value, scalar_type.name)),
    };

    result.map_err(|reason| {
        if ENV_VARS.log_scalar_coercion() {
            debug!(
                ctx.logger,
                "Scalar could not be serialized";
                "field" => &field.name,
                "scalar" => &scalar_type.name,
                "error" => &reason,
                "code" => LogCode::ScalarCoercionFailure,
            );
        }
        vec![QueryExecutionError::ScalarSerializeError(
            field.position,
            field.name.clone(),
            scalar_type.name.clone(),
            reason,
        )]
    })
}

/// Resolves an abstract type (interface, union) into an object type based on the given value.
fn resolve_abstract_type<'a, R: Resolver>(
    ctx: &'a ExecutionContext<R>,
    abstract_type: &'a s::TypeDefinition,
    object_value: &r::Value,
) -> Result<&'a s::ObjectType, Vec<QueryExecutionError>> {
    let type_name = sast::get_type_name(abstract_type);
    let composite = sast::composite_type(ctx.document(), type_name)
        .ok_or_else(|| vec![QueryExecutionError::AbstractTypeError(type_name.to_owned())])?;

    // Let the resolver handle the type resolution, return an error if the resolution
    // yields nothing
    ctx.resolver
        .resolve_abstract_type(ctx.document(), composite, object_value)
        .ok_or_else(|| vec![QueryExecutionError::AbstractTypeError(type_name.to_owned())])
}

/// The selection sets of several fields that share a response key.
fn merge_selection_sets<'a>(fields: &[&'a q::Field]) -> Vec<&'a q::SelectionSet> {
    fields.iter().map(|field| &field.selection_set).collect()
}

/// Coerces argument values into GraphQL values.
pub fn coerce_argument_values<R: Resolver>(
    ctx: &ExecutionContext<R>,
    object_type: &s::ObjectType,
    field: &q::Field,
) -> Result<Arguments, Vec<QueryExecutionError>> {
    let mut coerced_values = Arguments::new();
    let mut errors = vec![];

    let resolver = |name: &str| ctx.query.schema.get_named_type(name);

    for argument_def in sast::get_argument_definitions(object_type, &field.name)
        .into_iter()
        .flatten()
    {
        let value = qast::get_argument_value(&field.arguments, &argument_def.name);
        match coercion::coerce_argument_value(
            field.position,
            &field.name,
            argument_def,
            value,
            &resolver,
            ctx.query.schema.scalars(),
            &ctx.query.variables,
        ) {
            Ok(Some(value)) => {
                coerced_values.insert(argument_def.name.clone(), value);
            }
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(coerced_values)
    } else {
        Err(errors)
    }
}
