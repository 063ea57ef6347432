use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Instant;

use graph::data::query::{Query as GraphDataQuery, QueryVariables};
use graph::log::codes::LogCode;
use graph::prelude::{
    debug, info, o, q, r, s, DocumentExt, Logger, QueryExecutionError, TypeExt, ENV_VARS,
};

use crate::query::ast as qast;
use crate::schema::ast::{self as sast, CompositeType};
use crate::schema::ExecutableSchema;
use crate::values::coercion;

/// A GraphQL query that has been preprocessed and checked and is ready
/// for execution. Checking includes validating all fields and argument
/// literals, limiting the depth of the query and coercing the variables.
pub struct Query {
    /// The schema against which to execute the query
    pub schema: Arc<ExecutableSchema>,
    /// The root selection set of the operation being executed
    pub selection_set: q::SelectionSet,
    pub(crate) fragments: HashMap<String, q::FragmentDefinition>,
    /// The variables for the query, coerced into proper values
    pub variables: HashMap<String, r::Value>,

    pub logger: Logger,

    start: Instant,

    /// Used only for logging
    pub query_text: Arc<String>,
    pub variables_text: Arc<String>,
    pub query_id: String,
}

impl Query {
    /// Process the raw GraphQL query `query` and prepare for executing it.
    /// If validation fails, or variables can not be coerced, the errors are
    /// returned and the query must not be executed.
    pub fn new(
        logger: &Logger,
        schema: Arc<ExecutableSchema>,
        query: GraphDataQuery,
        max_depth: u8,
    ) -> Result<Arc<Self>, Vec<QueryExecutionError>> {
        let operation = qast::get_operation(&query.document, query.operation_name.as_deref())?;

        let selection_set = match operation {
            q::OperationDefinition::Query(q::Query { selection_set, .. }) => selection_set,
            // Queries can be run by just sending a selection set
            q::OperationDefinition::SelectionSet(selection_set) => selection_set,
            q::OperationDefinition::Mutation(_) => {
                return Err(vec![QueryExecutionError::NotSupported(
                    "Mutations are not supported".to_owned(),
                )])
            }
            q::OperationDefinition::Subscription(_) => {
                return Err(vec![QueryExecutionError::NotSupported(
                    "Subscriptions are not supported".to_owned(),
                )])
            }
        };

        let fragments = query
            .document
            .definitions
            .iter()
            .filter_map(|d| match d {
                q::Definition::Fragment(frag) => Some((frag.name.clone(), frag.clone())),
                _ => None,
            })
            .collect();

        let declared_variables = qast::get_variable_definitions(operation)
            .into_iter()
            .flatten()
            .map(|def| def.name.clone())
            .collect();

        let query_id = {
            let mut hasher = DefaultHasher::new();
            query.query_text.hash(&mut hasher);
            query.variables_text.hash(&mut hasher);
            format!("{:x}", hasher.finish())
        };
        let logger = logger.new(o!("query_id" => query_id.clone()));

        let start = Instant::now();
        let raw_query = RawQuery {
            schema: &schema,
            selection_set,
            fragments: &fragments,
            declared_variables,
        };

        // Check depth first so that `validate_fields` doesn't risk a stack
        // overflow from cyclic fragments.
        raw_query.check_depth(max_depth)?;
        raw_query.validate_fields()?;

        let variables = coerce_variables(&logger, &schema, operation, query.variables)?;

        Ok(Arc::new(Query {
            selection_set: selection_set.clone(),
            schema,
            fragments,
            variables,
            logger,
            start,
            query_text: query.query_text.clone(),
            variables_text: query.variables_text.clone(),
            query_id,
        }))
    }

    pub fn get_fragment(&self, name: &str) -> Option<&q::FragmentDefinition> {
        self.fragments.get(name)
    }

    /// Log details about the overall execution of the query
    pub fn log_execution(&self) {
        if ENV_VARS.log_gql_timing() {
            info!(
                &self.logger,
                "Query timing (GraphQL)";
                "query" => &*self.query_text,
                "variables" => &*self.variables_text,
                "query_time_ms" => self.start.elapsed().as_millis(),
            );
        }
    }
}

/// Coerces variable values for an operation.
fn coerce_variables(
    logger: &Logger,
    schema: &ExecutableSchema,
    operation: &q::OperationDefinition,
    mut variables: Option<QueryVariables>,
) -> Result<HashMap<String, r::Value>, Vec<QueryExecutionError>> {
    let mut coerced_values = HashMap::new();
    let mut errors = vec![];
    let resolver = |name: &str| schema.get_named_type(name);

    for variable_def in qast::get_variable_definitions(operation)
        .into_iter()
        .flatten()
    {
        // Skip variable if it has an invalid type
        if !sast::is_input_type(schema.document(), &variable_def.var_type) {
            errors.push(QueryExecutionError::InvalidVariableTypeError(
                variable_def.position,
                variable_def.name.to_owned(),
            ));
            continue;
        }

        let value = variables
            .as_mut()
            .and_then(|vars| vars.remove(&variable_def.name));

        let coerced = match (value, &variable_def.default_value) {
            (Some(value), _) => {
                coercion::coerce_value(&value, &variable_def.var_type, &resolver, schema.scalars())
                    .map_err(|e| e.for_variable(variable_def.position, &variable_def.name))
            }
            (None, Some(default)) => coercion::coerce_literal(
                default,
                &variable_def.var_type,
                &resolver,
                schema.scalars(),
                Some(&HashMap::new()),
            )
            .map_err(|e| e.at(variable_def.position)),
            // No variable value provided and no default for non-null type, fail
            (None, None) => {
                if variable_def.var_type.is_non_null() {
                    errors.push(QueryExecutionError::MissingVariableError(
                        variable_def.position,
                        variable_def.name.to_owned(),
                        variable_def.var_type.to_string(),
                    ));
                }
                continue;
            }
        };

        match coerced {
            Ok(value) => {
                coerced_values.insert(variable_def.name.to_owned(), value);
            }
            Err(e) => {
                if ENV_VARS.log_scalar_coercion() {
                    debug!(
                        logger,
                        "Variable could not be coerced";
                        "variable" => &variable_def.name,
                        "error" => e.to_string(),
                        "code" => LogCode::ScalarCoercionFailure,
                    );
                }
                errors.push(e);
            }
        }
    }

    if errors.is_empty() {
        Ok(coerced_values)
    } else {
        Err(errors)
    }
}

struct RawQuery<'a> {
    schema: &'a ExecutableSchema,
    /// The root selection set of the query
    selection_set: &'a q::SelectionSet,
    fragments: &'a HashMap<String, q::FragmentDefinition>,
    declared_variables: HashSet<String>,
}

impl<'a> RawQuery<'a> {
    fn check_depth(&self, max_depth: u8) -> Result<(), QueryExecutionError> {
        self.check_depth_inner(self.selection_set, max_depth, 0, &HashSet::new())
    }

    fn check_depth_inner(
        &self,
        selection_set: &'a q::SelectionSet,
        max_depth: u8,
        depth: u8,
        visited_fragments: &HashSet<&'a str>,
    ) -> Result<(), QueryExecutionError> {
        if depth >= max_depth {
            return Err(QueryExecutionError::TooDeep(max_depth));
        }

        for selection in &selection_set.items {
            match selection {
                q::Selection::Field(field) => {
                    // Empty selection sets are the base case.
                    if !field.selection_set.items.is_empty() {
                        self.check_depth_inner(
                            &field.selection_set,
                            max_depth,
                            depth + 1,
                            visited_fragments,
                        )?;
                    }
                }
                q::Selection::FragmentSpread(spread) => {
                    // Undefined fragments are reported by `validate_fields`
                    let def = match self.fragments.get(&spread.fragment_name) {
                        Some(def) => def,
                        None => continue,
                    };

                    // Copy `visited_fragments` on write.
                    let mut visited_fragments = visited_fragments.clone();
                    if !visited_fragments.insert(&spread.fragment_name) {
                        return Err(QueryExecutionError::CyclicalFragment(
                            spread.fragment_name.clone(),
                        ));
                    }
                    self.check_depth_inner(
                        &def.selection_set,
                        max_depth,
                        depth + 1,
                        &visited_fragments,
                    )?;
                }
                q::Selection::InlineFragment(fragment) => {
                    self.check_depth_inner(
                        &fragment.selection_set,
                        max_depth,
                        depth + 1,
                        visited_fragments,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn validate_fields(&self) -> Result<(), Vec<QueryExecutionError>> {
        let root_type = self
            .schema
            .document()
            .get_root_query_type()
            .ok_or(QueryExecutionError::NoRootQueryObjectType)?;

        let mut errors = self.validate_fields_inner(root_type.into(), self.selection_set);
        for fragment in self.fragments.values() {
            let q::TypeCondition::On(type_name) = &fragment.type_condition;
            match sast::composite_type(self.schema.document(), type_name) {
                Some(ty) => errors.extend(self.validate_fields_inner(ty, &fragment.selection_set)),
                None => errors.push(QueryExecutionError::NamedTypeError(type_name.clone())),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    // Checks for invalid selections and arguments.
    fn validate_fields_inner(
        &self,
        ty: CompositeType<'_>,
        selection_set: &q::SelectionSet,
    ) -> Vec<QueryExecutionError> {
        let schema = self.schema.document();

        selection_set
            .items
            .iter()
            .fold(vec![], |mut errors, selection| {
                match selection {
                    q::Selection::Field(field) if field.name == "__typename" => {}
                    q::Selection::Field(field) => match ty.field(&field.name) {
                        Some(s_field) => {
                            errors.extend(self.validate_arguments(field, s_field));

                            let base_type = s_field.field_type.get_base_type();
                            if schema.get_named_type(base_type).is_none() {
                                errors.push(QueryExecutionError::NamedTypeError(base_type.into()));
                            } else if let Some(ty) = sast::composite_type(schema, base_type) {
                                if field.selection_set.items.is_empty() {
                                    errors.push(QueryExecutionError::EmptySelectionSet(
                                        base_type.to_owned(),
                                    ));
                                } else {
                                    errors.extend(
                                        self.validate_fields_inner(ty, &field.selection_set),
                                    );
                                }
                            }
                        }
                        None => errors.push(QueryExecutionError::UnknownField(
                            field.position,
                            ty.name().into(),
                            field.name.clone(),
                        )),
                    },
                    q::Selection::FragmentSpread(fragment) => {
                        // Fragment definitions are validated on their own
                        if !self.fragments.contains_key(&fragment.fragment_name) {
                            errors.push(QueryExecutionError::UndefinedFragment(
                                fragment.fragment_name.clone(),
                            ));
                        }
                    }
                    q::Selection::InlineFragment(fragment) => match &fragment.type_condition {
                        Some(q::TypeCondition::On(type_name)) => {
                            match sast::composite_type(schema, type_name) {
                                Some(ty) => errors
                                    .extend(self.validate_fields_inner(ty, &fragment.selection_set)),
                                None => errors
                                    .push(QueryExecutionError::NamedTypeError(type_name.clone())),
                            }
                        }
                        None => errors.extend(self.validate_fields_inner(ty, &fragment.selection_set)),
                    },
                }
                errors
            })
    }

    /// Checks the arguments of `field` against its definition. Literals are
    /// coerced here, before any variable values are known, so that invalid
    /// literals keep the query from executing at all.
    fn validate_arguments(
        &self,
        field: &q::Field,
        s_field: &s::Field,
    ) -> Vec<QueryExecutionError> {
        let mut errors = vec![];
        let resolver = |name: &str| self.schema.get_named_type(name);

        for (name, value) in &field.arguments {
            let def = match s_field.arguments.iter().find(|arg| &arg.name == name) {
                Some(def) => def,
                None => {
                    errors.push(QueryExecutionError::UnknownArgument(
                        field.position,
                        field.name.clone(),
                        name.clone(),
                    ));
                    continue;
                }
            };

            let mut undefined = vec![];
            qast::for_each_variable(value, &mut |var| {
                if !self.declared_variables.contains(var) {
                    undefined.push(var.to_owned());
                }
            });
            if !undefined.is_empty() {
                errors.extend(
                    undefined
                        .into_iter()
                        .map(|var| QueryExecutionError::UndefinedVariable(field.position, var)),
                );
                continue;
            }

            if let Err(e) = coercion::coerce_literal(
                value,
                &def.value_type,
                &resolver,
                self.schema.scalars(),
                None,
            ) {
                errors.push(e.at(field.position));
            }
        }

        for def in &s_field.arguments {
            let given = qast::get_argument_value(&field.arguments, &def.name).is_some();
            if !given && def.default_value.is_none() && def.value_type.is_non_null() {
                errors.push(QueryExecutionError::MissingArgumentError(
                    field.position,
                    field.name.clone(),
                    def.name.clone(),
                    def.value_type.to_string(),
                ));
            }
        }

        errors
    }
}
