use std::env;
use std::fs;
use std::process::exit;

use graph::log::logger;
use graph::prelude::{info, DocumentExt};
use scalar_graphql::prelude::{
    make_executable_schema, DateScalar, DateTimeScalar, ResolverMap, ScalarDefinition,
    ScalarRegistry,
};

pub fn usage(msg: &str) -> ! {
    println!("{}", msg);
    println!("usage: schema schema.graphql");
    println!("\nCheck the given schema, binding a date scalar to every custom");
    println!("scalar whose name starts with `Date` (`DateTime` scalars get a");
    println!("date and time), and print the resulting schema");
    std::process::exit(1);
}

pub fn ensure<T, E: std::fmt::Display>(res: Result<T, E>, msg: &str) -> T {
    match res {
        Ok(ok) => ok,
        Err(err) => {
            eprintln!("{}:\n    {}", msg, err);
            exit(1)
        }
    }
}

pub fn main() {
    let logger = logger(false);
    let args: Vec<String> = env::args().collect();
    let schema = match args.len() {
        0 | 1 => usage("please provide a GraphQL schema"),
        2 => args[1].clone(),
        _ => usage("too many arguments"),
    };
    let text = ensure(fs::read_to_string(schema), "Can not read schema file");
    let document = ensure(
        graphql_parser::parse_schema::<String>(&text).map(|doc| doc.into_static()),
        "Failed to parse schema",
    );

    let definitions = document
        .get_scalar_type_definitions()
        .into_iter()
        .filter(|scalar| scalar.name.starts_with("Date"))
        .map(|scalar| {
            if scalar.name.starts_with("DateTime") {
                ScalarDefinition::new(scalar.name.clone(), DateTimeScalar::default())
            } else {
                ScalarDefinition::new(scalar.name.clone(), DateScalar::default())
            }
        });
    let scalars = ensure(ScalarRegistry::new(definitions), "Invalid scalar bindings");
    for scalar in scalars.iter() {
        info!(logger, "Bound custom scalar";
              "scalar" => scalar.name(),
              "kind" => format!("{:?}", scalar.kind()));
    }

    let schema = ensure(
        make_executable_schema(&text, ResolverMap::new(), scalars),
        "Failed to build executable schema",
    );

    println!("{}", schema.document());
}
