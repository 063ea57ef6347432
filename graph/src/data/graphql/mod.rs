/// Extension traits for the schema AST.
pub mod ext;

/// Types to represent built in scalar values in GraphQL documents
pub mod scalar;

/// Utilities for working with GraphQL values.
mod values;

/// Helpers for building object values.
pub mod object_macro;

pub use self::object_macro::IntoValue;

pub use self::values::{
    // Trait for converting from GraphQL values into other types.
    TryFromValue,

    // Trait for plucking typed values from a GraphQL list.
    ValueList,

    // Trait for plucking typed values out of a GraphQL value maps.
    ValueMap,
};
