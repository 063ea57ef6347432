/// The scalars every schema has, whether it declares them or not.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BuiltInScalarType {
    Boolean,
    Int,
    Float,
    String,
    ID,
}

impl BuiltInScalarType {
    pub const ALL: [BuiltInScalarType; 5] = [
        BuiltInScalarType::Boolean,
        BuiltInScalarType::Int,
        BuiltInScalarType::Float,
        BuiltInScalarType::String,
        BuiltInScalarType::ID,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltInScalarType::Boolean => "Boolean",
            BuiltInScalarType::Int => "Int",
            BuiltInScalarType::Float => "Float",
            BuiltInScalarType::String => "String",
            BuiltInScalarType::ID => "ID",
        }
    }
}

impl TryFrom<&str> for BuiltInScalarType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Boolean" => Ok(BuiltInScalarType::Boolean),
            "Int" => Ok(BuiltInScalarType::Int),
            "Float" => Ok(BuiltInScalarType::Float),
            "String" => Ok(BuiltInScalarType::String),
            "ID" => Ok(BuiltInScalarType::ID),
            _ => Err(()),
        }
    }
}
