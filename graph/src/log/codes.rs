use std::fmt::{Display, Error, Formatter};

pub enum LogCode {
    QueryExecutionFailure,
    ScalarCoercionFailure,
    ResolverFailure,
}

impl Display for LogCode {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let value = match self {
            LogCode::QueryExecutionFailure => "QueryExecutionFailure",
            LogCode::ScalarCoercionFailure => "ScalarCoercionFailure",
            LogCode::ResolverFailure => "ResolverFailure",
        };
        write!(f, "{}", value)
    }
}

impl slog::Value for LogCode {
    fn serialize(
        &self,
        _rec: &slog::Record,
        key: slog::Key,
        serializer: &mut dyn slog::Serializer,
    ) -> slog::Result {
        serializer.emit_str(key, format!("{}", self).as_str())
    }
}
