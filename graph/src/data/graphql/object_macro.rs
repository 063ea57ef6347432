use chrono::{NaiveDate, NaiveDateTime};

use crate::r::Value;

/// Conversion of plain Rust values into resolved values, used by `object!`
/// so that resolvers and tests can write `object! { day: date }`.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_owned())
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Value {
        Value::Int(self.into())
    }
}

/// `None` becomes `null`.
impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

macro_rules! into_value_variants {
    ($($T:ty => $V:ident),* $(,)?) => {
        $(
            impl IntoValue for $T {
                fn into_value(self) -> Value {
                    Value::$V(self)
                }
            }
        )*
    };
}

into_value_variants! {
    String => String,
    i64 => Int,
    f64 => Float,
    bool => Boolean,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
}

/// Builds an `r::Value::Object`. Fields keep the order they are written in.
///
/// ```
/// let event = graph::object! { name: "launch", attendees: 3 };
/// assert_eq!(event.get("attendees"), Some(&graph::r::Value::Int(3)));
/// ```
#[macro_export]
macro_rules! object {
    ($($name:ident: $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut fields = $crate::r::Object::new();
        $(
            fields.insert(
                stringify!($name).to_owned(),
                $crate::data::graphql::object_macro::IntoValue::into_value($value),
            );
        )*
        $crate::r::Value::Object(fields)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objects_keep_field_order() {
        let date = NaiveDate::from_ymd_opt(2006, 9, 13).unwrap();
        let value = crate::object! {
            when: date,
            note: None::<&str>,
            tags: vec!["a", "b"],
        };
        match &value {
            Value::Object(fields) => {
                assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["when", "note", "tags"])
            }
            _ => unreachable!(),
        }
        assert_eq!(value.get("when"), Some(&Value::Date(date)));
        assert_eq!(value.get("note"), Some(&Value::Null));
        assert_eq!(crate::object! {}, Value::Object(Default::default()));
    }
}
