use anyhow::anyhow;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

use crate::prelude::Error;
use crate::r::{Object, Value};

pub trait TryFromValue: Sized {
    fn try_from_value(value: &Value) -> Result<Self, Error>;
}

impl TryFromValue for Value {
    fn try_from_value(value: &Value) -> Result<Self, Error> {
        Ok(value.clone())
    }
}

impl TryFromValue for bool {
    fn try_from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Boolean(b) => Ok(*b),
            _ => Err(anyhow!("Cannot parse value into a boolean: {:?}", value)),
        }
    }
}

impl TryFromValue for String {
    fn try_from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Enum(s) => Ok(s.clone()),
            _ => Err(anyhow!("Cannot parse value into a string: {:?}", value)),
        }
    }
}

impl TryFromValue for i64 {
    fn try_from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Int(n) => Ok(*n),
            _ => Err(anyhow!("Cannot parse value into an integer: {:?}", value)),
        }
    }
}

impl TryFromValue for i32 {
    fn try_from_value(value: &Value) -> Result<Self, Error> {
        let n = i64::try_from_value(value)?;
        i32::try_from(n).map_err(|_| anyhow!("Integer out of range for i32: {}", n))
    }
}

impl TryFromValue for f64 {
    fn try_from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Float(f) => Ok(*f),
            Value::Int(n) => Ok(*n as f64),
            _ => Err(anyhow!("Cannot parse value into a float: {:?}", value)),
        }
    }
}

impl TryFromValue for NaiveDate {
    fn try_from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Date(date) => Ok(*date),
            _ => Err(anyhow!("Cannot parse value into a date: {:?}", value)),
        }
    }
}

impl TryFromValue for NaiveDateTime {
    fn try_from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            _ => Err(anyhow!("Cannot parse value into a datetime: {:?}", value)),
        }
    }
}

impl<T> TryFromValue for Vec<T>
where
    T: TryFromValue,
{
    fn try_from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::List(values) => values.get_values(),
            _ => Err(anyhow!("Cannot parse value into a vector: {:?}", value)),
        }
    }
}

pub trait ValueMap {
    fn get_required<T: TryFromValue>(&self, key: &str) -> Result<T, Error>;
    fn get_optional<T: TryFromValue>(&self, key: &str) -> Result<Option<T>, Error>;
}

impl ValueMap for Value {
    fn get_required<T: TryFromValue>(&self, key: &str) -> Result<T, Error> {
        match self {
            Value::Object(map) => map.get_required(key),
            _ => Err(anyhow!("value is not a map: {:?}", self)),
        }
    }

    fn get_optional<T>(&self, key: &str) -> Result<Option<T>, Error>
    where
        T: TryFromValue,
    {
        match self {
            Value::Object(map) => map.get_optional(key),
            _ => Err(anyhow!("value is not a map: {:?}", self)),
        }
    }
}

fn required<T: TryFromValue>(value: Option<&Value>, key: &str) -> Result<T, Error> {
    value
        .ok_or_else(|| anyhow!("Required field `{}` not set", key))
        .and_then(T::try_from_value)
}

fn optional<T: TryFromValue>(value: Option<&Value>) -> Result<Option<T>, Error> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::try_from_value(value).map(Some),
    }
}

/// Field arguments.
impl ValueMap for BTreeMap<String, Value> {
    fn get_required<T: TryFromValue>(&self, key: &str) -> Result<T, Error> {
        required(self.get(key), key)
    }

    fn get_optional<T: TryFromValue>(&self, key: &str) -> Result<Option<T>, Error> {
        optional(self.get(key))
    }
}

/// Fields of object values.
impl ValueMap for Object {
    fn get_required<T: TryFromValue>(&self, key: &str) -> Result<T, Error> {
        required(self.get(key), key)
    }

    fn get_optional<T: TryFromValue>(&self, key: &str) -> Result<Option<T>, Error> {
        optional(self.get(key))
    }
}

pub trait ValueList {
    fn get_values<T>(&self) -> Result<Vec<T>, Error>
    where
        T: TryFromValue;
}

impl ValueList for Vec<Value> {
    fn get_values<T>(&self) -> Result<Vec<T>, Error>
    where
        T: TryFromValue,
    {
        self.iter().try_fold(vec![], |mut acc, value| {
            acc.push(T::try_from_value(value)?);
            Ok(acc)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;

    #[test]
    fn required_and_optional_values() {
        let date = NaiveDate::from_ymd_opt(2006, 9, 13).unwrap();
        let map = btreemap! {
            "value".to_owned() => Value::Date(date),
            "missing".to_owned() => Value::Null,
            "dates".to_owned() => Value::List(vec![Value::Date(date)]),
        };

        assert_eq!(map.get_required::<NaiveDate>("value").unwrap(), date);
        assert_eq!(map.get_optional::<NaiveDate>("missing").unwrap(), None);
        assert_eq!(map.get_optional::<bool>("absent").unwrap(), None);
        assert_eq!(map.get_required::<Vec<NaiveDate>>("dates").unwrap(), vec![date]);
        assert!(map.get_required::<String>("value").is_err());
        assert!(map.get_required::<String>("absent").is_err());
    }

    #[test]
    fn object_fields() {
        let value = crate::object! { start: "2006-09-13", end: Value::Null };
        assert_eq!(value.get_required::<String>("start").unwrap(), "2006-09-13");
        assert_eq!(value.get_optional::<String>("end").unwrap(), None);
        assert!(Value::Int(1).get_optional::<String>("start").is_err());
    }
}
