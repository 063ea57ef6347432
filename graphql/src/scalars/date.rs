use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{NaiveDateTime, NaiveTime};
use std::fmt::Write;

use graph::data::value::{DATE_FORMAT, DATE_TIME_FORMAT};
use graph::prelude::{q, r};

use super::{literal_kind, CustomScalar, FormatMismatch, ScalarError};

/// Parse `value` with the strftime-style `format`. Only strings are
/// accepted. Fields the format does not mention default to midnight.
pub fn strptime(value: &r::Value, format: &str) -> Result<NaiveDateTime, FormatMismatch> {
    let input = match value {
        r::Value::String(s) => s,
        other => return Err(FormatMismatch::NotAString(other.type_name())),
    };
    let mismatch = || FormatMismatch::Pattern {
        input: input.clone(),
        format: format.to_owned(),
    };

    if !has_strict_widths(input, format) {
        return Err(mismatch());
    }

    let mut parsed = Parsed::default();
    format::parse(&mut parsed, input, StrftimeItems::new(format)).map_err(|_| mismatch())?;
    let date = parsed.to_naive_date().map_err(|_| mismatch())?;
    let time = parsed.to_naive_time().unwrap_or(NaiveTime::MIN);
    Ok(date.and_time(time))
}

/// Checks the digit counts of the numeric fields in `input`: `%Y` takes
/// exactly four digits, `%m %d %H %M %S` one or two. Signs and padding
/// whitespace are rejected. Other fields are left to chrono.
fn has_strict_widths(input: &str, format: &str) -> bool {
    let mut rest = input;
    let mut spec = format.chars();
    while let Some(c) = spec.next() {
        let (min, max) = match c {
            '%' => match spec.next() {
                Some('Y') => (4, 4),
                Some('m' | 'd' | 'H' | 'M' | 'S') => (1, 2),
                Some('%') => match rest.strip_prefix('%') {
                    Some(tail) => {
                        rest = tail;
                        continue;
                    }
                    None => return false,
                },
                _ => return true,
            },
            _ => match rest.strip_prefix(c) {
                Some(tail) => {
                    rest = tail;
                    continue;
                }
                None => return false,
            },
        };
        let digits = rest
            .bytes()
            .take(max)
            .take_while(u8::is_ascii_digit)
            .count();
        if digits < min {
            return false;
        }
        rest = &rest[digits..];
    }
    rest.is_empty()
}

/// Format `value` with `format`. Fails if `format` is not a valid
/// strftime-style format.
pub fn strftime(value: &NaiveDateTime, format: &str) -> Result<String, ScalarError> {
    let mut out = String::new();
    write!(out, "{}", value.format(format))
        .map_err(|_| ScalarError::InvalidFormat(format.to_owned()))?;
    Ok(out)
}

fn internal_date_time(
    value: &r::Value,
    expected: &'static str,
) -> Result<NaiveDateTime, ScalarError> {
    match value {
        r::Value::Date(date) => Ok(date.and_time(NaiveTime::MIN)),
        r::Value::DateTime(dt) => Ok(*dt),
        other => Err(ScalarError::UnexpectedValue {
            expected,
            found: other.type_name(),
        }),
    }
}

fn literal_string(literal: &q::Value) -> Result<r::Value, ScalarError> {
    match literal {
        q::Value::String(s) => Ok(r::Value::String(s.clone())),
        other => Err(ScalarError::WrongLiteralKind(literal_kind(other))),
    }
}

/// A calendar date, written as text in `format` on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateScalar {
    format: String,
}

impl DateScalar {
    pub fn new(format: impl Into<String>) -> Self {
        DateScalar {
            format: format.into(),
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }
}

impl Default for DateScalar {
    fn default() -> Self {
        DateScalar::new(DATE_FORMAT)
    }
}

impl CustomScalar for DateScalar {
    fn serialize(&self, value: &r::Value) -> Result<r::Value, ScalarError> {
        let dt = internal_date_time(value, "date")?;
        strftime(&dt, &self.format).map(r::Value::String)
    }

    fn parse_literal(&self, literal: &q::Value) -> Result<r::Value, ScalarError> {
        self.parse_value(&literal_string(literal)?)
    }

    fn parse_value(&self, value: &r::Value) -> Result<r::Value, ScalarError> {
        Ok(r::Value::Date(strptime(value, &self.format)?.date()))
    }
}

/// A date and time of day without a timezone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateTimeScalar {
    format: String,
}

impl DateTimeScalar {
    pub fn new(format: impl Into<String>) -> Self {
        DateTimeScalar {
            format: format.into(),
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }
}

impl Default for DateTimeScalar {
    fn default() -> Self {
        DateTimeScalar::new(DATE_TIME_FORMAT)
    }
}

impl CustomScalar for DateTimeScalar {
    fn serialize(&self, value: &r::Value) -> Result<r::Value, ScalarError> {
        let dt = internal_date_time(value, "datetime")?;
        strftime(&dt, &self.format).map(r::Value::String)
    }

    fn parse_literal(&self, literal: &q::Value) -> Result<r::Value, ScalarError> {
        self.parse_value(&literal_string(literal)?)
    }

    fn parse_value(&self, value: &r::Value) -> Result<r::Value, ScalarError> {
        Ok(r::Value::DateTime(strptime(value, &self.format)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2006, 9, 13).unwrap()
    }

    #[test]
    fn date_serializes_with_its_format() {
        let scalar = DateScalar::default();
        assert_eq!(
            scalar.serialize(&r::Value::Date(date())),
            Ok(r::Value::from("2006-09-13"))
        );
        let dt = date().and_hms_opt(23, 59, 0).unwrap();
        assert_eq!(
            scalar.serialize(&r::Value::DateTime(dt)),
            Ok(r::Value::from("2006-09-13"))
        );
        assert_eq!(
            DateScalar::new("%d/%m/%Y").serialize(&r::Value::Date(date())),
            Ok(r::Value::from("13/09/2006"))
        );
    }

    #[test]
    fn date_serialize_rejects_other_values() {
        assert_eq!(
            DateScalar::default().serialize(&r::Value::from("2006-09-13")),
            Err(ScalarError::UnexpectedValue {
                expected: "date",
                found: "str"
            })
        );
    }

    #[test]
    fn date_parses_literals() {
        let scalar = DateScalar::default();
        assert_eq!(
            scalar.parse_literal(&q::Value::String("2006-09-13".to_owned())),
            Ok(r::Value::Date(date()))
        );
        assert_eq!(
            scalar.parse_literal(&q::Value::Int(123.into())),
            Err(ScalarError::WrongLiteralKind("Int"))
        );

        let err = scalar
            .parse_literal(&q::Value::String("invalid string".to_owned()))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "time data 'invalid string' does not match format '%Y-%m-%d'"
        );
    }

    #[test]
    fn date_parses_values() {
        let scalar = DateScalar::default();
        assert_eq!(
            scalar.parse_value(&r::Value::from("2006-09-13")),
            Ok(r::Value::Date(date()))
        );
        assert_eq!(
            scalar.parse_value(&r::Value::Int(123)).unwrap_err().to_string(),
            "strptime() argument 1 must be str, not int"
        );
    }

    #[test]
    fn date_time_round_trips_through_its_format() {
        let scalar = DateTimeScalar::default();
        let parsed = scalar
            .parse_value(&r::Value::from("2006-09-13T08:30:15"))
            .unwrap();
        assert_eq!(
            parsed,
            r::Value::DateTime(date().and_hms_opt(8, 30, 15).unwrap())
        );
        assert_eq!(
            scalar.serialize(&parsed),
            Ok(r::Value::from("2006-09-13T08:30:15"))
        );
        assert_eq!(
            scalar.serialize(&r::Value::Date(date())),
            Ok(r::Value::from("2006-09-13T00:00:00"))
        );
    }

    #[test]
    fn strptime_needs_the_whole_date() {
        assert_eq!(
            strptime(&r::Value::from("2006-09"), "%Y-%m"),
            Err(FormatMismatch::Pattern {
                input: "2006-09".to_owned(),
                format: "%Y-%m".to_owned(),
            })
        );
        assert!(strptime(&r::Value::from("2006-09-13 trailing"), DATE_FORMAT).is_err());
    }

    #[test]
    fn strptime_years_have_four_digits() {
        for input in ["06-09-13", "+2006-09-13", "-2006-09-13", " 2006-09-13", "20060-09-13"] {
            assert_eq!(
                DateScalar::default().parse_value(&r::Value::from(input)),
                Err(ScalarError::FormatMismatch(FormatMismatch::Pattern {
                    input: input.to_owned(),
                    format: DATE_FORMAT.to_owned(),
                })),
                "{}",
                input
            );
        }
    }

    #[test]
    fn strptime_accepts_unpadded_days_and_months() {
        assert_eq!(
            DateScalar::default().parse_value(&r::Value::from("2006-9-3")),
            Ok(r::Value::Date(NaiveDate::from_ymd_opt(2006, 9, 3).unwrap()))
        );
        assert!(DateScalar::default()
            .parse_value(&r::Value::from("2006-09-+3"))
            .is_err());
        assert!(DateScalar::default()
            .parse_value(&r::Value::from("2006-13-01"))
            .is_err());
        assert!(strptime(&r::Value::from("100%-09-13"), "%Y%%-%m-%d").is_err());
        assert_eq!(
            strptime(&r::Value::from("2006%-09-13"), "%Y%%-%m-%d").map(|dt| dt.date()),
            Ok(NaiveDate::from_ymd_opt(2006, 9, 13).unwrap())
        );
    }
}
