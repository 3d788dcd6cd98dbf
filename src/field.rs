//! Helpers for reading fields from loosely typed JSON request bodies.
//!
//! Request bodies are read into structs of `Option<serde_json::Value>` so that
//! each field can be checked in turn and reported with its own error, rather
//! than the whole body failing on the first wrong type.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

/// Get the field as a string if it is a string with at least one non-whitespace character.
pub fn non_empty_str(field: &Option<Value>) -> Option<&str> {
    field
        .as_ref()
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
}

/// Get the field as an integer if it is a JSON number with no fractional part.
pub fn integer(field: &Option<Value>) -> Option<i64> {
    match field {
        Some(Value::Number(number)) => number.as_i64(),
        _ => None,
    }
}

/// Get the field as an exact decimal if it is a JSON number that fits in a [Decimal].
///
/// Strings are not accepted, even if they contain a number.
pub fn decimal(field: &Option<Value>) -> Option<Decimal> {
    let Some(Value::Number(number)) = field else {
        return None;
    };

    // With arbitrary precision enabled, the number keeps the text the client sent.
    let text = number.to_string();

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

#[cfg(test)]
mod field_tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde_json::{Value, json};

    use crate::field::{decimal, integer, non_empty_str};

    fn parse(raw: &str) -> Option<Value> {
        Some(serde_json::from_str(raw).unwrap())
    }

    #[test]
    fn non_empty_str_rejects_blank_and_non_strings() {
        assert_eq!(non_empty_str(&Some(json!(" food "))), Some(" food "));
        assert_eq!(non_empty_str(&Some(json!("   "))), None);
        assert_eq!(non_empty_str(&Some(json!(7))), None);
        assert_eq!(non_empty_str(&None), None);
    }

    #[test]
    fn integer_rejects_strings_and_fractions() {
        assert_eq!(integer(&Some(json!(123123))), Some(123123));
        assert_eq!(integer(&Some(json!("123123"))), None);
        assert_eq!(integer(&parse("1.5")), None);
        assert_eq!(integer(&None), None);
    }

    #[test]
    fn decimal_keeps_the_exact_value() {
        assert_eq!(
            decimal(&parse("0.1000000000000000055511151231")),
            Some(Decimal::from_str("0.1000000000000000055511151231").unwrap())
        );
        assert_eq!(decimal(&parse("-12")), Some(Decimal::from(-12)));
    }

    #[test]
    fn decimal_accepts_exponents() {
        assert_eq!(decimal(&parse("1.5e2")), Some(Decimal::from(150)));
    }

    #[test]
    fn decimal_rejects_strings() {
        assert_eq!(decimal(&Some(json!("12"))), None);
        assert_eq!(decimal(&Some(Value::Null)), None);
    }

    #[test]
    fn decimal_rejects_numbers_too_large_for_a_decimal() {
        assert_eq!(decimal(&parse("1e400")), None);
    }
}
