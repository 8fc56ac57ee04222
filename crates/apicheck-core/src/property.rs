//! Property checks on an already-parsed JSON object
//!
//! Every check that compares a value first asserts the property exists.
//! Failure messages name the property, the expected condition and the actual
//! value (`undefined` when missing).

use regex::RegexBuilder;
use serde_json::Value;

use crate::error::{CheckError, CheckResult};

/// Case handling for string comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Case {
    #[default]
    Sensitive,
    /// Both sides are upper-cased before comparing
    Insensitive,
}

impl Case {
    fn fold(self, s: &str) -> String {
        match self {
            Self::Sensitive => s.to_string(),
            Self::Insensitive => s.to_uppercase(),
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::Sensitive => "",
            Self::Insensitive => " (ignoring case)",
        }
    }
}

/// Property must be present (a `null` value counts as present).
///
/// # Errors
///
/// Returns [`CheckError::Property`] if it is missing.
pub fn exist(object: &Value, property: &str) -> CheckResult {
    lookup(object, property).map(|_| ())
}

/// Property must be absent.
///
/// # Errors
///
/// Returns [`CheckError::Property`] if it is present.
pub fn not_exist(object: &Value, property: &str) -> CheckResult {
    match object.get(property) {
        None => Ok(()),
        Some(v) => Err(CheckError::property(property, "not to exist", render(v))),
    }
}

/// Property must exist and, if `expected` is given, equal it.
///
/// # Errors
///
/// Returns [`CheckError::Property`] if missing or different.
pub fn equal(object: &Value, property: &str, expected: Option<&Value>) -> CheckResult {
    let actual = lookup(object, property)?;
    match expected {
        None => Ok(()),
        Some(Value::Null) if actual.is_null() => Ok(()),
        Some(Value::Null) => Err(CheckError::property(property, "to be null", render(actual))),
        Some(expected) if same_value(actual, expected) => Ok(()),
        Some(expected) => Err(CheckError::property(
            property,
            format!("to equal {}", render(expected)),
            render(actual),
        )),
    }
}

/// Property must exist and, if `unexpected` is given, differ from it.
///
/// # Errors
///
/// Returns [`CheckError::Property`] if missing or equal.
pub fn not_equal(object: &Value, property: &str, unexpected: Option<&Value>) -> CheckResult {
    let actual = lookup(object, property)?;
    match unexpected {
        None => Ok(()),
        Some(Value::Null) if actual.is_null() => {
            Err(CheckError::property(property, "not to be null", "null"))
        }
        Some(Value::Null) => Ok(()),
        Some(unexpected) if same_value(actual, unexpected) => Err(CheckError::property(
            property,
            format!("not to equal {}", render(unexpected)),
            render(actual),
        )),
        Some(_) => Ok(()),
    }
}

/// JSON equality where numbers compare by value (`10` equals `10.0`).
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                x.as_f64() == y.as_f64()
            }
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| same_value(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|other| same_value(v, other)))
        }
        _ => a == b,
    }
}

/// String property must equal `expected`.
///
/// # Errors
///
/// Returns [`CheckError::Property`] if missing, not a string, or different.
pub fn exact(object: &Value, property: &str, expected: &str, case: Case) -> CheckResult {
    compare(object, property, expected, case, "to be", |a, e| a == e)
}

/// String property must contain `expected`.
///
/// # Errors
///
/// Returns [`CheckError::Property`] if missing, not a string, or not containing it.
pub fn partial(object: &Value, property: &str, expected: &str, case: Case) -> CheckResult {
    compare(object, property, expected, case, "to contain", |a, e| {
        a.contains(e)
    })
}

/// String property must start with `expected`.
///
/// # Errors
///
/// Returns [`CheckError::Property`] if missing, not a string, or without the prefix.
pub fn start(object: &Value, property: &str, expected: &str, case: Case) -> CheckResult {
    compare(object, property, expected, case, "to start with", |a, e| {
        a.starts_with(e)
    })
}

/// String property must end with `expected`.
///
/// # Errors
///
/// Returns [`CheckError::Property`] if missing, not a string, or without the suffix.
pub fn end(object: &Value, property: &str, expected: &str, case: Case) -> CheckResult {
    compare(object, property, expected, case, "to end with", |a, e| {
        a.ends_with(e)
    })
}

/// String property must match the regular expression `pattern`.
///
/// # Errors
///
/// Returns [`CheckError::Invalid`] for a bad pattern, [`CheckError::Property`]
/// if the property is missing, not a string, or does not match.
pub fn matches(object: &Value, property: &str, pattern: &str, case: Case) -> CheckResult {
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(case == Case::Insensitive)
        .build()
        .map_err(|e| CheckError::Invalid {
            what: "pattern",
            input: pattern.to_string(),
            message: e.to_string(),
        })?;
    let actual = string_value(object, property)?;
    if regex.is_match(actual) {
        Ok(())
    } else {
        Err(CheckError::property(
            property,
            format!("to match /{pattern}/{}", case.suffix()),
            format!("'{actual}'"),
        ))
    }
}

fn compare(
    object: &Value,
    property: &str,
    expected: &str,
    case: Case,
    condition: &str,
    test: impl Fn(&str, &str) -> bool,
) -> CheckResult {
    let actual = string_value(object, property)?;
    if test(&case.fold(actual), &case.fold(expected)) {
        Ok(())
    } else {
        Err(CheckError::property(
            property,
            format!("{condition} '{expected}'{}", case.suffix()),
            format!("'{actual}'"),
        ))
    }
}

fn lookup<'a>(object: &'a Value, property: &str) -> Result<&'a Value, CheckError> {
    object
        .get(property)
        .ok_or_else(|| CheckError::property(property, "to exist", "undefined"))
}

fn string_value<'a>(object: &'a Value, property: &str) -> Result<&'a str, CheckError> {
    let value = lookup(object, property)?;
    value
        .as_str()
        .ok_or_else(|| CheckError::property(property, "to be a string", render(value)))
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{s}'"),
        other => other.to_string(),
    }
}
