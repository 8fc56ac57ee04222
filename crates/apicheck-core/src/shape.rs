//! Response body shape checks
//!
//! No I/O. Each check reads the body from a [`Response`] snapshot and
//! either passes or returns a [`CheckError`] describing what was found.

use crate::error::{CheckError, CheckResult};
use crate::response::Response;

/// Expected array length, resolved from a `(min, max)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Empty,
    Exactly(usize),
    Between(usize, usize),
    AtMost(usize),
    AtLeast(usize),
    Any,
}

impl Cardinality {
    /// Resolve bounds; a negative `max` means unbounded.
    ///
    /// Ties are broken in table order: `(0,0)`, `(1,1)`, `min == max`, both
    /// bounds positive, `min == 0` with a bound, then the unbounded cases.
    #[must_use]
    pub fn from_bounds(min: usize, max: i64) -> Self {
        let bounded = usize::try_from(max).ok();
        match (min, bounded) {
            (0, Some(0)) => Self::Empty,
            (1, Some(1)) => Self::Exactly(1),
            (min, Some(max)) if min == max => Self::Exactly(min),
            (min, Some(max)) if min > 0 => Self::Between(min, max),
            (0, Some(max)) => Self::AtMost(max),
            (min, None) if min >= 1 => Self::AtLeast(min),
            _ => Self::Any,
        }
    }

    #[must_use]
    pub const fn accepts(self, len: usize) -> bool {
        match self {
            Self::Empty => len == 0,
            Self::Exactly(n) => len == n,
            Self::Between(min, max) => len >= min && len <= max,
            Self::AtMost(max) => len <= max,
            Self::AtLeast(min) => len >= min,
            Self::Any => true,
        }
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "an empty array"),
            Self::Exactly(n) => write!(f, "exactly {n}"),
            Self::Between(min, max) => write!(f, "between {min} and {max}"),
            Self::AtMost(max) => write!(f, "at most {max}"),
            Self::AtLeast(min) => write!(f, "at least {min}"),
            Self::Any => write!(f, "any number of"),
        }
    }
}

/// Body must be readable as text.
///
/// # Errors
///
/// Returns [`CheckError::Parse`] if there is no body.
pub fn text(response: &Response) -> CheckResult {
    response.text().map(|_| ())
}

/// Body must parse as JSON.
///
/// # Errors
///
/// Returns [`CheckError::Parse`] if the body is missing or malformed.
pub fn json(response: &Response) -> CheckResult {
    response.json().map(|_| ())
}

/// Body must be a single JSON value, not an array.
///
/// # Errors
///
/// Returns [`CheckError::Shape`] for arrays, [`CheckError::Parse`] for non-JSON.
pub fn one(response: &Response) -> CheckResult {
    match response.json()? {
        serde_json::Value::Array(items) => Err(CheckError::Shape(format!(
            "Expected a single object but got an array of {} element(s)",
            items.len()
        ))),
        _ => Ok(()),
    }
}

/// Body must be a JSON array whose length satisfies `(min, max)`.
///
/// # Errors
///
/// Returns [`CheckError::Shape`] for non-arrays and
/// [`CheckError::Cardinality`] when the length is out of bounds.
pub fn many(response: &Response, min: usize, max: i64) -> CheckResult {
    let items = array_len(response)?;
    let expected = Cardinality::from_bounds(min, max);
    if expected.accepts(items) {
        Ok(())
    } else {
        Err(CheckError::Cardinality {
            expected: expected.to_string(),
            actual: items,
        })
    }
}

/// `many(0, 0)`
pub fn empty(response: &Response) -> CheckResult {
    many(response, 0, 0)
}

/// `many(1, -1)`
pub fn nonempty(response: &Response) -> CheckResult {
    many(response, 1, -1)
}

/// `many(1, 1)`
pub fn unique(response: &Response) -> CheckResult {
    many(response, 1, 1)
}

/// Body must validate against `schema`. Up to five errors are reported.
///
/// # Errors
///
/// Returns [`CheckError::Invalid`] if `schema` is not a valid JSON Schema,
/// [`CheckError::Schema`] if the body does not conform.
pub fn schema(response: &Response, schema: &serde_json::Value) -> CheckResult {
    let body = response.json()?;
    let validator = jsonschema::validator_for(schema).map_err(|e| CheckError::Invalid {
        what: "schema",
        input: schema.to_string(),
        message: e.to_string(),
    })?;
    let errors: Vec<String> = validator
        .iter_errors(&body)
        .take(5)
        .map(|e| e.to_string())
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CheckError::Schema(errors.join("; ")))
    }
}

fn array_len(response: &Response) -> Result<usize, CheckError> {
    match response.json()? {
        serde_json::Value::Array(items) => Ok(items.len()),
        other => Err(CheckError::Shape(format!(
            "Expected an array but got {}",
            json_type(&other)
        ))),
    }
}

pub(crate) fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
