//! Application error code ("service code") checks for negative tests

use crate::error::{CheckError, CheckResult};

/// Property name used when a spec string carries no explicit name
pub const DEFAULT_PROPERTY: &str = "serviceCode";

/// Expected application error code: property name plus value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCode {
    pub property: String,
    pub value: String,
}

impl ServiceCode {
    #[must_use]
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }

    /// Parse `"value"`, `"name:value"` or `"name=value"`.
    ///
    /// Only the first separator is structural; `:` wins over `=`. A bare value
    /// uses `default_property`. Empty input means "no service-code check".
    ///
    /// ```
    /// use apicheck_core::ServiceCode;
    ///
    /// let code = ServiceCode::parse("errorCode:a:b", "serviceCode").unwrap();
    /// assert_eq!(code.property, "errorCode");
    /// assert_eq!(code.value, "a:b");
    /// ```
    #[must_use]
    pub fn parse(spec: &str, default_property: &str) -> Option<Self> {
        if spec.is_empty() {
            return None;
        }
        let (property, value) = split_spec(spec);
        Some(Self::new(property.unwrap_or(default_property), value))
    }

    /// Build from separate optional parts.
    ///
    /// `None` when no value is given, or when the value is empty and no
    /// property is named. A named property with an empty value expects `""`.
    #[must_use]
    pub fn from_parts(
        property: Option<&str>,
        value: Option<&str>,
        default_property: &str,
    ) -> Option<Self> {
        let value = value?;
        match property {
            Some(property) => Some(Self::new(property, value)),
            None if value.is_empty() => None,
            None => Some(Self::new(default_property, value)),
        }
    }

    /// Assert that `body[property]` equals the expected value.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::ServiceCode`] on mismatch or a missing property.
    pub fn check(&self, body: &serde_json::Value) -> CheckResult {
        let actual = body.get(&self.property).map_or_else(
            || "undefined".to_string(),
            |v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        );
        if actual == self.value {
            Ok(())
        } else {
            Err(CheckError::ServiceCode {
                property: self.property.clone(),
                expected: self.value.clone(),
                actual,
            })
        }
    }
}

/// Split a spec string into an optional property name and the value.
pub(crate) fn split_spec(spec: &str) -> (Option<&str>, &str) {
    match spec.split_once(':').or_else(|| spec.split_once('=')) {
        Some((property, value)) => (Some(property), value),
        None => (None, spec),
    }
}

impl std::fmt::Display for ServiceCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.property, self.value)
    }
}
