//! Run-scoped key/value store shared by all scripts of a collection run

use std::collections::HashMap;

use serde_json::Value;

/// Variables visible to every script during one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    values: HashMap<String, Value>,
}

impl Variables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// String value, if the variable holds a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn unset(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace every `{{name}}` whose variable is a string or number.
    ///
    /// Unknown names are left untouched.
    #[must_use]
    pub fn substitute(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(open) = rest.find("{{") {
            let Some(close) = rest[open + 2..].find("}}") else {
                break;
            };
            let name = &rest[open + 2..open + 2 + close];
            out.push_str(&rest[..open]);
            match self.values.get(name.trim()) {
                Some(Value::String(s)) => out.push_str(s),
                Some(v @ (Value::Number(_) | Value::Bool(_))) => out.push_str(&v.to_string()),
                _ => out.push_str(&rest[open..open + 4 + close]),
            }
            rest = &rest[open + 4 + close..];
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_get_unset() {
        let mut vars = Variables::new();
        vars.set("token", "abc");
        vars.set("count", 3);

        assert_eq!(vars.get_str("token"), Some("abc"));
        assert_eq!(vars.get("count"), Some(&json!(3)));
        assert!(vars.has("count"));
        assert_eq!(vars.unset("count"), Some(json!(3)));
        assert!(!vars.has("count"));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn has_ignores_value() {
        let mut vars = Variables::new();
        vars.set("flag", false);
        assert!(vars.has("flag"));
    }

    #[test]
    fn substitute_known_and_unknown() {
        let mut vars = Variables::new();
        vars.set("orderId", 17);
        vars.set("host", "api.local");

        assert_eq!(
            vars.substitute("http://{{host}}/orders/{{orderId}}?x={{missing}}"),
            "http://api.local/orders/17?x={{missing}}"
        );
    }

    #[test]
    fn substitute_unterminated() {
        let mut vars = Variables::new();
        vars.set("a", "1");
        assert_eq!(vars.substitute("{{a}} and {{b"), "1 and {{b");
    }
}
