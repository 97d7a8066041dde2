use serde::Serialize;
use serde_json::Value;
use std::fmt;

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sorted(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

/// Cache key of a query: the table scope plus its canonical parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QueryKey {
    scope: String,
    params: String,
}

impl QueryKey {
    /// Parameters are rendered as JSON with sorted object keys, so equal
    /// parameters always give equal keys
    pub fn new(scope: &str, params: &impl Serialize) -> Self {
        let params = serde_json::to_value(params).map(sorted).unwrap_or(Value::Null);
        Self {
            scope: scope.to_string(),
            params: params.to_string(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn params(&self) -> &str {
        &self.params
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scope, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_equal_params_give_equal_keys() {
        let a = QueryKey::new("horses", &json!({ "page": 1, "search": "star" }));
        let b = QueryKey::new("horses", &json!({ "search": "star", "page": 1 }));
        assert_eq!(a, b);
        assert_eq!(a.scope(), "horses");
        assert_ne!(a, QueryKey::new("stalls", &json!({ "page": 1, "search": "star" })));
    }
}
