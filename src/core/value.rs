// Tagged value shapes shared by config mappings, table cells, and dumps.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of shapes the library reads, writes, and dumps.
///
/// Config parsing produces scalars and flat lists of scalars; table cells
/// are scalars; binary dumps may be arbitrary trees of all five shapes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Text(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Coerce one whitespace-delimited token: `true`/`false` become bools,
    /// anything that parses as `f64` becomes a number, the rest stays text.
    pub fn coerce(token: &str) -> Value {
        if token.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if token.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        match token.parse::<f64>() {
            Ok(number) => Value::Number(number),
            Err(_) => Value::Text(token.to_string()),
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Number(_) | Value::Bool(_) | Value::Text(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The final element of a list, or the value itself for every other
    /// shape. This is the strip-to-last-value view of a parsed sequence.
    pub fn last(&self) -> &Value {
        match self {
            Value::List(items) => items.last().unwrap_or(self),
            _ => self,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Number(number) => serde_json::Value::from(*number),
            Value::Bool(flag) => serde_json::Value::Bool(*flag),
            Value::Text(text) => serde_json::Value::String(text.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(number) => write!(f, "{number}"),
            Value::Bool(flag) => write!(f, "{flag}"),
            Value::Text(text) => f.write_str(text),
            Value::List(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Map(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Value::Number(number)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::Value;

    #[test]
    fn coerce_recognizes_numbers_bools_and_text() {
        assert_eq!(Value::coerce("10"), Value::Number(10.0));
        assert_eq!(Value::coerce("-2.5e3"), Value::Number(-2500.0));
        assert_eq!(Value::coerce("true"), Value::Bool(true));
        assert_eq!(Value::coerce("False"), Value::Bool(false));
        assert_eq!(Value::coerce("alice"), Value::Text("alice".to_string()));
    }

    #[test]
    fn last_collapses_lists_only() {
        let list = Value::List(vec![
            Value::Text("alice".to_string()),
            Value::Text("carol".to_string()),
        ]);
        assert_eq!(list.last(), &Value::Text("carol".to_string()));

        let scalar = Value::Number(1.0);
        assert_eq!(scalar.last(), &scalar);
    }

    #[test]
    fn display_renders_tokens() {
        let list = Value::List(vec![Value::Number(1.0), Value::Text("b".to_string())]);
        assert_eq!(list.to_string(), "1 b");
        assert_eq!(Value::Number(10.0).to_string(), "10");
        assert_eq!(Value::Bool(true).to_string(), "true");
    }

    #[test]
    fn to_json_preserves_structure() {
        let mut map = std::collections::BTreeMap::new();
        map.insert("xs".to_string(), Value::List(vec![Value::Number(1.0)]));
        let value = Value::Map(map);
        assert_eq!(value.to_json(), serde_json::json!({"xs": [1.0]}));
    }
}
