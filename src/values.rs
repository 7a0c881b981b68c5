//! Form value types and the truthiness predicate used by conditional fields

use serde_json::Value;
use std::collections::HashMap;

/// All values of one form, keyed by field name
pub type FormValues = HashMap<String, Value>;

/// Whether a watched field value counts as "set".
///
/// Booleans are themselves, numbers are set unless zero or not finite,
/// strings unless empty, `null` never is; arrays and objects always are.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && f.is_finite()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a value the way an input shows it: strings verbatim, `null` as empty.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
