//! String coercion of resolved values
//!
//! Resolved values are spliced into text the same way the UI's script engine
//! would turn them into strings, so a number renders as `2` rather than `2.0`
//! and an array renders as its comma-joined elements.

use serde_json::{Number, Value};

/// Placeholder text used for objects, as the script engine prints them.
pub const OBJECT_TEXT: &str = "[object Object]";

/// Converts a JSON value to the text spliced into a template.
#[must_use]
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => join_array(items),
        Value::Object(_) => OBJECT_TEXT.to_string(),
    }
}

fn join_array(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::Null => String::new(),
            other => to_display_string(other),
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn format_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    n.as_f64().map_or_else(|| n.to_string(), format_float)
}

#[allow(clippy::float_cmp)]
fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if f == 0.0 {
        return "0".to_string();
    }

    let abs = f.abs();
    if !(1e-6..1e21).contains(&abs) {
        // Exponent form carries an explicit sign: 1e+21, 1.5e-7.
        let text = format!("{f:e}");
        return match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        };
    }
    if f.fract() == 0.0 {
        format!("{f:.0}")
    } else {
        format!("{f}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert_eq!(to_display_string(&json!("text")), "text");
        assert_eq!(to_display_string(&json!(true)), "true");
        assert_eq!(to_display_string(&json!(42)), "42");
        assert_eq!(to_display_string(&json!(-7)), "-7");
        assert_eq!(to_display_string(&Value::Null), "null");
    }

    #[test]
    fn test_floats() {
        assert_eq!(to_display_string(&json!(1.5)), "1.5");
        assert_eq!(to_display_string(&json!(2.0)), "2");
        assert_eq!(to_display_string(&json!(0.1)), "0.1");
        assert_eq!(to_display_string(&json!(1e21)), "1e+21");
        assert_eq!(to_display_string(&json!(1.5e-7)), "1.5e-7");
    }

    #[test]
    fn test_arrays_join_with_commas() {
        assert_eq!(to_display_string(&json!([1, "a", null, true])), "1,a,,true");
        assert_eq!(to_display_string(&json!([1, [2, 3]])), "1,2,3");
        assert_eq!(to_display_string(&json!([])), "");
    }

    #[test]
    fn test_objects() {
        assert_eq!(to_display_string(&json!({"a": 1})), OBJECT_TEXT);
        assert_eq!(to_display_string(&json!([{"a": 1}])), OBJECT_TEXT);
    }
}
