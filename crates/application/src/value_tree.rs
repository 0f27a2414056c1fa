//! Rendering placeholders inside JSON values
//!
//! Request bodies and headers are often stored as JSON rather than flat
//! text. These helpers walk a value and resolve every string leaf; object
//! keys, numbers, booleans and `null` are copied unchanged.

use serde_json::{Map, Value};
use stencil_domain::ReplaceValues;

use crate::pipeline;
use crate::ports::DocumentSource;

/// Applies the full pipeline to every string in `value`.
#[must_use]
pub fn render_value(
    value: &Value,
    replace_values: &ReplaceValues,
    documents: &dyn DocumentSource,
) -> Value {
    map_strings(value, &|text| pipeline::resolve_all(text, replace_values, documents))
}

/// Applies the data-only pipeline to every string in `value`.
#[must_use]
pub fn render_value_data_only(value: &Value, documents: &dyn DocumentSource) -> Value {
    map_strings(value, &|text| pipeline::resolve_data_only(text, documents, None))
}

fn map_strings(value: &Value, render: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::String(text) => Value::String(render(text)),
        Value::Array(items) => Value::Array(items.iter().map(|item| map_strings(item, render)).collect()),
        Value::Object(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), map_strings(item, render)))
                .collect::<Map<String, Value>>(),
        ),
        other => other.clone(),
    }
}
