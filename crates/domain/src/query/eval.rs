//! Evaluation of parsed paths and filter predicates.
//!
//! Comparisons follow the loose typing rules of the UI's script engine, so a
//! filter written as `@.port == '80'` matches a numeric `80`.

use serde_json::Value;

use super::{CompareOp, FilterExpr, Operand, PathStep, Segment, Selector};
use crate::display::to_display_string;

pub(super) fn select<'v>(segments: &[Segment], root: &'v Value) -> Vec<&'v Value> {
    let mut current = vec![root];

    for segment in segments {
        let mut next = Vec::new();
        for node in current {
            match segment {
                Segment::Child(selector) => apply(selector, node, &mut next),
                Segment::Descendant(selector) => {
                    let mut family = Vec::new();
                    collect_descendants(node, &mut family);
                    for member in family {
                        apply(selector, member, &mut next);
                    }
                }
            }
        }
        if next.is_empty() {
            return next;
        }
        current = next;
    }

    current
}

/// Pushes `node` and everything below it, pre-order.
fn collect_descendants<'v>(node: &'v Value, out: &mut Vec<&'v Value>) {
    out.push(node);
    match node {
        Value::Array(items) => items.iter().for_each(|item| collect_descendants(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect_descendants(item, out)),
        _ => {}
    }
}

fn apply<'v>(selector: &Selector, node: &'v Value, out: &mut Vec<&'v Value>) {
    match selector {
        Selector::Name(name) => out.extend(member(node, name)),
        Selector::Index(index) => out.extend(element(node, *index)),
        Selector::Slice { start, end } => {
            if let Value::Array(items) = node {
                let (from, to) = slice_bounds(items.len(), *start, *end);
                out.extend(items[from..to].iter());
            }
        }
        Selector::Wildcard => out.extend(children(node)),
        Selector::Union(items) => {
            for item in items {
                apply(item, node, out);
            }
        }
        Selector::Filter(filter) => {
            out.extend(children(node).filter(|child| matches_filter(filter, child)));
        }
    }
}

fn children(node: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match node {
        Value::Array(items) => Box::new(items.iter()),
        Value::Object(map) => Box::new(map.values()),
        _ => Box::new(std::iter::empty()),
    }
}

fn member<'v>(node: &'v Value, name: &str) -> Option<&'v Value> {
    match node {
        Value::Object(map) => map.get(name),
        Value::Array(items) => name.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn element(node: &Value, index: i64) -> Option<&Value> {
    match node {
        Value::Array(items) => {
            let len = i64::try_from(items.len()).ok()?;
            let position = if index < 0 { len + index } else { index };
            usize::try_from(position).ok().and_then(|i| items.get(i))
        }
        Value::Object(map) => map.get(&index.to_string()),
        _ => None,
    }
}

fn slice_bounds(len: usize, start: Option<i64>, end: Option<i64>) -> (usize, usize) {
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let clamp = |bound: i64| -> usize {
        let absolute = if bound < 0 { len_i + bound } else { bound };
        usize::try_from(absolute.clamp(0, len_i)).unwrap_or(len)
    };
    let from = start.map_or(0, clamp);
    let to = end.map_or(len, clamp);
    (from, to.max(from))
}

fn matches_filter(filter: &FilterExpr, current: &Value) -> bool {
    match filter {
        FilterExpr::Or(left, right) => {
            matches_filter(left, current) || matches_filter(right, current)
        }
        FilterExpr::And(left, right) => {
            matches_filter(left, current) && matches_filter(right, current)
        }
        FilterExpr::Not(inner) => !matches_filter(inner, current),
        FilterExpr::Truthy(operand) => truthy(resolve_operand(operand, current).as_ref()),
        FilterExpr::Compare { left, op, right } => {
            let left = resolve_operand(left, current);
            let right = resolve_operand(right, current);
            compare(left.as_ref(), *op, right.as_ref())
        }
    }
}

/// Resolves an operand; `None` stands for an undefined value.
fn resolve_operand(operand: &Operand, current: &Value) -> Option<Value> {
    match operand {
        Operand::Literal(value) => Some(value.clone()),
        Operand::Current(steps) => {
            let mut value = current.clone();
            for step in steps {
                value = step_into(&value, step)?;
            }
            Some(value)
        }
    }
}

fn step_into(value: &Value, step: &PathStep) -> Option<Value> {
    match (value, step) {
        (Value::Object(map), PathStep::Name(name)) => map.get(name).cloned(),
        (Value::Array(items), PathStep::Name(name)) if name == "length" => {
            Some(Value::from(items.len()))
        }
        (Value::String(text), PathStep::Name(name)) if name == "length" => {
            Some(Value::from(text.encode_utf16().count()))
        }
        (Value::Array(items), PathStep::Name(name)) => {
            name.parse::<usize>().ok().and_then(|i| items.get(i)).cloned()
        }
        (Value::Array(_) | Value::Object(_), PathStep::Index(index)) => {
            element(value, *index).cloned()
        }
        _ => None,
    }
}

fn compare(left: Option<&Value>, op: CompareOp, right: Option<&Value>) -> bool {
    match op {
        CompareOp::Eq => loose_equals(left, right),
        CompareOp::NotEq => !loose_equals(left, right),
        CompareOp::StrictEq => strict_equals(left, right),
        CompareOp::StrictNotEq => !strict_equals(left, right),
        CompareOp::Lt => relational(left, right).is_some_and(std::cmp::Ordering::is_lt),
        CompareOp::Le => relational(left, right).is_some_and(std::cmp::Ordering::is_le),
        CompareOp::Gt => relational(left, right).is_some_and(std::cmp::Ordering::is_gt),
        CompareOp::Ge => relational(left, right).is_some_and(std::cmp::Ordering::is_ge),
    }
}

fn relational(left: Option<&Value>, right: Option<&Value>) -> Option<std::cmp::Ordering> {
    if let (Some(Value::String(a)), Some(Value::String(b))) = (left, right) {
        return Some(a.encode_utf16().cmp(b.encode_utf16()));
    }
    to_number(left).partial_cmp(&to_number(right))
}

/// Strict equality (`===`); `None` is the undefined value.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn strict_equals(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            a.as_f64().zip(b.as_f64()).is_some_and(|(a, b)| a == b)
        }
        (Some(a @ (Value::Null | Value::Bool(_) | Value::String(_))), Some(b)) => a == b,
        // Containers compare by identity, which distinct operands never share.
        _ => false,
    }
}

/// Loose equality (`==`); `None` is the undefined value.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn loose_equals(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (l, r) if nullish(l) || nullish(r) => nullish(l) && nullish(r),
        (Some(Value::String(a)), Some(Value::String(b))) => a == b,
        (Some(Value::Number(_)), Some(Value::Number(_))) => strict_equals(left, right),
        (Some(Value::Array(_) | Value::Object(_)), Some(Value::Array(_) | Value::Object(_))) => {
            false
        }
        (Some(a @ (Value::Array(_) | Value::Object(_))), Some(b)) => {
            loose_equals(Some(&Value::String(to_display_string(a))), Some(b))
        }
        (Some(a), Some(b @ (Value::Array(_) | Value::Object(_)))) => {
            loose_equals(Some(a), Some(&Value::String(to_display_string(b))))
        }
        _ => to_number(left) == to_number(right),
    }
}

fn nullish(value: Option<&Value>) -> bool {
    value.is_none_or(Value::is_null)
}

/// Numeric conversion of the script engine; undefined becomes NaN.
#[must_use]
pub fn to_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => string_to_number(s),
        Some(other) => string_to_number(&to_display_string(other)),
    }
}

fn string_to_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // Rust accepts words such as "inf" and "nan" that the script engine rejects.
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

/// Truthiness of the script engine; undefined is falsy.
#[must_use]
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::super::select as query;
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn pods() -> Value {
        json!({
            "items": [
                {"metadata": {"name": "web-0"}, "spec": {"containers": [
                    {"name": "nginx", "image": "nginx:1.25", "port": 80},
                    {"name": "sidecar", "image": "envoy:1.30", "port": 9901}
                ]}},
                {"metadata": {"name": "web-1"}, "spec": {"containers": [
                    {"name": "nginx", "image": "nginx:1.26", "port": 80}
                ]}}
            ]
        })
    }

    #[test]
    fn test_member_chain() {
        let doc = json!({"foo": {"bar": "baz"}});
        assert_eq!(query(&doc, ".foo.bar").unwrap(), vec![&json!("baz")]);
    }

    #[test]
    fn test_array_index() {
        let doc = json!({"list": [1, 2, 3]});
        assert_eq!(query(&doc, ".list[1]").unwrap(), vec![&json!(2)]);
        assert_eq!(query(&doc, ".list[-1]").unwrap(), vec![&json!(3)]);
        assert!(query(&doc, ".list[5]").unwrap().is_empty());
    }

    #[test]
    fn test_dot_numeric_index() {
        let doc = pods();
        assert_eq!(
            query(&doc, ".items.0.metadata.name").unwrap(),
            vec![&json!("web-0")]
        );
    }

    #[test]
    fn test_wildcard_and_slice() {
        let doc = json!({"list": [1, 2, 3, 4]});
        assert_eq!(query(&doc, ".list[*]").unwrap().len(), 4);
        assert_eq!(
            query(&doc, ".list[1:3]").unwrap(),
            vec![&json!(2), &json!(3)]
        );
        assert_eq!(query(&doc, ".list[-2:]").unwrap(), vec![&json!(3), &json!(4)]);
        assert!(query(&doc, ".list[3:1]").unwrap().is_empty());
    }

    #[test]
    fn test_union() {
        let doc = json!({"a": 1, "b": 2, "c": 3});
        assert_eq!(query(&doc, "['c','a']").unwrap(), vec![&json!(3), &json!(1)]);
    }

    #[test]
    fn test_descendant_is_pre_order() {
        let doc = pods();
        let names = query(&doc, "..name").unwrap();
        assert_eq!(names[0], &json!("web-0"));
        assert_eq!(names[1], &json!("nginx"));
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn test_filter_equality() {
        let doc = pods();
        let images = query(
            &doc,
            ".items[0].spec.containers[?(@.name=='sidecar')].image",
        )
        .unwrap();
        assert_eq!(images, vec![&json!("envoy:1.30")]);
    }

    #[test]
    fn test_filter_loose_number_equality() {
        let doc = pods();
        let names = query(&doc, "..containers[?(@.port == '9901')].name").unwrap();
        assert_eq!(names, vec![&json!("sidecar")]);
        let strict = query(&doc, "..containers[?(@.port === '9901')].name").unwrap();
        assert!(strict.is_empty());
    }

    #[test]
    fn test_filter_relational_and_logic() {
        let doc = pods();
        let names = query(
            &doc,
            "..containers[?(@.port > 100 || @.image == 'nginx:1.26')].name",
        )
        .unwrap();
        assert_eq!(names, vec![&json!("sidecar"), &json!("nginx")]);
    }

    #[test]
    fn test_filter_existence_and_length() {
        let doc = json!({"items": [
            {"tags": ["a"]},
            {"tags": []},
            {"other": true}
        ]});
        assert_eq!(query(&doc, ".items[?(@.tags)]").unwrap().len(), 2);
        assert_eq!(query(&doc, ".items[?(!@.tags)]").unwrap().len(), 1);
        assert_eq!(query(&doc, ".items[?(@.tags.length > 0)]").unwrap().len(), 1);
    }

    #[test]
    fn test_filter_over_object_values() {
        let doc = json!({"nodes": {"a": {"ready": true}, "b": {"ready": false}}});
        assert_eq!(
            query(&doc, ".nodes[?(@.ready)]").unwrap(),
            vec![&json!({"ready": true})]
        );
    }

    #[test]
    fn test_missing_paths() {
        let doc = json!({"a": 1});
        assert!(query(&doc, ".b.c").unwrap().is_empty());
        assert!(query(&doc, ".a.b").unwrap().is_empty());
        assert!(query(&Value::Null, ".a").unwrap().is_empty());
    }

    #[test]
    fn test_empty_expression_selects_root() {
        let doc = json!({"a": 1});
        assert_eq!(query(&doc, "").unwrap(), vec![&doc]);
    }

    #[test]
    fn test_loose_equals() {
        assert!(loose_equals(None, Some(&Value::Null)));
        assert!(loose_equals(Some(&json!(1)), Some(&json!("1"))));
        assert!(loose_equals(Some(&json!(1.0)), Some(&json!(1))));
        assert!(loose_equals(Some(&json!(true)), Some(&json!(1))));
        assert!(!loose_equals(Some(&json!(0)), Some(&Value::Null)));
        assert!(loose_equals(Some(&json!([5])), Some(&json!("5"))));
    }

    #[test]
    fn test_strict_equals() {
        assert!(strict_equals(Some(&json!("a")), Some(&json!("a"))));
        assert!(!strict_equals(Some(&json!(1)), Some(&json!("1"))));
        assert!(!strict_equals(None, Some(&Value::Null)));
        assert!(!strict_equals(Some(&json!({})), Some(&json!({}))));
    }

    #[test]
    fn test_to_number_and_truthy() {
        assert!(to_number(Some(&json!("inf"))).is_nan());
        assert!((to_number(Some(&json!(" 12 "))) - 12.0).abs() < f64::EPSILON);
        assert!(to_number(None).is_nan());
        assert!(!truthy(Some(&json!(""))));
        assert!(!truthy(Some(&json!(0))));
        assert!(truthy(Some(&json!([]))));
    }
}
