//! Positional pass: `{n}`

use stencil_domain::ReplaceValues;

use super::parser::parse_positionals;

/// Replaces each `{n}` with URL segment `n`.
///
/// Unknown keys and segments without a value keep the placeholder as written
/// and are passed to `on_missing`.
pub(super) fn substitute(
    text: &str,
    replace_values: &ReplaceValues,
    mut on_missing: impl FnMut(&str),
) -> String {
    let references = parse_positionals(text);
    if references.is_empty() {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let mut last_end = 0;

    for reference in &references {
        result.push_str(&text[last_end..reference.span.start]);
        match replace_values.get(reference.key) {
            Some(value) => result.push_str(value),
            None => {
                let original = &text[reference.span.clone()];
                on_missing(original);
                result.push_str(original);
            }
        }
        last_end = reference.span.end;
    }

    result.push_str(&text[last_end..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_substitute_segments() {
        let values = ReplaceValues::from_path("/pods/web-1");
        assert_eq!(substitute("{1}:{2}", &values, |_| {}), "pods:web-1");

        let mut missing = Vec::new();
        assert_eq!(substitute("{0}|{9}", &values, |p| missing.push(p.to_string())), "|{9}");
        assert_eq!(missing, vec!["{9}"]);
    }

    #[test]
    fn test_segment_without_value() {
        let mut values = ReplaceValues::new();
        values.insert("0", None);
        assert_eq!(substitute("a{0}b", &values, |_| {}), "a{0}b");
    }

    #[test]
    fn test_single_pass() {
        let values = ReplaceValues::from_segments(["{1}", "x"]);
        assert_eq!(substitute("{0}", &values, |_| {}), "{1}");
    }
}
