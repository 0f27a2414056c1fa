//! Placeholder scanners
//!
//! Finds placeholders of each grammar in a template and returns them with
//! their byte spans. Every scanner requires its literal prefix (`{reqs[`,
//! `{reqsJsonPath[` or a brace followed only by digits), so brace syntax that
//! belongs to the surrounding text, like `metric{job="api"}`, is never matched.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use stencil_domain::{DataPathRef, PositionalRef, QueryRef, parse_index};

static DATA_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\{reqs\[(\d+)\]\[((?:\s*['"][^'"]+['"]\s*,?)+)\](?:\[\s*['"]([^'"]+)['"]\s*\])?\}"#,
    )
    .expect("valid regex")
});

static QUOTED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]([^'"]+)['"]"#).expect("valid regex"));

static POSITIONAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\d+)\}").expect("valid regex"));

const QUERY_OPEN: &str = "{reqsJsonPath[";

/// Finds every `{reqs[i][...keys]}` placeholder.
///
/// # Examples
///
/// ```
/// use stencil_application::placeholder_resolver::parser::parse_data_paths;
///
/// let refs = parse_data_paths(r#"Replicas: {reqs[0]['spec', "replicas"]['0']}"#);
/// assert_eq!(refs.len(), 1);
/// assert_eq!(refs[0].keys, vec!["spec", "replicas"]);
/// assert_eq!(refs[0].fallback, Some("0"));
/// ```
#[must_use]
pub fn parse_data_paths(input: &str) -> Vec<DataPathRef<'_>> {
    DATA_PATH
        .captures_iter(input)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let keys = QUOTED_KEY
                .captures_iter(caps.get(2)?.as_str())
                .filter_map(|key| key.get(1).map(|m| m.as_str()))
                .collect();
            Some(DataPathRef {
                span: whole.range(),
                index: caps.get(1)?.as_str(),
                keys,
                fallback: caps.get(3).map(|m| m.as_str()),
            })
        })
        .collect()
}

/// Finds every `{reqsJsonPath[i]['expr']}` placeholder, outermost first.
///
/// The expression may be quoted with either quote character and may contain
/// the other one, as well as nested placeholders. It ends at the first
/// matching quote that is followed by `]` and a valid placeholder tail.
///
/// # Examples
///
/// ```
/// use stencil_application::placeholder_resolver::parser::parse_query_paths;
///
/// let refs = parse_query_paths(r#"{reqsJsonPath[1][".items[?(@.name=='web')].id"]['-']}"#);
/// assert_eq!(refs.len(), 1);
/// assert_eq!(refs[0].expression, ".items[?(@.name=='web')].id");
/// assert_eq!(refs[0].fallback, Some("-"));
/// ```
#[must_use]
pub fn parse_query_paths(input: &str) -> Vec<QueryRef<'_>> {
    let mut references = Vec::new();
    let mut from = 0;

    while let Some(offset) = input[from..].find(QUERY_OPEN) {
        let start = from + offset;
        if let Some(reference) = match_query_at(input, start) {
            from = reference.span.end;
            references.push(reference);
        } else {
            from = start + 1;
        }
    }

    references
}

/// Finds every `{n}` placeholder.
#[must_use]
pub fn parse_positionals(input: &str) -> Vec<PositionalRef<'_>> {
    POSITIONAL
        .captures_iter(input)
        .filter_map(|caps| {
            Some(PositionalRef {
                span: caps.get(0)?.range(),
                key: caps.get(1)?.as_str(),
            })
        })
        .collect()
}

/// Returns true if the input contains a placeholder of any grammar.
#[must_use]
pub fn has_placeholders(input: &str) -> bool {
    DATA_PATH.is_match(input) || POSITIONAL.is_match(input) || !parse_query_paths(input).is_empty()
}

/// Lists the document indexes a template refers to, nested ones included.
///
/// Lets a caller fetch only the documents a template actually needs.
#[must_use]
pub fn extract_document_indexes(input: &str) -> Vec<usize> {
    let mut indexes = BTreeSet::new();
    collect_document_indexes(input, &mut indexes);
    indexes.into_iter().collect()
}

fn collect_document_indexes(input: &str, indexes: &mut BTreeSet<usize>) {
    for reference in parse_data_paths(input) {
        if let Ok(index) = reference.document_index() {
            indexes.insert(index);
        }
    }
    for reference in parse_query_paths(input) {
        if let Ok(index) = parse_index(reference.index) {
            indexes.insert(index);
        }
        collect_document_indexes(reference.expression, indexes);
    }
}

/// Matches a query placeholder starting at `start`, which points at `{`.
fn match_query_at(input: &str, start: usize) -> Option<QueryRef<'_>> {
    let mut pos = start + QUERY_OPEN.len();
    let digits = input[pos..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let index = &input[pos..pos + digits];
    pos += digits;

    pos = eat(input, pos, ']')?;
    pos = eat(input, skip_whitespace(input, pos), '[')?;
    pos = skip_whitespace(input, pos);
    let quote = quote_at(input, pos)?;
    let expression_start = pos + 1;

    // Shortest expression first; a longer one is only tried when the
    // remainder of the placeholder does not fit.
    for (offset, _) in input[expression_start..].match_indices(quote) {
        let expression_end = expression_start + offset;
        let Some(after) = eat(input, skip_whitespace(input, expression_end + 1), ']') else {
            continue;
        };
        let expression = &input[expression_start..expression_end];

        if let Some((fallback, end)) = match_fallback(input, after) {
            return Some(QueryRef {
                span: start..end,
                index,
                expression,
                fallback: Some(fallback),
            });
        }
        if let Some(end) = eat(input, after, '}') {
            return Some(QueryRef {
                span: start..end,
                index,
                expression,
                fallback: None,
            });
        }
    }

    None
}

/// Matches `['fallback']}` at `pos`, returning the fallback and the end offset.
fn match_fallback(input: &str, pos: usize) -> Option<(&str, usize)> {
    let pos = eat(input, skip_whitespace(input, pos), '[')?;
    let pos = skip_whitespace(input, pos);
    let quote = quote_at(input, pos)?;
    let fallback_start = pos + 1;

    for (offset, _) in input[fallback_start..].match_indices(quote) {
        let fallback_end = fallback_start + offset;
        let Some(after) = eat(input, skip_whitespace(input, fallback_end + 1), ']') else {
            continue;
        };
        if let Some(end) = eat(input, after, '}') {
            return Some((&input[fallback_start..fallback_end], end));
        }
    }

    None
}

fn eat(input: &str, pos: usize, expected: char) -> Option<usize> {
    input[pos..]
        .starts_with(expected)
        .then(|| pos + expected.len_utf8())
}

fn skip_whitespace(input: &str, pos: usize) -> usize {
    let rest = &input[pos..];
    pos + (rest.len() - rest.trim_start().len())
}

fn quote_at(input: &str, pos: usize) -> Option<char> {
    input[pos..]
        .chars()
        .next()
        .filter(|ch| matches!(ch, '\'' | '"'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_data_path_single_key() {
        let refs = parse_data_paths(r#"{reqs[0]["foo"]}"#);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].index, "0");
        assert_eq!(refs[0].keys, vec!["foo"]);
        assert_eq!(refs[0].fallback, None);
        assert_eq!(refs[0].span, 0..16);
    }

    #[test]
    fn test_parse_data_path_mixed_quotes_and_fallback() {
        let refs = parse_data_paths(r#"x {reqs[12]['a', "b",'c']["none"]} y"#);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].index, "12");
        assert_eq!(refs[0].keys, vec!["a", "b", "c"]);
        assert_eq!(refs[0].fallback, Some("none"));
    }

    #[test]
    fn test_parse_data_path_requires_a_key() {
        assert!(parse_data_paths("{reqs[0][]}").is_empty());
        assert!(parse_data_paths("{reqs[0]}").is_empty());
        assert!(parse_data_paths("{reqs[x]['a']}").is_empty());
    }

    #[test]
    fn test_data_path_does_not_match_query_placeholder() {
        assert!(parse_data_paths("{reqsJsonPath[0]['.a']}").is_empty());
    }

    #[test]
    fn test_parse_query_path() {
        let input = "Name: {reqsJsonPath[0]['.metadata.name']}";
        let refs = parse_query_paths(input);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].index, "0");
        assert_eq!(refs[0].expression, ".metadata.name");
        assert_eq!(refs[0].fallback, None);
        assert_eq!(&input[refs[0].span.clone()], "{reqsJsonPath[0]['.metadata.name']}");
    }

    #[test]
    fn test_parse_query_path_with_spacing_and_fallback() {
        let refs = parse_query_paths(r#"{reqsJsonPath[3] [ ".a" ] [ 'n/a' ]}"#);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].expression, ".a");
        assert_eq!(refs[0].fallback, Some("n/a"));
    }

    #[test]
    fn test_parse_query_path_mixed_inner_quotes() {
        let refs = parse_query_paths(r#"{reqsJsonPath[0][".c[?(@.name=='nginx')].image"]}"#);
        assert_eq!(refs[0].expression, ".c[?(@.name=='nginx')].image");
    }

    #[test]
    fn test_parse_query_path_nested() {
        let input = r#"{reqsJsonPath[0][".items[?(@.uid=='{reqsJsonPath[1]['.uid']}')].name"]}"#;
        let refs = parse_query_paths(input);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].span, 0..input.len());
        assert_eq!(
            refs[0].expression,
            ".items[?(@.uid=='{reqsJsonPath[1]['.uid']}')].name"
        );
    }

    #[test]
    fn test_parse_query_path_extends_past_false_ending() {
        // The first `']` is not followed by `}`, so the expression keeps going.
        let refs = parse_query_paths("{reqsJsonPath[0]['.a['b']x']}");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].expression, ".a['b']x");
    }

    #[test]
    fn test_parse_query_path_unterminated() {
        assert!(parse_query_paths("{reqsJsonPath[0]['.a'").is_empty());
        assert!(parse_query_paths("{reqsJsonPath[]['.a']}").is_empty());
        assert!(parse_query_paths("{reqsJsonPath[0][.a]}").is_empty());
    }

    #[test]
    fn test_parse_multiple_query_paths() {
        let refs = parse_query_paths("{reqsJsonPath[0]['.a']}/{reqsJsonPath[1]['.b']['x']}");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].index, "1");
        assert_eq!(refs[1].fallback, Some("x"));
    }

    #[test]
    fn test_parse_positionals() {
        let input = "/api/{2}/items/{10}";
        let refs = parse_positionals(input);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].key, "2");
        assert_eq!(&input[refs[1].span.clone()], "{10}");
    }

    #[test]
    fn test_positional_ignores_other_braces() {
        assert!(parse_positionals(r#"metric{job="api"}"#).is_empty());
        assert!(parse_positionals("{reqs[0]['a']}").is_empty());
        assert!(parse_positionals("{ 1 }").is_empty());
    }

    #[test]
    fn test_has_placeholders() {
        assert!(has_placeholders("{reqs[0]['a']}"));
        assert!(has_placeholders("{reqsJsonPath[0]['.a']}"));
        assert!(has_placeholders("/ns/{1}"));
        assert!(!has_placeholders(r#"sum(rate(x{job="api"}[5m]))"#));
        assert!(!has_placeholders("plain text"));
    }

    #[test]
    fn test_extract_document_indexes() {
        let input = concat!(
            "{reqs[2]['a']} ",
            r#"{reqsJsonPath[0][".x[?(@.id=='{reqsJsonPath[3]['.id']}')]"]} "#,
            "{reqs[2]['b']}"
        );
        assert_eq!(extract_document_indexes(input), vec![0, 2, 3]);
    }
}
