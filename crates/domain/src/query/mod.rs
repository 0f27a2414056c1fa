//! Path-query language
//!
//! A small JSONPath dialect used by `{reqsJsonPath[...]}` placeholders. An
//! expression such as `.items[?(@.kind=='Pod')].metadata.name` is read as the
//! path `$.items[?(@.kind=='Pod')].metadata.name` and evaluated against the
//! root of a fetched document.
//!
//! # Supported syntax
//!
//! - members: `.name`, `.0`, `['name']`, `["a","b"]`
//! - wildcards and descent: `.*`, `[*]`, `..name`, `..*`, `..[0]`
//! - indexes and slices: `[0]`, `[-1]`, `[1:3]`, `[:2]`, `[0,2]`
//! - filters: `[?(@.a.b == 'x' && @.n > 2)]`, `[?(@.flag)]`, `[?(!@.flag)]`
//!
//! # Usage
//!
//! ```
//! use serde_json::json;
//! use stencil_domain::query;
//!
//! let doc = json!({"items": [{"name": "a"}, {"name": "b"}]});
//! let found = query::select(&doc, ".items[1].name").unwrap();
//! assert_eq!(found, vec![&json!("b")]);
//! ```

mod eval;
mod parser;

use serde_json::Value;
use thiserror::Error;

pub use eval::{loose_equals, strict_equals, to_number, truthy};

/// Errors raised while parsing a path-query expression.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The expression stopped in the middle of a construct.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// A character that no rule accepts at this position.
    #[error("unexpected character '{found}' at position {position}")]
    UnexpectedChar {
        /// Byte offset in the expression.
        position: usize,
        /// The offending character.
        found: char,
    },

    /// A numeric literal or index that cannot be represented.
    #[error("invalid number: {0}")]
    InvalidNumber(String),

    /// Syntax that belongs to full JSONPath but is not implemented here.
    #[error("unsupported syntax: {0}")]
    Unsupported(String),

    /// Filter terms nested past the parser's depth limit.
    #[error("filter nested deeper than {0} levels")]
    TooDeep(usize),
}

/// Result type alias for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// A parsed path, ready to be evaluated against any number of documents.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

/// One step of a path.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Apply the selector to the current nodes.
    Child(Selector),
    /// Apply the selector to the current nodes and all their descendants.
    Descendant(Selector),
}

/// What a segment picks out of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Object member, or array element when the name is a decimal index.
    Name(String),
    /// Array element; negative values count from the end.
    Index(i64),
    /// Half-open range of array elements.
    Slice {
        /// First element, inclusive.
        start: Option<i64>,
        /// Last element, exclusive.
        end: Option<i64>,
    },
    /// Every member or element.
    Wildcard,
    /// Several names and/or indexes.
    Union(Vec<Selector>),
    /// Elements for which the predicate holds.
    Filter(FilterExpr),
}

/// Predicate of a `[?(...)]` selector.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// `a || b`
    Or(Box<FilterExpr>, Box<FilterExpr>),
    /// `a && b`
    And(Box<FilterExpr>, Box<FilterExpr>),
    /// `!a`
    Not(Box<FilterExpr>),
    /// `left op right`
    Compare {
        /// Left-hand operand.
        left: Operand,
        /// Comparison operator.
        op: CompareOp,
        /// Right-hand operand.
        right: Operand,
    },
    /// A bare operand tested for truthiness.
    Truthy(Operand),
}

/// A value inside a filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A path relative to the element under test (`@.a.b`).
    Current(Vec<PathStep>),
    /// A literal string, number, boolean or null.
    Literal(Value),
}

/// A step of a relative path inside a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    /// `.name` or `['name']`
    Name(String),
    /// `[n]`
    Index(i64),
}

/// Comparison operators of filter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `==`, loose equality
    Eq,
    /// `!=`
    NotEq,
    /// `===`, strict equality
    StrictEq,
    /// `!==`
    StrictNotEq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl JsonPath {
    /// Parses an expression. A leading `$` is optional.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] describing the first syntax problem.
    pub fn parse(expression: &str) -> QueryResult<Self> {
        parser::parse(expression).map(|segments| Self { segments })
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Evaluates the path against `root`, returning matches in document order.
    #[must_use]
    pub fn select<'v>(&self, root: &'v Value) -> Vec<&'v Value> {
        eval::select(&self.segments, root)
    }
}

/// Parses `expression` and evaluates it against `root`.
///
/// # Errors
///
/// Returns a [`QueryError`] if the expression does not parse.
pub fn select<'v>(root: &'v Value, expression: &str) -> QueryResult<Vec<&'v Value>> {
    Ok(JsonPath::parse(expression)?.select(root))
}

/// Parses `expression`, evaluates it, and keeps only the first match.
///
/// # Errors
///
/// Returns a [`QueryError`] if the expression does not parse.
pub fn select_first<'v>(root: &'v Value, expression: &str) -> QueryResult<Option<&'v Value>> {
    Ok(select(root, expression)?.into_iter().next())
}
