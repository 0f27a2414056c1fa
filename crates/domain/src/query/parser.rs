//! Recursive-descent parser for path-query expressions.

use serde_json::{Number, Value};

use super::{CompareOp, FilterExpr, Operand, PathStep, QueryError, QueryResult, Segment, Selector};

pub(super) fn parse(expression: &str) -> QueryResult<Vec<Segment>> {
    let mut cursor = Cursor::new(expression);
    cursor.skip_whitespace();
    cursor.eat('$');

    let mut segments = Vec::new();
    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            None => break,
            Some('.') => {
                cursor.bump();
                if cursor.eat('.') {
                    segments.push(Segment::Descendant(cursor.parse_after_dot(true)?));
                } else {
                    segments.push(Segment::Child(cursor.parse_after_dot(false)?));
                }
            }
            Some('[') => segments.push(Segment::Child(cursor.parse_bracket()?)),
            Some(found) => return Err(cursor.unexpected(found)),
        }
    }

    Ok(segments)
}

/// Deepest nesting of `!` and parentheses accepted inside a filter.
const MAX_FILTER_DEPTH: usize = 64;

const fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '$' | '-')
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Cursor<'a> {
    const fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, expected: &str) -> bool {
        if self.src[self.pos..].starts_with(expected) {
            self.pos += expected.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> QueryResult<()> {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.bump();
                Ok(())
            }
            Some(found) => Err(self.unexpected(found)),
            None => Err(QueryError::UnexpectedEnd),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    const fn unexpected(&self, found: char) -> QueryError {
        QueryError::UnexpectedChar {
            position: self.pos,
            found,
        }
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let src = self.src;
        let start = self.pos;
        while self.peek().is_some_and(&predicate) {
            self.bump();
        }
        &src[start..self.pos]
    }

    /// Selector following `.` or `..`.
    fn parse_after_dot(&mut self, descendant: bool) -> QueryResult<Selector> {
        if self.eat('*') {
            return Ok(Selector::Wildcard);
        }
        if descendant && self.peek() == Some('[') {
            return self.parse_bracket();
        }
        let name = self.parse_name()?;
        Ok(Selector::Name(name.to_string()))
    }

    fn parse_name(&mut self) -> QueryResult<&'a str> {
        let name = self.take_while(is_name_char);
        if name.is_empty() {
            return Err(self
                .peek()
                .map_or(QueryError::UnexpectedEnd, |found| self.unexpected(found)));
        }
        Ok(name)
    }

    fn parse_bracket(&mut self) -> QueryResult<Selector> {
        self.expect('[')?;
        self.skip_whitespace();

        let selector = match self.peek() {
            None => return Err(QueryError::UnexpectedEnd),
            Some('*') => {
                self.bump();
                Selector::Wildcard
            }
            Some('?') => {
                self.bump();
                self.skip_whitespace();
                self.expect('(')?;
                let filter = self.parse_or()?;
                self.skip_whitespace();
                self.expect(')')?;
                Selector::Filter(filter)
            }
            Some('(') => {
                return Err(QueryError::Unsupported("script expressions".to_string()));
            }
            Some(_) => self.parse_union()?,
        };

        self.skip_whitespace();
        self.expect(']')?;
        Ok(selector)
    }

    fn parse_union(&mut self) -> QueryResult<Selector> {
        if self.peek() == Some(':') {
            return self.parse_slice(None);
        }

        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(quote @ ('\'' | '"')) => {
                    items.push(Selector::Name(self.parse_string(quote)?));
                }
                Some(ch) if ch == '-' || ch.is_ascii_digit() => {
                    let index = self.parse_integer()?;
                    self.skip_whitespace();
                    if items.is_empty() && self.peek() == Some(':') {
                        return self.parse_slice(Some(index));
                    }
                    items.push(Selector::Index(index));
                }
                Some(found) => return Err(self.unexpected(found)),
                None => return Err(QueryError::UnexpectedEnd),
            }
            self.skip_whitespace();
            if !self.eat(',') {
                break;
            }
        }

        if items.len() == 1 {
            Ok(items.remove(0))
        } else {
            Ok(Selector::Union(items))
        }
    }

    fn parse_slice(&mut self, start: Option<i64>) -> QueryResult<Selector> {
        self.expect(':')?;
        self.skip_whitespace();
        let end = match self.peek() {
            Some(ch) if ch == '-' || ch.is_ascii_digit() => Some(self.parse_integer()?),
            _ => None,
        };
        self.skip_whitespace();
        if self.peek() == Some(':') {
            return Err(QueryError::Unsupported("slice steps".to_string()));
        }
        Ok(Selector::Slice { start, end })
    }

    fn parse_integer(&mut self) -> QueryResult<i64> {
        let start = self.pos;
        self.eat('-');
        self.take_while(|ch| ch.is_ascii_digit());
        let text = &self.src[start..self.pos];
        text.parse::<i64>()
            .map_err(|_| QueryError::InvalidNumber(text.to_string()))
    }

    fn parse_string(&mut self, quote: char) -> QueryResult<String> {
        self.expect(quote)?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(QueryError::UnexpectedEnd),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(escaped) => out.push(escaped),
                    None => return Err(QueryError::UnexpectedEnd),
                },
                Some(ch) if ch == quote => return Ok(out),
                Some(ch) => out.push(ch),
            }
        }
    }

    fn parse_or(&mut self) -> QueryResult<FilterExpr> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_whitespace();
            if !self.eat_str("||") {
                return Ok(left);
            }
            let right = self.parse_and()?;
            left = FilterExpr::Or(Box::new(left), Box::new(right));
        }
    }

    fn parse_and(&mut self) -> QueryResult<FilterExpr> {
        let mut left = self.parse_unary()?;
        loop {
            self.skip_whitespace();
            if !self.eat_str("&&") {
                return Ok(left);
            }
            let right = self.parse_unary()?;
            left = FilterExpr::And(Box::new(left), Box::new(right));
        }
    }

    fn parse_unary(&mut self) -> QueryResult<FilterExpr> {
        if self.depth >= MAX_FILTER_DEPTH {
            return Err(QueryError::TooDeep(MAX_FILTER_DEPTH));
        }
        self.depth += 1;
        let term = self.parse_term();
        self.depth -= 1;
        term
    }

    fn parse_term(&mut self) -> QueryResult<FilterExpr> {
        self.skip_whitespace();
        // `!=` never starts a term, so a leading `!` is always negation.
        if self.eat('!') {
            return Ok(FilterExpr::Not(Box::new(self.parse_unary()?)));
        }
        if self.eat('(') {
            let inner = self.parse_or()?;
            self.skip_whitespace();
            self.expect(')')?;
            return Ok(inner);
        }

        let left = self.parse_operand()?;
        self.skip_whitespace();
        match self.parse_compare_op() {
            Some(op) => {
                self.skip_whitespace();
                let right = self.parse_operand()?;
                Ok(FilterExpr::Compare { left, op, right })
            }
            None => Ok(FilterExpr::Truthy(left)),
        }
    }

    fn parse_compare_op(&mut self) -> Option<CompareOp> {
        // Longest operators first.
        const OPERATORS: [(&str, CompareOp); 8] = [
            ("===", CompareOp::StrictEq),
            ("!==", CompareOp::StrictNotEq),
            ("==", CompareOp::Eq),
            ("!=", CompareOp::NotEq),
            ("<=", CompareOp::Le),
            (">=", CompareOp::Ge),
            ("<", CompareOp::Lt),
            (">", CompareOp::Gt),
        ];
        OPERATORS
            .iter()
            .find(|(symbol, _)| self.eat_str(symbol))
            .map(|(_, op)| *op)
    }

    fn parse_operand(&mut self) -> QueryResult<Operand> {
        match self.peek() {
            None => Err(QueryError::UnexpectedEnd),
            Some('@') => {
                self.bump();
                Ok(Operand::Current(self.parse_relative_steps()?))
            }
            Some('$') => Err(QueryError::Unsupported(
                "root references inside filters".to_string(),
            )),
            Some(quote @ ('\'' | '"')) => {
                Ok(Operand::Literal(Value::String(self.parse_string(quote)?)))
            }
            Some(ch) if ch == '-' || ch.is_ascii_digit() => self.parse_number_literal(),
            Some(ch) if ch.is_ascii_alphabetic() => {
                let word = self.take_while(|c| c.is_ascii_alphabetic());
                match word {
                    "true" => Ok(Operand::Literal(Value::Bool(true))),
                    "false" => Ok(Operand::Literal(Value::Bool(false))),
                    "null" => Ok(Operand::Literal(Value::Null)),
                    other => Err(QueryError::Unsupported(format!("identifier '{other}'"))),
                }
            }
            Some(found) => Err(self.unexpected(found)),
        }
    }

    fn parse_relative_steps(&mut self) -> QueryResult<Vec<PathStep>> {
        let mut steps = Vec::new();
        loop {
            match self.peek() {
                Some('.') if self.peek_nth(1).is_some_and(is_name_char) => {
                    self.bump();
                    steps.push(PathStep::Name(self.parse_name()?.to_string()));
                }
                Some('[') => {
                    self.bump();
                    self.skip_whitespace();
                    let step = match self.peek() {
                        Some(quote @ ('\'' | '"')) => PathStep::Name(self.parse_string(quote)?),
                        Some(ch) if ch == '-' || ch.is_ascii_digit() => {
                            PathStep::Index(self.parse_integer()?)
                        }
                        Some(found) => return Err(self.unexpected(found)),
                        None => return Err(QueryError::UnexpectedEnd),
                    };
                    self.skip_whitespace();
                    self.expect(']')?;
                    steps.push(step);
                }
                _ => return Ok(steps),
            }
        }
    }

    fn parse_number_literal(&mut self) -> QueryResult<Operand> {
        let start = self.pos;
        self.eat('-');
        self.take_while(|ch| ch.is_ascii_digit());
        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            self.take_while(|ch| ch.is_ascii_digit());
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.bump();
            if !self.eat('-') {
                self.eat('+');
            }
            self.take_while(|ch| ch.is_ascii_digit());
        }
        let text = &self.src[start..self.pos];

        if let Ok(int) = text.parse::<i64>() {
            return Ok(Operand::Literal(Value::from(int)));
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(|n| Operand::Literal(Value::Number(n)))
            .ok_or_else(|| QueryError::InvalidNumber(text.to_string()))
    }
}
