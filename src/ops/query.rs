use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

/// `name:value` or `-name:value`, where name is a word or a quoted string and
/// value is a quoted literal or a run of non-space characters
static QUALIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(^|\s)(-?)("[^"]*"|[A-Za-z0-9_-]+):("[^"]*"|\S+)"#)
        .expect("qualifier regex must compile")
});

/// `>=5`, `<2.5`, `=3`, `==3` or a bare number
static COMPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(<=|>=|==|<|>|=)?(-?\d+(?:\.\d+)?)$").expect("comparator regex must compile")
});

/// `1..5`, inclusive
static RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?\d+(?:\.\d+)?)\.\.(-?\d+(?:\.\d+)?)$").expect("range regex must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

/// A numeric test parsed from a qualifier value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericTest {
    Compare(CompareOp, f64),
    /// Inclusive on both ends; bounds are used as written
    Range(f64, f64),
}

impl NumericTest {
    pub fn parse(value: &str) -> Option<NumericTest> {
        if let Some(caps) = RANGE.captures(value) {
            let min = caps[1].parse().ok()?;
            let max = caps[2].parse().ok()?;
            return Some(NumericTest::Range(min, max));
        }
        let caps = COMPARATOR.captures(value)?;
        let op = match caps.get(1).map(|m| m.as_str()) {
            Some("<") => CompareOp::Lt,
            Some("<=") => CompareOp::Le,
            Some(">") => CompareOp::Gt,
            Some(">=") => CompareOp::Ge,
            _ => CompareOp::Eq,
        };
        Some(NumericTest::Compare(op, caps[2].parse().ok()?))
    }

    pub fn test(&self, n: f64) -> bool {
        match *self {
            NumericTest::Compare(CompareOp::Lt, x) => n < x,
            NumericTest::Compare(CompareOp::Le, x) => n <= x,
            NumericTest::Compare(CompareOp::Gt, x) => n > x,
            NumericTest::Compare(CompareOp::Ge, x) => n >= x,
            NumericTest::Compare(CompareOp::Eq, x) => n == x,
            NumericTest::Range(min, max) => min <= n && n <= max,
        }
    }
}

/// A lower-cased query literal, compiled to a wildcard regex when it
/// contains `*`
#[derive(Debug, Clone)]
pub enum TextPattern {
    Literal(String),
    /// `None` when the pattern failed to compile; it then matches nothing
    Wildcard(Option<Regex>),
}

impl TextPattern {
    pub fn new(literal: &str) -> TextPattern {
        if !literal.contains('*') {
            return TextPattern::Literal(literal.to_string());
        }
        let body = literal
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        TextPattern::Wildcard(Regex::new(&format!("(?i){}", body)).ok())
    }

    /// Substring containment (or wildcard search) in `haystack`
    pub fn found_in(&self, haystack: &str) -> bool {
        match self {
            TextPattern::Literal(s) => haystack.contains(s.as_str()),
            TextPattern::Wildcard(re) => re.as_ref().is_some_and(|re| re.is_match(haystack)),
        }
    }

    /// Exact equality (or wildcard search) against `text`
    pub fn equals(&self, text: &str) -> bool {
        match self {
            TextPattern::Literal(s) => text == s,
            TextPattern::Wildcard(re) => re.as_ref().is_some_and(|re| re.is_match(text)),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, TextPattern::Wildcard(_))
    }
}

/// One value of one qualifier occurrence
#[derive(Debug, Clone)]
pub struct QualifierValue {
    /// Lower-cased literal as typed (quotes removed)
    pub value: String,
    /// Whether the occurrence carrying this value was written `-name:`
    pub negated: bool,
    pub pattern: TextPattern,
    pub numeric: Option<NumericTest>,
}

impl QualifierValue {
    fn new(value: String, negated: bool) -> Self {
        QualifierValue {
            pattern: TextPattern::new(&value),
            numeric: NumericTest::parse(&value),
            value,
            negated,
        }
    }
}

/// A parsed query: qualifiers grouped by name plus free tokens.
///
/// Every value of every qualifier must hold (negated values must not), and
/// every free token must be found in the item text.
#[derive(Debug, Clone, Default)]
pub struct Query {
    qualifiers: IndexMap<String, Vec<QualifierValue>>,
    free_tokens: Vec<TextPattern>,
    empty: bool,
}

fn strip_quotes(s: &str) -> Option<&str> {
    s.strip_prefix('"')?.strip_suffix('"')
}

fn split_values(raw: &str) -> Vec<String> {
    match strip_quotes(raw) {
        Some(inner) => vec![inner.to_lowercase()],
        None => raw
            .split(',')
            .map(|piece| piece.trim().to_lowercase())
            .filter(|piece| !piece.is_empty())
            .collect(),
    }
}

impl Query {
    pub fn parse(input: &str) -> Query {
        let mut qualifiers: IndexMap<String, Vec<QualifierValue>> = IndexMap::new();
        let mut rest = String::with_capacity(input.len());
        let mut last = 0;

        for caps in QUALIFIER.captures_iter(input) {
            let (Some(whole), Some(name), Some(value)) = (caps.get(0), caps.get(3), caps.get(4))
            else {
                continue;
            };
            rest.push_str(&input[last..whole.start()]);
            rest.push(' ');
            last = whole.end();

            let negated = caps.get(2).is_some_and(|m| !m.as_str().is_empty());
            let name = strip_quotes(name.as_str()).unwrap_or(name.as_str());
            let values = split_values(value.as_str())
                .into_iter()
                .map(|v| QualifierValue::new(v, negated));
            qualifiers.entry(name.to_string()).or_default().extend(values);
        }
        rest.push_str(&input[last..]);

        let free_tokens = rest
            .split_whitespace()
            .map(|token| TextPattern::new(&token.to_lowercase()))
            .collect();

        Query {
            qualifiers,
            free_tokens,
            empty: input.trim().is_empty(),
        }
    }

    /// True when the query text was blank
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Qualifier names with their accumulated values, in first-seen order
    pub fn qualifiers(&self) -> impl Iterator<Item = (&str, &[QualifierValue])> {
        self.qualifiers
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn free_tokens(&self) -> &[TextPattern] {
        &self.free_tokens
    }
}
