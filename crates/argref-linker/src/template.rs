//! Tokenizer for `<name>` placeholder templates.
//!
//! Both sides of an autolink definition are templates: the reference prefix
//! (`GH-<num>`) and the target URL (`https://github.com/org/repo/issues/<num>`).
//! A placeholder is `<`, the shortest non-empty run of non-whitespace
//! characters, then `>`. Anything else, including a stray `<`, is literal text.

use std::fmt;

/// Name of the placeholder appended to prefixes that declare none.
pub const DEFAULT_VARIABLE: &str = "num";

/// A piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text matched or emitted verbatim.
    Literal(String),
    /// Placeholder name, without the angle brackets.
    Variable(String),
}

/// Template split into literal runs and placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template string.
    ///
    /// # Examples
    ///
    /// ```
    /// use argref_linker::{Segment, Template};
    ///
    /// let template = Template::parse("TASK-<proj>-<num>");
    /// assert_eq!(
    ///     template.segments(),
    ///     [
    ///         Segment::Literal("TASK-".to_owned()),
    ///         Segment::Variable("proj".to_owned()),
    ///         Segment::Literal("-".to_owned()),
    ///         Segment::Variable("num".to_owned()),
    ///     ]
    /// );
    /// ```
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(open) = rest.find('<') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            if let Some(len) = variable_name_len(after) {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(after[..len].to_owned()));
                rest = &after[len + 1..];
            } else {
                literal.push('<');
                rest = after;
            }
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            source: source.to_owned(),
            segments,
        }
    }

    /// Append a placeholder to the end of the template.
    pub fn push_variable(&mut self, name: &str) {
        self.source.push('<');
        self.source.push_str(name);
        self.source.push('>');
        self.segments.push(Segment::Variable(name.to_owned()));
    }

    /// The template text, including any appended placeholders.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Parsed segments in source order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in order of appearance (repeats included).
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Variable(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Check whether the template contains the `<name>` placeholder.
    #[must_use]
    pub fn has_variable(&self, name: &str) -> bool {
        self.variables().any(|v| v == name)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Length in bytes of the placeholder name starting right after a `<`.
///
/// Returns `None` when no closing `>` follows before whitespace or end of input.
fn variable_name_len(text: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    let (_, first) = chars.next()?;
    if first.is_whitespace() {
        return None;
    }
    for (idx, ch) in chars {
        if ch == '>' {
            return Some(idx);
        }
        if ch.is_whitespace() {
            return None;
        }
    }
    None
}
