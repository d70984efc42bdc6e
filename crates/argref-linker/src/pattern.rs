//! Matcher and replacer compiled from an autolink definition.
//!
//! The matcher is built from the parsed prefix template rather than by
//! splicing regex source: literal runs are escaped, and each placeholder
//! becomes a positional capture group matching `[-\w]+`. Placeholder names
//! never reach the regex engine, so any name the template tokenizer accepts
//! is usable.
//!
//! References directly preceded by `#`, `[` or `/` are skipped. That keeps
//! heading anchors, link text and URL path segments from being linked again.
//! The `regex` crate has no look-behind, so the check happens on each
//! candidate and a rejected candidate resumes the search one character later.

use std::borrow::Cow;
use std::ops::Range;

use regex::Regex;

use crate::definition::AutolinkDefinition;
use crate::error::PatternError;
use crate::template::Segment;

/// Characters that disqualify a reference when they immediately precede it.
const EXCLUDED_PRECEDING: [char; 3] = ['#', '[', '/'];

/// Character class a placeholder value is made of.
const VALUE_PATTERN: &str = r"([-\w]+)";

/// Case-insensitive matcher for one reference prefix.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
    prefix: String,
    variables: Vec<String>,
}

/// One reference found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMatch<'t> {
    /// Byte range of the reference in the searched text.
    pub range: Range<usize>,
    /// The reference exactly as written, e.g. `gh-123`.
    pub text: &'t str,
    /// Captured placeholder values, in prefix order.
    pub values: Vec<&'t str>,
}

impl Matcher {
    /// Compile the matcher for a definition's reference prefix.
    pub fn compile(definition: &AutolinkDefinition) -> Result<Self, PatternError> {
        let template = definition.prefix_template();
        let mut source = String::from("(?i)");
        let mut variables = Vec::new();

        for segment in template.segments() {
            match segment {
                Segment::Literal(text) => source.push_str(&regex::escape(text)),
                Segment::Variable(name) => {
                    source.push_str(VALUE_PATTERN);
                    variables.push(name.clone());
                }
            }
        }

        let regex = Regex::new(&source).map_err(|source| PatternError::Regex {
            prefix: template.as_str().to_owned(),
            source,
        })?;

        Ok(Self {
            regex,
            prefix: template.as_str().to_owned(),
            variables,
        })
    }

    /// Placeholder names in capture order.
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Position of a placeholder's value in [`ReferenceMatch::values`].
    #[must_use]
    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v == name)
    }

    /// Check whether the text contains at least one linkable reference.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.find_iter(text).next().is_some()
    }

    /// Iterate over non-overlapping references, leftmost first.
    pub fn find_iter<'m, 't>(&'m self, text: &'t str) -> ReferenceMatches<'m, 't> {
        ReferenceMatches {
            matcher: self,
            text,
            pos: 0,
        }
    }

    /// Replace every reference in `text` with the replacer's link.
    ///
    /// Returns the input unchanged (borrowed) when nothing matched.
    pub fn replace_all<'t>(&self, text: &'t str, replacer: &Replacer) -> Cow<'t, str> {
        self.replace_all_counted(text, replacer).0
    }

    /// Like [`replace_all`](Self::replace_all), also returning the number of links made.
    pub(crate) fn replace_all_counted<'t>(
        &self,
        text: &'t str,
        replacer: &Replacer,
    ) -> (Cow<'t, str>, usize) {
        let mut result = String::new();
        let mut last = 0;
        let mut count = 0;

        for reference in self.find_iter(text) {
            if count == 0 {
                result.reserve(text.len() + 64);
            }
            result.push_str(&text[last..reference.range.start]);
            replacer.render_into(&reference, &mut result);
            last = reference.range.end;
            count += 1;
        }

        if count == 0 {
            return (Cow::Borrowed(text), 0);
        }
        result.push_str(&text[last..]);
        (Cow::Owned(result), count)
    }
}

/// Iterator over references produced by [`Matcher::find_iter`].
#[derive(Debug)]
pub struct ReferenceMatches<'m, 't> {
    matcher: &'m Matcher,
    text: &'t str,
    pos: usize,
}

impl<'t> Iterator for ReferenceMatches<'_, 't> {
    type Item = ReferenceMatch<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos <= self.text.len() {
            let caps = self.matcher.regex.captures_at(self.text, self.pos)?;
            let whole = caps.get(0)?;

            if is_excluded(self.text, whole.start()) {
                self.pos = whole.start() + char_len_at(self.text, whole.start());
                continue;
            }

            // Placeholders need at least one character, so matches are never empty
            self.pos = whole.end();
            let values = (1..caps.len())
                .map(|i| caps.get(i).map_or("", |m| m.as_str()))
                .collect();

            return Some(ReferenceMatch {
                range: whole.range(),
                text: whole.as_str(),
                values,
            });
        }
        None
    }
}

/// Check the character before `start` against [`EXCLUDED_PRECEDING`].
fn is_excluded(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .is_some_and(|c| EXCLUDED_PRECEDING.contains(&c))
}

fn char_len_at(text: &str, idx: usize) -> usize {
    text[idx..].chars().next().map_or(1, char::len_utf8)
}

#[derive(Debug, Clone)]
enum UrlPart {
    Literal(String),
    Value(usize),
}

/// Builds `[reference](url)` links from matches.
#[derive(Debug, Clone)]
pub struct Replacer {
    parts: Vec<UrlPart>,
}

impl Replacer {
    /// Compile the URL template of a definition against its matcher.
    pub fn compile(
        definition: &AutolinkDefinition,
        matcher: &Matcher,
    ) -> Result<Self, PatternError> {
        let parts = definition
            .url_template()
            .segments()
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => Ok(UrlPart::Literal(text.clone())),
                Segment::Variable(name) => matcher
                    .variable_index(name)
                    .map(UrlPart::Value)
                    .ok_or_else(|| PatternError::UnresolvedVariable {
                        prefix: matcher.prefix.clone(),
                        name: name.clone(),
                    }),
            })
            .collect::<Result<Vec<_>, PatternError>>()?;

        Ok(Self { parts })
    }

    /// Render the markdown link for one reference.
    #[must_use]
    pub fn render(&self, reference: &ReferenceMatch<'_>) -> String {
        let mut link = String::new();
        self.render_into(reference, &mut link);
        link
    }

    fn render_into(&self, reference: &ReferenceMatch<'_>, out: &mut String) {
        out.push('[');
        out.push_str(reference.text);
        out.push_str("](");
        for part in &self.parts {
            match part {
                UrlPart::Literal(text) => out.push_str(text),
                UrlPart::Value(idx) => {
                    out.push_str(reference.values.get(*idx).copied().unwrap_or_default());
                }
            }
        }
        out.push(')');
    }
}
