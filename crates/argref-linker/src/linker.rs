//! Document rewriting with a compiled set of autolinks.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::definition::AutolinkDefinition;
use crate::error::PatternError;
use crate::pattern::{Matcher, Replacer};

/// Existing markdown links, e.g. `[link text](https://github.com/)`.
///
/// Non-greedy and single-line, so nested or malformed brackets can be
/// mis-segmented. This is a heuristic, not a markdown parser.
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[.+?\]\(.*?\)").unwrap());

/// How existing markdown links are treated while rewriting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkFilter {
    /// Rewrite the whole text.
    #[default]
    Off,
    /// Leave text inside `[text](url)` spans untouched.
    SkipExistingLinks,
}

impl From<bool> for LinkFilter {
    fn from(filter_links: bool) -> Self {
        if filter_links {
            Self::SkipExistingLinks
        } else {
            Self::Off
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledAutolink {
    definition: AutolinkDefinition,
    matcher: Matcher,
    replacer: Replacer,
}

impl CompiledAutolink {
    fn compile(definition: &AutolinkDefinition) -> Result<Self, PatternError> {
        let matcher = Matcher::compile(definition)?;
        let replacer = Replacer::compile(definition, &matcher)?;
        Ok(Self {
            definition: definition.clone(),
            matcher,
            replacer,
        })
    }

    fn replace<'t>(&self, text: &'t str) -> (Cow<'t, str>, usize) {
        self.matcher.replace_all_counted(text, &self.replacer)
    }

    /// Replace references in the text between existing links only.
    fn replace_outside_links<'t>(&self, text: &'t str) -> (Cow<'t, str>, usize) {
        let mut result = String::with_capacity(text.len());
        let mut last = 0;
        let mut total = 0;

        for link in LINK_RE.find_iter(text) {
            let (piece, count) = self.replace(&text[last..link.start()]);
            result.push_str(&piece);
            result.push_str(link.as_str());
            total += count;
            last = link.end();
        }

        let (piece, count) = self.replace(&text[last..]);
        result.push_str(&piece);
        total += count;

        if total == 0 {
            (Cow::Borrowed(text), 0)
        } else {
            (Cow::Owned(result), total)
        }
    }
}

/// Ordered set of compiled autolinks applied to markdown documents.
///
/// Definitions are compiled once and applied in order: each one sees the
/// output of the ones before it, so more specific prefixes should come first.
///
/// # Example
///
/// ```
/// use argref_linker::{AutolinkDefinition, Autolinker, LinkFilter};
///
/// let definitions = [AutolinkDefinition::new("GH-", "https://x/issues/<num>").unwrap()];
/// let linker = Autolinker::new(&definitions, LinkFilter::Off).unwrap();
///
/// assert_eq!(
///     linker.rewrite("See GH-123 for details"),
///     "See [GH-123](https://x/issues/123) for details"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Autolinker {
    autolinks: Vec<CompiledAutolink>,
    filter: LinkFilter,
}

impl Autolinker {
    /// Compile all definitions.
    ///
    /// # Errors
    ///
    /// Returns the first [`PatternError`]; no definition is silently dropped.
    pub fn new<'a>(
        definitions: impl IntoIterator<Item = &'a AutolinkDefinition>,
        filter: LinkFilter,
    ) -> Result<Self, PatternError> {
        let autolinks = definitions
            .into_iter()
            .map(CompiledAutolink::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { autolinks, filter })
    }

    /// Link filter mode used by [`rewrite`](Self::rewrite).
    #[must_use]
    pub fn filter(&self) -> LinkFilter {
        self.filter
    }

    /// Definitions in application order.
    pub fn definitions(&self) -> impl Iterator<Item = &AutolinkDefinition> {
        self.autolinks.iter().map(|a| &a.definition)
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.autolinks.len()
    }

    /// Check if there are no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.autolinks.is_empty()
    }

    /// Rewrite every reference in `markdown` into a link.
    #[must_use]
    pub fn rewrite(&self, markdown: &str) -> String {
        let mut result = markdown.to_owned();

        for autolink in &self.autolinks {
            let prefix = autolink.definition.reference_prefix();
            if !autolink.matcher.is_match(&result) {
                tracing::trace!(prefix, "No references found");
                continue;
            }

            let (rewritten, count) = match self.filter {
                LinkFilter::Off => autolink.replace(&result),
                LinkFilter::SkipExistingLinks => autolink.replace_outside_links(&result),
            };
            tracing::debug!(prefix, count, "Linked references");

            if count > 0 {
                result = rewritten.into_owned();
            }
        }

        result
    }
}

/// Rewrite `markdown` with a one-off set of definitions.
///
/// Compiles the definitions on every call; build an [`Autolinker`] to reuse them.
pub fn rewrite(
    markdown: &str,
    definitions: &[AutolinkDefinition],
    filter: LinkFilter,
) -> Result<String, PatternError> {
    Ok(Autolinker::new(definitions, filter)?.rewrite(markdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn gh() -> AutolinkDefinition {
        AutolinkDefinition::new("GH-<num>", "https://x/issues/<num>").unwrap()
    }

    fn linker(definitions: &[AutolinkDefinition], filter: LinkFilter) -> Autolinker {
        Autolinker::new(definitions, filter).unwrap()
    }

    #[test]
    fn test_empty_definitions_identity() {
        let text = "GH-1 and [x](y)";
        assert_eq!(linker(&[], LinkFilter::Off).rewrite(text), text);
        assert!(linker(&[], LinkFilter::Off).is_empty());
    }

    #[test]
    fn test_no_references_identity() {
        let text = "# Title\n\nNothing to link, not even GH- or gh.\n";
        assert_eq!(linker(&[gh()], LinkFilter::Off).rewrite(text), text);
        assert_eq!(
            linker(&[gh()], LinkFilter::SkipExistingLinks).rewrite(text),
            text
        );
    }

    #[test]
    fn test_rewrite_and_rerun_is_stable() {
        let autolinker = linker(&[gh()], LinkFilter::Off);
        let once = autolinker.rewrite("See GH-123 for details");
        assert_eq!(once, "See [GH-123](https://x/issues/123) for details");
        assert_eq!(autolinker.rewrite(&once), once);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            linker(&[gh()], LinkFilter::Off).rewrite("see gh-123"),
            "see [gh-123](https://x/issues/123)"
        );
    }

    #[test]
    fn test_filter_links_skips_existing_links() {
        assert_eq!(
            linker(&[gh()], LinkFilter::SkipExistingLinks)
                .rewrite("[GH-123](http://other) and GH-456"),
            "[GH-123](http://other) and [GH-456](https://x/issues/456)"
        );
    }

    #[test]
    fn test_filter_links_protects_link_text_with_leading_words() {
        let text = "[see GH-1](http://other)";
        assert_eq!(
            linker(&[gh()], LinkFilter::SkipExistingLinks).rewrite(text),
            text
        );
        // Without filtering the reference is not preceded by `[` and gets nested
        assert_eq!(
            linker(&[gh()], LinkFilter::Off).rewrite(text),
            "[see [GH-1](https://x/issues/1)](http://other)"
        );
    }

    #[test]
    fn test_filter_links_protects_urls() {
        let text = "[docs](https://example.com/?q=GH-5) GH-6";
        assert_eq!(
            linker(&[gh()], LinkFilter::SkipExistingLinks).rewrite(text),
            "[docs](https://example.com/?q=GH-5) [GH-6](https://x/issues/6)"
        );
    }

    #[test]
    fn test_filter_links_segments_start_fresh() {
        // Each segment between links is rewritten on its own
        assert_eq!(
            linker(&[gh()], LinkFilter::SkipExistingLinks).rewrite("[a](b)GH-1[c](d)GH-2"),
            "[a](b)[GH-1](https://x/issues/1)[c](d)[GH-2](https://x/issues/2)"
        );
    }

    #[test]
    fn test_filter_links_only_inside_links_unchanged() {
        let text = "[x GH-1](u) [y GH-2](v)";
        assert_eq!(
            linker(&[gh()], LinkFilter::SkipExistingLinks).rewrite(text),
            text
        );
    }

    #[test]
    fn test_multiple_definitions_in_order() {
        let definitions = [
            gh(),
            AutolinkDefinition::new("TASK-<proj>-<num>", "https://t/<proj>/<num>").unwrap(),
        ];
        assert_eq!(
            linker(&definitions, LinkFilter::Off).rewrite("GH-1, TASK-core-2"),
            "[GH-1](https://x/issues/1), [TASK-core-2](https://t/core/2)"
        );
    }

    #[test]
    fn test_later_definition_sees_earlier_output() {
        // `ABC-` also matches inside the link URL built by the first definition
        let definitions = [
            AutolinkDefinition::new("X-", "https://x/?id=ABC-<num>").unwrap(),
            AutolinkDefinition::new("ABC-", "https://abc/<num>").unwrap(),
        ];
        assert_eq!(
            linker(&definitions, LinkFilter::Off).rewrite("X-1"),
            "[X-1](https://x/?id=[ABC-1](https://abc/1))"
        );
    }

    #[test]
    fn test_overlapping_prefixes_compound() {
        let definitions = [
            AutolinkDefinition::new("PROJ-GH-", "https://p/<num>").unwrap(),
            gh(),
        ];
        assert_eq!(
            linker(&definitions, LinkFilter::Off).rewrite("PROJ-GH-1 GH-2"),
            "[PROJ-[GH-1](https://x/issues/1)](https://p/1) [GH-2](https://x/issues/2)"
        );
        assert_eq!(
            linker(&definitions, LinkFilter::SkipExistingLinks).rewrite("PROJ-GH-1 GH-2"),
            "[PROJ-GH-1](https://p/1) [GH-2](https://x/issues/2)"
        );
    }

    #[test]
    fn test_rewrite_function() {
        let definitions =
            [AutolinkDefinition::new("TASK-<proj>-<num>", "https://x/<proj>/<num>").unwrap()];
        assert_eq!(
            rewrite("TASK-abc-7", &definitions, LinkFilter::Off).unwrap(),
            "[TASK-abc-7](https://x/abc/7)"
        );
    }

    #[test]
    fn test_link_filter_from_bool() {
        assert_eq!(LinkFilter::from(true), LinkFilter::SkipExistingLinks);
        assert_eq!(LinkFilter::from(false), LinkFilter::Off);
        assert_eq!(LinkFilter::default(), LinkFilter::Off);
    }

    #[test]
    fn test_definitions_accessor() {
        let autolinker = linker(&[gh()], LinkFilter::SkipExistingLinks);
        assert_eq!(autolinker.len(), 1);
        assert_eq!(autolinker.filter(), LinkFilter::SkipExistingLinks);
        assert_eq!(
            autolinker
                .definitions()
                .map(AutolinkDefinition::reference_prefix)
                .collect::<Vec<_>>(),
            ["GH-<num>"]
        );
    }

    #[test]
    fn test_multiline_document() {
        let text = "# Notes GH-1\n\n- fixed GH-2\n- see [#GH-3](#gh-3)\n";
        assert_eq!(
            linker(&[gh()], LinkFilter::Off).rewrite(text),
            "# Notes [GH-1](https://x/issues/1)\n\n- fixed [GH-2](https://x/issues/2)\n- see [#GH-3](#gh-3)\n"
        );
    }
}
