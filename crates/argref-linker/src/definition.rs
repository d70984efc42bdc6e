//! Validated autolink definitions.

use std::collections::HashSet;

use crate::error::DefinitionError;
use crate::template::{DEFAULT_VARIABLE, Template};

/// A reference prefix paired with the URL its matches link to.
///
/// Construction validates the pair: a prefix without placeholders gets
/// `<num>` appended, and every prefix placeholder must appear in the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutolinkDefinition {
    reference_prefix: Template,
    target_url: Template,
}

impl AutolinkDefinition {
    /// Create a definition from its raw template strings.
    ///
    /// # Examples
    ///
    /// ```
    /// use argref_linker::AutolinkDefinition;
    ///
    /// let definition = AutolinkDefinition::new("GH-", "https://x/issues/<num>").unwrap();
    /// assert_eq!(definition.reference_prefix(), "GH-<num>");
    ///
    /// assert!(AutolinkDefinition::new("REF-<id>", "https://x/fixed").is_err());
    /// ```
    pub fn new(
        reference_prefix: impl AsRef<str>,
        target_url: impl AsRef<str>,
    ) -> Result<Self, DefinitionError> {
        let mut prefix = Template::parse(reference_prefix.as_ref());
        if prefix.variables().next().is_none() {
            prefix.push_variable(DEFAULT_VARIABLE);
        }
        let url = Template::parse(target_url.as_ref());

        let mut declared = HashSet::new();
        for name in prefix.variables() {
            if !declared.insert(name) {
                return Err(DefinitionError::DuplicateVariable {
                    name: name.to_owned(),
                });
            }
            if !url.has_variable(name) {
                return Err(DefinitionError::MissingVariable {
                    name: name.to_owned(),
                });
            }
        }

        if let Some(name) = url.variables().find(|name| !declared.contains(name)) {
            return Err(DefinitionError::UnknownVariable {
                name: name.to_owned(),
            });
        }

        Ok(Self {
            reference_prefix: prefix,
            target_url: url,
        })
    }

    /// Reference prefix after normalization (e.g. `GH-<num>`).
    #[must_use]
    pub fn reference_prefix(&self) -> &str {
        self.reference_prefix.as_str()
    }

    /// Target URL template.
    #[must_use]
    pub fn target_url(&self) -> &str {
        self.target_url.as_str()
    }

    pub(crate) fn prefix_template(&self) -> &Template {
        &self.reference_prefix
    }

    pub(crate) fn url_template(&self) -> &Template {
        &self.target_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_without_variables_gets_default() {
        let definition = AutolinkDefinition::new("GH-", "https://x/<num>").unwrap();
        assert_eq!(definition.reference_prefix(), "GH-<num>");
        assert_eq!(definition.target_url(), "https://x/<num>");
    }

    #[test]
    fn test_default_variable_must_be_in_url() {
        let err = AutolinkDefinition::new("GH-", "https://x/issues").unwrap_err();
        assert_eq!(
            err,
            DefinitionError::MissingVariable {
                name: "num".to_owned()
            }
        );
        assert_eq!(err.field(), "target_url");
    }

    #[test]
    fn test_explicit_variable_kept() {
        let definition = AutolinkDefinition::new("JIRA-<key>", "https://j/<key>").unwrap();
        assert_eq!(definition.reference_prefix(), "JIRA-<key>");
    }

    #[test]
    fn test_missing_variable_rejected() {
        let err = AutolinkDefinition::new("REF-<id>", "https://x/fixed").unwrap_err();
        assert!(matches!(err, DefinitionError::MissingVariable { ref name } if name == "id"));
        assert!(err.to_string().contains("target_url"));
    }

    #[test]
    fn test_multi_variable_all_required() {
        assert!(AutolinkDefinition::new("TASK-<proj>-<num>", "https://x/<proj>/<num>").is_ok());

        let err = AutolinkDefinition::new("TASK-<proj>-<num>", "https://x/<num>").unwrap_err();
        assert!(matches!(err, DefinitionError::MissingVariable { ref name } if name == "proj"));
    }

    #[test]
    fn test_url_may_repeat_variable() {
        let definition =
            AutolinkDefinition::new("GH-<num>", "https://x/<num>#issue-<num>").unwrap();
        assert_eq!(definition.url_template().variables().count(), 2);
    }

    #[test]
    fn test_duplicate_prefix_variable_rejected() {
        let err = AutolinkDefinition::new("<n>-<n>", "https://x/<n>").unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateVariable { ref name } if name == "n"));
        assert_eq!(err.field(), "reference_prefix");
    }

    #[test]
    fn test_unknown_url_variable_rejected() {
        let err = AutolinkDefinition::new("GH-<num>", "https://x/<org>/<num>").unwrap_err();
        assert!(matches!(err, DefinitionError::UnknownVariable { ref name } if name == "org"));
    }

    #[test]
    fn test_empty_prefix_becomes_default_placeholder() {
        let definition = AutolinkDefinition::new("", "https://x/<num>").unwrap();
        assert_eq!(definition.reference_prefix(), "<num>");
    }
}
