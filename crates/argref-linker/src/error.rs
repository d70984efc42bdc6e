//! Error types for autolink definitions and pattern compilation.

/// Invalid autolink definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// A placeholder from `reference_prefix` is absent from `target_url`.
    #[error("all variables must be used in target_url: <{name}> is missing")]
    MissingVariable {
        /// Placeholder name without angle brackets.
        name: String,
    },

    /// The same placeholder appears twice in `reference_prefix`.
    #[error("variable <{name}> is declared more than once in reference_prefix")]
    DuplicateVariable {
        /// Placeholder name without angle brackets.
        name: String,
    },

    /// `target_url` uses a placeholder that `reference_prefix` never captures.
    #[error("variable <{name}> in target_url is not declared in reference_prefix")]
    UnknownVariable {
        /// Placeholder name without angle brackets.
        name: String,
    },
}

impl DefinitionError {
    /// Name of the definition field the error is about.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingVariable { .. } | Self::UnknownVariable { .. } => "target_url",
            Self::DuplicateVariable { .. } => "reference_prefix",
        }
    }
}

/// Failure to build a matcher or replacer from a definition.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    /// The escaped reference prefix did not compile.
    #[error("invalid reference pattern for '{prefix}'")]
    Regex {
        /// Reference prefix the pattern was built from.
        prefix: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// The URL template names a placeholder the matcher does not capture.
    #[error("target_url variable <{name}> has no capture in '{prefix}'")]
    UnresolvedVariable {
        /// Reference prefix the matcher was built from.
        prefix: String,
        /// Placeholder name without angle brackets.
        name: String,
    },
}
