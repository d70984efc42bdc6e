//! Ticket reference autolinking for markdown.
//!
//! Turns plain-text references such as `GH-123` into markdown links, based on
//! a list of [`AutolinkDefinition`]s. Each definition pairs a reference prefix
//! template with a target URL template; `<name>` placeholders in the prefix
//! capture values that are substituted into the URL.
//!
//! # Architecture
//!
//! - [`Template`]: tokenizes `<name>` placeholder templates
//! - [`AutolinkDefinition`]: validated prefix/URL pair
//! - [`Matcher`] / [`Replacer`]: compiled find and substitute halves of a definition
//! - [`Autolinker`]: applies every definition to a document, in order
//!
//! # Example
//!
//! ```
//! use argref_linker::{AutolinkDefinition, Autolinker, LinkFilter};
//!
//! let definitions = [
//!     AutolinkDefinition::new("GH-", "https://github.com/org/repo/issues/<num>").unwrap(),
//!     AutolinkDefinition::new("TASK-<proj>-<num>", "https://tasks.example.com/<proj>/<num>").unwrap(),
//! ];
//! let linker = Autolinker::new(&definitions, LinkFilter::SkipExistingLinks).unwrap();
//!
//! let markdown = "Fixes gh-7, see [TASK-core-1](https://elsewhere) and TASK-core-2.";
//! assert_eq!(
//!     linker.rewrite(markdown),
//!     "Fixes [gh-7](https://github.com/org/repo/issues/7), \
//!      see [TASK-core-1](https://elsewhere) and \
//!      [TASK-core-2](https://tasks.example.com/core/2)."
//! );
//! ```

mod definition;
mod error;
mod linker;
mod pattern;
mod template;

pub use definition::AutolinkDefinition;
pub use error::{DefinitionError, PatternError};
pub use linker::{Autolinker, LinkFilter, rewrite};
pub use pattern::{Matcher, ReferenceMatch, ReferenceMatches, Replacer};
pub use template::{DEFAULT_VARIABLE, Segment, Template};
