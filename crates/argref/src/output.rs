//! Colored terminal output for argref commands.
//!
//! Everything goes to stderr; stdout is reserved for rewritten markdown.

use std::path::Path;

use console::{Style, Term};

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    ok: Style,
    warn: Style,
    fail: Style,
    reference: Style,
    dim: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            ok: Style::new().green(),
            warn: Style::new().yellow(),
            fail: Style::new().red(),
            reference: Style::new().cyan().bold(),
            dim: Style::new().dim(),
        }
    }

    fn line(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        self.line(msg);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        self.line(&self.ok.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        self.line(&self.warn.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        self.line(&self.fail.apply_to(msg).to_string());
    }

    /// Print one autolink as `PREFIX -> url`.
    pub(crate) fn autolink(&self, reference_prefix: &str, target_url: &str) {
        self.line(&format!(
            "  {} -> {}",
            self.reference.apply_to(reference_prefix),
            target_url
        ));
    }

    /// Print a file path that was rewritten.
    pub(crate) fn changed_file(&self, path: &Path) {
        self.line(&format!("  {}", self.dim.apply_to(path.display())));
    }
}
