//! `argref rewrite` command implementation.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use argref_config::{CliSettings, Config};
use argref_linker::Autolinker;
use clap::Args;
use rayon::prelude::*;

use crate::error::CliError;
use crate::output::Output;

/// File extensions treated as markdown when walking directories.
const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "markdown"];

/// Arguments for the rewrite command.
#[derive(Args)]
pub(crate) struct RewriteArgs {
    /// Markdown files or directories (default: read stdin, write stdout).
    paths: Vec<PathBuf>,

    /// Path to configuration file, repeat to merge (default: auto-discover argref.toml).
    #[arg(short, long)]
    config: Vec<PathBuf>,

    /// Leave text inside existing markdown links untouched (overrides config).
    #[arg(long)]
    filter_links: bool,

    /// Rewrite text inside existing markdown links too (overrides config).
    #[arg(long, conflicts_with = "filter_links")]
    no_filter_links: bool,

    /// Write results back to the files instead of stdout.
    #[arg(short, long)]
    in_place: bool,

    /// Enable verbose output (log each rewritten file).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RewriteArgs {
    /// Execute the rewrite command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or a file cannot be read or written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            filter_links: self.resolve_filter_links(),
        };
        let config = Config::load(&self.config, Some(&cli_settings))?;
        let linker = config.autolinker()?;

        if self.paths.is_empty() {
            if self.in_place {
                return Err(CliError::Validation(
                    "--in-place requires at least one path".to_owned(),
                ));
            }
            let mut markdown = String::new();
            std::io::stdin().read_to_string(&mut markdown)?;
            return write_stdout(&linker.rewrite(&markdown));
        }

        if !self.in_place {
            return match self.paths.as_slice() {
                [path] if path.is_file() => {
                    let markdown = read_file(path)?;
                    write_stdout(&linker.rewrite(&markdown))
                }
                _ => Err(CliError::Validation(
                    "several files or a directory require --in-place".to_owned(),
                )),
            };
        }

        self.rewrite_in_place(&linker)
    }

    /// Rewrite every markdown file under the given paths, in parallel.
    fn rewrite_in_place(&self, linker: &Autolinker) -> Result<(), CliError> {
        let output = Output::new();

        let files = collect_markdown_files(&self.paths)?;
        if files.is_empty() {
            output.warning("No markdown files found");
            return Ok(());
        }
        output.info(&format!("Rewriting {} file(s)", files.len()));

        let report = rewrite_all(linker, &files);
        for path in &report.changed {
            output.changed_file(path);
        }
        for err in &report.failed {
            output.error(&err.to_string());
        }
        output.success(&format!(
            "{} of {} file(s) changed",
            report.changed.len(),
            files.len()
        ));

        match report.failed.len() {
            0 => Ok(()),
            failed => Err(CliError::Validation(format!(
                "{failed} file(s) could not be rewritten"
            ))),
        }
    }

    /// Resolve `filter_links` from --filter-links/--no-filter-links flags.
    fn resolve_filter_links(&self) -> Option<bool> {
        self.no_filter_links
            .then_some(false)
            .or(self.filter_links.then_some(true))
    }
}

/// Collect markdown files from files and directories, sorted and deduplicated.
///
/// Directories are walked with gitignore rules applied. Explicit file paths
/// are kept whatever their extension.
fn collect_markdown_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in ignore::WalkBuilder::new(path).build() {
                let entry = entry?;
                if entry.file_type().is_some_and(|t| t.is_file()) && is_markdown(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(CliError::Validation(format!(
                "path not found: {}",
                path.display()
            )));
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|md| ext.eq_ignore_ascii_case(md))
        })
}

/// Outcome of rewriting a set of files.
#[derive(Debug, Default)]
struct RewriteReport {
    /// Files whose content changed, in input order.
    changed: Vec<PathBuf>,
    /// Every failure; other files are still processed.
    failed: Vec<CliError>,
}

/// Rewrite files in parallel, collecting every result.
fn rewrite_all(linker: &Autolinker, files: &[PathBuf]) -> RewriteReport {
    let results: Vec<Result<bool, CliError>> = files
        .par_iter()
        .map(|path| rewrite_file(linker, path))
        .collect();

    let mut report = RewriteReport::default();
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(true) => report.changed.push(path.clone()),
            Ok(false) => {}
            Err(err) => report.failed.push(err),
        }
    }
    report
}

/// Rewrite one file in place. Returns whether its content changed.
fn rewrite_file(linker: &Autolinker, path: &Path) -> Result<bool, CliError> {
    let markdown = read_file(path)?;
    let rewritten = linker.rewrite(&markdown);
    if rewritten == markdown {
        tracing::debug!(path = %path.display(), "Unchanged");
        return Ok(false);
    }

    std::fs::write(path, rewritten).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "Rewrote references");
    Ok(true)
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })
}

fn write_stdout(text: &str) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
