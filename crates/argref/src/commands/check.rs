//! `argref check` command implementation.

use std::path::PathBuf;

use argref_config::Config;
use argref_linker::LinkFilter;
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to configuration file, repeat to merge (default: auto-discover argref.toml).
    #[arg(short, long)]
    config: Vec<PathBuf>,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails to load, validate or compile.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(&self.config, None)?;
        let linker = config.autolinker()?;

        for path in &config.config_paths {
            output.info(&format!("Config: {}", path.display()));
        }

        if linker.is_empty() {
            output.warning("No autolinks configured");
        }
        for definition in linker.definitions() {
            output.autolink(definition.reference_prefix(), definition.target_url());
        }

        match linker.filter() {
            LinkFilter::Off => output.info("Link filter: disabled"),
            LinkFilter::SkipExistingLinks => output.info("Link filter: enabled"),
        }

        output.success(&format!("{} autolink(s) OK", linker.len()));
        Ok(())
    }
}
