//! Configuration management for argref.
//!
//! Parses `argref.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! filter_links = true
//!
//! [[autolinks]]
//! reference_prefix = "GH-"
//! target_url = "https://github.com/org/repo/issues/<num>"
//!
//! [[autolinks]]
//! reference_prefix = "TASK-<proj>-<num>"
//! target_url = "https://tasks.example.com/<proj>/<num>"
//! ```
//!
//! Several files can be loaded together; their autolinks are appended in
//! load order. CLI settings are applied after loading via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `reference_prefix` and `target_url` support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

mod expand;

use std::path::{Path, PathBuf};

use argref_linker::{AutolinkDefinition, Autolinker, DefinitionError, LinkFilter, PatternError};
use serde::Deserialize;

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the link filter flag.
    pub filter_links: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "argref.toml";

/// Raw configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigRaw {
    autolinks: Option<Vec<AutolinkRaw>>,
    filter_links: Option<bool>,
}

/// Raw autolink entry; fields are optional so missing ones get a named error.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AutolinkRaw {
    reference_prefix: Option<String>,
    target_url: Option<String>,
}

/// Application configuration.
#[derive(Debug, Default)]
pub struct Config {
    /// Validated autolink definitions, in application order.
    pub autolinks: Vec<AutolinkDefinition>,
    /// Whether text inside existing markdown links is left alone.
    pub filter_links: bool,
    /// Files the configuration was loaded from, in load order.
    pub config_paths: Vec<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`autolinks[0].target_url`").
        field: String,
        /// Error message (e.g., "${`GITHUB_REPO`} not set").
        message: String,
    },
    /// A validated definition failed to compile.
    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),
}

/// Take a required autolink field, naming it in the error.
fn require_field(value: Option<String>, field: &str) -> Result<String, ConfigError> {
    value.ok_or_else(|| ConfigError::Validation(format!("{field} is required")))
}

/// Turn a definition error into a validation error naming the offending field.
fn definition_error(index: usize, err: &DefinitionError) -> ConfigError {
    ConfigError::Validation(format!("autolinks[{index}].{}: {err}", err.field()))
}

impl Config {
    /// Load configuration from files with optional CLI settings.
    ///
    /// Every path in `config_paths` is loaded and merged in order. With no
    /// paths, searches for `argref.toml` in the current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns error if a file doesn't exist, none is discovered, or parsing
    /// or validation fails.
    pub fn load(
        config_paths: &[PathBuf],
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if config_paths.is_empty() {
            let cwd = std::env::current_dir()?;
            let discovered = Self::discover_config(&cwd)
                .ok_or_else(|| ConfigError::NotFound(cwd.join(CONFIG_FILENAME)))?;
            Self::load_from_file(&discovered)?
        } else {
            let mut merged = Self::default();
            for path in config_paths {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.clone()));
                }
                merged.merge(Self::load_from_file(path)?);
            }
            merged
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing, env expansion or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: ConfigRaw = toml::from_str(content)?;
        Self::resolve(raw)
    }

    /// Append another configuration's autolinks after this one's.
    ///
    /// Nothing is deduplicated. Link filtering stays enabled if either side
    /// enables it.
    pub fn merge(&mut self, other: Self) {
        self.autolinks.extend(other.autolinks);
        self.filter_links |= other.filter_links;
        self.config_paths.extend(other.config_paths);
    }

    /// Link filter mode for the rewriter.
    #[must_use]
    pub fn link_filter(&self) -> LinkFilter {
        LinkFilter::from(self.filter_links)
    }

    /// Compile the configured autolinks.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Pattern` if a definition fails to compile.
    pub fn autolinker(&self) -> Result<Autolinker, ConfigError> {
        Ok(Autolinker::new(&self.autolinks, self.link_filter())?)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(filter_links) = settings.filter_links {
            self.filter_links = filter_links;
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.config_paths.push(path.to_path_buf());

        tracing::debug!(
            path = %path.display(),
            autolinks = config.autolinks.len(),
            "Loaded configuration"
        );

        Ok(config)
    }

    /// Validate raw configuration into definitions.
    fn resolve(raw: ConfigRaw) -> Result<Self, ConfigError> {
        let entries = raw.autolinks.ok_or_else(|| {
            ConfigError::Validation("autolinks is required".to_owned())
        })?;

        let autolinks = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let prefix_field = format!("autolinks[{index}].reference_prefix");
                let url_field = format!("autolinks[{index}].target_url");

                let prefix = require_field(entry.reference_prefix, &prefix_field)?;
                let url = require_field(entry.target_url, &url_field)?;
                let prefix = expand::expand_env(&prefix, &prefix_field)?;
                let url = expand::expand_env(&url, &url_field)?;

                AutolinkDefinition::new(prefix, url).map_err(|e| definition_error(index, &e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            autolinks,
            filter_links: raw.filter_links.unwrap_or(false),
            config_paths: Vec::new(),
        })
    }
}
