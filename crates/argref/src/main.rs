//! argref CLI - ticket reference autolinker for markdown.
//!
//! Provides commands for:
//! - `rewrite`: Link references in markdown from stdin or files
//! - `check`: Validate the autolink configuration

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, RewriteArgs};
use output::Output;

/// argref - turn ticket references into markdown links.
#[derive(Parser)]
#[command(name = "argref", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite references in markdown into links.
    Rewrite(RewriteArgs),
    /// Validate the configuration and list autolinks.
    Check(CheckArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Rewrite(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN.
    // Logs go to stderr so rewritten markdown on stdout stays clean.
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Rewrite(args) => args.execute(),
        Commands::Check(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_rewrite_in_place() {
        let cli = Cli::try_parse_from(["argref", "rewrite", "-i", "-v", "docs", "README.md"]).unwrap();
        assert!(matches!(cli.command, Commands::Rewrite(args) if args.verbose));
    }

    #[test]
    fn test_filter_flags_conflict() {
        let result =
            Cli::try_parse_from(["argref", "rewrite", "--filter-links", "--no-filter-links"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_check_with_multiple_configs() {
        let cli = Cli::try_parse_from(["argref", "check", "-c", "a.toml", "-c", "b.toml"]).unwrap();
        assert!(matches!(cli.command, Commands::Check(_)));
    }
}
