mod bake;
mod check;
mod completions;
mod info;

use bake::BakeCommand;
use check::CheckCommand;
use clap::{Parser, Subcommand};
use completions::CompletionsCommand;
use eyre::Result;
use info::InfoCommand;

/// Extension trait for exiting on library errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for quill_manifest::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

impl<T> UnwrapOrExit<T> for quill_codegen::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "quill")]
#[command(version)]
#[command(about = "Generate CPython extension modules from documented fragments")]
pub(crate) struct Cli {
    /// Log debug output to stderr (overrides QUILL_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Bake(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
            Commands::Info(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the C++ interface and implementation from a manifest
    Bake(BakeCommand),

    /// Validate a manifest and resolve every fragment without writing files
    Check(CheckCommand),

    /// Show what a manifest exports
    Info(InfoCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bake_flags() {
        let cli =
            Cli::try_parse_from(["quill", "-v", "bake", "m.toml", "-n", "ext", "--dry-run"]).unwrap();
        assert!(cli.verbose);
        let Commands::Bake(bake) = cli.command else {
            panic!("expected bake");
        };
        assert_eq!(bake.manifest.to_str(), Some("m.toml"));
        assert_eq!(bake.name.as_deref(), Some("ext"));
        assert!(bake.dry_run);
        assert!(bake.output.is_none());
    }
}
