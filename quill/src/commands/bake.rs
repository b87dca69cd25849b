use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use quill_manifest::QuillToml;

use super::UnwrapOrExit;
use crate::{
    ops::{self, BakeOptions},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct BakeCommand {
    /// Path to the discovery manifest
    #[arg(default_value = "quill.toml")]
    pub manifest: PathBuf,

    /// Base name of the generated files (defaults to the module name)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Output directory (defaults to the manifest's directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the generated files instead of writing them
    #[arg(long)]
    pub dry_run: bool,

    /// Write a JSON snapshot of the pipeline state after each phase
    #[arg(long)]
    pub visualize: bool,
}

impl BakeCommand {
    pub fn run(&self) -> Result<()> {
        let quill_toml = QuillToml::open(&self.manifest).unwrap_or_exit();
        let output_dir = self
            .output
            .clone()
            .unwrap_or_else(|| quill_toml.dir().to_path_buf());

        let opts = BakeOptions {
            output_dir: &output_dir,
            name: self.name.as_deref(),
            dry_run: self.dry_run,
            visualize: self.visualize,
        };
        let ctx = ops::compile(quill_toml.manifest(), &opts).unwrap_or_exit();
        let report = ops::bake(ctx, &opts)?;
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
