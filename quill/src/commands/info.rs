use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use quill_manifest::QuillToml;

use super::UnwrapOrExit;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct InfoCommand {
    /// Path to the discovery manifest
    #[arg(default_value = "quill.toml")]
    pub manifest: PathBuf,
}

impl InfoCommand {
    pub fn run(&self) -> Result<()> {
        let quill_toml = QuillToml::open(&self.manifest).unwrap_or_exit();
        let report = ops::info(quill_toml.manifest(), quill_toml.path()).unwrap_or_exit();
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
