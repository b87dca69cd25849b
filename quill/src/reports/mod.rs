//! Report data structures for commands.
//!
//! Commands build reports, then render them to an Output target.

mod bake;
mod check;
mod info;
mod output;

pub use bake::{BakeReport, GenerationResult, PreviewFile, PreviewResult, WrittenResult};
pub use check::CheckReport;
pub use info::{EntityLine, InfoReport};
pub use output::{Report, TerminalOutput};
