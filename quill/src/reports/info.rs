//! Info command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from project info.
#[derive(Debug)]
pub struct InfoReport {
    /// Module name.
    pub module: String,
    /// Module description (documentation without fragments).
    pub description: String,
    /// Manifest path.
    pub config_path: PathBuf,
    /// Fragment marker word.
    pub marker: String,
    /// Generated symbol prefix.
    pub prefix: String,
    /// Module functions.
    pub functions: Vec<EntityLine>,
    /// Classes, each followed by its members.
    pub classes: Vec<EntityLine>,
    /// Pipeline phases as (name, description).
    pub phases: Vec<(&'static str, &'static str)>,
    /// Validation lints as (name, description).
    pub lints: Vec<(&'static str, &'static str)>,
}

/// One entity in the listing.
#[derive(Debug)]
pub struct EntityLine {
    pub name: String,
    pub kind: &'static str,
    /// Fragment keys, comma separated
    pub keys: String,
    pub included: bool,
    /// Nesting under a class
    pub depth: usize,
}

impl EntityLine {
    fn display(&self) -> String {
        let indent = "  ".repeat(self.depth);
        let status = if self.included { "+" } else { "-" };
        let keys = if self.keys.is_empty() {
            String::new()
        } else {
            format!(" [{}]", self.keys)
        };
        format!("  {indent}{status} {} ({}){keys}", self.name, self.kind)
    }
}

impl Report for InfoReport {
    fn render(&self, out: &mut dyn Output) {
        out.newline();

        out.preformatted(&format!("  {}", self.module));
        out.preformatted(&format!("  {}", "─".repeat(self.module.len())));
        if !self.description.is_empty() {
            out.preformatted(&format!("  {}", self.description));
        }
        out.newline();

        out.preformatted(&format!("  Config      {}", self.config_path.display()));
        out.preformatted(&format!("  Marker      {}", self.marker));
        out.preformatted(&format!("  Prefix      {}", self.prefix));
        out.newline();

        if !self.functions.is_empty() {
            out.preformatted("  Functions");
            out.preformatted("  ─────────");
            for line in &self.functions {
                out.preformatted(&line.display());
            }
            out.newline();
        }

        if !self.classes.is_empty() {
            out.preformatted("  Classes");
            out.preformatted("  ───────");
            for line in &self.classes {
                out.preformatted(&line.display());
            }
            out.newline();
        }

        out.preformatted("  Pipeline");
        out.preformatted("  ────────");
        for (index, (name, description)) in self.phases.iter().enumerate() {
            out.preformatted(&format!("  {}. {:<10} {}", index + 1, name, description));
        }
        out.newline();

        out.preformatted("  Lints");
        out.preformatted("  ─────");
        for (name, description) in &self.lints {
            out.preformatted(&format!("  {:<18} {}", name, description));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_line_display() {
        let line = EntityLine {
            name: "Abel.get".to_string(),
            kind: "function",
            keys: "default".to_string(),
            included: true,
            depth: 1,
        };
        assert_eq!(line.display(), "    + Abel.get (function) [default]");

        let hidden = EntityLine {
            name: "Hidden".to_string(),
            kind: "class",
            keys: String::new(),
            included: false,
            depth: 0,
        };
        assert_eq!(hidden.display(), "  - Hidden (class)");
    }
}
