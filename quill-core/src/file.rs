use std::path::{Path, PathBuf};

use eyre::Result;

/// Trait for types that represent a generated file
pub trait GeneratedFile {
    /// Get the file path relative to the base directory
    fn path(&self, base: &Path) -> PathBuf;

    /// Get the rules for writing this file
    fn rules(&self) -> FileRules;

    /// Render the file content (without the header)
    fn render(&self) -> String;

    /// The full text as written, header included
    fn contents(&self) -> String {
        self.rules().apply(&self.render())
    }

    /// Write the file to disk
    ///
    /// A file whose content on disk already matches is left untouched.
    fn write(&self, base: &Path) -> Result<WriteResult> {
        write_if_changed(&self.path(base), &self.contents())
    }
}

fn write_if_changed(path: &Path, content: &str) -> Result<WriteResult> {
    if let Ok(existing) = std::fs::read_to_string(path)
        && existing == content
    {
        return Ok(WriteResult::Unchanged);
    }
    write_file(path, content)?;
    Ok(WriteResult::Written)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Result of a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written
    Written,
    /// File already had the same content
    Unchanged,
}

/// Rules that determine how a file should be written
#[derive(Debug, Clone, Default)]
pub struct FileRules {
    /// Comment block placed before the rendered content
    pub header: Option<String>,
}

impl FileRules {
    /// Rules with a header comment
    pub fn with_header(header: impl Into<String>) -> Self {
        Self {
            header: Some(header.into()),
        }
    }

    fn apply(&self, content: &str) -> String {
        match &self.header {
            Some(header) => format!("{}\n{}", header.trim_end(), content),
            None => content.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    struct Stub {
        name: &'static str,
        content: &'static str,
        header: Option<&'static str>,
    }

    impl Stub {
        fn new(name: &'static str, content: &'static str) -> Self {
            Self {
                name,
                content,
                header: None,
            }
        }
    }

    impl GeneratedFile for Stub {
        fn path(&self, base: &Path) -> PathBuf {
            base.join(self.name)
        }
        fn rules(&self) -> FileRules {
            match self.header {
                Some(header) => FileRules::with_header(header),
                None => FileRules::default(),
            }
        }
        fn render(&self) -> String {
            self.content.to_string()
        }
    }

    #[test]
    fn test_write_file_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a").join("b").join("test.h");

        write_file(&path, "nested").unwrap();

        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "nested");
    }

    #[test]
    fn test_write_overwrites_changed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.cpp");

        fs::write(&path, "original").unwrap();

        let result = Stub::new("test.cpp", "updated").write(temp.path()).unwrap();

        assert_eq!(result, WriteResult::Written);
        assert_eq!(fs::read_to_string(&path).unwrap(), "updated");
    }

    #[test]
    fn test_write_unchanged_is_skipped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("test.cpp"), "same").unwrap();

        let result = Stub::new("test.cpp", "same").write(temp.path()).unwrap();
        assert_eq!(result, WriteResult::Unchanged);
    }

    #[test]
    fn test_header_is_prepended() {
        let temp = TempDir::new().unwrap();
        let file = Stub {
            header: Some("/* generated */\n"),
            ..Stub::new("test.h", "int x;\n")
        };
        assert_eq!(file.contents(), "/* generated */\nint x;\n");

        file.write(temp.path()).unwrap();
        assert_eq!(
            fs::read_to_string(temp.path().join("test.h")).unwrap(),
            "/* generated */\nint x;\n"
        );
    }

    #[test]
    fn test_writes_relative_to_base() {
        let temp = TempDir::new().unwrap();
        let stub = Stub::new("stub.h", "stub");
        assert_eq!(stub.write(temp.path()).unwrap(), WriteResult::Written);
        assert_eq!(stub.write(temp.path()).unwrap(), WriteResult::Unchanged);
        assert_eq!(
            fs::read_to_string(temp.path().join("stub.h")).unwrap(),
            "stub"
        );
    }
}
