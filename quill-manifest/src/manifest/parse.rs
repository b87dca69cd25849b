//! Manifest parsing from files and strings.

use std::{path::Path, str::FromStr};

use super::{ClassRecord, GeneratorConfig, Manifest, validate::ParseContext};
use crate::{Error, Result, error::SourceContext};

const WIDTH_RANGE: std::ops::RangeInclusive<u8> = 1..=16;

impl FromStr for Manifest {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_manifest(s, "quill.toml")
    }
}

impl Manifest {
    /// Parse a discovery manifest from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        parse_manifest(&content, &path.display().to_string())
    }

    /// Parse a manifest from a string with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        parse_manifest(content, filename)
    }
}

/// Parse a manifest from content with the given filename for error reporting.
pub fn parse_manifest(content: &str, filename: &str) -> Result<Manifest> {
    let source_ctx = SourceContext::new(content, filename);
    let manifest: Manifest = toml::from_str(content).map_err(|e| source_ctx.parse_error(e))?;
    validate_manifest(&manifest, content, filename)?;
    Ok(manifest)
}

/// Validate the manifest after parsing.
fn validate_manifest(manifest: &Manifest, src: &str, filename: &str) -> Result<()> {
    let ctx = ParseContext::new(src, filename);

    if manifest.module.name.is_empty() {
        return Err(ctx
            .source_context()
            .validation_error("module name must not be empty", None));
    }
    ctx.validate_name(&manifest.module.name, "module")?;
    validate_generator(&manifest.generator, &ctx)?;

    for function in &manifest.functions {
        ctx.validate_symbol(&function.name, "function")?;
    }

    for class in &manifest.classes {
        validate_class(class, &ctx)?;
    }
    Ok(())
}

fn validate_generator(generator: &GeneratorConfig, ctx: &ParseContext<'_>) -> Result<()> {
    let source = ctx.source_context();

    let marker_ok = !generator.marker.is_empty()
        && generator
            .marker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !marker_ok {
        return Err(source.validation_error(
            format!(
                "generator.marker '{}' must be a non-empty word of letters, digits and underscores",
                generator.marker
            ),
            None,
        ));
    }

    if !quill_core::is_c_identifier(&generator.prefix) {
        return Err(source.validation_error(
            format!("generator.prefix '{}' is not a valid C identifier", generator.prefix),
            None,
        ));
    }

    for (field, value) in [
        ("indent_width", generator.indent_width),
        ("tab_width", generator.tab_width),
    ] {
        if !WIDTH_RANGE.contains(&value) {
            return Err(source.validation_error(
                format!(
                    "generator.{field} must be between {} and {}, got {value}",
                    WIDTH_RANGE.start(),
                    WIDTH_RANGE.end()
                ),
                None,
            ));
        }
    }
    Ok(())
}

fn validate_class(class: &ClassRecord, ctx: &ParseContext<'_>) -> Result<()> {
    ctx.validate_name(&class.name, "class")?;

    let class_ctx = ctx.push(&class.name);
    for base in &class.bases {
        if base == &class.name {
            return Err(class_ctx.error_at(
                &class.name,
                format!("class '{}' lists itself as a base", class.name),
            ));
        }
        if !quill_core::is_c_identifier(base) {
            return Err(class_ctx
                .source_context()
                .invalid_identifier_error(base, class_ctx.context_for("base class"), None));
        }
    }

    for method in &class.methods {
        class_ctx.validate_symbol(&method.name, "method")?;
        if method.params == 0 && !method.varargs {
            return Err(class_ctx.error_at(
                &method.name,
                format!(
                    "method '{}.{}' takes no parameters, expected at least 'self'",
                    class.name, method.name
                ),
            ));
        }
    }

    for property in &class.properties {
        class_ctx.validate_symbol(&property.name, "property")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Manifest {
        Manifest::from_str(content).unwrap()
    }

    #[test]
    fn test_parse_minimal() {
        let manifest = parse("[module]\nname = \"example\"");
        assert_eq!(manifest.module.name, "example");
        assert_eq!(manifest.module.file_name(), "example.py");
        assert!(manifest.functions.is_empty());
        assert!(manifest.classes.is_empty());
        assert_eq!(manifest.generator.prefix, "quill");
        assert_eq!(manifest.generator.marker, "_CPP_");
    }

    #[test]
    fn test_parse_records_in_order() {
        let manifest = parse(
            r#"
[module]
name = "example"
file = "example.py"
doc = "_CPP_(HEADER): #include <vector>"

[[functions]]
name = "version"
doc = "_CPP_: return PyLong_FromLong(1);"

[[classes]]
name = "Abel"
line = 12

[[classes.methods]]
name = "__init__"
params = 3

[[classes.properties]]
name = "data"
setter = true

[[classes]]
name = "Kain"
bases = ["Abel"]
"#,
        );

        assert_eq!(manifest.module.file_name(), "example.py");
        assert_eq!(manifest.functions[0].name, "version");

        let names: Vec<_> = manifest.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Abel", "Kain"]);

        let abel = manifest.class("Abel").unwrap();
        assert_eq!(abel.line, Some(12));
        assert_eq!(abel.methods[0].params, 3);
        assert!(abel.properties[0].setter);
        assert_eq!(manifest.class("Kain").unwrap().bases, ["Abel"]);
        assert_eq!(manifest.record_count(), 5);
    }

    #[test]
    fn test_parse_generator_overrides() {
        let manifest = parse(
            r#"
[module]
name = "example"

[generator]
prefix = "ext"
indent_width = 2
inherit_members = false
"#,
        );
        assert_eq!(manifest.generator.prefix, "ext");
        assert_eq!(manifest.generator.indent_width, 2);
        assert_eq!(manifest.generator.tab_width, 4);
        assert!(!manifest.generator.inherit_members);
    }

    #[test]
    fn test_unknown_generator_field_rejected() {
        let err = Manifest::from_str("[module]\nname = \"m\"\n[generator]\nbogus = 1").unwrap_err();
        assert!(matches!(*err, Error::Parse { .. }));
    }

    #[test]
    fn test_missing_module_rejected() {
        let err = Manifest::from_str("[[functions]]\nname = \"f\"").unwrap_err();
        assert!(matches!(*err, Error::Parse { .. }));
    }

    #[test]
    fn test_empty_module_name_rejected() {
        let err = Manifest::from_str("[module]\nname = \"\"").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_reserved_class_name_rejected() {
        let err = Manifest::from_str("[module]\nname = \"m\"\n[[classes]]\nname = \"struct\"")
            .unwrap_err();
        assert!(matches!(*err, Error::ReservedKeyword { ref name, .. } if name == "struct"));
    }

    #[test]
    fn test_invalid_function_name_rejected() {
        let err = Manifest::from_str("[module]\nname = \"m\"\n[[functions]]\nname = \"do-it\"")
            .unwrap_err();
        assert!(matches!(*err, Error::InvalidIdentifier { ref name, .. } if name == "do-it"));
    }

    #[test]
    fn test_keyword_method_name_allowed() {
        let manifest = parse(
            "[module]\nname = \"m\"\n[[classes]]\nname = \"A\"\n[[classes.methods]]\nname = \"new\"\nparams = 1",
        );
        assert_eq!(manifest.classes[0].methods[0].name, "new");
    }

    #[test]
    fn test_method_without_self_rejected() {
        let err = Manifest::from_str(
            "[module]\nname = \"m\"\n[[classes]]\nname = \"A\"\n[[classes.methods]]\nname = \"run\"",
        )
        .unwrap_err();
        assert!(err.to_string().contains("expected at least 'self'"));
    }

    #[test]
    fn test_self_base_rejected() {
        let err = Manifest::from_str(
            "[module]\nname = \"m\"\n[[classes]]\nname = \"A\"\nbases = [\"A\"]",
        )
        .unwrap_err();
        assert!(err.to_string().contains("lists itself"));
    }

    #[test]
    fn test_bad_marker_rejected() {
        let err = Manifest::from_str("[module]\nname = \"m\"\n[generator]\nmarker = \"_CPP_:\"")
            .unwrap_err();
        assert!(err.to_string().contains("generator.marker"));
    }

    #[test]
    fn test_indent_width_range() {
        let err = Manifest::from_str("[module]\nname = \"m\"\n[generator]\nindent_width = 0")
            .unwrap_err();
        assert!(err.to_string().contains("generator.indent_width"));
    }

    #[test]
    fn test_from_file() {
        let dir = std::env::temp_dir().join(format!("quill-manifest-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("example.toml");
        std::fs::write(&path, "[module]\nname = \"example\"").unwrap();

        let manifest = Manifest::from_file(&path).unwrap();
        assert_eq!(manifest.module.name, "example");

        let missing = Manifest::from_file(dir.join("missing.toml")).unwrap_err();
        assert!(matches!(*missing, Error::Io { .. }));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
