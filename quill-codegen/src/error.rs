use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for code generation (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("{kind} '{entity}' does not support fragment key '{key}'")]
    #[diagnostic(code(quill::configuration), help("{kind} fragments may use: {supported}"))]
    Configuration {
        entity: String,
        kind: &'static str,
        key: String,
        supported: String,
        position: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("declared here")]
        span: Option<SourceSpan>,
    },

    #[error("unknown tag '${tag}' in {entity} ({key})")]
    #[diagnostic(
        code(quill::unknown_tag),
        help("known tags are $NAME, $STRUCT, $TYPE_STRUCT, $NEW, $COPY, $IS_INSTANCE and $CAST; write '$$' for a literal '$'")
    )]
    UnknownTag {
        tag: String,
        entity: String,
        key: String,
        position: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("unknown tag")]
        span: Option<SourceSpan>,
    },

    #[error("cannot resolve '{name}' in {tag} of {entity} ({key}): {reason}")]
    #[diagnostic(code(quill::unresolved_reference))]
    UnresolvedReference {
        name: String,
        tag: String,
        entity: String,
        key: String,
        position: String,
        reason: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("{reason}")]
        span: Option<SourceSpan>,
    },

    #[error("indentation pop without a matching push")]
    #[diagnostic(
        code(quill::indentation_balance),
        help("every indent push must be paired with exactly one pop")
    )]
    IndentationBalance,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Manifest(#[from] quill_manifest::Error),

    #[error("validation failed with {count} error(s)")]
    #[diagnostic(code(quill::validation_failed), help("{details}"))]
    Validation { count: usize, details: String },

    #[error("duplicate {kind} '{name}'")]
    #[diagnostic(code(quill::duplicate_entity))]
    DuplicateEntity { kind: &'static str, name: String },

    #[error("phase '{phase}' requires phase '{needs}' to run first")]
    #[diagnostic(code(quill::phase_order))]
    PhaseOrder {
        phase: &'static str,
        needs: &'static str,
    },

    #[error("failed to write '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize snapshot for phase '{phase}'")]
    Snapshot {
        phase: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<Box<quill_manifest::Error>> for Box<Error> {
    fn from(err: Box<quill_manifest::Error>) -> Self {
        Box::new(Error::Manifest(*err))
    }
}
