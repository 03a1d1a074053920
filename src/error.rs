use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

/// A gene-set name that occurred more than once in the raw input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateName {
    pub name: String,
    pub occurrences: usize,
}

impl fmt::Display for DuplicateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (x{})", self.name, self.occurrences)
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum GmtError {
    #[error("invalid source locator: {0:?}")]
    InvalidSource(String),

    #[error("invalid deduplication policy: {0}")]
    #[diagnostic(help("expected one of: first, last, error, none"))]
    InvalidPolicy(String),

    #[error("invalid output form: {0}")]
    #[diagnostic(help("expected one of: collection, mapping"))]
    InvalidOutputForm(String),

    /// `status` is set when a remote source answered with a non-success code.
    #[error("source unavailable: {source_name}: {reason}")]
    SourceUnavailable {
        source_name: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("malformed GMT line {line}: expected at least 3 tab-separated fields, found {fields}")]
    #[diagnostic(help("a gene set needs a name, a description and at least one gene"))]
    MalformedLine { line: usize, fields: usize },

    #[error("duplicated gene set names: {}", join_duplicates(.0))]
    #[diagnostic(help("use --dedup first, last or none to accept repeated names"))]
    DuplicateNames(Vec<DuplicateName>),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl GmtError {
    pub(crate) fn unavailable(source_name: impl Into<String>, reason: impl fmt::Display) -> Self {
        GmtError::SourceUnavailable {
            source_name: source_name.into(),
            status: None,
            reason: reason.to_string(),
        }
    }
}

fn join_duplicates(duplicates: &[DuplicateName]) -> String {
    duplicates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
