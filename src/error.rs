use std::path::PathBuf;

use thiserror::Error;

/// Failures while turning a captured substring into a typed value.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed number in field `{field}`: {text:?}")]
    MalformedNumber { field: String, text: String },
}

/// Failures while laying out the comparison report.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("{labels} entity label(s) but {records} record(s)")]
    ArityMismatch { labels: usize, records: usize },

    #[error("record for `{entity}` has no field `{key}`")]
    MissingField { entity: String, key: String },
}

/// Failures of a document source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no page content returned for `{title}`")]
    MissingPage { title: String },

    #[error("no document for `{entity}` in {}", dir.display())]
    NotFound { entity: String, dir: PathBuf },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Format(#[from] FormatError),
}
