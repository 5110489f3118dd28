//! Errors raised while loading content

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a content file (or the content directory) into posts
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no front-matter block found")]
    MissingFrontMatter,

    #[error("front-matter block is not terminated")]
    UnterminatedFrontMatter,

    #[error("invalid front-matter: {0}")]
    InvalidFrontMatter(String),

    #[error("missing required front-matter field `{0}`")]
    MissingField(&'static str),

    #[error("invalid date in `{field}`: {value}")]
    InvalidDate { field: &'static str, value: String },

    #[error("unknown status `{0}` (expected draft or published)")]
    InvalidStatus(String),

    #[error("invalid slug `{0}` (expected lowercase letters, digits and hyphens)")]
    InvalidSlug(String),

    #[error("slug `{slug}` already used by {existing}")]
    DuplicateSlug { slug: String, existing: String },

    #[error("content directory {path:?} is unavailable: {reason}")]
    RepositoryUnavailable { path: PathBuf, reason: String },
}

impl ContentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
