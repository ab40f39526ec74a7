use camino::Utf8PathBuf;
use thiserror::Error;

use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{path}: {reason}")]
    MissingArtifact { path: Utf8PathBuf, reason: String },

    #[error("{}malformed source: {source}", display_prefix(.path))]
    MalformedSource {
        path: Option<Utf8PathBuf>,
        #[source]
        source: SourceError,
    },

    #[error("{path}: refusing to overwrite an existing file")]
    AlreadyExists { path: Utf8PathBuf },

    #[error("schema has no table {table}")]
    UnknownTable { table: String },

    #[error("table {table} has no column {column}")]
    UnknownColumn { table: String, column: String },

    #[error("column {table}.{column} is not a foreign key")]
    UnknownForeignKey { table: String, column: String },

    #[error("table {table} has {count} foreign keys, a junction needs exactly two")]
    NotAJunction { table: String, count: usize },

    #[error("{path}: write failed: {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: remove failed: {source}")]
    Remove {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn display_prefix(path: &Option<Utf8PathBuf>) -> String {
    match path {
        Some(path) => format!("{path}: "),
        None => String::new(),
    }
}

impl From<SourceError> for Error {
    fn from(source: SourceError) -> Self {
        Error::MalformedSource { path: None, source }
    }
}

impl Error {
    /// Attach the file a path-less error was raised for.
    pub fn at(self, at: impl Into<Utf8PathBuf>) -> Self {
        match self {
            Error::MalformedSource { path: None, source } => Error::MalformedSource {
                path: Some(at.into()),
                source,
            },
            other => other,
        }
    }

    /// The file the error is about, when known.
    pub fn path(&self) -> Option<&camino::Utf8Path> {
        match self {
            Error::MissingArtifact { path, .. }
            | Error::AlreadyExists { path }
            | Error::Write { path, .. }
            | Error::Remove { path, .. } => Some(path.as_path()),
            Error::MalformedSource { path, .. } => path.as_deref(),
            Error::UnknownTable { .. }
            | Error::UnknownColumn { .. }
            | Error::UnknownForeignKey { .. }
            | Error::NotAJunction { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
