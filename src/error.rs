//! Error types shared by the parser, the transformer and the batch runner.

use std::path::PathBuf;
use thiserror::Error;

/// A handler was given children it cannot build its node from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot build `{rule}` (line {line}) from {received} children: {expected}")]
pub struct ConstructionError {
    pub rule: String,
    pub line: usize,
    pub received: usize,
    pub expected: String,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("syntax error in {filename} at line {line}\n{message}")]
    Syntax {
        filename: String,
        line: usize,
        message: String,
    },

    #[error("{filename}: {source}")]
    Construction {
        filename: String,
        #[source]
        source: ConstructionError,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}

impl Error {
    /// Short, stable name of the error kind for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Syntax { .. } => "SyntaxError",
            Error::Construction { .. } => "ConstructionError",
            Error::Io { .. } => "IoError",
            Error::Settings(_) => "SettingsError",
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Syntax { line, .. } => Some(*line),
            Error::Construction { source, .. } => Some(source.line),
            Error::Io { .. } | Error::Settings(_) => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
