use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for results returned by the pooling pipeline.
pub type Result<T> = std::result::Result<T, PhonePoolError>;

#[derive(Debug, Error)]
pub enum PhonePoolError {
    #[error("I/O error while {context} {path:?}: {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("alignment line {line}: {message}")]
    AlignmentLine { line: usize, message: String },
    #[error("feature matrix line {line}: {message}")]
    Matrix { line: usize, message: String },
    #[error("cache {path:?}: {source}")]
    Cache {
        path: PathBuf,
        #[source]
        source: serde_pickle::Error,
    },
    #[error("segment {segment} of {utterance}: {message}")]
    FrameRange {
        utterance: String,
        segment: u32,
        message: String,
    },
    #[error("invalid language tag \"{0}\"")]
    Language(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PhonePoolError {
    pub(crate) fn io(
        context: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn alignment_line(line: usize, message: impl Into<String>) -> Self {
        Self::AlignmentLine {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn matrix(line: usize, message: impl Into<String>) -> Self {
        Self::Matrix {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub(crate) fn cache(path: impl Into<PathBuf>, source: serde_pickle::Error) -> Self {
        Self::Cache {
            path: path.into(),
            source,
        }
    }
}
