//! Error types for the tilecov library

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovError {
    #[error("no companion .bai index found for {path}")]
    MissingIndex { path: PathBuf },

    #[error("failed to parse index {path}: {source}")]
    IndexParse { path: PathBuf, source: io::Error },

    #[error("insufficient index for {path}: cannot derive a non-zero median tile size")]
    InsufficientIndex { path: PathBuf },

    #[error("failed to read alignment header from {path}: {source}")]
    HeaderRead {
        path: PathBuf,
        source: rust_htslib::errors::Error,
    },

    #[error("chromosome {name} not found in the alignment header")]
    UnknownReference { name: String },

    #[error("failed writing {path}: {source}")]
    OutputIo {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl CovError {
    /// Wrap a writer failure with the output path it was headed for.
    pub fn output_io<E>(path: impl Into<PathBuf>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        CovError::OutputIo {
            path: path.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CovError>;

/// Returns `true` if the error originated from a broken pipe.
#[inline]
pub fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.root_cause()
        .downcast_ref::<io::Error>()
        .map(|io_err| io_err.kind() == io::ErrorKind::BrokenPipe)
        .unwrap_or(false)
}
