use std::{io, num::ParseFloatError, path::PathBuf};

use thiserror::Error;

/// Errors raised while reading points from a PLY source
#[derive(Debug, Error)]
pub enum PlyError {
    #[error("point cloud file {path:?} is not available: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read line {line_number}: {source}")]
    Read {
        line_number: usize,
        #[source]
        source: io::Error,
    },

    #[error("malformed coordinate at line {line_number}: {line:?}")]
    MalformedCoordinate {
        line_number: usize,
        line: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("malformed vertex count at line {line_number}: {line:?}")]
    MalformedVertexCount { line_number: usize, line: String },
}

impl PlyError {
    /// 1-based line of the source the error refers to, if any
    pub fn line_number(&self) -> Option<usize> {
        match self {
            PlyError::SourceUnavailable { .. } => None,
            PlyError::Read { line_number, .. }
            | PlyError::MalformedCoordinate { line_number, .. }
            | PlyError::MalformedVertexCount { line_number, .. } => Some(*line_number),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlyError>;
