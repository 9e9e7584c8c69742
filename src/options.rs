use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How a data line with an unparsable coordinate is treated.
///
/// Lines with fewer than three fields are always skipped silently, whichever
/// mode is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMode {
    /// abort on the first malformed line
    #[default]
    Strict,
    /// skip malformed lines and continue
    Lenient,
}

/// What loading a file that cannot be opened yields
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MissingSource {
    /// an empty load, no error
    #[default]
    Empty,
    /// a `SourceUnavailable` error
    Fail,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    pub error_mode: ErrorMode,
    pub missing_source: MissingSource,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self::default().with_error_mode(ErrorMode::Strict)
    }

    pub fn lenient() -> Self {
        Self::default().with_error_mode(ErrorMode::Lenient)
    }

    pub fn with_error_mode(mut self, error_mode: ErrorMode) -> Self {
        self.error_mode = error_mode;
        self
    }

    pub fn with_missing_source(mut self, missing_source: MissingSource) -> Self {
        self.missing_source = missing_source;
        self
    }
}
