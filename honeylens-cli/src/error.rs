//! CLI-specific error types and exit code mapping

use honeylens_core::error::{ArtifactError, HoneylensError};
use honeylens_log_pipeline::AnalysisError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from honeylens-core.
    #[error("{0}")]
    Core(#[from] HoneylensError),

    /// Wrapped analysis pipeline error.
    #[error("{0}")]
    Analysis(#[from] AnalysisError),

    /// Label rule set is invalid.
    #[error("rule error: {0}")]
    Rule(String),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                  |
    /// |------|------------------------------------------|
    /// | 0    | Success                                  |
    /// | 1    | General / run failure                    |
    /// | 2    | Configuration error                      |
    /// | 5    | Vectorizer or classifier failed to load  |
    /// | 10   | IO error                                 |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Io(_) => 10,
            Self::Core(e) => match e {
                HoneylensError::Config(_) => 2,
                HoneylensError::Artifact(ArtifactError::LoadFailed { .. }) => 5,
                HoneylensError::Io(_) => 10,
                _ => 1,
            },
            Self::Analysis(e) => match e {
                AnalysisError::Config { .. } => 2,
                AnalysisError::ArtifactLoad { .. } => 5,
                AnalysisError::Io(_) => 10,
                _ => 1,
            },
            Self::JsonSerialize(_) | Self::Command(_) | Self::Rule(_) => 1,
        }
    }
}
