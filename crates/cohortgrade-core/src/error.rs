//! Error types and exit codes for cohortgrade
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure
//! - 2: Usage error (bad flags/args, invalid configuration values)
//! - 3: Data error (invalid cohort input, extraction failure, corrupt report)

mod macros;

use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Data error - invalid input, unreadable signals, corrupt report (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur during cohortgrade operations
#[derive(Error, Debug)]
pub enum GradeError {
    // Usage errors (exit code 2)
    #[error("unknown format: {0} (expected: human, json, or records)")]
    UnknownFormat(String),

    #[error("{0}")]
    UsageError(String),

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    // Data errors (exit code 3)
    #[error("invalid input at {stage}: {reason}")]
    InvalidInput { stage: String, reason: String },

    #[error("signal extraction failed for {entity}: {reason}")]
    Extraction { entity: String, reason: String },

    #[error("corrupt report {path:?}: {reason}")]
    CorruptReport { path: PathBuf, reason: String },

    #[error("{context} not found: {value}")]
    NotFound { context: String, value: String },

    #[error("{context} already exists: {value}")]
    AlreadyExists { context: String, value: String },

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl GradeError {
    /// Create an error for input the engine cannot grade
    pub fn invalid_input(stage: &str, reason: impl std::fmt::Display) -> Self {
        GradeError::InvalidInput {
            stage: stage.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an error for an invalid value or configuration
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        GradeError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for a single entity whose signals could not be produced
    pub fn extraction(entity: &str, reason: impl std::fmt::Display) -> Self {
        GradeError::Extraction {
            entity: entity.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an error for something that was not found
    pub fn not_found(context: &str, value: impl std::fmt::Display) -> Self {
        GradeError::NotFound {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for something that already exists
    pub fn already_exists(context: &str, value: impl std::fmt::Display) -> Self {
        GradeError::AlreadyExists {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for a persisted report that fails validation
    pub fn corrupt_report(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        GradeError::CorruptReport {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            GradeError::UnknownFormat(_)
            | GradeError::UsageError(_)
            | GradeError::InvalidValue { .. } => ExitCode::Usage,

            GradeError::InvalidInput { .. }
            | GradeError::Extraction { .. }
            | GradeError::CorruptReport { .. }
            | GradeError::NotFound { .. }
            | GradeError::AlreadyExists { .. } => ExitCode::Data,

            GradeError::Io(_)
            | GradeError::Yaml(_)
            | GradeError::Json(_)
            | GradeError::Toml(_)
            | GradeError::Other(_) => ExitCode::Failure,
        }
    }

    /// Get the error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            GradeError::UnknownFormat(_) => "unknown_format",
            GradeError::UsageError(_) => "usage_error",
            GradeError::InvalidValue { .. } => "invalid_value",
            GradeError::InvalidInput { .. } => "invalid_input",
            GradeError::Extraction { .. } => "extraction",
            GradeError::CorruptReport { .. } => "corrupt_report",
            GradeError::NotFound { .. } => "not_found",
            GradeError::AlreadyExists { .. } => "already_exists",
            GradeError::Io(_) => "io_error",
            GradeError::Yaml(_) => "yaml_error",
            GradeError::Json(_) => "json_error",
            GradeError::Toml(_) => "toml_error",
            GradeError::Other(_) => "other",
        }
    }

    /// The stage an `InvalidInput` error was raised at, if any
    pub fn stage(&self) -> Option<&str> {
        match self {
            GradeError::InvalidInput { stage, .. } => Some(stage),
            GradeError::Extraction { .. } => Some("extraction"),
            _ => None,
        }
    }

    /// Convert error to JSON representation for structured error output.
    pub fn to_json(&self) -> serde_json::Value {
        let mut error_obj = serde_json::json!({
            "code": self.exit_code() as i32,
            "type": self.error_type(),
            "message": self.to_string(),
        });

        if let Some(stage) = self.stage() {
            error_obj["stage"] = serde_json::json!(stage);
        }
        if let GradeError::Extraction { entity, .. } = self {
            error_obj["entity"] = serde_json::json!(entity);
        }

        serde_json::json!({ "error": error_obj })
    }
}

/// Result type alias for cohortgrade operations
pub type Result<T> = std::result::Result<T, GradeError>;
