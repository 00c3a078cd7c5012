use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to distinguish between a model that
/// failed validation and a run that could not complete at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - model resolved, validated and persisted
    Success = 0,
    /// Structural validation failed or the platform is misaligned in strict mode
    ValidationFailed = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (resolution error, network error, file I/O error, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Picks the exit code for an error that aborted the run.
    pub fn for_error(error: &anyhow::Error) -> Self {
        match error.downcast_ref::<CuratorError>() {
            Some(CuratorError::Validation { .. }) | Some(CuratorError::PlatformMisaligned { .. }) => {
                ExitCode::ValidationFailed
            }
            _ => ExitCode::ApplicationError,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::ValidationFailed => write!(f, "Validation Failed (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// A single offending artifact found while validating the application model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// The artifact the issue is reported against, in `g:a:c:t` or GACTV form
    pub artifact: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(artifact: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            artifact: artifact.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.artifact, self.message)
    }
}

fn render_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  - {}", issue))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Application-specific errors for dependency resolution and model curation.
#[derive(Debug, Error)]
pub enum CuratorError {
    #[error("Artifact not found: {coords}\nSearched: {searched}\n\n💡 Hint: Check the coordinates, or run without --offline to reach the remote repositories")]
    ArtifactNotFound { coords: String, searched: String },

    #[error("Version range is not supported: {coords}\n\n💡 Hint: Pin an exact version for this dependency or manage it through a BOM")]
    VersionRange { coords: String },

    #[error("Failed to read artifact descriptor for {coords}\nDetails: {details}")]
    DescriptorParse { coords: String, details: String },

    #[error("Repository transport failed for {url}\nDetails: {details}\n\n💡 Hint: The repository may be unreachable; failed downloads are not retried")]
    Transport { url: String, details: String },

    #[error("Invalid artifact coordinates: '{value}'\nReason: {reason}\n\n💡 Hint: Use group:artifact[:classifier[:type]]:version, e.g. io.acme:acme-core:1.0.0")]
    InvalidCoords { value: String, reason: String },

    #[error("Application model validation failed with {} issue(s):\n{}", issues.len(), render_issues(issues))]
    Validation { issues: Vec<ValidationIssue> },

    #[error("Platform release {platform_key}:{stream}:{version} was already recorded with different BOMs\nRecorded: {recorded}\nAttempted: {attempted}")]
    ConflictingPlatformRelease {
        platform_key: String,
        stream: String,
        version: String,
        recorded: String,
        attempted: String,
    },

    #[error("Platform BOMs are not aligned:\n{report}\n\n💡 Hint: Import a consistent set of platform BOMs, or drop --strict-alignment")]
    PlatformMisaligned { report: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("Invalid project path: {path}\nReason: {reason}\n\n💡 Hint: Please specify a directory containing a pom.xml")]
    InvalidProjectPath { path: PathBuf, reason: String },

    #[error("Security violation: {path}\nReason: {reason}\n\n💡 Hint: {hint}")]
    SecurityError {
        path: PathBuf,
        reason: String,
        hint: String,
    },
}

/// Why a persisted application model could not be reused.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("No persisted application model at {path}")]
    Missing { path: PathBuf },

    #[error("Persisted application model has format {found}, expected {expected}")]
    FormatMismatch { found: String, expected: String },

    #[error("Persisted application model at {path} is corrupt: {details}")]
    Corrupt { path: PathBuf, details: String },

    #[error("Persisted application model is stale; {} resolved path(s) no longer exist, first: {}", missing.len(), missing.first().map(|p| p.display().to_string()).unwrap_or_default())]
    Stale { missing: Vec<PathBuf> },

    #[error("Failed to read persisted application model at {path}: {details}")]
    Io { path: PathBuf, details: String },
}
