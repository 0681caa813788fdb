//! Error types.
//!
//! Two layers:
//! - `SarError`: the audit pipeline's error taxonomy (per-target input errors,
//!   SAR validation failures, batch completeness)
//! - `AppError`: what the binary reports, carrying the process exit code

use thiserror::Error;

/// Exit code for a calibration run with too few populated confidence bands.
pub const EXIT_CALIBRATION: u8 = 1;
/// Exit code for I/O and input errors.
pub const EXIT_INPUT: u8 = 2;
/// Exit code for SAR validation and completeness failures.
pub const EXIT_VALIDATION: u8 = 3;
/// Exit code for internal errors.
pub const EXIT_INTERNAL: u8 = 4;

/// Errors raised while turning metric records into structural audit records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SarError {
    /// A built or loaded SAR lacks a required field (or carries an invalid gate).
    #[error("ERROR_SAR_INCOMPLETE: Missing required fields: {}", .missing.join(", "))]
    Incomplete { pdb_id: String, missing: Vec<String> },

    #[error("no metrics supplied for target {pdb_id}")]
    MissingMetrics { pdb_id: String },

    #[error("malformed metrics for target {pdb_id}: {reason}")]
    MalformedMetrics { pdb_id: String, reason: String },

    #[error("duplicate target identifier {pdb_id}")]
    DuplicateTarget { pdb_id: String },

    /// Fewer finalized SARs than manifest targets.
    #[error("completeness check failed: {found}/{expected} SARs present (missing: {})", .missing.join(", "))]
    BatchIncomplete {
        expected: usize,
        found: usize,
        missing: Vec<String>,
    },
}

impl SarError {
    /// Target the error belongs to, if it is a per-target error.
    pub fn pdb_id(&self) -> Option<&str> {
        match self {
            SarError::Incomplete { pdb_id, .. }
            | SarError::MissingMetrics { pdb_id }
            | SarError::MalformedMetrics { pdb_id, .. }
            | SarError::DuplicateTarget { pdb_id } => Some(pdb_id),
            SarError::BatchIncomplete { .. } => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SarError::Incomplete { .. })
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            SarError::Incomplete { .. } | SarError::BatchIncomplete { .. } => EXIT_VALIDATION,
            SarError::MissingMetrics { .. }
            | SarError::MalformedMetrics { .. }
            | SarError::DuplicateTarget { .. } => EXIT_INPUT,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<SarError> for AppError {
    fn from(err: SarError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
