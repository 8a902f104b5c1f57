//! Error types for NoiSim
//!
//! Gantree: L0_Foundation → Errors
//!
//! Every manager operation reports failures through [`InsError`]. All
//! variants are user-recoverable: a failed operation never leaves a
//! registry or lock table half-updated.

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use thiserror::Error;

/// Main error type for NoiSim
/// Gantree: InsError // enum
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InsError {
    // ========================================================================
    // Reference Key Errors
    // ========================================================================
    /// Key already taken within its category
    /// Gantree: DuplicateKey{{type,key}} // 키 중복
    #[error("A {instance_type} with reference key '{key}' already exists")]
    DuplicateKey { instance_type: String, key: String },

    /// Key not present within its category
    /// Gantree: MissingKey{{type,key}} // 키 없음
    #[error("There is no {instance_type} with reference key '{key}'")]
    MissingKey { instance_type: String, key: String },

    /// Key pinned by a dependent instance
    /// Gantree: BlockedKey{{key,blocker}} // 키 차단
    #[error(
        "Reference key '{key}' of {instance_type} is blocked by {blocker_type} '{blocker}'; \
         remove the {blocker_type} first"
    )]
    BlockedKey {
        key: String,
        instance_type: String,
        blocker_type: String,
        blocker: String,
    },

    /// Unblock requested for a lock that is not recorded
    #[error("Reference key '{key}' of {instance_type} holds no lock from '{blocker}'")]
    MissingLock {
        key: String,
        instance_type: String,
        blocker: String,
    },

    // ========================================================================
    // Linkage Errors
    // ========================================================================
    /// Manager used before its upstream manager was linked
    /// Gantree: Linkage{{manager,required}} // 연결 없음
    #[error("{manager} has no linked {required}; call {method}() first")]
    Linkage {
        manager: String,
        required: String,
        method: String,
    },

    /// Second link request on a manager that already shares a lock table
    #[error("{manager} is already linked to a {linked}")]
    AlreadyLinked { manager: String, linked: String },

    // ========================================================================
    // Parameter Errors
    // ========================================================================
    /// Negative qubit index
    #[error("Qubit number {qubit} is invalid: qubit numbers cannot be negative")]
    NegativeQubit { qubit: i64 },

    /// Qubit index beyond the last row of the table
    /// Gantree: QubitOutOfRange{{q,count}} // 큐비트 범위
    #[error("Qubit number {qubit} exceeds the max qubit index (data has {qubit_count} qubits)")]
    QubitOutOfRange { qubit: i64, qubit_count: usize },

    /// Optimization level outside [0, 3]
    #[error("Invalid optimization level {0}: must be in range [0, 3]")]
    InvalidOptimizationLevel(u8),

    /// Shot count of zero
    #[error("Invalid shot count {0}: at least one shot is required")]
    InvalidShots(u64),

    /// Any other rejected argument
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    // ========================================================================
    // Import Errors
    // ========================================================================
    /// Unsupported file extension
    /// Gantree: FileType{{current,expected}} // 파일 형식
    #[error("Incorrect file type '{current_ext}': expected one of {expected}")]
    FileType { current_ext: String, expected: String },

    /// Malformed CSV content
    #[error("CSV format error on line {line}: {reason}")]
    CsvFormat { line: usize, reason: String },

    /// Calibration data that cannot be interpreted
    #[error("Calibration error: {0}")]
    InvalidCalibration(String),

    // ========================================================================
    // Model / Backend Errors
    // ========================================================================
    /// Rejected error-channel parameter
    #[error("Invalid error parameter: {0}")]
    InvalidErrorParameter(String),

    /// Circuit cannot be mapped onto the coupling map
    #[error("Topology violation: {0}")]
    TopologyViolation(String),

    /// Backend execution error
    #[error("Backend error: {0}")]
    BackendError(String),

    /// Job finished unsuccessfully
    #[error("Job {job_id} failed: {reason}")]
    JobFailed { job_id: String, reason: String },

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(String),

    /// File I/O error
    #[error("File error: {0}")]
    FileError(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type alias for NoiSim operations
/// Gantree: InsResult<T> // type alias
pub type InsResult<T> = Result<T, InsError>;

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for InsError {
    fn from(err: serde_json::Error) -> Self {
        InsError::JsonError(err.to_string())
    }
}

impl From<std::io::Error> for InsError {
    fn from(err: std::io::Error) -> Self {
        InsError::FileError(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for InsError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        InsError::InternalError(format!("lock poisoned: {}", err))
    }
}

// ============================================================================
// Error Helpers
// ============================================================================

impl InsError {
    /// Check if error concerns reference key existence or locking
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            InsError::DuplicateKey { .. }
                | InsError::MissingKey { .. }
                | InsError::BlockedKey { .. }
                | InsError::MissingLock { .. }
        )
    }

    /// Check if error is an argument validation error
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(
            self,
            InsError::NegativeQubit { .. }
                | InsError::QubitOutOfRange { .. }
                | InsError::InvalidOptimizationLevel(_)
                | InsError::InvalidShots(_)
                | InsError::InvalidParameter(_)
        )
    }

    /// Check if the user can fix the cause and retry
    pub fn is_user_recoverable(&self) -> bool {
        !matches!(self, InsError::InternalError(_) | InsError::MissingLock { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_key_display() {
        let err = InsError::BlockedKey {
            key: "d1".into(),
            instance_type: "noise data instance".into(),
            blocker_type: "noise model instance".into(),
            blocker: "m1".into(),
        };
        let text = err.to_string();
        assert!(text.contains("'d1'"));
        assert!(text.contains("'m1'"));
        assert!(text.contains("noise model instance"));
    }

    #[test]
    fn test_qubit_out_of_range() {
        let err = InsError::QubitOutOfRange {
            qubit: 10,
            qubit_count: 7,
        };
        assert!(err.to_string().contains("10"));
        assert!(err.to_string().contains("7"));
    }

    #[test]
    fn test_already_linked_display() {
        let err = InsError::AlreadyLinked {
            manager: "SimulatorManager".into(),
            linked: "NoiseModelManager".into(),
        };
        assert_eq!(
            err.to_string(),
            "SimulatorManager is already linked to a NoiseModelManager"
        );
        assert!(err.is_user_recoverable());
    }

    #[test]
    fn test_classification() {
        assert!(InsError::MissingKey {
            instance_type: "simulator instance".into(),
            key: "s".into()
        }
        .is_key_error());
        assert!(InsError::InvalidOptimizationLevel(4).is_invalid_parameter());
        assert!(InsError::NegativeQubit { qubit: -1 }.is_invalid_parameter());
        assert!(!InsError::FileError("x".into()).is_invalid_parameter());
        assert!(!InsError::InternalError("x".into()).is_user_recoverable());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: InsError = io.into();
        assert!(matches!(err, InsError::FileError(_)));
    }
}
