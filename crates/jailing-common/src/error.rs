//! Unified error types for the jailing workspace.
//!
//! Variants follow the failure classes of a provisioning run: argument
//! validation, unmet preconditions, filesystem I/O, failed system calls,
//! capability introspection, and process-image replacement.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum JailError {
    /// An argument failed validation before any mutation was attempted.
    #[error("invalid argument: {message}")]
    Validation {
        /// Description of the rejected value.
        message: String,
    },

    /// A required filesystem object is missing or of the wrong kind.
    #[error("{path}: {message}")]
    Precondition {
        /// Path that failed the check.
        path: PathBuf,
        /// Description of the unmet precondition.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A system call such as `mount(2)` or `chroot(2)` failed.
    #[error("{operation} failed at {path}: {source}")]
    Sys {
        /// Name of the failed operation.
        operation: &'static str,
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// The capability bounding set could not be inspected or modified.
    #[error("capability error: {message}")]
    Capability {
        /// Description of the failure.
        message: String,
    },

    /// Replacing the process image with the jailed command failed.
    #[error("cannot execute {command}: {source}")]
    Exec {
        /// Command that could not be executed.
        command: String,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// A layout file could not be decoded.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl JailError {
    /// Builds an [`JailError::Io`] for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Builds a [`JailError::Sys`] for the given operation and path.
    pub fn sys(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: impl Into<std::io::Error>,
    ) -> Self {
        Self::Sys {
            operation,
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, JailError>;
