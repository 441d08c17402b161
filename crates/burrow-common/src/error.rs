//! Unified error types for the Burrow workspace.
//!
//! Every failure in the bootstrap pipeline is fatal at the point of
//! detection. Variants carry enough context to tell which step failed.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum BurrowError {
    /// An argument or invocation mode is invalid.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// The operating system randomness source failed.
    #[error("randomness source failed: {message}")]
    Randomness {
        /// Description reported by the randomness source.
        message: String,
    },

    /// Fetching the root filesystem archive failed.
    #[error("download of {url} failed: {message}")]
    Download {
        /// URL that was being fetched.
        url: String,
        /// Transport error or unexpected HTTP status.
        message: String,
    },

    /// A filesystem operation (mkdir, create, write, stat, remove) failed.
    #[error("filesystem error at {path}: {source}")]
    Filesystem {
        /// Path where the error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An archive entry could not be read or materialized.
    #[error("extraction failed at {path}: {message}")]
    Extraction {
        /// Archive or entry path being processed.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// A confinement syscall (sethostname, chroot, chdir, clone) failed.
    #[error("{operation} failed: {source}")]
    Syscall {
        /// Name of the failing operation.
        operation: &'static str,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// A child process could not be created or waited on.
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        /// Command that failed to start.
        command: String,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// Serialization or deserialization of the instance context failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, BurrowError>;
