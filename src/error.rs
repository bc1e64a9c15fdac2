//! Error types for the PTZ face tracker library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Preset document could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Device-control tool missing, timed out or refused the request
    #[error("Hardware unavailable: {0}")]
    HardwareUnavailable(String),

    /// Face detector could not be created or run
    #[error("Detector error: {0}")]
    Detector(String),

    /// No saved preset matches the requested name
    #[error("Preset '{name}' not found. Available presets: {}", .available.join(", "))]
    PresetNotFound {
        /// Requested preset name
        name: String,
        /// Names that do exist
        available: Vec<String>,
    },

    /// Attempt to delete a preset that must always exist
    #[error("Preset '{0}' cannot be deleted")]
    ProtectedPreset(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
