//! Error types for the image server.

use std::path::PathBuf;
use thiserror::Error;

/// Per-request failures. Every variant is reported back to the client as a
/// tool error result; none of them terminate the session.
#[derive(Error, Debug)]
pub enum ImageError {
    /// The request arguments were malformed.
    #[error("{0}")]
    InvalidArgument(String),
    /// The file extension is not a supported image format.
    #[error("Unsupported format '{ext}'. Supported: {supported}")]
    UnsupportedFormat { ext: String, supported: String },
    /// No directories are configured.
    #[error("No directories configured. Use list_directories to check configuration.")]
    NotConfigured,
    /// The image or directory does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The resolved path escapes every configured directory.
    #[error("Access denied: '{0}' is outside the configured directories")]
    AccessDenied(String),
    /// The resolved path is not a regular file.
    #[error("'{0}' is not a file")]
    NotAFile(String),
    /// The file exists but cannot be read by this process.
    #[error("Permission denied reading '{0}'. Check file permissions.")]
    PermissionDenied(String),
    /// Any other filesystem failure.
    #[error("Error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ImageError {
    /// Classify an I/O failure on `path`, singling out permission problems.
    pub fn from_io(source: std::io::Error, path: &std::path::Path) -> Self {
        let path = path.display().to_string();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionDenied(path)
        } else {
            Self::Io { path, source }
        }
    }
}

/// Fatal startup configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The fixed media directory does not exist.
    #[error("media directory not found: {0}")]
    MissingDirectory(PathBuf),
    /// The fixed media directory exists but is not a directory.
    #[error("media path is not a directory: {0}")]
    NotADirectory(PathBuf),
    /// The working directory could not be determined while normalizing paths.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
