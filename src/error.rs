//! The errors that can occur.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// The possible errors that can occur.
#[derive(Debug, Error)]
pub enum Error {
    /// An error occurred while interacting with the file system.
    #[error("An IO error occurred: {0}")]
    IO(#[from] std::io::Error),
    /// An error occurred while parsing JSON.
    #[error("An error occurred while parsing JSON: {0}")]
    Serde(#[from] serde_json::Error),

    /// The link was rejected by the extractor.
    #[error("Invalid link {0}: {1}")]
    InvalidLink(String, String),
    /// The extractor failed to resolve a video or playlist.
    #[error("Failed to extract {0}: {1}")]
    Extraction(String, String),
    /// No variant of the requested kind exists for the video.
    #[error("No {0} stream available for video")]
    StreamUnavailable(String),
    /// A stream could not be downloaded.
    #[error("Failed to download {0}: {1}")]
    Download(String, String),
    /// An error occurred while running a command.
    #[error("Failed to execute command: {0}")]
    Command(String),
    /// An error occurred manipulating a path.
    #[error("An invalid path was provided: {}", .0.display())]
    Path(PathBuf),
    /// The configuration file could not be read.
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// An error occurred due to a timeout.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}
