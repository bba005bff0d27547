//! Pre-flight classification of user-entered links.

use crate::error::{Error, Result};
use crate::extractor::Extractor;
use crate::model::MediaSource;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static PLAYLIST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([?&]list=[\w-]+|/playlist\b|/sets/)").expect("playlist pattern is a valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Valid,
    /// The extractor could not make sense of the link's shape.
    InvalidRegex,
    /// Anything else went wrong (network, unavailable video, missing tool).
    InvalidFailed,
}

impl LinkStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, LinkStatus::Valid)
    }

    /// Classifies the result of a fetch the caller already made.
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => LinkStatus::Valid,
            Err(e) => LinkStatus::from_error(e),
        }
    }

    /// Only the reason is inspected. The link itself is free text and may
    /// contain anything.
    fn from_error(error: &Error) -> Self {
        log::debug!("Link rejected: {}", error);
        match error {
            Error::InvalidLink(_, reason)
            | Error::Extraction(_, reason)
            | Error::Download(_, reason)
                if reason.contains("regex") =>
            {
                LinkStatus::InvalidRegex
            }
            _ => LinkStatus::InvalidFailed,
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkStatus::Valid => write!(f, "valid"),
            LinkStatus::InvalidRegex => write!(f, "invalid_regex"),
            LinkStatus::InvalidFailed => write!(f, "invalid_failed"),
        }
    }
}

/// Classifies a video link by attempting a metadata fetch. No retry.
///
/// The split between the two invalid states relies on the extractor's error
/// text, so it is best effort.
pub async fn validate<E: Extractor + ?Sized>(extractor: &E, url: &str) -> LinkStatus {
    LinkStatus::of(&extractor.fetch_info(&MediaSource::new(url)).await)
}

/// Same as [`validate`], against playlist enumeration.
pub async fn validate_playlist<E: Extractor + ?Sized>(extractor: &E, url: &str) -> LinkStatus {
    LinkStatus::of(&extractor.fetch_playlist(&MediaSource::new(url)).await)
}

/// Whether the link's shape says it points to a playlist rather than a video.
pub fn looks_like_playlist(url: &str) -> bool {
    PLAYLIST_PATTERN.is_match(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_playlist_links() {
        assert!(looks_like_playlist(
            "https://www.youtube.com/playlist?list=PL590L5WQmH8fJ54F369BLDSqIwcs-TCfs"
        ));
        assert!(looks_like_playlist(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=RDdQw4w9WgXcQ"
        ));
        assert!(!looks_like_playlist("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(!looks_like_playlist("https://youtu.be/dQw4w9WgXcQ"));
    }

    #[test]
    fn regex_failures_are_told_apart() {
        let syntax: Result<()> = Err(Error::InvalidLink(
            "not a link".into(),
            "does not match the link regex".into(),
        ));
        let other: Result<()> = Err(Error::Command("Video unavailable".into()));
        assert_eq!(LinkStatus::of(&syntax), LinkStatus::InvalidRegex);
        assert_eq!(LinkStatus::of(&other), LinkStatus::InvalidFailed);
        assert_eq!(LinkStatus::of(&Ok(())), LinkStatus::Valid);
    }

    #[test]
    fn link_text_does_not_decide_the_status() {
        let unavailable: Result<()> = Err(Error::Extraction(
            "https://example.com/regex-guide".into(),
            "Video unavailable".into(),
        ));
        let failed_download: Result<()> = Err(Error::Download(
            "https://example.com/regex".into(),
            "HTTP 403".into(),
        ));
        assert_eq!(LinkStatus::of(&unavailable), LinkStatus::InvalidFailed);
        assert_eq!(LinkStatus::of(&failed_download), LinkStatus::InvalidFailed);
    }

    #[test]
    fn status_renders_like_the_classic_labels() {
        assert_eq!(LinkStatus::Valid.to_string(), "valid");
        assert_eq!(LinkStatus::InvalidRegex.to_string(), "invalid_regex");
        assert_eq!(LinkStatus::InvalidFailed.to_string(), "invalid_failed");
    }
}
