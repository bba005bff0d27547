//! The extraction collaborator: resolves links into metadata and stream
//! variants, and fetches a chosen variant to a local file.
//!
//! Everything platform specific (page parsing, signatures, tokens) lives behind
//! this trait. [`YtDlp`] is the implementation used by the binary.

use crate::error::Result;
use crate::model::{MediaInfo, MediaSource, PlaylistInfo, StreamDescriptor};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub mod ytdlp;

pub use ytdlp::YtDlp;

/// Callback receiving `(downloaded_bytes, total_bytes)`; `total_bytes` is zero
/// when the size is unknown.
pub type ByteProgress<'a> = &'a (dyn Fn(u64, u64) + Send + Sync);

#[async_trait]
pub trait Extractor: Send + Sync {
    /// Resolves the title and stream variants of a single video.
    async fn fetch_info(&self, source: &MediaSource) -> Result<MediaInfo>;

    /// Enumerates the items of a playlist.
    async fn fetch_playlist(&self, source: &MediaSource) -> Result<PlaylistInfo>;

    /// Downloads `stream` to `destination`, overwriting it, and returns the
    /// path written. Blocks the calling task until the file is complete.
    async fn download(
        &self,
        stream: &StreamDescriptor,
        destination: &Path,
        on_progress: ByteProgress<'_>,
    ) -> Result<PathBuf>;
}
