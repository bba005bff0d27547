use super::Pipeline;
use crate::error::Result;
use crate::extractor::Extractor;
use crate::manifest::PlaylistManifest;
use crate::model::{DownloadJob, JobPlan, MediaSource, PlaylistEntry, PlaylistInfo};
use crate::naming;
use crate::selector;
use crate::transcoder::Transcoder;
use chrono::Local;
use std::fmt;
use std::path::{Path, PathBuf};

/// What every item of a playlist run is turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistKind {
    Mp3,
    RawAudio,
    /// Highest available resolution, muxed with the best audio.
    Video,
}

impl PlaylistKind {
    /// The label used in the playlist directory name.
    pub fn label(&self) -> &'static str {
        match self {
            PlaylistKind::Mp3 | PlaylistKind::RawAudio => "audio",
            PlaylistKind::Video => "video",
        }
    }
}

impl fmt::Display for PlaylistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    succeeded: usize,
    failed: usize,
    skipped: usize,
}

impl<E: Extractor, T: Transcoder> Pipeline<E, T> {
    /// Enumerates the playlist at `source`, then hands it to
    /// [`Pipeline::download_playlist`]. Only a failed enumeration fails the run.
    pub async fn run_playlist(
        &self,
        source: &MediaSource,
        output_dir: &Path,
        kind: PlaylistKind,
    ) -> Result<PathBuf> {
        let playlist = match self.extractor.fetch_playlist(source).await {
            Ok(playlist) => playlist,
            Err(e) => {
                self.reporter
                    .error(format!("Failed to download playlist: {}", e));
                return Err(e);
            }
        };
        self.download_playlist(&playlist, output_dir, kind).await
    }

    /// Downloads every item of an already enumerated playlist into a fresh
    /// timestamped directory under `output_dir` and returns that directory.
    ///
    /// Items are processed one at a time. A failing item is logged and the
    /// run moves on.
    pub async fn download_playlist(
        &self,
        playlist: &PlaylistInfo,
        output_dir: &Path,
        kind: PlaylistKind,
    ) -> Result<PathBuf> {
        self.reporter.log(format!(
            "Playlist \"{}\" has {} videos",
            playlist.title,
            playlist.entries.len()
        ));

        let directory = output_dir.join(naming::playlist_dir_name(kind.label(), Local::now()));
        tokio::fs::create_dir_all(&directory).await?;
        let mut manifest = PlaylistManifest::create(&directory).await?;

        let mut tally = Tally::default();
        for (index, entry) in playlist.entries.iter().enumerate() {
            log::debug!(
                "Playlist item {}/{}: {}",
                index + 1,
                playlist.entries.len(),
                entry.url
            );
            manifest.append(&entry.url, &entry.title).await?;

            match self.run_entry(entry, &directory, kind).await {
                Some(Ok(path)) => {
                    tally.succeeded += 1;
                    log::debug!("Saved {}", path.display());
                }
                Some(Err(e)) => {
                    tally.failed += 1;
                    log::warn!("Skipping {} after failure: {}", entry.url, e);
                }
                None => tally.skipped += 1,
            }
        }

        let manifest_path = manifest.close().await?;
        log::debug!("Wrote {}", manifest_path.display());
        self.reporter.log(format!(
            "Playlist finished: {} downloaded, {} failed, {} skipped",
            tally.succeeded, tally.failed, tally.skipped
        ));
        Ok(directory)
    }

    /// Runs one playlist item. `None` when the item was skipped before a job
    /// could be built.
    async fn run_entry(
        &self,
        entry: &PlaylistEntry,
        directory: &Path,
        kind: PlaylistKind,
    ) -> Option<Result<PathBuf>> {
        let source = MediaSource::new(&entry.url);
        let plan = match kind {
            PlaylistKind::Mp3 => JobPlan::Mp3,
            PlaylistKind::RawAudio => JobPlan::RawAudio,
            PlaylistKind::Video => {
                let stream = selector::highest_video(&self.extractor, &source).await;
                match stream.and_then(|s| s.resolution().map(|r| (s, r))) {
                    Some((stream, resolution)) => JobPlan::Muxed { stream, resolution },
                    None => {
                        self.reporter.log(format!(
                            "Skipping video due to resolution issues: {}",
                            entry.title
                        ));
                        return None;
                    }
                }
            }
        };

        let job = DownloadJob::new(source, directory, plan);
        Some(self.run(&job).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_label_groups_audio_kinds() {
        assert_eq!(PlaylistKind::Mp3.label(), "audio");
        assert_eq!(PlaylistKind::RawAudio.label(), "audio");
        assert_eq!(PlaylistKind::Video.to_string(), "video");
    }
}
