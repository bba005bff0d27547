#![allow(dead_code)]

use async_trait::async_trait;
use ordered_float::OrderedFloat;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use tubesave::error::{Error, Result};
use tubesave::extractor::ByteProgress;
use tubesave::model::{MediaInfo, PlaylistEntry, PlaylistInfo};
use tubesave::progress::Event;
use tubesave::{Extractor, MediaSource, StreamDescriptor, StreamKind, Transcoder};
use tokio::sync::mpsc::UnboundedReceiver;

/// In-memory extractor: known videos resolve, downloads write small files.
#[derive(Default)]
pub struct FakeExtractor {
    videos: HashMap<String, MediaInfo>,
    playlist: Option<PlaylistInfo>,
    failing_downloads: HashSet<String>,
    failing_formats: HashSet<String>,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video(mut self, info: MediaInfo) -> Self {
        self.videos.insert(info.webpage_url.clone(), info);
        self
    }

    /// Registers `videos` and a playlist listing them in order.
    pub fn with_playlist(mut self, title: &str, videos: Vec<MediaInfo>) -> Self {
        let entries = videos
            .iter()
            .map(|info| PlaylistEntry {
                url: info.webpage_url.clone(),
                title: info.title.clone(),
            })
            .collect();
        self.playlist = Some(PlaylistInfo {
            title: title.to_string(),
            entries,
        });
        for info in videos {
            self = self.with_video(info);
        }
        self
    }

    /// Every stream download of the video at `url` fails.
    pub fn failing_download(mut self, url: &str) -> Self {
        self.failing_downloads.insert(url.to_string());
        self
    }

    /// Downloads of the stream with `format_id` fail, whatever the video.
    pub fn failing_format(mut self, format_id: &str) -> Self {
        self.failing_formats.insert(format_id.to_string());
        self
    }
}

#[async_trait]
impl Extractor for FakeExtractor {
    async fn fetch_info(&self, source: &MediaSource) -> Result<MediaInfo> {
        if !source.url().starts_with("http") {
            return Err(Error::InvalidLink(
                source.url().to_string(),
                "does not match the link regex".to_string(),
            ));
        }
        self.videos.get(source.url()).cloned().ok_or_else(|| {
            Error::Extraction(source.url().to_string(), "Video unavailable".to_string())
        })
    }

    async fn fetch_playlist(&self, source: &MediaSource) -> Result<PlaylistInfo> {
        self.playlist.clone().ok_or_else(|| {
            Error::Extraction(source.url().to_string(), "not a playlist".to_string())
        })
    }

    async fn download(
        &self,
        stream: &StreamDescriptor,
        destination: &Path,
        on_progress: ByteProgress<'_>,
    ) -> Result<PathBuf> {
        if self
            .failing_downloads
            .iter()
            .any(|url| stream.url.starts_with(url.as_str()))
            || self.failing_formats.contains(&stream.format_id)
        {
            return Err(Error::Download(stream.url.clone(), "HTTP 403".to_string()));
        }
        for step in 0..=10u64 {
            on_progress(step * 10, 100);
        }
        tokio::fs::write(destination, format!("bytes of {}", stream.format_id)).await?;
        Ok(destination.to_path_buf())
    }
}

/// Transcoder writing its inputs' contents to the output, or always failing.
#[derive(Default)]
pub struct FakeTranscoder {
    fail: bool,
}

impl FakeTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn to_mp3(&self, input: &Path, output: &Path) -> Result<()> {
        if self.fail {
            return Err(Error::Command("Process failed with code 1: bad input".to_string()));
        }
        let bytes = tokio::fs::read(input).await?;
        tokio::fs::write(output, bytes).await?;
        Ok(())
    }

    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> Result<()> {
        if self.fail {
            return Err(Error::Command("Process failed with code 1: bad input".to_string()));
        }
        let mut bytes = tokio::fs::read(video).await?;
        bytes.extend(tokio::fs::read(audio).await?);
        tokio::fs::write(output, bytes).await?;
        Ok(())
    }
}

pub fn stream(url: &str, id: &str, kind: StreamKind, container: &str, height: Option<u32>, kbps: f64) -> StreamDescriptor {
    StreamDescriptor {
        format_id: id.to_string(),
        kind,
        container: container.to_string(),
        width: None,
        height,
        bitrate: Some(OrderedFloat(kbps)),
        url: format!("{}/stream/{}", url, id),
        http_headers: BTreeMap::new(),
    }
}

/// A video with two audio variants and 1080p/720p mp4 video.
pub fn video(url: &str, title: &str) -> MediaInfo {
    MediaInfo {
        id: title.to_lowercase(),
        title: title.to_string(),
        webpage_url: url.to_string(),
        streams: vec![
            stream(url, "140", StreamKind::AudioOnly, "m4a", None, 129.0),
            stream(url, "251", StreamKind::AudioOnly, "webm", None, 140.0),
            stream(url, "136", StreamKind::VideoOnly, "mp4", Some(720), 526.0),
            stream(url, "137", StreamKind::VideoOnly, "mp4", Some(1080), 1379.0),
            stream(url, "18", StreamKind::Progressive, "mp4", Some(360), 185.0),
        ],
    }
}

/// A video with only audio variants.
pub fn audio_only(url: &str, title: &str) -> MediaInfo {
    let mut info = video(url, title);
    info.streams.retain(|s| s.kind == StreamKind::AudioOnly);
    info
}

pub fn drain(receiver: &mut UnboundedReceiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

pub fn percentages(events: &[Event]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Progress(p) => Some(*p),
            _ => None,
        })
        .collect()
}

pub fn log_lines(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Log(line) => Some(line.clone()),
            _ => None,
        })
        .collect()
}

/// Names of the files directly inside `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
