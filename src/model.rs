//! The data the pipelines work on: sources, stream variants, jobs.

use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A remote video or playlist, as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaSource {
    url: String,
}

impl MediaSource {
    pub fn new(url: impl AsRef<str>) -> Self {
        Self {
            url: url.as_ref().trim().to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// What a stream variant carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    AudioOnly,
    VideoOnly,
    /// Audio and video already muxed together.
    Progressive,
}

impl StreamKind {
    pub fn has_audio(&self) -> bool {
        matches!(self, StreamKind::AudioOnly | StreamKind::Progressive)
    }

    pub fn has_video(&self) -> bool {
        matches!(self, StreamKind::VideoOnly | StreamKind::Progressive)
    }
}

/// One selectable encoded rendition of a video.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDescriptor {
    /// The extractor's identifier for this variant.
    pub format_id: String,
    pub kind: StreamKind,
    /// The container, as a file extension (`mp4`, `webm`, `m4a`).
    pub container: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Average bitrate in kbps.
    pub bitrate: Option<OrderedFloat<f64>>,
    /// Direct URL of the media bytes.
    pub url: String,
    /// Headers the extractor says the URL must be fetched with.
    pub http_headers: BTreeMap<String, String>,
}

impl StreamDescriptor {
    /// The resolution label, e.g. `1080p`. Audio-only streams have none.
    pub fn resolution(&self) -> Option<String> {
        if !self.kind.has_video() {
            return None;
        }
        self.height.map(|height| format!("{}p", height))
    }

    /// The mime type, e.g. `audio/webm` or `video/mp4`.
    pub fn mime_type(&self) -> String {
        let major = match self.kind {
            StreamKind::AudioOnly => "audio",
            StreamKind::VideoOnly | StreamKind::Progressive => "video",
        };
        let minor = match self.container.as_str() {
            "m4a" => "mp4",
            other => other,
        };
        format!("{}/{}", major, minor)
    }

    pub fn bitrate_kbps(&self) -> f64 {
        self.bitrate.map(|b| b.into_inner()).unwrap_or(0.0)
    }
}

impl fmt::Display for StreamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stream(id = {}, {}, {}, {:.0}kbps)",
            self.format_id,
            self.mime_type(),
            self.resolution().unwrap_or_else(|| "audio".to_string()),
            self.bitrate_kbps()
        )
    }
}

/// Resolved metadata of one video.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    pub id: String,
    pub title: String,
    /// The canonical page URL of the video.
    pub webpage_url: String,
    pub streams: Vec<StreamDescriptor>,
}

impl fmt::Display for MediaInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Video(id = {}, title = \"{}\", streams = {})",
            self.id,
            self.title,
            self.streams.len()
        )
    }
}

/// One item of a playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistInfo {
    pub title: String,
    pub entries: Vec<PlaylistEntry>,
}

/// The artifact a job produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Mp3,
    RawAudio,
    MuxedVideo,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::Mp3 => write!(f, "mp3"),
            OutputKind::RawAudio => write!(f, "raw audio"),
            OutputKind::MuxedVideo => write!(f, "video"),
        }
    }
}

/// How a job turns streams into its artifact.
#[derive(Debug, Clone, PartialEq)]
pub enum JobPlan {
    /// Download the best audio and transcode it to mp3.
    Mp3,
    /// Download the best audio as is.
    RawAudio,
    /// Download `stream` and the best audio, then mux them.
    Muxed {
        stream: StreamDescriptor,
        resolution: String,
    },
}

impl JobPlan {
    pub fn output_kind(&self) -> OutputKind {
        match self {
            JobPlan::Mp3 => OutputKind::Mp3,
            JobPlan::RawAudio => OutputKind::RawAudio,
            JobPlan::Muxed { .. } => OutputKind::MuxedVideo,
        }
    }
}

/// One unit of work for the single-item pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadJob {
    pub source: MediaSource,
    pub destination: PathBuf,
    pub plan: JobPlan,
}

impl DownloadJob {
    pub fn new(source: MediaSource, destination: impl Into<PathBuf>, plan: JobPlan) -> Self {
        Self {
            source,
            destination: destination.into(),
            plan,
        }
    }
}
