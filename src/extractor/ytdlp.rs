//! [`Extractor`] backed by the `yt-dlp` executable.
//!
//! Metadata comes from `--dump-single-json`; the bytes of the selected variant
//! are streamed over HTTP with the headers yt-dlp reports for it.

use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::extractor::{ByteProgress, Extractor};
use crate::model::{
    MediaInfo, MediaSource, PlaylistEntry, PlaylistInfo, StreamDescriptor, StreamKind,
};
use async_trait::async_trait;
use futures_util::StreamExt;
use ordered_float::OrderedFloat;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::io::{AsyncWriteExt, BufWriter};

static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("link pattern is a valid regex")
});

const BROWSER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Clone, Debug)]
pub struct YtDlp {
    /// The path to the yt-dlp executable.
    pub executable: PathBuf,
    /// Extra arguments passed before every invocation (cookies, proxy...).
    pub args: Vec<String>,
    client: reqwest::Client,
}

impl YtDlp {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_args(mut self, mut args: Vec<String>) -> Self {
        self.args.append(&mut args);
        self
    }

    fn check_link(source: &MediaSource) -> Result<()> {
        if LINK_PATTERN.is_match(source.url()) {
            return Ok(());
        }
        Err(Error::InvalidLink(
            source.url().to_string(),
            "does not match the link regex".to_string(),
        ))
    }

    async fn dump_json(&self, source: &MediaSource, flags: &[&str]) -> Result<String> {
        Self::check_link(source)?;

        let mut args = self.args.clone();
        args.extend(flags.iter().map(|flag| flag.to_string()));
        args.push(source.url().to_string());

        let output = Executor::new(self.executable.clone(), args)
            .execute()
            .await
            .map_err(|e| Error::Extraction(source.url().to_string(), e.to_string()))?;
        Ok(output.stdout)
    }

    fn headers_for(stream: &StreamDescriptor) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in &stream.http_headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => log::debug!("Skipping unusable header {}", name),
            }
        }
        if !headers.contains_key(USER_AGENT) {
            headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_AGENT));
        }
        headers
    }

    async fn fetch_to(
        &self,
        stream: &StreamDescriptor,
        path: &Path,
        on_progress: ByteProgress<'_>,
    ) -> Result<()> {
        let failed = |reason: String| Error::Download(stream.format_id.clone(), reason);

        let response = self
            .client
            .get(&stream.url)
            .headers(Self::headers_for(stream))
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| failed(e.to_string()))?;

        let total_bytes = response.content_length().unwrap_or(0);
        let mut downloaded_bytes = 0u64;

        let file = tokio::fs::File::create(path).await?;
        let mut writer = BufWriter::with_capacity(1024 * 1024, file);
        let mut body = response.bytes_stream();

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| failed(e.to_string()))?;
            writer.write_all(&chunk).await?;

            downloaded_bytes += chunk.len() as u64;
            on_progress(downloaded_bytes, total_bytes);
        }
        writer.flush().await?;

        if total_bytes != 0 && downloaded_bytes < total_bytes {
            return Err(failed(format!(
                "connection closed after {} of {} bytes",
                downloaded_bytes, total_bytes
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Extractor for YtDlp {
    async fn fetch_info(&self, source: &MediaSource) -> Result<MediaInfo> {
        log::debug!("Fetching video information for {}", source);

        let json = self
            .dump_json(
                source,
                &["--no-progress", "--no-warnings", "--no-playlist", "--dump-single-json"],
            )
            .await?;
        parse_video(&json)
    }

    async fn fetch_playlist(&self, source: &MediaSource) -> Result<PlaylistInfo> {
        log::debug!("Fetching playlist entries for {}", source);

        let json = self
            .dump_json(
                source,
                &[
                    "--flat-playlist",
                    "--yes-playlist",
                    "--no-warnings",
                    "--dump-single-json",
                ],
            )
            .await?;
        parse_playlist(&json)
    }

    /// Streams `stream` into `destination`. The bytes land in a `.part`
    /// sibling first, which only becomes `destination` once complete, so an
    /// interrupted transfer never leaves a file under the final name.
    async fn download(
        &self,
        stream: &StreamDescriptor,
        destination: &Path,
        on_progress: ByteProgress<'_>,
    ) -> Result<PathBuf> {
        log::debug!("Downloading {} to {}", stream, destination.display());

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let partial = partial_path(destination);
        if let Err(e) = self.fetch_to(stream, &partial, on_progress).await {
            if let Err(remove) = tokio::fs::remove_file(&partial).await {
                log::debug!("No partial file to remove at {}: {}", partial.display(), remove);
            }
            return Err(e);
        }

        tokio::fs::rename(&partial, destination).await?;
        Ok(destination.to_path_buf())
    }
}

/// `<destination>.part`
fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

#[derive(Debug, Deserialize)]
struct RawVideo {
    id: String,
    title: String,
    webpage_url: Option<String>,
    #[serde(default)]
    formats: Vec<RawFormat>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    format_id: String,
    ext: String,
    url: Option<String>,
    protocol: Option<String>,
    vcodec: Option<String>,
    acodec: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    abr: Option<f64>,
    vbr: Option<f64>,
    tbr: Option<f64>,
    #[serde(default)]
    http_headers: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RawPlaylist {
    title: Option<String>,
    #[serde(default)]
    entries: Vec<Option<RawEntry>>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    id: Option<String>,
    url: Option<String>,
    webpage_url: Option<String>,
    title: Option<String>,
}

/// `Some(false)` for yt-dlp's literal `"none"`, `None` when the field is absent.
fn codec_present(codec: Option<&str>) -> Option<bool> {
    codec.map(|codec| codec != "none")
}

impl RawFormat {
    fn into_stream(self) -> Option<StreamDescriptor> {
        let url = self.url?;
        let downloadable = match self.protocol.as_deref() {
            Some(protocol) => protocol == "https" || protocol == "http",
            None => url.starts_with("http"),
        };
        if !downloadable {
            return None;
        }

        let has_video = codec_present(self.vcodec.as_deref()).unwrap_or(self.height.is_some());
        let has_audio = codec_present(self.acodec.as_deref()).unwrap_or(self.abr.is_some());
        let kind = match (has_audio, has_video) {
            (true, false) => StreamKind::AudioOnly,
            (false, true) => StreamKind::VideoOnly,
            (true, true) => StreamKind::Progressive,
            // Storyboards and other image-only entries.
            (false, false) => return None,
        };

        let bitrate = match kind {
            StreamKind::AudioOnly => self.abr.or(self.tbr),
            StreamKind::VideoOnly => self.vbr.or(self.tbr),
            StreamKind::Progressive => self.tbr,
        };

        Some(StreamDescriptor {
            format_id: self.format_id,
            kind,
            container: self.ext,
            width: self.width,
            height: self.height,
            bitrate: bitrate.map(OrderedFloat),
            url,
            http_headers: self.http_headers,
        })
    }
}

/// Parses the output of `yt-dlp --dump-single-json` for one video.
pub fn parse_video(json: &str) -> Result<MediaInfo> {
    let raw: RawVideo = serde_json::from_str(json)?;
    let webpage_url = raw
        .webpage_url
        .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={}", raw.id));

    Ok(MediaInfo {
        id: raw.id,
        title: raw.title,
        webpage_url,
        streams: raw
            .formats
            .into_iter()
            .filter_map(RawFormat::into_stream)
            .collect(),
    })
}

/// Parses the output of `yt-dlp --flat-playlist --dump-single-json`.
pub fn parse_playlist(json: &str) -> Result<PlaylistInfo> {
    let raw: RawPlaylist = serde_json::from_str(json)?;

    let entries = raw
        .entries
        .into_iter()
        .flatten()
        .filter_map(|entry| {
            let url = entry
                .webpage_url
                .or(entry.url.filter(|url| url.starts_with("http")))
                .or_else(|| {
                    entry
                        .id
                        .as_ref()
                        .map(|id| format!("https://www.youtube.com/watch?v={}", id))
                })?;
            let title = entry
                .title
                .or(entry.id)
                .unwrap_or_else(|| "Untitled".to_string());
            Some(PlaylistEntry { url, title })
        })
        .collect();

    Ok(PlaylistInfo {
        title: raw.title.unwrap_or_default(),
        entries,
    })
}
