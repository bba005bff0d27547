//! File names and tool locations.
//!
//! Every file the pipelines write is named through this module, so titles coming
//! from the extractor never reach the file system unsanitized.

use crate::platform::Platform;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "tubesave";

/// Replaces every character that is not alphanumeric, a space, a dot or an
/// underscore with an underscore.
///
/// The output has exactly as many characters as the input. Distinct titles may
/// collapse to the same name; callers check for existing files themselves.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '.' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// The file name of `name` as an executable on the current platform.
pub fn find_executable(name: &str) -> String {
    Platform::detect().executable_name(name)
}

/// Where bundled tools live when nothing else is configured.
pub fn default_tools_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR).join("tools"))
        .unwrap_or_else(|| PathBuf::from("tools"))
}

/// The expected location of the bundled transcoder. The file is not checked for
/// existence: a missing binary surfaces when it is first invoked.
pub fn resolve_transcoder_path(tools_dir: &Path) -> PathBuf {
    tools_dir.join(find_executable("ffmpeg"))
}

/// The expected location of the bundled extractor.
pub fn resolve_extractor_path(tools_dir: &Path) -> PathBuf {
    tools_dir.join(find_executable("yt-dlp"))
}

pub fn temp_audio_name(title: &str) -> String {
    format!("{}_audio", sanitize(title))
}

pub fn temp_video_name(title: &str) -> String {
    format!("{}_video.mp4", sanitize(title))
}

pub fn mp3_name(title: &str) -> String {
    format!("{}.mp3", sanitize(title))
}

pub fn raw_audio_name(title: &str, container: &str) -> String {
    format!("{}.{}", sanitize(title), sanitize(container))
}

pub fn muxed_name(title: &str, resolution: &str) -> String {
    format!("{}_{}.mp4", sanitize(title), sanitize(resolution))
}

/// `Playlist_<kind>_<yyyyMMdd_HHmmss_SSS>`, sortable and unique per millisecond.
pub fn playlist_dir_name(kind: &str, at: DateTime<Local>) -> String {
    format!("Playlist_{}_{}", kind, at.format("%Y%m%d_%H%M%S_%3f"))
}
