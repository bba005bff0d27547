//! User configuration: an optional TOML file, overridden by command-line flags.

use crate::error::{Error, Result};
use crate::naming;
use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.toml";

/// The contents of `config.toml`. Every key is optional.
///
/// ```toml
/// tools_dir = "/opt/tubesave"
/// ffmpeg = "/usr/bin/ffmpeg"
/// output_dir = "~/Music"
/// extractor_args = ["--cookies-from-browser", "firefox"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where bundled `ffmpeg` and `yt-dlp` binaries are looked up.
    pub tools_dir: Option<PathBuf>,
    pub ffmpeg: Option<PathBuf>,
    pub yt_dlp: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    /// Extra arguments passed to every `yt-dlp` invocation.
    pub extractor_args: Vec<String>,
}

/// The executables a run uses.
#[derive(Constructor, Clone, Debug, PartialEq, Eq)]
pub struct Tools {
    /// The path to the yt-dlp binary.
    pub yt_dlp: PathBuf,
    /// The path to the ffmpeg binary.
    pub ffmpeg: PathBuf,
}

impl Config {
    /// `<config dir>/tubesave/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tubesave").join(CONFIG_FILE))
    }

    /// Reads the file at `path`. A missing or empty file is the default
    /// configuration; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() || fs::metadata(path)?.len() == 0 {
            log::debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// `self` with every value set in `overrides` replacing its own.
    /// Extractor arguments are appended rather than replaced.
    pub fn layered(mut self, overrides: Config) -> Self {
        if overrides.tools_dir.is_some() {
            self.tools_dir = overrides.tools_dir;
        }
        if overrides.ffmpeg.is_some() {
            self.ffmpeg = overrides.ffmpeg;
        }
        if overrides.yt_dlp.is_some() {
            self.yt_dlp = overrides.yt_dlp;
        }
        if overrides.output_dir.is_some() {
            self.output_dir = overrides.output_dir;
        }
        self.extractor_args.extend(overrides.extractor_args);
        self
    }

    pub fn tools_dir(&self) -> PathBuf {
        self.tools_dir
            .clone()
            .unwrap_or_else(naming::default_tools_dir)
    }

    /// The configured transcoder, else the bundled one if present, else
    /// `ffmpeg` from `PATH`.
    pub fn ffmpeg_path(&self) -> PathBuf {
        self.ffmpeg.clone().unwrap_or_else(|| {
            let bundled = naming::resolve_transcoder_path(&self.tools_dir());
            pick_bundled(bundled, "ffmpeg")
        })
    }

    /// Same lookup as [`Config::ffmpeg_path`], for `yt-dlp`.
    pub fn yt_dlp_path(&self) -> PathBuf {
        self.yt_dlp.clone().unwrap_or_else(|| {
            let bundled = naming::resolve_extractor_path(&self.tools_dir());
            pick_bundled(bundled, "yt-dlp")
        })
    }

    pub fn tools(&self) -> Tools {
        Tools::new(self.yt_dlp_path(), self.ffmpeg_path())
    }
}

fn pick_bundled(bundled: PathBuf, name: &str) -> PathBuf {
    if bundled.is_file() {
        bundled
    } else {
        PathBuf::from(naming::find_executable(name))
    }
}
