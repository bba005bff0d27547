//! Platform detection and the platform-specific "open file location" command.

use crate::error::{Error, Result};
use crate::executor::Executor;
use std::fmt;
use std::path::{Path, PathBuf};

/// Represents the operating system where the program is running.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Platform {
    /// The Windows operating system.
    Windows,
    /// The Linux operating system.
    Linux,
    /// The macOS operating system.
    Mac,

    /// An unknown operating system.
    Unknown(String),
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Windows => write!(f, "Windows"),
            Platform::Linux => write!(f, "Linux"),
            Platform::Mac => write!(f, "MacOS"),
            Platform::Unknown(os) => write!(f, "Unknown: {}", os),
        }
    }
}

impl Platform {
    /// Detects the current platform where the program is running.
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    fn from_os(os: &str) -> Self {
        match os {
            "windows" => Platform::Windows,
            "linux" => Platform::Linux,
            "macos" => Platform::Mac,
            _ => Platform::Unknown(os.to_string()),
        }
    }

    /// The executable file name for `name` on this platform.
    pub fn executable_name(&self, name: &str) -> String {
        match self {
            Platform::Windows => format!("{}.exe", name),
            _ => name.to_string(),
        }
    }

    /// Builds the command that shows `path` in the platform's file manager.
    ///
    /// Windows and macOS select the file itself, other systems open its directory.
    pub fn reveal_command(&self, path: &Path) -> Result<Executor> {
        let display = path.to_string_lossy().into_owned();

        let executor = match self {
            Platform::Windows => Executor::new(
                PathBuf::from("explorer"),
                vec!["/select,".to_string(), display],
            ),
            Platform::Mac => Executor::new(PathBuf::from("open"), vec!["-R".to_string(), display]),
            Platform::Linux | Platform::Unknown(_) => {
                let directory = if path.is_dir() {
                    path
                } else {
                    path.parent()
                        .ok_or_else(|| Error::Path(path.to_path_buf()))?
                };
                Executor::new(
                    PathBuf::from("xdg-open"),
                    vec![directory.to_string_lossy().into_owned()],
                )
            }
        };

        Ok(executor)
    }
}

/// Opens the file manager at `path`.
///
/// # Errors
///
/// Fails when the path does not exist or the file manager could not be launched.
pub async fn open_file_location(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::Path(path.to_path_buf()));
    }

    let executor = Platform::detect().reveal_command(path)?;
    // explorer.exe exits with 1 even when it succeeds.
    match executor.execute().await {
        Ok(_) => Ok(()),
        Err(Error::Command(message)) if Platform::detect() == Platform::Windows => {
            log::debug!("explorer reported: {}", message);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_executables_get_exe_suffix() {
        assert_eq!(Platform::Windows.executable_name("ffmpeg"), "ffmpeg.exe");
        assert_eq!(Platform::Linux.executable_name("ffmpeg"), "ffmpeg");
        assert_eq!(Platform::from_os("freebsd"), Platform::Unknown("freebsd".into()));
    }

    #[test]
    fn reveal_selects_file_on_windows_and_mac() {
        let path = Path::new("/music/My_Song.mp3");

        let windows = Platform::Windows.reveal_command(path).unwrap();
        assert_eq!(windows.executable_path, PathBuf::from("explorer"));
        assert_eq!(windows.args[0], "/select,");

        let mac = Platform::Mac.reveal_command(path).unwrap();
        assert_eq!(mac.args, vec!["-R".to_string(), "/music/My_Song.mp3".to_string()]);
    }

    #[test]
    fn reveal_opens_parent_directory_on_linux() {
        let linux = Platform::Linux
            .reveal_command(Path::new("/music/My_Song.mp3"))
            .unwrap();
        assert_eq!(linux.executable_path, PathBuf::from("xdg-open"));
        assert_eq!(linux.args, vec!["/music".to_string()]);
    }
}
