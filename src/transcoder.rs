//! The transcoder collaborator: audio re-encoding and audio/video muxing.

use crate::error::{Error, Result};
use crate::executor::Executor;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Output sample rate of mp3 conversion, in Hz.
pub const MP3_SAMPLE_RATE: u32 = 44_100;
/// Output channel count of mp3 conversion.
pub const MP3_CHANNELS: u32 = 2;
/// Output bitrate of mp3 conversion.
pub const MP3_BITRATE: &str = "192k";

#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Re-encodes `input` into an mp3 at `output`, replacing any existing file.
    async fn to_mp3(&self, input: &Path, output: &Path) -> Result<()>;

    /// Copies the video track of `video` and the audio of `audio` (re-encoded
    /// to AAC) into `output`, replacing any existing file.
    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> Result<()>;
}

/// [`Transcoder`] running an `ffmpeg` executable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ffmpeg {
    pub executable: PathBuf,
}

impl Ffmpeg {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    async fn run(&self, args: Vec<String>) -> Result<()> {
        let executor = Executor::new(self.executable.clone(), args);
        executor.execute().await?;
        Ok(())
    }
}

fn path_arg(path: &Path) -> Result<String> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| Error::Path(path.to_path_buf()))
}

/// `-y -i <input> -vn -ar 44100 -ac 2 -b:a 192k <output>`
pub fn mp3_args(input: &Path, output: &Path) -> Result<Vec<String>> {
    Ok(vec![
        "-y".to_string(),
        "-i".to_string(),
        path_arg(input)?,
        "-vn".to_string(),
        "-ar".to_string(),
        MP3_SAMPLE_RATE.to_string(),
        "-ac".to_string(),
        MP3_CHANNELS.to_string(),
        "-b:a".to_string(),
        MP3_BITRATE.to_string(),
        path_arg(output)?,
    ])
}

/// `-y -i <video> -i <audio> -map 0:v:0 -map 1:a:0 -c:v copy -c:a aac <output>`
pub fn mux_args(video: &Path, audio: &Path, output: &Path) -> Result<Vec<String>> {
    Ok(vec![
        "-y".to_string(),
        "-i".to_string(),
        path_arg(video)?,
        "-i".to_string(),
        path_arg(audio)?,
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        "1:a:0".to_string(),
        "-c:v".to_string(),
        "copy".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        path_arg(output)?,
    ])
}

#[async_trait]
impl Transcoder for Ffmpeg {
    async fn to_mp3(&self, input: &Path, output: &Path) -> Result<()> {
        log::debug!(
            "Converting {} to mp3 at {}",
            input.display(),
            output.display()
        );
        self.run(mp3_args(input, output)?).await
    }

    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> Result<()> {
        log::debug!(
            "Combining video {} and audio {}, into {}",
            video.display(),
            audio.display(),
            output.display()
        );
        self.run(mux_args(video, audio, output)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mp3_arguments_use_fixed_output_parameters() {
        let args = mp3_args(Path::new("out/My Song__audio"), Path::new("out/My Song_.mp3")).unwrap();
        assert_eq!(
            args.join(" "),
            "-y -i out/My Song__audio -vn -ar 44100 -ac 2 -b:a 192k out/My Song_.mp3"
        );
    }

    #[test]
    fn mux_arguments_copy_video_and_encode_aac() {
        let args = mux_args(
            Path::new("clip_video.mp4"),
            Path::new("clip_audio"),
            Path::new("clip_1080p.mp4"),
        )
        .unwrap();
        assert_eq!(args[2], "clip_video.mp4");
        assert_eq!(args[4], "clip_audio");
        assert!(args.windows(2).any(|w| w == ["-c:v", "copy"]));
        assert!(args.windows(2).any(|w| w == ["-c:a", "aac"]));
        assert_eq!(args.last().map(String::as_str), Some("clip_1080p.mp4"));
    }

    #[tokio::test]
    async fn missing_binary_fails_the_step() {
        let ffmpeg = Ffmpeg::new("/nonexistent/ffmpeg");
        let err = ffmpeg
            .to_mp3(Path::new("in"), Path::new("out.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Command(_)));
    }
}
