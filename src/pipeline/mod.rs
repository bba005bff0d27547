//! The download-and-merge pipeline.
//!
//! One [`Pipeline::run`] call takes a [`DownloadJob`] through
//! `Start → FetchStream → Download → [Transcode | Mux] → Cleanup → Done`,
//! reporting progress on the way. Any failing step ends the job in `Failed`.

use crate::error::{Error, Result};
use crate::extractor::Extractor;
use crate::model::{DownloadJob, JobPlan, MediaInfo, StreamDescriptor};
use crate::naming;
use crate::progress::{Reporter, Span};
use crate::selector;
use crate::transcoder::Transcoder;
use std::fmt;
use std::path::{Path, PathBuf};

pub mod playlist;

pub use playlist::PlaylistKind;

/// Where a job currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    FetchStream,
    Download,
    Transcode,
    Mux,
    Cleanup,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::FetchStream => "fetch stream",
            Stage::Download => "download",
            Stage::Transcode => "transcode",
            Stage::Mux => "mux",
            Stage::Cleanup => "cleanup",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tracks the stage of one job. Stages only move forward.
#[derive(Debug)]
struct JobRun<'a> {
    job: &'a DownloadJob,
    stage: Stage,
}

impl<'a> JobRun<'a> {
    fn new(job: &'a DownloadJob) -> Self {
        Self {
            job,
            stage: Stage::Start,
        }
    }

    fn enter(&mut self, stage: Stage) {
        log::debug!("{}: {} -> {}", self.job.source, self.stage, stage);
        self.stage = stage;
    }
}

// Percentages reported at the end of each step.
const FETCHED: u8 = 30;
const AUDIO_DOWNLOADED: u8 = 60;
const VIDEO_DOWNLOADED: u8 = 50;
const MUX_AUDIO_DOWNLOADED: u8 = 80;
const TRANSCODED: u8 = 90;
const DONE: u8 = 100;

/// Runs download jobs against an extractor and a transcoder.
pub struct Pipeline<E, T> {
    extractor: E,
    transcoder: T,
    reporter: Reporter,
}

impl<E: Extractor, T: Transcoder> Pipeline<E, T> {
    pub fn new(extractor: E, transcoder: T, reporter: Reporter) -> Self {
        Self {
            extractor,
            transcoder,
            reporter,
        }
    }

    /// Runs one job to completion and returns the path of the final file.
    ///
    /// On failure a `Download failed: <reason>` line is reported and the error
    /// is returned. Temporary files already downloaded when a later step fails
    /// stay on disk and are reported.
    pub async fn run(&self, job: &DownloadJob) -> Result<PathBuf> {
        self.reporter.begin_job();
        let mut run = JobRun::new(job);

        let result = match &job.plan {
            JobPlan::Mp3 => self.run_mp3(&mut run).await,
            JobPlan::RawAudio => self.run_raw_audio(&mut run).await,
            JobPlan::Muxed { stream, resolution } => {
                self.run_muxed(&mut run, stream, resolution).await
            }
        };

        match result {
            Ok(path) => {
                run.enter(Stage::Done);
                self.reporter.progress(DONE);
                Ok(path)
            }
            Err(e) => {
                log::debug!("{} failed during {}", job.source, run.stage);
                run.enter(Stage::Failed);
                self.reporter.error(format!("Download failed: {}", e));
                Err(e)
            }
        }
    }

    async fn fetch(&self, run: &mut JobRun<'_>) -> Result<(MediaInfo, StreamDescriptor)> {
        run.enter(Stage::FetchStream);
        tokio::fs::create_dir_all(&run.job.destination).await?;

        let info = self.extractor.fetch_info(&run.job.source).await?;
        let audio = selector::best_audio(&info.streams)
            .cloned()
            .ok_or_else(|| Error::StreamUnavailable("audio".to_string()))?;
        log::debug!("Selected {} for {}", audio, info);
        Ok((info, audio))
    }

    async fn download(
        &self,
        stream: &StreamDescriptor,
        destination: &Path,
        span: Span,
    ) -> Result<PathBuf> {
        let reporter = self.reporter.clone();
        let on_progress = move |downloaded: u64, total: u64| {
            reporter.progress(span.at(downloaded, total));
        };
        let path = self
            .extractor
            .download(stream, destination, &on_progress)
            .await?;
        self.reporter.progress(span.end);
        Ok(path)
    }

    async fn run_mp3(&self, run: &mut JobRun<'_>) -> Result<PathBuf> {
        let (info, audio) = self.fetch(run).await?;
        self.reporter.log("Downloading audio...");
        self.reporter.progress(FETCHED);

        run.enter(Stage::Download);
        let temp = run.job.destination.join(naming::temp_audio_name(&info.title));
        let temp = self
            .download(&audio, &temp, Span::new(FETCHED, AUDIO_DOWNLOADED))
            .await?;

        run.enter(Stage::Transcode);
        self.reporter.log("Converting to MP3...");
        let output = run.job.destination.join(naming::mp3_name(&info.title));
        self.transcoder
            .to_mp3(&temp, &output)
            .await
            .inspect_err(|_| self.keep_temp_files(&[temp.as_path()]))?;
        self.reporter.progress(TRANSCODED);

        run.enter(Stage::Cleanup);
        self.remove_temp_files(&[temp.as_path()]).await;
        Ok(output)
    }

    async fn run_raw_audio(&self, run: &mut JobRun<'_>) -> Result<PathBuf> {
        let (info, audio) = self.fetch(run).await?;
        self.reporter.log("Downloading raw audio...");
        self.reporter.progress(FETCHED);

        run.enter(Stage::Download);
        let output = run
            .job
            .destination
            .join(naming::raw_audio_name(&info.title, &audio.container));
        self.download(&audio, &output, Span::new(FETCHED, DONE))
            .await
    }

    async fn run_muxed(
        &self,
        run: &mut JobRun<'_>,
        video: &StreamDescriptor,
        resolution: &str,
    ) -> Result<PathBuf> {
        let (info, audio) = self.fetch(run).await?;
        self.reporter.log("Downloading video...");
        self.reporter.progress(FETCHED);

        run.enter(Stage::Download);
        let video_temp = run.job.destination.join(naming::temp_video_name(&info.title));
        let video_temp = self
            .download(video, &video_temp, Span::new(FETCHED, VIDEO_DOWNLOADED))
            .await?;

        self.reporter.log("Downloading audio...");
        let audio_temp = run.job.destination.join(naming::temp_audio_name(&info.title));
        let audio_temp = self
            .download(
                &audio,
                &audio_temp,
                Span::new(VIDEO_DOWNLOADED, MUX_AUDIO_DOWNLOADED),
            )
            .await
            .inspect_err(|_| self.keep_temp_files(&[video_temp.as_path()]))?;

        run.enter(Stage::Mux);
        self.reporter.log("Merging video and audio...");
        let output = run
            .job
            .destination
            .join(naming::muxed_name(&info.title, resolution));
        self.transcoder
            .mux(&video_temp, &audio_temp, &output)
            .await
            .inspect_err(|_| self.keep_temp_files(&[video_temp.as_path(), audio_temp.as_path()]))?;
        self.reporter.log("Merging successful.");
        self.reporter.progress(TRANSCODED);

        run.enter(Stage::Cleanup);
        self.remove_temp_files(&[video_temp.as_path(), audio_temp.as_path()]).await;
        Ok(output)
    }

    /// Removes temporary inputs once the final artifact exists. Failures are
    /// logged and do not fail the job.
    async fn remove_temp_files(&self, paths: &[&Path]) {
        for path in paths {
            if let Err(e) = tokio::fs::remove_file(path).await {
                log::warn!("Failed to remove temporary file {}: {}", path.display(), e);
            }
        }
    }

    fn keep_temp_files(&self, paths: &[&Path]) {
        for path in paths {
            self.reporter
                .log(format!("Temporary file kept: {}", path.display()));
        }
    }
}

/// The file a job would produce for `info`, so callers can ask before
/// overwriting. `None` when the plan cannot be satisfied by `info`.
pub fn predicted_output(plan: &JobPlan, info: &MediaInfo, destination: &Path) -> Option<PathBuf> {
    let name = match plan {
        JobPlan::Mp3 => naming::mp3_name(&info.title),
        JobPlan::RawAudio => {
            let audio = selector::best_audio(&info.streams)?;
            naming::raw_audio_name(&info.title, &audio.container)
        }
        JobPlan::Muxed { resolution, .. } => naming::muxed_name(&info.title, resolution),
    };
    Some(destination.join(name))
}
