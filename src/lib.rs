//! Download videos, playlists and their audio, converting and merging them
//! with `ffmpeg`.
//!
//! Metadata and stream URLs come from an [`Extractor`] (by default the
//! `yt-dlp` executable), conversions go through a [`Transcoder`] (by default
//! `ffmpeg`). A [`Pipeline`] drives one job or one playlist and reports its
//! progress through a [`Reporter`].
//!
//! ```rust,no_run
//! # use tubesave::{DownloadJob, Ffmpeg, JobPlan, MediaSource, Pipeline, Reporter, YtDlp};
//! # #[tokio::main]
//! # async fn main() -> tubesave::error::Result<()> {
//! let (reporter, _events) = Reporter::channel();
//! let pipeline = Pipeline::new(YtDlp::new("yt-dlp"), Ffmpeg::new("ffmpeg"), reporter);
//!
//! let job = DownloadJob::new(
//!     MediaSource::new("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
//!     "output",
//!     JobPlan::Mp3,
//! );
//! let path = pipeline.run(&job).await?;
//! println!("Saved to {}", path.display());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod extractor;
pub mod manifest;
pub mod model;
pub mod naming;
pub mod pipeline;
pub mod platform;
pub mod progress;
pub mod selector;
pub mod transcoder;
pub mod ui;
pub mod validator;
pub mod worker;

pub use config::{Config, Tools};
pub use error::{Error, Result};
pub use extractor::{Extractor, YtDlp};
pub use model::{DownloadJob, JobPlan, MediaInfo, MediaSource, OutputKind, StreamDescriptor, StreamKind};
pub use pipeline::{Pipeline, PlaylistKind, predicted_output};
pub use progress::{Event, Outcome, Reporter};
pub use transcoder::{Ffmpeg, Transcoder};
pub use validator::LinkStatus;
