use clap::Parser;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use log::{LevelFilter, debug, error, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use tubesave::model::MediaInfo;
use tubesave::ui::{self, UiState};
use tubesave::{
    Config, DownloadJob, Event, Extractor, Ffmpeg, JobPlan, LinkStatus, MediaSource, Outcome,
    Pipeline, PlaylistKind, Reporter, YtDlp, platform, predicted_output, selector, validator,
    worker,
};

const DEFAULT_OUTPUT_DIR: &str = "./output";

type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser, Clone)]
#[command(version, about)]
pub struct Cli {
    /// Link to a video or a playlist.
    pub url: String,

    #[arg(
        long = "kind",
        short,
        default_value = "mp3",
        value_parser = clap::builder::PossibleValuesParser::new(["mp3", "raw", "video"])
    )]
    pub kind: String,

    /// Resolution label for video downloads, e.g. `720p`. Defaults to the highest.
    #[arg(long = "resolution", short)]
    pub resolution: Option<String>,

    /// Print the available resolutions and exit.
    #[arg(long = "list-resolutions", action = clap::ArgAction::SetTrue)]
    pub list_resolutions: bool,

    /// Treat the link as a playlist even if it does not look like one.
    #[arg(long = "playlist", short, action = clap::ArgAction::SetTrue)]
    pub playlist: bool,

    #[arg(long = "output-dir", short)]
    pub output_dir: Option<PathBuf>,

    /// Replace an existing output file without asking.
    #[arg(long = "overwrite", short = 'y', action = clap::ArgAction::SetTrue)]
    pub overwrite: bool,

    /// Open the file manager at the result once done.
    #[arg(long = "reveal", action = clap::ArgAction::SetTrue)]
    pub reveal: bool,

    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    #[arg(long = "tools-dir")]
    pub tools_dir: Option<PathBuf>,

    #[arg(long = "ffmpeg")]
    pub ffmpeg: Option<PathBuf>,

    #[arg(long = "yt-dlp")]
    pub yt_dlp: Option<PathBuf>,

    /// Extra argument for yt-dlp, may be repeated.
    #[arg(long = "extractor-arg", allow_hyphen_values = true)]
    pub extractor_args: Vec<String>,

    #[arg(
        long = "verbosity",
        short,
        default_value = "info",
        value_parser = clap::builder::PossibleValuesParser::new([
            "info", "debug", "error", "none", "full"
        ])
    )]
    pub verbosity: String,
}

impl Cli {
    fn overrides(&self) -> Config {
        Config {
            tools_dir: self.tools_dir.clone(),
            ffmpeg: self.ffmpeg.clone(),
            yt_dlp: self.yt_dlp.clone(),
            output_dir: self.output_dir.clone(),
            extractor_args: self.extractor_args.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let args = Cli::parse();
    let multi = MultiProgress::new();
    init_logger(&args.verbosity, multi.clone())?;

    let config = load_config(&args).layered(args.overrides());
    let tools = config.tools();
    debug!("Running on {}", platform::Platform::detect());
    debug!("Using yt-dlp at {}", tools.yt_dlp.display());
    debug!("Using ffmpeg at {}", tools.ffmpeg.display());

    let output_dir = config
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    check_output_dir(&output_dir)?;

    let extractor = YtDlp::new(tools.yt_dlp.clone()).with_args(config.extractor_args.clone());
    let transcoder = Ffmpeg::new(tools.ffmpeg.clone());
    let source = MediaSource::new(&args.url);

    let (reporter, mut receiver) = Reporter::channel();
    let handle = if args.playlist || validator::looks_like_playlist(source.url()) {
        let fetched = extractor.fetch_playlist(&source).await;
        reject_invalid(LinkStatus::of(&fetched), source.url())?;
        let playlist = fetched?;

        let kind = playlist_kind(&args.kind);
        info!("Downloading playlist \"{}\" as {}", playlist.title, kind);
        worker::spawn(reporter.clone(), move || async move {
            let pipeline = Pipeline::new(extractor, transcoder, reporter);
            pipeline.download_playlist(&playlist, &output_dir, kind).await
        })?
    } else {
        let fetched = extractor.fetch_info(&source).await;
        reject_invalid(LinkStatus::of(&fetched), source.url())?;
        let info = fetched?;
        info!("Found \"{}\"", info.title);

        if args.list_resolutions {
            print_resolutions(&info);
            return Ok(());
        }

        let plan = plan_for(&args, &info)?;
        if let Some(existing) = predicted_output(&plan, &info, &output_dir) {
            if existing.exists() && !args.overwrite && !confirm_overwrite(&existing)? {
                info!("Keeping the existing {}", existing.display());
                return Ok(());
            }
        }

        info!("Saving as {}", plan.output_kind());
        let job = DownloadJob::new(source, output_dir, plan);
        worker::spawn(reporter.clone(), move || async move {
            let pipeline = Pipeline::new(extractor, transcoder, reporter);
            pipeline.run(&job).await
        })?
    };

    let bar = multi.add(ProgressBar::new(100));
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos:>3}%")?
            .progress_chars("#>-"),
    );
    let mut state = UiState::new("Downloading");
    bar.set_message(state.title.clone());

    let outcome = ui::run_event_loop(&mut receiver, &mut state, |state, event| match event {
        Event::Progress(p) => bar.set_position(u64::from(*p)),
        Event::Log(line) => info!("{}", line),
        Event::Finished(_) => {
            bar.set_position(u64::from(state.percentage));
            bar.finish_with_message(state.title.clone());
        }
    })
    .await;

    let joined = tokio::task::spawn_blocking(move || handle.join())
        .await?
        .map_err(|_| "The download worker panicked")?;
    multi.remove(&bar);

    match outcome.unwrap_or(joined) {
        Outcome::Completed(path) => {
            if args.reveal {
                if let Err(e) = platform::open_file_location(&path).await {
                    warn!("Could not open the file location: {}", e);
                }
            }
            Ok(())
        }
        Outcome::Failed(reason) => Err(reason.into()),
    }
}

fn init_logger(verbosity: &str, multi: MultiProgress) -> CliResult<()> {
    let level = match verbosity {
        "debug" => LevelFilter::Debug,
        "error" => LevelFilter::Error,
        "none" => LevelFilter::Off,
        "full" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level.min(LevelFilter::Warn))
        .filter_module("tubesave", level);
    if verbosity != "full" {
        builder.format_timestamp(None).format_target(false);
    }
    let logger = builder.build();
    let max_level = logger.filter();

    LogWrapper::new(multi, logger).try_init()?;
    log::set_max_level(max_level);
    Ok(())
}

fn load_config(args: &Cli) -> Config {
    let Some(path) = args.config.clone().or_else(Config::default_path) else {
        return Config::default();
    };
    match Config::load(&path) {
        Ok(config) => config,
        Err(e) => {
            error!("Malformed config file: {}", e);
            info!("Ignoring the config file and continuing with defaults.");
            Config::default()
        }
    }
}

fn check_output_dir(dir: &Path) -> CliResult<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(format!("{} is not a folder", dir.display()).into());
    }
    std::fs::create_dir_all(dir)?;
    Ok(())
}

fn reject_invalid(status: LinkStatus, url: &str) -> CliResult<()> {
    match status {
        LinkStatus::Valid => Ok(()),
        LinkStatus::InvalidRegex => {
            Err(format!("Invalid link: {} does not look like a link", url).into())
        }
        LinkStatus::InvalidFailed => {
            Err(format!("Invalid link: could not load {}", url).into())
        }
    }
}

fn playlist_kind(kind: &str) -> PlaylistKind {
    match kind {
        "raw" => PlaylistKind::RawAudio,
        "video" => PlaylistKind::Video,
        _ => PlaylistKind::Mp3,
    }
}

fn plan_for(args: &Cli, info: &MediaInfo) -> CliResult<JobPlan> {
    match args.kind.as_str() {
        "raw" => Ok(JobPlan::RawAudio),
        "video" => {
            let available = selector::resolutions(&info.streams);
            let chosen = match &args.resolution {
                Some(wanted) => available.into_iter().find(|(label, _)| label == wanted),
                None => available.into_iter().next(),
            };
            let (resolution, stream) = chosen.ok_or_else(|| match &args.resolution {
                Some(wanted) => format!(
                    "No {} stream for this video, see --list-resolutions",
                    wanted
                ),
                None => "No video stream available for this video".to_string(),
            })?;
            Ok(JobPlan::Muxed { stream, resolution })
        }
        _ => Ok(JobPlan::Mp3),
    }
}

fn print_resolutions(info: &MediaInfo) {
    let available = selector::resolutions(&info.streams);
    if available.is_empty() {
        println!("No video resolutions available for \"{}\"", info.title);
        return;
    }
    println!("Resolutions for \"{}\":", info.title);
    for (label, stream) in available {
        println!("  {:>6}  {}", label, stream);
    }
}

fn confirm_overwrite(path: &Path) -> CliResult<bool> {
    let mut answer = String::new();
    loop {
        print!("{} already exists. Overwrite? [y/N] ", path.display());
        std::io::stdout().flush()?;
        answer.clear();
        std::io::stdin().read_line(&mut answer)?;
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "" | "n" | "no" => return Ok(false),
            _ => println!("Please answer y or n."),
        }
    }
}
