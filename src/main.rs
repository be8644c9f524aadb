// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{ArgGroup, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use voicemation::app_config::{self, Config};
use voicemation::file_utils::FileManager;
use voicemation::script::{estimate_duration, scenes_from_response, ScenePlan};
use voicemation::timeline::{self, SceneTimeline, Timeline};
use voicemation::tools::{probe_duration, Ffprobe, MediaProbe};
use voicemation::{AppError, Pipeline};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Where a scene's offset comes from in `merge`
#[derive(Debug, Clone)]
enum SceneLength {
    Seconds(f64),
    Media(PathBuf),
}

/// `<srt>[=<media|seconds>]`
#[derive(Debug, Clone)]
struct SceneArg {
    srt: PathBuf,
    length: Option<SceneLength>,
}

fn parse_scene_arg(value: &str) -> Result<SceneArg, String> {
    let (srt, length) = match value.rsplit_once('=') {
        Some((srt, rest)) if !rest.is_empty() => {
            let length = match rest.parse::<f64>() {
                Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => SceneLength::Seconds(seconds),
                Ok(seconds) => return Err(format!("invalid scene duration: {}", seconds)),
                Err(_) => SceneLength::Media(PathBuf::from(rest)),
            };
            (srt, Some(length))
        }
        Some((srt, _)) => (srt, None),
        None => (value, None),
    };

    if srt.is_empty() {
        return Err("scene subtitle path is empty".to_string());
    }
    Ok(SceneArg {
        srt: PathBuf::from(srt),
        length,
    })
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split narration into a timed subtitle document
    Segment(SegmentArgs),

    /// Parse a subtitle document and print it as JSON
    Parse {
        /// Subtitle document to read
        #[arg(value_name = "SRT_FILE")]
        input: PathBuf,
    },

    /// Merge per-scene subtitle documents into one timeline
    Merge(MergeArgs),

    /// Rescale a JSON timeline to a video duration
    Rescale(RescaleArgs),

    /// Estimate the video length and scene count for a topic
    Plan {
        /// Spoken topic
        #[arg(required = true, num_args = 1..)]
        topic: Vec<String>,
    },

    /// Render a narrated video from a saved model response
    Generate(GenerateArgs),

    /// Generate shell completions for voicemation
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("narration").required(true).args(["text", "text_file"])))]
#[command(group(ArgGroup::new("length").required(true).args(["duration", "audio"])))]
struct SegmentArgs {
    /// Narration text
    #[arg(short, long)]
    text: Option<String>,

    /// File holding the narration text
    #[arg(long)]
    text_file: Option<PathBuf>,

    /// Narration duration in seconds
    #[arg(short, long)]
    duration: Option<f64>,

    /// Voiceover file to measure the duration from
    #[arg(short, long)]
    audio: Option<PathBuf>,

    /// Write the document here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct MergeArgs {
    /// Scene as SRT[=MEDIA|=SECONDS], in playback order
    #[arg(short, long = "scene", required = true, value_parser = parse_scene_arg)]
    scenes: Vec<SceneArg>,

    /// Final video to rescale the merged timeline to
    #[arg(long, conflicts_with = "final_duration")]
    final_video: Option<PathBuf>,

    /// Final duration in seconds to rescale the merged timeline to
    #[arg(long)]
    final_duration: Option<f64>,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["duration", "video"])))]
struct RescaleArgs {
    /// JSON timeline to rescale
    #[arg(value_name = "TIMELINE_JSON")]
    input: PathBuf,

    /// Actual video duration in seconds
    #[arg(short, long)]
    duration: Option<f64>,

    /// Video to measure the actual duration from
    #[arg(short, long)]
    video: Option<PathBuf>,

    /// Drift in seconds below which nothing changes
    #[arg(long)]
    tolerance: Option<f64>,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Saved model response with narration and scene code blocks
    #[arg(short, long)]
    response: PathBuf,

    /// Directory for the final video
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

/// Voicemation - narrated animation videos with aligned subtitles
#[derive(Parser, Debug)]
#[command(name = "voicemation")]
#[command(version)]
#[command(about = "Narrated animation videos with time-aligned subtitles")]
#[command(long_about = "Voicemation renders the scenes of a model-written script, narrates them, \
and builds one subtitle timeline aligned to the final video.

EXAMPLES:
    voicemation segment -t \"Hello world. This is a test.\" -d 10
    voicemation parse scene_1.srt
    voicemation merge -s scene_1.srt=scene_1.mp4 -s scene_2.srt=3.5 --final-video final.mp4
    voicemation rescale subtitles.json --duration 12.0
    voicemation plan explain quicksort
    voicemation generate --response answer.md
    voicemation completions bash > voicemation.bash

CONFIGURATION:
    Tool settings are stored in conf.json by default. A default file is created
    on first use by commands that call external tools.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // Filtering is left to log::max_level so it can change after startup
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Tag and ANSI color for level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "1;31"),
            Level::Warn => ("WARN ", "1;33"),
            Level::Info => ("INFO ", "1;32"),
            Level::Debug => ("DEBUG", "1;36"),
            Level::Trace => ("TRACE", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (tag, color) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();
    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    match &cli.command {
        Commands::Segment(args) => run_segment(&cli, args).await,
        Commands::Parse { input } => run_parse(input),
        Commands::Merge(args) => run_merge(&cli, args).await,
        Commands::Rescale(args) => run_rescale(&cli, args).await,
        Commands::Plan { topic } => run_plan(&topic.join(" ")),
        Commands::Generate(args) => run_generate(&cli, args).await,
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(*shell, &mut cmd, "voicemation", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load and validate the configuration, applying the config log level
/// unless one was given on the command line
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&cli.config_path)?;
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone().into();
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }
    config
        .validate()
        .map_err(|e| AppError::Config(format!("{:#}", e)))?;
    Ok(config)
}

fn probe_from(cli: &CommandLineOptions) -> Result<Ffprobe> {
    Ok(Ffprobe::from_config(&load_config(cli)?.tools))
}

/// Print to stdout or write to `output`
fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            FileManager::write_to_file(path, content)?;
            info!("Wrote {}", path.display());
            Ok(())
        }
        None => {
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}

async fn measure(probe: &dyn MediaProbe, path: &Path) -> Result<f64> {
    probe_duration(probe, path)
        .await
        .ok_or_else(|| anyhow!("Could not measure the duration of {}", path.display()))
}

async fn run_segment(cli: &CommandLineOptions, args: &SegmentArgs) -> Result<()> {
    let text = match (&args.text, &args.text_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => FileManager::read_to_string(path)?,
        (None, None) => return Err(anyhow!("Narration text is required")),
    };

    let duration = match (args.duration, &args.audio) {
        (Some(duration), _) => duration,
        (None, Some(audio)) => measure(&probe_from(cli)?, audio).await?,
        (None, None) => return Err(anyhow!("A duration or audio file is required")),
    };

    let timeline = timeline::segment(&text, duration)?;
    emit(&timeline::render(&timeline), args.output.as_deref())
}

fn run_parse(input: &Path) -> Result<()> {
    let timeline = timeline::read_srt_file(input)?;
    if timeline.is_empty() {
        warn!("No subtitle blocks found in {}", input.display());
    }
    emit(&serde_json::to_string_pretty(&timeline)?, None)
}

async fn run_merge(cli: &CommandLineOptions, args: &MergeArgs) -> Result<()> {
    let needs_probe = args.final_video.is_some()
        || args
            .scenes
            .iter()
            .any(|scene| matches!(scene.length, Some(SceneLength::Media(_))));
    let probe = if needs_probe { Some(probe_from(cli)?) } else { None };

    let mut scenes = Vec::with_capacity(args.scenes.len());
    for scene in &args.scenes {
        let timeline = if FileManager::file_exists(&scene.srt) {
            Some(timeline::read_srt_file(&scene.srt)?)
        } else {
            warn!("Subtitle file {} not found, scene contributes no subtitles", scene.srt.display());
            None
        };

        let media_duration = match (&scene.length, &probe) {
            (Some(SceneLength::Seconds(seconds)), _) => Some(*seconds),
            (Some(SceneLength::Media(media)), Some(probe)) => probe_duration(probe, media).await,
            _ => None,
        };
        scenes.push(SceneTimeline::new(timeline, media_duration));
    }

    let merged = timeline::merge(&scenes);
    let final_duration = match (args.final_duration, &args.final_video, &probe) {
        (Some(duration), _, _) => Some(duration),
        (None, Some(video), Some(probe)) => probe_duration(probe, video).await,
        _ => None,
    };
    let result = match final_duration {
        Some(duration) => timeline::rescale(&merged, duration),
        None => merged,
    };

    emit(&serde_json::to_string_pretty(&result)?, args.output.as_deref())
}

async fn run_rescale(cli: &CommandLineOptions, args: &RescaleArgs) -> Result<()> {
    let content = FileManager::read_to_string(&args.input)?;
    let timeline: Timeline = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse timeline JSON: {}", args.input.display()))?;

    let duration = match (args.duration, &args.video) {
        (Some(duration), _) => duration,
        (None, Some(video)) => measure(&probe_from(cli)?, video).await?,
        (None, None) => return Err(anyhow!("A duration or video file is required")),
    };

    let tolerance = args.tolerance.unwrap_or(timeline::RESCALE_TOLERANCE_SECS);
    let result = timeline::rescale_with_tolerance(&timeline, duration, tolerance);
    emit(&serde_json::to_string_pretty(&result)?, args.output.as_deref())
}

fn run_plan(topic: &str) -> Result<()> {
    let plan = ScenePlan::for_duration(estimate_duration(topic));
    emit(&serde_json::to_string_pretty(&plan)?, None)
}

async fn run_generate(cli: &CommandLineOptions, args: &GenerateArgs) -> Result<()> {
    let mut config = load_config(cli)?;
    if let Some(output_dir) = &args.output_dir {
        config.output_dir = output_dir.clone();
    }

    let response = FileManager::read_to_string(&args.response)?;
    let scenes = scenes_from_response(&response);
    if scenes.is_empty() {
        return Err(anyhow!("No animation code found in {}", args.response.display()));
    }
    info!("Found {} scenes in {}", scenes.len(), args.response.display());

    let progress = ProgressBar::new(scenes.len() as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} scenes ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style);

    let pipeline = Pipeline::from_config(&config).with_progress(progress.clone());
    let output = pipeline.run(&scenes).await;
    progress.finish_and_clear();

    let output = output?;
    emit(&serde_json::to_string_pretty(&output)?, None)
}
