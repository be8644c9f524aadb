use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Directory receiving final videos and their subtitles
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Keep per-run intermediate files instead of deleting them
    #[serde(default)]
    pub keep_work_dir: bool,

    /// Media tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Voiceover synthesis settings
    #[serde(default)]
    pub narration: NarrationConfig,

    /// Animation rendering settings
    #[serde(default)]
    pub rendering: RenderConfig,

    /// Subtitle timing settings
    #[serde(default)]
    pub subtitles: SubtitleConfig,
}

/// ffmpeg / ffprobe configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolsConfig {
    /// ffmpeg binary name or path
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,

    /// ffprobe binary name or path
    #[serde(default = "default_ffprobe")]
    pub ffprobe: String,

    /// Timeout for a single duration measurement
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Timeout for muxing or concatenation
    #[serde(default = "default_ffmpeg_timeout_secs")]
    pub ffmpeg_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
            probe_timeout_secs: default_probe_timeout_secs(),
            ffmpeg_timeout_secs: default_ffmpeg_timeout_secs(),
        }
    }
}

/// Text-to-speech command configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NarrationConfig {
    /// Command line template; `{text_file}` and `{output}` are substituted
    #[serde(default = "default_narration_command")]
    pub command: Vec<String>,

    /// Extension of the audio files the command writes
    #[serde(default = "default_audio_extension")]
    pub audio_extension: String,

    /// Timeout for one synthesis
    #[serde(default = "default_narration_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            command: default_narration_command(),
            audio_extension: default_audio_extension(),
            timeout_secs: default_narration_timeout_secs(),
        }
    }
}

/// Manim rendering configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RenderConfig {
    /// manim binary name or path
    #[serde(default = "default_manim")]
    pub manim: String,

    /// Quality letter passed as `-q<quality>` (l, m, h, p, k)
    #[serde(default = "default_quality")]
    pub quality: String,

    /// Timeout for rendering one scene
    #[serde(default = "default_render_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            manim: default_manim(),
            quality: default_quality(),
            timeout_secs: default_render_timeout_secs(),
        }
    }
}

/// Subtitle timing configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubtitleConfig {
    /// Drift (seconds) between subtitles and final video below which no rescaling happens
    #[serde(default = "default_rescale_tolerance_secs")]
    pub rescale_tolerance_secs: f64,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            rescale_tolerance_secs: default_rescale_tolerance_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output_videos")
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

fn default_probe_timeout_secs() -> u64 {
    30
}

fn default_ffmpeg_timeout_secs() -> u64 {
    600
}

fn default_narration_command() -> Vec<String> {
    // gTTS command line client
    ["gtts-cli", "--file", "{text_file}", "--output", "{output}"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_audio_extension() -> String {
    "mp3".to_string()
}

fn default_narration_timeout_secs() -> u64 {
    120
}

fn default_manim() -> String {
    "manim".to_string()
}

fn default_quality() -> String {
    "l".to_string()
}

fn default_render_timeout_secs() -> u64 {
    180
}

fn default_rescale_tolerance_secs() -> f64 {
    crate::timeline::RESCALE_TOLERANCE_SECS
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: LogLevel::default(),
            output_dir: default_output_dir(),
            keep_work_dir: false,
            tools: ToolsConfig::default(),
            narration: NarrationConfig::default(),
            rendering: RenderConfig::default(),
            subtitles: SubtitleConfig::default(),
        }
    }
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.tools.ffmpeg.trim().is_empty() {
            return Err(anyhow!("ffmpeg binary must not be empty"));
        }
        if self.tools.ffprobe.trim().is_empty() {
            return Err(anyhow!("ffprobe binary must not be empty"));
        }
        if self.rendering.manim.trim().is_empty() {
            return Err(anyhow!("manim binary must not be empty"));
        }

        match self.narration.command.first() {
            Some(program) if !program.trim().is_empty() => {}
            _ => return Err(anyhow!("Narration command must name a program")),
        }
        if !self.narration.command.iter().any(|arg| arg.contains("{output}")) {
            return Err(anyhow!("Narration command must contain an {{output}} placeholder"));
        }

        if !matches!(self.rendering.quality.as_str(), "l" | "m" | "h" | "p" | "k") {
            return Err(anyhow!("Invalid render quality: {}", self.rendering.quality));
        }

        let timeouts = [
            ("tools.probe_timeout_secs", self.tools.probe_timeout_secs),
            ("tools.ffmpeg_timeout_secs", self.tools.ffmpeg_timeout_secs),
            ("narration.timeout_secs", self.narration.timeout_secs),
            ("rendering.timeout_secs", self.rendering.timeout_secs),
        ];
        for (name, value) in timeouts {
            if value == 0 {
                return Err(anyhow!("{} must be greater than zero", name));
            }
        }

        let tolerance = self.subtitles.rescale_tolerance_secs;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(anyhow!("Invalid rescale tolerance: {}", tolerance));
        }

        Ok(())
    }

    /// Load the configuration file, writing a default one if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }
}
