/*!
 * External collaborators of the pipeline.
 *
 * Each concern sits behind an async trait so the pipeline can run against real
 * command-line tools or against the in-process mocks:
 * - `MediaProbe`: duration measurement (`ffprobe`)
 * - `VideoAssembler`: audio/video muxing and scene concatenation (`ffmpeg`)
 * - `Narrator`: text-to-speech (configurable command)
 * - `SceneRenderer`: animation rendering (`manim`)
 */

use async_trait::async_trait;
use log::{debug, error, warn};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

use crate::errors::ToolError;

pub mod ffmpeg;
pub mod manim;
pub mod mock;
pub mod narrator;

pub use ffmpeg::{Ffmpeg, Ffprobe};
pub use manim::ManimRenderer;
pub use narrator::CommandNarrator;

/// Measures media durations
#[async_trait]
pub trait MediaProbe: Send + Sync + Debug {
    /// Duration of the media file in seconds
    async fn duration(&self, path: &Path) -> Result<f64, ToolError>;
}

/// Combines audio and video streams into deliverable files
#[async_trait]
pub trait VideoAssembler: Send + Sync + Debug {
    /// Loop `video` under `audio`, cut to `duration` seconds, write to `output`
    async fn mux_voiceover(
        &self,
        video: &Path,
        audio: &Path,
        duration: f64,
        output: &Path,
    ) -> Result<PathBuf, ToolError>;

    /// Join `videos` in order into `output`
    async fn concatenate(&self, videos: &[PathBuf], output: &Path) -> Result<PathBuf, ToolError>;
}

/// Produces spoken narration audio
#[async_trait]
pub trait Narrator: Send + Sync + Debug {
    /// Synthesize `text` into an audio file at `output`
    async fn synthesize(&self, text: &str, output: &Path) -> Result<PathBuf, ToolError>;

    /// File extension of the audio this narrator writes
    fn audio_extension(&self) -> &str {
        "mp3"
    }
}

/// Renders one animation scene to a video file
#[async_trait]
pub trait SceneRenderer: Send + Sync + Debug {
    /// Render `class_name` from the script at `script`, using `work_dir` for output
    async fn render(&self, script: &Path, class_name: &str, work_dir: &Path) -> Result<PathBuf, ToolError>;
}

/// Measure a duration, treating any failure or non-positive value as unavailable
pub async fn probe_duration(probe: &dyn MediaProbe, path: &Path) -> Option<f64> {
    match probe.duration(path).await {
        Ok(duration) if duration.is_finite() && duration > 0.0 => Some(duration),
        Ok(duration) => {
            warn!("Ignoring unusable duration {} for {}", duration, path.display());
            None
        }
        Err(e) => {
            warn!("Could not measure {}: {}", path.display(), e);
            None
        }
    }
}

/// Run a tool to completion under a timeout, failing on a non-zero exit
pub(crate) async fn run_tool(program: &str, args: &[String], timeout_secs: u64) -> Result<Output, ToolError> {
    debug!("Running {} {}", program, args.join(" "));

    let future = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output();

    let output = tokio::select! {
        result = future => {
            result.map_err(|e| ToolError::Spawn {
                tool: program.to_string(),
                message: e.to_string(),
            })?
        },
        _ = tokio::time::sleep(Duration::from_secs(timeout_secs)) => {
            return Err(ToolError::Timeout {
                tool: program.to_string(),
                secs: timeout_secs,
            });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let filtered = filter_tool_stderr(&stderr);
        error!("{} failed: {}", program, filtered);
        return Err(ToolError::Failed {
            tool: program.to_string(),
            status: output.status.to_string(),
            stderr: filtered,
        });
    }

    Ok(output)
}

/// Strip the ffmpeg version banner, build configuration and stream listing,
/// keeping only lines that say something about the failure
pub(crate) fn filter_tool_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "ffprobe version",
        "built with",
        "configuration:",
        "libav",
        "libsw",
        "libpostproc",
        "Input #",
        "Metadata:",
        "Duration:",
        "Stream #",
        "handler_name",
        "major_brand",
        "minor_version",
        "compatible_brands",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "no diagnostic output".to_string()
    } else {
        // The tail carries the actual error
        let skip = meaningful.len().saturating_sub(10);
        meaningful[skip..].join("\n")
    }
}
