/*!
 * Mock collaborators for testing.
 *
 * The mocks never spawn processes. Every "media" file they write is a tiny text
 * file holding `duration=<seconds>`, which `MockProbe` reads back, so a whole
 * pipeline run can be checked for timing behavior:
 * - `MockNarrator` - audio length proportional to the narration length
 * - `MockRenderer` - fixed-length scene videos, optional failures per class
 * - `MockAssembler` - muxing with encoder padding, concatenation with drift
 * - `MockProbe` - reads mock media, with per-path overrides and outages
 */

use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ToolError;
use crate::tools::{MediaProbe, Narrator, SceneRenderer, VideoAssembler};

/// Write a mock media file of the given duration
pub fn write_mock_media(path: &Path, duration: f64) -> Result<(), ToolError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format!("duration={}", duration))?;
    Ok(())
}

/// Duration stored in a mock media file
pub fn read_mock_media(path: &Path) -> Option<f64> {
    fs::read_to_string(path)
        .ok()?
        .trim()
        .strip_prefix("duration=")?
        .parse()
        .ok()
}

fn mock_failure(tool: &str, reason: &str) -> ToolError {
    ToolError::Failed {
        tool: tool.to_string(),
        status: "exit status: 1".to_string(),
        stderr: reason.to_string(),
    }
}

// @struct: Narrator producing audio of `seconds_per_char * chars` seconds
#[derive(Debug, Clone)]
pub struct MockNarrator {
    seconds_per_char: f64,
    fail_when_contains: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl MockNarrator {
    pub fn new(seconds_per_char: f64) -> Self {
        MockNarrator {
            seconds_per_char,
            fail_when_contains: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail synthesis for any text containing `pattern`
    pub fn failing_on(mut self, pattern: &str) -> Self {
        self.fail_when_contains = Some(pattern.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockNarrator {
    fn default() -> Self {
        Self::new(0.05)
    }
}

#[async_trait]
impl Narrator for MockNarrator {
    async fn synthesize(&self, text: &str, output: &Path) -> Result<PathBuf, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(pattern) = &self.fail_when_contains {
            if text.contains(pattern.as_str()) {
                return Err(mock_failure("mock-tts", "synthesis refused"));
            }
        }

        let duration = text.trim().chars().count() as f64 * self.seconds_per_char;
        write_mock_media(output, duration)?;
        Ok(output.to_path_buf())
    }
}

// @struct: Renderer producing fixed-length videos
#[derive(Debug, Clone)]
pub struct MockRenderer {
    duration: f64,
    failing_classes: Vec<String>,
    calls: Arc<AtomicUsize>,
}

impl MockRenderer {
    pub fn new(duration: f64) -> Self {
        MockRenderer {
            duration,
            failing_classes: Vec::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail rendering of the given scene class
    pub fn failing_for(mut self, class_name: &str) -> Self {
        self.failing_classes.push(class_name.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SceneRenderer for MockRenderer {
    async fn render(&self, script: &Path, class_name: &str, work_dir: &Path) -> Result<PathBuf, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !script.exists() {
            return Err(ToolError::OutputMissing {
                tool: "mock-render".to_string(),
                path: script.display().to_string(),
            });
        }
        if self.failing_classes.iter().any(|c| c == class_name) {
            return Err(mock_failure("mock-render", "scene raised an exception"));
        }

        let video = work_dir.join("media").join(format!("{}.mp4", class_name));
        write_mock_media(&video, self.duration)?;
        Ok(video)
    }
}

// @struct: Assembler simulating encoder padding and concatenation drift
#[derive(Debug, Clone, Default)]
pub struct MockAssembler {
    /// Seconds added to every muxed scene
    pub mux_padding: f64,
    /// Seconds added to the concatenated result
    pub concat_drift: f64,
}

impl MockAssembler {
    pub fn new(mux_padding: f64, concat_drift: f64) -> Self {
        MockAssembler {
            mux_padding,
            concat_drift,
        }
    }
}

#[async_trait]
impl VideoAssembler for MockAssembler {
    async fn mux_voiceover(
        &self,
        video: &Path,
        audio: &Path,
        duration: f64,
        output: &Path,
    ) -> Result<PathBuf, ToolError> {
        if !video.exists() || !audio.exists() {
            return Err(mock_failure("mock-ffmpeg", "missing input"));
        }
        write_mock_media(output, duration + self.mux_padding)?;
        Ok(output.to_path_buf())
    }

    async fn concatenate(&self, videos: &[PathBuf], output: &Path) -> Result<PathBuf, ToolError> {
        if videos.is_empty() {
            return Err(mock_failure("mock-ffmpeg", "nothing to concatenate"));
        }
        let total: f64 = videos
            .iter()
            .map(|v| read_mock_media(v).unwrap_or(0.0))
            .sum();
        write_mock_media(output, total + self.concat_drift)?;
        Ok(output.to_path_buf())
    }
}

// @struct: Probe reading mock media files
#[derive(Debug, Clone, Default)]
pub struct MockProbe {
    overrides: HashMap<String, f64>,
    unavailable: Vec<String>,
}

impl MockProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `duration` for the exact path `path`
    pub fn with_duration(mut self, path: &str, duration: f64) -> Self {
        self.overrides.insert(path.to_string(), duration);
        self
    }

    /// Fail measurement for every path containing `pattern`
    pub fn unavailable_for(mut self, pattern: &str) -> Self {
        self.unavailable.push(pattern.to_string());
        self
    }
}

#[async_trait]
impl MediaProbe for MockProbe {
    async fn duration(&self, path: &Path) -> Result<f64, ToolError> {
        let key = path.to_string_lossy().to_string();

        if self.unavailable.iter().any(|p| key.contains(p.as_str())) {
            return Err(ToolError::MeasurementUnavailable(key));
        }
        if let Some(duration) = self.overrides.get(&key) {
            return Ok(*duration);
        }
        read_mock_media(path).ok_or(ToolError::MeasurementUnavailable(key))
    }
}
