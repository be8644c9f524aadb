/*!
 * Error types for the voicemation application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised by the subtitle timeline components
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    /// A timestamp did not match `H+:MM:SS,mmm`
    #[error("Malformed timestamp: '{0}'")]
    MalformedTimestamp(String),

    /// Segmentation was asked to split text with no characters in it
    #[error("Narration text is empty, nothing to segment")]
    EmptyNarrationText,

    /// Segmentation needs a finite, positive narration duration
    #[error("Invalid narration duration: {0}")]
    InvalidDuration(f64),
}

/// Errors that can occur when invoking an external tool (ffmpeg, ffprobe, manim, TTS)
#[derive(Error, Debug)]
pub enum ToolError {
    /// The process could not be started at all
    #[error("Failed to start {tool}: {message}")]
    Spawn {
        /// Binary that was invoked
        tool: String,
        /// Underlying OS error
        message: String,
    },

    /// The process ran but exited unsuccessfully
    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        /// Binary that was invoked
        tool: String,
        /// Exit status description
        status: String,
        /// Filtered stderr output
        stderr: String,
    },

    /// The process did not finish in time
    #[error("{tool} timed out after {secs} seconds")]
    Timeout {
        /// Binary that was invoked
        tool: String,
        /// Timeout that elapsed
        secs: u64,
    },

    /// The process reported success but its expected output is missing
    #[error("{tool} produced no output at {path}")]
    OutputMissing {
        /// Binary that was invoked
        tool: String,
        /// Expected output location
        path: String,
    },

    /// A media duration could not be measured
    #[error("Duration unavailable for {0}")]
    MeasurementUnavailable(String),

    /// Filesystem error while preparing tool inputs
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that abort a whole pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The script contained no renderable scenes
    #[error("No scenes to process")]
    NoScenes,

    /// Every scene failed before producing a merged video
    #[error("No scenes were rendered successfully")]
    NoScenesRendered,

    /// Error from an external tool
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the timeline components
    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),

    /// Error from an external tool
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Error from the pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
