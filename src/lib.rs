/*!
 * # Voicemation - narrated animation videos from a spoken request
 *
 * A Rust library that turns a language-model scene script into a narrated
 * animation with subtitles aligned to the final video.
 *
 * ## Features
 *
 * - Proportional subtitle timing from narration text and voiceover length
 * - SubRip timeline rendering and forgiving parsing
 * - Per-scene timelines merged on measured scene durations
 * - Linear correction of the merged timeline to the final video length
 * - Scene extraction from model responses
 * - External tool orchestration (TTS, manim, ffmpeg, ffprobe)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `timeline`: Subtitle timing core:
 *   - `timeline::timecode`: `HH:MM:SS,mmm` codec
 *   - `timeline::segmenter`: Narration to timeline
 *   - `timeline::srt`: Timeline documents
 *   - `timeline::merger`: Per-scene offset merging
 *   - `timeline::rescaler`: Final duration correction
 * - `script`: Scene scripts from model responses
 * - `tools`: External collaborators and their mocks
 * - `pipeline`: Scene-by-scene orchestration
 * - `app_config`: Configuration management
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod file_utils;
pub mod pipeline;
pub mod script;
pub mod timeline;
pub mod tools;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, PipelineError, TimelineError, ToolError};
pub use pipeline::{Pipeline, PipelineOutput, SceneRenderResult};
pub use script::{scenes_from_response, SceneScript};
pub use timeline::{SceneTimeline, SubtitleInterval, Timeline};
