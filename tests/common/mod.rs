/*!
 * Common test utilities for the voicemation test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use voicemation::timeline::{SubtitleInterval, Timeline};

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    let content = r#"1
00:00:00,000 --> 00:00:02,500
This is a test subtitle.

2
00:00:02,500 --> 00:00:05,000
It contains multiple entries.

3
00:00:05,000 --> 00:00:07,250
For testing purposes.
"#;
    create_test_file(dir, filename, content)
}

/// Build a timeline from `(start, end, text)` triples
pub fn timeline(intervals: &[(f64, f64, &str)]) -> Timeline {
    intervals
        .iter()
        .map(|(start, end, text)| SubtitleInterval::new(*start, *end, *text))
        .collect()
}

/// Route log output through env_logger, once per test binary
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Assert two floats match to the millisecond
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 0.001,
        "expected {} to be within 1ms of {}",
        actual,
        expected
    );
}
