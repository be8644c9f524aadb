/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use std::path::PathBuf;
use voicemation::app_config::{Config, LogLevel};

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.output_dir, PathBuf::from("output_videos"));
    assert!(!config.keep_work_dir);
    assert_eq!(config.tools.ffmpeg, "ffmpeg");
    assert_eq!(config.tools.ffprobe, "ffprobe");
    assert_eq!(config.rendering.manim, "manim");
    assert_eq!(config.rendering.quality, "l");
    assert_eq!(config.narration.audio_extension, "mp3");
    assert_eq!(config.subtitles.rescale_tolerance_secs, 1.0);
    assert!(config.narration.command.iter().any(|arg| arg == "{output}"));
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.tools.ffmpeg = "  ".to_string();
    assert!(config.validate().is_err());
    config = Config::default();

    config.rendering.quality = "ultra".to_string();
    assert!(config.validate().is_err());
    config = Config::default();

    config.narration.command = vec!["say".to_string(), "{text}".to_string()];
    assert!(config.validate().is_err());
    config = Config::default();

    config.narration.command.clear();
    assert!(config.validate().is_err());
    config = Config::default();

    config.tools.probe_timeout_secs = 0;
    assert!(config.validate().is_err());
    config = Config::default();

    config.subtitles.rescale_tolerance_secs = -0.5;
    assert!(config.validate().is_err());
    config.subtitles.rescale_tolerance_secs = f64::NAN;
    assert!(config.validate().is_err());
    config.subtitles.rescale_tolerance_secs = 0.0;
    assert!(config.validate().is_ok());
}

#[test]
fn test_log_level_withEachVariant_shouldMapToFilter() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
    assert_eq!(LogLevel::Info.to_level_filter(), log::LevelFilter::Info);
    assert_eq!(LogLevel::Debug.to_level_filter(), log::LevelFilter::Debug);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}

#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config.tools.ffmpeg, "ffmpeg");
    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.rendering.quality, config.rendering.quality);
    Ok(())
}

#[test]
fn test_load_or_create_withPartialFile_shouldFillMissingFieldsWithDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "log_level": "debug",
            "rendering": { "quality": "h" },
            "subtitles": { "rescale_tolerance_secs": 0.25 }
        }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.rendering.quality, "h");
    assert_eq!(config.rendering.manim, "manim");
    assert_eq!(config.subtitles.rescale_tolerance_secs, 0.25);
    assert_eq!(config.tools.ffmpeg_timeout_secs, 600);
    Ok(())
}

#[test]
fn test_load_or_create_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}
