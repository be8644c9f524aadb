/*!
 * Integration tests running the pipeline against the mock collaborators
 */

use anyhow::Result;
use indicatif::ProgressBar;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use voicemation::errors::PipelineError;
use voicemation::pipeline::{Pipeline, PipelineOptions};
use voicemation::script::SceneScript;
use voicemation::timeline::read_srt_file;
use voicemation::tools::mock::{MockAssembler, MockNarrator, MockProbe, MockRenderer};

use crate::common::{self, assert_close};

// 28 characters each, 1.4s of narration at the default mock rate
const FIRST_NARRATION: &str = "Hello world. This is a test.";
const SECOND_NARRATION: &str = "Second scene narration here.";

fn scene(index: usize, narration: &str, class_name: &str) -> SceneScript {
    SceneScript {
        index,
        narration: narration.to_string(),
        code: format!("class {}(Scene):\n    def construct(self):\n        pass", class_name),
        class_name: class_name.to_string(),
    }
}

fn two_scenes() -> Vec<SceneScript> {
    vec![
        scene(1, FIRST_NARRATION, "Intro"),
        scene(2, SECOND_NARRATION, "Outro"),
    ]
}

fn options(output_dir: &Path, keep_work_dir: bool) -> PipelineOptions {
    PipelineOptions {
        output_dir: output_dir.to_path_buf(),
        keep_work_dir,
        rescale_tolerance_secs: 1.0,
    }
}

fn mock_pipeline(
    narrator: MockNarrator,
    renderer: MockRenderer,
    assembler: MockAssembler,
    probe: MockProbe,
    options: PipelineOptions,
) -> Pipeline {
    Pipeline::new(
        Arc::new(narrator),
        Arc::new(renderer),
        Arc::new(assembler),
        Arc::new(probe),
        options,
    )
}

fn output_dir(temp_dir: &TempDir) -> std::path::PathBuf {
    temp_dir.path().join("out")
}

#[tokio::test]
async fn test_pipeline_withConcatDrift_shouldRescaleSubtitlesToFinalVideo() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let pipeline = mock_pipeline(
        MockNarrator::default(),
        MockRenderer::new(2.0),
        MockAssembler::new(0.2, 1.5),
        MockProbe::new(),
        options(&output_dir(&temp_dir), false),
    );

    let output = pipeline.run(&two_scenes()).await?;

    // Two muxed scenes of 1.6s, plus 1.5s of drift
    let final_duration = output.duration.expect("final duration measured");
    assert_close(final_duration, 4.7);
    assert_eq!(output.scenes.len(), 2);
    assert_close(output.scenes[0].measured_duration.unwrap(), 1.6);

    // Two sentences in the first scene, one in the second
    assert_eq!(output.subtitles.len(), 3);
    assert_close(output.subtitles.last_end(), final_duration);
    assert!(output.subtitles.is_monotonic());
    assert_eq!(output.subtitles.intervals()[2].text, "Second scene narration here.");
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withSmallDrift_shouldKeepMergedTiming() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let pipeline = mock_pipeline(
        MockNarrator::default(),
        MockRenderer::new(2.0),
        MockAssembler::new(0.2, 0.3),
        MockProbe::new(),
        options(&output_dir(&temp_dir), false),
    );

    let output = pipeline.run(&two_scenes()).await?;

    // Second scene starts after the first scene's muxed length, ends at its narration end
    assert_close(output.subtitles.intervals()[2].start, 1.6);
    assert_close(output.subtitles.last_end(), 3.0);
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withCompletedRun_shouldWriteVideoSubtitlesAndReport() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let out = output_dir(&temp_dir);
    let pipeline = mock_pipeline(
        MockNarrator::default(),
        MockRenderer::new(2.0),
        MockAssembler::new(0.0, 2.0),
        MockProbe::new(),
        options(&out, false),
    );

    let output = pipeline.run(&two_scenes()).await?;

    assert!(output.video_path.starts_with(&out));
    assert!(output.video_path.exists());
    assert_eq!(output.subtitle_path, output.video_path.with_extension("srt"));

    let written = read_srt_file(&output.subtitle_path)?;
    assert_eq!(written.len(), output.subtitles.len());
    // SRT timestamps truncate to the millisecond
    assert!((written.last_end() - output.subtitles.last_end()).abs() <= 0.0011);

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output.video_path.with_extension("json"))?)?;
    assert_eq!(report["scenes"].as_array().map(|s| s.len()), Some(2));
    assert_eq!(report["subtitles"].as_array().map(|s| s.len()), Some(3));

    // Temporary work files are gone once the run ends
    let leftovers: Vec<_> = std::fs::read_dir(&out)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .collect();
    assert!(leftovers.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withKeepWorkDir_shouldLeaveSceneArtifacts() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let out = output_dir(&temp_dir);
    let pipeline = mock_pipeline(
        MockNarrator::default(),
        MockRenderer::new(2.0),
        MockAssembler::default(),
        MockProbe::new(),
        options(&out, true),
    );

    pipeline.run(&two_scenes()).await?;

    let work_dir = std::fs::read_dir(&out)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| path.is_dir())
        .expect("work directory kept");
    assert!(work_dir.join("scene_1.srt").exists());
    assert!(work_dir.join("scene_2.py").exists());
    let script = std::fs::read_to_string(work_dir.join("scene_1.py"))?;
    assert!(script.starts_with("from manim import *"));
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withSubMillisecondNarration_shouldMatchSceneSubtitleDocument() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let out = output_dir(&temp_dir);
    let pipeline = mock_pipeline(
        MockNarrator::new(0.0371),
        MockRenderer::new(2.0),
        MockAssembler::default(),
        MockProbe::new(),
        options(&out, true),
    );

    let output = pipeline.run(&[scene(1, FIRST_NARRATION, "Intro")]).await?;

    let work_dir = std::fs::read_dir(&out)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| path.is_dir())
        .expect("work directory kept");
    let scene_document = read_srt_file(work_dir.join("scene_1.srt"))?;

    // Boundaries come from the written document, truncated to the millisecond
    assert_eq!(output.subtitles, scene_document);
    assert_eq!(output.subtitles.intervals()[0].end, 0.461);
    assert_eq!(output.subtitles.last_end(), 1.038);
    assert_eq!(read_srt_file(&output.subtitle_path)?, scene_document);
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withUnwritableOutputDir_shouldReportUnderlyingCause() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let blocker = common::create_test_file(temp_dir.path(), "not_a_dir", "")?;
    let pipeline = mock_pipeline(
        MockNarrator::default(),
        MockRenderer::new(2.0),
        MockAssembler::default(),
        MockProbe::new(),
        options(&blocker.join("out"), false),
    );

    let result = pipeline.run(&two_scenes()).await;

    match result {
        Err(PipelineError::Io(e)) => {
            let message = e.to_string();
            assert!(message.contains("Failed to create directory"), "{}", message);
            assert!(message.contains("os error"), "{}", message);
        }
        other => panic!("expected an I/O error, got {:?}", other.map(|o| o.video_path)),
    }
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withFailingRender_shouldSkipThatScene() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let renderer = MockRenderer::new(2.0).failing_for("Intro");
    let pipeline = mock_pipeline(
        MockNarrator::default(),
        renderer.clone(),
        MockAssembler::new(0.2, 0.0),
        MockProbe::new(),
        options(&output_dir(&temp_dir), false),
    );

    let output = pipeline.run(&two_scenes()).await?;

    assert_eq!(renderer.call_count(), 2);
    assert_eq!(output.scenes.len(), 1);
    assert_eq!(output.scenes[0].scene_index, 2);
    assert_eq!(output.subtitles.first().unwrap().start, 0.0);
    assert_eq!(output.subtitles.first().unwrap().text, SECOND_NARRATION);
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withFailingNarrationAndBlankScene_shouldSkipBoth() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let narrator = MockNarrator::default().failing_on("Second");
    let renderer = MockRenderer::new(2.0);
    let pipeline = mock_pipeline(
        narrator.clone(),
        renderer.clone(),
        MockAssembler::default(),
        MockProbe::new(),
        options(&output_dir(&temp_dir), false),
    );
    let scenes = vec![
        scene(1, "   ", "Silent"),
        scene(2, SECOND_NARRATION, "Outro"),
        scene(3, FIRST_NARRATION, "Intro"),
    ];

    let output = pipeline.run(&scenes).await?;

    // The blank scene never reaches the narrator
    assert_eq!(narrator.call_count(), 2);
    assert_eq!(renderer.call_count(), 1);
    assert_eq!(output.scenes.len(), 1);
    assert_eq!(output.scenes[0].scene_index, 3);
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withUnmeasurableNarration_shouldSkipScene() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let pipeline = mock_pipeline(
        MockNarrator::default(),
        MockRenderer::new(2.0),
        MockAssembler::default(),
        MockProbe::new().unavailable_for("voiceover_1_"),
        options(&output_dir(&temp_dir), false),
    );

    let output = pipeline.run(&two_scenes()).await?;

    assert_eq!(output.scenes.len(), 1);
    assert_eq!(output.scenes[0].scene_index, 2);
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withUnmeasurableFinalVideo_shouldKeepMergedTiming() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let pipeline = mock_pipeline(
        MockNarrator::default(),
        MockRenderer::new(2.0),
        MockAssembler::new(0.2, 5.0),
        MockProbe::new().unavailable_for("final_"),
        options(&output_dir(&temp_dir), false),
    );

    let output = pipeline.run(&two_scenes()).await?;

    assert!(output.duration.is_none());
    assert_close(output.subtitles.last_end(), 3.0);
    assert!(output.subtitle_path.exists());
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withAllScenesFailing_shouldReturnNoScenesRendered() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let pipeline = mock_pipeline(
        MockNarrator::default(),
        MockRenderer::new(2.0).failing_for("Intro").failing_for("Outro"),
        MockAssembler::default(),
        MockProbe::new(),
        options(&output_dir(&temp_dir), false),
    );

    let result = pipeline.run(&two_scenes()).await;

    assert!(matches!(result, Err(PipelineError::NoScenesRendered)));
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withNoScenes_shouldReturnNoScenes() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let narrator = MockNarrator::default();
    let pipeline = mock_pipeline(
        narrator.clone(),
        MockRenderer::new(2.0),
        MockAssembler::default(),
        MockProbe::new(),
        options(&output_dir(&temp_dir), false),
    );

    let result = pipeline.run(&[]).await;

    assert!(matches!(result, Err(PipelineError::NoScenes)));
    assert_eq!(narrator.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withProgressBar_shouldAdvanceOncePerScene() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let progress = ProgressBar::hidden();
    let pipeline = mock_pipeline(
        MockNarrator::default(),
        MockRenderer::new(2.0).failing_for("Outro"),
        MockAssembler::default(),
        MockProbe::new(),
        options(&output_dir(&temp_dir), false),
    )
    .with_progress(progress.clone());

    pipeline.run(&two_scenes()).await?;

    assert_eq!(progress.length(), Some(2));
    assert_eq!(progress.position(), 2);
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withConcurrentRuns_shouldProduceSeparateOutputs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let pipeline = mock_pipeline(
        MockNarrator::default(),
        MockRenderer::new(2.0),
        MockAssembler::new(0.2, 1.5),
        MockProbe::new(),
        options(&output_dir(&temp_dir), false),
    );
    let short = vec![scene(1, FIRST_NARRATION, "Intro")];
    let long = two_scenes();

    let (first, second) = tokio::join!(pipeline.run(&short), pipeline.run(&long));
    let (first, second) = (first?, second?);

    assert_ne!(first.video_path, second.video_path);
    assert_eq!(first.subtitles.len(), 2);
    assert_eq!(second.subtitles.len(), 3);
    Ok(())
}
