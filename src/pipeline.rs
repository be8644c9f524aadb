/*!
 * Narrated video pipeline.
 *
 * Drives the collaborators scene by scene (voiceover, subtitles, render, mux),
 * then concatenates the scenes and builds the global subtitle timeline from the
 * measured durations. All state of a run lives in the values passed through
 * `Pipeline::run`, so independent runs can execute concurrently.
 */

use indicatif::ProgressBar;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use crate::app_config::Config;
use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::script::SceneScript;
use crate::timeline::{
    merge, parse, render, rescale_with_tolerance, segment, write_srt_file, SceneTimeline, Timeline,
};
use crate::tools::manim::ManimRenderer;
use crate::tools::{
    probe_duration, CommandNarrator, Ffmpeg, Ffprobe, MediaProbe, Narrator, SceneRenderer, VideoAssembler,
};

/// What rendering produced for one scene
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneRenderResult {
    pub scene_index: usize,
    pub media_path: Option<PathBuf>,
    pub measured_duration: Option<f64>,
}

/// Final video plus the subtitle timeline aligned to it
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub video_path: PathBuf,
    pub duration: Option<f64>,
    pub subtitle_path: PathBuf,
    pub subtitles: Timeline,
    pub scenes: Vec<SceneRenderResult>,
}

/// Run-level settings
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub output_dir: PathBuf,
    pub keep_work_dir: bool,
    pub rescale_tolerance_secs: f64,
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        PipelineOptions {
            output_dir: config.output_dir.clone(),
            keep_work_dir: config.keep_work_dir,
            rescale_tolerance_secs: config.subtitles.rescale_tolerance_secs,
        }
    }
}

// Intermediate files of one run
enum WorkDir {
    Temp(TempDir),
    Kept(PathBuf),
}

impl WorkDir {
    fn create(options: &PipelineOptions) -> Result<Self, PipelineError> {
        if options.keep_work_dir {
            let suffix = uuid::Uuid::new_v4().simple().to_string();
            let path = options.output_dir.join(format!("work_{}", &suffix[..8]));
            std::fs::create_dir_all(&path)?;
            info!("Keeping intermediate files in {}", path.display());
            Ok(WorkDir::Kept(path))
        } else {
            let dir = tempfile::Builder::new().prefix("voicemation_").tempdir()?;
            Ok(WorkDir::Temp(dir))
        }
    }

    fn path(&self) -> &Path {
        match self {
            WorkDir::Temp(dir) => dir.path(),
            WorkDir::Kept(path) => path,
        }
    }
}

fn file_error(e: anyhow::Error) -> PipelineError {
    PipelineError::Io(io::Error::other(format!("{:#}", e)))
}

/// Orchestrates one narrated video per `run` call
pub struct Pipeline {
    narrator: Arc<dyn Narrator>,
    renderer: Arc<dyn SceneRenderer>,
    assembler: Arc<dyn VideoAssembler>,
    probe: Arc<dyn MediaProbe>,
    options: PipelineOptions,
    progress: Option<ProgressBar>,
}

impl Pipeline {
    pub fn new(
        narrator: Arc<dyn Narrator>,
        renderer: Arc<dyn SceneRenderer>,
        assembler: Arc<dyn VideoAssembler>,
        probe: Arc<dyn MediaProbe>,
        options: PipelineOptions,
    ) -> Self {
        Pipeline {
            narrator,
            renderer,
            assembler,
            probe,
            options,
            progress: None,
        }
    }

    /// Pipeline backed by the external tools named in the configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(CommandNarrator::from_config(&config.narration)),
            Arc::new(ManimRenderer::from_config(&config.rendering)),
            Arc::new(Ffmpeg::from_config(&config.tools)),
            Arc::new(Ffprobe::from_config(&config.tools)),
            PipelineOptions::from_config(config),
        )
    }

    /// Advance `progress` once per processed scene
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Produce the final video and its subtitle timeline
    pub async fn run(&self, scenes: &[SceneScript]) -> Result<PipelineOutput, PipelineError> {
        if scenes.is_empty() {
            return Err(PipelineError::NoScenes);
        }

        let work_dir = WorkDir::create(&self.options)?;
        if let Some(progress) = &self.progress {
            progress.set_length(scenes.len() as u64);
        }

        let mut results = Vec::new();
        let mut scene_timelines = Vec::new();

        for scene in scenes {
            info!("Processing scene {} ({})", scene.index, scene.class_name);
            if let Some((result, timeline)) = self.process_scene(scene, work_dir.path()).await? {
                results.push(result);
                scene_timelines.push(timeline);
            }
            if let Some(progress) = &self.progress {
                progress.inc(1);
            }
        }

        if results.is_empty() {
            error!("No scenes synchronized");
            return Err(PipelineError::NoScenesRendered);
        }

        FileManager::ensure_dir(&self.options.output_dir).map_err(file_error)?;
        let final_path = FileManager::unique_path(&self.options.output_dir, "final", "mp4");
        let videos: Vec<PathBuf> = results
            .iter()
            .filter_map(|result| result.media_path.clone())
            .collect();
        let video_path = self.assembler.concatenate(&videos, &final_path).await?;

        let duration = probe_duration(self.probe.as_ref(), &video_path).await;
        let merged = merge(&scene_timelines);
        let subtitles = match duration {
            Some(actual) => rescale_with_tolerance(&merged, actual, self.options.rescale_tolerance_secs),
            None => {
                warn!("Final video duration unavailable, subtitles are not rescaled");
                merged
            }
        };

        let subtitle_path = video_path.with_extension("srt");
        write_srt_file(&subtitles, &subtitle_path).map_err(file_error)?;

        let output = PipelineOutput {
            video_path,
            duration,
            subtitle_path,
            subtitles,
            scenes: results,
        };

        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| PipelineError::Io(io::Error::other(e)))?;
        FileManager::write_to_file(output.video_path.with_extension("json"), &json).map_err(file_error)?;

        info!(
            "Final video ready at {} ({} subtitles)",
            output.video_path.display(),
            output.subtitles.len()
        );
        Ok(output)
    }

    /// Run one scene; `None` when the scene had to be dropped
    async fn process_scene(
        &self,
        scene: &SceneScript,
        work_dir: &Path,
    ) -> Result<Option<(SceneRenderResult, SceneTimeline)>, PipelineError> {
        let idx = scene.index;

        if scene.narration.trim().is_empty() {
            warn!("Scene {} has no narration, skipping", idx);
            return Ok(None);
        }

        let audio_path = FileManager::unique_path(
            work_dir,
            &format!("voiceover_{}", idx),
            self.narrator.audio_extension(),
        );
        let audio = match self.narrator.synthesize(&scene.narration, &audio_path).await {
            Ok(audio) => audio,
            Err(e) => {
                warn!("Voiceover failed for scene {}: {}", idx, e);
                return Ok(None);
            }
        };

        let Some(narration_duration) = probe_duration(self.probe.as_ref(), &audio).await else {
            warn!("Narration duration unknown for scene {}, skipping", idx);
            return Ok(None);
        };
        debug!("Scene {} narration lasts {:.2}s", idx, narration_duration);

        // Scenes are merged from their subtitle document, as written
        let timeline = match segment(&scene.narration, narration_duration) {
            Ok(timeline) => {
                let document = render(&timeline);
                let srt_path = work_dir.join(format!("scene_{}.srt", idx));
                if let Err(e) = FileManager::write_to_file(&srt_path, &document) {
                    warn!("Could not write {}: {:#}", srt_path.display(), e);
                }
                Some(parse(&document))
            }
            Err(e) => {
                warn!("Subtitle generation failed for scene {}: {}", idx, e);
                None
            }
        };

        let script_path = work_dir.join(format!("scene_{}.py", idx));
        std::fs::write(&script_path, ManimRenderer::script_source(&scene.code))?;

        let raw_video = match self.renderer.render(&script_path, &scene.class_name, work_dir).await {
            Ok(video) => video,
            Err(e) => {
                warn!("Render failed for scene {}: {}", idx, e);
                return Ok(None);
            }
        };

        let synced_path = FileManager::unique_path(work_dir, &format!("synced_{}", idx), "mp4");
        let synced = match self
            .assembler
            .mux_voiceover(&raw_video, &audio, narration_duration, &synced_path)
            .await
        {
            Ok(video) => video,
            Err(e) => {
                warn!("Merge failed for scene {}: {}", idx, e);
                return Ok(None);
            }
        };

        let measured_duration = probe_duration(self.probe.as_ref(), &synced).await;
        info!("Scene {} synchronized", idx);

        Ok(Some((
            SceneRenderResult {
                scene_index: idx,
                media_path: Some(synced),
                measured_duration,
            },
            SceneTimeline::new(timeline, measured_duration),
        )))
    }
}
