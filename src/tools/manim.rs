use async_trait::async_trait;
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::app_config::RenderConfig;
use crate::errors::ToolError;
use crate::file_utils::FileManager;
use crate::tools::{run_tool, SceneRenderer};

/// Import line every generated scene script needs
pub const SCRIPT_HEADER: &str = "from manim import *\n\n";

// @struct: Scene rendering through the manim command line
#[derive(Debug, Clone)]
pub struct ManimRenderer {
    binary: String,
    quality: String,
    timeout_secs: u64,
}

impl ManimRenderer {
    pub fn new(binary: impl Into<String>, quality: impl Into<String>, timeout_secs: u64) -> Self {
        ManimRenderer {
            binary: binary.into(),
            quality: quality.into(),
            timeout_secs,
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.manim.clone(), config.quality.clone(), config.timeout_secs)
    }

    /// Prefix scene code with the import it relies on
    pub fn script_source(code: &str) -> String {
        if code.trim_start().starts_with("from manim import") {
            code.to_string()
        } else {
            format!("{}{}", SCRIPT_HEADER, code)
        }
    }
}

#[async_trait]
impl SceneRenderer for ManimRenderer {
    async fn render(&self, script: &Path, class_name: &str, work_dir: &Path) -> Result<PathBuf, ToolError> {
        let media_dir = work_dir.join("media");
        let args = vec![
            format!("-q{}", self.quality),
            "--media_dir".to_string(),
            media_dir.to_string_lossy().to_string(),
            script.to_string_lossy().to_string(),
            class_name.to_string(),
        ];

        run_tool(&self.binary, &args, self.timeout_secs).await?;

        let file_name = format!("{}.mp4", class_name);
        match FileManager::find_file_named(&media_dir, &file_name) {
            Some(video) => {
                info!("Rendered {} -> {}", class_name, video.display());
                Ok(video)
            }
            None => {
                warn!("Could not locate manim output for class {}", class_name);
                Err(ToolError::OutputMissing {
                    tool: self.binary.clone(),
                    path: media_dir.join(file_name).display().to_string(),
                })
            }
        }
    }
}
