use async_trait::async_trait;
use log::info;
use std::path::{Path, PathBuf};

use crate::app_config::NarrationConfig;
use crate::errors::ToolError;
use crate::file_utils::FileManager;
use crate::tools::{run_tool, Narrator};

/// Text-to-speech through an external command.
///
/// The narration is written to a text file next to the requested output and the
/// argument template is expanded with `{text_file}` and `{output}`.
#[derive(Debug, Clone)]
pub struct CommandNarrator {
    command: Vec<String>,
    audio_extension: String,
    timeout_secs: u64,
}

impl CommandNarrator {
    pub fn new(command: Vec<String>, audio_extension: impl Into<String>, timeout_secs: u64) -> Self {
        CommandNarrator {
            command,
            audio_extension: audio_extension.into(),
            timeout_secs,
        }
    }

    pub fn from_config(config: &NarrationConfig) -> Self {
        Self::new(config.command.clone(), config.audio_extension.clone(), config.timeout_secs)
    }

    fn expand(&self, text_file: &Path, output: &Path) -> Vec<String> {
        let text_file = text_file.to_string_lossy();
        let output = output.to_string_lossy();
        self.command
            .iter()
            .map(|arg| {
                arg.replace("{text_file}", &text_file)
                    .replace("{output}", &output)
            })
            .collect()
    }
}

#[async_trait]
impl Narrator for CommandNarrator {
    async fn synthesize(&self, text: &str, output: &Path) -> Result<PathBuf, ToolError> {
        let text_file = output.with_extension("txt");
        FileManager::write_to_file(&text_file, text)
            .map_err(|e| ToolError::Io(std::io::Error::other(format!("{:#}", e))))?;

        let argv = self.expand(&text_file, output);
        let Some((program, args)) = argv.split_first() else {
            return Err(ToolError::Spawn {
                tool: "narrator".to_string(),
                message: "empty narration command".to_string(),
            });
        };

        run_tool(program, args, self.timeout_secs).await?;

        if !FileManager::file_exists(output) {
            return Err(ToolError::OutputMissing {
                tool: program.clone(),
                path: output.display().to_string(),
            });
        }
        info!("Voiceover saved to {}", output.display());
        Ok(output.to_path_buf())
    }

    fn audio_extension(&self) -> &str {
        &self.audio_extension
    }
}
