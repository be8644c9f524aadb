use async_trait::async_trait;
use log::{debug, info, warn};
use std::io;
use std::path::{Path, PathBuf};

use crate::app_config::ToolsConfig;
use crate::errors::ToolError;
use crate::file_utils::FileManager;
use crate::tools::{run_tool, MediaProbe, VideoAssembler};

// @module: ffprobe duration measurement and ffmpeg assembly

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

// @struct: Duration probe backed by ffprobe
#[derive(Debug, Clone)]
pub struct Ffprobe {
    binary: String,
    timeout_secs: u64,
}

impl Ffprobe {
    pub fn new(binary: impl Into<String>, timeout_secs: u64) -> Self {
        Ffprobe {
            binary: binary.into(),
            timeout_secs,
        }
    }

    pub fn from_config(config: &ToolsConfig) -> Self {
        Self::new(config.ffprobe.clone(), config.probe_timeout_secs)
    }

    /// Parse the bare `format=duration` value ffprobe prints
    fn parse_duration(stdout: &str) -> Option<f64> {
        stdout
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite())
    }
}

#[async_trait]
impl MediaProbe for Ffprobe {
    async fn duration(&self, path: &Path) -> Result<f64, ToolError> {
        if !FileManager::file_exists(path) {
            return Err(ToolError::MeasurementUnavailable(path.display().to_string()));
        }

        let args = vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            path_arg(path),
        ];
        let output = run_tool(&self.binary, &args, self.timeout_secs).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        let duration = Self::parse_duration(&stdout)
            .ok_or_else(|| ToolError::MeasurementUnavailable(path.display().to_string()))?;
        debug!("{} lasts {:.3}s", path.display(), duration);
        Ok(duration)
    }
}

// @struct: Muxing and concatenation backed by ffmpeg
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    binary: String,
    timeout_secs: u64,
}

impl Ffmpeg {
    pub fn new(binary: impl Into<String>, timeout_secs: u64) -> Self {
        Ffmpeg {
            binary: binary.into(),
            timeout_secs,
        }
    }

    pub fn from_config(config: &ToolsConfig) -> Self {
        Self::new(config.ffmpeg.clone(), config.ffmpeg_timeout_secs)
    }

    fn ensure_output(&self, output: &Path) -> Result<PathBuf, ToolError> {
        if FileManager::file_exists(output) {
            Ok(output.to_path_buf())
        } else {
            Err(ToolError::OutputMissing {
                tool: self.binary.clone(),
                path: output.display().to_string(),
            })
        }
    }

    fn concat_args(list_file: &Path, output: &Path, reencode: bool) -> Vec<String> {
        let mut args: Vec<String> = ["-y", "-f", "concat", "-safe", "0", "-i"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.push(path_arg(list_file));

        let codecs: &[&str] = if reencode {
            &["-c:v", "libx264", "-tune", "animation", "-c:a", "aac"]
        } else {
            &["-c", "copy"]
        };
        args.extend(codecs.iter().map(|s| s.to_string()));
        args.push(path_arg(output));
        args
    }
}

#[async_trait]
impl VideoAssembler for Ffmpeg {
    async fn mux_voiceover(
        &self,
        video: &Path,
        audio: &Path,
        duration: f64,
        output: &Path,
    ) -> Result<PathBuf, ToolError> {
        let mut args: Vec<String> = ["-y", "-stream_loop", "-1", "-i"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.push(path_arg(video));
        args.push("-i".to_string());
        args.push(path_arg(audio));
        args.push("-t".to_string());
        args.push(format!("{:.3}", duration));
        args.extend(
            ["-map", "0:v:0", "-map", "1:a:0", "-c:v", "libx264", "-tune", "animation", "-c:a", "aac"]
                .iter()
                .map(|s| s.to_string()),
        );
        args.push(path_arg(output));

        run_tool(&self.binary, &args, self.timeout_secs).await?;
        self.ensure_output(output)
    }

    async fn concatenate(&self, videos: &[PathBuf], output: &Path) -> Result<PathBuf, ToolError> {
        match videos {
            [] => Err(ToolError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no videos to concatenate",
            ))),
            [single] => {
                tokio::fs::copy(single, output).await?;
                Ok(output.to_path_buf())
            }
            _ => {
                let list_file = FileManager::unique_path(std::env::temp_dir(), "video_list", "txt");
                FileManager::write_concat_list(&list_file, videos)
                    .map_err(|e| ToolError::Io(io::Error::other(format!("{:#}", e))))?;

                info!("Concatenating {} videos -> {}", videos.len(), output.display());
                let copy_args = Self::concat_args(&list_file, output, false);
                let result = match run_tool(&self.binary, &copy_args, self.timeout_secs).await {
                    Ok(_) => Ok(()),
                    Err(e) => {
                        warn!("Stream-copy concatenation failed, re-encoding: {}", e);
                        let reencode_args = Self::concat_args(&list_file, output, true);
                        run_tool(&self.binary, &reencode_args, self.timeout_secs)
                            .await
                            .map(|_| ())
                    }
                };

                let _ = std::fs::remove_file(&list_file);
                result?;
                self.ensure_output(output)
            }
        }
    }
}
