use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    // @generates: Collision-free artifact path `<prefix>_<8 hex chars>.<extension>`
    pub fn unique_path<P: AsRef<Path>>(dir: P, prefix: &str, extension: &str) -> PathBuf {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let extension = extension.trim_start_matches('.');
        dir.as_ref()
            .join(format!("{}_{}.{}", prefix, &suffix[..8], extension))
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Find the first file called `file_name` anywhere below `root`
    pub fn find_file_named<P: AsRef<Path>>(root: P, file_name: &str) -> Option<PathBuf> {
        WalkDir::new(root.as_ref())
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .find(|entry| entry.file_type().is_file() && entry.file_name() == file_name)
            .map(|entry| entry.into_path())
    }

    /// Write an ffmpeg concat-demuxer list referencing `videos` by absolute path
    pub fn write_concat_list<P: AsRef<Path>>(path: P, videos: &[PathBuf]) -> Result<()> {
        let mut content = String::new();
        for video in videos {
            let absolute = std::path::absolute(video)
                .with_context(|| format!("Failed to resolve path: {}", video.display()))?;
            // Single quotes inside a quoted entry are written as '\''
            let escaped = absolute.to_string_lossy().replace('\'', r"'\''");
            content.push_str(&format!("file '{}'\n", escaped));
        }
        Self::write_to_file(path, &content)
    }
}
