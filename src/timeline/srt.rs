/*!
 * Timeline documents in SubRip form.
 *
 * Blocks look like `index\nHH:MM:SS,mmm --> HH:MM:SS,mmm\ntext\n\n`, 1-indexed.
 * Parsing is forgiving: a block without a usable timing line is dropped,
 * never fatal to the rest of the document.
 */

use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::Path;

use crate::file_utils::FileManager;
use crate::timeline::{decode, encode, SubtitleInterval, Timeline};

/// Serialize a timeline as a subtitle document
pub fn render(timeline: &Timeline) -> String {
    let mut out = String::new();
    for (i, interval) in timeline.iter().enumerate() {
        out.push_str(&format!("{}\n", i + 1));
        out.push_str(&format!("{} --> {}\n", encode(interval.start), encode(interval.end)));
        out.push_str(&interval.text);
        out.push_str("\n\n");
    }
    out
}

/// Parse a subtitle document into a timeline, preserving block order
pub fn parse(document: &str) -> Timeline {
    let mut timeline = Timeline::new();
    let mut block: Vec<&str> = Vec::new();
    let mut block_number = 0;

    for line in document.lines() {
        if line.trim().is_empty() {
            if !block.is_empty() {
                block_number += 1;
                push_block(&mut timeline, &block, block_number);
                block.clear();
            }
            continue;
        }
        block.push(line);
    }
    if !block.is_empty() {
        block_number += 1;
        push_block(&mut timeline, &block, block_number);
    }

    debug!("Parsed {} of {} subtitle blocks", timeline.len(), block_number);
    timeline
}

fn push_block(timeline: &mut Timeline, block: &[&str], block_number: usize) {
    match parse_block(block) {
        Some(interval) => timeline.push(interval),
        None => warn!("Skipping malformed subtitle block {}", block_number),
    }
}

// Index line is not checked; the timing line and text are what matter
fn parse_block(block: &[&str]) -> Option<SubtitleInterval> {
    if block.len() < 3 {
        return None;
    }

    let (start, end) = block[1].split_once("-->")?;
    let start = decode(start).ok()?;
    let end = decode(end).ok()?;
    let text = block[2..].join(" ");

    Some(SubtitleInterval::new(start, end, text))
}

/// Read and parse a subtitle document from disk
pub fn read_srt_file<P: AsRef<Path>>(path: P) -> Result<Timeline> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;
    Ok(parse(&content))
}

/// Render a timeline and write it to disk, creating parent directories
pub fn write_srt_file<P: AsRef<Path>>(timeline: &Timeline, path: P) -> Result<()> {
    FileManager::write_to_file(path, &render(timeline))
}
