/*!
 * Narration segmentation.
 *
 * Splits narration into subtitle-sized chunks and hands each chunk a slice of
 * the narration duration proportional to its character count.
 */

use log::debug;

use crate::errors::TimelineError;
use crate::timeline::{SubtitleInterval, Timeline};

/// Characters that close a chunk and stay attached to it
const SENTENCE_DELIMITERS: [char; 5] = ['.', '?', '!', ':', ';'];

/// One subtitle-sized piece of narration
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub text: String,
    pub char_count: usize,
}

impl TextChunk {
    fn new(text: &str) -> Self {
        TextChunk {
            text: text.to_string(),
            char_count: text.chars().count(),
        }
    }
}

/// Split narration at `. ? ! : ;`, newlines, and runs of two or more spaces.
///
/// Punctuation stays on the chunk it ends. Chunks are trimmed and empty ones
/// dropped. Text without any delimiter yields a single chunk.
pub fn split_chunks(text: &str) -> Vec<TextChunk> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    fn flush(current: &mut String, chunks: &mut Vec<TextChunk>) {
        let trimmed = current.trim();
        if !trimmed.is_empty() {
            chunks.push(TextChunk::new(trimmed));
        }
        current.clear();
    }

    while let Some(c) = chars.next() {
        if SENTENCE_DELIMITERS.contains(&c) {
            current.push(c);
            flush(&mut current, &mut chunks);
        } else if c == '\n' {
            flush(&mut current, &mut chunks);
        } else if c == ' ' && chars.peek() == Some(&' ') {
            while chars.peek() == Some(&' ') {
                chars.next();
            }
            flush(&mut current, &mut chunks);
        } else {
            current.push(c);
        }
    }
    flush(&mut current, &mut chunks);

    if chunks.is_empty() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            chunks.push(TextChunk::new(trimmed));
        }
    }

    chunks
}

/// Build a contiguous timeline covering `[0, total_duration]` for the narration.
///
/// The last chunk ends exactly at `total_duration`, absorbing any floating-point drift.
pub fn segment(text: &str, total_duration: f64) -> Result<Timeline, TimelineError> {
    if !total_duration.is_finite() || total_duration <= 0.0 {
        return Err(TimelineError::InvalidDuration(total_duration));
    }

    let chunks = split_chunks(text);
    let total_chars: usize = chunks.iter().map(|chunk| chunk.char_count).sum();
    if total_chars == 0 {
        return Err(TimelineError::EmptyNarrationText);
    }

    let mut timeline = Timeline::new();
    let mut elapsed = 0.0;
    let last_index = chunks.len() - 1;

    for (i, chunk) in chunks.into_iter().enumerate() {
        let end = if i == last_index {
            total_duration
        } else {
            elapsed + total_duration * (chunk.char_count as f64 / total_chars as f64)
        };

        debug!("Chunk {} ({} chars): {:.3}s -> {:.3}s", i + 1, chunk.char_count, elapsed, end);
        let interval = SubtitleInterval::new(elapsed, end, chunk.text);
        elapsed = interval.end;
        timeline.push(interval);
    }

    Ok(timeline)
}
