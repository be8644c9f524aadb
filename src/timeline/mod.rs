/*!
 * Subtitle timeline model and the timing components built on it.
 *
 * - `timecode`: `HH:MM:SS,mmm` <-> seconds
 * - `segmenter`: narration text + duration -> contiguous timeline
 * - `srt`: timeline document rendering and parsing
 * - `merger`: per-scene timelines -> one global timeline
 * - `rescaler`: global timeline -> final video duration
 */

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod merger;
pub mod rescaler;
pub mod segmenter;
pub mod srt;
pub mod timecode;

pub use merger::{merge, SceneTimeline};
pub use rescaler::{rescale, rescale_with_tolerance, RESCALE_TOLERANCE_SECS};
pub use segmenter::segment;
pub use srt::{parse, read_srt_file, render, write_srt_file};
pub use timecode::{decode, encode};

/// Smallest duration an interval may have once corrected
pub const MIN_INTERVAL_SECS: f64 = 0.01;

/// Round a value in seconds to millisecond precision
pub fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

// @struct: Single timed subtitle line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleInterval {
    // @field: Start time in seconds
    pub start: f64,

    // @field: End time in seconds, always > start
    pub end: f64,

    // @field: Subtitle text
    pub text: String,
}

impl SubtitleInterval {
    /// Create an interval, nudging `end` past `start` when the range is empty or inverted
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        let end = if end > start {
            end
        } else {
            round_millis(start + MIN_INTERVAL_SECS)
        };

        SubtitleInterval {
            start,
            end,
            text: text.into(),
        }
    }

    /// Length of the interval in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Ordered sequence of subtitle intervals.
///
/// Insertion order is chronological order; nothing in this crate reorders a timeline.
/// Serializes as a plain JSON array of `{start, end, text}` objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    intervals: Vec<SubtitleInterval>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, interval: SubtitleInterval) {
        self.intervals.push(interval);
    }

    pub fn intervals(&self) -> &[SubtitleInterval] {
        &self.intervals
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SubtitleInterval> {
        self.intervals.iter()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn first(&self) -> Option<&SubtitleInterval> {
        self.intervals.first()
    }

    pub fn last(&self) -> Option<&SubtitleInterval> {
        self.intervals.last()
    }

    /// End time of the last interval, `0.0` for an empty timeline
    pub fn last_end(&self) -> f64 {
        self.last().map_or(0.0, |interval| interval.end)
    }

    /// Whether starts never decrease from one interval to the next
    pub fn is_monotonic(&self) -> bool {
        self.intervals
            .windows(2)
            .all(|pair| pair[0].start <= pair[1].start)
    }

    pub fn into_intervals(self) -> Vec<SubtitleInterval> {
        self.intervals
    }
}

impl From<Vec<SubtitleInterval>> for Timeline {
    fn from(intervals: Vec<SubtitleInterval>) -> Self {
        Timeline { intervals }
    }
}

impl FromIterator<SubtitleInterval> for Timeline {
    fn from_iter<I: IntoIterator<Item = SubtitleInterval>>(iter: I) -> Self {
        Timeline {
            intervals: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Timeline {
    type Item = SubtitleInterval;
    type IntoIter = std::vec::IntoIter<SubtitleInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.into_iter()
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a SubtitleInterval;
    type IntoIter = std::slice::Iter<'a, SubtitleInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

/// Renders the timeline as a subtitle document
impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&render(self))
    }
}
