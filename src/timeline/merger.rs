/*!
 * Per-scene offset merging.
 *
 * Each scene's timeline starts at zero. Merging shifts every scene by the summed
 * duration of the scenes before it. The measured media duration of a scene is
 * authoritative; when it is missing the scene's own last subtitle end stands in.
 */

use log::{debug, warn};

use crate::timeline::{round_millis, SubtitleInterval, Timeline};

/// Subtitles and measured media length of one scene
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneTimeline {
    /// `None` when the scene has no narration or its subtitles could not be produced
    pub timeline: Option<Timeline>,

    /// Measured duration of the scene's merged media, if it could be measured
    pub media_duration: Option<f64>,
}

impl SceneTimeline {
    pub fn new(timeline: Option<Timeline>, media_duration: Option<f64>) -> Self {
        SceneTimeline {
            timeline,
            media_duration,
        }
    }

    /// Measured duration when it is usable as an offset
    fn measured_duration(&self) -> Option<f64> {
        self.media_duration.filter(|d| d.is_finite() && *d > 0.0)
    }
}

/// Merge scene timelines into one global timeline, in scene order
pub fn merge(scenes: &[SceneTimeline]) -> Timeline {
    let mut merged = Timeline::new();
    let mut offset = 0.0;

    for (idx, scene) in scenes.iter().enumerate() {
        let Some(timeline) = &scene.timeline else {
            match scene.measured_duration() {
                Some(duration) => offset += duration,
                None => warn!("Scene {} has no subtitles and no measured duration", idx + 1),
            }
            continue;
        };

        for interval in timeline {
            merged.push(SubtitleInterval::new(
                round_millis(interval.start + offset),
                round_millis(interval.end + offset),
                interval.text.clone(),
            ));
        }

        let advance = match scene.measured_duration() {
            Some(duration) => duration,
            None => {
                debug!(
                    "Scene {} duration unavailable, using last subtitle end {:.3}s",
                    idx + 1,
                    timeline.last_end()
                );
                timeline.last_end()
            }
        };
        offset += advance;
    }

    merged
}
