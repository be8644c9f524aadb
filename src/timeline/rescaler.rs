use log::{debug, info};

use crate::timeline::{round_millis, SubtitleInterval, Timeline, MIN_INTERVAL_SECS};

// @module: Linear correction of the global timeline to the final video length

/// Drift below this many seconds is left alone
pub const RESCALE_TOLERANCE_SECS: f64 = 1.0;

/// Rescale with the default one-second tolerance
pub fn rescale(timeline: &Timeline, actual_duration: f64) -> Timeline {
    rescale_with_tolerance(timeline, actual_duration, RESCALE_TOLERANCE_SECS)
}

/// Scale every timestamp so the timeline ends at `actual_duration`.
///
/// Returns the input unchanged when it is empty, when its last end is not
/// positive, when the actual duration is unknown (not finite or not positive),
/// or when the drift is smaller than `tolerance`.
pub fn rescale_with_tolerance(timeline: &Timeline, actual_duration: f64, tolerance: f64) -> Timeline {
    let Some(last) = timeline.last() else {
        return timeline.clone();
    };

    let last_end = last.end;
    if last_end <= 0.0 {
        return timeline.clone();
    }

    if !actual_duration.is_finite() || actual_duration <= 0.0 {
        debug!("Final duration unavailable, keeping subtitle timing as merged");
        return timeline.clone();
    }

    if (actual_duration - last_end).abs() < tolerance {
        debug!(
            "Subtitle end {:.3}s within {:.3}s of video duration {:.3}s",
            last_end, tolerance, actual_duration
        );
        return timeline.clone();
    }

    let factor = actual_duration / last_end;
    info!(
        "Scaling subtitles by factor {:.3} ({:.2}s -> {:.2}s)",
        factor, last_end, actual_duration
    );

    timeline
        .iter()
        .map(|interval| {
            let start = round_millis(interval.start * factor);
            let end = round_millis(interval.end * factor);
            let end = if end <= start {
                round_millis(start + MIN_INTERVAL_SECS)
            } else {
                end
            };
            SubtitleInterval::new(start, end, interval.text.clone())
        })
        .collect()
}
