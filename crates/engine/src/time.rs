/// Playback clock mirrored from the player.
///
/// `duration` stays `0.0` until the player reports readiness; every
/// percent/seconds conversion goes through [`percent_to_seconds`] and
/// [`seconds_to_percent`], which refuse to divide by an unknown duration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackClock {
    pub current_time: f64,
    pub duration: f64,
    pub is_playing: bool,
}

impl PlaybackClock {
    /// True once a positive, finite duration is known.
    pub fn has_duration(&self) -> bool {
        has_known_duration(self.duration)
    }

    /// Playhead position in percent, `None` while the duration is unknown.
    pub fn playhead_percent(&self) -> Option<f64> {
        seconds_to_percent(self.current_time, self.duration)
            .map(|percent| percent.clamp(0.0, 100.0))
    }
}

/// True for a positive, finite duration.
pub fn has_known_duration(duration: f64) -> bool {
    duration.is_finite() && duration > 0.0
}

/// Converts a percentage of `duration` into seconds.
///
/// # Example
/// ```
/// use engine::time::percent_to_seconds;
///
/// assert_eq!(percent_to_seconds(10.0, 200.0), Some(20.0));
/// assert_eq!(percent_to_seconds(10.0, 0.0), None);
/// ```
pub fn percent_to_seconds(percent: f64, duration: f64) -> Option<f64> {
    if !has_known_duration(duration) || !percent.is_finite() {
        return None;
    }
    Some(percent * duration / 100.0)
}

/// Converts seconds into a percentage of `duration`.
pub fn seconds_to_percent(seconds: f64, duration: f64) -> Option<f64> {
    if !has_known_duration(duration) || !seconds.is_finite() {
        return None;
    }
    Some(seconds * 100.0 / duration)
}

/// Formats seconds as `m:ss`, or `h:mm:ss` past one hour.
///
/// # Example
/// ```
/// use engine::time::format_timestamp;
///
/// assert_eq!(format_timestamp(75.4), "1:15");
/// assert_eq!(format_timestamp(3_723.0), "1:02:03");
/// ```
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3_600;
    let minutes = (total % 3_600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}
