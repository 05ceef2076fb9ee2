use serde::{Deserialize, Serialize};

use crate::time::percent_to_seconds;

/// Lower bound of the percentage space.
pub const PERCENT_MIN: f64 = 0.0;
/// Upper bound of the percentage space.
pub const PERCENT_MAX: f64 = 100.0;

/// One of the two slider handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Thumb {
    Start,
    End,
}

impl Thumb {
    /// Returns the opposite handle.
    pub fn other(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }
}

/// Which thumb, if any, is captured by a pointer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(Thumb),
}

impl DragState {
    /// Returns the captured thumb.
    pub fn thumb(self) -> Option<Thumb> {
        match self {
            Self::Idle => None,
            Self::Dragging(thumb) => Some(thumb),
        }
    }

    pub fn is_dragging(self) -> bool {
        matches!(self, Self::Dragging(_))
    }
}

/// Trim range in percent of the media duration.
///
/// Always sorted and inside `[0, 100]`. Serialized as a `[start, end]` pair.
///
/// # Example
/// ```
/// use engine::Range;
///
/// let range = Range::new(80.0, 20.0);
/// assert_eq!((range.start(), range.end()), (20.0, 80.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Range {
    start: f64,
    end: f64,
}

impl Range {
    /// The default range covering the whole media.
    pub const FULL: Self = Self {
        start: PERCENT_MIN,
        end: PERCENT_MAX,
    };

    /// Builds a range from any pair, sorting it and clamping both ends.
    pub fn new(a: f64, b: f64) -> Self {
        let a = clamp_percent(a);
        let b = clamp_percent(b);
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Returns the value of one handle.
    pub fn value(&self, thumb: Thumb) -> f64 {
        match thumb {
            Thumb::Start => self.start,
            Thumb::End => self.end,
        }
    }

    /// Replaces one handle and re-sorts the pair.
    ///
    /// The second element reports which handle now holds `value`; it differs
    /// from `thumb` when the handle was moved past its sibling.
    pub fn with_thumb(&self, thumb: Thumb, value: f64) -> (Self, Thumb) {
        let value = clamp_percent(value);
        let range = match thumb {
            Thumb::Start => Self::new(value, self.end),
            Thumb::End => Self::new(self.start, value),
        };
        let crossed = match thumb {
            Thumb::Start => value > self.end,
            Thumb::End => value < self.start,
        };
        let holder = if crossed { thumb.other() } else { thumb };
        (range, holder)
    }

    /// True when `value` lies strictly between both handles.
    pub fn contains_strictly(&self, value: f64) -> bool {
        value > self.start && value < self.end
    }

    /// Picks the handle nearer to `value`; ties go to the start handle.
    pub fn nearer_thumb(&self, value: f64) -> Thumb {
        let to_start = (value - self.start).abs();
        let to_end = (value - self.end).abs();
        if to_start <= to_end {
            Thumb::Start
        } else {
            Thumb::End
        }
    }

    /// Start position in seconds, `None` while the duration is unknown.
    pub fn start_seconds(&self, duration: f64) -> Option<f64> {
        percent_to_seconds(self.start, duration)
    }

    /// End position in seconds, `None` while the duration is unknown.
    pub fn end_seconds(&self, duration: f64) -> Option<f64> {
        percent_to_seconds(self.end, duration)
    }

    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::FULL
    }
}

impl From<[f64; 2]> for Range {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<Range> for [f64; 2] {
    fn from(value: Range) -> Self {
        [value.start, value.end]
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return PERCENT_MIN;
    }
    value.clamp(PERCENT_MIN, PERCENT_MAX)
}
