use crate::error::{EngineError, Result};
use crate::range::{DragState, PERCENT_MAX, PERCENT_MIN, Range, Thumb};
use crate::time::percent_to_seconds;

/// Width of one slider thumb in pixels.
pub const THUMB_WIDTH_PX: f32 = 16.0;
/// Default snapping step in percent.
pub const DEFAULT_STEP: f64 = 1.0;

/// Horizontal extent of the slider track in pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackBounds {
    pub left: f32,
    pub width: f32,
}

impl TrackBounds {
    pub fn new(left: f32, width: f32) -> Self {
        Self { left, width }
    }
}

/// Outcome of a pointer gesture on the slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SliderOutput {
    /// The trim range changed; the pair is already sorted.
    RangeChanged(Range),
    /// A click inside the range asked for the playhead to move.
    Scrubbed { seconds: f64 },
}

/// Static configuration of a dual-handle slider.
///
/// Values live in percent of the media duration; `min`/`max` may narrow the
/// usable span but never leave `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSlider {
    min: f64,
    max: f64,
    step: f64,
    disabled: bool,
}

impl Default for RangeSlider {
    fn default() -> Self {
        Self {
            min: PERCENT_MIN,
            max: PERCENT_MAX,
            step: DEFAULT_STEP,
            disabled: false,
        }
    }
}

impl RangeSlider {
    /// Creates a validated slider configuration.
    ///
    /// # Example
    /// ```
    /// use engine::RangeSlider;
    ///
    /// let slider = RangeSlider::new(0.0, 100.0, 0.5).expect("valid");
    /// assert_eq!(slider.step(), 0.5);
    /// assert!(RangeSlider::new(0.0, 100.0, 0.0).is_err());
    /// ```
    pub fn new(min: f64, max: f64, step: f64) -> Result<Self> {
        let bounds_ok = min.is_finite()
            && max.is_finite()
            && min >= PERCENT_MIN
            && max <= PERCENT_MAX
            && min < max;
        if !bounds_ok {
            return Err(EngineError::InvalidSliderBounds { min, max });
        }
        if !(step.is_finite() && step > 0.0) {
            return Err(EngineError::InvalidStep(step));
        }
        Ok(Self {
            min,
            max,
            step,
            disabled: false,
        })
    }

    /// Returns a copy with the disabled flag set.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Position of `value` along the track, in percent of the track width.
    pub fn percentage(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min) * 100.0
    }

    /// Inverse of [`Self::percentage`], snapped to the step grid.
    pub fn value_from_percentage(&self, percentage: f64) -> f64 {
        let raw = self.min + percentage / 100.0 * (self.max - self.min);
        self.snap(raw)
    }

    /// Converts a pointer x coordinate into a snapped slider value.
    ///
    /// Positions left or right of the track clamp to `min`/`max`. An empty
    /// track reports `min`.
    pub fn value_at(&self, x: f32, track: TrackBounds) -> f64 {
        if !(track.width > 0.0) {
            return self.min;
        }
        let ratio = f64::from((x - track.left) / track.width).clamp(0.0, 1.0);
        let raw = self.min + ratio * (self.max - self.min);
        self.snap(raw)
    }

    /// Slider semantics for one thumb.
    pub fn semantics(&self, range: &Range, thumb: Thumb) -> ThumbSemantics {
        ThumbSemantics {
            label: match thumb {
                Thumb::Start => "Start value",
                Thumb::End => "End value",
            },
            value_min: self.min,
            value_max: self.max,
            value_now: range.value(thumb),
            focusable: !self.disabled,
        }
    }

    fn snap(&self, raw: f64) -> f64 {
        let stepped = (raw / self.step).round() * self.step;
        stepped.clamp(self.min, self.max)
    }
}

/// Accessibility description of one thumb.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbSemantics {
    pub label: &'static str,
    pub value_min: f64,
    pub value_max: f64,
    pub value_now: f64,
    pub focusable: bool,
}

/// Pointer capture state of the slider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliderState {
    drag: DragState,
}

impl SliderState {
    pub fn drag(&self) -> DragState {
        self.drag
    }

    /// Captures `thumb`. Returns `true` when the gesture was captured and must
    /// not also be treated as a track click.
    pub fn pointer_down(&mut self, slider: &RangeSlider, thumb: Thumb) -> bool {
        if slider.disabled {
            return false;
        }
        self.drag = DragState::Dragging(thumb);
        true
    }

    /// Moves the captured thumb to the pointer.
    ///
    /// Dragging a handle past its sibling hands the capture over to the
    /// sibling slot, so the pointer keeps moving the handle under it.
    pub fn pointer_move(
        &mut self,
        slider: &RangeSlider,
        x: f32,
        track: TrackBounds,
        range: &Range,
    ) -> Option<SliderOutput> {
        if slider.disabled {
            return None;
        }
        let thumb = self.drag.thumb()?;
        let value = slider.value_at(x, track);
        let (next, holder) = range.with_thumb(thumb, value);
        self.drag = DragState::Dragging(holder);
        Some(SliderOutput::RangeChanged(next))
    }

    /// Releases the capture. Returns `true` when a thumb was captured.
    pub fn pointer_up(&mut self) -> bool {
        let was_dragging = self.drag.is_dragging();
        self.drag = DragState::Idle;
        was_dragging
    }

    /// Interprets a click on the track.
    ///
    /// Strictly inside the range the click seeks the playhead, which needs a
    /// known `duration`. Anywhere else, including exactly on a handle, the
    /// nearer handle jumps to the click.
    pub fn track_click(
        &self,
        slider: &RangeSlider,
        x: f32,
        track: TrackBounds,
        range: &Range,
        duration: f64,
    ) -> Option<SliderOutput> {
        if slider.disabled || self.drag.is_dragging() {
            return None;
        }
        let value = slider.value_at(x, track);

        if range.contains_strictly(value) {
            return percent_to_seconds(value, duration)
                .map(|seconds| SliderOutput::Scrubbed { seconds });
        }

        let thumb = range.nearer_thumb(value);
        let (next, _) = range.with_thumb(thumb, value);
        Some(SliderOutput::RangeChanged(next))
    }
}

/// Moves one handle by `steps` slider steps, as arrow keys do.
pub fn nudge(slider: &RangeSlider, range: &Range, thumb: Thumb, steps: i32) -> Option<Range> {
    if slider.disabled || steps == 0 {
        return None;
    }
    let value = slider.snap(range.value(thumb) + f64::from(steps) * slider.step);
    let (next, _) = range.with_thumb(thumb, value);
    Some(next)
}

/// Picks the thumb under a pointer at `local_x` (track-relative).
///
/// Overlapping thumbs resolve to the one whose center is nearer; ties go to
/// the start thumb.
pub fn thumb_at(layout: &SliderLayout, local_x: f32) -> Option<Thumb> {
    let hit = |left: f32| local_x >= left && local_x <= left + THUMB_WIDTH_PX;
    let center_distance = |left: f32| (local_x - (left + THUMB_WIDTH_PX / 2.0)).abs();

    match (hit(layout.start_thumb_x), hit(layout.end_thumb_x)) {
        (true, true) => {
            if center_distance(layout.start_thumb_x) <= center_distance(layout.end_thumb_x) {
                Some(Thumb::Start)
            } else {
                Some(Thumb::End)
            }
        }
        (true, false) => Some(Thumb::Start),
        (false, true) => Some(Thumb::End),
        (false, false) => None,
    }
}

/// Track-relative geometry for one frame of the slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderLayout {
    pub start_thumb_x: f32,
    pub end_thumb_x: f32,
    pub band_x: f32,
    pub band_width: f32,
    pub left_shade_width: f32,
    pub right_shade_x: f32,
    pub right_shade_width: f32,
    /// `None` while the duration is unknown.
    pub playhead_x: Option<f32>,
}

/// Builds the slider geometry for a track `track_width` pixels wide.
///
/// Only the playhead depends on the duration; the handles and band render
/// in percent space before the player is ready.
pub fn layout(
    slider: &RangeSlider,
    range: &Range,
    current_time: f64,
    duration: f64,
    track_width: f32,
) -> SliderLayout {
    let width = track_width.max(0.0);
    let to_x = |percentage: f64| (percentage / 100.0) as f32 * width;

    let start_pct = slider.percentage(range.start()).clamp(0.0, 100.0);
    let end_pct = slider.percentage(range.end()).clamp(0.0, 100.0);
    let thumb_x = |percentage: f64| {
        (to_x(percentage) - THUMB_WIDTH_PX / 2.0)
            .min(width - THUMB_WIDTH_PX)
            .max(0.0)
    };

    let playhead_x = crate::time::seconds_to_percent(current_time, duration)
        .map(|percentage| to_x(percentage.clamp(0.0, 100.0)));

    SliderLayout {
        start_thumb_x: thumb_x(start_pct),
        end_thumb_x: thumb_x(end_pct),
        band_x: to_x(start_pct),
        band_width: to_x(end_pct) - to_x(start_pct),
        left_shade_width: (to_x(start_pct) + THUMB_WIDTH_PX / 2.0).min(width),
        right_shade_x: to_x(end_pct),
        right_shade_width: width - to_x(end_pct),
        playhead_x,
    }
}

#[cfg(test)]
mod tests {
    use crate::range::{DragState, Range, Thumb};

    use super::{
        RangeSlider, SliderOutput, SliderState, THUMB_WIDTH_PX, TrackBounds, layout, nudge,
        thumb_at,
    };

    fn track() -> TrackBounds {
        TrackBounds::new(100.0, 200.0)
    }

    #[test]
    fn value_at_maps_pointer_proportionally() {
        let slider = RangeSlider::default();
        assert_eq!(slider.value_at(200.0, track()), 50.0);
        assert_eq!(slider.value_at(100.0, track()), 0.0);
        assert_eq!(slider.value_at(300.0, track()), 100.0);
    }

    #[test]
    fn value_at_clamps_pointer_outside_track() {
        let slider = RangeSlider::default();
        assert_eq!(slider.value_at(-50.0, track()), 0.0);
        assert_eq!(slider.value_at(900.0, track()), 100.0);
    }

    #[test]
    fn value_at_snaps_to_step() {
        let slider = RangeSlider::new(0.0, 100.0, 5.0).expect("valid slider");
        // 101px into a 200px track is 50.5%, nearest multiple of 5 is 50.
        assert_eq!(slider.value_at(201.0, track()), 50.0);
        // 113px is 56.5%, which snaps up to 55.
        assert_eq!(slider.value_at(213.0, track()), 55.0);
    }

    #[test]
    fn empty_track_reports_min() {
        let slider = RangeSlider::new(10.0, 90.0, 1.0).expect("valid slider");
        assert_eq!(slider.value_at(10.0, TrackBounds::new(0.0, 0.0)), 10.0);
    }

    #[test]
    fn new_rejects_inverted_bounds() {
        assert!(RangeSlider::new(50.0, 20.0, 1.0).is_err());
        assert!(RangeSlider::new(0.0, 120.0, 1.0).is_err());
        assert!(RangeSlider::new(0.0, 100.0, f64::NAN).is_err());
    }

    #[test]
    fn percentage_round_trips_on_step_boundaries() {
        for step in [1.0, 0.5, 0.25, 5.0] {
            let slider = RangeSlider::new(0.0, 100.0, step).expect("valid slider");
            let mut value = 0.0;
            while value <= 100.0 {
                assert_eq!(slider.value_from_percentage(slider.percentage(value)), value);
                value += step;
            }
        }
    }

    #[test]
    fn percentage_round_trips_with_narrowed_bounds() {
        let slider = RangeSlider::new(20.0, 60.0, 1.0).expect("valid slider");
        for value in [20.0, 33.0, 47.0, 60.0] {
            assert_eq!(slider.value_from_percentage(slider.percentage(value)), value);
        }
    }

    #[test]
    fn pointer_move_without_capture_is_ignored() {
        let slider = RangeSlider::default();
        let mut state = SliderState::default();
        assert_eq!(
            state.pointer_move(&slider, 150.0, track(), &Range::FULL),
            None
        );
    }

    #[test]
    fn dragging_start_thumb_replaces_only_start() {
        let slider = RangeSlider::default();
        let mut state = SliderState::default();
        assert!(state.pointer_down(&slider, Thumb::Start));

        let output = state.pointer_move(&slider, 140.0, track(), &Range::new(10.0, 80.0));
        assert_eq!(output, Some(SliderOutput::RangeChanged(Range::new(20.0, 80.0))));
    }

    #[test]
    fn dragging_start_past_end_swaps_handles() {
        let slider = RangeSlider::default();
        let mut state = SliderState::default();
        let mut range = Range::new(20.0, 50.0);
        state.pointer_down(&slider, Thumb::Start);

        let Some(SliderOutput::RangeChanged(next)) =
            state.pointer_move(&slider, 220.0, track(), &range)
        else {
            panic!("expected range change");
        };
        assert_eq!(next, Range::new(50.0, 60.0));
        assert_eq!(state.drag(), DragState::Dragging(Thumb::End));
        range = next;

        let Some(SliderOutput::RangeChanged(next)) =
            state.pointer_move(&slider, 240.0, track(), &range)
        else {
            panic!("expected range change");
        };
        assert_eq!(next, Range::new(50.0, 70.0));
    }

    #[test]
    fn any_drag_sequence_keeps_range_sorted() {
        let slider = RangeSlider::default();
        let mut state = SliderState::default();
        let mut range = Range::new(40.0, 60.0);
        let positions = [50.0, 350.0, -20.0, 180.0, 260.0, 100.0, 300.0, 210.0];

        for thumb in [Thumb::Start, Thumb::End] {
            state.pointer_down(&slider, thumb);
            for x in positions {
                if let Some(SliderOutput::RangeChanged(next)) =
                    state.pointer_move(&slider, x, track(), &range)
                {
                    assert!(next.start() <= next.end());
                    range = next;
                }
            }
            assert!(state.pointer_up());
        }
    }

    #[test]
    fn disabled_slider_ignores_pointer() {
        let slider = RangeSlider::default().disabled(true);
        let mut state = SliderState::default();
        assert!(!state.pointer_down(&slider, Thumb::Start));
        assert_eq!(state.drag(), DragState::Idle);
        assert_eq!(
            state.track_click(&slider, 150.0, track(), &Range::FULL, 100.0),
            None
        );
    }

    #[test]
    fn pointer_up_releases_capture() {
        let slider = RangeSlider::default();
        let mut state = SliderState::default();
        state.pointer_down(&slider, Thumb::End);
        assert!(state.pointer_up());
        assert!(!state.pointer_up());
    }

    #[test]
    fn click_inside_range_scrubs() {
        let slider = RangeSlider::default();
        let state = SliderState::default();
        let output = state.track_click(&slider, 170.0, track(), &Range::new(20.0, 50.0), 200.0);
        assert_eq!(output, Some(SliderOutput::Scrubbed { seconds: 70.0 }));
    }

    #[test]
    fn click_inside_range_without_duration_is_noop() {
        let slider = RangeSlider::default();
        let state = SliderState::default();
        let output = state.track_click(&slider, 170.0, track(), &Range::new(20.0, 50.0), 0.0);
        assert_eq!(output, None);
    }

    #[test]
    fn click_outside_range_moves_nearer_thumb() {
        let slider = RangeSlider::default();
        let state = SliderState::default();
        let range = Range::new(20.0, 50.0);

        let right = state.track_click(&slider, 220.0, track(), &range, 100.0);
        assert_eq!(right, Some(SliderOutput::RangeChanged(Range::new(20.0, 60.0))));

        let left = state.track_click(&slider, 110.0, track(), &range, 100.0);
        assert_eq!(left, Some(SliderOutput::RangeChanged(Range::new(5.0, 50.0))));
    }

    #[test]
    fn click_exactly_on_a_thumb_uses_nearer_thumb_rule() {
        let slider = RangeSlider::default();
        let state = SliderState::default();
        let range = Range::new(20.0, 50.0);
        let output = state.track_click(&slider, 200.0, track(), &range, 100.0);
        assert_eq!(output, Some(SliderOutput::RangeChanged(range)));
    }

    #[test]
    fn click_while_dragging_is_ignored() {
        let slider = RangeSlider::default();
        let mut state = SliderState::default();
        state.pointer_down(&slider, Thumb::Start);
        let output = state.track_click(&slider, 170.0, track(), &Range::new(20.0, 50.0), 100.0);
        assert_eq!(output, None);
    }

    #[test]
    fn nudge_moves_by_whole_steps_and_sorts() {
        let slider = RangeSlider::default();
        let range = Range::new(20.0, 21.0);
        assert_eq!(
            nudge(&slider, &range, Thumb::Start, 3),
            Some(Range::new(21.0, 23.0))
        );
        assert_eq!(
            nudge(&slider, &Range::FULL, Thumb::End, 1),
            Some(Range::FULL)
        );
        assert_eq!(nudge(&slider, &range, Thumb::End, 0), None);
    }

    #[test]
    fn semantics_describe_each_thumb() {
        let slider = RangeSlider::default();
        let semantics = slider.semantics(&Range::new(10.0, 30.0), Thumb::End);
        assert_eq!(semantics.label, "End value");
        assert_eq!(semantics.value_now, 30.0);
        assert_eq!(semantics.value_max, 100.0);
        assert!(semantics.focusable);
    }

    #[test]
    fn layout_positions_thumbs_band_and_playhead() {
        let slider = RangeSlider::default();
        let frame = layout(&slider, &Range::new(25.0, 75.0), 50.0, 100.0, 400.0);

        assert_eq!(frame.band_x, 100.0);
        assert_eq!(frame.band_width, 200.0);
        assert_eq!(frame.start_thumb_x, 100.0 - THUMB_WIDTH_PX / 2.0);
        assert_eq!(frame.end_thumb_x, 300.0 - THUMB_WIDTH_PX / 2.0);
        assert_eq!(frame.left_shade_width, 100.0 + THUMB_WIDTH_PX / 2.0);
        assert_eq!(frame.right_shade_x, 300.0);
        assert_eq!(frame.right_shade_width, 100.0);
        assert_eq!(frame.playhead_x, Some(200.0));
    }

    #[test]
    fn layout_keeps_thumbs_inside_track() {
        let slider = RangeSlider::default();
        let frame = layout(&slider, &Range::FULL, 0.0, 100.0, 400.0);
        assert_eq!(frame.start_thumb_x, 0.0);
        assert_eq!(frame.end_thumb_x, 400.0 - THUMB_WIDTH_PX);
    }

    #[test]
    fn layout_suppresses_playhead_without_duration() {
        let slider = RangeSlider::default();
        let frame = layout(&slider, &Range::new(10.0, 20.0), 5.0, 0.0, 400.0);
        assert_eq!(frame.playhead_x, None);
        assert_eq!(frame.band_x, 40.0);
    }

    #[test]
    fn thumb_hit_test_prefers_nearer_center() {
        let slider = RangeSlider::default();
        let frame = layout(&slider, &Range::new(50.0, 52.0), 0.0, 100.0, 400.0);

        assert_eq!(thumb_at(&frame, frame.start_thumb_x + 1.0), Some(Thumb::Start));
        assert_eq!(
            thumb_at(&frame, frame.end_thumb_x + THUMB_WIDTH_PX - 1.0),
            Some(Thumb::End)
        );
        assert_eq!(thumb_at(&frame, 10.0), None);
    }
}
