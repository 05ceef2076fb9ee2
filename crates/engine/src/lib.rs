//! UI-agnostic trim engine: range slider model, playback sync and trim
//! preferences.

pub mod controller;
pub mod error;
pub mod player;
pub mod prefs;
pub mod range;
pub mod slider;
pub mod time;

pub use controller::{CLOCK_POLL_INTERVAL_MS, Command, Event, TrimController, TrimSnapshot};
pub use error::{EngineError, Result};
pub use player::{
    ClockPlayer, ClockPlayerBackend, NotificationReceiver, NotificationSender, PlayerBackend,
    PlayerEvent, PlayerHandle, PlayerNotification, PlayerOptions, PlayerState, SessionId,
};
pub use prefs::{JsonFilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use range::{DragState, Range, Thumb};
pub use slider::{
    RangeSlider, SliderLayout, SliderOutput, SliderState, THUMB_WIDTH_PX, ThumbSemantics,
    TrackBounds, thumb_at,
};
pub use time::PlaybackClock;
