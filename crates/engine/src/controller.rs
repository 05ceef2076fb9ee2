use std::fmt;

use tracing::{debug, info, warn};

use crate::player::{
    PlayerBackend, PlayerEvent, PlayerHandle, PlayerNotification, PlayerOptions, PlayerState,
    SessionId,
};
use crate::prefs::PreferenceStore;
use crate::range::{DragState, Range, Thumb};
use crate::slider::{
    RangeSlider, SliderLayout, SliderOutput, SliderState, ThumbSemantics, TrackBounds, layout,
    nudge,
};
use crate::time::{PlaybackClock, has_known_duration};

/// Cadence at which the host should send [`Command::PollClock`] while playing.
pub const CLOCK_POLL_INTERVAL_MS: u64 = 100;

/// Commands accepted by the trim controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Opens a media item, replacing whatever was open.
    OpenMedia {
        media_id: String,
    },
    CloseMedia,
    PlayerReady {
        session: SessionId,
        duration: f64,
    },
    PlayerStateChanged {
        session: SessionId,
        state: PlayerState,
    },
    TogglePlayPause,
    /// Reads the player clock and enforces the range end.
    PollClock,
    /// Replaces the trim range, persists it and clamps the playhead into it.
    CommitRange(Range),
    /// Moves the playhead without touching the range.
    ScrubTime {
        seconds: f64,
    },
    PointerDown {
        thumb: Thumb,
    },
    PointerMove {
        x: f32,
        track: TrackBounds,
    },
    PointerUp,
    TrackClick {
        x: f32,
        track: TrackBounds,
    },
    /// Moves one handle by whole slider steps (keyboard).
    NudgeThumb {
        thumb: Thumb,
        steps: i32,
    },
}

impl From<PlayerNotification> for Command {
    fn from(value: PlayerNotification) -> Self {
        match value.event {
            PlayerEvent::Ready { duration } => Self::PlayerReady {
                session: value.session,
                duration,
            },
            PlayerEvent::StateChanged(state) => Self::PlayerStateChanged {
                session: value.session,
                state,
            },
        }
    }
}

/// Events emitted by the trim controller.
///
/// Each command emits at most one clock-carrying event, so a consumer never
/// observes a half-applied transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    MediaOpened {
        media_id: String,
        range: Range,
        restored: bool,
    },
    MediaClosed,
    PlayerCreated {
        session: SessionId,
    },
    ClockChanged(PlaybackClock),
    /// Playback hit the range end: paused and rewound to the range start.
    BoundaryReached(PlaybackClock),
    RangeCommitted {
        range: Range,
        clock: PlaybackClock,
    },
    DragChanged(DragState),
}

/// Read-only view of the controller consumed by the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimSnapshot {
    pub media_id: Option<String>,
    pub range: Range,
    pub clock: PlaybackClock,
    pub drag: DragState,
    pub player_ready: bool,
    /// Range start still waiting to be sought once the duration is known.
    pub pending_seek_percent: Option<f64>,
}

struct MediaItem<H> {
    media_id: String,
    session: Option<SessionId>,
    player: Option<H>,
    ready: bool,
    range: Range,
    clock: PlaybackClock,
    slider: SliderState,
    seek_pending: bool,
}

impl<H> MediaItem<H> {
    fn new(media_id: String) -> Self {
        Self {
            media_id,
            session: None,
            player: None,
            ready: false,
            range: Range::FULL,
            clock: PlaybackClock::default(),
            slider: SliderState::default(),
            seek_pending: false,
        }
    }

    /// The player, once it reported readiness.
    fn ready_player(&mut self) -> Option<&mut H> {
        if !self.ready {
            return None;
        }
        self.player.as_mut()
    }
}

impl<H: PlayerHandle> MediaItem<H> {
    /// Adopts the player's duration once known and resolves the pending seek.
    fn sync_duration(&mut self, reported: f64) {
        if !self.ready {
            return;
        }
        let Some(player) = self.player.as_mut() else {
            return;
        };
        let duration = if has_known_duration(reported) {
            reported
        } else {
            player.duration()
        };
        if !has_known_duration(duration) {
            return;
        }
        self.clock.duration = duration;

        if self.seek_pending {
            if let Some(start) = self.range.start_seconds(duration) {
                player.seek_to(start);
                self.clock.current_time = start;
                self.seek_pending = false;
                debug!(media_id = %self.media_id, start, "initial seek resolved");
            }
        }
    }
}

/// Single source of truth for one trim session.
///
/// Reconciles the percentage-space range with the player's time-space clock.
/// Operations that need the player are skipped until it reports readiness,
/// and the player backend itself may arrive after a media item was opened.
pub struct TrimController<B, S>
where
    B: PlayerBackend,
{
    backend: Option<B>,
    store: S,
    slider: RangeSlider,
    options: PlayerOptions,
    next_session_id: u64,
    item: Option<MediaItem<B::Handle>>,
}

impl<B, S> fmt::Debug for TrimController<B, S>
where
    B: PlayerBackend,
    S: PreferenceStore,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrimController")
            .field("backend_loaded", &self.backend.is_some())
            .field("slider", &self.slider)
            .field("next_session_id", &self.next_session_id)
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

impl<B, S> TrimController<B, S>
where
    B: PlayerBackend,
    S: PreferenceStore,
{
    /// Creates a controller without a player backend.
    ///
    /// Media can be opened right away; the player is created once
    /// [`Self::attach_backend`] provides one.
    pub fn new(store: S, slider: RangeSlider) -> Self {
        Self {
            backend: None,
            store,
            slider,
            options: PlayerOptions::default(),
            next_session_id: 1,
            item: None,
        }
    }

    /// Creates a controller with its backend already loaded.
    pub fn with_backend(backend: B, store: S, slider: RangeSlider) -> Self {
        let mut controller = Self::new(store, slider);
        controller.backend = Some(backend);
        controller
    }

    /// Provides the player backend, creating a player for the open item.
    pub fn attach_backend(&mut self, backend: B) -> Vec<Event> {
        self.backend = Some(backend);
        info!("player backend loaded");

        let Some(item) = self.item.as_mut() else {
            return Vec::new();
        };
        if item.player.is_some() {
            return Vec::new();
        }
        match self.backend.as_mut() {
            Some(backend) => {
                let session =
                    spawn_player(backend, &mut self.next_session_id, &self.options, item);
                vec![Event::PlayerCreated { session }]
            }
            None => Vec::new(),
        }
    }

    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.backend.as_mut()
    }

    pub fn is_backend_loaded(&self) -> bool {
        self.backend.is_some()
    }

    /// Applies one command and returns emitted events.
    pub fn handle_command(&mut self, command: Command) -> Vec<Event> {
        match command {
            Command::OpenMedia { media_id } => self.open_media(media_id),
            Command::CloseMedia => self.close_media(),
            Command::PlayerReady { session, duration } => self.player_ready(session, duration),
            Command::PlayerStateChanged { session, state } => {
                self.player_state_changed(session, state)
            }
            Command::TogglePlayPause => self.toggle_play_pause(),
            Command::PollClock => self.poll_clock(),
            Command::CommitRange(range) => self.commit_range(range),
            Command::ScrubTime { seconds } => self.scrub_time(seconds),
            Command::PointerDown { thumb } => self.pointer_down(thumb),
            Command::PointerMove { x, track } => self.pointer_move(x, track),
            Command::PointerUp => self.pointer_up(),
            Command::TrackClick { x, track } => self.track_click(x, track),
            Command::NudgeThumb { thumb, steps } => self.nudge_thumb(thumb, steps),
        }
    }

    /// True while the host should keep polling the clock.
    pub fn wants_clock_poll(&self) -> bool {
        self.item
            .as_ref()
            .is_some_and(|item| item.ready && item.clock.is_playing && item.clock.has_duration())
    }

    pub fn snapshot(&self) -> TrimSnapshot {
        match self.item.as_ref() {
            Some(item) => TrimSnapshot {
                media_id: Some(item.media_id.clone()),
                range: item.range,
                clock: item.clock,
                drag: item.slider.drag(),
                player_ready: item.ready,
                pending_seek_percent: item.seek_pending.then_some(item.range.start()),
            },
            None => TrimSnapshot {
                media_id: None,
                range: Range::FULL,
                clock: PlaybackClock::default(),
                drag: DragState::Idle,
                player_ready: false,
                pending_seek_percent: None,
            },
        }
    }

    pub fn media_id(&self) -> Option<&str> {
        self.item.as_ref().map(|item| item.media_id.as_str())
    }

    pub fn range(&self) -> Range {
        self.item.as_ref().map_or(Range::FULL, |item| item.range)
    }

    pub fn clock(&self) -> PlaybackClock {
        self.item.as_ref().map(|item| item.clock).unwrap_or_default()
    }

    pub fn slider(&self) -> &RangeSlider {
        &self.slider
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Slider geometry for the current state.
    pub fn layout(&self, track_width: f32) -> SliderLayout {
        let clock = self.clock();
        layout(
            &self.slider,
            &self.range(),
            clock.current_time,
            clock.duration,
            track_width,
        )
    }

    pub fn thumb_semantics(&self, thumb: Thumb) -> ThumbSemantics {
        self.slider.semantics(&self.range(), thumb)
    }

    fn open_media(&mut self, media_id: String) -> Vec<Event> {
        self.teardown();

        let mut item = MediaItem::new(media_id);
        let stored = self.store.get(&item.media_id);
        if let Some(range) = stored {
            item.range = range;
            item.seek_pending = true;
        }

        let mut events = vec![Event::MediaOpened {
            media_id: item.media_id.clone(),
            range: item.range,
            restored: stored.is_some(),
        }];
        match self.backend.as_mut() {
            Some(backend) => {
                let session =
                    spawn_player(backend, &mut self.next_session_id, &self.options, &mut item);
                events.push(Event::PlayerCreated { session });
            }
            None => debug!(media_id = %item.media_id, "player backend not loaded yet"),
        }

        info!(
            media_id = %item.media_id,
            start = item.range.start(),
            end = item.range.end(),
            restored = stored.is_some(),
            "media opened"
        );
        self.item = Some(item);
        events
    }

    fn close_media(&mut self) -> Vec<Event> {
        if self.item.is_none() {
            return Vec::new();
        }
        self.teardown();
        vec![Event::MediaClosed]
    }

    fn teardown(&mut self) {
        let Some(mut item) = self.item.take() else {
            return;
        };
        if let Some(mut player) = item.player.take() {
            player.destroy();
        }
        debug!(media_id = %item.media_id, "media torn down");
    }

    fn current_item(&mut self, session: SessionId) -> Option<&mut MediaItem<B::Handle>> {
        let item = self.item.as_mut()?;
        if item.session != Some(session) {
            debug!(session = session.0, "ignoring notification from a stale player");
            return None;
        }
        Some(item)
    }

    fn player_ready(&mut self, session: SessionId, duration: f64) -> Vec<Event> {
        let Some(item) = self.current_item(session) else {
            return Vec::new();
        };
        item.ready = true;
        item.sync_duration(duration);
        vec![Event::ClockChanged(item.clock)]
    }

    fn player_state_changed(&mut self, session: SessionId, state: PlayerState) -> Vec<Event> {
        let Some(item) = self.current_item(session) else {
            return Vec::new();
        };
        item.clock.is_playing = state.is_playing();
        vec![Event::ClockChanged(item.clock)]
    }

    fn toggle_play_pause(&mut self) -> Vec<Event> {
        let Some(item) = self.item.as_mut() else {
            return Vec::new();
        };
        item.sync_duration(0.0);

        let range = item.range;
        let mut clock = item.clock;
        let Some(player) = item.ready_player() else {
            debug!("toggle ignored: player not ready");
            return Vec::new();
        };

        if clock.is_playing {
            player.pause();
            clock.is_playing = false;
        } else {
            if let (Some(start), Some(end)) = (
                range.start_seconds(clock.duration),
                range.end_seconds(clock.duration),
            ) {
                if clock.current_time < start || clock.current_time >= end {
                    player.seek_to(start);
                    clock.current_time = start;
                }
            }
            player.play();
            clock.is_playing = true;
        }

        item.clock = clock;
        vec![Event::ClockChanged(clock)]
    }

    fn poll_clock(&mut self) -> Vec<Event> {
        let Some(item) = self.item.as_mut() else {
            return Vec::new();
        };
        if !item.clock.is_playing || !item.clock.has_duration() {
            return Vec::new();
        }

        let range = item.range;
        let mut clock = item.clock;
        let (Some(start), Some(end)) = (
            range.start_seconds(clock.duration),
            range.end_seconds(clock.duration),
        ) else {
            return Vec::new();
        };
        let Some(player) = item.ready_player() else {
            return Vec::new();
        };

        let now = player.current_time();
        if now >= end {
            player.pause();
            player.seek_to(start);
            clock.is_playing = false;
            clock.current_time = start;
            item.clock = clock;
            info!(media_id = %item.media_id, end, start, "range end reached, rewound to start");
            return vec![Event::BoundaryReached(clock)];
        }

        clock.current_time = now;
        item.clock = clock;
        vec![Event::ClockChanged(clock)]
    }

    fn commit_range(&mut self, range: Range) -> Vec<Event> {
        let Some(item) = self.item.as_mut() else {
            return Vec::new();
        };
        item.range = range;
        if let Err(error) = self.store.set(&item.media_id, range) {
            warn!(media_id = %item.media_id, %error, "failed to persist trim range");
        }

        let mut clock = item.clock;
        if let (Some(start), Some(end)) = (
            range.start_seconds(clock.duration),
            range.end_seconds(clock.duration),
        ) {
            let target = if clock.current_time < start {
                Some(start)
            } else if clock.current_time > end {
                Some(end)
            } else {
                None
            };
            if let Some(target) = target {
                if let Some(player) = item.ready_player() {
                    player.seek_to(target);
                }
                clock.current_time = target;
            }
        }
        item.clock = clock;

        debug!(
            media_id = %item.media_id,
            start = range.start(),
            end = range.end(),
            current_time = clock.current_time,
            "trim range committed"
        );
        vec![Event::RangeCommitted { range, clock }]
    }

    fn scrub_time(&mut self, seconds: f64) -> Vec<Event> {
        let Some(item) = self.item.as_mut() else {
            return Vec::new();
        };
        let duration = item.clock.duration;
        if !has_known_duration(duration) || !seconds.is_finite() {
            return Vec::new();
        }
        let Some(player) = item.ready_player() else {
            return Vec::new();
        };

        let target = seconds.clamp(0.0, duration);
        player.seek_to(target);
        item.clock.current_time = target;
        vec![Event::ClockChanged(item.clock)]
    }

    fn pointer_down(&mut self, thumb: Thumb) -> Vec<Event> {
        let Some(item) = self.item.as_mut() else {
            return Vec::new();
        };
        if item.slider.pointer_down(&self.slider, thumb) {
            vec![Event::DragChanged(item.slider.drag())]
        } else {
            Vec::new()
        }
    }

    fn pointer_move(&mut self, x: f32, track: TrackBounds) -> Vec<Event> {
        let Some(item) = self.item.as_mut() else {
            return Vec::new();
        };
        let output = item.slider.pointer_move(&self.slider, x, track, &item.range);
        self.apply_slider_output(output)
    }

    fn pointer_up(&mut self) -> Vec<Event> {
        let Some(item) = self.item.as_mut() else {
            return Vec::new();
        };
        if item.slider.pointer_up() {
            vec![Event::DragChanged(DragState::Idle)]
        } else {
            Vec::new()
        }
    }

    fn track_click(&mut self, x: f32, track: TrackBounds) -> Vec<Event> {
        let Some(item) = self.item.as_ref() else {
            return Vec::new();
        };
        let output =
            item.slider
                .track_click(&self.slider, x, track, &item.range, item.clock.duration);
        match output {
            // Track clicks commit even when the range is unchanged.
            Some(SliderOutput::RangeChanged(range)) => self.commit_range(range),
            other => self.apply_slider_output(other),
        }
    }

    fn nudge_thumb(&mut self, thumb: Thumb, steps: i32) -> Vec<Event> {
        let Some(item) = self.item.as_ref() else {
            return Vec::new();
        };
        let output = nudge(&self.slider, &item.range, thumb, steps).map(SliderOutput::RangeChanged);
        self.apply_slider_output(output)
    }

    fn apply_slider_output(&mut self, output: Option<SliderOutput>) -> Vec<Event> {
        match output {
            Some(SliderOutput::RangeChanged(range)) if range != self.range() => {
                self.commit_range(range)
            }
            Some(SliderOutput::RangeChanged(_)) | None => Vec::new(),
            Some(SliderOutput::Scrubbed { seconds }) => self.scrub_time(seconds),
        }
    }
}

fn spawn_player<B: PlayerBackend>(
    backend: &mut B,
    next_session_id: &mut u64,
    options: &PlayerOptions,
    item: &mut MediaItem<B::Handle>,
) -> SessionId {
    let session = SessionId(*next_session_id);
    *next_session_id += 1;
    item.player = Some(backend.create(session, &item.media_id, options));
    item.session = Some(session);
    item.ready = false;
    debug!(media_id = %item.media_id, session = session.0, "player created");
    session
}
