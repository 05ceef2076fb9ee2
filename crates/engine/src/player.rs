use std::collections::HashMap;
use std::sync::mpsc;
use std::time::Instant;

use tracing::debug;

/// Identifies one player instance. A new id is issued every time a player is
/// created, so notifications from a destroyed player can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

/// Playback state reported by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
    Unknown(i32),
}

impl PlayerState {
    /// Maps the numeric state codes used by embedded web players
    /// (`-1` unstarted, `0` ended, `1` playing, `2` paused, `3` buffering,
    /// `5` cued).
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => Self::Unstarted,
            0 => Self::Ended,
            1 => Self::Playing,
            2 => Self::Paused,
            3 => Self::Buffering,
            5 => Self::Cued,
            other => Self::Unknown(other),
        }
    }

    /// Only an explicit playing state counts as playing.
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// Asynchronous notification emitted by a player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerEvent {
    Ready { duration: f64 },
    StateChanged(PlayerState),
}

/// Notification tagged with the session that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerNotification {
    pub session: SessionId,
    pub event: PlayerEvent,
}

/// Options passed to the player on creation. Both default to off: the trim
/// view drives playback itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerOptions {
    pub show_controls: bool,
    pub show_related: bool,
}

/// Control surface of one live player.
///
/// Calls are fire-and-forget; the player reports the resulting state through
/// its notifications.
pub trait PlayerHandle {
    fn play(&mut self);

    fn pause(&mut self);

    fn seek_to(&mut self, seconds: f64);

    /// Reads the playback clock in seconds.
    fn current_time(&mut self) -> f64;

    /// Media duration in seconds, `0.0` while unknown.
    fn duration(&self) -> f64;

    /// Releases the player. The handle is not used afterwards.
    fn destroy(&mut self);
}

/// Factory for players.
pub trait PlayerBackend {
    type Handle: PlayerHandle;

    /// Creates a player for `media_id`. Readiness is reported later through a
    /// [`PlayerEvent::Ready`] notification tagged with `session`.
    fn create(&mut self, session: SessionId, media_id: &str, options: &PlayerOptions)
    -> Self::Handle;
}

/// Sender half used by players to publish notifications.
pub type NotificationSender = mpsc::Sender<PlayerNotification>;

/// Receiver half drained by the host event loop.
pub type NotificationReceiver = mpsc::Receiver<PlayerNotification>;

/// Backend creating wall-clock driven players.
///
/// Durations come from a per-media table with a fallback for unknown media.
#[derive(Debug, Clone)]
pub struct ClockPlayerBackend {
    notifications: NotificationSender,
    durations: HashMap<String, f64>,
    fallback_duration: f64,
}

impl ClockPlayerBackend {
    pub fn new(notifications: NotificationSender, fallback_duration: f64) -> Self {
        Self {
            notifications,
            durations: HashMap::new(),
            fallback_duration,
        }
    }

    /// Registers the duration of one media item.
    pub fn set_duration(&mut self, media_id: impl Into<String>, seconds: f64) {
        self.durations.insert(media_id.into(), seconds);
    }

    fn duration_for(&self, media_id: &str) -> f64 {
        self.durations
            .get(media_id)
            .copied()
            .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
            .unwrap_or(self.fallback_duration)
            .max(0.0)
    }
}

impl PlayerBackend for ClockPlayerBackend {
    type Handle = ClockPlayer;

    fn create(
        &mut self,
        session: SessionId,
        media_id: &str,
        _options: &PlayerOptions,
    ) -> Self::Handle {
        let player = ClockPlayer {
            session,
            duration: self.duration_for(media_id),
            position: 0.0,
            playing_since: None,
            notifications: Some(self.notifications.clone()),
        };
        player.notify(PlayerEvent::Ready {
            duration: player.duration,
        });
        player
    }
}

/// Player whose clock advances with wall time while playing.
#[derive(Debug)]
pub struct ClockPlayer {
    session: SessionId,
    duration: f64,
    position: f64,
    playing_since: Option<Instant>,
    notifications: Option<NotificationSender>,
}

impl ClockPlayer {
    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn is_destroyed(&self) -> bool {
        self.notifications.is_none()
    }

    fn elapsed_position(&self) -> f64 {
        match self.playing_since {
            Some(since) => self.position + since.elapsed().as_secs_f64(),
            None => self.position,
        }
    }

    fn notify(&self, event: PlayerEvent) {
        let Some(sender) = &self.notifications else {
            return;
        };
        if sender
            .send(PlayerNotification {
                session: self.session,
                event,
            })
            .is_err()
        {
            debug!(session = self.session.0, "player notification channel closed");
        }
    }
}

impl PlayerHandle for ClockPlayer {
    fn play(&mut self) {
        if self.is_destroyed() || self.playing_since.is_some() {
            return;
        }
        if self.position >= self.duration {
            self.position = 0.0;
        }
        self.playing_since = Some(Instant::now());
        self.notify(PlayerEvent::StateChanged(PlayerState::Playing));
    }

    fn pause(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.position = self.elapsed_position().min(self.duration);
        self.playing_since = None;
        self.notify(PlayerEvent::StateChanged(PlayerState::Paused));
    }

    fn seek_to(&mut self, seconds: f64) {
        if self.is_destroyed() || !seconds.is_finite() {
            return;
        }
        self.position = seconds.clamp(0.0, self.duration);
        if self.playing_since.is_some() {
            self.playing_since = Some(Instant::now());
        }
    }

    fn current_time(&mut self) -> f64 {
        let position = self.elapsed_position();
        if self.playing_since.is_some() && position >= self.duration {
            self.position = self.duration;
            self.playing_since = None;
            self.notify(PlayerEvent::StateChanged(PlayerState::Ended));
        }
        position.min(self.duration)
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn destroy(&mut self) {
        self.playing_since = None;
        self.notifications = None;
    }
}
