use std::path::Path;

use catalog::{Catalog, Video, VideosResponse, page_window};
use engine::time::{format_timestamp, percent_to_seconds};
use engine::{
    ClockPlayerBackend, Command, Event, JsonFilePreferenceStore, MemoryPreferenceStore,
    PreferenceStore, RangeSlider, Thumb, TrimController, TrimSnapshot,
};
use iced::keyboard::{self, Key, Modifiers, key::Named};
use iced::widget::{Column, Row, button, column, container, row, scrollable, text, text_input};
use iced::widget::image;
use iced::{Element, Length, Subscription, Task, time};
use tracing::{info, warn};

use crate::bridge::{BridgeEvent, player_subscription};
use crate::config::AppConfig;
use crate::search::{DebounceAction, SearchDebouncer};
use crate::widgets::range_slider;

type Trim = TrimController<ClockPlayerBackend, Box<dyn PreferenceStore>>;

/// UI messages handled by the iced app update loop.
#[derive(Debug, Clone)]
pub enum Message {
    QueryChanged(String),
    ClearSearch,
    SearchElapsed(u64),
    PageSelected(usize),
    VideoSelected(String),
    CloseVideo,
    TogglePlayback,
    Trim(Command),
    ClockTick,
    Bridge(BridgeEvent),
}

/// Root UI state: catalog sidebar plus the trim view.
pub struct AppState {
    config: AppConfig,
    catalog: Catalog,
    search: SearchDebouncer,
    page: usize,
    results: VideosResponse,
    trim: Trim,
    selected: Option<Video>,
    thumbnail: Option<image::Handle>,
    status: String,
}

impl AppState {
    /// Boots the app from a loaded config. Startup failures degrade to an
    /// empty catalog or in-memory preferences and show up in the status line.
    pub fn boot(config: AppConfig, startup_errors: Vec<String>) -> (Self, Task<Message>) {
        let mut problems = startup_errors;

        let catalog = match Catalog::load(&config.catalog.path) {
            Ok(catalog) => catalog,
            Err(error) => {
                warn!(%error, "catalog unavailable");
                problems.push(error.to_string());
                Catalog::default()
            }
        };

        let store: Box<dyn PreferenceStore> = if config.prefs.persist {
            match JsonFilePreferenceStore::open(&config.prefs.path) {
                Ok(store) => Box::new(store),
                Err(error) => {
                    warn!(%error, "trim preferences unavailable, keeping them in memory");
                    problems.push(error.to_string());
                    Box::new(MemoryPreferenceStore::new())
                }
            }
        } else {
            info!("trim preferences kept in memory only");
            Box::new(MemoryPreferenceStore::new())
        };

        let slider = match RangeSlider::new(0.0, 100.0, config.trim.step) {
            Ok(slider) => slider,
            Err(error) => {
                warn!(%error, "falling back to the default slider");
                problems.push(error.to_string());
                RangeSlider::default()
            }
        };

        let status = if problems.is_empty() {
            String::from("loading player")
        } else {
            problems.join("; ")
        };

        (
            Self::from_parts(config, catalog, TrimController::new(store, slider), status),
            Task::none(),
        )
    }

    fn from_parts(config: AppConfig, catalog: Catalog, trim: Trim, status: String) -> Self {
        let results = catalog.search("", 1, config.catalog.page_size);
        Self {
            config,
            catalog,
            search: SearchDebouncer::default(),
            page: 1,
            results,
            trim,
            selected: None,
            thumbnail: None,
            status,
        }
    }

    /// Handles one UI message.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::QueryChanged(query) => {
                let action = self.search.edit(query);
                self.apply_query();
                if let DebounceAction::Wait { generation } = action {
                    let delay = self.config.search_debounce();
                    return Task::perform(
                        async move { tokio::time::sleep(delay).await },
                        move |()| Message::SearchElapsed(generation),
                    );
                }
            }
            Message::ClearSearch => {
                self.search.edit(String::new());
                self.apply_query();
            }
            Message::SearchElapsed(generation) => {
                if self.search.elapsed(generation) {
                    self.apply_query();
                }
            }
            Message::PageSelected(page) => {
                let last = self.results.pagination.total_pages.max(1);
                self.page = page.clamp(1, last);
                self.refresh_results();
            }
            Message::VideoSelected(video_id) => self.open_video(&video_id),
            Message::CloseVideo => {
                let events = self.trim.handle_command(Command::CloseMedia);
                self.apply_trim_events(events);
            }
            Message::TogglePlayback => self.dispatch(Command::TogglePlayPause),
            Message::Trim(command) => self.dispatch(command),
            Message::ClockTick => self.dispatch(Command::PollClock),
            Message::Bridge(BridgeEvent::Ready(sender)) => {
                let mut backend =
                    ClockPlayerBackend::new(sender, self.config.player.fallback_duration_secs);
                for (video_id, seconds) in self.catalog.durations() {
                    backend.set_duration(video_id, seconds);
                }
                let events = self.trim.attach_backend(backend);
                self.apply_trim_events(events);
                if self.status == "loading player" {
                    self.status = String::from("ready");
                }
            }
            Message::Bridge(BridgeEvent::Notification(notification)) => {
                self.dispatch(Command::from(notification));
            }
            Message::Bridge(BridgeEvent::Disconnected) => {
                warn!("player notification channel closed");
                self.status = String::from("player notification channel closed");
            }
        }

        Task::none()
    }

    fn apply_query(&mut self) {
        self.page = 1;
        self.refresh_results();
    }

    fn refresh_results(&mut self) {
        self.results =
            self.catalog
                .search(self.search.applied(), self.page, self.config.catalog.page_size);
    }

    fn open_video(&mut self, video_id: &str) {
        let Some(video) = self.catalog.find(video_id).cloned() else {
            self.status = format!("video {video_id} not found");
            return;
        };
        self.thumbnail = local_thumbnail(&video);
        self.selected = Some(video);
        let events = self.trim.handle_command(Command::OpenMedia {
            media_id: video_id.to_owned(),
        });
        self.apply_trim_events(events);
    }

    fn dispatch(&mut self, command: Command) {
        let events = self.trim.handle_command(command);
        self.apply_trim_events(events);
    }

    fn apply_trim_events(&mut self, events: Vec<Event>) {
        for event in events {
            match event {
                Event::MediaOpened {
                    media_id, restored, ..
                } => {
                    info!(%media_id, restored, "trim view opened");
                    self.status = if restored {
                        String::from("restored saved trim range")
                    } else {
                        String::new()
                    };
                }
                Event::MediaClosed => {
                    self.selected = None;
                    self.thumbnail = None;
                }
                Event::BoundaryReached(_) => {
                    self.status = String::from("reached end of trim range");
                }
                Event::PlayerCreated { .. }
                | Event::ClockChanged(_)
                | Event::RangeCommitted { .. }
                | Event::DragChanged(_) => {}
            }
        }
    }

    /// Renders the UI tree.
    pub fn view(&self) -> Element<'_, Message> {
        row![self.sidebar(), self.main_pane()]
            .height(Length::Fill)
            .into()
    }

    fn sidebar(&self) -> Element<'_, Message> {
        let pagination = &self.results.pagination;
        let selected_id = self.selected.as_ref().map(|video| video.id.as_str());

        let list: Element<'_, Message> = if self.shows_no_results() {
            column![
                text("No results found").size(14),
                button("Clear search").on_press(Message::ClearSearch),
            ]
            .spacing(8)
            .into()
        } else {
            let cards = Column::with_children(self.results.videos.iter().map(|video| {
                video_card(video, selected_id == Some(video.id.as_str()))
            }))
            .spacing(8);
            scrollable(cards).height(Length::Fill).into()
        };

        column![
            text("Videos").size(22),
            text_input("Search videos", self.search.input()).on_input(Message::QueryChanged),
            text(results_summary(&self.results)).size(12),
            container(list).height(Length::Fill),
            pagination_controls(
                pagination.current_page,
                pagination.total_pages,
                pagination.has_prev_page,
                pagination.has_next_page,
            ),
        ]
        .spacing(12)
        .padding(16)
        .width(Length::Fixed(320.0))
        .into()
    }

    fn shows_no_results(&self) -> bool {
        !self.search.applied().is_empty() && self.results.videos.is_empty()
    }

    fn main_pane(&self) -> Element<'_, Message> {
        let content: Element<'_, Message> = match &self.selected {
            Some(video) => self.trim_view(video),
            None => column![
                text("Welcome to the video dashboard").size(26),
                text("Pick a video from the list to trim it.").size(14),
            ]
            .spacing(8)
            .into(),
        };

        container(column![content, text(&self.status).size(12)].spacing(16))
            .padding(24)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn trim_view(&self, video: &Video) -> Element<'_, Message> {
        let snapshot = self.trim.snapshot();
        let play_label = if snapshot.clock.is_playing {
            "Pause"
        } else {
            "Play"
        };

        column![
            row![
                text(video.title.clone()).size(24).width(Length::Fill),
                button("Close").on_press(Message::CloseVideo),
            ]
            .spacing(12),
            text(video.channel_title.clone()).size(13),
            range_slider::view(
                &snapshot,
                *self.trim.slider(),
                self.thumbnail.as_ref(),
                Message::Trim,
            ),
            row![
                button(play_label)
                    .on_press_maybe(snapshot.player_ready.then_some(Message::TogglePlayback)),
                text(time_readout(&snapshot)),
                text(range_readout(&snapshot)),
            ]
            .spacing(16),
            text("Space plays or pauses. Arrow keys move the start handle; hold Shift for the end handle.")
                .size(12),
        ]
        .spacing(12)
        .into()
    }

    /// Player notifications, keyboard shortcuts and the playback clock poll.
    /// The poll only runs while playback is active.
    pub fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![
            player_subscription().map(Message::Bridge),
            keyboard::on_key_press(key_message),
        ];
        if self.trim.wants_clock_poll() {
            subscriptions.push(time::every(self.config.poll_interval()).map(|_| Message::ClockTick));
        }
        Subscription::batch(subscriptions)
    }

    #[cfg(test)]
    fn for_test(catalog: Catalog) -> Self {
        let store: Box<dyn PreferenceStore> = Box::new(MemoryPreferenceStore::new());
        Self::from_parts(
            AppConfig::default(),
            catalog,
            TrimController::new(store, RangeSlider::default()),
            String::new(),
        )
    }
}

fn key_message(key: Key, modifiers: Modifiers) -> Option<Message> {
    let thumb = if modifiers.shift() {
        Thumb::End
    } else {
        Thumb::Start
    };
    match key.as_ref() {
        Key::Named(Named::Space) => Some(Message::TogglePlayback),
        Key::Named(Named::ArrowLeft) => Some(Message::Trim(Command::NudgeThumb { thumb, steps: -1 })),
        Key::Named(Named::ArrowRight) => Some(Message::Trim(Command::NudgeThumb { thumb, steps: 1 })),
        _ => None,
    }
}

fn video_card(video: &Video, selected: bool) -> Element<'_, Message> {
    let title = if selected {
        format!("▶ {}", video.title)
    } else {
        video.title.clone()
    };
    button(
        column![
            text(title).size(15),
            text(video.channel_title.clone()).size(12),
            text(excerpt(&video.description, 90)).size(12),
        ]
        .spacing(4),
    )
    .on_press(Message::VideoSelected(video.id.clone()))
    .width(Length::Fill)
    .into()
}

fn pagination_controls<'a>(
    current: usize,
    total: usize,
    has_prev: bool,
    has_next: bool,
) -> Element<'a, Message> {
    if total <= 1 {
        return Row::new().into();
    }

    let pages = page_window(current, total).into_iter().map(|page| -> Element<'a, Message> {
        let label = if page == current {
            format!("[{page}]")
        } else {
            page.to_string()
        };
        button(text(label))
            .on_press_maybe((page != current).then_some(Message::PageSelected(page)))
            .into()
    });

    let mut controls: Vec<Element<'a, Message>> = vec![
        button("‹")
            .on_press_maybe(has_prev.then(|| Message::PageSelected(current - 1)))
            .into(),
    ];
    controls.extend(pages);
    controls.push(
        button("›")
            .on_press_maybe(has_next.then(|| Message::PageSelected(current + 1)))
            .into(),
    );
    Row::with_children(controls).spacing(4).into()
}

fn results_summary(results: &VideosResponse) -> String {
    let pagination = &results.pagination;
    let mut summary = format!(
        "Showing {} of {} videos",
        results.videos.len(),
        pagination.total_videos
    );
    if pagination.total_pages > 1 {
        summary.push_str(&format!(
            " (Page {} of {})",
            pagination.current_page, pagination.total_pages
        ));
    }
    summary
}

fn local_thumbnail(video: &Video) -> Option<image::Handle> {
    let url = &video.thumbnails.best()?.url;
    let path = Path::new(url);
    path.is_file().then(|| image::Handle::from_path(path))
}

fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

fn time_readout(snapshot: &TrimSnapshot) -> String {
    format!(
        "{} / {}",
        format_timestamp(snapshot.clock.current_time),
        format_timestamp(snapshot.clock.duration)
    )
}

fn range_readout(snapshot: &TrimSnapshot) -> String {
    let duration = snapshot.clock.duration;
    match (
        percent_to_seconds(snapshot.range.start(), duration),
        percent_to_seconds(snapshot.range.end(), duration),
    ) {
        (Some(start), Some(end)) => format!(
            "Trim {} - {}",
            format_timestamp(start),
            format_timestamp(end)
        ),
        _ => format!(
            "Trim {:.0}% - {:.0}%",
            snapshot.range.start(),
            snapshot.range.end()
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use catalog::Catalog;
    use engine::{Command, PlayerEvent, Range, Thumb};
    use iced::keyboard::{Key, Modifiers, key::Named};

    use crate::bridge::BridgeEvent;

    use super::{AppState, Message, key_message, range_readout, results_summary};

    fn catalog(count: usize) -> Catalog {
        let items: Vec<String> = (1..=count)
            .map(|index| {
                format!(
                    r#"{{"id":{{"videoId":"v{index}"}},"snippet":{{"title":"Video {index}","description":"desc"}},"durationSeconds":{}}}"#,
                    index * 60
                )
            })
            .collect();
        Catalog::from_json_str(&format!(r#"{{"items":[{}]}}"#, items.join(",")))
            .expect("parse catalog")
    }

    #[test]
    fn debounced_query_applies_and_resets_page() {
        let mut app = AppState::for_test(catalog(25));
        let _ = app.update(Message::PageSelected(3));
        assert_eq!(app.page, 3);

        let _ = app.update(Message::QueryChanged("Video 2".to_owned()));
        assert_eq!(app.results.pagination.total_videos, 25);

        let _ = app.update(Message::SearchElapsed(1));
        assert_eq!(app.page, 1);
        assert_eq!(app.results.pagination.total_videos, 7);
    }

    #[test]
    fn every_edit_returns_to_first_page() {
        let mut app = AppState::for_test(catalog(25));
        let _ = app.update(Message::QueryChanged("Video".to_owned()));
        let _ = app.update(Message::SearchElapsed(1));
        let _ = app.update(Message::PageSelected(3));
        assert_eq!(app.page, 3);

        let _ = app.update(Message::QueryChanged("Video 1".to_owned()));
        assert_eq!(app.page, 1);
        let _ = app.update(Message::PageSelected(2));
        let _ = app.update(Message::QueryChanged("Video".to_owned()));
        assert_eq!(app.page, 1);

        let _ = app.update(Message::SearchElapsed(3));
        assert_eq!(app.page, 1);
        assert_eq!(app.results.pagination.current_page, 1);
    }

    #[test]
    fn clear_search_empties_query_and_returns_to_first_page() {
        let mut app = AppState::for_test(catalog(25));
        let _ = app.update(Message::QueryChanged("nothing matches".to_owned()));
        let _ = app.update(Message::SearchElapsed(1));
        assert!(app.shows_no_results());
        assert_eq!(results_summary(&app.results), "Showing 0 of 0 videos");

        let _ = app.update(Message::ClearSearch);
        assert_eq!(app.search.input(), "");
        assert_eq!(app.search.applied(), "");
        assert_eq!(app.page, 1);
        assert!(!app.shows_no_results());
        assert_eq!(app.results.pagination.total_videos, 25);
    }

    #[test]
    fn results_summary_names_page_only_when_paginated() {
        let mut app = AppState::for_test(catalog(25));
        assert_eq!(
            results_summary(&app.results),
            "Showing 10 of 25 videos (Page 1 of 3)"
        );

        let _ = app.update(Message::QueryChanged("Video 2".to_owned()));
        let _ = app.update(Message::SearchElapsed(1));
        assert_eq!(results_summary(&app.results), "Showing 7 of 7 videos");
    }

    #[test]
    fn clearing_query_applies_immediately() {
        let mut app = AppState::for_test(catalog(12));
        let _ = app.update(Message::QueryChanged("Video 1".to_owned()));
        let _ = app.update(Message::SearchElapsed(1));
        assert_eq!(app.results.pagination.total_videos, 4);

        let _ = app.update(Message::QueryChanged(String::new()));
        assert_eq!(app.results.pagination.total_videos, 12);
    }

    #[test]
    fn page_selection_is_clamped() {
        let mut app = AppState::for_test(catalog(25));
        let _ = app.update(Message::PageSelected(99));
        assert_eq!(app.page, 3);
        assert_eq!(app.results.videos.len(), 5);

        let _ = app.update(Message::PageSelected(0));
        assert_eq!(app.page, 1);
    }

    #[test]
    fn selecting_video_opens_it_for_trimming() {
        let mut app = AppState::for_test(catalog(3));
        let _ = app.update(Message::VideoSelected("v2".to_owned()));

        assert_eq!(app.trim.media_id(), Some("v2"));
        assert_eq!(
            app.selected.as_ref().map(|video| video.title.as_str()),
            Some("Video 2")
        );

        let _ = app.update(Message::CloseVideo);
        assert!(app.selected.is_none());
        assert_eq!(app.trim.media_id(), None);
    }

    #[test]
    fn player_bridge_ready_creates_player_with_catalog_duration() {
        let mut app = AppState::for_test(catalog(3));
        let _ = app.update(Message::VideoSelected("v2".to_owned()));
        assert!(!app.trim.is_backend_loaded());

        let (sender, receiver) = mpsc::channel();
        let _ = app.update(Message::Bridge(BridgeEvent::Ready(sender)));
        assert!(app.trim.is_backend_loaded());

        let notification = receiver
            .recv_timeout(Duration::from_secs(1))
            .expect("ready notification");
        assert_eq!(notification.event, PlayerEvent::Ready { duration: 120.0 });

        let _ = app.update(Message::Bridge(BridgeEvent::Notification(notification)));
        let snapshot = app.trim.snapshot();
        assert!(snapshot.player_ready);
        assert_eq!(snapshot.clock.duration, 120.0);
        assert!(!app.trim.wants_clock_poll());

        let _ = app.update(Message::TogglePlayback);
        assert!(app.trim.wants_clock_poll());
    }

    #[test]
    fn keyboard_shortcuts_map_to_trim_commands() {
        assert!(matches!(
            key_message(Key::Named(Named::Space), Modifiers::default()),
            Some(Message::TogglePlayback)
        ));
        assert!(matches!(
            key_message(Key::Named(Named::ArrowRight), Modifiers::SHIFT),
            Some(Message::Trim(Command::NudgeThumb {
                thumb: Thumb::End,
                steps: 1
            }))
        ));
        assert!(key_message(Key::Named(Named::Enter), Modifiers::default()).is_none());
    }

    #[test]
    fn range_readout_falls_back_to_percent_before_ready() {
        let mut app = AppState::for_test(catalog(1));
        let _ = app.update(Message::VideoSelected("v1".to_owned()));
        let _ = app.update(Message::Trim(Command::CommitRange(Range::new(10.0, 90.0))));

        assert_eq!(range_readout(&app.trim.snapshot()), "Trim 10% - 90%");
    }
}
