use engine::slider::layout;
use engine::{
    Command, DragState, Range, RangeSlider, SliderLayout, THUMB_WIDTH_PX, Thumb, TrackBounds,
    TrimSnapshot, thumb_at,
};
use iced::widget::canvas::{self, Path, Stroke};
use iced::widget::{Row, container, image, stack};
use iced::{Color, ContentFit, Element, Length, Point, Rectangle, Size, Theme, mouse, touch};

/// Height of the slider track.
pub const TRACK_HEIGHT: f32 = 56.0;

/// Thumbnail tiles repeated behind the track.
const THUMBNAIL_TILES: usize = 8;

const TRACK_COLOR: Color = rgba8(229, 229, 229, 1.0);
const SHADE_COLOR: Color = rgba8(23, 23, 23, 0.65);
const BAND_FILL: Color = rgba8(23, 23, 23, 0.2);
const ACCENT_COLOR: Color = rgba8(249, 115, 22, 1.0);
const ACTIVE_ACCENT_COLOR: Color = rgba8(234, 88, 12, 1.0);

const fn rgba8(r: u8, g: u8, b: u8, a: f32) -> Color {
    Color {
        r: r as f32 / 255.0,
        g: g as f32 / 255.0,
        b: b as f32 / 255.0,
        a,
    }
}

#[derive(Debug, Default)]
struct RangeSliderState {
    pressed: bool,
}

#[derive(Debug)]
struct RangeSliderProgram<Message> {
    slider: RangeSlider,
    range: Range,
    current_time: f64,
    duration: f64,
    drag: DragState,
    has_backdrop: bool,
    on_input: fn(Command) -> Message,
}

impl<Message> RangeSliderProgram<Message> {
    fn layout(&self, width: f32) -> SliderLayout {
        layout(
            &self.slider,
            &self.range,
            self.current_time,
            self.duration,
            width,
        )
    }

    fn press(
        &self,
        state: &mut RangeSliderState,
        bounds: Rectangle,
        position: Point,
    ) -> (canvas::event::Status, Option<Message>) {
        let local_x = position.x - bounds.x;
        let command = match thumb_at(&self.layout(bounds.width), local_x) {
            Some(thumb) => {
                state.pressed = true;
                Command::PointerDown { thumb }
            }
            None => Command::TrackClick {
                x: position.x,
                track: track_bounds(bounds),
            },
        };
        (canvas::event::Status::Captured, Some((self.on_input)(command)))
    }
}

fn track_bounds(bounds: Rectangle) -> TrackBounds {
    TrackBounds::new(bounds.x, bounds.width)
}

fn dimmed(color: Color, disabled: bool) -> Color {
    if disabled {
        Color {
            a: color.a * 0.5,
            ..color
        }
    } else {
        color
    }
}

impl<Message> canvas::Program<Message> for RangeSliderProgram<Message> {
    type State = RangeSliderState;

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        if self.slider.is_disabled() {
            state.pressed = false;
            return (canvas::event::Status::Ignored, None);
        }

        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let Some(position) = cursor.position_over(bounds) else {
                    return (canvas::event::Status::Ignored, None);
                };
                self.press(state, bounds, position)
            }
            canvas::Event::Touch(touch::Event::FingerPressed { position, .. }) => {
                if !bounds.contains(position) {
                    return (canvas::event::Status::Ignored, None);
                }
                self.press(state, bounds, position)
            }
            canvas::Event::Mouse(mouse::Event::CursorMoved { position })
            | canvas::Event::Touch(touch::Event::FingerMoved { position, .. })
                if state.pressed =>
            {
                let command = Command::PointerMove {
                    x: position.x,
                    track: track_bounds(bounds),
                };
                (canvas::event::Status::Captured, Some((self.on_input)(command)))
            }
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left))
            | canvas::Event::Touch(
                touch::Event::FingerLifted { .. } | touch::Event::FingerLost { .. },
            ) if state.pressed => {
                state.pressed = false;
                (
                    canvas::event::Status::Captured,
                    Some((self.on_input)(Command::PointerUp)),
                )
            }
            _ => (canvas::event::Status::Ignored, None),
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let disabled = self.slider.is_disabled();
        let geometry = self.layout(bounds.width);
        let height = bounds.height;
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        if !self.has_backdrop {
            let background = Path::rectangle(Point::ORIGIN, frame.size());
            frame.fill(&background, dimmed(TRACK_COLOR, disabled));
        }

        let band = Path::rectangle(
            Point::new(geometry.band_x, 0.0),
            Size::new(geometry.band_width.max(0.0), height),
        );
        frame.fill(&band, BAND_FILL);
        frame.stroke(
            &band,
            Stroke::default()
                .with_width(4.0)
                .with_color(dimmed(ACCENT_COLOR, disabled)),
        );

        let left_shade = Path::rectangle(
            Point::ORIGIN,
            Size::new(geometry.left_shade_width.max(0.0), height),
        );
        frame.fill(&left_shade, SHADE_COLOR);
        let right_shade = Path::rectangle(
            Point::new(geometry.right_shade_x, 0.0),
            Size::new(geometry.right_shade_width.max(0.0), height),
        );
        frame.fill(&right_shade, SHADE_COLOR);

        if let Some(x) = geometry.playhead_x {
            let line = Path::line(Point::new(x, 0.0), Point::new(x, height));
            frame.stroke(
                &line,
                Stroke::default().with_width(2.0).with_color(Color::WHITE),
            );
        }

        for (thumb, x) in [
            (Thumb::Start, geometry.start_thumb_x),
            (Thumb::End, geometry.end_thumb_x),
        ] {
            let color = if self.drag == DragState::Dragging(thumb) {
                ACTIVE_ACCENT_COLOR
            } else {
                ACCENT_COLOR
            };
            let handle = Path::rectangle(Point::new(x, 0.0), Size::new(THUMB_WIDTH_PX, height));
            frame.fill(&handle, dimmed(color, disabled));

            let grip_x = x + THUMB_WIDTH_PX / 2.0;
            let grip = Path::line(
                Point::new(grip_x, height * 0.3),
                Point::new(grip_x, height * 0.7),
            );
            frame.stroke(
                &grip,
                Stroke::default().with_width(2.0).with_color(Color::WHITE),
            );
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.pressed {
            return mouse::Interaction::Grabbing;
        }
        let Some(position) = cursor.position_over(bounds) else {
            return mouse::Interaction::None;
        };
        if self.slider.is_disabled() {
            return mouse::Interaction::NotAllowed;
        }
        match thumb_at(&self.layout(bounds.width), position.x - bounds.x) {
            Some(_) => mouse::Interaction::Grab,
            None => mouse::Interaction::Pointer,
        }
    }
}

/// Renders the dual-handle trim slider over an optional thumbnail strip.
pub fn view<'a, Message>(
    snapshot: &TrimSnapshot,
    slider: RangeSlider,
    thumbnail: Option<&image::Handle>,
    on_input: fn(Command) -> Message,
) -> Element<'a, Message>
where
    Message: 'a,
{
    let track = canvas::Canvas::new(RangeSliderProgram {
        slider,
        range: snapshot.range,
        current_time: snapshot.clock.current_time,
        duration: snapshot.clock.duration,
        drag: snapshot.drag,
        has_backdrop: thumbnail.is_some(),
        on_input,
    })
    .width(Length::Fill)
    .height(Length::Fixed(TRACK_HEIGHT));

    let content: Element<'a, Message> = match thumbnail {
        Some(handle) => {
            let strip = Row::with_children((0..THUMBNAIL_TILES).map(|_| -> Element<'a, Message> {
                image(handle.clone())
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .content_fit(ContentFit::Cover)
                    .into()
            }))
            .width(Length::Fill)
            .height(Length::Fixed(TRACK_HEIGHT));
            stack![strip, track].into()
        }
        None => track.into(),
    };

    container(content)
        .width(Length::Fill)
        .height(Length::Fixed(TRACK_HEIGHT))
        .clip(true)
        .into()
}
