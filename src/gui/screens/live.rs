use iced::{
    Alignment::Center,
    Element, Length, Task,
    widget::{button, column, container, image as iced_image, text},
};

use crate::capture::{LiveSession, SessionControl, WebcamCapture};
use crate::detection::FillDetector;
use crate::gui::{
    AppState,
    screens::{Screen, ScreenMessage},
};
use crate::overlay::{FOOTER, Overlay};

pub struct LiveScreen {
    session: LiveSession<WebcamCapture>,
    frame: Option<iced_image::Handle>,
    status: String,
}

#[derive(Debug, Clone)]
pub enum LiveMessage {
    Tick,
    Key(char),
    Stop,
}

#[derive(Debug, Clone)]
pub enum LiveParentMessage {
    Closed,
}

impl LiveScreen {
    /// Opens the configured camera; fails when it is missing or busy
    pub fn open(state: &AppState) -> crate::Result<Self> {
        let session_config = state.config.session.clone();
        let (width, height) = session_config.capture_size;
        let camera = WebcamCapture::new(session_config.device_index, width, height)?;
        let overlay = Overlay::load(state.config.gui.font.as_deref())?;
        let detector = FillDetector::new(state.config.detector.clone());

        let mut session = LiveSession::new(camera, detector, overlay, session_config);
        session.start()?;

        Ok(Self {
            session,
            frame: None,
            status: "Hold the bottle in front of the camera".to_string(),
        })
    }

    fn closed() -> Task<ScreenMessage<Self>> {
        Task::done(ScreenMessage::ParentMessage(LiveParentMessage::Closed))
    }
}

impl Screen for LiveScreen {
    type Message = LiveMessage;
    type ParentMessage = LiveParentMessage;

    fn view(&self) -> Element<'_, ScreenMessage<Self>> {
        let frame: Element<'_, ScreenMessage<Self>> = match &self.frame {
            Some(handle) => iced_image(handle.clone())
                .width(Length::Fill)
                .height(Length::FillPortion(5))
                .into(),
            None => text("Waiting for camera...").size(24).into(),
        };

        let content = column![
            frame,
            text(&self.status).size(20),
            text(FOOTER).size(14),
            button("Stop").on_press(ScreenMessage::ScreenMessage(LiveMessage::Stop)),
        ]
        .spacing(10)
        .padding(20)
        .align_x(Center);

        container(content)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn update(
        &mut self,
        message: Self::Message,
        _state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        match message {
            LiveMessage::Tick => {
                if !self.session.is_running() {
                    return Task::none();
                }
                match self.session.next_frame() {
                    Ok(live) => {
                        if let Some(detection) = &live.detection {
                            self.status = match detection.status() {
                                Some(status) => format!("{} ({})", detection.message(), status.label()),
                                None => detection.message(),
                            };
                        }
                        let (width, height) = live.display.dimensions();
                        let rgba = image::DynamicImage::ImageRgb8(live.display).to_rgba8();
                        self.frame = Some(iced_image::Handle::from_rgba(width, height, rgba.into_raw()));
                    }
                    Err(e) => {
                        tracing::error!("Failed to capture frame: {:#}", e);
                        self.status = format!("Camera error: {e}");
                        self.session.stop();
                    }
                }
                Task::none()
            }
            LiveMessage::Key(key) => match self.session.handle_key(key) {
                Ok(SessionControl::Quit) => Self::closed(),
                Ok(SessionControl::Saved(path)) => {
                    self.status = format!("Frame saved as {}", path.display());
                    Task::none()
                }
                Ok(SessionControl::Continue) => Task::none(),
                Err(e) => {
                    self.status = e.to_string();
                    Task::none()
                }
            },
            LiveMessage::Stop => {
                self.session.stop();
                Self::closed()
            }
        }
    }
}
