#[cfg(feature = "camera")]
pub mod live;
pub mod splash;
pub mod upload;

use iced::{Element, Task};

use crate::gui::{AppState, Message};

pub enum ScreenMessage<S: Screen> {
    ScreenMessage(S::Message),
    ParentMessage(S::ParentMessage),
}

impl<S: Screen> Clone for ScreenMessage<S> {
    fn clone(&self) -> Self {
        match self {
            ScreenMessage::ScreenMessage(msg) => ScreenMessage::ScreenMessage(msg.clone()),
            ScreenMessage::ParentMessage(msg) => ScreenMessage::ParentMessage(msg.clone()),
        }
    }
}

impl<S: Screen> std::fmt::Debug for ScreenMessage<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenMessage::ScreenMessage(msg) => f.debug_tuple("ScreenMessage").field(msg).finish(),
            ScreenMessage::ParentMessage(msg) => f.debug_tuple("ParentMessage").field(msg).finish(),
        }
    }
}

pub trait Screen: Sized {
    type Message: std::fmt::Debug + Clone;
    type ParentMessage: std::fmt::Debug + Clone;
    fn view(&self) -> Element<'_, ScreenMessage<Self>>;
    fn update(&mut self, message: Self::Message, state: &mut AppState)
    -> Task<ScreenMessage<Self>>;
}

pub enum ScreenData {
    Splash(splash::SplashScreen),
    Upload(upload::UploadScreen),
    #[cfg(feature = "camera")]
    Live(live::LiveScreen),
}

impl ScreenData {
    fn upload(state: &AppState) -> Self {
        ScreenData::Upload(upload::UploadScreen::new(state.config.gui.preview_size))
    }

    #[cfg(feature = "camera")]
    fn live(state: &AppState) -> Self {
        match live::LiveScreen::open(state) {
            Ok(screen) => ScreenData::Live(screen),
            Err(e) => {
                tracing::error!("Failed to open camera: {}", e);
                ScreenData::Upload(upload::UploadScreen::with_notice(
                    state.config.gui.preview_size,
                    format!("Camera unavailable: {e}"),
                ))
            }
        }
    }

    #[cfg(not(feature = "camera"))]
    fn live(state: &AppState) -> Self {
        ScreenData::Upload(upload::UploadScreen::with_notice(
            state.config.gui.preview_size,
            "Built without camera support",
        ))
    }
}

impl Screen for ScreenData {
    type Message = Message;
    type ParentMessage = std::convert::Infallible;

    fn view(&self) -> Element<'_, ScreenMessage<Self>> {
        match self {
            ScreenData::Splash(screen) => screen.view().map(Message::Splash),
            ScreenData::Upload(screen) => screen.view().map(Message::Upload),
            #[cfg(feature = "camera")]
            ScreenData::Live(screen) => screen.view().map(Message::Live),
        }
        .map(ScreenMessage::ScreenMessage)
    }

    fn update(
        &mut self,
        message: Self::Message,
        state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        match (self, message) {
            (x, Message::Splash(ScreenMessage::ParentMessage(splash::SplashParentMessage::Finished))) => {
                if matches!(x, ScreenData::Splash(_)) {
                    *x = Self::upload(state);
                }
                Task::none()
            }
            (ScreenData::Upload(page), Message::Upload(msg)) => match msg {
                ScreenMessage::ScreenMessage(msg) => page
                    .update(msg, state)
                    .map(Message::Upload)
                    .map(ScreenMessage::ScreenMessage),
                ScreenMessage::ParentMessage(upload::UploadParentMessage::OpenLive) => {
                    *page = upload::UploadScreen::new(state.config.gui.preview_size);
                    Task::done(ScreenMessage::ScreenMessage(Message::OpenLive))
                }
            },
            (x, Message::OpenLive) => {
                *x = Self::live(state);
                Task::none()
            }
            #[cfg(feature = "camera")]
            (ScreenData::Live(page), Message::Live(msg)) => match msg {
                ScreenMessage::ScreenMessage(msg) => page
                    .update(msg, state)
                    .map(Message::Live)
                    .map(ScreenMessage::ScreenMessage),
                ScreenMessage::ParentMessage(live::LiveParentMessage::Closed) => {
                    Task::done(ScreenMessage::ScreenMessage(Message::CloseLive))
                }
            },
            (x, Message::CloseLive) => {
                *x = Self::upload(state);
                Task::none()
            }
            _ => Task::none(),
        }
    }
}
