use std::time::Duration;

use iced::{Background, Color, Element, Length, Subscription, Task, Theme, widget::container};
#[cfg(feature = "camera")]
use iced::{Event, event, keyboard};

use crate::config::AppConfig;
#[cfg(feature = "camera")]
use crate::gui::screens::live::LiveMessage;
use crate::gui::{
    AppState, Message,
    screens::{
        Screen, ScreenData, ScreenMessage,
        splash::{SplashParentMessage, SplashScreen},
        upload::UploadScreen,
    },
};

const BACKGROUND: Color = Color::from_rgb8(0xD9, 0xED, 0x92);
#[cfg(feature = "camera")]
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

pub struct FillApp {
    screen: ScreenData,
    state: AppState,
}

impl FillApp {
    pub fn new(config: AppConfig) -> (Self, Task<Message>) {
        let screen = match &config.gui.splash {
            Some(picture) => ScreenData::Splash(SplashScreen::new(Some(picture))),
            None => ScreenData::Upload(UploadScreen::new(config.gui.preview_size)),
        };
        let state = AppState::new(config);
        (Self { screen, state }, Task::none())
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        self.screen
            .update(message, &mut self.state)
            .map(|msg| match msg {
                ScreenMessage::ScreenMessage(msg) => msg,
                ScreenMessage::ParentMessage(never) => match never {},
            })
    }

    pub fn view(&self) -> Element<'_, Message> {
        let content = self.screen.view().map(|msg| match msg {
            ScreenMessage::ScreenMessage(msg) => msg,
            ScreenMessage::ParentMessage(never) => match never {},
        });

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_| container::Style::default().background(Background::Color(BACKGROUND)))
            .into()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        match &self.screen {
            ScreenData::Splash(_) => {
                let delay = Duration::from_millis(self.state.config.gui.splash_duration_ms);
                iced::time::every(delay).map(|_| {
                    Message::Splash(ScreenMessage::ParentMessage(SplashParentMessage::Finished))
                })
            }
            #[cfg(feature = "camera")]
            ScreenData::Live(_) => Subscription::batch([
                iced::time::every(FRAME_INTERVAL).map(|_| live_message(LiveMessage::Tick)),
                event::listen_with(key_press),
            ]),
            ScreenData::Upload(_) => Subscription::none(),
        }
    }
}

#[cfg(feature = "camera")]
fn live_message(msg: LiveMessage) -> Message {
    Message::Live(ScreenMessage::ScreenMessage(msg))
}

#[cfg(feature = "camera")]
fn key_press(event: Event, _status: event::Status, _window: iced::window::Id) -> Option<Message> {
    match event {
        Event::Keyboard(keyboard::Event::KeyPressed {
            key: keyboard::Key::Character(c),
            ..
        }) => c.chars().next().map(|key| live_message(LiveMessage::Key(key))),
        _ => None,
    }
}

/// Open the desktop window and block until it is closed
pub fn run(config: AppConfig) -> iced::Result {
    iced::application(
        move || FillApp::new(config.clone()),
        FillApp::update,
        FillApp::view,
    )
    .title(|_: &FillApp| "Water Bottle Fill Level".to_string())
    .subscription(FillApp::subscription)
    .theme(|_: &FillApp| Theme::Light)
    .run()
}
