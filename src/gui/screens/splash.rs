use std::convert::Infallible;
use std::path::Path;

use iced::{
    Element, Length, Task,
    widget::{container, image as iced_image, text},
};

use crate::gui::{
    AppState,
    screens::{Screen, ScreenMessage},
};

#[derive(Debug, Clone)]
pub struct SplashScreen {
    picture: Option<iced_image::Handle>,
}

#[derive(Debug, Clone)]
pub enum SplashParentMessage {
    Finished,
}

impl SplashScreen {
    pub fn new(picture: Option<&Path>) -> Self {
        Self {
            picture: picture.map(iced_image::Handle::from_path),
        }
    }
}

impl Screen for SplashScreen {
    type Message = Infallible;
    type ParentMessage = SplashParentMessage;

    fn view(&self) -> Element<'_, ScreenMessage<Self>> {
        let content: Element<'_, ScreenMessage<Self>> = match &self.picture {
            Some(handle) => iced_image(handle.clone())
                .width(Length::Fixed(300.0))
                .height(Length::Fixed(300.0))
                .into(),
            None => text("Loading...").size(32).into(),
        };

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
        match message {}
    }
}
