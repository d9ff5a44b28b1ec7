use std::path::{Path, PathBuf};

use iced::{
    Alignment::Center,
    Color, Element, Length, Task,
    widget::{button, column, container, image as iced_image, row, text},
};
use rfd::AsyncFileDialog;

use crate::gui::{
    AppState,
    screens::{Screen, ScreenMessage},
};

const HEADER_COLOR: Color = Color::from_rgb8(0x1A, 0x75, 0x9F);
const RESULT_COLOR: Color = Color::from_rgb8(0x18, 0x4E, 0x77);
const FRAME_COLOR: Color = Color::from_rgb8(0x76, 0xC8, 0x93);

#[derive(Debug, Clone)]
pub struct UploadScreen {
    preview: Option<iced_image::Handle>,
    preview_size: u32,
    result: String,
}

#[derive(Debug, Clone)]
pub enum UploadMessage {
    Upload,
    Picked(Option<PathBuf>),
}

#[derive(Debug, Clone)]
pub enum UploadParentMessage {
    OpenLive,
}

impl UploadScreen {
    pub fn new(preview_size: u32) -> Self {
        Self {
            preview: None,
            preview_size,
            result: String::new(),
        }
    }

    /// Shown in the result label, e.g. when the camera could not be opened
    pub fn with_notice(preview_size: u32, notice: impl Into<String>) -> Self {
        Self {
            result: notice.into(),
            ..Self::new(preview_size)
        }
    }

    fn load(&mut self, path: &Path, state: &AppState) {
        self.preview = Some(iced_image::Handle::from_path(path));
        match state.detector.detect_file(path) {
            Ok(detection) => {
                tracing::info!("{}: {}", path.display(), detection.message());
                self.result = detection.message();
            }
            Err(e) => {
                tracing::warn!("failed to estimate {}: {:#}", path.display(), e);
                self.result.clear();
            }
        }
    }
}

impl Screen for UploadScreen {
    type Message = UploadMessage;
    type ParentMessage = UploadParentMessage;

    fn view(&self) -> Element<'_, ScreenMessage<Self>> {
        let size = Length::Fixed(self.preview_size as f32);

        let preview: Element<'_, ScreenMessage<Self>> = match &self.preview {
            Some(handle) => iced_image(handle.clone()).width(size).height(size).into(),
            None => text("No image selected").into(),
        };

        let content = column![
            text("Bottles spill, and we count it").size(40).color(HEADER_COLOR),
            container(preview)
                .width(size)
                .height(size)
                .center_x(size)
                .center_y(size)
                .style(|_| container::Style::default().border(iced::Border {
                    color: FRAME_COLOR,
                    width: 2.0,
                    radius: 0.0.into(),
                })),
            row![
                button("Upload Image")
                    .on_press(ScreenMessage::ScreenMessage(UploadMessage::Upload))
                    .padding([15, 30]),
                button("Live Camera")
                    .on_press(ScreenMessage::ParentMessage(UploadParentMessage::OpenLive))
                    .padding([15, 30]),
            ]
            .spacing(20),
            text(&self.result).size(24).color(RESULT_COLOR),
        ]
        .spacing(20)
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
        state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        match message {
            UploadMessage::Upload => Task::perform(
                AsyncFileDialog::new()
                    .set_title("Open Image")
                    .add_filter("Images", &["png", "jpg", "jpeg"])
                    .pick_file(),
                |handle| {
                    ScreenMessage::ScreenMessage(UploadMessage::Picked(
                        handle.map(|file| file.path().to_path_buf()),
                    ))
                },
            ),
            UploadMessage::Picked(Some(path)) => {
                self.load(&path, state);
                Task::none()
            }
            UploadMessage::Picked(None) => Task::none(),
        }
    }
}
