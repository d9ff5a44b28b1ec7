#[cfg(feature = "camera")]
use crate::gui::screens::live::LiveScreen;
use crate::gui::screens::{ScreenMessage, splash::SplashScreen, upload::UploadScreen};

#[derive(Debug, Clone)]
pub enum Message {
    Splash(ScreenMessage<SplashScreen>),
    Upload(ScreenMessage<UploadScreen>),
    #[cfg(feature = "camera")]
    Live(ScreenMessage<LiveScreen>),
    OpenLive,
    CloseLive,
}
