use crate::config::AppConfig;
use crate::detection::FillDetector;

/// State shared by every screen
pub struct AppState {
    pub config: AppConfig,
    pub detector: FillDetector,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let detector = FillDetector::new(config.detector.clone());
        Self { config, detector }
    }
}
