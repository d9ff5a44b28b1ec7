use std::path::PathBuf;

/// Errors surfaced by the library outside of the pipeline steps
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open image {path}: {source}")]
    ImageOpen {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to save image {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("camera error: {0}")]
    Camera(String),

    #[error("live session is not running")]
    SessionStopped,

    #[error("no frame has been captured yet")]
    NoFrame,

    #[error("failed to load font {path}: {reason}")]
    Font { path: PathBuf, reason: String },

    #[error("invalid configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("debug directory is not empty: {0}")]
    DebugDir(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
