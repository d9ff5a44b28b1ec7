mod app;
mod message;
pub mod screens;
mod state;

pub use app::{FillApp, run};
pub use message::Message;
pub use state::AppState;
