//! Test-spec model: the builder test authors use and the message values it produces.

pub mod builder;
pub mod frames;
pub mod message;

pub use builder::{LspTestSpec, ENGINE_FILE};
pub use frames::{CapturedFrames, Frame};
pub use message::{
    MessageSpec, NotificationSpec, RequestOptions, RequestSpec, WaitForNotificationSpec,
    WaitForRequestSpec,
};
