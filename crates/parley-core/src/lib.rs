pub mod config;
pub mod error;
pub mod normalize;
pub mod page;
pub mod session;
pub mod stability;
pub mod tracker;
pub mod wait;

#[cfg(test)]
mod mock;

pub use config::{
    DEFAULT_CHAT_URL, DEFAULT_INPUT_SELECTOR, DEFAULT_REPLY_SELECTOR, TrackerConfig,
};
pub use error::{AccessError, Error, Result};
pub use normalize::normalize;
pub use page::{Key, Keystroke, PageAccessor, encode_prompt};
pub use session::Session;
pub use stability::{Observation, StabilitySnapshot};
pub use tracker::ReplyTracker;
pub use wait::wait_for_presence;
