use std::time::Duration;
use thiserror::Error;

/// Failures reported by a [`PageAccessor`](crate::PageAccessor).
///
/// Inside the polling loops every variant is treated as transient: the
/// loop logs it and tries again on the next tick.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("No element matches selector: {0}")]
    NotFound(String),

    #[error("Element is no longer attached to the page: {0}")]
    Stale(String),

    #[error("Timed out after {timeout:?} waiting for selector: {selector}")]
    Timeout { selector: String, timeout: Duration },

    #[error("Page access failed: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("No new reply detected after {attempts} checks")]
    NoReply { attempts: u32 },

    #[error("Reply did not stabilize after {attempts} checks")]
    UnstableReply { attempts: u32 },

    #[error("Prompt is empty")]
    EmptyPrompt,

    #[error("Input control '{selector}' is not available: {source}")]
    InputUnavailable {
        selector: String,
        #[source]
        source: AccessError,
    },

    #[error("Chat input '{selector}' did not appear within {waited:?}; login not completed")]
    LoginTimeout { selector: String, waited: Duration },

    #[error("Failed to convert reply markup: {0}")]
    Normalize(String),

    #[error(transparent)]
    Access(#[from] AccessError),
}

pub type Result<T> = std::result::Result<T, Error>;
