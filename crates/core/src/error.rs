//! Error taxonomy for browser verification operations.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Chrome could not be started or configured.
    #[error("browser launch failed: {reason}")]
    Launch {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The CDP connection dropped or a page could not be opened.
    #[error("browser connection failed: {0}")]
    Connection(String),

    /// Page load did not complete.
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// A click target did not resolve to exactly one interactable element
    /// within the bounded wait. `matched` is the last observed match count.
    #[error("element not found or not interactable: {descriptor} ({matched} matched, expected exactly 1)")]
    ElementNotFound { descriptor: String, matched: usize },

    /// A visibility assertion did not hold before the deadline.
    #[error("timeout after {timeout:?} waiting for: {condition}")]
    AssertionTimeout { condition: String, timeout: Duration },

    #[error("javascript evaluation failed: {0}")]
    Eval(String),

    /// Screenshot capture or write failed.
    #[error("screenshot failed at {path}: {source}")]
    Screenshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An operation was attempted on a closed session.
    #[error("browser session already closed")]
    AlreadyClosed,

    #[error(transparent)]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
