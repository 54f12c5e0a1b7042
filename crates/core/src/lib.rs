//! Browser engine layer for scripted UI verification.
//!
//! This crate wraps headless Chrome (via chromiumoxide) with the small set
//! of capabilities a verification flow needs: launching an isolated
//! session, navigating, locating elements by accessible role and name,
//! waiting for visibility with a bounded poll, and capturing full-page
//! screenshots.
//!
//! - [`Session`]: one browser process handle plus one browsing context
//! - [`Page`]: navigation, descriptor-based interaction, capture
//! - [`Descriptor`]: role + accessible-name pair, markup-independent
//! - [`WaitConfig`]: fixed-interval polling with a hard deadline
//!
//! There is no retry or recovery here; every operation returns a typed
//! [`Error`] and the first failure is the caller's to handle.

pub mod error;
pub mod locator;
pub mod page;
pub mod session;
pub mod wait;

pub use error::{Error, Result};
pub use locator::{Descriptor, Role};
pub use page::Page;
pub use session::{Session, SessionConfig};
pub use wait::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, WaitConfig};
