//! Browser session lifecycle.
//!
//! A [`Session`] is one Chrome process handle plus one browsing context,
//! created at run start and released at run end. It is an explicit value
//! threaded through the caller's code, never process-global state.

use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::page::Page;

/// Launch configuration for a verification session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Run without a visible window (default: true).
    pub headless: bool,

    /// Browser window size (default: 1280x800).
    pub window_size: (u32, u32),

    /// Additional Chrome arguments.
    pub args: Vec<String>,

    /// Chrome executable path (None = auto-detect).
    pub chrome_path: Option<String>,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the browser window, for watching a flow execute locally.
    pub fn headful(mut self) -> Self {
        self.headless = false;
        self
    }

    pub fn with_chrome_path(mut self, path: impl Into<String>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    fn to_browser_config(&self) -> Result<BrowserConfig> {
        let mut config = BrowserConfig::builder();

        if self.headless {
            config = config.arg("--headless");
        }

        config = config.arg(format!(
            "--window-size={},{}",
            self.window_size.0, self.window_size.1
        ));

        // A unique user data directory keeps this session's browsing
        // context isolated and avoids ProcessSingleton conflicts when
        // several sessions run on the same machine.
        let user_data_dir = std::env::temp_dir().join(format!("uiv-{}", uuid::Uuid::new_v4()));
        config = config.arg(format!("--user-data-dir={}", user_data_dir.display()));

        for arg in &self.args {
            config = config.arg(arg.clone());
        }

        if let Some(path) = &self.chrome_path {
            config = config.chrome_executable(path.clone());
        }

        config.build().map_err(|e| Error::Launch {
            reason: format!("invalid browser configuration: {e}"),
            source: None,
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1280, 800),
            args: vec![
                // Required where user namespaces are unavailable (containers, CI).
                "--no-sandbox".to_string(),
                // Prevents /dev/shm exhaustion in containerized environments.
                "--disable-dev-shm-usage".to_string(),
            ],
            chrome_path: None,
        }
    }
}

/// A live browser process with one open page.
///
/// Prefer explicit [`Session::close`]; Drop falls back to killing the
/// Chrome process so a failed run never leaks it.
pub struct Session {
    browser: Option<Browser>,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl Session {
    /// Launches Chrome and opens the session's single page.
    pub async fn launch(config: SessionConfig) -> Result<Self> {
        debug!(target: "uiv", ?config, "launching browser");

        let browser_config = config.to_browser_config()?;

        let (browser, mut handler) =
            Browser::launch(browser_config)
                .await
                .map_err(|e| Error::Launch {
                    reason: "failed to launch Chrome process".to_string(),
                    source: Some(Box::new(e)),
                })?;

        // Drive the CDP event loop; chromiumoxide requires this to make
        // any progress on the connection.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!(target: "uiv", error = %e, "browser handler error");
                }
            }
        });

        let chrome_page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        debug!(target: "uiv", "browser ready");

        Ok(Self {
            browser: Some(browser),
            page: Page::new(chrome_page),
            handler_task,
        })
    }

    /// The session's page. Exactly one exists for the session's lifetime.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Gracefully shuts the browser down.
    pub async fn close(mut self) -> Result<()> {
        let Some(mut browser) = self.browser.take() else {
            return Err(Error::AlreadyClosed);
        };

        debug!(target: "uiv", "closing browser");

        let _ = self.page.clone().close().await;
        let close_result = browser.close().await.map_err(Error::Cdp);
        self.handler_task.abort();
        close_result.map(|_| ())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // close() takes the browser out; if it is still here the session
        // was dropped without explicit teardown and chromiumoxide's own
        // Drop kills the Chrome process.
        if self.browser.is_some() {
            warn!(target: "uiv", "session dropped without close(), killing browser process");
        }
        self.handler_task.abort();
    }
}
