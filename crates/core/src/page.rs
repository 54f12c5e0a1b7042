//! Page-level operations: navigation, descriptor interaction, capture.

use std::path::Path;

use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page as ChromePage, ScreenshotParams};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};
use crate::locator::{self, ClickOutcome, Descriptor, Probe};
use crate::wait::{WaitConfig, poll_until_ok};

/// One browsing page inside a [`Session`](crate::Session).
///
/// All element interaction goes through [`Descriptor`]s; there is no raw
/// CSS selector surface here.
#[derive(Debug, Clone)]
pub struct Page {
    inner: ChromePage,
}

impl Page {
    pub(crate) fn new(page: ChromePage) -> Self {
        Self { inner: page }
    }

    /// Loads `url` and waits for the document to finish loading.
    ///
    /// Both a failed load and a load that never completes within the
    /// bounded wait map to [`Error::Navigation`].
    pub async fn navigate(&self, url: &str, wait: WaitConfig) -> Result<()> {
        debug!(target: "uiv", %url, "navigate");

        self.inner.goto(url).await.map_err(|e| Error::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        poll_until_ok(
            || async { Ok(self.ready_state_complete().await?) },
            wait,
            "document load",
        )
        .await
        .map_err(|_| Error::Navigation {
            url: url.to_string(),
            reason: format!("load did not complete within {:?}", wait.timeout),
        })
    }

    async fn ready_state_complete(&self) -> Result<bool> {
        let state: String = self.evaluate("document.readyState").await?;
        Ok(state == "complete")
    }

    /// Clicks the element matching `descriptor`.
    ///
    /// Waits until exactly one match exists and it is visible and enabled;
    /// zero matches, ambiguous matches, or a never-interactable element
    /// all surface as [`Error::ElementNotFound`] with the last observed
    /// match count.
    pub async fn click(&self, descriptor: &Descriptor, wait: WaitConfig) -> Result<()> {
        debug!(target: "uiv", %descriptor, "click");

        let ready = poll_until_ok(
            || async { Ok(self.probe(descriptor).await?.interactable) },
            wait,
            "element interactable",
        )
        .await;

        if ready.is_err() {
            // Re-probe once for an accurate count in the error message.
            let matched = self.probe(descriptor).await.map(|p| p.count).unwrap_or(0);
            return Err(Error::ElementNotFound {
                descriptor: descriptor.to_string(),
                matched,
            });
        }

        let raw: String = self.evaluate(&locator::click_js(descriptor)).await?;
        let outcome: ClickOutcome =
            serde_json::from_str(&raw).map_err(|e| Error::Eval(e.to_string()))?;

        if !outcome.clicked {
            // The DOM changed between the probe and the click.
            return Err(Error::ElementNotFound {
                descriptor: descriptor.to_string(),
                matched: outcome.count,
            });
        }

        Ok(())
    }

    /// Waits until an element matching `descriptor` is visible.
    ///
    /// Returns [`Error::AssertionTimeout`] if nothing becomes visible
    /// before the deadline; never reports success early.
    pub async fn wait_visible(&self, descriptor: &Descriptor, wait: WaitConfig) -> Result<()> {
        debug!(target: "uiv", %descriptor, "assert visible");

        poll_until_ok(
            || async { Ok(self.probe(descriptor).await?.visible) },
            wait,
            &format!("{descriptor} to become visible"),
        )
        .await
    }

    /// Captures a PNG of the page to `path`, creating parent directories.
    ///
    /// Returns the number of bytes written; an empty capture is an error.
    pub async fn screenshot_to_file(&self, path: &Path, full_page: bool) -> Result<u64> {
        debug!(target: "uiv", path = %path.display(), full_page, "capture");

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(full_page)
            .build();

        let bytes = self
            .inner
            .screenshot(params)
            .await
            .map_err(|e| Error::Screenshot {
                path: path.to_path_buf(),
                source: std::io::Error::other(e.to_string()),
            })?;

        write_capture(path, &bytes)
    }

    /// Current page URL as the page itself reports it.
    pub async fn url(&self) -> Result<String> {
        self.evaluate("window.location.href").await
    }

    /// Current document title.
    pub async fn title(&self) -> Result<String> {
        self.evaluate("document.title").await
    }

    /// Evaluates JavaScript in the page and deserializes the result.
    pub async fn evaluate<T>(&self, script: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let result = self
            .inner
            .evaluate(script)
            .await
            .map_err(|e| Error::Eval(e.to_string()))?;

        result.into_value().map_err(|e| Error::Eval(e.to_string()))
    }

    /// Evaluates the descriptor probe against the live DOM.
    async fn probe(&self, descriptor: &Descriptor) -> Result<Probe> {
        let raw: String = self.evaluate(&locator::probe_js(descriptor)).await?;
        serde_json::from_str(&raw).map_err(|e| Error::Eval(e.to_string()))
    }

    pub(crate) async fn close(self) -> Result<()> {
        self.inner.close().await.map_err(Error::Cdp)
    }
}

/// Writes capture bytes to `path`, creating missing parent directories.
///
/// An empty capture is rejected before anything touches the filesystem.
fn write_capture(path: &Path, bytes: &[u8]) -> Result<u64> {
    if bytes.is_empty() {
        return Err(Error::Screenshot {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "capture produced no data"),
        });
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| Error::Screenshot {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    std::fs::write(path, bytes).map_err(|source| Error::Screenshot {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(bytes.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_capture_rejects_empty_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("empty.png");

        let err = write_capture(&target, &[]).unwrap_err();
        match err {
            Error::Screenshot { path, source } => {
                assert_eq!(path, target);
                assert_eq!(source.kind(), std::io::ErrorKind::InvalidData);
            }
            other => panic!("expected screenshot error, got {other:?}"),
        }
        assert!(!target.exists());
    }

    #[test]
    fn write_capture_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("shots/reports/a.png");
        let bytes = [0x89, b'P', b'N', b'G'];

        let written = write_capture(&target, &bytes).unwrap();

        assert_eq!(written, bytes.len() as u64);
        assert_eq!(std::fs::read(&target).unwrap(), bytes);
    }

    #[test]
    fn write_capture_without_parent_writes_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let cwd_relative = dir.path().join("flat.png");

        let written = write_capture(&cwd_relative, b"png-bytes").unwrap();

        assert_eq!(written, 9);
        assert!(cwd_relative.exists());
    }
}
