//! The verification runner: executes a resolved flow against one session.
//!
//! Execution is strictly sequential. The run moves through
//! `NotStarted -> Running -> {Completed | Failed}`; teardown (driver
//! close) happens exactly once, on the transition into either terminal
//! state, whether or not any step failed. The first failing step aborts
//! everything after it and its error is surfaced unchanged.

use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use uiv::{Descriptor, Session, WaitConfig};

use crate::error::CliError;
use crate::flow::ResolvedStep;

/// Seam between runner semantics and the browser engine.
///
/// The runner only needs these five capabilities; tests exercise the
/// runner against a scripted fake instead of a live browser.
#[async_trait]
pub trait FlowDriver {
	async fn navigate(&mut self, url: &Url) -> uiv::Result<()>;
	async fn click(&mut self, descriptor: &Descriptor) -> uiv::Result<()>;
	async fn assert_visible(&mut self, descriptor: &Descriptor) -> uiv::Result<()>;
	async fn capture(&mut self, path: &Path) -> uiv::Result<()>;

	/// Releases the underlying session. Called exactly once per run.
	async fn close(&mut self) -> uiv::Result<()>;
}

/// [`FlowDriver`] over a live [`Session`].
pub struct SessionDriver {
	session: Option<Session>,
	wait: WaitConfig,
	out_dir: PathBuf,
}

impl SessionDriver {
	pub fn new(session: Session, wait: WaitConfig, out_dir: PathBuf) -> Self {
		Self {
			session: Some(session),
			wait,
			out_dir,
		}
	}

	fn session(&self) -> uiv::Result<&Session> {
		self.session.as_ref().ok_or(uiv::Error::AlreadyClosed)
	}

	/// Relative capture paths land under the configured output directory.
	fn capture_path(&self, path: &Path) -> PathBuf {
		if path.is_absolute() {
			path.to_path_buf()
		} else {
			self.out_dir.join(path)
		}
	}
}

#[async_trait]
impl FlowDriver for SessionDriver {
	async fn navigate(&mut self, url: &Url) -> uiv::Result<()> {
		self.session()?.page().navigate(url.as_str(), self.wait).await
	}

	async fn click(&mut self, descriptor: &Descriptor) -> uiv::Result<()> {
		self.session()?.page().click(descriptor, self.wait).await
	}

	async fn assert_visible(&mut self, descriptor: &Descriptor) -> uiv::Result<()> {
		self.session()?.page().wait_visible(descriptor, self.wait).await
	}

	async fn capture(&mut self, path: &Path) -> uiv::Result<()> {
		let target = self.capture_path(path);
		let bytes = self
			.session()?
			.page()
			.screenshot_to_file(&target, true)
			.await?;
		info!(target: "uiv", path = %target.display(), bytes, "screenshot written");
		Ok(())
	}

	async fn close(&mut self) -> uiv::Result<()> {
		match self.session.take() {
			Some(session) => session.close().await,
			None => Ok(()),
		}
	}
}

/// Lifecycle of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
	NotStarted,
	Running,
	Completed,
	Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
	Passed,
	Failed,
}

/// Outcome of one executed step. Steps after a failure never appear.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
	/// 1-based declaration order.
	pub index: usize,
	pub summary: String,
	pub duration_ms: u64,
	pub status: StepStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
	pub state: RunState,
	pub steps: Vec<StepReport>,
}

/// Executes `steps` in declaration order against `driver`.
///
/// Returns the report plus the aborting error, if any. The driver is
/// closed on every path; a close failure after a step failure is logged
/// but does not displace the step error.
pub async fn run<D: FlowDriver>(
	driver: &mut D,
	steps: &[ResolvedStep],
) -> (RunReport, Option<CliError>) {
	let mut state = RunState::Running;
	let mut reports = Vec::with_capacity(steps.len());
	let mut error = None;

	for (i, step) in steps.iter().enumerate() {
		let index = i + 1;
		let summary = step.summary();
		info!(target: "uiv", index, %summary, "step");

		let started = Instant::now();
		let result = execute_step(driver, step).await;
		let duration_ms = started.elapsed().as_millis() as u64;

		match result {
			Ok(()) => reports.push(StepReport {
				index,
				summary,
				duration_ms,
				status: StepStatus::Passed,
			}),
			Err(source) => {
				reports.push(StepReport {
					index,
					summary: summary.clone(),
					duration_ms,
					status: StepStatus::Failed,
				});
				error = Some(CliError::Step {
					index,
					step: summary,
					source,
				});
				state = RunState::Failed;
				break;
			}
		}
	}

	if error.is_none() {
		state = RunState::Completed;
	}

	// Teardown on the transition into a terminal state, success or not.
	if let Err(close_err) = driver.close().await {
		match &error {
			None => {
				state = RunState::Failed;
				error = Some(CliError::Browser(close_err));
			}
			Some(_) => {
				warn!(target: "uiv", error = %close_err, "session close failed after step failure");
			}
		}
	}

	(RunReport { state, steps: reports }, error)
}

async fn execute_step<D: FlowDriver>(driver: &mut D, step: &ResolvedStep) -> uiv::Result<()> {
	match step {
		ResolvedStep::Navigate { url } => driver.navigate(url).await,
		ResolvedStep::Click { descriptor } => driver.click(descriptor).await,
		ResolvedStep::AssertVisible { descriptor } => driver.assert_visible(descriptor).await,
		ResolvedStep::Capture { path } => driver.capture(path).await,
	}
}
