//! Flow files: a declarative, ordered list of verification steps.
//!
//! # File format
//!
//! ```json
//! {
//!   "baseUrl": "http://127.0.0.1:8080",
//!   "steps": [
//!     { "action": "navigate", "url": "/" },
//!     { "action": "click", "role": "link", "name": "Reports" },
//!     { "action": "assertVisible", "role": "heading", "name": "Financial Reports" },
//!     { "action": "capture", "path": "report_a.png" }
//!   ]
//! }
//! ```
//!
//! Steps execute in declaration order with no reordering or retry; the
//! first failure aborts the rest of the flow.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use uiv::{Descriptor, Role};

use crate::error::{CliError, Result};

/// A flow file as written on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
	/// Base address step URLs are resolved against. Optional here; a flow
	/// with relative URLs needs it from the file or from `--base-url`.
	#[serde(default)]
	pub base_url: Option<String>,

	#[serde(default)]
	pub steps: Vec<Step>,
}

/// One scripted action, tagged by `action` in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Step {
	Navigate { url: String },
	Click { role: Role, name: String },
	AssertVisible { role: Role, name: String },
	Capture { path: PathBuf },
}

/// A step after URL resolution, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedStep {
	Navigate { url: Url },
	Click { descriptor: Descriptor },
	AssertVisible { descriptor: Descriptor },
	Capture { path: PathBuf },
}

impl ResolvedStep {
	/// Short human-readable form used in reports and error messages.
	pub fn summary(&self) -> String {
		match self {
			ResolvedStep::Navigate { url } => format!("navigate {url}"),
			ResolvedStep::Click { descriptor } => format!("click {descriptor}"),
			ResolvedStep::AssertVisible { descriptor } => format!("assert-visible {descriptor}"),
			ResolvedStep::Capture { path } => format!("capture {}", path.display()),
		}
	}
}

impl Flow {
	/// Reads and parses a flow file.
	pub fn load(path: &Path) -> Result<Self> {
		let raw = std::fs::read_to_string(path).map_err(|e| CliError::FlowLoad {
			path: path.to_path_buf(),
			reason: e.to_string(),
		})?;

		serde_json::from_str(&raw).map_err(|e| CliError::FlowLoad {
			path: path.to_path_buf(),
			reason: e.to_string(),
		})
	}

	/// Validates the flow and resolves step URLs against the base URL.
	///
	/// `base_url_override` (from `--base-url`) wins over the file's
	/// `baseUrl`. A relative step URL without any base is an error, as is
	/// a flow with no steps.
	pub fn resolve(&self, base_url_override: Option<&str>) -> Result<Vec<ResolvedStep>> {
		if self.steps.is_empty() {
			return Err(CliError::InvalidFlow("flow has no steps".to_string()));
		}

		let base = base_url_override
			.or(self.base_url.as_deref())
			.map(|b| {
				Url::parse(b)
					.map_err(|e| CliError::InvalidFlow(format!("invalid base URL \"{b}\": {e}")))
			})
			.transpose()?;

		self.steps
			.iter()
			.map(|step| self.resolve_step(step, base.as_ref()))
			.collect()
	}

	fn resolve_step(&self, step: &Step, base: Option<&Url>) -> Result<ResolvedStep> {
		Ok(match step {
			Step::Navigate { url } => ResolvedStep::Navigate {
				url: resolve_url(url, base)?,
			},
			Step::Click { role, name } => ResolvedStep::Click {
				descriptor: Descriptor::new(*role, name.clone()),
			},
			Step::AssertVisible { role, name } => ResolvedStep::AssertVisible {
				descriptor: Descriptor::new(*role, name.clone()),
			},
			Step::Capture { path } => {
				if path.as_os_str().is_empty() {
					return Err(CliError::InvalidFlow("capture step has an empty path".into()));
				}
				ResolvedStep::Capture { path: path.clone() }
			}
		})
	}
}

fn resolve_url(url: &str, base: Option<&Url>) -> Result<Url> {
	match Url::parse(url) {
		Ok(absolute) => Ok(absolute),
		Err(url::ParseError::RelativeUrlWithoutBase) => {
			let base = base.ok_or_else(|| {
				CliError::InvalidFlow(format!(
					"step URL \"{url}\" is relative but no base URL is set"
				))
			})?;
			base.join(url)
				.map_err(|e| CliError::InvalidFlow(format!("cannot resolve \"{url}\": {e}")))
		}
		Err(e) => Err(CliError::InvalidFlow(format!("invalid URL \"{url}\": {e}"))),
	}
}
