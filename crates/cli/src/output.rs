//! Report rendering for humans and machines.
//!
//! Text mode prints one line per executed step plus a summary; json mode
//! emits a single envelope on stdout:
//!
//! ```json
//! {"ok":false,"state":"failed","steps":[...],"error":{"code":"ASSERTION_TIMEOUT","message":"..."}}
//! ```

use std::fmt;

use colored::Colorize;
use serde::Serialize;

use crate::runner::{RunReport, StepStatus};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text
	#[default]
	Text,
	/// JSON envelope
	Json,
}

/// Machine-readable failure classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureCode {
	NavigationFailed,
	ElementNotFound,
	AssertionTimeout,
	IoError,
	BrowserLaunchFailed,
	InvalidFlow,
	InternalError,
}

impl fmt::Display for FailureCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			FailureCode::NavigationFailed => "NAVIGATION_FAILED",
			FailureCode::ElementNotFound => "ELEMENT_NOT_FOUND",
			FailureCode::AssertionTimeout => "ASSERTION_TIMEOUT",
			FailureCode::IoError => "IO_ERROR",
			FailureCode::BrowserLaunchFailed => "BROWSER_LAUNCH_FAILED",
			FailureCode::InvalidFlow => "INVALID_FLOW",
			FailureCode::InternalError => "INTERNAL_ERROR",
		};
		f.write_str(s)
	}
}

/// Structured failure attached to a report or printed on its own.
#[derive(Clone, Debug, Serialize)]
pub struct Failure {
	pub code: FailureCode,
	pub message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
	ok: bool,
	#[serde(flatten)]
	report: &'a RunReport,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<&'a Failure>,
}

/// Prints the run report to stdout in the requested format.
pub fn print_report(report: &RunReport, error: Option<&Failure>, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			let envelope = Envelope {
				ok: error.is_none(),
				report,
				error,
			};
			if let Ok(json) = serde_json::to_string(&envelope) {
				println!("{json}");
			}
		}
		OutputFormat::Text => {
			for step in &report.steps {
				let marker = match step.status {
					StepStatus::Passed => "ok".green(),
					StepStatus::Failed => "FAIL".red().bold(),
				};
				println!(
					"{marker:>4}  step {} {} ({}ms)",
					step.index, step.summary, step.duration_ms
				);
			}

			let passed = report
				.steps
				.iter()
				.filter(|s| s.status == StepStatus::Passed)
				.count();

			match error {
				None => println!(
					"{} {passed}/{} steps passed",
					"completed:".green().bold(),
					report.steps.len()
				),
				Some(failure) => println!(
					"{} {} [{}]",
					"failed:".red().bold(),
					failure.message,
					failure.code
				),
			}
		}
	}
}

/// Prints a failure to stderr for humans, independent of output format.
pub fn print_error_stderr(failure: &Failure) {
	eprintln!("Error [{}]: {}", failure.code, failure.message);
}

/// Emits a bare failure envelope on stdout (no steps ran).
pub fn print_failure_envelope(failure: &Failure) {
	let envelope = serde_json::json!({ "ok": false, "error": failure });
	if let Ok(json) = serde_json::to_string(&envelope) {
		println!("{json}");
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn failure_code_serializes_screaming_snake() {
		let json = serde_json::to_string(&FailureCode::AssertionTimeout).unwrap();
		assert_eq!(json, "\"ASSERTION_TIMEOUT\"");
		assert_eq!(FailureCode::ElementNotFound.to_string(), "ELEMENT_NOT_FOUND");
	}
}
