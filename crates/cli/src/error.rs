use std::path::PathBuf;

use thiserror::Error;

use crate::output::{Failure, FailureCode};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	/// Run failed but the report (including the failure) has already been
	/// printed. Signals a non-zero exit without additional output.
	#[error("")]
	ReportPrinted,

	#[error("failed to load flow {path}: {reason}")]
	FlowLoad { path: PathBuf, reason: String },

	#[error("invalid flow: {0}")]
	InvalidFlow(String),

	/// A step aborted the run. `index` is 1-based declaration order.
	#[error("step {index} ({step}) failed: {source}")]
	Step {
		index: usize,
		step: String,
		#[source]
		source: uiv::Error,
	},

	/// Session setup or teardown failed outside any step.
	#[error(transparent)]
	Browser(#[from] uiv::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl CliError {
	/// True when the report was already emitted; the caller should exit
	/// non-zero without printing anything further.
	pub fn is_report_printed(&self) -> bool {
		matches!(self, CliError::ReportPrinted)
	}

	/// Process exit code: 2 for flow/config problems, 1 for run failures.
	pub fn exit_code(&self) -> i32 {
		match self {
			CliError::FlowLoad { .. } | CliError::InvalidFlow(_) => 2,
			_ => 1,
		}
	}

	/// Convert to a structured failure for output.
	pub fn to_failure(&self) -> Failure {
		let (code, message) = match self {
			// Callers check is_report_printed() before converting.
			CliError::ReportPrinted => (FailureCode::InternalError, String::new()),
			CliError::FlowLoad { .. } => (FailureCode::InvalidFlow, self.to_string()),
			CliError::InvalidFlow(_) => (FailureCode::InvalidFlow, self.to_string()),
			CliError::Step { source, .. } => (browser_failure_code(source), self.to_string()),
			CliError::Browser(source) => (browser_failure_code(source), self.to_string()),
			CliError::Io(err) => (FailureCode::IoError, err.to_string()),
		};

		Failure { code, message }
	}
}

fn browser_failure_code(err: &uiv::Error) -> FailureCode {
	match err {
		uiv::Error::Navigation { .. } => FailureCode::NavigationFailed,
		uiv::Error::ElementNotFound { .. } => FailureCode::ElementNotFound,
		uiv::Error::AssertionTimeout { .. } => FailureCode::AssertionTimeout,
		uiv::Error::Screenshot { .. } | uiv::Error::Io(_) => FailureCode::IoError,
		uiv::Error::Launch { .. } | uiv::Error::Connection(_) | uiv::Error::AlreadyClosed => {
			FailureCode::BrowserLaunchFailed
		}
		uiv::Error::Eval(_) | uiv::Error::Cdp(_) => FailureCode::InternalError,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	#[test]
	fn step_failures_carry_index_and_summary() {
		let err = CliError::Step {
			index: 3,
			step: "assert-visible heading \"Income Statement\"".to_string(),
			source: uiv::Error::AssertionTimeout {
				condition: "heading \"Income Statement\" to become visible".to_string(),
				timeout: Duration::from_secs(10),
			},
		};

		let failure = err.to_failure();
		assert_eq!(failure.code, FailureCode::AssertionTimeout);
		assert!(failure.message.contains("step 3"));
		assert!(failure.message.contains("Income Statement"));
	}

	#[test]
	fn flow_errors_exit_with_usage_code() {
		let err = CliError::InvalidFlow("flow has no steps".to_string());
		assert_eq!(err.exit_code(), 2);
		assert_eq!(err.to_failure().code, FailureCode::InvalidFlow);

		let err = CliError::Browser(uiv::Error::Connection("socket closed".to_string()));
		assert_eq!(err.exit_code(), 1);
	}
}
