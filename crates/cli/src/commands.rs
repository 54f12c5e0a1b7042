//! Command dispatch and execution.

use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use uiv::{Session, SessionConfig, WaitConfig};

use crate::cli::{CheckArgs, Cli, Commands, RunArgs};
use crate::error::{CliError, Result};
use crate::flow::Flow;
use crate::output::{self, OutputFormat};
use crate::runner::{self, SessionDriver};

pub async fn dispatch(cli: Cli) -> Result<()> {
	let format = cli.format;
	match cli.command {
		Commands::Run(args) => run_flow(args, format).await,
		Commands::Check(args) => check_flow(args, format),
	}
}

/// `uiv run`: load the flow, launch a session, execute every step.
///
/// The report is printed before returning; a step failure surfaces as
/// [`CliError::ReportPrinted`] so the caller exits non-zero without
/// printing a second envelope.
async fn run_flow(args: RunArgs, format: OutputFormat) -> Result<()> {
	let flow = Flow::load(&args.flow)?;
	let steps = flow.resolve(args.base_url.as_deref())?;

	info!(
		target: "uiv",
		flow = %args.flow.display(),
		steps = steps.len(),
		timeout_ms = args.timeout_ms,
		"running flow"
	);

	let mut config = SessionConfig::new();
	if args.headful {
		config = config.headful();
	}
	if let Some(chrome) = &args.chrome {
		config = config.with_chrome_path(chrome.to_string_lossy());
	}

	let wait = WaitConfig::with_timeout(Duration::from_millis(args.timeout_ms));
	let out_dir = args.out_dir.unwrap_or_else(|| PathBuf::from("."));

	let session = Session::launch(config).await.map_err(CliError::Browser)?;
	let mut driver = SessionDriver::new(session, wait, out_dir);

	let (report, error) = runner::run(&mut driver, &steps).await;

	match error {
		None => {
			output::print_report(&report, None, format);
			Ok(())
		}
		Some(err) => {
			let failure = err.to_failure();
			output::print_report(&report, Some(&failure), format);
			output::print_error_stderr(&failure);
			Err(CliError::ReportPrinted)
		}
	}
}

/// `uiv check`: parse and validate a flow without touching a browser.
fn check_flow(args: CheckArgs, format: OutputFormat) -> Result<()> {
	let flow = Flow::load(&args.flow)?;
	let steps = flow.resolve(args.base_url.as_deref())?;

	match format {
		OutputFormat::Json => {
			let summaries: Vec<String> = steps.iter().map(|s| s.summary()).collect();
			let envelope = serde_json::json!({ "ok": true, "steps": summaries });
			if let Ok(json) = serde_json::to_string(&envelope) {
				println!("{json}");
			}
		}
		OutputFormat::Text => {
			for (i, step) in steps.iter().enumerate() {
				println!("{:>4}  {}", i + 1, step.summary());
			}
			println!("flow ok: {} steps", steps.len());
		}
	}

	Ok(())
}
