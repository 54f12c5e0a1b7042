use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;
use crate::styles::cli_styles;

/// Root CLI for uiv.
#[derive(Parser, Debug)]
#[command(name = "uiv")]
#[command(about = "Scripted UI verification flows in a headless browser")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format: text (default) or json
	#[arg(short = 'f', long, global = true, value_enum, default_value = "text")]
	pub format: OutputFormat,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Execute a verification flow against a running application.
	Run(RunArgs),
	/// Parse and validate a flow file without launching a browser.
	Check(CheckArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
	/// Path to the flow file (JSON).
	#[arg(value_name = "FLOW")]
	pub flow: PathBuf,

	/// Base URL the flow runs against (overrides the flow file's baseUrl).
	#[arg(long, value_name = "URL")]
	pub base_url: Option<String>,

	/// Directory for captured screenshots (default: current directory).
	#[arg(long, value_name = "DIR")]
	pub out_dir: Option<PathBuf>,

	/// Deadline in milliseconds for bounded waits (clicks, assertions).
	#[arg(long, value_name = "MS", default_value_t = 10_000)]
	pub timeout_ms: u64,

	/// Show the browser window instead of running headless.
	#[arg(long)]
	pub headful: bool,

	/// Chrome executable path (default: auto-detect).
	#[arg(long, value_name = "PATH")]
	pub chrome: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
	/// Path to the flow file (JSON).
	#[arg(value_name = "FLOW")]
	pub flow: PathBuf,

	/// Base URL to resolve step URLs against during validation.
	#[arg(long, value_name = "URL")]
	pub base_url: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn cli_definition_is_consistent() {
		Cli::command().debug_assert();
	}

	#[test]
	fn run_accepts_flow_and_overrides() {
		let cli = Cli::parse_from([
			"uiv",
			"run",
			"flows/reports_smoke.json",
			"--base-url",
			"http://127.0.0.1:8080",
			"--timeout-ms",
			"2000",
		]);

		match cli.command {
			Commands::Run(args) => {
				assert_eq!(args.flow, PathBuf::from("flows/reports_smoke.json"));
				assert_eq!(args.base_url.as_deref(), Some("http://127.0.0.1:8080"));
				assert_eq!(args.timeout_ms, 2000);
				assert!(!args.headful);
			}
			other => panic!("expected run, got {other:?}"),
		}
	}
}
