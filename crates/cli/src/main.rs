use clap::Parser;
use uiv_cli::{
	cli::Cli,
	commands,
	error::CliError,
	logging,
	output::{self, OutputFormat},
};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let format = cli.format;

	if let Err(err) = commands::dispatch(cli).await {
		// A failed run already printed its report (with the failure).
		if !err.is_report_printed() {
			handle_error(&err, format);
		}
		std::process::exit(err.exit_code());
	}
}

fn handle_error(err: &CliError, format: OutputFormat) {
	let failure = err.to_failure();

	// Always explain to humans on stderr.
	output::print_error_stderr(&failure);

	// Also emit a machine-readable envelope on stdout.
	if format == OutputFormat::Json {
		output::print_failure_envelope(&failure);
	}
}
