//! The flow files shipped in `flows/` must stay loadable and valid.

use std::path::{Path, PathBuf};

use uiv_cli::error::CliError;
use uiv_cli::flow::{Flow, ResolvedStep};

fn flows_dir() -> PathBuf {
	// crates/cli -> workspace root
	Path::new(env!("CARGO_MANIFEST_DIR"))
		.join("../..")
		.join("flows")
}

#[test]
fn financial_reports_flow_loads_and_resolves() {
	let flow = Flow::load(&flows_dir().join("financial_reports.json")).unwrap();
	let steps = flow.resolve(None).unwrap();

	assert_eq!(steps.len(), 11);
	assert!(matches!(steps[0], ResolvedStep::Navigate { .. }));

	// Three screenshots, one per report page.
	let captures = steps
		.iter()
		.filter(|s| matches!(s, ResolvedStep::Capture { .. }))
		.count();
	assert_eq!(captures, 3);

	assert_eq!(steps[1].summary(), "click link \"Relatórios\"");
}

#[test]
fn reports_smoke_flow_matches_expected_shape() {
	let flow = Flow::load(&flows_dir().join("reports_smoke.json")).unwrap();
	let steps = flow.resolve(None).unwrap();

	assert_eq!(steps.len(), 7);
	assert_eq!(
		steps[2].summary(),
		"assert-visible heading \"Financial Reports\""
	);
	assert_eq!(steps[3].summary(), "capture report_a.png");
	assert_eq!(steps[6].summary(), "capture report_b.png");
}

#[test]
fn shipped_flows_accept_a_base_url_override() {
	let flow = Flow::load(&flows_dir().join("reports_smoke.json")).unwrap();
	let steps = flow.resolve(Some("http://localhost:3000")).unwrap();

	match &steps[0] {
		ResolvedStep::Navigate { url } => assert_eq!(url.as_str(), "http://localhost:3000/"),
		other => panic!("expected navigate, got {other:?}"),
	}
}

#[test]
fn missing_flow_file_is_a_load_error() {
	let tmp = tempfile::tempdir().unwrap();
	let err = Flow::load(&tmp.path().join("nope.json")).unwrap_err();
	assert!(matches!(err, CliError::FlowLoad { .. }));
	assert_eq!(err.exit_code(), 2);
}

#[test]
fn malformed_json_is_a_load_error() {
	let tmp = tempfile::tempdir().unwrap();
	let path = tmp.path().join("broken.json");
	std::fs::write(&path, "{ \"steps\": [ { \"action\": ").unwrap();

	let err = Flow::load(&path).unwrap_err();
	assert!(matches!(err, CliError::FlowLoad { .. }));
}
