//! Run command handler

use super::{load_probe_config, select_scenarios};
use crate::commands::RunArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::ProgressReporter;
use std::sync::Arc;
use storeprobe::{ProbeConfig, SimulatorLauncher, SimulatorOptions, SuiteReport, SuiteRunner};
use tracing::{info, warn};

/// Configuration file plus command-line overrides, validated
pub fn build_probe_config(args: &RunArgs) -> CliResult<ProbeConfig> {
    let mut config = load_probe_config(args.config.as_deref())?;
    if let Some(dir) = &args.screenshots {
        config = config.with_screenshot_dir(dir.clone());
    }
    if let Some(serial) = &args.device {
        config = config.with_device_serial(serial.clone());
    }
    if let Some(ms) = args.timeout {
        config = config.with_element_timeout(ms);
    }
    config.validate()?;
    Ok(config)
}

/// Simulated store matching `config`'s markers, with `args`' faults
#[must_use]
pub fn simulator_options(config: &ProbeConfig, args: &RunArgs) -> SimulatorOptions {
    args.faults.iter().fold(
        SimulatorOptions::new().with_markers(config.markers.clone()),
        |options, fault| options.with_fault(*fault),
    )
}

/// Execute the run command and return the suite report
pub fn execute_run(cli: &CliConfig, args: &RunArgs) -> CliResult<SuiteReport> {
    let scenarios = select_scenarios(args.filter.as_deref())?;
    let config = build_probe_config(args)?;
    let launcher = SimulatorLauncher::new(simulator_options(&config, args));
    launcher.check_config(&config)?;
    for fault in &launcher.options().faults {
        warn!(fault = fault.name(), "fault injected into simulated store");
    }

    let mut reporter = ProgressReporter::new(cli.color.should_color(), cli.verbosity.is_quiet());
    reporter.header(&format!(
        "storeprobe: {} scenario(s) on {}",
        scenarios.len(),
        config.app.platform
    ));
    reporter.start_progress(scenarios.len() as u64, "launching");

    let mut runner = SuiteRunner::new(Arc::new(launcher), Arc::new(config))
        .with_fail_fast(args.fail_fast)
        .with_observer(reporter.observer());
    let report = runner.run(&scenarios);

    reporter.finish();
    reporter.summary(
        report.passed_count(),
        report.failed_count(),
        report.skipped_count(),
        report.total_duration(),
    );

    if let Some(path) = &args.report {
        report.write_json(path)?;
        info!(path = %path.display(), "report written");
        reporter.info(&format!("report written to {}", path.display()));
    }
    Ok(report)
}
