//! Storeprobe CLI: run the store app UI scenarios
//!
//! ## Usage
//!
//! ```bash
//! storeprobe list                              # Show scenarios
//! storeprobe run                               # Run every scenario
//! storeprobe run --filter shipping --fail-fast # Run a subset
//! storeprobe run --report target/report.json   # Also write a JSON report
//! storeprobe config --config probe.yaml        # Check a configuration file
//! ```

use clap::Parser;
use std::process::ExitCode;
use storeprobe_cli::{
    handlers, init_tracing, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands, Verbosity,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    apply_color(config.color);
    init_tracing(&config);

    match cli.command {
        Commands::Run(args) => {
            let report = handlers::execute_run(&config, &args)?;
            if report.all_passed() {
                Ok(())
            } else {
                Err(CliError::test_execution(format!(
                    "{} of {} scenarios failed",
                    report.failed_count(),
                    report.total_count()
                )))
            }
        }
        Commands::List(args) => {
            println!("{}", handlers::execute_list(&args)?);
            Ok(())
        }
        Commands::Config(args) => {
            print!("{}", handlers::execute_config(&args)?);
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into())
        .with_log_format(cli.log_format.into())
}

fn apply_color(color: ColorChoice) {
    match color {
        ColorChoice::Always => {
            console::set_colors_enabled(true);
            console::set_colors_enabled_stderr(true);
        }
        ColorChoice::Never => {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }
        ColorChoice::Auto => {}
    }
}
