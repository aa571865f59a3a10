//! Storeprobe CLI library
//!
//! Command-line interface over the Storeprobe scenario runner.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod logging;
mod output;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, ListArgs, LogFormatArg, RunArgs};
pub use config::{CliConfig, ColorChoice, LogFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::init_tracing;
pub use output::{scenario_line, ProgressReporter};
