//! Command handlers, one module per subcommand

pub mod config;
pub mod list;
pub mod run;

pub use config::{execute_config, load_probe_config};
pub use list::{execute_list, render_list};
pub use run::{build_probe_config, execute_run, simulator_options};

use crate::error::{CliError, CliResult};
use regex::Regex;
use storeprobe::scenarios::{self, Scenario};

/// Scenarios whose name matches `filter`, in run order.
///
/// No filter selects everything; a filter matching nothing is an error.
pub fn select_scenarios(filter: Option<&str>) -> CliResult<Vec<Scenario>> {
    let all = scenarios::all();
    let Some(pattern) = filter else {
        return Ok(all);
    };
    let regex = Regex::new(pattern)
        .map_err(|e| CliError::invalid_argument(format!("bad filter '{pattern}': {e}")))?;
    let selected: Vec<_> = all.into_iter().filter(|s| regex.is_match(s.name)).collect();
    if selected.is_empty() {
        return Err(CliError::invalid_argument(format!(
            "no scenario matches '{pattern}'"
        )));
    }
    Ok(selected)
}
