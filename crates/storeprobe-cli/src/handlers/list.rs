//! List command handler

use super::select_scenarios;
use crate::commands::ListArgs;
use crate::error::CliResult;
use serde::Serialize;
use storeprobe::Scenario;

#[derive(Serialize)]
struct Entry<'a> {
    name: &'a str,
    description: &'a str,
}

/// Render scenarios as aligned text or a JSON array
pub fn render_list(scenarios: &[Scenario], json: bool) -> CliResult<String> {
    if json {
        let entries: Vec<_> = scenarios
            .iter()
            .map(|s| Entry {
                name: s.name,
                description: s.description,
            })
            .collect();
        return Ok(serde_json::to_string_pretty(&entries).map_err(storeprobe::ProbeError::from)?);
    }
    let width = scenarios.iter().map(|s| s.name.len()).max().unwrap_or(0);
    Ok(scenarios
        .iter()
        .map(|s| format!("{:width$}  {}", s.name, s.description))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Execute the list command
pub fn execute_list(args: &ListArgs) -> CliResult<String> {
    let scenarios = select_scenarios(args.filter.as_deref())?;
    render_list(&scenarios, args.json)
}
