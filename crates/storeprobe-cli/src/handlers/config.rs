//! Config command handler

use crate::commands::ConfigArgs;
use crate::error::{CliError, CliResult};
use std::path::Path;
use storeprobe::ProbeConfig;
use tracing::debug;

/// Load `path`, or the defaults when absent
pub fn load_probe_config(path: Option<&Path>) -> CliResult<ProbeConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            if !path.exists() {
                return Err(CliError::config(format!("{} does not exist", path.display())));
            }
            Ok(ProbeConfig::load(path)?)
        }
        None => Ok(ProbeConfig::default()),
    }
}

/// Execute the config command: validate and render the effective configuration
pub fn execute_config(args: &ConfigArgs) -> CliResult<String> {
    let config = load_probe_config(args.config.as_deref())?;
    config.validate()?;
    Ok(config.to_yaml()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_defaults_render() {
        let yaml = execute_config(&ConfigArgs::default()).unwrap();
        assert!(yaml.contains("element_ms: 15000"));
        assert!(yaml.contains("basket_cart: cart_menu_item"));
    }

    #[test]
    fn test_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.yaml");
        std::fs::write(&path, "timeouts:\n  element_ms: 2500\n").unwrap();
        let yaml = execute_config(&ConfigArgs { config: Some(path) }).unwrap();
        assert!(yaml.contains("element_ms: 2500"));
        assert!(yaml.contains("poll_interval_ms: 100"));
    }

    #[test]
    fn test_missing_file() {
        let args = ConfigArgs {
            config: Some(PathBuf::from("/nonexistent/probe.yaml")),
        };
        assert!(matches!(
            execute_config(&args).unwrap_err(),
            CliError::Config { .. }
        ));
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.yaml");
        std::fs::write(&path, "scroll:\n  max_attempts: 0\n").unwrap();
        let err = execute_config(&ConfigArgs { config: Some(path) }).unwrap_err();
        assert!(err.to_string().contains("max_attempts"), "{err}");
    }
}
