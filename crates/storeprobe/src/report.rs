//! Suite reporting.
//!
//! One [`ScenarioReport`] per scenario, aggregated into a [`SuiteReport`]
//! that summarises and exports itself as JSON.

use crate::result::{FailureKind, ProbeError, ProbeResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Outcome of one scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioStatus {
    /// Every wait and assertion held
    Passed,
    /// The scenario stopped on an error
    Failed,
    /// Not run because an earlier scenario failed under fail-fast
    Skipped,
}

impl ScenarioStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl std::fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Passed => "Passed",
            Self::Failed => "Failed",
            Self::Skipped => "Skipped",
        };
        f.write_str(label)
    }
}

/// Result of one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// Outcome
    pub status: ScenarioStatus,
    /// Wall time spent running the scenario, as `{secs, nanos}`
    pub duration: Duration,
    /// Error message if failed
    pub error: Option<String>,
    /// Error classification if failed
    pub failure_kind: Option<FailureKind>,
    /// Teardown screenshot, when one was saved
    pub screenshot: Option<PathBuf>,
}

impl ScenarioReport {
    /// Create a passing report
    #[must_use]
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status: ScenarioStatus::Passed,
            duration,
            error: None,
            failure_kind: None,
            screenshot: None,
        }
    }

    /// Create a failing report from the error that ended the scenario
    #[must_use]
    pub fn failed(name: impl Into<String>, duration: Duration, error: &ProbeError) -> Self {
        Self {
            name: name.into(),
            status: ScenarioStatus::Failed,
            duration,
            error: Some(error.to_string()),
            failure_kind: Some(error.failure_kind()),
            screenshot: None,
        }
    }

    /// Create a skipped report
    #[must_use]
    pub fn skipped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ScenarioStatus::Skipped,
            duration: Duration::ZERO,
            error: None,
            failure_kind: None,
            screenshot: None,
        }
    }

    /// Attach the teardown screenshot path
    #[must_use]
    pub fn with_screenshot(mut self, path: PathBuf) -> Self {
        self.screenshot = Some(path);
        self
    }
}

/// Aggregated results of a suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Suite name
    pub suite_name: String,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Per-scenario results in run order
    pub scenarios: Vec<ScenarioReport>,
}

impl Default for SuiteReport {
    fn default() -> Self {
        Self::new("storeprobe")
    }
}

impl SuiteReport {
    /// Start an empty report stamped with the current time
    #[must_use]
    pub fn new(suite_name: impl Into<String>) -> Self {
        Self {
            suite_name: suite_name.into(),
            started_at: Utc::now(),
            scenarios: Vec::new(),
        }
    }

    /// Record a scenario result
    pub fn record(&mut self, report: ScenarioReport) {
        self.scenarios.push(report);
    }

    /// Get number of passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(ScenarioStatus::Passed)
    }

    /// Get number of failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(ScenarioStatus::Failed)
    }

    /// Get number of skipped scenarios
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(ScenarioStatus::Skipped)
    }

    fn count(&self, status: ScenarioStatus) -> usize {
        self.scenarios.iter().filter(|r| r.status == status).count()
    }

    /// Get total scenario count
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.scenarios.len()
    }

    /// Pass rate over scenarios that ran (0.0 to 1.0)
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        let ran = self.passed_count() + self.failed_count();
        if ran == 0 {
            return 1.0;
        }
        self.passed_count() as f64 / ran as f64
    }

    /// Check if nothing failed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// Sum of scenario durations
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.scenarios.iter().map(|r| r.duration).sum()
    }

    /// Failing scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioReport> {
        self.scenarios
            .iter()
            .filter(|r| r.status.is_failed())
            .collect()
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{}: {}/{} passed ({:.1}%)",
            self.suite_name,
            self.passed_count(),
            self.total_count(),
            self.pass_rate() * 100.0
        );
        let skipped = self.skipped_count();
        if skipped > 0 {
            line.push_str(&format!(", {skipped} skipped"));
        }
        line
    }

    /// Render as pretty JSON
    pub fn to_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON report, creating parent directories
    pub fn write_json(&self, path: &Path) -> ProbeResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
