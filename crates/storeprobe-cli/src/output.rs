//! Output formatting and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use storeprobe::{RunEvent, ScenarioReport, ScenarioStatus};

/// Progress reporter for a suite run
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Callback for [`storeprobe::SuiteRunner::with_observer`].
    ///
    /// Moves the bar along and prints one line per finished scenario.
    #[must_use]
    pub fn observer(&self) -> impl FnMut(&RunEvent<'_>) + Send + 'static {
        let bar = self.progress_bar.clone();
        let term = self.term.clone();
        let use_color = self.use_color;
        let quiet = self.quiet;

        move |event| match event {
            RunEvent::Started { scenario, .. } => {
                if let Some(pb) = &bar {
                    pb.set_message(scenario.name);
                }
            }
            RunEvent::Finished { report, .. } => {
                if !quiet || report.status.is_failed() {
                    let line = scenario_line(report, use_color);
                    match bar.as_ref().filter(|pb| !pb.is_hidden()) {
                        Some(pb) => pb.println(line),
                        None => {
                            let _ = term.write_line(&line);
                        }
                    }
                }
                if let Some(pb) = &bar {
                    pb.inc(1);
                }
            }
        }
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line(&styled);
    }

    /// Print suite summary
    pub fn summary(&self, passed: usize, failed: usize, skipped: usize, duration: Duration) {
        if self.quiet && failed == 0 {
            return;
        }

        let _ = self.term.write_line("");
        let total = passed + failed + skipped;
        let duration_secs = duration.as_secs_f64();

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let skipped_style = Style::new().yellow();

            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };

            let _ = self.term.write_line(&format!(
                "{} {} scenarios in {:.2}s ({} passed, {} failed, {} skipped)",
                status,
                total,
                duration_secs,
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
                skipped_style.apply_to(skipped)
            ));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {total} scenarios in {duration_secs:.2}s ({passed} passed, {failed} failed, {skipped} skipped)"
            ));
        }
    }
}

/// One PASS/FAIL/SKIP line for a finished scenario
#[must_use]
pub fn scenario_line(report: &ScenarioReport, use_color: bool) -> String {
    let label = match report.status {
        ScenarioStatus::Passed => "PASS",
        ScenarioStatus::Failed => "FAIL",
        ScenarioStatus::Skipped => "SKIP",
    };
    let label = if use_color {
        match report.status {
            ScenarioStatus::Passed => style(label).green().bold().to_string(),
            ScenarioStatus::Failed => style(label).red().bold().to_string(),
            ScenarioStatus::Skipped => style(label).yellow().to_string(),
        }
    } else {
        label.to_string()
    };

    let mut line = format!("{label} {}", report.name);
    if report.status != ScenarioStatus::Skipped {
        line.push_str(&format!(" ({}ms)", report.duration.as_millis()));
    }
    if let (Some(kind), Some(error)) = (report.failure_kind, &report.error) {
        line.push_str(&format!("\n     {kind}: {error}"));
    }
    if let Some(path) = &report.screenshot {
        line.push_str(&format!("\n     screenshot: {}", path.display()));
    }
    line
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use storeprobe::ProbeError;

    mod scenario_line_tests {
        use super::*;

        #[test]
        fn test_pass_line() {
            let report = ScenarioReport::passed("validate_x", Duration::from_millis(42));
            assert_eq!(scenario_line(&report, false), "PASS validate_x (42ms)");
        }

        #[test]
        fn test_fail_line_has_kind_and_error() {
            let err = ProbeError::Timeout {
                waited_for: "checkout".to_string(),
                ms: 100,
            };
            let report = ScenarioReport::failed("validate_y", Duration::ZERO, &err);
            let line = scenario_line(&report, false);
            assert!(line.starts_with("FAIL validate_y"));
            assert!(line.contains("timeout: Timed out after 100ms"));
        }

        #[test]
        fn test_skip_line() {
            let report = ScenarioReport::skipped("validate_z");
            assert_eq!(scenario_line(&report, false), "SKIP validate_z");
        }
    }

    mod reporter_tests {
        use super::*;

        #[test]
        fn test_quiet_has_no_bar() {
            let mut reporter = ProgressReporter::new(false, true);
            reporter.start_progress(3, "running");
            assert!(reporter.progress_bar.is_none());
        }

        #[test]
        fn test_observer_advances_bar() {
            let mut reporter = ProgressReporter::new(false, false);
            reporter.start_progress(1, "running");
            let mut observer = reporter.observer();
            let report = ScenarioReport::passed("validate_x", Duration::ZERO);
            observer(&RunEvent::Finished {
                index: 0,
                total: 1,
                report: &report,
            });
            assert_eq!(reporter.progress_bar.as_ref().unwrap().position(), 1);
        }
    }
}
