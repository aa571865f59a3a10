//! Suite runner.
//!
//! Runs scenarios one after another, each against a freshly launched app:
//! launch, run, teardown screenshot, close, record. A failing scenario never
//! affects the next one; with fail-fast the remaining ones are skipped.

use crate::config::ProbeConfig;
use crate::driver::AppLauncher;
use crate::flow::StoreFlow;
use crate::report::{ScenarioReport, SuiteReport};
use crate::scenarios::Scenario;
use crate::session::AppSession;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, warn};

/// Progress notification handed to the observer
#[derive(Debug)]
pub enum RunEvent<'a> {
    /// A scenario is about to launch the app
    Started {
        /// Zero-based position in the run
        index: usize,
        /// Number of scenarios in the run
        total: usize,
        /// The scenario
        scenario: &'a Scenario,
    },
    /// A scenario has been recorded
    Finished {
        /// Zero-based position in the run
        index: usize,
        /// Number of scenarios in the run
        total: usize,
        /// Its report
        report: &'a ScenarioReport,
    },
}

/// Observer callback
pub type RunObserver = Box<dyn FnMut(&RunEvent<'_>) + Send>;

/// Sequential scenario runner
pub struct SuiteRunner {
    launcher: Arc<dyn AppLauncher>,
    config: Arc<ProbeConfig>,
    fail_fast: bool,
    observer: Option<RunObserver>,
}

impl std::fmt::Debug for SuiteRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteRunner")
            .field("fail_fast", &self.fail_fast)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl SuiteRunner {
    /// Create a runner over a launcher and shared configuration
    #[must_use]
    pub fn new(launcher: Arc<dyn AppLauncher>, config: Arc<ProbeConfig>) -> Self {
        Self {
            launcher,
            config,
            fail_fast: false,
            observer: None,
        }
    }

    /// Stop after the first failing scenario
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Receive a [`RunEvent`] around every scenario
    #[must_use]
    pub fn with_observer(mut self, observer: impl FnMut(&RunEvent<'_>) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Shared configuration
    #[must_use]
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Run every registered scenario
    pub fn run_all(&mut self) -> SuiteReport {
        self.run(&crate::scenarios::all())
    }

    /// Run `scenarios` in order
    pub fn run(&mut self, scenarios: &[Scenario]) -> SuiteReport {
        let mut suite = SuiteReport::default();
        let total = scenarios.len();
        let mut stopped = false;

        for (index, scenario) in scenarios.iter().enumerate() {
            let report = if stopped {
                ScenarioReport::skipped(scenario.name)
            } else {
                self.notify(&RunEvent::Started {
                    index,
                    total,
                    scenario,
                });
                self.run_one(scenario)
            };

            if report.status.is_failed() && self.fail_fast {
                stopped = true;
            }
            self.notify(&RunEvent::Finished {
                index,
                total,
                report: &report,
            });
            suite.record(report);
        }

        info!(summary = %suite.summary(), "suite finished");
        suite
    }

    /// Launch, run, screenshot and close one scenario
    pub fn run_one(&self, scenario: &Scenario) -> ScenarioReport {
        let start = Instant::now();
        let driver = match self.launcher.launch(&self.config.app) {
            Ok(driver) => driver,
            Err(e) => {
                error!(scenario = scenario.name, kind = %e.failure_kind(), error = %e, "launch failed");
                return ScenarioReport::failed(scenario.name, start.elapsed(), &e);
            }
        };

        let session = AppSession::new(driver, Arc::clone(&self.config));
        let span = info_span!("scenario", name = scenario.name, session = %session.id());
        let _guard = span.enter();
        info!("scenario started");

        let mut flow = StoreFlow::new(session);
        let outcome = (scenario.run)(&mut flow);
        let duration = start.elapsed();

        let mut report = match outcome {
            Ok(()) => {
                info!(elapsed_ms = duration.as_millis(), "scenario passed");
                ScenarioReport::passed(scenario.name, duration)
            }
            Err(e) => {
                error!(kind = %e.failure_kind(), error = %e, "scenario failed");
                ScenarioReport::failed(scenario.name, duration, &e)
            }
        };

        let mut session = flow.into_session();
        if self.config.app.enable_screenshots {
            let name = format!("{}-{}", scenario.name, report.status);
            match session.take_screenshot(&name) {
                Ok(path) => report = report.with_screenshot(path),
                Err(e) => warn!(error = %e, "teardown screenshot not saved"),
            }
        }
        if let Err(e) = session.close() {
            warn!(error = %e, "session did not close cleanly");
        }
        report
    }

    fn notify(&mut self, event: &RunEvent<'_>) {
        if let Some(observer) = self.observer.as_mut() {
            observer(event);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::driver::{AppDriver, MockDriver, Screenshot};
    use crate::report::ScenarioStatus;
    use crate::result::{FailureKind, ProbeError, ProbeResult};
    use std::sync::Mutex;

    struct MockLauncher {
        fail: bool,
    }

    impl AppLauncher for MockLauncher {
        fn launch(&self, _config: &AppConfig) -> ProbeResult<Box<dyn AppDriver>> {
            if self.fail {
                return Err(ProbeError::LaunchFailed {
                    message: "no device".to_string(),
                });
            }
            let mut driver = MockDriver::new();
            driver.set_screenshot(Screenshot::new(vec![0x89, 0x50, 0x4E, 0x47], 4, 4));
            Ok(Box::new(driver))
        }
    }

    fn pass(_: &mut StoreFlow) -> ProbeResult<()> {
        Ok(())
    }

    fn fail(_: &mut StoreFlow) -> ProbeResult<()> {
        Err(ProbeError::mismatch("total", 1, 2))
    }

    fn scenario(name: &'static str, run: crate::scenarios::ScenarioFn) -> Scenario {
        Scenario {
            name,
            description: "test",
            run,
        }
    }

    fn runner(fail_launch: bool) -> (SuiteRunner, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = ProbeConfig::new()
            .with_element_timeout(20)
            .with_poll_interval(5)
            .with_screenshot_dir(dir.path());
        let launcher = Arc::new(MockLauncher { fail: fail_launch });
        (SuiteRunner::new(launcher, Arc::new(config)), dir)
    }

    mod run_tests {
        use super::*;

        #[test]
        fn test_failures_do_not_cascade() {
            let (mut runner, _dir) = runner(false);
            let suite = runner.run(&[scenario("a", fail), scenario("b", pass)]);
            assert_eq!(suite.failed_count(), 1);
            assert_eq!(suite.passed_count(), 1);
            assert_eq!(
                suite.scenarios[0].failure_kind,
                Some(FailureKind::Assertion)
            );
        }

        #[test]
        fn test_fail_fast_skips_rest() {
            let (runner, _dir) = runner(false);
            let mut runner = runner.with_fail_fast(true);
            let suite = runner.run(&[scenario("a", fail), scenario("b", pass)]);
            assert_eq!(suite.scenarios[1].status, ScenarioStatus::Skipped);
        }

        #[test]
        fn test_launch_failure_is_infrastructure() {
            let (mut runner, _dir) = runner(true);
            let suite = runner.run(&[scenario("a", pass)]);
            assert_eq!(
                suite.scenarios[0].failure_kind,
                Some(FailureKind::Infrastructure)
            );
            assert!(suite.scenarios[0].screenshot.is_none());
        }

        #[test]
        fn test_observer_sees_every_scenario() {
            let seen = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&seen);
            let (runner, _dir) = runner(false);
            let mut runner = runner.with_observer(move |event| {
                let line = match event {
                    RunEvent::Started { index, .. } => format!("start {index}"),
                    RunEvent::Finished { report, .. } => format!("done {}", report.name),
                };
                sink.lock().unwrap().push(line);
            });
            runner.run(&[scenario("a", pass), scenario("b", pass)]);
            assert_eq!(
                *seen.lock().unwrap(),
                vec!["start 0", "done a", "start 1", "done b"]
            );
        }
    }

    mod teardown_tests {
        use super::*;

        #[test]
        fn test_screenshot_named_after_outcome() {
            let (mut runner, dir) = runner(false);
            let suite = runner.run(&[scenario("a", pass), scenario("b", fail)]);
            assert_eq!(
                suite.scenarios[0].screenshot,
                Some(dir.path().join("a-Passed0.png"))
            );
            assert_eq!(
                suite.scenarios[1].screenshot,
                Some(dir.path().join("b-Failed0.png"))
            );
        }

        #[test]
        fn test_screenshots_disabled() {
            let dir = tempfile::tempdir().unwrap();
            let mut config = ProbeConfig::new().with_screenshot_dir(dir.path());
            config.app.enable_screenshots = false;
            let mut runner =
                SuiteRunner::new(Arc::new(MockLauncher { fail: false }), Arc::new(config));
            let suite = runner.run(&[scenario("a", pass)]);
            assert!(suite.scenarios[0].screenshot.is_none());
        }
    }
}
