//! Interaction helpers over one running app instance.
//!
//! An [`AppSession`] exclusively owns its driver for the lifetime of one
//! scenario. Every helper blocks until its precondition holds or the
//! configured bound elapses.

use crate::config::ProbeConfig;
use crate::driver::AppDriver;
use crate::query::{Element, Locator, Point, Query};
use crate::result::{ProbeError, ProbeResult};
use crate::screenshot::ScreenshotStore;
use crate::wait::{WaitResult, Waiter};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// What to do before waiting in [`AppSession::tap_then_wait`]
#[derive(Debug, Clone)]
pub enum TapTarget {
    /// Tap the first element matching the locator
    Tap(Locator),
    /// Issue back navigation
    Back,
}

impl std::fmt::Display for TapTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tap(locator) => write!(f, "tap {}", locator.name()),
            Self::Back => f.write_str("back"),
        }
    }
}

/// One app instance driven by one scenario
pub struct AppSession {
    id: Uuid,
    driver: Box<dyn AppDriver>,
    config: Arc<ProbeConfig>,
    screenshots: ScreenshotStore,
    closed: bool,
}

impl std::fmt::Debug for AppSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppSession")
            .field("id", &self.id)
            .field("screenshots", &self.screenshots)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl AppSession {
    /// Wrap a freshly launched driver
    #[must_use]
    pub fn new(driver: Box<dyn AppDriver>, config: Arc<ProbeConfig>) -> Self {
        let screenshots = ScreenshotStore::new(config.screenshot_dir.clone());
        Self {
            id: Uuid::new_v4(),
            driver,
            config,
            screenshots,
            closed: false,
        }
    }

    /// Session id
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Shared configuration
    #[must_use]
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Another handle to the shared configuration
    #[must_use]
    pub fn shared_config(&self) -> Arc<ProbeConfig> {
        Arc::clone(&self.config)
    }

    /// Evaluate a locator against the current screen
    pub fn query(&self, locator: &Locator) -> ProbeResult<Vec<Element>> {
        let elements = self.driver.query(&locator.query())?;
        debug!(locator = locator.name(), count = elements.len(), "query");
        Ok(elements)
    }

    /// Block until `locator` matches at least one element
    pub fn wait_for_element(&self, locator: &Locator) -> ProbeResult<WaitResult> {
        let options = self.config.wait_options();
        self.driver
            .wait_for(&locator.query(), &options)
            .map_err(|e| relabel_timeout(e, locator.to_string()))
    }

    /// Block until `locator` matches nothing
    pub fn wait_for_no_element(&self, locator: &Locator) -> ProbeResult<WaitResult> {
        let options = self.config.wait_options();
        self.driver
            .wait_for_absence(&locator.query(), &options)
            .map_err(|e| relabel_timeout(e, format!("absence of {locator}")))
    }

    /// Block until any of `locators` matches; returns the index of the first
    /// one that did
    pub fn wait_for_any(&self, locators: &[Locator]) -> ProbeResult<usize> {
        let description = locators
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" or ");
        let mut hit = 0;
        Waiter::new(self.config.wait_options()).wait_for(&description, || {
            for (i, locator) in locators.iter().enumerate() {
                if !self.driver.query(&locator.query())?.is_empty() {
                    hit = i;
                    return Ok(true);
                }
            }
            Ok(false)
        })?;
        Ok(hit)
    }

    /// Block until `condition` holds for this session
    pub fn wait_until<F>(&self, description: &str, mut condition: F) -> ProbeResult<WaitResult>
    where
        F: FnMut(&Self) -> ProbeResult<bool>,
    {
        Waiter::new(self.config.wait_options()).wait_for(description, || condition(self))
    }

    /// Tap the first element matching `locator`
    pub fn tap(&mut self, locator: &Locator) -> ProbeResult<()> {
        debug!(locator = locator.name(), "tap");
        self.driver.tap(&locator.query())
    }

    /// Drag between two screen points
    pub fn drag(&mut self, from: Point, to: Point) -> ProbeResult<()> {
        debug!(from_x = from.x, from_y = from.y, to_x = to.x, to_y = to.y, "drag");
        self.driver.drag_coordinates(from, to)
    }

    /// Back navigation
    pub fn back(&mut self) -> ProbeResult<()> {
        debug!("back");
        self.driver.back()
    }

    /// Perform `target`, then wait for `wait_for` when given
    pub fn tap_then_wait(&mut self, target: TapTarget, wait_for: Option<&Locator>) -> ProbeResult<()> {
        match &target {
            TapTarget::Tap(locator) => self.tap(locator)?,
            TapTarget::Back => self.back()?,
        }
        if let Some(locator) = wait_for {
            self.wait_for_element(locator)?;
        }
        Ok(())
    }

    /// Replace the content of the field marked `marker`
    pub fn enter_text(&mut self, marker: &str, text: &str) -> ProbeResult<()> {
        debug!(marker, len = text.len(), "enter text");
        self.driver.enter_text(&Query::all().marked(marker), text)
    }

    /// Drag until a visible element marked `marker` exists.
    ///
    /// Issues at most `scroll.max_attempts` drags. Returns `false` when the
    /// attempts run out.
    pub fn scroll_until_visible(&mut self, marker: &str) -> ProbeResult<bool> {
        let query = Query::all().marked(marker);
        let scroll = self.config.scroll;
        let mut drags = 0u32;
        loop {
            if self.driver.query(&query)?.iter().any(|e| e.visible) {
                debug!(marker, drags, "visible");
                return Ok(true);
            }
            if drags >= scroll.max_attempts {
                warn!(marker, drags, "scroll attempts exhausted");
                return Ok(false);
            }
            self.drag(scroll.drag_from, scroll.drag_to)?;
            drags += 1;
        }
    }

    /// Capture the screen and save it under the next free `{name}{n}.png`
    pub fn take_screenshot(&mut self, name: &str) -> ProbeResult<PathBuf> {
        let shot = self.driver.screenshot(name)?;
        let path = self.screenshots.save(name, &shot)?;
        debug!(path = %path.display(), bytes = shot.size_bytes(), "screenshot");
        Ok(path)
    }

    /// Log every element on screen and return how many there were
    pub fn dump_tree(&self) -> ProbeResult<usize> {
        let elements = self.driver.query(&Query::all())?;
        for (i, e) in elements.iter().enumerate() {
            debug!(
                index = i,
                id = %e.id,
                class = %e.class,
                text = %e.text,
                visible = e.visible,
                "element"
            );
        }
        Ok(elements.len())
    }

    /// Shut the app down; later calls are no-ops
    pub fn close(&mut self) -> ProbeResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        debug!(session = %self.id, "close");
        self.driver.close()
    }

    /// Whether [`Self::close`] has run
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }
}

fn relabel_timeout(error: ProbeError, waited_for: String) -> ProbeError {
    match error {
        ProbeError::Timeout { ms, .. } => ProbeError::Timeout { waited_for, ms },
        other => other,
    }
}
