//! AppDriver - the device/app automation boundary.
//!
//! The element query engine, gesture injection and app launch belong to an
//! external automation framework. Scenarios only reach it through these
//! traits, so any backend (a device bridge, a cloud device farm, or the
//! in-memory [`crate::simulator::SimulatedStore`]) can be swapped in.
//!
//! ```text
//! ┌──────────────┐   query/tap/drag/enter_text/back/screenshot   ┌────────────┐
//! │  AppSession  │ ─────────────────────────────────────────────►│ AppDriver  │
//! └──────────────┘                                                └────────────┘
//!        ▲                      launch(&AppConfig)                      ▲
//!        └──────────────────────── AppLauncher ─────────────────────────┘
//! ```

use crate::config::AppConfig;
use crate::query::{Element, Point, Query};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{WaitOptions, WaitResult, Waiter};
use std::collections::HashMap;
use std::time::SystemTime;

/// Screenshot data with metadata
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Encoded PNG data
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Timestamp when the screenshot was taken
    pub timestamp: SystemTime,
}

impl Screenshot {
    /// Create a new screenshot
    #[must_use]
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp: SystemTime::now(),
        }
    }

    /// Get the size in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check if screenshot is valid (has data)
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty() && self.width > 0 && self.height > 0
    }
}

/// One running instance of the app under test.
///
/// Implementations are exclusively owned by a single scenario, so methods
/// take `&mut self` for anything that changes the screen.
pub trait AppDriver: Send {
    /// Evaluate a query against the live view hierarchy, in document order
    fn query(&self, query: &Query) -> ProbeResult<Vec<Element>>;

    /// Tap the first element matching the query
    fn tap(&mut self, query: &Query) -> ProbeResult<()>;

    /// Drag from one screen coordinate to another
    fn drag_coordinates(&mut self, from: Point, to: Point) -> ProbeResult<()>;

    /// Replace the content of the first matching field without typing
    fn enter_text(&mut self, query: &Query, text: &str) -> ProbeResult<()>;

    /// Back navigation gesture
    fn back(&mut self) -> ProbeResult<()>;

    /// Capture the current screen
    fn screenshot(&mut self, name: &str) -> ProbeResult<Screenshot>;

    /// Shut the app down
    fn close(&mut self) -> ProbeResult<()> {
        Ok(())
    }

    /// Wait until at least one element matches
    fn wait_for(&self, query: &Query, options: &WaitOptions) -> ProbeResult<WaitResult> {
        Waiter::new(*options).wait_for(&query.to_string(), || {
            Ok(!self.query(query)?.is_empty())
        })
    }

    /// Wait until no element matches
    fn wait_for_absence(&self, query: &Query, options: &WaitOptions) -> ProbeResult<WaitResult> {
        Waiter::new(*options).wait_for(&format!("absence of {query}"), || {
            Ok(self.query(query)?.is_empty())
        })
    }
}

/// Starts app sessions
pub trait AppLauncher: Send + Sync {
    /// Launch a fresh app instance
    fn launch(&self, config: &AppConfig) -> ProbeResult<Box<dyn AppDriver>>;
}

/// Mock driver for unit testing.
///
/// Answers queries from a table keyed by the rendered query and records
/// every call.
#[derive(Debug, Default)]
pub struct MockDriver {
    /// Canned query responses, keyed by `Query::to_string()`
    pub responses: HashMap<String, Vec<Element>>,
    /// Screenshot data
    pub screenshot_data: Option<Screenshot>,
    /// Call history for verification
    pub call_history: Vec<String>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `elements`
    pub fn respond(&mut self, query: &Query, elements: Vec<Element>) {
        self.responses.insert(query.to_string(), elements);
    }

    /// Set mock screenshot
    pub fn set_screenshot(&mut self, screenshot: Screenshot) {
        self.screenshot_data = Some(screenshot);
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.call_history
    }

    /// Number of calls whose record starts with `method`
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.call_history
            .iter()
            .filter(|c| c.starts_with(method))
            .count()
    }
}

impl AppDriver for MockDriver {
    fn query(&self, query: &Query) -> ProbeResult<Vec<Element>> {
        Ok(self
            .responses
            .get(&query.to_string())
            .cloned()
            .unwrap_or_default())
    }

    fn tap(&mut self, query: &Query) -> ProbeResult<()> {
        self.call_history.push(format!("tap:{query}"));
        Ok(())
    }

    fn drag_coordinates(&mut self, from: Point, to: Point) -> ProbeResult<()> {
        self.call_history.push(format!(
            "drag:{},{}->{},{}",
            from.x, from.y, to.x, to.y
        ));
        Ok(())
    }

    fn enter_text(&mut self, query: &Query, text: &str) -> ProbeResult<()> {
        self.call_history.push(format!("enter_text:{query}={text}"));
        Ok(())
    }

    fn back(&mut self) -> ProbeResult<()> {
        self.call_history.push("back".to_string());
        Ok(())
    }

    fn screenshot(&mut self, name: &str) -> ProbeResult<Screenshot> {
        self.call_history.push(format!("screenshot:{name}"));
        self.screenshot_data
            .clone()
            .ok_or_else(|| ProbeError::Screenshot {
                message: "No mock screenshot set".to_string(),
            })
    }

    fn close(&mut self) -> ProbeResult<()> {
        self.call_history.push("close".to_string());
        Ok(())
    }
}
