//! Storeprobe: end-to-end UI scenarios for the mobile store app
//!
//! Drives the store app through an automation boundary ([`AppDriver`]) and
//! checks that browsing, cart, variant selection, sign-in and shipping
//! behave as a shopper would expect.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ SuiteRunner  │──►│ Scenario    │──►│ StoreFlow   │──►│ AppSession   │
//! │ (launch,     │   │ (scripted   │   │ (screen     │   │ (waits,      │
//! │  teardown)   │   │  steps)     │   │  stack)     │   │  gestures)   │
//! └──────────────┘   └─────────────┘   └─────────────┘   └──────┬───────┘
//!                                                              │
//!                                       ┌──────────────────────▼───────┐
//!                                       │ AppDriver: device or          │
//!                                       │ SimulatedStore                │
//!                                       └───────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use storeprobe::{ProbeConfig, SimulatorLauncher, SuiteRunner};
//!
//! let config = Arc::new(ProbeConfig::new().with_element_timeout(2_000));
//! let mut runner = SuiteRunner::new(Arc::new(SimulatorLauncher::default()), config);
//! let report = runner.run_all();
//! println!("{}", report.summary());
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod assert;
mod config;
mod driver;
mod fixtures;
mod flow;
mod locators;
mod query;
mod report;
mod result;
mod runner;
mod screenshot;
mod session;
mod wait;

/// Named end-to-end scenarios
pub mod scenarios;

/// In-memory store app for running scenarios without a device
pub mod simulator;

pub use assert::{assert_count, assert_text, assert_text_at, element_at};
pub use config::{
    AppConfig, CartConfig, Markers, Platform, ProbeConfig, ScrollConfig, TimeoutConfig,
};
pub use driver::{AppDriver, AppLauncher, MockDriver, Screenshot};
pub use fixtures::{Credentials, FixtureSet, ShippingField, ShippingSection};
pub use flow::{CartLine, ProductDetails, ProductTile, Screen, StoreFlow};
pub use locators::{
    LocatorCatalog, CART_LINE_WIDTH, COLOR_DROPDOWN, HOME_TILE_WIDTH, SIZE_DROPDOWN,
};
pub use query::{Element, Locator, Point, Query, QueryStep, Rect};
pub use report::{ScenarioReport, ScenarioStatus, SuiteReport};
pub use result::{FailureKind, ProbeError, ProbeResult};
pub use runner::{RunEvent, RunObserver, SuiteRunner};
pub use scenarios::Scenario;
pub use screenshot::{ScreenshotStore, SCREENSHOT_EXT};
pub use session::{AppSession, TapTarget};
pub use simulator::{Fault, SimulatedStore, SimulatorLauncher, SimulatorOptions};
pub use wait::{
    WaitOptions, WaitResult, Waiter, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::driver::*;
    pub use super::flow::*;
    pub use super::query::*;
    pub use super::result::*;
    pub use super::runner::*;
    pub use super::session::*;
    pub use super::{ProbeConfig, Scenario, SuiteReport};
}
