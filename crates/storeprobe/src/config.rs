//! Harness configuration.
//!
//! Loaded once at process start from YAML (or defaults) and shared read-only
//! as `Arc<ProbeConfig>`. Every section falls back to its defaults, so a
//! config file only needs the keys it overrides.

use crate::fixtures::FixtureSet;
use crate::query::Point;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Target platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Android device or emulator
    #[default]
    Android,
    /// iOS device or simulator
    Ios,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Android => f.write_str("android"),
            Self::Ios => f.write_str("ios"),
        }
    }
}

/// How to launch the app under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Target platform
    pub platform: Platform,
    /// Path to the app package (APK / app bundle)
    pub app_path: PathBuf,
    /// Device serial; `None` lets the launcher pick the only attached device
    pub device_serial: Option<String>,
    /// Whether the launcher should enable local screenshots
    pub enable_screenshots: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Android,
            app_path: PathBuf::from("XamarinStore.Droid/com.xamarin.XamStore.apk"),
            device_serial: None,
            enable_screenshots: true,
        }
    }
}

/// Wait bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Element wait bound in milliseconds
    pub element_ms: u64,
    /// Poll interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            element_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl TimeoutConfig {
    /// As wait options
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.element_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }
}

/// Scroll-until-visible gesture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Maximum number of drags before giving up
    pub max_attempts: u32,
    /// Drag start
    pub drag_from: Point,
    /// Drag end
    pub drag_to: Point,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            drag_from: Point::new(0.0, 150.0),
            drag_to: Point::new(0.0, 0.0),
        }
    }
}

/// Cart gestures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Horizontal distance of the swipe that removes a cart line.
    ///
    /// The app only treats a swipe as a removal past its own threshold
    /// (300 px in the simulator); shorter swipes leave the line in place.
    pub swipe_distance: f32,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            swipe_distance: 500.0,
        }
    }
}

/// Marker strings and class names the locator catalog is built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    /// Basket icon in the action bar
    pub basket_cart: String,
    /// Text shown by an empty cart
    pub basket_empty: String,
    /// Container of the home product tiles
    pub home_products: String,
    /// Class of plain text elements
    pub text_view: String,
    /// Container of the product detail texts
    pub product_description: String,
    /// Class of the selected size/color entries
    pub checked_text_view: String,
    /// Class of the size/color dropdowns
    pub spinner: String,
    /// Open dropdown list
    pub dropdown_list: String,
    /// Add-to-basket button
    pub add_to_basket: String,
    /// Checkout button
    pub checkout: String,
    /// Container of one cart line
    pub cart_line: String,
    /// Home button
    pub home: String,
    /// Sign-in button
    pub sign_in: String,
    /// Email field
    pub email: String,
    /// Password field
    pub password: String,
    /// Place-order button
    pub place_order: String,
    /// Class of text input fields
    pub edit_text: String,
    /// Order confirmation view
    pub order_complete: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            basket_cart: "cart_menu_item".to_string(),
            basket_empty: "Your basket is empty".to_string(),
            home_products: "NoResourceEntry-1610612737".to_string(),
            text_view: "TextView".to_string(),
            product_description: "descriptionLayout".to_string(),
            checked_text_view: "CheckedTextView".to_string(),
            spinner: "Spinner".to_string(),
            dropdown_list: "select_dialog_listview".to_string(),
            add_to_basket: "addToBasket".to_string(),
            checkout: "Checkout".to_string(),
            cart_line: "SwipeContent".to_string(),
            home: "home".to_string(),
            sign_in: "signInBtn".to_string(),
            email: "email".to_string(),
            password: "password".to_string(),
            place_order: "placeOrder".to_string(),
            edit_text: "EditText".to_string(),
            order_complete: "orderComplete".to_string(),
        }
    }
}

impl Markers {
    fn entries(&self) -> [(&'static str, &str); 18] {
        [
            ("basket_cart", &self.basket_cart),
            ("basket_empty", &self.basket_empty),
            ("home_products", &self.home_products),
            ("text_view", &self.text_view),
            ("product_description", &self.product_description),
            ("checked_text_view", &self.checked_text_view),
            ("spinner", &self.spinner),
            ("dropdown_list", &self.dropdown_list),
            ("add_to_basket", &self.add_to_basket),
            ("checkout", &self.checkout),
            ("cart_line", &self.cart_line),
            ("home", &self.home),
            ("sign_in", &self.sign_in),
            ("email", &self.email),
            ("password", &self.password),
            ("place_order", &self.place_order),
            ("edit_text", &self.edit_text),
            ("order_complete", &self.order_complete),
        ]
    }

    /// Reject empty markers
    pub fn validate(&self) -> ProbeResult<()> {
        for (key, value) in self.entries() {
            if value.trim().is_empty() {
                return Err(ProbeError::config(format!("markers.{key} is empty")));
            }
        }
        Ok(())
    }
}

/// Root configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// App launch settings
    pub app: AppConfig,
    /// Wait bounds
    pub timeouts: TimeoutConfig,
    /// Scroll gesture
    pub scroll: ScrollConfig,
    /// Cart gestures
    pub cart: CartConfig,
    /// Screenshot directory
    pub screenshot_dir: PathBuf,
    /// Marker strings
    pub markers: Markers,
    /// Test data
    pub fixtures: FixtureSet,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
            timeouts: TimeoutConfig::default(),
            scroll: ScrollConfig::default(),
            cart: CartConfig::default(),
            screenshot_dir: PathBuf::from("target/storeprobe/screenshots"),
            markers: Markers::default(),
            fixtures: FixtureSet::default(),
        }
    }
}

impl ProbeConfig {
    /// Create default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a YAML string and validate
    ///
    /// # Errors
    /// Returns error if parsing or validation fails
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file and validate
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed, or validated
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ProbeError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&text)
    }

    /// Serialize to YAML
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Set the element wait bound
    #[must_use]
    pub const fn with_element_timeout(mut self, ms: u64) -> Self {
        self.timeouts.element_ms = ms;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, ms: u64) -> Self {
        self.timeouts.poll_interval_ms = ms;
        self
    }

    /// Set the scroll attempt bound
    #[must_use]
    pub const fn with_max_scroll_attempts(mut self, attempts: u32) -> Self {
        self.scroll.max_attempts = attempts;
        self
    }

    /// Set the screenshot directory
    #[must_use]
    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    /// Set the device serial
    #[must_use]
    pub fn with_device_serial(mut self, serial: impl Into<String>) -> Self {
        self.app.device_serial = Some(serial.into());
        self
    }

    /// Wait options derived from the timeouts section
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        self.timeouts.wait_options()
    }

    /// Validate configuration values
    ///
    /// # Errors
    /// Returns the first problem found
    pub fn validate(&self) -> ProbeResult<()> {
        if self.timeouts.element_ms == 0 {
            return Err(ProbeError::config("timeouts.element_ms must be positive"));
        }
        if self.timeouts.poll_interval_ms == 0 {
            return Err(ProbeError::config(
                "timeouts.poll_interval_ms must be positive",
            ));
        }
        if self.scroll.max_attempts == 0 {
            return Err(ProbeError::config("scroll.max_attempts must be positive"));
        }
        if self.cart.swipe_distance <= 0.0 {
            return Err(ProbeError::config("cart.swipe_distance must be positive"));
        }
        if self.screenshot_dir.as_os_str().is_empty() {
            return Err(ProbeError::config("screenshot_dir is empty"));
        }
        self.markers.validate()?;
        self.fixtures.validate()?;

        let mut layouts = HashSet::new();
        for section in &self.fixtures.shipping {
            if !layouts.insert(section.layout.as_str()) {
                return Err(ProbeError::config(format!(
                    "shipping layout {:?} listed twice",
                    section.layout
                )));
            }
        }
        Ok(())
    }
}
