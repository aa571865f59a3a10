//! In-memory simulation of the store app.
//!
//! [`SimulatedStore`] implements [`AppDriver`] so the scenarios can run
//! without a device. It models the screens the scenarios visit and nothing
//! more: a scrollable product list, product detail with size/color
//! dropdowns, a swipeable cart, sign in, the shipping form with per-field
//! validation, and the order confirmation.
//!
//! [`Fault`]s make the app misbehave in specific ways so failure paths can be
//! exercised.

mod layout;
mod render;

pub use layout::{CART_LINE_HEIGHT, TILE_HEIGHT, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

use crate::config::{AppConfig, Markers, ProbeConfig};
use crate::driver::{AppDriver, AppLauncher, Screenshot};
use crate::query::{Point, Query};
use crate::result::{ProbeError, ProbeResult};
use layout::{Action, Field, Tree};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Minimum horizontal travel of a swipe that removes a cart line
pub const REMOVE_SWIPE_THRESHOLD: f32 = 300.0;

/// Deliberate misbehaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fault {
    /// Home screen lists no products
    EmptyCatalogue,
    /// Cart lines show a price different from the product's
    WrongCartPrice,
    /// Swiping a cart line does nothing
    IgnoreRemoval,
    /// Place order accepts empty required fields
    SkipValidation,
}

impl Fault {
    /// Every fault
    pub const ALL: [Self; 4] = [
        Self::EmptyCatalogue,
        Self::WrongCartPrice,
        Self::IgnoreRemoval,
        Self::SkipValidation,
    ];

    /// Snake-case name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EmptyCatalogue => "empty_catalogue",
            Self::WrongCartPrice => "wrong_cart_price",
            Self::IgnoreRemoval => "ignore_removal",
            Self::SkipValidation => "skip_validation",
        }
    }
}

impl std::str::FromStr for Fault {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| ProbeError::config(format!("unknown fault {s:?}")))
    }
}

/// One product in the simulated catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimProduct {
    /// Title
    pub title: String,
    /// Displayed price
    pub price: String,
    /// Size options, first is the default
    pub sizes: Vec<String>,
    /// Color options, first is the default
    pub colors: Vec<String>,
}

impl SimProduct {
    /// Create a product
    #[must_use]
    pub fn new(title: &str, price: &str, sizes: &[&str], colors: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            price: price.to_string(),
            sizes: sizes.iter().map(ToString::to_string).collect(),
            colors: colors.iter().map(ToString::to_string).collect(),
        }
    }
}

/// One shipping form field as the app lays it out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimField {
    /// Resource id of the text field
    pub id: String,
    /// Label used in the validation message
    pub label: String,
    /// Whether the field must be non-empty
    pub required: bool,
}

impl SimField {
    fn new(id: &str, label: &str, required: bool) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            required,
        }
    }

    /// Validation message shown when the field is empty
    #[must_use]
    pub fn error_text(&self) -> String {
        format!("{} is required", self.label)
    }
}

/// A group of shipping fields under one layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimSection {
    /// Layout marker
    pub layout: String,
    /// Fields in display order
    pub fields: Vec<SimField>,
}

/// Behaviour of the simulated app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorOptions {
    /// Product catalogue in home-screen order
    pub products: Vec<SimProduct>,
    /// Shipping form layout
    pub form: Vec<SimSection>,
    /// Marker strings the app's views carry
    pub markers: Markers,
    /// Email pre-filled on the sign-in screen
    pub account_email: String,
    /// Device serials the launcher accepts
    pub devices: Vec<String>,
    /// Active faults
    pub faults: BTreeSet<Fault>,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        let sizes = ["Small", "Medium", "Large", "X-Large"];
        Self {
            products: vec![
                SimProduct::new("C# T-Shirt", "$20.00", &sizes, &["Black", "Green", "White"]),
                SimProduct::new("Xamarin Hoodie", "$45.00", &sizes, &["Gray", "Navy"]),
                SimProduct::new("Monkey Polo", "$32.00", &sizes, &["Blue", "White"]),
                SimProduct::new("Mono Cap", "$15.00", &["One Size"], &["Black", "Red"]),
                SimProduct::new("F# Long Sleeve", "$28.00", &sizes[..3], &["Green", "Purple"]),
            ],
            form: vec![
                SimSection {
                    layout: "shippingLayout1".to_string(),
                    fields: vec![
                        SimField::new("firstName", "First name", true),
                        SimField::new("lastName", "Last name", true),
                        SimField::new("phone", "Phone number", true),
                        SimField::new("address1", "Address", true),
                        SimField::new("address2", "Address line 2", false),
                        SimField::new("city", "City", true),
                        SimField::new("postalCode", "Postal code", true),
                    ],
                },
                SimSection {
                    layout: "shippingLayout2".to_string(),
                    fields: vec![
                        SimField::new("state", "State", true),
                        SimField::new("country", "Country", true),
                    ],
                },
            ],
            markers: Markers::default(),
            account_email: "shopper@xamarin.com".to_string(),
            devices: vec!["emulator-5554".to_string()],
            faults: BTreeSet::new(),
        }
    }
}

impl SimulatorOptions {
    /// Create default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use these marker strings
    #[must_use]
    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    /// Replace the catalogue
    #[must_use]
    pub fn with_products(mut self, products: Vec<SimProduct>) -> Self {
        self.products = products;
        self
    }

    /// Activate a fault
    #[must_use]
    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.faults.insert(fault);
        self
    }

    /// Whether `fault` is active
    #[must_use]
    pub fn has_fault(&self, fault: Fault) -> bool {
        self.faults.contains(&fault)
    }

    /// Products shown on the home screen
    #[must_use]
    pub fn catalogue(&self) -> &[SimProduct] {
        if self.has_fault(Fault::EmptyCatalogue) {
            &[]
        } else {
            &self.products
        }
    }
}

/// Size or color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Variant {
    Size,
    Color,
}

impl Variant {
    const fn spinner_id(self) -> &'static str {
        match self {
            Self::Size => "sizeSpinner",
            Self::Color => "colorSpinner",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SimScreen {
    Home,
    Product(usize),
    Cart,
    SignIn,
    Shipping,
    OrderComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CartItem {
    pub product: usize,
    pub size: usize,
    pub color: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct SimState {
    pub stack: Vec<SimScreen>,
    pub scroll: f32,
    pub selection: (usize, usize),
    pub dropdown: Option<Variant>,
    pub cart: Vec<CartItem>,
    pub email: String,
    pub password: String,
    pub shipping: HashMap<String, String>,
    pub errors: BTreeSet<String>,
}

impl SimState {
    fn new(email: &str) -> Self {
        Self {
            stack: vec![SimScreen::Home],
            scroll: 0.0,
            selection: (0, 0),
            dropdown: None,
            cart: Vec::new(),
            email: email.to_string(),
            password: String::new(),
            shipping: HashMap::new(),
            errors: BTreeSet::new(),
        }
    }

    pub fn screen(&self) -> SimScreen {
        self.stack.last().copied().unwrap_or(SimScreen::Home)
    }

    fn navigate(&mut self, screen: SimScreen) {
        if self.screen() != screen {
            self.stack.push(screen);
        }
    }
}

/// The store app running in memory
#[derive(Debug)]
pub struct SimulatedStore {
    options: SimulatorOptions,
    state: SimState,
    closed: bool,
}

impl SimulatedStore {
    /// Launch onto the home screen
    #[must_use]
    pub fn new(options: SimulatorOptions) -> Self {
        let state = SimState::new(&options.account_email);
        Self {
            options,
            state,
            closed: false,
        }
    }

    /// Number of cart lines
    #[must_use]
    pub fn cart_len(&self) -> usize {
        self.state.cart.len()
    }

    /// Current home scroll offset
    #[must_use]
    pub const fn scroll_offset(&self) -> f32 {
        self.state.scroll
    }

    fn ensure_open(&self) -> ProbeResult<()> {
        if self.closed {
            Err(ProbeError::driver("app has been closed"))
        } else {
            Ok(())
        }
    }

    fn tree(&self) -> Tree {
        layout::render(&self.state, &self.options)
    }

    fn first_match(&self, tree: &Tree, query: &Query) -> ProbeResult<usize> {
        tree.evaluate(query)
            .first()
            .copied()
            .ok_or_else(|| ProbeError::ElementNotFound {
                query: query.to_string(),
            })
    }

    fn perform(&mut self, action: Action) {
        match action {
            Action::None | Action::CartLine(_) | Action::Edit(_) => {}
            Action::GoHome => {
                self.state.stack = vec![SimScreen::Home];
                self.state.scroll = 0.0;
                self.state.dropdown = None;
            }
            Action::OpenCart => {
                // the product screen is not kept behind the cart
                if matches!(self.state.screen(), SimScreen::Product(_)) {
                    self.state.stack.pop();
                }
                self.state.dropdown = None;
                self.state.navigate(SimScreen::Cart);
            }
            Action::OpenProduct(p) => {
                self.state.selection = (0, 0);
                self.state.navigate(SimScreen::Product(p));
            }
            Action::OpenDropdown(variant) => self.state.dropdown = Some(variant),
            Action::ChooseOption(k) => {
                match self.state.dropdown {
                    Some(Variant::Size) => self.state.selection.0 = k,
                    Some(Variant::Color) => self.state.selection.1 = k,
                    None => {}
                }
                self.state.dropdown = None;
            }
            Action::AddToBasket => {
                if let SimScreen::Product(product) = self.state.screen() {
                    let (size, color) = self.state.selection;
                    self.state.cart.push(CartItem {
                        product,
                        size,
                        color,
                    });
                }
            }
            Action::Checkout => {
                if !self.state.cart.is_empty() {
                    self.state.navigate(SimScreen::SignIn);
                }
            }
            Action::SignIn => {
                if !self.state.password.is_empty() {
                    self.state.navigate(SimScreen::Shipping);
                }
            }
            Action::PlaceOrder => self.place_order(),
        }
    }

    fn place_order(&mut self) {
        let missing: BTreeSet<String> = if self.options.has_fault(Fault::SkipValidation) {
            BTreeSet::new()
        } else {
            self.options
                .form
                .iter()
                .flat_map(|s| s.fields.iter())
                .filter(|f| f.required)
                .filter(|f| self.state.shipping.get(&f.id).map_or(true, String::is_empty))
                .map(|f| f.id.clone())
                .collect()
        };
        if missing.is_empty() {
            info!(lines = self.state.cart.len(), "order placed");
            self.state.cart.clear();
            self.state.errors.clear();
            self.state.navigate(SimScreen::OrderComplete);
        } else {
            debug!(missing = missing.len(), "shipping validation failed");
            self.state.errors = missing;
        }
    }

    fn swipe_cart_line(&mut self, from: Point, to: Point) {
        let dx = to.x - from.x;
        if dx.abs() < REMOVE_SWIPE_THRESHOLD || dx.abs() <= (to.y - from.y).abs() {
            return;
        }
        let tree = self.tree();
        let hit = tree.nodes.iter().find_map(|n| match n.action {
            Action::CartLine(k) if n.element.rect.contains(&from) => Some(k),
            _ => None,
        });
        if let Some(k) = hit {
            if self.options.has_fault(Fault::IgnoreRemoval) {
                debug!(line = k, "removal ignored");
            } else {
                self.state.cart.remove(k);
            }
        }
    }
}

impl AppDriver for SimulatedStore {
    fn query(&self, query: &Query) -> ProbeResult<Vec<crate::query::Element>> {
        self.ensure_open()?;
        Ok(self.tree().elements(query))
    }

    fn tap(&mut self, query: &Query) -> ProbeResult<()> {
        self.ensure_open()?;
        let tree = self.tree();
        let index = self.first_match(&tree, query)?;
        let node = &tree.nodes[index];
        if !node.element.visible {
            return Err(ProbeError::driver(format!("{query} is not on screen")));
        }
        if self.state.dropdown.is_some() && !node.modal {
            // tapping outside a dropdown dismisses it
            self.state.dropdown = None;
            return Ok(());
        }
        self.perform(node.action.clone());
        Ok(())
    }

    fn drag_coordinates(&mut self, from: Point, to: Point) -> ProbeResult<()> {
        self.ensure_open()?;
        match self.state.screen() {
            SimScreen::Home => {
                let max = layout::home_max_scroll(self.options.catalogue().len());
                self.state.scroll = (self.state.scroll - (to.y - from.y)).clamp(0.0, max);
            }
            SimScreen::Cart => self.swipe_cart_line(from, to),
            _ => {}
        }
        Ok(())
    }

    fn enter_text(&mut self, query: &Query, text: &str) -> ProbeResult<()> {
        self.ensure_open()?;
        let tree = self.tree();
        let index = self.first_match(&tree, query)?;
        match &tree.nodes[index].action {
            Action::Edit(Field::Email) => self.state.email = text.to_string(),
            Action::Edit(Field::Password) => self.state.password = text.to_string(),
            Action::Edit(Field::Shipping(id)) => {
                self.state.errors.remove(id);
                self.state.shipping.insert(id.clone(), text.to_string());
            }
            _ => return Err(ProbeError::driver(format!("{query} is not editable"))),
        }
        Ok(())
    }

    fn back(&mut self) -> ProbeResult<()> {
        self.ensure_open()?;
        if self.state.dropdown.take().is_none() && self.state.stack.len() > 1 {
            self.state.stack.pop();
        }
        Ok(())
    }

    fn screenshot(&mut self, name: &str) -> ProbeResult<Screenshot> {
        self.ensure_open()?;
        debug!(name, "simulated screenshot");
        render::screenshot(&self.tree())
    }

    fn close(&mut self) -> ProbeResult<()> {
        self.closed = true;
        Ok(())
    }
}

/// Launches [`SimulatedStore`] instances
#[derive(Debug, Clone, Default)]
pub struct SimulatorLauncher {
    options: SimulatorOptions,
}

impl SimulatorLauncher {
    /// Create a launcher
    #[must_use]
    pub const fn new(options: SimulatorOptions) -> Self {
        Self { options }
    }

    /// Options every launched store gets
    #[must_use]
    pub const fn options(&self) -> &SimulatorOptions {
        &self.options
    }

    /// Reject settings the simulated app cannot honour
    ///
    /// A cart swipe shorter than [`REMOVE_SWIPE_THRESHOLD`] never removes a
    /// line, so every removal would time out instead of failing up front.
    pub fn check_config(&self, config: &ProbeConfig) -> ProbeResult<()> {
        if config.cart.swipe_distance < REMOVE_SWIPE_THRESHOLD {
            return Err(ProbeError::config(format!(
                "cart.swipe_distance {} is below the simulator's removal threshold {}",
                config.cart.swipe_distance, REMOVE_SWIPE_THRESHOLD
            )));
        }
        Ok(())
    }
}

impl AppLauncher for SimulatorLauncher {
    fn launch(&self, config: &AppConfig) -> ProbeResult<Box<dyn AppDriver>> {
        if let Some(serial) = &config.device_serial {
            if !self.options.devices.contains(serial) {
                return Err(ProbeError::LaunchFailed {
                    message: format!("no device with serial {serial}"),
                });
            }
        }
        debug!(
            platform = %config.platform,
            app = %config.app_path.display(),
            "launching simulated store"
        );
        Ok(Box::new(SimulatedStore::new(self.options.clone())))
    }
}
