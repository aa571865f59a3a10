//! Store navigation state machine.
//!
//! [`StoreFlow`] tracks which [`Screen`] the app is on and mirrors the app's
//! back stack. Every transition is a tap-then-wait step guarded by the
//! current screen: asking for a transition from the wrong screen is an
//! [`ProbeError::InvalidState`], never a blind tap.
//!
//! ```text
//!  Home ──tile──► ProductDetail ──cart──► Cart ──checkout──► SignIn
//!   ▲                                       │                  │ sign in
//!   └──────────────── home ◄────────────────┘                  ▼
//!                                       OrderComplete ◄── ShippingForm
//!                                                     place order
//! ```

use crate::assert::{assert_count, assert_text, element_at};
use crate::config::ProbeConfig;
use crate::fixtures::{ShippingField, ShippingSection};
use crate::locators::{LocatorCatalog, CART_LINE_WIDTH, HOME_TILE_WIDTH};
use crate::query::{Element, Locator, Point};
use crate::result::{ProbeError, ProbeResult};
use crate::session::{AppSession, TapTarget};
use std::sync::Arc;
use tracing::debug;

/// App screens a scenario moves between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    /// Product list
    Home,
    /// One product with its size/color dropdowns
    ProductDetail,
    /// Basket
    Cart,
    /// Account sign-in
    SignIn,
    /// Shipping address form
    ShippingForm,
    /// Order confirmation
    OrderComplete,
}

impl Screen {
    /// Locators of which at least one matches once the screen is ready
    #[must_use]
    pub fn ready_locators(self, catalog: &LocatorCatalog) -> Vec<Locator> {
        match self {
            Self::Home => vec![catalog.home_products.clone()],
            Self::ProductDetail => vec![catalog.add_to_basket.clone()],
            // an empty cart has no checkout button
            Self::Cart => vec![catalog.checkout.clone(), catalog.basket_empty.clone()],
            Self::SignIn => vec![catalog.sign_in.clone()],
            Self::ShippingForm => vec![catalog.place_order.clone()],
            Self::OrderComplete => vec![catalog.order_complete.clone()],
        }
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Home => "home",
            Self::ProductDetail => "product detail",
            Self::Cart => "cart",
            Self::SignIn => "sign in",
            Self::ShippingForm => "shipping form",
            Self::OrderComplete => "order complete",
        };
        f.write_str(name)
    }
}

/// A home screen tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductTile {
    /// Product title
    pub title: String,
    /// Displayed price
    pub price: String,
}

/// What the product detail screen shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetails {
    /// Product title
    pub title: String,
    /// Displayed price
    pub price: String,
    /// Selected size
    pub size: String,
    /// Selected color
    pub color: String,
}

/// One cart line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    /// Product title
    pub title: String,
    /// Displayed price
    pub price: String,
    /// Size
    pub size: String,
    /// Color
    pub color: String,
}

impl CartLine {
    /// Fail unless this line shows exactly `details`
    pub fn assert_matches(&self, details: &ProductDetails, line: usize) -> ProbeResult<()> {
        assert_text(&format!("cart line {line} title"), &details.title, &self.title)?;
        assert_text(&format!("cart line {line} price"), &details.price, &self.price)?;
        assert_text(&format!("cart line {line} size"), &details.size, &self.size)?;
        assert_text(&format!("cart line {line} color"), &details.color, &self.color)
    }
}

/// Scenario-facing driver of the store app
#[derive(Debug)]
pub struct StoreFlow {
    session: AppSession,
    catalog: LocatorCatalog,
    config: Arc<ProbeConfig>,
    stack: Vec<Screen>,
    dropdown_open: bool,
}

impl StoreFlow {
    /// Wrap a session whose app has just launched onto the home screen
    #[must_use]
    pub fn new(session: AppSession) -> Self {
        let config = session.shared_config();
        let catalog = LocatorCatalog::new(&config.markers);
        Self {
            session,
            catalog,
            config,
            stack: vec![Screen::Home],
            dropdown_open: false,
        }
    }

    /// Current screen
    #[must_use]
    pub fn screen(&self) -> Screen {
        self.stack.last().copied().unwrap_or(Screen::Home)
    }

    /// Locator catalog
    #[must_use]
    pub const fn catalog(&self) -> &LocatorCatalog {
        &self.catalog
    }

    /// Shared configuration
    #[must_use]
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Underlying session
    #[must_use]
    pub const fn session(&self) -> &AppSession {
        &self.session
    }

    /// Underlying session, mutably
    pub fn session_mut(&mut self) -> &mut AppSession {
        &mut self.session
    }

    /// Give the session back, e.g. for teardown
    #[must_use]
    pub fn into_session(self) -> AppSession {
        self.session
    }

    fn expect_screen(&self, allowed: &[Screen], action: &str) -> ProbeResult<()> {
        let current = self.screen();
        if allowed.contains(&current) {
            Ok(())
        } else {
            Err(ProbeError::invalid_state(format!(
                "cannot {action} from the {current} screen"
            )))
        }
    }

    fn expect_dropdown(&self, open: bool, action: &str) -> ProbeResult<()> {
        if self.dropdown_open == open {
            Ok(())
        } else if open {
            Err(ProbeError::invalid_state(format!(
                "cannot {action} without an open dropdown"
            )))
        } else {
            Err(ProbeError::invalid_state(format!(
                "cannot {action} while a dropdown is open"
            )))
        }
    }

    /// Block until `screen` is showing
    pub fn wait_ready(&self, screen: Screen) -> ProbeResult<()> {
        self.session
            .wait_for_any(&screen.ready_locators(&self.catalog))
            .map(|_| ())
    }

    fn push(&mut self, screen: Screen) {
        debug!(from = %self.screen(), to = %screen, "navigate");
        self.stack.push(screen);
    }

    // ------------------------------------------------------------------
    // Home
    // ------------------------------------------------------------------

    /// Every product tile on the home screen, including off-screen ones
    pub fn home_products(&self) -> ProbeResult<Vec<ProductTile>> {
        self.expect_screen(&[Screen::Home], "list products")?;
        self.session.wait_for_element(&self.catalog.home_products)?;
        let texts = self.session.query(&self.catalog.home_products)?;
        if texts.len() % HOME_TILE_WIDTH != 0 {
            return Err(ProbeError::mismatch(
                "home product texts",
                format!("a multiple of {HOME_TILE_WIDTH}"),
                texts.len(),
            ));
        }
        Ok(texts
            .chunks(HOME_TILE_WIDTH)
            .map(|pair| ProductTile {
                title: pair[0].text.clone(),
                price: pair[1].text.clone(),
            })
            .collect())
    }

    /// Scroll to the tile titled `title` and open its detail screen
    pub fn open_product(&mut self, title: &str) -> ProbeResult<()> {
        self.expect_screen(&[Screen::Home], "open a product")?;
        if !self.session.scroll_until_visible(title)? {
            return Err(ProbeError::ElementNotFound {
                query: format!(
                    "visible {title:?} after {} drags",
                    self.config.scroll.max_attempts
                ),
            });
        }
        let add = self.catalog.add_to_basket.clone();
        self.session
            .tap_then_wait(TapTarget::Tap(self.catalog.marked(title)), Some(&add))?;
        self.push(Screen::ProductDetail);
        Ok(())
    }

    /// Navigate home from anywhere; clears the back stack
    pub fn go_home(&mut self) -> ProbeResult<()> {
        let products = self.catalog.home_products.clone();
        self.session
            .tap_then_wait(TapTarget::Tap(self.catalog.home.clone()), Some(&products))?;
        debug!(from = %self.screen(), "home");
        self.stack.clear();
        self.stack.push(Screen::Home);
        self.dropdown_open = false;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Product detail
    // ------------------------------------------------------------------

    /// Title, price and selected variants of the open product
    pub fn product_details(&self) -> ProbeResult<ProductDetails> {
        self.expect_screen(&[Screen::ProductDetail], "read product details")?;
        self.session.wait_for_element(&self.catalog.add_to_basket)?;
        let title_price = self.session.query(&self.catalog.product_title_price)?;
        let size_color = self.session.query(&self.catalog.product_size_color)?;
        Ok(ProductDetails {
            title: element_at(&title_price, 0, "product title")?.text.clone(),
            price: element_at(&title_price, 1, "product price")?.text.clone(),
            size: element_at(&size_color, 0, "product size")?.text.clone(),
            color: element_at(&size_color, 1, "product color")?.text.clone(),
        })
    }

    /// Tap add-to-basket; the app stays on the product screen
    pub fn add_to_basket(&mut self) -> ProbeResult<()> {
        self.expect_screen(&[Screen::ProductDetail], "add to basket")?;
        self.expect_dropdown(false, "add to basket")?;
        let add = self.catalog.add_to_basket.clone();
        self.session.tap(&add)
    }

    /// Open dropdown `index` (size or color)
    pub fn open_dropdown(&mut self, index: usize) -> ProbeResult<()> {
        self.expect_screen(&[Screen::ProductDetail], "open a dropdown")?;
        self.expect_dropdown(false, "open a dropdown")?;
        let dropdowns = self.session.query(&self.catalog.product_dropdowns)?;
        let id = element_at(&dropdowns, index, "product dropdowns")?.id.clone();
        let list = self.catalog.dropdown.clone();
        self.session
            .tap_then_wait(TapTarget::Tap(self.catalog.marked(&id)), Some(&list))?;
        self.dropdown_open = true;
        Ok(())
    }

    /// Entries of the open dropdown
    pub fn dropdown_options(&self) -> ProbeResult<Vec<String>> {
        self.expect_dropdown(true, "list dropdown options")?;
        Ok(self
            .session
            .query(&self.catalog.dropdown_items)?
            .into_iter()
            .map(|e| e.text)
            .collect())
    }

    /// Pick `option` from the open dropdown
    pub fn choose_option(&mut self, option: &str) -> ProbeResult<()> {
        self.expect_dropdown(true, "choose an option")?;
        let item = self.catalog.marked(option);
        self.session.tap_then_wait(TapTarget::Tap(item), None)?;
        self.session.wait_for_no_element(&self.catalog.dropdown)?;
        self.dropdown_open = false;
        Ok(())
    }

    /// Dismiss the open dropdown with back navigation
    pub fn close_dropdown(&mut self) -> ProbeResult<()> {
        self.expect_dropdown(true, "close a dropdown")?;
        self.session.tap_then_wait(TapTarget::Back, None)?;
        self.session.wait_for_no_element(&self.catalog.dropdown)?;
        self.dropdown_open = false;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Cart
    // ------------------------------------------------------------------

    /// Tap the basket icon
    pub fn open_cart(&mut self) -> ProbeResult<()> {
        self.expect_screen(&[Screen::Home, Screen::ProductDetail], "open the cart")?;
        self.expect_dropdown(false, "open the cart")?;
        let cart = self.catalog.basket_cart.clone();
        self.session.tap_then_wait(TapTarget::Tap(cart), None)?;
        self.wait_ready(Screen::Cart)?;
        // the app drops the product screen from its back stack
        if self.screen() == Screen::ProductDetail {
            self.stack.pop();
        }
        self.push(Screen::Cart);
        Ok(())
    }

    /// Fail unless the empty-basket text is showing
    pub fn assert_cart_empty(&self) -> ProbeResult<()> {
        self.expect_screen(&[Screen::Cart], "check the cart")?;
        self.session.wait_for_element(&self.catalog.basket_empty)?;
        Ok(())
    }

    /// Lines of a non-empty cart, in display order
    pub fn cart_lines(&self) -> ProbeResult<Vec<CartLine>> {
        self.expect_screen(&[Screen::Cart], "read cart lines")?;
        self.session.wait_for_element(&self.catalog.checkout)?;
        let texts = self.session.query(&self.catalog.cart_lines)?;
        if texts.len() % CART_LINE_WIDTH != 0 {
            return Err(ProbeError::mismatch(
                "cart line texts",
                format!("a multiple of {CART_LINE_WIDTH}"),
                texts.len(),
            ));
        }
        Ok(texts
            .chunks(CART_LINE_WIDTH)
            .map(|line| CartLine {
                title: line[0].text.clone(),
                price: line[1].text.clone(),
                size: line[2].text.clone(),
                color: line[3].text.clone(),
            })
            .collect())
    }

    fn cart_text_count(&self) -> ProbeResult<usize> {
        Ok(self.session.query(&self.catalog.cart_lines)?.len())
    }

    /// Swipe the first cart line off to the right and wait for it to go
    pub fn remove_first_cart_line(&mut self) -> ProbeResult<()> {
        self.expect_screen(&[Screen::Cart], "remove a cart line")?;
        let texts = self.session.query(&self.catalog.cart_lines)?;
        let before = texts.len();
        let anchor = element_at(&texts, 0, "cart lines")?.rect;
        let y = anchor.center().y;
        let from = Point::new(anchor.x, y);
        let to = Point::new(anchor.x + self.config.cart.swipe_distance, y);
        self.session.drag(from, to)?;
        self.session
            .wait_until("first cart line removed", |s| {
                Ok(s.query(&self.catalog.cart_lines)?.len() < before)
            })?;
        debug!(remaining = self.cart_text_count()? / CART_LINE_WIDTH, "cart line removed");
        Ok(())
    }

    /// Tap checkout
    pub fn checkout(&mut self) -> ProbeResult<()> {
        self.expect_screen(&[Screen::Cart], "check out")?;
        let sign_in = self.catalog.sign_in.clone();
        self.session
            .tap_then_wait(TapTarget::Tap(self.catalog.checkout.clone()), Some(&sign_in))?;
        self.push(Screen::SignIn);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Sign in
    // ------------------------------------------------------------------

    /// Type the account password
    pub fn enter_password(&mut self, password: &str) -> ProbeResult<()> {
        self.expect_screen(&[Screen::SignIn], "enter a password")?;
        let marker = self.config.markers.password.clone();
        self.session.enter_text(&marker, password)
    }

    /// Displayed email and password
    pub fn sign_in_fields(&self) -> ProbeResult<(String, String)> {
        self.expect_screen(&[Screen::SignIn], "read sign-in fields")?;
        self.session.wait_for_element(&self.catalog.sign_in)?;
        let email = self.session.query(&self.catalog.email)?;
        let password = self.session.query(&self.catalog.password)?;
        Ok((
            element_at(&email, 0, "email field")?.text.clone(),
            element_at(&password, 0, "password field")?.text.clone(),
        ))
    }

    /// Tap sign in and wait for the shipping form
    pub fn sign_in(&mut self) -> ProbeResult<()> {
        self.expect_screen(&[Screen::SignIn], "sign in")?;
        let place_order = self.catalog.place_order.clone();
        self.session
            .tap_then_wait(TapTarget::Tap(self.catalog.sign_in.clone()), Some(&place_order))?;
        self.push(Screen::ShippingForm);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Back stack
    // ------------------------------------------------------------------

    /// One back navigation
    pub fn back(&mut self) -> ProbeResult<()> {
        self.expect_dropdown(false, "navigate back")?;
        if self.stack.len() < 2 {
            return Err(ProbeError::invalid_state(format!(
                "cannot navigate back from the {} screen",
                self.screen()
            )));
        }
        self.session.tap_then_wait(TapTarget::Back, None)?;
        self.stack.pop();
        self.wait_ready(self.screen())?;
        debug!(to = %self.screen(), "back");
        Ok(())
    }

    /// Navigate back until `screen` is showing
    pub fn back_to(&mut self, screen: Screen) -> ProbeResult<()> {
        if !self.stack.contains(&screen) {
            return Err(ProbeError::invalid_state(format!(
                "{screen} is not on the back stack"
            )));
        }
        while self.screen() != screen {
            self.back()?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Shipping
    // ------------------------------------------------------------------

    /// Text fields of one shipping section, in display order
    pub fn shipping_fields(&self, section: &ShippingSection) -> ProbeResult<Vec<Element>> {
        self.expect_screen(&[Screen::ShippingForm], "read shipping fields")?;
        self.session.wait_for_element(&self.catalog.place_order)?;
        self.session.query(&self.catalog.shipping_fields(&section.layout))
    }

    /// Fill every shipping field from the fixtures.
    ///
    /// Each section must show exactly as many fields as the fixtures list.
    pub fn fill_shipping(&mut self) -> ProbeResult<()> {
        let config = Arc::clone(&self.config);
        for section in &config.fixtures.shipping {
            let fields = self.shipping_fields(section)?;
            assert_count(
                &format!("{} fields", section.layout),
                section.fields.len(),
                fields.len(),
            )?;
            for (element, field) in fields.iter().zip(&section.fields) {
                self.session.enter_text(&element.id, &field.value)?;
            }
        }
        Ok(())
    }

    /// Fail unless every field shows its fixture value
    pub fn verify_shipping(&self) -> ProbeResult<()> {
        for section in &self.config.fixtures.shipping {
            let fields = self.shipping_fields(section)?;
            assert_count(
                &format!("{} fields", section.layout),
                section.fields.len(),
                fields.len(),
            )?;
            for (element, field) in fields.iter().zip(&section.fields) {
                assert_text(&field.name, &field.value, &element.text)?;
            }
        }
        Ok(())
    }

    /// Tap place order without waiting for a result
    pub fn submit_shipping(&mut self) -> ProbeResult<()> {
        self.expect_screen(&[Screen::ShippingForm], "submit shipping")?;
        let place_order = self.catalog.place_order.clone();
        self.session.tap(&place_order)
    }

    /// Clear a required field, submit, expect only its error, refill, expect
    /// the error gone. Optional fields are skipped.
    pub fn check_required_field(&mut self, element: &Element, field: &ShippingField) -> ProbeResult<()> {
        let Some(message) = field.error.as_deref() else {
            debug!(field = %field.name, "optional, skipped");
            return Ok(());
        };
        self.expect_screen(&[Screen::ShippingForm], "check a shipping field")?;
        self.session.wait_for_element(&self.catalog.place_order)?;

        let error = self.catalog.shipping_error(message);
        self.session.enter_text(&element.id, "")?;
        self.submit_shipping()?;
        self.session.wait_for_element(&error)?;

        for other in self.config.fixtures.shipping_fields() {
            let Some(other_message) = other.error.as_deref() else {
                continue;
            };
            if other.name == field.name {
                continue;
            }
            let shown = self.session.query(&self.catalog.shipping_error(other_message))?;
            assert_count(&format!("{} error while checking {}", other.name, field.name), 0, shown.len())?;
        }

        self.session.enter_text(&element.id, &field.value)?;
        self.session.wait_for_no_element(&error)?;
        Ok(())
    }

    /// Submit the form and wait for the order confirmation
    pub fn place_order(&mut self) -> ProbeResult<()> {
        self.expect_screen(&[Screen::ShippingForm], "place an order")?;
        let complete = self.catalog.order_complete.clone();
        self.session
            .tap_then_wait(TapTarget::Tap(self.catalog.place_order.clone()), Some(&complete))?;
        self.push(Screen::OrderComplete);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;

    fn flow_with(mock: MockDriver) -> StoreFlow {
        let config = Arc::new(
            ProbeConfig::new()
                .with_element_timeout(20)
                .with_poll_interval(2),
        );
        StoreFlow::new(AppSession::new(Box::new(mock), config))
    }

    fn texts(values: &[&str]) -> Vec<Element> {
        values
            .iter()
            .map(|v| Element::new("", "TextView", *v))
            .collect()
    }

    mod guard_tests {
        use super::*;

        #[test]
        fn test_starts_on_home() {
            let flow = flow_with(MockDriver::new());
            assert_eq!(flow.screen(), Screen::Home);
        }

        #[test]
        fn test_wrong_screen_is_invalid_state() {
            let mut flow = flow_with(MockDriver::new());
            let err = flow.checkout().unwrap_err();
            assert!(matches!(err, ProbeError::InvalidState { .. }));
            assert!(err.to_string().contains("home"));
        }

        #[test]
        fn test_choose_option_needs_open_dropdown() {
            let mut flow = flow_with(MockDriver::new());
            assert!(matches!(
                flow.choose_option("Large"),
                Err(ProbeError::InvalidState { .. })
            ));
        }

        #[test]
        fn test_back_from_home_is_invalid() {
            let mut flow = flow_with(MockDriver::new());
            assert!(matches!(flow.back(), Err(ProbeError::InvalidState { .. })));
        }

        #[test]
        fn test_back_to_unknown_screen() {
            let mut flow = flow_with(MockDriver::new());
            assert!(flow.back_to(Screen::Cart).is_err());
        }
    }

    mod read_tests {
        use super::*;

        #[test]
        fn test_home_products_pairs_texts() {
            let mut mock = MockDriver::new();
            let catalog = LocatorCatalog::default();
            mock.respond(
                &catalog.home_products.query(),
                texts(&["Shirt", "$20.00", "Mug", "$8.00"]),
            );
            let flow = flow_with(mock);
            let tiles = flow.home_products().unwrap();
            assert_eq!(tiles.len(), 2);
            assert_eq!(tiles[1].title, "Mug");
            assert_eq!(tiles[1].price, "$8.00");
        }

        #[test]
        fn test_home_products_odd_count_is_mismatch() {
            let mut mock = MockDriver::new();
            let catalog = LocatorCatalog::default();
            mock.respond(&catalog.home_products.query(), texts(&["Shirt"]));
            let flow = flow_with(mock);
            assert!(matches!(
                flow.home_products(),
                Err(ProbeError::AssertionMismatch { .. })
            ));
        }

        #[test]
        fn test_home_products_times_out_when_missing() {
            let flow = flow_with(MockDriver::new());
            assert!(matches!(
                flow.home_products(),
                Err(ProbeError::Timeout { .. })
            ));
        }

        #[test]
        fn test_ready_locators() {
            let catalog = LocatorCatalog::default();
            assert_eq!(Screen::Cart.ready_locators(&catalog).len(), 2);
            assert_eq!(
                Screen::SignIn.ready_locators(&catalog)[0].query(),
                catalog.sign_in.query()
            );
        }

        #[test]
        fn test_cart_line_assert_matches() {
            let details = ProductDetails {
                title: "Shirt".into(),
                price: "$20.00".into(),
                size: "Large".into(),
                color: "Black".into(),
            };
            let line = CartLine {
                title: "Shirt".into(),
                price: "$20.00".into(),
                size: "Large".into(),
                color: "Green".into(),
            };
            let err = line.assert_matches(&details, 0).unwrap_err();
            assert!(err.to_string().contains("cart line 0 color"));
        }
    }
}
