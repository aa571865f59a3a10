//! Locator catalog for the store app.
//!
//! Built once from [`Markers`] so scenario code never embeds raw marker
//! strings. Several locators match a flat list whose entries are grouped
//! by position; the grouping widths are exported as constants.

use crate::config::Markers;
use crate::query::Locator;

/// TextViews per home tile: `[2i]` title, `[2i + 1]` price
pub const HOME_TILE_WIDTH: usize = 2;

/// TextViews per cart line: `[4i]` title, `[4i + 1]` price, `[4i + 2]`
/// size, `[4i + 3]` color
pub const CART_LINE_WIDTH: usize = 4;

/// Index of the size dropdown among the product dropdowns
pub const SIZE_DROPDOWN: usize = 0;

/// Index of the color dropdown among the product dropdowns
pub const COLOR_DROPDOWN: usize = 1;

/// Every locator the scenarios use
#[derive(Debug, Clone)]
pub struct LocatorCatalog {
    /// Basket icon, present on every screen with an action bar
    pub basket_cart: Locator,
    /// Empty-cart text
    pub basket_empty: Locator,
    /// Home tiles, title/price pairs
    pub home_products: Locator,
    /// Home button
    pub home: Locator,
    /// Product detail `[0]` title, `[1]` price
    pub product_title_price: Locator,
    /// Product detail `[0]` selected size, `[1]` selected color
    pub product_size_color: Locator,
    /// Product dropdowns, `[0]` size, `[1]` color
    pub product_dropdowns: Locator,
    /// Open dropdown list
    pub dropdown: Locator,
    /// Entries of the open dropdown list
    pub dropdown_items: Locator,
    /// Add-to-basket button
    pub add_to_basket: Locator,
    /// Checkout button
    pub checkout: Locator,
    /// Cart line texts, four per line
    pub cart_lines: Locator,
    /// Sign-in button
    pub sign_in: Locator,
    /// Email field
    pub email: Locator,
    /// Password field
    pub password: Locator,
    /// Place-order button
    pub place_order: Locator,
    /// Order confirmation
    pub order_complete: Locator,
    edit_text: String,
}

impl LocatorCatalog {
    /// Build the catalog
    #[must_use]
    pub fn new(markers: &Markers) -> Self {
        let text_view = markers.text_view.clone();
        let checked = markers.checked_text_view.clone();
        let description = Locator::marked(markers.product_description.clone());
        let dropdown = Locator::marked(markers.dropdown_list.clone());

        Self {
            basket_cart: Locator::marked(markers.basket_cart.clone()),
            basket_empty: Locator::text(markers.basket_empty.clone()),
            home_products: {
                let tv = text_view.clone();
                Locator::marked(markers.home_products.clone())
                    .then("home products", move |q| q.descendant(tv.clone()))
            },
            home: Locator::marked(markers.home.clone()),
            product_title_price: {
                let tv = text_view.clone();
                description.then("product title/price", move |q| q.descendant(tv.clone()))
            },
            product_size_color: {
                let ctv = checked.clone();
                description.then("product size/color", move |q| q.descendant(ctv.clone()))
            },
            product_dropdowns: Locator::class(markers.spinner.clone()),
            dropdown_items: dropdown.then("dropdown items", move |q| q.descendant(checked.clone())),
            dropdown,
            add_to_basket: Locator::button(markers.add_to_basket.clone()),
            checkout: Locator::button(markers.checkout.clone()),
            cart_lines: Locator::marked(markers.cart_line.clone())
                .then("cart lines", move |q| q.descendant(text_view.clone())),
            sign_in: Locator::button(markers.sign_in.clone()),
            email: Locator::marked(markers.email.clone()),
            password: Locator::marked(markers.password.clone()),
            place_order: Locator::button(markers.place_order.clone()),
            order_complete: Locator::marked(markers.order_complete.clone()),
            edit_text: markers.edit_text.clone(),
        }
    }

    /// Any element marked with `text`, e.g. a product tile or dropdown entry
    #[must_use]
    pub fn marked(&self, text: &str) -> Locator {
        Locator::marked(text)
    }

    /// Text fields of one shipping section
    #[must_use]
    pub fn shipping_fields(&self, layout: &str) -> Locator {
        let edit_text = self.edit_text.clone();
        Locator::marked(layout).then(format!("shipping fields {layout}"), move |q| {
            q.descendant(edit_text.clone())
        })
    }

    /// Validation message for a shipping field
    #[must_use]
    pub fn shipping_error(&self, message: &str) -> Locator {
        Locator::text(message)
    }
}

impl Default for LocatorCatalog {
    fn default() -> Self {
        Self::new(&Markers::default())
    }
}
