//! Screen layout and query evaluation for the simulated store.
//!
//! Each call renders the current state into a fresh element tree; nothing is
//! cached between calls, matching a live view hierarchy.

use super::{CartItem, SimScreen, SimState, SimulatorOptions, Variant};
use crate::config::Markers;
use crate::query::{Element, Query, QueryStep, Rect};
use std::collections::HashSet;

/// Logical screen size
pub const VIEWPORT_WIDTH: f32 = 720.0;
/// Logical screen size
pub const VIEWPORT_HEIGHT: f32 = 1280.0;
/// Height of the action bar
pub const ACTION_BAR_HEIGHT: f32 = 100.0;
/// Height of one home tile
pub const TILE_HEIGHT: f32 = 600.0;
/// Height of one cart line
pub const CART_LINE_HEIGHT: f32 = 200.0;

const BUTTON_CLASS: &str = "Button";
const LAYOUT_CLASS: &str = "LinearLayout";
const LIST_CLASS: &str = "ListView";

/// What tapping (or typing into) a node does
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    GoHome,
    OpenCart,
    OpenProduct(usize),
    OpenDropdown(Variant),
    ChooseOption(usize),
    AddToBasket,
    CartLine(usize),
    Checkout,
    SignIn,
    PlaceOrder,
    Edit(Field),
}

/// Editable fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Field {
    Email,
    Password,
    Shipping(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub element: Element,
    pub parent: Option<usize>,
    pub action: Action,
    /// Part of a modal overlay
    pub modal: bool,
}

/// Flat element tree in document order
#[derive(Debug, Clone, Default)]
pub(crate) struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    fn push(&mut self, parent: Option<usize>, element: Element, action: Action) -> usize {
        self.nodes.push(Node {
            element,
            parent,
            action,
            modal: false,
        });
        self.nodes.len() - 1
    }

    fn has_ancestor_in(&self, mut index: usize, set: &HashSet<usize>) -> bool {
        while let Some(parent) = self.nodes[index].parent {
            if set.contains(&parent) {
                return true;
            }
            index = parent;
        }
        false
    }

    /// Node indices matching `query`, in document order
    pub fn evaluate(&self, query: &Query) -> Vec<usize> {
        let mut current: Vec<usize> = (0..self.nodes.len()).collect();
        for step in query.steps() {
            current = match step {
                QueryStep::Marked(m) => self.keep(&current, |e| e.is_marked(m)),
                QueryStep::Text(t) => self.keep(&current, |e| &e.text == t),
                QueryStep::Class(c) => self.keep(&current, |e| &e.class == c),
                QueryStep::Button(m) => {
                    self.keep(&current, |e| e.class == BUTTON_CLASS && e.is_marked(m))
                }
                QueryStep::Descendant(c) => {
                    let roots: HashSet<usize> = current.iter().copied().collect();
                    (0..self.nodes.len())
                        .filter(|&i| {
                            self.nodes[i].element.class == *c && self.has_ancestor_in(i, &roots)
                        })
                        .collect()
                }
                QueryStep::Index(n) => current.get(*n).copied().into_iter().collect(),
            };
        }
        current
    }

    fn keep<F>(&self, indices: &[usize], predicate: F) -> Vec<usize>
    where
        F: Fn(&Element) -> bool,
    {
        indices
            .iter()
            .copied()
            .filter(|&i| predicate(&self.nodes[i].element))
            .collect()
    }

    /// Elements matching `query`
    pub fn elements(&self, query: &Query) -> Vec<Element> {
        self.evaluate(query)
            .into_iter()
            .map(|i| self.nodes[i].element.clone())
            .collect()
    }
}

fn viewport() -> Rect {
    Rect::new(0.0, 0.0, VIEWPORT_WIDTH, VIEWPORT_HEIGHT)
}

fn content_area() -> Rect {
    Rect::new(
        0.0,
        ACTION_BAR_HEIGHT,
        VIEWPORT_WIDTH,
        VIEWPORT_HEIGHT - ACTION_BAR_HEIGHT,
    )
}

fn placed(id: &str, class: &str, text: &str, rect: Rect, clip: Rect) -> Element {
    Element::new(id, class, text)
        .with_rect(rect)
        .with_visible(rect.intersects(&clip))
}

/// Total scrollable height of the home list
#[allow(clippy::cast_precision_loss)]
pub(crate) fn home_max_scroll(products: usize) -> f32 {
    (products as f32)
        .mul_add(TILE_HEIGHT, -(VIEWPORT_HEIGHT - ACTION_BAR_HEIGHT))
        .max(0.0)
}

/// Render the current screen
pub(crate) fn render(state: &SimState, options: &SimulatorOptions) -> Tree {
    let mut tree = Tree::default();
    let markers = &options.markers;
    let screen = state.screen();

    if let (SimScreen::Product(p), Some(variant)) = (screen, state.dropdown) {
        dropdown_overlay(&mut tree, options, p, variant);
    }

    action_bar(&mut tree, markers);
    match screen {
        SimScreen::Home => home(&mut tree, state, options),
        SimScreen::Product(p) => product(&mut tree, state, options, p),
        SimScreen::Cart => cart(&mut tree, state, options),
        SimScreen::SignIn => sign_in(&mut tree, state, markers),
        SimScreen::Shipping => shipping(&mut tree, state, options),
        SimScreen::OrderComplete => {
            let rect = Rect::new(60.0, 600.0, 600.0, 80.0);
            tree.push(
                None,
                placed(&markers.order_complete, &markers.text_view, "Your order has been placed", rect, viewport()),
                Action::None,
            );
        }
    }
    tree
}

fn action_bar(tree: &mut Tree, markers: &Markers) {
    let bar = tree.push(
        None,
        placed("action_bar", LAYOUT_CLASS, "", Rect::new(0.0, 0.0, VIEWPORT_WIDTH, ACTION_BAR_HEIGHT), viewport()),
        Action::None,
    );
    tree.push(
        Some(bar),
        placed(&markers.home, "ImageButton", "", Rect::new(0.0, 0.0, 100.0, 100.0), viewport()),
        Action::GoHome,
    );
    tree.push(
        Some(bar),
        placed(
            &markers.basket_cart,
            "ActionMenuItemView",
            "",
            Rect::new(VIEWPORT_WIDTH - 100.0, 0.0, 100.0, 100.0),
            viewport(),
        ),
        Action::OpenCart,
    );
}

#[allow(clippy::cast_precision_loss)]
fn home(tree: &mut Tree, state: &SimState, options: &SimulatorOptions) {
    let markers = &options.markers;
    let clip = content_area();
    let list = tree.push(
        None,
        placed(&markers.home_products, LIST_CLASS, "", clip, viewport()),
        Action::None,
    );
    for (i, product) in options.catalogue().iter().enumerate() {
        let top = (i as f32).mul_add(TILE_HEIGHT, ACTION_BAR_HEIGHT) - state.scroll;
        let tile_rect = Rect::new(0.0, top, VIEWPORT_WIDTH, TILE_HEIGHT);
        let tile = tree.push(
            Some(list),
            placed("", LAYOUT_CLASS, "", tile_rect, clip),
            Action::OpenProduct(i),
        );
        let title_rect = Rect::new(20.0, top + TILE_HEIGHT - 120.0, 680.0, 60.0);
        let price_rect = Rect::new(20.0, top + TILE_HEIGHT - 60.0, 680.0, 50.0);
        tree.push(
            Some(tile),
            placed("", &markers.text_view, &product.title, title_rect, clip),
            Action::OpenProduct(i),
        );
        tree.push(
            Some(tile),
            placed("", &markers.text_view, &product.price, price_rect, clip),
            Action::OpenProduct(i),
        );
    }
}

fn product(tree: &mut Tree, state: &SimState, options: &SimulatorOptions, p: usize) {
    let markers = &options.markers;
    let Some(item) = options.catalogue().get(p) else {
        return;
    };
    let (size, color) = state.selection;
    let vp = viewport();
    let description = tree.push(
        None,
        placed(&markers.product_description, LAYOUT_CLASS, "", Rect::new(0.0, 700.0, VIEWPORT_WIDTH, 440.0), vp),
        Action::None,
    );
    tree.push(
        Some(description),
        placed("productTitle", &markers.text_view, &item.title, Rect::new(20.0, 710.0, 680.0, 60.0), vp),
        Action::None,
    );
    tree.push(
        Some(description),
        placed("productPrice", &markers.text_view, &item.price, Rect::new(20.0, 780.0, 680.0, 50.0), vp),
        Action::None,
    );
    for (variant, rect, label) in [
        (Variant::Size, Rect::new(20.0, 850.0, 330.0, 100.0), item.sizes.get(size)),
        (Variant::Color, Rect::new(370.0, 850.0, 330.0, 100.0), item.colors.get(color)),
    ] {
        let spinner = tree.push(
            Some(description),
            placed(variant.spinner_id(), &markers.spinner, "", rect, vp),
            Action::OpenDropdown(variant),
        );
        tree.push(
            Some(spinner),
            placed(
                "",
                &markers.checked_text_view,
                label.map_or("", String::as_str),
                rect,
                vp,
            ),
            Action::OpenDropdown(variant),
        );
    }
    tree.push(
        None,
        placed(&markers.add_to_basket, BUTTON_CLASS, "Add to Basket", Rect::new(0.0, 1160.0, VIEWPORT_WIDTH, 120.0), vp),
        Action::AddToBasket,
    );
}

#[allow(clippy::cast_precision_loss)]
fn dropdown_overlay(tree: &mut Tree, options: &SimulatorOptions, p: usize, variant: Variant) {
    let markers = &options.markers;
    let Some(item) = options.catalogue().get(p) else {
        return;
    };
    let entries = match variant {
        Variant::Size => &item.sizes,
        Variant::Color => &item.colors,
    };
    let vp = viewport();
    let height = entries.len() as f32 * 100.0;
    let list = tree.push(
        None,
        placed(&markers.dropdown_list, LIST_CLASS, "", Rect::new(60.0, 300.0, 600.0, height), vp),
        Action::None,
    );
    tree.nodes[list].modal = true;
    for (k, entry) in entries.iter().enumerate() {
        let rect = Rect::new(60.0, (k as f32).mul_add(100.0, 300.0), 600.0, 100.0);
        let node = tree.push(
            Some(list),
            placed("", &markers.checked_text_view, entry, rect, vp),
            Action::ChooseOption(k),
        );
        tree.nodes[node].modal = true;
    }
}

#[allow(clippy::cast_precision_loss)]
fn cart(tree: &mut Tree, state: &SimState, options: &SimulatorOptions) {
    let markers = &options.markers;
    let vp = viewport();
    if state.cart.is_empty() {
        tree.push(
            None,
            placed("emptyBasket", &markers.text_view, &markers.basket_empty, Rect::new(60.0, 600.0, 600.0, 80.0), vp),
            Action::None,
        );
        return;
    }

    let clip = content_area();
    let list = tree.push(None, placed("basketList", LIST_CLASS, "", clip, vp), Action::None);
    for (k, line) in state.cart.iter().enumerate() {
        let top = (k as f32).mul_add(CART_LINE_HEIGHT, ACTION_BAR_HEIGHT);
        let container = tree.push(
            Some(list),
            placed(&markers.cart_line, LAYOUT_CLASS, "", Rect::new(0.0, top, VIEWPORT_WIDTH, CART_LINE_HEIGHT), clip),
            Action::CartLine(k),
        );
        for (j, text) in cart_texts(line, options).into_iter().enumerate() {
            let rect = Rect::new(20.0, (j as f32).mul_add(45.0, top + 10.0), 680.0, 40.0);
            tree.push(
                Some(container),
                placed("", &markers.text_view, &text, rect, clip),
                Action::CartLine(k),
            );
        }
    }
    tree.push(
        None,
        placed("checkoutBtn", BUTTON_CLASS, &markers.checkout, Rect::new(0.0, 1160.0, VIEWPORT_WIDTH, 120.0), vp),
        Action::Checkout,
    );
}

fn cart_texts(line: &CartItem, options: &SimulatorOptions) -> [String; 4] {
    let Some(item) = options.catalogue().get(line.product) else {
        return Default::default();
    };
    let price = if options.has_fault(super::Fault::WrongCartPrice) {
        format!("{}0", item.price)
    } else {
        item.price.clone()
    };
    [
        item.title.clone(),
        price,
        item.sizes.get(line.size).cloned().unwrap_or_default(),
        item.colors.get(line.color).cloned().unwrap_or_default(),
    ]
}

fn sign_in(tree: &mut Tree, state: &SimState, markers: &Markers) {
    let vp = viewport();
    let form = tree.push(
        None,
        placed("signInForm", LAYOUT_CLASS, "", Rect::new(0.0, 300.0, VIEWPORT_WIDTH, 500.0), vp),
        Action::None,
    );
    tree.push(
        Some(form),
        placed(&markers.email, &markers.edit_text, &state.email, Rect::new(40.0, 320.0, 640.0, 100.0), vp),
        Action::Edit(Field::Email),
    );
    tree.push(
        Some(form),
        placed(&markers.password, &markers.edit_text, &state.password, Rect::new(40.0, 440.0, 640.0, 100.0), vp),
        Action::Edit(Field::Password),
    );
    tree.push(
        Some(form),
        placed(&markers.sign_in, BUTTON_CLASS, "Sign In", Rect::new(40.0, 580.0, 640.0, 120.0), vp),
        Action::SignIn,
    );
}

#[allow(clippy::cast_precision_loss)]
fn shipping(tree: &mut Tree, state: &SimState, options: &SimulatorOptions) {
    let markers = &options.markers;
    let vp = viewport();
    let mut y = ACTION_BAR_HEIGHT + 20.0;
    for section in &options.form {
        let rows = section.fields.len() as f32;
        let layout = tree.push(
            None,
            placed(&section.layout, LAYOUT_CLASS, "", Rect::new(0.0, y, VIEWPORT_WIDTH, rows * 110.0), vp),
            Action::None,
        );
        for field in &section.fields {
            let rect = Rect::new(40.0, y, 640.0, 90.0);
            let value = state.shipping.get(&field.id).map_or("", String::as_str);
            tree.push(
                Some(layout),
                placed(&field.id, &markers.edit_text, value, rect, vp),
                Action::Edit(Field::Shipping(field.id.clone())),
            );
            if state.errors.contains(&field.id) {
                let error_rect = Rect::new(40.0, y + 90.0, 640.0, 20.0);
                tree.push(
                    Some(layout),
                    placed("", &markers.text_view, &field.error_text(), error_rect, vp),
                    Action::None,
                );
            }
            y += 110.0;
        }
        y += 20.0;
    }
    tree.push(
        None,
        placed(&markers.place_order, BUTTON_CLASS, "Place Order", Rect::new(0.0, 1160.0, VIEWPORT_WIDTH, 120.0), vp),
        Action::PlaceOrder,
    );
}
