//! Checkout scenarios: sign-in round trip, shipping validation, full order.

use super::remove_last_line;
use crate::assert::assert_text;
use crate::flow::{Screen, StoreFlow};
use crate::result::{ProbeError, ProbeResult};
use tracing::info;

/// Cart → sign in with the test account, checking the displayed fields
fn sign_in_from_cart(flow: &mut StoreFlow) -> ProbeResult<()> {
    let account = flow.config().fixtures.account.clone();
    flow.checkout()?;
    flow.enter_password(&account.password)?;
    let (email, password) = flow.sign_in_fields()?;
    assert_text("email", &account.email, &email)?;
    assert_text("password", &account.password, &password)?;
    flow.sign_in()
}

/// Buy the first product up to the shipping form
fn first_product_to_shipping(flow: &mut StoreFlow) -> ProbeResult<()> {
    let tiles = flow.home_products()?;
    let first = tiles
        .first()
        .ok_or_else(|| ProbeError::mismatch("home product count", "at least 1", 0))?;
    flow.open_product(&first.title)?;
    flow.add_to_basket()?;
    flow.open_cart()?;
    sign_in_from_cart(flow)
}

pub(super) fn single_purchase_all_products(flow: &mut StoreFlow) -> ProbeResult<()> {
    let tiles = flow.home_products()?;
    for tile in &tiles {
        info!(product = %tile.title, "single purchase");
        flow.open_product(&tile.title)?;
        flow.add_to_basket()?;
        flow.open_cart()?;
        sign_in_from_cart(flow)?;

        flow.back_to(Screen::Cart)?;
        remove_last_line(flow)?;
        flow.go_home()?;
    }
    Ok(())
}

pub(super) fn invalid_shipping(flow: &mut StoreFlow) -> ProbeResult<()> {
    first_product_to_shipping(flow)?;
    flow.fill_shipping()?;

    let sections = flow.config().fixtures.shipping.clone();
    for section in &sections {
        let fields = flow.shipping_fields(section)?;
        for (element, field) in fields.iter().zip(&section.fields) {
            flow.check_required_field(element, field)?;
        }
    }
    flow.go_home()
}

pub(super) fn valid_shipping(flow: &mut StoreFlow) -> ProbeResult<()> {
    first_product_to_shipping(flow)?;
    flow.fill_shipping()?;
    flow.verify_shipping()?;
    flow.place_order()
}
