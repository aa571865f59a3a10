//! Cart scenarios: empty launch, add/remove every product, double add.

use super::{expect_only_line, remove_last_line};
use crate::assert::{assert_count, assert_text};
use crate::flow::StoreFlow;
use crate::result::ProbeResult;
use tracing::info;

pub(super) fn app_loads_with_empty_cart(flow: &mut StoreFlow) -> ProbeResult<()> {
    flow.session().wait_for_element(&flow.catalog().basket_cart)?;
    flow.open_cart()?;
    flow.assert_cart_empty()
}

pub(super) fn add_all_products_to_cart(flow: &mut StoreFlow) -> ProbeResult<()> {
    let tiles = flow.home_products()?;
    for tile in &tiles {
        info!(product = %tile.title, "add and remove");
        flow.open_product(&tile.title)?;

        let details = flow.product_details()?;
        assert_text("product title", &tile.title, &details.title)?;
        assert_text("product price", &tile.price, &details.price)?;

        flow.add_to_basket()?;
        flow.open_cart()?;
        expect_only_line(flow, &details)?;

        remove_last_line(flow)?;
        flow.go_home()?;
    }
    Ok(())
}

pub(super) fn double_purchase_all_products(flow: &mut StoreFlow) -> ProbeResult<()> {
    let tiles = flow.home_products()?;
    for tile in &tiles {
        info!(product = %tile.title, "double purchase");
        flow.open_product(&tile.title)?;
        let details = flow.product_details()?;
        flow.add_to_basket()?;
        flow.open_cart()?;

        flow.back()?;
        flow.open_product(&tile.title)?;
        flow.add_to_basket()?;
        flow.open_cart()?;

        let lines = flow.cart_lines()?;
        assert_count("cart lines", 2, lines.len())?;
        for (i, line) in lines.iter().enumerate() {
            line.assert_matches(&details, i)?;
        }

        flow.remove_first_cart_line()?;
        expect_only_line(flow, &details)?;
        remove_last_line(flow)?;
        flow.go_home()?;
    }
    Ok(())
}
