//! Variant sweeps: every size, then separately every color, of every product.

use super::{expect_only_line, remove_last_line};
use crate::assert::assert_text;
use crate::flow::StoreFlow;
use crate::locators::{COLOR_DROPDOWN, SIZE_DROPDOWN};
use crate::result::{ProbeError, ProbeResult};
use tracing::info;

pub(super) fn change_all_sizes(flow: &mut StoreFlow) -> ProbeResult<()> {
    sweep(flow, SIZE_DROPDOWN, "size")
}

pub(super) fn change_all_colors(flow: &mut StoreFlow) -> ProbeResult<()> {
    sweep(flow, COLOR_DROPDOWN, "color")
}

fn sweep(flow: &mut StoreFlow, dropdown: usize, label: &str) -> ProbeResult<()> {
    let tiles = flow.home_products()?;
    for tile in &tiles {
        flow.open_product(&tile.title)?;
        let details = flow.product_details()?;
        assert_text("product title", &tile.title, &details.title)?;
        assert_text("product price", &tile.price, &details.price)?;

        flow.open_dropdown(dropdown)?;
        let options = flow.dropdown_options()?;
        flow.close_dropdown()?;
        flow.go_home()?;
        if options.is_empty() {
            return Err(ProbeError::mismatch(
                format!("{} {label} options", tile.title),
                "at least one",
                0,
            ));
        }

        for option in &options {
            info!(product = %tile.title, variant = %option, "{label} sweep");
            flow.open_product(&tile.title)?;
            flow.open_dropdown(dropdown)?;
            flow.choose_option(option)?;

            let details = flow.product_details()?;
            let selected = if dropdown == SIZE_DROPDOWN {
                &details.size
            } else {
                &details.color
            };
            assert_text(&format!("selected {label}"), option, selected)?;

            flow.add_to_basket()?;
            flow.open_cart()?;
            expect_only_line(flow, &details)?;
            remove_last_line(flow)?;
            flow.go_home()?;
        }
    }
    Ok(())
}
