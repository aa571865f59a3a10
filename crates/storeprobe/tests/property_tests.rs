//! Property tests over the flow helpers and the simulated store.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use storeprobe::prelude::*;
use storeprobe::{
    AppSession, ProbeConfig, ScreenshotStore, SimulatorLauncher, SimulatorOptions,
    COLOR_DROPDOWN, SIZE_DROPDOWN,
};

fn launch(options: SimulatorOptions) -> StoreFlow {
    let config = Arc::new(
        ProbeConfig::new()
            .with_element_timeout(200)
            .with_poll_interval(1),
    );
    let driver = SimulatorLauncher::new(options).launch(&config.app).unwrap();
    StoreFlow::new(AppSession::new(driver, config))
}

/// Product index plus size and color indices, each within the default catalogue
fn prop_variant_choice() -> impl Strategy<Value = (usize, usize, usize)> {
    let products = SimulatorOptions::default().products;
    (0..products.len()).prop_flat_map(move |p| {
        let product = &products[p];
        (Just(p), 0..product.sizes.len(), 0..product.colors.len())
    })
}

/// Driver that never shows anything and counts drags
struct EmptyScreen {
    drags: Arc<AtomicU32>,
}

impl AppDriver for EmptyScreen {
    fn query(&self, _query: &Query) -> ProbeResult<Vec<Element>> {
        Ok(Vec::new())
    }
    fn tap(&mut self, _query: &Query) -> ProbeResult<()> {
        Ok(())
    }
    fn drag_coordinates(&mut self, _from: Point, _to: Point) -> ProbeResult<()> {
        self.drags.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
    fn enter_text(&mut self, _query: &Query, _text: &str) -> ProbeResult<()> {
        Ok(())
    }
    fn back(&mut self) -> ProbeResult<()> {
        Ok(())
    }
    fn screenshot(&mut self, _name: &str) -> ProbeResult<Screenshot> {
        Ok(Screenshot::new(vec![1], 1, 1))
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Any variant of any product reaches the cart unchanged, and emptying
    /// the cart restores the empty-basket text
    #[test]
    fn prop_cart_reproduces_variant((p, size, color) in prop_variant_choice()) {
        let product = SimulatorOptions::default().products[p].clone();
        let mut flow = launch(SimulatorOptions::default());
        flow.open_product(&product.title).unwrap();

        flow.open_dropdown(SIZE_DROPDOWN).unwrap();
        flow.choose_option(&product.sizes[size]).unwrap();
        flow.open_dropdown(COLOR_DROPDOWN).unwrap();
        flow.choose_option(&product.colors[color]).unwrap();

        let details = flow.product_details().unwrap();
        prop_assert_eq!(&details.title, &product.title);
        prop_assert_eq!(&details.price, &product.price);
        prop_assert_eq!(&details.size, &product.sizes[size]);
        prop_assert_eq!(&details.color, &product.colors[color]);

        flow.add_to_basket().unwrap();
        flow.open_cart().unwrap();
        let lines = flow.cart_lines().unwrap();
        prop_assert_eq!(lines.len(), 1);
        prop_assert!(lines[0].assert_matches(&details, 0).is_ok());

        flow.remove_first_cart_line().unwrap();
        prop_assert!(flow.assert_cart_empty().is_ok());
    }

    /// Choosing a size leaves the color at its default, and vice versa
    #[test]
    fn prop_variants_are_isolated((p, size, color) in prop_variant_choice()) {
        let product = SimulatorOptions::default().products[p].clone();
        let mut flow = launch(SimulatorOptions::default());
        flow.open_product(&product.title).unwrap();

        flow.open_dropdown(SIZE_DROPDOWN).unwrap();
        flow.choose_option(&product.sizes[size]).unwrap();
        prop_assert_eq!(&flow.product_details().unwrap().color, &product.colors[0]);

        flow.go_home().unwrap();
        flow.open_product(&product.title).unwrap();
        flow.open_dropdown(COLOR_DROPDOWN).unwrap();
        flow.choose_option(&product.colors[color]).unwrap();
        prop_assert_eq!(&flow.product_details().unwrap().size, &product.sizes[0]);
    }

    /// Clearing any set of required fields shows exactly their errors
    #[test]
    fn prop_shipping_errors_match_cleared_fields(mask in proptest::collection::vec(any::<bool>(), 9)) {
        let mut flow = launch(SimulatorOptions::default());
        let first = flow.home_products().unwrap()[0].title.clone();
        flow.open_product(&first).unwrap();
        flow.add_to_basket().unwrap();
        flow.open_cart().unwrap();
        flow.checkout().unwrap();
        flow.enter_password("xamarin").unwrap();
        flow.sign_in().unwrap();
        flow.fill_shipping().unwrap();

        let sections = flow.config().fixtures.shipping.clone();
        let mut cleared = BTreeSet::new();
        let mut index = 0;
        for section in &sections {
            let elements = flow.shipping_fields(section).unwrap();
            for (element, field) in elements.iter().zip(&section.fields) {
                if mask[index] {
                    flow.session_mut().enter_text(&element.id, "").unwrap();
                    cleared.insert(field.name.clone());
                }
                index += 1;
            }
        }
        flow.submit_shipping().unwrap();

        let catalog = flow.catalog().clone();
        for field in flow.config().fixtures.shipping_fields() {
            let Some(message) = field.error.as_deref() else { continue };
            let shown = flow.session().query(&catalog.shipping_error(message)).unwrap();
            prop_assert_eq!(shown.len(), usize::from(cleared.contains(&field.name)), "{}", field.name);
        }
    }

    /// Scrolling for something that never appears stops after the bound
    #[test]
    fn prop_scroll_is_bounded(attempts in 0u32..30) {
        let drags = Arc::new(AtomicU32::new(0));
        let driver = EmptyScreen { drags: Arc::clone(&drags) };
        let config = Arc::new(ProbeConfig::new().with_max_scroll_attempts(attempts.max(1)));
        let mut session = AppSession::new(Box::new(driver), config);
        prop_assert!(!session.scroll_until_visible("Unicorn Onesie").unwrap());
        prop_assert_eq!(drags.load(Ordering::SeqCst), attempts.max(1));
    }

    /// Saved screenshots take the smallest free index
    #[test]
    fn prop_screenshot_indices_are_dense(count in 1u32..6, name in "[a-z_]{1,12}-(Passed|Failed)") {
        let dir = tempfile::tempdir().unwrap();
        let store = ScreenshotStore::new(dir.path());
        let shot = Screenshot::new(vec![0x89, 0x50, 0x4E, 0x47], 1, 1);
        for i in 0..count {
            let path = store.save(&name, &shot).unwrap();
            prop_assert_eq!(path, dir.path().join(format!("{name}{i}.png")));
        }
    }
}
