//! End-to-end scenarios.
//!
//! Each scenario is a linear script over a [`StoreFlow`]: the first unmet
//! wait or mismatched assertion ends it with an error. Scenarios never retry
//! and never share state; the runner hands every one a freshly launched app.

mod cart;
mod checkout;
mod variants;

use crate::assert::assert_count;
use crate::flow::{ProductDetails, StoreFlow};
use crate::result::ProbeResult;

/// Scenario body
pub type ScenarioFn = fn(&mut StoreFlow) -> ProbeResult<()>;

/// A named scenario
#[derive(Clone, Copy)]
pub struct Scenario {
    /// Unique name, also used for teardown screenshots
    pub name: &'static str,
    /// One-line summary
    pub description: &'static str,
    /// Body
    pub run: ScenarioFn,
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Every scenario, in run order
#[must_use]
pub fn all() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "validate_app_loads_with_empty_cart",
            description: "A fresh launch shows an empty basket",
            run: cart::app_loads_with_empty_cart,
        },
        Scenario {
            name: "validate_add_all_products_to_cart",
            description: "Every product reaches the cart with its title, price and default variants",
            run: cart::add_all_products_to_cart,
        },
        Scenario {
            name: "validate_change_all_sizes_all_products",
            description: "Every size of every product is reproduced in the cart",
            run: variants::change_all_sizes,
        },
        Scenario {
            name: "validate_change_all_colors_all_products",
            description: "Every color of every product is reproduced in the cart",
            run: variants::change_all_colors,
        },
        Scenario {
            name: "validate_double_purchase_all_products",
            description: "Adding a product twice yields two independent, removable lines",
            run: cart::double_purchase_all_products,
        },
        Scenario {
            name: "validate_single_purchase_all_products",
            description: "Every product can be taken through sign-in and removed again",
            run: checkout::single_purchase_all_products,
        },
        Scenario {
            name: "validate_single_purchase_invalid_shipping",
            description: "Each required shipping field reports its own error when left empty",
            run: checkout::invalid_shipping,
        },
        Scenario {
            name: "validate_single_purchase_valid_shipping",
            description: "A fully filled shipping form places the order",
            run: checkout::valid_shipping,
        },
    ]
}

/// Look a scenario up by exact name
#[must_use]
pub fn find(name: &str) -> Option<Scenario> {
    all().into_iter().find(|s| s.name == name)
}

/// The cart holds exactly one line showing `details`
fn expect_only_line(flow: &StoreFlow, details: &ProductDetails) -> ProbeResult<()> {
    let lines = flow.cart_lines()?;
    assert_count("cart lines", 1, lines.len())?;
    lines[0].assert_matches(details, 0)
}

/// Swipe away the first line and expect the empty-basket text
fn remove_last_line(flow: &mut StoreFlow) -> ProbeResult<()> {
    flow.remove_first_cart_line()?;
    flow.assert_cart_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_unique() {
        let names: HashSet<_> = all().iter().map(|s| s.name).collect();
        assert_eq!(names.len(), all().len());
    }

    #[test]
    fn test_eight_scenarios() {
        assert_eq!(all().len(), 8);
    }

    #[test]
    fn test_find() {
        assert!(find("validate_app_loads_with_empty_cart").is_some());
        assert!(find("validate_everything").is_none());
    }

    #[test]
    fn test_names_are_screenshot_safe() {
        for s in all() {
            assert!(!s.name.contains('/'));
            assert!(!s.description.is_empty());
        }
    }
}
