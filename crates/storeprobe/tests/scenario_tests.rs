//! Every scenario against the simulated store, healthy and broken.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use storeprobe::scenarios;
use storeprobe::simulator::SimProduct;
use storeprobe::{
    FailureKind, Fault, Markers, ProbeConfig, ScenarioStatus, SimulatorLauncher,
    SimulatorOptions, SuiteReport, SuiteRunner,
};
use tempfile::TempDir;

fn fast_config(dir: &TempDir) -> ProbeConfig {
    ProbeConfig::new()
        .with_element_timeout(300)
        .with_poll_interval(1)
        .with_screenshot_dir(dir.path())
}

fn run_named(config: ProbeConfig, options: SimulatorOptions, names: &[&str]) -> SuiteReport {
    let selected: Vec<_> = names
        .iter()
        .map(|n| scenarios::find(n).unwrap())
        .collect();
    let mut runner = SuiteRunner::new(
        Arc::new(SimulatorLauncher::new(options)),
        Arc::new(config),
    );
    runner.run(&selected)
}

mod healthy_store {
    use super::*;

    #[test]
    fn test_every_scenario_passes() {
        let dir = TempDir::new().unwrap();
        let mut runner = SuiteRunner::new(
            Arc::new(SimulatorLauncher::default()),
            Arc::new(fast_config(&dir)),
        );
        let report = runner.run_all();
        assert!(report.all_passed(), "{:#?}", report.failures());
        assert_eq!(report.passed_count(), 8);
    }

    #[test]
    fn test_small_catalogue_without_scrolling() {
        let dir = TempDir::new().unwrap();
        let options = SimulatorOptions::new().with_products(vec![
            SimProduct::new("Mug", "$9.00", &["Regular"], &["White"]),
            SimProduct::new("Sticker", "$2.00", &["Small", "Large"], &["Blue", "Red"]),
        ]);
        let report = run_named(
            fast_config(&dir),
            options,
            &[
                "validate_add_all_products_to_cart",
                "validate_change_all_sizes_all_products",
                "validate_double_purchase_all_products",
            ],
        );
        assert!(report.all_passed(), "{:#?}", report.failures());
    }

    #[test]
    fn test_renamed_markers() {
        let dir = TempDir::new().unwrap();
        let markers = Markers {
            basket_cart: "basket_icon".to_string(),
            checkout: "Proceed".to_string(),
            basket_empty: "Nothing here yet".to_string(),
            ..Markers::default()
        };
        let mut config = fast_config(&dir);
        config.markers = markers.clone();
        let options = SimulatorOptions::new().with_markers(markers);
        let report = run_named(
            config,
            options,
            &[
                "validate_app_loads_with_empty_cart",
                "validate_single_purchase_all_products",
            ],
        );
        assert!(report.all_passed(), "{:#?}", report.failures());
    }
}

mod faulty_store {
    use super::*;

    fn single_failure(fault: Fault, name: &str) -> storeprobe::ScenarioReport {
        let dir = TempDir::new().unwrap();
        let report = run_named(
            fast_config(&dir),
            SimulatorOptions::new().with_fault(fault),
            &[name],
        );
        assert_eq!(report.failed_count(), 1, "{fault:?} should break {name}");
        report.scenarios.into_iter().next().unwrap()
    }

    #[test]
    fn test_empty_catalogue_times_out() {
        let failed = single_failure(Fault::EmptyCatalogue, "validate_add_all_products_to_cart");
        assert_eq!(failed.failure_kind, Some(FailureKind::Timeout));
    }

    #[test]
    fn test_empty_catalogue_still_loads_empty_cart() {
        let dir = TempDir::new().unwrap();
        let report = run_named(
            fast_config(&dir),
            SimulatorOptions::new().with_fault(Fault::EmptyCatalogue),
            &["validate_app_loads_with_empty_cart"],
        );
        assert!(report.all_passed());
    }

    #[test]
    fn test_wrong_price_is_an_assertion() {
        let failed = single_failure(Fault::WrongCartPrice, "validate_add_all_products_to_cart");
        assert_eq!(failed.failure_kind, Some(FailureKind::Assertion));
        let message = failed.error.unwrap();
        assert!(message.contains("cart line 0 price"), "{message}");
        assert!(message.contains("$20.00"), "{message}");
    }

    #[test]
    fn test_ignored_removal_times_out() {
        let failed = single_failure(Fault::IgnoreRemoval, "validate_double_purchase_all_products");
        assert_eq!(failed.failure_kind, Some(FailureKind::Timeout));
        assert!(failed.error.unwrap().contains("first cart line removed"));
    }

    #[test]
    fn test_skipped_validation_times_out() {
        let failed = single_failure(Fault::SkipValidation, "validate_single_purchase_invalid_shipping");
        assert_eq!(failed.failure_kind, Some(FailureKind::Timeout));
        assert!(failed.error.unwrap().contains("First name is required"));
    }

    #[test]
    fn test_skipped_validation_does_not_block_valid_order() {
        let dir = TempDir::new().unwrap();
        let report = run_named(
            fast_config(&dir),
            SimulatorOptions::new().with_fault(Fault::SkipValidation),
            &["validate_single_purchase_valid_shipping"],
        );
        assert!(report.all_passed(), "{:#?}", report.failures());
    }

    #[test]
    fn test_failures_do_not_cascade() {
        let dir = TempDir::new().unwrap();
        let report = run_named(
            fast_config(&dir),
            SimulatorOptions::new().with_fault(Fault::WrongCartPrice),
            &[
                "validate_add_all_products_to_cart",
                "validate_app_loads_with_empty_cart",
            ],
        );
        assert_eq!(report.scenarios[0].status, ScenarioStatus::Failed);
        assert_eq!(report.scenarios[1].status, ScenarioStatus::Passed);
    }

    #[test]
    fn test_unknown_device_is_infrastructure() {
        let dir = TempDir::new().unwrap();
        let config = fast_config(&dir).with_device_serial("pixel-9");
        let report = run_named(
            config,
            SimulatorOptions::new(),
            &["validate_app_loads_with_empty_cart"],
        );
        let failed = &report.scenarios[0];
        assert_eq!(failed.failure_kind, Some(FailureKind::Infrastructure));
        assert!(failed.screenshot.is_none());
    }
}

mod teardown {
    use super::*;

    #[test]
    fn test_screenshot_names_never_collide() {
        let dir = TempDir::new().unwrap();
        let name = "validate_app_loads_with_empty_cart";
        let first = run_named(fast_config(&dir), SimulatorOptions::new(), &[name]);
        let second = run_named(fast_config(&dir), SimulatorOptions::new(), &[name]);

        assert_eq!(
            first.scenarios[0].screenshot,
            Some(dir.path().join(format!("{name}-Passed0.png")))
        );
        assert_eq!(
            second.scenarios[0].screenshot,
            Some(dir.path().join(format!("{name}-Passed1.png")))
        );
    }

    #[test]
    fn test_failed_screenshot_is_png() {
        let dir = TempDir::new().unwrap();
        let report = run_named(
            fast_config(&dir),
            SimulatorOptions::new().with_fault(Fault::EmptyCatalogue),
            &["validate_add_all_products_to_cart"],
        );
        let path = report.scenarios[0].screenshot.clone().unwrap();
        assert!(path.ends_with("validate_add_all_products_to_cart-Failed0.png"));
        let bytes = std::fs::read(path).unwrap();
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let dir = TempDir::new().unwrap();
        let report = run_named(
            fast_config(&dir),
            SimulatorOptions::new(),
            &["validate_app_loads_with_empty_cart"],
        );
        let path = dir.path().join("report.json");
        report.write_json(&path).unwrap();
        let back: SuiteReport =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(back.scenarios, report.scenarios);
    }
}
