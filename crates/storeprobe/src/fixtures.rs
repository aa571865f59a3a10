//! Literal test input data: the test account and the sample shipping
//! address.
//!
//! Each shipping value is paired with the text of the validation error the
//! app shows when that field is left empty, so the two can never drift out of
//! alignment. A field without an error is optional.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Test account used at sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account email, pre-filled by the app
    pub email: String,
    /// Account password, typed by the scenario
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            email: "shopper@xamarin.com".to_string(),
            password: "xamarin".to_string(),
        }
    }
}

/// One shipping form field and its expected validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingField {
    /// Human-readable field name, used in assertion messages
    pub name: String,
    /// Value to type
    pub value: String,
    /// Error text shown when the field is submitted empty; `None` = optional
    #[serde(default)]
    pub error: Option<String>,
}

impl ShippingField {
    /// A required field
    #[must_use]
    pub fn required(name: &str, value: &str, error: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            error: Some(error.to_string()),
        }
    }

    /// An optional field
    #[must_use]
    pub fn optional(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            error: None,
        }
    }

    /// Whether submitting the field empty must raise an error
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.error.is_some()
    }
}

/// An on-screen group of shipping fields, in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingSection {
    /// Marker of the layout containing the section's text fields
    pub layout: String,
    /// Fields in the order the app lays them out
    pub fields: Vec<ShippingField>,
}

/// All fixture data consumed by the scenarios
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Test account
    #[serde(default)]
    pub account: Credentials,
    /// Shipping form sections
    #[serde(default = "default_shipping")]
    pub shipping: Vec<ShippingSection>,
}

impl Default for FixtureSet {
    fn default() -> Self {
        Self {
            account: Credentials::default(),
            shipping: default_shipping(),
        }
    }
}

fn default_shipping() -> Vec<ShippingSection> {
    vec![
        ShippingSection {
            layout: "shippingLayout1".to_string(),
            fields: vec![
                ShippingField::required("first name", "Jane", "First name is required"),
                ShippingField::required("last name", "Doe", "Last name is required"),
                ShippingField::required("phone", "425-555-0100", "Phone number is required"),
                ShippingField::required("address", "1 Microsoft Way", "Address is required"),
                ShippingField::optional("address line 2", "Suite 200"),
                ShippingField::required("city", "Redmond", "City is required"),
                ShippingField::required("postal code", "98052", "Postal code is required"),
            ],
        },
        ShippingSection {
            layout: "shippingLayout2".to_string(),
            fields: vec![
                ShippingField::required("state", "Washington", "State is required"),
                ShippingField::required("country", "United States", "Country is required"),
            ],
        },
    ]
}

impl FixtureSet {
    /// Every shipping field across all sections, in order
    pub fn shipping_fields(&self) -> impl Iterator<Item = &ShippingField> {
        self.shipping.iter().flat_map(|s| s.fields.iter())
    }

    /// Check the fixture tables are usable
    pub fn validate(&self) -> ProbeResult<()> {
        if self.account.password.is_empty() {
            return Err(ProbeError::config("fixtures.account.password is empty"));
        }
        if self.shipping.is_empty() {
            return Err(ProbeError::config("fixtures.shipping has no sections"));
        }

        let mut seen = HashSet::new();
        let mut errors = HashSet::new();
        for (i, section) in self.shipping.iter().enumerate() {
            if section.layout.is_empty() {
                return Err(ProbeError::config(format!(
                    "fixtures.shipping[{i}].layout is empty"
                )));
            }
            if section.fields.is_empty() {
                return Err(ProbeError::config(format!(
                    "fixtures.shipping[{i}] has no fields"
                )));
            }
            for field in &section.fields {
                if !seen.insert(field.name.as_str()) {
                    return Err(ProbeError::config(format!(
                        "duplicate shipping field {:?}",
                        field.name
                    )));
                }
                if field.is_required() && field.value.is_empty() {
                    return Err(ProbeError::config(format!(
                        "required shipping field {:?} has an empty value",
                        field.name
                    )));
                }
                if field.error.as_deref() == Some("") {
                    return Err(ProbeError::config(format!(
                        "shipping field {:?} has an empty error text",
                        field.name
                    )));
                }
                if let Some(error) = field.error.as_deref() {
                    if !errors.insert(error) {
                        return Err(ProbeError::config(format!(
                            "shipping field {:?} reuses error text {error:?}",
                            field.name
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
