//! Selector catalog: semantic UI regions mapped to CSS locators
//!
//! The stock WooCommerce table works with most themes; sites shadow
//! individual leaves in their YAML definition. Merging is recursive
//! with the site value winning at a leaf, so an override of
//! `general.loader` leaves every other default intact.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Either a CSS selector string or a nested group of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorValue {
    Leaf(String),
    Group(BTreeMap<String, SelectorValue>),
}

impl SelectorValue {
    fn leaf(s: &str) -> SelectorValue {
        SelectorValue::Leaf(s.to_string())
    }

    /// Overlay `other` on top of `self`. Leaves replace; groups merge
    /// key by key. A type mismatch (leaf vs group) takes the site side
    /// wholesale.
    fn merged_with(&self, other: &SelectorValue) -> SelectorValue {
        match (self, other) {
            (SelectorValue::Group(base), SelectorValue::Group(over)) => {
                let mut merged = base.clone();
                for (key, value) in over {
                    let entry = match base.get(key) {
                        Some(existing) => existing.merged_with(value),
                        None => value.clone(),
                    };
                    merged.insert(key.clone(), entry);
                }
                SelectorValue::Group(merged)
            }
            _ => other.clone(),
        }
    }
}

/// Read-only lookup table from page-area names to selectors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectorCatalog {
    areas: BTreeMap<String, SelectorValue>,
}

impl SelectorCatalog {
    /// Resolve a dotted path like `"general.loader"` or
    /// `"checkout.billing.email"` to a selector string.
    pub fn lookup(&self, path: &str) -> Option<&str> {
        let mut current: Option<&SelectorValue> = None;
        for segment in path.split('.') {
            current = match current {
                None => self.areas.get(segment),
                Some(SelectorValue::Group(group)) => group.get(segment),
                Some(SelectorValue::Leaf(_)) => return None,
            };
            current?;
        }
        match current {
            Some(SelectorValue::Leaf(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Selectors that mark in-flight loading UI, from
    /// `general.loader`. The leaf holds a comma-separated selector
    /// list; each entry is waited on independently.
    pub fn loader_selectors(&self) -> Vec<String> {
        self.lookup("general.loader")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Overlay site-specific values on this catalog. Site leaf wins
    /// when present; everything else survives unchanged.
    pub fn merged_with(&self, overrides: &SelectorCatalog) -> SelectorCatalog {
        let mut areas = self.areas.clone();
        for (area, value) in &overrides.areas {
            let entry = match self.areas.get(area) {
                Some(existing) => existing.merged_with(value),
                None => value.clone(),
            };
            areas.insert(area.clone(), entry);
        }
        SelectorCatalog { areas }
    }

    /// Standard WooCommerce selectors that work with most themes.
    pub fn woocommerce_defaults() -> SelectorCatalog {
        fn group(entries: &[(&str, SelectorValue)]) -> SelectorValue {
            SelectorValue::Group(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            )
        }
        fn leaves(entries: &[(&str, &str)]) -> SelectorValue {
            SelectorValue::Group(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), SelectorValue::leaf(v)))
                    .collect(),
            )
        }

        let mut areas = BTreeMap::new();

        areas.insert(
            "shop".to_string(),
            leaves(&[
                ("product_grid", ".products"),
                ("product_item", ".product"),
                ("product_title", ".woocommerce-loop-product__title"),
                ("product_price", ".price"),
                ("add_to_cart", ".add_to_cart_button"),
                ("added_to_cart", ".added_to_cart"),
                ("pagination", ".woocommerce-pagination"),
                ("result_count", ".woocommerce-result-count"),
                ("ordering", ".woocommerce-ordering"),
            ]),
        );

        areas.insert(
            "product".to_string(),
            leaves(&[
                ("title", ".product_title"),
                ("price", ".price"),
                ("add_to_cart", "button.single_add_to_cart_button"),
                ("quantity", "input.qty"),
                ("variation_select", ".variations select"),
                ("variation_form", ".variations_form"),
                ("gallery", ".woocommerce-product-gallery"),
                ("tabs", ".woocommerce-tabs"),
                ("related", ".related.products"),
                ("meta", ".product_meta"),
                ("sku", ".sku"),
                ("categories", ".posted_in"),
                ("tags", ".tagged_as"),
            ]),
        );

        areas.insert(
            "cart".to_string(),
            leaves(&[
                ("form", ".woocommerce-cart-form"),
                ("table", ".shop_table.cart"),
                ("item_row", ".woocommerce-cart-form__cart-item"),
                ("product_name", ".product-name"),
                ("product_price", ".product-price"),
                ("quantity", "input.qty"),
                ("subtotal", ".product-subtotal"),
                ("remove", ".remove"),
                ("coupon_input", "#coupon_code"),
                ("apply_coupon", "button[name=\"apply_coupon\"]"),
                ("update_cart", "button[name=\"update_cart\"]"),
                ("totals", ".cart_totals"),
                ("order_total", ".order-total .amount"),
                ("checkout", ".checkout-button"),
                ("empty_message", ".cart-empty"),
            ]),
        );

        areas.insert(
            "checkout".to_string(),
            group(&[
                ("form", SelectorValue::leaf("form.checkout")),
                (
                    "billing",
                    leaves(&[
                        ("first_name", "#billing_first_name"),
                        ("last_name", "#billing_last_name"),
                        ("company", "#billing_company"),
                        ("country", "#billing_country"),
                        ("address1", "#billing_address_1"),
                        ("address2", "#billing_address_2"),
                        ("city", "#billing_city"),
                        ("state", "#billing_state"),
                        ("postcode", "#billing_postcode"),
                        ("phone", "#billing_phone"),
                        ("email", "#billing_email"),
                    ]),
                ),
                (
                    "shipping",
                    leaves(&[
                        ("first_name", "#shipping_first_name"),
                        ("last_name", "#shipping_last_name"),
                        ("company", "#shipping_company"),
                        ("country", "#shipping_country"),
                        ("address1", "#shipping_address_1"),
                        ("address2", "#shipping_address_2"),
                        ("city", "#shipping_city"),
                        ("state", "#shipping_state"),
                        ("postcode", "#shipping_postcode"),
                    ]),
                ),
                (
                    "ship_to_different",
                    SelectorValue::leaf("#ship-to-different-address-checkbox"),
                ),
                ("order_notes", SelectorValue::leaf("#order_comments")),
                (
                    "order_review",
                    SelectorValue::leaf(".woocommerce-checkout-review-order"),
                ),
                (
                    "payment_methods",
                    SelectorValue::leaf(".woocommerce-checkout-payment"),
                ),
                ("place_order", SelectorValue::leaf("#place_order")),
                ("terms", SelectorValue::leaf("#terms")),
            ]),
        );

        areas.insert(
            "account".to_string(),
            leaves(&[
                ("login_form", ".woocommerce-form-login"),
                ("register_form", ".woocommerce-form-register"),
                ("dashboard", ".woocommerce-MyAccount-content"),
                ("navigation", ".woocommerce-MyAccount-navigation"),
                ("orders", ".woocommerce-orders-table"),
                ("addresses", ".woocommerce-Addresses"),
                ("account_details", ".woocommerce-EditAccountForm"),
            ]),
        );

        areas.insert(
            "mini_cart".to_string(),
            leaves(&[
                ("widget", ".widget_shopping_cart"),
                ("item_count", ".cart-contents .count"),
                ("total", ".cart-contents .amount"),
                (
                    "view_cart",
                    ".woocommerce-mini-cart__buttons .button:first-child",
                ),
                ("checkout", ".woocommerce-mini-cart__buttons .checkout"),
            ]),
        );

        areas.insert(
            "messages".to_string(),
            leaves(&[
                ("success", ".woocommerce-message"),
                ("error", ".woocommerce-error"),
                ("info", ".woocommerce-info"),
                ("notice", ".woocommerce-notice"),
            ]),
        );

        areas.insert(
            "general".to_string(),
            leaves(&[
                (
                    "loader",
                    ".blockUI, .loading, .wc-block-components-spinner",
                ),
                ("breadcrumb", ".woocommerce-breadcrumb"),
                ("sale_flash", ".onsale"),
                ("out_of_stock", ".out-of-stock"),
                ("in_stock", ".in-stock"),
                ("star_rating", ".star-rating"),
            ]),
        );

        SelectorCatalog { areas }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_resolves_dotted_paths() {
        let catalog = SelectorCatalog::woocommerce_defaults();
        assert_eq!(catalog.lookup("shop.product_grid"), Some(".products"));
        assert_eq!(catalog.lookup("checkout.billing.email"), Some("#billing_email"));
        assert_eq!(catalog.lookup("checkout.billing"), None);
        assert_eq!(catalog.lookup("nope.nothing"), None);
    }

    #[test]
    fn loader_selectors_split_on_commas() {
        let catalog = SelectorCatalog::woocommerce_defaults();
        assert_eq!(
            catalog.loader_selectors(),
            vec![".blockUI", ".loading", ".wc-block-components-spinner"]
        );
    }

    #[test]
    fn site_leaf_wins_and_defaults_survive() {
        let defaults = SelectorCatalog::woocommerce_defaults();
        let overrides: SelectorCatalog = serde_yaml::from_str(
            r#"
general:
  loader: ".theme-spinner"
shop:
  product_grid: "ul.custom-products"
"#,
        )
        .unwrap();

        let merged = defaults.merged_with(&overrides);

        // Overridden leaves
        assert_eq!(merged.lookup("general.loader"), Some(".theme-spinner"));
        assert_eq!(merged.lookup("shop.product_grid"), Some("ul.custom-products"));
        // Sibling defaults in the same areas survive
        assert_eq!(merged.lookup("general.breadcrumb"), Some(".woocommerce-breadcrumb"));
        assert_eq!(merged.lookup("shop.pagination"), Some(".woocommerce-pagination"));
        // Untouched areas survive
        assert_eq!(merged.lookup("cart.form"), Some(".woocommerce-cart-form"));
    }

    #[test]
    fn nested_groups_merge_recursively() {
        let defaults = SelectorCatalog::woocommerce_defaults();
        let overrides: SelectorCatalog = serde_yaml::from_str(
            r##"
checkout:
  billing:
    email: "#custom_email"
"##,
        )
        .unwrap();

        let merged = defaults.merged_with(&overrides);
        assert_eq!(merged.lookup("checkout.billing.email"), Some("#custom_email"));
        assert_eq!(merged.lookup("checkout.billing.phone"), Some("#billing_phone"));
        assert_eq!(merged.lookup("checkout.place_order"), Some("#place_order"));
    }

    #[test]
    fn novel_site_areas_are_added() {
        let defaults = SelectorCatalog::woocommerce_defaults();
        let overrides: SelectorCatalog = serde_yaml::from_str(
            r#"
hero:
  banner: ".home-hero"
"#,
        )
        .unwrap();

        let merged = defaults.merged_with(&overrides);
        assert_eq!(merged.lookup("hero.banner"), Some(".home-hero"));
    }
}
