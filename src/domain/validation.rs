use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::config::Limits;

use super::errors::DomainError;
use super::order::{
    MenuCatalog, OrderItemRequest, OrderMeta, OrderRequest, SanitizedItem, SanitizedOrder,
};

/// One uppercase letter followed by exactly three digits, e.g. "A123".
static ORDER_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Z][0-9]{3}$").expect("valid pattern"));

/// Structural validation of an untrusted order.
///
/// Runs every check and returns the complete list of defects, never just the
/// first one, so a client can surface all problems at once. An empty vec
/// means the order is structurally sound. Numeric cross-checks only run when
/// the fields they involve are present; their absence is already reported by
/// the field checks.
pub fn validate_order(order: &OrderRequest, limits: &Limits) -> Vec<String> {
    let mut errors = Vec::new();

    match &order.items {
        None => errors.push("The \"items\" field is required".to_string()),
        Some(items) => {
            if items.is_empty() {
                errors.push("Order must contain at least one item".to_string());
            }
            if items.len() > limits.max_items_per_order {
                errors.push(format!(
                    "Maximum {} items per order",
                    limits.max_items_per_order
                ));
            }
            for (index, item) in items.iter().enumerate() {
                validate_item(index, item, limits, &mut errors);
            }
        }
    }

    let number_ok = order
        .number
        .as_deref()
        .is_some_and(|n| ORDER_NUMBER.is_match(n));
    if !number_ok {
        errors.push("Invalid order number (format: A123)".to_string());
    }

    if !order.subtotal.is_some_and(|s| s >= 0.0) {
        errors.push("Invalid subtotal".to_string());
    }
    if !order.tip.is_some_and(|t| t >= 0.0) {
        errors.push("Invalid tip".to_string());
    }
    if !order.total.is_some_and(|t| t >= limits.min_order_total) {
        errors.push("Invalid total".to_string());
    }
    if order.total.is_some_and(|t| t > limits.max_order_total) {
        errors.push(format!("Maximum order total: ${}", limits.max_order_total));
    }

    if let (Some(items), Some(subtotal)) = (&order.items, order.subtotal) {
        if let Some(computed) = items_subtotal(items) {
            if !within_tolerance(computed, subtotal, limits.amount_tolerance) {
                errors.push("Subtotal does not match the ordered items".to_string());
            }
        }
    }

    if let (Some(subtotal), Some(tip), Some(total)) = (order.subtotal, order.tip, order.total) {
        if !within_tolerance(subtotal + tip, total, limits.amount_tolerance) {
            errors.push("Total does not match subtotal + tip".to_string());
        }
    }

    if let (Some(subtotal), Some(tip)) = (order.subtotal, order.tip) {
        if subtotal > 0.0 && tip > subtotal * (limits.max_tip_percentage / 100.0) {
            errors.push(format!(
                "Maximum tip: {}% of subtotal",
                limits.max_tip_percentage
            ));
        }
    }

    if let Some(status) = &order.status {
        if status != "pending" {
            errors.push("Initial status must be \"pending\"".to_string());
        }
    }

    errors
}

fn validate_item(index: usize, item: &OrderItemRequest, limits: &Limits, errors: &mut Vec<String>) {
    // Indices are 1-based in messages.
    let position = index + 1;

    if !item.name.as_deref().is_some_and(|n| !n.is_empty()) {
        errors.push(format!("Item {position}: invalid name"));
    }
    if !item.price.is_some_and(|p| p >= 0.0) {
        errors.push(format!("Item {position}: invalid price"));
    }
    if !item.quantity.is_some_and(|q| q >= 1.0) {
        errors.push(format!("Item {position}: invalid quantity"));
    }
    if item
        .quantity
        .is_some_and(|q| q > limits.max_quantity_per_item as f64)
    {
        errors.push(format!(
            "Item {position}: maximum quantity {}",
            limits.max_quantity_per_item
        ));
    }
}

/// Sum of price × quantity, or `None` when any item is missing either field
/// (those items are already reported individually).
fn items_subtotal(items: &[OrderItemRequest]) -> Option<f64> {
    items
        .iter()
        .map(|item| Some(item.price? * item.quantity?))
        .sum()
}

/// Cross-checks order items carrying an id against the menu snapshot.
///
/// Unlike structural validation this phase short-circuits: the first
/// violation already invalidates the whole order, and each lookup is
/// sequential. Violations are surfaced with the item's display name so the
/// client knows exactly which line to fix.
pub fn check_against_menu(order: &OrderRequest, menu: &MenuCatalog) -> Result<(), DomainError> {
    let Some(items) = &order.items else {
        return Ok(());
    };

    for item in items {
        let Some(id) = item.id.as_deref() else {
            continue;
        };
        let name = item.name.as_deref().unwrap_or_default();

        let Some(entry) = menu.get(id) else {
            return Err(DomainError::Validation(vec![format!(
                "Item \"{name}\" not found in the menu"
            )]));
        };
        if !entry.available {
            return Err(DomainError::FailedPrecondition(format!(
                "Item \"{name}\" is no longer available"
            )));
        }
        let submitted = item.price.unwrap_or_default();
        if !within_tolerance(entry.price, submitted, 0.01) {
            return Err(DomainError::Validation(vec![format!(
                "Incorrect price for \"{name}\""
            )]));
        }
    }

    Ok(())
}

/// Builds the trusted order record from a payload that passed validation.
///
/// Currency fields are rounded to two decimals, quantities floored and
/// clamped into `[1, max_quantity_per_item]`, names truncated to 100
/// characters and the status forced to "pending".
pub fn sanitize(
    order: &OrderRequest,
    limits: &Limits,
    meta: OrderMeta,
    now: DateTime<Utc>,
) -> SanitizedOrder {
    let items = order
        .items
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|item| SanitizedItem {
            id: item.id.clone(),
            name: item
                .name
                .as_deref()
                .unwrap_or_default()
                .chars()
                .take(100)
                .collect(),
            price: round2(item.price.unwrap_or_default()),
            quantity: clamp_quantity(item.quantity.unwrap_or(1.0), limits),
        })
        .collect();

    SanitizedOrder {
        number: order.number.clone().unwrap_or_default(),
        items,
        subtotal: round2(order.subtotal.unwrap_or_default()),
        tip: round2(order.tip.unwrap_or_default()),
        total: round2(order.total.unwrap_or_default()),
        status: "pending".to_string(),
        timestamp: now,
        meta,
    }
}

/// Absolute-difference check with a one-nanocent pad so amounts off by
/// exactly the tolerance pass despite f64 representation error (e.g.
/// 22.51 - 22.5 is a hair above 0.01 in f64). A deviation of 0.011 still
/// fails.
fn within_tolerance(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance + 1e-9
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn clamp_quantity(quantity: f64, limits: &Limits) -> u32 {
    (quantity.floor() as i64).clamp(1, limits.max_quantity_per_item as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::MenuEntry;

    fn item(id: Option<&str>, name: &str, price: f64, quantity: f64) -> OrderItemRequest {
        OrderItemRequest {
            id: id.map(String::from),
            name: Some(name.to_string()),
            price: Some(price),
            quantity: Some(quantity),
        }
    }

    fn valid_order() -> OrderRequest {
        OrderRequest {
            number: Some("A100".to_string()),
            items: Some(vec![
                item(Some("x1"), "Burger", 10.0, 2.0),
                item(Some("x2"), "Soda", 2.5, 1.0),
            ]),
            subtotal: Some(22.5),
            tip: Some(3.0),
            total: Some(25.5),
            status: Some("pending".to_string()),
        }
    }

    fn menu() -> MenuCatalog {
        let mut menu = MenuCatalog::new();
        menu.insert(
            "x1",
            MenuEntry {
                name: "Burger".to_string(),
                price: 10.0,
                available: true,
            },
        );
        menu.insert(
            "x2",
            MenuEntry {
                name: "Soda".to_string(),
                price: 2.5,
                available: true,
            },
        );
        menu
    }

    fn meta() -> OrderMeta {
        OrderMeta {
            created_via: "test".to_string(),
            identity_hash: None,
            user_agent: None,
        }
    }

    #[test]
    fn valid_order_has_no_defects() {
        assert!(validate_order(&valid_order(), &Limits::default()).is_empty());
    }

    #[test]
    fn validation_is_idempotent() {
        let order = OrderRequest {
            number: Some("bad".to_string()),
            total: Some(99_999.0),
            ..valid_order()
        };
        let limits = Limits::default();
        assert_eq!(validate_order(&order, &limits), validate_order(&order, &limits));
    }

    #[test]
    fn missing_items_is_reported_with_other_defects() {
        let order = OrderRequest {
            number: None,
            items: None,
            subtotal: None,
            tip: None,
            total: None,
            status: None,
        };
        let errors = validate_order(&order, &Limits::default());
        assert!(errors.contains(&"The \"items\" field is required".to_string()));
        assert!(errors.contains(&"Invalid order number (format: A123)".to_string()));
        assert!(errors.contains(&"Invalid subtotal".to_string()));
        assert!(errors.contains(&"Invalid tip".to_string()));
        assert!(errors.contains(&"Invalid total".to_string()));
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn empty_items_list_is_a_distinct_defect() {
        let order = OrderRequest {
            items: Some(vec![]),
            subtotal: Some(0.0),
            tip: Some(0.0),
            total: Some(0.0),
            ..valid_order()
        };
        let errors = validate_order(&order, &Limits::default());
        assert_eq!(errors, vec!["Order must contain at least one item".to_string()]);
    }

    #[test]
    fn item_defects_are_reported_one_based() {
        let mut order = valid_order();
        let items = order.items.as_mut().expect("items");
        items[1].name = Some(String::new());
        items[1].price = Some(-1.0);

        let errors = validate_order(&order, &Limits::default());
        assert!(errors.contains(&"Item 2: invalid name".to_string()));
        assert!(errors.contains(&"Item 2: invalid price".to_string()));
    }

    #[test]
    fn fifty_items_pass_fifty_one_fail() {
        let limits = Limits::default();
        let build = |count: usize| {
            let items: Vec<_> = (0..count).map(|_| item(None, "Water", 1.0, 1.0)).collect();
            OrderRequest {
                number: Some("B001".to_string()),
                subtotal: Some(count as f64),
                tip: Some(0.0),
                total: Some(count as f64),
                items: Some(items),
                status: None,
            }
        };

        assert!(validate_order(&build(50), &limits).is_empty());
        assert!(validate_order(&build(51), &limits)
            .contains(&"Maximum 50 items per order".to_string()));
    }

    #[test]
    fn quantity_twenty_passes_twenty_one_fails() {
        let limits = Limits::default();
        let build = |quantity: f64| OrderRequest {
            items: Some(vec![item(None, "Burger", 1.0, quantity)]),
            subtotal: Some(quantity),
            tip: Some(0.0),
            total: Some(quantity),
            number: Some("C001".to_string()),
            status: None,
        };

        assert!(validate_order(&build(20.0), &limits).is_empty());
        assert!(validate_order(&build(21.0), &limits)
            .contains(&"Item 1: maximum quantity 20".to_string()));
    }

    #[test]
    fn order_number_pattern() {
        let limits = Limits::default();
        let with_number = |number: &str| OrderRequest {
            number: Some(number.to_string()),
            ..valid_order()
        };

        for good in ["A123", "Z000"] {
            assert!(validate_order(&with_number(good), &limits).is_empty(), "{good}");
        }
        for bad in ["a123", "AA23", "A12", "A1234", ""] {
            assert!(
                validate_order(&with_number(bad), &limits)
                    .contains(&"Invalid order number (format: A123)".to_string()),
                "{bad}"
            );
        }
    }

    #[test]
    fn subtotal_tolerance_boundary() {
        let limits = Limits::default();
        let with_subtotal = |subtotal: f64, total: f64| OrderRequest {
            subtotal: Some(subtotal),
            total: Some(total),
            ..valid_order()
        };

        // Off by exactly the tolerance passes, despite the f64 difference
        // landing a hair above 0.01.
        assert!(validate_order(&with_subtotal(22.51, 25.51), &limits).is_empty());
        // Off by 0.011 fails.
        assert!(validate_order(&with_subtotal(22.511, 25.511), &limits)
            .contains(&"Subtotal does not match the ordered items".to_string()));
    }

    #[test]
    fn total_tolerance_boundary() {
        let limits = Limits::default();
        let with_total = |total: f64| OrderRequest {
            total: Some(total),
            ..valid_order()
        };

        // Exactly 0.01 off passes; 0.011 off fails.
        assert!(validate_order(&with_total(25.51), &limits).is_empty());
        assert!(validate_order(&with_total(25.511), &limits)
            .contains(&"Total does not match subtotal + tip".to_string()));
    }

    #[test]
    fn tip_cap_boundary() {
        let limits = Limits::default();
        let with_tip = |tip: f64| OrderRequest {
            tip: Some(tip),
            total: Some(22.5 + tip),
            ..valid_order()
        };

        // Exactly 100% of the subtotal passes.
        assert!(validate_order(&with_tip(22.5), &limits).is_empty());
        let errors = validate_order(&with_tip(22.51), &limits);
        assert!(errors.contains(&"Maximum tip: 100% of subtotal".to_string()));
    }

    #[test]
    fn zero_subtotal_skips_tip_cap() {
        let order = OrderRequest {
            items: Some(vec![item(None, "Freebie", 0.0, 1.0)]),
            subtotal: Some(0.0),
            tip: Some(5.0),
            total: Some(5.0),
            number: Some("D001".to_string()),
            status: None,
        };
        assert!(validate_order(&order, &Limits::default()).is_empty());
    }

    #[test]
    fn total_above_maximum_is_rejected() {
        let order = OrderRequest {
            items: Some(vec![item(None, "Magnum", 6000.0, 2.0)]),
            subtotal: Some(12_000.0),
            tip: Some(0.0),
            total: Some(12_000.0),
            number: Some("E001".to_string()),
            status: None,
        };
        assert!(validate_order(&order, &Limits::default())
            .contains(&"Maximum order total: $10000".to_string()));
    }

    #[test]
    fn non_pending_status_is_rejected() {
        let order = OrderRequest {
            status: Some("delivered".to_string()),
            ..valid_order()
        };
        assert!(validate_order(&order, &Limits::default())
            .contains(&"Initial status must be \"pending\"".to_string()));
    }

    #[test]
    fn menu_check_accepts_matching_order() {
        assert!(check_against_menu(&valid_order(), &menu()).is_ok());
    }

    #[test]
    fn menu_check_ignores_items_without_id() {
        let order = OrderRequest {
            items: Some(vec![item(None, "Off-menu special", 12.0, 1.0)]),
            ..valid_order()
        };
        assert!(check_against_menu(&order, &MenuCatalog::new()).is_ok());
    }

    #[test]
    fn unknown_item_id_is_rejected_by_name() {
        let order = OrderRequest {
            items: Some(vec![item(Some("nope"), "Burger", 10.0, 1.0)]),
            ..valid_order()
        };
        let err = check_against_menu(&order, &menu()).expect_err("should reject");
        match err {
            DomainError::Validation(errors) => {
                assert_eq!(errors, vec!["Item \"Burger\" not found in the menu".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unavailable_item_is_a_failed_precondition() {
        let mut menu = menu();
        menu.insert(
            "x2",
            MenuEntry {
                name: "Soda".to_string(),
                price: 2.5,
                available: false,
            },
        );
        let err = check_against_menu(&valid_order(), &menu).expect_err("should reject");
        match err {
            DomainError::FailedPrecondition(message) => {
                assert_eq!(message, "Item \"Soda\" is no longer available");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn tampered_price_is_rejected_by_name() {
        let mut order = valid_order();
        order.items.as_mut().expect("items")[1].price = Some(3.0);
        order.subtotal = Some(23.0);
        order.total = Some(26.0);

        let err = check_against_menu(&order, &menu()).expect_err("should reject");
        match err {
            DomainError::Validation(errors) => {
                assert_eq!(errors, vec!["Incorrect price for \"Soda\"".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn price_tolerance_boundary_in_menu_check() {
        // Catalog price is 2.50: a submitted 2.51 is exactly at the
        // tolerance and passes; 2.511 is past it and is rejected.
        let mut order = valid_order();
        order.items.as_mut().expect("items")[1].price = Some(2.51);
        assert!(check_against_menu(&order, &menu()).is_ok());

        order.items.as_mut().expect("items")[1].price = Some(2.511);
        assert!(check_against_menu(&order, &menu()).is_err());
    }

    #[test]
    fn sanitize_normalizes_every_field() {
        let order = OrderRequest {
            number: Some("A100".to_string()),
            items: Some(vec![OrderItemRequest {
                id: Some("x1".to_string()),
                name: Some("B".repeat(150)),
                price: Some(10.004),
                quantity: Some(25.7),
            }]),
            subtotal: Some(22.499),
            tip: Some(3.001),
            total: Some(25.5),
            status: None,
        };
        let now = Utc::now();

        let sanitized = sanitize(&order, &Limits::default(), meta(), now);

        assert_eq!(sanitized.number, "A100");
        assert_eq!(sanitized.status, "pending");
        assert_eq!(sanitized.timestamp, now);
        assert_eq!(sanitized.subtotal, 22.5);
        assert_eq!(sanitized.tip, 3.0);
        assert_eq!(sanitized.total, 25.5);
        let item = &sanitized.items[0];
        assert_eq!(item.name.len(), 100);
        assert_eq!(item.price, 10.0);
        assert_eq!(item.quantity, 20);
    }

    #[test]
    fn sanitize_keeps_valid_values_unchanged() {
        let sanitized = sanitize(&valid_order(), &Limits::default(), meta(), Utc::now());

        assert_eq!(sanitized.items[0].quantity, 2);
        assert_eq!(sanitized.items[0].price, 10.0);
        assert_eq!(sanitized.items[1].quantity, 1);
        assert_eq!(sanitized.items[1].price, 2.5);
        assert_eq!(sanitized.total, 25.5);
    }
}
