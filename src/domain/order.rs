use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// Untrusted order payload as submitted by a client.
///
/// Every field is optional at the edge so the validator can report the
/// complete list of defects in one pass instead of failing on the first
/// missing field.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OrderRequest {
    /// Pickup number in the form of one uppercase letter and three digits,
    /// e.g. "A123".
    pub number: Option<String>,
    pub items: Option<Vec<OrderItemRequest>>,
    pub subtotal: Option<f64>,
    pub tip: Option<f64>,
    pub total: Option<f64>,
    /// If present, must be "pending"; clients may not pre-advance an order.
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    /// Menu item id. Items without an id (ad-hoc lines) skip the catalog
    /// cross-checks.
    pub id: Option<String>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<f64>,
}

/// Server-normalized, trusted representation of an accepted order. Built
/// exactly once by the validator; later status transitions happen outside
/// this service.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedOrder {
    pub number: String,
    pub items: Vec<SanitizedItem>,
    pub subtotal: f64,
    pub tip: f64,
    pub total: f64,
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub meta: OrderMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedItem {
    pub id: Option<String>,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

/// Provenance attached to accepted orders for auditing.
#[derive(Debug, Clone, Serialize)]
pub struct OrderMeta {
    pub created_via: String,
    /// Opaque correlation tag derived from the caller identity (truncated
    /// base64). An audit aid, not a privacy mechanism.
    pub identity_hash: Option<String>,
    pub user_agent: Option<String>,
}

/// A tenant owning its own menu and orders.
#[derive(Debug, Clone)]
pub struct Establishment {
    pub id: String,
    pub name: String,
    pub orders_open: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntry {
    pub name: String,
    pub price: f64,
    pub available: bool,
}

/// Point-in-time snapshot of an establishment's menu, keyed by item id.
///
/// Fetched immediately before catalog cross-validation; a menu edit landing
/// between the snapshot and the order commit is an accepted benign race.
#[derive(Debug, Clone, Default)]
pub struct MenuCatalog {
    entries: HashMap<String, MenuEntry>,
}

impl MenuCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, entry: MenuEntry) {
        self.entries.insert(id.into(), entry);
    }

    pub fn get(&self, id: &str) -> Option<&MenuEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, MenuEntry)> for MenuCatalog {
    fn from_iter<I: IntoIterator<Item = (String, MenuEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Status fields exposed by the order-status lookup.
#[derive(Debug, Clone)]
pub struct OrderStatusView {
    pub order_id: Uuid,
    pub number: String,
    pub status: String,
    pub total: f64,
    pub timestamp: DateTime<Utc>,
}

/// Returned to the caller when an order is accepted.
#[derive(Debug, Clone)]
pub struct OrderReceipt {
    pub order_id: Uuid,
    pub order_number: String,
    pub total: f64,
    /// Requests left in the caller's current rate-limit window.
    pub remaining: u32,
}
