use base64::Engine;
use chrono::Utc;
use uuid::Uuid;

use crate::config::Limits;
use crate::domain::errors::DomainError;
use crate::domain::order::{OrderMeta, OrderReceipt, OrderRequest, OrderStatusView};
use crate::domain::ports::OrderStore;
use crate::domain::rate_limit::RequestGate;
use crate::domain::validation::{check_against_menu, sanitize, validate_order};

/// Orchestrates order creation: identity throttling, establishment checks,
/// structural validation, catalog cross-validation, then persistence of the
/// sanitized record.
pub struct OrderService<S, G> {
    store: S,
    gate: G,
    limits: Limits,
}

impl<S: OrderStore, G: RequestGate> OrderService<S, G> {
    pub fn new(store: S, gate: G, limits: Limits) -> Self {
        Self { store, gate, limits }
    }

    /// Runs the full gate. `identity` is supplied by the calling layer
    /// (network origin or authenticated subject); this service is agnostic
    /// to how it was derived.
    pub fn create_order(
        &self,
        establishment_id: &str,
        identity: &str,
        user_agent: Option<&str>,
        order: OrderRequest,
    ) -> Result<OrderReceipt, DomainError> {
        if establishment_id.trim().is_empty() {
            return Err(DomainError::Validation(vec![
                "Establishment id required".to_string(),
            ]));
        }

        // The limiter is consulted before any store access so a flooding
        // client never reaches the database.
        let decision = self.gate.check(&format!("{identity}:{establishment_id}"));
        if !decision.allowed {
            return Err(DomainError::RateLimited {
                retry_after: decision.retry_after.unwrap_or(0),
            });
        }

        let establishment = self
            .store
            .find_establishment(establishment_id)?
            .ok_or_else(|| DomainError::NotFound("Establishment not found".to_string()))?;
        if !establishment.orders_open {
            return Err(DomainError::FailedPrecondition(
                "Orders are currently closed".to_string(),
            ));
        }

        let errors = validate_order(&order, &self.limits);
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        let menu = self.store.menu_snapshot(establishment_id)?;
        check_against_menu(&order, &menu)?;

        let meta = OrderMeta {
            created_via: "order-gate".to_string(),
            identity_hash: Some(hash_identity(identity)),
            user_agent: user_agent.map(|ua| ua.chars().take(100).collect()),
        };
        let sanitized = sanitize(&order, &self.limits, meta, Utc::now());
        let order_id = self.store.insert_order(establishment_id, &sanitized)?;

        log::info!(
            "Order {} created for {} (id: {})",
            sanitized.number,
            establishment_id,
            order_id
        );

        Ok(OrderReceipt {
            order_id,
            order_number: sanitized.number,
            total: sanitized.total,
            remaining: decision.remaining,
        })
    }

    /// Read-through status lookup; no gating beyond existence checks.
    pub fn order_status(
        &self,
        establishment_id: &str,
        order_id: Uuid,
    ) -> Result<OrderStatusView, DomainError> {
        if establishment_id.trim().is_empty() {
            return Err(DomainError::Validation(vec![
                "Establishment id required".to_string(),
            ]));
        }
        self.store
            .find_order(establishment_id, order_id)?
            .ok_or_else(|| DomainError::NotFound("Order not found".to_string()))
    }
}

/// Short audit tag for the caller identity: base64, truncated to ten
/// characters. Deliberately lossy.
fn hash_identity(identity: &str) -> String {
    base64::engine::general_purpose::STANDARD
        .encode(identity)
        .chars()
        .take(10)
        .collect()
}
