use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order::OrderRequest;
use crate::errors::AppError;
use crate::AppOrderService;

// ── Response DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: Uuid,
    pub order_number: String,
    pub total: f64,
    /// Requests left in the caller's current rate-limit window.
    pub remaining: u32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusResponse {
    pub order_id: Uuid,
    pub number: String,
    pub status: String,
    pub total: f64,
    pub timestamp: String,
}

/// Rate-limit identity of the caller: the network origin, or "anonymous"
/// when none is available. Derived here so the service stays agnostic to how
/// identity is determined.
///
/// `realip_remote_addr` honors `Forwarded`/`X-Forwarded-For`, which assumes
/// a trusted reverse proxy that strips client-supplied forwarding headers.
/// Exposed directly to the internet, deploy without a proxy and swap this
/// for `peer_addr`, or the rate limit can be dodged by rotating the header.
fn caller_identity(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("anonymous")
        .to_string()
}

fn user_agent(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /establishments/{establishment_id}/orders
///
/// Runs the order gate (rate limit, structural validation, menu
/// cross-checks) and persists the sanitized order on success.
#[utoipa::path(
    post,
    path = "/establishments/{establishment_id}/orders",
    params(
        ("establishment_id" = String, Path, description = "Establishment id"),
    ),
    request_body = OrderRequest,
    responses(
        (status = 201, description = "Order accepted", body = CreateOrderResponse),
        (status = 400, description = "Validation failed; body lists every defect"),
        (status = 404, description = "Establishment not found"),
        (status = 409, description = "Orders closed or item unavailable"),
        (status = 429, description = "Rate limit exceeded; Retry-After set"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    req: HttpRequest,
    service: web::Data<AppOrderService>,
    path: web::Path<String>,
    body: web::Json<OrderRequest>,
) -> Result<HttpResponse, AppError> {
    let establishment_id = path.into_inner();
    let identity = caller_identity(&req);
    let user_agent = user_agent(&req);
    let order = body.into_inner();

    let receipt = web::block(move || {
        service.create_order(&establishment_id, &identity, user_agent.as_deref(), order)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CreateOrderResponse {
        success: true,
        order_id: receipt.order_id,
        order_number: receipt.order_number,
        total: receipt.total,
        remaining: receipt.remaining,
    }))
}

/// GET /establishments/{establishment_id}/orders/{order_id}
///
/// Read-through status lookup for a previously accepted order.
#[utoipa::path(
    get,
    path = "/establishments/{establishment_id}/orders/{order_id}",
    params(
        ("establishment_id" = String, Path, description = "Establishment id"),
        ("order_id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderStatusResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order_status(
    service: web::Data<AppOrderService>,
    path: web::Path<(String, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (establishment_id, order_id) = path.into_inner();

    let status = web::block(move || service.order_status(&establishment_id, order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderStatusResponse {
        order_id: status.order_id,
        number: status.number,
        status: status.status,
        total: status.total,
        timestamp: status.timestamp.to_rfc3339(),
    }))
}
