use std::time::Duration;

/// Structural and monetary bounds enforced on every submitted order.
///
/// These are policy knobs, not protocol requirements; tests construct them
/// directly and deployments may override individual fields before building
/// the service.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum number of line items in a single order.
    pub max_items_per_order: usize,
    /// Maximum quantity for a single line item.
    pub max_quantity_per_item: u32,
    /// Tip cap as a percentage of the subtotal.
    pub max_tip_percentage: f64,
    /// Maximum accepted order total.
    pub max_order_total: f64,
    /// Minimum accepted order total (zero: free orders are allowed).
    pub min_order_total: f64,
    /// Absolute tolerance for all monetary cross-checks, absorbing
    /// floating-point rounding on the client side.
    pub amount_tolerance: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_items_per_order: 50,
            max_quantity_per_item: 20,
            max_tip_percentage: 100.0,
            max_order_total: 10_000.0,
            min_order_total: 0.0,
            amount_tolerance: 0.01,
        }
    }
}

/// Fixed-window rate-limit policy: `max_requests` per identity per `window`.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(60),
        }
    }
}

/// How often idle rate-limit records are swept.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// How often the retention pass runs.
pub const PURGE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Delivered orders older than this many months are eligible for deletion.
pub const RETENTION_MONTHS: u32 = 6;

/// Upper bound on deletions per establishment per retention pass.
pub const PURGE_BATCH_SIZE: i64 = 500;
