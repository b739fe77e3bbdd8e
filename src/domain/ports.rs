use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{Establishment, MenuCatalog, OrderStatusView, SanitizedOrder};

/// Persistence seam of the order gate.
///
/// The backing store owns establishments and menus; this service only reads
/// them and appends accepted orders. Implementations are synchronous (the
/// HTTP layer runs them through `web::block`).
pub trait OrderStore: Send + Sync + 'static {
    fn find_establishment(&self, id: &str) -> Result<Option<Establishment>, DomainError>;

    /// Point-in-time snapshot of the establishment's menu. No locking ties
    /// this read to a later order insert; staleness is accepted.
    fn menu_snapshot(&self, establishment_id: &str) -> Result<MenuCatalog, DomainError>;

    fn insert_order(
        &self,
        establishment_id: &str,
        order: &SanitizedOrder,
    ) -> Result<Uuid, DomainError>;

    fn find_order(
        &self,
        establishment_id: &str,
        order_id: Uuid,
    ) -> Result<Option<OrderStatusView>, DomainError>;

    /// Deletes delivered orders older than `cutoff`, at most `batch_size`
    /// per establishment per call. Returns the number of orders removed.
    fn purge_delivered_before(
        &self,
        cutoff: DateTime<Utc>,
        batch_size: i64,
    ) -> Result<usize, DomainError>;
}
