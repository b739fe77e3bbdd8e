use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::{establishments, menu_items, order_items, orders};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = establishments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EstablishmentRow {
    pub id: String,
    pub name: String,
    pub orders_open: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = establishments)]
pub struct NewEstablishmentRow {
    pub id: String,
    pub name: String,
    pub orders_open: bool,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = menu_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MenuItemRow {
    pub establishment_id: String,
    pub id: String,
    pub name: String,
    pub price: f64,
    pub available: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = menu_items)]
pub struct NewMenuItemRow {
    pub establishment_id: String,
    pub id: String,
    pub name: String,
    pub price: f64,
    pub available: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub establishment_id: String,
    pub number: String,
    pub subtotal: f64,
    pub tip: f64,
    pub total: f64,
    pub status: String,
    pub created_via: String,
    pub identity_hash: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub establishment_id: String,
    pub number: String,
    pub subtotal: f64,
    pub tip: f64,
    pub total: f64,
    pub status: String,
    pub created_via: String,
    pub identity_hash: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Option<String>,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Option<String>,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
}
