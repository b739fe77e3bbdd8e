use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use std::env;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// Build the connection pool. `DATABASE_MAX_CONNECTIONS` caps the pool size
/// (default 10); invalid or non-positive values fall back to the default.
pub fn create_pool(database_url: &str) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .max_size(max_pool_size(env::var("DATABASE_MAX_CONNECTIONS").ok()))
        .build(manager)
        .expect("Failed to create database connection pool")
}

fn max_pool_size(raw: Option<String>) -> u32 {
    raw.and_then(|v| v.parse().ok())
        .filter(|&n| n > 0)
        .unwrap_or(10)
}
