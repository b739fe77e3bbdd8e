use std::env;
use std::sync::Arc;

use chrono::{Months, Utc};
use dotenvy::dotenv;
use order_gate::application::order_service::OrderService;
use order_gate::config::{
    Limits, RateLimitConfig, PURGE_BATCH_SIZE, PURGE_INTERVAL, RETENTION_MONTHS, SWEEP_INTERVAL,
};
use order_gate::domain::ports::OrderStore;
use order_gate::domain::rate_limit::RateLimiter;
use order_gate::infrastructure::order_store::DieselOrderStore;
use order_gate::{build_server, create_pool, run_migrations};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .expect("PORT must be a valid number");

    let pool = create_pool(&database_url);
    run_migrations(&pool);

    let limiter = Arc::new(RateLimiter::new(RateLimitConfig::default()));
    let store = DieselOrderStore::new(pool.clone());
    let service = OrderService::new(store.clone(), limiter.clone(), Limits::default());

    // Drop idle rate-limit records every few minutes; bounds memory for
    // one-off identities.
    {
        let limiter = limiter.clone();
        actix_web::rt::spawn(async move {
            let mut tick = tokio::time::interval(SWEEP_INTERVAL);
            tick.tick().await; // the first tick fires immediately
            loop {
                tick.tick().await;
                limiter.sweep();
            }
        });
    }

    // Daily retention pass: delivered orders older than six months are
    // deleted in bounded batches per establishment.
    actix_web::rt::spawn(async move {
        let mut tick = tokio::time::interval(PURGE_INTERVAL);
        tick.tick().await;
        loop {
            tick.tick().await;
            let store = store.clone();
            let result = actix_web::web::block(move || {
                let cutoff = Utc::now()
                    .checked_sub_months(Months::new(RETENTION_MONTHS))
                    .expect("retention cutoff in range");
                store.purge_delivered_before(cutoff, PURGE_BATCH_SIZE)
            })
            .await;
            match result {
                Ok(Ok(0)) => {}
                Ok(Ok(deleted)) => log::info!("Retention pass removed {deleted} orders"),
                Ok(Err(e)) => log::error!("Retention pass failed: {e}"),
                Err(e) => log::error!("Retention pass did not run: {e}"),
            }
        }
    });

    log::info!("Starting server at http://{}:{}", host, port);

    build_server(service, &host, port)?.await
}
