pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::order_service::OrderService;
use domain::rate_limit::RateLimiter;
use infrastructure::order_store::DieselOrderStore;

pub use db::{create_pool, DbPool};

/// Concrete service wired for production: Postgres store, in-process
/// fixed-window limiter.
pub type AppOrderService = OrderService<DieselOrderStore, Arc<RateLimiter>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(handlers::orders::create_order, handlers::orders::get_order_status),
    components(schemas(
        domain::order::OrderRequest,
        domain::order::OrderItemRequest,
        handlers::orders::CreateOrderResponse,
        handlers::orders::OrderStatusResponse,
    ))
)]
pub struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    service: AppOrderService,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(service);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
            .service(
                web::scope("/establishments/{establishment_id}")
                    .route("/orders", web::post().to(handlers::orders::create_order))
                    .route(
                        "/orders/{order_id}",
                        web::get().to(handlers::orders::get_order_status),
                    ),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
