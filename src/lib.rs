pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::order_service::OrderService;
use application::product_service::ProductService;
use application::user_service::UserService;
use domain::ports::Storage;
use handlers::ApiDoc;
use infrastructure::storage::DieselStorage;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Wraps `storage` in the application services and registers them, together
/// with the routes, on an actix-web `ServiceConfig`.
pub fn configure_app<S: Storage>(storage: S) -> impl Fn(&mut web::ServiceConfig) + Clone {
    let orders = web::Data::new(OrderService::new(storage.clone()));
    let products = web::Data::new(ProductService::new(storage.clone()));
    let users = web::Data::new(UserService::new(storage));

    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(orders.clone())
            .app_data(products.clone())
            .app_data(users.clone());
        handlers::configure::<S>(cfg);
    }
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let configure = configure_app(DieselStorage::new(pool));
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(configure.clone())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
