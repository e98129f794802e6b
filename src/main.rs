use std::sync::Arc;

use dotenvy::dotenv;
use fulfillment_service::application::order_service::OrderService;
use fulfillment_service::config::AppConfig;
use fulfillment_service::infrastructure::order_repo::DieselOrderRepository;
use fulfillment_service::infrastructure::product_catalog::DieselProductCatalog;
use fulfillment_service::{build_server, create_pool, run_migrations, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let pool = create_pool(&config.database_url, &config.pool).map_err(|e| {
        log::error!("Failed to create DB pool: {}", e);
        std::io::Error::other(e)
    })?;
    run_migrations(&pool).map_err(|e| {
        log::error!("Failed to run database migrations: {}", e);
        std::io::Error::other(e)
    })?;

    let service = OrderService::new(
        Arc::new(DieselOrderRepository::new(pool.clone())),
        Arc::new(DieselProductCatalog::new(pool)),
    );
    let state = AppState {
        service: Arc::new(service),
        request_timeout: config.request_timeout,
    };

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await
}
