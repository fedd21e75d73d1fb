use std::sync::Arc;

use till_server::core::{Config, ServerState};
use till_server::credit::InMemoryCreditLedger;
use till_server::persistence::BillingStore;
use till_server::utils::logger;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Environment (dotenv, logging)
    dotenv::dotenv().ok();
    let config = Config::from_env();
    logger::init_logger_with_file(Some(&config.log_level), Some(&config.work_dir));

    tracing::info!("Till server starting...");

    // 2. Durable store under the working directory
    std::fs::create_dir_all(&config.work_dir)?;
    let store = BillingStore::open(config.db_path())?;

    // 3. Shared state: registry, persistence worker, event bus
    let credit = Arc::new(InMemoryCreditLedger::new());
    let http_port = config.http_port;
    let state = ServerState::new(config, store, credit)?;

    // 4. HTTP server
    let app = till_server::api::router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], http_port));
    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
