use dotenvy::dotenv;
use std::net::TcpListener;
use std::sync::Arc;

use inventory_service::infrastructure::memory::InMemoryStore;
use inventory_service::{build_server, AppState, Config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let store = match &config.snapshot_path {
        Some(path) => InMemoryStore::with_snapshot(path)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?,
        None => InMemoryStore::new(),
    };
    let state = AppState::new(Arc::new(store));

    let listener = TcpListener::bind((config.host.as_str(), config.port))?;
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, listener)?.await
}
