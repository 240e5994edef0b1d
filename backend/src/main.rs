mod config;
mod error;
mod ingest;
mod services;
mod state;
mod store;

use crate::config::Config;
use crate::state::AppState;
use crate::store::SqliteStore;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info};
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        error!("configuration error: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let store = SqliteStore::open(&config.database_path).map_err(|e| {
        error!("cannot open {}: {}", config.database_path.display(), e);
        io::Error::other(e)
    })?;
    info!("Document store opened at {}", config.database_path.display());

    let state = AppState {
        store: Arc::new(store),
        policy: config.policy.clone(),
        max_upload_bytes: config.max_upload_bytes,
    };
    info!("Duplicate policy: {}", state.policy.name());

    let url = format!("http://{}:{}", config.host, config.port);
    info!("Server running at {}", url);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(services::topics::configure_routes())
            .default_service(web::route().to(services::form::asset))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
