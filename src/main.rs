use actix_web::{web, App, HttpServer};
use clap::Parser;
use log::info;

mod config;
mod connection;
mod error;
mod models;
mod rooms;
mod routes;
mod websocket;

use config::Config;
use models::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = Config::parse();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(config.log_level.as_str()));

    let (host, port) = config.bind_addr();
    info!("Starting xiangqi relay server at ws://{}:{}/ws", host, port);
    if let Some(dir) = &config.static_dir {
        info!("Serving static client from {}", dir.display());
    }

    // Create shared application state
    let app_state = web::Data::new(AppState::new());
    let heartbeat = web::Data::new(config.heartbeat());
    let static_dir = config.static_dir.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(heartbeat.clone())
            .configure(routes::configure_routes)
            .configure(|cfg| routes::configure_static(cfg, static_dir.as_deref()))
    })
    .bind((host, port))?
    .run()
    .await
}
