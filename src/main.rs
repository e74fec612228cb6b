//! Main entry point for the backend server.
//!
//! Initializes logging, the session store and the actor system, then launches
//! the HTTP server with the REST API and per-game WebSocket endpoints.

use std::sync::Arc;

use actix::Actor;
use actix_web::{App, HttpServer, web};
use log::info;

use config::server::ServerConfig;
use server::fanout::{FanoutHandle, RoomHub};
use server::game_session::server::GameSessionManager;
use store::{MemoryStore, SessionRepository};

pub mod config;
mod game;
mod server;
mod store;

#[cfg(test)]
mod tests;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Default to info level, overridable through RUST_LOG.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env();

    // Connection registry and room broadcasts.
    let hub = FanoutHandle::new(RoomHub::default().start());

    // Sessions live in the in-process store; one worker actor per game.
    let repository = SessionRepository::new(Arc::new(MemoryStore::new()));
    let sessions = GameSessionManager::new(repository, Arc::new(hub.clone())).start();

    let state = web::Data::new(server::state::AppState::new(sessions, hub));

    info!("[Server] Listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "*")),
            )
            .app_data(state.clone())
            .configure(crate::server::router::config)
    })
    .bind(config.bind_addr())?
    .run()
    .await
}
