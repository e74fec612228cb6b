//! HTTP and WebSocket routing configuration.
//!
//! REST endpoints live under `/api/games`; each game also has a WebSocket
//! endpoint handled by a `PlayerSocket` actor.

use actix_web::web;

use crate::server::game_session::socket::ws_game;
use crate::server::http;

/// Configure the application's HTTP/WebSocket routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(http::json_config())
        .app_data(http::path_config())
        .app_data(http::query_config())
        .service(
            web::scope("/api/games")
                .route("", web::post().to(http::create_game))
                .route("", web::get().to(http::list_games))
                .route("/{id}", web::get().to(http::get_game))
                .route("/{id}", web::delete().to(http::delete_game))
                .route("/{id}/join", web::post().to(http::join_game))
                .route("/{id}/leave", web::post().to(http::leave_game))
                .route("/{id}/start", web::post().to(http::start_game))
                .route("/{id}/end", web::post().to(http::end_game))
                .route("/{id}/move", web::post().to(http::move_player))
                .route("/{id}/shoot", web::post().to(http::shoot))
                .route("/{id}/upgrade", web::post().to(http::increase_range))
                .route("/{id}/trade", web::post().to(http::transfer_ap))
                .route("/{id}/chat", web::post().to(http::send_chat))
                .route("/{id}/history", web::get().to(http::game_history)),
        )
        .service(web::resource("/ws/game/{game_id}").to(ws_game));
}
