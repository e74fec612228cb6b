//! Application state for the backend server.
//!
//! Holds the game session manager's address and the room hub handle, shared
//! between HTTP and WebSocket handlers.

use actix::Addr;

use crate::server::fanout::FanoutHandle;
use crate::server::game_session::server::GameSessionManager;

/// Shared application state, injected into HTTP/WebSocket handlers.
pub struct AppState {
    /// Routes commands to the per-game workers.
    pub sessions: Addr<GameSessionManager>,
    /// Live connection registry used by the WebSocket endpoint.
    pub hub: FanoutHandle,
}

impl AppState {
    pub fn new(sessions: Addr<GameSessionManager>, hub: FanoutHandle) -> Self {
        AppState { sessions, hub }
    }
}
