//! Server layer root module.
//!
//! This module organizes the backend server components:
//! - Application state shared by handlers
//! - HTTP/WebSocket routing and the REST handlers
//! - Event fan-out (rooms and topics)
//! - Game session orchestration (one worker actor per game, player sockets)

pub mod fanout;
pub mod game_session;
pub mod http;
pub mod router;
pub mod state;
pub mod ws_error;
