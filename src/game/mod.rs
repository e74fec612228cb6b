//! Game domain: board model, session state machine and action engine.
//!
//! Nothing in here knows about actors, sockets or the store; the server
//! layer loads a `Session`, hands it to these functions and persists the result.

pub mod actions;
pub mod board;
pub mod error;
pub mod placement;
pub mod session;
pub mod systems;
pub mod types;
