/// Main configuration module.
/// 
/// Re-exports submodules for gameplay defaults and server settings.
pub mod game;
pub mod server;
