//! Per-action rules used by the action engine.

pub mod combat;
pub mod economy;
pub mod movement;
