//! Player movement system.
//!
//! This module handles moving players on the board.

use crate::game::actions::{check_distance, locate_actor, require_ap};
use crate::game::error::GameError;
use crate::game::session::Session;
use crate::game::types::{ActionDetails, Occupant, PlayerId};

/// Move the actor to `(x, y)`: an empty interior cell within range, diagonals allowed.
pub fn move_player(session: &mut Session, actor: PlayerId, x: i64, y: i64) -> Result<ActionDetails, GameError> {
    let (from, mut snapshot) = locate_actor(session, actor)?;
    let to = session.board.position(x, y)?;
    if !session.board.is_interior(to) {
        return Err(GameError::EdgeCell { x: to.x, y: to.y });
    }
    if !session.board.occupant(to).is_some_and(Occupant::is_empty) {
        return Err(GameError::CellOccupied { x: to.x, y: to.y });
    }
    check_distance(from, to, 1, snapshot.range)?;
    let cost = session.settings.move_cost;
    require_ap(&snapshot, cost)?;

    snapshot.ap -= cost;
    session.board.set_occupant(from, Occupant::Empty);
    session.commit_snapshot(to, snapshot);

    Ok(ActionDetails::Move { from, to, ap_spent: cost })
}
