//! Shooting.

use log::info;

use crate::game::actions::{check_distance, living_target, locate_actor, require_ap};
use crate::game::error::GameError;
use crate::game::session::Session;
use crate::game::types::{ActionDetails, PlayerId};

/// Shoot the living player standing on `(x, y)`.
///
/// A target brought to zero hearts is taken off the board.
pub fn shoot(session: &mut Session, actor: PlayerId, x: i64, y: i64) -> Result<ActionDetails, GameError> {
    let (from, mut shooter) = locate_actor(session, actor)?;
    let at = session.board.position(x, y)?;
    let mut target = living_target(session, at, actor)?;
    check_distance(from, at, 1, shooter.range)?;
    let cost = session.settings.shoot_cost;
    require_ap(&shooter, cost)?;

    let damage = session.settings.damage_per_shot;
    shooter.ap -= cost;
    session.commit_snapshot(from, shooter);

    target.hearts = target.hearts.saturating_sub(damage);
    let target_id = target.player_id;
    let target_killed = target.hearts == 0;
    if target_killed {
        info!("[Combat] Player {} eliminated by {} in game {}", target_id, actor, session.id);
        session.remove_from_board(at, target);
        session.record_kill(actor);
    } else {
        session.commit_snapshot(at, target);
    }

    Ok(ActionDetails::Shoot {
        target: target_id,
        position: at,
        damage,
        target_killed,
        ap_spent: cost,
    })
}
