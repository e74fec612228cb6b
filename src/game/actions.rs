//! Action engine.
//!
//! The only way gameplay mutates a session. Each action validates the whole
//! chain (status, actor, target, distance, AP) before its first write, so a
//! rejected action leaves the session exactly as it was.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::game::board::chebyshev;
use crate::game::error::GameError;
use crate::game::session::Session;
use crate::game::systems::{combat, economy, movement};
use crate::game::types::{ActionRecord, PlayerId, PlayerSnapshot, Position, SessionStatus};

fn default_amount() -> u32 {
    1
}

/// A gameplay request from one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    Move { x: i64, y: i64 },
    Shoot { x: i64, y: i64 },
    IncreaseRange,
    TransferAp {
        x: i64,
        y: i64,
        #[serde(default = "default_amount")]
        amount: u32,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Move { .. } => "move",
            Action::Shoot { .. } => "shoot",
            Action::IncreaseRange => "increaseRange",
            Action::TransferAp { .. } => "transferAp",
        }
    }
}

/// Validate and apply `action` for `actor`, appending it to the history.
pub fn apply(session: &mut Session, actor: PlayerId, action: &Action) -> Result<ActionRecord, GameError> {
    let details = match *action {
        Action::Move { x, y } => movement::move_player(session, actor, x, y)?,
        Action::Shoot { x, y } => combat::shoot(session, actor, x, y)?,
        Action::IncreaseRange => economy::increase_range(session, actor)?,
        Action::TransferAp { x, y, amount } => economy::transfer_ap(session, actor, x, y, amount)?,
    };

    let record = ActionRecord {
        player_id: actor,
        details,
        timestamp: Utc::now(),
    };
    session.action_history.push(record.clone());
    session.check_last_survivor();
    debug_assert_eq!(session.check_invariants(), Ok(()));
    Ok(record)
}

/// Find the acting player on the board. The board, not the roster, decides
/// where the actor stands.
pub(crate) fn locate_actor(session: &Session, actor: PlayerId) -> Result<(Position, PlayerSnapshot), GameError> {
    session.require_status(SessionStatus::Active)?;
    if !session.is_member(actor) {
        return Err(GameError::NotMember(actor));
    }
    session
        .board
        .find_player(actor)
        .filter(|(_, snapshot)| snapshot.is_alive())
        .map(|(pos, snapshot)| (pos, snapshot.clone()))
        .ok_or(GameError::ActorEliminated(actor))
}

/// Living player at `pos` other than the actor.
pub(crate) fn living_target(session: &Session, pos: Position, actor: PlayerId) -> Result<PlayerSnapshot, GameError> {
    let target = session
        .board
        .occupant(pos)
        .and_then(|occupant| occupant.living_player())
        .ok_or(GameError::NoLivingTarget { x: pos.x, y: pos.y })?;
    if target.player_id == actor {
        return Err(GameError::SelfTarget);
    }
    Ok(target.clone())
}

pub(crate) fn check_distance(from: Position, to: Position, min: usize, range: u32) -> Result<(), GameError> {
    let distance = chebyshev(from, to);
    let max = range as usize;
    if distance < min || distance > max {
        return Err(GameError::OutOfRange { distance, min, max });
    }
    Ok(())
}

pub(crate) fn require_ap(snapshot: &PlayerSnapshot, required: u32) -> Result<(), GameError> {
    if snapshot.ap < required {
        return Err(GameError::InsufficientAp {
            required,
            available: snapshot.ap,
        });
    }
    Ok(())
}
