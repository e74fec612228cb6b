//! AP spending that does not move anyone: range upgrades and transfers.

use crate::game::actions::{check_distance, living_target, locate_actor, require_ap};
use crate::game::error::GameError;
use crate::game::session::Session;
use crate::game::types::{ActionDetails, PlayerId};

/// Spend the upgrade cost to extend the actor's range by one.
pub fn increase_range(session: &mut Session, actor: PlayerId) -> Result<ActionDetails, GameError> {
    let (pos, mut snapshot) = locate_actor(session, actor)?;
    let cost = session.settings.upgrade_cost;
    require_ap(&snapshot, cost)?;

    snapshot.ap -= cost;
    snapshot.range = snapshot.range.saturating_add(1);
    let new_range = snapshot.range;
    session.commit_snapshot(pos, snapshot);

    Ok(ActionDetails::IncreaseRange { new_range, ap_spent: cost })
}

/// Give `amount` AP to the living player on `(x, y)`.
pub fn transfer_ap(
    session: &mut Session,
    actor: PlayerId,
    x: i64,
    y: i64,
    amount: u32,
) -> Result<ActionDetails, GameError> {
    let (from, mut giver) = locate_actor(session, actor)?;
    if amount == 0 {
        return Err(GameError::InvalidAmount);
    }
    let at = session.board.position(x, y)?;
    let mut receiver = living_target(session, at, actor)?;
    check_distance(from, at, 1, giver.range)?;
    require_ap(&giver, amount)?;
    let received = receiver.ap.checked_add(amount).ok_or(GameError::InvalidAmount)?;

    giver.ap -= amount;
    receiver.ap = received;
    let target = receiver.player_id;
    session.commit_snapshot(from, giver);
    session.commit_snapshot(at, receiver);

    Ok(ActionDetails::TransferAp {
        target,
        position: at,
        amount,
    })
}

#[cfg(test)]
mod tests {
    use crate::game::actions::fixtures::active_session;
    use crate::game::actions::{Action, apply};
    use crate::game::error::GameError;
    use crate::game::types::Position;

    fn p(x: usize, y: usize) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn increase_range_costs_three() {
        let (mut session, ids) = active_session(&[(p(5, 5), 4, 1, 3), (p(9, 9), 0, 1, 3)]);
        apply(&mut session, ids[0], &Action::IncreaseRange).unwrap();
        let me = session.player(ids[0]).unwrap();
        assert_eq!((me.ap, me.range), (1, 2));

        let err = apply(&mut session, ids[0], &Action::IncreaseRange).unwrap_err();
        assert!(matches!(err, GameError::InsufficientAp { required: 3, available: 1 }));
        assert_eq!(session.player(ids[0]).unwrap().range, 2);
    }

    #[test]
    fn transfer_moves_ap_between_players() {
        let (mut session, ids) = active_session(&[(p(5, 5), 4, 2, 3), (p(7, 7), 0, 1, 3)]);
        apply(&mut session, ids[0], &Action::TransferAp { x: 7, y: 7, amount: 3 }).unwrap();
        assert_eq!(session.player(ids[0]).unwrap().ap, 1);
        assert_eq!(session.player(ids[1]).unwrap().ap, 3);
        let (_, receiver) = session.board.find_player(ids[1]).unwrap();
        assert_eq!(receiver.ap, 3);
    }

    #[test]
    fn transfer_checks_amount_range_and_balance() {
        let (mut session, ids) = active_session(&[(p(5, 5), 2, 1, 3), (p(6, 5), 0, 1, 3), (p(9, 9), 0, 1, 3)]);
        let before = session.clone();
        assert!(matches!(
            apply(&mut session, ids[0], &Action::TransferAp { x: 6, y: 5, amount: 0 }),
            Err(GameError::InvalidAmount)
        ));
        assert!(matches!(
            apply(&mut session, ids[0], &Action::TransferAp { x: 9, y: 9, amount: 1 }),
            Err(GameError::OutOfRange { .. })
        ));
        assert!(matches!(
            apply(&mut session, ids[0], &Action::TransferAp { x: 6, y: 5, amount: 5 }),
            Err(GameError::InsufficientAp { required: 5, available: 2 })
        ));
        assert!(matches!(
            apply(&mut session, ids[0], &Action::TransferAp { x: 4, y: 4, amount: 1 }),
            Err(GameError::NoLivingTarget { x: 4, y: 4 })
        ));
        assert_eq!(session, before);
    }
}
