//! Initial placement of players.
//!
//! Interior cells are shuffled once; each player, in roster order, takes the
//! first remaining candidate that does not touch anyone placed before them.

use log::warn;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::game::board::{Board, is_adjacent};
use crate::game::error::GameError;
use crate::game::types::{PlayerId, Position};

/// Pick a spawn cell for every player in `roster`, in order.
///
/// Fails with `PlacementFailed` naming the first player that could not be
/// spaced out; nothing is placed in that case.
pub fn plan<R: Rng + ?Sized>(
    board: &Board,
    roster: &[PlayerId],
    rng: &mut R,
) -> Result<Vec<(PlayerId, Position)>, GameError> {
    let mut candidates = board.interior_positions();
    candidates.shuffle(rng);

    let mut assigned: Vec<(PlayerId, Position)> = Vec::with_capacity(roster.len());
    for &player_id in roster {
        let pick = candidates
            .iter()
            .position(|candidate| !assigned.iter().any(|(_, taken)| is_adjacent(*candidate, *taken)));
        match pick {
            Some(index) => {
                let pos = candidates.remove(index);
                assigned.push((player_id, pos));
            }
            None => {
                warn!(
                    "[Placement] No free spaced cell for player {} on a {}x{} board ({} already placed)",
                    player_id,
                    board.size(),
                    board.size(),
                    assigned.len()
                );
                return Err(GameError::PlacementFailed { player: player_id });
            }
        }
    }
    Ok(assigned)
}
