//! Game session aggregate.
//!
//! Owns the board, the roster and the status machine
//! `waiting -> active -> completed`. The board is authoritative for player
//! state; every write goes through `commit_snapshot` / `remove_from_board`
//! so the roster never drifts from the cells.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::game::{
    MAX_BOARD_SIZE, MAX_CHAT_LEN, MAX_NAME_LEN, MAX_PLAYERS, MIN_BOARD_SIZE, MIN_NAME_LEN,
    MIN_PLAYERS,
};
use crate::game::board::Board;
use crate::game::error::GameError;
use crate::game::placement;
use crate::game::types::{
    ActionRecord, ChatMessage, GameSettings, Occupant, Player, PlayerId, PlayerSnapshot,
    Position, SessionId, SessionStatus,
};

/// Parameters of a new game.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub name: String,
    pub max_players: usize,
    pub board_size: usize,
    pub settings: GameSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub status: SessionStatus,
    pub board_size: usize,
    pub board: Board,
    pub players: Vec<Player>,
    pub max_players: usize,
    pub created_by: PlayerId,
    pub action_history: Vec<ActionRecord>,
    pub chat_history: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub settings: GameSettings,
    pub winner: Option<PlayerId>,
}

impl Session {
    /// Create a waiting game with an empty board; the creator is auto-joined.
    pub fn create(params: NewSession, creator: PlayerId) -> Result<Self, GameError> {
        let name = params.name.trim().to_string();
        let name_len = name.chars().count();
        if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&name_len) {
            return Err(GameError::invalid_input(
                "name",
                format!("must be {MIN_NAME_LEN} to {MAX_NAME_LEN} characters"),
            ));
        }
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&params.max_players) {
            return Err(GameError::invalid_input(
                "maxPlayers",
                format!("must be between {MIN_PLAYERS} and {MAX_PLAYERS}"),
            ));
        }
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&params.board_size) {
            return Err(GameError::invalid_input(
                "boardSize",
                format!("must be between {MIN_BOARD_SIZE} and {MAX_BOARD_SIZE}"),
            ));
        }
        let settings = params.settings;
        if settings.default_range == 0 {
            return Err(GameError::invalid_input("settings.defaultRange", "must be at least 1"));
        }
        if settings.default_hearts == 0 {
            return Err(GameError::invalid_input("settings.defaultHearts", "must be at least 1"));
        }
        if settings.damage_per_shot == 0 {
            return Err(GameError::invalid_input("settings.damagePerShot", "must be at least 1"));
        }

        let creator_entry = Player::new(creator, &settings);
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            status: SessionStatus::Waiting,
            board_size: params.board_size,
            board: Board::new(params.board_size),
            players: vec![creator_entry],
            max_players: params.max_players,
            created_by: creator,
            action_history: Vec::new(),
            chat_history: Vec::new(),
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
            settings,
            winner: None,
        })
    }

    pub fn is_member(&self, player_id: PlayerId) -> bool {
        self.players.iter().any(|p| p.player_id == player_id)
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    fn player_mut(&mut self, player_id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.player_id == player_id)
    }

    pub fn living_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.alive && p.position.is_some())
    }

    pub(crate) fn require_status(&self, expected: SessionStatus) -> Result<(), GameError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(GameError::InvalidStatus {
                expected,
                actual: self.status,
            })
        }
    }

    fn require_creator(&self, requester: PlayerId, operation: &'static str) -> Result<(), GameError> {
        if self.created_by == requester {
            Ok(())
        } else {
            Err(GameError::NotCreator(operation))
        }
    }

    fn transition(&mut self, next: SessionStatus) {
        debug_assert!(self.status.can_transition_to(next));
        self.status = next;
        let now = Utc::now();
        match next {
            SessionStatus::Active => self.started_at = Some(now),
            SessionStatus::Completed => self.ended_at = Some(now),
            SessionStatus::Waiting => {}
        }
    }

    /// Append a player to the roster. Placement happens only at start.
    pub fn join(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        self.require_status(SessionStatus::Waiting)?;
        if self.is_member(player_id) {
            return Err(GameError::AlreadyJoined(player_id));
        }
        if self.players.len() >= self.max_players {
            return Err(GameError::SessionFull {
                max: self.max_players,
            });
        }
        self.players.push(Player::new(player_id, &self.settings));
        Ok(())
    }

    /// Remove a player from the roster and, if placed, from the board.
    /// Returns whether anything was removed.
    pub fn leave(&mut self, player_id: PlayerId) -> bool {
        let Some(index) = self.players.iter().position(|p| p.player_id == player_id) else {
            return false;
        };
        if let Some((pos, _)) = self.board.find_player(player_id) {
            self.board.set_occupant(pos, Occupant::Empty);
        }
        self.players.remove(index);
        true
    }

    /// Place every player and open the game for actions.
    pub fn start<R: Rng + ?Sized>(&mut self, requester: PlayerId, rng: &mut R) -> Result<(), GameError> {
        self.require_creator(requester, "start the game")?;
        self.require_status(SessionStatus::Waiting)?;
        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers {
                required: MIN_PLAYERS,
                actual: self.players.len(),
            });
        }

        let roster: Vec<PlayerId> = self.players.iter().map(|p| p.player_id).collect();
        let assignments = placement::plan(&self.board, &roster, rng)?;
        for (player_id, pos) in assignments {
            let snapshot = PlayerSnapshot::spawn(player_id, &self.settings);
            self.commit_snapshot(pos, snapshot);
        }
        self.transition(SessionStatus::Active);
        Ok(())
    }

    pub fn end(&mut self, requester: PlayerId) -> Result<(), GameError> {
        self.require_creator(requester, "end the game")?;
        self.require_status(SessionStatus::Active)?;
        self.transition(SessionStatus::Completed);
        Ok(())
    }

    /// Creator-only check performed before a game record is deleted.
    pub fn authorize_delete(&self, requester: PlayerId) -> Result<(), GameError> {
        self.require_creator(requester, "delete the game")
    }

    pub fn append_chat_message(&mut self, player_id: PlayerId, text: &str) -> Result<ChatMessage, GameError> {
        if !self.is_member(player_id) {
            return Err(GameError::NotMember(player_id));
        }
        let message = text.trim();
        if message.is_empty() {
            return Err(GameError::invalid_input("message", "must not be empty"));
        }
        if message.chars().count() > MAX_CHAT_LEN {
            return Err(GameError::invalid_input(
                "message",
                format!("cannot exceed {MAX_CHAT_LEN} characters"),
            ));
        }
        let entry = ChatMessage {
            player_id,
            message: message.to_string(),
            timestamp: Utc::now(),
        };
        self.chat_history.push(entry.clone());
        Ok(entry)
    }

    /// Write a living player's snapshot into `pos` and mirror it in the roster.
    pub(crate) fn commit_snapshot(&mut self, pos: Position, snapshot: PlayerSnapshot) {
        if let Some(player) = self.player_mut(snapshot.player_id) {
            player.position = Some(pos);
            player.ap = snapshot.ap;
            player.range = snapshot.range;
            player.hearts = snapshot.hearts;
            player.alive = snapshot.is_alive();
        }
        self.board.set_occupant(pos, Occupant::Player(snapshot));
    }

    /// Clear `pos` and mark its former occupant dead in the roster.
    pub(crate) fn remove_from_board(&mut self, pos: Position, snapshot: PlayerSnapshot) {
        if let Some(player) = self.player_mut(snapshot.player_id) {
            player.position = None;
            player.ap = snapshot.ap;
            player.range = snapshot.range;
            player.hearts = 0;
            player.alive = false;
            player.deaths += 1;
        }
        self.board.set_occupant(pos, Occupant::Empty);
    }

    pub(crate) fn record_kill(&mut self, killer: PlayerId) {
        if let Some(player) = self.player_mut(killer) {
            player.kills += 1;
        }
    }

    /// Complete the game when exactly one player is left, if the settings ask for it.
    pub(crate) fn check_last_survivor(&mut self) {
        if !self.settings.last_survivor_wins || self.status != SessionStatus::Active {
            return;
        }
        let survivor = {
            let mut alive = self.living_players();
            match (alive.next(), alive.next()) {
                (Some(player), None) => Some(player.player_id),
                _ => None,
            }
        };
        if let Some(winner) = survivor {
            self.winner = Some(winner);
            self.transition(SessionStatus::Completed);
        }
    }

    /// Newest-first page of the action history. Pages start at 1.
    pub fn history_page(&self, page: usize, limit: usize) -> HistoryPage {
        let total = self.action_history.len();
        let limit = limit.max(1);
        let page = page.max(1);
        let history: Vec<ActionRecord> = self
            .action_history
            .iter()
            .rev()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .cloned()
            .collect();
        HistoryPage {
            count: history.len(),
            history,
            total,
            total_pages: total.div_ceil(limit),
            current_page: page,
        }
    }

    /// Check the board/roster invariants. Used by tests and debug assertions.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut seen = Vec::new();
        for (pos, snapshot) in self.board.occupied() {
            if seen.contains(&snapshot.player_id) {
                return Err(format!("player {} occupies two cells", snapshot.player_id));
            }
            seen.push(snapshot.player_id);
            if !self.board.is_interior(pos) {
                return Err(format!("player {} stands on the outer ring", snapshot.player_id));
            }
            if !snapshot.is_alive() {
                return Err(format!("dead player {} still on the board", snapshot.player_id));
            }
            if snapshot.range < 1 {
                return Err(format!("player {} has range 0", snapshot.player_id));
            }
            if snapshot.hearts > self.settings.default_hearts {
                return Err(format!("player {} exceeds max hearts", snapshot.player_id));
            }
            let Some(player) = self.player(snapshot.player_id) else {
                return Err(format!("occupant {} missing from the roster", snapshot.player_id));
            };
            if player.position != Some(pos)
                || player.ap != snapshot.ap
                || player.range != snapshot.range
                || player.hearts != snapshot.hearts
                || !player.alive
            {
                return Err(format!("roster entry of {} out of sync with its cell", snapshot.player_id));
            }
        }
        for player in self.living_players() {
            if !seen.contains(&player.player_id) {
                return Err(format!("living player {} has no cell", player.player_id));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub history: Vec<ActionRecord>,
    pub count: usize,
    pub total: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::chebyshev;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn new_session(max_players: usize, board_size: usize) -> (Session, PlayerId) {
        let creator = Uuid::new_v4();
        let params = NewSession {
            name: "Friday night".into(),
            max_players,
            board_size,
            settings: GameSettings::default(),
        };
        (Session::create(params, creator).unwrap(), creator)
    }

    #[test]
    fn create_auto_joins_creator() {
        let (session, creator) = new_session(4, 20);
        assert_eq!(session.status, SessionStatus::Waiting);
        assert_eq!(session.players.len(), 1);
        assert_eq!(session.players[0].player_id, creator);
        assert!(session.board.is_empty());
    }

    #[test]
    fn create_validates_parameters() {
        let params = NewSession {
            name: "ab".into(),
            max_players: 4,
            board_size: 20,
            settings: GameSettings::default(),
        };
        assert!(matches!(
            Session::create(params.clone(), Uuid::new_v4()),
            Err(GameError::InvalidInput { field: "name", .. })
        ));
        let params = NewSession {
            name: "valid".into(),
            board_size: 3,
            ..params
        };
        assert!(matches!(
            Session::create(params, Uuid::new_v4()),
            Err(GameError::InvalidInput { field: "boardSize", .. })
        ));
    }

    #[test]
    fn join_rejects_duplicates_and_full_games() {
        let (mut session, creator) = new_session(2, 10);
        assert!(matches!(session.join(creator), Err(GameError::AlreadyJoined(_))));
        session.join(Uuid::new_v4()).unwrap();
        assert!(matches!(
            session.join(Uuid::new_v4()),
            Err(GameError::SessionFull { max: 2 })
        ));
    }

    #[test]
    fn leave_is_a_noop_for_strangers() {
        let (mut session, _) = new_session(4, 10);
        let guest = Uuid::new_v4();
        session.join(guest).unwrap();
        assert!(!session.leave(Uuid::new_v4()));
        assert!(session.leave(guest));
        assert!(!session.is_member(guest));
    }

    #[test]
    fn start_requires_creator_and_two_players() {
        let (mut session, creator) = new_session(4, 10);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            session.start(creator, &mut rng),
            Err(GameError::NotEnoughPlayers { required: 2, actual: 1 })
        ));
        let guest = Uuid::new_v4();
        session.join(guest).unwrap();
        assert!(matches!(session.start(guest, &mut rng), Err(GameError::NotCreator(_))));
        session.start(creator, &mut rng).unwrap();
        assert_eq!(session.status, SessionStatus::Active);
        assert!(session.started_at.is_some());
        assert!(matches!(
            session.join(Uuid::new_v4()),
            Err(GameError::InvalidStatus { .. })
        ));
    }

    #[test]
    fn start_places_everyone_apart() {
        let (mut session, creator) = new_session(2, 20);
        let guest = Uuid::new_v4();
        session.join(guest).unwrap();
        session.start(creator, &mut StdRng::seed_from_u64(11)).unwrap();

        let a = session.player(creator).unwrap().position.unwrap();
        let b = session.player(guest).unwrap().position.unwrap();
        assert!(chebyshev(a, b) > 1);
        assert!(session.board.is_interior(a) && session.board.is_interior(b));
        session.check_invariants().unwrap();
    }

    #[test]
    fn failed_placement_leaves_the_game_waiting() {
        let (mut session, creator) = new_session(6, 5);
        for _ in 0..4 {
            session.join(Uuid::new_v4()).unwrap();
        }
        let before = session.clone();
        let err = session.start(creator, &mut StdRng::seed_from_u64(5)).unwrap_err();
        assert!(matches!(err, GameError::PlacementFailed { .. }));
        assert_eq!(session, before);
    }

    #[test]
    fn end_is_creator_only_and_monotonic() {
        let (mut session, creator) = new_session(2, 10);
        assert!(matches!(session.end(creator), Err(GameError::InvalidStatus { .. })));
        let guest = Uuid::new_v4();
        session.join(guest).unwrap();
        session.start(creator, &mut StdRng::seed_from_u64(2)).unwrap();
        assert!(matches!(session.end(guest), Err(GameError::NotCreator(_))));
        session.end(creator).unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert!(session.ended_at.is_some());
        assert!(session.start(creator, &mut StdRng::seed_from_u64(2)).is_err());
    }

    #[test]
    fn leaving_an_active_game_clears_the_cell() {
        let (mut session, creator) = new_session(3, 10);
        let guest = Uuid::new_v4();
        session.join(guest).unwrap();
        session.start(creator, &mut StdRng::seed_from_u64(9)).unwrap();
        assert!(session.leave(guest));
        assert!(session.board.find_player(guest).is_none());
        session.check_invariants().unwrap();
    }

    #[test]
    fn leaving_a_completed_game_clears_the_cell_too() {
        let (mut session, creator) = new_session(3, 10);
        let guest = Uuid::new_v4();
        session.join(guest).unwrap();
        session.start(creator, &mut StdRng::seed_from_u64(4)).unwrap();
        session.end(creator).unwrap();
        assert!(session.leave(guest));
        assert!(session.board.find_player(guest).is_none());
        assert_eq!(session.status, SessionStatus::Completed);
        session.check_invariants().unwrap();
    }

    #[test]
    fn chat_requires_membership_and_text() {
        let (mut session, creator) = new_session(2, 10);
        assert!(matches!(
            session.append_chat_message(Uuid::new_v4(), "hi"),
            Err(GameError::NotMember(_))
        ));
        assert!(matches!(
            session.append_chat_message(creator, "   "),
            Err(GameError::InvalidInput { .. })
        ));
        let entry = session.append_chat_message(creator, " gl hf ").unwrap();
        assert_eq!(entry.message, "gl hf");
        assert_eq!(session.chat_history.len(), 1);
    }
}
