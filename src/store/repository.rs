use std::sync::Arc;

use log::{debug, warn};
use uuid::Uuid;

use super::KeyValueStore;
use crate::game::error::GameError;
use crate::game::session::Session;
use crate::game::types::{PlayerId, SessionId, SessionStatus};

/// Set holding the id of every stored game.
pub const GAME_INDEX_KEY: &str = "games";

pub fn game_key(id: SessionId) -> String {
    format!("game:{id}")
}

/// Optional filters for game listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFilter {
    pub status: Option<SessionStatus>,
    pub player: Option<PlayerId>,
}

impl SessionFilter {
    fn matches(&self, session: &Session) -> bool {
        self.status.is_none_or(|status| session.status == status)
            && self.player.is_none_or(|player| session.is_member(player))
    }
}

/// Sessions serialized as JSON documents under `game:{id}`.
#[derive(Clone)]
pub struct SessionRepository {
    store: Arc<dyn KeyValueStore>,
}

impl SessionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load(&self, id: SessionId) -> Result<Session, GameError> {
        let bytes = self
            .store
            .get(&game_key(id))?
            .ok_or(GameError::SessionNotFound(id))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn exists(&self, id: SessionId) -> Result<bool, GameError> {
        Ok(self.store.exists(&game_key(id))?)
    }

    pub fn save(&self, session: &Session) -> Result<(), GameError> {
        let bytes = serde_json::to_vec(session)?;
        self.store.set(&game_key(session.id), bytes)?;
        debug!("[Store] Saved game {} ({})", session.id, session.status);
        Ok(())
    }

    /// Store a new game and index it.
    pub fn insert(&self, session: &Session) -> Result<(), GameError> {
        self.save(session)?;
        self.store.add_to_set(GAME_INDEX_KEY, &session.id.to_string())?;
        Ok(())
    }

    pub fn delete(&self, id: SessionId) -> Result<(), GameError> {
        self.store.delete(&game_key(id))?;
        self.store.remove_from_set(GAME_INDEX_KEY, &id.to_string())?;
        Ok(())
    }

    /// Every indexed game matching `filter`, newest first.
    pub fn list(&self, filter: SessionFilter) -> Result<Vec<Session>, GameError> {
        let mut sessions = Vec::new();
        for member in self.store.set_members(GAME_INDEX_KEY)? {
            let Ok(id) = Uuid::parse_str(&member) else {
                warn!("[Store] Ignoring malformed index entry {:?}", member);
                continue;
            };
            match self.load(id) {
                Ok(session) if filter.matches(&session) => sessions.push(session),
                Ok(_) => {}
                Err(GameError::SessionNotFound(_)) => {
                    warn!("[Store] Index points at missing game {}", id);
                }
                Err(err) => return Err(err),
            }
        }
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }
}
