use std::collections::HashMap;
use std::sync::Arc;

use actix::prelude::*;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::json;

use crate::game::actions;
use crate::game::error::GameError;
use crate::game::session::{HistoryPage, Session};
use crate::game::types::{PlayerId, SessionId, SessionStatus};
use crate::server::fanout::{EventFanout, actions_topic, chat_topic, updates_topic};
use crate::server::game_session::messages::{
    Command, CommandOutcome, CreateSession, Dispatch, GetHistory, GetSession, ListSessions,
    SessionCommand,
};
use crate::store::repository::SessionRepository;

/// Single writer for one game.
///
/// Every command for the game passes through this actor's mailbox, so the
/// load -> validate -> mutate -> store sequence never interleaves with
/// another command for the same game.
pub struct GameSession {
    pub session_id: SessionId,
    repository: SessionRepository,
    fanout: Arc<dyn EventFanout>,
}

impl Actor for GameSession {
    type Context = Context<Self>;

    fn started(&mut self, _: &mut Self::Context) {
        debug!("[GameSession] Worker started for game {}", self.session_id);
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        debug!("[GameSession] Worker stopped for game {}", self.session_id);
    }
}

impl GameSession {
    pub fn new(session_id: SessionId, repository: SessionRepository, fanout: Arc<dyn EventFanout>) -> Self {
        Self {
            session_id,
            repository,
            fanout,
        }
    }

    /// Broadcast to the game's room. Serialization failures are logged and
    /// the event is dropped.
    fn emit<T: Serialize>(&self, event: &str, payload: &T) -> Option<serde_json::Value> {
        match serde_json::to_value(payload) {
            Ok(value) => {
                self.fanout.broadcast_to_room(self.session_id, event, value.clone());
                Some(value)
            }
            Err(err) => {
                warn!("[GameSession] Could not encode {} for game {}: {}", event, self.session_id, err);
                None
            }
        }
    }

    fn send_state(&self, session: &Session) {
        if let Some(state) = self.emit("sessionState", session) {
            self.fanout.publish(&updates_topic(self.session_id), state);
        }
    }

    fn execute(&mut self, player_id: PlayerId, command: SessionCommand) -> Result<CommandOutcome, GameError> {
        let mut session = self.repository.load(self.session_id)?;

        match command {
            SessionCommand::Join => {
                session.join(player_id)?;
                self.repository.save(&session)?;
                info!(
                    "[GameSession] Player {} joined game {} ({}/{})",
                    player_id,
                    session.id,
                    session.players.len(),
                    session.max_players
                );
                self.emit("playerJoined", &json!({ "playerId": player_id }));
                self.send_state(&session);
            }
            SessionCommand::Leave => {
                if session.leave(player_id) {
                    self.repository.save(&session)?;
                    info!("[GameSession] Player {} left game {}", player_id, session.id);
                    self.emit("playerLeft", &json!({ "playerId": player_id }));
                    self.send_state(&session);
                }
            }
            SessionCommand::Start => {
                session.start(player_id, &mut rand::rng())?;
                self.repository.save(&session)?;
                info!("[GameSession] Game {} started with {} players", session.id, session.players.len());
                self.send_state(&session);
            }
            SessionCommand::End => {
                session.end(player_id)?;
                self.repository.save(&session)?;
                info!("[GameSession] Game {} ended by its creator", session.id);
                self.send_state(&session);
            }
            SessionCommand::Delete => {
                session.authorize_delete(player_id)?;
                self.repository.delete(session.id)?;
                info!("[GameSession] Game {} deleted", session.id);
                self.emit("sessionDeleted", &json!({ "gameId": session.id }));
                return Ok(CommandOutcome::Deleted(session.id));
            }
            SessionCommand::Act(action) => {
                let record = actions::apply(&mut session, player_id, &action)?;
                self.repository.save(&session)?;
                debug!("[GameSession] {} by {} in game {}", action.name(), player_id, session.id);
                if let Some(payload) = self.emit("gameAction", &record) {
                    self.fanout.publish(&actions_topic(session.id), payload);
                }
                if let Some(winner) = session.winner.filter(|_| session.ended_at.is_some()) {
                    info!("[GameSession] Game {} won by {}", session.id, winner);
                }
                self.send_state(&session);
            }
            SessionCommand::Chat { message } => {
                let entry = session.append_chat_message(player_id, &message)?;
                self.repository.save(&session)?;
                if let Some(payload) = self.emit("chatMessage", &entry) {
                    self.fanout.publish(&chat_topic(session.id), payload);
                }
                return Ok(CommandOutcome::ChatPosted(entry));
            }
        }

        Ok(CommandOutcome::Updated(session))
    }
}

impl Handler<Command> for GameSession {
    type Result = Result<CommandOutcome, GameError>;

    fn handle(&mut self, msg: Command, ctx: &mut Context<Self>) -> Self::Result {
        let name = msg.command.name();
        let result = self.execute(msg.player_id, msg.command);
        match &result {
            Ok(CommandOutcome::Deleted(_)) => ctx.stop(),
            // Completed games take few commands; the manager revives a worker on demand.
            Ok(CommandOutcome::Updated(session)) if session.status == SessionStatus::Completed => {
                debug!("[GameSession] Game {} completed, releasing its worker", self.session_id);
                ctx.stop();
            }
            Ok(_) => {}
            Err(err) => debug!(
                "[GameSession] Rejected {} from {} in game {}: {}",
                name, msg.player_id, self.session_id, err
            ),
        }
        result
    }
}

/// Routes requests to per-game workers, starting them on demand.
pub struct GameSessionManager {
    sessions: HashMap<SessionId, Addr<GameSession>>,
    repository: SessionRepository,
    fanout: Arc<dyn EventFanout>,
}

impl Actor for GameSessionManager {
    type Context = Context<Self>;
}

impl GameSessionManager {
    pub fn new(repository: SessionRepository, fanout: Arc<dyn EventFanout>) -> Self {
        Self {
            sessions: HashMap::new(),
            repository,
            fanout,
        }
    }

    fn spawn_worker(&mut self, session_id: SessionId) -> Addr<GameSession> {
        let addr = GameSession::new(session_id, self.repository.clone(), self.fanout.clone()).start();
        self.sessions.insert(session_id, addr.clone());
        addr
    }

    /// Address of the game's worker. Games found in the store without a
    /// running worker (after a restart, or once a worker stopped) get a
    /// fresh one.
    fn worker(&mut self, session_id: SessionId) -> Result<Addr<GameSession>, GameError> {
        if let Some(addr) = self.sessions.get(&session_id).filter(|addr| addr.connected()) {
            return Ok(addr.clone());
        }
        self.sessions.remove(&session_id);
        if !self.repository.exists(session_id)? {
            return Err(GameError::SessionNotFound(session_id));
        }
        debug!("[GameSessionManager] Reviving worker for game {}", session_id);
        Ok(self.spawn_worker(session_id))
    }
}

impl Handler<CreateSession> for GameSessionManager {
    type Result = Result<Session, GameError>;

    fn handle(&mut self, msg: CreateSession, _: &mut Context<Self>) -> Self::Result {
        let session = Session::create(msg.params, msg.creator)?;
        self.repository.insert(&session)?;
        self.spawn_worker(session.id);
        info!(
            "[GameSessionManager] Game {} ({:?}) created by {}: {}x{} board, up to {} players",
            session.id, session.name, session.created_by, session.board_size, session.board_size, session.max_players
        );
        Ok(session)
    }
}

async fn deliver(
    session_id: SessionId,
    request: impl Future<Output = Result<Result<CommandOutcome, GameError>, MailboxError>>,
) -> Result<CommandOutcome, GameError> {
    match request.await {
        Ok(result) => result,
        Err(MailboxError::Closed) => Err(GameError::SessionNotFound(session_id)),
        Err(err) => Err(GameError::Unavailable(err.to_string())),
    }
}

impl Handler<Dispatch> for GameSessionManager {
    type Result = ResponseActFuture<Self, Result<CommandOutcome, GameError>>;

    fn handle(&mut self, msg: Dispatch, _: &mut Context<Self>) -> Self::Result {
        let Dispatch {
            session_id,
            player_id,
            command,
        } = msg;
        let addr = match self.worker(session_id) {
            Ok(addr) => addr,
            Err(err) => return Box::pin(fut::ready(Err(err))),
        };
        // Enqueue now so the worker sees commands in the order they arrived here.
        let request = addr.send(Command {
            player_id,
            command: command.clone(),
        });
        Box::pin(request.into_actor(self).then(move |res, act, _| {
            let settled = match res {
                Ok(result) => Ok(result),
                // The worker stopped with this command still queued; hand it to a fresh one.
                Err(MailboxError::Closed) => Err(act.worker(session_id).map(|addr| addr.send(Command { player_id, command }))),
                Err(err) => Ok(Err(GameError::Unavailable(err.to_string()))),
            };
            fut::wrap_future(async move {
                match settled {
                    Ok(result) => result,
                    Err(retry) => deliver(session_id, retry?).await,
                }
            })
        }))
    }
}

impl Handler<ListSessions> for GameSessionManager {
    type Result = Result<Vec<Session>, GameError>;

    fn handle(&mut self, msg: ListSessions, _: &mut Context<Self>) -> Self::Result {
        self.repository.list(msg.filter)
    }
}

impl Handler<GetSession> for GameSessionManager {
    type Result = Result<Session, GameError>;

    fn handle(&mut self, msg: GetSession, _: &mut Context<Self>) -> Self::Result {
        self.repository.load(msg.session_id)
    }
}

impl Handler<GetHistory> for GameSessionManager {
    type Result = Result<HistoryPage, GameError>;

    fn handle(&mut self, msg: GetHistory, _: &mut Context<Self>) -> Self::Result {
        let session = self.repository.load(msg.session_id)?;
        Ok(session.history_page(msg.page, msg.limit))
    }
}
