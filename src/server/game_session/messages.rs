use actix::prelude::*;
use serde::Deserialize;

use crate::game::actions::Action;
use crate::game::error::GameError;
use crate::game::session::{HistoryPage, NewSession, Session};
use crate::game::types::{ChatMessage, PlayerId, SessionId};
use crate::store::repository::SessionFilter;

/// Everything a player can ask of an existing session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Join,
    Leave,
    Start,
    End,
    Delete,
    Act(Action),
    Chat { message: String },
}

impl SessionCommand {
    pub fn name(&self) -> &'static str {
        match self {
            SessionCommand::Join => "join",
            SessionCommand::Leave => "leave",
            SessionCommand::Start => "start",
            SessionCommand::End => "end",
            SessionCommand::Delete => "delete",
            SessionCommand::Act(action) => action.name(),
            SessionCommand::Chat { .. } => "chat",
        }
    }
}

#[derive(Debug, Clone)]
pub enum CommandOutcome {
    Updated(Session),
    ChatPosted(ChatMessage),
    Deleted(SessionId),
}

/// Sent to the manager, which routes it to the session's own actor.
#[derive(Message)]
#[rtype(result = "Result<CommandOutcome, GameError>")]
pub struct Dispatch {
    pub session_id: SessionId,
    pub player_id: PlayerId,
    pub command: SessionCommand,
}

/// Delivered to a `GameSession` actor.
#[derive(Message)]
#[rtype(result = "Result<CommandOutcome, GameError>")]
pub struct Command {
    pub player_id: PlayerId,
    pub command: SessionCommand,
}

#[derive(Message)]
#[rtype(result = "Result<Session, GameError>")]
pub struct CreateSession {
    pub creator: PlayerId,
    pub params: NewSession,
}

#[derive(Message)]
#[rtype(result = "Result<Vec<Session>, GameError>")]
pub struct ListSessions {
    pub filter: SessionFilter,
}

#[derive(Message)]
#[rtype(result = "Result<Session, GameError>")]
pub struct GetSession {
    pub session_id: SessionId,
}

#[derive(Message)]
#[rtype(result = "Result<HistoryPage, GameError>")]
pub struct GetHistory {
    pub session_id: SessionId,
    pub page: usize,
    pub limit: usize,
}

fn default_amount() -> u32 {
    1
}

/// Events a websocket client may send: `{"event": "...", "data": {...}}`.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    Join,
    Leave,
    Start,
    End,
    Move {
        x: i64,
        y: i64,
    },
    Shoot {
        x: i64,
        y: i64,
    },
    IncreaseRange,
    TransferAp {
        x: i64,
        y: i64,
        #[serde(default = "default_amount")]
        amount: u32,
    },
    Chat {
        message: String,
    },
    Ping,
}

impl ClientMessage {
    /// `None` for keep-alive messages that need no session work.
    pub fn into_command(self) -> Option<SessionCommand> {
        let command = match self {
            ClientMessage::Join => SessionCommand::Join,
            ClientMessage::Leave => SessionCommand::Leave,
            ClientMessage::Start => SessionCommand::Start,
            ClientMessage::End => SessionCommand::End,
            ClientMessage::Move { x, y } => SessionCommand::Act(Action::Move { x, y }),
            ClientMessage::Shoot { x, y } => SessionCommand::Act(Action::Shoot { x, y }),
            ClientMessage::IncreaseRange => SessionCommand::Act(Action::IncreaseRange),
            ClientMessage::TransferAp { x, y, amount } => SessionCommand::Act(Action::TransferAp { x, y, amount }),
            ClientMessage::Chat { message } => SessionCommand::Chat { message },
            ClientMessage::Ping => return None,
        };
        Some(command)
    }
}
