/// WebSocket connection of one player to one game.
///
/// The actor joins the game's room on start, pushes the current state, then
/// turns client events into commands for the game's worker. Failures go back
/// to this connection only; successful commands reach everyone through the
/// room broadcast.
use actix::prelude::*;
use actix_web::{Error, HttpRequest, HttpResponse, web};
use actix_web_actors::ws;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::game::error::GameError;
use crate::game::session::Session;
use crate::game::types::{PlayerId, SessionId, SessionStatus};
use crate::server::fanout::{ConnectionId, EventFanout, FanoutHandle, ServerEvent};
use crate::server::game_session::messages::{ClientMessage, Dispatch, GetSession, SessionCommand};
use crate::server::game_session::server::GameSessionManager;
use crate::server::state::AppState;
use crate::server::ws_error::{ws_error_message, ws_game_error};

pub struct PlayerSocket {
    pub connection_id: ConnectionId,
    pub session_id: SessionId,
    pub player_id: PlayerId,
    pub manager: Addr<GameSessionManager>,
    pub hub: FanoutHandle,
}

impl Actor for PlayerSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.hub.connect(self.connection_id, ctx.address().recipient());
        self.hub.join_room(self.connection_id, self.session_id);
        debug!("[PlayerSocket] Player {} connected to game {}", self.player_id, self.session_id);

        self.manager
            .send(GetSession {
                session_id: self.session_id,
            })
            .into_actor(self)
            .then(|res, _act, ctx| {
                match res {
                    Ok(Ok(session)) => match serde_json::to_value(&session) {
                        Ok(data) => push(ctx, &ServerEvent {
                            event: "sessionState".into(),
                            data,
                        }),
                        Err(err) => warn!("[PlayerSocket] Could not encode game state: {}", err),
                    },
                    Ok(Err(err)) => ctx.text(ws_game_error(&err, None)),
                    Err(err) => ctx.text(ws_error_message("UNAVAILABLE", &err.to_string(), None)),
                }
                fut::ready(())
            })
            .wait(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.hub.leave_room(self.connection_id, self.session_id);
        self.hub.disconnect(self.connection_id);
        debug!("[PlayerSocket] Player {} disconnected from game {}", self.player_id, self.session_id);
    }
}

fn push(ctx: &mut ws::WebsocketContext<PlayerSocket>, event: &ServerEvent) {
    match serde_json::to_string(event) {
        Ok(text) => ctx.text(text),
        Err(err) => warn!("[PlayerSocket] Failed to serialize {}: {}", event.event, err),
    }
}

impl PlayerSocket {
    fn dispatch(&mut self, command: SessionCommand, ctx: &mut ws::WebsocketContext<Self>) {
        let event = command.name();
        self.manager
            .send(Dispatch {
                session_id: self.session_id,
                player_id: self.player_id,
                command,
            })
            .into_actor(self)
            .then(move |res, act, ctx| {
                let context = Some(json!({ "event": event, "gameId": act.session_id }));
                match res {
                    Ok(Ok(_)) => {}
                    Ok(Err(err)) => ctx.text(ws_game_error(&err, context)),
                    Err(err) => ctx.text(ws_error_message("UNAVAILABLE", &err.to_string(), context)),
                }
                fut::ready(())
            })
            .wait(ctx);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for PlayerSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => {
                    if let Some(command) = message.into_command() {
                        self.dispatch(command, ctx);
                    }
                }
                Err(err) => ctx.text(ws_error_message(
                    "INVALID_MESSAGE",
                    &format!("Invalid client message: {err}"),
                    None,
                )),
            },
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(err) => {
                warn!("[PlayerSocket] Protocol error from {}: {}", self.player_id, err);
                ctx.stop();
            }
            _ => (),
        }
    }
}

/// Whether `player_id` may keep watching a game, judged from a pushed
/// `sessionState` payload: members always, anyone else only while waiting.
pub(crate) fn may_observe(player_id: PlayerId, state: &Value) -> bool {
    let waiting = state["status"] == "waiting";
    let member = state["players"]
        .as_array()
        .is_some_and(|players| players.iter().any(|p| p["playerId"] == json!(player_id)));
    waiting || member
}

/// Connection policy of the websocket endpoint.
pub(crate) fn admit(session: &Session, player_id: PlayerId) -> Result<(), GameError> {
    if session.is_member(player_id) || session.status == SessionStatus::Waiting {
        Ok(())
    } else {
        Err(GameError::NotMember(player_id))
    }
}

impl Handler<ServerEvent> for PlayerSocket {
    type Result = ();

    fn handle(&mut self, msg: ServerEvent, ctx: &mut Self::Context) {
        if msg.event == "sessionState" && !may_observe(self.player_id, &msg.data) {
            let err = GameError::NotMember(self.player_id);
            ctx.text(ws_game_error(&err, Some(json!({ "gameId": self.session_id }))));
            ctx.close(Some(ws::CloseReason {
                code: ws::CloseCode::Policy,
                description: Some("Not a player of this game".into()),
            }));
            ctx.stop();
            return;
        }
        push(ctx, &msg);
        if msg.event == "sessionDeleted" {
            ctx.close(Some(ws::CloseReason {
                code: ws::CloseCode::Normal,
                description: Some("Game deleted".into()),
            }));
            ctx.stop();
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SocketQuery {
    pub player_id: PlayerId,
}

/// WebSocket endpoint for one game: `/ws/game/{game_id}?player_id=...`.
///
/// Members may always connect; anyone else only while the game is waiting,
/// so they can join over the socket. Once the game starts, a connection whose
/// player never joined is closed on the next state push.
pub async fn ws_game(
    req: HttpRequest,
    stream: web::Payload,
    path: web::Path<SessionId>,
    query: web::Query<SocketQuery>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session_id = path.into_inner();
    let player_id = query.player_id;

    let session = data
        .sessions
        .send(GetSession { session_id })
        .await
        .map_err(|err| GameError::Unavailable(err.to_string()))??;
    admit(&session, player_id)?;

    ws::start(
        PlayerSocket {
            connection_id: Uuid::new_v4(),
            session_id,
            player_id,
            manager: data.sessions.clone(),
            hub: data.hub.clone(),
        },
        &req,
        stream,
    )
}
