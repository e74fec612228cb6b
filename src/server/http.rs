//! REST surface of the game service.
//!
//! Every handler resolves the acting player from the `X-Player-Id` header,
//! forwards one message to the `GameSessionManager` and wraps the result in
//! the `{success, data?, error?, code?}` envelope.

use std::future::{Ready, ready};

use actix::MailboxError;
use actix_web::dev::Payload;
use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use log::error;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::game::{
    DEFAULT_BOARD_SIZE, DEFAULT_MAX_PLAYERS, HISTORY_PAGE_SIZE, MAX_HISTORY_PAGE_SIZE,
};
use crate::game::actions::Action;
use crate::game::error::{ErrorKind, GameError};
use crate::game::session::NewSession;
use crate::game::types::{GameSettings, PlayerId, SessionId, SessionStatus};
use crate::server::game_session::messages::{
    CommandOutcome, CreateSession, Dispatch, GetHistory, GetSession, ListSessions, SessionCommand,
};
use crate::server::state::AppState;
use crate::server::ws_error::http_error_response;
use crate::store::repository::SessionFilter;

/// Header carrying the authenticated player's id.
pub const PLAYER_HEADER: &str = "x-player-id";

impl ResponseError for GameError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidState | ErrorKind::Capacity | ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::ValidationFailure => StatusCode::BAD_REQUEST,
            ErrorKind::InsufficientResource => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.kind() == ErrorKind::Infrastructure {
            error!("[Http] {}", self);
        }
        http_error_response(self.code(), &self.to_string(), self.status_code())
    }
}

fn mailbox(err: MailboxError) -> GameError {
    GameError::Unavailable(err.to_string())
}

/// Successful response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> HttpResponse {
        HttpResponse::Ok().json(ApiResponse {
            success: true,
            data,
            message: None,
        })
    }

    pub fn created(data: T, message: &'static str) -> HttpResponse {
        HttpResponse::Created().json(ApiResponse {
            success: true,
            data,
            message: Some(message),
        })
    }
}

/// The player on whose behalf a request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerIdentity(pub PlayerId);

impl FromRequest for PlayerIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let identity: Result<Self, Self::Error> = req
            .headers()
            .get(PLAYER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(PlayerIdentity)
            .ok_or_else(|| {
                let response = http_error_response(
                    "UNAUTHENTICATED",
                    "missing or malformed X-Player-Id header",
                    StatusCode::UNAUTHORIZED,
                );
                InternalError::from_response("unauthenticated", response).into()
            });
        ready(identity)
    }
}

/// Envelope for extractor failures (bad JSON bodies, bad query strings).
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = http_error_response("INVALID_INPUT", &err.to_string(), StatusCode::BAD_REQUEST);
        InternalError::from_response(err, response).into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        let response = http_error_response("INVALID_INPUT", &err.to_string(), StatusCode::BAD_REQUEST);
        InternalError::from_response(err, response).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let response = http_error_response("INVALID_INPUT", &err.to_string(), StatusCode::BAD_REQUEST);
        InternalError::from_response(err, response).into()
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub name: String,
    pub max_players: Option<usize>,
    pub board_size: Option<usize>,
    #[serde(default)]
    pub settings: GameSettings,
}

#[derive(Debug, Deserialize)]
pub struct TargetRequest {
    pub x: i64,
    pub y: i64,
}

fn default_amount() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct TradeRequest {
    pub x: i64,
    pub y: i64,
    #[serde(default = "default_amount")]
    pub amount: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<SessionStatus>,
    pub player: Option<PlayerId>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

async fn dispatch(
    data: &AppState,
    session_id: SessionId,
    player: PlayerIdentity,
    command: SessionCommand,
) -> Result<CommandOutcome, GameError> {
    data.sessions
        .send(Dispatch {
            session_id,
            player_id: player.0,
            command,
        })
        .await
        .map_err(mailbox)?
}

fn outcome_response(outcome: CommandOutcome) -> HttpResponse {
    match outcome {
        CommandOutcome::Updated(session) => ApiResponse::ok(session),
        CommandOutcome::ChatPosted(entry) => ApiResponse::ok(entry),
        CommandOutcome::Deleted(id) => ApiResponse::ok(serde_json::json!({ "gameId": id })),
    }
}

async fn command(
    data: web::Data<AppState>,
    path: web::Path<SessionId>,
    player: PlayerIdentity,
    command: SessionCommand,
) -> Result<HttpResponse, GameError> {
    let outcome = dispatch(&data, path.into_inner(), player, command).await?;
    Ok(outcome_response(outcome))
}

pub async fn create_game(
    data: web::Data<AppState>,
    player: PlayerIdentity,
    body: web::Json<CreateGameRequest>,
) -> Result<HttpResponse, GameError> {
    let body = body.into_inner();
    let params = NewSession {
        name: body.name,
        max_players: body.max_players.unwrap_or(DEFAULT_MAX_PLAYERS),
        board_size: body.board_size.unwrap_or(DEFAULT_BOARD_SIZE),
        settings: body.settings,
    };
    let session = data
        .sessions
        .send(CreateSession {
            creator: player.0,
            params,
        })
        .await
        .map_err(mailbox)??;
    Ok(ApiResponse::created(session, "Game created"))
}

pub async fn list_games(
    data: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, GameError> {
    let filter = SessionFilter {
        status: query.status,
        player: query.player,
    };
    let sessions = data.sessions.send(ListSessions { filter }).await.map_err(mailbox)??;
    Ok(ApiResponse::ok(sessions))
}

pub async fn get_game(
    data: web::Data<AppState>,
    path: web::Path<SessionId>,
) -> Result<HttpResponse, GameError> {
    let session = data
        .sessions
        .send(GetSession {
            session_id: path.into_inner(),
        })
        .await
        .map_err(mailbox)??;
    Ok(ApiResponse::ok(session))
}

pub async fn delete_game(
    data: web::Data<AppState>,
    path: web::Path<SessionId>,
    player: PlayerIdentity,
) -> Result<HttpResponse, GameError> {
    command(data, path, player, SessionCommand::Delete).await
}

pub async fn join_game(
    data: web::Data<AppState>,
    path: web::Path<SessionId>,
    player: PlayerIdentity,
) -> Result<HttpResponse, GameError> {
    command(data, path, player, SessionCommand::Join).await
}

pub async fn leave_game(
    data: web::Data<AppState>,
    path: web::Path<SessionId>,
    player: PlayerIdentity,
) -> Result<HttpResponse, GameError> {
    command(data, path, player, SessionCommand::Leave).await
}

pub async fn start_game(
    data: web::Data<AppState>,
    path: web::Path<SessionId>,
    player: PlayerIdentity,
) -> Result<HttpResponse, GameError> {
    command(data, path, player, SessionCommand::Start).await
}

pub async fn end_game(
    data: web::Data<AppState>,
    path: web::Path<SessionId>,
    player: PlayerIdentity,
) -> Result<HttpResponse, GameError> {
    command(data, path, player, SessionCommand::End).await
}

pub async fn move_player(
    data: web::Data<AppState>,
    path: web::Path<SessionId>,
    player: PlayerIdentity,
    body: web::Json<TargetRequest>,
) -> Result<HttpResponse, GameError> {
    let action = Action::Move { x: body.x, y: body.y };
    command(data, path, player, SessionCommand::Act(action)).await
}

pub async fn shoot(
    data: web::Data<AppState>,
    path: web::Path<SessionId>,
    player: PlayerIdentity,
    body: web::Json<TargetRequest>,
) -> Result<HttpResponse, GameError> {
    let action = Action::Shoot { x: body.x, y: body.y };
    command(data, path, player, SessionCommand::Act(action)).await
}

pub async fn increase_range(
    data: web::Data<AppState>,
    path: web::Path<SessionId>,
    player: PlayerIdentity,
) -> Result<HttpResponse, GameError> {
    command(data, path, player, SessionCommand::Act(Action::IncreaseRange)).await
}

pub async fn transfer_ap(
    data: web::Data<AppState>,
    path: web::Path<SessionId>,
    player: PlayerIdentity,
    body: web::Json<TradeRequest>,
) -> Result<HttpResponse, GameError> {
    let action = Action::TransferAp {
        x: body.x,
        y: body.y,
        amount: body.amount,
    };
    command(data, path, player, SessionCommand::Act(action)).await
}

pub async fn send_chat(
    data: web::Data<AppState>,
    path: web::Path<SessionId>,
    player: PlayerIdentity,
    body: web::Json<ChatRequest>,
) -> Result<HttpResponse, GameError> {
    let message = body.into_inner().message;
    command(data, path, player, SessionCommand::Chat { message }).await
}

pub async fn game_history(
    data: web::Data<AppState>,
    path: web::Path<SessionId>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, GameError> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(HISTORY_PAGE_SIZE);
    if page == 0 {
        return Err(GameError::invalid_input("page", "pages start at 1"));
    }
    if !(1..=MAX_HISTORY_PAGE_SIZE).contains(&limit) {
        return Err(GameError::invalid_input(
            "limit",
            format!("must be between 1 and {MAX_HISTORY_PAGE_SIZE}"),
        ));
    }
    let history = data
        .sessions
        .send(GetHistory {
            session_id: path.into_inner(),
            page,
            limit,
        })
        .await
        .map_err(mailbox)??;
    Ok(ApiResponse::ok(history))
}
