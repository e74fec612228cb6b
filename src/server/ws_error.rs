/// Centralized helpers for WebSocket and HTTP error responses.
///
/// Both surfaces share the same shape: a stable `code`, a human-readable
/// message, and optional context.
use actix_web::{HttpResponse, http::StatusCode};
use serde_json::{Value, json};

use crate::game::error::GameError;

/// Error envelope used by every HTTP endpoint.
pub fn error_body(code: &str, message: &str) -> Value {
    json!({
        "success": false,
        "error": message,
        "code": code,
    })
}

/// Formats a targeted WebSocket `error` event as a JSON string.
pub fn ws_error_message(code: &str, message: &str, context: Option<Value>) -> String {
    json!({
        "event": "error",
        "data": {
            "code": code,
            "message": message,
            "context": context.unwrap_or(Value::Null),
        }
    })
    .to_string()
}

pub fn ws_game_error(err: &GameError, context: Option<Value>) -> String {
    ws_error_message(err.code(), &err.to_string(), context)
}

/// Returns an HTTP error response with the JSON envelope.
pub fn http_error_response(code: &str, message: &str, status: StatusCode) -> HttpResponse {
    HttpResponse::build(status).json(error_body(code, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_errors_carry_code_and_context() {
        let text = ws_error_message("INSUFFICIENT_AP", "not enough \"AP\"", Some(json!({"event": "shoot"})));
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["event"], "error");
        assert_eq!(value["data"]["code"], "INSUFFICIENT_AP");
        assert_eq!(value["data"]["message"], "not enough \"AP\"");
        assert_eq!(value["data"]["context"]["event"], "shoot");
    }

    #[test]
    fn http_errors_use_the_envelope() {
        let body = error_body("GAME_NOT_FOUND", "game not found");
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "GAME_NOT_FOUND");
        assert!(body.get("data").is_none());
    }
}
