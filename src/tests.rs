#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix::{Actor, Addr};
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use serde_json::{Value, json};
    use uuid::Uuid;

    use crate::game::actions::Action;
    use crate::game::actions::fixtures::active_session;
    use crate::game::board::chebyshev;
    use crate::game::error::GameError;
    use crate::game::types::{ActionDetails, PlayerId, Position, SessionId, SessionStatus};
    use crate::server::fanout::{FanoutHandle, RoomHub};
    use crate::server::game_session::messages::{CommandOutcome, Dispatch, SessionCommand};
    use crate::server::game_session::server::GameSessionManager;
    use crate::server::http::PLAYER_HEADER;
    use crate::server::router;
    use crate::server::state::AppState;
    use crate::store::{MemoryStore, SessionRepository};

    fn backend() -> (Addr<GameSessionManager>, SessionRepository, FanoutHandle) {
        let repository = SessionRepository::new(Arc::new(MemoryStore::new()));
        let hub = FanoutHandle::new(RoomHub::default().start());
        let sessions = GameSessionManager::new(repository.clone(), Arc::new(hub.clone())).start();
        (sessions, repository, hub)
    }

    async fn dispatch(
        sessions: &Addr<GameSessionManager>,
        session_id: SessionId,
        player_id: PlayerId,
        command: SessionCommand,
    ) -> Result<CommandOutcome, GameError> {
        sessions
            .send(Dispatch {
                session_id,
                player_id,
                command,
            })
            .await
            .unwrap()
    }

    fn post(uri: String, player: PlayerId) -> test::TestRequest {
        test::TestRequest::post()
            .uri(&uri)
            .insert_header((PLAYER_HEADER, player.to_string()))
    }

    #[actix_web::test]
    async fn create_join_start_over_http() {
        let (sessions, _, hub) = backend();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(sessions, hub)))
                .configure(router::config),
        )
        .await;
        let creator = Uuid::new_v4();
        let guest = Uuid::new_v4();

        let req = post("/api/games".into(), creator)
            .set_json(json!({"name": "Lunch break", "maxPlayers": 2, "boardSize": 20}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "waiting");
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let req = post(format!("/api/games/{id}/join"), guest).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = post(format!("/api/games/{id}/join"), Uuid::new_v4()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "GAME_FULL");

        let req = post(format!("/api/games/{id}/start"), guest).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = post(format!("/api/games/{id}/start"), creator).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["status"], "active");

        let req = test::TestRequest::get()
            .uri(&format!("/api/games?status=active&player={guest}"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let req = test::TestRequest::get()
            .uri(&format!("/api/games/{id}/history?page=1&limit=5"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["total"], 0);
        assert_eq!(body["data"]["currentPage"], 1);
    }

    #[actix_web::test]
    async fn http_errors_map_to_status_codes() {
        let (sessions, repository, hub) = backend();
        let (session, ids) = active_session(&[(Position::new(5, 5), 2, 1, 3), (Position::new(6, 5), 1, 2, 3)]);
        repository.insert(&session).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(sessions, hub)))
                .configure(router::config),
        )
        .await;
        let id = session.id;

        // No identity.
        let req = test::TestRequest::post().uri(&format!("/api/games/{id}/upgrade")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        // Scenario D over the wire: 2 AP cannot pay for a shot.
        let req = post(format!("/api/games/{id}/shoot"), ids[0])
            .set_json(json!({"x": 6, "y": 5}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "INSUFFICIENT_AP");

        let req = post(format!("/api/games/{id}/move"), ids[0])
            .set_json(json!({"x": 50, "y": 5}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = post(format!("/api/games/{id}/move"), ids[0])
            .set_json(json!({"x": "far"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "INVALID_INPUT");

        let req = post(format!("/api/games/{id}/join"), Uuid::new_v4()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::get().uri(&format!("/api/games/{}", Uuid::new_v4())).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri(&format!("/api/games/{id}/history?limit=0"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        // Rejections never touched the stored game.
        assert_eq!(repository.load(id).unwrap(), session);
    }

    #[actix_web::test]
    async fn websocket_endpoint_turns_away_outsiders_of_started_games() {
        let (sessions, repository, hub) = backend();
        let (session, _) = active_session(&[(Position::new(5, 5), 1, 1, 3), (Position::new(9, 9), 1, 1, 3)]);
        repository.insert(&session).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(sessions, hub)))
                .configure(router::config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/ws/game/{}?player_id={}", session.id, Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "NOT_IN_GAME");

        let req = test::TestRequest::get()
            .uri(&format!("/ws/game/{}?player_id={}", Uuid::new_v4(), Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn trade_and_chat_over_http() {
        let (sessions, repository, hub) = backend();
        let (session, ids) = active_session(&[(Position::new(5, 5), 4, 2, 3), (Position::new(7, 5), 0, 2, 3)]);
        repository.insert(&session).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(sessions, hub)))
                .configure(router::config),
        )
        .await;
        let id = session.id;

        let req = post(format!("/api/games/{id}/trade"), ids[0])
            .set_json(json!({"x": 7, "y": 5, "amount": 3}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);

        let req = post(format!("/api/games/{id}/chat"), ids[1])
            .set_json(json!({"message": "thanks!"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["message"], "thanks!");

        let stored = repository.load(id).unwrap();
        assert_eq!(stored.player(ids[0]).unwrap().ap, 1);
        assert_eq!(stored.player(ids[1]).unwrap().ap, 3);
        assert_eq!(stored.chat_history.len(), 1);
        assert_eq!(stored.action_history.len(), 1);
    }

    #[actix_web::test]
    async fn started_game_spaces_players_apart() {
        // Scenario A.
        let (sessions, repository, _) = backend();
        let creator = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let session = sessions
            .send(crate::server::game_session::messages::CreateSession {
                creator,
                params: crate::game::session::NewSession {
                    name: "Scenario A".into(),
                    max_players: 2,
                    board_size: 20,
                    settings: Default::default(),
                },
            })
            .await
            .unwrap()
            .unwrap();

        dispatch(&sessions, session.id, guest, SessionCommand::Join).await.unwrap();
        dispatch(&sessions, session.id, creator, SessionCommand::Start).await.unwrap();

        let stored = repository.load(session.id).unwrap();
        assert_eq!(stored.status, SessionStatus::Active);
        let positions: Vec<Position> = stored.players.iter().filter_map(|p| p.position).collect();
        assert_eq!(positions.len(), 2);
        assert!(chebyshev(positions[0], positions[1]) > 1);
        assert_eq!(stored.check_invariants(), Ok(()));
    }

    #[actix_web::test]
    async fn concurrent_moves_never_lose_an_update() {
        // Scenario F: two players race for the same empty cell.
        let (sessions, repository, _) = backend();
        let (session, ids) = active_session(&[(Position::new(5, 5), 5, 1, 3), (Position::new(7, 7), 5, 1, 3)]);
        repository.insert(&session).unwrap();
        let target = Action::Move { x: 6, y: 6 };

        let (first, second) = tokio::join!(
            dispatch(&sessions, session.id, ids[0], SessionCommand::Act(target.clone())),
            dispatch(&sessions, session.id, ids[1], SessionCommand::Act(target.clone())),
        );

        let outcomes = [first, second];
        let applied = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(applied, 1);
        let rejected = outcomes.iter().find_map(|r| r.as_ref().err()).unwrap();
        assert!(matches!(rejected, GameError::CellOccupied { x: 6, y: 6 }));

        let stored = repository.load(session.id).unwrap();
        assert_eq!(stored.action_history.len(), 1);
        let mover = stored.action_history[0].player_id;
        assert!(matches!(
            stored.action_history[0].details,
            ActionDetails::Move { to, .. } if to == Position::new(6, 6)
        ));
        assert_eq!(stored.player(mover).unwrap().ap, 4);
        let other = ids.iter().copied().find(|id| *id != mover).unwrap();
        assert_eq!(stored.player(other).unwrap().ap, 5);
        assert_eq!(stored.check_invariants(), Ok(()));
    }

    #[actix_web::test]
    async fn sequential_moves_see_each_other() {
        // Second command of the same player is validated against the first's result.
        let (sessions, repository, _) = backend();
        let (session, ids) = active_session(&[(Position::new(5, 5), 5, 1, 3), (Position::new(15, 15), 5, 1, 3)]);
        repository.insert(&session).unwrap();

        let (first, second) = tokio::join!(
            dispatch(&sessions, session.id, ids[0], SessionCommand::Act(Action::Move { x: 6, y: 6 })),
            dispatch(&sessions, session.id, ids[0], SessionCommand::Act(Action::Move { x: 7, y: 7 })),
        );
        first.unwrap();
        second.unwrap();

        let stored = repository.load(session.id).unwrap();
        assert_eq!(stored.player(ids[0]).unwrap().position, Some(Position::new(7, 7)));
        assert_eq!(stored.player(ids[0]).unwrap().ap, 3);
        assert_eq!(stored.action_history.len(), 2);
    }
}
