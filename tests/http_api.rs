use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use domatch_back::{
    config::AppConfig,
    dao::league_store::MemoryLeagueStore,
    routes,
    state::AppState,
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

async fn app() -> Router {
    let state =
        AppState::with_store(AppConfig::in_memory(), Arc::new(MemoryLeagueStore::new())).await;
    routes::router(state)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn create(app: &Router, uri: &str, body: Value) -> String {
    let (status, json) = call(app, "POST", uri, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{uri}: {json}");
    json["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn healthcheck_reports_ok_with_store() {
    let app = app().await;
    let (status, json) = call(&app, "GET", "/healthcheck", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn healthcheck_reports_degraded_without_store() {
    let app = routes::router(AppState::new(AppConfig::in_memory()));
    let (status, json) = call(&app, "GET", "/healthcheck", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");

    let (status, _) = call(&app, "GET", "/players", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn blank_player_name_is_a_bad_request() {
    let app = app().await;
    let (status, _) = call(&app, "POST", "/players", Some(json!({ "name": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn league_flow_over_http() {
    let app = app().await;

    let ana = create(&app, "/players", json!({ "name": "Ana" })).await;
    let beto = create(&app, "/players", json!({ "name": "Beto" })).await;
    let community = create(
        &app,
        "/communities",
        json!({ "name": "Club del parque", "admin_id": ana }),
    )
    .await;
    let competition = create(
        &app,
        &format!("/communities/{community}/competitions"),
        json!({ "name": "Liga de otoño", "start_date": "2025-09-01" }),
    )
    .await;

    let (status, json) = call(
        &app,
        "POST",
        &format!("/competitions/{competition}/finish"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["message"], "precondition failed: no finished games");

    for player in [&ana, &beto] {
        let (status, _) = call(
            &app,
            "POST",
            &format!("/competitions/{competition}/players"),
            Some(json!({ "player_id": player })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, json) = call(
        &app,
        "POST",
        &format!("/competitions/{competition}/players"),
        Some(json!({ "player_id": ana })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["created"], false);

    let game = create(
        &app,
        &format!("/competitions/{competition}/games"),
        json!({ "player1_id": ana, "player2_id": beto }),
    )
    .await;

    let (status, json) = call(
        &app,
        "POST",
        &format!("/games/{game}/result"),
        Some(json!({ "winner_id": beto, "victory_type": "la_e_lo" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["game"]["status"], "finished");
    assert_eq!(json["winner_stats"]["victories"]["la_e_lo"], 1);
    assert_eq!(json["loser_stats"]["games_lost"], 1);

    let (status, _) = call(
        &app,
        "POST",
        &format!("/games/{game}/result"),
        Some(json!({ "winner_id": beto })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) = call(
        &app,
        "GET",
        &format!("/competitions/{competition}/stats"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["player_name"], "Beto");
    assert_eq!(json[1]["games_played"], 1);

    let (status, json) = call(
        &app,
        "POST",
        &format!("/competitions/{competition}/finish"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "finished");
}

#[tokio::test]
async fn unknown_game_is_not_found() {
    let app = app().await;
    let (status, json) = call(
        &app,
        "GET",
        &format!("/games/{}", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["message"].as_str().unwrap().starts_with("not found"));
}
