use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;

use api::auth::Claims;
use api::{AppState, Config, create_router};
use kotoba_core::model::{AppSetting, UserId};
use kotoba_core::time::fixed_clock;
use services::AppServices;
use storage::repository::AppSettingsRepository;

const SECRET: &str = "test-secret";

struct TestApp {
    router: Router,
    services: AppServices,
}

impl TestApp {
    fn new() -> Self {
        let services = AppServices::in_memory(fixed_clock());
        let state = Arc::new(AppState::new(Config::with_secret(SECRET), services.clone()));
        Self {
            router: create_router(state),
            services,
        }
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        user: Option<UserId>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(user)));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_lesson(&self, user: UserId, title: &str) -> u64 {
        let (status, body) = self
            .send("POST", "/api/lessons", Some(user), Some(json!({ "title": title })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_u64().unwrap()
    }

    async fn add_word(&self, user: UserId, lesson: u64, japanese: &str, ukrainian: &str) -> u64 {
        let (status, body) = self
            .send(
                "POST",
                &format!("/api/lessons/{lesson}/words"),
                Some(user),
                Some(json!({ "japanese": japanese, "ukrainian": ukrainian })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_u64().unwrap()
    }
}

fn sign(secret: &str, user: UserId) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: user.to_string(),
        exp: usize::try_from((now + Duration::hours(1)).timestamp()).unwrap(),
        iat: usize::try_from(now.timestamp()).unwrap(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn token(user: UserId) -> String {
    sign(SECRET, user)
}

#[tokio::test]
async fn health_reports_storage() {
    let app = TestApp::new();
    let (status, body) = app.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn lessons_require_a_token() {
    let app = TestApp::new();
    let (status, body) = app.send("GET", "/api/lessons", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing authorization token");
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let app = TestApp::new();
    let forged = sign("other", UserId::random());
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/lessons")
                .header(header::AUTHORIZATION, format!("Bearer {forged}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn lesson_crud_with_word_counts() {
    let app = TestApp::new();
    let user = UserId::random();

    let lesson = app.create_lesson(user, "Привітання").await;
    app.add_word(user, lesson, "こんにちは", "Привіт").await;
    app.add_word(user, lesson, "ありがとう", "Дякую").await;

    let (status, body) = app.send("GET", "/api/lessons", Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["title"], "Привітання");
    assert_eq!(body[0]["word_count"], 2);
    assert_eq!(body[0]["language_from"], "japanese");

    let (status, body) = app
        .send(
            "PUT",
            &format!("/api/lessons/{lesson}"),
            Some(user),
            Some(json!({ "title": "Вітання", "description": "базові фрази" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Вітання");

    let (status, body) = app
        .send("DELETE", &format!("/api/lessons/{lesson}"), Some(user), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = app
        .send("GET", &format!("/api/lessons/{lesson}/words"), Some(user), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_title_is_bad_request() {
    let app = TestApp::new();
    let (status, body) = app
        .send("POST", "/api/lessons", Some(UserId::random()), Some(json!({ "title": "  " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "lesson title cannot be empty");
}

#[tokio::test]
async fn malformed_json_gets_json_error() {
    let app = TestApp::new();
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/lessons")
                .header(header::AUTHORIZATION, format!("Bearer {}", token(UserId::random())))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("invalid JSON body"));
}

#[tokio::test]
async fn malformed_path_and_query_get_json_errors() {
    let app = TestApp::new();
    let user = UserId::random();
    let lesson = app.create_lesson(user, "Числа").await;

    let (status, body) = app.send("GET", "/api/lessons/abc", Some(user), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("invalid path"));

    let (status, body) = app
        .send("DELETE", &format!("/api/lessons/{lesson}/words/x"), Some(user), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("invalid path"));

    let (status, body) = app
        .send(
            "GET",
            &format!("/api/lessons/{lesson}/deck?direction=sideways"),
            Some(user),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("invalid query"));
}

#[tokio::test]
async fn lesson_ids_past_storage_range_are_not_found() {
    let app = TestApp::new();
    let user = UserId::random();
    let (status, body) = app
        .send("GET", &format!("/api/lessons/{}", u64::MAX), Some(user), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn foreign_lessons_look_missing() {
    let app = TestApp::new();
    let owner = UserId::random();
    let intruder = UserId::random();
    let lesson = app.create_lesson(owner, "Числа").await;
    let word = app.add_word(owner, lesson, "一", "один").await;

    let (status, _) = app
        .send("GET", &format!("/api/lessons/{lesson}"), Some(intruder), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            "DELETE",
            &format!("/api/lessons/{lesson}/words/{word}"),
            Some(intruder),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.send("GET", "/api/lessons", Some(intruder), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn word_update_and_delete() {
    let app = TestApp::new();
    let user = UserId::random();
    let lesson = app.create_lesson(user, "Їжа").await;
    let word = app.add_word(user, lesson, "水", "вода").await;

    let (status, body) = app
        .send(
            "PUT",
            &format!("/api/lessons/{lesson}/words/{word}"),
            Some(user),
            Some(json!({ "japanese": "水", "ukrainian": "вода", "furigana": "みず" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["furigana"], "みず");

    let (status, body) = app
        .send(
            "DELETE",
            &format!("/api/lessons/{lesson}/words/{word}"),
            Some(user),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = app
        .send("GET", &format!("/api/lessons/{lesson}/words"), Some(user), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn deck_follows_direction() {
    let app = TestApp::new();
    let user = UserId::random();
    let lesson = app.create_lesson(user, "Кольори").await;
    app.add_word(user, lesson, "赤", "червоний").await;
    app.add_word(user, lesson, "青", "синій").await;

    let (status, body) = app
        .send(
            "GET",
            &format!("/api/lessons/{lesson}/deck?direction=ukrainian_first"),
            Some(user),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_cards"], 2);
    assert_eq!(body["prompt_language"], "ukrainian");
    assert_eq!(body["cards"][0]["prompt"], "червоний");
    assert_eq!(body["cards"][0]["answer"], "赤");
    assert_eq!(body["cards"][1]["prompt"], "синій");
}

#[tokio::test]
async fn shuffled_deck_is_a_permutation() {
    let app = TestApp::new();
    let user = UserId::random();
    let lesson = app.create_lesson(user, "Цифри").await;
    let mut ids = Vec::new();
    for (ja, uk) in [("一", "один"), ("二", "два"), ("三", "три"), ("四", "чотири")] {
        ids.push(app.add_word(user, lesson, ja, uk).await);
    }

    let (status, body) = app
        .send(
            "GET",
            &format!("/api/lessons/{lesson}/deck?shuffle=true"),
            Some(user),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let mut dealt: Vec<u64> = body["cards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|card| card["word_id"].as_u64().unwrap())
        .collect();
    dealt.sort_unstable();
    ids.sort_unstable();
    assert_eq!(dealt, ids);
}

#[tokio::test]
async fn empty_deck_is_bad_request() {
    let app = TestApp::new();
    let user = UserId::random();
    let lesson = app.create_lesson(user, "Порожній").await;

    let (status, body) = app
        .send("GET", &format!("/api/lessons/{lesson}/deck"), Some(user), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "cannot start a session with an empty deck");
}

#[tokio::test]
async fn settings_are_public_but_admin_writable() {
    let app = TestApp::new();
    let settings = &app.services.storage().settings;
    settings
        .insert_flag(&AppSetting::new("registration_open", false).unwrap())
        .await
        .unwrap();
    let admin = UserId::random();
    settings.grant_admin(admin).await.unwrap();

    let (status, body) = app.send("GET", "/api/settings", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "registration_open": false }));

    let update = json!({ "key": "registration_open", "value": true });
    let (status, body) = app
        .send("PUT", "/api/settings", Some(UserId::random()), Some(update.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "admin access required");

    let (status, body) = app
        .send("PUT", "/api/settings", Some(admin), Some(update))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], true);

    let (status, _) = app
        .send(
            "PUT",
            "/api/settings",
            Some(admin),
            Some(json!({ "key": "no_such_flag", "value": true })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
