#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use interpret_api::auth::jwt::{generate_access_token, JwtConfig};
use interpret_api::config::ServerConfig;
use interpret_api::router::build_app_router;
use interpret_api::state::AppState;
use interpret_db::models::profile::{Profile, UpsertProfile};
use interpret_db::models::skill_module::{CreateSkillModule, SkillModule};
use interpret_db::repositories::{ProfileRepo, SkillModuleRepo};
use interpret_events::EventBus;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const PUBLIC_BASE_URL: &str = "https://verify.example.com";

/// Build a test `ServerConfig` with safe defaults.
///
/// `ADMIN_EMAIL` is on the allowlist; everyone else needs an admin profile
/// role to reach `/admin`.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        // The pool is handed in by `#[sqlx::test]`; this value is never dialed.
        database_url: "postgres://localhost/interpret_test".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        db_timeout_secs: 10,
        admin_emails: vec![ADMIN_EMAIL.to_string()],
        public_base_url: PUBLIC_BASE_URL.to_string(),
        sponsor_number: "2309".to_string(),
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the full application router, the same way `main.rs` does.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_bus(pool, Arc::new(EventBus::default()))
}

/// Like [`build_test_app`], with a caller-owned event bus so tests can
/// subscribe before making requests.
pub fn build_test_app_with_bus(pool: PgPool, event_bus: Arc<EventBus>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus,
    };
    build_app_router(state, &config)
}

/// Mint a bearer token for `user_id` signed with the test secret.
pub fn token_for(user_id: Uuid, email: &str) -> String {
    generate_access_token(user_id, Some(email), &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn seed_profile(
    pool: &PgPool,
    full_name: &str,
    email: &str,
    rid_member_number: Option<&str>,
    role: &str,
) -> Profile {
    ProfileRepo::upsert(
        pool,
        &UpsertProfile {
            id: Uuid::new_v4(),
            full_name: full_name.to_string(),
            email: email.to_string(),
            rid_member_number: rid_member_number.map(str::to_string),
            role: role.to_string(),
        },
    )
    .await
    .unwrap()
}

pub async fn seed_learner(pool: &PgPool) -> (Profile, String) {
    let profile = seed_profile(pool, "Maria Lopez", "maria@example.com", Some("123456"), "user").await;
    let token = token_for(profile.id, &profile.email);
    (profile, token)
}

pub async fn seed_admin(pool: &PgPool) -> (Profile, String) {
    let profile = seed_profile(pool, "Site Admin", ADMIN_EMAIL, None, "user").await;
    let token = token_for(profile.id, &profile.email);
    (profile, token)
}

pub async fn seed_module(pool: &PgPool) -> SkillModule {
    SkillModuleRepo::create(
        pool,
        &CreateSkillModule {
            title: "Ethical Decision-Making".to_string(),
            description: Some("Applying the CPC to real assignments".to_string()),
            learning_objectives: vec!["Identify ethical tension points".to_string()],
            ceu_value: 0.3,
            rid_category: "PPO".to_string(),
            rid_subcategory: Some("Ethics".to_string()),
            rid_activity_type: None,
            passing_score: None,
        },
    )
    .await
    .unwrap()
}

/// A complete evaluation body for `progress_id`.
pub fn evaluation_body(user_id: Uuid, module_id: Uuid, progress_id: &str) -> serde_json::Value {
    serde_json::json!({
        "user_id": user_id,
        "module_id": module_id,
        "progress_id": progress_id,
        "q1": 5,
        "q2": 4,
        "q3": 5,
        "q4": 4,
        "q5": "The case studies",
        "q6": "  ",
    })
}

/// Drive a learner through start, a passing quiz, and the evaluation.
///
/// Returns `(progress_id, evaluation_id)`.
pub async fn complete_evaluation(
    pool: &PgPool,
    learner: &Profile,
    token: &str,
    module: &SkillModule,
) -> (String, String) {
    complete_evaluation_with_bus(pool, Arc::new(EventBus::default()), learner, token, module).await
}

/// Like [`complete_evaluation`], publishing lifecycle events on `event_bus`.
pub async fn complete_evaluation_with_bus(
    pool: &PgPool,
    event_bus: Arc<EventBus>,
    learner: &Profile,
    token: &str,
    module: &SkillModule,
) -> (String, String) {
    let app = || build_test_app_with_bus(pool.clone(), Arc::clone(&event_bus));

    let response = post_json_auth(
        app(),
        "/api/v1/ceu/progress",
        token,
        serde_json::json!({ "module_id": module.id }),
    )
    .await;
    let progress = body_json(response).await;
    let progress_id = progress["data"]["id"].as_str().unwrap().to_string();

    post_json_auth(
        app(),
        &format!("/api/v1/ceu/progress/{progress_id}/quiz"),
        token,
        serde_json::json!({ "score": 90 }),
    )
    .await;

    let response = post_json_auth(
        app(),
        "/api/v1/ceu/evaluation",
        token,
        evaluation_body(learner.id, module.id, &progress_id),
    )
    .await;
    let evaluation = body_json(response).await;
    let evaluation_id = evaluation["evaluation"]["id"].as_str().unwrap().to_string();

    (progress_id, evaluation_id)
}

/// Issue the certificate for a completed evaluation. Returns the response
/// body.
pub async fn issue_certificate(
    pool: &PgPool,
    token: &str,
    module: &SkillModule,
    evaluation_id: &str,
) -> serde_json::Value {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/ceu/certificate",
        token,
        serde_json::json!({
            "action": "issue_certificate_after_evaluation",
            "module_id": module.id,
            "evaluation_id": evaluation_id,
        }),
    )
    .await;
    body_json(response).await
}
