//! HTTP-level tests for the learner CEU workflow: start, quiz, evaluation,
//! and certificate issuance.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, complete_evaluation, evaluation_body, get_auth, issue_certificate,
    post_json_auth, seed_learner, seed_module, seed_profile, token_for,
};
use interpret_events::{EventBus, EVENT_CERTIFICATE_ISSUED, EVENT_QUIZ_PASSED};
use sqlx::PgPool;

async fn start(pool: &PgPool, token: &str, module_id: uuid::Uuid) -> (StatusCode, serde_json::Value) {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/ceu/progress",
        token,
        serde_json::json!({ "module_id": module_id }),
    )
    .await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn quiz(pool: &PgPool, token: &str, progress_id: &str, score: i32) -> (StatusCode, serde_json::Value) {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/ceu/progress/{progress_id}/quiz"),
        token,
        serde_json::json!({ "score": score }),
    )
    .await;
    let status = response.status();
    (status, body_json(response).await)
}

// ---------------------------------------------------------------------------
// Modules and progress
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_modules_returns_active_modules(pool: PgPool) {
    let (_, token) = seed_learner(&pool).await;
    let module = seed_module(&pool).await;

    let response = get_auth(build_test_app(pool), "/api/v1/ceu/modules", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let modules = json["data"].as_array().unwrap();
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0]["id"], module.id.to_string());
    assert_eq!(modules[0]["passing_score"], 80);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn starting_a_module_twice_returns_the_open_attempt(pool: PgPool) {
    let (_, token) = seed_learner(&pool).await;
    let module = seed_module(&pool).await;

    let (status, first) = start(&pool, &token, module.id).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["data"]["status"], "in_progress");

    let (status, second) = start(&pool, &token, module.id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"]["id"], first["data"]["id"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn starting_unknown_module_returns_404(pool: PgPool) {
    let (_, token) = seed_learner(&pool).await;

    let (status, json) = start(&pool, &token, uuid::Uuid::new_v4()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn first_write_creates_profile_from_token(pool: PgPool) {
    let user_id = uuid::Uuid::new_v4();
    let token = token_for(user_id, "new.learner@example.com");
    let module = seed_module(&pool).await;

    let (status, json) = start(&pool, &token, module.id).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["user_id"], user_id.to_string());

    let (email, role): (String, String) =
        sqlx::query_as("SELECT email, role FROM profiles WHERE id = $1")
            .bind(user_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(email, "new.learner@example.com");
    assert_eq!(role, "user");
}

// ---------------------------------------------------------------------------
// Quiz gate
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn failing_then_passing_quiz(pool: PgPool) {
    let (_, token) = seed_learner(&pool).await;
    let module = seed_module(&pool).await;
    let (_, progress) = start(&pool, &token, module.id).await;
    let progress_id = progress["data"]["id"].as_str().unwrap().to_string();

    let (status, json) = quiz(&pool, &token, &progress_id, 60).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["passed"], false);
    assert_eq!(json["data"]["progress"]["status"], "quiz_failed");

    let (_, json) = quiz(&pool, &token, &progress_id, 80).await;
    assert_eq!(json["data"]["passed"], true);
    assert_eq!(json["data"]["progress"]["status"], "quiz_passed");

    // A later failing attempt does not undo the pass.
    let (_, json) = quiz(&pool, &token, &progress_id, 10).await;
    assert_eq!(json["data"]["passed"], false);
    assert_eq!(json["data"]["progress"]["status"], "quiz_passed");
    assert_eq!(json["data"]["progress"]["quiz_score"], 80);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn out_of_range_quiz_score_returns_400(pool: PgPool) {
    let (_, token) = seed_learner(&pool).await;
    let module = seed_module(&pool).await;
    let (_, progress) = start(&pool, &token, module.id).await;
    let progress_id = progress["data"]["id"].as_str().unwrap().to_string();

    let (status, json) = quiz(&pool, &token, &progress_id, 101).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn quiz_on_another_users_progress_returns_404(pool: PgPool) {
    let (_, token) = seed_learner(&pool).await;
    let other = seed_profile(&pool, "Sam Other", "sam@example.com", None, "user").await;
    let other_token = token_for(other.id, &other.email);
    let module = seed_module(&pool).await;
    let (_, progress) = start(&pool, &token, module.id).await;
    let progress_id = progress["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = quiz(&pool, &other_token, &progress_id, 95).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn passing_quiz_publishes_event_once(pool: PgPool) {
    let (learner, token) = seed_learner(&pool).await;
    let module = seed_module(&pool).await;
    let (_, progress) = start(&pool, &token, module.id).await;
    let progress_id = progress["data"]["id"].as_str().unwrap().to_string();

    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();

    for score in [90, 95] {
        post_json_auth(
            common::build_test_app_with_bus(pool.clone(), Arc::clone(&bus)),
            &format!("/api/v1/ceu/progress/{progress_id}/quiz"),
            &token,
            serde_json::json!({ "score": score }),
        )
        .await;
    }

    let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.event_type, EVENT_QUIZ_PASSED);
    assert_eq!(event.actor_user_id, Some(learner.id));
    assert_eq!(event.payload["module_title"], "Ethical Decision-Making");
    assert!(rx.try_recv().is_err(), "second pass must not publish again");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_pass_and_fail_never_downgrade(pool: PgPool) {
    let (_, token) = seed_learner(&pool).await;

    for _ in 0..10 {
        let module = seed_module(&pool).await;
        let (_, progress) = start(&pool, &token, module.id).await;
        let progress_id = progress["data"]["id"].as_str().unwrap().to_string();

        let ((pass, _), (fail, _)) = tokio::join!(
            quiz(&pool, &token, &progress_id, 95),
            quiz(&pool, &token, &progress_id, 10),
        );
        assert_eq!(pass, StatusCode::OK);
        assert_eq!(fail, StatusCode::OK);

        let (status, score): (String, Option<i32>) = sqlx::query_as(
            "SELECT status, quiz_score FROM user_module_progress WHERE id = $1::uuid",
        )
        .bind(&progress_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(status, "quiz_passed");
        assert_eq!(score, Some(95));
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_passes_publish_one_event(pool: PgPool) {
    let (_, token) = seed_learner(&pool).await;
    let module = seed_module(&pool).await;
    let (_, progress) = start(&pool, &token, module.id).await;
    let progress_id = progress["data"]["id"].as_str().unwrap().to_string();

    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();
    let uri = format!("/api/v1/ceu/progress/{progress_id}/quiz");
    let attempt = |score: i32| {
        post_json_auth(
            common::build_test_app_with_bus(pool.clone(), Arc::clone(&bus)),
            &uri,
            &token,
            serde_json::json!({ "score": score }),
        )
    };

    let (first, second) = tokio::join!(attempt(90), attempt(95));
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);

    let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.event_type, EVENT_QUIZ_PASSED);
    assert!(rx.try_recv().is_err(), "only the first pass publishes");
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn evaluation_before_passing_quiz_is_rejected(pool: PgPool) {
    let (learner, token) = seed_learner(&pool).await;
    let module = seed_module(&pool).await;
    let (_, progress) = start(&pool, &token, module.id).await;
    let progress_id = progress["data"]["id"].as_str().unwrap().to_string();

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/ceu/evaluation",
        &token,
        evaluation_body(learner.id, module.id, &progress_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "PRECONDITION_FAILED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn evaluation_with_missing_rating_writes_nothing(pool: PgPool) {
    let (learner, token) = seed_learner(&pool).await;
    let module = seed_module(&pool).await;
    let (_, progress) = start(&pool, &token, module.id).await;
    let progress_id = progress["data"]["id"].as_str().unwrap().to_string();
    quiz(&pool, &token, &progress_id, 100).await;

    let mut body = evaluation_body(learner.id, module.id, &progress_id);
    body.as_object_mut().unwrap().remove("q3");
    body["q4"] = serde_json::json!(6);

    let response =
        post_json_auth(build_test_app(pool.clone()), "/api/v1/ceu/evaluation", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("q3") && message.contains("q4"), "got: {message}");

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ceu_evaluations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn evaluation_with_non_integer_rating_is_a_validation_error(pool: PgPool) {
    let (learner, token) = seed_learner(&pool).await;
    let module = seed_module(&pool).await;
    let (_, progress) = start(&pool, &token, module.id).await;
    let progress_id = progress["data"]["id"].as_str().unwrap().to_string();
    quiz(&pool, &token, &progress_id, 100).await;

    for bad in [serde_json::json!(70000), serde_json::json!(4.5), serde_json::json!("5")] {
        let mut body = evaluation_body(learner.id, module.id, &progress_id);
        body["q1"] = bad.clone();

        let response =
            post_json_auth(build_test_app(pool.clone()), "/api/v1/ceu/evaluation", &token, body)
                .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "q1 = {bad}");
        let json = body_json(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert!(json["error"].as_str().unwrap().contains("q1"));
    }

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ceu_evaluations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn evaluation_for_another_user_is_forbidden(pool: PgPool) {
    let (learner, _) = seed_learner(&pool).await;
    let other = seed_profile(&pool, "Sam Other", "sam@example.com", None, "user").await;
    let other_token = token_for(other.id, &other.email);
    let module = seed_module(&pool).await;

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/ceu/evaluation",
        &other_token,
        evaluation_body(learner.id, module.id, &uuid::Uuid::new_v4().to_string()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn evaluation_retry_returns_stored_evaluation(pool: PgPool) {
    let (learner, token) = seed_learner(&pool).await;
    let module = seed_module(&pool).await;
    let (progress_id, evaluation_id) = complete_evaluation(&pool, &learner, &token, &module).await;

    let mut retry = evaluation_body(learner.id, module.id, &progress_id);
    retry["q1"] = serde_json::json!(1);
    let response =
        post_json_auth(build_test_app(pool.clone()), "/api/v1/ceu/evaluation", &token, retry).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["evaluation"]["id"], evaluation_id);
    assert_eq!(json["evaluation"]["objectives_clear"], 5);
    // Blank free text is stored as null.
    assert!(json["evaluation"]["suggestions"].is_null());

    let response = get_auth(
        build_test_app(pool),
        &format!("/api/v1/ceu/modules/{}/status", module.id),
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "EVALUATED");
    assert_eq!(json["data"]["progress"]["evaluation_completed"], true);
}

// ---------------------------------------------------------------------------
// Certificate issuance
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn full_workflow_issues_one_certificate(pool: PgPool) {
    let (learner, token) = seed_learner(&pool).await;
    let module = seed_module(&pool).await;
    let (_, evaluation_id) = complete_evaluation(&pool, &learner, &token, &module).await;

    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();
    let response = post_json_auth(
        common::build_test_app_with_bus(pool.clone(), Arc::clone(&bus)),
        "/api/v1/ceu/certificate",
        &token,
        serde_json::json!({
            "action": "issue_certificate_after_evaluation",
            "module_id": module.id,
            "evaluation_id": evaluation_id,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let first = body_json(response).await;
    assert_eq!(first["success"], true);
    assert_eq!(first["already_issued"], false);
    let certificate = &first["certificate"];
    let number = certificate["certificate_number"].as_str().unwrap();
    assert!(number.starts_with("IR-"), "got: {number}");
    assert_eq!(number.len(), "IR-2026-000001".len());
    assert_eq!(certificate["title"], "Ethical Decision-Making");
    assert_eq!(certificate["ceu_value"], 0.3);
    assert_eq!(certificate["rid_category"], "PPO");
    assert_eq!(certificate["rid_activity_type"], "Independent Study");
    assert_eq!(certificate["sponsor_number"], "2309");
    assert_eq!(certificate["assessment_score"], 90);
    assert_eq!(certificate["status"], "active");

    let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.event_type, EVENT_CERTIFICATE_ISSUED);
    assert_eq!(event.source_entity_id.unwrap().to_string(), certificate["id"].as_str().unwrap());

    // Retrying returns the same certificate.
    let second = issue_certificate(&pool, &token, &module, &evaluation_id).await;
    assert_eq!(second["already_issued"], true);
    assert_eq!(second["certificate"]["id"], certificate["id"]);

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/ceu/certificates", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let response = get_auth(
        build_test_app(pool),
        &format!("/api/v1/ceu/modules/{}/status", module.id),
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "CERTIFICATE_ISSUED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn certificate_numbers_are_sequential(pool: PgPool) {
    let (learner, token) = seed_learner(&pool).await;
    let first_module = seed_module(&pool).await;
    let second_module = seed_module(&pool).await;

    let (_, eval_a) = complete_evaluation(&pool, &learner, &token, &first_module).await;
    let (_, eval_b) = complete_evaluation(&pool, &learner, &token, &second_module).await;

    let a = issue_certificate(&pool, &token, &first_module, &eval_a).await;
    let b = issue_certificate(&pool, &token, &second_module, &eval_b).await;

    let seq = |v: &serde_json::Value| -> i64 {
        v["certificate"]["certificate_number"]
            .as_str()
            .unwrap()
            .rsplit('-')
            .next()
            .unwrap()
            .parse()
            .unwrap()
    };
    assert_eq!(seq(&b), seq(&a) + 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn issuance_requires_the_callers_evaluation(pool: PgPool) {
    let (learner, token) = seed_learner(&pool).await;
    let other = seed_profile(&pool, "Sam Other", "sam@example.com", None, "user").await;
    let other_token = token_for(other.id, &other.email);
    let module = seed_module(&pool).await;
    let (_, evaluation_id) = complete_evaluation(&pool, &learner, &token, &module).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/ceu/certificate",
        &other_token,
        serde_json::json!({
            "action": "issue_certificate_after_evaluation",
            "module_id": module.id,
            "evaluation_id": evaluation_id,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "PRECONDITION_FAILED");

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/ceu/certificate",
        &token,
        serde_json::json!({
            "action": "issue_certificate_after_evaluation",
            "module_id": module.id,
            "evaluation_id": uuid::Uuid::new_v4(),
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn issuance_rejects_unknown_action(pool: PgPool) {
    let (learner, token) = seed_learner(&pool).await;
    let module = seed_module(&pool).await;
    let (_, evaluation_id) = complete_evaluation(&pool, &learner, &token, &module).await;

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/ceu/certificate",
        &token,
        serde_json::json!({
            "action": "issue_now",
            "module_id": module.id,
            "evaluation_id": evaluation_id,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}
