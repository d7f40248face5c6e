mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt; // for .oneshot()

use medidiagnose_backend::model::user::UserRole;
use medidiagnose_backend::model::verification::VerificationRecord;
use medidiagnose_backend::repository::user_repo::UserRepository;
use medidiagnose_backend::repository::verification_repo::VerificationRepository;
use medidiagnose_backend::router::auth_router::auth_router;
use medidiagnose_backend::util::jwt::JwtTokenUtils;

use common::{auth_env, make_user, test_jwt_utils};

fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_register_password_mismatch_is_rejected_before_any_write() {
    let env = auth_env();
    let app = auth_router(env.service.clone());

    let req = json_request(
        "/auth/register",
        json!({
            "full_name": "Jordan Doe",
            "email": "jordan@example.com",
            "password": "password123",
            "confirm_password": "password124"
        }),
    );
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Nothing was persisted
    assert!(env.user_repo.users.lock().unwrap().is_empty());
    assert!(env.verification_repo.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let env = auth_env();
    let app = auth_router(env.service.clone());

    let body = json!({
        "full_name": "Jordan Doe",
        "email": "jordan@example.com",
        "password": "password123",
        "confirm_password": "password123"
    });
    let resp = app
        .clone()
        .oneshot(json_request("/auth/register", body.clone()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(json_request("/auth/register", body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_invalid_email_is_rejected() {
    let env = auth_env();
    let app = auth_router(env.service.clone());

    let req = json_request(
        "/auth/register",
        json!({
            "full_name": "Jordan Doe",
            "email": "not-an-email",
            "password": "password123",
            "confirm_password": "password123"
        }),
    );
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dev_register_then_login_returns_decodable_token() {
    let env = auth_env();
    let app = auth_router(env.service.clone());

    let resp = app
        .clone()
        .oneshot(json_request(
            "/auth/register",
            json!({
                "full_name": "Jordan Doe",
                "email": "jordan@example.com",
                "password": "password123",
                "confirm_password": "password123"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let register_json = body_json(resp).await;
    // Development mode activates the account immediately
    assert_eq!(register_json["user"]["is_active"], json!(true));

    let resp = app
        .oneshot(json_request(
            "/auth/login",
            json!({
                "email": "jordan@example.com",
                "password": "password123"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let login_json = body_json(resp).await;

    let token = login_json["token"]["access_token"].as_str().unwrap();
    let claims = test_jwt_utils().validate_token(token).unwrap();
    assert_eq!(claims.email, "jordan@example.com");
    assert!(!claims.is_staff);
    assert!(!claims.is_superuser);
    assert_eq!(login_json["user"]["is_active"], json!(true));
}

#[tokio::test]
async fn test_login_unknown_email_and_wrong_password_are_indistinguishable() {
    let env = auth_env();
    let user = make_user("known@example.com", UserRole::Patient, "password123");
    env.user_repo.insert(user).await.unwrap();
    let app = auth_router(env.service.clone());

    let unknown = app
        .clone()
        .oneshot(json_request(
            "/auth/login",
            json!({ "email": "nobody@example.com", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown_body = body_json(unknown).await;

    let wrong = app
        .oneshot(json_request(
            "/auth/login",
            json!({ "email": "known@example.com", "password": "wrongpassword" }),
        ))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong_body = body_json(wrong).await;

    // Same body for both, so the endpoint cannot enumerate accounts
    assert_eq!(unknown_body, wrong_body);
}

#[tokio::test]
async fn test_verify_activates_user_and_consumes_code() {
    let env = auth_env();

    let mut user = make_user("pending@example.com", UserRole::Patient, "password123");
    user.is_active = false;
    let user = env.user_repo.insert(user).await.unwrap();
    env.verification_repo
        .insert(VerificationRecord::new_verify(
            user.id.unwrap(),
            "code-1234".to_string(),
        ))
        .await
        .unwrap();

    let app = auth_router(env.service.clone());
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/auth/verify?code=code-1234")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let activated = env
        .user_repo
        .find_by_email("pending@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(activated.is_active);

    // The code is one-time: a second call no longer finds it
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/auth/verify?code=code-1234")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_verify_unknown_code_is_not_found() {
    let env = auth_env();
    let app = auth_router(env.service.clone());

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/auth/verify?code=no-such-code")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
