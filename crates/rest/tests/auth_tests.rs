//! Integration tests for login and session tokens.

mod common;

use std::time::Duration;

use axum::http::{HeaderValue, header::AUTHORIZATION};
use medqr_rest::auth::{Claims, TokenIssuer};
use serde_json::{Value, json};

use common::assertions::{assert_error, assert_status};
use common::fixtures::{ADMIN_PASSWORD, OWNER_EMAIL, OWNER_PASSWORD, admin_email};
use common::harness::TestApp;

// ============================================================================
// Login Tests
// ============================================================================

#[tokio::test]
async fn test_owner_login_returns_profile_without_hash() {
    let app = TestApp::new().await;

    let response = app.login(OWNER_EMAIL, OWNER_PASSWORD).await;
    assert_status(&response, 200);

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["role"], "SUPER_ADMIN");
    assert_eq!(body["user"]["email"], OWNER_EMAIL);
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let app = TestApp::new().await;
    let response = app.login("  OWNER@SmartQR.com ", OWNER_PASSWORD).await;
    assert_status(&response, 200);
}

#[tokio::test]
async fn test_invalid_credentials() {
    let app = TestApp::new().await;

    let wrong_password = app.login(OWNER_EMAIL, "not-it").await;
    assert_error(&wrong_password, 401, "InvalidCredentials");

    let unknown = app.login("ghost@nowhere.org", OWNER_PASSWORD).await;
    assert_error(&unknown, 401, "InvalidCredentials");

    let a: Value = wrong_password.json();
    let b: Value = unknown.json();
    assert_eq!(a["message"], b["message"]);
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/auth/login")
        .json(&json!({"email": OWNER_EMAIL}))
        .await;
    assert_error(&response, 400, "ValidationError");
}

#[tokio::test]
async fn test_malformed_body_is_validation_error() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/auth/login")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;
    assert_error(&response, 400, "ValidationError");
}

#[tokio::test]
async fn test_pending_admin_then_approved() {
    let app = TestApp::new().await;
    let hospital_id = app.register("city").await;

    let pending = app.login(&admin_email("city"), ADMIN_PASSWORD).await;
    assert_error(&pending, 403, "AccountPending");

    // Wrong password never reveals the pending state.
    let wrong = app.login(&admin_email("city"), "bad-password").await;
    assert_error(&wrong, 401, "InvalidCredentials");

    let owner = app.owner_token().await;
    app.server
        .patch(&format!("/hospitals/{hospital_id}/approve"))
        .authorization_bearer(&owner)
        .await;

    let response = app.login(&admin_email("city"), ADMIN_PASSWORD).await;
    assert_status(&response, 200);
    let body: Value = response.json();
    assert_eq!(body["user"]["role"], "HOSPITAL_ADMIN");
    assert_eq!(body["user"]["hospital"], hospital_id.as_str());
}

#[tokio::test]
async fn test_rejected_admin_cannot_log_in() {
    let app = TestApp::new().await;
    let (hospital_id, _) = app.approved_hospital("city").await;
    let owner = app.owner_token().await;

    let response = app
        .server
        .patch(&format!("/hospitals/{hospital_id}/reject"))
        .authorization_bearer(&owner)
        .await;
    assert_status(&response, 200);

    let login = app.login(&admin_email("city"), ADMIN_PASSWORD).await;
    assert_error(&login, 403, "AccountPending");
}

#[tokio::test]
async fn test_patient_login_rejects_staff() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/auth/patient-login")
        .json(&json!({"email": OWNER_EMAIL, "password": OWNER_PASSWORD}))
        .await;
    assert_error(&response, 401, "InvalidCredentials");
}

#[tokio::test]
async fn test_me_returns_own_account() {
    let app = TestApp::new().await;
    let (hospital_id, token) = app.approved_hospital("city").await;

    let response = app.server.get("/auth/me").authorization_bearer(&token).await;
    assert_status(&response, 200);

    let body: Value = response.json();
    assert_eq!(body["user"]["email"], admin_email("city"));
    assert_eq!(body["user"]["hospital"], hospital_id.as_str());
    assert_eq!(body["user"]["isActive"], true);
}

// ============================================================================
// Token Failure Tests
// ============================================================================

#[tokio::test]
async fn test_missing_token() {
    let app = TestApp::new().await;
    let response = app.server.get("/patients").await;
    assert_error(&response, 401, "Unauthenticated");
}

#[tokio::test]
async fn test_garbled_token() {
    let app = TestApp::new().await;
    let response = app
        .server
        .get("/patients")
        .authorization_bearer("garbage.token.value")
        .await;
    assert_error(&response, 401, "Unauthenticated");
}

#[tokio::test]
async fn test_non_bearer_scheme() {
    let app = TestApp::new().await;
    let response = app
        .server
        .get("/patients")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Basic b3duZXI6cGFzcw=="))
        .await;
    assert_error(&response, 401, "Unauthenticated");
}

#[tokio::test]
async fn test_wrong_secret() {
    let app = TestApp::new().await;
    let forged = TokenIssuer::new(
        "someone-elses-secret-someone-elses",
        Duration::from_secs(3600),
    );
    let owner_claims = {
        let token = app.owner_token().await;
        TokenIssuer::new(&app.config.jwt_secret, app.config.token_ttl())
            .verify(&token)
            .unwrap()
    };

    let token = forged.issue(&owner_claims).unwrap();
    let response = app.server.get("/hospitals").authorization_bearer(&token).await;
    assert_error(&response, 401, "Unauthenticated");
}

#[tokio::test]
async fn test_expired_token() {
    let app = TestApp::new().await;
    let issuer = TokenIssuer::new(&app.config.jwt_secret, app.config.token_ttl());
    let principal = issuer.verify(&app.owner_token().await).unwrap();

    let now = chrono::Utc::now().timestamp();
    let mut claims = Claims::for_principal(&principal, now - 7200, Duration::from_secs(60));
    claims.exp = now - 3600;
    let expired = issuer.sign(&claims).unwrap();

    let response = app
        .server
        .get("/hospitals")
        .authorization_bearer(&expired)
        .await;
    assert_error(&response, 401, "Unauthenticated");
}

#[tokio::test]
async fn test_token_lifetime_matches_config() {
    let app = TestApp::new().await;
    let token = app.owner_token().await;

    let data = jsonwebtoken::decode::<Claims>(
        &token,
        &jsonwebtoken::DecodingKey::from_secret(app.config.jwt_secret.as_bytes()),
        &jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256),
    )
    .unwrap();

    let ttl = data.claims.exp - data.claims.iat;
    assert_eq!(ttl, app.config.token_ttl().as_secs() as i64);
    assert_eq!(data.claims.role.as_str(), "SUPER_ADMIN");
}
