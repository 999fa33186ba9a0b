//! Integration tests for patient records and their QR images.

mod common;

use serde_json::{Value, json};

use common::assertions::{assert_error, assert_status};
use common::fixtures::{jane_roe, patient};
use common::harness::TestApp;

// ============================================================================
// CRUD Tests
// ============================================================================

#[tokio::test]
async fn test_create_assigns_token_and_image() {
    let app = TestApp::new().await;
    let (hospital_id, admin) = app.approved_hospital("city").await;

    let created = app.create_patient(&admin, &jane_roe()).await;
    let token = created["qrToken"].as_str().unwrap();

    assert_eq!(created["hospital"], hospital_id.as_str());
    assert_eq!(created["riskLevel"], "Medium");
    assert_eq!(token.len(), 43);
    assert_eq!(
        created["qrCodeUrl"].as_str().unwrap(),
        format!("/uploads/qr-{token}.png")
    );
    assert!(app.upload_dir().join(format!("qr-{token}.png")).exists());

    let image = app.server.get(&format!("/uploads/qr-{token}.png")).await;
    assert_status(&image, 200);
    assert_eq!(&image.as_bytes()[..4], b"\x89PNG");
}

#[tokio::test]
async fn test_create_defaults_and_validation() {
    let app = TestApp::new().await;
    let (_, admin) = app.approved_hospital("city").await;

    let created = app.create_patient(&admin, &patient("Ann")).await;
    assert_eq!(created["riskLevel"], "Low");
    assert_eq!(created["allergies"], json!([]));

    let mut too_old = patient("Old");
    too_old["age"] = json!(151);
    let response = app
        .server
        .post("/patients")
        .authorization_bearer(&admin)
        .json(&too_old)
        .await;
    assert_error(&response, 400, "ValidationError");

    let mut bad_blood = patient("Bad");
    bad_blood["bloodGroup"] = json!("C+");
    let response = app
        .server
        .post("/patients")
        .authorization_bearer(&admin)
        .json(&bad_blood)
        .await;
    assert_error(&response, 400, "ValidationError");

    let response = app
        .server
        .post("/patients")
        .authorization_bearer(&admin)
        .json(&json!({"fullName": "No Contact", "age": 5, "gender": "Male", "bloodGroup": "A+"}))
        .await;
    assert_error(&response, 400, "ValidationError");
}

#[tokio::test]
async fn test_list_newest_first() {
    let app = TestApp::new().await;
    let (_, admin) = app.approved_hospital("city").await;
    for name in ["First", "Second", "Third"] {
        app.create_patient(&admin, &patient(name)).await;
    }

    let body: Value = app
        .server
        .get("/patients")
        .authorization_bearer(&admin)
        .await
        .json();
    assert_eq!(body["count"], 3);
    let names: Vec<&str> = body["patients"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["fullName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Third", "Second", "First"]);
}

#[tokio::test]
async fn test_update_merges_and_keeps_identity() {
    let app = TestApp::new().await;
    let (hospital_id, admin) = app.approved_hospital("city").await;
    let (other_hospital, _) = app.approved_hospital("north").await;
    let created = app.create_patient(&admin, &jane_roe()).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .server
        .put(&format!("/patients/{id}"))
        .authorization_bearer(&admin)
        .json(&json!({
            "riskLevel": "High",
            "medications": ["Insulin"],
            "qrToken": "attacker-chosen",
            "qrCodeUrl": "/elsewhere.png",
            "hospital": other_hospital,
            "id": "new-id"
        }))
        .await;
    assert_status(&response, 200);

    let updated: Value = response.json::<Value>()["patient"].clone();
    assert_eq!(updated["id"], id);
    assert_eq!(updated["riskLevel"], "High");
    assert_eq!(updated["medications"], json!(["Insulin"]));
    assert_eq!(updated["allergies"], json!(["Penicillin"]));
    assert_eq!(updated["qrToken"], created["qrToken"]);
    assert_eq!(updated["qrCodeUrl"], created["qrCodeUrl"]);
    assert_eq!(updated["hospital"], hospital_id.as_str());
}

#[tokio::test]
async fn test_update_revalidates() {
    let app = TestApp::new().await;
    let (_, admin) = app.approved_hospital("city").await;
    let created = app.create_patient(&admin, &jane_roe()).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .server
        .put(&format!("/patients/{id}"))
        .authorization_bearer(&admin)
        .json(&json!({"age": -1}))
        .await;
    assert_error(&response, 400, "ValidationError");
}

#[tokio::test]
async fn test_delete_removes_record_and_image() {
    let app = TestApp::new().await;
    let (_, admin) = app.approved_hospital("city").await;
    let created = app.create_patient(&admin, &jane_roe()).await;
    let id = created["id"].as_str().unwrap();
    let token = created["qrToken"].as_str().unwrap();

    let response = app
        .server
        .delete(&format!("/patients/{id}"))
        .authorization_bearer(&admin)
        .await;
    assert_status(&response, 200);

    assert!(!app.upload_dir().join(format!("qr-{token}.png")).exists());

    let read = app
        .server
        .get(&format!("/patients/{id}"))
        .authorization_bearer(&admin)
        .await;
    assert_error(&read, 404, "NotFound");

    let public = app.server.get(&format!("/public/patient/{token}")).await;
    assert_error(&public, 404, "TokenNotFound");
}

#[tokio::test]
async fn test_qr_failure_removes_record() {
    let app = TestApp::with_failing_qr_store().await;
    let (_, admin) = app.approved_hospital("city").await;

    let response = app
        .server
        .post("/patients")
        .authorization_bearer(&admin)
        .json(&jane_roe())
        .await;
    assert_error(&response, 500, "InternalError");
    let body: Value = response.json();
    assert_eq!(body["message"], "Server error");

    let list: Value = app
        .server
        .get("/patients")
        .authorization_bearer(&admin)
        .await
        .json();
    assert_eq!(list["count"], 0);
}

// ============================================================================
// Owner Tests
// ============================================================================

#[tokio::test]
async fn test_owner_must_name_existing_hospital() {
    let app = TestApp::new().await;
    let (hospital_id, _) = app.approved_hospital("city").await;
    let owner = app.owner_token().await;

    let response = app
        .server
        .post("/patients")
        .authorization_bearer(&owner)
        .json(&patient("Ann"))
        .await;
    assert_error(&response, 400, "ValidationError");

    let mut unknown = patient("Ann");
    unknown["hospital"] = json!("no-such-hospital");
    let response = app
        .server
        .post("/patients")
        .authorization_bearer(&owner)
        .json(&unknown)
        .await;
    assert_error(&response, 400, "ValidationError");

    let mut filed = patient("Ann");
    filed["hospital"] = json!(hospital_id);
    let created = app.create_patient(&owner, &filed).await;
    assert_eq!(created["hospital"], hospital_id.as_str());
}

// ============================================================================
// Portal Account Tests
// ============================================================================

#[tokio::test]
async fn test_portal_account_reads_only_own_record() {
    let app = TestApp::new().await;
    let (_, admin) = app.approved_hospital("city").await;
    let other = app.create_patient(&admin, &patient("Other")).await;

    let mut body = jane_roe();
    body["portalAccess"] = json!({"email": "jane@mail.com", "password": "jane-pass"});
    let jane = app.create_patient(&admin, &body).await;

    let login = app
        .server
        .post("/auth/patient-login")
        .json(&json!({"email": "jane@mail.com", "password": "jane-pass"}))
        .await;
    assert_status(&login, 200);
    let login: Value = login.json();
    assert_eq!(login["user"]["role"], "PATIENT");
    let token = login["token"].as_str().unwrap();

    let list: Value = app
        .server
        .get("/patients")
        .authorization_bearer(token)
        .await
        .json();
    assert_eq!(list["count"], 1);
    assert_eq!(list["patients"][0]["id"], jane["id"]);

    let other_id = other["id"].as_str().unwrap();
    let response = app
        .server
        .get(&format!("/patients/{other_id}"))
        .authorization_bearer(token)
        .await;
    assert_error(&response, 404, "NotFound");

    let jane_id = jane["id"].as_str().unwrap();
    let response = app
        .server
        .put(&format!("/patients/{jane_id}"))
        .authorization_bearer(token)
        .json(&json!({"riskLevel": "Low"}))
        .await;
    assert_error(&response, 403, "Forbidden");

    let response = app
        .server
        .post("/patients")
        .authorization_bearer(token)
        .json(&patient("Eve"))
        .await;
    assert_error(&response, 403, "Forbidden");
}

#[tokio::test]
async fn test_portal_account_is_deleted_with_patient() {
    let app = TestApp::new().await;
    let (_, admin) = app.approved_hospital("city").await;

    let mut body = jane_roe();
    body["portalAccess"] = json!({"email": "jane@mail.com", "password": "jane-pass"});
    let jane = app.create_patient(&admin, &body).await;
    let jane_id = jane["id"].as_str().unwrap();

    app.server
        .delete(&format!("/patients/{jane_id}"))
        .authorization_bearer(&admin)
        .await;

    let login = app
        .server
        .post("/auth/patient-login")
        .json(&json!({"email": "jane@mail.com", "password": "jane-pass"}))
        .await;
    assert_error(&login, 401, "InvalidCredentials");
}

#[tokio::test]
async fn test_portal_email_must_be_free() {
    let app = TestApp::new().await;
    let (_, admin) = app.approved_hospital("city").await;

    let mut body = jane_roe();
    body["portalAccess"] = json!({"email": "admin@city.org", "password": "jane-pass"});
    let response = app
        .server
        .post("/patients")
        .authorization_bearer(&admin)
        .json(&body)
        .await;
    assert_error(&response, 400, "ValidationError");

    let list: Value = app
        .server
        .get("/patients")
        .authorization_bearer(&admin)
        .await
        .json();
    assert_eq!(list["count"], 0);
}
