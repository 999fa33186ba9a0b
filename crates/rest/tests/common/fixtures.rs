//! Request bodies used across the integration tests.

use serde_json::{Value, json};

/// Email of the bootstrap owner in [`ServerConfig::for_testing`](medqr_rest::ServerConfig::for_testing).
pub const OWNER_EMAIL: &str = "owner@smartqr.com";

/// Password of the bootstrap owner in the test configuration.
pub const OWNER_PASSWORD: &str = "owner-password";

/// Password used for every hospital admin created by the fixtures.
pub const ADMIN_PASSWORD: &str = "secret1";

/// Registration body for a hospital identified by `slug`.
pub fn registration(slug: &str) -> Value {
    json!({
        "name": format!("{slug} General"),
        "email": format!("{slug}@hospital.org"),
        "phone": "+1 555 0100",
        "address": "1 Main St",
        "adminName": format!("{slug} Admin"),
        "adminEmail": admin_email(slug),
        "adminPassword": ADMIN_PASSWORD,
    })
}

/// Admin email for the hospital identified by `slug`.
pub fn admin_email(slug: &str) -> String {
    format!("admin@{slug}.org")
}

/// Patient body for Jane Roe.
pub fn jane_roe() -> Value {
    json!({
        "fullName": "Jane Roe",
        "age": 40,
        "gender": "Female",
        "bloodGroup": "O-",
        "allergies": ["Penicillin"],
        "medicalConditions": ["Asthma"],
        "medications": ["Salbutamol"],
        "emergencyContact": {"name": "Bob", "phone": "+1 555 0199"},
        "riskLevel": "Medium",
        "aiSummary": "Staff-only note"
    })
}

/// Minimal patient body with the given name.
pub fn patient(name: &str) -> Value {
    json!({
        "fullName": name,
        "age": 30,
        "gender": "Other",
        "bloodGroup": "AB+",
        "emergencyContact": {"name": "Kin", "phone": "555-0100"}
    })
}
