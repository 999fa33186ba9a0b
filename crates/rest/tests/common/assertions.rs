//! HTTP response assertions.

use axum_test::TestResponse;
use serde_json::Value;

/// Asserts that the response has the expected status code.
pub fn assert_status(response: &TestResponse, expected: u16) {
    let actual = response.status_code().as_u16();
    assert_eq!(
        actual,
        expected,
        "Expected status {}, got {}: {}",
        expected,
        actual,
        response.text()
    );
}

/// Asserts an error response with the given status and kind.
pub fn assert_error(response: &TestResponse, status: u16, kind: &str) {
    assert_status(response, status);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], kind, "unexpected error body: {}", body);
    assert!(body["message"].is_string());
}
