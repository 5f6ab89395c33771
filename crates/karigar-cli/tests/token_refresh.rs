//! Integration tests for the 401 refresh-and-replay pipeline, end to end
//! through the binary.


use predicates::prelude::*;
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fixtures::{karigar, write_session};

fn profile_body(username: &str) -> serde_json::Value {
    json!({
        "id": 1,
        "username": username,
        "email": format!("{username}@example.com"),
        "user_type": "customer",
        "is_verified": true
    })
}

/// Test: a 401 triggers one refresh, the call is replayed with the new
/// token, and the rotated token is persisted next to the old refresh token.
#[tokio::test(flavor = "multi_thread")]
async fn test_whoami_refreshes_and_replays() {
    let temp = tempdir().unwrap();
    let server = MockServer::start().await;
    write_session(temp.path(), "A1", "R1", "alice");

    Mock::given(method("GET"))
        .and(path("/auth/profile/"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Given token not valid"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/token/refresh/"))
        .and(body_json(json!({"refresh": "R1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A2"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/profile/"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body("alice")))
        .expect(1)
        .mount(&server)
        .await;

    karigar(temp.path(), &server.uri())
        .args(["whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice"));

    let contents = std::fs::read_to_string(temp.path().join("session.json")).unwrap();
    assert!(contents.contains("A2"), "rotated access token persisted");
    assert!(contents.contains("R1"), "refresh token survives rotation");
    assert!(!contents.contains("A1"), "old access token replaced");
}

/// Test: a failed refresh clears the whole session and tells the user to
/// log in again.
#[tokio::test(flavor = "multi_thread")]
async fn test_refresh_failure_clears_session() {
    let temp = tempdir().unwrap();
    let server = MockServer::start().await;
    write_session(temp.path(), "A1", "R1", "alice");

    Mock::given(method("GET"))
        .and(path("/auth/profile/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Given token not valid"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Token is invalid or expired"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    karigar(temp.path(), &server.uri())
        .args(["whoami"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("session expired"));

    assert!(
        !temp.path().join("session.json").exists(),
        "session cleared after refresh failure"
    );
}

/// Test: a replay that 401s again is final; the refresh endpoint is hit
/// exactly once.
#[tokio::test(flavor = "multi_thread")]
async fn test_replay_401_is_not_retried_again() {
    let temp = tempdir().unwrap();
    let server = MockServer::start().await;
    write_session(temp.path(), "A1", "R1", "alice");

    Mock::given(method("GET"))
        .and(path("/auth/profile/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Still not valid"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A2"})))
        .expect(1)
        .mount(&server)
        .await;

    karigar(temp.path(), &server.uri())
        .args(["whoami"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("HTTP 401"));
}

/// Test: a corrupt session file is treated as no session; the request goes
/// out unauthenticated and the file is healed away.
#[tokio::test(flavor = "multi_thread")]
async fn test_corrupt_session_self_heals() {
    let temp = tempdir().unwrap();
    let server = MockServer::start().await;
    std::fs::create_dir_all(temp.path()).unwrap();
    std::fs::write(temp.path().join("session.json"), "{definitely not json").unwrap();

    Mock::given(method("GET"))
        .and(path("/services/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    karigar(temp.path(), &server.uri())
        .args(["services", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No services found."));

    assert!(
        !temp.path().join("session.json").exists(),
        "corrupt session file removed"
    );
}
