//! Shared integration-test server bootstrap helpers.

use axum_test::TestServer;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use upcast_server::{create_app, AppState, Config, Database};

pub(crate) fn test_config_for_db_path(db_path: &Path) -> Config {
    Config {
        port: 0,
        db_path: db_path.to_str().expect("db path").to_string(),
        max_body_size: 64 * 1024,
        app_url: "https://upcast.test".to_string(),
        push_notifications: false,
        push_timeout_ms: 500,
    }
}

pub(crate) fn test_server_for_config(config: Config) -> TestServer {
    let db = Database::new(config.db_path.as_str()).expect("open db");
    let state = AppState::new(config, db);
    TestServer::new(create_app(state, false)).expect("server")
}

pub(crate) fn setup_test_server() -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("test.db");
    let server = test_server_for_config(test_config_for_db_path(&db_path));
    (server, temp_dir)
}

pub(crate) async fn create_user(server: &TestServer, fid: u64, username: &str) -> String {
    let response = server
        .post("/api/users")
        .json(&json!({ "fid": fid, "username": username }))
        .await;
    let user: Value = response.json();
    user["id"].as_str().expect("user id").to_string()
}

pub(crate) async fn create_project(server: &TestServer, owner_id: &str, name: &str) -> String {
    let response = server
        .post("/api/projects")
        .json(&json!({
            "name": name,
            "tagline": format!("{} tagline", name),
            "creator_id": owner_id,
        }))
        .await;
    let project: Value = response.json();
    project["id"].as_str().expect("project id").to_string()
}

/// Poll a user's feed until `expected` notifications are visible.
///
/// Notifications are recorded on a background task after the response.
pub(crate) async fn wait_for_notifications(
    server: &TestServer,
    user_id: &str,
    expected: usize,
) -> Vec<Value> {
    let path = format!("/api/users/{}/notifications", user_id);
    let mut listed = Vec::new();
    for _ in 0..50 {
        listed = server.get(&path).await.json::<Vec<Value>>();
        if listed.len() >= expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    listed
}
