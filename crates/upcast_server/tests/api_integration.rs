//! Integration tests for the Upcast HTTP API.

mod support;

use axum::http::StatusCode;
use serde_json::{json, Value};
use support::{create_project, create_user, setup_test_server, wait_for_notifications};

#[tokio::test]
async fn health_reports_ok() {
    let (server, _temp) = setup_test_server();
    let response = server.get("/api/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "ok");
    response.assert_header("x-content-type-options", "nosniff");
}

#[tokio::test]
async fn user_upsert_creates_then_refreshes() {
    let (server, _temp) = setup_test_server();

    let created = server
        .post("/api/users")
        .json(&json!({ "fid": 3, "username": "dwr" }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let user: Value = created.json();

    let refreshed = server
        .post("/api/users")
        .json(&json!({ "fid": 3, "username": "dwr", "display_name": "Dan" }))
        .await;
    assert_eq!(refreshed.status_code(), StatusCode::OK);
    assert_eq!(refreshed.json::<Value>()["id"], user["id"]);

    let by_fid = server.get("/api/users/fid/3").await;
    assert_eq!(by_fid.status_code(), StatusCode::OK);
    assert_eq!(by_fid.json::<Value>()["display_name"], "Dan");

    let missing = server.get("/api/users/nope").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        missing.json::<Value>(),
        json!({
            "success": false,
            "error": { "kind": "not_found", "message": "user not found" }
        })
    );
}

#[tokio::test]
async fn project_upvote_toggle_round_trip_notifies_owner_once() {
    let (server, _temp) = setup_test_server();
    let owner = create_user(&server, 1, "owner").await;
    let fan = create_user(&server, 2, "fan").await;
    let project = create_project(&server, &owner, "Upcast").await;
    let upvote_path = format!("/api/projects/{}/upvote", project);

    let added = server
        .post(&upvote_path)
        .json(&json!({ "user_id": fan }))
        .await;
    assert_eq!(added.status_code(), StatusCode::OK);
    assert_eq!(
        added.json::<Value>(),
        json!({ "success": true, "action": "added" })
    );

    let viewed = server
        .get(&format!("/api/projects/{}", project))
        .add_query_param("user_id", &fan)
        .await
        .json::<Value>();
    assert_eq!(viewed["upvote_count"], 1);
    assert_eq!(viewed["has_upvoted"], true);
    assert_eq!(viewed["has_saved"], false);

    let removed = server
        .post(&upvote_path)
        .json(&json!({ "user_id": fan }))
        .await;
    assert_eq!(removed.json::<Value>()["action"], "removed");
    let after = server
        .get(&format!("/api/projects/{}", project))
        .await
        .json::<Value>();
    assert_eq!(after["upvote_count"], 0);
    assert!(after.get("has_upvoted").is_none());

    let feed = wait_for_notifications(&server, &owner, 1).await;
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["kind"], "project_upvote");
    assert_eq!(feed[0]["message"], "fan upvoted Upcast");
    assert_eq!(feed[0]["read"], false);
}

#[tokio::test]
async fn self_upvote_counts_without_notification() {
    let (server, _temp) = setup_test_server();
    let owner = create_user(&server, 1, "owner").await;
    let project = create_project(&server, &owner, "Mine").await;

    let response = server
        .post(&format!("/api/projects/{}/upvote", project))
        .json(&json!({ "user_id": owner }))
        .await;
    assert_eq!(response.json::<Value>()["action"], "added");

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let unread = server
        .get(&format!("/api/users/{}/notifications/unread", owner))
        .await
        .json::<Value>();
    assert_eq!(unread["unread"], 0);
}

#[tokio::test]
async fn toggle_rejects_blank_actor_and_unknown_target() {
    let (server, _temp) = setup_test_server();
    let owner = create_user(&server, 1, "owner").await;
    let project = create_project(&server, &owner, "Upcast").await;

    let blank = server
        .post(&format!("/api/projects/{}/upvote", project))
        .json(&json!({}))
        .await;
    assert_eq!(blank.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = blank.json();
    assert_eq!(body["error"]["kind"], "validation");
    assert_eq!(body["error"]["message"], "actor id required");

    let unknown = server
        .post("/api/creators/not-a-creator/upvote")
        .json(&json!({ "user_id": owner }))
        .await;
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(unknown.json::<Value>()["error"]["message"], "target not found");
}

#[tokio::test]
async fn toggle_rejects_malformed_actor_as_validation_error() {
    let (server, _temp) = setup_test_server();
    let owner = create_user(&server, 1, "owner").await;
    let project = create_project(&server, &owner, "Upcast").await;

    for body in [json!({ "user_id": 42 }), json!({ "user_id": ["a"] }), json!([])] {
        let response = server
            .post(&format!("/api/projects/{}/upvote", project))
            .json(&body)
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "body: {}", body);
        let error: Value = response.json();
        assert_eq!(error["success"], false);
        assert_eq!(error["error"]["kind"], "validation");
        assert!(error["error"]["message"]
            .as_str()
            .expect("message")
            .starts_with("invalid toggle body"));
    }

    let stored = server
        .get(&format!("/api/projects/{}", project))
        .await
        .json::<Value>();
    assert_eq!(stored["upvote_count"], 0);
}

#[tokio::test]
async fn saves_populate_saved_list_and_stay_silent() {
    let (server, _temp) = setup_test_server();
    let owner = create_user(&server, 1, "owner").await;
    let fan = create_user(&server, 2, "fan").await;
    let project = create_project(&server, &owner, "Bookmarked").await;

    let saved = server
        .post(&format!("/api/projects/{}/save", project))
        .json(&json!({ "user_id": fan }))
        .await;
    assert_eq!(saved.json::<Value>()["action"], "added");

    let list = server
        .get(&format!("/api/users/{}/saved", fan))
        .await
        .json::<Vec<Value>>();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], project.as_str());
    assert_eq!(list[0]["save_count"], 1);
    assert_eq!(list[0]["upvote_count"], 0);

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let feed = server
        .get(&format!("/api/users/{}/notifications", owner))
        .await
        .json::<Vec<Value>>();
    assert!(feed.is_empty());

    let missing_user = server.get("/api/users/ghost/saved").await;
    assert_eq!(missing_user.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn creator_upvotes_and_listing() {
    let (server, _temp) = setup_test_server();
    let maker = create_user(&server, 1, "maker").await;
    let fan = create_user(&server, 2, "fan").await;

    let created = server
        .post("/api/creators")
        .json(&json!({ "user_id": maker, "name": "Maker Co" }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let creator_id = created.json::<Value>()["id"]
        .as_str()
        .expect("creator id")
        .to_string();

    let duplicate = server
        .post("/api/creators")
        .json(&json!({ "user_id": maker, "name": "Again" }))
        .await;
    assert_eq!(duplicate.status_code(), StatusCode::BAD_REQUEST);

    let toggled = server
        .post(&format!("/api/creators/{}/upvote", creator_id))
        .json(&json!({ "user_id": fan }))
        .await;
    assert_eq!(toggled.json::<Value>()["action"], "added");

    let listed = server.get("/api/creators").await.json::<Vec<Value>>();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["upvote_count"], 1);

    let feed = wait_for_notifications(&server, &maker, 1).await;
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["kind"], "creator_upvote");
    assert_eq!(feed[0]["payload"]["path"], format!("/creators/{}", creator_id));
}

#[tokio::test]
async fn comments_notify_owner_and_only_author_can_delete() {
    let (server, _temp) = setup_test_server();
    let owner = create_user(&server, 1, "owner").await;
    let fan = create_user(&server, 2, "fan").await;
    let project = create_project(&server, &owner, "Talky").await;
    let comments_path = format!("/api/projects/{}/comments", project);

    let created = server
        .post(&comments_path)
        .json(&json!({ "user_id": fan, "body": "  great launch  " }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let comment: Value = created.json();
    assert_eq!(comment["body"], "great launch");
    let comment_id = comment["id"].as_str().expect("comment id").to_string();

    let too_long = server
        .post(&comments_path)
        .json(&json!({ "user_id": fan, "body": "x".repeat(1001) }))
        .await;
    assert_eq!(too_long.status_code(), StatusCode::BAD_REQUEST);

    let listed = server.get(&comments_path).await.json::<Vec<Value>>();
    assert_eq!(listed.len(), 1);

    let not_author = server
        .delete(&format!("/api/comments/{}", comment_id))
        .add_query_param("user_id", &owner)
        .await;
    assert_eq!(not_author.status_code(), StatusCode::NOT_FOUND);

    let by_author = server
        .delete(&format!("/api/comments/{}", comment_id))
        .add_query_param("user_id", &fan)
        .await;
    assert_eq!(by_author.status_code(), StatusCode::OK);

    let feed = wait_for_notifications(&server, &owner, 1).await;
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["message"], "fan commented on Talky");
}

#[tokio::test]
async fn notification_read_state_is_scoped_to_recipient() {
    let (server, _temp) = setup_test_server();
    let owner = create_user(&server, 1, "owner").await;
    let fan = create_user(&server, 2, "fan").await;
    let other_fan = create_user(&server, 3, "other").await;
    let project = create_project(&server, &owner, "Popular").await;

    for voter in [&fan, &other_fan] {
        server
            .post(&format!("/api/projects/{}/upvote", project))
            .json(&json!({ "user_id": voter }))
            .await;
    }
    let feed = wait_for_notifications(&server, &owner, 2).await;
    assert_eq!(feed.len(), 2);
    let first_id = feed[0]["id"].as_str().expect("id").to_string();

    let foreign = server
        .post(&format!("/api/notifications/{}/read", first_id))
        .json(&json!({ "user_id": fan }))
        .await;
    assert_eq!(foreign.status_code(), StatusCode::NOT_FOUND);

    let marked = server
        .post(&format!("/api/notifications/{}/read", first_id))
        .json(&json!({ "user_id": owner }))
        .await;
    assert_eq!(marked.status_code(), StatusCode::OK);
    assert_eq!(marked.json::<Value>()["read"], true);

    let unread_only = server
        .get(&format!("/api/users/{}/notifications", owner))
        .add_query_param("unread_only", "true")
        .await
        .json::<Vec<Value>>();
    assert_eq!(unread_only.len(), 1);

    let all = server
        .post(&format!("/api/users/{}/notifications/read-all", owner))
        .await
        .json::<Value>();
    assert_eq!(all, json!({ "success": true, "updated": 1 }));
}

#[tokio::test]
async fn categories_enforce_unique_slugs_and_block_in_use_deletes() {
    let (server, _temp) = setup_test_server();
    let owner = create_user(&server, 1, "owner").await;

    let created = server
        .post("/api/categories")
        .json(&json!({ "name": "Social Apps" }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let category: Value = created.json();
    assert_eq!(category["slug"], "social-apps");
    let category_id = category["id"].as_str().expect("id").to_string();

    let duplicate = server
        .post("/api/categories")
        .json(&json!({ "name": "Other", "slug": "Social Apps" }))
        .await;
    assert_eq!(duplicate.status_code(), StatusCode::BAD_REQUEST);

    let project = server
        .post("/api/projects")
        .json(&json!({
            "name": "Feed",
            "tagline": "Social feed",
            "category_id": category_id,
            "creator_id": owner,
        }))
        .await;
    assert_eq!(project.status_code(), StatusCode::CREATED);

    let filtered = server
        .get("/api/projects")
        .add_query_param("category_id", &category_id)
        .await
        .json::<Vec<Value>>();
    assert_eq!(filtered.len(), 1);

    let blocked = server
        .delete(&format!("/api/categories/{}", category_id))
        .await;
    assert_eq!(blocked.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn project_update_ignores_counters_and_delete_cascades() {
    let (server, _temp) = setup_test_server();
    let owner = create_user(&server, 1, "owner").await;
    let fan = create_user(&server, 2, "fan").await;
    let project = create_project(&server, &owner, "Mutable").await;
    let project_path = format!("/api/projects/{}", project);

    server
        .post(&format!("{}/upvote", project_path))
        .json(&json!({ "user_id": fan }))
        .await;

    let updated = server
        .put(&project_path)
        .json(&json!({ "tagline": "New tagline", "upvote_count": 999 }))
        .await;
    assert_eq!(updated.status_code(), StatusCode::OK);
    let body: Value = updated.json();
    assert_eq!(body["tagline"], "New tagline");
    assert_eq!(body["upvote_count"], 1);

    let deleted = server.delete(&project_path).await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
    assert_eq!(
        server.get(&project_path).await.status_code(),
        StatusCode::NOT_FOUND
    );

    let toggle_after_delete = server
        .post(&format!("{}/upvote", project_path))
        .json(&json!({ "user_id": fan }))
        .await;
    assert_eq!(toggle_after_delete.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn project_list_supports_top_sort_and_limit() {
    let (server, _temp) = setup_test_server();
    let owner = create_user(&server, 1, "owner").await;
    let fan = create_user(&server, 2, "fan").await;
    let quiet = create_project(&server, &owner, "Quiet").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let loud = create_project(&server, &owner, "Loud").await;

    server
        .post(&format!("/api/projects/{}/upvote", quiet))
        .json(&json!({ "user_id": fan }))
        .await;

    let recent = server
        .get("/api/projects")
        .add_query_param("limit", "1")
        .await
        .json::<Vec<Value>>();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["id"], loud.as_str());

    let top = server
        .get("/api/projects")
        .add_query_param("sort", "top")
        .await
        .json::<Vec<Value>>();
    assert_eq!(top[0]["id"], quiet.as_str());
}

#[tokio::test]
async fn webhook_tracks_push_details_and_rejects_unknown_events() {
    let (server, _temp) = setup_test_server();

    let added = server
        .post("/api/webhook")
        .json(&json!({
            "fid": 12,
            "event": {
                "event": "frame_added",
                "notificationDetails": { "url": "https://push.test/send", "token": "abc" }
            }
        }))
        .await;
    assert_eq!(added.status_code(), StatusCode::OK);
    assert_eq!(
        added.json::<Value>(),
        json!({ "success": true, "event": "miniapp_added", "changed": true })
    );

    let removed = server
        .post("/api/webhook")
        .json(&json!({ "fid": 12, "event": { "event": "miniapp_removed" } }))
        .await;
    assert_eq!(removed.json::<Value>()["changed"], true);

    let unknown = server
        .post("/api/webhook")
        .json(&json!({ "fid": 12, "event": { "event": "frame_exploded" } }))
        .await;
    assert_eq!(unknown.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(unknown.json::<Value>()["error"]["kind"], "validation");
}
