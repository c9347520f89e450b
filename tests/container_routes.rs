mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::{
    Role, create_container, create_doll, delete, get, json_response, send_json, test_app,
};

async fn active_names(state: &std::sync::Arc<doll_inventory::state::AppState>) -> Vec<String> {
    let (status, body) = json_response(state, get("/api/containers", Role::Kid)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter_map(|item| item["name"].as_str().map(str::to_string))
        .collect()
}

fn find<'a>(items: &'a Value, name: &str) -> &'a Value {
    items
        .as_array()
        .expect("items")
        .iter()
        .find(|item| item["name"] == name)
        .expect("container present")
}

#[tokio::test]
async fn fresh_database_has_home_and_wishlist() {
    let app = test_app().await;
    let state = &app.state;

    let (status, body) = json_response(state, get("/api/containers", Role::Kid)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    let items = &body["data"]["items"];
    let home = find(items, "Home");
    assert_eq!(home["sort_order"], 0);
    assert_eq!(home["is_system"], true);
    let wishlist = find(items, "Wishlist");
    assert_eq!(wishlist["sort_order"], 10);
    assert_eq!(wishlist["is_system"], true);
}

#[tokio::test]
async fn containers_are_listed_in_sort_order() {
    let app = test_app().await;
    let state = &app.state;
    let shelf = create_container(state, "Shelf").await;
    let (status, _) = json_response(
        state,
        send_json(
            "PATCH",
            &format!("/api/containers/{}", shelf["id"]),
            Role::Admin,
            json!({ "sort_order": 5 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(active_names(state).await, vec!["Home", "Shelf", "Wishlist"]);
}

#[tokio::test]
async fn only_admins_manage_containers() {
    let app = test_app().await;
    let state = &app.state;

    for role in [Role::Kid, Role::Editor] {
        let (status, _) = json_response(
            state,
            send_json("POST", "/api/containers", role, json!({ "name": "Bag 1" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
    let (status, _) = json_response(state, get("/api/containers", Role::Anonymous)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_names_conflict_case_insensitively() {
    let app = test_app().await;
    let state = &app.state;
    create_container(state, "Bag 1").await;

    let (status, body) = json_response(
        state,
        send_json("POST", "/api/containers", Role::Admin, json!({ "name": "bag 1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Container with name 'bag 1' already exists");
}

#[tokio::test]
async fn non_empty_container_cannot_be_deleted() {
    let app = test_app().await;
    let state = &app.state;
    let bag = create_container(state, "Bag 1").await;
    create_doll(state, json!({ "name": "Alice", "container_id": bag["id"] })).await;
    create_doll(state, json!({ "name": "Bella", "container_id": bag["id"] })).await;
    let uri = format!("/api/containers/{}", bag["id"]);

    let (status, body) = json_response(state, delete(&uri, Role::Admin)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Container not empty. It contains 2 doll(s).");
    assert!(active_names(state).await.contains(&"Bag 1".to_string()));

    let (status, _) = json_response(
        state,
        send_json("PATCH", &uri, Role::Admin, json!({ "is_active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn empty_container_is_deactivated() {
    let app = test_app().await;
    let state = &app.state;
    let bag = create_container(state, "Bag 9").await;
    let uri = format!("/api/containers/{}", bag["id"]);

    let (status, body) = json_response(state, delete(&uri, Role::Admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());
    assert!(!active_names(state).await.contains(&"Bag 9".to_string()));

    let (status, _) = json_response(state, delete(&uri, Role::Admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Inactive names are free for reuse; the new one sorts after the old.
    let again = create_container(state, "Bag 9").await;
    assert_ne!(again["id"], bag["id"]);
    assert_eq!(again["sort_order"], 30);

    let (status, body) = json_response(
        state,
        send_json("PATCH", &uri, Role::Admin, json!({ "is_active": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
}

#[tokio::test]
async fn system_containers_are_protected() {
    let app = test_app().await;
    let state = &app.state;
    let (_, body) = json_response(state, get("/api/containers", Role::Admin)).await;
    let home_id = find(&body["data"]["items"], "Home")["id"].clone();
    let uri = format!("/api/containers/{home_id}");

    let (status, body) = json_response(state, delete(&uri, Role::Admin)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot delete system containers");

    let (status, body) = json_response(
        state,
        send_json("PATCH", &uri, Role::Admin, json!({ "name": "House" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot rename system containers");

    let (status, _) = json_response(
        state,
        send_json("PATCH", &uri, Role::Admin, json!({ "is_active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = json_response(
        state,
        send_json("PATCH", &uri, Role::Admin, json!({ "sort_order": 99 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sort_order"], 99);
}

#[tokio::test]
async fn renaming_a_container_resyncs_legacy_placement() {
    let app = test_app().await;
    let state = &app.state;
    let bag = create_container(state, "Bag 2").await;
    let doll = create_doll(state, json!({ "name": "Cleo", "location": "BAG", "bag_number": 2 })).await;
    let container_uri = format!("/api/containers/{}", bag["id"]);
    let doll_uri = format!("/api/dolls/{}", doll["id"]);

    let (status, _) = json_response(
        state,
        send_json("PATCH", &container_uri, Role::Admin, json!({ "name": "Shelf" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = json_response(state, get(&doll_uri, Role::Kid)).await;
    assert_eq!(body["data"]["container"]["name"], "Shelf");
    assert!(body["data"]["location"].is_null());
    assert!(body["data"]["bag_number"].is_null());

    let (status, _) = json_response(
        state,
        send_json("PATCH", &container_uri, Role::Admin, json!({ "name": "Bag 5" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = json_response(state, get(&doll_uri, Role::Kid)).await;
    assert_eq!(body["data"]["location"], "BAG");
    assert_eq!(body["data"]["bag_number"], 5);
}

#[tokio::test]
async fn sort_order_stays_within_range() {
    let app = test_app().await;
    let state = &app.state;
    let shelf = create_container(state, "Shelf").await;
    let uri = format!("/api/containers/{}", shelf["id"]);

    let (status, body) = json_response(
        state,
        send_json("PATCH", &uri, Role::Admin, json!({ "sort_order": i32::MAX })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "sort_order must be between -1000000 and 1000000");

    let (status, _) = json_response(
        state,
        send_json("PATCH", &uri, Role::Admin, json!({ "sort_order": 1_000_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let next = create_container(state, "Attic").await;
    assert_eq!(next["sort_order"], 1_000_010);
}
