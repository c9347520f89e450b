mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{Value, json};

use doll_inventory::state::AppState;

use common::{
    Role, count_of, create_container, create_doll, delete, doll_events, get, json_response,
    send_json, test_app,
};

async fn container_id_named(state: &Arc<AppState>, name: &str) -> Value {
    let (status, body) = json_response(state, get("/api/containers", Role::Kid)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["items"]
        .as_array()
        .expect("items")
        .iter()
        .find(|container| container["name"] == name)
        .map(|container| container["id"].clone())
        .expect("container present")
}

async fn patch_doll(state: &Arc<AppState>, doll_id: &Value, body: Value) -> (StatusCode, Value) {
    json_response(
        state,
        send_json("PATCH", &format!("/api/dolls/{doll_id}"), Role::Kid, body),
    )
    .await
}

#[tokio::test]
async fn moving_a_doll_home_records_one_move_event() {
    let app = test_app().await;
    let state = &app.state;

    let bag = create_container(state, "Bag 1").await;
    assert_eq!(bag["sort_order"], 20);

    let doll = create_doll(
        state,
        json!({ "name": "Alice", "location": "BAG", "bag_number": 1 }),
    )
    .await;
    let doll_id = doll["id"].as_i64().expect("id");
    assert_eq!(doll["container_id"], bag["id"]);
    assert_eq!(doll["container"]["name"], "Bag 1");
    assert_eq!(doll["location"], "BAG");
    assert_eq!(doll["bag_number"], 1);

    let (status, body) = json_response(
        state,
        send_json(
            "PATCH",
            &format!("/api/dolls/{doll_id}"),
            Role::Kid,
            json!({ "location": "HOME" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["container"]["name"], "Home");
    assert_eq!(body["data"]["location"], "HOME");
    assert!(body["data"]["bag_number"].is_null());

    let events = doll_events(state, doll_id).await;
    assert_eq!(count_of(&events, "DOLL_CREATED"), 1);
    assert_eq!(count_of(&events, "DOLL_MOVED"), 1);
    let moved = events
        .iter()
        .find(|event| event["event_type"] == "DOLL_MOVED")
        .expect("move event");
    assert_eq!(moved["payload"]["old_container_name"], "Bag 1");
    assert_eq!(moved["payload"]["new_container_name"], "Home");
    assert_eq!(moved["payload"]["old_bag_number"], 1);
    assert!(moved["payload"]["new_bag_number"].is_null());
    assert_eq!(moved["created_by"], "kira@example.com");
}

#[tokio::test]
async fn legacy_bag_placement_round_trips() {
    let app = test_app().await;
    let state = &app.state;
    create_container(state, "Bag 3").await;

    let doll = create_doll(
        state,
        json!({ "name": "Bella", "location": "BAG", "bag_number": 3 }),
    )
    .await;
    let doll_id = doll["id"].as_i64().expect("id");

    let (status, body) = json_response(state, get(&format!("/api/dolls/{doll_id}"), Role::Kid)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["container"]["name"], "Bag 3");
    assert_eq!(body["data"]["location"], "BAG");
    assert_eq!(body["data"]["bag_number"], 3);
    assert_eq!(body["data"]["photos_count"], 0);
    assert!(body["data"]["primary_photo_url"].is_null());
}

#[tokio::test]
async fn wishlist_dolls_have_no_legacy_placement() {
    let app = test_app().await;
    let state = &app.state;

    let (_, containers) = json_response(state, get("/api/containers", Role::Kid)).await;
    let wishlist = containers["data"]["items"]
        .as_array()
        .expect("items")
        .iter()
        .find(|container| container["name"] == "Wishlist")
        .cloned()
        .expect("wishlist seeded");

    let doll = create_doll(
        state,
        json!({ "name": "Cleo", "container_id": wishlist["id"] }),
    )
    .await;
    assert!(doll["location"].is_null());
    assert!(doll["bag_number"].is_null());
    assert_eq!(doll["container"]["name"], "Wishlist");
}

#[tokio::test]
async fn create_rejects_bad_placement() {
    let app = test_app().await;
    let state = &app.state;

    for body in [
        json!({ "name": "Dora", "location": "HOME", "bag_number": 2 }),
        json!({ "name": "Dora", "location": "BAG" }),
        json!({ "name": "Dora" }),
        json!({ "name": "   ", "location": "HOME" }),
        json!({ "name": "Dora", "location": "BAG", "bag_number": 0 }),
    ] {
        let (status, response) =
            json_response(state, send_json("POST", "/api/dolls", Role::Editor, body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body} -> {response}");
        assert_eq!(response["status"], 400);
    }

    let (status, response) = json_response(
        state,
        send_json(
            "POST",
            "/api/dolls",
            Role::Editor,
            json!({ "name": "Dora", "location": "BAG", "bag_number": 7 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["message"], "Container 'Bag 7' not found");
}

#[tokio::test]
async fn renaming_to_the_same_name_changes_nothing() {
    let app = test_app().await;
    let state = &app.state;
    let doll = create_doll(state, json!({ "name": "Elsa", "location": "HOME" })).await;
    let doll_id = doll["id"].as_i64().expect("id");
    let uri = format!("/api/dolls/{doll_id}");

    let (status, _) = json_response(
        state,
        send_json("PATCH", &uri, Role::Editor, json!({ "name": "  Elsa " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doll_events(state, doll_id).await.len(), 1);

    let (status, body) = json_response(
        state,
        send_json("PATCH", &uri, Role::Editor, json!({ "name": "Queen Elsa" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Queen Elsa");

    let events = doll_events(state, doll_id).await;
    assert_eq!(count_of(&events, "DOLL_RENAMED"), 1);
    let renamed = events
        .iter()
        .find(|event| event["event_type"] == "DOLL_RENAMED")
        .expect("rename event");
    assert_eq!(renamed["payload"]["old_name"], "Elsa");
    assert_eq!(renamed["payload"]["new_name"], "Queen Elsa");
}

#[tokio::test]
async fn purchase_url_can_be_set_and_cleared() {
    let app = test_app().await;
    let state = &app.state;
    let doll = create_doll(
        state,
        json!({ "name": "Fay", "location": "HOME", "purchase_url": " https://shop.example/fay " }),
    )
    .await;
    assert_eq!(doll["purchase_url"], "https://shop.example/fay");
    let uri = format!("/api/dolls/{}", doll["id"]);

    let (status, body) = json_response(
        state,
        send_json("PATCH", &uri, Role::Editor, json!({ "purchase_url": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["purchase_url"].is_null());

    let (status, _) = json_response(
        state,
        send_json("PATCH", &uri, Role::Kid, json!({ "purchase_url": "https://x.example" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn permissions_are_enforced() {
    let app = test_app().await;
    let state = &app.state;

    let (status, body) = json_response(state, get("/api/dolls", Role::Anonymous)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);

    let (status, body) = json_response(
        state,
        send_json("POST", "/api/dolls", Role::Kid, json!({ "name": "Gina", "location": "HOME" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Permission required: doll:create");

    let doll = create_doll(state, json!({ "name": "Gina", "location": "HOME" })).await;
    let uri = format!("/api/dolls/{}", doll["id"]);

    let (status, _) = json_response(
        state,
        send_json("PATCH", &uri, Role::Kid, json!({ "name": "Gigi" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = json_response(state, delete(&uri, Role::Editor)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = json_response(state, get("/api/dolls/9999", Role::Kid)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn soft_deleted_dolls_disappear_but_keep_history() {
    let app = test_app().await;
    let state = &app.state;
    let doll = create_doll(state, json!({ "name": "Hana", "location": "HOME" })).await;
    let doll_id = doll["id"].as_i64().expect("id");
    let uri = format!("/api/dolls/{doll_id}");

    let (status, body) = json_response(state, delete(&uri, Role::Admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = json_response(state, get(&uri, Role::Admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = json_response(state, delete(&uri, Role::Admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listed) = json_response(state, get("/api/dolls", Role::Admin)).await;
    assert_eq!(listed["data"]["total"], 0);

    let (status, body) =
        json_response(state, get("/api/dolls?include_deleted=true", Role::Kid)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Permission required to view deleted dolls: doll:delete"
    );

    let (status, listed) =
        json_response(state, get("/api/dolls?include_deleted=true", Role::Admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"]["total"], 1);
    assert_eq!(listed["data"]["items"][0]["deleted_by"], "alice@example.com");

    let events = doll_events(state, doll_id).await;
    assert_eq!(count_of(&events, "DOLL_CREATED"), 1);
    assert_eq!(count_of(&events, "DOLL_DELETED"), 1);
}

#[tokio::test]
async fn list_filters_by_name_and_placement() {
    let app = test_app().await;
    let state = &app.state;
    create_container(state, "Bag 1").await;
    create_container(state, "Bag 2").await;
    create_doll(state, json!({ "name": "Anna", "location": "HOME" })).await;
    create_doll(state, json!({ "name": "Annabelle", "location": "BAG", "bag_number": 1 })).await;
    create_doll(state, json!({ "name": "Bianca", "location": "BAG", "bag_number": 2 })).await;

    let (_, body) = json_response(state, get("/api/dolls?q=anna", Role::Kid)).await;
    assert_eq!(body["data"]["total"], 2);

    let (_, body) = json_response(state, get("/api/dolls?location=HOME", Role::Kid)).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["name"], "Anna");

    let (_, body) = json_response(state, get("/api/dolls?location=BAG", Role::Kid)).await;
    assert_eq!(body["data"]["total"], 2);

    let (_, body) = json_response(state, get("/api/dolls?bag=2", Role::Kid)).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["name"], "Bianca");

    let (status, body) = json_response(state, get("/api/dolls?bag=9", Role::Kid)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);

    let (_, body) = json_response(state, get("/api/dolls?limit=1&offset=1", Role::Kid)).await;
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["limit"], 1);
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(1));

    let (status, _) = json_response(state, get("/api/dolls?limit=500", Role::Kid)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn suggestions_rank_prefix_matches_first() {
    let app = test_app().await;
    let state = &app.state;
    for name in ["Joanna", "Anna", "Barbie Anna", "annabelle", "Zed"] {
        create_doll(state, json!({ "name": name, "location": "HOME" })).await;
    }

    let (status, body) =
        json_response(state, get("/api/dolls/suggestions?q=ann", Role::Kid)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["q"], "ann");
    let names: Vec<&str> = body["data"]["suggestions"]
        .as_array()
        .expect("suggestions")
        .iter()
        .filter_map(|item| item["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Anna", "annabelle", "Barbie Anna", "Joanna"]);
    assert_eq!(body["data"]["suggestions"][0]["container_name"], "Home");

    let (_, body) =
        json_response(state, get("/api/dolls/suggestions?q=ann&limit=2", Role::Kid)).await;
    assert_eq!(body["data"]["suggestions"].as_array().map(Vec::len), Some(2));

    let (status, _) = json_response(state, get("/api/dolls/suggestions?q=%20", Role::Kid)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_bodies_come_back_in_the_envelope() {
    let app = test_app().await;
    let state = &app.state;

    let request = Role::Editor
        .apply(
            axum::http::Request::builder()
                .method("POST")
                .uri("/api/dolls"),
        )
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .expect("build request");
    let (status, body) = json_response(state, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["data"].is_null());

    let (status, body) = json_response(state, get("/api/nowhere", Role::Kid)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn move_by_container_id_updates_legacy_fields() {
    let app = test_app().await;
    let state = &app.state;
    let bag = create_container(state, "Bag 2").await;
    let home_id = container_id_named(state, "Home").await;
    let wishlist_id = container_id_named(state, "Wishlist").await;
    let doll = create_doll(state, json!({ "name": "Iris", "location": "HOME" })).await;
    let doll_id = doll["id"].clone();

    let (status, body) = patch_doll(state, &doll_id, json!({ "container_id": bag["id"] })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["container_id"], bag["id"]);
    assert_eq!(body["data"]["location"], "BAG");
    assert_eq!(body["data"]["bag_number"], 2);

    let (status, body) = patch_doll(state, &doll_id, json!({ "container_id": wishlist_id })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["container"]["name"], "Wishlist");
    assert!(body["data"]["location"].is_null());
    assert!(body["data"]["bag_number"].is_null());

    let events = doll_events(state, doll_id.as_i64().expect("id")).await;
    assert_eq!(count_of(&events, "DOLL_MOVED"), 2);
    let first_move = events
        .iter()
        .rev()
        .find(|event| event["event_type"] == "DOLL_MOVED")
        .expect("first move event");
    assert_eq!(first_move["payload"]["old_container_id"], home_id);
    assert_eq!(first_move["payload"]["old_container_name"], "Home");
    assert_eq!(first_move["payload"]["new_container_id"], bag["id"]);
    assert_eq!(first_move["payload"]["new_container_name"], "Bag 2");
}

#[tokio::test]
async fn moving_to_the_current_container_records_nothing() {
    let app = test_app().await;
    let state = &app.state;
    let home_id = container_id_named(state, "Home").await;
    let doll = create_doll(state, json!({ "name": "Jade", "location": "HOME" })).await;
    let doll_id = doll["id"].clone();

    for body in [json!({ "container_id": home_id }), json!({ "location": "HOME" })] {
        let (status, response) = patch_doll(state, &doll_id, body.clone()).await;
        assert_eq!(status, StatusCode::OK, "{body} -> {response}");
        assert_eq!(response["data"]["container"]["name"], "Home");
    }

    let events = doll_events(state, doll_id.as_i64().expect("id")).await;
    assert_eq!(count_of(&events, "DOLL_MOVED"), 0);
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn bag_move_needs_a_bag_number() {
    let app = test_app().await;
    let state = &app.state;
    create_container(state, "Bag 1").await;
    let doll = create_doll(state, json!({ "name": "Kim", "location": "HOME" })).await;
    let doll_id = doll["id"].clone();

    let (status, body) = patch_doll(state, &doll_id, json!({ "location": "BAG" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "bag_number is required when location is BAG");

    let (_, body) = json_response(state, get(&format!("/api/dolls/{doll_id}"), Role::Kid)).await;
    assert_eq!(body["data"]["location"], "HOME");
    assert_eq!(
        count_of(&doll_events(state, doll_id.as_i64().expect("id")).await, "DOLL_MOVED"),
        0
    );
}

#[tokio::test]
async fn home_move_discards_the_bag_number() {
    let app = test_app().await;
    let state = &app.state;
    create_container(state, "Bag 1").await;
    let doll = create_doll(
        state,
        json!({ "name": "Lena", "location": "BAG", "bag_number": 1 }),
    )
    .await;
    let doll_id = doll["id"].clone();

    let (status, body) =
        patch_doll(state, &doll_id, json!({ "location": "HOME", "bag_number": 1 })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["container"]["name"], "Home");
    assert_eq!(body["data"]["location"], "HOME");
    assert!(body["data"]["bag_number"].is_null());
}

#[tokio::test]
async fn moves_to_missing_or_inactive_containers_are_not_found() {
    let app = test_app().await;
    let state = &app.state;
    let retired = create_container(state, "Bag 4").await;
    let (status, _) = json_response(
        state,
        delete(&format!("/api/containers/{}", retired["id"]), Role::Admin),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let doll = create_doll(state, json!({ "name": "Mila", "location": "HOME" })).await;
    let doll_id = doll["id"].clone();

    let (status, body) = patch_doll(state, &doll_id, json!({ "container_id": 9999 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Container 9999 not found");

    let (status, _) = patch_doll(state, &doll_id, json!({ "container_id": retired["id"] })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) =
        patch_doll(state, &doll_id, json!({ "location": "BAG", "bag_number": 4 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Container 'Bag 4' not found");

    let events = doll_events(state, doll_id.as_i64().expect("id")).await;
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn oversized_offsets_are_rejected() {
    let app = test_app().await;
    let state = &app.state;
    let doll = create_doll(state, json!({ "name": "Nora", "location": "HOME" })).await;
    let too_far = u64::MAX;

    for uri in [
        format!("/api/dolls?offset={too_far}"),
        format!("/api/events?offset={too_far}"),
        format!("/api/dolls/{}/events?offset={too_far}", doll["id"]),
    ] {
        let (status, body) = json_response(state, get(&uri, Role::Kid)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} -> {body}");
        assert_eq!(body["status"], 400);
    }

    let (status, body) =
        json_response(state, get(&format!("/api/dolls?offset={}", i64::MAX), Role::Kid)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(0));
}
