// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end story lifecycle tests against local storage and the mock
//! generator: create, fetch, list, advance by choice, share, delete.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn create_request(character_name: &str, setting: &str) -> Request<Body> {
    let body = serde_json::json!({
        "character_name": character_name,
        "setting": setting,
        "tone": "adventure",
        "character_origin": "weak",
    });
    Request::builder()
        .method("POST")
        .uri("/api/stories")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn test_create_story_returns_opening_with_choices() {
    let (app, _) = common::create_test_app();

    let response = app.oneshot(create_request("Li Wei", "cultivation")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let story = body_json(response).await;
    assert!(story["id"].as_str().unwrap().starts_with("story_"));
    assert_eq!(story["character_name"], "Li Wei");
    assert_eq!(story["current_node_id"], "initial");
    assert_eq!(story["title"], "Li Wei's Cultivation Adventure");
    assert_eq!(story["cultivation_stage"], "Qi Condensation Stage (Level 1)");

    let node = &story["nodes"]["initial"];
    assert!(node["content"].as_str().unwrap().len() > 20);
    assert_eq!(node["choices"].as_array().unwrap().len(), 3);

    // Cultivation stories get planning state.
    assert!(story["big_story_goal"].is_string());
    assert!(story["memory"]["current_arc_goal"].is_string());
}

#[tokio::test]
async fn test_get_and_list_stories() {
    let (app, _) = common::create_test_app();

    let response = app
        .clone()
        .oneshot(create_request("Mira", "fantasy"))
        .await
        .unwrap();
    let story = body_json(response).await;
    let story_id = story["id"].as_str().unwrap().to_string();

    // Fetch by id
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/stories/{}", story_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["id"], story_id.as_str());

    // Anonymous list shows it
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/stories")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let list = body_json(response).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], story_id.as_str());
    // Listing is a projection, not the full document
    assert!(list[0].get("nodes").is_none());
}

#[tokio::test]
async fn test_get_missing_story_returns_404() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/stories/story_0_deadbeef")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_choice_advances_story() {
    let (app, _) = common::create_test_app();

    let response = app
        .clone()
        .oneshot(create_request("Jin", "cultivation"))
        .await
        .unwrap();
    let story = body_json(response).await;
    let story_id = story["id"].as_str().unwrap().to_string();
    let choice_id = story["nodes"]["initial"]["choices"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/stories/{}/choices/{}", story_id, choice_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = body_json(response).await;
    let nodes = updated["nodes"].as_object().unwrap();
    assert_eq!(nodes.len(), 2);

    // The choice is recorded on the node it was made from.
    assert_eq!(nodes["initial"]["selected_choice_id"], choice_id.as_str());

    // The new node extends the initial node and is now current.
    let current_id = updated["current_node_id"].as_str().unwrap();
    assert_ne!(current_id, "initial");
    let current = &nodes[current_id];
    assert_eq!(current["parent_node_id"], "initial");
    assert!(current["selected_choice_id"].is_null());
    assert_eq!(current["choices"].as_array().unwrap().len(), 3);

    assert!(updated["last_updated"].as_f64().unwrap() >= story["last_updated"].as_f64().unwrap());
}

#[tokio::test]
async fn test_choice_on_missing_story_and_choice() {
    let (app, _) = common::create_test_app();

    // Missing story
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/stories/story_0_deadbeef/choices/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Missing choice on a real story
    let response = app
        .clone()
        .oneshot(create_request("Jin", "fantasy"))
        .await
        .unwrap();
    let story = body_json(response).await;
    let story_id = story["id"].as_str().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/stories/{}/choices/99", story_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_story() {
    let (app, _) = common::create_test_app();

    let response = app
        .clone()
        .oneshot(create_request("Mira", "fantasy"))
        .await
        .unwrap();
    let story = body_json(response).await;
    let story_id = story["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/stories/{}", story_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    // Gone afterwards
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/stories/{}", story_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_share_flow() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-7", &state.config.jwt_signing_key);

    // Create as an authenticated user so the story is owned.
    let mut request = create_request("Mira", "fantasy");
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", token).parse().unwrap(),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    let story = body_json(response).await;
    let story_id = story["id"].as_str().unwrap().to_string();
    assert_eq!(story["user_id"], "user-7");

    // Sharing requires auth
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/stories/{}/share", story_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Owner mints a token
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/stories/{}/share", story_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let share = body_json(response).await;
    let share_token = share["share_token"].as_str().unwrap().to_string();
    assert!(share["share_url"]
        .as_str()
        .unwrap()
        .ends_with(&share_token));

    // Sharing again reuses the same token
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/stories/{}/share", story_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(response).await["share_token"], share_token.as_str());

    // Anyone can fetch the shared story by token
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/shared/{}", share_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], story_id.as_str());

    // Unknown token is a 404
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/shared/not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_owned_story_blocks_other_users() {
    let (app, state) = common::create_test_app();
    let owner_token = common::create_test_jwt("owner", &state.config.jwt_signing_key);
    let other_token = common::create_test_jwt("intruder", &state.config.jwt_signing_key);

    let mut request = create_request("Jin", "cultivation");
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", owner_token).parse().unwrap(),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    let story = body_json(response).await;
    let story_id = story["id"].as_str().unwrap().to_string();

    // Another user cannot delete it
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/stories/{}", story_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", other_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Nor advance it anonymously
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/stories/{}/choices/1", story_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Other users' listings don't include it
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/stories")
                .header(header::AUTHORIZATION, format!("Bearer {}", other_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let list = body_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 0);
}
