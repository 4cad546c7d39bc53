#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests of the `/tag` routes over in-memory `SQLite`, with the
//! post service mocked over HTTP.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use httpmock::prelude::*;
use serde_json::{Value, json};
use svckit::{
    AuthError, AuthState, DatabaseConfig, DbHandle, HttpPostDirectory, RemoteClient,
    ServicesConfig, TokenVerifier,
};
use tags::TagsModule;
use tower::ServiceExt;

/// Accepts `user-<id>` tokens.
struct UserTokens;

#[async_trait]
impl TokenVerifier for UserTokens {
    async fn verify(&self, token: &str) -> Result<i32, AuthError> {
        token
            .strip_prefix("user-")
            .and_then(|id| id.parse().ok())
            .ok_or(AuthError::Rejected)
    }
}

async fn app(posts: &MockServer) -> Router {
    let db = DbHandle::connect(&DatabaseConfig {
        dsn: "sqlite::memory:".to_owned(),
        max_conns: None,
        acquire_timeout: None,
    })
    .await
    .unwrap();

    let client = RemoteClient::new(&ServicesConfig {
        base_url: posts.base_url(),
        timeout: Duration::from_secs(2),
    })
    .unwrap();
    let directory = Arc::new(HttpPostDirectory::new(Arc::new(client)));

    let module = TagsModule::init(&db, directory).await.unwrap();
    module.router(AuthState::new(Arc::new(UserTokens)))
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    user: i32,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer user-{user}"));
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Posts 1 and 2 belong to user 5, post 3 to user 7.
fn owned_posts(server: &MockServer) {
    for (id, owner) in [(1, 5), (2, 5), (3, 7)] {
        server.mock(|when, then| {
            when.method(GET).path(format!("/post/{id}"));
            then.status(200)
                .json_body(json!({"id": id, "content": format!("post {id}"), "userId": owner}));
        });
    }
    server.mock(|when, then| {
        when.method(GET).path("/post/404");
        then.status(404);
    });
}

#[tokio::test]
async fn assigning_tags_aggregates_per_post() {
    let server = MockServer::start();
    owned_posts(&server);
    let app = app(&server).await;

    let (status, out) = call(
        &app,
        "POST",
        "/tag/post",
        5,
        Some(json!({"postId": 1, "tags": ["rust", "web", "rust"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(out["postId"], 1);
    assert_eq!(out["tag"].as_array().unwrap().len(), 2);

    let (status, again) = call(
        &app,
        "POST",
        "/tag/post",
        5,
        Some(json!({"postId": 1, "tags": ["web", "async"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let names: Vec<&str> = again["tag"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 3);
    assert!(names.contains(&"async"));

    call(&app, "POST", "/tag/post", 5, Some(json!({"postId": 2, "tags": ["rust"]}))).await;

    let (status, grouped) = call(&app, "GET", "/tag/post?postId=2,1,9", 5, None).await;
    assert_eq!(status, StatusCode::OK);
    let groups = grouped.as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["postId"], 2);
    assert_eq!(groups[1]["tag"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn tagging_requires_owning_an_existing_post() {
    let server = MockServer::start();
    owned_posts(&server);
    let app = app(&server).await;

    let (status, _) = call(
        &app,
        "POST",
        "/tag/post",
        5,
        Some(json!({"postId": 3, "tags": ["rust"]})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        "POST",
        "/tag/post",
        5,
        Some(json!({"postId": 404, "tags": ["rust"]})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tag_lists_its_posts_from_the_post_service() {
    let server = MockServer::start();
    owned_posts(&server);
    let batch = server.mock(|when, then| {
        when.method(GET).path("/post").query_param("id", "1,2");
        then.status(200).json_body(json!([
            {"id": 1, "content": "post 1", "userId": 5},
            {"id": 2, "content": "post 2", "userId": 5}
        ]));
    });
    let app = app(&server).await;

    let (_, out) = call(
        &app,
        "POST",
        "/tag/post",
        5,
        Some(json!({"postId": 1, "tags": ["rust"]})),
    )
    .await;
    let tag_id = out["tag"][0]["id"].as_i64().unwrap();
    call(&app, "POST", "/tag/post", 5, Some(json!({"postId": 2, "tags": ["rust"]}))).await;

    let (status, tag) = call(&app, "GET", &format!("/tag/{tag_id}"), 5, None).await;

    assert_eq!(status, StatusCode::OK);
    batch.assert_calls(1);
    assert_eq!(tag["name"], "rust");
    let posts = tag["post"].as_array().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["content"], "post 1");
    assert!(posts[0].get("tagId").is_none());
}

#[tokio::test]
async fn removing_tags_returns_the_rest() {
    let server = MockServer::start();
    owned_posts(&server);
    let app = app(&server).await;

    let (_, out) = call(
        &app,
        "POST",
        "/tag/post",
        5,
        Some(json!({"postId": 1, "tags": ["rust", "web"]})),
    )
    .await;
    let rust_id = out["tag"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "rust")
        .map(|t| t["id"].clone())
        .unwrap();

    let (status, left) = call(
        &app,
        "DELETE",
        "/tag/post",
        5,
        Some(json!({"postId": 1, "tags": [rust_id]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&Value> = left["tag"].as_array().unwrap().iter().map(|t| &t["name"]).collect();
    assert_eq!(names, vec![&json!("web")]);
}

#[tokio::test]
async fn tag_crud_round_trip() {
    let server = MockServer::start();
    let app = app(&server).await;

    let (status, created) = call(&app, "POST", "/tag", 5, Some(json!({"name": "rust"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, same) = call(&app, "POST", "/tag", 5, Some(json!({"name": "rust"}))).await;
    assert_eq!(same["id"], created["id"]);

    let (status, _) = call(&app, "POST", "/tag", 5, Some(json!({"name": "no spaces"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let uri = format!("/tag/{}", created["id"]);
    let (status, renamed) = call(&app, "PUT", &uri, 5, Some(json!({"name": "rustlang"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "rustlang");

    let (status, listed) = call(&app, "GET", "/tag?query=lang", 5, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = call(&app, "DELETE", &uri, 5, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, problem) = call(&app, "GET", &uri, 5, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(problem["code"], "NOT_FOUND");
}

#[tokio::test]
async fn post_tags_requires_an_id_list() {
    let server = MockServer::start();
    let app = app(&server).await;

    let (status, _) = call(&app, "GET", "/tag/post", 5, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, problem) = call(&app, "GET", "/tag/post?postId=1,a", 5, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(problem["errors"][0]["field"], "postId");
}
