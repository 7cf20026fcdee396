//! End-to-end tests: gateway routes against a scripted upstream.

mod common;

use std::net::SocketAddr;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use reddit_gateway::config::{GatewayConfig, RetryConfig};
use reddit_gateway::http::HttpServer;
use reddit_gateway::lifecycle::Shutdown;

fn require_auth(headers: &HeaderMap) -> Result<(), (StatusCode, &'static str)> {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value.starts_with("Bearer ") => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, "missing bearer token")),
    }
}

fn subreddit(name: &str) -> Value {
    json!({"data": {"display_name": name, "display_name_prefixed": format!("r/{name}")}})
}

fn listing(children: Vec<Value>) -> Value {
    json!({"data": {"children": children}})
}

/// A mock upstream that answers like the real content platform.
fn reddit_like_upstream() -> Router {
    Router::new()
        .route(
            "/subreddits/popular",
            get(|headers: HeaderMap| async move {
                if let Err(e) = require_auth(&headers) {
                    return e.into_response();
                }
                Json(listing(vec![subreddit("rust"), subreddit("programming")])).into_response()
            }),
        )
        .route(
            "/r/{name}/hot",
            get(|Path(name): Path<String>| async move {
                Json(json!({"data": {"children": [
                    {"data": {
                        "title": format!("Hot in {name}"),
                        "url": "https://example.com/post",
                        "score": 42
                    }}
                ]}}))
            }),
        )
        .route(
            "/subreddits/search",
            get(
                |Query(params): Query<std::collections::HashMap<String, String>>| async move {
                    let q = params.get("q").cloned().unwrap_or_default();
                    Json(listing(vec![
                        subreddit(&format!("{q}lang")),
                        subreddit(&format!("{q}help")),
                    ]))
                },
            ),
        )
        .route(
            "/api/submit",
            post(|| async { Json(json!({"success": true, "jquery": []})) }),
        )
        .route(
            "/api/v1/me/friends/{name}",
            put(|Path(name): Path<String>| async move {
                Json(json!({"id": "r9_abc123", "name": name, "note": null}))
            })
            .delete(|Path(name): Path<String>| async move {
                if name == "ghost" {
                    (StatusCode::NOT_FOUND, Json(json!({"message": "Not Found"}))).into_response()
                } else {
                    StatusCode::OK.into_response()
                }
            }),
        )
}

async fn start_gateway(upstream: SocketAddr, retries: RetryConfig) -> SocketAddr {
    let mut config = GatewayConfig::default();
    config.upstream.base_url = format!("http://{upstream}");
    config.upstream.access_token = "test-token".to_string();
    config.retries = retries;

    let server = HttpServer::new(config, Shutdown::new()).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        server.run(listener).await.unwrap();
    });
    addr
}

async fn start_default_gateway() -> SocketAddr {
    let upstream = common::start_upstream(reddit_like_upstream()).await;
    start_gateway(upstream, RetryConfig::default()).await
}

#[tokio::test]
async fn popular_returns_prefixed_names() {
    let gateway = start_default_gateway().await;

    let response = reqwest::get(format!("http://{gateway}/popular")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let names: Vec<String> = response.json().await.unwrap();
    assert_eq!(names, vec!["r/rust", "r/programming"]);
}

#[tokio::test]
async fn posts_requires_a_subreddit_parameter() {
    let gateway = start_default_gateway().await;

    let response = reqwest::get(format!("http://{gateway}/posts")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Subreddit name is required");
}

#[tokio::test]
async fn posts_rejects_names_with_path_characters() {
    let gateway = start_default_gateway().await;

    let response = reqwest::get(format!("http://{gateway}/posts?subreddit=rust%2Fhot"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn posts_maps_title_and_url() {
    let gateway = start_default_gateway().await;

    let response = reqwest::get(format!("http://{gateway}/posts?subreddit=rust"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let posts: Value = response.json().await.unwrap();
    assert_eq!(posts[0]["title"], "Hot in rust");
    assert_eq!(posts[0]["url"], "https://example.com/post");
    // The upstream's extra fields are not passed through.
    assert!(posts[0].get("score").is_none());
}

#[tokio::test]
async fn autocomplete_requires_a_query() {
    let gateway = start_default_gateway().await;

    let response = reqwest::Client::new()
        .post(format!("http://{gateway}/autocomplete"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Search query is required");
}

#[tokio::test]
async fn autocomplete_returns_display_names() {
    let gateway = start_default_gateway().await;

    let response = reqwest::Client::new()
        .post(format!("http://{gateway}/autocomplete"))
        .json(&json!({"query": "ru"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let names: Vec<String> = response.json().await.unwrap();
    assert_eq!(names, vec!["rulang", "ruhelp"]);
}

#[tokio::test]
async fn submit_passes_upstream_json_through() {
    let gateway = start_default_gateway().await;

    let response = reqwest::Client::new()
        .post(format!("http://{gateway}/submit"))
        .json(&json!({"title": "Hello", "sr": "rust", "text": "A post"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn friend_reports_the_new_relationship() {
    let gateway = start_default_gateway().await;

    let response = reqwest::Client::new()
        .put(format!("http://{gateway}/friend"))
        .json(&json!({"name": "spez"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("spez"));
    assert!(message.contains("r9_abc123"));
}

#[tokio::test]
async fn friend_requires_a_username() {
    let gateway = start_default_gateway().await;

    let response = reqwest::Client::new()
        .put(format!("http://{gateway}/friend"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unfriend_succeeds_for_a_known_user() {
    let gateway = start_default_gateway().await;

    let response = reqwest::Client::new()
        .delete(format!("http://{gateway}/unfriend"))
        .json(&json!({"name": "spez"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("spez"));
}

#[tokio::test]
async fn unfriend_maps_upstream_404() {
    let gateway = start_default_gateway().await;

    let response = reqwest::Client::new()
        .delete(format!("http://{gateway}/unfriend"))
        .json(&json!({"name": "ghost"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "User ghost not found");
}

#[tokio::test]
async fn an_exhausted_upstream_rate_limit_surfaces_as_429() {
    let rate_limited = Router::new().route(
        "/subreddits/popular",
        get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
    );
    let upstream = common::start_upstream(rate_limited).await;
    let gateway = start_gateway(
        upstream,
        RetryConfig {
            max_attempts: 1,
            initial_delay_ms: 10,
        },
    )
    .await;

    let response = reqwest::get(format!("http://{gateway}/popular")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("try again later"));
}

#[tokio::test]
async fn an_unreachable_upstream_surfaces_as_502() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = listener.local_addr().unwrap();
    drop(listener);

    let gateway = start_gateway(dead_addr, RetryConfig::default()).await;

    let response = reqwest::get(format!("http://{gateway}/popular")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn the_index_page_is_served() {
    let gateway = start_default_gateway().await;

    let response = reqwest::get(format!("http://{gateway}/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.text().await.unwrap();
    assert!(body.contains("<html"));
}
