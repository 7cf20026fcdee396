//! Gateway route handlers.
//!
//! Each handler validates its input, builds an authorized
//! [`OutboundRequest`](crate::upstream::OutboundRequest), hands it to the
//! dispatcher, and shapes the upstream listing into the simplified JSON the
//! gateway exposes.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::http::response::{dispatch_failure, error_response};
use crate::http::server::AppState;
use crate::upstream::types::{FriendRecord, Listing, PostData, SubredditData};
use crate::upstream::DispatchResult;

/// Subreddit and user names: letters, digits, underscore, hyphen.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn internal_error(operation: &str, err: impl std::fmt::Display) -> Response {
    tracing::error!(operation, error = %err, "Internal gateway error");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal gateway error")
}

fn parse_listing<T: serde::de::DeserializeOwned>(
    operation: &str,
    body: &str,
) -> Result<Listing<T>, Response> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(operation, error = %e, "Unexpected upstream payload");
        error_response(
            StatusCode::BAD_GATEWAY,
            format!("Unexpected upstream payload while trying to {operation}"),
        )
    })
}

/// `GET /popular` — prefixed names of the currently popular subreddits.
pub async fn popular_subreddits(State(state): State<AppState>) -> Response {
    let operation = "fetch popular subreddits";
    let request = match state.upstream.request(Method::GET, "/subreddits/popular") {
        Ok(r) => r,
        Err(e) => return internal_error(operation, e),
    };

    match state.dispatcher.dispatch(request).await {
        DispatchResult::Success { body, .. } => {
            match parse_listing::<SubredditData>(operation, &body) {
                Ok(listing) => {
                    let names: Vec<String> = listing
                        .data
                        .children
                        .into_iter()
                        .map(|child| child.data.display_name_prefixed)
                        .collect();
                    Json(names).into_response()
                }
                Err(response) => response,
            }
        }
        other => dispatch_failure(operation, other),
    }
}

#[derive(Debug, Deserialize)]
pub struct PostsParams {
    pub subreddit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostSummary {
    pub title: String,
    pub url: String,
}

/// `GET /posts?subreddit=<name>` — hot posts of one subreddit.
pub async fn subreddit_posts(
    State(state): State<AppState>,
    Query(params): Query<PostsParams>,
) -> Response {
    let operation = "fetch posts";
    let name = match params.subreddit.as_deref() {
        Some(n) if is_valid_name(n) => n,
        Some(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid subreddit name"),
        None => return error_response(StatusCode::BAD_REQUEST, "Subreddit name is required"),
    };

    let request = match state.upstream.request(Method::GET, &format!("/r/{name}/hot")) {
        Ok(r) => r,
        Err(e) => return internal_error(operation, e),
    };

    match state.dispatcher.dispatch(request).await {
        DispatchResult::Success { body, .. } => match parse_listing::<PostData>(operation, &body) {
            Ok(listing) => {
                let posts: Vec<PostSummary> = listing
                    .data
                    .children
                    .into_iter()
                    .map(|child| PostSummary {
                        title: child.data.title,
                        url: child.data.url,
                    })
                    .collect();
                Json(posts).into_response()
            }
            Err(response) => response,
        },
        other => dispatch_failure(operation, other),
    }
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteBody {
    pub query: Option<String>,
}

/// `POST /autocomplete` — subreddit name completion for a search query.
pub async fn autocomplete_subreddits(
    State(state): State<AppState>,
    Json(body): Json<AutocompleteBody>,
) -> Response {
    let operation = "fetch autocomplete results";
    let query = match body.query.as_deref() {
        Some(q) if !q.trim().is_empty() => q,
        _ => return error_response(StatusCode::BAD_REQUEST, "Search query is required"),
    };

    let request = match state.upstream.request(Method::GET, "/subreddits/search") {
        Ok(r) => r.query("q", query).query("type", "sr"),
        Err(e) => return internal_error(operation, e),
    };

    match state.dispatcher.dispatch(request).await {
        DispatchResult::Success { body, .. } => {
            match parse_listing::<SubredditData>(operation, &body) {
                Ok(listing) => {
                    let names: Vec<String> = listing
                        .data
                        .children
                        .into_iter()
                        .map(|child| child.data.display_name)
                        .collect();
                    Json(names).into_response()
                }
                Err(response) => response,
            }
        }
        other => dispatch_failure(operation, other),
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SubmitBody {
    pub title: String,
    pub kind: String,
    pub sr: String,
    pub resubmit: bool,
    pub sendreplies: bool,
    pub text: String,
}

impl Default for SubmitBody {
    fn default() -> Self {
        Self {
            title: "Default Title".to_string(),
            kind: "self".to_string(),
            sr: "APITest_SWA".to_string(),
            resubmit: true,
            sendreplies: true,
            text: "Default Text".to_string(),
        }
    }
}

/// `POST /submit` — create a post, form-encoded like the upstream expects.
pub async fn submit_post(State(state): State<AppState>, Json(body): Json<SubmitBody>) -> Response {
    let operation = "submit post";
    let fields = vec![
        ("title".to_string(), body.title),
        ("kind".to_string(), body.kind),
        ("sr".to_string(), body.sr),
        ("resubmit".to_string(), body.resubmit.to_string()),
        ("sendreplies".to_string(), body.sendreplies.to_string()),
        ("text".to_string(), body.text),
    ];

    let request = match state.upstream.request(Method::POST, "/api/submit") {
        Ok(r) => r.form(fields),
        Err(e) => return internal_error(operation, e),
    };

    match state.dispatcher.dispatch(request).await {
        DispatchResult::Success { body, .. } => {
            match serde_json::from_str::<serde_json::Value>(&body) {
                Ok(value) => Json(value).into_response(),
                // The upstream occasionally answers submit with plain text.
                Err(_) => body.into_response(),
            }
        }
        other => dispatch_failure(operation, other),
    }
}

#[derive(Debug, Deserialize)]
pub struct FriendBody {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

/// `PUT /friend` — add a user to the friends list.
pub async fn add_friend(State(state): State<AppState>, Json(body): Json<FriendBody>) -> Response {
    let operation = "add friend";
    let name = match body.name.as_deref() {
        Some(n) if is_valid_name(n) => n.to_string(),
        Some(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid username"),
        None => return error_response(StatusCode::BAD_REQUEST, "Username is required"),
    };

    let request = match state
        .upstream
        .request(Method::PUT, &format!("/api/v1/me/friends/{name}"))
    {
        Ok(r) => r.json(serde_json::json!({ "name": name, "note": "Added through the gateway" })),
        Err(e) => return internal_error(operation, e),
    };

    match state.dispatcher.dispatch(request).await {
        DispatchResult::Success { body, .. } => match serde_json::from_str::<FriendRecord>(&body) {
            Ok(record) => Json(MessageBody {
                message: format!(
                    "Added {} to the friends list (relationship id {})",
                    record.name, record.id
                ),
            })
            .into_response(),
            Err(e) => {
                tracing::error!(operation, error = %e, "Unexpected upstream payload");
                error_response(
                    StatusCode::BAD_GATEWAY,
                    "Unexpected upstream payload while trying to add friend",
                )
            }
        },
        other => dispatch_failure(operation, other),
    }
}

/// `DELETE /unfriend` — remove a user from the friends list.
pub async fn remove_friend(
    State(state): State<AppState>,
    Json(body): Json<FriendBody>,
) -> Response {
    let operation = "remove friend";
    let name = match body.name.as_deref() {
        Some(n) if is_valid_name(n) => n.to_string(),
        Some(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid username"),
        None => return error_response(StatusCode::BAD_REQUEST, "Username is required"),
    };

    let request = match state
        .upstream
        .request(Method::DELETE, &format!("/api/v1/me/friends/{name}"))
    {
        Ok(r) => r,
        Err(e) => return internal_error(operation, e),
    };

    match state.dispatcher.dispatch(request).await {
        DispatchResult::Success { .. } => Json(MessageBody {
            message: format!("Removed {name} from the friends list"),
        })
        .into_response(),
        DispatchResult::ClientError { status, .. } if status == StatusCode::NOT_FOUND => {
            error_response(StatusCode::NOT_FOUND, format!("User {name} not found"))
        }
        other => dispatch_failure(operation, other),
    }
}
