//! Serde types for the upstream wire format.
//!
//! The upstream wraps collections in a listing envelope:
//! `{"data": {"children": [{"data": {...}}, ...]}}`. Only the fields the
//! gateway surfaces are modelled; everything else is ignored.

use serde::Deserialize;

/// Listing envelope around a collection of things.
#[derive(Debug, Deserialize)]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub struct ListingData<T> {
    pub children: Vec<Thing<T>>,
}

/// A single wrapped item inside a listing.
#[derive(Debug, Deserialize)]
pub struct Thing<T> {
    pub data: T,
}

/// Subreddit fields surfaced by the gateway.
#[derive(Debug, Deserialize)]
pub struct SubredditData {
    pub display_name: String,
    pub display_name_prefixed: String,
}

/// Post fields surfaced by the gateway.
#[derive(Debug, Deserialize)]
pub struct PostData {
    pub title: String,
    pub url: String,
}

/// Relationship record returned when adding a friend.
#[derive(Debug, Deserialize)]
pub struct FriendRecord {
    pub id: String,
    pub name: String,
}
