//! Shared fixtures: hub message builders and a hub config pointed at a mock server.

#![allow(dead_code)]

use cartography::config::HubConfig;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Hub config for `server` with no pacing and millisecond backoff.
pub fn hub_config(server: &MockServer) -> HubConfig {
    HubConfig {
        api_key: Some("test-key".to_string()),
        base_url: format!("{}/v1/", server.uri()),
        api_base_url: format!("{}/v2/", server.uri()),
        page_size: 2,
        max_retries: 2,
        initial_backoff_ms: 1,
        request_delay_ms: 0,
        timeout_secs: 5,
        ..HubConfig::default()
    }
}

pub fn page(messages: Vec<Value>, next: Option<&str>) -> Value {
    match next {
        Some(token) => json!({ "messages": messages, "nextPageToken": token }),
        None => json!({ "messages": messages, "nextPageToken": "" }),
    }
}

pub fn user_data(fid: u64, data_type: &str, value: &str) -> Value {
    json!({
        "data": {
            "type": "MESSAGE_TYPE_USER_DATA_ADD",
            "fid": fid,
            "timestamp": 100,
            "userDataBody": { "type": data_type, "value": value }
        },
        "hash": format!("0xud{fid}")
    })
}

pub fn like(fid: u64, target: u64, timestamp: i64) -> Value {
    reaction("REACTION_TYPE_LIKE", fid, target, timestamp)
}

pub fn recast(fid: u64, target: u64, timestamp: i64) -> Value {
    reaction("REACTION_TYPE_RECAST", fid, target, timestamp)
}

fn reaction(reaction_type: &str, fid: u64, target: u64, timestamp: i64) -> Value {
    json!({
        "data": {
            "type": "MESSAGE_TYPE_REACTION_ADD",
            "fid": fid,
            "timestamp": timestamp,
            "reactionBody": {
                "type": reaction_type,
                "targetCastId": { "fid": target, "hash": format!("0xcast{target}_{timestamp}") }
            }
        }
    })
}

pub fn reply(fid: u64, parent: u64, timestamp: i64) -> Value {
    json!({
        "data": {
            "type": "MESSAGE_TYPE_CAST_ADD",
            "fid": fid,
            "timestamp": timestamp,
            "castAddBody": {
                "text": "gm",
                "parentCastId": { "fid": parent, "hash": "0xparent" }
            }
        }
    })
}

pub fn follow(fid: u64, target: u64, timestamp: i64) -> Value {
    json!({
        "data": {
            "type": "MESSAGE_TYPE_LINK_ADD",
            "fid": fid,
            "timestamp": timestamp,
            "linkBody": { "type": "follow", "targetFid": target }
        }
    })
}

pub fn bulk_user(fid: u64, username: &str) -> Value {
    json!({
        "fid": fid,
        "username": username,
        "display_name": username.to_uppercase(),
        "pfp_url": format!("https://img.example/{fid}.png"),
        "follower_count": 10,
        "following_count": 5
    })
}

/// Mount single-page responses for every endpoint the assembler reads for `fid`.
pub async fn mount_user(
    server: &MockServer,
    fid: u64,
    profile: Vec<Value>,
    likes: Vec<Value>,
    recasts: Vec<Value>,
    replies: Vec<Value>,
    follows: Vec<Value>,
) {
    let fid_str = fid.to_string();

    Mock::given(method("GET"))
        .and(path("/v1/userDataByFid"))
        .and(query_param("fid", fid_str.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(profile, None)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/reactionsByFid"))
        .and(query_param("fid", fid_str.as_str()))
        .and(query_param("reaction_type", "REACTION_TYPE_LIKE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(likes, None)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/reactionsByFid"))
        .and(query_param("fid", fid_str.as_str()))
        .and(query_param("reaction_type", "REACTION_TYPE_RECAST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(recasts, None)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/castsByFid"))
        .and(query_param("fid", fid_str.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(replies, None)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/linksByFid"))
        .and(query_param("fid", fid_str.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(follows, None)))
        .mount(server)
        .await;
}

/// Bulk lookup answering with `users` regardless of the requested ids.
pub async fn mount_bulk(server: &MockServer, users: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/v2/user/bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": users })))
        .mount(server)
        .await;
}
