//! Chat REST wire types

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct UserStatus {
    pub user_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdate<'a> {
    pub user_id: &'a str,
    pub status: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct Channel {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct NewPost<'a> {
    pub channel_id: &'a str,
    pub message: &'a str,
}
