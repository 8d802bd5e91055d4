use serde::{Deserialize, Serialize};

// -- JWT Claims --

/// JWT claims issued by the login endpoint and checked by the bearer
/// middleware. `sub` is optional here so a token without a subject can be
/// told apart from a token that fails to parse at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[serde(rename = "lastName", default)]
    pub last_name: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[serde(rename = "userID")]
    pub user_id: i64,
    /// Accepted for forward compatibility; not verified.
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    #[serde(rename = "tokenType")]
    pub token_type: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: usize,
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewUserRequest {
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewUserResponse {
    #[serde(rename = "userID")]
    pub user_id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    #[serde(rename = "userID")]
    pub user_id: Option<i64>,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    #[serde(rename = "isAdmin")]
    pub is_admin: Option<bool>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

// -- Messages --

#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    #[serde(rename = "userID")]
    pub user_id: Option<i64>,
    #[serde(rename = "threadID")]
    pub thread_id: Option<i64>,
    #[serde(rename = "userMessageID")]
    pub user_message_id: Option<i64>,
    pub contents: Option<String>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

/// Body of POST and PUT on the message endpoint. `userMessageID` is only
/// read by PUT, where it keys the upsert.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    #[serde(rename = "userMessageID", default)]
    pub user_message_id: Option<i64>,
    #[serde(rename = "userID")]
    pub user_id: i64,
    #[serde(rename = "messageID")]
    pub message_id: i64,
    #[serde(rename = "messageContents")]
    pub message_contents: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteMessageRequest {
    #[serde(rename = "userMessageID")]
    pub user_message_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedMessageResponse {
    #[serde(rename = "messageID")]
    pub message_id: i64,
}

// -- Hypermedia --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

/// A record with its hypermedia links. The record's own fields are
/// flattened into the top-level object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource<T> {
    #[serde(flatten)]
    pub record: T,
    pub links: Vec<Link>,
}
