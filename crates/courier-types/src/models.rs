use serde::{Deserialize, Serialize};

/// A registered participant. Append-only: created once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "userID")]
    pub user_id: i64,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

/// The parent grouping of messages. `messageID` names the thread, not a
/// single message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageThread {
    #[serde(rename = "messageID")]
    pub message_id: i64,
    #[serde(rename = "creationDT")]
    pub creation_dt: String,
}

/// A single post inside a thread. Contents are opaque text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "userMessageID")]
    pub user_message_id: i64,
    #[serde(rename = "userID")]
    pub user_id: i64,
    #[serde(rename = "messageID")]
    pub message_id: i64,
    #[serde(rename = "messageContents")]
    pub message_contents: String,
    #[serde(rename = "creationDT")]
    pub creation_dt: String,
}

/// Identifiers touched by a message insert or upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageKeys {
    #[serde(rename = "userMessageID")]
    pub user_message_id: i64,
    #[serde(rename = "messageID")]
    pub message_id: i64,
}
