//! Database row types. These map directly to SQLite rows and are converted
//! into `courier-types` models at the crate boundary.

use courier_types::models::{Message, MessageThread, User};

use crate::timestamps;

pub struct UserRow {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

pub struct ThreadRow {
    pub message_id: i64,
    pub creation_dt: String,
}

pub struct MessageRow {
    pub user_message_id: i64,
    pub user_id: i64,
    pub message_id: i64,
    pub message_contents: String,
    pub creation_dt: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.user_id,
            first_name: row.first_name,
            last_name: row.last_name,
            is_admin: row.is_admin,
        }
    }
}

impl From<ThreadRow> for MessageThread {
    fn from(row: ThreadRow) -> Self {
        Self {
            message_id: row.message_id,
            creation_dt: timestamps::display(&row.creation_dt),
        }
    }
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            user_message_id: row.user_message_id,
            user_id: row.user_id,
            message_id: row.message_id,
            message_contents: row.message_contents,
            creation_dt: timestamps::display(&row.creation_dt),
        }
    }
}
