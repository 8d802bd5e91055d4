use rusqlite::Connection;
use tracing::info;

use crate::DbResult;

/// Creates the three tables if they are missing. Safe to run on every open.
pub fn run(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS "messageUsers" (
            "userID"        INTEGER PRIMARY KEY AUTOINCREMENT,
            "firstName"     TEXT NOT NULL,
            "lastName"      TEXT NOT NULL,
            "isAdmin"       BOOLEAN NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS "messageThread" (
            "messageID"     INTEGER PRIMARY KEY AUTOINCREMENT,
            "creationDT"    TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS "userMessages" (
            "userMessageID"     INTEGER PRIMARY KEY AUTOINCREMENT,
            "userID"            INTEGER NOT NULL REFERENCES "messageUsers"("userID"),
            "messageID"         INTEGER NOT NULL REFERENCES "messageThread"("messageID"),
            "messageContents"   TEXT NOT NULL,
            "creationDT"        TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS "idx_userMessages_user_thread"
            ON "userMessages"("userID", "messageID");
        "#,
    )?;

    info!("Database migrations complete");
    Ok(())
}
