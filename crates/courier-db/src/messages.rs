use std::sync::Arc;

use courier_types::models::MessageKeys;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use tracing::{debug, info};

use crate::filter::FilterBuilder;
use crate::models::{MessageRow, ThreadRow};
use crate::{Database, DbResult, Repository};

const SELECT_MESSAGES: &str = r#"SELECT "userMessageID", "userID", "messageID", "messageContents", "creationDT" FROM "userMessages""#;

/// First writer wins: a second insert for the same thread is a no-op and
/// leaves the original `creationDT` in place.
const ENSURE_THREAD: &str = r#"INSERT INTO "messageThread" ("messageID", "creationDT")
    VALUES (?1, datetime('now'))
    ON CONFLICT ("messageID") DO NOTHING"#;

/// Optional filters for a message read. `None` means "do not filter".
#[derive(Debug, Default, Clone)]
pub struct MessageFilter {
    pub user_id: Option<i64>,
    pub thread_id: Option<i64>,
    pub user_message_id: Option<i64>,
    pub contents: Option<String>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

/// Payload for `add` and `put`.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub user_id: i64,
    pub thread_id: i64,
    pub contents: String,
}

#[derive(Clone)]
pub struct MessageStore {
    db: Arc<Database>,
}

impl MessageStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Filtered read. With no filters every row is returned, bounded only by
    /// `limit`.
    pub fn get(&self, filter: &MessageFilter) -> DbResult<Vec<MessageRow>> {
        self.db.with_conn(|conn| query_messages(conn, filter))
    }

    pub fn get_by_id(&self, user_message_id: i64) -> DbResult<Option<MessageRow>> {
        let filter = MessageFilter {
            user_message_id: Some(user_message_id),
            ..MessageFilter::default()
        };
        Ok(self.get(&filter)?.into_iter().next())
    }

    pub fn thread(&self, thread_id: i64) -> DbResult<Option<ThreadRow>> {
        self.db.with_conn(|conn| {
            Ok(conn
                .query_row(
                    r#"SELECT "messageID", "creationDT" FROM "messageThread" WHERE "messageID" = ?1"#,
                    [thread_id],
                    |row| {
                        Ok(ThreadRow {
                            message_id: row.get(0)?,
                            creation_dt: row.get(1)?,
                        })
                    },
                )
                .optional()?)
        })
    }

    /// Posts a new message, creating its thread on first use. Both statements
    /// commit together.
    pub fn add(&self, draft: &MessageDraft) -> DbResult<MessageKeys> {
        let keys = self.db.with_conn_mut(|conn| {
            let tx = conn.unchecked_transaction()?;
            ensure_thread(&tx, draft.thread_id)?;
            let keys = tx.query_row(
                r#"INSERT INTO "userMessages" ("userID", "messageID", "messageContents", "creationDT")
                   VALUES (?1, ?2, ?3, datetime('now'))
                   RETURNING "userMessageID", "messageID""#,
                params![draft.user_id, draft.thread_id, draft.contents],
                read_keys,
            )?;
            tx.commit()?;
            Ok(keys)
        })?;

        info!(
            "User {} posted message {} to thread {}",
            draft.user_id, keys.user_message_id, keys.message_id
        );
        Ok(keys)
    }

    /// Inserts the row keyed by `user_message_id` or, if it exists, replaces
    /// its contents and refreshes `creationDT`. An existing row owned by a
    /// different user is left untouched, nothing is written and `None` is
    /// returned.
    pub fn put(&self, user_message_id: i64, draft: &MessageDraft) -> DbResult<Option<MessageKeys>> {
        let keys = self.db.with_conn_mut(|conn| {
            let tx = conn.unchecked_transaction()?;
            ensure_thread(&tx, draft.thread_id)?;
            let keys = tx
                .query_row(
                    r#"INSERT INTO "userMessages" ("userMessageID", "userID", "messageID", "messageContents", "creationDT")
                       VALUES (?1, ?2, ?3, ?4, datetime('now'))
                       ON CONFLICT ("userMessageID") DO UPDATE
                           SET "messageContents" = excluded."messageContents",
                               "creationDT" = excluded."creationDT"
                           WHERE "userMessages"."userID" = excluded."userID"
                       RETURNING "userMessageID", "messageID""#,
                    params![user_message_id, draft.user_id, draft.thread_id, draft.contents],
                    read_keys,
                )
                .optional()?;
            // A guarded-out upsert must not leave its thread insert behind.
            if keys.is_some() {
                tx.commit()?;
            }
            Ok(keys)
        })?;

        match keys {
            Some(k) => debug!("Upserted message {} in thread {}", k.user_message_id, k.message_id),
            None => debug!(
                "Upsert of message {} skipped: owned by another user",
                user_message_id
            ),
        }
        Ok(keys)
    }

    /// Removes a message by primary key and returns the thread it belonged
    /// to. The thread row itself is kept.
    pub fn delete(&self, user_message_id: i64) -> DbResult<Option<i64>> {
        let thread_id = self.db.with_conn_mut(|conn| {
            Ok(conn
                .query_row(
                    r#"DELETE FROM "userMessages" WHERE "userMessageID" = ?1 RETURNING "messageID""#,
                    [user_message_id],
                    |row| row.get(0),
                )
                .optional()?)
        })?;

        if thread_id.is_some() {
            info!("Deleted message {}", user_message_id);
        }
        Ok(thread_id)
    }
}

impl Repository for MessageStore {
    type Filter = MessageFilter;
    type Record = MessageRow;
    type Draft = MessageDraft;

    fn read(&self, filter: &MessageFilter) -> DbResult<Vec<MessageRow>> {
        self.get(filter)
    }

    fn write(&self, draft: &MessageDraft) -> DbResult<i64> {
        Ok(self.add(draft)?.user_message_id)
    }
}

fn ensure_thread(conn: &Connection, thread_id: i64) -> DbResult<()> {
    let inserted = conn.execute(ENSURE_THREAD, [thread_id])?;
    if inserted > 0 {
        info!("Created thread {}", thread_id);
    }
    Ok(())
}

fn read_keys(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageKeys> {
    Ok(MessageKeys {
        user_message_id: row.get(0)?,
        message_id: row.get(1)?,
    })
}

fn query_messages(conn: &Connection, filter: &MessageFilter) -> DbResult<Vec<MessageRow>> {
    let query = FilterBuilder::new(SELECT_MESSAGES)
        .exact("userID", filter.user_id)
        .exact("messageID", filter.thread_id)
        .exact("userMessageID", filter.user_message_id)
        .substring("messageContents", filter.contents.as_deref())
        .order_by("userMessageID")
        .page(filter.limit, filter.offset)
        .build();

    let mut stmt = conn.prepare(&query.sql)?;
    let rows = stmt
        .query_map(params_from_iter(query.params), |row| {
            Ok(MessageRow {
                user_message_id: row.get(0)?,
                user_id: row.get(1)?,
                message_id: row.get(2)?,
                message_contents: row.get(3)?,
                creation_dt: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TempDb;
    use crate::users::{NewUser, UserStore};
    use crate::DbError;

    struct Fixture {
        t: TempDb,
        messages: MessageStore,
        alice: i64,
        bob: i64,
    }

    fn fixture() -> Fixture {
        let t = TempDb::new();
        let users = UserStore::new(t.db.clone());
        let add = |first: &str| {
            users
                .add(&NewUser {
                    first_name: Some(first.into()),
                    last_name: Some("Test".into()),
                    is_admin: false,
                })
                .unwrap()
        };
        let alice = add("Alice");
        let bob = add("Bob");
        let messages = MessageStore::new(t.db.clone());
        Fixture { t, messages, alice, bob }
    }

    fn draft(user_id: i64, thread_id: i64, contents: &str) -> MessageDraft {
        MessageDraft {
            user_id,
            thread_id,
            contents: contents.into(),
        }
    }

    fn thread_created_at(t: &TempDb, thread_id: i64) -> String {
        t.db.with_conn(|conn| {
            Ok(conn.query_row(
                r#"SELECT "creationDT" FROM "messageThread" WHERE "messageID" = ?1"#,
                [thread_id],
                |r| r.get(0),
            )?)
        })
        .unwrap()
    }

    #[test]
    fn add_creates_thread_once() {
        let f = fixture();

        let first = f.messages.add(&draft(f.alice, 7, "hello")).unwrap();
        f.t.db
            .with_conn_mut(|conn| {
                conn.execute(
                    r#"UPDATE "messageThread" SET "creationDT" = '2001-01-01 00:00:00' WHERE "messageID" = 7"#,
                    [],
                )?;
                Ok(())
            })
            .unwrap();
        let second = f.messages.add(&draft(f.bob, 7, "hi back")).unwrap();

        assert_eq!(first.message_id, 7);
        assert_eq!(second.message_id, 7);
        assert_ne!(first.user_message_id, second.user_message_id);
        assert_eq!(f.t.count("messageThread"), 1);
        assert_eq!(f.t.count("userMessages"), 2);
        assert_eq!(thread_created_at(&f.t, 7), "2001-01-01 00:00:00");
    }

    #[test]
    fn add_for_unknown_user_is_referential_error() {
        let f = fixture();

        let err = f.messages.add(&draft(9999, 1, "ghost")).unwrap_err();
        assert!(matches!(err, DbError::Referential(_)), "got {:?}", err);
        assert_eq!(f.t.count("userMessages"), 0);
        assert_eq!(f.t.count("messageThread"), 0);
    }

    #[test]
    fn put_inserts_then_updates_in_place() {
        let f = fixture();

        let created = f.messages.put(500, &draft(f.alice, 3, "draft")).unwrap().unwrap();
        assert_eq!(created.user_message_id, 500);
        assert_eq!(f.t.count("userMessages"), 1);

        f.t.db
            .with_conn_mut(|conn| {
                conn.execute(
                    r#"UPDATE "userMessages" SET "creationDT" = '2001-01-01 00:00:00' WHERE "userMessageID" = 500"#,
                    [],
                )?;
                Ok(())
            })
            .unwrap();

        let updated = f.messages.put(500, &draft(f.alice, 3, "final")).unwrap().unwrap();
        assert_eq!(updated, created);
        assert_eq!(f.t.count("userMessages"), 1);

        let row = f.messages.get_by_id(500).unwrap().unwrap();
        assert_eq!(row.message_contents, "final");
        assert_ne!(row.creation_dt, "2001-01-01 00:00:00");
    }

    #[test]
    fn put_does_not_touch_another_users_message() {
        let f = fixture();
        let keys = f.messages.add(&draft(f.alice, 1, "mine")).unwrap();

        let result = f
            .messages
            .put(keys.user_message_id, &draft(f.bob, 1, "hijacked"))
            .unwrap();
        assert!(result.is_none());

        let row = f.messages.get_by_id(keys.user_message_id).unwrap().unwrap();
        assert_eq!(row.message_contents, "mine");
        assert_eq!(row.user_id, f.alice);
    }

    #[test]
    fn get_filter_composition() {
        let f = fixture();
        f.messages.add(&draft(f.alice, 1, "a1")).unwrap();
        f.messages.add(&draft(f.alice, 2, "a2")).unwrap();
        f.messages.add(&draft(f.bob, 2, "b2")).unwrap();

        let all = f.messages.get(&MessageFilter::default()).unwrap();
        assert_eq!(all.len(), 3);

        let alices = f
            .messages
            .get(&MessageFilter { user_id: Some(f.alice), ..Default::default() })
            .unwrap();
        assert_eq!(alices.len(), 2);
        assert!(alices.iter().all(|m| m.user_id == f.alice));

        let alice_thread_two = f
            .messages
            .get(&MessageFilter {
                user_id: Some(f.alice),
                thread_id: Some(2),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(alice_thread_two.len(), 1);
        assert_eq!(alice_thread_two[0].message_contents, "a2");
    }

    #[test]
    fn contents_filter_matches_substrings_literally() {
        let f = fixture();
        f.messages.add(&draft(f.alice, 1, "meet at 5pm")).unwrap();
        f.messages.add(&draft(f.alice, 1, "100% sure")).unwrap();
        f.messages.add(&draft(f.bob, 1, "100 percent")).unwrap();

        let by_word = f
            .messages
            .get(&MessageFilter { contents: Some("at 5".into()), ..Default::default() })
            .unwrap();
        assert_eq!(by_word.len(), 1);

        let by_percent = f
            .messages
            .get(&MessageFilter { contents: Some("0%".into()), ..Default::default() })
            .unwrap();
        assert_eq!(by_percent.len(), 1);
        assert_eq!(by_percent[0].message_contents, "100% sure");
    }

    #[test]
    fn delete_returns_thread_and_keeps_it() {
        let f = fixture();
        let keys = f.messages.add(&draft(f.alice, 4, "bye")).unwrap();

        assert_eq!(f.messages.delete(keys.user_message_id).unwrap(), Some(4));
        assert_eq!(f.messages.delete(keys.user_message_id).unwrap(), None);
        assert_eq!(f.t.count("userMessages"), 0);
        assert!(f.messages.thread(4).unwrap().is_some());
    }

    #[test]
    fn message_model_uses_display_timestamp() {
        let f = fixture();
        f.messages.add(&draft(f.alice, 1, "x")).unwrap();
        let rows = f.messages.read(&MessageFilter::default()).unwrap();
        let message: courier_types::models::Message = rows.into_iter().next().unwrap().into();
        assert_eq!(message.creation_dt.len(), "10/03/2023, 16:25:07".len());
        assert_eq!(&message.creation_dt[2..3], "/");
    }

    #[test]
    fn rejected_put_does_not_create_its_thread() {
        let f = fixture();
        let keys = f.messages.add(&draft(f.alice, 1, "mine")).unwrap();

        let result = f
            .messages
            .put(keys.user_message_id, &draft(f.bob, 999, "moved"))
            .unwrap();
        assert!(result.is_none());
        assert_eq!(f.t.count("messageThread"), 1);
        assert!(f.messages.thread(999).unwrap().is_none());

        let row = f.messages.get_by_id(keys.user_message_id).unwrap().unwrap();
        assert_eq!(row.message_id, 1);
    }

    #[test]
    fn concurrent_adds_share_one_new_thread() {
        const WRITERS: usize = 16;
        let f = fixture();

        let handles: Vec<_> = (0..WRITERS)
            .map(|i| {
                let messages = f.messages.clone();
                let user_id = if i % 2 == 0 { f.alice } else { f.bob };
                std::thread::spawn(move || {
                    messages.add(&draft(user_id, 42, &format!("msg {}", i))).unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().message_id, 42);
        }

        assert_eq!(f.t.count("messageThread"), 1);
        assert_eq!(f.t.count("userMessages"), WRITERS as i64);
    }

    #[test]
    fn write_through_repository_returns_message_id() {
        let f = fixture();
        let id = f.messages.write(&draft(f.alice, 8, "via trait")).unwrap();

        let row = f.messages.get_by_id(id).unwrap().unwrap();
        assert_eq!(row.message_contents, "via trait");
        assert_eq!(row.message_id, 8);
        assert!(f.messages.thread(8).unwrap().is_some());
    }
}
