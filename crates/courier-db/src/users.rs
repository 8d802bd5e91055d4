use std::sync::Arc;

use rusqlite::{Connection, params_from_iter};
use tracing::info;

use crate::filter::FilterBuilder;
use crate::models::UserRow;
use crate::{Database, DbError, DbResult, Repository};

const SELECT_USERS: &str =
    r#"SELECT "userID", "firstName", "lastName", "isAdmin" FROM "messageUsers""#;

/// Optional filters for a user read. `None` means "do not filter".
#[derive(Debug, Default, Clone)]
pub struct UserFilter {
    pub user_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_admin: Option<bool>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl UserFilter {
    pub fn by_id(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct NewUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_admin: bool,
}

#[derive(Clone)]
pub struct UserStore {
    db: Arc<Database>,
}

impl UserStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn get(&self, filter: &UserFilter) -> DbResult<Vec<UserRow>> {
        self.db.with_conn(|conn| query_users(conn, filter))
    }

    pub fn get_by_id(&self, user_id: i64) -> DbResult<Option<UserRow>> {
        Ok(self.get(&UserFilter::by_id(user_id))?.into_iter().next())
    }

    /// Inserts a user and returns the generated `userID`.
    pub fn add(&self, user: &NewUser) -> DbResult<i64> {
        let first_name = required("firstName", user.first_name.as_deref())?;
        let last_name = required("lastName", user.last_name.as_deref())?;

        let user_id = self.db.with_conn_mut(|conn| {
            Ok(conn.query_row(
                r#"INSERT INTO "messageUsers" ("firstName", "lastName", "isAdmin")
                   VALUES (?1, ?2, ?3) RETURNING "userID""#,
                (first_name, last_name, user.is_admin),
                |row| row.get(0),
            )?)
        })?;

        info!("Created user {}", user_id);
        Ok(user_id)
    }
}

impl Repository for UserStore {
    type Filter = UserFilter;
    type Record = UserRow;
    type Draft = NewUser;

    fn read(&self, filter: &UserFilter) -> DbResult<Vec<UserRow>> {
        self.get(filter)
    }

    fn write(&self, draft: &NewUser) -> DbResult<i64> {
        self.add(draft)
    }
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> DbResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DbError::invalid(field, "is required")),
    }
}

fn query_users(conn: &Connection, filter: &UserFilter) -> DbResult<Vec<UserRow>> {
    let query = FilterBuilder::new(SELECT_USERS)
        .exact("userID", filter.user_id)
        .exact("firstName", filter.first_name.clone())
        .exact("lastName", filter.last_name.clone())
        .exact("isAdmin", filter.is_admin)
        .order_by("userID")
        .page(filter.limit, filter.offset)
        .build();

    let mut stmt = conn.prepare(&query.sql)?;
    let rows = stmt
        .query_map(params_from_iter(query.params), |row| {
            Ok(UserRow {
                user_id: row.get(0)?,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
                is_admin: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}
