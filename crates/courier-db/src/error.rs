use thiserror::Error;

/// Failures surfaced by the data-access layer. Nothing here is retried.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// A foreign key rejected the write, e.g. a message for an unknown user.
    #[error("referential constraint violated: {0}")]
    Referential(String),

    #[error("store error: {0}")]
    Store(rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(String),
}

pub type DbResult<T> = std::result::Result<T, DbError>;

impl DbError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(code, msg)
                if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                Self::Referential(msg.clone().unwrap_or_else(|| code.to_string()))
            }
            _ => Self::Store(e),
        }
    }
}
