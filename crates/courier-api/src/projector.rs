//! Maps records into response representations with hypermedia links.

use courier_types::api::{Link, Resource};
use courier_types::models::{Message, User};

use crate::error::ApiError;

/// A record that can be linked back to the user who owns it.
pub trait Owned {
    fn owner_id(&self) -> i64;
}

impl Owned for User {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

impl Owned for Message {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

pub fn self_link(owner_id: i64) -> Link {
    Link {
        rel: "self".into(),
        href: format!("/users/{}", owner_id),
    }
}

pub fn project<T: Owned>(record: T) -> Resource<T> {
    let links = vec![self_link(record.owner_id())];
    Resource { record, links }
}

pub fn project_all<T: Owned>(records: impl IntoIterator<Item = T>) -> Vec<Resource<T>> {
    records.into_iter().map(project).collect()
}

/// Unwraps a single-entity lookup. Zero matches and more than one match are
/// both reported as not found.
pub fn collapse_or_not_found<T>(records: Vec<T>) -> Result<T, ApiError> {
    let mut iter = records.into_iter();
    match (iter.next(), iter.next()) {
        (Some(only), None) => Ok(only),
        _ => Err(ApiError::NotFound),
    }
}
