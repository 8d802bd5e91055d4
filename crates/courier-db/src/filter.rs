//! Turns optional named filters into a parameterized `SELECT`.
//!
//! Column names are compile-time constants supplied by the stores. Every
//! caller-supplied value is pushed onto the bound parameter list and
//! referenced by a positional `?`, never spliced into the statement text.

use rusqlite::types::Value;
use tracing::debug;

/// How a filter value is compared against its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    /// `column = ?`
    Exact,
    /// `column LIKE ? ESCAPE '\'` with the value wrapped in `%...%`.
    Substring,
}

/// A finished statement and the values to bind to it, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Debug)]
pub struct FilterBuilder {
    base: String,
    predicates: Vec<String>,
    params: Vec<Value>,
    order_by: Option<&'static str>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl FilterBuilder {
    /// `base` is a complete `SELECT ... FROM ...` without a `WHERE` clause.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            predicates: vec![],
            params: vec![],
            order_by: None,
            limit: None,
            offset: None,
        }
    }

    fn push(mut self, column: &'static str, kind: Match, value: Value) -> Self {
        let op = match kind {
            Match::Exact => "= ?",
            Match::Substring => "LIKE ? ESCAPE '\\'",
        };
        self.predicates.push(format!("\"{}\" {}", column, op));
        self.params.push(value);
        self
    }

    /// Adds `column = ?` when `value` is present; `None` means no filter.
    pub fn exact<V: Into<Value>>(self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.push(column, Match::Exact, v.into()),
            None => self,
        }
    }

    /// Adds `column LIKE ?` with the value escaped and wrapped in `%...%`.
    pub fn substring(self, column: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(v) => {
                let pattern = format!("%{}%", like_escape(v));
                self.push(column, Match::Substring, Value::Text(pattern))
            }
            None => self,
        }
    }

    pub fn order_by(mut self, column: &'static str) -> Self {
        self.order_by = Some(column);
        self
    }

    /// `offset` only applies together with `limit`. An offset on its own is
    /// dropped and the result set is unbounded.
    pub fn page(mut self, limit: Option<u32>, offset: Option<u32>) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    pub fn build(self) -> BuiltQuery {
        let mut sql = self.base;
        let mut params = self.params;

        if !self.predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.predicates.join(" AND "));
        }

        if let Some(column) = self.order_by {
            sql.push_str(&format!(" ORDER BY \"{}\" ASC", column));
        }

        match (self.limit, self.offset) {
            (Some(limit), offset) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                params.push(Value::Integer(i64::from(limit)));
                params.push(Value::Integer(i64::from(offset.unwrap_or(0))));
            }
            (None, Some(offset)) => {
                debug!("Ignoring offset {} without a limit", offset);
            }
            (None, None) => {}
        }

        BuiltQuery { sql, params }
    }
}

/// Escape LIKE wildcards for literal substring matching.
fn like_escape(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
