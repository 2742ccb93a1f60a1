//! Document store abstraction.
//!
//! Records are schemaless JSON objects addressed by `(collection, id)`. The
//! store assigns `created_at` at insert time and enforces id uniqueness per
//! collection; callers rely on [`StoreError::AlreadyExists`] as their only
//! concurrency primitive.

mod sqlite;

pub use sqlite::SqliteDocumentStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Longest id the store accepts.
pub const MAX_ID_LEN: usize = 36;

pub type Fields = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document {collection}/{id} already exists")]
    AlreadyExists { collection: String, id: String },

    #[error("Document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("Store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    #[error("Corrupt document: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Invalid document id: {0:?}")]
    InvalidId(String),

    #[error("Invalid field name: {0:?}")]
    InvalidField(String),

    #[error("Document fields must be a JSON object")]
    NotAnObject,
}

impl StoreError {
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Serializes a value into document fields.
pub fn to_fields<T: serde::Serialize>(value: &T) -> StoreResult<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Top-level string field equals the given value.
    Eq { field: String, value: String },
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// Only the store-assigned creation time is orderable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ordering {
    pub direction: Direction,
}

impl Ordering {
    pub fn oldest_first() -> Self {
        Self {
            direction: Direction::Asc,
        }
    }

    pub fn newest_first() -> Self {
        Self {
            direction: Direction::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    Full,
    /// Documents come back with empty `fields`.
    IdsOnly,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub ordering: Ordering,
    pub limit: Option<u32>,
    pub projection: Projection,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Filter::eq(field, value));
        self
    }

    pub fn order(mut self, ordering: Ordering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn ids_only(mut self) -> Self {
        self.projection = Projection::IdsOnly;
        self
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<Document>;

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Document>;

    async fn list(&self, collection: &str, query: ListQuery) -> StoreResult<Vec<Document>>;

    /// Shallow-merges `fields` into the stored object.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<Document>;

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Counts matching documents. The default lists ids only; backends with
    /// a native count should override it.
    async fn count(&self, collection: &str, query: ListQuery) -> StoreResult<u64> {
        let docs = self.list(collection, query.ids_only()).await?;
        Ok(docs.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn to_fields_accepts_objects_only() {
        let fields = to_fields(&json!({ "kind": "like" })).unwrap();
        assert_eq!(fields.get("kind"), Some(&json!("like")));

        assert!(matches!(to_fields(&"text"), Err(StoreError::NotAnObject)));
        assert!(matches!(to_fields(&vec![1, 2]), Err(StoreError::NotAnObject)));
    }
}
