use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::sync::Arc;

use super::{
    Direction, Document, DocumentStore, Fields, Filter, ListQuery, Projection, StoreError,
    StoreResult, MAX_ID_LEN,
};

/// Raw row shape of the `documents` table.
#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: String,
    fields: String,
    created_at: i64,
    updated_at: i64,
}

impl DocumentRow {
    fn into_document(self) -> StoreResult<Document> {
        let fields: Fields = serde_json::from_str(&self.fields)?;
        Ok(Document {
            id: self.id,
            fields,
            created_at: millis_to_datetime(self.created_at),
            updated_at: millis_to_datetime(self.updated_at),
        })
    }
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

fn check_id(id: &str) -> StoreResult<()> {
    if id.is_empty() || id.len() > MAX_ID_LEN {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Field names are spliced into a JSON path, so only identifiers pass.
fn json_path(field: &str) -> StoreResult<String> {
    let mut chars = field.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(StoreError::InvalidField(field.to_string()));
    }
    Ok(format!("'$.{}'", field))
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filters: &[Filter]) -> StoreResult<()> {
    for filter in filters {
        match filter {
            Filter::Eq { field, value } => {
                builder
                    .push(" AND json_extract(fields, ")
                    .push(json_path(field)?)
                    .push(") = ")
                    .push_bind(value.clone());
            }
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: Arc<SqlitePool>,
}

impl SqliteDocumentStore {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    fn now_millis() -> i64 {
        Utc::now().timestamp_millis()
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn create(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<Document> {
        check_id(id)?;
        let now = Self::now_millis();
        let body = serde_json::to_string(&fields)?;

        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (collection, id, fields, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, fields, created_at, updated_at
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(body)
        .bind(now)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::AlreadyExists {
                    collection: collection.to_string(),
                    id: id.to_string(),
                }
            }
            other => StoreError::Unavailable(other),
        })?;

        row.into_document()
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Document> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, fields, created_at, updated_at
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some(row) => row.into_document(),
            None => Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
        }
    }

    async fn list(&self, collection: &str, query: ListQuery) -> StoreResult<Vec<Document>> {
        let columns = match query.projection {
            Projection::Full => "id, fields, created_at, updated_at",
            Projection::IdsOnly => "id, '{}' AS fields, created_at, updated_at",
        };

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM documents WHERE collection = ", columns));
        builder.push_bind(collection);
        push_filters(&mut builder, &query.filters)?;

        match query.ordering.direction {
            Direction::Asc => builder.push(" ORDER BY created_at ASC, seq ASC"),
            Direction::Desc => builder.push(" ORDER BY created_at DESC, seq DESC"),
        };

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(i64::from(limit));
        }

        let rows = builder
            .build_query_as::<DocumentRow>()
            .fetch_all(self.pool.as_ref())
            .await?;

        rows.into_iter().map(DocumentRow::into_document).collect()
    }

    async fn count(&self, collection: &str, query: ListQuery) -> StoreResult<u64> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM documents WHERE collection = ");
        builder.push_bind(collection);
        push_filters(&mut builder, &query.filters)?;

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(self.pool.as_ref())
            .await?;

        let count = count.max(0) as u64;
        Ok(match query.limit {
            Some(limit) => count.min(u64::from(limit)),
            None => count,
        })
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<Document> {
        let patch = serde_json::to_string(&fields)?;

        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            UPDATE documents
            SET fields = json_patch(fields, $3), updated_at = $4
            WHERE collection = $1 AND id = $2
            RETURNING id, fields, created_at, updated_at
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(patch)
        .bind(Self::now_millis())
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some(row) => row.into_document(),
            None => Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_path_accepts_identifiers() {
        assert_eq!(json_path("targetId").unwrap(), "'$.targetId'");
        assert_eq!(json_path("_kind2").unwrap(), "'$._kind2'");
    }

    #[test]
    fn json_path_rejects_injection() {
        assert!(json_path("a') OR 1=1 --").is_err());
        assert!(json_path("nested.field").is_err());
        assert!(json_path("").is_err());
        assert!(json_path("1abc").is_err());
    }

    #[test]
    fn check_id_enforces_ceiling() {
        assert!(check_id(&"x".repeat(MAX_ID_LEN)).is_ok());
        assert!(check_id(&"x".repeat(MAX_ID_LEN + 1)).is_err());
        assert!(check_id("").is_err());
    }
}
