use serde_json::{json, Map};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{field, Interaction, InteractionKind, INTERACTIONS};
use crate::store::{DocumentStore, ListQuery, Ordering};

/// Likes and bookmarks stored alongside comments in the shared collection.
#[derive(Clone)]
pub struct InteractionService {
    store: Arc<dyn DocumentStore>,
}

impl InteractionService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn check_kind(kind: InteractionKind) -> Result<()> {
        if kind == InteractionKind::Comment {
            return Err(AppError::validation("Comments cannot be toggled"));
        }
        Ok(())
    }

    fn by_user(kind: InteractionKind, user_id: &str) -> ListQuery {
        ListQuery::new()
            .filter(field::KIND, kind.as_str())
            .filter(field::USER_ID, user_id)
    }

    /// Add the interaction if absent, remove it if present. Returns whether
    /// it is active afterwards.
    pub async fn toggle(&self, kind: InteractionKind, user_id: &str, target_id: &str) -> Result<bool> {
        Self::check_kind(kind)?;
        if user_id.trim().is_empty() || target_id.trim().is_empty() {
            return Err(AppError::validation("User id and target id are required"));
        }

        // Not atomic: two concurrent toggles can both see no record and both
        // create one. A later toggle removes every duplicate.
        let existing = self
            .store
            .list(
                INTERACTIONS,
                Self::by_user(kind, user_id)
                    .filter(field::TARGET_ID, target_id)
                    .ids_only(),
            )
            .await?;

        if existing.is_empty() {
            let id = format!("{}_{}", kind.id_prefix(), Uuid::new_v4().simple());
            let mut fields = Map::new();
            fields.insert(field::KIND.to_string(), json!(kind.as_str()));
            fields.insert(field::USER_ID.to_string(), json!(user_id));
            fields.insert(field::TARGET_ID.to_string(), json!(target_id));

            self.store.create(INTERACTIONS, &id, fields).await?;
            tracing::debug!(%kind, user_id, target_id, "Interaction added");
            return Ok(true);
        }

        for doc in existing {
            match self.store.delete(INTERACTIONS, &doc.id).await {
                // Raced with another toggle; already gone.
                Err(e) if e.is_not_found() => {}
                other => other?,
            }
        }
        tracing::debug!(%kind, user_id, target_id, "Interaction removed");
        Ok(false)
    }

    pub async fn is_active(&self, kind: InteractionKind, user_id: &str, target_id: &str) -> Result<bool> {
        Self::check_kind(kind)?;
        let count = self
            .store
            .count(
                INTERACTIONS,
                Self::by_user(kind, user_id).filter(field::TARGET_ID, target_id),
            )
            .await?;
        Ok(count > 0)
    }

    pub async fn count(&self, kind: InteractionKind, target_id: &str) -> Result<u64> {
        Self::check_kind(kind)?;
        let query = ListQuery::new()
            .filter(field::KIND, kind.as_str())
            .filter(field::TARGET_ID, target_id);
        Ok(self.store.count(INTERACTIONS, query).await?)
    }

    /// A user's interactions of one kind, newest first
    pub async fn list_for_user(&self, kind: InteractionKind, user_id: &str) -> Result<Vec<Interaction>> {
        Self::check_kind(kind)?;
        let docs = self
            .store
            .list(
                INTERACTIONS,
                Self::by_user(kind, user_id).order(Ordering::newest_first()),
            )
            .await?;
        Ok(docs.into_iter().filter_map(Interaction::from_document).collect())
    }
}
