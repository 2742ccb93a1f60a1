use sqlx::SqlitePool;
use std::sync::Arc;

use crate::services::{CommentService, InteractionService, SystemClock};
use crate::store::{DocumentStore, SqliteDocumentStore};

#[derive(Clone)]
pub struct AppState {
    pub comments: CommentService,
    pub interactions: InteractionService,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(SqliteDocumentStore::new(Arc::new(pool)));
        Self::with_store(store)
    }

    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            comments: CommentService::new(store.clone(), Arc::new(SystemClock)),
            interactions: InteractionService::new(store),
        }
    }
}
