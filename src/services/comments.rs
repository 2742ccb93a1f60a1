use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{
    field, Comment, CommentFields, CommentThread, InteractionKind, NewComment, INTERACTIONS,
};
use crate::services::{ids, Clock};
use crate::store::{DocumentStore, ListQuery, Ordering, StoreError};

/// Which identifier scheme a creation attempt uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Primary,
    Emergency,
}

/// Outcome of a failed creation attempt.
#[derive(Debug)]
pub enum Transition {
    Retry(Attempt),
    Fail(AppError),
}

impl Attempt {
    /// Only an id collision on the primary attempt earns a second try.
    pub fn on_failure(self, err: StoreError) -> Transition {
        match self {
            Attempt::Primary if err.is_already_exists() => Transition::Retry(Attempt::Emergency),
            Attempt::Primary => Transition::Fail(AppError::Store(err)),
            Attempt::Emergency => Transition::Fail(AppError::CommentCreationFailed { source: err }),
        }
    }
}

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl CommentService {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn comments() -> ListQuery {
        ListQuery::new().filter(field::KIND, InteractionKind::Comment.as_str())
    }

    /// Create a comment, retrying once with an emergency id on collision
    pub async fn create(&self, input: NewComment) -> Result<Comment> {
        if input.body.trim().is_empty() {
            return Err(AppError::validation("Comment body is required"));
        }
        if input.target_id.trim().is_empty() {
            return Err(AppError::validation("Target id is required"));
        }
        if input.author_id.trim().is_empty() {
            return Err(AppError::validation("Author id is required"));
        }

        let sequence = self.next_sequence(&input.author_id).await;
        let fields = CommentFields::from_new(&input).into_fields()?;

        let mut attempt = Attempt::Primary;
        loop {
            let id = self.generate_id(attempt, &input.author_id, sequence);

            match self.store.create(INTERACTIONS, &id, fields.clone()).await {
                Ok(doc) => {
                    tracing::debug!(comment_id = %doc.id, target_id = %input.target_id, "Comment created");
                    return Ok(Comment::try_from(doc)?);
                }
                Err(err) => match attempt.on_failure(err) {
                    Transition::Retry(next) => {
                        tracing::warn!(comment_id = %id, "Comment id collision, retrying with emergency id");
                        attempt = next;
                    }
                    Transition::Fail(err) => return Err(err),
                },
            }
        }
    }

    fn generate_id(&self, attempt: Attempt, author_id: &str, sequence: u64) -> String {
        let now = self.clock.now();
        let mut rng = rand::thread_rng();
        match attempt {
            Attempt::Primary => ids::primary_id(author_id, sequence, now, &mut rng),
            Attempt::Emergency => ids::emergency_id(author_id, now, &mut rng),
        }
    }

    /// Next per-author sequence number, or a time-derived one if the count fails.
    async fn next_sequence(&self, author_id: &str) -> u64 {
        let query = Self::comments().filter(field::AUTHOR_ID, author_id);
        match self.store.count(INTERACTIONS, query).await {
            Ok(count) => count + 1,
            Err(e) => {
                tracing::warn!("Could not count comments for {}: {}", author_id, e);
                ids::fallback_sequence(self.clock.now())
            }
        }
    }

    /// Get a single comment
    pub async fn get(&self, id: &str) -> Result<Comment> {
        let doc = match self.store.get(INTERACTIONS, id).await {
            Ok(doc) => doc,
            Err(e) if e.is_not_found() => return Err(AppError::CommentNotFound(id.to_string())),
            Err(e) => return Err(e.into()),
        };

        if InteractionKind::of(&doc) != Some(InteractionKind::Comment) {
            return Err(AppError::CommentNotFound(id.to_string()));
        }

        Ok(Comment::try_from(doc)?)
    }

    /// List every comment on a target, oldest first
    pub async fn list_comments(&self, target_id: &str) -> Result<Vec<Comment>> {
        let query = Self::comments()
            .filter(field::TARGET_ID, target_id)
            .order(Ordering::oldest_first());
        self.fetch(query).await
    }

    /// List direct replies to a comment, oldest first. The parent need not exist.
    pub async fn list_replies(&self, parent_comment_id: &str) -> Result<Vec<Comment>> {
        let query = Self::comments()
            .filter(field::PARENT_COMMENT_ID, parent_comment_id)
            .order(Ordering::oldest_first());
        self.fetch(query).await
    }

    /// Count comments on a target
    pub async fn count_comments(&self, target_id: &str) -> Result<u64> {
        let query = Self::comments().filter(field::TARGET_ID, target_id);
        Ok(self.store.count(INTERACTIONS, query).await?)
    }

    /// Top-level comments on a target with their direct replies attached
    pub async fn threads(&self, target_id: &str) -> Result<Vec<CommentThread>> {
        let comments = self.list_comments(target_id).await?;
        Ok(group_threads(comments))
    }

    /// Delete a comment. Replies are left in place. Likes and bookmarks share
    /// the collection, so ids of other kinds are `CommentNotFound`.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.get(id).await?;

        match self.store.delete(INTERACTIONS, id).await {
            Ok(()) => {
                tracing::debug!(comment_id = %id, "Comment deleted");
                Ok(())
            }
            Err(e) if e.is_not_found() => Err(AppError::CommentNotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn fetch(&self, query: ListQuery) -> Result<Vec<Comment>> {
        let docs = self.store.list(INTERACTIONS, query).await?;
        let comments = docs
            .into_iter()
            .map(Comment::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(comments)
    }
}

/// Groups a chronologically ordered flat list into one level of threads.
/// Replies whose parent is not in the list are dropped.
pub fn group_threads(comments: Vec<Comment>) -> Vec<CommentThread> {
    let (top_level, replies): (Vec<_>, Vec<_>) =
        comments.into_iter().partition(|c| !c.is_reply());

    let mut by_parent: HashMap<String, Vec<Comment>> = HashMap::new();
    for reply in replies {
        if let Some(parent) = reply.parent_comment_id.clone() {
            by_parent.entry(parent).or_default().push(reply);
        }
    }

    top_level
        .into_iter()
        .map(|comment| {
            let replies = by_parent.remove(&comment.id).unwrap_or_default();
            CommentThread { comment, replies }
        })
        .collect()
}
