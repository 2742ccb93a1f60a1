use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Document;

/// Collection shared by likes, bookmarks and comments.
pub const INTERACTIONS: &str = "interactions";

/// Document field names used when filtering the shared collection.
pub mod field {
    pub const KIND: &str = "kind";
    pub const AUTHOR_ID: &str = "authorId";
    pub const USER_ID: &str = "userId";
    pub const TARGET_ID: &str = "targetId";
    pub const PARENT_COMMENT_ID: &str = "parentCommentId";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Like,
    Bookmark,
    Comment,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Like => "like",
            InteractionKind::Bookmark => "bookmark",
            InteractionKind::Comment => "comment",
        }
    }

    /// Prefix for generated document ids.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            InteractionKind::Like => "l",
            InteractionKind::Bookmark => "b",
            InteractionKind::Comment => "c",
        }
    }

    pub fn of(doc: &Document) -> Option<Self> {
        doc.str_field(field::KIND)?.parse().ok()
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InteractionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(InteractionKind::Like),
            "bookmark" => Ok(InteractionKind::Bookmark),
            "comment" => Ok(InteractionKind::Comment),
            _ => Err(format!("Invalid interaction kind: {}", s)),
        }
    }
}

/// A like or bookmark record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interaction {
    pub id: String,
    pub kind: InteractionKind,
    pub user_id: String,
    pub target_id: String,
    pub created_at: DateTime<Utc>,
}

impl Interaction {
    pub fn from_document(doc: Document) -> Option<Self> {
        let kind = InteractionKind::of(&doc)?;
        Some(Self {
            user_id: doc.str_field(field::USER_ID)?.to_string(),
            target_id: doc.str_field(field::TARGET_ID)?.to_string(),
            kind,
            created_at: doc.created_at,
            id: doc.id,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct InteractionStatus {
    pub active: bool,
    pub count: u64,
}
