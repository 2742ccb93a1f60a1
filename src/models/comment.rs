use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::interaction::InteractionKind;
use crate::store::{self, Document, Fields, StoreError};

/// A comment on a target, optionally replying to another comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: String,
    pub author_id: String,
    pub target_id: String,
    pub body: String,
    pub author_display_name: Option<String>,
    pub author_avatar_url: Option<String>,
    pub parent_comment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_comment_id.is_some()
    }
}

/// Input for creating a comment.
#[derive(Debug, Clone, Default)]
pub struct NewComment {
    pub target_id: String,
    pub author_id: String,
    pub body: String,
    pub author_display_name: Option<String>,
    pub author_avatar_url: Option<String>,
    pub parent_comment_id: Option<String>,
}

/// Request body for `POST /targets/{target_id}/comments`.
#[derive(Debug, Deserialize)]
pub struct CreateComment {
    pub body: String,
    pub parent_comment_id: Option<String>,
    pub author_display_name: Option<String>,
    pub author_avatar_url: Option<String>,
}

/// A top-level comment and its direct replies.
#[derive(Debug, Clone, Serialize)]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

#[derive(Debug, Serialize)]
pub struct CommentCount {
    pub count: u64,
}

/// Stored shape of a comment inside the shared interactions collection.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentFields {
    pub kind: InteractionKind,
    pub author_id: String,
    pub target_id: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<String>,
}

impl CommentFields {
    pub fn from_new(input: &NewComment) -> Self {
        Self {
            kind: InteractionKind::Comment,
            author_id: input.author_id.clone(),
            target_id: input.target_id.clone(),
            body: input.body.clone(),
            author_display_name: non_blank(input.author_display_name.as_deref()),
            author_avatar_url: non_blank(input.author_avatar_url.as_deref()),
            parent_comment_id: non_blank(input.parent_comment_id.as_deref()),
        }
    }

    pub fn into_fields(self) -> Result<Fields, StoreError> {
        store::to_fields(&self)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl TryFrom<Document> for Comment {
    type Error = StoreError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        let fields: CommentFields = serde_json::from_value(serde_json::Value::Object(doc.fields))?;
        Ok(Self {
            id: doc.id,
            author_id: fields.author_id,
            target_id: fields.target_id,
            body: fields.body,
            author_display_name: fields.author_display_name,
            author_avatar_url: fields.author_avatar_url,
            parent_comment_id: non_blank(fields.parent_comment_id.as_deref()),
            created_at: doc.created_at,
        })
    }
}
