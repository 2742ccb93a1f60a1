use axum::{
    extract::{Path, State},
    Json,
};

use crate::auth::ActingUser;
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentCount, CommentThread, CreateComment, NewComment};
use crate::state::AppState;

/// List all comments on a target, oldest first
pub async fn list_comments(
    State(state): State<AppState>,
    Path(target_id): Path<String>,
) -> Result<Json<Vec<Comment>>> {
    let comments = state.comments.list_comments(&target_id).await?;
    Ok(Json(comments))
}

/// Count comments on a target
pub async fn count_comments(
    State(state): State<AppState>,
    Path(target_id): Path<String>,
) -> Result<Json<CommentCount>> {
    let count = state.comments.count_comments(&target_id).await?;
    Ok(Json(CommentCount { count }))
}

/// Top-level comments with their replies
pub async fn list_threads(
    State(state): State<AppState>,
    Path(target_id): Path<String>,
) -> Result<Json<Vec<CommentThread>>> {
    let threads = state.comments.threads(&target_id).await?;
    Ok(Json(threads))
}

/// Post a comment or a reply on a target
pub async fn create_comment(
    State(state): State<AppState>,
    user: ActingUser,
    Path(target_id): Path<String>,
    Json(input): Json<CreateComment>,
) -> Result<Json<Comment>> {
    let comment = state
        .comments
        .create(NewComment {
            target_id,
            author_id: user.user_id,
            body: input.body,
            author_display_name: input.author_display_name,
            author_avatar_url: input.author_avatar_url,
            parent_comment_id: input.parent_comment_id,
        })
        .await?;

    Ok(Json(comment))
}

pub async fn get_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> Result<Json<Comment>> {
    let comment = state.comments.get(&comment_id).await?;
    Ok(Json(comment))
}

/// Direct replies to a comment, oldest first
pub async fn list_replies(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> Result<Json<Vec<Comment>>> {
    let replies = state.comments.list_replies(&comment_id).await?;
    Ok(Json(replies))
}

/// Delete a comment (only the author can delete)
pub async fn delete_comment(
    State(state): State<AppState>,
    user: ActingUser,
    Path(comment_id): Path<String>,
) -> Result<()> {
    let comment = state.comments.get(&comment_id).await?;

    if comment.author_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    state.comments.delete(&comment_id).await?;
    Ok(())
}
