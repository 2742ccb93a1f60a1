use axum::{
    extract::{Path, State},
    Json,
};

use crate::auth::ActingUser;
use crate::error::Result;
use crate::models::{Interaction, InteractionKind, InteractionStatus};
use crate::state::AppState;

async fn toggle(
    state: &AppState,
    kind: InteractionKind,
    user: &ActingUser,
    target_id: &str,
) -> Result<Json<InteractionStatus>> {
    let active = state
        .interactions
        .toggle(kind, &user.user_id, target_id)
        .await?;
    let count = state.interactions.count(kind, target_id).await?;
    Ok(Json(InteractionStatus { active, count }))
}

async fn status(
    state: &AppState,
    kind: InteractionKind,
    user: &ActingUser,
    target_id: &str,
) -> Result<Json<InteractionStatus>> {
    let active = state
        .interactions
        .is_active(kind, &user.user_id, target_id)
        .await?;
    let count = state.interactions.count(kind, target_id).await?;
    Ok(Json(InteractionStatus { active, count }))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    user: ActingUser,
    Path(target_id): Path<String>,
) -> Result<Json<InteractionStatus>> {
    toggle(&state, InteractionKind::Like, &user, &target_id).await
}

pub async fn like_status(
    State(state): State<AppState>,
    user: ActingUser,
    Path(target_id): Path<String>,
) -> Result<Json<InteractionStatus>> {
    status(&state, InteractionKind::Like, &user, &target_id).await
}

pub async fn toggle_bookmark(
    State(state): State<AppState>,
    user: ActingUser,
    Path(target_id): Path<String>,
) -> Result<Json<InteractionStatus>> {
    toggle(&state, InteractionKind::Bookmark, &user, &target_id).await
}

pub async fn bookmark_status(
    State(state): State<AppState>,
    user: ActingUser,
    Path(target_id): Path<String>,
) -> Result<Json<InteractionStatus>> {
    status(&state, InteractionKind::Bookmark, &user, &target_id).await
}

/// The acting user's bookmarks, newest first
pub async fn my_bookmarks(
    State(state): State<AppState>,
    user: ActingUser,
) -> Result<Json<Vec<Interaction>>> {
    let bookmarks = state
        .interactions
        .list_for_user(InteractionKind::Bookmark, &user.user_id)
        .await?;
    Ok(Json(bookmarks))
}
