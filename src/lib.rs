pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use state::AppState;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Comment routes
        .route(
            "/targets/{target_id}/comments",
            post(handlers::comments::create_comment),
        )
        .route(
            "/targets/{target_id}/comments",
            get(handlers::comments::list_comments),
        )
        .route(
            "/targets/{target_id}/comments/count",
            get(handlers::comments::count_comments),
        )
        .route(
            "/targets/{target_id}/threads",
            get(handlers::comments::list_threads),
        )
        .route("/comments/{comment_id}", get(handlers::comments::get_comment))
        .route(
            "/comments/{comment_id}",
            delete(handlers::comments::delete_comment),
        )
        .route(
            "/comments/{comment_id}/replies",
            get(handlers::comments::list_replies),
        )
        // Like and bookmark routes
        .route(
            "/targets/{target_id}/likes",
            post(handlers::interactions::toggle_like),
        )
        .route(
            "/targets/{target_id}/likes",
            get(handlers::interactions::like_status),
        )
        .route(
            "/targets/{target_id}/bookmarks",
            post(handlers::interactions::toggle_bookmark),
        )
        .route(
            "/targets/{target_id}/bookmarks",
            get(handlers::interactions::bookmark_status),
        )
        .route(
            "/users/me/bookmarks",
            get(handlers::interactions::my_bookmarks),
        )
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub mod test_utils {
    use crate::models::NewComment;
    use crate::state::AppState;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    pub async fn create_test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    pub async fn create_test_state() -> AppState {
        let pool = create_test_pool().await;
        AppState::new(pool)
    }

    pub fn new_comment(target_id: &str, author_id: &str, body: &str) -> NewComment {
        NewComment {
            target_id: target_id.to_string(),
            author_id: author_id.to_string(),
            body: body.to_string(),
            ..Default::default()
        }
    }

    pub fn new_reply(target_id: &str, author_id: &str, body: &str, parent_id: &str) -> NewComment {
        NewComment {
            parent_comment_id: Some(parent_id.to_string()),
            ..new_comment(target_id, author_id, body)
        }
    }
}
