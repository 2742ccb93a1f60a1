use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// Header carrying the user id verified by the fronting auth provider.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user on whose behalf a request is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser {
    pub user_id: String,
}

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or(AppError::Unauthorized)?
            .to_str()
            .map_err(|_| AppError::Unauthorized)?
            .trim();

        if value.is_empty() {
            return Err(AppError::Unauthorized);
        }

        Ok(ActingUser {
            user_id: value.to_string(),
        })
    }
}
