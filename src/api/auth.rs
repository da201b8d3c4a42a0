use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::application::AppError;
use crate::domain::{User, UserId};

use super::{ApiError, AppState};

/// Header carrying the caller's user id. Credential checks happen upstream;
/// this service only resolves the id to a known user.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user making the request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> UserId {
        self.0.id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing user id".to_string()))?;

        let id = Uuid::parse_str(raw.trim())
            .map_err(|_| ApiError::Unauthorized("Invalid user id".to_string()))?;

        match state.service.get_user(id).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(AppError::UserNotFound(_)) => {
                Err(ApiError::Unauthorized("Unknown user".to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}
