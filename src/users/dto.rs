use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo::{MovieRef, User};

/// Body of `POST /api/user/favorites`.
#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub movie: MovieRef,
}

/// Body of `DELETE /api/user/favorites`.
#[derive(Debug, Deserialize)]
pub struct RemoveFavoriteRequest {
    #[serde(rename = "movieId")]
    pub movie_id: i64,
}

/// Body of `POST /api/user/search-history`. The query only has to be
/// present; empty or whitespace-only strings are stored as-is.
#[derive(Debug, Deserialize)]
pub struct SearchHistoryRequest {
    pub query: String,
}

/// User record as exposed by `GET /api/user/profile`: everything except
/// the password hash, in the wire names the frontend already consumes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub favorites: Vec<MovieRef>,
    pub search_history: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            favorites: user.favorites.0,
            search_history: user.search_history,
            created_at: user.created_at,
        }
    }
}
