use axum::{extract::State, Json};
use tracing::{info, instrument};

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    state::AppState,
    users::{
        dto::{AddFavoriteRequest, ProfileResponse, RemoveFavoriteRequest, SearchHistoryRequest},
        repo::{MovieRef, User},
    },
};

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(ProfileResponse::from(user)))
}

#[instrument(skip(state))]
pub async fn get_favorites(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<MovieRef>>, ApiError> {
    let favorites = User::favorites(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(favorites))
}

#[instrument(skip(state, body))]
pub async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<AddFavoriteRequest>,
) -> Result<Json<Vec<MovieRef>>, ApiError> {
    let favorites = User::add_favorite(&state.db, user_id, &body.movie)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(user_id = %user_id, movie_id = body.movie.id, "favorite added");
    Ok(Json(favorites))
}

#[instrument(skip(state, body))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<RemoveFavoriteRequest>,
) -> Result<Json<Vec<MovieRef>>, ApiError> {
    let favorites = User::remove_favorite(&state.db, user_id, body.movie_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(user_id = %user_id, movie_id = body.movie_id, "favorite removed");
    Ok(Json(favorites))
}

#[instrument(skip(state))]
pub async fn get_search_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<String>>, ApiError> {
    let history = User::search_history(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(history))
}

#[instrument(skip(state, body))]
pub async fn add_search_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<SearchHistoryRequest>,
) -> Result<Json<Vec<String>>, ApiError> {
    let history = User::push_search(&state.db, user_id, &body.query)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(history))
}
