use axum::{routing::get, Router};

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(handlers::get_profile))
        .route(
            "/favorites",
            get(handlers::get_favorites)
                .post(handlers::add_favorite)
                .delete(handlers::remove_favorite),
        )
        .route(
            "/search-history",
            get(handlers::get_search_history).post(handlers::add_search_history),
        )
}
