use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Which catalog a favorite points into.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Movie,
    Tv,
}

/// Validated movie reference stored in a user's favorites. Clients post
/// full metadata-API objects; extra fields are dropped here, but a
/// missing id/title or an unknown media kind is rejected before anything
/// is stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRef {
    pub id: i64,
    #[serde(default)]
    pub media_type: MediaType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub favorites: Json<Vec<MovieRef>>,
    pub search_history: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    /// Find a user by email (the login key).
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, favorites, search_history, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, favorites, search_history, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Create a new user with hashed password and empty lists.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, favorites, search_history, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }

    /// Append a favorite unless one with the same movie id is already
    /// present. The dedup check and the append happen in one conditional
    /// UPDATE, so concurrent adds for the same user cannot race a
    /// duplicate in. Returns `None` if the user row is gone.
    pub async fn add_favorite(
        db: &PgPool,
        user_id: Uuid,
        movie: &MovieRef,
    ) -> sqlx::Result<Option<Vec<MovieRef>>> {
        let favorites = sqlx::query_scalar::<_, Json<Vec<MovieRef>>>(
            r#"
            UPDATE users
            SET favorites = CASE
                    WHEN EXISTS (
                        SELECT 1 FROM jsonb_array_elements(favorites) AS fav
                        WHERE (fav->>'id')::bigint = $3
                    )
                    THEN favorites
                    ELSE favorites || $2
                END
            WHERE id = $1
            RETURNING favorites
            "#,
        )
        .bind(user_id)
        .bind(Json(movie))
        .bind(movie.id)
        .fetch_optional(db)
        .await?;
        Ok(favorites.map(|Json(list)| list))
    }

    /// Drop every favorite with the given movie id (no-op if absent) and
    /// return the updated list, or `None` if the user row is gone.
    pub async fn remove_favorite(
        db: &PgPool,
        user_id: Uuid,
        movie_id: i64,
    ) -> sqlx::Result<Option<Vec<MovieRef>>> {
        let favorites = sqlx::query_scalar::<_, Json<Vec<MovieRef>>>(
            r#"
            UPDATE users
            SET favorites = COALESCE(
                    (SELECT jsonb_agg(fav)
                     FROM jsonb_array_elements(favorites) AS fav
                     WHERE (fav->>'id')::bigint <> $2),
                    '[]'::jsonb)
            WHERE id = $1
            RETURNING favorites
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_optional(db)
        .await?;
        Ok(favorites.map(|Json(list)| list))
    }

    pub async fn favorites(db: &PgPool, user_id: Uuid) -> sqlx::Result<Option<Vec<MovieRef>>> {
        let favorites = sqlx::query_scalar::<_, Json<Vec<MovieRef>>>(
            "SELECT favorites FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(favorites.map(|Json(list)| list))
    }

    /// Prepend a query to the search history and keep the 20 most recent
    /// entries, atomically. Returns `None` if the user row is gone.
    pub async fn push_search(
        db: &PgPool,
        user_id: Uuid,
        query: &str,
    ) -> sqlx::Result<Option<Vec<String>>> {
        sqlx::query_scalar::<_, Vec<String>>(
            r#"
            UPDATE users
            SET search_history = (array_prepend($2, search_history))[1:20]
            WHERE id = $1
            RETURNING search_history
            "#,
        )
        .bind(user_id)
        .bind(query)
        .fetch_optional(db)
        .await
    }

    pub async fn search_history(db: &PgPool, user_id: Uuid) -> sqlx::Result<Option<Vec<String>>> {
        sqlx::query_scalar::<_, Vec<String>>("SELECT search_history FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await
    }
}
