use axum::{
    debug_handler,
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiResult},
    models::{now_ms, LikeId},
    AppState,
};

use super::parse_post_id;

/// Like/unlike toggle. The like row and the post counter move in one
/// transaction; the returned count is re-read from the store afterwards
/// rather than computed in memory.
#[debug_handler(state = AppState)]
pub(crate) async fn toggle_like(
    Path(post_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Value>> {
    let post_id = parse_post_id(&post_id)?;

    sqlx::query("SELECT 1 FROM posts WHERE id=?")
        .bind(post_id.to_string())
        .fetch_optional(&db_pool)
        .await?
        .ok_or(ApiError::NotFound("Post not found"))?;

    let mut tx = db_pool.begin().await?;

    let existing: Option<(String,)> =
        sqlx::query_as("SELECT id FROM likes WHERE user_id=? AND post_id=?")
            .bind(&user.id)
            .bind(post_id.to_string())
            .fetch_optional(&mut *tx)
            .await?;

    let liked = match existing {
        Some((like_id,)) => {
            sqlx::query("DELETE FROM likes WHERE id=?")
                .bind(&like_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE posts SET like_count=like_count-1 WHERE id=?")
                .bind(post_id.to_string())
                .execute(&mut *tx)
                .await?;
            false
        }
        None => {
            sqlx::query("INSERT INTO likes (id,user_id,post_id,created_at) VALUES (?,?,?,?)")
                .bind(LikeId::generate().to_string())
                .bind(&user.id)
                .bind(post_id.to_string())
                .bind(now_ms())
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE posts SET like_count=like_count+1 WHERE id=?")
                .bind(post_id.to_string())
                .execute(&mut *tx)
                .await?;
            true
        }
    };

    tx.commit().await?;

    let (like_count,): (i64,) = sqlx::query_as("SELECT like_count FROM posts WHERE id=?")
        .bind(post_id.to_string())
        .fetch_one(&db_pool)
        .await?;

    Ok(Json(json!({ "liked": liked, "like_count": like_count })))
}
