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
    models::{now_ms, FollowId},
    AppState,
};

use super::find_user_by_username;

/// Follow/unfollow toggle. The follow row and both denormalized counters
/// move in a single transaction.
#[debug_handler(state = AppState)]
pub(crate) async fn toggle_follow(
    Path(username): Path<String>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Value>> {
    let target = find_user_by_username(&db_pool, &username)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    // Rejected before any follow-state lookup.
    if target.id == user.id {
        return Err(ApiError::validation("Cannot follow yourself"));
    }

    let mut tx = db_pool.begin().await?;

    let existing: Option<(String,)> =
        sqlx::query_as("SELECT id FROM follows WHERE follower_id=? AND following_id=?")
            .bind(&user.id)
            .bind(&target.id)
            .fetch_optional(&mut *tx)
            .await?;

    let following = match existing {
        Some((follow_id,)) => {
            sqlx::query("DELETE FROM follows WHERE id=?")
                .bind(&follow_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE users SET following_count=following_count-1 WHERE id=?")
                .bind(&user.id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE users SET follower_count=follower_count-1 WHERE id=?")
                .bind(&target.id)
                .execute(&mut *tx)
                .await?;
            false
        }
        None => {
            sqlx::query("INSERT INTO follows (id,follower_id,following_id,created_at) VALUES (?,?,?,?)")
                .bind(FollowId::generate().to_string())
                .bind(&user.id)
                .bind(&target.id)
                .bind(now_ms())
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE users SET following_count=following_count+1 WHERE id=?")
                .bind(&user.id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE users SET follower_count=follower_count+1 WHERE id=?")
                .bind(&target.id)
                .execute(&mut *tx)
                .await?;
            true
        }
    };

    tx.commit().await?;

    Ok(Json(json!({ "following": following })))
}

#[debug_handler(state = AppState)]
pub(crate) async fn following_status(
    Path(username): Path<String>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Value>> {
    let target = find_user_by_username(&db_pool, &username)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    // Self needs no follow lookup.
    if target.id == user.id {
        return Ok(Json(json!({ "following": false, "is_self": true })));
    }

    let following = sqlx::query("SELECT 1 FROM follows WHERE follower_id=? AND following_id=?")
        .bind(&user.id)
        .bind(&target.id)
        .fetch_optional(&db_pool)
        .await?
        .is_some();

    Ok(Json(json!({ "following": following, "is_self": false })))
}
