use axum::{
    debug_handler,
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiJson, ApiResult},
    models::{format_ts, now_ms, Comment, CommentId},
    users::find_user_by_id,
    AppState,
};

use super::{parse_post_id, UserSummary};

#[derive(Debug, Deserialize)]
pub(crate) struct CreateCommentBody {
    content: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CommentResponse {
    id: String,
    content: String,
    created_at: String,
    user: UserSummary,
}

#[debug_handler(state = AppState)]
pub(crate) async fn create_comment(
    Path(post_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<CreateCommentBody>,
) -> ApiResult<Json<CommentResponse>> {
    let post_id = parse_post_id(&post_id)?;

    sqlx::query("SELECT 1 FROM posts WHERE id=?")
        .bind(post_id.to_string())
        .fetch_optional(&db_pool)
        .await?
        .ok_or(ApiError::NotFound("Post not found"))?;

    let comment_id = CommentId::generate();
    let created_at = now_ms();

    let mut tx = db_pool.begin().await?;
    sqlx::query("INSERT INTO comments (id,user_id,post_id,content,created_at) VALUES (?,?,?,?,?)")
        .bind(comment_id.to_string())
        .bind(&user.id)
        .bind(post_id.to_string())
        .bind(&body.content)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE posts SET comment_count=comment_count+1 WHERE id=?")
        .bind(post_id.to_string())
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(Json(CommentResponse {
        id: comment_id.to_string(),
        content: body.content,
        created_at: format_ts(created_at),
        user: UserSummary::from(&user),
    }))
}

fn default_comment_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListCommentsQuery {
    #[serde(default)]
    skip: i64,
    #[serde(default = "default_comment_limit")]
    limit: i64,
}

/// Chronological ascending, each comment joined against its author.
#[debug_handler(state = AppState)]
pub(crate) async fn list_comments(
    Path(post_id): Path<String>,
    Query(query): Query<ListCommentsQuery>,
    State(db_pool): State<SqlitePool>,
) -> ApiResult<Json<Vec<CommentResponse>>> {
    let post_id = parse_post_id(&post_id)?;

    let comments: Vec<Comment> = sqlx::query_as(
        "SELECT id,user_id,post_id,content,created_at FROM comments WHERE post_id=? \
         ORDER BY created_at ASC LIMIT ? OFFSET ?",
    )
    .bind(post_id.to_string())
    .bind(query.limit.max(0))
    .bind(query.skip.max(0))
    .fetch_all(&db_pool)
    .await?;

    let mut out = Vec::with_capacity(comments.len());
    for comment in comments {
        let author = find_user_by_id(&db_pool, &comment.user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("comment {} references missing user", comment.id))?;

        out.push(CommentResponse {
            id: comment.id,
            content: comment.content,
            created_at: format_ts(comment.created_at),
            user: UserSummary::from(&author),
        });
    }

    Ok(Json(out))
}
