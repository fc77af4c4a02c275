use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiJson, ApiResult},
    models::ProfileResponse,
    AppState,
};

use super::find_user_by_id;

/// Partial update: a field that is absent (or null) is left unchanged, a
/// provided value overwrites, and the empty string is a valid overwrite.
/// A username change is additionally skipped when the new name is empty.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct UpdateProfileBody {
    username: Option<String>,
    bio: Option<String>,
    external_link: Option<String>,
    avatar: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_profile(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<UpdateProfileBody>,
) -> ApiResult<Json<ProfileResponse>> {
    if let Some(username) = body.username.as_deref().filter(|u| !u.is_empty()) {
        let taken = sqlx::query("SELECT 1 FROM users WHERE username=? AND id<>?")
            .bind(username)
            .bind(&user.id)
            .fetch_optional(&db_pool)
            .await?
            .is_some();
        if taken {
            return Err(ApiError::validation("Username already taken"));
        }

        sqlx::query("UPDATE users SET username=? WHERE id=?")
            .bind(username)
            .bind(&user.id)
            .execute(&db_pool)
            .await?;
    }

    if let Some(bio) = &body.bio {
        sqlx::query("UPDATE users SET bio=? WHERE id=?")
            .bind(bio)
            .bind(&user.id)
            .execute(&db_pool)
            .await?;
    }

    if let Some(external_link) = &body.external_link {
        sqlx::query("UPDATE users SET external_link=? WHERE id=?")
            .bind(external_link)
            .bind(&user.id)
            .execute(&db_pool)
            .await?;
    }

    if let Some(avatar) = &body.avatar {
        sqlx::query("UPDATE users SET avatar=? WHERE id=?")
            .bind(avatar)
            .bind(&user.id)
            .execute(&db_pool)
            .await?;
    }

    let updated = find_user_by_id(&db_pool, &user.id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(ProfileResponse::from(&updated)))
}
