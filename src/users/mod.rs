mod follow;
mod profile;

use axum::{
    debug_handler,
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use sqlx::SqlitePool;

use crate::{
    error::{ApiError, ApiResult},
    models::{PublicProfile, User, USER_COLUMNS},
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/profile", put(profile::update_profile))
        .route("/users/{username}", get(get_user))
        .route("/users/{username}/follow", post(follow::toggle_follow))
        .route(
            "/users/{username}/following-status",
            get(follow::following_status),
        )
}

pub(crate) async fn find_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username=?");
    sqlx::query_as(&sql).bind(username).fetch_optional(pool).await
}

pub(crate) async fn find_user_by_id(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id=?");
    sqlx::query_as(&sql).bind(id).fetch_optional(pool).await
}

#[debug_handler(state = AppState)]
async fn get_user(
    Path(username): Path<String>,
    State(db_pool): State<SqlitePool>,
) -> ApiResult<Json<PublicProfile>> {
    let user = find_user_by_username(&db_pool, &username)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(PublicProfile::from(&user)))
}
