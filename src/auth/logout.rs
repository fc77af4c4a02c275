use axum::{
    debug_handler,
    extract::State,
    http::header,
    response::{AppendHeaders, IntoResponse},
    Json,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{error::ApiResult, AppState};

use super::session::{session_cookie, CurrentUser};

#[debug_handler(state = AppState)]
pub(crate) async fn logout(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<impl IntoResponse> {
    sqlx::query("UPDATE users SET session_token=NULL, session_expires=NULL WHERE id=?")
        .bind(&user.id)
        .execute(&db_pool)
        .await?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, session_cookie("", 0))]),
        Json(json!({ "message": "Logged out successfully" })),
    ))
}
