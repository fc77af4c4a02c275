use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{FromRequestParts, State},
    http::{header, request::Parts},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::{ApiError, ApiJson, ApiResult},
    models::{now_ms, ProfileResponse, User, UserId, USER_COLUMNS},
    AppState,
};

use super::provider::IdentityProvider;

pub const SESSION_COOKIE: &str = "session_token";

const SESSION_TTL_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// The authenticated caller. Extracting it performs the session lookup:
/// cookie first, then `Authorization: Bearer`, then a user row whose
/// stored token matches and whose expiry is still in the future.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts).ok_or(ApiError::Unauthenticated)?;

        let sql =
            format!("SELECT {USER_COLUMNS} FROM users WHERE session_token=? AND session_expires>?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&token)
            .bind(now_ms())
            .fetch_optional(&state.db_pool)
            .await?
            .ok_or(ApiError::Unauthenticated)?;

        Ok(CurrentUser(user))
    }
}

fn session_token(parts: &Parts) -> Option<String> {
    let from_cookie = parts
        .headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                (name == SESSION_COOKIE).then(|| value.to_owned())
            })
        });
    if from_cookie.is_some() {
        return from_cookie;
    }

    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_owned)
}

pub(crate) fn session_cookie(token: &str, max_age: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax")
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProcessSessionBody {
    #[serde(default)]
    session_id: String,
}

/// Exchanges a provider session id for a logged-in user, creating the user
/// on first sight of the email.
#[debug_handler(state = AppState)]
pub(crate) async fn process_session(
    State(db_pool): State<SqlitePool>,
    State(provider): State<Arc<dyn IdentityProvider>>,
    ApiJson(body): ApiJson<ProcessSessionBody>,
) -> ApiResult<impl IntoResponse> {
    if body.session_id.is_empty() {
        return Err(ApiError::validation("Session ID required"));
    }

    // Network failure and provider rejection collapse into one 400.
    let data = provider.exchange(&body.session_id).await.map_err(|err| {
        tracing::warn!("session exchange failed: {err:#}");
        ApiError::validation(format!("Invalid session: {err}"))
    })?;

    let session_expires = now_ms() + SESSION_TTL_MS;

    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email=?");
    let existing = sqlx::query_as::<_, User>(&sql)
        .bind(&data.email)
        .fetch_optional(&db_pool)
        .await?;

    let profile = match existing {
        Some(user) => {
            sqlx::query("UPDATE users SET session_token=?, session_expires=? WHERE email=?")
                .bind(&data.session_token)
                .bind(session_expires)
                .bind(&data.email)
                .execute(&db_pool)
                .await?;
            ProfileResponse::from(&user)
        }
        None => {
            let user_id = UserId::generate();
            let username = derive_username(&db_pool, &data.name).await?;
            tracing::info!("creating user @{username} for {}", data.email);

            sqlx::query(
                "INSERT INTO users (id,email,name,username,avatar,bio,external_link,\
                 follower_count,following_count,created_at,session_token,session_expires) \
                 VALUES (?,?,?,?,?,'','',0,0,?,?,?)",
            )
            .bind(user_id.to_string())
            .bind(&data.email)
            .bind(&data.name)
            .bind(&username)
            .bind(&data.picture)
            .bind(now_ms())
            .bind(&data.session_token)
            .bind(session_expires)
            .execute(&db_pool)
            .await?;

            ProfileResponse {
                id: user_id.to_string(),
                email: data.email.clone(),
                name: data.name.clone(),
                username,
                avatar: data.picture.clone(),
                bio: String::new(),
                external_link: String::new(),
                follower_count: 0,
                following_count: 0,
            }
        }
    };

    let cookie = session_cookie(&data.session_token, SESSION_TTL_MS / 1000);
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(json!({
            "user": profile,
            "session_token": data.session_token,
        })),
    ))
}

pub(crate) fn normalize_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "")
}

/// Lower-cased, space-stripped provider name, with a numeric suffix
/// appended until no user holds it.
async fn derive_username(pool: &SqlitePool, name: &str) -> Result<String, sqlx::Error> {
    let base = normalize_name(name);
    let mut candidate = base.clone();
    let mut counter = 1u32;

    while sqlx::query("SELECT 1 FROM users WHERE username=?")
        .bind(&candidate)
        .fetch_optional(pool)
        .await?
        .is_some()
    {
        candidate = format!("{base}{counter}");
        counter += 1;
    }

    Ok(candidate)
}
