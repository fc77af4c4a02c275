use axum::{
    debug_handler,
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiJson, ApiResult},
    models::{format_ts, now_ms, Room, RoomId},
    users::find_user_by_username,
    AppState,
};

/// Listings are capped, not paginated.
const ROOM_LIST_CAP: i64 = 100;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/my", get(my_rooms))
        .route("/users/{username}/rooms", get(user_rooms))
}

#[derive(Debug, Deserialize)]
struct CreateRoomBody {
    name: String,
    color: String,
}

#[derive(Debug, Serialize)]
struct RoomResponse {
    id: String,
    name: String,
    color: String,
    post_count: i64,
    created_at: String,
}

impl From<&Room> for RoomResponse {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.clone(),
            name: room.name.clone(),
            color: room.color.clone(),
            post_count: room.post_count,
            created_at: format_ts(room.created_at),
        }
    }
}

#[debug_handler(state = AppState)]
async fn create_room(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<CreateRoomBody>,
) -> ApiResult<Json<RoomResponse>> {
    let room_id = RoomId::generate();
    let created_at = now_ms();

    let mut tx = db_pool.begin().await?;
    sqlx::query("INSERT INTO rooms (id,user_id,name,color,post_count,created_at) VALUES (?,?,?,?,0,?)")
        .bind(room_id.to_string())
        .bind(&user.id)
        .bind(&body.name)
        .bind(&body.color)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

    // The owner's room list is kept denormalized alongside rooms.user_id.
    sqlx::query("INSERT INTO user_rooms (user_id,room_id) VALUES (?,?)")
        .bind(&user.id)
        .bind(room_id.to_string())
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(Json(RoomResponse {
        id: room_id.to_string(),
        name: body.name,
        color: body.color,
        post_count: 0,
        created_at: format_ts(created_at),
    }))
}

async fn rooms_of(pool: &SqlitePool, user_id: &str) -> Result<Vec<Room>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id,user_id,name,color,post_count,created_at FROM rooms WHERE user_id=? LIMIT ?",
    )
    .bind(user_id)
    .bind(ROOM_LIST_CAP)
    .fetch_all(pool)
    .await
}

#[debug_handler(state = AppState)]
async fn my_rooms(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<RoomResponse>>> {
    let rooms = rooms_of(&db_pool, &user.id).await?;
    Ok(Json(rooms.iter().map(RoomResponse::from).collect()))
}

#[debug_handler(state = AppState)]
async fn user_rooms(
    Path(username): Path<String>,
    State(db_pool): State<SqlitePool>,
) -> ApiResult<Json<Vec<RoomResponse>>> {
    let user = find_user_by_username(&db_pool, &username)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    let rooms = rooms_of(&db_pool, &user.id).await?;
    Ok(Json(rooms.iter().map(RoomResponse::from).collect()))
}
