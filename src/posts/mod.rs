mod comments;
mod like;

use axum::{
    debug_handler,
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiJson, ApiResult},
    models::{
        format_ts, now_ms, ActionType, MediaType, Post, PostId, RecommendationType, Room, RoomId,
        User,
    },
    users::find_user_by_id,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post).get(list_posts))
        .route("/posts/{post_id}", get(get_post))
        .route("/posts/{post_id}/like", post(like::toggle_like))
        .route(
            "/posts/{post_id}/comments",
            post(comments::create_comment).get(comments::list_comments),
        )
}

const TITLE_MAX: usize = 80;
const DESCRIPTION_MAX: usize = 280;

pub(crate) const POST_COLUMNS: &str = "id,user_id,room_id,title,description,media,media_type,\
    tags,external_link,recommendation_type,action_type,like_count,comment_count,repost_count,\
    created_at";

pub(crate) fn parse_post_id(raw: &str) -> ApiResult<PostId> {
    raw.parse()
        .map_err(|_| ApiError::validation("Invalid post ID"))
}

/// Author fields inlined into post and comment responses.
#[derive(Debug, Serialize)]
pub(crate) struct UserSummary {
    pub id: String,
    pub name: String,
    pub username: String,
    pub avatar: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            username: user.username.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RoomSummary {
    id: String,
    name: String,
    color: String,
}

impl From<&Room> for RoomSummary {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.clone(),
            name: room.name.clone(),
            color: room.color.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PostResponse {
    id: String,
    title: String,
    description: String,
    media: String,
    media_type: String,
    tags: Vec<String>,
    external_link: String,
    recommendation_type: String,
    action_type: String,
    like_count: i64,
    comment_count: i64,
    repost_count: i64,
    created_at: String,
    user: UserSummary,
    room: RoomSummary,
}

impl PostResponse {
    fn new(post: &Post, user: &User, room: &Room) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            description: post.description.clone(),
            media: post.media.clone(),
            media_type: post.media_type.clone(),
            tags: serde_json::from_str(&post.tags).unwrap_or_default(),
            external_link: post.external_link.clone(),
            recommendation_type: post.recommendation_type.clone(),
            action_type: post.action_type.clone(),
            like_count: post.like_count,
            comment_count: post.comment_count,
            repost_count: post.repost_count,
            created_at: format_ts(post.created_at),
            user: UserSummary::from(user),
            room: RoomSummary::from(room),
        }
    }
}

/// Joins the owning user and room into the response, one lookup each.
async fn shape_post(pool: &SqlitePool, post: &Post) -> ApiResult<PostResponse> {
    let user = find_user_by_id(pool, &post.user_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("post {} references missing user", post.id))?;

    let room: Room = sqlx::query_as(
        "SELECT id,user_id,name,color,post_count,created_at FROM rooms WHERE id=?",
    )
    .bind(&post.room_id)
    .fetch_one(pool)
    .await?;

    Ok(PostResponse::new(post, &user, &room))
}

#[derive(Debug, Deserialize)]
struct CreatePostBody {
    room_id: String,
    title: String,
    description: String,
    #[serde(default)]
    media: String,
    #[serde(default)]
    media_type: MediaType,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    external_link: String,
    recommendation_type: RecommendationType,
    action_type: ActionType,
}

#[debug_handler(state = AppState)]
async fn create_post(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<CreatePostBody>,
) -> ApiResult<Json<PostResponse>> {
    let room_id = body
        .room_id
        .parse::<RoomId>()
        .map_err(|_| ApiError::validation("Invalid room ID"))?;

    // Missing and not-yours are deliberately indistinguishable.
    let room: Room = sqlx::query_as(
        "SELECT id,user_id,name,color,post_count,created_at FROM rooms WHERE id=? AND user_id=?",
    )
    .bind(room_id.to_string())
    .bind(&user.id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or(ApiError::NotFound("Room not found or not owned by user"))?;

    if body.title.chars().count() > TITLE_MAX {
        return Err(ApiError::validation("Title must be 80 characters or less"));
    }
    if body.description.chars().count() > DESCRIPTION_MAX {
        return Err(ApiError::validation(
            "Description must be 280 characters or less",
        ));
    }

    let post_id = PostId::generate();
    let created_at = now_ms();
    let tags = serde_json::to_string(&body.tags)?;

    let mut tx = db_pool.begin().await?;
    sqlx::query(
        "INSERT INTO posts (id,user_id,room_id,title,description,media,media_type,tags,\
         external_link,recommendation_type,action_type,like_count,comment_count,repost_count,\
         created_at) VALUES (?,?,?,?,?,?,?,?,?,?,?,0,0,0,?)",
    )
    .bind(post_id.to_string())
    .bind(&user.id)
    .bind(room_id.to_string())
    .bind(&body.title)
    .bind(&body.description)
    .bind(&body.media)
    .bind(body.media_type.as_str())
    .bind(&tags)
    .bind(&body.external_link)
    .bind(body.recommendation_type.as_str())
    .bind(body.action_type.as_str())
    .bind(created_at)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE rooms SET post_count=post_count+1 WHERE id=?")
        .bind(room_id.to_string())
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    let post = Post {
        id: post_id.to_string(),
        user_id: user.id.clone(),
        room_id: room_id.to_string(),
        title: body.title,
        description: body.description,
        media: body.media,
        media_type: body.media_type.as_str().to_owned(),
        tags,
        external_link: body.external_link,
        recommendation_type: body.recommendation_type.as_str().to_owned(),
        action_type: body.action_type.as_str().to_owned(),
        like_count: 0,
        comment_count: 0,
        repost_count: 0,
        created_at,
    };

    Ok(Json(PostResponse::new(&post, &user, &room)))
}

#[debug_handler(state = AppState)]
async fn get_post(
    Path(post_id): Path<String>,
    State(db_pool): State<SqlitePool>,
) -> ApiResult<Json<PostResponse>> {
    let post_id = parse_post_id(&post_id)?;

    let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id=?");
    let post: Post = sqlx::query_as(&sql)
        .bind(post_id.to_string())
        .fetch_optional(&db_pool)
        .await?
        .ok_or(ApiError::NotFound("Post not found"))?;

    Ok(Json(shape_post(&db_pool, &post).await?))
}

fn default_post_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
struct ListPostsQuery {
    #[serde(default)]
    skip: i64,
    #[serde(default = "default_post_limit")]
    limit: i64,
    room_id: Option<String>,
    username: Option<String>,
}

#[debug_handler(state = AppState)]
async fn list_posts(
    Query(query): Query<ListPostsQuery>,
    State(db_pool): State<SqlitePool>,
) -> ApiResult<Json<Vec<PostResponse>>> {
    let mut filters: Vec<&str> = Vec::new();
    let mut binds: Vec<String> = Vec::new();

    if let Some(raw) = query.room_id.as_deref().filter(|s| !s.is_empty()) {
        let room_id = raw
            .parse::<RoomId>()
            .map_err(|_| ApiError::validation("Invalid room ID"))?;
        filters.push("room_id=?");
        binds.push(room_id.to_string());
    }

    if let Some(username) = query.username.as_deref().filter(|s| !s.is_empty()) {
        let user = crate::users::find_user_by_username(&db_pool, username)
            .await?
            .ok_or(ApiError::NotFound("User not found"))?;
        filters.push("user_id=?");
        binds.push(user.id);
    }

    let mut sql = format!("SELECT {POST_COLUMNS} FROM posts");
    if !filters.is_empty() {
        sql += " WHERE ";
        sql += &filters.join(" AND ");
    }
    sql += " ORDER BY created_at DESC LIMIT ? OFFSET ?";

    let mut q = sqlx::query_as::<_, Post>(&sql);
    for bind in binds {
        q = q.bind(bind);
    }
    // Negative values would read as LIMIT -1, which SQLite treats as
    // unbounded.
    let posts = q
        .bind(query.limit.max(0))
        .bind(query.skip.max(0))
        .fetch_all(&db_pool)
        .await?;

    let mut out = Vec::with_capacity(posts.len());
    for post in &posts {
        out.push(shape_post(&db_pool, post).await?);
    }

    Ok(Json(out))
}
