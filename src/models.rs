use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

/// Milliseconds since the unix epoch; what every `created_at` and
/// `session_expires` column stores.
pub fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Renders a stored timestamp as RFC 3339 for response bodies.
pub fn format_ts(ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000)
        .ok()
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_default()
}

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn generate() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

id_type!(UserId);
id_type!(RoomId);
id_type!(PostId);
id_type!(LikeId);
id_type!(CommentId);
id_type!(FollowId);
id_type!(MessageId);

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    #[default]
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    Recommend,
    NotRecommend,
}

impl RecommendationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationType::Recommend => "recommend",
            RecommendationType::NotRecommend => "not_recommend",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Buy,
    Listen,
    Watch,
    Read,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Buy => "buy",
            ActionType::Listen => "listen",
            ActionType::Watch => "watch",
            ActionType::Read => "read",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    Text,
    Image,
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub username: String,
    pub avatar: String,
    pub bio: String,
    pub external_link: String,
    pub follower_count: i64,
    pub following_count: i64,
    pub created_at: i64,
    pub session_token: Option<String>,
    pub session_expires: Option<i64>,
}

pub const USER_COLUMNS: &str = "id,email,name,username,avatar,bio,external_link,\
    follower_count,following_count,created_at,session_token,session_expires";

#[derive(Debug, Clone, FromRow)]
pub struct Room {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub color: String,
    pub post_count: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub room_id: String,
    pub title: String,
    pub description: String,
    pub media: String,
    pub media_type: String,
    pub tags: String,
    pub external_link: String,
    pub recommendation_type: String,
    pub action_type: String,
    pub like_count: i64,
    pub comment_count: i64,
    pub repost_count: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub post_id: String,
    pub content: String,
    pub created_at: i64,
}

/// Direct messages have storage and a model but no routes yet; the mobile
/// client does not surface them.
#[derive(Debug, Clone, FromRow)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub media: String,
    pub message_type: String,
    pub read: bool,
    pub created_at: i64,
}

/// The caller's own profile, as returned by `/auth/me`, `process-session`
/// and profile updates. Includes the email; public lookups do not.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub username: String,
    pub avatar: String,
    pub bio: String,
    pub external_link: String,
    pub follower_count: i64,
    pub following_count: i64,
}

impl From<&User> for ProfileResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            username: user.username.clone(),
            avatar: user.avatar.clone(),
            bio: user.bio.clone(),
            external_link: user.external_link.clone(),
            follower_count: user.follower_count,
            following_count: user.following_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PublicProfile {
    pub id: String,
    pub name: String,
    pub username: String,
    pub avatar: String,
    pub bio: String,
    pub external_link: String,
    pub follower_count: i64,
    pub following_count: i64,
}

impl From<&User> for PublicProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            username: user.username.clone(),
            avatar: user.avatar.clone(),
            bio: user.bio.clone(),
            external_link: user.external_link.clone(),
            follower_count: user.follower_count,
            following_count: user.following_count,
        }
    }
}
