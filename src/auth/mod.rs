pub mod provider;

mod logout;
mod session;

pub use session::{CurrentUser, SESSION_COOKIE};

use axum::{
    debug_handler,
    routing::{get, post},
    Json, Router,
};

use crate::{models::ProfileResponse, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/process-session", post(session::process_session))
        .route("/auth/logout", post(logout::logout))
        .route("/auth/me", get(me))
}

#[debug_handler(state = AppState)]
async fn me(CurrentUser(user): CurrentUser) -> Json<ProfileResponse> {
    Json(ProfileResponse::from(&user))
}
