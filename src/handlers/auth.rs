use axum::{Extension, Json};

use crate::auth::Session;

pub async fn me(Extension(session): Extension<Session>) -> Json<Session> {
    Json(session)
}
