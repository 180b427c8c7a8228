use std::collections::HashMap;

use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    auth::{jwt::AuthUser, repo::User},
    error::ApiError,
    photos::repo as photos_repo,
    state::AppState,
};

use super::dto::UserWithPhotos;

pub fn routes() -> Router<AppState> {
    Router::new().route("/users", get(get_users))
}

#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
) -> Result<Json<Vec<UserWithPhotos>>, ApiError> {
    let users = User::list_all(&state.db).await?;

    let mut photos_by_user: HashMap<i32, Vec<photos_repo::Photo>> = HashMap::new();
    for photo in photos_repo::list_all(&state.db).await? {
        photos_by_user.entry(photo.user_id).or_default().push(photo);
    }

    let out = users
        .into_iter()
        .map(|u| {
            let photos = photos_by_user.remove(&u.id).unwrap_or_default();
            UserWithPhotos::from_user(u, photos)
        })
        .collect();

    Ok(Json(out))
}
