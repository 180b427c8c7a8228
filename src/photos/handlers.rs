use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{auth::jwt::AuthUser, error::ApiError, state::AppState};

use super::{
    repo::Photo,
    services::{upload_profile_photo, UploadItem},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/addPhoto/:user_id", post(add_photo))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB
}

/// POST /users/addPhoto/{userId} — multipart field `file`.
#[instrument(skip(state, mp))]
pub async fn add_photo(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<i32>,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<Photo>), ApiError> {
    if caller != user_id {
        warn!(caller, user_id, "caller id does not match path user id");
        return Err(ApiError::Unauthorized);
    }

    let mut file: Option<UploadItem> = None;
    while let Ok(Some(field)) = mp.next_field().await {
        if field.name() == Some("file") {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".into());
            let body = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(e.to_string()))?;
            file = Some(UploadItem { body, content_type });
        }
    }

    let file = file.ok_or_else(|| ApiError::Validation("file field is required".into()))?;
    if file.body.is_empty() {
        return Err(ApiError::Validation("file must not be empty".into()));
    }

    let photo = upload_profile_photo(&state, user_id, file).await?;

    info!(photo_id = photo.id, user_id, key = %photo.object_key, "photo uploaded");
    Ok((StatusCode::CREATED, Json(photo)))
}
