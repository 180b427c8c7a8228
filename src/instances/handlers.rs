use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{jwt::AuthUser, repo::User},
    error::ApiError,
    state::AppState,
};

use super::{
    approval::{self, Approval},
    dto::{AcceptInstanceRequest, CreateInstanceRequest, DisapproveInstanceRequest},
    repo::{self, Instance, NewInstance, PgInstanceStore},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/addInstance/:user_id", post(add_instance))
        .route("/users/getInstances", get(get_instances))
        .route(
            "/users/getInstancesForWorker/:user_id",
            get(get_instances_for_worker),
        )
        .route("/users/acceptInstance/:user_id", post(accept_instance))
        .route(
            "/users/disapprovalInstance/:user_id",
            post(disapproval_instance),
        )
}

fn authorize(caller: i32, path_user: i32) -> Result<(), ApiError> {
    if caller != path_user {
        warn!(caller, path_user, "caller id does not match path user id");
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn add_instance(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<i32>,
    Json(payload): Json<CreateInstanceRequest>,
) -> Result<(StatusCode, Json<Instance>), ApiError> {
    authorize(caller, user_id)?;

    if payload.content.trim().is_empty() {
        return Err(ApiError::Validation("content must not be empty".into()));
    }
    if payload.instance_end <= payload.instance_start {
        return Err(ApiError::Validation(
            "instance_end must be after instance_start".into(),
        ));
    }

    let owner = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    let instance = repo::insert(
        &state.db,
        NewInstance {
            user_id: owner.id,
            content: &payload.content,
            instance_start: payload.instance_start,
            instance_end: payload.instance_end,
            type_of_instance: &payload.type_of_instance,
            username: &owner.username,
            surname: &owner.surname,
            position: &owner.position,
        },
    )
    .await?;

    info!(instance_id = instance.id, user_id, "instance created");
    Ok((StatusCode::CREATED, Json(instance)))
}

#[instrument(skip(state))]
pub async fn get_instances(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
) -> Result<Json<Vec<Instance>>, ApiError> {
    let instances = repo::list_all(&state.db).await?;
    Ok(Json(instances))
}

#[instrument(skip(state))]
pub async fn get_instances_for_worker(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<Instance>>, ApiError> {
    authorize(caller, user_id)?;
    let instances = repo::list_for_worker(&state.db, user_id).await?;
    Ok(Json(instances))
}

#[instrument(skip(state, payload))]
pub async fn accept_instance(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<i32>,
    Json(payload): Json<AcceptInstanceRequest>,
) -> Result<StatusCode, ApiError> {
    authorize(caller, user_id)?;

    let requested = Approval::from_marker(payload.approval.trim())
        .ok_or_else(|| ApiError::Validation("approval must be 'true' or 'false'".into()))?;

    let mut store = PgInstanceStore::begin(&state.db).await?;
    approval::accept(&mut store, payload.id, requested).await?;
    store.commit().await?;

    info!(instance_id = payload.id, user_id, "instance accepted");
    Ok(StatusCode::CREATED)
}

#[instrument(skip(state, payload))]
pub async fn disapproval_instance(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<i32>,
    Json(payload): Json<DisapproveInstanceRequest>,
) -> Result<StatusCode, ApiError> {
    authorize(caller, user_id)?;

    if payload.approval.trim().is_empty() {
        return Err(ApiError::Validation("approval must not be empty".into()));
    }
    if payload.reason.trim().is_empty() {
        return Err(ApiError::Validation("reason must not be empty".into()));
    }
    let requested = Approval::from_columns(&payload.approval, &payload.reason);

    let mut store = PgInstanceStore::begin(&state.db).await?;
    approval::disapprove(&mut store, payload.id, requested).await?;
    store.commit().await?;

    info!(instance_id = payload.id, user_id, "instance disapproved");
    Ok(StatusCode::CREATED)
}
