use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{
        collaborator::{TripCollaborator, TripInvite},
        friendship::{Friend, FriendRequest, Friendship},
    },
    planner::confirm::DeleteTarget,
    state::AppState,
};

use super::{confirm_or_delete, ConfirmQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/friends", get(list_friends).post(send_request))
        .route("/friends/requests", get(list_requests))
        .route("/friends/:id/accept", post(accept_request))
        .route("/friends/:id", delete(remove_friend))
        .route("/invites", get(list_invites))
        .route("/invites/:id/accept", post(accept_invite))
        .route("/collaborators/:id", delete(remove_collaborator))
}

async fn list_friends(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<Friend>>, AppError> {
    let user = current.require_user()?;
    Ok(Json(state.store.list_friends(&user.uuid).await?))
}

async fn list_requests(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<FriendRequest>>, AppError> {
    let user = current.require_user()?;
    Ok(Json(state.store.list_friend_requests(&user.uuid).await?))
}

#[derive(Deserialize)]
struct FriendRequestForm {
    email: String,
}

async fn send_request(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(form): Json<FriendRequestForm>,
) -> Result<(StatusCode, Json<Friendship>), AppError> {
    let user = current.require_user()?;
    let friendship = state
        .store
        .send_friend_request(&user.uuid, &form.email)
        .await?;
    Ok((StatusCode::CREATED, Json(friendship)))
}

async fn accept_request(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(friendship_id): Path<String>,
) -> Result<Json<Friendship>, AppError> {
    let user = current.require_user()?;
    Ok(Json(
        state
            .store
            .accept_friendship(&friendship_id, &user.uuid)
            .await?,
    ))
}

async fn remove_friend(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(friendship_id): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Response, AppError> {
    let user = current.require_user()?;
    confirm_or_delete(
        &state,
        &user.uuid,
        DeleteTarget::Friendship(friendship_id),
        query.confirm,
    )
    .await
}

async fn list_invites(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<TripInvite>>, AppError> {
    let user = current.require_user()?;
    Ok(Json(state.store.list_invites(&user.uuid).await?))
}

async fn accept_invite(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(collaborator_id): Path<String>,
) -> Result<Json<TripCollaborator>, AppError> {
    let user = current.require_user()?;
    Ok(Json(
        state
            .store
            .accept_invite(&collaborator_id, &user.uuid)
            .await?,
    ))
}

async fn remove_collaborator(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(collaborator_id): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Response, AppError> {
    let user = current.require_user()?;
    confirm_or_delete(
        &state,
        &user.uuid,
        DeleteTarget::Collaborator(collaborator_id),
        query.confirm,
    )
    .await
}
