use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{
        collection::{CollectionForm, TripCollection},
        trip::Trip,
    },
    planner::confirm::DeleteTarget,
    state::AppState,
};

use super::{confirm_or_delete, ConfirmQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_collections).post(create_collection))
        .route(
            "/:id",
            get(show_collection)
                .put(update_collection)
                .delete(delete_collection),
        )
}

async fn owned_collection(
    state: &AppState,
    collection_id: &str,
    user_uuid: &str,
) -> Result<TripCollection, AppError> {
    let collection = state.store.collection(collection_id).await?;
    if collection.owner_id != user_uuid {
        return Err(AppError::Forbidden);
    }
    Ok(collection)
}

async fn list_collections(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<TripCollection>>, AppError> {
    let user = current.require_user()?;
    Ok(Json(state.store.list_collections(&user.uuid).await?))
}

async fn create_collection(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(form): Json<CollectionForm>,
) -> Result<(StatusCode, Json<TripCollection>), AppError> {
    let user = current.require_user()?;
    let collection = state.store.create_collection(&user.uuid, form).await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

#[derive(Serialize)]
struct CollectionDetails {
    collection: TripCollection,
    trips: Vec<Trip>,
}

async fn show_collection(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(collection_id): Path<String>,
) -> Result<Json<CollectionDetails>, AppError> {
    let user = current.require_user()?;
    let collection = owned_collection(&state, &collection_id, &user.uuid).await?;
    let trips = state.store.collection_trips(&collection_id).await?;
    Ok(Json(CollectionDetails { collection, trips }))
}

async fn update_collection(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(collection_id): Path<String>,
    Json(form): Json<CollectionForm>,
) -> Result<Json<TripCollection>, AppError> {
    let user = current.require_user()?;
    owned_collection(&state, &collection_id, &user.uuid).await?;
    Ok(Json(
        state.store.update_collection(&collection_id, form).await?,
    ))
}

async fn delete_collection(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(collection_id): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Response, AppError> {
    let user = current.require_user()?;
    owned_collection(&state, &collection_id, &user.uuid).await?;
    confirm_or_delete(
        &state,
        &user.uuid,
        DeleteTarget::Collection(collection_id),
        query.confirm,
    )
    .await
}
