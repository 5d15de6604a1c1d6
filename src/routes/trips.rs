use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::CurrentUser,
    error::AppError,
    export::{build_export, layout::ExportDocument, render::ItineraryPrintTemplate},
    models::{
        activity::{Activity, ActivityForm},
        collaborator::CollaboratorEntry,
        day::Day,
        trip::{Trip, TripForm, TripSummary},
        user::Profile,
    },
    planner::{
        confirm::DeleteTarget, dates::validate_trip_form, itinerary::Itinerary,
        permissions::TripAccess,
    },
    services::images::refreshed_cover,
    state::AppState,
};

use super::{confirm_or_delete, ConfirmQuery, ConfirmationPrompt, Deleted};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trips).post(create_trip))
        .route("/:id", get(show_trip).put(update_trip).delete(delete_trip))
        .route("/:id/collection", put(set_collection))
        .route("/:id/days", get(list_days))
        .route(
            "/:id/days/:day_id/activities",
            get(day_activities).post(create_activity),
        )
        .route(
            "/:id/activities/:activity_id",
            put(update_activity).delete(delete_activity),
        )
        .route(
            "/:id/collaborators",
            get(list_collaborators).post(invite_collaborator),
        )
        .route("/:id/available-friends", get(available_friends))
        .route("/:id/export", get(export_json))
        .route("/:id/export/print", get(export_print))
}

async fn trip_with_access(
    state: &AppState,
    trip_id: &str,
    user_uuid: &str,
) -> Result<(Trip, TripAccess), AppError> {
    let trip = state.store.trip(trip_id).await?;
    let access = state.store.trip_access(&trip, user_uuid).await?;
    Ok((trip, access))
}

async fn open_itinerary(
    state: &AppState,
    trip_id: &str,
    user_uuid: &str,
) -> Result<Itinerary, AppError> {
    let (_, access) = trip_with_access(state, trip_id, user_uuid).await?;
    Itinerary::open(&state.store, trip_id, access).await
}

async fn list_trips(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<TripSummary>>, AppError> {
    let user = current.require_user()?;
    Ok(Json(state.store.list_trips(&user.uuid).await?))
}

#[derive(Serialize)]
struct CreatedTrip {
    trip: Trip,
    days: Vec<Day>,
}

async fn create_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(form): Json<TripForm>,
) -> Result<(StatusCode, Json<CreatedTrip>), AppError> {
    let user = current.require_user()?;
    let draft = validate_trip_form(form)?;
    let cover = state.images.cover_for(&draft.destination).await;
    let (trip, days) = state
        .store
        .create_trip(&user.uuid, &draft, Some(cover))
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedTrip { trip, days })))
}

#[derive(Deserialize)]
struct DayQuery {
    day: Option<String>,
}

async fn show_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<String>,
    Query(query): Query<DayQuery>,
) -> Result<Json<Itinerary>, AppError> {
    let user = current.require_user()?;
    let mut itinerary = open_itinerary(&state, &trip_id, &user.uuid).await?;
    if let Some(day_id) = query.day.as_deref() {
        itinerary.select_day(&state.store, day_id).await?;
    }
    Ok(Json(itinerary))
}

async fn update_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<String>,
    Json(form): Json<TripForm>,
) -> Result<Json<Trip>, AppError> {
    let user = current.require_user()?;
    let (trip, access) = trip_with_access(&state, &trip_id, &user.uuid).await?;
    access.require_manage()?;
    let draft = validate_trip_form(form)?;
    let cover = refreshed_cover(
        &state.images,
        &trip.destination,
        &draft.destination,
        trip.image_url.clone(),
    )
    .await;
    Ok(Json(
        state.store.update_trip(&trip_id, &draft, Some(cover)).await?,
    ))
}

async fn delete_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Response, AppError> {
    let user = current.require_user()?;
    let (_, access) = trip_with_access(&state, &trip_id, &user.uuid).await?;
    access.require_manage()?;
    confirm_or_delete(&state, &user.uuid, DeleteTarget::Trip(trip_id), query.confirm).await
}

#[derive(Deserialize)]
struct CollectionChoice {
    collection_id: Option<String>,
}

async fn set_collection(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<String>,
    Json(choice): Json<CollectionChoice>,
) -> Result<Json<Trip>, AppError> {
    let user = current.require_user()?;
    match choice.collection_id.filter(|id| !id.trim().is_empty()) {
        Some(collection_id) => {
            let collection = state.store.collection(&collection_id).await?;
            if collection.owner_id != user.uuid {
                return Err(AppError::Forbidden);
            }
            let mut itinerary = open_itinerary(&state, &trip_id, &user.uuid).await?;
            let moved = itinerary
                .move_trip_into_collection(&state.store, &trip_id, &collection_id)
                .await?;
            Ok(Json(moved))
        }
        None => {
            let (_, access) = trip_with_access(&state, &trip_id, &user.uuid).await?;
            access.require_manage()?;
            Ok(Json(state.store.set_trip_collection(&trip_id, None).await?))
        }
    }
}

async fn list_days(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<String>,
) -> Result<Json<Vec<Day>>, AppError> {
    let user = current.require_user()?;
    let (_, access) = trip_with_access(&state, &trip_id, &user.uuid).await?;
    access.require_view()?;
    Ok(Json(state.store.days(&trip_id).await?))
}

async fn day_activities(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((trip_id, day_id)): Path<(String, String)>,
) -> Result<Json<Vec<Activity>>, AppError> {
    let user = current.require_user()?;
    let mut itinerary = open_itinerary(&state, &trip_id, &user.uuid).await?;
    let activities = itinerary.select_day(&state.store, &day_id).await?;
    Ok(Json(activities.to_vec()))
}

async fn create_activity(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((trip_id, day_id)): Path<(String, String)>,
    Json(form): Json<ActivityForm>,
) -> Result<(StatusCode, Json<Activity>), AppError> {
    let user = current.require_user()?;
    let mut itinerary = open_itinerary(&state, &trip_id, &user.uuid).await?;
    let created = itinerary
        .create_activity(&state.store, &day_id, form)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn itinerary_at_activity(
    state: &AppState,
    trip_id: &str,
    activity_id: &str,
    user_uuid: &str,
) -> Result<Itinerary, AppError> {
    let activity = state.store.activity(activity_id).await?;
    let mut itinerary = open_itinerary(state, trip_id, user_uuid).await?;
    itinerary.select_day(&state.store, &activity.day_id).await?;
    Ok(itinerary)
}

async fn update_activity(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((trip_id, activity_id)): Path<(String, String)>,
    Json(form): Json<ActivityForm>,
) -> Result<Json<Activity>, AppError> {
    let user = current.require_user()?;
    let mut itinerary = itinerary_at_activity(&state, &trip_id, &activity_id, &user.uuid).await?;
    Ok(Json(
        itinerary
            .update_activity(&state.store, &activity_id, form)
            .await?,
    ))
}

async fn delete_activity(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((trip_id, activity_id)): Path<(String, String)>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Response, AppError> {
    let user = current.require_user()?;
    let mut itinerary = itinerary_at_activity(&state, &trip_id, &activity_id, &user.uuid).await?;
    let target = itinerary.request_delete(&activity_id)?.clone();
    if !query.confirm {
        return Ok(Json(ConfirmationPrompt::new(&target)).into_response());
    }
    itinerary
        .confirm_delete(&state.store)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(Deleted {
        deleted: target,
        outcome: None,
    })
    .into_response())
}

async fn list_collaborators(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<String>,
) -> Result<Json<Vec<CollaboratorEntry>>, AppError> {
    let user = current.require_user()?;
    let (_, access) = trip_with_access(&state, &trip_id, &user.uuid).await?;
    access.require_view()?;
    Ok(Json(state.store.list_collaborators(&trip_id).await?))
}

#[derive(Deserialize)]
struct InviteForm {
    user_id: String,
}

async fn invite_collaborator(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<String>,
    Json(form): Json<InviteForm>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    let collaborator = state
        .store
        .invite_collaborator(&trip_id, &user.uuid, &form.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(collaborator)))
}

async fn available_friends(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<String>,
) -> Result<Json<Vec<Profile>>, AppError> {
    let user = current.require_user()?;
    let (_, access) = trip_with_access(&state, &trip_id, &user.uuid).await?;
    access.require_manage()?;
    Ok(Json(
        state.store.available_friends(&trip_id, &user.uuid).await?,
    ))
}

async fn load_export(
    state: &AppState,
    trip_id: &str,
    user_uuid: &str,
) -> Result<ExportDocument, AppError> {
    let (trip, access) = trip_with_access(state, trip_id, user_uuid).await?;
    access.require_view()?;
    let days = state.store.days(trip_id).await?;
    let activities = state.store.trip_activities(trip_id).await?;
    Ok(build_export(&trip, &days, &activities, &state.images).await)
}

async fn export_json(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<String>,
) -> Result<Json<ExportDocument>, AppError> {
    let user = current.require_user()?;
    Ok(Json(load_export(&state, &trip_id, &user.uuid).await?))
}

async fn export_print(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let user = current.require_user()?;
    let document = load_export(&state, &trip_id, &user.uuid).await?;
    let html = ItineraryPrintTemplate::from_document(&document)
        .render()
        .map_err(|err| AppError::Other(err.into()))?;
    Ok(Html(html))
}
