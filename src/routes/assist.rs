use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::CurrentUser,
    error::AppError,
    models::activity::{ActivityCategory, ActivityForm, TransportDetails},
    services::{
        geocoding::Place,
        images::DEFAULT_COVER_IMAGE,
        suggestions::{Suggestion, SuggestionRequest},
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/places", get(search_places))
        .route("/cover", get(search_cover))
        .route("/suggestions", post(suggest))
        .route("/suggestions/accept", post(accept_suggestion))
        .route("/prefill/transport", post(prefill_transport))
        .route("/prefill/:category", get(prefill_category))
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
struct PlaceHit {
    label: String,
    #[serde(flatten)]
    place: Place,
}

async fn search_places(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<PlaceHit>>, AppError> {
    current.require_user()?;
    let places = state.geocoding.search(&query.q).await?;
    Ok(Json(
        places
            .into_iter()
            .map(|place| PlaceHit {
                label: place.label(),
                place,
            })
            .collect(),
    ))
}

#[derive(Serialize)]
struct CoverHit {
    url: String,
    fallback: bool,
}

async fn search_cover(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<CoverHit>, AppError> {
    current.require_user()?;
    let url = state.images.cover_for(&query.q).await;
    Ok(Json(CoverHit {
        fallback: url == DEFAULT_COVER_IMAGE,
        url,
    }))
}

#[derive(Deserialize)]
struct SuggestForm {
    trip_id: String,
    #[serde(default)]
    exclude: Vec<String>,
}

async fn suggest(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(form): Json<SuggestForm>,
) -> Result<Json<Vec<Suggestion>>, AppError> {
    let user = current.require_user()?;
    let trip = state.store.trip(&form.trip_id).await?;
    state
        .store
        .trip_access(&trip, &user.uuid)
        .await?
        .require_edit_activities()?;

    let mut exclude = form.exclude;
    exclude.extend(
        state
            .store
            .trip_activities(&trip.id)
            .await?
            .into_iter()
            .map(|activity| activity.title),
    );
    exclude.sort();
    exclude.dedup();

    let suggestions = state
        .suggestions
        .suggest(&SuggestionRequest {
            destination: &trip.destination,
            lodging: trip.lodging_name.as_deref(),
            exclude: &exclude,
        })
        .await?;
    Ok(Json(suggestions))
}

async fn accept_suggestion(
    current: CurrentUser,
    Json(suggestion): Json<Suggestion>,
) -> Result<Json<ActivityForm>, AppError> {
    current.require_user()?;
    Ok(Json(suggestion.into_form()))
}

async fn prefill_transport(
    current: CurrentUser,
    Json(details): Json<TransportDetails>,
) -> Result<Json<ActivityForm>, AppError> {
    current.require_user()?;
    Ok(Json(details.into_form()))
}

async fn prefill_category(
    current: CurrentUser,
    Path(category): Path<String>,
) -> Result<Json<ActivityForm>, AppError> {
    current.require_user()?;
    let category: ActivityCategory = category.parse().map_err(AppError::BadRequest)?;
    Ok(Json(ActivityForm::for_category(category)))
}
