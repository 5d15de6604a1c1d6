pub mod assist;
pub mod collections;
pub mod public;
pub mod social;
pub mod trips;

use axum::{
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{planner::confirm::DeleteTarget, planner::relations::RemovalOutcome, state::AppState};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(public::router())
        .nest("/api/trips", trips::router())
        .nest("/api/collections", collections::router())
        .nest("/api/social", social::router())
        .nest("/api/assist", assist::router())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct ConfirmationPrompt<'a> {
    pub target: &'a DeleteTarget,
    pub title: &'static str,
    pub message: &'static str,
    pub confirmed: bool,
}

impl<'a> ConfirmationPrompt<'a> {
    pub fn new(target: &'a DeleteTarget) -> Self {
        let (title, message) = target.prompt();
        Self {
            target,
            title,
            message,
            confirmed: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: DeleteTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RemovalOutcome>,
}

pub async fn confirm_or_delete(
    state: &AppState,
    actor_uuid: &str,
    target: DeleteTarget,
    confirm: bool,
) -> Result<Response, crate::error::AppError> {
    if !confirm {
        return Ok(Json(ConfirmationPrompt::new(&target)).into_response());
    }
    let outcome = state.store.delete_target(actor_uuid, &target).await?;
    Ok(Json(Deleted {
        deleted: target,
        outcome,
    })
    .into_response())
}

#[cfg(test)]
mod tests {
    use std::{net::SocketAddr, time::Duration};

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{config::AppConfig, db::init_pool};

    async fn app() -> Router {
        let config = AppConfig {
            database_url: "sqlite::memory:".into(),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            cookie_secret: "router-test".into(),
            unsplash_access_key: None,
            unsplash_api_url: "http://127.0.0.1:9".into(),
            geocoding_api_url: "http://127.0.0.1:9".into(),
            gemini_api_key: None,
            gemini_api_url: "http://127.0.0.1:9".into(),
            http_timeout: Duration::from_secs(1),
        };
        let db = init_pool(&config.database_url).await.unwrap();
        create_router(AppState::new(config, db).unwrap())
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = app()
            .await
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn trip_routes_need_a_session() {
        let response = app()
            .await
            .oneshot(Request::get("/api/trips").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn prompt_describes_the_target() {
        let target = DeleteTarget::Collection("c1".into());
        let prompt = serde_json::to_value(ConfirmationPrompt::new(&target)).unwrap();
        assert_eq!(prompt["target"]["kind"], "collection");
        assert_eq!(prompt["target"]["id"], "c1");
        assert_eq!(prompt["confirmed"], false);
        assert_eq!(prompt["title"], "Delete collection");
    }
}
