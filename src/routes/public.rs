use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::PrivateCookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    auth::{self, AuthenticatedUser, CurrentUser},
    error::AppError,
    services::deep_link::parse_auth_deep_link,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(register_submit))
        .route("/api/auth/login", post(login_submit))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/deep-link", post(deep_link_login))
        .route("/api/auth/me", get(me))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

#[derive(Serialize)]
struct Me {
    uuid: String,
    email: String,
    display_name: Option<String>,
}

impl From<&AuthenticatedUser> for Me {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            uuid: user.uuid.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
        }
    }
}

#[derive(Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

async fn login_submit(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(form): Json<LoginForm>,
) -> Result<Response, AppError> {
    let user = auth::authenticate_user(&state, &form.email, &form.password).await?;
    let session_id = auth::create_session(&state, user.id).await?;
    Ok((
        auth::apply_session_cookie(jar, &session_id),
        Json(Me::from(&user)),
    )
        .into_response())
}

#[derive(Deserialize)]
struct RegisterForm {
    email: String,
    password: String,
    #[serde(default)]
    display_name: Option<String>,
}

async fn register_submit(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(form): Json<RegisterForm>,
) -> Result<Response, AppError> {
    let user = auth::register_user(
        &state,
        &form.email,
        &form.password,
        form.display_name.as_deref(),
    )
    .await?;
    let session_id = auth::create_session(&state, user.id).await?;
    Ok((
        StatusCode::CREATED,
        auth::apply_session_cookie(jar, &session_id),
        Json(Me::from(&user)),
    )
        .into_response())
}

async fn logout(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, StatusCode), AppError> {
    if let Some(cookie) = jar.get(auth::SESSION_COOKIE) {
        auth::destroy_session(&state, cookie.value()).await?;
    }
    Ok((auth::clear_session_cookie(jar), StatusCode::NO_CONTENT))
}

#[derive(Deserialize)]
struct DeepLinkForm {
    url: String,
}

async fn deep_link_login(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(form): Json<DeepLinkForm>,
) -> Result<Response, AppError> {
    let tokens = parse_auth_deep_link(&form.url)?;
    let user = auth::resolve_session(&state, &tokens.access_token)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok((
        auth::apply_session_cookie(jar, &tokens.access_token),
        Json(Me::from(&user)),
    )
        .into_response())
}

async fn me(current: CurrentUser) -> Result<Json<Me>, AppError> {
    let user = current.require_user()?;
    Ok(Json(Me::from(user)))
}
