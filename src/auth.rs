use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::{
    cookie::{Cookie, Key, SameSite},
    PrivateCookieJar,
};
use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{session::Session, user::User},
    state::AppState,
};

pub const SESSION_COOKIE: &str = "wayfarer_session";
const SESSION_TTL_DAYS: i64 = 30;
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub uuid: String,
    pub email: String,
    pub display_name: Option<String>,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            uuid: user.uuid,
            email: user.email,
            display_name: user.display_name,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<AuthenticatedUser>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state)
            .await
            .map_err(|never| -> AppError { match never {} })?;
        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(Self(None));
        };
        Ok(Self(resolve_session(state, cookie.value()).await?))
    }
}

impl CurrentUser {
    pub fn require_user(&self) -> Result<&AuthenticatedUser, AppError> {
        self.0.as_ref().ok_or(AppError::Unauthorized)
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AppError::Other(anyhow::anyhow!("failed to hash password: {err}")))
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<(), AppError> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|err| AppError::Other(anyhow::anyhow!("invalid password hash: {err}")))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::Unauthorized)
}

pub async fn register_user(
    state: &AppState,
    email: &str,
    password: &str,
    display_name: Option<&str>,
) -> Result<AuthenticatedUser, AppError> {
    let email = email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::BadRequest("invalid email".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let taken: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;
    if taken.is_some() {
        return Err(AppError::BadRequest("email already registered".into()));
    }

    let display_name = display_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    let password_hash = hash_password(password)?;
    let uuid = Uuid::new_v4().to_string();

    let id = sqlx::query(
        r#"INSERT INTO users (uuid, email, display_name, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)"#,
    )
    .bind(&uuid)
    .bind(&email)
    .bind(&display_name)
    .bind(&password_hash)
    .bind(Utc::now())
    .execute(&state.db)
    .await?
    .last_insert_rowid();

    info!(user = %uuid, "user registered");
    Ok(AuthenticatedUser {
        id,
        uuid,
        email,
        display_name,
    })
}

pub async fn authenticate_user(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<AuthenticatedUser, AppError> {
    let user: Option<User> = sqlx::query_as(
        r#"SELECT id, uuid, email, display_name, password_hash, created_at, last_login_at
           FROM users WHERE email = ?1"#,
    )
    .bind(email.trim().to_lowercase())
    .fetch_optional(&state.db)
    .await?;
    let user = user.ok_or(AppError::Unauthorized)?;
    verify_password(password, &user.password_hash)?;

    sqlx::query("UPDATE users SET last_login_at = ?1 WHERE id = ?2")
        .bind(Utc::now())
        .bind(user.id)
        .execute(&state.db)
        .await?;
    Ok(user.into())
}

pub async fn create_session(state: &AppState, user_id: i64) -> Result<String, AppError> {
    let session_id: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect();
    let now = Utc::now();
    sqlx::query(
        r#"INSERT INTO sessions (id, user_id, created_at, last_seen_at, expires_at)
           VALUES (?1, ?2, ?3, ?3, ?4)"#,
    )
    .bind(&session_id)
    .bind(user_id)
    .bind(now)
    .bind(now + Duration::days(SESSION_TTL_DAYS))
    .execute(&state.db)
    .await?;
    Ok(session_id)
}

pub async fn destroy_session(state: &AppState, session_id: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE id = ?1")
        .bind(session_id)
        .execute(&state.db)
        .await?;
    Ok(())
}

pub async fn resolve_session(
    state: &AppState,
    session_id: &str,
) -> Result<Option<AuthenticatedUser>, AppError> {
    let session: Option<Session> = sqlx::query_as(
        "SELECT id, user_id, created_at, last_seen_at, expires_at FROM sessions WHERE id = ?1",
    )
    .bind(session_id)
    .fetch_optional(&state.db)
    .await?;
    let Some(session) = session else {
        return Ok(None);
    };

    let now = Utc::now();
    if session.is_expired(now) {
        debug!(user = session.user_id, "session expired");
        destroy_session(state, &session.id).await?;
        return Ok(None);
    }

    sqlx::query("UPDATE sessions SET last_seen_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(&session.id)
        .execute(&state.db)
        .await?;

    let user: Option<User> = sqlx::query_as(
        r#"SELECT id, uuid, email, display_name, password_hash, created_at, last_login_at
           FROM users WHERE id = ?1"#,
    )
    .bind(session.user_id)
    .fetch_optional(&state.db)
    .await?;
    Ok(user.map(AuthenticatedUser::from))
}

pub fn apply_session_cookie(jar: PrivateCookieJar, session_id: &str) -> PrivateCookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, session_id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

pub fn clear_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
