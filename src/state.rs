use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use reqwest::Client;
use sha2::{Digest, Sha512};

use crate::{
    config::AppConfig,
    db::DbPool,
    error::AppError,
    services::{
        geocoding::GeocodingService, images::ImageService, store::Store,
        suggestions::SuggestionService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DbPool,
    pub store: Store,
    pub images: ImageService,
    pub geocoding: GeocodingService,
    pub suggestions: SuggestionService,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool) -> Result<Self, AppError> {
        let digest = Sha512::digest(config.cookie_secret.as_bytes());
        let cookie_key = Key::from(&digest[..]);
        let client = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("wayfarer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| AppError::Config(format!("http client: {err}")))?;

        Ok(Self {
            store: Store::new(db.clone()),
            images: ImageService::new(client.clone(), &config),
            geocoding: GeocodingService::new(client.clone(), &config),
            suggestions: SuggestionService::new(client, &config),
            config,
            db,
            cookie_key,
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
