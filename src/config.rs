use std::{env, net::SocketAddr, time::Duration};

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub cookie_secret: String,
    pub unsplash_access_key: Option<String>,
    pub unsplash_api_url: String,
    pub geocoding_api_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_api_url: String,
    pub http_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://wayfarer.db?mode=rwc".to_string());
        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let cookie_secret = env::var("COOKIE_SECRET")
            .unwrap_or_else(|_| "change-me-wayfarer-cookie-secret".to_string());

        let unsplash_access_key = optional_var("UNSPLASH_ACCESS_KEY");
        let unsplash_api_url = env::var("UNSPLASH_API_URL")
            .unwrap_or_else(|_| "https://api.unsplash.com".to_string());
        let geocoding_api_url = env::var("GEOCODING_API_URL")
            .unwrap_or_else(|_| "https://geocoding-api.open-meteo.com".to_string());

        let gemini_api_key = optional_var("GEMINI_API_KEY");
        let gemini_api_url = env::var("GEMINI_API_URL").unwrap_or_else(|_| {
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
                .to_string()
        });

        let http_timeout = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|err| AppError::Config(format!("invalid HTTP_TIMEOUT_SECS: {err}")))?,
            Err(_) => Duration::from_secs(15),
        };

        Ok(Self {
            database_url,
            listen_addr,
            cookie_secret,
            unsplash_access_key,
            unsplash_api_url,
            geocoding_api_url,
            gemini_api_key,
            gemini_api_url,
            http_timeout,
        })
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
