use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    config::AppConfig,
    error::AppError,
    export::{CoverImage, ImageLoader},
};

pub const DEFAULT_COVER_IMAGE: &str =
    "https://images.unsplash.com/photo-1469854523086-cc02fe5d8800?q=80&w=2021&auto=format&fit=crop";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    urls: HitUrls,
}

#[derive(Debug, Deserialize)]
struct HitUrls {
    regular: String,
}

#[derive(Clone)]
pub struct ImageService {
    client: Client,
    api_url: String,
    access_key: Option<String>,
}

impl ImageService {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            api_url: config.unsplash_api_url.trim_end_matches('/').to_string(),
            access_key: config.unsplash_access_key.clone(),
        }
    }

    pub async fn search(&self, query: &str) -> Result<Option<String>, AppError> {
        let Some(access_key) = self.access_key.as_deref() else {
            return Ok(None);
        };
        let response = self
            .client
            .get(format!("{}/search/photos", self.api_url))
            .query(&[
                ("query", query),
                ("orientation", "landscape"),
                ("per_page", "1"),
            ])
            .header(header::AUTHORIZATION, format!("Client-ID {access_key}"))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::external(
                "unsplash",
                format!("search failed with status {}", response.status()),
            ));
        }
        let body: SearchResponse = response.json().await?;
        Ok(body.results.into_iter().next().map(|hit| hit.urls.regular))
    }

    /// Cover for a destination. Never fails: any problem yields the default.
    pub async fn cover_for(&self, destination: &str) -> String {
        match self.search(destination).await {
            Ok(Some(url)) => url,
            Ok(None) => {
                debug!(destination, "no cover image found, using default");
                DEFAULT_COVER_IMAGE.to_string()
            }
            Err(err) => {
                warn!(destination, error = %err, "cover image search failed, using default");
                DEFAULT_COVER_IMAGE.to_string()
            }
        }
    }
}

pub async fn refreshed_cover(
    images: &ImageService,
    previous_destination: &str,
    new_destination: &str,
    current_image: Option<String>,
) -> String {
    match current_image {
        Some(image) if destination_unchanged(previous_destination, new_destination) => image,
        _ => images.cover_for(new_destination).await,
    }
}

pub fn destination_unchanged(previous: &str, next: &str) -> bool {
    previous.trim().to_lowercase() == next.trim().to_lowercase()
}

#[async_trait]
impl ImageLoader for ImageService {
    async fn load(&self, url: &str) -> Result<CoverImage, AppError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::external(
                "image",
                format!("download failed with status {}", response.status()),
            ));
        }
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = response.bytes().await?.to_vec();
        Ok(CoverImage {
            content_type,
            bytes,
        })
    }
}
