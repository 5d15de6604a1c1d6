use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{config::AppConfig, error::AppError};

const MIN_QUERY_CHARS: usize = 2;
const MAX_RESULTS: &str = "5";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, alias = "admin1")]
    pub region: Option<String>,
}

impl Place {
    pub fn label(&self) -> String {
        match self.country.as_deref() {
            Some(country) if !country.is_empty() => format!("{}, {}", self.name, country),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Place>,
}

#[derive(Clone)]
pub struct GeocodingService {
    client: Client,
    api_url: String,
}

impl GeocodingService {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            api_url: config.geocoding_api_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Place>, AppError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }
        let response = self
            .client
            .get(format!("{}/v1/search", self.api_url))
            .query(&[
                ("name", query),
                ("count", MAX_RESULTS),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::external(
                "geocoding",
                format!("search failed with status {}", response.status()),
            ));
        }
        let body: SearchResponse = response.json().await?;
        debug!(query, hits = body.results.len(), "geocoding search");
        Ok(body.results)
    }
}

#[cfg(test)]
mod tests {
    use std::{net::SocketAddr, time::Duration};

    use super::*;

    #[test]
    fn label_includes_country_when_known() {
        let rome = Place {
            name: "Rome".into(),
            country: Some("Italy".into()),
            region: Some("Lazio".into()),
        };
        assert_eq!(rome.label(), "Rome, Italy");

        let nowhere = Place {
            name: "Atlantis".into(),
            country: None,
            region: None,
        };
        assert_eq!(nowhere.label(), "Atlantis");
    }

    #[test]
    fn open_meteo_payload_maps_admin1_to_region() {
        let body: SearchResponse = serde_json::from_str(
            r#"{"results":[{"id":1,"name":"Rome","latitude":41.9,"longitude":12.5,
                "country":"Italy","admin1":"Lazio"}]}"#,
        )
        .unwrap();
        assert_eq!(body.results[0].region.as_deref(), Some("Lazio"));

        let empty: SearchResponse = serde_json::from_str(r#"{"generationtime_ms":0.5}"#).unwrap();
        assert!(empty.results.is_empty());
    }

    #[tokio::test]
    async fn short_queries_skip_the_request() {
        let config = AppConfig {
            database_url: "sqlite::memory:".into(),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            cookie_secret: "test".into(),
            unsplash_access_key: None,
            unsplash_api_url: "http://127.0.0.1:9".into(),
            geocoding_api_url: "http://127.0.0.1:9".into(),
            gemini_api_key: None,
            gemini_api_url: "http://127.0.0.1:9".into(),
            http_timeout: Duration::from_secs(1),
        };
        let service = GeocodingService::new(Client::new(), &config);
        assert!(service.search(" R ").await.unwrap().is_empty());
    }
}
