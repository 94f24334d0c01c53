use crate::domain::model::Coord;
use crate::domain::ports::Geocoder;
use crate::utils::error::{Result, SalesMapError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_GEOCODING_ENDPOINT: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    features: Vec<GeocodingFeature>,
}

#[derive(Debug, Deserialize)]
struct GeocodingFeature {
    center: [f64; 2],
    #[serde(default)]
    place_name: Option<String>,
}

/// Mapbox forward geocoding，限定單一國家、只取第一筆
#[derive(Debug, Clone)]
pub struct MapboxGeocoder {
    client: Client,
    endpoint: String,
    access_token: String,
    country: String,
}

impl MapboxGeocoder {
    pub fn new(endpoint: String, access_token: String, country: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            access_token,
            country,
        }
    }

    fn request_url(&self, query: &str, proximity: Option<Coord>) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| SalesMapError::GeocodingError {
            message: format!("invalid geocoding endpoint '{}': {}", self.endpoint, e),
        })?;

        url.path_segments_mut()
            .map_err(|_| SalesMapError::GeocodingError {
                message: format!("geocoding endpoint cannot be a base: {}", self.endpoint),
            })?
            .pop_if_empty()
            .push(&format!("{}.json", query));

        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("access_token", &self.access_token)
                .append_pair("country", &self.country)
                .append_pair("limit", "1");
            if let Some(p) = proximity {
                pairs.append_pair("proximity", &format!("{},{}", p.lon(), p.lat()));
            }
        }

        Ok(url)
    }

    async fn lookup(&self, query: &str, proximity: Option<Coord>) -> Result<Option<Coord>> {
        let url = self.request_url(query, proximity)?;
        tracing::debug!("Geocoding request for '{}'", query);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SalesMapError::GeocodingError {
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let parsed: GeocodingResponse = response.json().await?;
        match parsed.features.into_iter().next() {
            Some(feature) => {
                tracing::debug!(
                    "Geocoder matched '{}' -> {}",
                    query,
                    feature.place_name.as_deref().unwrap_or("-")
                );
                Coord::try_from(feature.center).map(Some)
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    async fn forward(&self, address: &str) -> Result<Option<Coord>> {
        self.lookup(address, None).await
    }

    async fn search_near(&self, query: &str, proximity: Coord) -> Result<Option<Coord>> {
        self.lookup(query, Some(proximity)).await
    }
}
