//! Place lookup against a Mapbox-style forward geocoding endpoint.
//!
//! Requests go to `<base_url>/<query>.json?limit=N&access_token=...` and the
//! response's `features[]` are mapped to [`Place`] values. Only the fields
//! needed for a search hit are decoded.

use crate::domains::places::{Place, PlaceLookup};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    features: Vec<GeocodingFeature>,
}

#[derive(Deserialize)]
struct GeocodingFeature {
    id: String,
    place_name: String,
    center: Vec<f64>,
}

impl From<GeocodingFeature> for Place {
    fn from(feature: GeocodingFeature) -> Self {
        Place {
            id: feature.id,
            name: feature.place_name,
            coordinates: feature.center,
        }
    }
}

/// Geocoding client reusing one `reqwest::Client` (connection pooling, timeout).
pub struct HttpPlaceLookup {
    http: reqwest::Client,
    base_url: Url,
    access_token: Option<String>,
}

impl HttpPlaceLookup {
    pub fn new(
        base_url: &str,
        access_token: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("place lookup base URL {} cannot carry a path", base_url);
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            access_token,
        })
    }

    fn search_url(&self, query: &str, limit: usize) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&format!("{}.json", query));
        }
        {
            let mut params = url.query_pairs_mut();
            params.append_pair("limit", &limit.to_string());
            if let Some(token) = &self.access_token {
                params.append_pair("access_token", token);
            }
        }
        url
    }
}

#[async_trait]
impl PlaceLookup for HttpPlaceLookup {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, String> {
        let url = self.search_url(query, limit);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| format!("geocoding request failed: {}", e))?;

        let body: GeocodingResponse = response
            .json()
            .await
            .map_err(|e| format!("geocoding response was not understood: {}", e))?;

        tracing::debug!(query, hits = body.features.len(), "geocoding response received");

        Ok(body.features.into_iter().map(Place::from).collect())
    }
}
