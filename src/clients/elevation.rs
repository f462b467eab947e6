//! Open-Elevation client.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::config::ApisConfig;

/// Upstream lookup limit per request.
const MAX_POINTS: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct ElevationSample {
    pub lat: f64,
    pub lon: f64,
    pub elevation: f64,
    pub mock_data: bool,
}

pub struct ElevationClient {
    client: Client,
    base_url: String,
}

impl ElevationClient {
    pub fn new(cfg: &ApisConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(cfg.http_timeout_seconds))
                .build()
                .unwrap_or_default(),
            base_url: cfg.elevation_base_url.clone(),
        }
    }

    /// Elevation for each coordinate, mock ramp on failure.
    pub async fn lookup(&self, coordinates: &[(f64, f64)]) -> Vec<ElevationSample> {
        match self.fetch(coordinates).await {
            Ok(samples) => samples,
            Err(e) => {
                warn!(error = %e, "elevation lookup failed, using mock data");
                Self::mock_elevations(coordinates)
            }
        }
    }

    async fn fetch(&self, coordinates: &[(f64, f64)]) -> Result<Vec<ElevationSample>> {
        let locations: Vec<serde_json::Value> = coordinates
            .iter()
            .take(MAX_POINTS)
            .map(|(lat, lon)| json!({ "latitude": lat, "longitude": lon }))
            .collect();

        let url = format!("{}/lookup", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&json!({ "locations": locations }))
            .send()
            .await
            .context("elevation request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("elevation API error: HTTP {}", response.status());
        }

        let data: OpenElevationResponse = response
            .json()
            .await
            .context("failed to parse elevation response")?;

        Ok(data
            .results
            .into_iter()
            .map(|r| ElevationSample {
                lat: r.latitude,
                lon: r.longitude,
                elevation: r.elevation,
                mock_data: false,
            })
            .collect())
    }

    fn mock_elevations(coordinates: &[(f64, f64)]) -> Vec<ElevationSample> {
        coordinates
            .iter()
            .enumerate()
            .map(|(i, (lat, lon))| ElevationSample {
                lat: *lat,
                lon: *lon,
                elevation: 300.0 + (i as f64) * 5.0,
                mock_data: true,
            })
            .collect()
    }
}

// Open-Elevation response structures
#[derive(Debug, Deserialize)]
struct OpenElevationResponse {
    results: Vec<OpenElevationResult>,
}

#[derive(Debug, Deserialize)]
struct OpenElevationResult {
    latitude: f64,
    longitude: f64,
    elevation: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(base_url: &str) -> ApisConfig {
        ApisConfig {
            openweather_api_key: String::new(),
            openweather_base_url: String::new(),
            google_maps_api_key: String::new(),
            google_maps_base_url: String::new(),
            elevation_base_url: base_url.to_string(),
            http_timeout_seconds: 5,
        }
    }

    #[tokio::test]
    async fn test_live_lookup_parsed() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lookup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"latitude": 19.0, "longitude": 72.8, "elevation": 14.0},
                    {"latitude": 18.9, "longitude": 73.0, "elevation": 560.0}
                ]
            })))
            .mount(&server)
            .await;

        let client = ElevationClient::new(&cfg(&server.uri()));
        let samples = client.lookup(&[(19.0, 72.8), (18.9, 73.0)]).await;

        assert_eq!(samples.len(), 2);
        assert!(!samples[0].mock_data);
        assert_eq!(samples[1].elevation, 560.0);
    }

    #[tokio::test]
    async fn test_failure_returns_mock_ramp() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lookup"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = ElevationClient::new(&cfg(&server.uri()));
        let samples = client.lookup(&[(19.0, 72.8), (18.9, 73.0), (18.8, 73.1)]).await;

        assert_eq!(samples.len(), 3);
        assert!(samples.iter().all(|s| s.mock_data));
        assert_eq!(samples[0].elevation, 300.0);
        assert_eq!(samples[2].elevation, 310.0);
    }
}
