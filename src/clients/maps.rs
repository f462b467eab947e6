//! Google Maps client (directions, geocoding, elevation profile).

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ApisConfig;

#[derive(Debug, Clone, Serialize)]
pub struct Directions {
    pub distance_km: f64,
    pub distance_text: String,
    pub duration_minutes: f64,
    pub duration_text: String,
    pub start_address: String,
    pub end_address: String,
    pub polyline: String,
    pub steps: usize,
    pub warnings: Vec<String>,
    pub mock_data: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Geocoded {
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    pub place_id: String,
    pub types: Vec<String>,
    pub mock_data: bool,
}

pub struct MapsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl MapsClient {
    pub fn new(cfg: &ApisConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(cfg.http_timeout_seconds))
                .build()
                .unwrap_or_default(),
            base_url: cfg.google_maps_base_url.clone(),
            api_key: cfg.google_maps_api_key.clone(),
        }
    }

    pub async fn directions(&self, origin: &str, destination: &str) -> Directions {
        if self.api_key.is_empty() {
            warn!("Google Maps API key not configured, using mock data");
            return Self::mock_directions(origin, destination);
        }

        match self.fetch_directions(origin, destination).await {
            Ok(directions) => directions,
            Err(e) => {
                warn!(error = %e, "directions fetch failed, using mock data");
                Self::mock_directions(origin, destination)
            }
        }
    }

    pub async fn geocode(&self, address: &str) -> Geocoded {
        if self.api_key.is_empty() {
            return Self::mock_geocode(address);
        }

        match self.fetch_geocode(address).await {
            Ok(geocoded) => geocoded,
            Err(e) => {
                warn!(error = %e, "geocode failed, using mock data");
                Self::mock_geocode(address)
            }
        }
    }

    async fn fetch_directions(&self, origin: &str, destination: &str) -> Result<Directions> {
        let url = format!("{}/directions/json", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[
                ("origin", origin),
                ("destination", destination),
                ("mode", "driving"),
                ("key", &self.api_key),
                ("alternatives", "true"),
                ("avoid", "tolls"),
            ])
            .send()
            .await
            .context("directions request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("directions API error: HTTP {}", response.status());
        }

        let data: GoogleDirectionsResponse = response
            .json()
            .await
            .context("failed to parse directions response")?;

        if data.status != "OK" {
            anyhow::bail!("directions API status: {}", data.status);
        }

        let route = data
            .routes
            .into_iter()
            .next()
            .context("directions response had no routes")?;
        let steps = route.legs.first().map(|l| l.steps.len()).unwrap_or(0);
        let leg = route
            .legs
            .into_iter()
            .next()
            .context("route had no legs")?;

        Ok(Directions {
            distance_km: leg.distance.value / 1000.0,
            distance_text: leg.distance.text,
            duration_minutes: leg.duration.value / 60.0,
            duration_text: leg.duration.text,
            start_address: leg.start_address,
            end_address: leg.end_address,
            polyline: route.overview_polyline.points,
            steps,
            warnings: route.warnings,
            mock_data: false,
        })
    }

    async fn fetch_geocode(&self, address: &str) -> Result<Geocoded> {
        let url = format!("{}/geocode/json", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[("address", address), ("key", &self.api_key)])
            .send()
            .await
            .context("geocode request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("geocode API error: HTTP {}", response.status());
        }

        let data: GoogleGeocodeResponse = response
            .json()
            .await
            .context("failed to parse geocode response")?;

        if data.status != "OK" {
            anyhow::bail!("geocode API status: {}", data.status);
        }

        let result = data
            .results
            .into_iter()
            .next()
            .context("geocode response had no results")?;

        Ok(Geocoded {
            address: result.formatted_address,
            lat: result.geometry.location.lat,
            lon: result.geometry.location.lng,
            place_id: result.place_id,
            types: result.types,
            mock_data: false,
        })
    }

    /// The well-worn Mumbai-Pune demo route.
    fn mock_directions(origin: &str, destination: &str) -> Directions {
        Directions {
            distance_km: 148.5,
            distance_text: "149 km".to_string(),
            duration_minutes: 180.0,
            duration_text: "3 hours".to_string(),
            start_address: origin.to_string(),
            end_address: destination.to_string(),
            polyline: "mock_polyline_encoded_string".to_string(),
            steps: 25,
            warnings: Vec::new(),
            mock_data: true,
        }
    }

    fn mock_geocode(address: &str) -> Geocoded {
        Geocoded {
            address: format!("Mock location for {address}"),
            lat: 19.0760,
            lon: 72.8777,
            place_id: "mock_place_id".to_string(),
            types: vec!["locality".to_string(), "political".to_string()],
            mock_data: true,
        }
    }
}

// Google Maps response structures
#[derive(Debug, Deserialize)]
struct GoogleDirectionsResponse {
    status: String,
    routes: Vec<GoogleRoute>,
}

#[derive(Debug, Deserialize)]
struct GoogleRoute {
    legs: Vec<GoogleLeg>,
    overview_polyline: GooglePolyline,
    #[serde(default)]
    warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleLeg {
    distance: GoogleValueText,
    duration: GoogleValueText,
    start_address: String,
    end_address: String,
    #[serde(default)]
    steps: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GoogleValueText {
    value: f64,
    text: String,
}

#[derive(Debug, Deserialize)]
struct GooglePolyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct GoogleGeocodeResponse {
    status: String,
    results: Vec<GoogleGeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GoogleGeocodeResult {
    formatted_address: String,
    geometry: GoogleGeometry,
    place_id: String,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleGeometry {
    location: GoogleLatLng,
}

#[derive(Debug, Deserialize)]
struct GoogleLatLng {
    lat: f64,
    lng: f64,
}
