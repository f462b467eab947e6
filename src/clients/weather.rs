//! OpenWeatherMap client.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ApisConfig;
use crate::domain::WeatherCondition;

#[derive(Debug, Clone, Serialize)]
pub struct CurrentWeather {
    pub location: String,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub condition: WeatherCondition,
    pub description: String,
    pub pressure: f64,
    pub visibility: f64,
    pub timestamp: DateTime<Utc>,
    pub mock_data: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastEntry {
    pub date: String,
    pub temperature: f64,
    pub condition: WeatherCondition,
    pub wind_speed: f64,
    pub humidity: f64,
    pub mock_data: bool,
}

pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(cfg: &ApisConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(cfg.http_timeout_seconds))
                .build()
                .unwrap_or_default(),
            base_url: cfg.openweather_base_url.clone(),
            api_key: cfg.openweather_api_key.clone(),
        }
    }

    /// Current conditions at a coordinate; falls back to mock data when the
    /// API key is missing or the upstream call fails.
    pub async fn current(&self, lat: f64, lon: f64) -> CurrentWeather {
        if self.api_key.is_empty() {
            warn!("OpenWeather API key not configured, using mock data");
            return Self::mock_current(lat, lon);
        }

        match self.fetch_current(lat, lon).await {
            Ok(weather) => weather,
            Err(e) => {
                warn!(error = %e, "weather fetch failed, using mock data");
                Self::mock_current(lat, lon)
            }
        }
    }

    /// Daily forecast entries; same fallback behavior as [`current`].
    pub async fn forecast(&self, lat: f64, lon: f64, days: usize) -> Vec<ForecastEntry> {
        if self.api_key.is_empty() {
            return Self::mock_forecast(days);
        }

        match self.fetch_forecast(lat, lon, days).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "forecast fetch failed, using mock data");
                Self::mock_forecast(days)
            }
        }
    }

    async fn fetch_current(&self, lat: f64, lon: f64) -> Result<CurrentWeather> {
        let url = format!("{}/weather", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .context("weather request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("weather API error: HTTP {}", response.status());
        }

        let data: OwmCurrentResponse = response
            .json()
            .await
            .context("failed to parse weather response")?;
        let weather = data
            .weather
            .first()
            .context("weather response missing condition block")?;

        Ok(CurrentWeather {
            location: format!("{lat},{lon}"),
            temperature: data.main.temp,
            humidity: data.main.humidity,
            wind_speed: data.wind.speed,
            wind_direction: data.wind.deg,
            condition: WeatherCondition::from_owm_main(&weather.main),
            description: weather.description.clone(),
            pressure: data.main.pressure,
            visibility: data.visibility.unwrap_or(10_000.0),
            timestamp: Utc::now(),
            mock_data: false,
        })
    }

    async fn fetch_forecast(&self, lat: f64, lon: f64, days: usize) -> Result<Vec<ForecastEntry>> {
        let url = format!("{}/forecast", self.base_url.trim_end_matches('/'));
        // 8 forecasts per day at 3-hour intervals
        let count = days * 8;
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
                ("cnt", count.to_string()),
            ])
            .send()
            .await
            .context("forecast request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("forecast API error: HTTP {}", response.status());
        }

        let data: OwmForecastResponse = response
            .json()
            .await
            .context("failed to parse forecast response")?;

        Ok(data
            .list
            .into_iter()
            .take(days)
            .map(|item| ForecastEntry {
                date: item.dt_txt,
                temperature: item.main.temp,
                condition: item
                    .weather
                    .first()
                    .map(|w| WeatherCondition::from_owm_main(&w.main))
                    .unwrap_or(WeatherCondition::Clear),
                wind_speed: item.wind.speed,
                humidity: item.main.humidity,
                mock_data: false,
            })
            .collect())
    }

    fn mock_current(lat: f64, lon: f64) -> CurrentWeather {
        CurrentWeather {
            location: format!("{lat},{lon}"),
            temperature: 25.0,
            humidity: 60.0,
            wind_speed: 10.0,
            wind_direction: 180.0,
            condition: WeatherCondition::Clear,
            description: "clear sky".to_string(),
            pressure: 1013.0,
            visibility: 10_000.0,
            timestamp: Utc::now(),
            mock_data: true,
        }
    }

    fn mock_forecast(days: usize) -> Vec<ForecastEntry> {
        (0..days)
            .map(|i| ForecastEntry {
                date: (Utc::now() + Duration::days(i as i64)).format("%Y-%m-%d 12:00:00").to_string(),
                temperature: 25.0 + (i as f64) * 2.0,
                condition: if i % 2 == 0 {
                    WeatherCondition::Clear
                } else {
                    WeatherCondition::Cloudy
                },
                wind_speed: 10.0,
                humidity: 60.0,
                mock_data: true,
            })
            .collect()
    }
}

// OpenWeatherMap response structures
#[derive(Debug, Deserialize)]
struct OwmCurrentResponse {
    main: OwmMain,
    wind: OwmWind,
    weather: Vec<OwmWeather>,
    visibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmForecastResponse {
    list: Vec<OwmForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastItem {
    dt_txt: String,
    main: OwmMain,
    weather: Vec<OwmWeather>,
    wind: OwmWind,
}
