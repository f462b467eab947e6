use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub cache: CacheConfig,
    pub apis: ApisConfig,
    pub ml: MlConfig,
    pub db: DbConfig,
    pub environment: Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub enable_cors: bool,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub secret_key: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
}

/// Fixed TTLs for the read-through list caches.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub batteries_ttl_seconds: u64,
    pub stations_ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApisConfig {
    pub openweather_api_key: String,
    pub openweather_base_url: String,
    pub google_maps_api_key: String,
    pub google_maps_base_url: String,
    pub elevation_base_url: String,
    pub http_timeout_seconds: u64,
}

impl ApisConfig {
    pub fn weather_configured(&self) -> bool {
        !self.openweather_api_key.is_empty()
    }

    pub fn maps_configured(&self) -> bool {
        !self.google_maps_api_key.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MlConfig {
    pub training_samples: usize,
    pub seed: u64,
    pub n_trees: u16,
    pub health_max_depth: u16,
    pub range_max_depth: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub url: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("SMARTSWAP__").split("__"));
        Ok(figment.extract()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr_parsing() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            request_timeout_secs: 30,
            enable_cors: true,
        };
        assert_eq!(server.socket_addr().unwrap().port(), 8000);
    }

    #[test]
    fn test_api_key_flags() {
        let apis = ApisConfig {
            openweather_api_key: String::new(),
            openweather_base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            google_maps_api_key: "key".to_string(),
            google_maps_base_url: "https://maps.googleapis.com/maps/api".to_string(),
            elevation_base_url: "https://api.open-elevation.com/api/v1".to_string(),
            http_timeout_seconds: 10,
        };
        assert!(!apis.weather_configured());
        assert!(apis.maps_configured());
    }
}
